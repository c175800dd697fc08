use std::fmt;

use serde::{Deserialize, Serialize};

use super::observation::Mode;

/// Enum representing the discrete trading recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalType {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalType::Buy => write!(f, "BUY"),
            SignalType::Sell => write!(f, "SELL"),
            SignalType::Hold => write!(f, "HOLD"),
        }
    }
}

/// Why a signal has the type it has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalState {
    /// z-score beyond a threshold
    Directional,
    /// z-score computed and within the thresholds
    Neutral,
    /// No z-score yet (window not full, or zero variance)
    InsufficientData,
}

/// Trading signal derived from the latest z-score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub signal_type: SignalType,
    pub state: SignalState,
    pub mode: Mode,
    pub z_score: Option<f64>,
    /// Standard normal CDF of |z|, absent without a z-score
    pub confidence: Option<f64>,
}

impl Signal {
    /// Creates a signal for a computed z-score
    pub fn new(signal_type: SignalType, mode: Mode, z_score: f64) -> Self {
        let state = match signal_type {
            SignalType::Buy | SignalType::Sell => SignalState::Directional,
            SignalType::Hold => SignalState::Neutral,
        };
        Self {
            signal_type,
            state,
            mode,
            z_score: Some(z_score),
            confidence: Some(Self::calculate_confidence(z_score.abs())),
        }
    }

    /// HOLD while there is nothing to classify
    pub fn insufficient_data(mode: Mode) -> Self {
        Self {
            signal_type: SignalType::Hold,
            state: SignalState::InsufficientData,
            mode,
            z_score: None,
            confidence: None,
        }
    }

    /// Calculates confidence based on z-score using standard normal CDF
    /// Confidence ranges from 0.0 to 1.0
    pub fn calculate_confidence(z_score: f64) -> f64 {
        use statrs::function::erf::erf;
        // Standard normal CDF: Φ(z) = 0.5 * (1 + erf(z / sqrt(2)))
        0.5 * (1.0 + erf(z_score / f64::sqrt(2.0)))
    }

    /// Human label for the signal, worded for the engine mode
    pub fn label(&self) -> &'static str {
        match (self.mode, self.signal_type, self.state) {
            (_, SignalType::Hold, SignalState::InsufficientData) => "HOLD (insufficient data)",
            (_, SignalType::Hold, _) => "HOLD",
            (Mode::Single, SignalType::Buy, _) => "BUY",
            (Mode::Single, SignalType::Sell, _) => "SELL",
            (Mode::Pairs, SignalType::Buy, _) => "BUY HIGH LEG / SELL LOW LEG",
            (Mode::Pairs, SignalType::Sell, _) => "SELL HIGH LEG / BUY LOW LEG",
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.state == SignalState::Directional
    }

    pub fn is_insufficient_data(&self) -> bool {
        self.state == SignalState::InsufficientData
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
