//! Signal Classifier
//!
//! Stateless mapping from the latest z-score to a trading signal.
//! Strictly above `upper` is SELL, strictly below `lower` is BUY,
//! anything else is HOLD. A missing z-score is HOLD with the
//! insufficient-data state.

use super::params::SignalThresholds;
use crate::domain::{Mode, Signal, SignalType};

#[derive(Debug, Clone, Copy)]
pub struct SignalClassifier {
    thresholds: SignalThresholds,
    mode: Mode,
}

impl SignalClassifier {
    pub fn new(thresholds: SignalThresholds, mode: Mode) -> Self {
        Self { thresholds, mode }
    }

    pub fn thresholds(&self) -> SignalThresholds {
        self.thresholds
    }

    pub fn classify(&self, z_score: Option<f64>) -> Signal {
        match z_score {
            Some(z) if z.is_finite() => Signal::new(self.signal_type(z), self.mode, z),
            _ => Signal::insufficient_data(self.mode),
        }
    }

    fn signal_type(&self, z: f64) -> SignalType {
        if z > self.thresholds.upper {
            SignalType::Sell
        } else if z < self.thresholds.lower {
            SignalType::Buy
        } else {
            SignalType::Hold
        }
    }
}
