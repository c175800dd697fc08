//! Engine Parameters
//!
//! Configuration structs for the signal engine.
//! Defaults: 200-point buffer, 30-point window, ±2σ thresholds.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::domain::Mode;

/// Default buffer capacity (`MAX_POINTS`)
pub const DEFAULT_MAX_POINTS: usize = 200;
/// Default rolling window (`WINDOW`)
pub const DEFAULT_WINDOW: usize = 30;
/// Window range offered in pairs mode
pub const PAIRS_WINDOW_RANGE: RangeInclusive<usize> = 10..=60;
/// Minimum lag/delta pairs for a half-life fit
pub const DEFAULT_HALF_LIFE_MIN_SAMPLES: usize = 6;

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Buffer capacity; oldest observations are evicted beyond this
    pub max_points: usize,
    /// Number of trailing points for rolling statistics
    pub window: usize,
    /// Minimum regression samples before a half-life is reported
    pub half_life_min_samples: usize,
    /// Z-score thresholds for directional signals
    pub thresholds: SignalThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
            window: DEFAULT_WINDOW,
            half_life_min_samples: DEFAULT_HALF_LIFE_MIN_SAMPLES,
            thresholds: SignalThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Create a new config with custom window
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Create a new config with custom buffer capacity
    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    /// Create a new config with custom thresholds
    pub fn with_thresholds(mut self, thresholds: SignalThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Validate parameters that apply to every mode
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_points < 2 {
            return Err(ConfigError::InvalidMaxPoints(self.max_points));
        }
        if self.window < 2 || self.window > self.max_points {
            return Err(ConfigError::InvalidWindow {
                window: self.window,
                max_points: self.max_points,
            });
        }
        if self.half_life_min_samples < 3 {
            return Err(ConfigError::InvalidHalfLifeSamples(self.half_life_min_samples));
        }
        self.thresholds.validate()?;
        Ok(())
    }

    /// Validate for a specific mode; pairs mode restricts the window range
    pub fn validate_for(&self, mode: Mode) -> Result<(), ConfigError> {
        self.validate()?;
        if mode == Mode::Pairs && !PAIRS_WINDOW_RANGE.contains(&self.window) {
            return Err(ConfigError::PairsWindowOutOfRange(self.window));
        }
        Ok(())
    }
}

/// Z-score thresholds. Strictly beyond a threshold is directional,
/// exactly on it is HOLD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalThresholds {
    /// Above this the value is overextended high (SELL)
    pub upper: f64,
    /// Below this the value is overextended low (BUY)
    pub lower: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            upper: 2.0,
            lower: -2.0,
        }
    }
}

impl SignalThresholds {
    /// Symmetric thresholds at ±`z`
    pub fn symmetric(z: f64) -> Self {
        Self { upper: z, lower: -z }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.upper.is_finite() || self.upper <= 0.0 {
            return Err(ConfigError::InvalidUpperThreshold(self.upper));
        }
        if !self.lower.is_finite() || self.lower >= 0.0 {
            return Err(ConfigError::InvalidLowerThreshold(self.lower));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid max_points: {0} (minimum 2)")]
    InvalidMaxPoints(usize),
    #[error("Invalid window: {window} (must be 2 <= window <= max_points {max_points})")]
    InvalidWindow { window: usize, max_points: usize },
    #[error("Invalid pairs window: {0} (must be 10-60)")]
    PairsWindowOutOfRange(usize),
    #[error("Invalid upper threshold: {0} (must be > 0)")]
    InvalidUpperThreshold(f64),
    #[error("Invalid lower threshold: {0} (must be < 0)")]
    InvalidLowerThreshold(f64),
    #[error("Invalid half-life minimum samples: {0} (minimum 3)")]
    InvalidHalfLifeSamples(usize),
}
