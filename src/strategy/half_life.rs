//! Mean-Reversion Half-Life Estimation
//!
//! Fits a one-lag autoregression on the spread's first differences:
//!
//!   Δs(t) = beta * s(t-1) + intercept + ε
//!
//! For a discrete Ornstein-Uhlenbeck spread beta is negative and the
//! deviation halves after `-ln(2) / beta` ticks. A non-negative beta means
//! the spread is not mean-reverting and no half-life is reported.

use std::f64::consts::LN_2;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use super::params::DEFAULT_HALF_LIFE_MIN_SAMPLES;

/// Minimum variance of the lagged series for a stable fit
const MIN_VARIANCE: f64 = 1e-12;

/// Why a half-life could not be estimated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum HalfLifeUnavailable {
    /// Fewer lag/delta pairs than required
    InsufficientSamples { samples: usize, required: usize },
    /// beta >= 0: unit-root or explosive spread
    NonMeanReverting { beta: f64 },
    /// Flat lagged series or non-finite fit
    Degenerate,
}

/// Half-life estimate, or the reason there is none
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HalfLife {
    Estimated {
        /// Half-life in ticks
        periods: f64,
        /// Regression slope (negative)
        beta: f64,
        intercept: f64,
        samples: usize,
    },
    Unavailable(HalfLifeUnavailable),
}

impl HalfLife {
    /// Half-life in ticks, if estimated
    pub fn periods(&self) -> Option<f64> {
        match self {
            HalfLife::Estimated { periods, .. } => Some(*periods),
            HalfLife::Unavailable(_) => None,
        }
    }

    pub fn beta(&self) -> Option<f64> {
        match self {
            HalfLife::Estimated { beta, .. } => Some(*beta),
            HalfLife::Unavailable(HalfLifeUnavailable::NonMeanReverting { beta }) => Some(*beta),
            HalfLife::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, HalfLife::Estimated { .. })
    }
}

/// OLS fit of `delta ≈ beta * lagged + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagRegression {
    pub beta: f64,
    pub intercept: f64,
    pub samples: usize,
}

/// Half-life estimator over a spread series
#[derive(Debug, Clone, Copy)]
pub struct HalfLifeEstimator {
    /// Minimum lag/delta pairs required
    min_samples: usize,
}

impl Default for HalfLifeEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_HALF_LIFE_MIN_SAMPLES)
    }
}

impl HalfLifeEstimator {
    pub fn new(min_samples: usize) -> Self {
        Self { min_samples }
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Paired `(lagged, delta)` vectors; pairs without a finite lag are dropped
    pub fn lag_pairs(spread: &[f64]) -> (Vec<f64>, Vec<f64>) {
        spread
            .windows(2)
            .filter(|w| w[0].is_finite() && w[1].is_finite())
            .map(|w| (w[0], w[1] - w[0]))
            .unzip()
    }

    /// Ordinary least squares on the lag pairs, `None` when the fit is degenerate
    pub fn regress(lagged: &[f64], delta: &[f64]) -> Option<LagRegression> {
        if lagged.len() != delta.len() || lagged.len() < 2 {
            return None;
        }

        let var_lagged = lagged.iter().variance();
        if !(var_lagged > MIN_VARIANCE) {
            return None;
        }

        let beta = lagged.iter().covariance(delta.iter()) / var_lagged;
        let intercept = delta.iter().mean() - beta * lagged.iter().mean();
        if !beta.is_finite() || !intercept.is_finite() {
            return None;
        }

        Some(LagRegression {
            beta,
            intercept,
            samples: lagged.len(),
        })
    }

    /// Estimate the half-life of `spread`
    pub fn estimate(&self, spread: &[f64]) -> HalfLife {
        let (lagged, delta) = Self::lag_pairs(spread);

        if lagged.len() < self.min_samples {
            return HalfLife::Unavailable(HalfLifeUnavailable::InsufficientSamples {
                samples: lagged.len(),
                required: self.min_samples,
            });
        }

        let Some(fit) = Self::regress(&lagged, &delta) else {
            tracing::debug!(samples = lagged.len(), "half-life fit degenerate");
            return HalfLife::Unavailable(HalfLifeUnavailable::Degenerate);
        };

        if fit.beta >= 0.0 {
            tracing::debug!(beta = fit.beta, "spread not mean-reverting");
            return HalfLife::Unavailable(HalfLifeUnavailable::NonMeanReverting { beta: fit.beta });
        }

        let periods = -LN_2 / fit.beta;
        if !periods.is_finite() || periods <= 0.0 {
            return HalfLife::Unavailable(HalfLifeUnavailable::Degenerate);
        }

        HalfLife::Estimated {
            periods,
            beta: fit.beta,
            intercept: fit.intercept,
            samples: fit.samples,
        }
    }
}
