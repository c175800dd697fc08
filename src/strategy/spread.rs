//! Spread Engine
//!
//! Pairs-mode derivation: `spread[i] = y[i] - x[i]` over the paired legs,
//! plus the rolling spread mean, standard deviation and z-score.

use serde::{Deserialize, Serialize};

use super::rolling::RollingStats;
use crate::domain::{Observation, PairPrice};

/// Derived pairs series, oldest first
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpreadSeries {
    pub y: Vec<f64>,
    pub x: Vec<f64>,
    pub spread: Vec<f64>,
    pub spread_mean: Vec<Option<f64>>,
    pub spread_std: Vec<Option<f64>>,
    pub z_score: Vec<Option<f64>>,
}

impl SpreadSeries {
    pub fn len(&self) -> usize {
        self.spread.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spread.is_empty()
    }

    pub fn latest_y(&self) -> Option<f64> {
        self.y.last().copied()
    }

    pub fn latest_x(&self) -> Option<f64> {
        self.x.last().copied()
    }

    pub fn latest_spread(&self) -> Option<f64> {
        self.spread.last().copied()
    }

    pub fn latest_z_score(&self) -> Option<f64> {
        self.z_score.last().copied().flatten()
    }
}

/// Builds spread series for a fixed rolling window
#[derive(Debug, Clone, Copy)]
pub struct SpreadEngine {
    window: usize,
}

impl SpreadEngine {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Compute from two parallel legs. Legs of unequal length are
    /// truncated to their common prefix.
    pub fn compute(&self, y: &[f64], x: &[f64]) -> SpreadSeries {
        let n = y.len().min(x.len());
        let (y, x) = (&y[..n], &x[..n]);
        let spread: Vec<f64> = y.iter().zip(x).map(|(y, x)| y - x).collect();
        let stats = RollingStats::compute(&spread, self.window);

        SpreadSeries {
            y: y.to_vec(),
            x: x.to_vec(),
            spread,
            spread_mean: stats.mean,
            spread_std: stats.std_dev,
            z_score: stats.z_score,
        }
    }

    /// Compute from paired observations
    pub fn from_observations<'a, I>(&self, observations: I) -> SpreadSeries
    where
        I: IntoIterator<Item = &'a Observation<PairPrice>>,
    {
        let (y, x): (Vec<f64>, Vec<f64>) = observations
            .into_iter()
            .map(|o| (o.quote.y, o.quote.x))
            .unzip();
        self.compute(&y, &x)
    }
}
