//! Rolling Statistics
//!
//! Windowed moments over a value series:
//! - rolling mean of the trailing `window` values
//! - rolling sample standard deviation (divisor `window - 1`)
//! - z-score: z = (value - rolling_mean) / rolling_std
//! - simple tick-to-tick returns
//!
//! Positions with fewer than `window` points are `None`, as is any z-score
//! whose rolling standard deviation is zero. A window of identical values
//! has a standard deviation of exactly zero; rounding noise left by the
//! variance sum at large price levels is treated as zero relative to the mean.

use statrs::statistics::Statistics;

/// Standard deviations at or below this, scaled by `max(|mean|, 1)`, are
/// treated as zero variance
const MIN_STD_DEV: f64 = 1e-12;

/// Rolling mean/std/z-score for every position of a series
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RollingStats {
    pub window: usize,
    pub mean: Vec<Option<f64>>,
    pub std_dev: Vec<Option<f64>>,
    pub z_score: Vec<Option<f64>>,
}

impl RollingStats {
    /// Compute all rolling statistics for `values`
    pub fn compute(values: &[f64], window: usize) -> Self {
        let mean = rolling_mean(values, window);
        let std_dev = rolling_std(values, window);
        let z_score = values
            .iter()
            .zip(mean.iter().zip(std_dev.iter()))
            .map(|(&value, (&m, &s))| z_score(value, m?, s?))
            .collect();

        Self {
            window,
            mean,
            std_dev,
            z_score,
        }
    }

    pub fn len(&self) -> usize {
        self.z_score.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z_score.is_empty()
    }

    /// Z-score at the last position only
    pub fn latest_z_score(&self) -> Option<f64> {
        self.z_score.last().copied().flatten()
    }
}

/// Trailing windows: `Some(slice)` once `window` points exist
fn trailing_windows(values: &[f64], window: usize) -> impl Iterator<Item = Option<&[f64]>> {
    (0..values.len()).map(move |i| {
        if window == 0 || i + 1 < window {
            None
        } else {
            Some(&values[i + 1 - window..=i])
        }
    })
}

/// Arithmetic mean of the trailing `window` values at each position
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    trailing_windows(values, window)
        .map(|w| w.map(|w| w.mean()).filter(|m| m.is_finite()))
        .collect()
}

/// Sample standard deviation of the trailing `window` values at each position.
/// Undefined for windows shorter than two points.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }
    trailing_windows(values, window)
        .map(|w| w.map(window_std).filter(|s| s.is_finite()))
        .collect()
}

fn window_std(w: &[f64]) -> f64 {
    let first = w[0];
    if w.iter().all(|v| *v == first) {
        return 0.0;
    }
    w.std_dev()
}

/// `(value - mean) / std_dev`, `None` for zero variance or non-finite input
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> Option<f64> {
    if !(std_dev > MIN_STD_DEV * mean.abs().max(1.0)) {
        return None;
    }
    let z = (value - mean) / std_dev;
    z.is_finite().then_some(z)
}

/// Simple returns `(p[i] - p[i-1]) / p[i-1]`; `None` at `i = 0`
/// and wherever the previous price is zero.
pub fn pct_returns(prices: &[f64]) -> Vec<Option<f64>> {
    let mut returns = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return returns;
    }
    returns.push(None);
    returns.extend(prices.windows(2).map(|pair| {
        let r = (pair[1] - pair[0]) / pair[0];
        r.is_finite().then_some(r)
    }));
    returns
}
