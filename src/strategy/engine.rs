//! Signal Engine
//!
//! Owns the bounded series and recomputes every derived value on each
//! ingest. Consumers only ever see complete snapshots: `ingest` takes
//! `&mut self`, so a buffer update without its recomputation is never
//! observable. Hosts sharing the engine across threads must hold one lock
//! across `ingest` and `snapshot`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classifier::SignalClassifier;
use super::half_life::{HalfLife, HalfLifeEstimator};
use super::params::{ConfigError, EngineConfig};
use super::rolling::{pct_returns, RollingStats};
use super::series::SeriesBuffer;
use super::spread::{SpreadEngine, SpreadSeries};
use crate::domain::{Mode, Observation, PairPrice, Quote, Signal};

/// One position of the derived series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    /// Price (single mode) or spread (pairs mode)
    pub value: f64,
    /// Simple return of the reference price
    pub simple_return: Option<f64>,
    pub rolling_mean: Option<f64>,
    pub rolling_std: Option<f64>,
    pub z_score: Option<f64>,
}

/// Read-only view of the engine after the latest ingest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<Q> {
    pub mode: Mode,
    pub window: usize,
    pub capacity: usize,
    /// Latest observation with its quote (price, or both legs)
    pub latest: Option<Observation<Q>>,
    /// Latest price or spread
    pub latest_value: Option<f64>,
    pub latest_return: Option<f64>,
    pub latest_z_score: Option<f64>,
    /// Pairs mode only
    pub half_life: Option<HalfLife>,
    pub signal: Signal,
    pub points: Vec<SeriesPoint>,
}

impl<Q: Quote> Snapshot<Q> {
    fn empty(config: &EngineConfig) -> Self {
        Self {
            mode: Q::MODE,
            window: config.window,
            capacity: config.max_points,
            latest: None,
            latest_value: None,
            latest_return: None,
            latest_z_score: None,
            half_life: None,
            signal: Signal::insufficient_data(Q::MODE),
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True until the window is full and the latest z-score is defined
    pub fn is_warming_up(&self) -> bool {
        self.signal.is_insufficient_data()
    }

    /// Export rows for this snapshot: `(timestamp, value, z_score)`
    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.points
            .iter()
            .map(|p| ExportRow {
                timestamp: p.timestamp,
                value: p.value,
                z_score: p.z_score,
            })
            .collect()
    }
}

/// Export tuple: timestamp, price-or-spread, z-score. Field order is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub z_score: Option<f64>,
}

/// Streaming statistics and signal engine
#[derive(Debug, Clone)]
pub struct SignalEngine<Q: Quote> {
    config: EngineConfig,
    series: SeriesBuffer<Observation<Q>>,
    classifier: SignalClassifier,
    estimator: HalfLifeEstimator,
    snapshot: Snapshot<Q>,
    ingested: u64,
}

impl<Q: Quote> SignalEngine<Q> {
    /// Create an engine; the config is validated for `Q`'s mode
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate_for(Q::MODE)?;

        Ok(Self {
            series: SeriesBuffer::new(config.max_points),
            classifier: SignalClassifier::new(config.thresholds, Q::MODE),
            estimator: HalfLifeEstimator::new(config.half_life_min_samples),
            snapshot: Snapshot::empty(&config),
            config,
            ingested: 0,
        })
    }

    pub fn mode(&self) -> Mode {
        Q::MODE
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Observations currently held
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total observations accepted since creation
    pub fn ingested(&self) -> u64 {
        self.ingested
    }

    pub fn observations(&self) -> impl Iterator<Item = &Observation<Q>> {
        self.series.iter()
    }

    /// Append an observation and recompute the snapshot.
    ///
    /// Quotes with a non-finite or non-positive leg are dropped and the
    /// previous snapshot stays in place.
    pub fn ingest(&mut self, observation: Observation<Q>) {
        if !observation.quote.is_valid() {
            tracing::warn!(quote = ?observation.quote, "dropping invalid quote");
            return;
        }

        let evicted = self.series.append(observation);
        if evicted > 0 {
            tracing::debug!(evicted, capacity = self.series.capacity(), "series at capacity");
        }
        self.ingested += 1;
        self.recompute();
    }

    /// Copy of the current snapshot
    pub fn snapshot(&self) -> Snapshot<Q> {
        self.snapshot.clone()
    }

    /// Borrow the current snapshot without cloning
    pub fn latest_snapshot(&self) -> &Snapshot<Q> {
        &self.snapshot
    }

    /// Time-ordered `(timestamp, value, z_score)` rows
    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.snapshot.export_rows()
    }

    fn recompute(&mut self) {
        let values = self.series.values(|o| o.quote.value());
        let prices = self.series.values(|o| o.quote.reference_price());

        let stats = RollingStats::compute(&values, self.config.window);
        let returns = pct_returns(&prices);

        let points: Vec<SeriesPoint> = self
            .series
            .iter()
            .enumerate()
            .map(|(i, o)| SeriesPoint {
                timestamp: o.timestamp,
                value: values[i],
                simple_return: returns[i],
                rolling_mean: stats.mean[i],
                rolling_std: stats.std_dev[i],
                z_score: stats.z_score[i],
            })
            .collect();

        let half_life = match Q::MODE {
            Mode::Pairs => Some(self.estimator.estimate(&values)),
            Mode::Single => None,
        };

        let latest_z_score = stats.latest_z_score();

        self.snapshot = Snapshot {
            mode: Q::MODE,
            window: self.config.window,
            capacity: self.config.max_points,
            latest: self.series.latest().cloned(),
            latest_value: values.last().copied(),
            latest_return: returns.last().copied().flatten(),
            latest_z_score,
            half_life,
            signal: self.classifier.classify(latest_z_score),
            points,
        };
    }
}

impl SignalEngine<PairPrice> {
    /// Leg, spread and spread-statistics series for charting
    pub fn spread_series(&self) -> SpreadSeries {
        SpreadEngine::new(self.config.window).from_observations(self.series.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SignalType, SinglePrice};
    use crate::strategy::params::SignalThresholds;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn ts(i: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(i)
    }

    fn single_engine(window: usize, max_points: usize) -> SignalEngine<SinglePrice> {
        let config = EngineConfig::default()
            .with_window(window)
            .with_max_points(max_points);
        SignalEngine::new(config).unwrap()
    }

    #[test]
    fn test_empty_engine_snapshot() {
        let engine = single_engine(5, 20);
        let snapshot = engine.snapshot();
        assert!(snapshot.is_empty());
        assert!(snapshot.is_warming_up());
        assert_eq!(snapshot.latest_value, None);
        assert_eq!(snapshot.half_life, None);
        assert!(engine.export_rows().is_empty());
    }

    #[test]
    fn test_rejects_invalid_pairs_window() {
        let config = EngineConfig::default().with_window(5);
        assert!(matches!(
            SignalEngine::<PairPrice>::new(config),
            Err(ConfigError::PairsWindowOutOfRange(5))
        ));
    }

    #[test]
    fn test_warming_up_until_window_fills() {
        let mut engine = single_engine(5, 20);
        for (i, p) in [100.0, 102.0, 99.0, 101.0].into_iter().enumerate() {
            engine.ingest(Observation::new(ts(i as i64), SinglePrice::new(p)));
            let snapshot = engine.snapshot();
            assert!(snapshot.is_warming_up());
            assert_eq!(snapshot.latest_z_score, None);
            assert_eq!(snapshot.signal.signal_type, SignalType::Hold);
        }

        engine.ingest(Observation::new(ts(4), SinglePrice::new(98.0)));
        let snapshot = engine.snapshot();
        assert!(!snapshot.is_warming_up());
        assert!(snapshot.latest_z_score.is_some());
    }

    #[test]
    fn test_latest_return() {
        let mut engine = single_engine(5, 20);
        engine.ingest(Observation::new(ts(0), SinglePrice::new(100.0)));
        assert_eq!(engine.snapshot().latest_return, None);

        engine.ingest(Observation::new(ts(1), SinglePrice::new(101.0)));
        assert_relative_eq!(engine.snapshot().latest_return.unwrap(), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_capacity_bounds_snapshot() {
        let mut engine = single_engine(3, 10);
        for i in 0..25 {
            engine.ingest(Observation::new(ts(i), SinglePrice::new(100.0 + (i % 4) as f64)));
        }
        let snapshot = engine.snapshot();
        assert_eq!(engine.len(), 10);
        assert_eq!(engine.ingested(), 25);
        assert_eq!(snapshot.len(), 10);
        assert_eq!(snapshot.points[0].timestamp, ts(15));
        assert_eq!(snapshot.latest.as_ref().unwrap().timestamp, ts(24));
    }

    #[test]
    fn test_invalid_quote_keeps_previous_snapshot() {
        let mut engine = single_engine(3, 10);
        for i in 0..5 {
            engine.ingest(Observation::new(ts(i), SinglePrice::new(100.0 + i as f64)));
        }
        let before = engine.snapshot();

        engine.ingest(Observation::new(ts(5), SinglePrice::new(f64::NAN)));
        engine.ingest(Observation::new(ts(6), SinglePrice::new(-3.0)));

        assert_eq!(engine.snapshot(), before);
        assert_eq!(engine.len(), 5);
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let mut engine = single_engine(4, 50);
        for i in 0..30 {
            let p = 100.0 + ((i * 7) % 11) as f64 * 0.37;
            engine.ingest(Observation::new(ts(i), SinglePrice::new(p)));
        }
        let first = engine.snapshot();
        let second = engine.snapshot();
        assert_eq!(first, second);
        assert_eq!(
            first.latest_z_score.map(f64::to_bits),
            second.latest_z_score.map(f64::to_bits)
        );
    }

    #[test]
    fn test_single_mode_sell_signal() {
        let config = EngineConfig::default()
            .with_window(10)
            .with_thresholds(SignalThresholds::default());
        let mut engine: SignalEngine<SinglePrice> = SignalEngine::new(config).unwrap();
        for i in 0..9 {
            engine.ingest(Observation::new(ts(i), SinglePrice::new(100.0 + (i % 2) as f64 * 0.1)));
        }
        engine.ingest(Observation::new(ts(9), SinglePrice::new(110.0)));

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.signal.signal_type, SignalType::Sell);
        assert_eq!(snapshot.signal.label(), "SELL");
        assert!(snapshot.half_life.is_none());
    }

    #[test]
    fn test_pairs_mode_snapshot() {
        let config = EngineConfig::default().with_window(10);
        let mut engine: SignalEngine<PairPrice> = SignalEngine::new(config).unwrap();

        // Spread decays towards zero with a small alternating wobble
        let mut spread = 8.0;
        for i in 0..40 {
            let wobble = if i % 2 == 0 { 0.3 } else { -0.3 };
            engine.ingest(Observation::new(ts(i), PairPrice::new(100.0 + spread + wobble, 100.0)));
            spread *= 0.85;
        }

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.mode, Mode::Pairs);
        let latest = snapshot.latest.as_ref().unwrap();
        assert_relative_eq!(snapshot.latest_value.unwrap(), latest.quote.spread(), epsilon = 1e-12);
        assert!(snapshot.half_life.is_some());

        let series = engine.spread_series();
        assert_eq!(series.len(), 40);
        assert_eq!(series.latest_y(), Some(latest.quote.y));
        assert_eq!(series.latest_x(), Some(100.0));
        assert_eq!(series.latest_z_score(), snapshot.latest_z_score);
    }

    #[test]
    fn test_export_rows_follow_points() {
        let mut engine = single_engine(3, 10);
        for i in 0..6 {
            engine.ingest(Observation::new(ts(i), SinglePrice::new(50.0 + (i * i) as f64)));
        }
        let rows = engine.export_rows();
        let snapshot = engine.snapshot();
        assert_eq!(rows.len(), 6);
        for (row, point) in rows.iter().zip(&snapshot.points) {
            assert_eq!(row.timestamp, point.timestamp);
            assert_eq!(row.value, point.value);
            assert_eq!(row.z_score, point.z_score);
        }
        assert!(rows.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert!(rows[0].z_score.is_none() && rows[1].z_score.is_none());
        assert!(rows[2].z_score.is_some());
    }
}
