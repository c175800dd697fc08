//! Signal Engine Integration Tests
//!
//! End-to-end flows through the public API:
//! 1. Single-instrument stream -> rolling z-score -> signal
//! 2. Bounded history and snapshot stability
//! 3. Pairs stream -> spread z-score -> half-life
//! 4. Monitor + scripted feed -> CSV export
//!
//! All tests are deterministic (no real network calls).

use approx::assert_relative_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};

use gemscap_quant::adapters::export::CsvExporter;
use gemscap_quant::adapters::market_data::SimulatedPairFeed;
use gemscap_quant::application::{Monitor, TickOutcome};
use gemscap_quant::domain::{Mode, Observation, PairPrice, SignalState, SignalType, SinglePrice};
use gemscap_quant::ports::{FeedError, PriceFeed, ScriptedFeed};
use gemscap_quant::strategy::{EngineConfig, SignalClassifier, SignalEngine, SignalThresholds};

// ============================================================================
// Test Fixtures
// ============================================================================

fn ts(i: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap() + Duration::seconds(i)
}

/// 100, 101, 99, 102, 98, 103, ... oscillating with a growing amplitude
fn zigzag(k: usize) -> f64 {
    if k % 2 == 1 {
        100.0 + ((k + 1) / 2) as f64
    } else {
        100.0 - (k / 2) as f64
    }
}

/// Straightforward two-pass z-score of the last point of `window`
fn naive_z(window: &[f64]) -> f64 {
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (window[window.len() - 1] - mean) / var.sqrt()
}

fn single_engine(window: usize, max_points: usize) -> SignalEngine<SinglePrice> {
    let config = EngineConfig::default()
        .with_window(window)
        .with_max_points(max_points);
    SignalEngine::new(config).unwrap()
}

// ============================================================================
// Single-instrument flow
// ============================================================================

#[test]
fn test_single_mode_matches_naive_z_scores() {
    let mut engine = single_engine(5, 200);
    let prices: Vec<f64> = (0..32).map(zigzag).collect();

    for (i, p) in prices.iter().enumerate() {
        engine.ingest(Observation::new(ts(i as i64), SinglePrice::new(*p)));
    }

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.mode, Mode::Single);
    assert_eq!(snapshot.len(), 32);

    // Warm-up: no z-score before the window fills
    for point in &snapshot.points[..4] {
        assert!(point.z_score.is_none());
    }

    for i in [4, 17, 31] {
        let expected = naive_z(&prices[i - 4..=i]);
        let actual = snapshot.points[i].z_score.unwrap();
        assert!((actual - expected).abs() < 1e-9, "index {}: {} vs {}", i, actual, expected);
    }

    assert_eq!(snapshot.latest_value, Some(prices[31]));
    assert_relative_eq!(
        snapshot.latest_return.unwrap(),
        (prices[31] - prices[30]) / prices[30],
        epsilon = 1e-12
    );
    assert!(snapshot.half_life.is_none());
}

#[test]
fn test_single_mode_warm_up_signal() {
    let mut engine = single_engine(5, 200);
    for i in 0..4 {
        engine.ingest(Observation::new(ts(i), SinglePrice::new(zigzag(i as usize))));
        let snapshot = engine.snapshot();
        assert!(snapshot.is_warming_up());
        assert_eq!(snapshot.signal.label(), "HOLD (insufficient data)");
    }

    engine.ingest(Observation::new(ts(4), SinglePrice::new(zigzag(4))));
    assert!(!engine.snapshot().is_warming_up());
}

#[test]
fn test_spike_produces_sell_then_drop_produces_buy() {
    let mut engine = single_engine(10, 50);
    for i in 0..9 {
        let p = if i % 2 == 0 { 100.0 } else { 100.5 };
        engine.ingest(Observation::new(ts(i), SinglePrice::new(p)));
    }

    engine.ingest(Observation::new(ts(9), SinglePrice::new(110.0)));
    let spike = engine.snapshot();
    assert_eq!(spike.signal.signal_type, SignalType::Sell);
    assert_eq!(spike.signal.label(), "SELL");
    assert!(spike.signal.is_actionable());

    let mut engine = single_engine(10, 50);
    for i in 0..9 {
        let p = if i % 2 == 0 { 100.0 } else { 100.5 };
        engine.ingest(Observation::new(ts(i), SinglePrice::new(p)));
    }
    engine.ingest(Observation::new(ts(9), SinglePrice::new(90.0)));
    assert_eq!(engine.snapshot().signal.signal_type, SignalType::Buy);
}

#[test]
fn test_flat_prices_have_no_z_score() {
    let mut engine = single_engine(5, 20);
    for i in 0..10 {
        engine.ingest(Observation::new(ts(i), SinglePrice::new(250.0)));
    }

    let snapshot = engine.snapshot();
    assert!(snapshot.latest_z_score.is_none());
    assert_eq!(snapshot.signal.state, SignalState::InsufficientData);
    assert_eq!(snapshot.latest_return, Some(0.0));
}

#[test]
fn test_flat_btc_prices_hold_with_insufficient_data() {
    for window in [10, 30, 60] {
        let mut engine = single_engine(window, 200);
        for i in 0..(window as i64 + 5) {
            engine.ingest(Observation::new(ts(i), SinglePrice::new(64123.45)));
        }

        let snapshot = engine.snapshot();
        assert!(snapshot.latest_z_score.is_none(), "window {}", window);
        assert_eq!(snapshot.signal.state, SignalState::InsufficientData);
        assert_eq!(snapshot.signal.signal_type, SignalType::Hold);
    }
}

// ============================================================================
// Bounded history and snapshots
// ============================================================================

#[test]
fn test_capacity_keeps_most_recent_points() {
    let mut engine = single_engine(5, 10);
    for i in 0..25 {
        engine.ingest(Observation::new(ts(i), SinglePrice::new(zigzag(i as usize))));
        assert!(engine.len() <= 10);
    }

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.len(), 10);
    assert_eq!(engine.ingested(), 25);
    assert_eq!(snapshot.points.first().unwrap().timestamp, ts(15));
    assert_eq!(snapshot.points.last().unwrap().timestamp, ts(24));

    // Statistics are recomputed over the retained points only
    assert!(snapshot.points[3].z_score.is_none());
    assert!(snapshot.points[4].z_score.is_some());
}

#[test]
fn test_snapshot_is_idempotent() {
    let mut engine = single_engine(5, 50);
    for i in 0..12 {
        engine.ingest(Observation::new(ts(i), SinglePrice::new(zigzag(i as usize))));
    }

    let first = engine.snapshot();
    let second = engine.snapshot();
    assert_eq!(first, second);
    assert_eq!(engine.export_rows(), engine.export_rows());
}

#[test]
fn test_invalid_quote_leaves_snapshot_unchanged() {
    let mut engine = single_engine(5, 50);
    for i in 0..8 {
        engine.ingest(Observation::new(ts(i), SinglePrice::new(zigzag(i as usize))));
    }
    let before = engine.snapshot();

    engine.ingest(Observation::new(ts(8), SinglePrice::new(f64::INFINITY)));
    engine.ingest(Observation::new(ts(9), SinglePrice::new(-5.0)));

    assert_eq!(engine.snapshot(), before);
    assert_eq!(engine.ingested(), 8);
}

#[test]
fn test_export_rows_follow_points() {
    let mut engine = single_engine(5, 50);
    for i in 0..7 {
        engine.ingest(Observation::new(ts(i), SinglePrice::new(zigzag(i as usize))));
    }

    let rows = engine.export_rows();
    let snapshot = engine.snapshot();
    assert_eq!(rows.len(), 7);
    for (row, point) in rows.iter().zip(&snapshot.points) {
        assert_eq!(row.timestamp, point.timestamp);
        assert_eq!(row.value, point.value);
        assert_eq!(row.z_score, point.z_score);
    }
}

// ============================================================================
// Pairs flow
// ============================================================================

#[test]
fn test_pairs_spread_and_labels() {
    let config = EngineConfig::default().with_window(10).with_max_points(100);
    let mut engine: SignalEngine<PairPrice> = SignalEngine::new(config).unwrap();

    for i in 0..10 {
        let x = 100.0 + i as f64 * 0.1;
        let spread = if i % 2 == 0 { 1.0 } else { 1.2 };
        engine.ingest(Observation::new(ts(i), PairPrice::new(x + spread, x)));
    }
    let x = 101.0;
    engine.ingest(Observation::new(ts(10), PairPrice::new(x + 3.0, x)));

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.mode, Mode::Pairs);
    assert_relative_eq!(snapshot.latest_value.unwrap(), 3.0, epsilon = 1e-9);
    assert_eq!(snapshot.signal.signal_type, SignalType::Sell);
    assert_eq!(snapshot.signal.label(), "SELL HIGH LEG / BUY LOW LEG");

    let series = engine.spread_series();
    assert_eq!(series.len(), 11);
    assert_relative_eq!(series.latest_spread().unwrap(), 3.0, epsilon = 1e-9);
    assert_eq!(series.latest_y(), Some(104.0));
    assert_relative_eq!(
        series.latest_z_score().unwrap(),
        snapshot.latest_z_score.unwrap(),
        epsilon = 1e-12
    );
}

#[tokio::test]
async fn test_pairs_simulated_feed_reports_half_life() {
    let feed = SimulatedPairFeed::new(7, 100.0, 1.0, 0.3);
    let config = EngineConfig::default().with_window(20).with_max_points(200);
    let mut engine: SignalEngine<PairPrice> = SignalEngine::new(config).unwrap();

    for i in 0..200 {
        let quote = feed.fetch().await.unwrap();
        engine.ingest(Observation::new(ts(i), quote));
    }

    let snapshot = engine.snapshot();
    let half_life = snapshot.half_life.expect("pairs mode always reports half-life state");
    assert!(half_life.is_available(), "{:?}", half_life);
    let periods = half_life.periods().unwrap();
    // Discrete OU with 30% reversion per tick: -ln2 / ln(0.7) is about 1.94
    assert!(periods > 0.5 && periods < 10.0, "half-life {}", periods);
    assert!(half_life.beta().unwrap() < 0.0);
}

#[test]
fn test_pairs_window_bounds_enforced() {
    assert!(SignalEngine::<PairPrice>::new(EngineConfig::default().with_window(9)).is_err());
    assert!(SignalEngine::<PairPrice>::new(EngineConfig::default().with_window(61)).is_err());
    assert!(SignalEngine::<SinglePrice>::new(EngineConfig::default().with_window(9)).is_ok());
}

// ============================================================================
// Classifier thresholds
// ============================================================================

#[test]
fn test_classifier_threshold_table() {
    let classifier = SignalClassifier::new(SignalThresholds::default(), Mode::Single);

    let cases = [
        (Some(2.5), SignalType::Sell, SignalState::Directional),
        (Some(2.0), SignalType::Hold, SignalState::Neutral),
        (Some(0.0), SignalType::Hold, SignalState::Neutral),
        (Some(-2.0), SignalType::Hold, SignalState::Neutral),
        (Some(-2.0001), SignalType::Buy, SignalState::Directional),
        (None, SignalType::Hold, SignalState::InsufficientData),
        (Some(f64::NAN), SignalType::Hold, SignalState::InsufficientData),
    ];

    for (z, signal_type, state) in cases {
        let signal = classifier.classify(z);
        assert_eq!(signal.signal_type, signal_type, "z = {:?}", z);
        assert_eq!(signal.state, state, "z = {:?}", z);
    }
}

// ============================================================================
// Monitor and export
// ============================================================================

#[tokio::test]
async fn test_monitor_to_csv_export() {
    let feed = ScriptedFeed::new()
        .with_quotes((0..6).map(|k| SinglePrice::new(zigzag(k))))
        .with_error(FeedError::RestError("503 Service Unavailable".into()))
        .with_quotes((6..10).map(|k| SinglePrice::new(zigzag(k))));
    let config = EngineConfig::default().with_window(5).with_max_points(50);
    let monitor = Monitor::new(config, feed)
        .unwrap()
        .with_poll_interval(std::time::Duration::from_millis(1))
        .with_max_ticks(Some(11));

    let mut errors = 0;
    let snapshot = monitor
        .run_with(|outcome| {
            if let TickOutcome::FeedError { .. } = outcome {
                errors += 1;
            }
        })
        .await;

    assert_eq!(errors, 1);
    assert_eq!(snapshot.len(), 10);
    assert_eq!(monitor.status().await.feed_errors, 1);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.csv");
    let written = CsvExporter::new(&path)
        .export(snapshot.mode, &snapshot.export_rows())
        .unwrap();
    assert_eq!(written, 10);

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "timestamp,price,zscore");
    assert_eq!(lines.len(), 11);
    // Warm-up rows carry an empty z-score cell
    assert!(lines[1].ends_with(",100,"));
    assert!(!lines[10].ends_with(','));
}
