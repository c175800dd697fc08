//! Strategy Layer - Rolling Statistics, Spread and Signal Generation
//!
//! Streaming statistics engine for single-instrument and pairs trading:
//! - Bounded FIFO series of timestamped observations
//! - Rolling mean / sample standard deviation / z-score over a trailing window
//! - Pairs spread and spread z-score
//! - Mean-reversion half-life from a one-lag autoregression
//! - Threshold classifier producing BUY / SELL / HOLD
//!
//! `SignalEngine` ties these together behind `ingest` / `snapshot` / `export_rows`.

pub mod params;
pub mod series;
pub mod rolling;
pub mod spread;
pub mod half_life;
pub mod classifier;
pub mod engine;

pub use params::{EngineConfig, SignalThresholds, ConfigError};
pub use series::SeriesBuffer;
pub use rolling::RollingStats;
pub use spread::{SpreadEngine, SpreadSeries};
pub use half_life::{HalfLife, HalfLifeEstimator, HalfLifeUnavailable};
pub use classifier::SignalClassifier;
pub use engine::{SignalEngine, Snapshot, SeriesPoint, ExportRow};
