//! Price Monitor
//!
//! Drives a `SignalEngine` from a `PriceFeed`: fetch, ingest, snapshot,
//! sleep. Ingest and snapshot happen under one lock so every published
//! snapshot matches the buffer it was computed from.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{Mode, Observation, Quote, Signal};
use crate::ports::PriceFeed;
use crate::strategy::{ConfigError, EngineConfig, HalfLife, HalfLifeUnavailable, SignalEngine, Snapshot};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

/// Result of one fetch/ingest cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome<Q> {
    /// Quote accepted; snapshot reflects it
    Ingested { snapshot: Snapshot<Q> },
    /// Feed returned a quote the engine refused; previous snapshot
    Dropped { snapshot: Snapshot<Q> },
    /// Fetch failed; previous snapshot
    FeedError { error: String, snapshot: Snapshot<Q> },
}

impl<Q> TickOutcome<Q> {
    pub fn snapshot(&self) -> &Snapshot<Q> {
        match self {
            TickOutcome::Ingested { snapshot }
            | TickOutcome::Dropped { snapshot }
            | TickOutcome::FeedError { snapshot, .. } => snapshot,
        }
    }

    pub fn is_ingested(&self) -> bool {
        matches!(self, TickOutcome::Ingested { .. })
    }
}

/// Status of the monitor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorStatus {
    pub is_running: bool,
    pub ticks: u64,
    pub feed_errors: u64,
    pub observations: usize,
    pub latest_z_score: Option<f64>,
    pub signal: Signal,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    ticks: u64,
    feed_errors: u64,
}

/// Polling loop around one engine and one feed
pub struct Monitor<F: PriceFeed> {
    engine: Arc<Mutex<SignalEngine<F::Quote>>>,
    feed: Arc<F>,
    is_running: Arc<RwLock<bool>>,
    stop_requested: Arc<RwLock<bool>>,
    counters: Arc<RwLock<Counters>>,
    poll_interval: Duration,
    max_ticks: Option<u64>,
}

impl<F: PriceFeed> Monitor<F> {
    /// Create a monitor; the engine config is validated for the feed's mode
    pub fn new(config: EngineConfig, feed: F) -> Result<Self, MonitorError> {
        let engine = SignalEngine::new(config)?;

        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
            feed: Arc::new(feed),
            is_running: Arc::new(RwLock::new(false)),
            stop_requested: Arc::new(RwLock::new(false)),
            counters: Arc::new(RwLock::new(Counters::default())),
            poll_interval: Duration::from_secs(1),
            max_ticks: None,
        })
    }

    /// Set custom poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Stop after this many ticks
    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    /// Run until stopped or the tick limit is reached, handing every
    /// outcome to `on_tick`. Returns the final snapshot.
    ///
    /// A stop requested before the loop starts is honoured: no tick runs.
    pub async fn run_with<H>(&self, mut on_tick: H) -> Snapshot<F::Quote>
    where
        H: FnMut(&TickOutcome<F::Quote>),
    {
        if *self.stop_requested.read().await {
            tracing::info!("Stop already requested - monitor not started");
            return self.snapshot().await;
        }
        *self.is_running.write().await = true;

        let mode = <F::Quote as Quote>::MODE;
        tracing::info!(
            feed = %self.feed.describe(),
            mode = %mode,
            "Starting monitor - Poll interval: {:?}, Tick limit: {:?}",
            self.poll_interval,
            self.max_ticks
        );

        while !*self.stop_requested.read().await {
            let outcome = self.tick().await;
            on_tick(&outcome);

            if self.limit_reached().await {
                tracing::info!("Tick limit reached");
                break;
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        *self.is_running.write().await = false;
        tracing::info!("Monitor stopped");
        self.snapshot().await
    }

    /// Execute one fetch/ingest cycle
    pub async fn tick(&self) -> TickOutcome<F::Quote> {
        let fetched = self.feed.fetch().await;

        let mut engine = self.engine.lock().await;
        let outcome = match fetched {
            Ok(quote) => {
                let before = engine.ingested();
                engine.ingest(Observation::now(quote));
                let snapshot = engine.snapshot();
                if engine.ingested() > before {
                    TickOutcome::Ingested { snapshot }
                } else {
                    TickOutcome::Dropped { snapshot }
                }
            }
            Err(error) => {
                tracing::warn!(feed = %self.feed.describe(), "Fetch failed: {}", error);
                TickOutcome::FeedError {
                    error: error.to_string(),
                    snapshot: engine.snapshot(),
                }
            }
        };
        drop(engine);

        let mut counters = self.counters.write().await;
        counters.ticks += 1;
        if matches!(outcome, TickOutcome::FeedError { .. }) {
            counters.feed_errors += 1;
        }

        outcome
    }

    /// Stop the polling loop, or keep it from starting
    pub async fn stop(&self) {
        *self.stop_requested.write().await = true;
        *self.is_running.write().await = false;
        tracing::info!("Stop signal sent to monitor");
    }

    /// Current engine snapshot
    pub async fn snapshot(&self) -> Snapshot<F::Quote> {
        self.engine.lock().await.snapshot()
    }

    /// Get current status
    pub async fn status(&self) -> MonitorStatus {
        let counters = *self.counters.read().await;
        let engine = self.engine.lock().await;
        let snapshot = engine.latest_snapshot();

        MonitorStatus {
            is_running: *self.is_running.read().await,
            ticks: counters.ticks,
            feed_errors: counters.feed_errors,
            observations: engine.len(),
            latest_z_score: snapshot.latest_z_score,
            signal: snapshot.signal.clone(),
        }
    }

    async fn limit_reached(&self) -> bool {
        match self.max_ticks {
            Some(limit) => self.counters.read().await.ticks >= limit,
            None => false,
        }
    }
}

impl<F: PriceFeed> Clone for Monitor<F> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            feed: Arc::clone(&self.feed),
            is_running: Arc::clone(&self.is_running),
            stop_requested: Arc::clone(&self.stop_requested),
            counters: Arc::clone(&self.counters),
            poll_interval: self.poll_interval,
            max_ticks: self.max_ticks,
        }
    }
}

/// One terminal line for a snapshot:
/// `BTCUSDT | price 64000.5000 | return +0.0125% | z 1.234 | HOLD`
pub fn render_line<Q>(label: &str, snapshot: &Snapshot<Q>) -> String {
    let value_name = match snapshot.mode {
        Mode::Single => "price",
        Mode::Pairs => "spread",
    };

    let mut line = format!(
        "{} | {} {} | return {} | z {}",
        label,
        value_name,
        fmt_opt(snapshot.latest_value, |v| format!("{:.4}", v)),
        fmt_opt(snapshot.latest_return, |r| format!("{:+.4}%", r * 100.0)),
        fmt_opt(snapshot.latest_z_score, |z| format!("{:.3}", z)),
    );

    if let Some(half_life) = &snapshot.half_life {
        line.push_str(" | half-life ");
        line.push_str(&render_half_life(half_life));
    }

    line.push_str(" | ");
    line.push_str(snapshot.signal.label());
    line
}

/// Half-life in ticks, or why it is unavailable
pub fn render_half_life(half_life: &HalfLife) -> String {
    match half_life {
        HalfLife::Estimated { periods, .. } => format!("{:.2} ticks", periods),
        HalfLife::Unavailable(HalfLifeUnavailable::InsufficientSamples { samples, required }) => {
            format!("n/a ({}/{} samples)", samples, required)
        }
        HalfLife::Unavailable(HalfLifeUnavailable::NonMeanReverting { .. }) => {
            "n/a (not mean-reverting)".to_string()
        }
        HalfLife::Unavailable(HalfLifeUnavailable::Degenerate) => "n/a (flat spread)".to_string(),
    }
}

fn fmt_opt<T: Copy>(value: Option<T>, f: impl Fn(T) -> String) -> String {
    value.map(f).unwrap_or_else(|| "n/a".to_string())
}
