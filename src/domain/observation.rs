//! Observations and quotes
//!
//! An observation is one timestamped quote from the feed. The quote type
//! decides the engine mode: a single price drives single-instrument mode,
//! a `{y, x}` pair drives pairs mode.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Engine operating mode, carried by the quote type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One instrument, signals on its price
    Single,
    /// Two instruments, signals on their spread
    Pairs,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Single => write!(f, "single"),
            Mode::Pairs => write!(f, "pairs"),
        }
    }
}

/// A quote the engine can build statistics on
pub trait Quote: Clone + fmt::Debug + PartialEq + Serialize {
    /// Mode this quote type drives
    const MODE: Mode;

    /// Value the rolling statistics run on (price or spread)
    fn value(&self) -> f64;

    /// Price used for tick-to-tick returns
    fn reference_price(&self) -> f64;

    /// True when every leg is a finite, strictly positive price
    fn is_valid(&self) -> bool;
}

/// Single-instrument quote
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SinglePrice {
    pub price: f64,
}

impl SinglePrice {
    pub fn new(price: f64) -> Self {
        Self { price }
    }
}

impl Quote for SinglePrice {
    const MODE: Mode = Mode::Single;

    fn value(&self) -> f64 {
        self.price
    }

    fn reference_price(&self) -> f64 {
        self.price
    }

    fn is_valid(&self) -> bool {
        is_valid_price(self.price)
    }
}

/// Pairs quote: the `y` (high) leg and the `x` (low) leg sampled together
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairPrice {
    pub y: f64,
    pub x: f64,
}

impl PairPrice {
    pub fn new(y: f64, x: f64) -> Self {
        Self { y, x }
    }

    /// Spread between the legs: `y - x`
    pub fn spread(&self) -> f64 {
        self.y - self.x
    }
}

impl Quote for PairPrice {
    const MODE: Mode = Mode::Pairs;

    fn value(&self) -> f64 {
        self.spread()
    }

    /// Returns in pairs mode follow the `y` leg
    fn reference_price(&self) -> f64 {
        self.y
    }

    fn is_valid(&self) -> bool {
        is_valid_price(self.y) && is_valid_price(self.x)
    }
}

fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// One timestamped quote. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation<Q> {
    pub timestamp: DateTime<Utc>,
    pub quote: Q,
}

impl<Q: Quote> Observation<Q> {
    pub fn new(timestamp: DateTime<Utc>, quote: Q) -> Self {
        Self { timestamp, quote }
    }

    /// Observation stamped with the current wall-clock time
    pub fn now(quote: Q) -> Self {
        Self::new(Utc::now(), quote)
    }
}
