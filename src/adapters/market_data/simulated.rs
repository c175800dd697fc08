//! Simulated Feeds
//!
//! Seeded offline price sources for demos and tests without network access:
//! - `SimulatedPriceFeed`: multiplicative random walk
//! - `SimulatedPairFeed`: random-walk `x` leg plus a mean-reverting spread

use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{PairPrice, SinglePrice};
use crate::ports::{check_price, FeedError, PriceFeed};

/// Random-walk single price
#[derive(Debug)]
pub struct SimulatedPriceFeed {
    state: Mutex<WalkState>,
    volatility: f64,
}

#[derive(Debug)]
struct WalkState {
    rng: StdRng,
    price: f64,
}

impl SimulatedPriceFeed {
    /// `volatility` is the maximum relative move per tick
    pub fn new(seed: u64, start_price: f64, volatility: f64) -> Self {
        Self {
            state: Mutex::new(WalkState {
                rng: StdRng::seed_from_u64(seed),
                price: start_price,
            }),
            volatility: volatility.abs(),
        }
    }
}

#[async_trait]
impl PriceFeed for SimulatedPriceFeed {
    type Quote = SinglePrice;

    async fn fetch(&self) -> Result<SinglePrice, FeedError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let current = state.price;
        let shock = if self.volatility > 0.0 {
            state.rng.gen_range(-self.volatility..self.volatility)
        } else {
            0.0
        };
        state.price = current * (1.0 + shock);
        check_price("SIM", current).map(SinglePrice::new)
    }

    fn describe(&self) -> String {
        "simulated random walk".to_string()
    }
}

/// Pair with an Ornstein-Uhlenbeck spread: `y = x + s`,
/// `s(t+1) = s(t) + reversion * (mean_spread - s(t)) + noise`
#[derive(Debug)]
pub struct SimulatedPairFeed {
    state: Mutex<PairState>,
    mean_spread: f64,
    reversion: f64,
    spread_noise: f64,
    x_volatility: f64,
}

#[derive(Debug)]
struct PairState {
    rng: StdRng,
    x: f64,
    spread: f64,
}

impl SimulatedPairFeed {
    pub fn new(seed: u64, start_x: f64, mean_spread: f64, reversion: f64) -> Self {
        Self {
            state: Mutex::new(PairState {
                rng: StdRng::seed_from_u64(seed),
                x: start_x,
                spread: mean_spread,
            }),
            mean_spread,
            reversion: reversion.clamp(0.0, 1.0),
            spread_noise: (mean_spread.abs() * 0.05).max(0.01),
            x_volatility: 0.001,
        }
    }
}

#[async_trait]
impl PriceFeed for SimulatedPairFeed {
    type Quote = PairPrice;

    async fn fetch(&self) -> Result<PairPrice, FeedError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let quote = PairPrice::new(state.x + state.spread, state.x);

        let x_shock = state.rng.gen_range(-self.x_volatility..self.x_volatility);
        let noise = state.rng.gen_range(-self.spread_noise..self.spread_noise);
        state.x *= 1.0 + x_shock;
        state.spread += self.reversion * (self.mean_spread - state.spread) + noise;

        check_price("SIM-Y", quote.y)?;
        check_price("SIM-X", quote.x)?;
        Ok(quote)
    }

    fn describe(&self) -> String {
        "simulated pair".to_string()
    }
}
