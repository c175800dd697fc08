//! Market Data Adapters
//!
//! Price sources implementing `PriceFeed`:
//! - `BinanceSingleFeed` / `BinancePairFeed`: Binance spot ticker over REST
//! - `SimulatedPriceFeed` / `SimulatedPairFeed`: seeded offline feeds

mod binance_price;
mod simulated;

pub use binance_price::{BinancePairFeed, BinancePriceClient, BinanceSingleFeed, BINANCE_API_URL};
pub use simulated::{SimulatedPairFeed, SimulatedPriceFeed};
