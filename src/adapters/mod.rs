//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Market Data: Binance spot ticker and seeded simulated feeds
//! - Export: CSV writer for engine export rows
//! - CLI: Command-line interface definitions

pub mod cli;
pub mod export;
pub mod market_data;

pub use cli::CliApp;
pub use export::CsvExporter;
pub use market_data::{BinancePairFeed, BinancePriceClient, BinanceSingleFeed, SimulatedPairFeed, SimulatedPriceFeed};
