//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement:
//! - Price feeds (single price or a pair of prices per tick)

pub mod market_data;
pub mod mocks;

pub use market_data::{check_price, FeedError, PriceFeed};
pub use mocks::ScriptedFeed;
