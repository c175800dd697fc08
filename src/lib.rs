//! Gemscap Quant - Streaming Statistics and Signal Engine
//!
//! Rolling z-scores for a single instrument and spread z-scores with
//! mean-reversion half-life for a pair, classified into BUY / SELL / HOLD.
//!
//! # Modules
//!
//! - `domain`: Observations, quotes and signals
//! - `ports`: Trait abstractions (PriceFeed) and test mocks
//! - `strategy`: Series buffer, rolling statistics, spread, half-life, classifier, engine
//! - `adapters`: External implementations (Binance, simulated feeds, CSV, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Polling monitor

pub mod domain;
pub mod ports;
pub mod strategy;
pub mod adapters;
pub mod config;
pub mod application;
