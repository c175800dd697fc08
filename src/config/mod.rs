//! Configuration Module
//!
//! Loads and validates configuration from TOML files with environment overrides.

pub mod loader;

pub use loader::{
    Config, ExportSection, FeedSection, FeedSource, LoaderError, LoggingSection,
    load_config, load_config_with_env, ENV_OVERRIDES,
};
