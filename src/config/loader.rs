//! Configuration Loader
//!
//! Loads the TOML configuration file and layers environment overrides on
//! top with the `config` crate:
//!
//! | Variable              | Key                         |
//! |-----------------------|-----------------------------|
//! | `MAX_POINTS`          | `engine.max_points`         |
//! | `WINDOW`              | `engine.window`             |
//! | `REFRESH_INTERVAL_MS` | `feed.refresh_interval_ms`  |
//! | `BINANCE_API_URL`     | `feed.api_url`              |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapters::market_data::BINANCE_API_URL;
use crate::domain::Mode;
use crate::strategy::{ConfigError, EngineConfig};

/// Environment variables mapped onto configuration keys
pub const ENV_OVERRIDES: [(&str, &str); 4] = [
    ("MAX_POINTS", "engine.max_points"),
    ("WINDOW", "engine.window"),
    ("REFRESH_INTERVAL_MS", "feed.refresh_interval_ms"),
    ("BINANCE_API_URL", "feed.api_url"),
];

/// Main configuration structure matching gemscap.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub feed: FeedSection,
    pub export: ExportSection,
    pub logging: LoggingSection,
}

/// Where quotes come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    Binance,
    Simulated,
}

/// Price feed configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSection {
    /// "single" or "pairs"
    pub mode: Mode,
    /// "binance" or "simulated"
    pub source: FeedSource,
    /// Symbol for single mode
    pub symbol: String,
    /// High leg for pairs mode
    pub y_symbol: String,
    /// Low leg for pairs mode
    pub x_symbol: String,
    /// Binance REST base URL
    pub api_url: String,
    /// Milliseconds between ticks
    pub refresh_interval_ms: u64,
    /// HTTP timeout in milliseconds
    pub timeout_ms: u64,
    /// Seed for the simulated feed
    pub seed: u64,
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            mode: Mode::Single,
            source: FeedSource::Binance,
            symbol: "BTCUSDT".to_string(),
            y_symbol: "BTCUSDT".to_string(),
            x_symbol: "BTCUSDC".to_string(),
            api_url: BINANCE_API_URL.to_string(),
            refresh_interval_ms: 1000,
            timeout_ms: 5000,
            seed: 42,
        }
    }
}

impl FeedSection {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// CSV export configuration section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Write export rows here on shutdown (supports `~`)
    pub csv_path: Option<String>,
}

/// Logging configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),
    #[error("Invalid engine parameters: {0}")]
    Engine(#[from] ConfigError),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Failed to render TOML: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Load configuration from a TOML file with process environment overrides
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, LoaderError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with a custom environment lookup
pub fn load_config_with_env<P, F>(path: P, env: F) -> Result<Config, LoaderError>
where
    P: AsRef<Path>,
    F: Fn(&str) -> Option<String>,
{
    let path = path.as_ref();
    if !path.is_file() {
        return Err(LoaderError::NotFound(path.to_path_buf()));
    }

    let mut builder = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml));

    for (var, key) in ENV_OVERRIDES {
        let value = env(var).filter(|v| !v.trim().is_empty());
        if let Some(v) = &value {
            tracing::debug!(var, key, value = %v, "environment override");
        }
        builder = builder.set_override_option(key, value)?;
    }

    let config: Config = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Defaults with environment overrides only, for running without a file
    pub fn from_env() -> Result<Self, LoaderError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    pub fn from_env_with<F>(env: F) -> Result<Self, LoaderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder().add_source(config::Config::try_from(&Config::default())?);
        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(key, env(var).filter(|v| !v.trim().is_empty()))?;
        }
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), LoaderError> {
        self.engine.validate_for(self.feed.mode)?;

        if self.feed.refresh_interval_ms == 0 {
            return Err(LoaderError::ValidationError(
                "refresh_interval_ms must be > 0".to_string(),
            ));
        }

        if self.feed.timeout_ms == 0 {
            return Err(LoaderError::ValidationError(
                "timeout_ms must be > 0".to_string(),
            ));
        }

        if self.feed.source == FeedSource::Binance {
            if self.feed.api_url.is_empty() {
                return Err(LoaderError::ValidationError(
                    "api_url cannot be empty".to_string(),
                ));
            }

            let symbols = match self.feed.mode {
                Mode::Single => vec![&self.feed.symbol],
                Mode::Pairs => vec![&self.feed.y_symbol, &self.feed.x_symbol],
            };
            if symbols.iter().any(|s| s.trim().is_empty()) {
                return Err(LoaderError::ValidationError(format!(
                    "symbols cannot be empty for {} mode",
                    self.feed.mode
                )));
            }
        }

        if self.feed.mode == Mode::Pairs && self.feed.y_symbol == self.feed.x_symbol {
            return Err(LoaderError::ValidationError(format!(
                "pairs legs must differ, both are {}",
                self.feed.y_symbol
            )));
        }

        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml_string(&self) -> Result<String, LoaderError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
