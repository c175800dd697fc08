//! CLI Command Definitions
//!
//! Arguments for the `gemscap` binary and how they override the loaded
//! configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{Config, FeedSource};
use crate::domain::Mode;

/// Default configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/gemscap.toml";

/// Gemscap Quant - rolling z-score and pairs spread monitor
#[derive(Parser, Debug)]
#[command(
    name = "gemscap",
    version = env!("CARGO_PKG_VERSION"),
    about = "Rolling z-score and pairs spread signal monitor",
    long_about = "Polls spot prices, keeps a bounded history, and reports rolling \
                  z-scores, spread half-life and BUY/SELL/HOLD signals for a single \
                  instrument or a pair."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the monitoring loop
    Run(RunCmd),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCmd),
}

/// Engine mode on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Single,
    Pairs,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Single => Mode::Single,
            ModeArg::Pairs => Mode::Pairs,
        }
    }
}

/// Pairs legs given as `Y,X`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairArg {
    pub y: String,
    pub x: String,
}

/// Parse `Y,X` into exactly two non-empty symbols
fn parse_pair(s: &str) -> Result<PairArg, String> {
    let legs: Vec<&str> = s.split(',').map(str::trim).collect();
    match legs.as_slice() {
        [y, x] if !y.is_empty() && !x.is_empty() => Ok(PairArg {
            y: (*y).to_string(),
            x: (*x).to_string(),
        }),
        _ => Err(format!("expected two symbols as Y,X, got '{}'", s)),
    }
}

/// Start monitoring loop
#[derive(Parser, Debug, Default)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override engine mode
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Use the seeded offline feed instead of Binance
    #[arg(long)]
    pub simulate: bool,

    /// Override rolling window
    #[arg(short, long, value_name = "POINTS")]
    pub window: Option<usize>,

    /// Override single-mode symbol
    #[arg(long, value_name = "SYMBOL")]
    pub symbol: Option<String>,

    /// Override pairs legs, e.g. `--pair ETHUSDT,BTCUSDT`
    #[arg(long, value_name = "Y,X", value_parser = parse_pair)]
    pub pair: Option<PairArg>,

    /// Stop after this many ticks
    #[arg(short, long, value_name = "N")]
    pub ticks: Option<u64>,

    /// Write the export rows to this CSV file on shutdown
    #[arg(long, value_name = "FILE")]
    pub export_csv: Option<String>,

    /// Print each tick as JSON instead of a text line
    #[arg(long)]
    pub json: bool,
}

impl RunCmd {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(mode) = self.mode {
            config.feed.mode = mode.into();
        }
        if self.simulate {
            config.feed.source = FeedSource::Simulated;
        }
        if let Some(window) = self.window {
            config.engine.window = window;
        }
        if let Some(symbol) = &self.symbol {
            config.feed.symbol = symbol.clone();
        }
        if let Some(pair) = &self.pair {
            config.feed.y_symbol = pair.y.clone();
            config.feed.x_symbol = pair.x.clone();
        }
        if let Some(path) = &self.export_csv {
            config.export.csv_path = Some(path.clone());
        }
    }
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Print the effective configuration as TOML
    Show {
        /// Path to configuration file
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}
