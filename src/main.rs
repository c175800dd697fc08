//! Gemscap - rolling z-score and pairs spread monitor
//!
//! Polls spot prices, keeps a bounded history and prints BUY/SELL/HOLD
//! signals for a single instrument or a pair.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use gemscap_quant::adapters::cli::{self, Command, ConfigCmd, RunCmd, DEFAULT_CONFIG_PATH};
use gemscap_quant::adapters::export::CsvExporter;
use gemscap_quant::adapters::market_data::{
    BinancePairFeed, BinancePriceClient, BinanceSingleFeed, SimulatedPairFeed, SimulatedPriceFeed,
};
use gemscap_quant::application::{render_line, Monitor, TickOutcome};
use gemscap_quant::config::{load_config, Config, FeedSource, LoaderError};
use gemscap_quant::domain::Mode;
use gemscap_quant::ports::PriceFeed;

/// Starting price of the simulated single feed
const SIM_START_PRICE: f64 = 100.0;
/// Maximum relative move per simulated tick
const SIM_VOLATILITY: f64 = 0.002;
/// Mean spread and per-tick reversion of the simulated pair
const SIM_MEAN_SPREAD: f64 = 1.0;
const SIM_REVERSION: f64 = 0.2;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let app = cli::init();

    match app.command {
        Command::Run(cmd) => {
            let (config, defaulted) = load_or_default(&cmd.config)?;
            init_logging(app.verbose, app.debug, &config.logging.level)?;
            if defaulted {
                tracing::warn!("Config file {} not found - using defaults", cmd.config.display());
            }
            run_command(cmd, config).await
        }
        Command::Config(ConfigCmd::Show { config }) => {
            let (config, _) = load_or_default(&config)?;
            init_logging(app.verbose, app.debug, &config.logging.level)?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

/// Log level priority: `--debug`, `--verbose`, `RUST_LOG`, then `[logging].level`
fn init_logging(verbose: bool, debug: bool, configured: &str) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Load the config file; a missing file at the default path falls back to
/// defaults plus environment overrides.
fn load_or_default(path: &Path) -> Result<(Config, bool)> {
    match load_config(path) {
        Ok(config) => Ok((config, false)),
        Err(LoaderError::NotFound(_)) if path == Path::new(DEFAULT_CONFIG_PATH) => {
            let config = Config::from_env().context("Failed to build default configuration")?;
            Ok((config, true))
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load configuration from {}", path.display())),
    }
}

async fn run_command(cmd: RunCmd, mut config: Config) -> Result<()> {
    cmd.apply(&mut config);
    config.validate().context("Invalid configuration after command-line overrides")?;

    tracing::info!(
        "Starting gemscap - mode: {}, source: {:?}, window: {}, max points: {}",
        config.feed.mode,
        config.feed.source,
        config.engine.window,
        config.engine.max_points
    );

    let feed = &config.feed;
    match (feed.mode, feed.source) {
        (Mode::Single, FeedSource::Binance) => {
            let client = BinancePriceClient::new(feed.api_url.clone(), feed.timeout())
                .context("Failed to create Binance client")?;
            run_monitor(BinanceSingleFeed::new(client, feed.symbol.clone()), &config, &cmd).await
        }
        (Mode::Pairs, FeedSource::Binance) => {
            let client = BinancePriceClient::new(feed.api_url.clone(), feed.timeout())
                .context("Failed to create Binance client")?;
            let pair = BinancePairFeed::new(client, feed.y_symbol.clone(), feed.x_symbol.clone());
            run_monitor(pair, &config, &cmd).await
        }
        (Mode::Single, FeedSource::Simulated) => {
            let sim = SimulatedPriceFeed::new(feed.seed, SIM_START_PRICE, SIM_VOLATILITY);
            run_monitor(sim, &config, &cmd).await
        }
        (Mode::Pairs, FeedSource::Simulated) => {
            let sim = SimulatedPairFeed::new(feed.seed, SIM_START_PRICE, SIM_MEAN_SPREAD, SIM_REVERSION);
            run_monitor(sim, &config, &cmd).await
        }
    }
}

async fn run_monitor<F>(feed: F, config: &Config, cmd: &RunCmd) -> Result<()>
where
    F: PriceFeed + 'static,
{
    let monitor = Monitor::new(config.engine.clone(), feed)
        .context("Failed to create monitor")?
        .with_poll_interval(config.feed.refresh_interval())
        .with_max_ticks(cmd.ticks);

    // Setup Ctrl+C handler
    let handle = monitor.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        handle.stop().await;
    });

    let label = monitor.feed().describe();
    let json = cmd.json;
    let snapshot = monitor
        .run_with(|outcome| print_tick(&label, outcome, json))
        .await;

    let status = monitor.status().await;
    tracing::info!(
        "Monitor finished - ticks: {}, feed errors: {}, observations: {}",
        status.ticks,
        status.feed_errors,
        status.observations
    );

    if let Some(path) = &config.export.csv_path {
        let path = shellexpand::tilde(path).to_string();
        let rows = snapshot.export_rows();
        CsvExporter::new(&path)
            .export(snapshot.mode, &rows)
            .with_context(|| format!("Failed to export CSV to {}", path))?;
        println!("Exported {} rows to {}", rows.len(), path);
    }

    Ok(())
}

fn print_tick<Q: serde::Serialize>(label: &str, outcome: &TickOutcome<Q>, json: bool) {
    if json {
        match serde_json::to_string(outcome) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!("Failed to serialize tick: {}", e),
        }
        return;
    }

    if let TickOutcome::Ingested { snapshot } = outcome {
        println!("{}", render_line(label, snapshot));
    }
}
