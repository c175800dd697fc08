//! CLI Adapter
//!
//! Command-line interface for the gemscap monitor.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CliApp, Command, ConfigCmd, ModeArg, PairArg, RunCmd, DEFAULT_CONFIG_PATH};

/// Initialize the CLI application
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}
