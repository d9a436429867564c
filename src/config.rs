//! Command-line and environment configuration.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Customer churn predictor - interactive front-end for a pre-trained classifier
#[derive(Debug, Parser)]
#[command(name = "churn-predictor")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Directory holding model.msgpack, features.msgpack and optionally scaler.msgpack
    #[arg(long, env = "CHURN_ARTIFACTS_DIR", default_value = ".", global = true)]
    pub artifacts_dir: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Prompt for customer details and predict churn (default)
    Run,

    /// Write a demo logistic model and feature list into the artifact directory
    ExportDemo,
}

impl Config {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
