mod cli;
mod config;
mod deps;
mod error;
mod manager;
mod platform;
mod runner;

use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use cli::Cli;
use config::LOG_FILE;

fn init_tracing(config_dir: &Path, verbose: bool) {
    let default_level = if verbose { "esim_tools=debug" } else { "esim_tools=info" };

    let console_layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        );

    let log_path = config_dir.join(LOG_FILE);
    let (file_layer, open_error) =
        match OpenOptions::new().create(true).append(true).open(&log_path) {
            Ok(file) => {
                let layer = tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(EnvFilter::new("esim_tools=debug"));
                (Some(layer), None)
            }
            Err(e) => (None, Some(e)),
        };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some(e) = open_error {
        tracing::warn!("Could not open log file {}: {}", log_path.display(), e);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.config_dir, cli.verbose);

    match cli.execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {}", e);
            eprintln!("{} {}", style("✗").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
