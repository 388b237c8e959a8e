mod charts;
mod config;
mod i18n;
mod models;
mod run;
mod session;
mod stats;
mod storage;
mod store;
mod ui;

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use config::Config;
use session::Session;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = Config::from_env().context("Invalid configuration")?;
    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "Failed to create data directory: {}",
            config.data_dir.display()
        )
    })?;

    let interactive = args.len() == 1;
    init_tracing(&config, interactive)?;
    tracing::debug!(
        data_dir = %config.data_dir.display(),
        remote = config.remote.is_some(),
        "starting"
    );

    let mut session = Session::open(config)?;
    if interactive {
        run::as_tui(session)
    } else {
        run::as_cli(&args, &mut session)
    }
}

/// The TUI owns the terminal, so it logs to a file; the CLI logs to stderr.
/// `RUST_LOG` overrides the default level either way.
fn init_tracing(config: &Config, interactive: bool) -> Result<()> {
    let default_level = if interactive { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if interactive {
        let path = config.log_path();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}
