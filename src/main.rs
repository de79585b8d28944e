//! `reload-watch`: watches a configuration file and rebuilds it on change.
//!
//! # Architecture Overview
//!
//! ```text
//!   timer / fs events / SIGHUP
//!            │
//!            ▼
//!   ┌─────────────────────┐   reload event   ┌──────────────────────┐
//!   │ ReloadingController │ ───────────────▶ │ support listener     │
//!   │  + file detector    │ ◀─────────────── │ (bridge)             │
//!   └─────────────────────┘  reset state     └──────────┬───────────┘
//!                                                       │ reset / created
//!                                                       ▼
//!                                            ┌──────────────────────┐
//!            reader task ─ get_configuration ▶│ BasicConfiguration-  │
//!                                            │ Builder<FileSnapshot>│
//!                                            └──────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use config_reload::lifecycle::signals::{SignalAction, Signals};
use config_reload::lifecycle::startup::ReloadWatch;
use config_reload::observability::{logging, metrics};
use config_reload::settings::loader::load_settings_or_default;
use config_reload::settings::validation::validate_settings;
use config_reload::ConfigError;

#[derive(Parser)]
#[command(name = "reload-watch")]
#[command(about = "Watch a configuration file and rebuild it when it changes", long_about = None)]
struct Cli {
    /// Daemon settings file (TOML). Defaults apply if it does not exist.
    #[arg(short, long, default_value = "reload-watch.toml")]
    settings: PathBuf,

    /// File to watch, overriding `watch.path`.
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Log level, overriding `observability.log_level`.
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut settings = load_settings_or_default(&cli.settings)?;
    if let Some(path) = cli.path {
        settings.watch.path = path;
    }
    if let Some(level) = cli.log_level {
        settings.observability.log_level = level;
    }
    validate_settings(&settings).map_err(ConfigError::Validation)?;

    logging::init(&settings.observability.log_level);
    tracing::info!(settings = ?cli.settings, "reload-watch v0.1.0 starting");

    if settings.observability.metrics_enabled {
        if let Ok(addr) = settings.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %settings.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let watch = ReloadWatch::start(&settings.watch)?;
    let mut signals = Signals::new()?;

    loop {
        match signals.recv().await {
            SignalAction::Reload => {
                tracing::info!("SIGHUP received, checking for changes");
                match watch.check_now().await {
                    Ok(true) => tracing::info!("Reload performed"),
                    Ok(false) => tracing::info!("No change detected"),
                    Err(e) => tracing::warn!(error = %e, "Reload check failed"),
                }
            }
            SignalAction::Shutdown => break,
        }
    }

    tracing::info!("Shutdown signal received");
    watch.stop().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
