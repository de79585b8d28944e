//! Settings schema definitions.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root settings for the daemon.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DaemonSettings {
    /// Which file to watch and how often.
    pub watch: WatchSettings,

    /// Logging and metrics.
    pub observability: ObservabilitySettings,
}

/// Watched file and reload trigger settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchSettings {
    /// File whose changes trigger a rebuild.
    pub path: PathBuf,

    /// Interval of the periodic reload check in milliseconds.
    pub poll_interval_ms: u64,

    /// Minimum time between two stats of the watched file.
    pub refresh_delay_ms: u64,

    /// Also check on file-system events, not only on the timer.
    pub fs_events: bool,
}

impl WatchSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("config.toml"),
            poll_interval_ms: 2_000,
            refresh_delay_ms: 0,
            fs_events: true,
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilitySettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
