//! Settings loading from disk.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::settings::schema::DaemonSettings;
use crate::settings::validation::validate_settings;

/// Load and validate settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<DaemonSettings, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: DaemonSettings = toml::from_str(&content)?;

    validate_settings(&settings).map_err(ConfigError::Validation)?;

    Ok(settings)
}

/// Like [`load_settings`], but a missing file yields the defaults.
pub fn load_settings_or_default(path: &Path) -> Result<DaemonSettings, ConfigError> {
    if path.exists() {
        load_settings(path)
    } else {
        Ok(DaemonSettings::default())
    }
}
