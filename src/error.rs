//! Error type shared by the reloading, builder and source subsystems.

use std::path::PathBuf;

use crate::settings::validation::ValidationError;

/// Errors raised while detecting changes, building configurations or
/// loading daemon settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A constructor or setter received an unusable argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A reloading detector could not inspect its monitored resource.
    #[error("failed to inspect {}: {source}", .path.display())]
    Detector {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading a file failed.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A builder's construction logic failed.
    #[error("failed to create configuration: {0}")]
    Construction(String),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// The file-system watcher could not be set up.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    /// A background task needs a tokio runtime that is not available.
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
