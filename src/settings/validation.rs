//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DaemonSettings → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use crate::settings::schema::DaemonSettings;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check `settings`, collecting every problem found.
pub fn validate_settings(settings: &DaemonSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.watch.path.as_os_str().is_empty() {
        errors.push(ValidationError::new("watch.path", "must not be empty"));
    }
    if settings.watch.poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "watch.poll_interval_ms",
            "must be greater than zero",
        ));
    }

    let level = settings.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", settings.observability.log_level),
        ));
    }
    if settings.observability.metrics_enabled
        && settings.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", settings.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_settings(&DaemonSettings::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut settings = DaemonSettings::default();
        settings.watch.path = PathBuf::new();
        settings.watch.poll_interval_ms = 0;
        settings.observability.log_level = "loud".into();
        settings.observability.metrics_enabled = true;
        settings.observability.metrics_address = "nowhere".into();

        let errors = validate_settings(&settings).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "watch.path",
                "watch.poll_interval_ms",
                "observability.log_level",
                "observability.metrics_address",
            ]
        );
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut settings = DaemonSettings::default();
        settings.observability.metrics_address = "nowhere".into();
        assert!(validate_settings(&settings).is_ok());
    }
}
