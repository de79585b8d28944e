//! Builder events.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ConfigError;

/// Category of a builder event.
///
/// `Any` is the parent of every other category: a listener registered for
/// `Any` receives all events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuilderEventType {
    Any,
    /// Fired at the start of every `get_configuration` call.
    ConfigurationRequest,
    /// Fired on every `reset_result` call.
    Reset,
    /// Fired once per newly constructed result.
    ResultCreated,
}

impl BuilderEventType {
    /// True if a listener registered for `self` receives events of type `other`.
    pub fn accepts(self, other: BuilderEventType) -> bool {
        self == BuilderEventType::Any || self == other
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuilderEventType::Any => "any",
            BuilderEventType::ConfigurationRequest => "configuration_request",
            BuilderEventType::Reset => "reset",
            BuilderEventType::ResultCreated => "result_created",
        }
    }
}

impl fmt::Display for BuilderEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process-unique identity of a builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuilderId(u64);

impl BuilderId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BuilderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "builder-{}", self.0)
    }
}

/// Notification sent by a builder to its listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurationBuilderEvent {
    pub event_type: BuilderEventType,
    pub source: BuilderId,
}

/// Subscriber to builder events.
pub trait BuilderListener: Send + Sync {
    fn on_event(&self, event: &ConfigurationBuilderEvent) -> Result<(), ConfigError>;
}
