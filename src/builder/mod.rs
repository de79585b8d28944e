//! Configuration builders.
//!
//! # Data Flow
//! ```text
//! get_configuration()
//!     → ConfigurationRequest event
//!     → cached result? return it
//!     → otherwise ResultFactory::create_result() → cache → ResultCreated event
//!
//! reset_result()
//!     → drop cached result → Reset event
//!
//! support.rs bridges a ReloadingController to a builder:
//!     reload detected → builder.reset_result()
//!     ResultCreated   → controller.reset_reloading_state()
//! ```
//!
//! # Design Decisions
//! - Results are shared as `Arc<T>`; identity tells callers whether they
//!   hold a stale instance
//! - Events fire after the builder's lock is released so listeners may call
//!   back into the builder

use std::sync::Arc;

use crate::error::ConfigError;

pub mod basic;
pub mod event;
pub mod file;
pub mod support;

pub use basic::{BasicConfigurationBuilder, ResultFactory};
pub use event::{BuilderEventType, BuilderId, BuilderListener, ConfigurationBuilderEvent};
pub use file::{FileSnapshot, ReloadingFileBasedBuilder};
pub use support::ReloadingBuilderSupportListener;

/// Produces and caches a configuration object.
pub trait ConfigurationBuilder: Send + Sync {
    type Output: Send + Sync;

    /// The identity carried as `source` in this builder's events.
    fn id(&self) -> BuilderId;

    /// Return the cached result, constructing it first if necessary.
    fn get_configuration(&self) -> Result<Arc<Self::Output>, ConfigError>;

    /// Discard the cached result so the next `get_configuration` rebuilds.
    fn reset_result(&self) -> Result<(), ConfigError>;

    /// Register `listener` for events of `event_type`. Idempotent.
    fn add_event_listener(&self, event_type: BuilderEventType, listener: Arc<dyn BuilderListener>)
        -> bool;

    /// Remove a registration made with the same `event_type`. Idempotent.
    fn remove_event_listener(
        &self,
        event_type: BuilderEventType,
        listener: &Arc<dyn BuilderListener>,
    ) -> bool;
}
