//! Reload-aware configuration builders.
//!
//! A [`ReloadingController`](reloading::ReloadingController) asks a
//! [`ReloadingDetector`](reloading::ReloadingDetector) whether a configuration
//! source changed; a [`ReloadingBuilderSupportListener`](builder::ReloadingBuilderSupportListener)
//! resets the connected builder on change and re-arms the controller once the
//! builder has produced a fresh result.

pub mod builder;
pub mod error;
pub mod lifecycle;
pub mod listeners;
pub mod observability;
pub mod reloading;
pub mod settings;
pub mod source;

pub use builder::{BasicConfigurationBuilder, ConfigurationBuilder, ReloadingBuilderSupportListener};
pub use error::ConfigError;
pub use reloading::{ReloadingController, ReloadingDetector, ReloadingListener};
