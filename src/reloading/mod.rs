//! Reload detection subsystem.
//!
//! # Data Flow
//! ```text
//! trigger.rs (interval) / watcher.rs (fs events) / SIGHUP
//!     → controller.check_for_reloading()
//!     → detector.is_reloading_required()
//!     → ReloadingListener::reloading_required() on every listener
//!
//! Later, once the consumer has rebuilt:
//!     → controller.reset_reloading_state()
//!     → detector.reloading_performed()
//! ```
//!
//! # Design Decisions
//! - Detection and acknowledgement are separate calls
//! - Listeners are notified outside the controller's lock

pub mod controller;
pub mod detector;
pub mod trigger;
pub mod watcher;

pub use controller::{ReloadingController, ReloadingEvent, ReloadingListener};
pub use detector::{FileModifiedDetector, ReloadingDetector};
pub use trigger::PeriodicReloadingTrigger;
pub use watcher::FileChangeTrigger;
