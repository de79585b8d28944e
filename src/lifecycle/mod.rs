//! Lifecycle management for the `reload-watch` daemon.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Settings → file builder + controller → triggers (timer, fs events)
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → stop triggers → exit
//!     SIGHUP → immediate reload check
//!
//! Shutdown (shutdown.rs):
//!     broadcast to every background task
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Triggers stop before the builder is dropped

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
