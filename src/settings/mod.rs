//! Settings of the `reload-watch` daemon.
//!
//! # Data Flow
//! ```text
//! settings file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DaemonSettings (validated, immutable)
//!     → lifecycle::startup wires triggers and builders from it
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an empty or missing file is usable
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::DaemonSettings;
pub use schema::ObservabilitySettings;
pub use schema::WatchSettings;
