//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! controller, builders, triggers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters for checks, reload events, builder events)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Library code only emits; the daemon decides where output goes
//! - Metrics are cheap (no-ops until a recorder is installed)

pub mod logging;
pub mod metrics;
