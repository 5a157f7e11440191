//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry / config / lifecycle produce:
//!     → logging.rs (structured log events on stderr)
//!     → metrics.rs (counters, gauges)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through dispatch log events
//! - Metrics are cheap (facade calls, no-op without a recorder)

pub mod logging;
pub mod metrics;
