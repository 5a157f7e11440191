//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build registry → Install configured routes
//!
//! Reload:
//!     watcher change or SIGHUP → load config → ConfiguredRoutes::apply
//!
//! Shutdown (shutdown.rs):
//!     Signal received or input exhausted → stop reading URLs → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: logging first, then config, then routes
//! - A reload that fails validation keeps the running routes

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::{SignalEvent, Signals};
pub use startup::{ConfiguredRoutes, MatchReport, ReportSink, StdoutSink};
