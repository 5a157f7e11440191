//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     pattern string + RouteOptions + action
//!     → pattern.rs (compile, reject malformed patterns)
//!     → handler.rs (RouteHandler)
//!     → registry.rs (assign id, insert by priority)
//!
//! Incoming URL:
//!     → request.rs (parse into RoutingRequest)
//!     → registry.rs (snapshot, iterate by priority)
//!     → handler.rs (scheme filter, fulfill, run action)
//!     → first action returning true wins
//! ```
//!
//! # Design Decisions
//! - Deterministic: same registrations and URL always try the same routes
//! - First successful handler wins (ordered by priority, then insertion)
//! - Patterns are compiled once; matching is a linear walk over segments

pub mod handler;
pub mod pattern;
pub mod registry;
pub mod request;

pub use handler::{RouteAction, RouteHandler, RouteId, RouteInfo, RouteOptions, DEFAULT_PRIORITY};
pub use pattern::{PatternError, RouteComponent, RoutePattern};
pub use registry::{BatchError, RegistrySettings, RouteRegistry};
pub use request::{RequestError, RoutingRequest};
