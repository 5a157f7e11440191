//! URL routing library.
//!
//! Register route patterns (`profile/:id`, `docs/*`) with an optional scheme
//! filter and a priority, then dispatch URLs to them. Routes are tried from
//! the highest priority down until one action reports the URL handled.
//!
//! ```
//! use url_router::routing::{RouteRegistry, RoutingRequest};
//!
//! let registry = RouteRegistry::default();
//! registry
//!     .register_for_scheme("profile/:id", "myapp", |req: &RoutingRequest| {
//!         req.parameter("id") == Some("42")
//!     })
//!     .unwrap();
//!
//! assert!(registry.route_url("myapp://profile/42"));
//! assert!(!registry.route_url("other://profile/42"));
//! ```

pub mod config;
pub mod events;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::RouterConfig;
pub use events::{UrlEventHub, UrlEventListener};
pub use routing::{RouteId, RouteOptions, RouteRegistry, RoutingRequest};
