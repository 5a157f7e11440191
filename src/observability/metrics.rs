//! Metrics collection.
//!
//! # Metrics
//! - `router_routes_registered_total` (counter): successful registrations
//! - `router_routes_unregistered_total` (counter): removed routes
//! - `router_routes_active` (gauge): routes in the current snapshot
//! - `router_dispatch_total` (counter): dispatches by `outcome`
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the embedding application
//!   decides whether to install a recorder
//! - Without a recorder every call is a no-op

use metrics::{counter, gauge};

/// Result of a dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled,
    Unhandled,
    InvalidUrl,
}

impl DispatchOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            DispatchOutcome::Handled => "handled",
            DispatchOutcome::Unhandled => "unhandled",
            DispatchOutcome::InvalidUrl => "invalid_url",
        }
    }
}

pub fn record_registered() {
    counter!("router_routes_registered_total").increment(1);
}

pub fn record_unregistered(count: usize) {
    counter!("router_routes_unregistered_total").increment(count as u64);
}

pub fn set_active_routes(count: usize) {
    gauge!("router_routes_active").set(count as f64);
}

pub fn record_dispatch(outcome: DispatchOutcome) {
    counter!("router_dispatch_total", "outcome" => outcome.as_str()).increment(1);
}
