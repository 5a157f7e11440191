//! Route handlers.
//!
//! A handler couples a compiled pattern, an optional scheme filter and a
//! priority with the action to run when a request matches.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::routing::pattern::{PatternError, RoutePattern};
use crate::routing::request::RoutingRequest;

/// Priority used when none is given.
pub const DEFAULT_PRIORITY: i64 = 0;

/// Identifier assigned to a handler by a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RouteId(pub(crate) u64);

impl RouteId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Action invoked with a fulfilled request.
///
/// Returns true if the request was handled. Returning false lets dispatch
/// continue with lower-priority routes.
pub trait RouteAction: Send + Sync {
    fn handle(&self, request: &RoutingRequest) -> bool;
}

impl<F> RouteAction for F
where
    F: Fn(&RoutingRequest) -> bool + Send + Sync,
{
    fn handle(&self, request: &RoutingRequest) -> bool {
        self(request)
    }
}

/// Optional registration settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOptions {
    /// Only match requests with this scheme. `None` matches every scheme.
    pub scheme: Option<String>,
    /// Higher priorities are tried first.
    pub priority: i64,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            scheme: None,
            priority: DEFAULT_PRIORITY,
        }
    }
}

impl RouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }
}

/// A registered route.
pub struct RouteHandler {
    pub(crate) id: RouteId,
    pattern: RoutePattern,
    scheme: Option<String>,
    priority: i64,
    action: Arc<dyn RouteAction>,
}

impl RouteHandler {
    /// Compile a handler. The id is assigned on registration.
    pub fn new(
        pattern: &str,
        options: &RouteOptions,
        action: impl RouteAction + 'static,
    ) -> Result<Self, PatternError> {
        Self::with_shared_action(pattern, options, Arc::new(action))
    }

    /// Compile a handler around an action shared with other handlers.
    ///
    /// The scheme filter is lowercased, since parsed URLs carry lowercase
    /// schemes.
    pub fn with_shared_action(
        pattern: &str,
        options: &RouteOptions,
        action: Arc<dyn RouteAction>,
    ) -> Result<Self, PatternError> {
        Ok(Self {
            id: RouteId(0),
            pattern: RoutePattern::parse(pattern)?,
            scheme: options.scheme.as_deref().map(str::to_ascii_lowercase),
            priority: options.priority,
            action,
        })
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    /// Returns true if the scheme filter admits this scheme.
    pub fn accepts_scheme(&self, scheme: &str) -> bool {
        self.scheme
            .as_deref()
            .map_or(true, |s| s.eq_ignore_ascii_case(scheme))
    }

    /// Try to handle a request.
    ///
    /// The action only runs if the scheme filter passes and the pattern
    /// fulfills the request; it receives the fulfilled copy.
    pub fn handle(&self, request: &RoutingRequest) -> bool {
        if !self.accepts_scheme(request.scheme()) {
            return false;
        }
        match request.fulfill(&self.pattern) {
            Some(fulfilled) => self.action.handle(&fulfilled.with_route_id(self.id)),
            None => false,
        }
    }

    pub fn info(&self) -> RouteInfo {
        RouteInfo {
            id: self.id,
            pattern: self.pattern.as_str().to_string(),
            scheme: self.scheme.clone(),
            priority: self.priority,
        }
    }
}

impl fmt::Debug for RouteHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteHandler")
            .field("id", &self.id)
            .field("pattern", &self.pattern.as_str())
            .field("scheme", &self.scheme)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Plain description of a registered route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub id: RouteId,
    pub pattern: String,
    pub scheme: Option<String>,
    pub priority: i64,
}
