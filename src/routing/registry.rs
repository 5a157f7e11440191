//! Route registry and dispatch.
//!
//! # Responsibilities
//! - Assign unique, never reused ids to registered handlers
//! - Keep handlers ordered by descending priority, ties in insertion order
//! - Dispatch requests until one handler reports success
//!
//! # Design Decisions
//! - Handlers live in an immutable snapshot swapped on every mutation
//! - Writers serialize on a mutex; dispatch only loads the snapshot
//! - No lock is held while actions run, so actions may re-enter the registry
//! - "Not handled" is `false`, not an error

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::events::UrlEventListener;
use crate::observability::metrics;
use crate::routing::handler::{RouteAction, RouteHandler, RouteId, RouteInfo, RouteOptions};
use crate::routing::pattern::PatternError;
use crate::routing::request::RoutingRequest;

/// A batch registration stopped at a malformed pattern.
///
/// Patterns before `index` stay registered; their ids are in `registered`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pattern {index} (`{pattern}`) rejected: {source}")]
pub struct BatchError {
    pub index: usize,
    pub pattern: String,
    pub registered: Vec<RouteId>,
    #[source]
    pub source: PatternError,
}

/// Registry-wide settings.
#[derive(Debug, Clone, Default)]
pub struct RegistrySettings {
    /// Merge URL fragments into path and query in `route_url`.
    pub resolve_fragments: bool,
}

type Snapshot = Vec<Arc<RouteHandler>>;

struct WriterState {
    next_id: u64,
}

/// Priority-ordered collection of route handlers.
pub struct RouteRegistry {
    routes: ArcSwap<Snapshot>,
    writer: Mutex<WriterState>,
    settings: RegistrySettings,
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::new(RegistrySettings::default())
    }
}

impl RouteRegistry {
    pub fn new(settings: RegistrySettings) -> Self {
        Self {
            routes: ArcSwap::from_pointee(Vec::new()),
            writer: Mutex::new(WriterState { next_id: 0 }),
            settings,
        }
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    // --- Registration ---

    /// Register `pattern` for every scheme at the default priority.
    pub fn register(
        &self,
        pattern: &str,
        action: impl RouteAction + 'static,
    ) -> Result<RouteId, PatternError> {
        self.register_with(pattern, &RouteOptions::default(), action)
    }

    pub fn register_for_scheme(
        &self,
        pattern: &str,
        scheme: &str,
        action: impl RouteAction + 'static,
    ) -> Result<RouteId, PatternError> {
        self.register_with(pattern, &RouteOptions::new().scheme(scheme), action)
    }

    pub fn register_with_priority(
        &self,
        pattern: &str,
        priority: i64,
        action: impl RouteAction + 'static,
    ) -> Result<RouteId, PatternError> {
        self.register_with(pattern, &RouteOptions::new().priority(priority), action)
    }

    /// Register `pattern` with explicit options.
    pub fn register_with(
        &self,
        pattern: &str,
        options: &RouteOptions,
        action: impl RouteAction + 'static,
    ) -> Result<RouteId, PatternError> {
        let handler = RouteHandler::new(pattern, options, action)?;
        Ok(self.register_handler(handler))
    }

    /// Insert a pre-built handler and return its newly assigned id.
    pub fn register_handler(&self, mut handler: RouteHandler) -> RouteId {
        let mut writer = self.lock_writer();
        let id = RouteId(writer.next_id);
        writer.next_id += 1;
        handler.id = id;

        tracing::debug!(
            route_id = %id,
            pattern = %handler.pattern(),
            scheme = ?handler.scheme(),
            priority = handler.priority(),
            "Route registered"
        );

        let handler = Arc::new(handler);
        let current = self.routes.load();
        let mut next = Vec::with_capacity(current.len() + 1);
        // Insert after every route of greater or equal priority.
        let at = current.partition_point(|h| h.priority() >= handler.priority());
        next.extend_from_slice(&current[..at]);
        next.push(handler);
        next.extend_from_slice(&current[at..]);
        self.publish(next);

        metrics::record_registered();
        id
    }

    pub fn register_many<S: AsRef<str>>(
        &self,
        patterns: &[S],
        action: impl RouteAction + 'static,
    ) -> Result<Vec<RouteId>, BatchError> {
        self.register_many_with(patterns, &RouteOptions::default(), action)
    }

    pub fn register_many_for_scheme<S: AsRef<str>>(
        &self,
        patterns: &[S],
        scheme: &str,
        action: impl RouteAction + 'static,
    ) -> Result<Vec<RouteId>, BatchError> {
        self.register_many_with(patterns, &RouteOptions::new().scheme(scheme), action)
    }

    pub fn register_many_with_priority<S: AsRef<str>>(
        &self,
        patterns: &[S],
        priority: i64,
        action: impl RouteAction + 'static,
    ) -> Result<Vec<RouteId>, BatchError> {
        self.register_many_with(patterns, &RouteOptions::new().priority(priority), action)
    }

    /// Register several patterns sharing one action.
    ///
    /// Ids are returned in input order. Registration stops at the first
    /// malformed pattern; earlier patterns are kept.
    pub fn register_many_with<S: AsRef<str>>(
        &self,
        patterns: &[S],
        options: &RouteOptions,
        action: impl RouteAction + 'static,
    ) -> Result<Vec<RouteId>, BatchError> {
        let action: Arc<dyn RouteAction> = Arc::new(action);
        let mut registered = Vec::with_capacity(patterns.len());

        for (index, pattern) in patterns.iter().enumerate() {
            let pattern = pattern.as_ref();
            match RouteHandler::with_shared_action(pattern, options, action.clone()) {
                Ok(handler) => registered.push(self.register_handler(handler)),
                Err(source) => {
                    tracing::warn!(index, pattern, error = %source, "Batch registration stopped");
                    return Err(BatchError {
                        index,
                        pattern: pattern.to_string(),
                        registered,
                        source,
                    });
                }
            }
        }

        Ok(registered)
    }

    // --- Removal ---

    /// Remove the handler with `id`. Returns false if it was not registered.
    pub fn unregister(&self, id: RouteId) -> bool {
        self.remove_where(|h| h.id() == id) > 0
    }

    /// Remove every handler registered for `pattern`.
    ///
    /// With a scheme, only handlers bound to that scheme (ignoring case) are
    /// removed; without one, the scheme is ignored.
    pub fn unregister_route(&self, pattern: &str, scheme: Option<&str>) -> usize {
        self.remove_where(|h| {
            let same_scheme = |s: &str| h.scheme().is_some_and(|own| own.eq_ignore_ascii_case(s));
            h.pattern().as_str() == pattern && scheme.map_or(true, same_scheme)
        })
    }

    pub fn unregister_all(&self) -> usize {
        self.remove_where(|_| true)
    }

    fn remove_where(&self, predicate: impl Fn(&RouteHandler) -> bool) -> usize {
        let _writer = self.lock_writer();
        let current = self.routes.load();
        let next: Snapshot = current.iter().filter(|h| !predicate(h)).cloned().collect();
        let removed = current.len() - next.len();

        if removed > 0 {
            tracing::debug!(removed, remaining = next.len(), "Routes unregistered");
            self.publish(next);
            metrics::record_unregistered(removed);
        }
        removed
    }

    // --- Dispatch ---

    /// Try handlers in priority order until one handles the request.
    pub fn dispatch(&self, request: &RoutingRequest) -> bool {
        let routes = self.routes.load_full();

        for handler in routes.iter() {
            if handler.handle(request) {
                tracing::debug!(
                    request_id = %request.id(),
                    route_id = %handler.id(),
                    pattern = %handler.pattern(),
                    "Request handled"
                );
                metrics::record_dispatch(metrics::DispatchOutcome::Handled);
                return true;
            }
        }

        tracing::debug!(request_id = %request.id(), url = %request.url(), "No route handled request");
        metrics::record_dispatch(metrics::DispatchOutcome::Unhandled);
        false
    }

    /// Parse `url` and dispatch it. Unparseable URLs are not handled.
    pub fn route_url(&self, url: &str) -> bool {
        match RoutingRequest::parse(url, self.settings.resolve_fragments) {
            Ok(request) => self.dispatch(&request),
            Err(e) => {
                tracing::debug!(error = %e, "Dropping unroutable URL");
                metrics::record_dispatch(metrics::DispatchOutcome::InvalidUrl);
                false
            }
        }
    }

    // --- Introspection ---

    pub fn len(&self) -> usize {
        self.routes.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: RouteId) -> bool {
        self.routes.load().iter().any(|h| h.id() == id)
    }

    /// Registered routes in dispatch order.
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.routes.load().iter().map(|h| h.info()).collect()
    }

    fn lock_writer(&self) -> MutexGuard<'_, WriterState> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Callers must hold the writer lock.
    fn publish(&self, next: Snapshot) {
        metrics::set_active_routes(next.len());
        self.routes.store(Arc::new(next));
    }
}

impl UrlEventListener for RouteRegistry {
    fn handle_url(&self, url: &str) {
        self.route_url(url);
    }
}
