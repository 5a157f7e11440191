//! Installing configured routes into a registry.
//!
//! # Responsibilities
//! - Turn `[[routes]]` entries into handlers that emit match reports
//! - Swap the configured set on reload without touching routes that were
//!   registered programmatically
//!
//! # Design Decisions
//! - All handlers are compiled before anything is registered, so a bad
//!   reload leaves the previous routes untouched
//! - New routes are registered before old ones are removed; there is no
//!   window in which a configured URL goes unrouted

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use url::Url;
use uuid::Uuid;

use crate::config::schema::RouterConfig;
use crate::config::validation::ValidationError;
use crate::routing::{RouteAction, RouteHandler, RouteId, RouteRegistry, RoutingRequest};

/// Emitted whenever a configured route matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    /// Name of the `[[routes]]` entry.
    pub route: String,
    /// Id of the matching handler. Only `None` if the action ran outside a
    /// registry.
    pub route_id: Option<RouteId>,
    pub url: Url,
    pub scheme: String,
    pub parameters: HashMap<String, String>,
    pub wildcard: Option<String>,
    pub request_id: Uuid,
}

/// Destination for match reports.
pub trait ReportSink: Send + Sync {
    fn report(&self, report: &MatchReport);
}

/// Writes one JSON object per line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn report(&self, report: &MatchReport) {
        let line = match serde_json::to_string(report) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode match report");
                return;
            }
        };
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", line) {
            tracing::warn!(error = %e, "Failed to write match report");
        }
    }
}

/// Action behind every configured pattern.
struct ReportAction {
    route: String,
    pattern: String,
    handled: bool,
    sink: Arc<dyn ReportSink>,
}

impl RouteAction for ReportAction {
    fn handle(&self, request: &RoutingRequest) -> bool {
        tracing::info!(
            request_id = %request.id(),
            route = %self.route,
            route_id = ?request.route_id(),
            pattern = %self.pattern,
            handled = self.handled,
            "Configured route matched"
        );
        self.sink.report(&MatchReport {
            route: self.route.clone(),
            route_id: request.route_id(),
            url: request.url().clone(),
            scheme: request.scheme().to_string(),
            parameters: request.parameters().clone(),
            wildcard: request.wildcard().map(str::to_string),
            request_id: request.id(),
        });
        self.handled
    }
}

/// The routes of a config file, installed into a shared registry.
pub struct ConfiguredRoutes {
    registry: Arc<RouteRegistry>,
    sink: Arc<dyn ReportSink>,
    installed: Mutex<Vec<RouteId>>,
}

impl ConfiguredRoutes {
    pub fn new(registry: Arc<RouteRegistry>, sink: Arc<dyn ReportSink>) -> Self {
        Self {
            registry,
            sink,
            installed: Mutex::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.registry
    }

    /// Ids of the currently installed configured routes.
    pub fn installed(&self) -> Vec<RouteId> {
        self.installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the configured routes with those of `config`.
    ///
    /// Returns the new ids in config order. On error nothing changes.
    pub fn apply(&self, config: &RouterConfig) -> Result<Vec<RouteId>, ValidationError> {
        if config.router.resolve_fragments != self.registry.settings().resolve_fragments {
            tracing::warn!(
                "router.resolve_fragments changed; restart to apply the new setting"
            );
        }

        let mut handlers = Vec::new();
        for route in &config.routes {
            let options = route.options();
            for pattern in &route.patterns {
                let action = ReportAction {
                    route: route.name.clone(),
                    pattern: pattern.clone(),
                    handled: route.handled,
                    sink: self.sink.clone(),
                };
                let handler = RouteHandler::new(pattern, &options, action).map_err(|source| {
                    ValidationError::InvalidPattern {
                        route: route.name.clone(),
                        pattern: pattern.clone(),
                        source,
                    }
                })?;
                handlers.push(handler);
            }
        }

        let mut installed = self.installed.lock().unwrap_or_else(PoisonError::into_inner);
        let ids: Vec<RouteId> = handlers
            .into_iter()
            .map(|h| self.registry.register_handler(h))
            .collect();
        for old in installed.drain(..) {
            self.registry.unregister(old);
        }
        installed.extend_from_slice(&ids);

        tracing::info!(
            routes = config.routes.len(),
            patterns = ids.len(),
            "Configured routes installed"
        );
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[derive(Default)]
    struct Collect(Mutex<Vec<MatchReport>>);

    impl ReportSink for Collect {
        fn report(&self, report: &MatchReport) {
            self.0.lock().unwrap().push(report.clone());
        }
    }

    fn setup() -> (Arc<RouteRegistry>, Arc<Collect>, ConfiguredRoutes) {
        let registry = Arc::new(RouteRegistry::default());
        let sink = Arc::new(Collect::default());
        let routes = ConfiguredRoutes::new(registry.clone(), sink.clone());
        (registry, sink, routes)
    }

    #[test]
    fn test_apply_reports_matches() {
        let (registry, sink, routes) = setup();
        let config = parse_config(
            r#"
            [[routes]]
            name = "user"
            patterns = ["user/:id", "u/:id"]
            scheme = "app"
            "#,
        )
        .unwrap();

        let ids = routes.apply(&config).unwrap();
        assert_eq!(ids.len(), 2);
        assert!(registry.route_url("app://u/7?tab=posts"));
        assert!(!registry.route_url("other://u/7"));

        let reports = sink.0.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].route, "user");
        assert_eq!(reports[0].route_id, Some(ids[1]));
        assert_eq!(reports[0].parameters.get("id").map(String::as_str), Some("7"));
        assert_eq!(reports[0].parameters.get("tab").map(String::as_str), Some("posts"));
    }

    #[test]
    fn test_unhandled_route_lets_dispatch_continue() {
        let (registry, sink, routes) = setup();
        let config = parse_config(
            r#"
            [[routes]]
            name = "audit"
            patterns = ["*"]
            priority = 100
            handled = false

            [[routes]]
            name = "docs"
            patterns = ["docs/*"]
            "#,
        )
        .unwrap();
        routes.apply(&config).unwrap();

        assert!(registry.route_url("app://docs/a/b"));
        assert!(!registry.route_url("app://other"));

        let reports = sink.0.lock().unwrap();
        let names: Vec<&str> = reports.iter().map(|r| r.route.as_str()).collect();
        assert_eq!(names, vec!["audit", "docs", "audit"]);
        assert_eq!(reports[1].wildcard.as_deref(), Some("a/b"));
    }

    #[test]
    fn test_reapply_replaces_only_configured_routes() {
        let (registry, _sink, routes) = setup();
        let manual = registry.register("manual", |_: &RoutingRequest| true).unwrap();

        let first = parse_config("[[routes]]\nname = \"a\"\npatterns = [\"a\"]\n").unwrap();
        let old = routes.apply(&first).unwrap();

        let second = parse_config("[[routes]]\nname = \"b\"\npatterns = [\"b\", \"c\"]\n").unwrap();
        let new = routes.apply(&second).unwrap();

        assert!(!registry.contains(old[0]));
        assert!(new.iter().all(|id| registry.contains(*id)));
        assert!(registry.contains(manual));
        assert_eq!(registry.len(), 3);
        assert_eq!(routes.installed(), new);
    }

    #[test]
    fn test_bad_config_leaves_routes_untouched() {
        let (registry, _sink, routes) = setup();
        let good = parse_config("[[routes]]\nname = \"a\"\npatterns = [\"a\"]\n").unwrap();
        let ids = routes.apply(&good).unwrap();

        // Bypasses validation on purpose.
        let mut bad = good.clone();
        bad.routes[0].patterns = vec!["ok".into(), "x/*/y".into()];
        let err = routes.apply(&bad).unwrap_err();

        assert!(matches!(err, ValidationError::InvalidPattern { .. }));
        assert_eq!(routes.installed(), ids);
        assert_eq!(registry.len(), 1);
    }
}
