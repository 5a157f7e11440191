//! Route tables loaded from disk and driven through the event hub.

use std::sync::{Arc, Mutex};

use url_router::config::{load_config, ConfigError};
use url_router::lifecycle::{ConfiguredRoutes, MatchReport, ReportSink};
use url_router::{RouteRegistry, UrlEventHub};

mod common;

#[derive(Default)]
struct Collect(Mutex<Vec<MatchReport>>);

impl ReportSink for Collect {
    fn report(&self, report: &MatchReport) {
        self.0.lock().unwrap().push(report.clone());
    }
}

const ROUTES: &str = r#"
[router]
resolve_fragments = true

[[routes]]
name = "settings"
patterns = ["settings#/:tab"]
scheme = "myapp"
priority = 10

[[routes]]
name = "fallback"
patterns = ["*"]
"#;

#[test]
fn test_load_and_route_through_hub() {
    let path = common::write_temp_config("routes.toml", ROUTES);
    let config = load_config(&path).unwrap();

    let registry = Arc::new(RouteRegistry::new((&config.router).into()));
    let sink = Arc::new(Collect::default());
    let routes = ConfiguredRoutes::new(registry.clone(), sink.clone());
    routes.apply(&config).unwrap();

    let hub = UrlEventHub::new();
    hub.add_listener(&registry);

    assert_eq!(hub.publish("myapp://settings#/privacy?debug=1"), 1);
    assert_eq!(hub.publish("other://settings#/privacy"), 1);

    let reports = sink.0.lock().unwrap();
    assert_eq!(reports.len(), 2);

    assert_eq!(reports[0].route, "settings");
    assert_eq!(reports[0].parameters.get("tab").map(String::as_str), Some("privacy"));
    assert_eq!(reports[0].parameters.get("debug").map(String::as_str), Some("1"));

    assert_eq!(reports[1].route, "fallback");
    assert_eq!(reports[1].wildcard.as_deref(), Some("settings#/privacy"));
    assert_eq!(reports[1].scheme, "other");
}

#[test]
fn test_invalid_route_table_rejected() {
    let path = common::write_temp_config(
        "bad-routes.toml",
        "[[routes]]\nname = \"x\"\npatterns = [\"\", \"a/:\"]\n",
    );
    match load_config(&path) {
        Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_report_serializes_to_json() {
    let registry = Arc::new(RouteRegistry::default());
    let sink = Arc::new(Collect::default());
    let routes = ConfiguredRoutes::new(registry.clone(), sink.clone());
    let config = url_router::config::parse_config(
        "[[routes]]\nname = \"user\"\npatterns = [\"user/:id\"]\n",
    )
    .unwrap();
    let ids = routes.apply(&config).unwrap();

    assert!(registry.route_url("app://user/5"));
    let reports = sink.0.lock().unwrap();
    let json = serde_json::to_value(&reports[0]).unwrap();
    assert_eq!(json["route"], "user");
    assert_eq!(json["url"], "app://user/5");
    assert_eq!(json["parameters"]["id"], "5");
    assert!(json["wildcard"].is_null());
    assert_eq!(json["route_id"], ids[0].get());

    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["parameters", "request_id", "route", "route_id", "scheme", "url", "wildcard"]
    );
}

#[test]
fn test_mixed_case_scheme_in_route_table() {
    let registry = Arc::new(RouteRegistry::default());
    let sink = Arc::new(Collect::default());
    let routes = ConfiguredRoutes::new(registry.clone(), sink.clone());
    let config = url_router::config::parse_config(
        "[[routes]]\nname = \"profile\"\npatterns = [\"profile/:id\"]\nscheme = \"MyApp\"\n",
    )
    .unwrap();
    routes.apply(&config).unwrap();

    assert!(registry.route_url("MyApp://profile/3"));
    assert!(!registry.route_url("other://profile/3"));

    let reports = sink.0.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].scheme, "myapp");
}
