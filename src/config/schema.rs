//! Configuration schema definitions.
//!
//! This module defines the route table file format.
//! All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};

use crate::routing::{RegistrySettings, RouteOptions, DEFAULT_PRIORITY};

/// Root configuration for the router.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// Registry-wide settings.
    pub router: RegistryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route definitions.
    pub routes: Vec<RouteConfig>,
}

/// Registry settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Merge URL fragments into path and query before matching.
    pub resolve_fragments: bool,
}

impl From<&RegistryConfig> for RegistrySettings {
    fn from(config: &RegistryConfig) -> Self {
        Self {
            resolve_fragments: config.resolve_fragments,
        }
    }
}

/// A configured route: one or more patterns sharing a name and options.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RouteConfig {
    /// Route identifier for logging and match reports.
    pub name: String,

    /// Patterns to register, in order.
    pub patterns: Vec<String>,

    /// Restrict to this URL scheme.
    #[serde(default)]
    pub scheme: Option<String>,

    /// Route priority (higher = tried first).
    #[serde(default = "default_priority")]
    pub priority: i64,

    /// Whether a match stops dispatch. With `false` the match is reported
    /// and lower-priority routes are still tried.
    #[serde(default = "default_handled")]
    pub handled: bool,
}

impl RouteConfig {
    pub fn options(&self) -> RouteOptions {
        RouteOptions {
            scheme: self.scheme.clone(),
            priority: self.priority,
        }
    }
}

fn default_priority() -> i64 {
    DEFAULT_PRIORITY
}

fn default_handled() -> bool {
    true
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_minimal_config() {
        let config: RouterConfig = toml::from_str("").unwrap();
        assert_eq!(config, RouterConfig::default());
        assert!(!config.router.resolve_fragments);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_route_defaults() {
        let config: RouterConfig = toml::from_str(
            r#"
            [[routes]]
            name = "profile"
            patterns = ["profile/:id"]
            "#,
        )
        .unwrap();

        let route = &config.routes[0];
        assert_eq!(route.priority, DEFAULT_PRIORITY);
        assert!(route.handled);
        assert_eq!(route.options(), RouteOptions::default());
    }

    #[test]
    fn test_full_config() {
        let config: RouterConfig = toml::from_str(
            r#"
            [router]
            resolve_fragments = true

            [observability]
            log_level = "debug"
            log_format = "json"

            [[routes]]
            name = "docs"
            patterns = ["docs/*", "help/*"]
            scheme = "myapp"
            priority = 10
            handled = false
            "#,
        )
        .unwrap();

        assert!(config.router.resolve_fragments);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        let route = &config.routes[0];
        assert_eq!(route.patterns, vec!["docs/*", "help/*"]);
        assert_eq!(route.options(), RouteOptions::new().scheme("myapp").priority(10));
        assert!(!route.handled);
    }
}
