//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every pattern so malformed ones fail before startup
//! - Detect duplicate route names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::routing::{PatternError, RoutePattern};

/// A single semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("route name `{name}` is used more than once")]
    DuplicateName { name: String },

    #[error("route `{route}` has no patterns")]
    NoPatterns { route: String },

    #[error("route `{route}` pattern `{pattern}`: {source}")]
    InvalidPattern {
        route: String,
        pattern: String,
        #[source]
        source: PatternError,
    },

    #[error("route `{route}` has an empty scheme")]
    EmptyScheme { route: String },
}

pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for (index, route) in config.routes.iter().enumerate() {
        if route.name.is_empty() {
            errors.push(ValidationError::EmptyName { index });
        } else if !names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                name: route.name.clone(),
            });
        }

        if route.patterns.is_empty() {
            errors.push(ValidationError::NoPatterns {
                route: route.name.clone(),
            });
        }

        for pattern in &route.patterns {
            if let Err(source) = RoutePattern::parse(pattern) {
                errors.push(ValidationError::InvalidPattern {
                    route: route.name.clone(),
                    pattern: pattern.clone(),
                    source,
                });
            }
        }

        if route.scheme.as_deref() == Some("") {
            errors.push(ValidationError::EmptyScheme {
                route: route.name.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
