//! Route pattern parsing.
//!
//! # Grammar
//! ```text
//! pattern   = ["/"] component *("/" component) ["/"]
//! component = ":" name      ; placeholder, captures one path segment
//!           | "*"           ; wildcard, last component only
//!           | literal       ; must equal the path segment
//! ```
//!
//! # Design Decisions
//! - Patterns are validated once, at registration time
//! - Only a whole `*` component is a wildcard (`test*` is a literal)
//! - Only the first `:` is stripped (`::b` captures into `:b`)

use std::fmt;
use thiserror::Error;

/// Errors raised when a pattern cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("route pattern is empty")]
    Empty,

    #[error("wildcard at component {position} must be the last component")]
    MisplacedWildcard { position: usize },

    #[error("placeholder at component {position} has no name")]
    EmptyPlaceholder { position: usize },

    #[error("placeholder `{name}` appears more than once")]
    DuplicatePlaceholder { name: String },
}

/// A single compiled pattern component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteComponent {
    /// Literal segment.
    Segment(String),
    /// Named capture of exactly one segment.
    Placeholder(String),
    /// Captures all remaining segments.
    Wildcard,
}

/// A compiled route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    components: Vec<RouteComponent>,
}

impl RoutePattern {
    /// Compile a pattern string.
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        if source.is_empty() {
            return Err(PatternError::Empty);
        }

        let parts = split_path(source);
        let last = parts.len() - 1;
        let mut components = Vec::with_capacity(parts.len());
        let mut names: Vec<&str> = Vec::new();

        for (position, part) in parts.iter().enumerate() {
            if *part == "*" {
                if position != last {
                    return Err(PatternError::MisplacedWildcard { position });
                }
                components.push(RouteComponent::Wildcard);
                continue;
            }

            if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(PatternError::EmptyPlaceholder { position });
                }
                if names.contains(&name) {
                    return Err(PatternError::DuplicatePlaceholder {
                        name: name.to_string(),
                    });
                }
                names.push(name);
                components.push(RouteComponent::Placeholder(name.to_string()));
                continue;
            }

            components.push(RouteComponent::Segment((*part).to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            components,
        })
    }

    /// The pattern string as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn components(&self) -> &[RouteComponent] {
        &self.components
    }

    /// Returns true if the pattern ends with a wildcard.
    pub fn has_wildcard(&self) -> bool {
        matches!(self.components.last(), Some(RouteComponent::Wildcard))
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Split a path into components, ignoring one leading and one trailing slash.
///
/// An empty path yields a single empty component.
pub(crate) fn split_path(path: &str) -> Vec<&str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);
    path.split('/').collect()
}
