//! Routing requests.
//!
//! # Responsibilities
//! - Parse an incoming URL into scheme, path components and query pairs
//! - Fold the host into the path (`app://user/42` routes as `user/42`)
//! - Optionally merge the fragment into path and query
//! - Fulfill a request against a compiled pattern, extracting parameters
//!
//! # Design Decisions
//! - Requests are immutable; fulfillment returns a new request
//! - The scheme is not checked here, handlers filter on it
//! - Query items with empty values are never exposed as parameters

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;
use url::{form_urlencoded, Url};
use uuid::Uuid;

use crate::routing::handler::RouteId;
use crate::routing::pattern::{split_path, RouteComponent, RoutePattern};

/// Errors raised while parsing a URL into a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("invalid URL `{input}`: {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },
}

/// A parsed URL, ready to be matched against routes.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingRequest {
    id: Uuid,
    url: Url,
    scheme: String,
    path_components: Vec<String>,
    query: Vec<(String, String)>,
    parameters: HashMap<String, String>,
    wildcard: Option<String>,
    route_id: Option<RouteId>,
}

impl RoutingRequest {
    /// Parse a URL string.
    ///
    /// With `resolve_fragment`, a fragment such as `#/tab/settings?x=1` is
    /// merged into the path and query before matching.
    pub fn parse(input: &str, resolve_fragment: bool) -> Result<Self, RequestError> {
        let url = Url::parse(input).map_err(|source| RequestError::InvalidUrl {
            input: input.to_string(),
            source,
        })?;
        Ok(Self::from_url(url, resolve_fragment))
    }

    /// Build a request from an already parsed URL.
    pub fn from_url(url: Url, resolve_fragment: bool) -> Self {
        let mut path = match url.host_str() {
            Some(host) if !host.is_empty() => format!("{}{}", host, url.path()),
            _ => url.path().to_string(),
        };

        let mut query: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        if resolve_fragment {
            if let Some(fragment) = url.fragment() {
                resolve_fragment_into(fragment, &mut path, &mut query);
            }
        }

        let path_components = split_path(&path).into_iter().map(str::to_string).collect();

        Self {
            id: Uuid::new_v4(),
            scheme: url.scheme().to_string(),
            url,
            path_components,
            query,
            parameters: HashMap::new(),
            wildcard: None,
            route_id: None,
        }
    }

    /// Correlation id for logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn path_components(&self) -> &[String] {
        &self.path_components
    }

    /// Query pairs in URL order, including those merged from the fragment.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Placeholder captures and non-empty query values.
    ///
    /// Empty until the request has been fulfilled by a route.
    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Path remainder captured by a trailing wildcard.
    pub fn wildcard(&self) -> Option<&str> {
        self.wildcard.as_deref()
    }

    /// Route whose pattern fulfilled this request, once dispatched to it.
    pub fn route_id(&self) -> Option<RouteId> {
        self.route_id
    }

    pub(crate) fn with_route_id(mut self, id: RouteId) -> Self {
        self.route_id = Some(id);
        self
    }

    /// Match this request against a pattern.
    ///
    /// Returns a fulfilled copy carrying the extracted parameters, or `None`
    /// if the path does not match.
    pub fn fulfill(&self, pattern: &RoutePattern) -> Option<RoutingRequest> {
        let components = pattern.components();
        let mut parameters = HashMap::new();
        let mut wildcard = None;
        let mut consumed = 0;

        for (index, segment) in self.path_components.iter().enumerate() {
            let component = components.get(index)?;
            consumed = index + 1;

            match component {
                RouteComponent::Segment(literal) => {
                    if literal != segment {
                        return None;
                    }
                }
                RouteComponent::Placeholder(name) => {
                    parameters.insert(name.clone(), segment.clone());
                }
                RouteComponent::Wildcard => {
                    let rest = self.path_components[index..].join("/");
                    if !rest.is_empty() {
                        wildcard = Some(rest);
                    }
                    break;
                }
            }
        }

        // Unconsumed components only match if they are a single wildcard.
        match &components[consumed..] {
            [] | [RouteComponent::Wildcard] => {}
            _ => return None,
        }

        for (name, value) in &self.query {
            if !value.is_empty() {
                parameters.insert(name.clone(), value.clone());
            }
        }

        Some(Self {
            parameters,
            wildcard,
            ..self.clone()
        })
    }
}

/// Merge a URL fragment into the path and query.
///
/// `#/tab/a?x=1` appends `#/tab/a` to the path and `x=1` to the query. A
/// fragment made only of query items (`#x=1`) leaves the path untouched.
fn resolve_fragment_into(fragment: &str, path: &mut String, query: &mut Vec<(String, String)>) {
    let (fragment_path, fragment_query) = match fragment.split_once('?') {
        Some((p, q)) => (p, q),
        None => (fragment, fragment),
    };

    let items: Vec<(String, String)> = form_urlencoded::parse(fragment_query.as_bytes())
        .into_owned()
        .collect();
    let contains_query = items.first().is_some_and(|(_, value)| !value.is_empty());

    if contains_query {
        query.extend(items);
    }

    if !contains_query || fragment_path != fragment_query {
        path.push('#');
        path.push_str(fragment_path);
    }
}
