//! Shared utilities for integration tests.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use url_router::routing::{RouteAction, RoutingRequest};

/// Ordered log of which actions ran.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// An action that records `label` and returns `result`.
    pub fn action(&self, label: impl Into<String>, result: bool) -> impl RouteAction + 'static {
        let calls = self.calls.clone();
        let label = label.into();
        move |_: &RoutingRequest| {
            calls.lock().unwrap().push(label.clone());
            result
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

/// Write `content` to a fresh file in a per-process temp directory.
#[allow(dead_code)]
pub fn write_temp_config(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("url-router-tests-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}
