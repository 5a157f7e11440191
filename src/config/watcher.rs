//! Route table watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::RouterConfig;

/// A watcher that monitors the route table file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RouterConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RouterConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Reload the file and forward it if it is valid.
    ///
    /// Returns false if the file could not be loaded; the current
    /// configuration stays in place.
    pub fn reload(&self) -> bool {
        reload_into(&self.path, &self.update_tx)
    }

    /// Start watching the file. Keep the returned watcher alive for as long
    /// as updates are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Route table change detected, reloading...");
                        reload_into(&path, &tx);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Route table watcher started");
        Ok(watcher)
    }
}

fn reload_into(path: &Path, tx: &mpsc::UnboundedSender<RouterConfig>) -> bool {
    match load_config(path) {
        Ok(config) => tx.send(config).is_ok(),
        Err(e) => {
            tracing::error!(
                "Failed to reload route table: {}. Keeping current routes.",
                e
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("url-router-watcher-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_reload_forwards_valid_config() {
        let path = temp_file(
            "valid.toml",
            "[[routes]]\nname = \"a\"\npatterns = [\"a\"]\n",
        );
        let (watcher, mut rx) = ConfigWatcher::new(&path);

        assert!(watcher.reload());
        let config = rx.recv().await.unwrap();
        assert_eq!(config.routes[0].name, "a");
    }

    #[tokio::test]
    async fn test_reload_keeps_quiet_on_invalid_config() {
        let path = temp_file(
            "invalid.toml",
            "[[routes]]\nname = \"a\"\npatterns = [\"a/*/b\"]\n",
        );
        let (watcher, mut rx) = ConfigWatcher::new(&path);

        assert!(!watcher.reload());
        assert!(rx.try_recv().is_err());
    }
}
