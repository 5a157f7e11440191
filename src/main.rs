//! url-router command line.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                  URL ROUTER                   │
//!                       │                                               │
//!   routes.toml ────────┼─▶ config ──▶ lifecycle::ConfiguredRoutes      │
//!                       │     ▲                    │                    │
//!   file change/SIGHUP ─┼─────┘                    ▼                    │
//!                       │                 routing::RouteRegistry        │
//!   args / stdin URLs ──┼─▶ events::UrlEventHub ──▶ dispatch ──▶ report ┼──▶ stdout (JSON)
//!                       │                                               │
//!                       │   observability: tracing (stderr) + metrics   │
//!                       └──────────────────────────────────────────────┘
//! ```

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use url_router::config::watcher::ConfigWatcher;
use url_router::config::{load_config, RouterConfig};
use url_router::lifecycle::{ConfiguredRoutes, Shutdown, SignalEvent, Signals, StdoutSink};
use url_router::observability::logging;
use url_router::{RouteRegistry, UrlEventHub};

#[derive(Parser)]
#[command(name = "url-router")]
#[command(about = "Route URLs through a TOML route table", long_about = None)]
struct Cli {
    /// Route table file.
    #[arg(short, long, default_value = "routes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the route table and print the routes in dispatch order
    Check,
    /// Route each URL and print a JSON report per match
    Route {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Read URLs from stdin, one per line, until EOF or Ctrl-C
    Listen {
        /// Reload the route table when the file changes
        #[arg(long)]
        watch: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init(&config.observability);

    tracing::info!(
        path = %cli.config.display(),
        routes = config.routes.len(),
        resolve_fragments = config.router.resolve_fragments,
        "Route table loaded"
    );

    let registry = Arc::new(RouteRegistry::new((&config.router).into()));
    let routes = ConfiguredRoutes::new(registry.clone(), Arc::new(StdoutSink));
    routes.apply(&config)?;

    match cli.command {
        Commands::Check => {
            println!("{}", serde_json::to_string_pretty(&registry.routes())?);
        }
        Commands::Route { urls } => {
            let unhandled: Vec<&String> = urls.iter().filter(|u| !registry.route_url(u)).collect();
            if !unhandled.is_empty() {
                for url in &unhandled {
                    tracing::warn!(url = %url, "URL not handled");
                }
                return Err(format!("{} of {} URLs were not handled", unhandled.len(), urls.len()).into());
            }
        }
        Commands::Listen { watch } => {
            let hub = UrlEventHub::new();
            hub.add_listener(&registry);
            listen(&cli.config, &routes, &hub, watch).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn listen(
    path: &Path,
    routes: &ConfiguredRoutes,
    hub: &UrlEventHub,
    watch: bool,
) -> Result<(), Box<dyn Error>> {
    let (watcher, mut updates) = ConfigWatcher::new(path);
    let _watcher = if watch { Some(watcher.run()?) } else { None };

    let shutdown = Shutdown::new();
    let mut shutdown_rx = shutdown.subscribe();
    let (reload_tx, mut reload_rx) = mpsc::unbounded_channel::<()>();

    let mut signals = Signals::new()?;
    tokio::spawn(async move {
        loop {
            match signals.recv().await {
                Ok(SignalEvent::Reload) => {
                    let _ = reload_tx.send(());
                }
                Ok(SignalEvent::Shutdown) => {
                    tracing::info!("Shutdown signal received");
                    shutdown.trigger();
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Signal handling failed");
                    shutdown.trigger();
                    break;
                }
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    tracing::info!("Listening for URLs on stdin");

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    let url = line.trim();
                    if !url.is_empty() {
                        hub.publish(url);
                    }
                }
                None => break,
            },
            Some(config) = updates.recv(), if watch => apply_reload(routes, &config),
            Some(()) = reload_rx.recv() => match load_config(path) {
                Ok(config) => apply_reload(routes, &config),
                Err(e) => tracing::error!(error = %e, "Reload failed. Keeping current routes."),
            },
            _ = shutdown_rx.recv() => break,
        }
    }

    Ok(())
}

fn apply_reload(routes: &ConfiguredRoutes, config: &RouterConfig) {
    if let Err(e) = routes.apply(config) {
        tracing::error!(error = %e, "Reload rejected. Keeping current routes.");
    }
}
