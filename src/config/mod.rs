//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! route table file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, pattern compilation)
//!     → RouterConfig (validated, immutable)
//!     → lifecycle::ConfiguredRoutes installs it into a RouteRegistry
//!
//! On change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → ConfiguredRoutes swaps the configured routes
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::RegistryConfig;
pub use schema::RouteConfig;
pub use schema::RouterConfig;
