//! Configuration management for Docflow.
//!
//! Configuration is a typed structure resolved from three layers:
//! built-in defaults, an optional TOML file, and `DOCFLOW_*` environment
//! variables (environment wins over file, file wins over defaults).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use docflow::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("docflow.toml")?;
//! println!("Port: {}", config.server.port);
//! println!("Documents: {}", config.store.document_collection);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Dev mode and log level
//! - [`ServerConfig`] - HTTP listener
//! - [`StoreConfig`] - Store backend, collections and per-operation budgets
//! - [`LoggingConfig`] - Optional rolling file output
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! dev = false
//! log_level = "info"
//!
//! [server]
//! port = 8080
//!
//! [store]
//! backend = "postgres"
//! connection_string = "${DOCFLOW_DATABASE_URL}"
//!
//! [store.timeouts]
//! insert_ms = 2000
//! bulk_ms = 30000
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, DocflowConfig, LoggingConfig, ServerConfig, StoreBackend, StoreConfig,
    TimeoutConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
