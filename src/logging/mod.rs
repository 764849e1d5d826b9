//! Logging
//!
//! Structured logging through `tracing`:
//! - human-readable console output in development mode
//! - JSON lines otherwise
//! - `RUST_LOG` filtering, falling back to the configured level
//! - optional local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use docflow::logging::init_logging;
//! use docflow::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", true, &config).expect("Failed to initialize logging");
//!
//! tracing::info!(port = 8080, "Server starting");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};
