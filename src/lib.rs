// Docflow - Document lifecycle service
// Copyright (c) 2025 Docflow Contributors
// Licensed under the MIT License

//! # Docflow - Document lifecycle service
//!
//! Docflow tracks business documents through a small lifecycle backed by a
//! document store:
//!
//! ```text
//! INIT ──► VERIFIED | REJECTED      (one document, by business key)
//! INIT ──► PROCESSED                (every document of a submitted batch)
//! ```
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`http`] - HTTP API (axum)
//! - [`core`] - Lifecycle rules: index assurance, transitions, batches
//! - [`adapters`] - Document store contract and its backends
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docflow::adapters::database::create_document_store;
//! use docflow::config::load_config;
//! use docflow::core::lifecycle::LifecycleService;
//! use docflow::http::{create_router, AppState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("docflow.toml")?;
//!     let store = create_document_store(&config.store).await?;
//!     let service = LifecycleService::from_config(store, &config.store);
//!
//!     let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
//!     let app = create_router(AppState::new(service, config.server.port));
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Guarantees
//!
//! - At most one document per business key; a second insert is a conflict.
//! - Transitions only match documents in `INIT`, so repeating one is harmless.
//! - Processing a batch only matches documents not yet `PROCESSED`, so
//!   re-running it reports zero modifications.
//! - Every store call runs under its own time budget.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod http;
pub mod logging;
