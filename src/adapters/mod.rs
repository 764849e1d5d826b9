//! Document store integrations for Docflow.
//!
//! - [`database`] - Store abstraction, time budgets and backend factory
//! - [`postgresql`] - PostgreSQL implementation (JSONB rows)
//! - [`memory`] - In-process implementation
//!
//! # Design Pattern
//!
//! Adapters isolate the store behind the [`DocumentStore`] trait so the
//! lifecycle core can be exercised against the in-memory backend or a test
//! double.
//!
//! ```rust,no_run
//! use docflow::adapters::database::{create_document_store, StoreGateway};
//! use docflow::config::StoreConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoreConfig::default();
//! let store = create_document_store(&config).await?;
//! let gateway = StoreGateway::new(store, config.timeouts.clone());
//! gateway.ping().await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`DocumentStore`]: database::DocumentStore

pub mod database;
pub mod memory;
pub mod postgresql;
