//! PostgreSQL document store
//!
//! Documents are stored as JSONB rows, one table per collection.

pub mod adapter;
pub mod client;

pub use adapter::PostgresDocumentStore;
pub use client::PostgresClient;
