//! Validate config command implementation
//!
//! Loads the configuration with every layer applied and prints a summary.

use crate::config::{load_config, StoreBackend};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Returns exit code 0 when the configuration is valid, 2 otherwise.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates after the environment layer is applied
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Development Mode: {}", config.application.dev);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Listen Address: {}", config.server.bind_address());
        match config.store.backend {
            StoreBackend::Postgres => {
                println!("  Store Backend: PostgreSQL");
                println!(
                    "  PostgreSQL Connection: {}",
                    config.store.connection_string_safe()
                );
                println!("  Max Connections: {}", config.store.max_connections);
            }
            StoreBackend::Memory => println!("  Store Backend: in-memory"),
        }
        println!("  Document Collection: {}", config.store.document_collection);
        println!("  Batch Collection: {}", config.store.batch_collection);
        println!(
            "  Budgets (ms): insert {} | find {} | update {} | bulk {} | ping {}",
            config.store.timeouts.insert_ms,
            config.store.timeouts.find_ms,
            config.store.timeouts.update_ms,
            config.store.timeouts.bulk_ms,
            config.store.timeouts.ping_ms,
        );
        println!();
        Ok(0)
    }
}
