//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Docflow using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Docflow - Document lifecycle service
#[derive(Parser, Debug)]
#[command(name = "docflow")]
#[command(version, about, long_about = None)]
#[command(author = "Docflow Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "docflow.toml", env = "DOCFLOW_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error), overrides the configured one
    #[arg(short, long, env = "DOCFLOW_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API
    Serve(commands::serve::ServeArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}
