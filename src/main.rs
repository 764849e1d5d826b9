// Docflow - Document lifecycle service
// Copyright (c) 2025 Docflow Contributors
// Licensed under the MIT License

use clap::Parser;
use docflow::cli::{Cli, Commands};
use docflow::config::{load_config, DocflowConfig};
use docflow::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // The configuration decides the log format; if it does not load, log with
    // defaults so the failure itself is reported.
    let loaded = load_config(&cli.config);
    let fallback = DocflowConfig::default();
    let settings = loaded.as_ref().unwrap_or(&fallback);

    let log_level = cli
        .log_level
        .as_deref()
        .unwrap_or(&settings.application.log_level);
    let _guard = match init_logging(log_level, settings.application.dev, &settings.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Docflow - Document lifecycle service"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        listen_for_signals().await;
        let _ = shutdown_tx.send(true);
    });

    let exit_code = match &cli.command {
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Serve(args) => match loaded {
            Ok(config) => args.execute(config, shutdown_rx).await,
            Err(e) => {
                tracing::error!(error = %e, config_path = %cli.config, "Invalid configuration");
                eprintln!("Error: {e}");
                Ok(2)
            }
        },
    };

    let exit_code = match exit_code {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e:#}");
            5
        }
    };

    process::exit(exit_code);
}

/// Resolves on SIGINT or SIGTERM
async fn listen_for_signals() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
                    }
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM, initiating graceful shutdown...");
                    }
                }
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
            }
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
}
