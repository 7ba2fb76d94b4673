// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relaya - self-hosted SMS dispatch with multi-carrier routing.
//!
//! This is the binary entry point for the Relaya service.

mod providers;
mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Relaya - self-hosted SMS dispatch with multi-carrier routing.
#[derive(Parser, Debug)]
#[command(name = "relaya", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the dispatch workers and webhook server.
    Serve,
    /// Manage carrier provider accounts.
    Provider {
        #[command(subcommand)]
        command: providers::ProviderCommand,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match relaya_config::load_and_validate() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("relaya: {e}");
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level)),
        )
        .init();

    let result = match cli.command {
        Some(Commands::Serve) | None => serve::run(&config).await,
        Some(Commands::Provider { command }) => providers::run(&config, command).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "relaya exited with an error");
        std::process::exit(1);
    }
}
