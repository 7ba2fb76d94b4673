// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `provider` subcommand: manage carrier provider accounts.

use clap::Subcommand;
use relaya_config::RelayaConfig;
use relaya_core::types::{Credentials, Provider};
use relaya_core::RelayaError;
use relaya_storage::{Database, ProviderRegistry};

#[derive(Subcommand, Debug)]
pub enum ProviderCommand {
    /// List configured providers.
    List,
    /// Add a provider or replace its configuration.
    Add {
        /// Carrier name (telnyx, twilio, signalwire).
        name: String,
        /// Display name; defaults to the carrier name.
        #[arg(long)]
        display_name: Option<String>,
        /// Routing priority; higher is preferred.
        #[arg(long, default_value_t = 0)]
        priority: i64,
        /// Register the provider disabled.
        #[arg(long)]
        inactive: bool,
        /// Make this the default provider.
        #[arg(long)]
        default: bool,
        /// Credentials as key=value pairs, repeatable.
        #[arg(long = "credential", value_name = "KEY=VALUE")]
        credentials: Vec<String>,
    },
    /// Make a provider the single default.
    SetDefault { name: String },
    /// Activate a provider.
    Enable { name: String },
    /// Deactivate a provider.
    Disable { name: String },
}

pub async fn run(config: &RelayaConfig, command: ProviderCommand) -> Result<(), RelayaError> {
    let db = Database::open_with(&config.storage.database_path, config.storage.wal_mode).await?;
    let registry = ProviderRegistry::new(db.clone());

    match command {
        ProviderCommand::List => {
            let providers = registry.find_active().await?;
            if providers.is_empty() {
                println!("no active providers configured");
            }
            for p in providers {
                let default = if p.is_default { " (default)" } else { "" };
                println!("{} priority={}{}", p.name, p.priority, default);
            }
        }
        ProviderCommand::Add {
            name,
            display_name,
            priority,
            inactive,
            default,
            credentials,
        } => {
            let credentials = parse_credentials(&credentials)?;
            let provider = Provider {
                display_name: display_name.unwrap_or_else(|| name.clone()),
                name: name.clone(),
                is_active: !inactive,
                is_default: false,
                priority,
                credentials,
            };
            registry.upsert(&provider).await?;
            if default {
                registry.set_default(&name).await?;
            }
            println!("provider {name} saved");
        }
        ProviderCommand::SetDefault { name } => {
            registry.set_default(&name).await?;
            println!("provider {name} is now the default");
        }
        ProviderCommand::Enable { name } => {
            registry.set_active(&name, true).await?;
            println!("provider {name} enabled");
        }
        ProviderCommand::Disable { name } => {
            registry.set_active(&name, false).await?;
            println!("provider {name} disabled");
        }
    }

    db.close().await?;
    Ok(())
}

fn parse_credentials(pairs: &[String]) -> Result<Credentials, RelayaError> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| {
                    RelayaError::Config(format!("credential {pair} is not in KEY=VALUE form"))
                })
        })
        .collect()
}
