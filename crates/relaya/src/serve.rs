// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `serve` subcommand: dispatch workers plus webhook server.

use std::sync::Arc;
use std::time::Duration;

use relaya_carriers::DefaultCarrierFactory;
use relaya_config::RelayaConfig;
use relaya_core::traits::CarrierFactory;
use relaya_core::RelayaError;
use relaya_dispatch::DispatchWorker;
use relaya_storage::queries::intents;
use relaya_storage::{Database, ProviderRegistry};
use relaya_webhooks::WebhookState;
use tracing::info;

pub async fn run(config: &RelayaConfig) -> Result<(), RelayaError> {
    let db = Database::open_with(&config.storage.database_path, config.storage.wal_mode).await?;
    let registry = ProviderRegistry::new(db.clone());
    let carriers: Arc<dyn CarrierFactory> = Arc::new(DefaultCarrierFactory::new(
        Duration::from_secs(config.dispatch.http_timeout_secs),
    )?);

    let released = intents::release_processing(&db).await?;
    if released > 0 {
        info!(released, "returned orphaned send intents to the queue");
    }

    for _ in 0..config.dispatch.workers {
        let worker = DispatchWorker::new(
            db.clone(),
            registry.clone(),
            carriers.clone(),
            config.dispatch.clone(),
        );
        tokio::spawn(async move { worker.run().await });
    }
    info!(workers = config.dispatch.workers, "dispatch workers started");

    let state = WebhookState {
        db,
        telnyx_public_key: config.telnyx.public_key.clone(),
    };
    relaya_webhooks::start_server(&config.webhooks, state).await
}
