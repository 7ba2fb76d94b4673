// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The claim/resolve/send/record loop.
//!
//! Each claimed intent is processed to one of three ends: the message is
//! marked sent, the intent is re-enqueued for a later attempt with a
//! pinned retry provider, or the message is marked failed and the intent
//! leaves the queue. Campaign counters are bumped on the terminal paths.

use std::sync::Arc;
use std::time::Duration;

use relaya_config::model::DispatchConfig;
use relaya_core::traits::CarrierFactory;
use relaya_core::types::{
    Campaign, Message, MessageStatus, Provider, SendOutcome, SendRequest,
};
use relaya_core::RelayaError;
use relaya_routing::selector;
use relaya_storage::queries::{campaigns, intents, messages};
use relaya_storage::{Database, ProviderRegistry, SendIntent};
use tracing::{debug, error, info, warn};

/// Processes send intents until shutdown.
#[derive(Clone)]
pub struct DispatchWorker {
    db: Database,
    registry: ProviderRegistry,
    carriers: Arc<dyn CarrierFactory>,
    config: DispatchConfig,
}

impl DispatchWorker {
    pub fn new(
        db: Database,
        registry: ProviderRegistry,
        carriers: Arc<dyn CarrierFactory>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            db,
            registry,
            carriers,
            config,
        }
    }

    /// Poll the queue forever, sleeping when it is empty. Intent-level
    /// errors are logged and do not stop the loop.
    pub async fn run(&self) {
        let idle = Duration::from_millis(self.config.poll_interval_ms);
        loop {
            match self.run_once().await {
                Ok(true) => {}
                Ok(false) => tokio::time::sleep(idle).await,
                Err(e) => {
                    error!(error = %e, "dispatch cycle failed");
                    tokio::time::sleep(idle).await;
                }
            }
        }
    }

    /// Claim and process at most one intent. Returns whether one was
    /// claimed, so callers can distinguish progress from an empty queue.
    ///
    /// The attempt runs in its own task: a panic or an unexpected error
    /// burns the attempt instead of stranding the claim in `processing`.
    pub async fn run_once(&self) -> Result<bool, RelayaError> {
        let Some(intent) = intents::claim_next(&self.db).await? else {
            return Ok(false);
        };
        let task = {
            let worker = self.clone();
            let intent = intent.clone();
            tokio::spawn(async move { worker.process_intent(intent).await })
        };
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => self.recover(&intent, &e.to_string()).await,
            Err(e) => {
                let reason = if e.is_panic() {
                    "send attempt panicked".to_string()
                } else {
                    e.to_string()
                };
                self.recover(&intent, &reason).await;
            }
        }
        Ok(true)
    }

    /// An unexpected error counts against the attempt budget like a
    /// carrier rejection: the intent goes back on the queue with backoff,
    /// or the message fails terminally once the budget is spent.
    async fn recover(&self, intent: &SendIntent, error: &str) {
        error!(
            intent = intent.id,
            message = intent.message_id.as_str(),
            attempt = intent.attempts,
            error,
            "attempt lost to an unexpected error"
        );
        if (intent.attempts as u32) < self.config.max_attempts {
            let not_before =
                iso_after_secs(self.config.backoff_for_attempt(intent.attempts as u32));
            if let Err(e) = intents::defer(&self.db, intent.id, &not_before).await {
                error!(intent = intent.id, error = %e, "could not defer intent");
            }
            return;
        }
        // Settle steps are independent; a failing one is logged and the
        // rest still run.
        if let Err(e) = messages::mark_failed(&self.db, &intent.message_id, error).await {
            error!(message = intent.message_id.as_str(), error = %e, "could not mark message failed");
        }
        if let Ok(Some(message)) = messages::get_message(&self.db, &intent.message_id).await {
            if let Some(campaign_id) = &message.campaign_id {
                if let Err(e) = campaigns::increment_failed(&self.db, campaign_id).await {
                    error!(campaign = campaign_id.as_str(), error = %e, "could not bump failed count");
                }
            }
        }
        if let Err(e) = intents::fail(&self.db, intent.id).await {
            error!(intent = intent.id, error = %e, "could not fail intent");
        }
    }

    async fn process_intent(&self, intent: SendIntent) -> Result<(), RelayaError> {
        let Some(message) = messages::get_message(&self.db, &intent.message_id).await? else {
            warn!(intent = intent.id, message = intent.message_id.as_str(), "intent references a missing message");
            intents::fail(&self.db, intent.id).await?;
            return Ok(());
        };

        if message.status != MessageStatus::Pending {
            debug!(message = message.id.as_str(), status = %message.status, "message already settled, dropping intent");
            intents::complete(&self.db, intent.id).await?;
            return Ok(());
        }

        let campaign = match &message.campaign_id {
            Some(id) => campaigns::get_campaign(&self.db, id).await?,
            None => None,
        };

        let provider = match self.resolve_provider(&intent, campaign.as_ref()).await? {
            Ok(provider) => provider,
            Err(reason) => {
                return self.settle_failed(&intent, &message, campaign.as_ref(), &reason).await;
            }
        };

        let carrier = match self.carriers.carrier_for(&provider) {
            Ok(carrier) => carrier,
            Err(e) => {
                // Bad provider config never improves with retries.
                return self.settle_failed(&intent, &message, campaign.as_ref(), &e.to_string()).await;
            }
        };

        let request = SendRequest {
            to: message.to.clone(),
            body: message.body.clone(),
            from: message
                .from
                .clone()
                .or_else(|| campaign.as_ref().and_then(|c| c.sender_id.clone())),
            unicode: message.is_unicode
                || campaign.as_ref().is_some_and(|c| c.is_unicode),
        };

        match carrier.send(&request).await {
            Ok(SendOutcome::Accepted {
                provider_message_id,
                raw_response,
            }) => {
                info!(
                    message = message.id.as_str(),
                    provider = provider.name.as_str(),
                    attempt = intent.attempts,
                    "message accepted by carrier"
                );
                messages::mark_sent(
                    &self.db,
                    &message.id,
                    &provider.name,
                    provider_message_id,
                    raw_response.map(|v| v.to_string()),
                )
                .await?;
                if let Some(campaign) = &campaign {
                    campaigns::increment_sent(&self.db, &campaign.id).await?;
                }
                intents::complete(&self.db, intent.id).await?;
                Ok(())
            }
            Ok(SendOutcome::Rejected { error, kind }) => {
                warn!(
                    message = message.id.as_str(),
                    provider = provider.name.as_str(),
                    attempt = intent.attempts,
                    kind = ?kind,
                    error = error.as_str(),
                    "carrier rejected message"
                );
                self.retry_or_fail(&intent, &message, campaign.as_ref(), &provider, &error)
                    .await
            }
            // Terminal adapter errors, e.g. no sender resolvable.
            Err(e) => {
                self.settle_failed(&intent, &message, campaign.as_ref(), &e.to_string())
                    .await
            }
        }
    }

    /// Resolve the provider for this attempt. The outer error channel is
    /// for storage failures; the inner `Err(String)` is a terminal
    /// routing verdict for the message itself.
    async fn resolve_provider(
        &self,
        intent: &SendIntent,
        campaign: Option<&Campaign>,
    ) -> Result<Result<Provider, String>, RelayaError> {
        if let Some(pinned) = &intent.pinned_provider {
            return Ok(match self.registry.find_by_name(pinned).await? {
                Some(provider) if provider.is_active => Ok(provider),
                Some(provider) => Err(RelayaError::ProviderInactive {
                    provider: provider.name,
                }
                .to_string()),
                None => Err(RelayaError::NoProviderAvailable.to_string()),
            });
        }

        Ok(match selector::select_provider(&self.registry, campaign).await? {
            Some(provider) => Ok(provider),
            None => Err(RelayaError::NoProviderAvailable.to_string()),
        })
    }

    async fn retry_or_fail(
        &self,
        intent: &SendIntent,
        message: &Message,
        campaign: Option<&Campaign>,
        failed_provider: &Provider,
        error: &str,
    ) -> Result<(), RelayaError> {
        if (intent.attempts as u32) < self.config.max_attempts {
            if let Some(next) =
                selector::next_candidate(&self.registry, &failed_provider.name, campaign).await?
            {
                let delay = self.config.backoff_for_attempt(intent.attempts as u32);
                let not_before = iso_after_secs(delay);
                info!(
                    message = message.id.as_str(),
                    next = next.name.as_str(),
                    delay_secs = delay,
                    "re-enqueueing for retry"
                );
                intents::reenqueue(&self.db, intent.id, &next.name, &not_before).await?;
                return Ok(());
            }
        }
        self.settle_failed(intent, message, campaign, error).await
    }

    async fn settle_failed(
        &self,
        intent: &SendIntent,
        message: &Message,
        campaign: Option<&Campaign>,
        error: &str,
    ) -> Result<(), RelayaError> {
        warn!(
            message = message.id.as_str(),
            attempts = intent.attempts,
            error,
            "message failed terminally"
        );
        messages::mark_failed(&self.db, &message.id, error).await?;
        if let Some(campaign) = campaign {
            campaigns::increment_failed(&self.db, &campaign.id).await?;
        }
        intents::fail(&self.db, intent.id).await?;
        Ok(())
    }
}

fn iso_after_secs(secs: u64) -> String {
    (chrono::Utc::now() + chrono::Duration::seconds(secs as i64))
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}
