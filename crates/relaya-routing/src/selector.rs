// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing strategy evaluation.
//!
//! Selection never errors on a misconfigured campaign; it degrades to
//! the account default so a send always has somewhere to go. `None` from
//! [`select_provider`] means no active provider exists at all.

use std::collections::HashMap;

use rand::Rng;
use relaya_core::types::{Campaign, DistributionSlice, Provider, RoutingStrategy};
use relaya_core::RelayaError;
use relaya_storage::ProviderRegistry;
use tracing::{debug, warn};

/// Resolve the provider a message should be sent through.
///
/// With no campaign the account default wins. Campaigns route by their
/// strategy: `single` uses the pinned provider when it is still active,
/// `distribute` draws against the configured percentage slices, and
/// `failover` takes the first active entry of the configured order.
/// Every path falls back to the default provider rather than failing.
pub async fn select_provider(
    registry: &ProviderRegistry,
    campaign: Option<&Campaign>,
) -> Result<Option<Provider>, RelayaError> {
    let Some(campaign) = campaign else {
        return registry.find_default().await;
    };

    match campaign.routing_strategy {
        RoutingStrategy::Single => select_single(registry, campaign).await,
        RoutingStrategy::Distribute => {
            let draw = rand::thread_rng().gen_range(1..=100);
            select_distribute(registry, campaign, draw).await
        }
        RoutingStrategy::Failover => select_failover(registry, campaign).await,
    }
}

/// The provider to retry with after `failed_provider` rejected a send.
///
/// Failover campaigns continue down their configured order, stopping at
/// the end. Everything else retries with the highest-priority active
/// provider that is not the one that just failed.
pub async fn next_candidate(
    registry: &ProviderRegistry,
    failed_provider: &str,
    campaign: Option<&Campaign>,
) -> Result<Option<Provider>, RelayaError> {
    if let Some(campaign) = campaign {
        if campaign.routing_strategy == RoutingStrategy::Failover {
            let position = campaign
                .failover_order
                .iter()
                .position(|name| name == failed_provider);
            let Some(position) = position else {
                return Ok(None);
            };
            for name in &campaign.failover_order[position + 1..] {
                if let Some(provider) = registry.find_by_name(name).await? {
                    if provider.is_active {
                        return Ok(Some(provider));
                    }
                }
            }
            return Ok(None);
        }
    }

    let active = registry.find_active().await?;
    Ok(active.into_iter().find(|p| p.name != failed_provider))
}

async fn select_single(
    registry: &ProviderRegistry,
    campaign: &Campaign,
) -> Result<Option<Provider>, RelayaError> {
    if let Some(name) = &campaign.provider {
        match registry.find_by_name(name).await? {
            Some(provider) if provider.is_active => return Ok(Some(provider)),
            _ => {
                warn!(
                    campaign = campaign.id.as_str(),
                    provider = name.as_str(),
                    "campaign provider missing or inactive, using default"
                );
            }
        }
    }
    registry.find_default().await
}

async fn select_distribute(
    registry: &ProviderRegistry,
    campaign: &Campaign,
    draw: u32,
) -> Result<Option<Provider>, RelayaError> {
    let active = registry.find_active().await?;
    let by_name: HashMap<&str, &Provider> =
        active.iter().map(|p| (p.name.as_str(), p)).collect();

    match pick_slice(&campaign.distribution, &by_name, draw) {
        Some(name) => {
            debug!(
                campaign = campaign.id.as_str(),
                provider = name,
                draw,
                "distribution slice selected"
            );
            Ok(by_name.get(name).map(|p| (*p).clone()))
        }
        None => select_single(registry, campaign).await,
    }
}

async fn select_failover(
    registry: &ProviderRegistry,
    campaign: &Campaign,
) -> Result<Option<Provider>, RelayaError> {
    for name in &campaign.failover_order {
        if let Some(provider) = registry.find_by_name(name).await? {
            if provider.is_active {
                return Ok(Some(provider));
            }
        }
    }
    select_single(registry, campaign).await
}

/// Walk the distribution slices in stored order, counting only slices
/// whose provider is currently active, and return the slice that
/// captures `draw` on the cumulative percentage line. A draw past the
/// configured total lands on the first active slice, so under-allocated
/// configurations skew toward the first listed provider.
fn pick_slice<'a>(
    slices: &'a [DistributionSlice],
    active: &HashMap<&str, &Provider>,
    draw: u32,
) -> Option<&'a str> {
    let mut cumulative = 0u32;
    let mut first_active = None;
    for slice in slices {
        if !active.contains_key(slice.provider.as_str()) {
            continue;
        }
        if first_active.is_none() {
            first_active = Some(slice.provider.as_str());
        }
        cumulative += slice.percent;
        if draw <= cumulative {
            return Some(slice.provider.as_str());
        }
    }
    first_active
}
