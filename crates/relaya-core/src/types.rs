// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Relaya workspace.
//!
//! Timestamps are ISO-8601 UTC strings throughout; SQLite stores them as
//! TEXT and string comparison preserves chronological order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::RelayaError;

/// An upstream SMS carrier configured by an operator.
///
/// `name` is the stable identity ("telnyx", "twilio", "signalwire") that
/// campaign routing config and webhook handlers key on; `display_name` is
/// free-form operator text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    pub display_name: String,
    pub is_active: bool,
    pub is_default: bool,
    /// Higher priority is preferred when ordering failover candidates.
    pub priority: i64,
    pub credentials: Credentials,
}

/// Opaque credential bag interpreted only by the matching carrier adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials(pub BTreeMap<String, String>);

impl Credentials {
    /// Look up a credential, treating empty strings as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Look up a credential required by an adapter, failing fast with a
    /// configuration error when it is missing.
    pub fn require(&self, carrier: &str, key: &str) -> Result<&str, RelayaError> {
        self.get(key).ok_or_else(|| {
            RelayaError::Config(format!("{carrier} credential {key} not configured"))
        })
    }
}

impl FromIterator<(String, String)> for Credentials {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Credentials(iter.into_iter().collect())
    }
}

/// Direction of a message relative to this system.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageDirection {
    Outbound,
    Inbound,
}

/// Lifecycle status of a message.
///
/// Transitions only move forward: pending -> sent -> delivered, or any
/// non-terminal state -> failed. Inbound messages are created directly in
/// `delivered` with no pending phase.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Sent,
    Delivered,
    Failed,
}

impl MessageStatus {
    /// Terminal states admit no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, MessageStatus::Delivered | MessageStatus::Failed)
    }

    /// Whether moving from `self` to `next` is a legal forward transition.
    pub fn can_transition_to(self, next: MessageStatus) -> bool {
        use MessageStatus::*;
        matches!(
            (self, next),
            (Pending, Sent) | (Pending, Failed) | (Sent, Delivered) | (Sent, Failed)
        )
    }
}

/// A single SMS record, outbound or inbound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    /// Owning account for outbound sends. Inbound messages never have one.
    pub account_id: Option<String>,
    pub campaign_id: Option<String>,
    pub contact_id: Option<String>,
    /// Stable name of the provider that handled (or received) the message.
    pub provider: Option<String>,
    pub direction: MessageDirection,
    pub to: String,
    pub from: Option<String>,
    pub body: String,
    /// Opaque metadata: the core passes it through without interpreting it.
    pub is_unicode: bool,
    pub status: MessageStatus,
    pub provider_message_id: Option<String>,
    pub error_message: Option<String>,
    pub cost: Option<f64>,
    /// JSON blob: raw carrier response for outbound, media descriptors for
    /// inbound.
    pub metadata: Option<String>,
    pub sent_at: Option<String>,
    pub delivered_at: Option<String>,
    pub received_at: Option<String>,
    pub created_at: String,
}

/// Campaign-level policy for choosing a provider across recipients.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RoutingStrategy {
    Single,
    Distribute,
    Failover,
}

/// One entry of a `distribute` campaign's percentage map.
///
/// Stored as an ordered list so the cumulative walk over "stored key
/// order" is explicit and stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSlice {
    pub provider: String,
    pub percent: u32,
}

/// A campaign as consumed by the dispatch core.
///
/// Created and managed elsewhere; the core reads its routing config and
/// increments its counters as send side effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub routing_strategy: RoutingStrategy,
    /// Pinned provider for the `single` strategy.
    pub provider: Option<String>,
    /// Percentage map for the `distribute` strategy, in stored order.
    pub distribution: Vec<DistributionSlice>,
    /// Ordered provider names for the `failover` strategy.
    pub failover_order: Vec<String>,
    pub sender_id: Option<String>,
    pub is_unicode: bool,
    pub sent_count: i64,
    pub delivered_count: i64,
    pub failed_count: i64,
    pub created_at: String,
}

/// One queued unit of work: "deliver this message".
///
/// Distinct from the message itself so a retry can re-enqueue with a
/// different pinned provider without touching the message record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendIntent {
    pub id: i64,
    pub message_id: String,
    /// Provider to use for this attempt, set by failover re-enqueue.
    pub pinned_provider: Option<String>,
    pub status: String,
    pub attempts: i64,
    /// Scheduling hint: do not claim before this instant.
    pub not_before: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Normalized request handed to a carrier adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub to: String,
    pub body: String,
    pub from: Option<String>,
    pub unicode: bool,
}

/// Why a carrier rejected a send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// Timeout, DNS failure, connection refused. Retryable.
    Transport,
    /// The carrier returned a structured error response. Retryable.
    Carrier,
}

/// Normalized result of one carrier send attempt.
///
/// Rejection is a normal return value, not an error: the dispatch worker
/// turns it into a retry-or-terminal decision.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Accepted {
        provider_message_id: Option<String>,
        raw_response: Option<serde_json::Value>,
    },
    Rejected {
        error: String,
        kind: RejectionKind,
    },
}

/// Media descriptor attached to an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub url: Option<String>,
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

/// Current UTC time as an ISO-8601 string with millisecond precision,
/// matching the format SQLite's `strftime('%Y-%m-%dT%H:%M:%fZ')` emits.
pub fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
