// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Construction of inbound message records.

use relaya_core::types::{now_iso, Message, MessageDirection, MessageStatus};

/// Build an inbound message record. Inbound traffic has already reached
/// us, so it is created directly as `delivered` and owned by no account.
pub(crate) fn inbound_message(
    provider: &str,
    from: String,
    to: String,
    body: String,
    provider_message_id: Option<String>,
    received_at: Option<String>,
    metadata: Option<String>,
) -> Message {
    let now = now_iso();
    Message {
        id: uuid::Uuid::new_v4().to_string(),
        account_id: None,
        campaign_id: None,
        contact_id: None,
        provider: Some(provider.to_string()),
        direction: MessageDirection::Inbound,
        to,
        from: Some(from),
        body,
        is_unicode: false,
        status: MessageStatus::Delivered,
        provider_message_id,
        error_message: None,
        cost: None,
        metadata,
        sent_at: None,
        delivered_at: None,
        received_at: Some(received_at.unwrap_or_else(|| now.clone())),
        created_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_records_are_delivered_and_unowned() {
        let msg = inbound_message(
            "telnyx",
            "+15551230001".to_string(),
            "+15559990000".to_string(),
            "hi".to_string(),
            Some("prov-1".to_string()),
            None,
            None,
        );
        assert_eq!(msg.direction, MessageDirection::Inbound);
        assert_eq!(msg.status, MessageStatus::Delivered);
        assert!(msg.account_id.is_none());
        assert!(msg.received_at.is_some());
        assert_eq!(msg.from.as_deref(), Some("+15551230001"));
    }

    #[test]
    fn carrier_timestamp_wins_over_the_local_clock() {
        let msg = inbound_message(
            "twilio",
            "+1".to_string(),
            "+2".to_string(),
            String::new(),
            None,
            Some("2026-01-01T00:00:00.000Z".to_string()),
            None,
        );
        assert_eq!(msg.received_at.as_deref(), Some("2026-01-01T00:00:00.000Z"));
    }
}
