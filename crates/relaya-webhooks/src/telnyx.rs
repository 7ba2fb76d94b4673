// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telnyx inbound webhook handler.
//!
//! Telnyx signs webhooks with Ed25519 over `timestamp|rawBody`, with
//! the signature and timestamp carried in request headers and the
//! public key published per account. Only `message.received` events
//! produce a record; everything else is acknowledged and dropped.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::prelude::*;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use relaya_core::types::MediaAttachment;
use relaya_core::RelayaError;
use relaya_storage::queries::messages;
use tracing::{debug, warn};

use crate::inbound::inbound_message;
use crate::server::WebhookState;

pub async fn handle(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(public_key) = &state.telnyx_public_key {
        let signature = header_str(&headers, "telnyx-signature-ed25519");
        let timestamp = header_str(&headers, "telnyx-timestamp");
        let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
            warn!("telnyx webhook missing signature headers");
            return StatusCode::FORBIDDEN.into_response();
        };
        if !verify_signature(public_key, signature, timestamp, &body) {
            let err = RelayaError::SignatureInvalid {
                carrier: "telnyx".to_string(),
            };
            warn!(error = %err, "rejecting telnyx webhook");
            return StatusCode::FORBIDDEN.into_response();
        }
    } else {
        debug!("telnyx public key not configured, skipping signature verification");
    }

    let Ok(event) = serde_json::from_slice::<serde_json::Value>(&body) else {
        warn!("telnyx webhook body is not valid json");
        return StatusCode::OK.into_response();
    };

    let event_type = event["data"]["event_type"].as_str().unwrap_or_default();
    if event_type != "message.received" {
        debug!(event_type, "ignoring telnyx event");
        return StatusCode::OK.into_response();
    }

    let payload = &event["data"]["payload"];
    let from = payload["from"]["phone_number"].as_str();
    let to = payload["to"][0]["phone_number"].as_str();

    if state.provider("telnyx").await.is_none() {
        warn!("inbound telnyx message but no telnyx provider is configured");
        return StatusCode::OK.into_response();
    }
    let (Some(from), Some(to)) = (from, to) else {
        let err =
            RelayaError::MalformedCallback("telnyx message.received missing from/to".to_string());
        warn!(error = %err, "acknowledging without a record");
        return StatusCode::OK.into_response();
    };

    let text = payload["text"].as_str().unwrap_or_default();
    let provider_message_id = payload["id"].as_str().map(str::to_string);
    let received_at = payload["received_at"].as_str().map(str::to_string);
    let metadata = media_metadata(&payload["media"]);

    let message = inbound_message(
        "telnyx",
        from.to_string(),
        to.to_string(),
        text.to_string(),
        provider_message_id,
        received_at,
        metadata,
    );
    if let Err(e) = messages::insert_message(&state.db, &message).await {
        warn!(error = %e, "failed to persist inbound telnyx message");
    }

    StatusCode::OK.into_response()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Verify an Ed25519 signature over `timestamp|rawBody`. Key and
/// signature are both base64.
fn verify_signature(public_key: &str, signature: &str, timestamp: &str, body: &[u8]) -> bool {
    let Ok(key_bytes) = BASE64_STANDARD.decode(public_key) else {
        return false;
    };
    let Ok(key_bytes) = <[u8; 32]>::try_from(key_bytes.as_slice()) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };
    let Ok(sig_bytes) = BASE64_STANDARD.decode(signature) else {
        return false;
    };
    let Ok(sig_bytes) = <[u8; 64]>::try_from(sig_bytes.as_slice()) else {
        return false;
    };
    let sig = Signature::from_bytes(&sig_bytes);

    let mut payload = Vec::with_capacity(timestamp.len() + 1 + body.len());
    payload.extend_from_slice(timestamp.as_bytes());
    payload.push(b'|');
    payload.extend_from_slice(body);
    key.verify(&payload, &sig).is_ok()
}

fn media_metadata(media: &serde_json::Value) -> Option<String> {
    let items = media.as_array()?;
    if items.is_empty() {
        return None;
    }
    let attachments: Vec<MediaAttachment> = items
        .iter()
        .map(|item| MediaAttachment {
            url: item["url"].as_str().map(str::to_string),
            content_type: item["content_type"].as_str().map(str::to_string),
            size: item["size"].as_i64(),
        })
        .collect();
    Some(serde_json::json!({ "media": attachments }).to_string())
}
