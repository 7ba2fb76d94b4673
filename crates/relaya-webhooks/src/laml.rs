// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared handling for Twilio-compatible form callbacks.
//!
//! Twilio and SignalWire deliver inbound messages as form POSTs signed
//! with `X-Twilio-Signature` over the public callback URL plus the
//! sorted form parameters. The two differ only in provider name and in
//! which credential holds the signing token.

use std::collections::BTreeMap;

use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use relaya_carriers::laml::{verify_signature, EMPTY_RESPONSE};
use relaya_core::types::MediaAttachment;
use relaya_core::RelayaError;
use relaya_storage::queries::messages;
use tracing::{debug, warn};

use crate::inbound::inbound_message;
use crate::server::WebhookState;

const SIGNATURE_HEADER: &str = "x-twilio-signature";

pub(crate) async fn handle_callback(
    state: &WebhookState,
    headers: &HeaderMap,
    uri: &Uri,
    params: BTreeMap<String, String>,
    carrier: &'static str,
    token_credential: &str,
) -> Response {
    let Some(provider) = state.provider(carrier).await else {
        warn!(carrier, "inbound callback but no matching provider is configured");
        return twiml_ack();
    };

    match provider.credentials.get(token_credential) {
        Some(token) => {
            let presented = headers
                .get(SIGNATURE_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            let url = callback_url(headers, uri);
            if !verify_signature(token, &url, &params, presented) {
                let err = RelayaError::SignatureInvalid {
                    carrier: carrier.to_string(),
                };
                warn!(error = %err, url = url.as_str(), "rejecting callback");
                return StatusCode::FORBIDDEN.into_response();
            }
        }
        None => {
            debug!(carrier, "no signing token configured, skipping signature verification");
        }
    }

    let from = params.get("From");
    let to = params.get("To");
    let (Some(from), Some(to)) = (from, to) else {
        let err = RelayaError::MalformedCallback(format!("{carrier} callback missing From/To"));
        warn!(error = %err, "acknowledging without a record");
        return twiml_ack();
    };

    let body = params.get("Body").cloned().unwrap_or_default();
    let provider_message_id = params
        .get("MessageSid")
        .or_else(|| params.get("SmsSid"))
        .cloned();
    let metadata = media_metadata(&params);

    let message = inbound_message(
        carrier,
        from.clone(),
        to.clone(),
        body,
        provider_message_id,
        None,
        metadata,
    );
    if let Err(e) = messages::insert_message(&state.db, &message).await {
        warn!(carrier, error = %e, "failed to persist inbound message");
    }

    twiml_ack()
}

/// Empty TwiML response: acknowledge the callback with no instructions.
fn twiml_ack() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/xml")],
        EMPTY_RESPONSE,
    )
        .into_response()
}

/// Reconstruct the public URL the carrier signed: forwarded proto (or
/// plain http), the Host header, and the request path and query.
fn callback_url(headers: &HeaderMap, uri: &Uri) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    match uri.query() {
        Some(query) => format!("{scheme}://{host}{}?{query}", uri.path()),
        None => format!("{scheme}://{host}{}", uri.path()),
    }
}

/// Collect `MediaUrl{n}` / `MediaContentType{n}` pairs announced by
/// `NumMedia` into a metadata JSON blob.
fn media_metadata(params: &BTreeMap<String, String>) -> Option<String> {
    let count: usize = params.get("NumMedia")?.parse().ok()?;
    if count == 0 {
        return None;
    }
    let attachments: Vec<MediaAttachment> = (0..count)
        .map(|i| MediaAttachment {
            url: params.get(&format!("MediaUrl{i}")).cloned(),
            content_type: params.get(&format!("MediaContentType{i}")).cloned(),
            size: None,
        })
        .collect();
    Some(serde_json::json!({ "media": attachments }).to_string())
}
