// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SignalWire inbound webhook handler.
//!
//! Same wire format as Twilio; the signing token lives in the
//! `api_token` credential.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::{HeaderMap, Uri};
use axum::response::Response;
use axum::Form;

use crate::laml::handle_callback;
use crate::server::WebhookState;

pub async fn handle(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    uri: Uri,
    Form(params): Form<BTreeMap<String, String>>,
) -> Response {
    handle_callback(&state, &headers, &uri, params, "signalwire", "api_token").await
}
