// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telnyx Messaging API adapter.

use async_trait::async_trait;
use relaya_core::traits::SmsCarrier;
use relaya_core::types::{Provider, RejectionKind, SendOutcome, SendRequest};
use relaya_core::RelayaError;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.telnyx.com";

/// Sends messages through `POST /v2/messages` with bearer auth.
pub struct TelnyxCarrier {
    http: reqwest::Client,
    api_key: String,
    default_from: Option<String>,
    base_url: String,
}

impl TelnyxCarrier {
    /// Build the adapter from a provider row, failing fast when the
    /// `api_key` credential is missing.
    pub fn from_provider(http: reqwest::Client, provider: &Provider) -> Result<Self, RelayaError> {
        let api_key = provider.credentials.require("telnyx", "api_key")?.to_string();
        Ok(Self {
            http,
            api_key,
            default_from: provider.credentials.get("from_number").map(str::to_string),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn sender(&self, request: &SendRequest) -> Result<String, RelayaError> {
        request
            .from
            .clone()
            .or_else(|| self.default_from.clone())
            .ok_or_else(|| RelayaError::NoSenderConfigured {
                provider: "telnyx".to_string(),
            })
    }
}

#[async_trait]
impl SmsCarrier for TelnyxCarrier {
    fn name(&self) -> &str {
        "telnyx"
    }

    async fn send(&self, request: &SendRequest) -> Result<SendOutcome, RelayaError> {
        let from = self.sender(request)?;
        let payload = serde_json::json!({
            "from": from,
            "to": request.to,
            "text": request.body,
        });

        let response = match self
            .http
            .post(format!("{}/v2/messages", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return Ok(SendOutcome::Rejected {
                    error: format!("telnyx request failed: {e}"),
                    kind: RejectionKind::Transport,
                });
            }
        };

        let status = response.status();
        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                return Ok(SendOutcome::Rejected {
                    error: format!("telnyx returned unparseable body (HTTP {status}): {e}"),
                    kind: RejectionKind::Carrier,
                });
            }
        };

        if status.is_success() {
            let provider_message_id = body["data"]["id"].as_str().map(str::to_string);
            debug!(id = provider_message_id.as_deref(), "telnyx accepted message");
            Ok(SendOutcome::Accepted {
                provider_message_id,
                raw_response: Some(body),
            })
        } else {
            let detail = body["errors"][0]["detail"]
                .as_str()
                .unwrap_or("unknown error");
            Ok(SendOutcome::Rejected {
                error: format!("telnyx rejected message (HTTP {status}): {detail}"),
                kind: RejectionKind::Carrier,
            })
        }
    }
}
