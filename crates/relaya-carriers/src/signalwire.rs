// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SignalWire compatibility (LaML) messaging adapter.
//!
//! Speaks the same `2010-04-01` Messages resource as Twilio, hosted on
//! the account's own space (`{space_url}/api/laml/...`) and
//! authenticated with the project ID and an API token.

use async_trait::async_trait;
use relaya_core::traits::SmsCarrier;
use relaya_core::types::{Provider, RejectionKind, SendOutcome, SendRequest};
use relaya_core::RelayaError;
use tracing::debug;

pub struct SignalwireCarrier {
    http: reqwest::Client,
    project_id: String,
    api_token: String,
    default_from: Option<String>,
    base_url: String,
}

impl SignalwireCarrier {
    /// Build the adapter from a provider row. `space_url` is the bare
    /// space host (for example `example.signalwire.com`).
    pub fn from_provider(http: reqwest::Client, provider: &Provider) -> Result<Self, RelayaError> {
        let space_url = provider.credentials.require("signalwire", "space_url")?;
        let base_url = format!("https://{space_url}");
        let project_id = provider
            .credentials
            .require("signalwire", "project_id")?
            .to_string();
        let api_token = provider
            .credentials
            .require("signalwire", "api_token")?
            .to_string();
        Ok(Self {
            http,
            project_id,
            api_token,
            default_from: provider.credentials.get("from_number").map(str::to_string),
            base_url,
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
                provider: "signalwire".to_string(),
            })
    }
}

#[async_trait]
impl SmsCarrier for SignalwireCarrier {
    fn name(&self) -> &str {
        "signalwire"
    }

    async fn send(&self, request: &SendRequest) -> Result<SendOutcome, RelayaError> {
        let from = self.sender(request)?;
        let params = [
            ("From", from.as_str()),
            ("To", request.to.as_str()),
            ("Body", request.body.as_str()),
        ];

        let url = format!(
            "{}/api/laml/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.project_id
        );
        let response = match self
            .http
            .post(url)
            .basic_auth(&self.project_id, Some(&self.api_token))
            .form(&params)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return Ok(SendOutcome::Rejected {
                    error: format!("signalwire request failed: {e}"),
                    kind: RejectionKind::Transport,
                });
            }
        };

        let status = response.status();
        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                return Ok(SendOutcome::Rejected {
                    error: format!("signalwire returned unparseable body (HTTP {status}): {e}"),
                    kind: RejectionKind::Carrier,
                });
            }
        };

        if status.is_success() {
            let provider_message_id = body["sid"].as_str().map(str::to_string);
            debug!(sid = provider_message_id.as_deref(), "signalwire accepted message");
            Ok(SendOutcome::Accepted {
                provider_message_id,
                raw_response: Some(body),
            })
        } else {
            let message = body["message"].as_str().unwrap_or("unknown error");
            Ok(SendOutcome::Rejected {
                error: format!("signalwire rejected message (HTTP {status}): {message}"),
                kind: RejectionKind::Carrier,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider() -> Provider {
        Provider {
            name: "signalwire".to_string(),
            display_name: "SignalWire".to_string(),
            is_active: true,
            is_default: false,
            priority: 0,
            credentials: [
                ("space_url".to_string(), "example.signalwire.com".to_string()),
                ("project_id".to_string(), "proj-1".to_string()),
                ("api_token".to_string(), "tok".to_string()),
            ]
            .into_iter()
            .collect(),
        }
    }

    fn request() -> SendRequest {
        SendRequest {
            to: "+15551230001".to_string(),
            body: "hi".to_string(),
            from: Some("+15559990000".to_string()),
            unicode: false,
        }
    }

    #[test]
    fn space_url_is_required() {
        let mut provider = provider();
        provider.credentials.0.remove("space_url");
        let err = SignalwireCarrier::from_provider(reqwest::Client::new(), &provider)
            .err()
            .unwrap();
        assert!(matches!(err, RelayaError::Config(_)));
    }

    #[test]
    fn base_url_is_built_from_the_space() {
        let carrier = SignalwireCarrier::from_provider(reqwest::Client::new(), &provider()).unwrap();
        assert_eq!(carrier.base_url, "https://example.signalwire.com");
    }

    #[tokio::test]
    async fn accepted_send_targets_the_laml_messages_resource() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/laml/2010-04-01/Accounts/proj-1/Messages.json"))
            .and(body_string_contains("To=%2B15551230001"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "sid": "SW456", "status": "queued"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let carrier = SignalwireCarrier::from_provider(reqwest::Client::new(), &provider())
            .unwrap()
            .with_base_url(server.uri());

        let outcome = carrier.send(&request()).await.unwrap();
        match outcome {
            SendOutcome::Accepted {
                provider_message_id,
                ..
            } => assert_eq!(provider_message_id.as_deref(), Some("SW456")),
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn carrier_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/laml/2010-04-01/Accounts/proj-1/Messages.json"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "message": "Permission denied"
            })))
            .mount(&server)
            .await;

        let carrier = SignalwireCarrier::from_provider(reqwest::Client::new(), &provider())
            .unwrap()
            .with_base_url(server.uri());

        let outcome = carrier.send(&request()).await.unwrap();
        match outcome {
            SendOutcome::Rejected { error, kind } => {
                assert_eq!(kind, RejectionKind::Carrier);
                assert!(error.contains("Permission denied"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
