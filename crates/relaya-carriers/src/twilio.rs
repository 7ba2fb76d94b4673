// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio Programmable Messaging adapter.

use async_trait::async_trait;
use relaya_core::traits::SmsCarrier;
use relaya_core::types::{Provider, RejectionKind, SendOutcome, SendRequest};
use relaya_core::RelayaError;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// Sends messages through the `2010-04-01` Messages resource with basic
/// auth (`account_sid` / `auth_token`) and a form-encoded body.
pub struct TwilioCarrier {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    default_from: Option<String>,
    base_url: String,
}

impl TwilioCarrier {
    pub fn from_provider(http: reqwest::Client, provider: &Provider) -> Result<Self, RelayaError> {
        let account_sid = provider.credentials.require("twilio", "account_sid")?.to_string();
        let auth_token = provider.credentials.require("twilio", "auth_token")?.to_string();
        Ok(Self {
            http,
            account_sid,
            auth_token,
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
                provider: "twilio".to_string(),
            })
    }
}

#[async_trait]
impl SmsCarrier for TwilioCarrier {
    fn name(&self) -> &str {
        "twilio"
    }

    async fn send(&self, request: &SendRequest) -> Result<SendOutcome, RelayaError> {
        let from = self.sender(request)?;
        let params = [
            ("From", from.as_str()),
            ("To", request.to.as_str()),
            ("Body", request.body.as_str()),
        ];

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );
        let response = match self
            .http
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return Ok(SendOutcome::Rejected {
                    error: format!("twilio request failed: {e}"),
                    kind: RejectionKind::Transport,
                });
            }
        };

        let status = response.status();
        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                return Ok(SendOutcome::Rejected {
                    error: format!("twilio returned unparseable body (HTTP {status}): {e}"),
                    kind: RejectionKind::Carrier,
                });
            }
        };

        if status.is_success() {
            let provider_message_id = body["sid"].as_str().map(str::to_string);
            debug!(sid = provider_message_id.as_deref(), "twilio accepted message");
            Ok(SendOutcome::Accepted {
                provider_message_id,
                raw_response: Some(body),
            })
        } else {
            let message = body["message"].as_str().unwrap_or("unknown error");
            Ok(SendOutcome::Rejected {
                error: format!("twilio rejected message (HTTP {status}): {message}"),
                kind: RejectionKind::Carrier,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider() -> Provider {
        Provider {
            name: "twilio".to_string(),
            display_name: "Twilio".to_string(),
            is_active: true,
            is_default: false,
            priority: 0,
            credentials: [
                ("account_sid".to_string(), "AC123".to_string()),
                ("auth_token".to_string(), "tok".to_string()),
            ]
            .into_iter()
            .collect(),
        }
    }

    fn request() -> SendRequest {
        SendRequest {
            to: "+15551230001".to_string(),
            body: "hello there".to_string(),
            from: Some("+15559990000".to_string()),
            unicode: false,
        }
    }

    #[test]
    fn missing_auth_token_fails_fast() {
        let mut provider = provider();
        provider.credentials.0.remove("auth_token");
        let err = TwilioCarrier::from_provider(reqwest::Client::new(), &provider)
            .err()
            .unwrap();
        assert!(matches!(err, RelayaError::Config(_)));
    }

    #[tokio::test]
    async fn accepted_send_posts_a_form_to_the_account_resource() {
        let server = MockServer::start().await;
        // "AC123:tok" base64-encoded.
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .and(header("authorization", "Basic QUMxMjM6dG9r"))
            .and(body_string_contains("To=%2B15551230001"))
            .and(body_string_contains("Body=hello+there"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "sid": "SM123", "status": "queued"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let carrier = TwilioCarrier::from_provider(reqwest::Client::new(), &provider())
            .unwrap()
            .with_base_url(server.uri());

        let outcome = carrier.send(&request()).await.unwrap();
        match outcome {
            SendOutcome::Accepted {
                provider_message_id,
                ..
            } => assert_eq!(provider_message_id.as_deref(), Some("SM123")),
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn carrier_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": 21211, "message": "The 'To' number is not a valid phone number."
            })))
            .mount(&server)
            .await;

        let carrier = TwilioCarrier::from_provider(reqwest::Client::new(), &provider())
            .unwrap()
            .with_base_url(server.uri());

        let outcome = carrier.send(&request()).await.unwrap();
        match outcome {
            SendOutcome::Rejected { error, kind } => {
                assert_eq!(kind, RejectionKind::Carrier);
                assert!(error.contains("not a valid phone number"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_rejection() {
        let carrier = TwilioCarrier::from_provider(reqwest::Client::new(), &provider())
            .unwrap()
            .with_base_url("http://127.0.0.1:1");

        let outcome = carrier.send(&request()).await.unwrap();
        assert!(matches!(
            outcome,
            SendOutcome::Rejected {
                kind: RejectionKind::Transport,
                ..
            }
        ));
    }
}
