// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.
//!
//! One POST route per carrier. Signature verification and payload
//! normalization live in the per-carrier handler modules.

use axum::routing::post;
use axum::Router;
use relaya_config::model::WebhookConfig;
use relaya_core::types::Provider;
use relaya_core::RelayaError;
use relaya_storage::queries::providers;
use relaya_storage::Database;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{signalwire, telnyx, twilio};

/// Shared state for webhook handlers.
#[derive(Clone)]
pub struct WebhookState {
    pub db: Database,
    /// Base64 Ed25519 public key for Telnyx callbacks. `None` disables
    /// verification.
    pub telnyx_public_key: Option<String>,
}

impl WebhookState {
    /// Provider row for a carrier, or `None` when it is missing or the
    /// lookup fails. Handlers acknowledge callbacks either way, so a
    /// storage hiccup here downgrades to a dropped record, not a 500.
    pub(crate) async fn provider(&self, name: &str) -> Option<Provider> {
        match providers::find_by_name(&self.db, name).await {
            Ok(provider) => provider,
            Err(e) => {
                error!(carrier = name, error = %e, "provider lookup failed");
                None
            }
        }
    }
}

/// Build the webhook router.
pub fn webhook_router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhooks/telnyx", post(telnyx::handle))
        .route("/webhooks/twilio", post(twilio::handle))
        .route("/webhooks/signalwire", post(signalwire::handle))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve the webhook endpoints until shutdown.
pub async fn start_server(config: &WebhookConfig, state: WebhookState) -> Result<(), RelayaError> {
    let app = webhook_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RelayaError::Server {
            message: format!("failed to bind webhook server to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("webhook server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| RelayaError::Server {
            message: format!("webhook server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}

/// Resolves on ctrl-c, letting in-flight requests finish before the
/// server stops.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "could not install the shutdown handler");
        return std::future::pending().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tempfile::tempdir;
    use tower::ServiceExt;

    #[tokio::test]
    async fn unknown_routes_are_404() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();
        let router = webhook_router(WebhookState {
            db: db.clone(),
            telnyx_public_key: None,
        });

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhooks/nexmo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        db.close().await.unwrap();
    }
}
