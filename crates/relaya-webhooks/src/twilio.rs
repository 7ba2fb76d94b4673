// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio inbound webhook handler.

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
    handle_callback(&state, &headers, &uri, params, "twilio", "auth_token").await
}

#[cfg(test)]
mod tests {
    use crate::server::{webhook_router, WebhookState};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use relaya_carriers::laml::{compute_signature, EMPTY_RESPONSE};
    use relaya_core::types::{Credentials, MessageStatus, Provider};
    use relaya_storage::{Database, ProviderRegistry};
    use std::collections::BTreeMap;
    use tempfile::tempdir;
    use tower::ServiceExt;

    async fn setup(credentials: &[(&str, &str)]) -> (axum::Router, Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();
        let registry = ProviderRegistry::new(db.clone());
        registry
            .upsert(&Provider {
                name: "twilio".to_string(),
                display_name: "Twilio".to_string(),
                is_active: true,
                is_default: true,
                priority: 0,
                credentials: credentials
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<Credentials>(),
            })
            .await
            .unwrap();
        let router = webhook_router(WebhookState {
            db: db.clone(),
            telnyx_public_key: None,
        });
        (router, db, dir)
    }

    fn inbound_params() -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("MessageSid".to_string(), "SM999".to_string());
        params.insert("From".to_string(), "+15551230001".to_string());
        params.insert("To".to_string(), "+15559990000".to_string());
        params.insert("Body".to_string(), "inbound hello".to_string());
        params
    }

    fn form_request(params: &BTreeMap<String, String>, signature: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/webhooks/twilio")
            .header("host", "relay.test")
            .header("content-type", "application/x-www-form-urlencoded");
        if let Some(signature) = signature {
            builder = builder.header("x-twilio-signature", signature);
        }
        builder
            .body(Body::from(serde_urlencoded::to_string(params).unwrap()))
            .unwrap()
    }

    async fn count_messages(db: &Database) -> i64 {
        db.connection()
            .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))?))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn signed_callback_creates_an_inbound_delivered_record() {
        let (router, db, _dir) = setup(&[("auth_token", "tok")]).await;

        let params = inbound_params();
        let signature = compute_signature("tok", "http://relay.test/webhooks/twilio", &params);
        let response = router
            .oneshot(form_request(&params, Some(&signature)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap(),
            "text/xml"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, EMPTY_RESPONSE.as_bytes());

        let stored: (String, String, String, String) = db
            .connection()
            .call(|conn| {
                Ok(conn.query_row(
                    "SELECT sender, body, status, provider_message_id FROM messages",
                    [],
                    |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
                )?)
            })
            .await
            .unwrap();
        assert_eq!(stored.0, "+15551230001");
        assert_eq!(stored.1, "inbound hello");
        assert_eq!(stored.2, MessageStatus::Delivered.to_string());
        assert_eq!(stored.3, "SM999");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn bad_signature_is_rejected_with_403() {
        let (router, db, _dir) = setup(&[("auth_token", "tok")]).await;

        let params = inbound_params();
        let response = router
            .oneshot(form_request(&params, Some("bogus")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(count_messages(&db).await, 0);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn missing_signature_header_fails_verification() {
        let (router, db, _dir) = setup(&[("auth_token", "tok")]).await;

        let response = router
            .oneshot(form_request(&inbound_params(), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(count_messages(&db).await, 0);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn no_token_configured_skips_verification() {
        let (router, db, _dir) = setup(&[]).await;

        let response = router
            .oneshot(form_request(&inbound_params(), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(count_messages(&db).await, 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn missing_sender_is_acknowledged_without_a_record() {
        let (router, db, _dir) = setup(&[]).await;

        let mut params = inbound_params();
        params.remove("From");
        let response = router.oneshot(form_request(&params, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, EMPTY_RESPONSE.as_bytes());
        assert_eq!(count_messages(&db).await, 0);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn media_attachments_land_in_metadata() {
        let (router, db, _dir) = setup(&[]).await;

        let mut params = inbound_params();
        params.insert("NumMedia".to_string(), "1".to_string());
        params.insert("MediaUrl0".to_string(), "https://m.test/pic".to_string());
        params.insert("MediaContentType0".to_string(), "image/png".to_string());
        router.oneshot(form_request(&params, None)).await.unwrap();

        let metadata: String = db
            .connection()
            .call(|conn| Ok(conn.query_row("SELECT metadata FROM messages", [], |r| r.get(0))?))
            .await
            .unwrap();
        assert!(metadata.contains("https://m.test/pic"));
        assert!(metadata.contains("image/png"));
        db.close().await.unwrap();
    }
}
