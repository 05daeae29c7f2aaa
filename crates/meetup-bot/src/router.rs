//! Router configuration and server setup.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use meetup_messenger::WebhookPayload;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::BotConfig;
use crate::error::ApiError;
use crate::handlers;
use crate::state::BotState;

/// Query parameters of the webhook verification request.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Creates the router with all routes configured.
pub fn create_router(state: BotState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Starts the server and runs until Ctrl+C.
pub async fn serve(config: &BotConfig, state: BotState) -> Result<(), std::io::Error> {
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("webhook server listening on {}", addr);
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

/// GET /health
pub async fn health(State(state): State<BotState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.config.uptime_seconds(),
    })
}

/// GET /webhook - subscription handshake.
pub async fn verify_webhook(
    State(state): State<BotState>,
    Query(params): Query<VerifyParams>,
) -> Result<String, ApiError> {
    if params.mode.as_deref() != Some("subscribe") {
        return Err(ApiError::Forbidden("unsupported hub.mode".to_string()));
    }
    if params.verify_token.as_deref() != Some(state.config.verify_token.as_str()) {
        warn!("webhook verification failed: token mismatch");
        return Err(ApiError::Forbidden("verify token mismatch".to_string()));
    }

    let challenge = params
        .challenge
        .ok_or_else(|| ApiError::BadRequest("missing hub.challenge".to_string()))?;
    info!("webhook verified");
    Ok(challenge)
}

/// POST /webhook - event delivery.
///
/// Always acknowledges once the body parses; handler failures are only
/// logged because Messenger redelivers anything that is not a 2xx.
pub async fn receive_webhook(
    State(state): State<BotState>,
    Json(payload): Json<WebhookPayload>,
) -> (StatusCode, Json<Value>) {
    if !payload.is_page() {
        debug!(object = %payload.object, "ignoring non-page delivery");
        return (StatusCode::OK, Json(json!({"status": "ignored"})));
    }

    let mut handled = 0usize;
    for entry in &payload.entry {
        if !state.config.accepts_page(entry.id.as_deref()) {
            debug!(page = ?entry.id, "skipping entry for another page");
            continue;
        }
        for event in &entry.messaging {
            match handlers::dispatch(&state, event).await {
                Ok(()) => handled += 1,
                Err(e) => warn!(
                    error = %e,
                    sender = ?event.sender_id(),
                    payload = ?event.postback_payload(),
                    "failed to handle messaging event"
                ),
            }
        }
    }

    (StatusCode::OK, Json(json!({"status": "ok", "handled": handled})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum_test::TestServer;
    use meetup_messenger::RecordingSender;
    use meetup_store::Database;

    fn make_server(config: BotConfig) -> (TestServer, Arc<RecordingSender>) {
        let db = Database::in_memory().unwrap();
        db.seed_example_data().unwrap();
        let sender = Arc::new(RecordingSender::new());
        let state = BotState::new(config, db, sender.clone());
        (TestServer::new(create_router(state)).unwrap(), sender)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (server, _) = make_server(BotConfig::new("verify"));

        let response = server.get("/health").await;
        response.assert_status_ok();

        let body: HealthResponse = response.json();
        assert_eq!(body.status, "ok");
        assert!(!body.version.is_empty());
    }

    #[tokio::test]
    async fn test_verify_returns_challenge() {
        let (server, _) = make_server(BotConfig::new("verify"));

        let response = server
            .get("/webhook")
            .add_query_param("hub.mode", "subscribe")
            .add_query_param("hub.verify_token", "verify")
            .add_query_param("hub.challenge", "1158201444")
            .await;

        response.assert_status_ok();
        assert_eq!(response.text(), "1158201444");
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_token() {
        let (server, _) = make_server(BotConfig::new("verify"));

        let response = server
            .get("/webhook")
            .add_query_param("hub.mode", "subscribe")
            .add_query_param("hub.verify_token", "nope")
            .add_query_param("hub.challenge", "1")
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_mode() {
        let (server, _) = make_server(BotConfig::new("verify"));

        let response = server
            .get("/webhook")
            .add_query_param("hub.verify_token", "verify")
            .add_query_param("hub.challenge", "1")
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_webhook_dispatches_events() {
        let (server, sender) = make_server(BotConfig::new("verify"));

        let response = server
            .post("/webhook")
            .json(&json!({
                "object": "page",
                "entry": [{
                    "id": "PAGE",
                    "messaging": [
                        {"sender": {"id": "u1"}, "message": {"text": "hi"}},
                        {"sender": {"id": "u2"}, "postback": {"payload": "talk_info 1"}}
                    ]
                }]
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["handled"], 2);
        assert_eq!(sender.sent_to("u1").len(), 1);
        assert_eq!(sender.sent_to("u2").len(), 1);
    }

    #[tokio::test]
    async fn test_webhook_acknowledges_failed_events() {
        let (server, sender) = make_server(BotConfig::new("verify"));

        let response = server
            .post("/webhook")
            .json(&json!({
                "object": "page",
                "entry": [{"messaging": [
                    {"sender": {"id": "u1"}, "postback": {"payload": "like_confirm 1"}},
                    {"postback": {"payload": "talk_info 1"}}
                ]}]
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["handled"], 0);
        assert!(sender.is_empty());
    }

    #[tokio::test]
    async fn test_webhook_ignores_non_page_objects() {
        let (server, sender) = make_server(BotConfig::new("verify"));

        let response = server
            .post("/webhook")
            .json(&json!({
                "object": "instagram",
                "entry": [{"messaging": [{"sender": {"id": "u1"}, "message": {"text": "hi"}}]}]
            }))
            .await;

        response.assert_status_ok();
        assert!(sender.is_empty());
    }

    #[tokio::test]
    async fn test_webhook_filters_by_page_id() {
        let config = BotConfig::new("verify").with_page_id(Some("MINE".into()));
        let (server, sender) = make_server(config);

        server
            .post("/webhook")
            .json(&json!({
                "object": "page",
                "entry": [
                    {"id": "OTHER", "messaging": [{"sender": {"id": "u1"}, "message": {"text": "hi"}}]},
                    {"id": "MINE", "messaging": [{"sender": {"id": "u2"}, "message": {"text": "hi"}}]}
                ]
            }))
            .await
            .assert_status_ok();

        assert!(sender.sent_to("u1").is_empty());
        assert_eq!(sender.sent_to("u2").len(), 1);
    }
}
