//! Graph API client for the Messenger Send API.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{MessengerError, Result};
use crate::message::OutgoingMessage;
use crate::sender::MessageSender;

/// Default Graph API base URL.
pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com/v2.6";

/// Request timeout for Graph API calls.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Client for the page-scoped Graph API endpoints the bot uses.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: String,
}

impl GraphClient {
    /// Creates a client against the public Graph API.
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(access_token, DEFAULT_GRAPH_URL)
    }

    /// Creates a client against a custom base URL (useful for tests and proxies).
    pub fn with_base_url(access_token: impl Into<String>, base_url: &str) -> Result<Self> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(MessengerError::NoToken);
        }

        // A trailing slash keeps `join` from dropping the version segment.
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: Url::parse(&base)?,
            access_token,
        })
    }

    /// Full URL for a page endpoint, with the access token attached.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut().append_pair("access_token", &self.access_token);
        Ok(url)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<()> {
        let url = self.endpoint(path)?;
        let response = self.http.post(url).json(body).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), path, body = %body, "Graph API request failed");
        Err(MessengerError::ApiError {
            status: status.as_u16(),
            body,
        })
    }

    /// Configures the "Get Started" button shown on a new thread.
    pub async fn set_get_started_button(&self, payload: &str) -> Result<()> {
        let body = get_started_body(payload);
        self.post("me/thread_settings", &body).await?;
        info!(payload, "Get Started button configured");
        Ok(())
    }
}

/// Send API request body.
pub fn send_body(recipient_id: &str, message: &OutgoingMessage) -> Value {
    json!({
        "recipient": {"id": recipient_id},
        "message": message,
    })
}

/// Thread settings body for the Get Started button.
pub fn get_started_body(payload: &str) -> Value {
    json!({
        "setting_type": "call_to_actions",
        "thread_state": "new_thread",
        "call_to_actions": [{"payload": payload}],
    })
}

#[async_trait]
impl MessageSender for GraphClient {
    async fn send(&self, recipient_id: &str, message: &OutgoingMessage) -> Result<()> {
        debug!(recipient = recipient_id, "sending message");
        self.post("me/messages", &send_body(recipient_id, message)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, routing::post, Json, Router};

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(GraphClient::new("  "), Err(MessengerError::NoToken)));
    }

    #[test]
    fn test_endpoint_keeps_version_and_token() {
        let client = GraphClient::new("secret").unwrap();
        let url = client.endpoint("me/messages").unwrap();
        assert_eq!(
            url.as_str(),
            "https://graph.facebook.com/v2.6/me/messages?access_token=secret"
        );
    }

    #[test]
    fn test_send_body() {
        let body = send_body("42", &OutgoingMessage::text("hi"));
        assert_eq!(body, json!({"recipient": {"id": "42"}, "message": {"text": "hi"}}));
    }

    #[test]
    fn test_get_started_body() {
        let body = get_started_body("get_started");
        assert_eq!(body["call_to_actions"][0]["payload"], "get_started");
        assert_eq!(body["thread_state"], "new_thread");
    }

    type Captured = Arc<Mutex<Vec<Value>>>;

    async fn spawn_graph(status: axum::http::StatusCode) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let app = Router::new()
            .route(
                "/v2.6/me/messages",
                post(move |State(c): State<Captured>, Json(body): Json<Value>| async move {
                    c.lock().unwrap().push(body);
                    (status, "{}")
                }),
            )
            .with_state(Arc::clone(&captured));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/v2.6", addr), captured)
    }

    #[tokio::test]
    async fn test_send_posts_to_graph() {
        let (base, captured) = spawn_graph(axum::http::StatusCode::OK).await;
        let client = GraphClient::with_base_url("token", &base).unwrap();

        client.send("99", &OutgoingMessage::text("ping")).await.unwrap();

        let bodies = captured.lock().unwrap().clone();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["recipient"]["id"], "99");
        assert_eq!(bodies[0]["message"]["text"], "ping");
    }

    #[tokio::test]
    async fn test_send_surfaces_api_error() {
        let (base, _) = spawn_graph(axum::http::StatusCode::BAD_REQUEST).await;
        let client = GraphClient::with_base_url("token", &base).unwrap();

        let err = client.send("99", &OutgoingMessage::text("ping")).await.unwrap_err();
        assert!(matches!(err, MessengerError::ApiError { status: 400, .. }));
    }
}
