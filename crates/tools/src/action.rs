//! Action server (M3) client

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use gramasathi_config::ActionServerConfig;
use gramasathi_core::{ActionDispatcher, ActionRequest};

/// Status reported when the action server cannot be reached
pub const STATUS_UNREACHABLE: &str = "M3 not reachable";

/// Status reported when forwarding is switched off
pub const STATUS_DISABLED: &str = "M3 disabled";

/// Action server errors
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<ActionError> for gramasathi_core::Error {
    fn from(err: ActionError) -> Self {
        gramasathi_core::Error::Action(err.to_string())
    }
}

/// Posts action requests as JSON to the configured URL
pub struct HttpActionClient {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpActionClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ActionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ActionError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send the request; any JSON body is accepted regardless of status code
    pub async fn try_dispatch(&self, request: &ActionRequest) -> Result<Value, ActionError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let value: Value = serde_json::from_slice(&body).map_err(|e| {
            ActionError::InvalidResponse(format!("HTTP {} with non-JSON body: {}", status, e))
        })?;

        if !status.is_success() {
            tracing::warn!(%status, "Action server returned an error status");
        }

        Ok(value)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ActionError {
        if err.is_timeout() {
            ActionError::Timeout(self.timeout)
        } else {
            ActionError::ConnectionFailed(err.to_string())
        }
    }
}

#[async_trait]
impl ActionDispatcher for HttpActionClient {
    async fn dispatch(&self, request: ActionRequest) -> Value {
        match self.try_dispatch(&request).await {
            Ok(value) => {
                tracing::info!(intent = %request.intent, "Forwarded to action server");
                value
            }
            Err(e) => {
                tracing::warn!(intent = %request.intent, url = %self.url, error = %e, "Action server dispatch failed");
                json!({ "status": STATUS_UNREACHABLE })
            }
        }
    }

    async fn is_reachable(&self) -> bool {
        // Any HTTP answer counts; the endpoint only accepts POST
        self.client.get(&self.url).send().await.is_ok()
    }
}

/// Dispatcher used when the action server is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopActionDispatcher;

#[async_trait]
impl ActionDispatcher for NoopActionDispatcher {
    async fn dispatch(&self, request: ActionRequest) -> Value {
        tracing::debug!(intent = %request.intent, "Action server disabled, not forwarding");
        json!({ "status": STATUS_DISABLED })
    }

    async fn is_reachable(&self) -> bool {
        false
    }
}

/// Build the dispatcher described by config
pub fn create_dispatcher(
    config: &ActionServerConfig,
) -> Result<Arc<dyn ActionDispatcher>, ActionError> {
    if !config.enabled {
        tracing::info!("Action server disabled");
        return Ok(Arc::new(NoopActionDispatcher));
    }

    tracing::info!(url = %config.url, "Action server client configured");
    Ok(Arc::new(HttpActionClient::new(
        config.url.clone(),
        Duration::from_secs(config.timeout_seconds),
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use gramasathi_core::{Entities, Intent};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/action", addr)
    }

    fn request() -> ActionRequest {
        let mut entities = Entities::new();
        entities.insert("complaint_id".into(), "KWA12345".into());
        ActionRequest {
            intent: Intent::ComplaintStatus,
            entities,
            message: "status KWA12345".into(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_returns_server_json() {
        let app = Router::new().route(
            "/action",
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "status": "filed", "echo": body["entities"]["complaint_id"] }))
            }),
        );
        let client = HttpActionClient::new(spawn(app).await, Duration::from_secs(5)).unwrap();

        let value = client.dispatch(request()).await;
        assert_eq!(value["status"], "filed");
        assert_eq!(value["echo"], "KWA12345");
        assert!(client.is_reachable().await);
    }

    #[tokio::test]
    async fn test_error_status_json_passed_through() {
        let app = Router::new().route(
            "/action",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "unknown intent" })),
                )
            }),
        );
        let client = HttpActionClient::new(spawn(app).await, Duration::from_secs(5)).unwrap();

        assert_eq!(client.dispatch(request()).await["error"], "unknown intent");
    }

    #[tokio::test]
    async fn test_non_json_body_is_unreachable() {
        let app = Router::new().route("/action", post(|| async { "ok" }));
        let client = HttpActionClient::new(spawn(app).await, Duration::from_secs(5)).unwrap();

        assert!(matches!(
            client.try_dispatch(&request()).await,
            Err(ActionError::InvalidResponse(_))
        ));
        assert_eq!(
            client.dispatch(request()).await,
            json!({ "status": "M3 not reachable" })
        );
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            HttpActionClient::new(format!("http://{}/action", addr), Duration::from_secs(2)).unwrap();
        assert_eq!(
            client.dispatch(request()).await,
            json!({ "status": "M3 not reachable" })
        );
        assert!(!client.is_reachable().await);
    }

    #[tokio::test]
    async fn test_disabled_dispatcher() {
        let config = ActionServerConfig {
            enabled: false,
            ..ActionServerConfig::default()
        };
        let dispatcher = create_dispatcher(&config).unwrap();
        assert_eq!(
            dispatcher.dispatch(request()).await,
            json!({ "status": "M3 disabled" })
        );
        assert!(!dispatcher.is_reachable().await);
    }
}
