//! HTTP Endpoints
//!
//! REST API for the agent plus the telephony webhook.

use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::metrics::{metrics_handler, track_requests};
use crate::state::AppState;
use crate::telephony::webhook;
use crate::ServerError;

const DEFAULT_ORIGIN: &str = "http://localhost:3000";
const READINESS_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let (cors_layer, timeout) = {
        let config = state.config.read();
        (
            build_cors_layer(&config.server.cors_origins, config.server.cors_enabled),
            Duration::from_secs(config.server.timeout_seconds),
        )
    };

    Router::new()
        .route("/analyze", post(analyze))
        .route("/webhook", post(webhook))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(axum::middleware::from_fn(track_requests))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .with_state(state)
}

/// CORS from configured origins; localhost when none parse
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    if parsed_origins.is_empty() {
        tracing::info!("No usable CORS origins configured, defaulting to {}", DEFAULT_ORIGIN);
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static(DEFAULT_ORIGIN))
            .allow_methods(methods)
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods(methods)
        .allow_headers(Any)
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /analyze`
async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(AnalyzeRequest { message: Some(message) })) => {
            match state.agent.analyze(&message).await {
                Ok(result) => (StatusCode::OK, Json(result)).into_response(),
                Err(e) => {
                    let err = ServerError::from(e);
                    if matches!(err, ServerError::InvalidRequest(_)) {
                        tracing::debug!(error = %err, "Rejected analyze request");
                    } else {
                        tracing::error!(error = %err, "Analyze failed");
                    }
                    err.into_response()
                }
            }
        }
        Ok(Json(AnalyzeRequest { message: None })) => {
            ServerError::InvalidRequest("message is required".to_string()).into_response()
        }
        Err(rejection) => ServerError::InvalidRequest(rejection.body_text()).into_response(),
    }
}

/// Liveness with a short summary of what is loaded
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let knowledge = state.agent.knowledge_base();
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.agent.llm().model_name(),
        "knowledge_base": {
            "entries": knowledge.len(),
            "threshold": knowledge.threshold(),
        },
        "classification_cache": state.agent.cached_classifications(),
    }))
}

/// Ready when the model answers; the action server is reported but optional
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let llm = state.agent.llm().clone();
    let dispatcher = state.agent.dispatcher().clone();

    let (model_ok, action_ok) = tokio::join!(
        tokio::time::timeout(READINESS_PROBE_TIMEOUT, llm.is_available()),
        tokio::time::timeout(READINESS_PROBE_TIMEOUT, dispatcher.is_reachable()),
    );

    let model_status = match model_ok {
        Ok(true) => "ok",
        Ok(false) => "unavailable",
        Err(_) => "timeout",
    };
    let action_status = match action_ok {
        Ok(true) => "ok",
        Ok(false) => "unreachable",
        Err(_) => "timeout",
    };

    let ready = model_status == "ok";
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "checks": {
                "model": { "status": model_status, "name": llm.model_name() },
                "action_server": { "status": action_status },
            },
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layers_build() {
        let _ = build_cors_layer(&[], true);
        let _ = build_cors_layer(&["not a header\n".to_string()], true);
        let _ = build_cors_layer(&["https://gramasathi.example".to_string()], true);
        let _ = build_cors_layer(&[], false);
    }
}
