//! GramaSathi Server
//!
//! Exposes the agent over HTTP (`/analyze`) and relays telephony voice
//! messages to the transcription service (`/webhook`).

pub mod auth;
pub mod bootstrap;
pub mod http;
pub mod metrics;
pub mod state;
pub mod telephony;
pub mod twiml;

pub use auth::auth_middleware;
pub use bootstrap::load_or_default;
pub use http::create_router;
pub use metrics::{init_metrics, record_request, record_webhook, track_requests};
pub use state::AppState;
pub use telephony::{TelephonyClient, TranscriptionReply};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Error fetching audio: {0}")]
    MediaFetch(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::MediaFetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Transcription(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<gramasathi_agent::AgentError> for ServerError {
    fn from(err: gramasathi_agent::AgentError) -> Self {
        match err {
            gramasathi_agent::AgentError::InvalidInput(msg) => ServerError::InvalidRequest(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<ServerError> for gramasathi_core::Error {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(msg) => gramasathi_core::Error::InvalidInput(msg),
            ServerError::Transcription(msg) => gramasathi_core::Error::Transcription(msg),
            other => gramasathi_core::Error::Internal(other.to_string()),
        }
    }
}

/// JSON error body `{"error": ...}` with the mapped status
impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let status: StatusCode = self.into();
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
