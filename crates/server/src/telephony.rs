//! Telephony relay
//!
//! Bridges a voice message from the telephony provider to the transcription
//! service and answers with TwiML.
//!
//! ```text
//! MediaUrl0 ──GET (basic auth)──▶ audio bytes
//!           ──POST multipart "audio"──▶ transcriber ──▶ {message, reply_to_user}
//!           ──▶ <Response><Message>..</Message></Response>
//! ```

use std::time::Duration;

use axum::{
    extract::{rejection::FormRejection, Form, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reqwest::{multipart, Client};
use serde::Deserialize;

use gramasathi_config::TelephonyConfig;

use crate::metrics::record_webhook;
use crate::state::AppState;
use crate::twiml::{self, TwimlResponse};
use crate::ServerError;

const AUDIO_FIELD: &str = "audio";
const AUDIO_FILE_NAME: &str = "audio.ogg";
const AUDIO_MIME: &str = "audio/ogg";

/// Transcription service answer; missing fields read as empty
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TranscriptionReply {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub reply_to_user: String,
}

/// Provider callback fields we use
#[derive(Debug, Default, Deserialize)]
pub struct WebhookForm {
    #[serde(rename = "MediaUrl0")]
    pub media_url: Option<String>,
    #[serde(rename = "Body")]
    pub body: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
}

/// HTTP client for the media fetch and transcription calls
pub struct TelephonyClient {
    client: Client,
    account_sid: Option<String>,
    auth_token: Option<String>,
    transcribe_url: String,
    media_timeout: Duration,
    transcribe_timeout: Duration,
}

impl TelephonyClient {
    pub fn new(config: &TelephonyConfig) -> Self {
        Self {
            client: Client::new(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            transcribe_url: config.transcribe_url.clone(),
            media_timeout: Duration::from_secs(config.media_timeout_seconds),
            transcribe_timeout: Duration::from_secs(config.transcribe_timeout_seconds),
        }
    }

    pub fn transcribe_url(&self) -> &str {
        &self.transcribe_url
    }

    /// Download the voice message using the provider credentials
    pub async fn fetch_media(&self, url: &str) -> Result<Vec<u8>, ServerError> {
        let mut request = self.client.get(url).timeout(self.media_timeout);
        if let Some(sid) = &self.account_sid {
            request = request.basic_auth(sid, self.auth_token.as_deref());
        } else {
            tracing::warn!("No telephony account SID configured, fetching media without auth");
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServerError::MediaFetch(e.to_string()))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(ServerError::MediaFetch(format!("HTTP {}", response.status())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServerError::MediaFetch(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Upload audio to the transcription service
    pub async fn transcribe(&self, audio: Vec<u8>) -> Result<TranscriptionReply, ServerError> {
        let part = multipart::Part::bytes(audio)
            .file_name(AUDIO_FILE_NAME)
            .mime_str(AUDIO_MIME)
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        let form = multipart::Form::new().part(AUDIO_FIELD, part);

        let response = self
            .client
            .post(&self.transcribe_url)
            .multipart(form)
            .timeout(self.transcribe_timeout)
            .send()
            .await
            .map_err(|e| ServerError::Transcription(e.to_string()))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(ServerError::Transcription(format!(
                "HTTP {}",
                response.status()
            )));
        }

        response
            .json::<TranscriptionReply>()
            .await
            .map_err(|e| ServerError::Transcription(format!("Invalid response: {}", e)))
    }
}

/// `POST /webhook`
pub async fn webhook(
    State(state): State<AppState>,
    form: Result<Form<WebhookForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable webhook form");
            WebhookForm::default()
        }
    };

    let media_url = form.media_url.as_deref().filter(|u| !u.is_empty());
    let Some(media_url) = media_url else {
        return text_message(&state, form.body.as_deref(), form.from.as_deref()).await;
    };

    tracing::info!(from = ?form.from, "Voice message received");

    let audio = match state.telephony.fetch_media(media_url).await {
        Ok(audio) => audio,
        Err(e) => {
            tracing::error!(error = %e, "Media fetch failed");
            record_webhook("fetch_error");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error fetching audio").into_response();
        }
    };

    let reply = match state.telephony.transcribe(audio).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(error = %e, url = %state.telephony.transcribe_url(), "Transcription failed");
            record_webhook("transcription_error");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Transcription error").into_response();
        }
    };

    tracing::info!(transcription = %reply.message, reply = %reply.reply_to_user, "Voice message transcribed");
    record_webhook("transcribed");

    TwimlResponse(twiml::reply_or_transcript(&reply.reply_to_user, &reply.message)).into_response()
}

/// Callback without media: optionally answer the text through the agent
async fn text_message(state: &AppState, body: Option<&str>, from: Option<&str>) -> Response {
    let analyze = state.config.read().telephony.analyze_text_messages;
    let body = body.map(str::trim).filter(|b| !b.is_empty());

    let Some(body) = body.filter(|_| analyze) else {
        record_webhook("no_media");
        return (StatusCode::OK, "No media").into_response();
    };

    match state.agent.analyze(body).await {
        Ok(result) => {
            tracing::info!(from = ?from, intent = %result.intent_name, "Text message answered");
            record_webhook("text");
            TwimlResponse(twiml::message(&result.reply_to_user)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Text message rejected");
            record_webhook("text_error");
            let status: StatusCode = ServerError::from(e).into();
            (status, "Invalid message").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_defaults_to_empty() {
        let reply: TranscriptionReply = serde_json::from_str(r#"{"message": "vellam illa"}"#).unwrap();
        assert_eq!(reply.message, "vellam illa");
        assert!(reply.reply_to_user.is_empty());

        let reply: TranscriptionReply = serde_json::from_str("{}").unwrap();
        assert_eq!(reply, TranscriptionReply::default());
    }

    #[test]
    fn test_client_uses_configured_timeouts() {
        let config = TelephonyConfig {
            transcribe_url: "http://127.0.0.1:9/transcribe".into(),
            media_timeout_seconds: 5,
            transcribe_timeout_seconds: 300,
            ..TelephonyConfig::default()
        };
        let client = TelephonyClient::new(&config);
        assert_eq!(client.transcribe_url(), "http://127.0.0.1:9/transcribe");
        assert_eq!(client.media_timeout, Duration::from_secs(5));
        assert_eq!(client.transcribe_timeout, Duration::from_secs(300));
    }
}
