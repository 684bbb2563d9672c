//! TwiML replies
//!
//! The telephony provider expects `<Response><Message>..</Message></Response>`
//! served as `application/xml`.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

pub const CONTENT_TYPE: &str = "application/xml";

/// Escape text for an XML element body
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Single-message TwiML document (the text is escaped here)
pub fn message(text: &str) -> String {
    format!(
        "<Response>\n    <Message>{}</Message>\n</Response>\n",
        escape_xml(text)
    )
}

/// Pick `reply_to_user` when present, otherwise echo the transcript
pub fn reply_or_transcript(reply_to_user: &str, transcript: &str) -> String {
    if reply_to_user.is_empty() {
        message(transcript)
    } else {
        message(reply_to_user)
    }
}

/// TwiML body wrapped as an HTTP 200 response
pub struct TwimlResponse(pub String);

impl IntoResponse for TwimlResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], self.0).into_response()
    }
}
