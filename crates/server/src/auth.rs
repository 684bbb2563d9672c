//! API key authentication
//!
//! `Authorization: Bearer <api_key>` on every route except the configured
//! public paths. Off unless `server.auth.enabled` is set.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use gramasathi_config::AuthConfig;

use crate::state::AppState;

static AUTH_DISABLED_WARNED: AtomicBool = AtomicBool::new(false);

/// What the middleware should do for a path
#[derive(Debug, PartialEq)]
enum AuthCheck {
    Disabled,
    PublicPath,
    ConfigError(&'static str),
    CheckKey(String),
}

fn check_auth_config(auth: &AuthConfig, path: &str) -> AuthCheck {
    if !auth.enabled {
        if !AUTH_DISABLED_WARNED.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                "API authentication is disabled. Set GRAMASATHI__SERVER__AUTH__ENABLED=true for production."
            );
        }
        return AuthCheck::Disabled;
    }

    if auth.public_paths.iter().any(|p| path.starts_with(p.as_str())) {
        return AuthCheck::PublicPath;
    }

    match &auth.api_key {
        Some(key) if !key.is_empty() => AuthCheck::CheckKey(key.clone()),
        _ => AuthCheck::ConfigError("Auth is enabled but no API key is configured"),
    }
}

/// Bearer-token check in front of the router
pub async fn auth_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    // Guard must not live across the await below
    let check = {
        let config = state.config.read();
        check_auth_config(&config.server.auth, request.uri().path())
    };

    let expected = match check {
        AuthCheck::Disabled | AuthCheck::PublicPath => return next.run(request).await,
        AuthCheck::ConfigError(msg) => {
            tracing::error!("{}", msg);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Server authentication not configured")
                .into_response();
        }
        AuthCheck::CheckKey(key) => key,
    };

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    match provided {
        Some(value) => match value.strip_prefix("Bearer ") {
            Some(token) if constant_time_compare(token.as_bytes(), expected.as_bytes()) => {
                next.run(request).await
            }
            Some(_) => {
                tracing::warn!(
                    forwarded_for = ?request.headers().get("X-Forwarded-For"),
                    "Invalid API key"
                );
                (StatusCode::UNAUTHORIZED, "Invalid API key").into_response()
            }
            None => (
                StatusCode::BAD_REQUEST,
                "Invalid Authorization header format. Expected: Bearer <token>",
            )
                .into_response(),
        },
        None => (StatusCode::UNAUTHORIZED, "Missing Authorization header").into_response(),
    }
}

/// Compare without short-circuiting on the first differing byte
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(key: Option<&str>) -> AuthConfig {
        AuthConfig {
            enabled: true,
            api_key: key.map(String::from),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"secret", b"secret"));
        assert!(!constant_time_compare(b"secret", b"secre"));
        assert!(!constant_time_compare(b"secret", b"secreT"));
    }

    #[test]
    fn test_disabled_passes_everything() {
        assert_eq!(
            check_auth_config(&AuthConfig::default(), "/analyze"),
            AuthCheck::Disabled
        );
    }

    #[test]
    fn test_public_paths_skip_key() {
        let auth = enabled(Some("k"));
        assert_eq!(check_auth_config(&auth, "/webhook"), AuthCheck::PublicPath);
        assert_eq!(check_auth_config(&auth, "/health"), AuthCheck::PublicPath);
        assert_eq!(
            check_auth_config(&auth, "/analyze"),
            AuthCheck::CheckKey("k".to_string())
        );
    }

    #[test]
    fn test_missing_key_is_config_error() {
        assert!(matches!(
            check_auth_config(&enabled(Some("")), "/analyze"),
            AuthCheck::ConfigError(_)
        ));
        assert!(matches!(
            check_auth_config(&enabled(None), "/analyze"),
            AuthCheck::ConfigError(_)
        ));
    }
}
