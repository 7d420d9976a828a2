//! Session resolution and request logging middleware.
//!
//! [`session_middleware`] resolves the caller's session from the session
//! cookie once per request, stores it in the request extensions for the
//! [`CurrentSession`] extractor, and re-issues the cookie on the response.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{
        HeaderMap, HeaderValue, Request,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use hearth_session::Session;
use tracing::{debug, warn};

use crate::error::ServerError;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Session middleware
// ─────────────────────────────────────────────────────────────────────────────

/// Resolve the request's session and attach the session cookie to the response.
///
/// A missing or empty cookie gets a freshly generated session. An unknown id
/// is adopted as a new session with that id. Any storage failure ends the
/// request with a 500.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let cookie_name = state.config().cookie_name.as_str();
    let token = cookie_value(request.headers(), cookie_name).unwrap_or_default();

    let session = match state.sessions.get_or_create(&token).await {
        Ok(session) => session,
        Err(e) => {
            return ServerError::Storage(format!("failed to resolve session: {}", e))
                .into_response();
        }
    };

    debug!(session_id = %session.id, from_cookie = !token.is_empty(), "Session resolved");

    let session_id = session.id.clone();
    request.extensions_mut().insert(session);

    let mut response = next.run(request).await;

    // Handlers that rewrite the cookie (e.g. on delete) take precedence.
    if !response.headers().contains_key(SET_COOKIE) {
        let ttl_secs = state.sessions.config().ttl.as_secs();
        let cookie = session_cookie(
            cookie_name,
            &session_id,
            ttl_secs,
            state.config().secure_cookie,
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().insert(SET_COOKIE, value);
            }
            Err(e) => {
                warn!(
                    session_id = %session_id,
                    error = %e,
                    "Session id is not a valid cookie value"
                );
            }
        }
    }

    response
}

/// Find a cookie by name across all `Cookie` headers.
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

/// Format a `Set-Cookie` value for the session id.
pub(crate) fn session_cookie(name: &str, id: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; Max-Age={}", name, id, max_age_secs);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

// ─────────────────────────────────────────────────────────────────────────────
// Extractor
// ─────────────────────────────────────────────────────────────────────────────

/// The session resolved by [`session_middleware`] for this request.
///
/// ```ignore
/// async fn whoami(CurrentSession(session): CurrentSession) -> String {
///     session.id
/// }
/// ```
///
/// Rejects with a 500 when the middleware is not installed on the route.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(CurrentSession)
            .ok_or_else(|| ServerError::Internal("session middleware not installed".to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request logging
// ─────────────────────────────────────────────────────────────────────────────

/// Log method, path, status and latency of every request.
pub async fn request_logging_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.config().request_logging {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let start = std::time::Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed with server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed with client error"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, routing::get};
    use tower::ServiceExt;

    fn headers(values: &[&str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for value in values {
            map.append(COOKIE, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_cookie_value_single() {
        let map = headers(&["session_id=abc123"]);
        assert_eq!(cookie_value(&map, "session_id").as_deref(), Some("abc123"));
    }

    #[test]
    fn test_cookie_value_among_others() {
        let map = headers(&["theme=dark; session_id=xyz; lang=en"]);
        assert_eq!(cookie_value(&map, "session_id").as_deref(), Some("xyz"));
        assert_eq!(cookie_value(&map, "lang").as_deref(), Some("en"));
    }

    #[test]
    fn test_cookie_value_across_headers() {
        let map = headers(&["theme=dark", "session_id=two"]);
        assert_eq!(cookie_value(&map, "session_id").as_deref(), Some("two"));
    }

    #[test]
    fn test_cookie_value_missing_or_empty() {
        assert_eq!(cookie_value(&HeaderMap::new(), "session_id"), None);
        assert_eq!(cookie_value(&headers(&["other=1"]), "session_id"), None);
        assert_eq!(
            cookie_value(&headers(&["session_id="]), "session_id").as_deref(),
            Some("")
        );
    }

    #[test]
    fn test_cookie_value_does_not_match_prefix() {
        let map = headers(&["my_session_id=nope"]);
        assert_eq!(cookie_value(&map, "session_id"), None);
    }

    #[test]
    fn test_session_cookie_format() {
        assert_eq!(
            session_cookie("session_id", "abc", 3600, false),
            "session_id=abc; Path=/; HttpOnly; Max-Age=3600"
        );
        assert!(session_cookie("sid", "abc", 60, true).ends_with("; Secure"));
    }

    #[tokio::test]
    async fn test_extractor_without_middleware_is_500() {
        async fn handler(CurrentSession(session): CurrentSession) -> String {
            session.id
        }

        let app = Router::new().route("/", get(handler));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
