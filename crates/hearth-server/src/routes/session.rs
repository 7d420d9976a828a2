//! Session endpoints.
//!
//! Every handler here runs behind the session middleware, so the caller's
//! session already exists when the handler is entered.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use hearth_session::{Session, StoreStats};
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, ServerError};
use crate::middleware::{CurrentSession, session_cookie};
use crate::state::AppState;

/// Store statistics plus the reaper's running total.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Store size, capacity and access counters.
    #[serde(flatten)]
    pub store: StoreStats,
    /// Sessions removed by expiry sweeps since startup.
    pub reaped: u64,
    /// Idle timeout in seconds.
    pub ttl_secs: u64,
}

/// `GET /session`
pub async fn get_session_handler(CurrentSession(session): CurrentSession) -> Json<Session> {
    Json(session)
}

/// `PUT /session/data/{key}`: store the JSON body under `key`.
pub async fn put_data_handler(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(key): Path<String>,
    Json(value): Json<serde_json::Value>,
) -> Result<Json<Session>> {
    let (previous, updated) = state
        .sessions
        .store()
        .update(&session.id, |data| data.insert(key.clone(), value))
        .await?;

    debug!(
        session_id = %updated.id,
        key = %key,
        replaced = previous.is_some(),
        "Session value set"
    );
    Ok(Json(updated))
}

/// `DELETE /session/data/{key}`
pub async fn delete_data_handler(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(key): Path<String>,
) -> Result<Json<Session>> {
    let (removed, updated) = state
        .sessions
        .store()
        .update(&session.id, |data| data.remove(&key))
        .await?;

    if removed.is_none() {
        return Err(ServerError::NotFound(format!("key '{}'", key)));
    }

    debug!(session_id = %updated.id, key = %key, "Session value removed");
    Ok(Json(updated))
}

/// `DELETE /session`: end the session and expire the cookie.
pub async fn delete_session_handler(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response> {
    state.sessions.delete(&session.id).await?;

    let config = state.config();
    let expired = session_cookie(&config.cookie_name, "", 0, config.secure_cookie);
    let cookie = HeaderValue::from_str(&expired)
        .map_err(|e| ServerError::Internal(format!("invalid cookie: {}", e)))?;

    let mut response = StatusCode::NO_CONTENT.into_response();
    response.headers_mut().insert(SET_COOKIE, cookie);
    Ok(response)
}

/// `GET /stats`
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let store = state.sessions.store();
    Json(StatsResponse {
        store: store.stats().await,
        reaped: state.sessions.reaped_total(),
        ttl_secs: state.sessions.config().ttl.as_secs(),
    })
}
