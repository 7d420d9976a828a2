//! Liveness endpoint. Mounted outside the session layer, so polling it never
//! mints a session.

use axum::{Json, Router, extract::State, routing::get};
use hearth_session::SessionStore;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Sessions currently held by the store.
    pub sessions: usize,
    /// Store capacity before LRU eviction starts.
    pub capacity: usize,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.sessions.store();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: store.len().await,
        capacity: store.capacity(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
