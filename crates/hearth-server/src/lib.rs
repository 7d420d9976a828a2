//! HTTP server exposing Hearth sessions.
//!
//! Each request is bound to a session through a cookie. The session
//! middleware resolves (or creates) the session exactly once per request,
//! handlers read it through [`CurrentSession`], and the cookie is re-issued on
//! the way out.
//!
//! # Example
//!
//! ```ignore
//! use hearth_server::{Server, ServerConfig};
//! use hearth_session::{SessionConfig, SessionManager};
//!
//! let sessions = SessionManager::new(SessionConfig::default());
//! let server = Server::new(sessions, ServerConfig::default());
//! server.run_until(async { tokio::signal::ctrl_c().await.ok(); }).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use middleware::{CurrentSession, request_logging_middleware, session_middleware};
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;

use axum::{Router, middleware as layer};
use hearth_session::SessionManager;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The Hearth HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server around a session manager.
    pub fn new(sessions: SessionManager, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(sessions, config),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Application state shared with the handlers.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            // Health never creates a session
            .merge(routes::health_routes())
            .merge(self.session_routes())
            .layer(layer::from_fn_with_state(
                self.state.clone(),
                middleware::request_logging_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Routes bound to the caller's session.
    fn session_routes(&self) -> Router<AppState> {
        use axum::routing::{get, put};

        Router::new()
            .route(
                "/session",
                get(routes::get_session_handler).delete(routes::delete_session_handler),
            )
            .route(
                "/session/data/{key}",
                put(routes::put_data_handler).delete(routes::delete_data_handler),
            )
            .route("/stats", get(routes::stats_handler))
            .layer(layer::from_fn_with_state(
                self.state.clone(),
                middleware::session_middleware,
            ))
    }

    /// Run the server on the configured address until `shutdown` resolves.
    ///
    /// The session reaper runs for the lifetime of the server and is stopped
    /// after the listener has drained.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.state.config.bind_address;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener
            .local_addr()
            .map_err(|e| ServerError::Internal(format!("Failed to read local address: {}", e)))?;
        let router = self.router();
        let reaper = self.state.sessions.spawn_reaper();

        info!(%addr, "Starting server");

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)));

        reaper.shutdown().await;
        info!("Server stopped");
        served
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}
