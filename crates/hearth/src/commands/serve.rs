//! Serve command - runs the session server in the foreground.

use std::net::SocketAddr;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::{error, info};

use hearth_config::{HearthConfig, ServerConfig as ServerSection, SessionConfig as SessionSection};
use hearth_server::{Server, ServerConfig};
use hearth_session::SessionManager;

use super::Context;

/// Arguments for the serve command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Maximum number of sessions kept before LRU eviction (overrides config)
    #[arg(long)]
    pub max_sessions: Option<usize>,

    /// Idle seconds before a session expires (overrides config)
    #[arg(long)]
    pub ttl_secs: Option<u64>,

    /// Seconds between expiry sweeps (overrides config)
    #[arg(long)]
    pub cleanup_interval_secs: Option<u64>,

    /// Mark the session cookie Secure (overrides config)
    #[arg(long)]
    pub secure_cookie: bool,
}

impl ServeArgs {
    /// Apply CLI overrides on top of the file-based configuration.
    pub fn apply(&self, config: &HearthConfig) -> (SessionSection, ServerSection) {
        let mut session = config.session();
        let mut server = config.server();

        if let Some(max) = self.max_sessions {
            session.max_sessions = max;
        }
        if let Some(ttl) = self.ttl_secs {
            session.ttl_secs = ttl;
        }
        if let Some(interval) = self.cleanup_interval_secs {
            session.cleanup_interval_secs = interval;
        }
        if let Some(port) = self.port {
            server.port = port;
        }
        if let Some(bind) = &self.bind {
            server.bind = bind.clone();
        }
        if self.secure_cookie {
            server.secure_cookie = true;
        }

        (session, server)
    }
}

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    let (session, server) = args.apply(&ctx.loaded.config);

    let bind_address = parse_bind_address(&server.bind, server.port)?;
    let server_config = ServerConfig::new()
        .with_bind_address(bind_address)
        .with_cookie_name(server.cookie_name.clone())
        .with_secure_cookie(server.secure_cookie)
        .with_request_logging(server.request_logging);

    let store_config = session.to_store_config();
    info!(
        max_sessions = store_config.max_sessions,
        ttl_secs = session.ttl_secs,
        cleanup_interval_secs = session.cleanup_interval_secs,
        "Session store configured"
    );

    let sessions = SessionManager::new(store_config);
    Server::new(sessions, server_config)
        .run_until(shutdown_signal())
        .await?;

    Ok(())
}

fn parse_bind_address(bind: &str, port: u16) -> Result<SocketAddr> {
    let ip: std::net::IpAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", bind))?;
    Ok(SocketAddr::new(ip, port))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
