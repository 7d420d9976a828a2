//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [session]                # store capacity, reaper interval, TTL
//! [server]                 # bind address and session cookie
//! [logging]                # console level and JSON log file
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default port for the HTTP server.
pub const DEFAULT_PORT: u16 = 8080;

/// Default bind address for the HTTP server.
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Default name of the cookie carrying the session id.
pub const DEFAULT_COOKIE_NAME: &str = "session_id";

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// Every section is optional; a missing section reads as its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HearthConfig {
    /// Session store configuration.
    pub session: Option<SessionConfig>,

    /// HTTP server configuration.
    pub server: Option<ServerConfig>,

    /// Logging configuration.
    pub logging: Option<LoggingConfig>,
}

impl HearthConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Session section, or defaults when absent.
    pub fn session(&self) -> SessionConfig {
        self.session.clone().unwrap_or_default()
    }

    /// Server section, or defaults when absent.
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    /// Logging section, or defaults when absent.
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Session store configuration.
///
/// ```toml
/// [session]
/// max_sessions = 100000
/// cleanup_interval_secs = 1800
/// ttl_secs = 3600
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of sessions to keep before LRU eviction.
    pub max_sessions: usize,
    /// Interval in seconds between expiry sweeps.
    pub cleanup_interval_secs: u64,
    /// Idle time in seconds after which a session expires.
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: hearth_session::DEFAULT_MAX_SESSIONS,
            cleanup_interval_secs: hearth_session::DEFAULT_CLEANUP_INTERVAL.as_secs(),
            ttl_secs: hearth_session::DEFAULT_TTL.as_secs(),
        }
    }
}

impl SessionConfig {
    /// Convert to the session store's runtime configuration.
    pub fn to_store_config(&self) -> hearth_session::SessionConfig {
        hearth_session::SessionConfig::new()
            .with_max_sessions(self.max_sessions)
            .with_cleanup_interval(Duration::from_secs(self.cleanup_interval_secs))
            .with_ttl(Duration::from_secs(self.ttl_secs))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Address to bind to.
    pub bind: String,
    /// Name of the cookie carrying the session id.
    pub cookie_name: String,
    /// Mark the session cookie `Secure`.
    pub secure_cookie: bool,
    /// Enable request logging.
    pub request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            secure_cookie: false,
            request_logging: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Console log level (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
    /// Also write JSON logs to a daily rotated file.
    pub json_file: bool,
    /// Directory for log files. Defaults to `<config dir>/logs`.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_file: true,
            dir: None,
        }
    }
}
