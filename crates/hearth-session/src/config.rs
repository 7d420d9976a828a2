//! Configuration for the session store and reaper.

use std::time::Duration;

/// Default maximum number of sessions held before LRU eviction.
pub const DEFAULT_MAX_SESSIONS: usize = 100_000;

/// Default interval between reaper sweeps (30 minutes).
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Default idle time after which a session expires (1 hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Configuration for the session store and its reaper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum number of sessions to hold before LRU eviction.
    pub max_sessions: usize,

    /// Interval between reaper sweeps.
    pub cleanup_interval: Duration,

    /// Sessions idle for longer than this are removed by the reaper.
    pub ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            ttl: DEFAULT_TTL,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of sessions.
    ///
    /// A capacity of zero is treated as one by the store.
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    /// Set the reaper sweep interval.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Set the session time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}
