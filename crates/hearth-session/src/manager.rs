//! Session manager: get-or-create semantics and expiry sweeps.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use tracing::{debug, info, trace, warn};

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::memory::LruStore;
use crate::reaper::{self, ReaperHandle};
use crate::record::Session;
use crate::store::SessionStore;

/// Source of fresh session identifiers.
pub trait IdGenerator: Send + Sync {
    /// Produce a new, non-empty identifier.
    fn generate(&self) -> String;
}

/// Generates random UUID v4 identifiers (32 hex characters, no hyphens).
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Policy layer over a [`SessionStore`].
///
/// Resolves identifiers to sessions (creating them on a miss), forwards
/// deletes, and sweeps sessions that have been idle longer than the TTL.
/// Cloning is cheap; clones share the store.
pub struct SessionManager<S: SessionStore = LruStore> {
    store: Arc<S>,
    ids: Arc<dyn IdGenerator>,
    config: SessionConfig,
    reaped: Arc<AtomicU64>,
}

impl SessionManager<LruStore> {
    /// Create a manager backed by an in-memory [`LruStore`] sized from `config`.
    pub fn new(config: SessionConfig) -> Self {
        let store = LruStore::with_capacity(config.max_sessions);
        Self::with_store(store, config)
    }
}

impl<S: SessionStore> SessionManager<S> {
    /// Create a manager over an existing store.
    pub fn with_store(store: S, config: SessionConfig) -> Self {
        Self {
            store: Arc::new(store),
            ids: Arc::new(UuidGenerator),
            config,
            reaped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Replace the identifier generator.
    pub fn with_id_generator<G: IdGenerator + 'static>(mut self, ids: G) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The manager configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Total number of sessions removed by expiry sweeps.
    pub fn reaped_total(&self) -> u64 {
        self.reaped.load(Ordering::Relaxed)
    }

    /// Resolve a session by id, creating it if it does not exist.
    ///
    /// An empty id always yields a new session with a generated id. A miss
    /// for a non-empty id creates a session under that id. Errors other than
    /// `NotFound` are returned unchanged.
    pub async fn get_or_create(&self, session_id: &str) -> Result<Session> {
        let session_id = if session_id.is_empty() {
            self.ids.generate()
        } else {
            session_id.to_string()
        };

        match self.store.get(&session_id).await {
            Ok(session) => Ok(session),
            Err(Error::NotFound(_)) => {
                let session = Session::new(session_id);
                self.store.set(session.clone()).await?;
                debug!(session_id = %session.id, "Created session");
                Ok(session)
            }
            Err(e) => Err(e),
        }
    }

    /// Write a modified session back to the store.
    ///
    /// The record's timestamps are stored as given and the session becomes
    /// most recently used. Saving a snapshot taken long ago therefore puts an
    /// old `active_at` at the front of the recency order, where
    /// [`cleanup`](Self::cleanup) will not reach it until everything behind
    /// it has been swept or touched. Touch the session first (`get_or_create`)
    /// if it should count as active.
    pub async fn save(&self, session: Session) -> Result<()> {
        self.store.set(session).await
    }

    /// Delete a session. `NotFound` is returned unchanged.
    pub async fn delete(&self, session_id: &str) -> Result<()> {
        self.store.delete(session_id).await
    }

    /// Remove every session idle for longer than the configured TTL.
    ///
    /// Returns the number of sessions removed.
    pub async fn cleanup(&self) -> usize {
        self.cleanup_with_ttl(self.config.ttl).await
    }

    /// Remove every session idle for longer than `ttl`.
    ///
    /// Walks from the least recently used end and stops at the first session
    /// that is still fresh; everything in front of it was used more recently.
    pub async fn cleanup_with_ttl(&self, ttl: Duration) -> usize {
        let now = Utc::now();
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        let mut removed = 0;

        loop {
            let oldest = match self.store.peek_oldest().await {
                Ok(session) => session,
                Err(Error::NotFound(_)) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to peek oldest session during cleanup");
                    break;
                }
            };

            if !oldest.is_expired(ttl, now) {
                break;
            }

            match self.store.delete(&oldest.id).await {
                Ok(()) => {
                    trace!(session_id = %oldest.id, "Removed expired session");
                    removed += 1;
                }
                // Someone else removed it between the peek and the delete.
                Err(Error::NotFound(_)) => {}
                Err(e) => {
                    warn!(session_id = %oldest.id, error = %e, "Failed to remove expired session");
                    break;
                }
            }
        }

        if removed > 0 {
            self.reaped.fetch_add(removed as u64, Ordering::Relaxed);
            info!(count = removed, "Cleaned up expired sessions");
        }

        removed
    }
}

impl<S: SessionStore + 'static> SessionManager<S> {
    /// Start the background reaper with the configured interval and TTL.
    pub fn spawn_reaper(&self) -> ReaperHandle {
        self.start_reaper(self.config.cleanup_interval, self.config.ttl)
    }

    /// Start a background task that runs a cleanup pass every `interval`.
    ///
    /// Must be called from within a tokio runtime. The task runs until the
    /// returned handle is stopped or dropped.
    pub fn start_reaper(&self, interval: Duration, ttl: Duration) -> ReaperHandle {
        reaper::spawn(self.clone(), interval, ttl)
    }
}

impl<S: SessionStore> Clone for SessionManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ids: Arc::clone(&self.ids),
            config: self.config.clone(),
            reaped: Arc::clone(&self.reaped),
        }
    }
}
