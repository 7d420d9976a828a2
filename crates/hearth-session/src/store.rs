//! Session store trait definition.

use async_trait::async_trait;

use crate::Result;
use crate::record::Session;

/// Storage backend for sessions.
///
/// Implementations keep an identifier index together with a recency order and
/// must serialize every mutation against each other. [`LruStore`] is the
/// in-memory implementation; the trait exists so [`SessionManager`] can be
/// driven by other backends (or by test doubles).
///
/// [`LruStore`]: crate::LruStore
/// [`SessionManager`]: crate::SessionManager
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a session and mark it as most recently used.
    ///
    /// Refreshes `active_at`. Returns `NotFound` if the id is absent.
    async fn get(&self, session_id: &str) -> Result<Session>;

    /// Insert or replace a session and mark it as most recently used.
    ///
    /// Inserting a new id into a full store evicts the least recently used
    /// session first, whether or not it has expired.
    async fn set(&self, session: Session) -> Result<()>;

    /// Remove a session. Returns `NotFound` if the id is absent.
    async fn delete(&self, session_id: &str) -> Result<()>;

    /// Number of stored sessions.
    async fn len(&self) -> usize;

    /// Whether the store holds no sessions.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// The least recently used session, without touching it.
    ///
    /// Returns `NotFound` when the store is empty.
    async fn peek_oldest(&self) -> Result<Session>;
}
