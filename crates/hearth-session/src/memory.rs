//! In-memory session store with LRU ordering.

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::config::DEFAULT_MAX_SESSIONS;
use crate::error::{Error, Result};
use crate::record::{Session, SessionData};
use crate::store::SessionStore;

/// Identifier reported by `peek_oldest` when there is nothing to peek at.
const EMPTY_STORE: &str = "<empty store>";

/// Sessions in recency order plus access counters, guarded by one lock.
struct StoreInner {
    lru: LruCache<String, Session>,
    counters: Counters,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    hits: u64,
    misses: u64,
    evictions: u64,
    removals: u64,
}

impl StoreInner {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            lru: LruCache::new(capacity),
            counters: Counters::default(),
        }
    }

    /// Look up a session, promote it to most recently used and refresh
    /// `active_at`.
    fn touch(&mut self, session_id: &str) -> Option<&mut Session> {
        let Some(session) = self.lru.get_mut(session_id) else {
            self.counters.misses += 1;
            return None;
        };

        self.counters.hits += 1;
        session.touch_at(Utc::now());
        Some(session)
    }

    fn insert(&mut self, session: Session) {
        // Make room ourselves so evictions are counted and logged.
        if !self.lru.contains(session.id.as_str())
            && self.lru.len() >= self.lru.cap().get()
            && let Some((evicted_id, _)) = self.lru.pop_lru()
        {
            self.counters.evictions += 1;
            debug!(session_id = %evicted_id, "Evicting LRU session to make room");
        }

        self.lru.put(session.id.clone(), session);
    }

    fn remove(&mut self, session_id: &str) -> Option<Session> {
        let session = self.lru.pop(session_id)?;
        self.counters.removals += 1;
        Some(session)
    }

    fn oldest(&self) -> Option<&Session> {
        self.lru.peek_lru().map(|(_, session)| session)
    }
}

/// In-memory session store with LRU eviction.
///
/// Sessions live in an [`LruCache`] ordered from most to least recently
/// used, behind one `RwLock`: [`get`](SessionStore::get) takes the write lock
/// because it promotes the entry, while `len`, `peek_oldest`, `contains` and
/// `stats` only read.
///
/// Cloning is cheap and yields another handle to the same store.
#[derive(Clone)]
pub struct LruStore {
    inner: Arc<RwLock<StoreInner>>,
    capacity: usize,
}

impl LruStore {
    /// Create a store with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_SESSIONS)
    }

    /// Create a store holding at most `capacity` sessions.
    ///
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(RwLock::new(StoreInner::new(capacity))),
            capacity: capacity.get(),
        }
    }

    /// Maximum number of sessions held before eviction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check whether a session is present without touching it.
    pub async fn contains(&self, session_id: &str) -> bool {
        self.inner.read().await.lru.contains(session_id)
    }

    /// Mutate a session's payload in place under the store lock.
    ///
    /// This is an access like [`get`](SessionStore::get): the session moves
    /// to the front and `active_at` is refreshed. Returns the closure's
    /// result together with a snapshot of the updated session.
    pub async fn update<F, R>(&self, session_id: &str, f: F) -> Result<(R, Session)>
    where
        F: FnOnce(&mut SessionData) -> R,
    {
        let mut inner = self.inner.write().await;
        let session = inner
            .touch(session_id)
            .ok_or_else(|| Error::not_found(session_id))?;

        let result = f(&mut session.data);
        trace!(session_id = %session_id, "Session payload updated");

        Ok((result, session.clone()))
    }

    /// Session ids ordered from most to least recently used.
    pub async fn ids(&self) -> Vec<String> {
        let inner = self.inner.read().await;
        inner.lru.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Remove every session. Returns how many were dropped.
    pub async fn clear(&self) -> usize {
        let mut inner = self.inner.write().await;
        let count = inner.lru.len();
        inner.lru.clear();

        debug!(count, "Cleared session store");
        count
    }

    /// Snapshot of size and cumulative counters.
    pub async fn stats(&self) -> StoreStats {
        let inner = self.inner.read().await;
        StoreStats {
            size: inner.lru.len(),
            capacity: self.capacity,
            hits: inner.counters.hits,
            misses: inner.counters.misses,
            evictions: inner.counters.evictions,
            removals: inner.counters.removals,
        }
    }
}

impl Default for LruStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for LruStore {
    async fn get(&self, session_id: &str) -> Result<Session> {
        let mut inner = self.inner.write().await;
        match inner.touch(session_id) {
            Some(session) => {
                trace!(session_id = %session_id, "Session found in store");
                Ok(session.clone())
            }
            None => Err(Error::not_found(session_id)),
        }
    }

    async fn set(&self, session: Session) -> Result<()> {
        let mut inner = self.inner.write().await;
        let session_id = session.id.clone();
        inner.insert(session);

        trace!(
            session_id = %session_id,
            store_size = inner.lru.len(),
            "Session stored"
        );
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        match inner.remove(session_id) {
            Some(_) => {
                debug!(session_id = %session_id, "Deleted session");
                Ok(())
            }
            None => Err(Error::not_found(session_id)),
        }
    }

    async fn len(&self) -> usize {
        self.inner.read().await.lru.len()
    }

    async fn peek_oldest(&self) -> Result<Session> {
        let inner = self.inner.read().await;
        inner
            .oldest()
            .cloned()
            .ok_or_else(|| Error::not_found(EMPTY_STORE))
    }
}

/// Store statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StoreStats {
    /// Current number of sessions.
    pub size: usize,

    /// Maximum capacity.
    pub capacity: usize,

    /// Lookups that found their session.
    pub hits: u64,

    /// Lookups for an absent id.
    pub misses: u64,

    /// Sessions dropped to make room for new ones.
    pub evictions: u64,

    /// Sessions removed by explicit deletes, including reaper expiry.
    pub removals: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backdated(id: &str, minutes: i64) -> Session {
        let mut session = Session::new(id);
        let then = Utc::now() - chrono::Duration::minutes(minutes);
        session.created_at = then;
        session.active_at = then;
        session
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = LruStore::with_capacity(10);
        let mut session = Session::new("session-1");
        session.insert("user", "alice");
        store.set(session).await.unwrap();

        let loaded = store.get("session-1").await.unwrap();
        assert_eq!(loaded.id, "session-1");
        assert_eq!(loaded.get("user"), Some(&serde_json::json!("alice")));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = LruStore::new();
        let result = store.get("nonexistent").await;
        assert!(matches!(result, Err(Error::NotFound(id)) if id == "nonexistent"));
    }

    #[tokio::test]
    async fn test_capacity_evicts_lru() {
        let store = LruStore::with_capacity(2);
        store.set(Session::new("a")).await.unwrap();
        store.set(Session::new("b")).await.unwrap();
        store.set(Session::new("c")).await.unwrap();

        assert_eq!(store.len().await, 2);
        assert!(store.get("a").await.unwrap_err().is_not_found());
        assert!(store.get("b").await.is_ok());
        assert!(store.get("c").await.is_ok());
        assert_eq!(store.stats().await.evictions, 1);
    }

    #[tokio::test]
    async fn test_get_protects_from_eviction() {
        let store = LruStore::with_capacity(3);
        for id in ["s1", "s2", "s3"] {
            store.set(Session::new(id)).await.unwrap();
        }

        store.get("s1").await.unwrap();
        store.set(Session::new("s4")).await.unwrap();

        assert!(store.contains("s1").await);
        assert!(!store.contains("s2").await);
        assert!(store.contains("s3").await);
        assert!(store.contains("s4").await);
    }

    #[tokio::test]
    async fn test_replacing_existing_id_does_not_evict() {
        let store = LruStore::with_capacity(2);
        store.set(Session::new("a")).await.unwrap();
        store.set(Session::new("b")).await.unwrap();

        let mut replacement = Session::new("a");
        replacement.insert("v", 2);
        store.set(replacement).await.unwrap();

        assert_eq!(store.len().await, 2);
        assert_eq!(store.ids().await, vec!["a", "b"]);
        assert_eq!(
            store.get("a").await.unwrap().get("v"),
            Some(&serde_json::json!(2))
        );
        assert_eq!(store.stats().await.evictions, 0);
    }

    #[tokio::test]
    async fn test_peek_oldest_does_not_touch() {
        let store = LruStore::new();
        assert!(store.peek_oldest().await.unwrap_err().is_not_found());

        store.set(backdated("old", 30)).await.unwrap();
        store.set(Session::new("new")).await.unwrap();

        let oldest = store.peek_oldest().await.unwrap();
        assert_eq!(oldest.id, "old");

        // Peeking again still returns the same entry with the same timestamp
        let again = store.peek_oldest().await.unwrap();
        assert_eq!(again.id, "old");
        assert_eq!(again.active_at, oldest.active_at);
    }

    #[tokio::test]
    async fn test_peek_oldest_tracks_smallest_active_at() {
        let store = LruStore::new();
        for id in ["a", "b", "c", "d"] {
            store.set(Session::new(id)).await.unwrap();
        }

        for id in ["a", "c", "b", "a"] {
            store.get(id).await.unwrap();
            let oldest = store.peek_oldest().await.unwrap();

            let inner = store.inner.read().await;
            let min = inner
                .lru
                .iter()
                .map(|(_, session)| session.active_at)
                .min()
                .unwrap();
            assert_eq!(oldest.active_at, min);
        }

        assert_eq!(store.peek_oldest().await.unwrap().id, "d");
    }

    #[tokio::test]
    async fn test_repeated_get_is_idempotent_touch() {
        let store = LruStore::new();
        store.set(backdated("s", 5)).await.unwrap();

        let first = store.get("s").await.unwrap();
        let second = store.get("s").await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(first.created_at, second.created_at);
        assert!(second.active_at >= first.active_at);
        assert!(first.active_at > first.created_at);
    }

    #[tokio::test]
    async fn test_delete_then_get_then_set() {
        let store = LruStore::new();
        store.set(Session::new("s")).await.unwrap();

        store.delete("s").await.unwrap();
        assert!(store.get("s").await.unwrap_err().is_not_found());
        assert!(store.delete("s").await.unwrap_err().is_not_found());

        store.set(Session::new("s")).await.unwrap();
        assert!(store.get("s").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_mutates_under_lock() {
        let store = LruStore::new();
        store.set(Session::new("a")).await.unwrap();
        store.set(Session::new("b")).await.unwrap();

        let (previous, snapshot) = store
            .update("a", |data| data.insert("count".into(), serde_json::json!(1)))
            .await
            .unwrap();

        assert!(previous.is_none());
        assert_eq!(snapshot.get("count"), Some(&serde_json::json!(1)));
        assert_eq!(store.ids().await, vec!["a", "b"]);

        let missing = store.update("zzz", |data| data.len()).await;
        assert!(missing.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_zero_capacity_is_clamped() {
        let store = LruStore::with_capacity(0);
        assert_eq!(store.capacity(), 1);

        store.set(Session::new("a")).await.unwrap();
        store.set(Session::new("b")).await.unwrap();
        assert_eq!(store.ids().await, vec!["b"]);
    }

    #[tokio::test]
    async fn test_clear_and_stats() {
        let store = LruStore::with_capacity(100);
        for i in 0..5 {
            store.set(Session::new(format!("s{i}"))).await.unwrap();
        }
        store.get("s1").await.unwrap();
        let _ = store.get("missing").await;
        store.delete("s2").await.unwrap();

        let stats = store.stats().await;
        assert_eq!(stats.size, 4);
        assert_eq!(stats.capacity, 100);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.removals, 1);

        assert_eq!(store.clear().await, 4);
        assert!(store.is_empty().await);
        assert!(store.peek_oldest().await.is_err());
    }

    #[tokio::test]
    async fn test_keys_match_records_under_mixed_ops() {
        let store = LruStore::with_capacity(8);
        for i in 0..40 {
            let id = format!("s{}", i % 13);
            match i % 4 {
                0 | 1 => store.set(Session::new(id)).await.unwrap(),
                2 => {
                    let _ = store.get(&id).await;
                }
                _ => {
                    let _ = store.delete(&id).await;
                }
            }

            let inner = store.inner.read().await;
            assert!(inner.lru.len() <= 8);
            for (id, session) in inner.lru.iter() {
                assert_eq!(id, &session.id);
            }
        }
    }

    #[tokio::test]
    async fn test_concurrent_access() {
        let store = LruStore::with_capacity(50);
        let mut handles = vec![];

        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for j in 0..25 {
                    let id = format!("session-{}", (i * 7 + j) % 80);
                    store.set(Session::new(id.clone())).await.unwrap();
                    let _ = store.get(&id).await;
                    if j % 5 == 0 {
                        let _ = store.delete(&id).await;
                    }
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert!(store.len().await <= 50);
        assert_eq!(store.ids().await.len(), store.len().await);
    }
}
