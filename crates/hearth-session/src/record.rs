//! The session record stored by the cache.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Payload type carried by a session.
pub type SessionData = HashMap<String, serde_json::Value>;

/// A single session: identifier, payload and activity timestamps.
///
/// Values handed out by the store are snapshots. Changes to `data` are only
/// visible to other callers after they are written back with
/// [`SessionStore::set`](crate::SessionStore::set) or applied in place with
/// [`LruStore::update`](crate::LruStore::update).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier; the hash key in the store.
    pub id: String,

    /// Arbitrary key-value payload.
    #[serde(default)]
    pub data: SessionData,

    /// When the session was created.
    pub created_at: DateTime<Utc>,

    /// When the session was last retrieved.
    pub active_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session stamped with the current time.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            data: SessionData::new(),
            created_at: now,
            active_at: now,
        }
    }

    /// Refresh `active_at` to the current time.
    ///
    /// Never moves the timestamp backwards.
    pub fn touch(&mut self) {
        self.touch_at(Utc::now());
    }

    pub(crate) fn touch_at(&mut self, now: DateTime<Utc>) {
        if now > self.active_at {
            self.active_at = now;
        }
    }

    /// Whether the session has been idle for longer than `ttl` as of `now`.
    ///
    /// A deadline past the representable range never expires.
    pub fn is_expired(&self, ttl: TimeDelta, now: DateTime<Utc>) -> bool {
        match self.active_at.checked_add_signed(ttl) {
            Some(deadline) => deadline < now,
            None => false,
        }
    }

    /// Read a payload value.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Set a payload value, returning the previous one.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Option<serde_json::Value> {
        self.data.insert(key.into(), value.into())
    }

    /// Remove a payload value.
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_timestamps() {
        let session = Session::new("s1");
        assert_eq!(session.id, "s1");
        assert!(session.data.is_empty());
        assert_eq!(session.created_at, session.active_at);
    }

    #[test]
    fn test_touch_never_goes_backwards() {
        let mut session = Session::new("s1");
        let before = session.active_at;

        session.touch_at(before - chrono::Duration::minutes(5));
        assert_eq!(session.active_at, before);

        session.touch_at(before + chrono::Duration::seconds(1));
        assert!(session.active_at > before);
        assert!(session.active_at >= session.created_at);
    }

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        let mut session = Session::new("s1");
        let ttl = chrono::Duration::hours(1);

        session.active_at = now - chrono::Duration::hours(2);
        assert!(session.is_expired(ttl, now));

        session.active_at = now - chrono::Duration::minutes(10);
        assert!(!session.is_expired(ttl, now));
    }

    #[test]
    fn test_payload_accessors() {
        let mut session = Session::new("s1");
        assert_eq!(session.insert("user", "alice"), None);
        assert_eq!(session.get("user"), Some(&serde_json::json!("alice")));
        assert_eq!(session.remove("user"), Some(serde_json::json!("alice")));
        assert!(session.get("user").is_none());
    }

    #[test]
    fn test_serde_shape() {
        let mut session = Session::new("s1");
        session.insert("n", 3);

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["id"], "s1");
        assert_eq!(json["data"]["n"], 3);

        let back: Session = serde_json::from_value(json).unwrap();
        assert_eq!(back, session);
    }
}
