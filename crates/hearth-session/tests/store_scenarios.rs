//! End-to-end scenarios for the session store and manager.
//!
//! These exercise only the public API: capacity eviction, get-or-create
//! with generated ids, and TTL sweeps.

use std::time::Duration;

use chrono::Utc;
use hearth_session::{Error, LruStore, Session, SessionConfig, SessionManager, SessionStore};

fn idle_for(id: &str, idle: chrono::Duration) -> Session {
    let mut session = Session::new(id);
    let then = Utc::now() - idle;
    session.created_at = then;
    session.active_at = then;
    session
}

#[tokio::test]
async fn test_capacity_two_keeps_newest_pair() {
    let store = LruStore::with_capacity(2);
    store.set(Session::new("A")).await.unwrap();
    store.set(Session::new("B")).await.unwrap();
    store.set(Session::new("C")).await.unwrap();

    assert_eq!(store.len().await, 2);
    assert!(matches!(store.get("A").await, Err(Error::NotFound(_))));
    assert!(store.get("B").await.is_ok());
    assert!(store.get("C").await.is_ok());
}

#[tokio::test]
async fn test_each_insert_at_capacity_evicts_exactly_one() {
    let store = LruStore::with_capacity(5);
    for i in 0..5 {
        store.set(Session::new(format!("s{i}"))).await.unwrap();
    }

    for i in 5..20 {
        let expected_victim = store.peek_oldest().await.unwrap().id;
        store.set(Session::new(format!("s{i}"))).await.unwrap();

        assert_eq!(store.len().await, 5);
        assert!(!store.contains(&expected_victim).await);
    }
}

#[tokio::test]
async fn test_get_or_create_round_trip() {
    let manager = SessionManager::new(SessionConfig::default());

    let created = manager.get_or_create("").await.unwrap();
    assert!(!created.id.is_empty());

    let resolved = manager.get_or_create(&created.id).await.unwrap();
    assert_eq!(resolved.id, created.id);
    assert_eq!(resolved.created_at, created.created_at);
}

#[tokio::test]
async fn test_one_hour_ttl_sweep() {
    let manager = SessionManager::new(SessionConfig::default().with_ttl(Duration::from_secs(3600)));
    let store = manager.store();

    store
        .set(idle_for("two-hours", chrono::Duration::hours(2)))
        .await
        .unwrap();
    manager.cleanup().await;
    assert!(!store.contains("two-hours").await);

    store
        .set(idle_for("ten-minutes", chrono::Duration::minutes(10)))
        .await
        .unwrap();
    manager.cleanup().await;
    assert!(store.contains("ten-minutes").await);
}

#[tokio::test]
async fn test_touch_rescues_session_from_sweep() {
    let manager = SessionManager::new(SessionConfig::default().with_ttl(Duration::from_secs(60)));
    let store = manager.store();

    store
        .set(idle_for("idle", chrono::Duration::minutes(5)))
        .await
        .unwrap();
    manager.get_or_create("idle").await.unwrap();

    assert_eq!(manager.cleanup().await, 0);
    assert!(store.contains("idle").await);
}

#[tokio::test]
async fn test_concurrent_managers_share_one_store() {
    let manager = SessionManager::new(SessionConfig::default().with_max_sessions(64));
    let mut handles = Vec::new();

    for worker in 0..8 {
        let manager = manager.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..50 {
                let id = format!("w{worker}-{}", i % 10);
                let mut session = manager.get_or_create(&id).await.unwrap();
                session.insert("hits", i);
                manager.save(session).await.unwrap();
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(manager.store().len().await, 64);
    assert_eq!(manager.store().stats().await.size, 64);
}
