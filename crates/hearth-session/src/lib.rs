//! In-process session store with LRU eviction and TTL expiry.
//!
//! This crate provides:
//! - [`LruStore`]: a concurrent session store with O(1) get/set/delete and
//!   least-recently-used eviction once a capacity bound is reached
//! - [`SessionManager`]: get-or-create semantics on top of any [`SessionStore`]
//! - a cancellable background reaper that removes sessions idle past their TTL
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use hearth_session::{SessionConfig, SessionManager};
//!
//! # async fn run() -> hearth_session::Result<()> {
//! let config = SessionConfig::default()
//!     .with_max_sessions(1000)
//!     .with_ttl(Duration::from_secs(3600));
//!
//! let manager = SessionManager::new(config);
//! let reaper = manager.spawn_reaper();
//!
//! let session = manager.get_or_create("").await?;
//! println!("new session {}", session.id);
//!
//! reaper.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod manager;
mod memory;
mod reaper;
mod record;
mod store;

pub use config::{DEFAULT_CLEANUP_INTERVAL, DEFAULT_MAX_SESSIONS, DEFAULT_TTL, SessionConfig};
pub use error::{Error, Result};
pub use manager::{IdGenerator, SessionManager, UuidGenerator};
pub use memory::{LruStore, StoreStats};
pub use reaper::ReaperHandle;
pub use record::{Session, SessionData};
pub use store::SessionStore;
