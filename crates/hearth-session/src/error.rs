//! Error types for session store operations.

/// Error type for session store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No session with this identifier is present (or the store is empty).
    #[error("Session not found: {0}")]
    NotFound(String),

    /// Failure reported by a store backend. Never produced by [`LruStore`].
    ///
    /// [`LruStore`]: crate::LruStore
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Create a not found error.
    pub fn not_found(session_id: impl Into<String>) -> Self {
        Self::NotFound(session_id.into())
    }

    /// Whether this is the `NotFound` condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, Error>;
