//! Error types for the session layer.

/// Errors surfaced by [`SessionStore`](crate::SessionStore) operations.
///
/// Malformed stored data is deliberately *not* in this list: a record that
/// fails to parse or validate is logged and treated as "no session".
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The storage medium failed to read, write, or remove the record.
    #[error("session storage unavailable: {0}")]
    Storage(#[from] StorageError),

    /// The record could not be serialized for storage.
    #[error("failed to encode session record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failures of the underlying key-value medium.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The medium refused the operation (lock poisoned, quota, etc.).
    #[error("{0}")]
    Unavailable(String),

    /// The key contains characters the medium can't represent.
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    /// A filesystem operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Why a stored [`UserRecord`](crate::UserRecord) is not a usable session.
///
/// Only ever logged. Callers see an absent session instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSession {
    #[error("missing or empty user id")]
    MissingUserId,

    #[error("missing or empty username")]
    MissingUsername,

    #[error("missing role")]
    MissingRole,

    #[error("unknown role {0:?}")]
    UnknownRole(String),

    #[error("missing expiry timestamp")]
    MissingExpiry,

    #[error("expiry timestamp {0} out of range")]
    ExpiryOutOfRange(i64),
}
