//! Unified error type for the Beata client core.

use std::path::PathBuf;

use beata_liveness::LivenessError;
use beata_session::{SessionError, StorageError};

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` conversions let `?` lift sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BeataError {
    /// Persisting or reading the session failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Building or using the liveness probe failed.
    #[error(transparent)]
    Liveness(#[from] LivenessError),

    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The login response is missing a required field, so no session was
    /// created.
    #[error("login response does not describe a complete user")]
    IncompleteLogin,
}

impl From<StorageError> for BeataError {
    fn from(err: StorageError) -> Self {
        Self::Session(SessionError::Storage(err))
    }
}

/// Failures while loading [`BeataConfig`](crate::BeataConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
