//! Error types for liveness probes.

/// Why a ping did not count as success.
#[derive(Debug, thiserror::Error)]
pub enum LivenessError {
    /// The backend answered, but not with a 2xx status.
    #[error("backend answered with status {0}")]
    Status(u16),

    /// The request never got an answer (connect, timeout, TLS, ...).
    #[cfg(feature = "http")]
    #[error("liveness request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Any other probe failure.
    #[error("liveness probe failed: {0}")]
    Failed(String),
}
