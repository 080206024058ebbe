//! Liveness probes for the Beata backend.
//!
//! While a user is active the client pings the backend so its side of the
//! session stays warm. This crate defines what a ping is ([`LivenessProbe`])
//! and ships one implementation over HTTP.
//!
//! # Feature Flags
//!
//! - `http` (default): [`HttpProbe`] via `reqwest`

mod error;
#[cfg(feature = "http")]
mod http;

pub use error::LivenessError;
#[cfg(feature = "http")]
pub use http::HttpProbe;

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Where and how to ping the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Backend root. The probe requests `<base_url>/`.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8001".to_string(),
            timeout_secs: 10,
        }
    }
}

/// A best-effort "are you there?" to the backend.
///
/// Failures are reported, never retried here. The session monitor logs
/// them and carries on.
pub trait LivenessProbe: Send + Sync + 'static {
    fn ping(&self) -> impl Future<Output = Result<(), LivenessError>> + Send;
}

impl<P: LivenessProbe> LivenessProbe for Arc<P> {
    fn ping(&self) -> impl Future<Output = Result<(), LivenessError>> + Send {
        P::ping(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_config_defaults_match_backend() {
        let config = ProbeConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8001");
        assert_eq!(config.timeout_secs, 10);
    }
}
