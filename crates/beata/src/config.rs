//! Layered configuration for the client core.
//!
//! Every section has defaults matching the production clients, so an
//! empty file (or no file) is a valid configuration:
//!
//! ```toml
//! [session]
//! storage_key = "user"
//! ttl_secs = 28800
//!
//! [monitor]
//! check_interval_secs = 60
//! idle_timeout_secs = 1800
//! liveness_window_secs = 600
//!
//! [guard]
//! login_path = "/login"
//! admin_home = "/dashboard"
//! staff_home = "/homeims"
//!
//! [probe]
//! base_url = "http://127.0.0.1:8001"
//! timeout_secs = 10
//! ```

use std::path::Path;

use beata_access::GuardConfig;
use beata_liveness::ProbeConfig;
use beata_monitor::MonitorConfig;
use beata_session::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeataConfig {
    pub session: SessionConfig,
    pub monitor: MonitorConfig,
    pub guard: GuardConfig,
    pub probe: ProbeConfig,
}

impl BeataConfig {
    /// Parse a TOML document. Missing sections and keys take defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}
