//! Monitor timing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Timing knobs for the session monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between checks. Default: 60.
    pub check_interval_secs: u64,
    /// Seconds without interaction before the user is logged out. Default: 1800.
    pub idle_timeout_secs: u64,
    /// A check pings the backend and extends the session only if the last
    /// interaction is more recent than this many seconds. Default: 600.
    pub liveness_window_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 60,
            idle_timeout_secs: 30 * 60,
            liveness_window_secs: 10 * 60,
        }
    }
}

impl MonitorConfig {
    /// Fix values that would make the monitor misbehave.
    ///
    /// - `check_interval_secs` at least 1 (a zero interval would spin)
    /// - `liveness_window_secs` at most `idle_timeout_secs`
    pub fn validated(mut self) -> Self {
        if self.check_interval_secs == 0 {
            warn!("check_interval_secs is 0; using 1");
            self.check_interval_secs = 1;
        }
        if self.liveness_window_secs > self.idle_timeout_secs {
            warn!(
                window = self.liveness_window_secs,
                idle = self.idle_timeout_secs,
                "liveness window longer than idle timeout; clamping"
            );
            self.liveness_window_secs = self.idle_timeout_secs;
        }
        self
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn liveness_window(&self) -> Duration {
        Duration::from_secs(self.liveness_window_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let config = MonitorConfig::default();
        assert_eq!(config.check_interval(), Duration::from_secs(60));
        assert_eq!(config.idle_timeout(), Duration::from_secs(1800));
        assert_eq!(config.liveness_window(), Duration::from_secs(600));
    }

    #[test]
    fn test_validated_fixes_zero_interval_and_wide_window() {
        let config = MonitorConfig {
            check_interval_secs: 0,
            idle_timeout_secs: 100,
            liveness_window_secs: 500,
        }
        .validated();
        assert_eq!(config.check_interval_secs, 1);
        assert_eq!(config.liveness_window_secs, 100);
    }
}
