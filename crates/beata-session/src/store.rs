//! The session store: save, load, clear, and expiry checks.
//!
//! # Lifecycle of the stored record
//!
//! ```text
//! login ──→ save() ──→ [stored, expiry = now + ttl]
//!                          │        │
//!                 extend() │        │ clear() / expiry / idle logout
//!                (monitor) ▼        ▼
//!                  [stored, later]  [absent]
//! ```
//!
//! # Failure policy
//!
//! - Unparseable or incomplete records are logged and reported as absent.
//!   Callers never see them.
//! - Storage failures are propagated from `save`, `load`, `clear` and
//!   `extend`. [`SessionStore::is_expired`] and
//!   [`SessionStore::session_or_none`] fold them into the safe answer
//!   ("expired", "no session").

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::{
    Clock, SessionConfig, SessionError, Storage, SystemClock, UserRecord,
    UserSession,
};

/// Persists the single "current user" record.
///
/// Cheap to clone: clones share the same storage medium and clock, so the
/// navigation guard and the session monitor can each hold one.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
}

impl SessionStore {
    /// Creates a store on the system clock.
    pub fn new(storage: impl Storage, config: SessionConfig) -> Self {
        Self::with_clock(storage, SystemClock, config)
    }

    /// Creates a store with an explicit clock (tests use [`ManualClock`](crate::ManualClock)).
    pub fn with_clock(
        storage: impl Storage,
        clock: impl Clock,
        config: SessionConfig,
    ) -> Self {
        Self {
            storage: Arc::new(storage),
            clock: Arc::new(clock),
            config: config.validated(),
        }
    }

    /// Stamps `record` with `expiry = now + ttl` and persists it,
    /// overwriting whatever was stored before.
    ///
    /// The record is written as-is even if it is incomplete; validation
    /// happens on [`load`](Self::load).
    pub fn save(&self, record: UserRecord) -> Result<(), SessionError> {
        self.write(record).map(|_| ())
    }

    /// Reads the current session.
    ///
    /// Returns `Ok(None)` when nothing is stored, when the stored data is
    /// not JSON, or when it is missing a required field.
    pub fn load(&self) -> Result<Option<UserSession>, SessionError> {
        let Some(record) = self.read_record()? else {
            return Ok(None);
        };
        match UserSession::from_record(&record) {
            Ok(session) => Ok(Some(session)),
            Err(reason) => {
                warn!(%reason, "discarding invalid stored session");
                Ok(None)
            }
        }
    }

    /// Removes the stored session. Safe to call when nothing is stored.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.storage
            .remove(&self.config.storage_key)
            .inspect_err(|e| error!(error = %e, "failed to clear session"))?;
        debug!("session cleared");
        Ok(())
    }

    /// `true` when there is no loadable session or its expiry has passed.
    ///
    /// A storage failure counts as expired.
    pub fn is_expired(&self) -> bool {
        match self.session_or_none() {
            Some(session) => session.is_expired_at(self.now()),
            None => true,
        }
    }

    /// Re-saves the stored record so its expiry becomes `now + ttl` again.
    ///
    /// Every stored field is kept. Returns the new expiry, or `None` (and
    /// writes nothing) when there's no valid session to extend.
    pub fn extend(&self) -> Result<Option<DateTime<Utc>>, SessionError> {
        let Some(record) = self.read_record()? else {
            return Ok(None);
        };
        if let Err(reason) = UserSession::from_record(&record) {
            warn!(%reason, "not extending invalid stored session");
            return Ok(None);
        }

        self.write(record).map(Some)
    }

    /// [`load`](Self::load), with storage failures logged and treated as
    /// "no session".
    pub fn session_or_none(&self) -> Option<UserSession> {
        self.load().unwrap_or_else(|e| {
            error!(error = %e, "session storage unreadable; treating as logged out");
            None
        })
    }

    /// Current wall-clock time according to this store's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn write(&self, mut record: UserRecord) -> Result<DateTime<Utc>, SessionError> {
        let expires_at = self.now() + self.config.ttl();
        record.expiry = Some(expires_at.timestamp_millis());

        let json = serde_json::to_string(&record)?;
        self.storage
            .set(&self.config.storage_key, &json)
            .inspect_err(|e| error!(error = %e, "failed to persist session"))?;

        info!(
            username = record.username.as_deref().unwrap_or_default(),
            %expires_at,
            "session saved"
        );
        Ok(expires_at)
    }

    fn read_record(&self) -> Result<Option<UserRecord>, SessionError> {
        let raw = self
            .storage
            .get(&self.config.storage_key)
            .inspect_err(|e| error!(error = %e, "failed to read session"))?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        match serde_json::from_str::<UserRecord>(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(error = %e, "stored session is not valid JSON; ignoring");
                Ok(None)
            }
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// =========================================================================
// Tests
// =========================================================================
