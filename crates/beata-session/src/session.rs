//! Session types: what the client knows about the logged-in user.
//!
//! There are two views of the same data:
//! - [`UserRecord`]: exactly what sits in storage. Every field is optional
//!   because storage can hold anything (an old client version, a half-written
//!   login response, hand-edited data).
//! - [`UserSession`]: a record that passed validation. If you hold one,
//!   every required field is present and non-empty.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::InvalidSession;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Storage key the record lives under. Default: `"user"`.
    pub storage_key: String,

    /// How long (in seconds) a saved session stays valid.
    ///
    /// Default: 8 hours. Every save restarts this window from "now".
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: "user".to_string(),
            ttl_secs: 8 * 60 * 60,
        }
    }
}

impl SessionConfig {
    /// Longest accepted TTL (one year).
    pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called by [`SessionStore`](crate::SessionStore) on construction.
    pub fn validated(mut self) -> Self {
        if self.ttl_secs > Self::MAX_TTL_SECS {
            warn!(
                ttl_secs = self.ttl_secs,
                max = Self::MAX_TTL_SECS,
                "session ttl exceeds maximum; clamping"
            );
            self.ttl_secs = Self::MAX_TTL_SECS;
        }
        if self.storage_key.is_empty() {
            warn!("empty storage key; falling back to \"user\"");
            self.storage_key = Self::default().storage_key;
        }
        self
    }

    /// The session lifetime as a chrono delta.
    pub fn ttl(&self) -> TimeDelta {
        // Bounded by MAX_TTL_SECS after `validated`, so the cast is lossless.
        TimeDelta::seconds(self.ttl_secs.min(Self::MAX_TTL_SECS) as i64)
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// What a logged-in user is allowed to be.
///
/// A closed set: anything the backend sends that isn't one of these is not
/// a role, and a record carrying it is not a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    /// Parse the wire representation.
    ///
    /// Accepts the legacy IMS value `"cafe_staff"` as [`Role::Staff`].
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "admin" => Some(Self::Admin),
            "staff" | "cafe_staff" => Some(Self::Staff),
            _ => None,
        }
    }

    /// Canonical wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

/// Opaque user identifier.
///
/// The backend sends numeric ids, older clients stored strings. Both end
/// up here as text; nothing in the client does arithmetic on ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads an id out of a raw JSON value. Empty strings, `null`, booleans,
    /// arrays and objects are not ids.
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self(n.to_string())),
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// UserRecord
// ---------------------------------------------------------------------------

/// The stored (or freshly received) user object, exactly as JSON.
///
/// Fields the client doesn't care about (email, profile picture, …) are
/// kept in `extra` so re-saving a record never loses them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Absolute expiry, epoch milliseconds. Stamped by the store on save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Build a complete record, typically from a successful login.
    pub fn new(user_id: impl Into<Value>, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: Some(user_id.into()),
            username: Some(username.into()),
            role: Some(role.as_str().to_string()),
            ..Self::default()
        }
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

// ---------------------------------------------------------------------------
// UserSession
// ---------------------------------------------------------------------------

/// A validated session: every required field is present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
    pub token: Option<String>,
}

impl UserSession {
    /// Validate a raw record.
    ///
    /// A record is either fully populated or it isn't a session at all;
    /// there is no partially-logged-in state.
    pub fn from_record(record: &UserRecord) -> Result<Self, InvalidSession> {
        let user_id = record
            .user_id
            .as_ref()
            .and_then(UserId::from_json)
            .ok_or(InvalidSession::MissingUserId)?;

        let username = record
            .username
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(InvalidSession::MissingUsername)?
            .to_string();

        let raw_role = record
            .role
            .as_deref()
            .filter(|role| !role.is_empty())
            .ok_or(InvalidSession::MissingRole)?;
        let role = Role::parse(raw_role)
            .ok_or_else(|| InvalidSession::UnknownRole(raw_role.to_string()))?;

        let millis = record.expiry.ok_or(InvalidSession::MissingExpiry)?;
        let expires_at = DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or(InvalidSession::ExpiryOutOfRange(millis))?;

        Ok(Self {
            user_id,
            username,
            role,
            expires_at,
            token: record.token.clone().filter(|t| !t.is_empty()),
        })
    }

    /// Whether the absolute expiry has passed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// `Authorization` header value for authenticated requests, if the
    /// backend issued a token.
    pub fn authorization_header(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {token}"))
    }
}
