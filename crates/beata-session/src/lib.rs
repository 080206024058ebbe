//! Client-side session persistence for Beata.
//!
//! This crate owns the one piece of mutable shared state in the client:
//! the "current user" record that says someone is logged in.
//!
//! 1. **Model**: the raw [`UserRecord`] the backend hands us at login and
//!    the validated [`UserSession`] view the rest of the client works with
//! 2. **Storage**: a key-value string medium ([`Storage`]) that survives
//!    restarts, with in-memory and file-backed implementations
//! 3. **Store**: [`SessionStore`], which stamps an absolute expiry on save
//!    and discards anything partial or unparseable on load
//!
//! # How it fits in the stack
//!
//! ```text
//! Monitor (above)  ← extends or clears the session on a timer
//! Guard   (above)  ← reads the session on every navigation
//!     ↕
//! Session Layer (this crate)  ← persists the current user
//!     ↕
//! Storage medium (below)  ← memory, or one file per key on disk
//! ```

mod clock;
mod error;
mod session;
mod storage;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{InvalidSession, SessionError, StorageError};
pub use session::{Role, SessionConfig, UserId, UserRecord, UserSession};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::SessionStore;
