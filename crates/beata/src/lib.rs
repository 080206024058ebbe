//! # Beata
//!
//! Session handling and route access control for the Beata café clients
//! (the inventory-management app and the ordering front-end).
//!
//! The backend owns every business rule. What the client owns is small but
//! stateful: who is logged in, until when, which pages they may open, and
//! when to log them out for walking away.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use beata::prelude::*;
//!
//! # async fn run() -> Result<(), BeataError> {
//! let config = BeataConfig::default();
//! let storage = FileStorage::open("./.beata")?;
//! let mut client = SessionClient::builder(config).build_http(storage)?;
//!
//! // After the login endpoint answers:
//! client.login(UserRecord::new(1, "ana", Role::Admin).with_token("t0k3n"))?;
//!
//! // On every route change:
//! match client.navigate(&Route::new("/users"), &Route::new("/dashboard")) {
//!     Decision::Proceed => { /* render */ }
//!     Decision::RedirectTo(redirect) => { /* go to redirect.path */ }
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;

pub use client::{SessionClient, SessionClientBuilder};
pub use config::BeataConfig;
pub use error::{BeataError, ConfigError};

/// Everything a client application normally needs.
pub mod prelude {
    pub use crate::{BeataConfig, BeataError, SessionClient, SessionClientBuilder};
    pub use beata_access::{Decision, GuardConfig, Redirect, Route, RouteClass, RouteTable};
    pub use beata_liveness::{HttpProbe, LivenessProbe, ProbeConfig};
    pub use beata_monitor::{CheckOutcome, InteractionHub, InteractionKind, MonitorConfig};
    pub use beata_session::{
        FileStorage, MemoryStorage, Role, SessionConfig, SessionStore, Storage, UserRecord,
        UserSession,
    };
}
