//! Session monitor for Beata.
//!
//! Logs the user out when they walk away, and keeps the backend session
//! warm while they don't.
//!
//! # Each check (once a minute)
//!
//! 1. no loadable session → stop
//! 2. session past its absolute expiry → stop, call `on_expire`
//! 3. idle longer than the idle timeout → stop, call `on_expire`
//! 4. active within the liveness window → ping backend, extend session
//!
//! Expiry and idleness are always checked before anything is extended, so
//! a session that should end is never silently renewed.
//!
//! # Integration
//!
//! The UI layer forwards raw input events into an [`InteractionHub`]; the
//! monitor registers a listener on it while running.
//!
//! ```ignore
//! let hub = InteractionHub::new();
//! let mut monitor = SessionMonitor::new(store, probe, hub.clone(), MonitorConfig::default());
//! monitor.start(|| tracing::info!("logged out"));
//!
//! // from the event loop:
//! hub.dispatch(InteractionKind::KeyDown);
//! ```

mod config;
mod interaction;
mod monitor;

pub use config::MonitorConfig;
pub use interaction::{InteractionHub, InteractionKind, ListenerId};
pub use monitor::{CheckOutcome, MonitorHandle, SessionMonitor};
