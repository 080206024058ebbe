//! The session monitor: an isolated Tokio task per monitoring run.
//!
//! ```text
//!            start(on_expire)
//!                  │
//!                  ▼
//!   ┌──────── monitor task ─────────┐
//!   │ select! {                      │ ◄── InteractionHub (activity)
//!   │   activity → last_activity     │
//!   │   tick     → check()           │ ──→ SessionStore (load / extend)
//!   │ }                              │ ──→ LivenessProbe (ping)
//!   └────────────────────────────────┘
//!                  │ NoSession | Expired | Idle
//!                  ▼
//!     listener removed, task ends, on_expire (Expired/Idle only)
//! ```
//!
//! Everything the task touches is owned by the task. The only way in from
//! outside is the activity channel, and the only way to end it early is
//! through the [`MonitorHandle`].

use std::sync::Arc;

use beata_liveness::LivenessProbe;
use beata_session::SessionStore;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

use crate::{InteractionHub, InteractionKind, ListenerId, MonitorConfig};

type ExpireCallback = Box<dyn FnOnce() + Send + 'static>;

// ---------------------------------------------------------------------------
// CheckOutcome
// ---------------------------------------------------------------------------

/// What a single check decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Nothing loadable in the store (logged out elsewhere, corrupt, or
    /// unreadable). Monitoring ends quietly.
    NoSession,
    /// The absolute expiry passed. Monitoring ends, `on_expire` runs.
    Expired,
    /// No interaction for longer than the idle timeout. Monitoring ends,
    /// `on_expire` runs.
    Idle,
    /// Recently active: the backend was pinged and the session extended.
    Extended {
        expires_at: DateTime<Utc>,
        ping_ok: bool,
    },
    /// Neither idle nor recently active. Nothing happened.
    Quiet,
}

impl CheckOutcome {
    /// Returns `true` if monitoring stops after this outcome.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NoSession | Self::Expired | Self::Idle)
    }

    /// Returns `true` if the user must be logged out.
    pub fn ends_session(&self) -> bool {
        matches!(self, Self::Expired | Self::Idle)
    }
}

// ---------------------------------------------------------------------------
// MonitorHandle
// ---------------------------------------------------------------------------

/// A running monitor.
///
/// Dropping the handle (or calling [`stop`](Self::stop)) cancels the task
/// and removes its interaction listener, so a monitor that is never
/// restarted leaves nothing behind.
#[derive(Debug)]
pub struct MonitorHandle {
    task: JoinHandle<()>,
    hub: InteractionHub,
    listener: ListenerId,
    activity: mpsc::UnboundedSender<InteractionKind>,
    outcome: watch::Receiver<Option<CheckOutcome>>,
}

impl MonitorHandle {
    /// Cancel the monitor. Same as dropping the handle.
    pub fn stop(self) {}

    /// Whether the task has ended (stopped or reached a terminal outcome).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Mark the user as active right now.
    pub fn record_activity(&self) {
        // A send error only means the task has already ended.
        let _ = self.activity.send(InteractionKind::PointerMove);
    }

    /// Outcome of the most recent check, if any check has run.
    pub fn last_outcome(&self) -> Option<CheckOutcome> {
        self.outcome.borrow().clone()
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.task.abort();
        self.hub.unregister(self.listener);
        debug!(listener = %self.listener, "session monitor stopped");
    }
}

// ---------------------------------------------------------------------------
// SessionMonitor
// ---------------------------------------------------------------------------

/// Enforces idle timeout and absolute expiry, and keeps an active user's
/// session alive.
///
/// One per application. Owns at most one running task at a time.
pub struct SessionMonitor<P: LivenessProbe> {
    store: SessionStore,
    probe: Arc<P>,
    hub: InteractionHub,
    config: MonitorConfig,
    running: Option<MonitorHandle>,
}

impl<P: LivenessProbe> SessionMonitor<P> {
    pub fn new(
        store: SessionStore,
        probe: P,
        hub: InteractionHub,
        config: MonitorConfig,
    ) -> Self {
        Self {
            store,
            probe: Arc::new(probe),
            hub,
            config: config.validated(),
            running: None,
        }
    }

    /// Start monitoring. Any previous run is stopped first.
    ///
    /// `on_expire` runs at most once, from the monitor task, when the
    /// session expires or the user goes idle.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn start<F>(&mut self, on_expire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.stop();

        let (listener, interactions) = self.hub.register(&InteractionKind::ALL);
        let (activity, direct) = mpsc::unbounded_channel();
        let (outcome_tx, outcome) = watch::channel(None);

        let now = Instant::now();
        let actor = MonitorActor {
            store: self.store.clone(),
            probe: Arc::clone(&self.probe),
            hub: self.hub.clone(),
            listener,
            config: self.config.clone(),
            last_activity: now,
            outcome: outcome_tx,
        };
        let first_check = now + self.config.check_interval();
        let task = tokio::spawn(actor.run(
            first_check,
            interactions,
            direct,
            Box::new(on_expire),
        ));

        info!(
            %listener,
            interval_secs = self.config.check_interval_secs,
            idle_timeout_secs = self.config.idle_timeout_secs,
            "session monitor started"
        );

        self.running = Some(MonitorHandle {
            task,
            hub: self.hub.clone(),
            listener,
            activity,
            outcome,
        });
    }

    /// Stop monitoring. Safe to call when not running.
    pub fn stop(&mut self) {
        if let Some(handle) = self.running.take() {
            handle.stop();
        }
    }

    /// Whether a monitor task is currently alive.
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Mark the user as active without going through the hub.
    pub fn record_activity(&self) {
        if let Some(handle) = &self.running {
            handle.record_activity();
        }
    }

    /// Outcome of the most recent check of the current (or last) run.
    pub fn last_outcome(&self) -> Option<CheckOutcome> {
        self.running.as_ref().and_then(MonitorHandle::last_outcome)
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}

impl<P: LivenessProbe> Drop for SessionMonitor<P> {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// MonitorActor (runs inside the task)
// ---------------------------------------------------------------------------

struct MonitorActor<P: LivenessProbe> {
    store: SessionStore,
    probe: Arc<P>,
    hub: InteractionHub,
    listener: ListenerId,
    config: MonitorConfig,
    last_activity: Instant,
    outcome: watch::Sender<Option<CheckOutcome>>,
}

impl<P: LivenessProbe> MonitorActor<P> {
    async fn run(
        mut self,
        first_check: Instant,
        mut interactions: mpsc::UnboundedReceiver<InteractionKind>,
        mut direct: mpsc::UnboundedReceiver<InteractionKind>,
        on_expire: ExpireCallback,
    ) {
        let mut ticker = time::interval_at(first_check, self.config.check_interval());
        // After a stall (laptop asleep), check once and carry on; never
        // replay a burst of missed checks.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                Some(kind) = interactions.recv() => self.touch(kind),
                Some(kind) = direct.recv() => self.touch(kind),
                _ = ticker.tick() => {
                    let outcome = self.check().await;
                    debug!(?outcome, "session check");
                    self.outcome.send_replace(Some(outcome.clone()));

                    if outcome.is_terminal() {
                        self.hub.unregister(self.listener);
                        if outcome.ends_session() {
                            info!(?outcome, "session ended by monitor");
                            on_expire();
                        } else {
                            debug!("no session left to monitor");
                        }
                        return;
                    }
                }
            }
        }
    }

    fn touch(&mut self, kind: InteractionKind) {
        trace!(%kind, "user activity");
        self.last_activity = Instant::now();
    }

    /// One check, in the fixed order: presence, expiry, idleness, then
    /// (only if all pass) keep-alive.
    async fn check(&mut self) -> CheckOutcome {
        let Some(session) = self.store.session_or_none() else {
            return CheckOutcome::NoSession;
        };

        if session.is_expired_at(self.store.now()) {
            return CheckOutcome::Expired;
        }

        let idle = self.last_activity.elapsed();
        if idle > self.config.idle_timeout() {
            return CheckOutcome::Idle;
        }

        if idle >= self.config.liveness_window() {
            return CheckOutcome::Quiet;
        }

        let ping_ok = match self.probe.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "liveness ping failed");
                false
            }
        };

        match self.store.extend() {
            Ok(Some(expires_at)) => CheckOutcome::Extended { expires_at, ping_ok },
            Ok(None) => CheckOutcome::NoSession,
            Err(e) => {
                error!(error = %e, "could not extend session");
                CheckOutcome::NoSession
            }
        }
    }
}
