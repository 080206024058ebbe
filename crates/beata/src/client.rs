//! `SessionClient`: the session store, navigation guard, and session
//! monitor wired together the way a client application uses them.

use std::fmt;
use std::sync::Arc;

use beata_access::{Decision, NavigationGuard, Redirect, Route, RouteTable};
use beata_liveness::{HttpProbe, LivenessProbe};
use beata_monitor::{CheckOutcome, InteractionHub, SessionMonitor};
use beata_session::{SessionStore, Storage, UserRecord, UserSession};
use tracing::{error, info, warn};

use crate::{BeataConfig, BeataError};

type SessionEndHook = Arc<dyn Fn() + Send + Sync + 'static>;

/// Builder for [`SessionClient`].
///
/// # Example
///
/// ```rust,ignore
/// use beata::prelude::*;
///
/// let client = SessionClient::builder(BeataConfig::default())
///     .routes(RouteTable::ims())
///     .on_session_end(|| println!("logged out, back to /login"))
///     .build_http(MemoryStorage::new())?;
/// ```
pub struct SessionClientBuilder {
    config: BeataConfig,
    routes: RouteTable,
    hub: InteractionHub,
    on_session_end: Option<SessionEndHook>,
}

impl SessionClientBuilder {
    pub fn new(config: BeataConfig) -> Self {
        Self {
            config,
            routes: RouteTable::ims(),
            hub: InteractionHub::new(),
            on_session_end: None,
        }
    }

    /// Replaces the route table (defaults to [`RouteTable::ims`]).
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Uses an existing interaction hub, e.g. one the UI layer already
    /// dispatches into.
    pub fn hub(mut self, hub: InteractionHub) -> Self {
        self.hub = hub;
        self
    }

    /// Called after the monitor has logged the user out for idleness or
    /// expiry. Typically navigates to the login page.
    pub fn on_session_end(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_end = Some(Arc::new(hook));
        self
    }

    /// Builds a client on `storage` and the system clock.
    pub fn build<P: LivenessProbe>(self, storage: impl Storage, probe: P) -> SessionClient<P> {
        let store = SessionStore::new(storage, self.config.session.clone());
        self.build_with_store(store, probe)
    }

    /// Builds a client around an already constructed store.
    ///
    /// The store's own session config wins over `config.session`.
    pub fn build_with_store<P: LivenessProbe>(
        self,
        store: SessionStore,
        probe: P,
    ) -> SessionClient<P> {
        let guard = NavigationGuard::new(store.clone(), self.routes, self.config.guard);
        let monitor = SessionMonitor::new(
            store.clone(),
            probe,
            self.hub.clone(),
            self.config.monitor,
        );
        SessionClient {
            store,
            guard,
            monitor,
            hub: self.hub,
            on_session_end: self.on_session_end,
        }
    }

    /// Builds a client that pings the backend over HTTP.
    pub fn build_http(
        self,
        storage: impl Storage,
    ) -> Result<SessionClient<HttpProbe>, BeataError> {
        let probe = HttpProbe::new(&self.config.probe)?;
        Ok(self.build(storage, probe))
    }
}

/// One user's session on one client.
///
/// `login` and `resume` start the background monitor, so they must be
/// called from within a Tokio runtime.
pub struct SessionClient<P: LivenessProbe> {
    store: SessionStore,
    guard: NavigationGuard,
    monitor: SessionMonitor<P>,
    hub: InteractionHub,
    on_session_end: Option<SessionEndHook>,
}

impl SessionClient<HttpProbe> {
    /// Starts building a client. The `build*` method picks the probe.
    pub fn builder(config: BeataConfig) -> SessionClientBuilder {
        SessionClientBuilder::new(config)
    }
}

impl<P: LivenessProbe> SessionClient<P> {
    /// Records a successful login response and starts monitoring.
    ///
    /// The record is stamped with a fresh expiry. If it is missing a user
    /// id, username, or recognised role, nothing stays stored and
    /// [`BeataError::IncompleteLogin`] is returned.
    pub fn login(&mut self, record: UserRecord) -> Result<UserSession, BeataError> {
        self.store.save(record)?;
        let Some(session) = self.store.load()? else {
            self.store.clear()?;
            warn!("login response rejected");
            return Err(BeataError::IncompleteLogin);
        };

        info!(user = %session.username, role = %session.role, "logged in");
        self.start_monitor();
        Ok(session)
    }

    /// Picks up a session left by a previous run of the application.
    ///
    /// An expired stored session is cleared. A live one gets a monitor.
    pub fn resume(&mut self) -> Result<Option<UserSession>, BeataError> {
        let Some(session) = self.store.load()? else {
            return Ok(None);
        };

        if session.is_expired_at(self.store.now()) {
            info!(user = %session.username, "stored session expired; clearing");
            self.store.clear()?;
            return Ok(None);
        }

        info!(user = %session.username, "session resumed");
        self.start_monitor();
        Ok(Some(session))
    }

    /// Stops monitoring, forgets the user, and returns where to go next.
    pub fn logout(&mut self) -> Result<Redirect, BeataError> {
        self.monitor.stop();
        self.store.clear()?;
        info!("logged out");
        Ok(Redirect::to(&self.guard.config().login_path))
    }

    /// Runs the navigation guard for a route change.
    pub fn navigate(&self, target: &Route, current: &Route) -> Decision {
        self.guard.guard(target, current)
    }

    pub fn current_user(&self) -> Option<UserSession> {
        self.store.session_or_none()
    }

    /// `Authorization` header for backend requests, when logged in with a
    /// token.
    pub fn authorization_header(&self) -> Option<String> {
        self.current_user()?.authorization_header()
    }

    pub fn record_activity(&self) {
        self.monitor.record_activity();
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitor.is_running()
    }

    pub fn last_check(&self) -> Option<CheckOutcome> {
        self.monitor.last_outcome()
    }

    /// The hub the UI layer dispatches interactions into.
    pub fn interactions(&self) -> &InteractionHub {
        &self.hub
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    fn start_monitor(&mut self) {
        let store = self.store.clone();
        let hook = self.on_session_end.clone();
        self.monitor.start(move || {
            if let Err(e) = store.clear() {
                error!(error = %e, "failed to clear session after monitor logout");
            }
            if let Some(hook) = hook {
                hook();
            }
        });
    }
}

impl<P: LivenessProbe> fmt::Debug for SessionClient<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClient")
            .field("store", &self.store)
            .field("guard", &self.guard)
            .field("monitoring", &self.is_monitoring())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beata_liveness::LivenessError;
    use beata_session::{MemoryStorage, Role};

    struct NoopProbe;

    impl LivenessProbe for NoopProbe {
        async fn ping(&self) -> Result<(), LivenessError> {
            Ok(())
        }
    }

    fn client() -> SessionClient<NoopProbe> {
        SessionClient::builder(BeataConfig::default()).build(MemoryStorage::new(), NoopProbe)
    }

    #[test]
    fn test_fresh_client_has_no_user() {
        let client = client();
        assert!(client.current_user().is_none());
        assert!(client.authorization_header().is_none());
        assert!(!client.is_monitoring());
    }

    #[tokio::test]
    async fn test_login_returns_session_and_starts_monitor() {
        let mut client = client();
        let session = client
            .login(UserRecord::new(3, "mika", Role::Admin).with_token("abc"))
            .unwrap();

        assert_eq!(session.username, "mika");
        assert!(client.is_monitoring());
        assert_eq!(client.authorization_header().as_deref(), Some("Bearer abc"));
        assert_eq!(client.interactions().listener_count(), 1);
    }

    #[tokio::test]
    async fn test_logout_clears_and_redirects_to_login() {
        let mut client = client();
        client.login(UserRecord::new(3, "mika", Role::Staff)).unwrap();

        let redirect = client.logout().unwrap();
        assert_eq!(redirect, Redirect::to("/login"));
        assert!(client.current_user().is_none());
        assert!(!client.is_monitoring());
        assert_eq!(client.interactions().listener_count(), 0);
    }
}
