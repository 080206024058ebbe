//! The navigation guard: one decision per route change.
//!
//! ```text
//!   target public? ──yes──→ Proceed
//!        │ no
//!   session loaded? ──no──→ RedirectTo(login, redirect = target)
//!        │ yes
//!   role allowed? ──no──→ RedirectTo(admin home | staff home)
//!        │ yes
//!     Proceed
//! ```
//!
//! The guard only ever *reads* the session store.

use std::collections::BTreeMap;

use beata_session::{Role, SessionStore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{RouteClass, RouteTable};

/// A location in the application: a path plus query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub query: BTreeMap<String, String>,
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: BTreeMap::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}

impl From<&str> for Route {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Where to send the user instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub path: String,
    pub query: BTreeMap<String, String>,
}

impl Redirect {
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: BTreeMap::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// The redirect as a route the router can navigate to.
    pub fn into_route(self) -> Route {
        Route {
            path: self.path,
            query: self.query,
        }
    }
}

/// Outcome of a single guard run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    RedirectTo(Redirect),
}

impl Decision {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }
}

/// Paths the guard redirects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub login_path: String,
    /// Landing page for admins who open something they can't see.
    pub admin_home: String,
    /// Landing page for staff who open something they can't see.
    pub staff_home: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            admin_home: "/dashboard".to_string(),
            staff_home: "/homeims".to_string(),
        }
    }
}

impl GuardConfig {
    fn home_for(&self, role: Role) -> &str {
        match role {
            Role::Admin => &self.admin_home,
            Role::Staff => &self.staff_home,
        }
    }
}

/// Decides every navigation attempt.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    store: SessionStore,
    routes: RouteTable,
    config: GuardConfig,
}

impl NavigationGuard {
    pub fn new(store: SessionStore, routes: RouteTable, config: GuardConfig) -> Self {
        Self {
            store,
            routes,
            config,
        }
    }

    /// Decide whether navigating from `current` to `target` may proceed.
    ///
    /// A session that can't be read (storage failure, corrupt record) is
    /// the same as no session: the user is sent to the login page.
    pub fn guard(&self, target: &Route, current: &Route) -> Decision {
        let class = self.routes.classify(&target.path);
        if class == RouteClass::Public {
            debug!(to = %target.path, from = %current.path, "public route");
            return Decision::Proceed;
        }

        let Some(session) = self.store.session_or_none() else {
            debug!(to = %target.path, from = %current.path, "no session; redirecting to login");
            return Decision::RedirectTo(
                Redirect::to(&self.config.login_path).with_query("redirect", &target.path),
            );
        };

        if !self.routes.is_allowed(Some(session.role), &target.path) {
            let home = self.config.home_for(session.role);
            debug!(
                to = %target.path,
                role = %session.role,
                %class,
                home,
                "route not permitted for role"
            );
            return Decision::RedirectTo(Redirect::to(home));
        }

        Decision::Proceed
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }
}
