//! Route access control for the Beata front-ends.
//!
//! Two pieces, both free of side effects:
//!
//! - [`RouteTable`]: classifies every path as public, restricted, or
//!   admin-only, and answers "may this role open this path?"
//! - [`NavigationGuard`]: runs once per navigation attempt, reads the
//!   current session, and turns the answer into a [`Decision`]
//!
//! ```text
//! router ──(target, current)──→ NavigationGuard ──→ Proceed
//!                                   │    │          RedirectTo(login, redirect=target)
//!                        SessionStore    RouteTable  RedirectTo(role home)
//! ```

mod guard;
mod route;

pub use guard::{Decision, GuardConfig, NavigationGuard, Redirect, Route};
pub use route::{RouteClass, RouteRule, RouteTable, RouteTableBuilder};
