//! Route classification and the role policy.

use std::fmt;

use beata_session::Role;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RouteClass
// ---------------------------------------------------------------------------

/// Who may open a route.
///
/// Ordered from least to most restrictive:
///
/// - **Public**: no session needed (welcome page, login).
/// - **Restricted**: any logged-in role. Also the classification of every
///   path the table doesn't know.
/// - **AdminOnly**: role must be [`Role::Admin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteClass {
    Public,
    Restricted,
    AdminOnly,
}

impl RouteClass {
    /// Returns `true` if a session is needed to open the route.
    pub fn requires_session(&self) -> bool {
        !matches!(self, Self::Public)
    }
}

impl fmt::Display for RouteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Restricted => write!(f, "restricted"),
            Self::AdminOnly => write!(f, "admin-only"),
        }
    }
}

// ---------------------------------------------------------------------------
// RouteRule
// ---------------------------------------------------------------------------

/// One entry of the route table: a path pattern and its classification.
///
/// Patterns are `/`-separated. A segment starting with `:` matches any
/// single non-empty segment (`/viewdetails/:id` matches `/viewdetails/42`).
/// Literal segments compare ASCII case-insensitively, the way the router
/// resolves them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pattern: String,
    class: RouteClass,
}

impl RouteRule {
    pub fn new(pattern: impl Into<String>, class: RouteClass) -> Self {
        Self {
            pattern: pattern.into(),
            class,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn class(&self) -> RouteClass {
        self.class
    }

    /// Whether `path` (already normalized) is matched by this rule.
    fn matches(&self, path: &str) -> bool {
        let mut want = segments(&self.pattern);
        let mut have = segments(path);
        loop {
            match (want.next(), have.next()) {
                (None, None) => return true,
                (Some(w), Some(h)) => {
                    let ok = if w.starts_with(':') {
                        !h.is_empty()
                    } else {
                        w.eq_ignore_ascii_case(h)
                    };
                    if !ok {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }
}

/// Strips query, fragment and trailing slashes. `""` and `"/"` both
/// normalize to `"/"`.
fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// RouteTable
// ---------------------------------------------------------------------------

/// Total mapping from path to [`RouteClass`].
///
/// Rules are checked in order; the first match wins. A path no rule
/// matches is [`RouteClass::Restricted`], never public.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// The inventory-management route table.
    pub fn ims() -> Self {
        Self::builder()
            .public("/")
            .public("/login")
            .admin_only("/dashboard")
            .admin_only("/users")
            .restricted("/profile")
            .restricted("/homeims")
            .restricted("/products")
            .restricted("/viewinventory")
            .restricted("/viewdetails/:id")
            .restricted("/stocks")
            .restricted("/create")
            .restricted("/productsales")
            .restricted("/suppliers")
            .restricted("/vieworderdetails/:id")
            .restricted("/category")
            .restricted("/reportsims")
            .restricted("/reportsims/summary")
            .restricted("/reportsims/lowStock")
            .restricted("/reportsims/dailySales")
            .restricted("/createorder")
            .restricted("/ordershistory")
            .build()
    }

    /// Classify `path`. Query strings, fragments and trailing slashes are
    /// ignored.
    pub fn classify(&self, path: &str) -> RouteClass {
        let path = normalize(path);
        self.rules
            .iter()
            .find(|rule| rule.matches(path))
            .map(RouteRule::class)
            .unwrap_or(RouteClass::Restricted)
    }

    /// The role policy.
    ///
    /// - admin: every route
    /// - staff: every route except admin-only ones
    /// - no (or unrecognized) role: nothing
    pub fn is_allowed(&self, role: Option<Role>, path: &str) -> bool {
        match role {
            Some(Role::Admin) => true,
            Some(Role::Staff) => self.classify(path) != RouteClass::AdminOnly,
            None => false,
        }
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::ims()
    }
}

/// Builds a [`RouteTable`] rule by rule.
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    rules: Vec<RouteRule>,
}

impl RouteTableBuilder {
    pub fn rule(mut self, pattern: impl Into<String>, class: RouteClass) -> Self {
        self.rules.push(RouteRule::new(pattern, class));
        self
    }

    pub fn public(self, pattern: impl Into<String>) -> Self {
        self.rule(pattern, RouteClass::Public)
    }

    pub fn restricted(self, pattern: impl Into<String>) -> Self {
        self.rule(pattern, RouteClass::Restricted)
    }

    pub fn admin_only(self, pattern: impl Into<String>) -> Self {
        self.rule(pattern, RouteClass::AdminOnly)
    }

    pub fn build(self) -> RouteTable {
        RouteTable { rules: self.rules }
    }
}
