//! Navigation route type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Route prefixes that are reachable without a session.
pub const PUBLIC_ROUTE_PREFIXES: [&str; 2] = ["/login", "/signup"];

/// The application's current navigation location, e.g. `/tenants/42`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route(String);

impl Route {
    /// Create a new route from a path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the route path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for unauthenticated views (login, signup).
    ///
    /// Matching is a case-insensitive prefix test.
    pub fn is_public(&self) -> bool {
        let path = self.0.as_bytes();
        PUBLIC_ROUTE_PREFIXES.iter().any(|prefix| {
            path.len() >= prefix.len()
                && path[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
        })
    }
}

impl Default for Route {
    fn default() -> Self {
        Self("/".to_string())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Route {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}
