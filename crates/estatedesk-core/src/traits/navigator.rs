//! Navigation context trait.

use std::sync::RwLock;

use crate::types::Route;

/// Read access to the application's current navigation location.
pub trait Navigator: Send + Sync {
    /// Returns the route the user is currently on.
    fn current_route(&self) -> Route;

    /// Returns true when the user is on a login or signup view.
    fn current_route_is_public(&self) -> bool {
        self.current_route().is_public()
    }
}

/// A navigator whose route is set explicitly by the host application.
#[derive(Debug, Default)]
pub struct StaticNavigator {
    route: RwLock<Route>,
}

impl StaticNavigator {
    pub fn new(route: impl Into<Route>) -> Self {
        Self {
            route: RwLock::new(route.into()),
        }
    }

    /// Move to `route`.
    pub fn set_route(&self, route: impl Into<Route>) {
        // A poisoned lock still holds a valid Route.
        let mut guard = self.route.write().unwrap_or_else(|e| e.into_inner());
        *guard = route.into();
    }
}

impl Navigator for StaticNavigator {
    fn current_route(&self) -> Route {
        self.route
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
