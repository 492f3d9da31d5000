//! Route table and gated navigation.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every view of the platform is a [`Route`]. Public routes (login, register)
//! always render; protected routes are admitted by [`crate::gate`]. The
//! navigation bar contents depend only on the session snapshot.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use std::fmt;

use crate::gate::{self, Admission, Denial};
use crate::role::Role;
use crate::session::Session;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    AdminDashboard,
    StudentDashboard,
    Assignments,
    Profile,
    Collaboration,
    ReviewFeedback,
}

impl Route {
    pub const ALL: [Route; 8] = [
        Route::Login,
        Route::Register,
        Route::AdminDashboard,
        Route::StudentDashboard,
        Route::Assignments,
        Route::Profile,
        Route::Collaboration,
        Route::ReviewFeedback,
    ];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Register => "/register",
            Self::AdminDashboard => "/admin-dashboard",
            Self::StudentDashboard => "/student-dashboard",
            Self::Assignments => "/assignments",
            Self::Profile => "/profile",
            Self::Collaboration => "/collaboration",
            Self::ReviewFeedback => "/review-feedback",
        }
    }

    /// Look up a route by path. A query string, a fragment and a single
    /// trailing slash are ignored.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default().trim();
        let normalized = if path.len() > 1 { path.trim_end_matches('/') } else { path };
        Self::ALL.into_iter().find(|route| route.path() == normalized)
    }

    /// Role needed to render this route; `None` for public routes.
    #[must_use]
    pub fn required_role(self) -> Option<Role> {
        match self {
            Self::Login | Self::Register => None,
            Self::AdminDashboard => Some(Role::Admin),
            Self::StudentDashboard | Self::Assignments | Self::Profile | Self::Collaboration | Self::ReviewFeedback => {
                Some(Role::Student)
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Where a role lands right after logging in.
#[must_use]
pub fn landing(role: Role) -> Route {
    match role {
        Role::Admin => Route::AdminDashboard,
        Role::Student => Route::StudentDashboard,
    }
}

/// Outcome of navigating to a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect { to: Route, reason: Denial },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("no route for path {0:?}")]
    NotFound(String),
}

/// Resolve a known route against the session.
#[must_use]
pub fn resolve(route: Route, session: &Session) -> Navigation {
    let Some(required) = route.required_role() else {
        return Navigation::Render(route);
    };
    match gate::admit(required, session) {
        Admission::Allow => Navigation::Render(route),
        Admission::Redirect { to, reason } => {
            tracing::debug!(route = %route, ?reason, "navigation redirected");
            Navigation::Redirect { to, reason }
        }
    }
}

/// Resolve a raw path against the session.
///
/// # Errors
///
/// Returns [`RouteError::NotFound`] if `path` names no route.
pub fn navigate(path: &str, session: &Session) -> Result<Navigation, RouteError> {
    let route = Route::from_path(path).ok_or_else(|| RouteError::NotFound(path.to_owned()))?;
    Ok(resolve(route, session))
}

/// One entry of the navigation bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavItem {
    Link { label: &'static str, route: Route },
    Logout,
}

/// Navigation bar entries for the current session.
#[must_use]
pub fn nav_items(session: &Session) -> Vec<NavItem> {
    let link = |label: &'static str, route: Route| NavItem::Link { label, route };
    match session.role().filter(|_| session.is_authenticated()) {
        None => vec![link("Login", Route::Login), link("Register", Route::Register)],
        Some(Role::Admin) => vec![link("Dashboard", Route::AdminDashboard), NavItem::Logout],
        Some(Role::Student) => vec![
            link("Dashboard", Route::StudentDashboard),
            link("Collaboration", Route::Collaboration),
            link("Review", Route::ReviewFeedback),
            NavItem::Logout,
        ],
    }
}
