//! Access gate for role-protected views.
//!
//! SYSTEM CONTEXT
//! ==============
//! Navigation consults the gate before rendering any protected route. The gate
//! is a pure function of `(required role, session snapshot)`: it holds no
//! state, never fails, and never mutates the session. A wrong-role session
//! stays logged in after a denied navigation.
//!
//! Both denial reasons redirect to the login entry point with no
//! distinguishing user message; the reason is kept for logging and tests.

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

use crate::role::Role;
use crate::routes::Route;
use crate::session::Session;

/// Why a protected view was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Denial {
    NotAuthenticated,
    RoleMismatch { required: Role, actual: Role },
}

/// Render decision for a protected view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    Allow,
    Redirect { to: Route, reason: Denial },
}

impl Admission {
    #[must_use]
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decide whether `session` may render a view requiring `required`.
#[must_use]
pub fn admit(required: Role, session: &Session) -> Admission {
    let Some(actual) = session.role().filter(|_| session.is_authenticated()) else {
        return Admission::Redirect { to: Route::Login, reason: Denial::NotAuthenticated };
    };

    match (required, actual) {
        (Role::Admin, Role::Admin) | (Role::Student, Role::Student) => Admission::Allow,
        (Role::Admin, Role::Student) | (Role::Student, Role::Admin) => {
            Admission::Redirect { to: Route::Login, reason: Denial::RoleMismatch { required, actual } }
        }
    }
}

/// Boolean form of [`admit`].
#[must_use]
pub fn can_access(required: Role, session: &Session) -> bool {
    admit(required, session).is_allowed()
}
