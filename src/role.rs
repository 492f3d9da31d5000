//! Platform roles.
//!
//! DESIGN
//! ======
//! Roles travel as upper-case strings (`"ADMIN"`, `"STUDENT"`) in durable
//! storage and on the wire. Inside the crate they are a closed enum so the
//! access gate can match exhaustively instead of comparing free-form strings.

#[cfg(test)]
#[path = "role_test.rs"]
mod role_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role attached to an authenticated session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Teacher / administrator.
    Admin,
    /// Student taking part in peer review.
    Student,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::Student];

    /// Wire and storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Student => "STUDENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored or received role string is not a known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0:?}")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "ADMIN" => Ok(Self::Admin),
            "STUDENT" => Ok(Self::Student),
            other => Err(RoleParseError(other.to_owned())),
        }
    }
}
