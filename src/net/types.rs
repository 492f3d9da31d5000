//! Wire DTOs for the platform REST backend.
//!
//! DESIGN
//! ======
//! Field names follow the backend's JSON (`camelCase` for review payloads).
//! Responses are parsed into typed structs so a malformed body is rejected
//! before anything reaches the session store.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::role::Role;

/// Username + password pair submitted by the login form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

/// Successful login response: the token and role to store in the session.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthGrant {
    #[serde(deserialize_with = "deserialize_non_empty")]
    pub token: String,
    pub role: Role,
}

/// Account creation request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Collaboration chat message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub message: String,
}

/// Review feedback for one assignment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    pub assignment_id: String,
    pub review_id: String,
    pub feedback: String,
    /// Star rating, 1 through 5.
    pub rating: u8,
}

/// Review entry listed for an assignment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSummary {
    /// Review identifier. The backend may send it as a string or a number.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
}

fn deserialize_non_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    if value.is_empty() {
        return Err(D::Error::custom("expected non-empty string"));
    }
    Ok(value)
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected string or number id, got {other}"))),
    }
}
