//! Client configuration parsed from environment variables.

use std::path::PathBuf;

use crate::net::api::DEFAULT_API_BASE_URL;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("no config directory available; set PEER_REVIEW_SESSION_FILE")]
    NoSessionPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub mock_auth: bool,
    pub timeouts: HttpTimeouts,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `PEER_REVIEW_API_URL`: default `http://localhost:8080/api`
    /// - `PEER_REVIEW_SESSION_FILE`: default `<config dir>/peer-review/session.json`
    /// - `PEER_REVIEW_MOCK_AUTH`: `1/true/yes/on` or `0/false/no/off`, default off
    /// - `PEER_REVIEW_REQUEST_TIMEOUT_SECS`: default 30
    /// - `PEER_REVIEW_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error for an unrecognized boolean, or when no session path
    /// can be derived.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = std::env::var("PEER_REVIEW_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let session_file = match std::env::var("PEER_REVIEW_SESSION_FILE") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_session_file().ok_or(ConfigError::NoSessionPath)?,
        };

        let mock_auth = match std::env::var("PEER_REVIEW_MOCK_AUTH") {
            Ok(raw) => parse_bool(&raw)
                .ok_or(ConfigError::InvalidValue { var: "PEER_REVIEW_MOCK_AUTH", value: raw.clone() })?,
            Err(_) => false,
        };

        let timeouts = HttpTimeouts {
            request_secs: env_parse_u64("PEER_REVIEW_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("PEER_REVIEW_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_base_url, session_file, mock_auth, timeouts })
    }
}

/// `<config dir>/peer-review/session.json`, when the platform has a config dir.
#[must_use]
pub fn default_session_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("peer-review").join(SESSION_FILE_NAME))
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
