//! REST client for the platform backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! All endpoints live under one base path (default
//! `http://localhost:8080/api`). The session store is read at send time and,
//! when a token is present, every request carries `Authorization: Bearer`.
//! Login and registration are sent without credentials.
//!
//! ERROR HANDLING
//! ==============
//! Requests are fire-once: no retry, no backoff. Any non-2xx response becomes
//! [`ApiError::Status`]; callers in `actions` turn errors into generic notices.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, Url};

use super::types::{AuthGrant, ChatMessage, Credentials, Registration, ReviewSubmission, ReviewSummary};
use crate::config::ClientConfig;
use crate::session::SessionStore;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

const LOGIN_PATH: &str = "/users/login";
const REGISTER_PATH: &str = "/users/register";
const MESSAGE_PATH: &str = "/collaboration/message";
const UPLOAD_PATH: &str = "/collaboration/upload";
const REVIEW_SUBMIT_PATH: &str = "/reviews/submit";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response body: {0}")]
    InvalidResponse(String),
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// HTTP client bound to a base URL and a shared session store.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Client with reqwest's default timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse.
    pub fn new(base_url: &str, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        Self::with_http(reqwest::Client::new(), base_url, session)
    }

    /// Client configured from [`ClientConfig`] (base URL and timeouts).
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &ClientConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()?;
        Self::with_http(http, &config.api_base_url, session)
    }

    fn with_http(http: reqwest::Client, base_url: &str, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        Url::parse(&base_url).map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        Ok(Self { http, base_url, session })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// `POST /users/login`. The response must carry a non-empty token and a
    /// known role; anything else is [`ApiError::InvalidResponse`].
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or a malformed body.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, ApiError> {
        let req = self.http.post(endpoint_url(&self.base_url, LOGIN_PATH)).json(credentials);
        let resp = send(req, LOGIN_PATH).await?;
        let body = resp.text().await?;
        serde_json::from_str::<AuthGrant>(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// `POST /users/register`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let req = self.http.post(endpoint_url(&self.base_url, REGISTER_PATH)).json(registration);
        send(req, REGISTER_PATH).await?;
        Ok(())
    }

    /// `POST /collaboration/message`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn post_message(&self, message: &str) -> Result<(), ApiError> {
        let body = ChatMessage { message: message.to_owned() };
        let req = self.authorized(Method::POST, endpoint_url(&self.base_url, MESSAGE_PATH))?.json(&body);
        send(req, MESSAGE_PATH).await?;
        Ok(())
    }

    /// `POST /collaboration/upload` as `multipart/form-data` with one `file` part.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn upload_file(&self, file_name: &str, contents: Vec<u8>) -> Result<(), ApiError> {
        let part = reqwest::multipart::Part::bytes(contents).file_name(file_name.to_owned());
        let form = reqwest::multipart::Form::new().part("file", part);
        let req = self.authorized(Method::POST, endpoint_url(&self.base_url, UPLOAD_PATH))?.multipart(form);
        send(req, UPLOAD_PATH).await?;
        Ok(())
    }

    /// `GET /assignments/{id}/reviews`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or a malformed body.
    pub async fn fetch_reviews(&self, assignment_id: &str) -> Result<Vec<ReviewSummary>, ApiError> {
        let url = reviews_url(&self.base_url, assignment_id)?;
        let path = url.path().to_owned();
        let resp = send(self.authorized(Method::GET, url)?, &path).await?;
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// `POST /reviews/submit`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn submit_review(&self, submission: &ReviewSubmission) -> Result<(), ApiError> {
        let req = self.authorized(Method::POST, endpoint_url(&self.base_url, REVIEW_SUBMIT_PATH))?.json(submission);
        send(req, REVIEW_SUBMIT_PATH).await?;
        Ok(())
    }

    fn authorized<U: reqwest::IntoUrl>(&self, method: Method, url: U) -> Result<RequestBuilder, ApiError> {
        let req = self.http.request(method, url);
        match self.session.token() {
            Some(token) => Ok(req.header(AUTHORIZATION, bearer_value(&token)?)),
            None => Ok(req),
        }
    }
}

async fn send(req: RequestBuilder, path: &str) -> Result<Response, ApiError> {
    let resp = req.send().await?;
    let status = resp.status();
    if status.is_success() {
        tracing::debug!(path, status = status.as_u16(), "api request ok");
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!(path, status = status.as_u16(), "api request failed");
    Err(ApiError::Status { status: status.as_u16(), body })
}

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

fn reviews_url(base_url: &str, assignment_id: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(&endpoint_url(base_url, "/assignments"))
        .map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidBaseUrl(base_url.to_owned()))?
        .push(assignment_id)
        .push("reviews");
    Ok(url)
}

fn bearer_value(token: &str) -> Result<HeaderValue, ApiError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
    value.set_sensitive(true);
    Ok(value)
}
