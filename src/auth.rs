//! Login, registration and logout flows.
//!
//! SYSTEM CONTEXT
//! ==============
//! These flows are the only callers that mutate the session store. Credential
//! checks are delegated to an [`Authenticator`]: the REST backend
//! ([`ApiClient`]) in production, or [`MockAuthenticator`] when no backend is
//! available.
//!
//! ERROR HANDLING
//! ==============
//! Every failure carries the inline form message and the notice a view should
//! show. Backend detail is logged, never shown.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::fmt::Write;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use rand::Rng;

use crate::net::api::{ApiClient, ApiError};
use crate::net::types::{AuthGrant, Credentials, Registration};
use crate::notice::Notice;
use crate::role::Role;
use crate::routes::{Route, landing};
use crate::session::SessionStore;
use crate::storage::StorageError;

pub const MISSING_FIELDS_MESSAGE: &str = "Both fields are required.";
pub const INVALID_LOGIN_MESSAGE: &str = "Invalid username or password.";
pub const REGISTRATION_FAILED_MESSAGE: &str = "Registration failed. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("username {0:?} is already taken")]
    UsernameTaken(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Checks credentials and creates accounts.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Exchange credentials for a session grant.
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthGrant, AuthError>;

    /// Create an account.
    async fn register(&self, registration: &Registration) -> Result<(), AuthError>;
}

#[async_trait]
impl Authenticator for ApiClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthGrant, AuthError> {
        match self.login(credentials).await {
            Ok(grant) => Ok(grant),
            Err(ApiError::Status { status: 401 | 403, .. }) => Err(AuthError::InvalidCredentials),
            Err(e) => Err(e.into()),
        }
    }

    async fn register(&self, registration: &Registration) -> Result<(), AuthError> {
        ApiClient::register(self, registration).await.map_err(AuthError::from)
    }
}

// =============================================================================
// MOCK DIRECTORY
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
struct MockAccount {
    username: String,
    password: String,
    role: Role,
}

/// In-memory credential directory.
///
/// Seeded with `user` / `userpass` (STUDENT) and `admin` / `adminpass`
/// (ADMIN). Each successful login issues a fresh random token.
#[derive(Debug)]
pub struct MockAuthenticator {
    accounts: RwLock<Vec<MockAccount>>,
}

impl Default for MockAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAuthenticator {
    #[must_use]
    pub fn new() -> Self {
        Self::empty().with_account("user", "userpass", Role::Student).with_account("admin", "adminpass", Role::Admin)
    }

    /// Directory with no accounts.
    #[must_use]
    pub fn empty() -> Self {
        Self { accounts: RwLock::new(Vec::new()) }
    }

    #[must_use]
    pub fn with_account(self, username: &str, password: &str, role: Role) -> Self {
        self.accounts.write().unwrap_or_else(PoisonError::into_inner).push(MockAccount {
            username: username.to_owned(),
            password: password.to_owned(),
            role,
        });
        self
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthGrant, AuthError> {
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        accounts
            .iter()
            .find(|a| a.username == credentials.username && a.password == credentials.password)
            .map(|a| AuthGrant { token: generate_token(), role: a.role })
            .ok_or(AuthError::InvalidCredentials)
    }

    async fn register(&self, registration: &Registration) -> Result<(), AuthError> {
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        if accounts.iter().any(|a| a.username == registration.username) {
            return Err(AuthError::UsernameTaken(registration.username.clone()));
        }
        accounts.push(MockAccount {
            username: registration.username.clone(),
            password: registration.password.clone(),
            role: registration.role,
        });
        Ok(())
    }
}

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

// =============================================================================
// LOGIN
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub remember_me: bool,
}

impl LoginForm {
    /// Credentials to submit. The username is trimmed; the password is sent verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::MissingFields`] if either field is empty.
    pub fn credentials(&self) -> Result<Credentials, LoginError> {
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() {
            return Err(LoginError::MissingFields);
        }
        Ok(Credentials::new(username, self.password.clone()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("both fields are required")]
    MissingFields,
    #[error("login rejected: {0}")]
    Rejected(#[source] AuthError),
    #[error("failed to store session: {0}")]
    Storage(#[from] StorageError),
}

impl LoginError {
    /// Text shown inside the form.
    #[must_use]
    pub fn inline_message(&self) -> &'static str {
        match self {
            Self::MissingFields => MISSING_FIELDS_MESSAGE,
            Self::Rejected(_) | Self::Storage(_) => INVALID_LOGIN_MESSAGE,
        }
    }

    /// Toast for the failure; validation errors only show inline.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::MissingFields => None,
            Self::Rejected(_) => Some(Notice::error("Login failed. Please check your credentials.")),
            Self::Storage(_) => Some(Notice::error("Login failed. Session storage is unavailable.")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginOutcome {
    pub role: Role,
    pub landing: Route,
    pub notice: Notice,
}

/// Validate, authenticate, persist the session and pick the landing route.
///
/// A failure to remember the username is logged but does not fail the login.
///
/// # Errors
///
/// Returns [`LoginError`] on validation failure, rejected credentials or a
/// session store that cannot persist.
pub async fn submit_login<A>(store: &SessionStore, authenticator: &A, form: &LoginForm) -> Result<LoginOutcome, LoginError>
where
    A: Authenticator + ?Sized,
{
    let credentials = form.credentials()?;
    let grant = authenticator.authenticate(&credentials).await.map_err(|e| {
        tracing::warn!(error = %e, username = %credentials.username, "login rejected");
        LoginError::Rejected(e)
    })?;

    let role = grant.role;
    store.login(grant.token, role)?;
    if form.remember_me {
        if let Err(e) = store.remember_username(&credentials.username) {
            tracing::warn!(error = %e, "failed to remember username");
        }
    }

    Ok(LoginOutcome { role, landing: landing(role), notice: Notice::success("Login successful!") })
}

// =============================================================================
// REGISTRATION
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self { username: String::new(), password: String::new(), role: Role::Student }
    }
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns [`RegisterError::MissingFields`] if username or password is empty.
    pub fn registration(&self) -> Result<Registration, RegisterError> {
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() {
            return Err(RegisterError::MissingFields);
        }
        Ok(Registration { username: username.to_owned(), password: self.password.clone(), role: self.role })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("both fields are required")]
    MissingFields,
    #[error("registration rejected: {0}")]
    Rejected(#[source] AuthError),
}

impl RegisterError {
    #[must_use]
    pub fn inline_message(&self) -> &'static str {
        match self {
            Self::MissingFields => MISSING_FIELDS_MESSAGE,
            Self::Rejected(_) => REGISTRATION_FAILED_MESSAGE,
        }
    }

    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::MissingFields => None,
            Self::Rejected(_) => Some(Notice::error("Registration failed. Please check your details.")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterOutcome {
    pub next: Route,
    pub notice: Notice,
}

/// Create an account. The session is left untouched; the user logs in next.
///
/// # Errors
///
/// Returns [`RegisterError`] on validation failure or backend rejection.
pub async fn submit_registration<A>(authenticator: &A, form: &RegisterForm) -> Result<RegisterOutcome, RegisterError>
where
    A: Authenticator + ?Sized,
{
    let registration = form.registration()?;
    authenticator.register(&registration).await.map_err(|e| {
        tracing::warn!(error = %e, username = %registration.username, "registration rejected");
        RegisterError::Rejected(e)
    })?;
    tracing::info!(username = %registration.username, role = %registration.role, "account registered");

    Ok(RegisterOutcome { next: Route::Login, notice: Notice::success("Registration successful! Please login.") })
}

// =============================================================================
// LOGOUT
// =============================================================================

/// Log out and return the route to show next.
///
/// # Errors
///
/// Returns an error if the persisted session could not be cleared. The
/// in-memory session is cleared either way.
pub fn sign_out(store: &SessionStore) -> Result<Route, StorageError> {
    store.logout()?;
    Ok(Route::Login)
}
