//! Client session store: who is logged in, and with what role.
//!
//! SYSTEM CONTEXT
//! ==============
//! The store is constructed explicitly and shared (`Arc<SessionStore>`) with
//! everything that needs to know the current identity: the access gate, the
//! API client (bearer header) and the login/logout flows. It is the only
//! writer of the `token` / `role` storage keys.
//!
//! DESIGN
//! ======
//! A session is either anonymous or a complete `(token, role)` pair; the
//! half-authenticated states a pair of loose optionals would allow are not
//! representable. `is_authenticated` is derived from the token on every read.
//!
//! ERROR HANDLING
//! ==============
//! `login` persists before touching memory and rolls back partial writes, so a
//! failed login never leaves a session that would not survive a reload.
//! `logout` clears memory first: the user is logged out locally even when
//! storage cannot be cleared, and the storage failure is still reported.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{PoisonError, RwLock};

use crate::role::Role;
use crate::storage::{ROLE_KEY, Storage, StorageError, TOKEN_KEY, USERNAME_KEY};

#[derive(Clone, Debug, PartialEq, Eq)]
struct Identity {
    token: String,
    role: Role,
}

/// Point-in-time view of the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    identity: Option<Identity>,
}

impl Session {
    /// Session with no identity.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session holding `token` and `role`. The token is stored verbatim.
    #[must_use]
    pub fn authenticated(token: impl Into<String>, role: Role) -> Self {
        Self { identity: Some(Identity { token: token.into(), role }) }
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.identity.as_ref().map(|id| id.token.as_str())
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(|id| id.role)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

/// Owner of the current [`Session`], backed by durable [`Storage`].
pub struct SessionStore {
    storage: Box<dyn Storage>,
    state: RwLock<Session>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .field("role", &self.role())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Build a store, restoring any session previously persisted in `storage`.
    ///
    /// A persisted token without a valid role, or a persisted document that
    /// cannot be parsed, restores as anonymous.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be read.
    pub fn open(storage: impl Storage + 'static) -> Result<Self, StorageError> {
        let session = load_session(&storage)?;
        match session.role() {
            Some(role) => tracing::debug!(%role, "restored persisted session"),
            None => tracing::debug!("no persisted session"),
        }
        Ok(Self { storage: Box::new(storage), state: RwLock::new(session) })
    }

    /// Copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.read().unwrap_or_else(PoisonError::into_inner).is_authenticated()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).token().map(ToOwned::to_owned)
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).role()
    }

    /// Persist and adopt `token` + `role`. No validation of the token format.
    ///
    /// # Errors
    ///
    /// Returns an error if either key cannot be written; the in-memory session
    /// is left unchanged in that case.
    pub fn login(&self, token: impl Into<String>, role: Role) -> Result<(), StorageError> {
        let token = token.into();
        self.storage.set(TOKEN_KEY, &token)?;
        if let Err(e) = self.storage.set(ROLE_KEY, role.as_str()) {
            let _ = self.storage.remove(TOKEN_KEY);
            tracing::warn!(error = %e, "failed to persist role; login rolled back");
            return Err(e);
        }

        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Session::authenticated(token, role);
        tracing::info!(%role, "session established");
        Ok(())
    }

    /// Forget the current session. Calling it on an anonymous store is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted keys cannot be removed. The in-memory
    /// session is cleared regardless.
    pub fn logout(&self) -> Result<(), StorageError> {
        let was_authenticated = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let was = state.is_authenticated();
            *state = Session::anonymous();
            was
        };

        let token_result = self.storage.remove(TOKEN_KEY);
        let role_result = self.storage.remove(ROLE_KEY);
        if was_authenticated {
            tracing::info!("session cleared");
        }
        token_result.and(role_result)
    }

    /// Remember `username` for pre-filling the login form.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage write fails.
    pub fn remember_username(&self, username: &str) -> Result<(), StorageError> {
        self.storage.set(USERNAME_KEY, username)
    }

    /// Username saved by a previous "remember me" login, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage read fails.
    pub fn remembered_username(&self) -> Result<Option<String>, StorageError> {
        self.storage.get(USERNAME_KEY)
    }

    /// Drop the remembered username.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage removal fails.
    pub fn forget_username(&self) -> Result<(), StorageError> {
        self.storage.remove(USERNAME_KEY)
    }
}

fn load_session(storage: &dyn Storage) -> Result<Session, StorageError> {
    match read_session(storage) {
        Err(StorageError::Corrupt(e)) => {
            tracing::warn!(error = %e, "persisted session is unreadable; starting anonymous");
            Ok(Session::anonymous())
        }
        other => other,
    }
}

fn read_session(storage: &dyn Storage) -> Result<Session, StorageError> {
    let Some(token) = storage.get(TOKEN_KEY)? else {
        return Ok(Session::anonymous());
    };
    let Some(raw_role) = storage.get(ROLE_KEY)? else {
        tracing::warn!("persisted token has no role; starting anonymous");
        return Ok(Session::anonymous());
    };
    match raw_role.parse::<Role>() {
        Ok(role) => Ok(Session::authenticated(token, role)),
        Err(e) => {
            tracing::warn!(error = %e, "persisted role is invalid; starting anonymous");
            Ok(Session::anonymous())
        }
    }
}
