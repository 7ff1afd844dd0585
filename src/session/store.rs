//! Session store: the current token + user, mirrored to durable storage.
//!
//! DESIGN
//! ======
//! The store is the only writer of session state, in memory and in storage.
//! Token and user are written together, cleared together and restored
//! together, so a [`Session`] is either fully present or treated as absent.
//! Every mutation runs under one write lock, so readers never see a
//! half-applied login or logout.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::Arc;

use tokio::sync::RwLock;

use super::storage::{Storage, StorageError, StorageOp, TOKEN_KEY, USER_KEY};
use crate::net::api::LOGIN_PATH;
use crate::net::transport::{ApiRequest, Transport, TransportError};
use crate::net::types::{Credentials, LoginResponse, Role, User};
use crate::router::routes::{Route, landing_for};

/// Shown when login fails without a usable server message.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed, please check your network connection";

// =============================================================================
// SESSION
// =============================================================================

/// Snapshot of the authenticated session. An empty token means "absent".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    token: String,
    user: Option<User>,
}

impl Session {
    /// Build a session, collapsing a half-present pair to the empty session.
    #[must_use]
    pub fn from_parts(token: String, user: Option<User>) -> Self {
        match user {
            Some(user) if !token.is_empty() => Self { token, user: Some(user) },
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        !self.token.is_empty() && self.user.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }
}

/// Read token + user from storage. Absent or malformed data is no session.
fn load_session(storage: &dyn Storage) -> Session {
    let token = storage.get_item(TOKEN_KEY).unwrap_or_default();
    let user = storage.get_item(USER_KEY).and_then(|raw| match serde_json::from_str::<Option<User>>(&raw) {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "stored user record malformed; ignoring");
            None
        }
    });

    if token.is_empty() != user.is_none() {
        tracing::warn!("stored session incomplete; treating as logged out");
    }
    Session::from_parts(token, user)
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The login endpoint answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The login request never got a response.
    #[error("{}", LOGIN_FAILED_MESSAGE)]
    Unreachable(#[source] TransportError),

    /// A success status whose body lacked a usable token or user.
    #[error("{}", LOGIN_FAILED_MESSAGE)]
    BadResponse(String),

    /// The session could not be persisted.
    #[error("{}", LOGIN_FAILED_MESSAGE)]
    Storage(#[from] StorageError),
}

impl From<TransportError> for AuthError {
    fn from(error: TransportError) -> Self {
        match error.status() {
            Some(status) => Self::Rejected {
                status,
                message: error.server_message().unwrap_or(LOGIN_FAILED_MESSAGE).to_owned(),
            },
            None => Self::Unreachable(error),
        }
    }
}

/// Result of a successful login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginOutcome {
    pub success: bool,
    /// Landing page for the user's role.
    pub redirect: Route,
}

// =============================================================================
// STORE
// =============================================================================

pub struct SessionStore {
    storage: Arc<dyn Storage>,
    transport: Arc<dyn Transport>,
    state: RwLock<Session>,
}

impl SessionStore {
    /// Create a store seeded from whatever `storage` currently holds.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, transport: Arc<dyn Transport>) -> Self {
        let state = RwLock::new(load_session(storage.as_ref()));
        Self { storage, transport, state }
    }

    /// Reload the session from storage and return the snapshot that was loaded.
    ///
    /// Idempotent and infallible. The returned snapshot is exactly what later
    /// readers will see until the next mutation.
    pub async fn initialize(&self) -> Session {
        let mut state = self.state.write().await;
        *state = load_session(self.storage.as_ref());
        state.clone()
    }

    /// Current snapshot.
    pub async fn session(&self) -> Session {
        self.state.read().await.clone()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.state.read().await.is_logged_in()
    }

    pub async fn is_admin(&self) -> bool {
        self.state.read().await.is_admin()
    }

    /// Log in with `credentials` against `POST /auth/login`.
    ///
    /// On success the token and user are persisted, then published in memory.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] whose message prefers the server's own
    /// message. Session state is left untouched on every error path.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, AuthError> {
        let body = serde_json::json!({
            "username": credentials.username,
            "password": credentials.password,
        });

        let response = match self.transport.send(ApiRequest::post(LOGIN_PATH, body)).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(username = %credentials.username, error = %e, "login request failed");
                return Err(e.into());
            }
        };

        let LoginResponse { token, user } =
            serde_json::from_value(response).map_err(|e| AuthError::BadResponse(e.to_string()))?;
        if token.is_empty() {
            return Err(AuthError::BadResponse("empty token".to_owned()));
        }

        let encoded_user = serde_json::to_string(&user).map_err(StorageError::from)?;
        let role = user.role;

        let mut state = self.state.write().await;
        self.storage
            .apply(&[StorageOp::set(TOKEN_KEY, token.clone()), StorageOp::set(USER_KEY, encoded_user)])?;
        *state = Session { token, user: Some(user) };
        drop(state);

        tracing::info!(username = %credentials.username, %role, "login succeeded");
        Ok(LoginOutcome { success: true, redirect: landing_for(Some(role)) })
    }

    /// Clear the session in memory and in storage. Always succeeds.
    pub async fn logout(&self) {
        let mut state = self.state.write().await;
        *state = Session::default();
        if let Err(e) = self.storage.apply(&[StorageOp::remove(TOKEN_KEY), StorageOp::remove(USER_KEY)]) {
            tracing::warn!(error = %e, "failed to clear stored session");
        }
        drop(state);
        tracing::info!("logged out");
    }
}
