//! Application coordinator.
//!
//! DESIGN
//! ======
//! `App` owns storage, the raw HTTP transport, the session store and the
//! router. It is itself a [`Transport`]: every authenticated call goes
//! through it, and a 401 from any of them forces a logout and a navigation
//! to the login page before the error is handed back to the caller. The
//! store keeps using the raw transport, so a 401 on the login endpoint is
//! reported as rejected credentials rather than a lost session.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{ClientConfig, ConfigError};
use crate::net::api::{ApiError, StudentIdentity};
use crate::net::transport::{ApiRequest, HttpTransport, Transport, TransportError};
use crate::net::types::Credentials;
use crate::router::{Navigation, NavigationError, RolePolicy, Route, Router};
use crate::session::{AuthError, FileStorage, Session, SessionStore, Storage};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

pub struct App {
    http: Arc<dyn Transport>,
    store: Arc<SessionStore>,
    router: Router,
}

impl App {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, http: Arc<dyn Transport>, policy: RolePolicy) -> Self {
        let store = Arc::new(SessionStore::new(storage, http.clone()));
        let router = Router::new(store.clone(), policy);
        Self { http, store, router }
    }

    /// File-backed storage and an HTTP transport built from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, AppError> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(config.storage_path.clone()));
        let http = HttpTransport::new(&config.api_url, config.request_timeout, storage.clone())?;
        tracing::debug!(api_url = %config.api_url, storage = %config.storage_path.display(), "app configured");
        Ok(Self::new(storage, Arc::new(http), config.role_policy))
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    pub async fn session(&self) -> Session {
        self.store.session().await
    }

    /// Open `path` through the guard.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError`] on a redirect loop.
    pub async fn navigate(&self, path: &str) -> Result<Navigation, NavigationError> {
        self.router.push(path).await
    }

    /// Log in and move to the role's landing page.
    ///
    /// # Errors
    ///
    /// Returns the store's [`AuthError`] unchanged, or a navigation error.
    pub async fn login(&self, credentials: &Credentials) -> Result<Navigation, AppError> {
        let outcome = self.store.login(credentials).await?;
        Ok(self.router.push(outcome.redirect.path()).await?)
    }

    /// Log out and move to the login page.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError`] on a redirect loop.
    pub async fn logout(&self) -> Result<Navigation, NavigationError> {
        self.store.logout().await;
        self.router.push(Route::Login.path()).await
    }

    /// Student id and course of the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingProfile`] without a student profile.
    pub async fn student(&self) -> Result<StudentIdentity, ApiError> {
        let session = self.store.session().await;
        session.user().ok_or(ApiError::MissingProfile).and_then(StudentIdentity::from_user)
    }

    async fn expire_session(&self) {
        self.store.logout().await;
        if let Err(e) = self.router.push(Route::Login.path()).await {
            tracing::warn!(error = %e, "failed to return to login after session expiry");
        }
    }
}

#[async_trait]
impl Transport for App {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        match self.http.send(request).await {
            Err(e) if e.is_unauthenticated() => {
                tracing::warn!("session rejected by server; logging out");
                self.expire_session().await;
                Err(e)
            }
            other => other,
        }
    }
}
