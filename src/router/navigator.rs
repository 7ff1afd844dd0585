//! In-app navigation: resolve, guard, follow redirects, commit.

#[cfg(test)]
#[path = "navigator_test.rs"]
mod navigator_test;

use std::sync::Arc;

use tokio::sync::Mutex;

use super::guard::{self, GuardDecision, RolePolicy};
use super::routes::{ResolvedRoute, Route, RouteTable};
use crate::session::SessionStore;

/// Redirects followed before a navigation is abandoned.
pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("navigation to {path} exceeded {MAX_REDIRECTS} redirects")]
    RedirectLoop { path: String },
}

/// A completed navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    pub requested: Route,
    pub landed: ResolvedRoute,
}

impl Navigation {
    #[must_use]
    pub fn redirected(&self) -> bool {
        self.requested != self.landed.route
    }
}

pub struct Router {
    table: RouteTable,
    policy: RolePolicy,
    store: Arc<SessionStore>,
    current: Mutex<Option<Route>>,
}

impl Router {
    #[must_use]
    pub fn new(store: Arc<SessionStore>, policy: RolePolicy) -> Self {
        Self::with_table(RouteTable::standard(), store, policy)
    }

    #[must_use]
    pub fn with_table(table: RouteTable, store: Arc<SessionStore>, policy: RolePolicy) -> Self {
        Self { table, policy, store, current: Mutex::new(None) }
    }

    #[must_use]
    pub fn policy(&self) -> RolePolicy {
        self.policy
    }

    /// Route committed by the last successful navigation.
    pub async fn current(&self) -> Option<Route> {
        self.current.lock().await.clone()
    }

    /// Navigate to `path`, guarding the target and every redirect it produces.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::RedirectLoop`] when the guard keeps
    /// redirecting past [`MAX_REDIRECTS`]. The current route is unchanged.
    pub async fn push(&self, path: &str) -> Result<Navigation, NavigationError> {
        let requested = self.table.resolve(path);
        let mut target = requested.clone();

        for _ in 0..=MAX_REDIRECTS {
            match guard::before_each(&self.store, &target, self.policy).await {
                GuardDecision::Allow => {
                    *self.current.lock().await = Some(target.route.clone());
                    tracing::debug!(requested = %requested.route, landed = %target.route, "navigated");
                    return Ok(Navigation { requested: requested.route, landed: target });
                }
                GuardDecision::Redirect(next) => {
                    target = self.table.resolve_route(next);
                }
            }
        }

        tracing::warn!(path, "redirect loop");
        Err(NavigationError::RedirectLoop { path: requested.route.path().to_owned() })
    }
}
