//! Pre-navigation guard.
//!
//! [`decide`] is the pure decision table; [`before_each`] refreshes the
//! session from storage first and evaluates against that exact snapshot.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use super::routes::{ResolvedRoute, Route, landing_for};
use crate::session::{Session, SessionStore};

/// Whether `allowed_roles` on a route is enforced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RolePolicy {
    /// Declared roles are informational; any logged-in user may open any page.
    #[default]
    Ignore,
    /// A logged-in user whose role is not listed is sent to their landing page.
    Enforce,
}

impl RolePolicy {
    #[must_use]
    pub fn from_enforce(enforce: bool) -> Self {
        if enforce { Self::Enforce } else { Self::Ignore }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

/// Decide whether `target` may be entered with `session`.
#[must_use]
pub fn decide(target: &ResolvedRoute, session: &Session, policy: RolePolicy) -> GuardDecision {
    let logged_in = session.is_logged_in();

    if target.meta.guest_only && logged_in {
        return GuardDecision::Redirect(landing_for(session.role()));
    }
    if target.meta.requires_auth && !logged_in {
        return GuardDecision::Redirect(Route::Login);
    }
    if policy == RolePolicy::Enforce && logged_in && !target.meta.allows_role(session.role()) {
        let landing = landing_for(session.role());
        if landing != target.route {
            return GuardDecision::Redirect(landing);
        }
    }
    GuardDecision::Allow
}

/// Run before every navigation.
pub async fn before_each(store: &SessionStore, target: &ResolvedRoute, policy: RolePolicy) -> GuardDecision {
    let session = store.initialize().await;
    let decision = decide(target, &session, policy);
    if let GuardDecision::Redirect(to) = &decision {
        tracing::debug!(from = %target.route, %to, logged_in = session.is_logged_in(), "guard redirect");
    }
    decision
}
