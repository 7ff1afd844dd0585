//! Static route table with per-page access descriptors.
//!
//! Nested records inherit their parent's meta, so the children of the root
//! layout all require authentication without declaring it themselves.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use std::fmt;

use crate::net::types::Role;

/// A navigable page.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    /// Root layout wrapping every authenticated page.
    Root,
    Attendance,
    Search,
    Report,
    /// Any path with no matching record.
    NotFound(String),
}

impl Route {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Login => "/login",
            Self::Root => "/",
            Self::Attendance => "/attendance",
            Self::Search => "/search",
            Self::Report => "/report",
            Self::NotFound(path) => path,
        }
    }

    /// Map a path to its route. Query and fragment are ignored, trailing
    /// slashes dropped, and matching is case-insensitive.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let normalized = normalize_path(path);
        match normalized.to_ascii_lowercase().as_str() {
            "/login" => Self::Login,
            "/" => Self::Root,
            "/attendance" => Self::Attendance,
            "/search" => Self::Search,
            "/report" => Self::Report,
            _ => Self::NotFound(normalized),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

fn normalize_path(raw: &str) -> String {
    let raw = raw.trim();
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let trimmed = raw[..end].trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

/// Landing page for a role: the report for admins, attendance otherwise.
#[must_use]
pub fn landing_for(role: Option<Role>) -> Route {
    match role {
        Some(Role::Admin) => Route::Report,
        _ => Route::Attendance,
    }
}

// =============================================================================
// META
// =============================================================================

/// Access requirements declared by a route record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteMeta {
    /// Page needs a logged-in session.
    pub requires_auth: bool,
    /// Page is only for visitors without a session.
    pub guest_only: bool,
    /// Roles the page is intended for.
    pub allowed_roles: Option<Vec<Role>>,
}

impl RouteMeta {
    #[must_use]
    pub fn requires_auth() -> Self {
        Self { requires_auth: true, ..Self::default() }
    }

    #[must_use]
    pub fn guest_only() -> Self {
        Self { guest_only: true, ..Self::default() }
    }

    #[must_use]
    pub fn roles(roles: &[Role]) -> Self {
        Self { allowed_roles: Some(roles.to_vec()), ..Self::default() }
    }

    /// Effective meta of `child` nested under `self`.
    #[must_use]
    pub fn merged_with(&self, child: &Self) -> Self {
        Self {
            requires_auth: self.requires_auth || child.requires_auth,
            guest_only: self.guest_only || child.guest_only,
            allowed_roles: child.allowed_roles.clone().or_else(|| self.allowed_roles.clone()),
        }
    }

    #[must_use]
    pub fn allows_role(&self, role: Option<Role>) -> bool {
        match &self.allowed_roles {
            None => true,
            Some(allowed) => role.is_some_and(|r| allowed.contains(&r)),
        }
    }
}

// =============================================================================
// TABLE
// =============================================================================

#[derive(Clone, Debug)]
pub struct RouteRecord {
    pub route: Route,
    pub meta: RouteMeta,
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    #[must_use]
    pub fn leaf(route: Route, meta: RouteMeta) -> Self {
        Self { route, meta, children: Vec::new() }
    }

    fn find(&self, route: &Route, inherited: &RouteMeta) -> Option<RouteMeta> {
        let meta = inherited.merged_with(&self.meta);
        if &self.route == route {
            return Some(meta);
        }
        self.children.iter().find_map(|child| child.find(route, &meta))
    }
}

/// A route together with its effective access descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub route: Route,
    pub meta: RouteMeta,
}

#[derive(Clone, Debug)]
pub struct RouteTable {
    records: Vec<RouteRecord>,
}

impl RouteTable {
    #[must_use]
    pub fn new(records: Vec<RouteRecord>) -> Self {
        Self { records }
    }

    /// The application's pages: login for guests, everything else under the
    /// authenticated root layout.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            RouteRecord::leaf(Route::Login, RouteMeta::guest_only()),
            RouteRecord {
                route: Route::Root,
                meta: RouteMeta::requires_auth(),
                children: vec![
                    RouteRecord::leaf(Route::Attendance, RouteMeta::roles(&[Role::Student])),
                    RouteRecord::leaf(Route::Search, RouteMeta::roles(&[Role::Student])),
                    RouteRecord::leaf(Route::Report, RouteMeta::roles(&[Role::Admin])),
                ],
            },
        ])
    }

    /// Resolve a path to its route and merged meta. Unknown paths get empty meta.
    #[must_use]
    pub fn resolve(&self, path: &str) -> ResolvedRoute {
        self.resolve_route(Route::parse(path))
    }

    #[must_use]
    pub fn resolve_route(&self, route: Route) -> ResolvedRoute {
        let root = RouteMeta::default();
        let meta = self
            .records
            .iter()
            .find_map(|record| record.find(&route, &root))
            .unwrap_or_default();
        ResolvedRoute { route, meta }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}
