//! Page routing: the route table, the pre-navigation guard, and the router
//! that ties them to the session store.

pub mod guard;
pub mod navigator;
pub mod routes;

pub use guard::{GuardDecision, RolePolicy};
pub use navigator::{Navigation, NavigationError, Router};
pub use routes::{ResolvedRoute, Route, RouteMeta, RouteTable, landing_for};
