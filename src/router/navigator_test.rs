use super::*;
use crate::net::test_helpers::{MockTransport, admin_user, login_body, student_user};
use crate::net::types::{Credentials, Role};
use crate::router::routes::{RouteMeta, RouteRecord};
use crate::session::MemoryStorage;

fn credentials() -> Credentials {
    Credentials { username: "user".into(), password: "pw".into() }
}

fn router(policy: RolePolicy) -> (Router, Arc<SessionStore>, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::default());
    let store = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new()), transport.clone()));
    (Router::new(store.clone(), policy), store, transport)
}

#[tokio::test]
async fn first_navigation_without_session_lands_on_login() {
    let (router, _store, _transport) = router(RolePolicy::Ignore);
    assert_eq!(router.current().await, None);

    let nav = router.push("/report").await.unwrap();
    assert_eq!(nav.requested, Route::Report);
    assert_eq!(nav.landed.route, Route::Login);
    assert!(nav.redirected());
    assert_eq!(router.current().await, Some(Route::Login));
}

#[tokio::test]
async fn root_without_session_lands_on_login() {
    let (router, _store, _transport) = router(RolePolicy::Ignore);
    let nav = router.push("/").await.unwrap();
    assert_eq!(nav.landed.route, Route::Login);
}

#[tokio::test]
async fn logged_in_admin_opening_login_lands_on_report() {
    let (router, store, transport) = router(RolePolicy::Ignore);
    transport.push(Ok(login_body("tok", &admin_user())));
    store.login(&credentials()).await.unwrap();

    let nav = router.push("/login").await.unwrap();
    assert_eq!(nav.landed.route, Route::Report);
    assert_eq!(router.current().await, Some(Route::Report));
}

#[tokio::test]
async fn logged_in_student_reaches_report_under_default_policy() {
    let (router, store, transport) = router(RolePolicy::Ignore);
    transport.push(Ok(login_body("tok", &student_user())));
    store.login(&credentials()).await.unwrap();

    let nav = router.push("/report").await.unwrap();
    assert!(!nav.redirected());
    assert_eq!(nav.landed.meta.allowed_roles, Some(vec![Role::Admin]));
}

#[tokio::test]
async fn enforced_policy_sends_student_home() {
    let (router, store, transport) = router(RolePolicy::Enforce);
    transport.push(Ok(login_body("tok", &student_user())));
    store.login(&credentials()).await.unwrap();

    let nav = router.push("/report").await.unwrap();
    assert_eq!(nav.landed.route, Route::Attendance);
}

#[tokio::test]
async fn unknown_path_is_committed_as_not_found() {
    let (router, _store, _transport) = router(RolePolicy::Ignore);
    let nav = router.push("/nope").await.unwrap();
    assert_eq!(nav.landed.route, Route::NotFound("/nope".into()));
    assert!(!nav.redirected());
}

#[tokio::test]
async fn redirect_loop_is_reported() {
    // Login demands auth and is guest-only at once: a logged-out visit bounces forever.
    let table = RouteTable::new(vec![RouteRecord::leaf(
        Route::Login,
        RouteMeta { requires_auth: true, guest_only: true, allowed_roles: None },
    )]);
    let store = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new()), Arc::new(MockTransport::default())));
    let router = Router::with_table(table, store, RolePolicy::Ignore);

    let err = router.push("/login").await.unwrap_err();
    assert!(matches!(err, NavigationError::RedirectLoop { ref path } if path == "/login"));
    assert_eq!(router.current().await, None);
}
