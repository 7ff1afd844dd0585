use super::*;
use crate::net::test_helpers::{MockTransport, admin_user, login_body, student_user};
use crate::session::storage::MemoryStorage;
use serde_json::json;

fn credentials() -> Credentials {
    Credentials { username: "20250001".into(), password: "secret".into() }
}

fn store_with(responses: Vec<Result<serde_json::Value, TransportError>>) -> (SessionStore, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let transport = Arc::new(MockTransport::new(responses));
    (SessionStore::new(storage.clone(), transport), storage)
}

// =============================================================
// Session invariant
// =============================================================

#[test]
fn session_requires_both_token_and_user() {
    assert!(!Session::default().is_logged_in());
    assert!(!Session::from_parts("tok".into(), None).is_logged_in());
    assert!(!Session::from_parts(String::new(), Some(student_user())).is_logged_in());
    assert!(Session::from_parts("tok".into(), Some(student_user())).is_logged_in());
}

#[test]
fn half_present_session_collapses_to_empty() {
    let session = Session::from_parts(String::new(), Some(student_user()));
    assert!(session.user().is_none());
    let session = Session::from_parts("tok".into(), None);
    assert_eq!(session.token(), "");
}

#[test]
fn is_admin_follows_role() {
    assert!(Session::from_parts("t".into(), Some(admin_user())).is_admin());
    assert!(!Session::from_parts("t".into(), Some(student_user())).is_admin());
    assert!(!Session::default().is_admin());
}

// =============================================================
// initialize
// =============================================================

#[tokio::test]
async fn initialize_with_empty_storage_is_logged_out() {
    let (store, _storage) = store_with(vec![]);
    let session = store.initialize().await;
    assert!(!session.is_logged_in());
    assert!(!store.is_logged_in().await);
}

#[tokio::test]
async fn initialize_treats_malformed_user_as_absent() {
    let (store, storage) = store_with(vec![]);
    storage
        .apply(&[StorageOp::set(TOKEN_KEY, "tok"), StorageOp::set(USER_KEY, "{ broken")])
        .unwrap();

    let session = store.initialize().await;
    assert!(!session.is_logged_in());
    assert!(session.user().is_none());
}

#[tokio::test]
async fn initialize_picks_up_storage_written_elsewhere() {
    let (store, storage) = store_with(vec![]);
    let user = serde_json::to_string(&admin_user()).unwrap();
    storage.apply(&[StorageOp::set(TOKEN_KEY, "tok"), StorageOp::set(USER_KEY, user)]).unwrap();

    assert!(!store.is_logged_in().await);
    let session = store.initialize().await;
    assert!(session.is_admin());
    assert_eq!(store.session().await, session);
}

#[tokio::test]
async fn initialize_is_idempotent() {
    let (store, _storage) = store_with(vec![Ok(login_body("tok", &student_user()))]);
    store.login(&credentials()).await.unwrap();

    let first = store.initialize().await;
    let second = store.initialize().await;
    assert_eq!(first, second);
    assert!(second.is_logged_in());
}

#[tokio::test]
async fn new_store_restores_previous_login() {
    let (store, storage) = store_with(vec![Ok(login_body("tok-1", &student_user()))]);
    store.login(&credentials()).await.unwrap();

    let restarted = SessionStore::new(storage, Arc::new(MockTransport::default()));
    let session = restarted.initialize().await;
    assert_eq!(session.token(), "tok-1");
    assert_eq!(session.user(), Some(&student_user()));
}

// =============================================================
// login
// =============================================================

#[tokio::test]
async fn login_student_redirects_to_attendance() {
    let (store, storage) = store_with(vec![Ok(login_body("tok", &student_user()))]);

    let outcome = store.login(&credentials()).await.unwrap();
    assert_eq!(outcome, LoginOutcome { success: true, redirect: Route::Attendance });
    assert!(store.is_logged_in().await);
    assert!(!store.is_admin().await);
    assert_eq!(storage.get_item(TOKEN_KEY).as_deref(), Some("tok"));
    let stored: User = serde_json::from_str(&storage.get_item(USER_KEY).unwrap()).unwrap();
    assert_eq!(stored, student_user());
}

#[tokio::test]
async fn login_admin_redirects_to_report() {
    let (store, _storage) = store_with(vec![Ok(login_body("tok", &admin_user()))]);
    let outcome = store.login(&credentials()).await.unwrap();
    assert_eq!(outcome.redirect, Route::Report);
    assert!(store.is_admin().await);
}

#[tokio::test]
async fn login_posts_credentials() {
    let storage = Arc::new(MemoryStorage::new());
    let transport = Arc::new(MockTransport::new(vec![Ok(login_body("tok", &student_user()))]));
    let store = SessionStore::new(storage, transport.clone());

    store.login(&credentials()).await.unwrap();

    let request = transport.last_request();
    assert_eq!(request.path, LOGIN_PATH);
    assert_eq!(request.body, Some(json!({ "username": "20250001", "password": "secret" })));
}

#[tokio::test]
async fn login_failure_uses_server_message() {
    let (store, _storage) = store_with(vec![Err(TransportError::Status {
        status: 400,
        body: json!({ "message": "bad credentials" }),
    })]);

    let err = store.login(&credentials()).await.unwrap_err();
    assert_eq!(err.to_string(), "bad credentials");
    assert!(!store.is_logged_in().await);
}

#[tokio::test]
async fn login_401_uses_error_field_and_keeps_state() {
    let (store, storage) = store_with(vec![Err(TransportError::Unauthenticated {
        body: json!({ "error": "Invalid username or password" }),
    })]);

    let err = store.login(&credentials()).await.unwrap_err();
    assert!(matches!(err, AuthError::Rejected { status: 401, .. }));
    assert_eq!(err.to_string(), "Invalid username or password");
    assert!(storage.is_empty());
}

#[tokio::test]
async fn login_failure_without_message_uses_fallback() {
    let (store, _storage) = store_with(vec![Err(TransportError::Status { status: 500, body: json!({}) })]);
    let err = store.login(&credentials()).await.unwrap_err();
    assert_eq!(err.to_string(), LOGIN_FAILED_MESSAGE);
}

#[tokio::test]
async fn login_network_failure_uses_fallback() {
    let (store, _storage) = store_with(vec![Err(TransportError::Network("connection refused".into()))]);
    let err = store.login(&credentials()).await.unwrap_err();
    assert!(matches!(err, AuthError::Unreachable(_)));
    assert_eq!(err.to_string(), LOGIN_FAILED_MESSAGE);
}

#[tokio::test]
async fn login_with_incomplete_body_fails_without_mutation() {
    let (store, storage) = store_with(vec![Ok(json!({ "success": true, "token": "tok" }))]);
    let err = store.login(&credentials()).await.unwrap_err();
    assert!(matches!(err, AuthError::BadResponse(_)));
    assert!(!store.is_logged_in().await);
    assert!(storage.is_empty());
}

#[tokio::test]
async fn login_with_empty_token_fails() {
    let (store, _storage) = store_with(vec![Ok(login_body("", &student_user()))]);
    assert!(matches!(store.login(&credentials()).await, Err(AuthError::BadResponse(_))));
}

#[tokio::test]
async fn failed_relogin_keeps_existing_session() {
    let (store, _storage) = store_with(vec![
        Ok(login_body("tok", &student_user())),
        Err(TransportError::Status { status: 400, body: json!({ "message": "bad credentials" }) }),
    ]);
    store.login(&credentials()).await.unwrap();
    let before = store.session().await;

    assert!(store.login(&credentials()).await.is_err());
    assert_eq!(store.session().await, before);
}

// =============================================================
// logout
// =============================================================

#[tokio::test]
async fn logout_clears_memory_and_storage() {
    let (store, storage) = store_with(vec![Ok(login_body("tok", &admin_user()))]);
    store.login(&credentials()).await.unwrap();
    storage.apply(&[StorageOp::set("theme", "dark")]).unwrap();

    store.logout().await;

    assert!(!store.is_logged_in().await);
    assert_eq!(storage.get_item(TOKEN_KEY), None);
    assert_eq!(storage.get_item(USER_KEY), None);
    assert_eq!(storage.get_item("theme").as_deref(), Some("dark"));
    assert!(!store.initialize().await.is_logged_in());
}

#[tokio::test]
async fn logout_without_session_is_harmless() {
    let (store, storage) = store_with(vec![]);
    store.logout().await;
    store.logout().await;
    assert!(!store.is_logged_in().await);
    assert!(storage.is_empty());
}
