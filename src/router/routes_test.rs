use super::*;

// =============================================================
// Route::parse
// =============================================================

#[test]
fn parse_known_paths() {
    assert_eq!(Route::parse("/login"), Route::Login);
    assert_eq!(Route::parse("/"), Route::Root);
    assert_eq!(Route::parse("/attendance"), Route::Attendance);
    assert_eq!(Route::parse("/search"), Route::Search);
    assert_eq!(Route::parse("/report"), Route::Report);
}

#[test]
fn parse_normalizes_path() {
    assert_eq!(Route::parse(" /Report/ "), Route::Report);
    assert_eq!(Route::parse("search?page=2"), Route::Search);
    assert_eq!(Route::parse("/login#top"), Route::Login);
    assert_eq!(Route::parse(""), Route::Root);
}

#[test]
fn parse_unknown_path_keeps_it() {
    assert_eq!(Route::parse("/settings/"), Route::NotFound("/settings".into()));
    assert_eq!(Route::NotFound("/settings".into()).path(), "/settings");
}

#[test]
fn path_round_trips() {
    for route in [Route::Login, Route::Root, Route::Attendance, Route::Search, Route::Report] {
        assert_eq!(Route::parse(route.path()), route);
    }
}

#[test]
fn landing_depends_on_role() {
    assert_eq!(landing_for(Some(Role::Admin)), Route::Report);
    assert_eq!(landing_for(Some(Role::Student)), Route::Attendance);
    assert_eq!(landing_for(None), Route::Attendance);
}

// =============================================================
// Meta
// =============================================================

#[test]
fn merged_meta_inherits_parent_flags() {
    let parent = RouteMeta::requires_auth();
    let child = RouteMeta::roles(&[Role::Student]);
    let merged = parent.merged_with(&child);
    assert!(merged.requires_auth);
    assert!(!merged.guest_only);
    assert_eq!(merged.allowed_roles, Some(vec![Role::Student]));
}

#[test]
fn allows_role_without_declaration() {
    assert!(RouteMeta::default().allows_role(None));
    assert!(RouteMeta::roles(&[Role::Admin]).allows_role(Some(Role::Admin)));
    assert!(!RouteMeta::roles(&[Role::Admin]).allows_role(Some(Role::Student)));
    assert!(!RouteMeta::roles(&[Role::Admin]).allows_role(None));
}

// =============================================================
// RouteTable
// =============================================================

#[test]
fn standard_table_login_is_guest_only() {
    let resolved = RouteTable::standard().resolve("/login");
    assert_eq!(resolved.meta, RouteMeta::guest_only());
}

#[test]
fn standard_table_children_require_auth() {
    let table = RouteTable::standard();
    for (path, role) in [("/attendance", Role::Student), ("/search", Role::Student), ("/report", Role::Admin)] {
        let resolved = table.resolve(path);
        assert!(resolved.meta.requires_auth, "{path} should require auth");
        assert_eq!(resolved.meta.allowed_roles, Some(vec![role]));
    }
}

#[test]
fn standard_table_root_requires_auth() {
    let resolved = RouteTable::standard().resolve("/");
    assert_eq!(resolved.route, Route::Root);
    assert_eq!(resolved.meta, RouteMeta::requires_auth());
}

#[test]
fn unknown_path_has_empty_meta() {
    let resolved = RouteTable::standard().resolve("/nowhere");
    assert_eq!(resolved.route, Route::NotFound("/nowhere".into()));
    assert_eq!(resolved.meta, RouteMeta::default());
}
