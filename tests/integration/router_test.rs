//! Navigation guard against real session records

use pretty_assertions::assert_eq;

use inquiry_circle::client::router::{RouteConfigError, RouteTable, REDIRECT_PARAM};
use inquiry_circle::client::{Navigation, Route, SessionStorage, SessionStore};
use inquiry_circle::shared::{AppConfig, Role};

use crate::common::*;

fn store(file: &SessionFile) -> SessionStore {
    let api = inquiry_circle::client::ApiClient::new(&AppConfig::default()).unwrap();
    SessionStore::new(api, Box::new(file.storage()))
}

fn store_with(role: Role) -> (SessionFile, SessionStore) {
    let file = SessionFile::new();
    file.storage()
        .save(&stored_session("stored-key", role))
        .unwrap();
    let session = store(&file);
    (file, session)
}

#[test]
fn test_unauthenticated_redirects_to_login_with_target() {
    let file = SessionFile::new();
    let mut session = store(&file);
    let routes = RouteTable::default_routes();

    let location = crate::assert_redirects!(routes.guard("/circles/3", &mut session), "/login");
    assert_eq!(location.query_value(REDIRECT_PARAM), Some("/circles/3"));
    assert_eq!(location.to_url_string(), "/login?redirect=%2Fcircles%2F3");
}

#[test]
fn test_public_routes_need_no_session() {
    let file = SessionFile::new();
    let mut session = store(&file);
    let routes = RouteTable::default_routes();

    crate::assert_proceeds!(routes.guard("/login", &mut session), "login");
    crate::assert_proceeds!(routes.guard("/test-conference", &mut session), "test-conference");
}

#[test]
fn test_guard_restores_stored_session() {
    let (_file, mut session) = store_with(Role::Participant);
    let routes = RouteTable::default_routes();

    assert!(!session.is_authenticated());
    crate::assert_proceeds!(routes.guard("/", &mut session), "dashboard");
    assert!(session.is_authenticated());
    assert_eq!(session.role(), Some(Role::Participant));
}

#[test]
fn test_participant_is_kept_off_facilitator_pages() {
    let (_file, mut session) = store_with(Role::Participant);
    let routes = RouteTable::default_routes();

    let location = crate::assert_redirects!(routes.guard("/facilitator", &mut session), "/");
    assert!(location.query.is_empty());
}

#[test]
fn test_facilitator_reaches_facilitator_pages() {
    let (_file, mut session) = store_with(Role::Facilitator);
    let routes = RouteTable::default_routes();

    crate::assert_proceeds!(routes.guard("/facilitator", &mut session), "facilitator");
}

#[test]
fn test_authenticated_login_visit_goes_to_landing() {
    let (_file, mut session) = store_with(Role::Facilitator);
    let routes = RouteTable::default_routes();

    crate::assert_redirects!(routes.guard("/login", &mut session), "/");
}

#[test]
fn test_translation_route_carries_params() {
    let (_file, mut session) = store_with(Role::Participant);
    let routes = RouteTable::default_routes();

    match routes.guard("/circles/3/translation/12", &mut session) {
        Navigation::Proceed(route) => {
            assert_eq!(route.name, "translation");
            assert_eq!(route.params.get("id").map(String::as_str), Some("3"));
            assert_eq!(route.params.get("session_id").map(String::as_str), Some("12"));
        }
        other => panic!("Expected Proceed, got {:?}", other),
    }
}

#[test]
fn test_unknown_path_is_not_found() {
    let (_file, mut session) = store_with(Role::Facilitator);
    let routes = RouteTable::default_routes();

    assert_eq!(routes.guard("/nowhere", &mut session), Navigation::NotFound);
}

#[test]
fn test_redirect_loops_are_rejected_at_construction() {
    let result = RouteTable::new(
        vec![
            Route::new("login", "/login").requires_auth(),
            Route::new("home", "/").requires_auth(),
        ],
        "login",
        "home",
    );
    crate::assert_err!(result, RouteConfigError::LoginRequiresAuth(_));

    let result = RouteTable::new(
        vec![
            Route::new("login", "/login"),
            Route::new("home", "/")
                .requires_auth()
                .with_role(Role::Facilitator),
        ],
        "login",
        "home",
    );
    crate::assert_err!(result, RouteConfigError::LandingRequiresRole(_));
}
