//! Session store integration tests
//!
//! Login, logout, restore and re-verification against a mock backend with
//! the record kept in a real file.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use inquiry_circle::client::{FileSessionStorage, SessionStorage, SessionStore};
use inquiry_circle::shared::Role;

use crate::common::*;

fn store(server: &MockServer, file: &SessionFile) -> SessionStore {
    SessionStore::new(api_for(server), Box::new(file.storage()))
}

#[tokio::test]
async fn test_login_persists_and_attaches_key() {
    let server = MockServer::start().await;
    mount_verify(&server).await;
    let file = SessionFile::new();
    let mut session = store(&server, &file);

    assert!(session.login(FACILITATOR_KEY).await);
    assert!(session.is_authenticated());
    assert!(session.is_facilitator());
    assert_eq!(session.key_id(), Some(11));
    assert_eq!(session.circle().map(|c| c.id), Some(3));
    assert!(session.error().is_none());
    assert!(!session.is_loading());
    assert_eq!(session.api().access_key().as_deref(), Some(FACILITATOR_KEY));

    let stored = file.storage().load().unwrap().expect("record written");
    assert_eq!(stored.access_key, FACILITATOR_KEY);
    assert_eq!(stored.role, Role::Facilitator);
}

#[tokio::test]
async fn test_login_then_logout_clears_memory_and_file() {
    let server = MockServer::start().await;
    mount_verify(&server).await;
    let file = SessionFile::new();
    let mut session = store(&server, &file);

    assert!(session.login(PARTICIPANT_KEY).await);
    assert!(file.exists());

    session.logout();
    assert!(!session.is_authenticated());
    assert!(session.role().is_none());
    assert!(session.api().access_key().is_none());
    assert!(!file.exists());

    // Second logout is a no-op
    session.logout();
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_restore_reproduces_session_in_new_store() {
    let server = MockServer::start().await;
    mount_verify(&server).await;
    let file = SessionFile::new();

    let mut first = store(&server, &file);
    assert!(first.login(PARTICIPANT_KEY).await);
    let expected = first.session().cloned();

    let mut second = store(&server, &file);
    assert!(second.restore_session());
    assert_eq!(second.session().cloned(), expected);
    assert_eq!(second.api().access_key().as_deref(), Some(PARTICIPANT_KEY));

    // Restore never contacts the backend
    let verify_calls = server.received_requests().await.unwrap_or_default().len();
    assert_eq!(verify_calls, 1);
}

#[tokio::test]
async fn test_failed_login_leaves_state_untouched() {
    let server = MockServer::start().await;
    mount_verify(&server).await;
    let file = SessionFile::new();
    let mut session = store(&server, &file);

    assert!(session.login(FACILITATOR_KEY).await);
    let before = session.session().cloned();

    assert!(!session.login(INVALID_KEY).await);
    assert_eq!(session.error(), Some("Invalid key"));
    assert_eq!(session.session().cloned(), before);
    assert_eq!(session.api().access_key().as_deref(), Some(FACILITATOR_KEY));

    let stored = file.storage().load().unwrap().unwrap();
    assert_eq!(stored.access_key, FACILITATOR_KEY);
}

#[tokio::test]
async fn test_valid_answer_without_role_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify-key/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": true})))
        .mount(&server)
        .await;
    let file = SessionFile::new();
    let mut session = store(&server, &file);

    assert!(!session.login("roleless").await);
    assert_eq!(session.error(), Some("Invalid access key"));
    assert!(!file.exists());
}

#[tokio::test]
async fn test_login_against_unreachable_backend_reports_message() {
    let config = inquiry_circle::shared::AppConfig::builder()
        .api_base_url(UNREACHABLE_BASE_URL)
        .build()
        .unwrap();
    let api = inquiry_circle::client::ApiClient::new(&config).unwrap();
    let file = SessionFile::new();
    let mut session = SessionStore::new(api, Box::new(file.storage()));

    assert!(!session.login(FACILITATOR_KEY).await);
    assert_eq!(
        session.error(),
        Some("Cannot connect to server. Please ensure the backend is running.")
    );
}

#[tokio::test]
async fn test_storage_failure_aborts_login() {
    let server = MockServer::start().await;
    mount_verify(&server).await;
    let dir = tempfile::tempdir().unwrap();
    // A directory where the record should be makes the rename fail
    let blocked = dir.path().join("session.json");
    std::fs::create_dir(&blocked).unwrap();
    std::fs::write(blocked.join("occupant"), b"x").unwrap();

    let mut session = SessionStore::new(
        api_for(&server),
        Box::new(FileSessionStorage::new(blocked)),
    );

    assert!(!session.login(FACILITATOR_KEY).await);
    assert!(!session.is_authenticated());
    assert!(session.api().access_key().is_none());
    crate::assert_contains!(session.error().unwrap_or_default(), "session storage error");
}

#[tokio::test]
async fn test_check_auth_status_logs_out_revoked_key() {
    let server = MockServer::start().await;
    mount_verify(&server).await;
    let file = SessionFile::new();
    file.storage()
        .save(&stored_session(INVALID_KEY, Role::Participant))
        .unwrap();

    let mut session = store(&server, &file);
    assert!(session.restore_session());
    assert!(!session.check_auth_status().await);
    assert!(!session.is_authenticated());
    assert!(!file.exists());
}

#[tokio::test]
async fn test_check_auth_status_logs_out_when_backend_unreachable() {
    let file = SessionFile::new();
    file.storage()
        .save(&stored_session(FACILITATOR_KEY, Role::Facilitator))
        .unwrap();

    let config = inquiry_circle::shared::AppConfig::builder()
        .api_base_url(UNREACHABLE_BASE_URL)
        .build()
        .unwrap();
    let api = inquiry_circle::client::ApiClient::new(&config).unwrap();
    let mut session = SessionStore::new(api, Box::new(file.storage()));

    assert!(session.restore_session());
    assert_eq!(session.api().access_key().as_deref(), Some(FACILITATOR_KEY));

    assert!(!session.check_auth_status().await);
    assert!(!session.is_authenticated());
    assert!(session.api().access_key().is_none());
    assert!(!file.exists());
    assert!(!session.is_loading());
}

#[tokio::test]
async fn test_check_auth_status_keeps_valid_key() {
    let server = MockServer::start().await;
    mount_verify(&server).await;
    let file = SessionFile::new();
    file.storage()
        .save(&stored_session(FACILITATOR_KEY, Role::Facilitator))
        .unwrap();

    let mut session = store(&server, &file);
    assert!(session.restore_session());
    assert!(session.check_auth_status().await);
    assert!(session.is_authenticated());
    assert!(file.exists());
}

#[tokio::test]
async fn test_check_auth_status_without_session() {
    let server = MockServer::start().await;
    let file = SessionFile::new();
    let mut session = store(&server, &file);

    assert!(!session.check_auth_status().await);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[test]
fn test_corrupt_record_is_not_restored() {
    let file = SessionFile::new();
    std::fs::write(&file.path, "{ not json").unwrap();
    let storage = file.storage();
    assert!(storage.load().is_err());

    let config = inquiry_circle::shared::AppConfig::default();
    let api = inquiry_circle::client::ApiClient::new(&config).unwrap();
    let mut session = SessionStore::new(api, Box::new(storage));
    assert!(!session.restore_session());
    assert!(!session.is_authenticated());
}
