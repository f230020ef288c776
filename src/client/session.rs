//! Session Store
//!
//! Holds the authenticated identity (key, role, key id, circle) and keeps it
//! write-through consistent with durable storage. Every mutation goes through
//! `login`, `logout` or `restore_session`.

use crate::client::api::{error_message, ApiClient};
use crate::client::storage::{SessionStorage, StoredSession, STORED_SESSION_VERSION};
use crate::shared::models::{CircleSummary, Role};

/// Authenticated identity. Present only when a key and a role are both known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_key: String,
    pub role: Role,
    pub key_id: Option<i64>,
    pub circle: Option<CircleSummary>,
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Self {
            access_key: stored.access_key,
            role: stored.role,
            key_id: stored.key_id,
            circle: stored.circle,
        }
    }
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            version: STORED_SESSION_VERSION,
            access_key: session.access_key.clone(),
            role: session.role,
            key_id: session.key_id,
            circle: session.circle.clone(),
        }
    }
}

/// Session store backed by a `SessionStorage`.
pub struct SessionStore {
    api: ApiClient,
    storage: Box<dyn SessionStorage>,
    session: Option<Session>,
    error: Option<String>,
    loading: bool,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .field("role", &self.role())
            .field("error", &self.error)
            .field("loading", &self.loading)
            .finish()
    }
}

impl SessionStore {
    pub fn new(api: ApiClient, storage: Box<dyn SessionStorage>) -> Self {
        Self {
            api,
            storage,
            session: None,
            error: None,
            loading: false,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().map(|s| s.role)
    }

    pub fn access_key(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_key.as_str())
    }

    pub fn key_id(&self) -> Option<i64> {
        self.session.as_ref().and_then(|s| s.key_id)
    }

    pub fn circle(&self) -> Option<&CircleSummary> {
        self.session.as_ref().and_then(|s| s.circle.as_ref())
    }

    pub fn is_facilitator(&self) -> bool {
        self.role() == Some(Role::Facilitator)
    }

    pub fn is_participant(&self) -> bool {
        self.role() == Some(Role::Participant)
    }

    pub fn has_circle(&self) -> bool {
        self.circle().is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Verify `key` and, on success, make it the active session.
    ///
    /// The record is persisted before memory changes, so a storage failure
    /// leaves both the previous session and the previous record in place.
    pub async fn login(&mut self, key: &str) -> bool {
        self.loading = true;
        self.error = None;
        let result = self.try_login(key).await;
        self.loading = false;

        match result {
            Ok(()) => true,
            Err(message) => {
                tracing::warn!("Login failed: {}", message);
                self.error = Some(message);
                false
            }
        }
    }

    async fn try_login(&mut self, key: &str) -> Result<(), String> {
        let response = self
            .api
            .verify_key(Some(key))
            .await
            .map_err(|e| error_message(&e))?;

        let role = match (response.valid, response.role) {
            (true, Some(role)) => role,
            _ => {
                return Err(response
                    .error
                    .unwrap_or_else(|| "Invalid access key".to_string()))
            }
        };

        let session = Session {
            access_key: key.to_string(),
            role,
            key_id: response.key_id,
            circle: response.circle,
        };

        self.storage
            .save(&StoredSession::from(&session))
            .map_err(|e| error_message(&e))?;

        self.api.set_access_key(key);
        tracing::info!(role = %session.role, "Session established");
        self.session = Some(session);
        Ok(())
    }

    /// Drop the session from memory and storage and detach the credential.
    pub fn logout(&mut self) {
        self.session = None;
        self.error = None;
        self.api.clear_access_key();

        if let Err(e) = self.storage.clear() {
            tracing::warn!("Failed to clear stored session: {}", e);
        }
        tracing::info!("Session cleared");
    }

    /// Repopulate the session from storage without contacting the backend.
    pub fn restore_session(&mut self) -> bool {
        let stored = match self.storage.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session record: {}", e);
                return false;
            }
        };

        if stored.access_key.is_empty() {
            return false;
        }

        let session = Session::from(stored);
        self.api.set_access_key(session.access_key.clone());
        tracing::debug!(role = %session.role, "Session restored from storage");
        self.session = Some(session);
        true
    }

    /// Re-verify the held key. An invalid answer or a transport failure logs
    /// the session out.
    pub async fn check_auth_status(&mut self) -> bool {
        let key = match self.access_key() {
            Some(key) => key.to_string(),
            None => return false,
        };

        self.loading = true;
        let result = self.api.verify_key(Some(&key)).await;
        self.loading = false;

        match result {
            Ok(response) if response.valid => true,
            Ok(_) => {
                tracing::info!("Stored key is no longer valid");
                self.logout();
                false
            }
            Err(e) => {
                tracing::warn!("Key re-verification failed: {}", e);
                self.logout();
                false
            }
        }
    }
}
