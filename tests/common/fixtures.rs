//! Session storage fixtures
//!
//! Each fixture owns a `TempDir`; the directory lives as long as the fixture.

use std::path::PathBuf;

use tempfile::TempDir;

use inquiry_circle::client::storage::STORED_SESSION_VERSION;
use inquiry_circle::client::{FileSessionStorage, StoredSession};
use inquiry_circle::shared::{CircleSummary, Role};

pub struct SessionFile {
    _dir: TempDir,
    pub path: PathBuf,
}

impl SessionFile {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("session.json");
        Self { _dir: dir, path }
    }

    pub fn storage(&self) -> FileSessionStorage {
        FileSessionStorage::new(self.path.clone())
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

pub fn stored_session(key: &str, role: Role) -> StoredSession {
    StoredSession {
        version: STORED_SESSION_VERSION,
        access_key: key.to_string(),
        role,
        key_id: Some(11),
        circle: Some(CircleSummary {
            id: 3,
            name: "Morning Circle".to_string(),
            room_id: Some("ic-3-abc123-1700000000000".to_string()),
            circle_type: Default::default(),
        }),
    }
}
