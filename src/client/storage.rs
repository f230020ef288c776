//! Durable session storage
//!
//! The authenticated identity is persisted as one serialized record. Saving
//! and clearing always act on the whole record, so a reader never observes a
//! key without its role or a stale circle next to a fresh key.

use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::shared::error::ClientError;
use crate::shared::models::{CircleSummary, Role};

/// Current layout of the stored record
pub const STORED_SESSION_VERSION: u32 = 1;

/// The persisted form of an authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default = "default_version")]
    pub version: u32,
    pub access_key: String,
    pub role: Role,
    #[serde(default)]
    pub key_id: Option<i64>,
    #[serde(default)]
    pub circle: Option<CircleSummary>,
}

fn default_version() -> u32 {
    STORED_SESSION_VERSION
}

/// Durable key-value home of the session record.
pub trait SessionStorage: Send + Sync {
    /// Read the record; `Ok(None)` when nothing is stored
    fn load(&self) -> Result<Option<StoredSession>, ClientError>;

    /// Replace the record as one unit
    fn save(&self, session: &StoredSession) -> Result<(), ClientError>;

    /// Remove the record. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), ClientError>;
}

/// JSON file on disk, replaced through a temp file and an atomic rename.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> Result<PathBuf, ClientError> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| ClientError::storage("session path has no file name"))?;
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        Ok(self.path.with_file_name(tmp_name))
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<StoredSession>, ClientError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| ClientError::storage(format!("{}: {}", self.path.display(), e)))?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ClientError::storage(format!("corrupt session record: {}", e)))
    }

    fn save(&self, session: &StoredSession) -> Result<(), ClientError> {
        let io_err = |e: std::io::Error| ClientError::storage(e.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(session)
            .map_err(|e| ClientError::storage(e.to_string()))?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path).map_err(io_err)?;
        tmp_file.write_all(json.as_bytes()).map_err(io_err)?;
        tmp_file.sync_all().map_err(io_err)?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path).map_err(io_err)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::storage(e.to_string())),
        }
    }
}

/// In-process storage, used for ephemeral sessions and tests.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    record: Mutex<Option<StoredSession>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(session: StoredSession) -> Self {
        Self {
            record: Mutex::new(Some(session)),
        }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<StoredSession>, ClientError> {
        Ok(self.record.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), ClientError> {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

impl<S: SessionStorage + ?Sized> SessionStorage for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<StoredSession>, ClientError> {
        (**self).load()
    }

    fn save(&self, session: &StoredSession) -> Result<(), ClientError> {
        (**self).save(session)
    }

    fn clear(&self) -> Result<(), ClientError> {
        (**self).clear()
    }
}
