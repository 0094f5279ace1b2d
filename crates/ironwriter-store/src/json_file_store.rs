//! JSON-file implementation of the `SessionStore` trait.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use ironwriter_core::error::DomainError;
use ironwriter_core::repository::{SessionStore, StoredSession};

/// Metadata read back from the top of a saved document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentHeader {
    session_id: Uuid,
    schema_version: u32,
    saved_at: DateTime<Utc>,
}

/// File-backed session store.
///
/// The file holds the session document exactly as exported, so a saved
/// session can be imported elsewhere unchanged.
#[derive(Debug, Clone)]
pub struct JsonFileSessionStore {
    path: PathBuf,
}

impl JsonFileSessionStore {
    /// Creates a store that reads and writes `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl SessionStore for JsonFileSessionStore {
    fn load(&self) -> Result<Option<StoredSession>, DomainError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no session file yet");
                return Ok(None);
            }
            Err(e) => {
                return Err(DomainError::Infrastructure(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };
        let payload: serde_json::Value = serde_json::from_str(&contents).map_err(|e| {
            DomainError::Infrastructure(format!("{} is not valid JSON: {e}", self.path.display()))
        })?;
        let header = DocumentHeader::deserialize(&payload).map_err(|e| {
            DomainError::Infrastructure(format!(
                "{} is not a session document: {e}",
                self.path.display()
            ))
        })?;
        Ok(Some(StoredSession {
            session_id: header.session_id,
            schema_version: header.schema_version,
            saved_at: header.saved_at,
            payload,
        }))
    }

    fn save(&self, session: &StoredSession) -> Result<(), DomainError> {
        let dir = self.directory();
        fs::create_dir_all(dir).map_err(|e| {
            DomainError::Infrastructure(format!("failed to create {}: {e}", dir.display()))
        })?;
        let contents = serde_json::to_vec_pretty(&session.payload).map_err(|e| {
            DomainError::Infrastructure(format!("failed to render session: {e}"))
        })?;

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
            DomainError::Infrastructure(format!(
                "failed to create temp file in {}: {e}",
                dir.display()
            ))
        })?;
        temp.write_all(&contents)
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| DomainError::Infrastructure(format!("failed to write session: {e}")))?;
        temp.persist(&self.path).map_err(|e| {
            DomainError::Infrastructure(format!(
                "failed to persist session to {}: {e}",
                self.path.display()
            ))
        })?;

        debug!(
            path = %self.path.display(),
            session_id = %session.session_id,
            bytes = contents.len(),
            "saved session"
        );
        Ok(())
    }
}
