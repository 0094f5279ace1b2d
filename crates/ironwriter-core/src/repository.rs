//! Session repository abstraction.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DomainError;

/// Stored representation of a whole session.
///
/// The payload is the serialized session document; stores treat it as
/// opaque and never merge partial payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    /// Session identifier.
    pub session_id: Uuid,
    /// Schema version of the payload.
    pub schema_version: u32,
    /// Timestamp of the save.
    pub saved_at: DateTime<Utc>,
    /// Serialized session document.
    pub payload: serde_json::Value,
}

/// Repository trait for loading and saving full sessions.
///
/// Saves replace the previous session wholesale. Implementations are
/// synchronous; callers invoke `save` at most once per committed mutation.
pub trait SessionStore: Send + Sync {
    /// Load the most recently saved session, if any.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the backing store cannot be
    /// read or its contents are not a stored session.
    fn load(&self) -> Result<Option<StoredSession>, DomainError>;

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the write fails.
    fn save(&self, session: &StoredSession) -> Result<(), DomainError>;
}
