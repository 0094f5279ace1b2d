//! The session document: the export/import and persistence format.

use chrono::{DateTime, Utc};
use ironwriter_core::clock::Clock;
use ironwriter_core::error::DomainError;
use ironwriter_core::repository::StoredSession;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::actions::Action;
use crate::domain::bookmarks::BookmarkIndex;
use crate::domain::moment::Moment;
use crate::domain::state::{GameState, Stat};
use crate::domain::timeline::Timeline;

/// Current document schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// A complete, self-describing copy of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    pub schema_version: u32,
    pub session_id: Uuid,
    pub saved_at: DateTime<Utc>,
    pub state: GameState,
    pub history: Vec<Moment>,
    pub bookmarks: BookmarkIndex,
}

impl SessionDocument {
    /// Captures a timeline that is at its present.
    #[must_use]
    pub fn capture(timeline: &Timeline, clock: &dyn Clock) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            session_id: timeline.session_id(),
            saved_at: clock.now(),
            state: timeline.state().clone(),
            history: timeline.history().to_vec(),
            bookmarks: timeline.bookmarks().clone(),
        }
    }

    /// Serializes the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if serialization fails.
    pub fn to_value(&self) -> Result<serde_json::Value, DomainError> {
        serde_json::to_value(self)
            .map_err(|e| DomainError::Infrastructure(format!("session serialization failed: {e}")))
    }

    /// Wraps the document for a `SessionStore`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if serialization fails.
    pub fn to_stored(&self) -> Result<StoredSession, DomainError> {
        Ok(StoredSession {
            session_id: self.session_id,
            schema_version: self.schema_version,
            saved_at: self.saved_at,
            payload: self.to_value()?,
        })
    }

    /// Parses a document, checking its schema version before anything else.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnsupportedSchema` for another schema version
    /// and `DomainError::Validation` for a missing version or a malformed
    /// body.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DomainError> {
        let found = value
            .get("schemaVersion")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| DomainError::Validation("document has no schemaVersion".to_owned()))?;
        check_schema(u32::try_from(found).unwrap_or(u32::MAX))?;
        serde_json::from_value(value)
            .map_err(|e| DomainError::Validation(format!("malformed session document: {e}")))
    }

    /// Parses a document loaded from a `SessionStore`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`SessionDocument::from_value`].
    pub fn from_stored(stored: StoredSession) -> Result<Self, DomainError> {
        check_schema(stored.schema_version)?;
        Self::from_value(stored.payload)
    }

    /// Replays the history into a new timeline and checks it reproduces the
    /// recorded state and bookmarks.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the history writes the derived
    /// bond count, or the replay disagrees with the document or breaks a
    /// state invariant.
    pub fn into_timeline(self) -> Result<Timeline, DomainError> {
        let writes_bond_count = self
            .history
            .iter()
            .flat_map(|moment| &moment.actions)
            .any(|action| matches!(action, Action::Stat { stat: Stat::Bonds, .. }));
        if writes_bond_count {
            return Err(DomainError::Validation(
                "document history sets the bonds stat directly".to_owned(),
            ));
        }

        let timeline = Timeline::from_history(self.session_id, self.history);
        let state = timeline.state();
        if usize::try_from(state.stats.bonds).ok() != Some(state.bonds.len()) {
            return Err(DomainError::Validation(
                "replayed bonds stat does not match the bond list".to_owned(),
            ));
        }
        if timeline.state() != &self.state {
            return Err(DomainError::Validation(
                "document state does not match its replayed history".to_owned(),
            ));
        }
        if timeline.bookmarks() != &self.bookmarks {
            return Err(DomainError::Validation(
                "document bookmarks do not match its replayed history".to_owned(),
            ));
        }
        Ok(timeline)
    }
}

fn check_schema(found: u32) -> Result<(), DomainError> {
    if found == SCHEMA_VERSION {
        Ok(())
    } else {
        Err(DomainError::UnsupportedSchema {
            expected: SCHEMA_VERSION,
            found,
        })
    }
}
