//! Test stores — mock `SessionStore` implementations for tests.

use std::sync::Mutex;

use ironwriter_core::error::DomainError;
use ironwriter_core::repository::{SessionStore, StoredSession};

/// A session store that keeps every saved session in memory. `load` returns
/// the latest save.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    saved: Mutex<Vec<StoredSession>>,
}

impl InMemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `session`.
    #[must_use]
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            saved: Mutex::new(vec![session]),
        }
    }

    /// Returns a snapshot of every session that was saved, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved_sessions(&self) -> Vec<StoredSession> {
        self.saved.lock().unwrap().clone()
    }

    /// Number of saves performed.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn save_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<StoredSession>, DomainError> {
        Ok(self.saved.lock().unwrap().last().cloned())
    }

    fn save(&self, session: &StoredSession) -> Result<(), DomainError> {
        self.saved.lock().unwrap().push(session.clone());
        Ok(())
    }
}

/// A session store that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingSessionStore;

impl SessionStore for FailingSessionStore {
    fn load(&self) -> Result<Option<StoredSession>, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    fn save(&self, _session: &StoredSession) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }
}
