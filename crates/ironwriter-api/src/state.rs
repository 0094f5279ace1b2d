//! Shared application state.

use std::sync::{Arc, Mutex, MutexGuard};

use ironwriter_core::clock::Clock;
use ironwriter_core::error::DomainError;
use ironwriter_core::repository::SessionStore;
use ironwriter_core::rng::DeterministicRng;
use ironwriter_journal::application::command_handlers;
use ironwriter_journal::domain::timeline::Timeline;
use ironwriter_oracle::OracleBook;

/// Application state shared across all request handlers.
///
/// The timeline lock is taken once per request and released before the
/// handler returns; it is never held across an `.await`.
#[derive(Clone)]
pub struct AppState {
    /// The live session.
    pub timeline: Arc<Mutex<Timeline>>,
    /// Clock for save timestamps.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// Dice and oracle draws.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Where each committed mutation is saved.
    pub store: Arc<dyn SessionStore>,
    /// Oracle tables available for consultation.
    pub oracles: Arc<OracleBook>,
}

impl AppState {
    /// Create new application state around an existing timeline.
    #[must_use]
    pub fn new(
        timeline: Timeline,
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        store: Arc<dyn SessionStore>,
        oracles: Arc<OracleBook>,
    ) -> Self {
        Self {
            timeline: Arc::new(Mutex::new(timeline)),
            clock,
            rng,
            store,
            oracles,
        }
    }

    /// Create application state from the session saved in `store`, or a
    /// fresh session if there is none.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the saved session cannot be restored.
    pub fn load(
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        store: Arc<dyn SessionStore>,
        oracles: Arc<OracleBook>,
    ) -> Result<Self, DomainError> {
        let timeline = command_handlers::load_session(store.as_ref())?;
        Ok(Self::new(timeline, clock, rng, store, oracles))
    }

    /// Locks the live timeline.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if a previous holder panicked.
    pub fn timeline(&self) -> Result<MutexGuard<'_, Timeline>, DomainError> {
        self.timeline
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("timeline mutex poisoned: {e}")))
    }
}
