//! Command handlers for the Journal context.
//!
//! Each handler runs one synchronous timeline operation and then saves the
//! whole session through the `SessionStore` exactly once.

use std::sync::Mutex;

use ironwriter_core::clock::Clock;
use ironwriter_core::command::Command;
use ironwriter_core::error::DomainError;
use ironwriter_core::repository::SessionStore;
use ironwriter_core::rng::DeterministicRng;
use ironwriter_oracle::OracleBook;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::document::SessionDocument;
use crate::domain::commands::{
    ConsultOracle, DeleteEntry, EditEntry, ImportSession, PerformRoll, RerollEntry, StartSession,
    SubmitEntry,
};
use crate::domain::moment::Moment;
use crate::domain::timeline::Timeline;

/// Loads the saved session, or starts a new one if nothing was saved.
///
/// # Errors
///
/// Returns `DomainError` if the store fails or the saved document does not
/// replay to its recorded state.
pub fn load_session(store: &dyn SessionStore) -> Result<Timeline, DomainError> {
    match store.load()? {
        Some(stored) => {
            let timeline = SessionDocument::from_stored(stored)?.into_timeline()?;
            info!(
                session_id = %timeline.session_id(),
                moments = timeline.history().len(),
                "loaded saved session"
            );
            Ok(timeline)
        }
        None => {
            let timeline = Timeline::new_session(Uuid::new_v4());
            info!(session_id = %timeline.session_id(), "no saved session; starting fresh");
            Ok(timeline)
        }
    }
}

fn persist(
    timeline: &Timeline,
    clock: &dyn Clock,
    store: &dyn SessionStore,
) -> Result<(), DomainError> {
    let stored = SessionDocument::capture(timeline, clock).to_stored()?;
    store.save(&stored)
}

fn log_command(command: &dyn Command) {
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        "handling journal command"
    );
}

/// Handles the `StartSession` command: replaces the timeline with a fresh
/// session holding only the setup moment.
///
/// # Errors
///
/// Returns `DomainError` if saving fails.
pub fn handle_start_session(
    command: &StartSession,
    timeline: &mut Timeline,
    clock: &dyn Clock,
    store: &dyn SessionStore,
) -> Result<(), DomainError> {
    log_command(command);
    *timeline = Timeline::new_session(Uuid::new_v4());
    persist(timeline, clock, store)
}

/// Handles the `SubmitEntry` command: parses the entry and appends it,
/// returning its position.
///
/// # Errors
///
/// Returns `DomainError::Validation` for anything but fiction or meta
/// entries, or `DomainError` if saving fails.
pub fn handle_submit_entry(
    command: &SubmitEntry,
    timeline: &mut Timeline,
    clock: &dyn Clock,
    store: &dyn SessionStore,
) -> Result<usize, DomainError> {
    log_command(command);
    if !command.category.is_editable() {
        return Err(DomainError::Validation(
            "entries must be fiction or meta".to_owned(),
        ));
    }
    let position = timeline.add_moment(Moment::from_entry(&command.text, command.category));
    persist(timeline, clock, store)?;
    Ok(position)
}

/// Handles the `EditEntry` command: re-parses the entry in place and
/// replays everything after it.
///
/// # Errors
///
/// Returns `DomainError` if the entry does not exist, cannot be edited, or
/// saving fails.
pub fn handle_edit_entry(
    command: &EditEntry,
    timeline: &mut Timeline,
    clock: &dyn Clock,
    store: &dyn SessionStore,
) -> Result<(), DomainError> {
    log_command(command);
    let moment = Moment::from_entry(&command.text, command.category);
    timeline.edit_moment(command.index, moment)?;
    persist(timeline, clock, store)
}

/// Handles the `DeleteEntry` command.
///
/// # Errors
///
/// Returns `DomainError` if the entry does not exist, is the setup moment,
/// or saving fails.
pub fn handle_delete_entry(
    command: &DeleteEntry,
    timeline: &mut Timeline,
    clock: &dyn Clock,
    store: &dyn SessionStore,
) -> Result<(), DomainError> {
    log_command(command);
    timeline.remove_moment(command.index)?;
    persist(timeline, clock, store)
}

/// Handles the `RerollEntry` command.
///
/// The RNG `Mutex` is held only for the synchronous timeline call.
///
/// # Errors
///
/// Returns `DomainError` if the entry does not exist, holds nothing to
/// reroll, or saving fails.
pub fn handle_reroll_entry(
    command: &RerollEntry,
    timeline: &mut Timeline,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    oracles: &OracleBook,
    store: &dyn SessionStore,
) -> Result<(), DomainError> {
    log_command(command);
    {
        let mut rng_guard = rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        timeline.reroll_moment(command.index, &mut *rng_guard, oracles)?;
    }
    persist(timeline, clock, store)
}

/// Handles the `PerformRoll` command, returning the new moment's position.
///
/// A progress source may name the track by id or display name. A roll against a progress track that does not exist records nothing and
/// returns `None` without saving.
///
/// # Errors
///
/// Returns `DomainError` if saving fails.
pub fn handle_perform_roll(
    command: &PerformRoll,
    timeline: &mut Timeline,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    store: &dyn SessionStore,
) -> Result<Option<usize>, DomainError> {
    log_command(command);
    let position = {
        let mut rng_guard = rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        timeline.roll(
            command.stat,
            command.add,
            command.source.clone().normalized(),
            &mut *rng_guard,
        )
    };
    if position.is_some() {
        persist(timeline, clock, store)?;
    }
    Ok(position)
}

/// Handles the `ConsultOracle` command, returning the new moment's
/// position.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an unknown table, or `DomainError`
/// if saving fails.
pub fn handle_consult_oracle(
    command: &ConsultOracle,
    timeline: &mut Timeline,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    oracles: &OracleBook,
    store: &dyn SessionStore,
) -> Result<usize, DomainError> {
    log_command(command);
    let position = {
        let mut rng_guard = rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        timeline.consult_oracle(&command.table, &mut *rng_guard, oracles)?
    };
    persist(timeline, clock, store)?;
    Ok(position)
}

/// Handles the `ImportSession` command: validates the whole document, then
/// swaps it in.
///
/// # Errors
///
/// Returns `DomainError` if the document is rejected, leaving `timeline`
/// untouched, or if saving fails.
pub fn handle_import_session(
    command: &ImportSession,
    timeline: &mut Timeline,
    clock: &dyn Clock,
    store: &dyn SessionStore,
) -> Result<(), DomainError> {
    log_command(command);
    let imported = SessionDocument::from_value(command.document.clone())
        .and_then(SessionDocument::into_timeline)
        .inspect_err(|e| warn!(error = %e, "rejected session import"))?;
    *timeline = imported;
    persist(timeline, clock, store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::moment::Category;
    use ironwriter_test_support::{FailingSessionStore, FixedClock, InMemorySessionStore};

    #[test]
    fn test_load_session_without_save_starts_fresh() {
        let store = InMemorySessionStore::new();

        let timeline = load_session(&store).unwrap();

        assert_eq!(timeline.history().len(), 1);
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_submit_entry_saves_once() {
        // Arrange
        let store = InMemorySessionStore::new();
        let clock = FixedClock::default();
        let mut timeline = Timeline::new_session(Uuid::new_v4());
        let command = SubmitEntry {
            correlation_id: Uuid::new_v4(),
            text: "[bond Greta]".to_owned(),
            category: Category::Fiction,
        };

        // Act
        let position = handle_submit_entry(&command, &mut timeline, &clock, &store).unwrap();

        // Assert
        assert_eq!(position, 1);
        assert_eq!(store.save_count(), 1);
        let saved = &store.saved_sessions()[0];
        assert_eq!(saved.session_id, timeline.session_id());
        assert_eq!(saved.saved_at, clock.0);
    }

    #[test]
    fn test_submit_rejects_roll_category() {
        let store = InMemorySessionStore::new();
        let mut timeline = Timeline::new_session(Uuid::new_v4());
        let command = SubmitEntry {
            correlation_id: Uuid::new_v4(),
            text: "fake roll".to_owned(),
            category: Category::Roll,
        };

        let result = handle_submit_entry(&command, &mut timeline, &FixedClock::default(), &store);

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_save_failure_is_reported() {
        let mut timeline = Timeline::new_session(Uuid::new_v4());
        let command = SubmitEntry {
            correlation_id: Uuid::new_v4(),
            text: "text".to_owned(),
            category: Category::Fiction,
        };

        let result = handle_submit_entry(
            &command,
            &mut timeline,
            &FixedClock::default(),
            &FailingSessionStore,
        );

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }

    #[test]
    fn test_load_session_restores_saved_timeline() {
        let store = InMemorySessionStore::new();
        let mut timeline = Timeline::new_session(Uuid::new_v4());
        let command = SubmitEntry {
            correlation_id: Uuid::new_v4(),
            text: "[iron 3]".to_owned(),
            category: Category::Fiction,
        };
        handle_submit_entry(&command, &mut timeline, &FixedClock::default(), &store).unwrap();

        let loaded = load_session(&store).unwrap();

        assert_eq!(loaded.session_id(), timeline.session_id());
        assert_eq!(loaded.state(), timeline.state());
    }
}
