//! End-to-end tests of the journal command and query handlers.

use std::sync::Mutex;

use ironwriter_core::error::DomainError;
use ironwriter_journal::application::command_handlers::{
    handle_consult_oracle, handle_delete_entry, handle_edit_entry, handle_import_session,
    handle_perform_roll, handle_reroll_entry, handle_start_session, handle_submit_entry,
};
use ironwriter_journal::application::document::SessionDocument;
use ironwriter_journal::application::query_handlers::{export_session, get_session, list_bookmarks};
use ironwriter_journal::domain::bookmarks::BookmarkFilter;
use ironwriter_journal::domain::commands::{
    ConsultOracle, DeleteEntry, EditEntry, ImportSession, PerformRoll, RerollEntry, StartSession,
    SubmitEntry,
};
use ironwriter_journal::domain::moment::Category;
use ironwriter_journal::domain::roll::RollSource;
use ironwriter_journal::domain::state::Stat;
use ironwriter_journal::domain::timeline::Timeline;
use ironwriter_oracle::OracleBook;
use ironwriter_test_support::{FixedClock, InMemorySessionStore, SequenceRng};
use uuid::Uuid;

fn submit(
    timeline: &mut Timeline,
    store: &InMemorySessionStore,
    text: &str,
    category: Category,
) -> usize {
    let command = SubmitEntry {
        correlation_id: Uuid::new_v4(),
        text: text.to_owned(),
        category,
    };
    handle_submit_entry(&command, timeline, &FixedClock::default(), store).unwrap()
}

fn rng(values: Vec<u32>) -> Mutex<SequenceRng> {
    Mutex::new(SequenceRng::new(values))
}

fn played_session(store: &InMemorySessionStore) -> Timeline {
    let mut timeline = Timeline::new_session(Uuid::new_v4());
    submit(
        &mut timeline,
        store,
        r#"[rename "Kira Ashdown"] [bond "Greta"] [progress "Reach the Shrine" formidable]"#,
        Category::Fiction,
    );
    submit(&mut timeline, store, "[bookmark Session one]", Category::Meta);
    submit(
        &mut timeline,
        store,
        r#"[progress "Reach the Shrine"] [item Rope 2] [health -1]"#,
        Category::Fiction,
    );
    timeline
}

#[test]
fn test_export_then_import_round_trips() {
    // Arrange
    let store = InMemorySessionStore::new();
    let clock = FixedClock::default();
    let original = played_session(&store);
    let document = export_session(&original, &clock);
    let mut timeline = Timeline::new_session(Uuid::new_v4());

    // Act
    let command = ImportSession {
        correlation_id: Uuid::new_v4(),
        document: serde_json::to_value(&document).unwrap(),
    };
    handle_import_session(&command, &mut timeline, &clock, &store).unwrap();

    // Assert
    assert_eq!(timeline.state(), original.state());
    assert_eq!(timeline.history().len(), original.history().len());
    assert_eq!(timeline.session_id(), original.session_id());
}

#[test]
fn test_malformed_import_leaves_live_session_untouched() {
    // Arrange
    let store = InMemorySessionStore::new();
    let clock = FixedClock::default();
    let mut timeline = played_session(&store);
    let before_state = timeline.state().clone();
    let before_len = timeline.history().len();
    let saves_before = store.save_count();

    let mut tampered = serde_json::to_value(export_session(&timeline, &clock)).unwrap();
    tampered["state"]["stats"]["health"] = serde_json::json!(42);

    // Act
    let results = [
        serde_json::json!({"schemaVersion": 1, "history": 7}),
        serde_json::json!({"schemaVersion": 2}),
        serde_json::json!("not a document"),
        tampered,
    ]
    .into_iter()
    .map(|document| {
        let command = ImportSession {
            correlation_id: Uuid::new_v4(),
            document,
        };
        handle_import_session(&command, &mut timeline, &clock, &store)
    })
    .collect::<Vec<_>>();

    // Assert
    assert!(results.iter().all(Result::is_err));
    assert!(matches!(
        results[1],
        Err(DomainError::UnsupportedSchema { found: 2, .. })
    ));
    assert_eq!(timeline.state(), &before_state);
    assert_eq!(timeline.history().len(), before_len);
    assert_eq!(store.save_count(), saves_before);
}

#[test]
fn test_edit_and_delete_keep_state_consistent_with_replay() {
    // Arrange
    let store = InMemorySessionStore::new();
    let clock = FixedClock::default();
    let mut timeline = played_session(&store);

    // Act
    let edit = EditEntry {
        correlation_id: Uuid::new_v4(),
        index: 1,
        text: r#"[bond "Ivar"] [progress "Reach the Shrine" dangerous]"#.to_owned(),
        category: Category::Fiction,
    };
    handle_edit_entry(&edit, &mut timeline, &clock, &store).unwrap();
    let delete = DeleteEntry {
        correlation_id: Uuid::new_v4(),
        index: 2,
    };
    handle_delete_entry(&delete, &mut timeline, &clock, &store).unwrap();

    // Assert
    let state = timeline.state();
    assert_eq!(state.character_name, "New Character");
    assert!(state.bonds.contains_key("ivar"));
    assert!(!state.bonds.contains_key("greta"));
    assert_eq!(state.progress["reach the shrine"].ticks, 8);
    assert!(list_bookmarks(&timeline, BookmarkFilter::Story).is_empty());

    let rebuilt = Timeline::from_history(timeline.session_id(), timeline.history().to_vec());
    assert_eq!(rebuilt.state(), timeline.state());
    assert_eq!(rebuilt.bookmarks(), timeline.bookmarks());
}

#[test]
fn test_roll_and_reroll_through_handlers() {
    // Arrange
    let store = InMemorySessionStore::new();
    let clock = FixedClock::default();
    let mut timeline = played_session(&store);
    let roll = PerformRoll {
        correlation_id: Uuid::new_v4(),
        stat: Some(Stat::Health),
        add: 1,
        source: RollSource::ActionDie,
    };

    // Act
    let position = handle_perform_roll(&roll, &mut timeline, &clock, &rng(vec![3, 3, 2]), &store)
        .unwrap()
        .unwrap();
    let reroll = RerollEntry {
        correlation_id: Uuid::new_v4(),
        index: position,
    };
    let book = OracleBook::builtin().unwrap();
    handle_reroll_entry(&reroll, &mut timeline, &clock, &rng(vec![9, 10, 6]), &book, &store)
        .unwrap();

    // Assert
    assert_eq!(
        get_session(&timeline).moments[position].text,
        "Challenge: [9, 10]\nAction: [6] + 4 (health) + 1 = 11\n> Strong Hit"
    );
    assert_eq!(timeline.history().len(), position + 1);
}

#[test]
fn test_roll_names_progress_track_by_display_name() {
    // Arrange
    let store = InMemorySessionStore::new();
    let mut timeline = played_session(&store);
    let roll = PerformRoll {
        correlation_id: Uuid::new_v4(),
        stat: None,
        add: 0,
        source: RollSource::Progress {
            id: "Reach the Shrine".to_owned(),
        },
    };

    // Act
    let position = handle_perform_roll(
        &roll,
        &mut timeline,
        &FixedClock::default(),
        &rng(vec![1, 2, 6]),
        &store,
    )
    .unwrap();

    // Assert
    let position = position.unwrap();
    let text = &get_session(&timeline).moments[position].text;
    assert!(text.contains("(Reach the Shrine)"), "got {text}");
}

#[test]
fn test_roll_against_missing_track_creates_nothing() {
    let store = InMemorySessionStore::new();
    let mut timeline = Timeline::new_session(Uuid::new_v4());
    let roll = PerformRoll {
        correlation_id: Uuid::new_v4(),
        stat: None,
        add: 0,
        source: RollSource::Progress {
            id: "no such vow".to_owned(),
        },
    };

    let position = handle_perform_roll(
        &roll,
        &mut timeline,
        &FixedClock::default(),
        &rng(vec![]),
        &store,
    )
    .unwrap();

    assert_eq!(position, None);
    assert_eq!(store.save_count(), 0);
}

#[test]
fn test_consult_unknown_oracle_is_rejected() {
    let store = InMemorySessionStore::new();
    let mut timeline = Timeline::new_session(Uuid::new_v4());
    let command = ConsultOracle {
        correlation_id: Uuid::new_v4(),
        table: "Weather".to_owned(),
    };

    let result = handle_consult_oracle(
        &command,
        &mut timeline,
        &FixedClock::default(),
        &rng(vec![]),
        &OracleBook::builtin().unwrap(),
        &store,
    );

    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert_eq!(timeline.history().len(), 1);
}

#[test]
fn test_start_session_replaces_timeline() {
    let store = InMemorySessionStore::new();
    let mut timeline = played_session(&store);
    let old_id = timeline.session_id();

    handle_start_session(
        &StartSession {
            correlation_id: Uuid::new_v4(),
        },
        &mut timeline,
        &FixedClock::default(),
        &store,
    )
    .unwrap();

    assert_ne!(timeline.session_id(), old_id);
    assert_eq!(timeline.history().len(), 1);
    let saved = store.saved_sessions().pop().unwrap();
    let reloaded = SessionDocument::from_stored(saved)
        .unwrap()
        .into_timeline()
        .unwrap();
    assert_eq!(reloaded.session_id(), timeline.session_id());
}
