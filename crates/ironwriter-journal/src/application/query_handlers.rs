//! Query handlers for the Journal context.
//!
//! These build read-only view DTOs from the live timeline for presentation
//! layers.

use ironwriter_core::clock::Clock;
use ironwriter_oracle::OracleBook;
use serde::Serialize;
use uuid::Uuid;

use crate::application::document::SessionDocument;
use crate::domain::bookmarks::{BookmarkFilter, BookmarkKind};
use crate::domain::moment::Category;
use crate::domain::state::{GameState, Rank};
use crate::domain::timeline::Timeline;

/// Read-only view of one history entry.
#[derive(Debug, Serialize)]
pub struct MomentView {
    /// History position.
    pub index: usize,
    /// Display text.
    pub text: String,
    /// Entry category.
    pub category: Category,
    /// Setup moments are not shown to readers.
    pub hidden: bool,
    /// Whether the entry can be edited.
    pub editable: bool,
    /// Whether the entry can be rerolled.
    pub rerollable: bool,
}

/// Read-only view of a progress track.
#[derive(Debug, Serialize)]
pub struct ProgressView {
    /// Track id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Challenge rank.
    pub rank: Rank,
    /// Raw ticks.
    pub ticks: i32,
    /// Boxes shown as filled.
    pub filled_boxes: i32,
}

/// Read-only view of a bookmark.
#[derive(Debug, Serialize)]
pub struct BookmarkView {
    /// Position of the moment that recorded it.
    pub index: usize,
    /// Bookmark name.
    pub name: String,
    /// What recorded it.
    pub kind: BookmarkKind,
}

/// Read-only view of the whole session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// Position of the last applied moment.
    pub cursor: Option<usize>,
    /// The character sheet.
    pub state: GameState,
    /// Progress tracks with display boxes.
    pub progress: Vec<ProgressView>,
    /// History in order.
    pub moments: Vec<MomentView>,
}

/// Builds the session view.
#[must_use]
pub fn get_session(timeline: &Timeline) -> SessionView {
    let state = timeline.state();
    SessionView {
        session_id: timeline.session_id(),
        cursor: timeline.cursor(),
        state: state.clone(),
        progress: state
            .progress
            .iter()
            .map(|(id, track)| ProgressView {
                id: id.clone(),
                name: track.name.clone(),
                rank: track.rank,
                ticks: track.ticks,
                filled_boxes: track.filled_boxes(),
            })
            .collect(),
        moments: timeline
            .history()
            .iter()
            .enumerate()
            .map(|(index, moment)| MomentView {
                index,
                text: moment.text.clone(),
                category: moment.category,
                hidden: moment.category == Category::None,
                editable: moment.category.is_editable(),
                rerollable: moment.is_rerollable(),
            })
            .collect(),
    }
}

/// Lists bookmarks passing `filter`, in history order.
#[must_use]
pub fn list_bookmarks(timeline: &Timeline, filter: BookmarkFilter) -> Vec<BookmarkView> {
    timeline
        .bookmarks()
        .filtered(filter)
        .map(|(index, bookmark)| BookmarkView {
            index,
            name: bookmark.name.clone(),
            kind: bookmark.kind,
        })
        .collect()
}

/// Exports the session document.
#[must_use]
pub fn export_session(timeline: &Timeline, clock: &dyn Clock) -> SessionDocument {
    SessionDocument::capture(timeline, clock)
}

/// Lists the oracle tables available for consultation.
#[must_use]
pub fn list_oracle_tables(oracles: &OracleBook) -> Vec<String> {
    oracles.table_names().map(str::to_owned).collect()
}
