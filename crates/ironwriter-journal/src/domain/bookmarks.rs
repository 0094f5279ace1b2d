//! Bookmark index keyed by moment position.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What produced a bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookmarkKind {
    Fiction,
    Meta,
    Bond,
    Unbond,
    ProgressAdd,
    ProgressProgress,
    ProgressComplete,
    Asset,
    Item,
    Rename,
    Debility,
}

/// A single named entry in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub name: String,
    pub kind: BookmarkKind,
}

/// Subsets of the index offered for browsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookmarkFilter {
    #[default]
    All,
    Bonds,
    Story,
    Progress,
}

impl BookmarkFilter {
    /// Returns `true` if bookmarks of `kind` pass this filter.
    #[must_use]
    pub fn accepts(self, kind: BookmarkKind) -> bool {
        match self {
            BookmarkFilter::All => true,
            BookmarkFilter::Bonds => matches!(kind, BookmarkKind::Bond | BookmarkKind::Unbond),
            BookmarkFilter::Story => matches!(kind, BookmarkKind::Fiction | BookmarkKind::Meta),
            BookmarkFilter::Progress => matches!(
                kind,
                BookmarkKind::ProgressAdd
                    | BookmarkKind::ProgressProgress
                    | BookmarkKind::ProgressComplete
            ),
        }
    }

    /// Parses a filter name, ignoring case.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "all" => Some(BookmarkFilter::All),
            "bonds" => Some(BookmarkFilter::Bonds),
            "story" => Some(BookmarkFilter::Story),
            "progress" => Some(BookmarkFilter::Progress),
            _ => None,
        }
    }
}

/// Bookmarks grouped by the position of the moment that recorded them.
///
/// Entries are only ever written while a moment is applied, so the index is
/// fully derived from the applied prefix of the history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkIndex {
    entries: BTreeMap<usize, Vec<Bookmark>>,
}

impl BookmarkIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a bookmark at `position`.
    pub fn record(&mut self, position: usize, bookmark: Bookmark) {
        self.entries.entry(position).or_default().push(bookmark);
    }

    /// Drops every bookmark recorded at `position`.
    pub fn clear(&mut self, position: usize) {
        self.entries.remove(&position);
    }

    /// Drops `position` and shifts every later position down by one.
    pub fn remove_position(&mut self, position: usize) {
        let tail = self.entries.split_off(&position);
        for (pos, bookmarks) in tail {
            if pos > position {
                self.entries.insert(pos - 1, bookmarks);
            }
        }
    }

    /// Bookmarks recorded at `position`.
    #[must_use]
    pub fn at(&self, position: usize) -> &[Bookmark] {
        self.entries.get(&position).map_or(&[], Vec::as_slice)
    }

    /// Every bookmark in position order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Bookmark)> {
        self.entries
            .iter()
            .flat_map(|(pos, bookmarks)| bookmarks.iter().map(move |b| (*pos, b)))
    }

    /// Bookmarks passing `filter`, in position order.
    pub fn filtered(&self, filter: BookmarkFilter) -> impl Iterator<Item = (usize, &Bookmark)> {
        self.iter().filter(move |(_, b)| filter.accepts(b.kind))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of bookmarks across all positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}
