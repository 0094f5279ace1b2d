//! The timeline, aggregate root of a journal session.

use ironwriter_core::error::DomainError;
use ironwriter_core::rng::DeterministicRng;
use ironwriter_oracle::OracleBook;
use tracing::debug;
use uuid::Uuid;

use super::bookmarks::BookmarkIndex;
use super::moment::{Category, Moment};
use super::roll::{Roll, RollSource};
use super::state::{GameState, Stat};

/// Ordered moment history with a cursor.
///
/// The live state always equals applying `history[..=cursor]` in order to an
/// empty state. A cursor of `None` means nothing is applied.
#[derive(Debug, Clone)]
pub struct Timeline {
    session_id: Uuid,
    state: GameState,
    history: Vec<Moment>,
    cursor: Option<usize>,
    bookmarks: BookmarkIndex,
}

impl Timeline {
    /// An empty timeline.
    #[must_use]
    pub fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            state: GameState::default(),
            history: Vec::new(),
            cursor: None,
            bookmarks: BookmarkIndex::new(),
        }
    }

    /// A timeline holding only the setup moment.
    #[must_use]
    pub fn new_session(session_id: Uuid) -> Self {
        let mut timeline = Self::new(session_id);
        timeline.add_moment(Moment::initial());
        timeline
    }

    /// Rebuilds a timeline by replaying `history` from an empty state.
    #[must_use]
    pub fn from_history(session_id: Uuid, history: Vec<Moment>) -> Self {
        let mut timeline = Self::new(session_id);
        timeline.history = history;
        timeline.goto_present();
        timeline
    }

    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn history(&self) -> &[Moment] {
        &self.history
    }

    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[must_use]
    pub fn bookmarks(&self) -> &BookmarkIndex {
        &self.bookmarks
    }

    /// Position of the last moment, or `None` when the history is empty.
    #[must_use]
    pub fn present(&self) -> Option<usize> {
        self.history.len().checked_sub(1)
    }

    #[must_use]
    pub fn is_at_present(&self) -> bool {
        self.cursor == self.present()
    }

    /// Returns the moment at `index`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MomentNotFound` if `index` is out of range.
    pub fn moment(&self, index: usize) -> Result<&Moment, DomainError> {
        self.history
            .get(index)
            .ok_or(DomainError::MomentNotFound(index))
    }

    /// Appends `moment` and applies it, returning its position.
    pub fn add_moment(&mut self, mut moment: Moment) -> usize {
        self.goto_present();
        let position = self.history.len();
        moment.apply_moment(&mut self.state, position, &mut self.bookmarks);
        self.history.push(moment);
        self.cursor = Some(position);
        position
    }

    /// Replaces the moment at `index` without replaying anything.
    ///
    /// The cursor must already be before `index`, so the new moment takes
    /// its snapshot when the timeline next moves forward.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MomentNotFound` if `index` is out of range, or
    /// `DomainError::Validation` if the moment at `index` is still applied.
    pub fn update_moment(&mut self, index: usize, moment: Moment) -> Result<(), DomainError> {
        let slot = self
            .history
            .get_mut(index)
            .ok_or(DomainError::MomentNotFound(index))?;
        if self.cursor.is_some_and(|cursor| cursor >= index) {
            return Err(DomainError::Validation(format!(
                "moment {index} is applied; rewind before replacing it"
            )));
        }
        *slot = moment;
        Ok(())
    }

    /// Rewinds to just before `index`, replaces the moment and replays to
    /// the present.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MomentNotFound` if `index` is out of range, or
    /// `DomainError::Validation` unless both the existing and the new moment
    /// are player entries.
    pub fn edit_moment(&mut self, index: usize, moment: Moment) -> Result<(), DomainError> {
        let current = self.moment(index)?;
        if !current.category.is_editable() || !moment.category.is_editable() {
            return Err(DomainError::Validation(format!(
                "moment {index} is not a fiction or meta entry"
            )));
        }
        self.goto_moment(index.checked_sub(1))?;
        let result = self.update_moment(index, moment);
        self.goto_present();
        result
    }

    /// Removes the moment at `index`, shifting later bookmarks down, and
    /// replays the remainder.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MomentNotFound` if `index` is out of range, or
    /// `DomainError::Validation` for the setup moment.
    pub fn remove_moment(&mut self, index: usize) -> Result<Moment, DomainError> {
        if self.moment(index)?.category == Category::None {
            return Err(DomainError::Validation(
                "the setup moment cannot be deleted".to_owned(),
            ));
        }
        self.goto_moment(index.checked_sub(1))?;
        let removed = self.history.remove(index);
        self.bookmarks.remove_position(index);
        self.goto_present();
        Ok(removed)
    }

    /// Moves the cursor to `target`, unapplying moments in descending order
    /// or applying them in ascending order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MomentNotFound` if `target` is past the end of
    /// the history.
    pub fn goto_moment(&mut self, target: Option<usize>) -> Result<(), DomainError> {
        if let Some(index) = target.filter(|index| *index >= self.history.len()) {
            return Err(DomainError::MomentNotFound(index));
        }
        self.move_cursor(target);
        Ok(())
    }

    /// Replays every moment after the cursor.
    pub fn goto_present(&mut self) {
        self.move_cursor(self.present());
    }

    /// `target` must be `None` or a position inside the history.
    fn move_cursor(&mut self, target: Option<usize>) {
        if target != self.cursor {
            debug!(from = ?self.cursor, to = ?target, "moving timeline cursor");
        }
        while self.cursor > target {
            let Some(current) = self.cursor else { break };
            self.history[current].unapply_moment(&mut self.state, current, &mut self.bookmarks);
            self.cursor = current.checked_sub(1);
        }
        while self.cursor < target {
            let next = self.cursor.map_or(0, |cursor| cursor + 1);
            self.history[next].apply_moment(&mut self.state, next, &mut self.bookmarks);
            self.cursor = Some(next);
        }
    }

    /// Redraws the dice or oracle answer of the moment at `index` and
    /// replays to the present. History length and positions are unchanged.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MomentNotFound` if `index` is out of range, or
    /// `DomainError::Validation` if the moment has nothing to redraw.
    pub fn reroll_moment(
        &mut self,
        index: usize,
        rng: &mut dyn DeterministicRng,
        oracles: &OracleBook,
    ) -> Result<(), DomainError> {
        if !self.moment(index)?.is_rerollable() {
            return Err(DomainError::Validation(format!(
                "moment {index} has no dice or oracle answer to reroll"
            )));
        }
        self.goto_moment(index.checked_sub(1))?;
        let result = self.history[index].reroll(rng, oracles);
        self.goto_present();
        result
    }

    /// Rolls and records a roll moment, returning its position.
    ///
    /// A progress source naming a track that does not exist records nothing.
    pub fn roll(
        &mut self,
        stat: Option<Stat>,
        add: i32,
        source: RollSource,
        rng: &mut dyn DeterministicRng,
    ) -> Option<usize> {
        self.goto_present();
        let unknown_track = matches!(
            &source,
            RollSource::Progress { id } if !self.state.progress.contains_key(id)
        );
        if unknown_track {
            debug!(?source, "roll requested against an unknown progress track");
            return None;
        }
        let roll = Roll::new(stat, add, source, rng);
        Some(self.add_moment(Moment::roll(roll)))
    }

    /// Consults an oracle table and records the answer, returning its
    /// position.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the table does not exist.
    pub fn consult_oracle(
        &mut self,
        table: &str,
        rng: &mut dyn DeterministicRng,
        oracles: &OracleBook,
    ) -> Result<usize, DomainError> {
        let answer = oracles
            .consult(table, rng)
            .map_err(|e| DomainError::Validation(e.to_string()))?;
        Ok(self.add_moment(Moment::oracle(table, answer)))
    }
}
