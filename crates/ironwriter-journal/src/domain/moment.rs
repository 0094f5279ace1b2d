//! Moments: one committed unit of journal history.

use ironwriter_core::error::DomainError;
use ironwriter_core::rng::DeterministicRng;
use ironwriter_oracle::OracleBook;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::actions::{Action, ActionContext, Adjustment, oracle_text};
use super::bookmarks::BookmarkIndex;
use super::factory::actions_for_entry;
use super::roll::Roll;
use super::state::{GameState, Stat};

/// Display name given to a fresh character.
pub const DEFAULT_CHARACTER_NAME: &str = "New Character";

/// Kind of entry a moment records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Engine-generated setup, hidden from readers.
    #[default]
    None,
    Fiction,
    Meta,
    /// Dice rolls and oracle answers.
    Roll,
}

impl Category {
    /// Whether entries of this category are written by the player and may be
    /// edited.
    #[must_use]
    pub fn is_editable(self) -> bool {
        matches!(self, Category::Fiction | Category::Meta)
    }
}

/// A history entry: its text, category and ordered actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Moment {
    pub text: String,
    pub category: Category,
    pub actions: Vec<Action>,
    /// State immediately before the most recent application.
    #[serde(skip)]
    snapshot: Option<GameState>,
}

impl PartialEq for Moment {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.category == other.category && self.actions == other.actions
    }
}

impl Eq for Moment {}

impl Moment {
    #[must_use]
    pub fn new(text: impl Into<String>, category: Category, actions: Vec<Action>) -> Self {
        Self {
            text: text.into(),
            category,
            actions,
            snapshot: None,
        }
    }

    /// Parses a player entry into a moment.
    #[must_use]
    pub fn from_entry(text: impl Into<String>, category: Category) -> Self {
        let text = text.into();
        let actions = actions_for_entry(&text, category);
        Self::new(text, category, actions)
    }

    /// The setup moment every new session starts with.
    #[must_use]
    pub fn initial() -> Self {
        let set = |stat, value| Action::Stat {
            stat,
            adjustment: Adjustment::Set(value),
        };
        Self::new(
            "",
            Category::None,
            vec![
                Action::Rename {
                    name: DEFAULT_CHARACTER_NAME.to_owned(),
                },
                set(Stat::Momentum, 2),
                set(Stat::MomentumReset, 2),
                set(Stat::MomentumMax, 10),
                set(Stat::Health, 5),
                set(Stat::Supply, 5),
                set(Stat::Spirit, 5),
            ],
        )
    }

    /// A roll moment. Its text is rendered when it is applied.
    #[must_use]
    pub fn roll(roll: Roll) -> Self {
        Self::new("", Category::Roll, vec![Action::Roll(roll)])
    }

    /// An oracle moment carrying a resolved answer.
    #[must_use]
    pub fn oracle(table: impl Into<String>, answer: impl Into<String>) -> Self {
        let table = table.into();
        let answer = answer.into();
        Self::new(
            oracle_text(&table, &answer),
            Category::Roll,
            vec![Action::Oracle { table, answer }],
        )
    }

    /// The state captured before the last application, if applied.
    #[must_use]
    pub fn snapshot(&self) -> Option<&GameState> {
        self.snapshot.as_ref()
    }

    /// Whether this moment holds dice or oracle answers that can be redrawn.
    #[must_use]
    pub fn is_rerollable(&self) -> bool {
        self.actions
            .iter()
            .any(|a| matches!(a, Action::Roll(_) | Action::Oracle { .. }))
    }

    /// Snapshots `state`, then applies every action in order.
    pub fn apply_moment(
        &mut self,
        state: &mut GameState,
        position: usize,
        bookmarks: &mut BookmarkIndex,
    ) {
        let snapshot = state.clone();
        let mut text = None;
        {
            let mut ctx = ActionContext {
                position,
                snapshot: &snapshot,
                bookmarks,
            };
            for action in &self.actions {
                if let Some(rendered) = action.apply(state, &mut ctx) {
                    text = Some(rendered);
                }
            }
        }
        if let Some(text) = text {
            self.text = text;
        }
        self.snapshot = Some(snapshot);
    }

    /// Reverses every action in order, restoring the snapshot fields each
    /// one touched.
    pub fn unapply_moment(
        &self,
        state: &mut GameState,
        position: usize,
        bookmarks: &mut BookmarkIndex,
    ) {
        let Some(snapshot) = &self.snapshot else {
            warn!(position, "unapplying a moment that was never applied");
            return;
        };
        let mut ctx = ActionContext {
            position,
            snapshot,
            bookmarks,
        };
        for action in &self.actions {
            action.unapply(state, &mut ctx);
        }
    }

    /// Redraws the dice of every roll and re-walks every oracle table.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the moment holds nothing to
    /// redraw or an oracle table is no longer available.
    pub fn reroll(
        &mut self,
        rng: &mut dyn DeterministicRng,
        oracles: &OracleBook,
    ) -> Result<(), DomainError> {
        if !self.is_rerollable() {
            return Err(DomainError::Validation(
                "only roll and oracle moments can be rerolled".to_owned(),
            ));
        }
        for action in &mut self.actions {
            match action {
                Action::Roll(roll) => roll.reroll(rng),
                Action::Oracle { table, answer } => {
                    *answer = oracles
                        .consult(table, rng)
                        .map_err(|e| DomainError::Validation(e.to_string()))?;
                    self.text = oracle_text(table, answer);
                }
                _ => {}
            }
        }
        Ok(())
    }
}
