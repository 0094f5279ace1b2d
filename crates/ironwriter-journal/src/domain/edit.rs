//! In-progress edits of a journal entry.

use ironwriter_core::error::DomainError;
use uuid::Uuid;

use super::commands::EditEntry;
use super::moment::Category;
use super::timeline::Timeline;

/// An edit being composed against one history position.
///
/// Holding a draft never touches the timeline. Cancelling hands back the
/// input the player had before the edit began; committing yields the
/// command that applies the edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    index: usize,
    prior_input: String,
    /// Text being edited.
    pub text: String,
    /// Category being edited.
    pub category: Category,
}

impl EditDraft {
    /// Loads the entry at `index` for editing, remembering `current_input`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MomentNotFound` if `index` is out of range, or
    /// `DomainError::Validation` if the entry is not a fiction or meta entry.
    pub fn begin(
        timeline: &Timeline,
        index: usize,
        current_input: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let moment = timeline.moment(index)?;
        if !moment.category.is_editable() {
            return Err(DomainError::Validation(format!(
                "moment {index} cannot be edited"
            )));
        }
        Ok(Self {
            index,
            prior_input: current_input.into(),
            text: moment.text.clone(),
            category: moment.category,
        })
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Abandons the draft, returning the input it displaced.
    #[must_use]
    pub fn cancel(self) -> String {
        self.prior_input
    }

    /// Finishes the draft.
    #[must_use]
    pub fn commit(self, correlation_id: Uuid) -> EditEntry {
        EditEntry {
            correlation_id,
            index: self.index,
            text: self.text,
            category: self.category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::moment::Moment;

    fn timeline() -> Timeline {
        let mut timeline = Timeline::new_session(Uuid::new_v4());
        timeline.add_moment(Moment::from_entry("[bond Greta]", Category::Fiction));
        timeline
    }

    #[test]
    fn test_cancel_restores_prior_input_without_side_effects() {
        let timeline = timeline();
        let before = timeline.state().clone();

        let mut draft = EditDraft::begin(&timeline, 1, "half-typed note").unwrap();
        draft.text = "[unbond Greta]".to_owned();
        let restored = draft.cancel();

        assert_eq!(restored, "half-typed note");
        assert_eq!(timeline.state(), &before);
        assert_eq!(timeline.history()[1].text, "[bond Greta]");
    }

    #[test]
    fn test_commit_produces_edit_command() {
        let timeline = timeline();
        let correlation_id = Uuid::new_v4();

        let mut draft = EditDraft::begin(&timeline, 1, "").unwrap();
        assert_eq!(draft.text, "[bond Greta]");
        draft.category = Category::Meta;
        let command = draft.commit(correlation_id);

        assert_eq!(command.index, 1);
        assert_eq!(command.text, "[bond Greta]");
        assert_eq!(command.category, Category::Meta);
        assert_eq!(command.correlation_id, correlation_id);
    }

    #[test]
    fn test_setup_moment_cannot_be_drafted() {
        let result = EditDraft::begin(&timeline(), 0, "");

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
