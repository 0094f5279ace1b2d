//! Commands for the Journal context.

use ironwriter_core::command::Command;
use uuid::Uuid;

use super::moment::Category;
use super::roll::RollSource;
use super::state::Stat;

/// Command to discard the current session and start a fresh one.
#[derive(Debug, Clone)]
pub struct StartSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for StartSession {
    fn command_type(&self) -> &'static str {
        "journal.start_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to append a player entry.
#[derive(Debug, Clone)]
pub struct SubmitEntry {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Entry text, possibly containing command tags.
    pub text: String,
    /// Fiction or meta.
    pub category: Category,
}

impl Command for SubmitEntry {
    fn command_type(&self) -> &'static str {
        "journal.submit_entry"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to replace an existing entry.
#[derive(Debug, Clone)]
pub struct EditEntry {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// History position of the entry.
    pub index: usize,
    /// Replacement text.
    pub text: String,
    /// Replacement category.
    pub category: Category,
}

impl Command for EditEntry {
    fn command_type(&self) -> &'static str {
        "journal.edit_entry"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to delete an entry.
#[derive(Debug, Clone)]
pub struct DeleteEntry {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// History position of the entry.
    pub index: usize,
}

impl Command for DeleteEntry {
    fn command_type(&self) -> &'static str {
        "journal.delete_entry"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to redraw the dice or oracle answer of an entry.
#[derive(Debug, Clone)]
pub struct RerollEntry {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// History position of the entry.
    pub index: usize,
}

impl Command for RerollEntry {
    fn command_type(&self) -> &'static str {
        "journal.reroll_entry"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to make an action or progress roll.
#[derive(Debug, Clone)]
pub struct PerformRoll {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Stat added to the action value.
    pub stat: Option<Stat>,
    /// Flat modifier.
    pub add: i32,
    /// Action die or progress track.
    pub source: RollSource,
}

impl Command for PerformRoll {
    fn command_type(&self) -> &'static str {
        "journal.perform_roll"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to ask an oracle table.
#[derive(Debug, Clone)]
pub struct ConsultOracle {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Table name.
    pub table: String,
}

impl Command for ConsultOracle {
    fn command_type(&self) -> &'static str {
        "journal.consult_oracle"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to replace the session with an exported document.
#[derive(Debug, Clone)]
pub struct ImportSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Raw document, validated before anything is replaced.
    pub document: serde_json::Value,
}

impl Command for ImportSession {
    fn command_type(&self) -> &'static str {
        "journal.import_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
