//! A named collection of oracle tables.

use std::collections::BTreeMap;
use std::path::Path;

use ironwriter_core::rng::DeterministicRng;
use serde::Deserialize;
use tracing::debug;

use super::entry::OracleEntry;
use crate::error::OracleError;

const BUILTIN_BOOK: &str = include_str!("../../data/oracles.yaml");

/// Oracle tables keyed by display name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct OracleBook {
    tables: BTreeMap<String, OracleEntry>,
}

impl OracleBook {
    /// Parses a book from YAML (JSON is accepted as a YAML subset).
    ///
    /// # Errors
    ///
    /// Returns `OracleError::Parse` if the document is not a map of valid
    /// tables, and `OracleError::Malformed` if it contains no tables.
    pub fn from_yaml_str(source: &str) -> Result<Self, OracleError> {
        let book: Self = serde_yaml::from_str(source)?;
        if book.tables.is_empty() {
            return Err(OracleError::Malformed("oracle book has no tables".to_owned()));
        }
        debug!(tables = book.tables.len(), "loaded oracle book");
        Ok(book)
    }

    /// Reads and parses a book from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::Io` if the file cannot be read, or any error
    /// from [`OracleBook::from_yaml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, OracleError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    /// The book bundled with the engine.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled YAML is invalid.
    pub fn builtin() -> Result<Self, OracleError> {
        Self::from_yaml_str(BUILTIN_BOOK)
    }

    /// Table names in sorted order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Returns the named table.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&OracleEntry> {
        self.tables.get(name)
    }

    /// Consults the named table, walking it down to a single answer.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::UnknownTable` if no table has that name.
    pub fn consult(
        &self,
        name: &str,
        rng: &mut dyn DeterministicRng,
    ) -> Result<String, OracleError> {
        let table = self
            .table(name)
            .ok_or_else(|| OracleError::UnknownTable(name.to_owned()))?;
        Ok(table.resolve(rng))
    }
}
