//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
///
/// Tag parsing and no-op domain operations never produce errors; only
/// addressing, persistence and import failures do.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No moment exists at the given history position.
    #[error("moment not found at position {0}")]
    MomentNotFound(usize),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// A session document was written with an unsupported schema version.
    #[error("unsupported session schema: expected version {expected}, found {found}")]
    UnsupportedSchema {
        /// The schema version this build understands.
        expected: u32,
        /// The schema version found in the document.
        found: u32,
    },

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
