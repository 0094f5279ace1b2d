//! Oracle error types.

use thiserror::Error;

/// Errors raised while loading or consulting oracle tables.
#[derive(Debug, Error)]
pub enum OracleError {
    /// No table with the requested name exists.
    #[error("unknown oracle table: {0}")]
    UnknownTable(String),

    /// A table failed structural validation.
    #[error("malformed oracle table: {0}")]
    Malformed(String),

    /// The oracle book could not be parsed.
    #[error("oracle book parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The oracle book could not be read.
    #[error("oracle book I/O error: {0}")]
    Io(#[from] std::io::Error),
}
