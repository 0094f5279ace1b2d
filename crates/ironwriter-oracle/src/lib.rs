//! IronWriter — oracle tables.
//!
//! Oracles are weighted random-answer tables consulted for narrative
//! prompts. A table is a tree of literals, concatenated sequences and
//! percentile ranges resolved with a d100 from the injected RNG.

pub mod domain;
pub mod error;

pub use domain::book::OracleBook;
pub use domain::entry::OracleEntry;
pub use error::OracleError;
