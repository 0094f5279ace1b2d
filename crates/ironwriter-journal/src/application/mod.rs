//! Journal application services.

pub mod command_handlers;
pub mod document;
pub mod query_handlers;
