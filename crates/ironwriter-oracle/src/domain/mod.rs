//! Oracle domain model.

pub mod book;
pub mod entry;
