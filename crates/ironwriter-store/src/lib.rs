//! IronWriter — session persistence.
//!
//! Stores a whole session as one JSON document on disk, replacing it
//! atomically on every save.

pub mod json_file_store;
