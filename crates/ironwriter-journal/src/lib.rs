//! IronWriter — Journal bounded context.
//!
//! Responsible for turning narrative entries into typed actions, keeping
//! the timeline of moments, and maintaining the character state as the
//! exact replay of every committed moment.

pub mod application;
pub mod domain;
