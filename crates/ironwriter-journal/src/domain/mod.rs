//! Journal domain model.

pub mod actions;
pub mod bookmarks;
pub mod commands;
pub mod edit;
pub mod factory;
pub mod moment;
pub mod roll;
pub mod state;
pub mod tags;
pub mod timeline;
