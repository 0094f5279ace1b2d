//! Route modules.

pub mod health;
pub mod oracle;
pub mod session;
