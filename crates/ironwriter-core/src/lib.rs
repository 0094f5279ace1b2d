//! IronWriter Core — shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that the journal
//! engine, the oracle tables and the storage adapters depend on. It contains
//! no infrastructure code beyond the production RNG.

pub mod clock;
pub mod command;
pub mod error;
pub mod repository;
pub mod rng;
