//! Shared test mocks and utilities for the IronWriter journal engine.

mod clock;
mod rng;
mod store;

pub use clock::FixedClock;
pub use rng::{MockRng, SequenceRng};
pub use store::{FailingSessionStore, InMemorySessionStore};
