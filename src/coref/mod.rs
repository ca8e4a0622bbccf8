//! Coreference groups over a hypergraph store.
//!
//! This module groups the engine and the identifier generators it is
//! parameterized with.

pub mod engine;
pub mod id;

pub use engine::{CorefEngine, MergeOutcome};
pub use id::{CorefIdGenerator, RandomIdGenerator, SequentialIdGenerator};
