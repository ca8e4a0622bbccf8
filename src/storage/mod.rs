//! Hypergraph storage for hgcoref.
//!
//! The trait defines the store surface the coreference engine consumes;
//! `memory` provides the thread-safe reference backend.

mod memory;
mod traits;

pub use memory::InMemoryHypergraph;
pub use traits::{HypergraphStore, StorageError};
