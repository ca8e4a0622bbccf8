//! # hgcoref - coreference groups over a hypergraph
//!
//! hgcoref records that entities stored in a hypergraph refer to the same
//! thing, keeps every group tagged with a shared identifier, and picks a
//! canonical ("main") representative for each group.
//!
//! ## Core Concepts
//!
//! - **Edge**: an atom or hyperedge; the unit of identity in the store
//! - **Coreference link**: `(coref/J/. a b)`, stored as a non-primary edge
//! - **Group identifier**: a short string attribute shared by every member
//! - **Main coref**: `(main-coref/J/. id representative)`, the member with the highest degree
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use hgcoref::{CorefEngine, Edge, HypergraphStore, InMemoryHypergraph};
//!
//! let store = Arc::new(InMemoryHypergraph::new());
//! store.add(&Edge::parse("(love/P i/C (of/B city/C paris/C))")?, true)?;
//! store.add(&Edge::parse("(hate/P i/C (of/B city/C paris/C))")?, true)?;
//!
//! let engine = CorefEngine::new(store);
//! let paris = Edge::atom("paris/C");
//! let city = Edge::parse("(of/B city/C paris/C)")?;
//!
//! engine.make_corefs(&paris, &city)?;
//! assert!(engine.are_corefs(&city, &paris)?);
//! assert_eq!(engine.main_coref(&paris)?, city);
//! # Ok::<(), hgcoref::CorefError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod coref;
pub mod edge;
pub mod error;
pub mod ingest;
pub mod pattern;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use config::CorefConfig;
pub use coref::{
    CorefEngine, CorefIdGenerator, MergeOutcome, RandomIdGenerator, SequentialIdGenerator,
};
pub use edge::Edge;
pub use error::{CorefError, CorefResult, ValidationError};
pub use ingest::IngestReport;
pub use storage::{HypergraphStore, InMemoryHypergraph, StorageError};
