//! Abstract hypergraph store interface.
//!
//! The coreference engine consumes exactly this surface. Any backend (the
//! in-memory one shipped here, or a persistent database) can sit behind it.

use thiserror::Error;

use crate::edge::Edge;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Edge not found.
    #[error("Edge not found: {0}")]
    EdgeNotFound(Edge),

    /// Pattern cannot be evaluated by this backend.
    #[error("Invalid search pattern {pattern}: {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: Edge,
        /// Why it was rejected.
        reason: String,
    },

    /// Attribute exists but does not hold a string.
    #[error("Attribute '{key}' on {edge} is not a string")]
    AttributeType {
        /// The edge carrying the attribute.
        edge: Edge,
        /// The attribute key.
        key: String,
    },

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

/// Storage trait for hypergraph operations.
///
/// Implementations own their concurrency model. The engine issues calls one at
/// a time and assumes nothing about atomicity across calls.
pub trait HypergraphStore: Send + Sync {
    /// Returns true if the edge is stored.
    fn exists(&self, edge: &Edge) -> Result<bool, StorageError>;

    /// Adds an edge. `primary = false` marks it as derived metadata.
    fn add(&self, edge: &Edge, primary: bool) -> Result<(), StorageError>;

    /// Removes an edge. Removing an absent edge is not an error.
    fn remove(&self, edge: &Edge) -> Result<(), StorageError>;

    /// Finds stored edges matching a wildcard pattern (see [`crate::pattern`]).
    /// `strict` requires an exact arity match.
    fn search(&self, pattern: &Edge, strict: bool) -> Result<Vec<Edge>, StorageError>;

    /// Finds hyperedges that contain every given edge as a direct element,
    /// in any position.
    fn edges_with_edges(&self, elements: &[Edge]) -> Result<Vec<Edge>, StorageError>;

    /// Number of stored hyperedges the edge participates in.
    fn degree(&self, edge: &Edge) -> Result<usize, StorageError>;

    /// Reads a string attribute.
    fn get_str_attribute(&self, edge: &Edge, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a string attribute.
    fn set_attribute(&self, edge: &Edge, key: &str, value: &str) -> Result<(), StorageError>;
}
