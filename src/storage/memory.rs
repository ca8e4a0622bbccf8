//! In-memory storage backend.
//!
//! This module provides a thread-safe in-memory implementation of
//! [`HypergraphStore`]. It is intended for embedded usage, tests, and as a
//! reference implementation of the store contract.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use serde_json::Value;

use crate::edge::Edge;
use crate::pattern::{self, ELLIPSIS, WILDCARD};
use crate::storage::traits::{HypergraphStore, StorageError};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

#[derive(Debug, Default)]
struct EdgeRecord {
    primary: bool,
    attributes: BTreeMap<String, Value>,
}

#[derive(Debug, Default)]
struct GraphState {
    edges: BTreeMap<Edge, EdgeRecord>,
    // element -> stored hyperedges holding it as a direct element
    incidence: HashMap<Edge, BTreeSet<Edge>>,
    mutations: u64,
}

impl GraphState {
    /// Inserts `edge` and every missing sub-edge. Only `edge` itself receives
    /// the requested primary flag; sub-edges are added as non-primary.
    fn insert(&mut self, edge: &Edge, primary: bool) {
        if let Some(record) = self.edges.get_mut(edge) {
            if primary && !record.primary {
                record.primary = true;
                self.mutations += 1;
            }
            return;
        }

        let mut pending: Vec<(&Edge, bool)> = vec![(edge, primary)];
        while let Some((current, is_primary)) = pending.pop() {
            if self.edges.contains_key(current) {
                continue;
            }
            self.edges.insert(
                current.clone(),
                EdgeRecord {
                    primary: is_primary,
                    attributes: BTreeMap::new(),
                },
            );
            self.mutations += 1;

            let distinct: BTreeSet<&Edge> = current.elements().iter().collect();
            for element in distinct {
                self.incidence
                    .entry(element.clone())
                    .or_default()
                    .insert(current.clone());
                if !self.edges.contains_key(element) {
                    pending.push((element, false));
                }
            }
        }
    }

    fn delete(&mut self, edge: &Edge) -> bool {
        if self.edges.remove(edge).is_none() {
            return false;
        }

        let distinct: BTreeSet<&Edge> = edge.elements().iter().collect();
        for element in distinct {
            if let Some(holders) = self.incidence.get_mut(element) {
                holders.remove(edge);
                if holders.is_empty() {
                    self.incidence.remove(element);
                }
            }
        }
        self.mutations += 1;
        true
    }

    fn degree(&self, edge: &Edge) -> usize {
        self.incidence.get(edge).map_or(0, BTreeSet::len)
    }

    /// Picks a direct element of `pattern` whose incidence set bounds the
    /// candidates: any element that can only match itself.
    fn anchor<'a>(pattern: &'a Edge, strict: bool) -> Option<&'a Edge> {
        pattern.elements().iter().find(|element| match element {
            Edge::Atom(text) => {
                text != WILDCARD && text != ELLIPSIS && (strict || text.contains('/'))
            }
            Edge::Hyper(_) => !contains_wildcards(element, strict),
        })
    }
}

fn contains_wildcards(edge: &Edge, strict: bool) -> bool {
    match edge {
        Edge::Atom(text) => {
            text == WILDCARD || (!strict && (text == ELLIPSIS || !text.contains('/')))
        }
        Edge::Hyper(elements) => elements.iter().any(|e| contains_wildcards(e, strict)),
    }
}

/// Thread-safe in-memory hypergraph.
///
/// Degree counts the stored hyperedges that hold an edge as a direct element.
/// Attribute values are JSON; the coreference engine only ever reads and
/// writes strings.
#[derive(Debug, Default)]
pub struct InMemoryHypergraph {
    state: RwLock<GraphState>,
}

impl InMemoryHypergraph {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored edges, atoms included.
    ///
    /// # Errors
    /// Returns `BackendError` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("graph.len"))?;
        Ok(state.edges.len())
    }

    /// Returns true if nothing is stored.
    ///
    /// # Errors
    /// Returns `BackendError` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    /// Returns the primary flag of a stored edge, `None` if absent.
    ///
    /// # Errors
    /// Returns `BackendError` if the lock is poisoned.
    pub fn is_primary(&self, edge: &Edge) -> Result<Option<bool>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("graph.is_primary"))?;
        Ok(state.edges.get(edge).map(|r| r.primary))
    }

    /// All stored edges in `Edge` order.
    ///
    /// # Errors
    /// Returns `BackendError` if the lock is poisoned.
    pub fn edges(&self) -> Result<Vec<Edge>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("graph.edges"))?;
        Ok(state.edges.keys().cloned().collect())
    }

    /// Number of state changes applied so far.
    ///
    /// # Errors
    /// Returns `BackendError` if the lock is poisoned.
    pub fn mutation_count(&self) -> Result<u64, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("graph.mutation_count"))?;
        Ok(state.mutations)
    }

    /// Writes an arbitrary JSON attribute.
    ///
    /// # Errors
    /// Returns `BackendError` if the lock is poisoned.
    pub fn set_json_attribute(&self, edge: &Edge, key: &str, value: Value) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("graph.set_json_attribute"))?;
        state.insert(edge, false);
        if let Some(record) = state.edges.get_mut(edge) {
            record.attributes.insert(key.to_string(), value);
        }
        state.mutations += 1;
        Ok(())
    }
}

impl HypergraphStore for InMemoryHypergraph {
    fn exists(&self, edge: &Edge) -> Result<bool, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("graph.exists"))?;
        Ok(state.edges.contains_key(edge))
    }

    fn add(&self, edge: &Edge, primary: bool) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("graph.add"))?;
        state.insert(edge, primary);
        Ok(())
    }

    fn remove(&self, edge: &Edge) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("graph.remove"))?;
        state.delete(edge);
        Ok(())
    }

    fn search(&self, pattern: &Edge, strict: bool) -> Result<Vec<Edge>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("graph.search"))?;

        if let Some(anchor) = GraphState::anchor(pattern, strict) {
            return Ok(state
                .incidence
                .get(anchor)
                .map(|holders| {
                    holders
                        .iter()
                        .filter(|edge| pattern::matches(pattern, edge, strict))
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default());
        }

        Ok(state
            .edges
            .keys()
            .filter(|edge| pattern::matches(pattern, edge, strict))
            .cloned()
            .collect())
    }

    fn edges_with_edges(&self, elements: &[Edge]) -> Result<Vec<Edge>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("graph.edges_with_edges"))?;

        let mut sets = Vec::with_capacity(elements.len());
        for element in elements {
            match state.incidence.get(element) {
                Some(holders) => sets.push(holders),
                None => return Ok(Vec::new()),
            }
        }
        sets.sort_by_key(|s| s.len());

        let Some((smallest, rest)) = sets.split_first() else {
            return Ok(Vec::new());
        };
        Ok(smallest
            .iter()
            .filter(|edge| rest.iter().all(|s| s.contains(*edge)))
            .cloned()
            .collect())
    }

    fn degree(&self, edge: &Edge) -> Result<usize, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("graph.degree"))?;
        Ok(state.degree(edge))
    }

    fn get_str_attribute(&self, edge: &Edge, key: &str) -> Result<Option<String>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("graph.get_str_attribute"))?;
        let Some(value) = state.edges.get(edge).and_then(|r| r.attributes.get(key)) else {
            return Ok(None);
        };
        match value {
            Value::String(s) => Ok(Some(s.clone())),
            _ => Err(StorageError::AttributeType {
                edge: edge.clone(),
                key: key.to_string(),
            }),
        }
    }

    fn set_attribute(&self, edge: &Edge, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_json_attribute(edge, key, Value::String(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(text: &str) -> Edge {
        Edge::parse(text).unwrap()
    }

    #[test]
    fn add_inserts_sub_edges_as_non_primary() {
        let store = InMemoryHypergraph::new();
        store.add(&e("(love/P i/C (of/B city/C paris/C))"), true).unwrap();

        assert_eq!(store.is_primary(&e("(love/P i/C (of/B city/C paris/C))")).unwrap(), Some(true));
        assert_eq!(store.is_primary(&e("(of/B city/C paris/C)")).unwrap(), Some(false));
        assert_eq!(store.is_primary(&e("paris/C")).unwrap(), Some(false));
        assert!(store.exists(&e("love/P")).unwrap());
        assert_eq!(store.len().unwrap(), 7);
    }

    #[test]
    fn primary_add_upgrades_existing_edge() {
        let store = InMemoryHypergraph::new();
        store.add(&e("(a/C b/C)"), false).unwrap();
        let before = store.mutation_count().unwrap();

        store.add(&e("(a/C b/C)"), false).unwrap();
        assert_eq!(store.mutation_count().unwrap(), before);

        store.add(&e("(a/C b/C)"), true).unwrap();
        assert_eq!(store.is_primary(&e("(a/C b/C)")).unwrap(), Some(true));
        assert_eq!(store.mutation_count().unwrap(), before + 1);
    }

    #[test]
    fn degree_counts_direct_holders() {
        let store = InMemoryHypergraph::new();
        store.add(&e("(love/P i/C (of/B city/C paris/C))"), true).unwrap();
        store.add(&e("(hate/P i/C (of/B city/C paris/C))"), true).unwrap();

        assert_eq!(store.degree(&e("(of/B city/C paris/C)")).unwrap(), 2);
        assert_eq!(store.degree(&e("i/C")).unwrap(), 2);
        assert_eq!(store.degree(&e("paris/C")).unwrap(), 1);
        assert_eq!(store.degree(&e("(love/P i/C (of/B city/C paris/C))")).unwrap(), 0);
        assert_eq!(store.degree(&e("berlin/C")).unwrap(), 0);

        // repeated elements count once
        store.add(&e("(same/P x/C x/C)"), true).unwrap();
        assert_eq!(store.degree(&e("x/C")).unwrap(), 1);
    }

    #[test]
    fn remove_updates_degree_and_keeps_sub_edges() {
        let store = InMemoryHypergraph::new();
        let edge = e("(love/P i/C paris/C)");
        store.add(&edge, true).unwrap();
        store.set_attribute(&edge, "k", "v").unwrap();

        store.remove(&edge).unwrap();
        assert!(!store.exists(&edge).unwrap());
        assert!(store.exists(&e("paris/C")).unwrap());
        assert_eq!(store.degree(&e("paris/C")).unwrap(), 0);

        // attributes do not survive removal
        store.add(&edge, true).unwrap();
        assert_eq!(store.get_str_attribute(&edge, "k").unwrap(), None);

        // absent edge is a no-op
        let before = store.mutation_count().unwrap();
        store.remove(&e("(nothing/P here/C)")).unwrap();
        assert_eq!(store.mutation_count().unwrap(), before);
    }

    #[test]
    fn edges_with_edges_requires_all_elements() {
        let store = InMemoryHypergraph::new();
        store.add(&e("(coref/J/. a/C b/C)"), false).unwrap();
        store.add(&e("(coref/J/. b/C c/C)"), false).unwrap();
        store.add(&e("(other/J/. a/C b/C)"), false).unwrap();

        let found = store
            .edges_with_edges(&[e("coref/J/."), e("b/C")])
            .unwrap();
        assert_eq!(found, vec![e("(coref/J/. a/C b/C)"), e("(coref/J/. b/C c/C)")]);

        let found = store.edges_with_edges(&[e("a/C"), e("b/C")]).unwrap();
        assert_eq!(found.len(), 2);

        assert!(store.edges_with_edges(&[e("zzz/C")]).unwrap().is_empty());
        assert!(store.edges_with_edges(&[]).unwrap().is_empty());
    }

    #[test]
    fn search_with_anchor_and_full_scan() {
        let store = InMemoryHypergraph::new();
        store.add(&e("(main-coref/J/. abc paris/C)"), false).unwrap();
        store.add(&e("(main-coref/J/. xyz berlin/C)"), false).unwrap();
        store.add(&e("(main-coref/J/. abc x/C y/C)"), false).unwrap();

        let found = store.search(&e("(main-coref/J/. abc *)"), true).unwrap();
        assert_eq!(found, vec![e("(main-coref/J/. abc paris/C)")]);

        let found = store.search(&e("(* * *)"), true).unwrap();
        assert_eq!(found.len(), 2);

        let found = store.search(&e("(main-coref/J/. ...)"), false).unwrap();
        assert_eq!(found.len(), 3);

        let found = store.search(&e("(main-coref/J/. * berlin)"), false).unwrap();
        assert_eq!(found, vec![e("(main-coref/J/. xyz berlin/C)")]);
    }

    #[test]
    fn attributes_are_upserted_and_typed() {
        let store = InMemoryHypergraph::new();
        let concept = e("(of/B capital/C france/C)");

        assert_eq!(store.get_str_attribute(&concept, "coref_id").unwrap(), None);
        store.set_attribute(&concept, "coref_id", "abc").unwrap();
        assert!(store.exists(&concept).unwrap());
        assert_eq!(store.is_primary(&concept).unwrap(), Some(false));
        assert_eq!(
            store.get_str_attribute(&concept, "coref_id").unwrap().as_deref(),
            Some("abc")
        );

        store
            .set_json_attribute(&concept, "count", serde_json::json!(3))
            .unwrap();
        assert!(matches!(
            store.get_str_attribute(&concept, "count"),
            Err(StorageError::AttributeType { .. })
        ));
    }
}
