//! The coreference engine.
//!
//! Direct coreference is recorded as link edges `(coref-connector a b)`; a
//! group is the transitive closure of those links. Every member carries the
//! group identifier as an attribute, and the group's canonical representative
//! is recorded as a marker edge `(main-coref-connector id representative)`.
//!
//! The engine does no locking. A merge is a sequence of independent store
//! calls (read ids, re-tag members, add the link, refresh the marker), so
//! concurrent merges over overlapping groups must be serialized by the caller.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::config::CorefConfig;
use crate::coref::id::{CorefIdGenerator, RandomIdGenerator};
use crate::edge::Edge;
use crate::error::{CorefError, CorefResult};
use crate::pattern::WILDCARD;
use crate::storage::HypergraphStore;

/// What a call to [`CorefEngine::make_corefs`] changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Identifier shared by the merged group.
    pub coref_id: String,
    /// Number of identifier attributes written.
    pub retagged: usize,
    /// Whether the canonical marker was replaced.
    pub main_updated: bool,
}

/// Coreference engine over a hypergraph store.
#[derive(Clone)]
pub struct CorefEngine {
    store: Arc<dyn HypergraphStore>,
    ids: Arc<dyn CorefIdGenerator>,
    config: CorefConfig,
    coref_connector: Edge,
    main_coref_connector: Edge,
}

impl CorefEngine {
    /// Create an engine with the default configuration and random identifiers.
    #[must_use]
    pub fn new(store: Arc<dyn HypergraphStore>) -> Self {
        let config = CorefConfig::default();
        Self {
            coref_connector: config.coref_connector_edge(),
            main_coref_connector: config.main_coref_connector_edge(),
            store,
            ids: Arc::new(RandomIdGenerator::new()),
            config,
        }
    }

    /// Create an engine with an explicit identifier source and configuration.
    ///
    /// # Errors
    /// Returns a validation error if the configuration is invalid.
    pub fn with_config(
        store: Arc<dyn HypergraphStore>,
        ids: Arc<dyn CorefIdGenerator>,
        config: CorefConfig,
    ) -> CorefResult<Self> {
        config.validate()?;
        Ok(Self {
            coref_connector: config.coref_connector_edge(),
            main_coref_connector: config.main_coref_connector_edge(),
            store,
            ids,
            config,
        })
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn HypergraphStore> {
        &self.store
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &CorefConfig {
        &self.config
    }

    /// Entities directly linked to `edge` by a coreference link.
    fn linked(&self, edge: &Edge) -> CorefResult<Vec<Edge>> {
        let links = self
            .store
            .edges_with_edges(&[self.coref_connector.clone(), edge.clone()])?;

        let mut out = Vec::with_capacity(links.len() * 2);
        for link in links {
            if let [connector, a, b] = link.elements() {
                if *connector == self.coref_connector {
                    out.push(a.clone());
                    out.push(b.clone());
                }
            }
        }
        Ok(out)
    }

    /// Returns every entity reachable from `edge` through coreference links,
    /// `edge` included.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn coref_set(&self, edge: &Edge) -> CorefResult<BTreeSet<Edge>> {
        let mut visited = BTreeSet::from([edge.clone()]);
        let mut stack = vec![edge.clone()];

        while let Some(current) = stack.pop() {
            for item in self.linked(&current)? {
                if !visited.contains(&item) {
                    trace!(from = %current, to = %item, "coref link");
                    visited.insert(item.clone());
                    stack.push(item);
                }
            }
        }
        Ok(visited)
    }

    /// Returns true if `edge2` is reachable from `edge1`. Stops as soon as
    /// `edge2` is discovered. An entity is always coreferent with itself.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn are_corefs(&self, edge1: &Edge, edge2: &Edge) -> CorefResult<bool> {
        if edge1 == edge2 {
            return Ok(true);
        }

        let mut visited = BTreeSet::from([edge1.clone()]);
        let mut stack = vec![edge1.clone()];

        while let Some(current) = stack.pop() {
            for item in self.linked(&current)? {
                if visited.contains(&item) {
                    continue;
                }
                if item == *edge2 {
                    return Ok(true);
                }
                visited.insert(item.clone());
                stack.push(item);
            }
        }
        Ok(false)
    }

    /// The group identifier stored on `edge`, if any.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn coref_id(&self, edge: &Edge) -> CorefResult<Option<String>> {
        Ok(self.store.get_str_attribute(edge, &self.config.coref_id_key)?)
    }

    fn marker_pattern(&self, coref_id: &str) -> Edge {
        Edge::hyper([
            self.main_coref_connector.clone(),
            Edge::atom(coref_id),
            Edge::atom(WILDCARD),
        ])
    }

    /// The canonical representative recorded for a group identifier.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn main_coref_from_id(&self, coref_id: &str) -> CorefResult<Option<Edge>> {
        let markers = self.store.search(&self.marker_pattern(coref_id), true)?;
        Ok(markers
            .into_iter()
            .next()
            .and_then(|marker| marker.elements().get(2).cloned()))
    }

    /// The canonical representative of the group `edge` belongs to, or `edge`
    /// itself when it belongs to no group.
    ///
    /// A group whose marker has gone missing also resolves to `edge`.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn main_coref(&self, edge: &Edge) -> CorefResult<Edge> {
        let Some(coref_id) = self.coref_id(edge)? else {
            return Ok(edge.clone());
        };

        match self.main_coref_from_id(&coref_id)? {
            Some(main) => Ok(main),
            None => {
                warn!(edge = %edge, coref_id = %coref_id, "coref group has no main marker");
                Ok(edge.clone())
            }
        }
    }

    fn fresh_id(&self) -> CorefResult<String> {
        let attempts = if self.config.check_id_collisions {
            self.config.max_id_attempts
        } else {
            1
        };

        for _ in 0..attempts {
            let id = self.ids.generate(self.config.id_length);
            if !self.config.check_id_collisions || self.main_coref_from_id(&id)?.is_none() {
                return Ok(id);
            }
            debug!(coref_id = %id, "generated coref id already in use");
        }
        Err(CorefError::IdExhausted { attempts })
    }

    fn retag(&self, edge: &Edge, coref_id: &str) -> CorefResult<usize> {
        let members = self.coref_set(edge)?;
        for member in &members {
            self.store
                .set_attribute(member, &self.config.coref_id_key, coref_id)?;
        }
        Ok(members.len())
    }

    fn remove_markers(&self, coref_id: &str) -> CorefResult<usize> {
        let markers = self.store.search(&self.marker_pattern(coref_id), true)?;
        for marker in &markers {
            self.store.remove(marker)?;
        }
        Ok(markers.len())
    }

    /// Makes `edge1` and `edge2` coreferent, fusing their groups.
    ///
    /// The adopted identifier is a fresh one if neither side has one, the
    /// existing one if only one side does, and otherwise the identifier of
    /// the larger group (ties go to `edge1`). Every group whose identifier
    /// changes is re-tagged, the link edge is recorded, and the canonical
    /// representative is recomputed if anything was re-tagged.
    ///
    /// # Errors
    /// Propagates store failures; steps already applied are not rolled back.
    pub fn make_corefs(&self, edge1: &Edge, edge2: &Edge) -> CorefResult<MergeOutcome> {
        let id1 = self.coref_id(edge1)?;
        let id2 = self.coref_id(edge2)?;

        let adopted = match (&id1, &id2) {
            (None, None) => self.fresh_id()?,
            (Some(id), None) | (None, Some(id)) => id.clone(),
            (Some(a), Some(b)) if a == b => a.clone(),
            (Some(a), Some(b)) => {
                let count1 = self.coref_set(edge1)?.len();
                let count2 = self.coref_set(edge2)?.len();
                debug!(id1 = %a, count1, id2 = %b, count2, "fusing coref groups");
                if count2 > count1 {
                    b.clone()
                } else {
                    a.clone()
                }
            }
        };

        let mut retagged = 0;
        let mut changed = false;
        let mut abandoned = Vec::new();
        for (edge, prior) in [(edge1, &id1), (edge2, &id2)] {
            if prior.as_deref() == Some(adopted.as_str()) {
                continue;
            }
            retagged += self.retag(edge, &adopted)?;
            changed = true;
            if let Some(old) = prior {
                abandoned.push(old.clone());
            }
        }

        let link = Edge::hyper([self.coref_connector.clone(), edge1.clone(), edge2.clone()]);
        self.store.add(&link, false)?;
        debug!(%link, coref_id = %adopted, retagged, "recorded coref link");

        if self.config.prune_orphan_markers {
            for old in &abandoned {
                let removed = self.remove_markers(old)?;
                debug!(coref_id = %old, removed, "pruned markers of abandoned coref id");
            }
        }

        let main_updated = if changed {
            self.update_main_coref(edge1)?
        } else {
            false
        };

        Ok(MergeOutcome {
            coref_id: adopted,
            retagged,
            main_updated,
        })
    }

    /// Points the group's canonical marker at the member with the highest
    /// store degree. Among equal degrees the smallest member in `Edge` order
    /// wins. Returns true if the marker was replaced.
    ///
    /// Only merges call this automatically, so the marker can lag behind
    /// degree changes made directly through the store until the next merge
    /// or an explicit call.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn update_main_coref(&self, edge: &Edge) -> CorefResult<bool> {
        let Some(coref_id) = self.coref_id(edge)? else {
            debug!(edge = %edge, "no coref id; nothing to update");
            return Ok(false);
        };

        let mut best: Option<(Edge, usize)> = None;
        for member in self.coref_set(edge)? {
            let degree = self.store.degree(&member)?;
            if best.as_ref().map_or(true, |(_, d)| degree > *d) {
                best = Some((member, degree));
            }
        }
        let Some((main, degree)) = best else {
            return Err(CorefError::internal("coref set is empty"));
        };

        let marker = Edge::hyper([
            self.main_coref_connector.clone(),
            Edge::atom(coref_id.clone()),
            main,
        ]);
        if self.store.exists(&marker)? {
            return Ok(false);
        }

        let removed = self.remove_markers(&coref_id)?;
        if removed > 1 {
            warn!(coref_id = %coref_id, removed, "repaired duplicate main coref markers");
        }
        self.store.add(&marker, false)?;
        debug!(%marker, degree, "main coref updated");
        Ok(true)
    }
}
