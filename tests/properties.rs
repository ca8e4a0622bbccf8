use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use proptest::prelude::*;

use hgcoref::{
    CorefConfig, CorefEngine, Edge, HypergraphStore, InMemoryHypergraph, SequentialIdGenerator,
};

const ENTITIES: usize = 8;

fn entity(i: usize) -> Edge {
    if i % 2 == 0 {
        Edge::atom(format!("e{i}/C"))
    } else {
        Edge::hyper([Edge::atom("of/B"), Edge::atom(format!("e{i}/C")), Edge::atom("x/C")])
    }
}

/// Plain union-find used as the reference model for group membership.
struct Components(Vec<usize>);

impl Components {
    fn new(n: usize) -> Self {
        Self((0..n).collect())
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.0[root] != root {
            root = self.0[root];
        }
        self.0[i] = root;
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        self.0[ra] = rb;
    }
}

fn engine() -> (CorefEngine, Arc<InMemoryHypergraph>) {
    let store = Arc::new(InMemoryHypergraph::new());
    let engine = CorefEngine::with_config(
        store.clone(),
        Arc::new(SequentialIdGenerator::default()),
        CorefConfig::default(),
    )
    .unwrap();
    (engine, store)
}

fn merges() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..ENTITIES, 0..ENTITIES), 0..16)
}

proptest! {
    #[test]
    fn groups_match_union_find(ops in merges()) {
        let (engine, _) = engine();
        let mut model = Components::new(ENTITIES);
        for &(a, b) in &ops {
            engine.make_corefs(&entity(a), &entity(b)).unwrap();
            model.union(a, b);
        }

        for i in 0..ENTITIES {
            let set = engine.coref_set(&entity(i)).unwrap();
            prop_assert!(set.contains(&entity(i)));

            let expected: BTreeSet<Edge> = (0..ENTITIES)
                .filter(|&j| model.find(j) == model.find(i))
                .map(entity)
                .collect();
            prop_assert_eq!(set, expected);
        }
    }

    #[test]
    fn are_corefs_is_symmetric_and_agrees_with_coref_set(ops in merges()) {
        let (engine, _) = engine();
        for &(a, b) in &ops {
            engine.make_corefs(&entity(a), &entity(b)).unwrap();
        }

        for i in 0..ENTITIES {
            let set = engine.coref_set(&entity(i)).unwrap();
            for j in 0..ENTITIES {
                let forward = engine.are_corefs(&entity(i), &entity(j)).unwrap();
                let backward = engine.are_corefs(&entity(j), &entity(i)).unwrap();
                prop_assert_eq!(forward, backward);
                prop_assert_eq!(forward, set.contains(&entity(j)));
            }
        }
    }

    #[test]
    fn ids_are_shared_within_and_distinct_across_groups(ops in merges()) {
        let (engine, store) = engine();
        for &(a, b) in &ops {
            engine.make_corefs(&entity(a), &entity(b)).unwrap();
        }

        let mut by_id: BTreeMap<String, BTreeSet<Edge>> = BTreeMap::new();
        for i in 0..ENTITIES {
            let set = engine.coref_set(&entity(i)).unwrap();
            let id = engine.coref_id(&entity(i)).unwrap();
            if set.len() == 1 && !ops.iter().any(|&(a, b)| a == i || b == i) {
                prop_assert!(id.is_none());
                continue;
            }
            let id = id.unwrap();
            for member in &set {
                prop_assert_eq!(engine.coref_id(member).unwrap(), Some(id.clone()));
            }
            let group = by_id.entry(id.clone()).or_insert_with(|| set.clone());
            prop_assert_eq!(&*group, &set);

            // exactly one marker, naming a member
            let pattern = Edge::hyper([Edge::atom("main-coref/J/."), Edge::atom(id), Edge::atom("*")]);
            let markers = store.search(&pattern, true).unwrap();
            prop_assert_eq!(markers.len(), 1);
            prop_assert!(set.contains(&engine.main_coref(&entity(i)).unwrap()));
        }
    }

    #[test]
    fn repeated_merge_is_idempotent(ops in merges(), pick in 0..16usize) {
        prop_assume!(!ops.is_empty());
        let (engine, store) = engine();
        for &(a, b) in &ops {
            engine.make_corefs(&entity(a), &entity(b)).unwrap();
        }
        let (a, b) = ops[pick % ops.len()];
        let (a, b) = (entity(a), entity(b));

        let before = engine.coref_set(&a).unwrap();
        let main_before = engine.main_coref(&a).unwrap();
        let outcome = engine.make_corefs(&a, &b).unwrap();

        prop_assert_eq!(outcome.retagged, 0);
        prop_assert!(!outcome.main_updated);
        prop_assert_eq!(engine.coref_set(&a).unwrap(), before);
        prop_assert_eq!(engine.main_coref(&a).unwrap(), main_before);

        // links added since the last refresh may have shifted degrees; once
        // refreshed, a second run finds the correct marker and writes nothing
        engine.update_main_coref(&a).unwrap();
        let count = store.mutation_count().unwrap();
        prop_assert!(!engine.update_main_coref(&a).unwrap());
        prop_assert_eq!(store.mutation_count().unwrap(), count);
    }
}
