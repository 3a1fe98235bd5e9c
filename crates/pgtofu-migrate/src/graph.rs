//! A generic directed graph with deterministic topological sort, used to
//! order schemas (and, transitively, the migration batches belonging to
//! them) by their inter-schema dependencies.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

#[derive(Debug)]
pub struct CycleError<K> {
    pub remaining: Vec<K>,
}

impl<K: fmt::Debug> fmt::Display for CycleError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle detected among nodes: {:?}", self.remaining)
    }
}

impl<K: fmt::Debug> std::error::Error for CycleError<K> {}

/// `Graph<K>` stores, for each node, the set of nodes that must come
/// *before* it (its dependencies) as reverse adjacency — `add_edge(from,
/// to)` records that `from` depends on `to`, so `to` must be emitted
/// first; internally this is kept as "dependents of `to`" to drive
/// in-degree tracking on `from`.
pub struct Graph<K: Eq + Hash + Clone + Ord> {
    nodes: Vec<K>,
    present: HashSet<K>,
    /// dependencies[node] = set of nodes that `node` depends on (must precede it)
    dependencies: HashMap<K, HashSet<K>>,
}

impl<K: Eq + Hash + Clone + Ord + fmt::Debug> Graph<K> {
    pub fn new() -> Self {
        Graph {
            nodes: Vec::new(),
            present: HashSet::new(),
            dependencies: HashMap::new(),
        }
    }

    pub fn add_node(&mut self, key: K) {
        if self.present.insert(key.clone()) {
            self.nodes.push(key.clone());
            self.dependencies.entry(key).or_default();
        }
    }

    pub fn has_node(&self, key: &K) -> bool {
        self.present.contains(key)
    }

    /// Records that `from` depends on `to` (`to` must be ordered first).
    pub fn add_edge(&mut self, from: &K, to: &K) -> Result<(), String> {
        if !self.present.contains(from) {
            return Err(format!("unknown node: {:?}", from));
        }
        if !self.present.contains(to) {
            return Err(format!("unknown node: {:?}", to));
        }
        self.dependencies.get_mut(from).unwrap().insert(to.clone());
        Ok(())
    }

    /// Kahn's algorithm: nodes with no outstanding dependencies are
    /// emitted first. When multiple nodes are ready simultaneously, the
    /// ready queue is re-sorted by natural key order for determinism.
    pub fn topological_sort(&self) -> Result<Vec<K>, CycleError<K>> {
        let mut remaining: HashMap<K, HashSet<K>> = self.dependencies.clone();
        let mut ordered = Vec::with_capacity(self.nodes.len());

        loop {
            let mut ready: Vec<K> = remaining
                .iter()
                .filter(|(_, deps)| deps.is_empty())
                .map(|(k, _)| k.clone())
                .collect();
            if ready.is_empty() {
                break;
            }
            ready.sort();
            for node in &ready {
                remaining.remove(node);
            }
            for deps in remaining.values_mut() {
                for node in &ready {
                    deps.remove(node);
                }
            }
            ordered.extend(ready);
        }

        if !remaining.is_empty() {
            let mut left: Vec<K> = remaining.keys().cloned().collect();
            left.sort();
            return Err(CycleError { remaining: left });
        }

        Ok(ordered)
    }
}

impl<K: Eq + Hash + Clone + Ord + fmt::Debug> Default for Graph<K> {
    fn default() -> Self {
        Self::new()
    }
}
