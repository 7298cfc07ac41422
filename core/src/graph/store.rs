use std::collections::hash_map::Entry;

use crate::config::GraphOptions;
use crate::containers::{EdgeList, ShardedMap};
use crate::error::{GraphError, Result};

use super::edge::EdgeEquality;
use super::Vertex;

/// Sharded vertex -> neighbor-list storage shared by the adjacency-based
/// graph variants.
#[derive(Debug, Clone)]
pub(crate) struct AdjacencyStore<V> {
    lists: ShardedMap<V, EdgeList<V>>,
    allow_parallel_edges: bool,
}

impl<V: Vertex> AdjacencyStore<V> {
    pub fn new(allow_parallel_edges: bool) -> Self {
        Self {
            lists: ShardedMap::default(),
            allow_parallel_edges,
        }
    }

    pub fn with_options(options: &GraphOptions) -> Result<Self> {
        options.validate()?;
        let capacity = options.shard_capacity.saturating_mul(options.shards);
        Ok(Self {
            lists: ShardedMap::with_capacity(options.shards, capacity)?,
            allow_parallel_edges: options.allow_parallel_edges,
        })
    }

    pub fn allow_parallel_edges(&self) -> bool {
        self.allow_parallel_edges
    }

    pub fn shard_count(&self) -> usize {
        self.lists.shard_count()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn contains(&self, v: &V) -> bool {
        self.lists.contains_key(v)
    }

    pub fn list(&self, v: &V) -> Result<&EdgeList<V>> {
        self.lists.get(v).ok_or_else(|| GraphError::vertex_not_found(v))
    }

    pub fn list_mut(&mut self, v: &V) -> Result<&mut EdgeList<V>> {
        self.lists
            .get_mut(v)
            .ok_or_else(|| GraphError::vertex_not_found(v))
    }

    /// Register `v` with an empty list. Returns false if already present.
    pub fn insert_vertex(&mut self, v: V) -> bool {
        let allow = self.allow_parallel_edges;
        match self.lists.entry(v) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(EdgeList::new(allow));
                true
            }
        }
    }

    pub fn remove_vertex(&mut self, v: &V) -> Option<EdgeList<V>> {
        self.lists.remove(v)
    }

    pub fn vertices(&self) -> impl Iterator<Item = V> + '_ {
        self.lists.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (V, &EdgeList<V>)> + '_ {
        self.lists.iter().map(|(v, list)| (*v, list))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (V, &mut EdgeList<V>)> + '_ {
        self.lists.iter_mut().map(|(v, list)| (*v, list))
    }

    /// Total adjacency entries across all vertices.
    pub fn entry_count(&self) -> usize {
        self.lists.values().map(EdgeList::len).sum()
    }

    pub fn clear(&mut self) {
        self.lists.clear();
    }

    /// Whether an edge equal to `source -> target` under `equality` is stored.
    ///
    /// Directed equality only has to look at `source`'s list; other
    /// comparers may match an entry stored from the `target` side.
    pub fn has_matching_edge(&self, source: &V, target: &V, equality: &EdgeEquality<V>) -> bool {
        let Some(out) = self.lists.get(source) else {
            return false;
        };
        if let EdgeEquality::Directed = equality {
            return out.contains(target);
        }
        if out.iter().any(|n| equality.matches(source, target, source, &n)) {
            return true;
        }
        self.lists
            .get(target)
            .is_some_and(|back| back.iter().any(|n| equality.matches(source, target, target, &n)))
    }

    /// Deep copy with a possibly different duplicate policy.
    pub fn converted(&self, allow_parallel_edges: bool) -> Self {
        if allow_parallel_edges == self.allow_parallel_edges {
            return self.clone();
        }
        let mut lists = self.lists.clone();
        for list in lists.values_mut() {
            *list = list.converted(allow_parallel_edges);
        }
        Self {
            lists,
            allow_parallel_edges,
        }
    }
}
