use tracing::debug;

use crate::config::GraphOptions;
use crate::error::{GraphError, Result};

use super::edge::{Edge, EdgeEquality};
use super::events::{GraphEvent, GraphEvents};
use super::store::AdjacencyStore;
use super::{AdjacencyQuery, EdgeStore, GraphBase, GraphId, Observable, Vertex, VertexStore};

/// Directed graph stored as sharded out-adjacency lists.
///
/// Removing a vertex also removes edges pointing at it, which costs a scan
/// of every list. Use [`BidirectionalGraph`](super::BidirectionalGraph) when
/// that matters.
pub struct AdjacencyGraph<V: Vertex> {
    id: GraphId,
    store: AdjacencyStore<V>,
    edge_count: usize,
    edge_equality: EdgeEquality<V>,
    mutable: bool,
    events: GraphEvents<V>,
}

impl<V: Vertex> AdjacencyGraph<V> {
    pub fn new() -> Self {
        Self::from_store(AdjacencyStore::new(true))
    }

    pub fn with_parallel_edges(allow_parallel_edges: bool) -> Self {
        Self::from_store(AdjacencyStore::new(allow_parallel_edges))
    }

    pub fn with_options(options: &GraphOptions) -> Result<Self> {
        Ok(Self::from_store(AdjacencyStore::with_options(options)?))
    }

    fn from_store(store: AdjacencyStore<V>) -> Self {
        let id = GraphId::next();
        debug!(%id, shards = store.shard_count(), "created directed graph");
        Self {
            id,
            store,
            edge_count: 0,
            edge_equality: EdgeEquality::Directed,
            mutable: true,
            events: GraphEvents::new(),
        }
    }

    /// Replace the comparer used to detect parallel edges.
    pub fn with_edge_equality(mut self, equality: EdgeEquality<V>) -> Self {
        self.edge_equality = equality;
        self
    }

    pub fn shard_count(&self) -> usize {
        self.store.shard_count()
    }

    /// Independent copy with the given parallel-edge policy. Duplicate edges
    /// are collapsed when switching to a policy that forbids them.
    pub fn clone_with_parallel_edges(&self, allow_parallel_edges: bool) -> Self {
        let store = self.store.converted(allow_parallel_edges);
        let mut copy = Self::from_store(store);
        copy.edge_count = copy.store.entry_count();
        copy.edge_equality = self.edge_equality;
        copy
    }

    /// Independent copy on which every mutation fails with `Unsupported`.
    pub fn read_only_clone(&self) -> Self {
        let mut copy = self.clone();
        copy.mutable = false;
        copy
    }

    fn emit(&mut self, event: GraphEvent<V>) {
        self.events.emit(&event);
    }
}

impl<V: Vertex> Default for AdjacencyGraph<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copy with a fresh id and no subscribers.
impl<V: Vertex> Clone for AdjacencyGraph<V> {
    fn clone(&self) -> Self {
        let mut copy = Self::from_store(self.store.clone());
        copy.edge_count = self.edge_count;
        copy.edge_equality = self.edge_equality;
        copy.mutable = self.mutable;
        copy
    }
}

impl<V: Vertex> std::fmt::Debug for AdjacencyGraph<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdjacencyGraph")
            .field("id", &self.id)
            .field("vertices", &self.store.len())
            .field("edges", &self.edge_count)
            .field("mutable", &self.mutable)
            .finish()
    }
}

impl<V: Vertex> GraphBase<V> for AdjacencyGraph<V> {
    fn id(&self) -> GraphId {
        self.id
    }

    fn is_directed(&self) -> bool {
        true
    }

    fn allow_parallel_edges(&self) -> bool {
        self.store.allow_parallel_edges()
    }

    fn is_mutable(&self) -> bool {
        self.mutable
    }

    fn vertex_count(&self) -> usize {
        self.store.len()
    }

    fn edge_count(&self) -> usize {
        self.edge_count
    }

    fn contains_vertex(&self, v: &V) -> bool {
        self.store.contains(v)
    }

    fn vertices(&self) -> impl Iterator<Item = V> + '_ {
        self.store.vertices()
    }
}

impl<V: Vertex> AdjacencyQuery<V> for AdjacencyGraph<V> {
    fn adjacent_degree(&self, v: &V) -> Result<usize> {
        Ok(self.store.list(v)?.len())
    }

    fn adjacent_edge(&self, v: &V, index: usize) -> Result<V> {
        let list = self.store.list(v)?;
        list.get(index)
            .ok_or_else(|| GraphError::out_of_range(index, list.len()))
    }

    fn adjacent_edges(&self, v: &V) -> Result<impl Iterator<Item = V> + '_> {
        Ok(self.store.list(v)?.iter())
    }

    fn contains_edge(&self, source: &V, target: &V) -> bool {
        self.store.list(source).is_ok_and(|list| list.contains(target))
    }

    fn adjacent_edge_index(&self, source: &V, target: &V) -> Result<Option<usize>> {
        Ok(self.store.list(source)?.index_of(target))
    }

    fn multiplicity(&self, source: &V, target: &V) -> Result<usize> {
        Ok(self.store.list(source)?.count_of(target))
    }
}

impl<V: Vertex> VertexStore<V> for AdjacencyGraph<V> {
    fn add_vertex(&mut self, v: V) -> Result<bool> {
        self.ensure_mutable()?;
        if !self.store.insert_vertex(v) {
            return Ok(false);
        }
        self.emit(GraphEvent::VertexAdded(v));
        Ok(true)
    }

    fn remove_vertex(&mut self, v: &V) -> Result<bool> {
        self.ensure_mutable()?;
        if !self.store.contains(v) {
            return Ok(false);
        }
        let v = *v;
        let mut removed = Vec::new();
        for (source, list) in self.store.iter_mut() {
            if source == v {
                continue;
            }
            for _ in list.remove_where(|n| *n == v) {
                removed.push(Edge::directed(source, v));
            }
        }
        if let Some(mut out) = self.store.remove_vertex(&v) {
            removed.extend(out.take_all().into_iter().map(|t| Edge::directed(v, t)));
        }
        self.edge_count -= removed.len();
        for edge in removed {
            self.emit(GraphEvent::EdgeRemoved(edge));
        }
        self.emit(GraphEvent::VertexRemoved(v));
        Ok(true)
    }

    fn clear(&mut self) -> Result<()> {
        self.ensure_mutable()?;
        self.store.clear();
        self.edge_count = 0;
        self.emit(GraphEvent::Cleared);
        Ok(())
    }
}

impl<V: Vertex> EdgeStore<V> for AdjacencyGraph<V> {
    fn add_edge(&mut self, source: V, target: V) -> Result<bool> {
        self.ensure_mutable()?;
        if !self.store.contains(&target) {
            return Err(GraphError::vertex_not_found(&target));
        }
        if !self.store.allow_parallel_edges()
            && self
                .store
                .has_matching_edge(&source, &target, &self.edge_equality)
        {
            return Ok(false);
        }
        if !self.store.list_mut(&source)?.push(target) {
            return Ok(false);
        }
        self.edge_count += 1;
        self.emit(GraphEvent::EdgeAdded(Edge::directed(source, target)));
        Ok(true)
    }

    fn remove_edge(&mut self, source: &V, target: &V) -> Result<bool> {
        self.ensure_mutable()?;
        let Ok(list) = self.store.list_mut(source) else {
            return Ok(false);
        };
        if !list.remove(target) {
            return Ok(false);
        }
        self.edge_count -= 1;
        self.emit(GraphEvent::EdgeRemoved(Edge::directed(*source, *target)));
        Ok(true)
    }

    fn clear_adjacent_edges(&mut self, v: &V) -> Result<usize> {
        self.ensure_mutable()?;
        let targets = self.store.list_mut(v)?.take_all();
        self.edge_count -= targets.len();
        for &target in &targets {
            self.emit(GraphEvent::EdgeRemoved(Edge::directed(*v, target)));
        }
        Ok(targets.len())
    }

    fn edges(&self) -> impl Iterator<Item = Edge<V>> + '_ {
        self.store
            .iter()
            .flat_map(|(source, list)| list.iter().map(move |t| Edge::directed(source, t)))
    }
}

impl<V: Vertex> Observable<V> for AdjacencyGraph<V> {
    fn events_mut(&mut self) -> &mut GraphEvents<V> {
        &mut self.events
    }
}
