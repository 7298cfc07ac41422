use tracing::debug;

use crate::config::GraphOptions;
use crate::error::{GraphError, Result};

use super::edge::{Edge, EdgeEquality};
use super::events::{GraphEvent, GraphEvents};
use super::store::AdjacencyStore;
use super::{AdjacencyQuery, EdgeStore, GraphBase, GraphId, Observable, Vertex, VertexStore};

/// Undirected graph with symmetric adjacency lists.
///
/// An edge `a - b` is stored in both lists; a self-loop `a - a` is stored
/// once. `edge_count` counts logical edges, so for a graph without
/// self-loops it equals half the summed degree.
pub struct UndirectedGraph<V: Vertex> {
    id: GraphId,
    store: AdjacencyStore<V>,
    edge_count: usize,
    edge_equality: EdgeEquality<V>,
    mutable: bool,
    events: GraphEvents<V>,
}

impl<V: Vertex> UndirectedGraph<V> {
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
        debug!(%id, shards = store.shard_count(), "created undirected graph");
        Self {
            id,
            store,
            edge_count: 0,
            edge_equality: EdgeEquality::Undirected,
            mutable: true,
            events: GraphEvents::new(),
        }
    }

    pub fn with_edge_equality(mut self, equality: EdgeEquality<V>) -> Self {
        self.edge_equality = equality;
        self
    }

    pub fn shard_count(&self) -> usize {
        self.store.shard_count()
    }

    pub fn clone_with_parallel_edges(&self, allow_parallel_edges: bool) -> Self {
        let store = self.store.converted(allow_parallel_edges);
        let mut copy = Self::from_store(store);
        copy.edge_count = copy.count_logical_edges();
        copy.edge_equality = self.edge_equality;
        copy
    }

    pub fn read_only_clone(&self) -> Self {
        let mut copy = self.clone();
        copy.mutable = false;
        copy
    }

    fn count_logical_edges(&self) -> usize {
        self.store
            .iter()
            .map(|(v, list)| list.iter().filter(|n| v <= *n).count())
            .sum()
    }

    fn emit(&mut self, event: GraphEvent<V>) {
        self.events.emit(&event);
    }

    /// Detach every edge at `v`, returning them. `v`'s own list is emptied.
    fn detach(&mut self, v: &V) -> Result<Vec<Edge<V>>> {
        let neighbors = self.store.list_mut(v)?.take_all();
        let mut removed = Vec::with_capacity(neighbors.len());
        for n in neighbors {
            if n != *v {
                if let Ok(back) = self.store.list_mut(&n) {
                    back.remove(v);
                }
            }
            removed.push(Edge::undirected(*v, n));
        }
        self.edge_count -= removed.len();
        Ok(removed)
    }
}

impl<V: Vertex> Default for UndirectedGraph<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copy with a fresh id and no subscribers.
impl<V: Vertex> Clone for UndirectedGraph<V> {
    fn clone(&self) -> Self {
        let mut copy = Self::from_store(self.store.clone());
        copy.edge_count = self.edge_count;
        copy.edge_equality = self.edge_equality;
        copy.mutable = self.mutable;
        copy
    }
}

impl<V: Vertex> std::fmt::Debug for UndirectedGraph<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndirectedGraph")
            .field("id", &self.id)
            .field("vertices", &self.store.len())
            .field("edges", &self.edge_count)
            .field("mutable", &self.mutable)
            .finish()
    }
}

impl<V: Vertex> GraphBase<V> for UndirectedGraph<V> {
    fn id(&self) -> GraphId {
        self.id
    }

    fn is_directed(&self) -> bool {
        false
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

impl<V: Vertex> AdjacencyQuery<V> for UndirectedGraph<V> {
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

impl<V: Vertex> VertexStore<V> for UndirectedGraph<V> {
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
        let removed = self.detach(v)?;
        self.store.remove_vertex(v);
        for edge in removed {
            self.emit(GraphEvent::EdgeRemoved(edge));
        }
        self.emit(GraphEvent::VertexRemoved(*v));
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

impl<V: Vertex> EdgeStore<V> for UndirectedGraph<V> {
    fn add_edge(&mut self, source: V, target: V) -> Result<bool> {
        self.ensure_mutable()?;
        if !self.store.contains(&source) {
            return Err(GraphError::vertex_not_found(&source));
        }
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
        if source != target {
            self.store.list_mut(&target)?.push(source);
        }
        self.edge_count += 1;
        self.emit(GraphEvent::EdgeAdded(Edge::undirected(source, target)));
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
        if source != target {
            self.store.list_mut(target)?.remove(source);
        }
        self.edge_count -= 1;
        self.emit(GraphEvent::EdgeRemoved(Edge::undirected(*source, *target)));
        Ok(true)
    }

    fn clear_adjacent_edges(&mut self, v: &V) -> Result<usize> {
        self.ensure_mutable()?;
        let removed = self.detach(v)?;
        let count = removed.len();
        for edge in removed {
            self.emit(GraphEvent::EdgeRemoved(edge));
        }
        Ok(count)
    }

    /// Each logical edge once, reported from its smaller endpoint.
    fn edges(&self) -> impl Iterator<Item = Edge<V>> + '_ {
        self.store.iter().flat_map(|(v, list)| {
            list.iter()
                .filter(move |n| v <= *n)
                .map(move |n| Edge::undirected(v, n))
        })
    }
}

impl<V: Vertex> Observable<V> for UndirectedGraph<V> {
    fn events_mut(&mut self) -> &mut GraphEvents<V> {
        &mut self.events
    }
}
