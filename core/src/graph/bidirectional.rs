use tracing::debug;

use crate::config::GraphOptions;
use crate::error::{GraphError, Result};

use super::edge::{Edge, EdgeEquality};
use super::events::{GraphEvent, GraphEvents};
use super::store::AdjacencyStore;
use super::{AdjacencyQuery, EdgeStore, GraphBase, GraphId, Observable, Vertex, VertexStore};

/// Directed graph that also indexes incoming edges.
///
/// The adjacency of `v` is its out-neighbors followed by its in-neighbors,
/// so a walk can step against edge direction. `out_*` and `in_*` give the
/// two halves separately.
pub struct BidirectionalGraph<V: Vertex> {
    id: GraphId,
    out: AdjacencyStore<V>,
    incoming: AdjacencyStore<V>,
    edge_count: usize,
    edge_equality: EdgeEquality<V>,
    mutable: bool,
    events: GraphEvents<V>,
}

impl<V: Vertex> BidirectionalGraph<V> {
    pub fn new() -> Self {
        Self::with_parallel_edges(true)
    }

    pub fn with_parallel_edges(allow_parallel_edges: bool) -> Self {
        Self::from_stores(
            AdjacencyStore::new(allow_parallel_edges),
            AdjacencyStore::new(allow_parallel_edges),
        )
    }

    pub fn with_options(options: &GraphOptions) -> Result<Self> {
        Ok(Self::from_stores(
            AdjacencyStore::with_options(options)?,
            AdjacencyStore::with_options(options)?,
        ))
    }

    fn from_stores(out: AdjacencyStore<V>, incoming: AdjacencyStore<V>) -> Self {
        let id = GraphId::next();
        debug!(%id, shards = out.shard_count(), "created bidirectional graph");
        Self {
            id,
            out,
            incoming,
            edge_count: 0,
            edge_equality: EdgeEquality::Directed,
            mutable: true,
            events: GraphEvents::new(),
        }
    }

    pub fn with_edge_equality(mut self, equality: EdgeEquality<V>) -> Self {
        self.edge_equality = equality;
        self
    }

    pub fn clone_with_parallel_edges(&self, allow_parallel_edges: bool) -> Self {
        let mut copy = Self::from_stores(
            self.out.converted(allow_parallel_edges),
            self.incoming.converted(allow_parallel_edges),
        );
        copy.edge_count = copy.out.entry_count();
        copy.edge_equality = self.edge_equality;
        copy
    }

    pub fn read_only_clone(&self) -> Self {
        let mut copy = self.clone();
        copy.mutable = false;
        copy
    }

    pub fn in_degree(&self, v: &V) -> Result<usize> {
        Ok(self.incoming.list(v)?.len())
    }

    pub fn in_edge(&self, v: &V, index: usize) -> Result<V> {
        let list = self.incoming.list(v)?;
        list.get(index)
            .ok_or_else(|| GraphError::out_of_range(index, list.len()))
    }

    pub fn in_edges(&self, v: &V) -> Result<impl Iterator<Item = V> + '_> {
        Ok(self.incoming.list(v)?.iter())
    }

    /// In-degree plus out-degree.
    pub fn degree(&self, v: &V) -> Result<usize> {
        self.adjacent_degree(v)
    }

    /// Remove every edge entering `v`. Returns the number removed.
    pub fn clear_in_edges(&mut self, v: &V) -> Result<usize> {
        self.ensure_mutable()?;
        let sources = self.incoming.list_mut(v)?.take_all();
        for source in &sources {
            if let Ok(list) = self.out.list_mut(source) {
                list.remove(v);
            }
        }
        self.edge_count -= sources.len();
        for &source in &sources {
            self.emit(GraphEvent::EdgeRemoved(Edge::directed(source, *v)));
        }
        Ok(sources.len())
    }

    fn emit(&mut self, event: GraphEvent<V>) {
        self.events.emit(&event);
    }
}

impl<V: Vertex> Default for BidirectionalGraph<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Vertex> Clone for BidirectionalGraph<V> {
    fn clone(&self) -> Self {
        let mut copy = Self::from_stores(self.out.clone(), self.incoming.clone());
        copy.edge_count = self.edge_count;
        copy.edge_equality = self.edge_equality;
        copy.mutable = self.mutable;
        copy
    }
}

impl<V: Vertex> std::fmt::Debug for BidirectionalGraph<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BidirectionalGraph")
            .field("id", &self.id)
            .field("vertices", &self.out.len())
            .field("edges", &self.edge_count)
            .field("mutable", &self.mutable)
            .finish()
    }
}

impl<V: Vertex> GraphBase<V> for BidirectionalGraph<V> {
    fn id(&self) -> GraphId {
        self.id
    }

    fn is_directed(&self) -> bool {
        true
    }

    fn allow_parallel_edges(&self) -> bool {
        self.out.allow_parallel_edges()
    }

    fn is_mutable(&self) -> bool {
        self.mutable
    }

    fn vertex_count(&self) -> usize {
        self.out.len()
    }

    fn edge_count(&self) -> usize {
        self.edge_count
    }

    fn contains_vertex(&self, v: &V) -> bool {
        self.out.contains(v)
    }

    fn vertices(&self) -> impl Iterator<Item = V> + '_ {
        self.out.vertices()
    }
}

impl<V: Vertex> AdjacencyQuery<V> for BidirectionalGraph<V> {
    fn adjacency_is_symmetric(&self) -> bool {
        true
    }

    fn adjacent_degree(&self, v: &V) -> Result<usize> {
        Ok(self.out.list(v)?.len() + self.incoming.list(v)?.len())
    }

    fn adjacent_edge(&self, v: &V, index: usize) -> Result<V> {
        let out = self.out.list(v)?;
        let incoming = self.incoming.list(v)?;
        if index < out.len() {
            return out
                .get(index)
                .ok_or_else(|| GraphError::out_of_range(index, out.len()));
        }
        incoming
            .get(index - out.len())
            .ok_or_else(|| GraphError::out_of_range(index, out.len() + incoming.len()))
    }

    fn adjacent_edges(&self, v: &V) -> Result<impl Iterator<Item = V> + '_> {
        Ok(self.out.list(v)?.iter().chain(self.incoming.list(v)?.iter()))
    }

    fn contains_edge(&self, source: &V, target: &V) -> bool {
        self.out.list(source).is_ok_and(|list| list.contains(target))
    }

    fn out_degree(&self, v: &V) -> Result<usize> {
        Ok(self.out.list(v)?.len())
    }

    fn out_edge(&self, v: &V, index: usize) -> Result<V> {
        let list = self.out.list(v)?;
        list.get(index)
            .ok_or_else(|| GraphError::out_of_range(index, list.len()))
    }

    fn out_edges(&self, v: &V) -> Result<impl Iterator<Item = V> + '_> {
        Ok(self.out.list(v)?.iter())
    }
}

impl<V: Vertex> VertexStore<V> for BidirectionalGraph<V> {
    fn add_vertex(&mut self, v: V) -> Result<bool> {
        self.ensure_mutable()?;
        if !self.out.insert_vertex(v) {
            return Ok(false);
        }
        self.incoming.insert_vertex(v);
        self.emit(GraphEvent::VertexAdded(v));
        Ok(true)
    }

    fn remove_vertex(&mut self, v: &V) -> Result<bool> {
        self.ensure_mutable()?;
        let (Some(mut out), Some(mut incoming)) =
            (self.out.remove_vertex(v), self.incoming.remove_vertex(v))
        else {
            return Ok(false);
        };
        let mut removed = Vec::new();
        for target in out.take_all() {
            if target != *v {
                if let Ok(list) = self.incoming.list_mut(&target) {
                    list.remove(v);
                }
            }
            removed.push(Edge::directed(*v, target));
        }
        // self-loops were already reported from the out side
        for source in incoming.take_all() {
            if source == *v {
                continue;
            }
            if let Ok(list) = self.out.list_mut(&source) {
                list.remove(v);
            }
            removed.push(Edge::directed(source, *v));
        }
        self.edge_count -= removed.len();
        for edge in removed {
            self.emit(GraphEvent::EdgeRemoved(edge));
        }
        self.emit(GraphEvent::VertexRemoved(*v));
        Ok(true)
    }

    fn clear(&mut self) -> Result<()> {
        self.ensure_mutable()?;
        self.out.clear();
        self.incoming.clear();
        self.edge_count = 0;
        self.emit(GraphEvent::Cleared);
        Ok(())
    }
}

impl<V: Vertex> EdgeStore<V> for BidirectionalGraph<V> {
    fn add_edge(&mut self, source: V, target: V) -> Result<bool> {
        self.ensure_mutable()?;
        if !self.out.contains(&target) {
            return Err(GraphError::vertex_not_found(&target));
        }
        if !self.out.allow_parallel_edges()
            && self
                .out
                .has_matching_edge(&source, &target, &self.edge_equality)
        {
            return Ok(false);
        }
        if !self.out.list_mut(&source)?.push(target) {
            return Ok(false);
        }
        self.incoming.list_mut(&target)?.push(source);
        self.edge_count += 1;
        self.emit(GraphEvent::EdgeAdded(Edge::directed(source, target)));
        Ok(true)
    }

    fn remove_edge(&mut self, source: &V, target: &V) -> Result<bool> {
        self.ensure_mutable()?;
        let Ok(list) = self.out.list_mut(source) else {
            return Ok(false);
        };
        if !list.remove(target) {
            return Ok(false);
        }
        self.incoming.list_mut(target)?.remove(source);
        self.edge_count -= 1;
        self.emit(GraphEvent::EdgeRemoved(Edge::directed(*source, *target)));
        Ok(true)
    }

    /// Removes the out-edges of `v`.
    fn clear_adjacent_edges(&mut self, v: &V) -> Result<usize> {
        self.ensure_mutable()?;
        let targets = self.out.list_mut(v)?.take_all();
        for target in &targets {
            if let Ok(list) = self.incoming.list_mut(target) {
                list.remove(v);
            }
        }
        self.edge_count -= targets.len();
        for &target in &targets {
            self.emit(GraphEvent::EdgeRemoved(Edge::directed(*v, target)));
        }
        Ok(targets.len())
    }

    fn edges(&self) -> impl Iterator<Item = Edge<V>> + '_ {
        self.out
            .iter()
            .flat_map(|(source, list)| list.iter().map(move |t| Edge::directed(source, t)))
    }
}

impl<V: Vertex> Observable<V> for BidirectionalGraph<V> {
    fn events_mut(&mut self) -> &mut GraphEvents<V> {
        &mut self.events
    }
}
