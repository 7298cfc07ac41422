use tracing::debug;

use crate::config::{BucketOptions, ChunkOptions, GraphOptions};
use crate::containers::{BucketedHashSet, ChunkedList};
use crate::error::{GraphError, Result};

use super::edge::{Edge, EdgeEquality};
use super::events::{GraphEvent, GraphEvents};
use super::{AdjacencyQuery, EdgeStore, GraphBase, GraphId, Observable, Vertex, VertexStore};

/// Compact undirected graph that stores a flat edge list.
///
/// Edges live in a [`ChunkedList`] and vertices in a [`BucketedHashSet`], so
/// memory stays close to one record per edge. Adjacency queries scan the
/// whole edge list and cost O(E); prefer [`UndirectedGraph`](super::UndirectedGraph)
/// for traversal-heavy work.
pub struct EdgeListGraph<V: Vertex> {
    id: GraphId,
    edges: ChunkedList<Edge<V>>,
    vertices: BucketedHashSet<V>,
    allow_parallel_edges: bool,
    edge_equality: EdgeEquality<V>,
    mutable: bool,
    events: GraphEvents<V>,
}

impl<V: Vertex> EdgeListGraph<V> {
    pub fn new() -> Self {
        Self::from_parts(ChunkedList::new(), BucketedHashSet::new(), true)
    }

    pub fn with_parallel_edges(allow_parallel_edges: bool) -> Self {
        Self::from_parts(ChunkedList::new(), BucketedHashSet::new(), allow_parallel_edges)
    }

    /// `graph.shards` is ignored; this variant has no adjacency shards.
    pub fn with_options(
        graph: &GraphOptions,
        chunks: &ChunkOptions,
        buckets: &BucketOptions,
    ) -> Result<Self> {
        Ok(Self::from_parts(
            ChunkedList::with_options(chunks)?,
            BucketedHashSet::with_options(buckets)?,
            graph.allow_parallel_edges,
        ))
    }

    fn from_parts(
        edges: ChunkedList<Edge<V>>,
        vertices: BucketedHashSet<V>,
        allow_parallel_edges: bool,
    ) -> Self {
        let id = GraphId::next();
        debug!(%id, chunk_size = edges.chunk_size(), "created edge-list graph");
        Self {
            id,
            edges,
            vertices,
            allow_parallel_edges,
            edge_equality: EdgeEquality::Undirected,
            mutable: true,
            events: GraphEvents::new(),
        }
    }

    pub fn with_edge_equality(mut self, equality: EdgeEquality<V>) -> Self {
        self.edge_equality = equality;
        self
    }

    /// Copy of the graph under a different parallel-edge policy. Turning
    /// parallel edges off keeps the first of each group of matching edges.
    pub fn clone_with_parallel_edges(&self, allow_parallel_edges: bool) -> Self {
        let mut copy = self.clone();
        copy.allow_parallel_edges = allow_parallel_edges;
        copy.mutable = true;
        if !allow_parallel_edges {
            let equality = self.edge_equality;
            let mut kept: Vec<Edge<V>> = Vec::new();
            copy.edges.retain(|e| {
                let duplicate = kept
                    .iter()
                    .any(|k| equality.matches(&e.source, &e.target, &k.source, &k.target));
                if !duplicate {
                    kept.push(*e);
                }
                !duplicate
            });
        }
        copy
    }

    pub fn read_only_clone(&self) -> Self {
        let mut copy = self.clone();
        copy.mutable = false;
        copy
    }

    /// Vertex at position `index` of the vertex set.
    pub fn vertex_at(&self, index: usize) -> Result<V> {
        self.vertices.get(index).copied()
    }

    /// Edge record at position `index` of the edge list.
    pub fn edge_at(&self, index: usize) -> Result<Edge<V>> {
        self.edges
            .get(index)
            .copied()
            .ok_or_else(|| GraphError::out_of_range(index, self.edges.len()))
    }

    fn check_vertex(&self, v: &V) -> Result<()> {
        if self.vertices.contains(v) {
            Ok(())
        } else {
            Err(GraphError::vertex_not_found(v))
        }
    }

    fn neighbors(&self, v: V) -> impl Iterator<Item = V> + '_ {
        self.edges.iter().filter_map(move |e| e.other(&v))
    }

    fn emit(&mut self, event: GraphEvent<V>) {
        self.events.emit(&event);
    }
}

impl<V: Vertex> Default for EdgeListGraph<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Vertex> Clone for EdgeListGraph<V> {
    fn clone(&self) -> Self {
        let mut copy = Self::from_parts(
            self.edges.clone(),
            self.vertices.clone(),
            self.allow_parallel_edges,
        );
        copy.edge_equality = self.edge_equality;
        copy.mutable = self.mutable;
        copy
    }
}

impl<V: Vertex> std::fmt::Debug for EdgeListGraph<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeListGraph")
            .field("id", &self.id)
            .field("vertices", &self.vertices.len())
            .field("edges", &self.edges.len())
            .finish()
    }
}

impl<V: Vertex> GraphBase<V> for EdgeListGraph<V> {
    fn id(&self) -> GraphId {
        self.id
    }

    fn is_directed(&self) -> bool {
        false
    }

    fn allow_parallel_edges(&self) -> bool {
        self.allow_parallel_edges
    }

    fn is_mutable(&self) -> bool {
        self.mutable
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn contains_vertex(&self, v: &V) -> bool {
        self.vertices.contains(v)
    }

    fn vertices(&self) -> impl Iterator<Item = V> + '_ {
        self.vertices.iter().copied()
    }
}

impl<V: Vertex> AdjacencyQuery<V> for EdgeListGraph<V> {
    fn adjacent_degree(&self, v: &V) -> Result<usize> {
        self.check_vertex(v)?;
        Ok(self.neighbors(*v).count())
    }

    fn adjacent_edge(&self, v: &V, index: usize) -> Result<V> {
        self.check_vertex(v)?;
        match self.neighbors(*v).nth(index) {
            Some(n) => Ok(n),
            None => Err(GraphError::out_of_range(index, self.neighbors(*v).count())),
        }
    }

    fn adjacent_edges(&self, v: &V) -> Result<impl Iterator<Item = V> + '_> {
        self.check_vertex(v)?;
        Ok(self.neighbors(*v))
    }

    fn contains_edge(&self, source: &V, target: &V) -> bool {
        self.edges
            .iter()
            .any(|e| EdgeEquality::Undirected.matches(source, target, &e.source, &e.target))
    }
}

impl<V: Vertex> VertexStore<V> for EdgeListGraph<V> {
    fn add_vertex(&mut self, v: V) -> Result<bool> {
        self.ensure_mutable()?;
        if !self.vertices.insert(v) {
            return Ok(false);
        }
        self.emit(GraphEvent::VertexAdded(v));
        Ok(true)
    }

    fn remove_vertex(&mut self, v: &V) -> Result<bool> {
        self.ensure_mutable()?;
        if !self.vertices.remove(v) {
            return Ok(false);
        }
        let removed: Vec<Edge<V>> = self
            .edges
            .iter()
            .filter(|e| e.is_incident(v))
            .copied()
            .collect();
        self.edges.retain(|e| !e.is_incident(v));
        for edge in removed {
            self.emit(GraphEvent::EdgeRemoved(edge));
        }
        self.emit(GraphEvent::VertexRemoved(*v));
        Ok(true)
    }

    fn clear(&mut self) -> Result<()> {
        self.ensure_mutable()?;
        self.edges.clear();
        self.vertices.clear();
        self.emit(GraphEvent::Cleared);
        Ok(())
    }
}

impl<V: Vertex> EdgeStore<V> for EdgeListGraph<V> {
    fn add_edge(&mut self, source: V, target: V) -> Result<bool> {
        self.ensure_mutable()?;
        self.check_vertex(&source)?;
        self.check_vertex(&target)?;
        if !self.allow_parallel_edges {
            let equality = self.edge_equality;
            if self
                .edges
                .iter()
                .any(|e| equality.matches(&source, &target, &e.source, &e.target))
            {
                return Ok(false);
            }
        }
        let edge = Edge::undirected(source, target);
        self.edges.push(edge);
        self.emit(GraphEvent::EdgeAdded(edge));
        Ok(true)
    }

    fn remove_edge(&mut self, source: &V, target: &V) -> Result<bool> {
        self.ensure_mutable()?;
        let equality = self.edge_equality;
        let Some(index) = self
            .edges
            .iter()
            .position(|e| equality.matches(source, target, &e.source, &e.target))
        else {
            return Ok(false);
        };
        let edge = self.edges.remove_at(index)?;
        self.emit(GraphEvent::EdgeRemoved(edge));
        Ok(true)
    }

    fn clear_adjacent_edges(&mut self, v: &V) -> Result<usize> {
        self.ensure_mutable()?;
        self.check_vertex(v)?;
        let removed: Vec<Edge<V>> = self
            .edges
            .iter()
            .filter(|e| e.is_incident(v))
            .copied()
            .collect();
        self.edges.retain(|e| !e.is_incident(v));
        let count = removed.len();
        for edge in removed {
            self.emit(GraphEvent::EdgeRemoved(edge));
        }
        Ok(count)
    }

    fn edges(&self) -> impl Iterator<Item = Edge<V>> + '_ {
        self.edges.iter().copied()
    }
}

impl<V: Vertex> Observable<V> for EdgeListGraph<V> {
    fn events_mut(&mut self) -> &mut GraphEvents<V> {
        &mut self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn small_chunks() -> EdgeListGraph<u32> {
        let graph = GraphOptions::default();
        let chunks = ChunkOptions { chunk_size: 2 };
        EdgeListGraph::with_options(&graph, &chunks, &BucketOptions::default()).unwrap()
    }

    #[test]
    fn test_adjacency_from_edge_list() {
        let mut g = small_chunks();
        for (a, b) in [(0, 1), (1, 2), (2, 0), (2, 2)] {
            g.add_vertices_and_edge(a, b).unwrap();
        }
        assert_eq!(g.edge_count(), 4);
        assert_eq!(g.adjacent_degree(&2).unwrap(), 3);
        let mut adj: Vec<u32> = g.adjacent_edges(&2).unwrap().collect();
        adj.sort();
        assert_eq!(adj, vec![0, 1, 2]);
        assert!(g.contains_edge(&1, &0));
        assert_eq!(
            g.adjacent_edge(&0, 2).unwrap_err().kind(),
            ErrorKind::IndexOutOfRange
        );
    }

    #[test]
    fn test_clone_without_parallel_edges() {
        let mut g = small_chunks();
        for (a, b) in [(0, 1), (1, 0), (0, 1), (1, 2)] {
            g.add_vertices_and_edge(a, b).unwrap();
        }
        let strict = g.clone_with_parallel_edges(false);
        assert_eq!(strict.edge_count(), 2);
        assert_eq!(g.edge_count(), 4);
        assert_ne!(strict.id(), g.id());
        assert!(!strict.allow_parallel_edges());
    }

    #[test]
    fn test_remove_edge_matches_either_orientation() {
        let mut g = small_chunks();
        g.add_vertices_and_edge(0, 1).unwrap();
        g.add_vertices_and_edge(1, 2).unwrap();
        assert!(g.remove_edge(&1, &0).unwrap());
        assert!(!g.remove_edge(&1, &0).unwrap());
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edge_at(0).unwrap(), Edge::undirected(1, 2));
    }

    #[test]
    fn test_no_parallel_edges() {
        let mut g = EdgeListGraph::with_parallel_edges(false);
        g.add_vertices_and_edge(0u32, 1).unwrap();
        assert!(!g.add_edge(1, 0).unwrap());
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_remove_vertex_drops_incident_edges() {
        let mut g = small_chunks();
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 1)] {
            g.add_vertices_and_edge(a, b).unwrap();
        }
        assert!(g.remove_vertex(&1).unwrap());
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.vertex_count(), 3);
        assert!(g.contains_edge(&2, &3));
        assert_eq!(g.adjacent_degree(&1).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_positional_vertex_access() {
        let mut g = small_chunks();
        g.add_vertex_range([5, 6, 7]).unwrap();
        let listed: Vec<u32> = (0..3).map(|i| g.vertex_at(i).unwrap()).collect();
        let mut sorted = listed.clone();
        sorted.sort();
        assert_eq!(sorted, vec![5, 6, 7]);
        assert!(g.vertex_at(3).is_err());
    }

    #[test]
    fn test_clear_adjacent_edges() {
        let mut g = small_chunks();
        for (a, b) in [(0, 1), (1, 2), (2, 0)] {
            g.add_vertices_and_edge(a, b).unwrap();
        }
        assert_eq!(g.clear_adjacent_edges(&0).unwrap(), 2);
        assert_eq!(g.edge_count(), 1);
        g.clear().unwrap();
        assert!(g.is_empty());
    }
}
