//! Graph storage: vertex/edge CRUD, adjacency queries, mutation events.
//!
//! Every variant is built from the same capability traits:
//!
//! - [`GraphBase`]: identity, flags, vertex membership
//! - [`AdjacencyQuery`]: indexed neighbor access, the contract the traversal
//!   and triangle code consume
//! - [`VertexStore`] / [`EdgeStore`]: mutation
//! - [`Observable`]: change notifications
//! - [`Weighted`]: optional per-edge weights
//!
//! Queries about a vertex that is not in the graph fail with `NotFound`
//! instead of answering as if the vertex had no edges.

mod bidirectional;
mod directed;
mod edge;
mod edge_list_graph;
mod events;
mod store;
mod undirected;
mod weighted;

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{GraphError, Result};

pub use bidirectional::BidirectionalGraph;
pub use directed::AdjacencyGraph;
pub use edge::{Edge, EdgeEquality};
pub use edge_list_graph::EdgeListGraph;
pub use events::{GraphEvent, GraphEvents, Subscriber, SubscriptionId};
pub use undirected::UndirectedGraph;
pub use weighted::WeightedGraph;

/// Vertex identifier: identity only, no payload.
pub trait Vertex: Copy + Eq + Hash + Ord + fmt::Debug + Send + Sync + 'static {}

impl<T> Vertex for T where T: Copy + Eq + Hash + Ord + fmt::Debug + Send + Sync + 'static {}

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a graph instance. Clones get a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(u64);

impl GraphId {
    pub fn next() -> Self {
        GraphId(NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "graph#{}", self.0)
    }
}

pub trait GraphBase<V: Vertex> {
    fn id(&self) -> GraphId;
    fn is_directed(&self) -> bool;
    fn allow_parallel_edges(&self) -> bool;
    fn is_mutable(&self) -> bool;
    fn vertex_count(&self) -> usize;
    /// Logical edges: one per successful `add_edge`, for every variant.
    fn edge_count(&self) -> usize;
    fn contains_vertex(&self, v: &V) -> bool;
    fn vertices(&self) -> impl Iterator<Item = V> + '_;

    fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.is_mutable() {
            Ok(())
        } else {
            Err(GraphError::read_only())
        }
    }
}

/// Indexed neighbor access.
///
/// "Adjacent" means every neighbor a walk may step to: out-neighbors on a
/// directed graph, both sides on an undirected one, and out- followed by
/// in-neighbors on a bidirectional one. The `out_*` views differ from the
/// adjacent ones only on the bidirectional graph.
pub trait AdjacencyQuery<V: Vertex>: GraphBase<V> {
    fn adjacent_degree(&self, v: &V) -> Result<usize>;

    /// The `index`-th adjacency entry of `v`.
    fn adjacent_edge(&self, v: &V, index: usize) -> Result<V>;

    fn adjacent_edges(&self, v: &V) -> Result<impl Iterator<Item = V> + '_>;

    /// Whether every edge shows up in the adjacency of both endpoints. True
    /// for undirected and bidirectional graphs, false when adjacency is
    /// out-only.
    fn adjacency_is_symmetric(&self) -> bool {
        !self.is_directed()
    }

    /// Whether `target` is an out-neighbor of `source`. False if `source` is absent.
    fn contains_edge(&self, source: &V, target: &V) -> bool;

    /// Position of the first `target` entry in `source`'s adjacency.
    fn adjacent_edge_index(&self, source: &V, target: &V) -> Result<Option<usize>> {
        Ok(self.adjacent_edges(source)?.position(|n| n == *target))
    }

    /// Number of entries equal to `target` in `source`'s adjacency, i.e. the
    /// number of parallel edges between them.
    fn multiplicity(&self, source: &V, target: &V) -> Result<usize> {
        Ok(self.adjacent_edges(source)?.filter(|n| n == target).count())
    }

    fn out_degree(&self, v: &V) -> Result<usize> {
        self.adjacent_degree(v)
    }

    fn out_edge(&self, v: &V, index: usize) -> Result<V> {
        self.adjacent_edge(v, index)
    }

    fn out_edges(&self, v: &V) -> Result<impl Iterator<Item = V> + '_> {
        self.adjacent_edges(v)
    }
}

pub trait VertexStore<V: Vertex>: GraphBase<V> {
    /// Returns false if `v` was already present.
    fn add_vertex(&mut self, v: V) -> Result<bool>;

    /// Removes `v` and every incident edge. Returns false if `v` was absent.
    fn remove_vertex(&mut self, v: &V) -> Result<bool>;

    /// Removes every vertex and edge, firing a single `Cleared` event.
    fn clear(&mut self) -> Result<()>;

    fn add_vertex_range<I>(&mut self, vertices: I) -> Result<usize>
    where
        I: IntoIterator<Item = V>,
    {
        self.ensure_mutable()?;
        let mut added = 0;
        for v in vertices {
            if self.add_vertex(v)? {
                added += 1;
            }
        }
        Ok(added)
    }

    fn remove_vertex_if<F>(&mut self, mut predicate: F) -> Result<usize>
    where
        F: FnMut(&V) -> bool,
    {
        self.ensure_mutable()?;
        let doomed: Vec<V> = self.vertices().filter(|v| predicate(v)).collect();
        let mut removed = 0;
        for v in &doomed {
            if self.remove_vertex(v)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

pub trait EdgeStore<V: Vertex>: VertexStore<V> + AdjacencyQuery<V> {
    /// Adds `source -> target`. Both endpoints must exist (`NotFound`
    /// otherwise). Returns false when parallel edges are disallowed and an
    /// equal edge already exists.
    fn add_edge(&mut self, source: V, target: V) -> Result<bool>;

    /// Removes one `source -> target` edge. Returns false if there is none.
    fn remove_edge(&mut self, source: &V, target: &V) -> Result<bool>;

    /// Removes every edge leaving `v`, keeping the vertex. Returns the number removed.
    fn clear_adjacent_edges(&mut self, v: &V) -> Result<usize>;

    /// Every logical edge once; parallel edges appear once per copy.
    fn edges(&self) -> impl Iterator<Item = Edge<V>> + '_;

    /// Like `add_edge`, creating missing endpoints first.
    fn add_vertices_and_edge(&mut self, source: V, target: V) -> Result<bool> {
        self.add_vertex(source)?;
        self.add_vertex(target)?;
        self.add_edge(source, target)
    }

    fn add_edge_range<I>(&mut self, edges: I) -> Result<usize>
    where
        I: IntoIterator<Item = (V, V)>,
    {
        self.ensure_mutable()?;
        let mut added = 0;
        for (source, target) in edges {
            if self.add_edge(source, target)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Adds `v` and an edge to each target, creating targets as needed.
    /// This is the bulk-load path used by the graph readers.
    fn add_vertex_and_out_edges<I>(&mut self, v: V, targets: I) -> Result<usize>
    where
        I: IntoIterator<Item = V>,
    {
        self.add_vertex(v)?;
        let mut added = 0;
        for target in targets {
            self.add_vertex(target)?;
            if self.add_edge(v, target)? {
                added += 1;
            }
        }
        Ok(added)
    }

    fn remove_edge_if<F>(&mut self, mut predicate: F) -> Result<usize>
    where
        F: FnMut(&Edge<V>) -> bool,
    {
        self.ensure_mutable()?;
        let doomed: Vec<Edge<V>> = self.edges().filter(|e| predicate(e)).collect();
        let mut removed = 0;
        for edge in &doomed {
            if self.remove_edge(&edge.source, &edge.target)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Change-notification registration.
pub trait Observable<V: Vertex> {
    fn events_mut(&mut self) -> &mut GraphEvents<V>;

    fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&GraphEvent<V>) + Send + Sync + 'static,
    {
        self.events_mut().subscribe(callback)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events_mut().unsubscribe(id)
    }
}

/// Per-edge weights.
pub trait Weighted<V: Vertex, W> {
    /// Weight of the `source -> target` edge; `NotFound` if there is no such edge.
    fn weight(&self, source: &V, target: &V) -> Result<W>;

    fn set_weight(&mut self, source: V, target: V, weight: W) -> Result<()>;
}
