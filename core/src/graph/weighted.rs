use crate::containers::ShardedMap;
use crate::error::{GraphError, Result};

use super::{AdjacencyQuery, EdgeStore, GraphBase, GraphId, Vertex, Weighted};

pub type WeightFn<V, W> = Box<dyn Fn(&V, &V) -> W + Send + Sync>;

/// Attaches per-edge weights to any graph.
///
/// Explicit weights are keyed by endpoint pair (unordered on undirected
/// graphs), so parallel edges share one weight. Edges without an explicit
/// weight fall back to the weight function, or `W::default()` without one.
/// Mutating the inner graph directly through [`graph_mut`](Self::graph_mut)
/// leaves explicit weights of removed edges in place; they apply again if
/// the edge is re-added.
pub struct WeightedGraph<G, V: Vertex, W> {
    graph: G,
    weights: ShardedMap<(V, V), W>,
    fallback: Option<WeightFn<V, W>>,
}

impl<G, V, W> WeightedGraph<G, V, W>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
    W: Clone + Default,
{
    pub fn new(graph: G) -> Self {
        Self {
            graph,
            weights: ShardedMap::default(),
            fallback: None,
        }
    }

    pub fn with_weight_fn<F>(graph: G, weight_fn: F) -> Self
    where
        F: Fn(&V, &V) -> W + Send + Sync + 'static,
    {
        Self {
            graph,
            weights: ShardedMap::default(),
            fallback: Some(Box::new(weight_fn)),
        }
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    pub fn into_inner(self) -> G {
        self.graph
    }

    fn key(&self, source: V, target: V) -> (V, V) {
        if self.graph.is_directed() || source <= target {
            (source, target)
        } else {
            (target, source)
        }
    }

    fn edge_not_found(source: &V, target: &V) -> GraphError {
        GraphError::NotFound(format!("edge {source:?} -> {target:?}"))
    }
}

impl<G, V, W> WeightedGraph<G, V, W>
where
    G: EdgeStore<V>,
    V: Vertex,
    W: Clone + Default,
{
    /// Add an edge (creating endpoints) and record its weight.
    pub fn add_weighted_edge(&mut self, source: V, target: V, weight: W) -> Result<bool> {
        let added = self.graph.add_vertices_and_edge(source, target)?;
        if added {
            let key = self.key(source, target);
            self.weights.insert_or_replace(key, weight);
        }
        Ok(added)
    }

    /// Remove one edge; its weight is dropped once no parallel copy remains.
    pub fn remove_weighted_edge(&mut self, source: &V, target: &V) -> Result<bool> {
        let removed = self.graph.remove_edge(source, target)?;
        if removed && !self.graph.contains_edge(source, target) {
            let key = self.key(*source, *target);
            self.weights.remove(&key);
        }
        Ok(removed)
    }
}

impl<G, V, W> Weighted<V, W> for WeightedGraph<G, V, W>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
    W: Clone + Default,
{
    fn weight(&self, source: &V, target: &V) -> Result<W> {
        if !self.graph.contains_edge(source, target) {
            return Err(Self::edge_not_found(source, target));
        }
        if let Some(w) = self.weights.get(&self.key(*source, *target)) {
            return Ok(w.clone());
        }
        Ok(match &self.fallback {
            Some(f) => f(source, target),
            None => W::default(),
        })
    }

    fn set_weight(&mut self, source: V, target: V, weight: W) -> Result<()> {
        if !self.graph.contains_edge(&source, &target) {
            return Err(Self::edge_not_found(&source, &target));
        }
        let key = self.key(source, target);
        self.weights.insert_or_replace(key, weight);
        Ok(())
    }
}

impl<G, V, W> GraphBase<V> for WeightedGraph<G, V, W>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    fn id(&self) -> GraphId {
        self.graph.id()
    }

    fn is_directed(&self) -> bool {
        self.graph.is_directed()
    }

    fn allow_parallel_edges(&self) -> bool {
        self.graph.allow_parallel_edges()
    }

    fn is_mutable(&self) -> bool {
        self.graph.is_mutable()
    }

    fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn contains_vertex(&self, v: &V) -> bool {
        self.graph.contains_vertex(v)
    }

    fn vertices(&self) -> impl Iterator<Item = V> + '_ {
        self.graph.vertices()
    }
}

impl<G, V, W> AdjacencyQuery<V> for WeightedGraph<G, V, W>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    fn adjacency_is_symmetric(&self) -> bool {
        self.graph.adjacency_is_symmetric()
    }

    fn adjacent_degree(&self, v: &V) -> Result<usize> {
        self.graph.adjacent_degree(v)
    }

    fn adjacent_edge(&self, v: &V, index: usize) -> Result<V> {
        self.graph.adjacent_edge(v, index)
    }

    fn adjacent_edges(&self, v: &V) -> Result<impl Iterator<Item = V> + '_> {
        self.graph.adjacent_edges(v)
    }

    fn contains_edge(&self, source: &V, target: &V) -> bool {
        self.graph.contains_edge(source, target)
    }

    fn multiplicity(&self, source: &V, target: &V) -> Result<usize> {
        self.graph.multiplicity(source, target)
    }

    fn out_degree(&self, v: &V) -> Result<usize> {
        self.graph.out_degree(v)
    }

    fn out_edge(&self, v: &V, index: usize) -> Result<V> {
        self.graph.out_edge(v, index)
    }

    fn out_edges(&self, v: &V) -> Result<impl Iterator<Item = V> + '_> {
        self.graph.out_edges(v)
    }
}
