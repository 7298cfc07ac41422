use std::collections::{HashMap, HashSet};

use tracing::instrument;

use crate::containers::BinaryHeap;
use crate::error::{GraphError, Result};
use crate::graph::{AdjacencyQuery, Vertex, Weighted};

/// Single-source shortest path tree.
#[derive(Debug, Clone)]
pub struct ShortestPaths<V> {
    root: V,
    distances: HashMap<V, f64>,
    predecessors: HashMap<V, V>,
}

impl<V: Vertex> ShortestPaths<V> {
    pub fn root(&self) -> V {
        self.root
    }

    /// Distance from the root, or `None` if `target` is unreachable.
    pub fn distance(&self, target: &V) -> Option<f64> {
        self.distances.get(target).copied()
    }

    pub fn predecessor(&self, target: &V) -> Option<V> {
        self.predecessors.get(target).copied()
    }

    /// Number of vertices reached, the root included.
    pub fn reached(&self) -> usize {
        self.distances.len()
    }

    /// Vertices from the root to `target` inclusive.
    pub fn path_to(&self, target: &V) -> Option<Vec<V>> {
        if !self.distances.contains_key(target) {
            return None;
        }
        let mut path = vec![*target];
        let mut current = *target;
        while current != self.root {
            current = *self.predecessors.get(&current)?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }
}

/// Dijkstra over the out-direction view with a caller-supplied weight.
///
/// Weights must be finite and non-negative; anything else aborts with
/// `InvalidArgument`. The frontier is the crate's indexed heap and
/// relaxation goes through `minimum_update`, so each vertex sits in the
/// frontier at most once.
#[instrument(skip(graph, weight), fields(root = ?root))]
pub fn dijkstra<G, V, F>(graph: &G, root: V, mut weight: F) -> Result<ShortestPaths<V>>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
    F: FnMut(&V, &V) -> Result<f64>,
{
    if !graph.contains_vertex(&root) {
        return Err(GraphError::vertex_not_found(&root));
    }

    let mut distances: HashMap<V, f64> = HashMap::new();
    let mut predecessors: HashMap<V, V> = HashMap::new();
    let mut settled: HashSet<V> = HashSet::new();
    let mut frontier: BinaryHeap<f64, V, _> = BinaryHeap::with_comparison(f64::total_cmp);

    distances.insert(root, 0.0);
    frontier.push(0.0, root);

    while let Ok((dist, u)) = frontier.pop() {
        settled.insert(u);
        for v in graph.out_edges(&u)? {
            if settled.contains(&v) {
                continue;
            }
            let w = weight(&u, &v)?;
            if !w.is_finite() || w < 0.0 {
                return Err(GraphError::invalid_argument(format!(
                    "edge {u:?} -> {v:?} has weight {w}, expected a finite non-negative value"
                )));
            }
            let candidate = dist + w;
            let improves = distances.get(&v).map_or(true, |&d| candidate < d);
            if improves && frontier.minimum_update(candidate, v) {
                distances.insert(v, candidate);
                predecessors.insert(v, u);
            }
        }
    }

    tracing::debug!(reached = distances.len(), "shortest paths computed");
    Ok(ShortestPaths {
        root,
        distances,
        predecessors,
    })
}

/// Dijkstra using the weights stored on a [`Weighted`] graph.
pub fn dijkstra_weighted<G, V>(graph: &G, root: V) -> Result<ShortestPaths<V>>
where
    G: AdjacencyQuery<V> + Weighted<V, f64>,
    V: Vertex,
{
    dijkstra(graph, root, |s, t| graph.weight(s, t))
}

/// Hop counts from `root`: Dijkstra with every edge weighing 1.
pub fn hop_distances<G, V>(graph: &G, root: V) -> Result<ShortestPaths<V>>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    dijkstra(graph, root, |_, _| Ok(1.0))
}
