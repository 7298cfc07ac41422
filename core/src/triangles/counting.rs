use std::collections::HashSet;

use tracing::instrument;

use crate::error::{GraphError, Result};
use crate::graph::{AdjacencyQuery, Vertex};

/// Three mutually adjacent vertices. Equality ignores the order they were
/// given in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triangle<V> {
    corners: [V; 3],
}

impl<V: Vertex> Triangle<V> {
    pub fn new(a: V, b: V, c: V) -> Self {
        let mut corners = [a, b, c];
        corners.sort_unstable();
        Self { corners }
    }

    /// Corners in ascending order.
    pub fn vertices(&self) -> [V; 3] {
        self.corners
    }

    pub fn has_vertex(&self, v: &V) -> bool {
        self.corners.contains(v)
    }

    /// The corner opposite the side `a`-`b`, if both are corners.
    pub fn other_vertex(&self, a: &V, b: &V) -> Option<V> {
        if a == b || !self.has_vertex(a) || !self.has_vertex(b) {
            return None;
        }
        self.corners.iter().copied().find(|c| c != a && c != b)
    }

    /// False when two corners coincide.
    pub fn is_valid(&self) -> bool {
        let [x, y, z] = self.corners;
        x != y && y != z
    }
}

/// Distinct neighbors of `v`, without `v` itself and without `exclude`.
fn neighbor_set<G, V>(graph: &G, v: &V, exclude: &V) -> Result<HashSet<V>>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    Ok(graph
        .adjacent_edges(v)?
        .filter(|n| n != v && n != exclude)
        .collect())
}

fn common_neighbors<G, V>(graph: &G, source: &V, target: &V) -> Result<Vec<V>>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    let from_source = neighbor_set(graph, source, target)?;
    let from_target = neighbor_set(graph, target, source)?;
    let (small, large) = if from_source.len() <= from_target.len() {
        (from_source, from_target)
    } else {
        (from_target, from_source)
    };
    let mut common: Vec<V> = small.into_iter().filter(|v| large.contains(v)).collect();
    common.sort_unstable();
    Ok(common)
}

/// Triangles through the pair `source`-`target`, whether or not they are
/// adjacent. Each common neighbor `v` contributes
/// `multiplicity(source, v) * multiplicity(target, v)`, so parallel edges
/// count as distinct triangles.
pub fn pair_triangle_count<G, V>(graph: &G, source: &V, target: &V) -> Result<u64>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    let mut count = 0u64;
    for v in common_neighbors(graph, source, target)? {
        let left = graph.multiplicity(source, &v)? as u64;
        let right = graph.multiplicity(target, &v)? as u64;
        count += left * right;
    }
    Ok(count)
}

/// Triangles containing `v`.
///
/// Sums the pair count over every adjacency entry of `v` except self-loops;
/// each triangle is reached through both of its edges at `v`, hence the
/// halving.
pub fn vertex_triangle_count<G, V>(graph: &G, v: &V) -> Result<u64>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    if !graph.contains_vertex(v) {
        return Err(GraphError::vertex_not_found(v));
    }
    let mut total = 0u64;
    for n in graph.adjacent_edges(v)? {
        if n == *v {
            continue;
        }
        total += pair_triangle_count(graph, v, &n)?;
    }
    Ok(total / 2)
}

/// Triangles in the whole graph: every triangle is counted once per corner.
#[instrument(skip(graph), fields(vertices = graph.vertex_count()))]
pub fn graph_triangle_count<G, V>(graph: &G) -> Result<u64>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    let mut total = 0u64;
    for v in graph.vertices() {
        total += vertex_triangle_count(graph, &v)?;
    }
    let triangles = total / 3;
    tracing::debug!(triangles, "graph triangle count");
    Ok(triangles)
}

/// Distinct triangles containing `v`, sorted.
pub fn triangles_of<G, V>(graph: &G, v: &V) -> Result<Vec<Triangle<V>>>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    if !graph.contains_vertex(v) {
        return Err(GraphError::vertex_not_found(v));
    }
    let neighbors: HashSet<V> = graph.adjacent_edges(v)?.filter(|n| n != v).collect();
    let mut found: HashSet<Triangle<V>> = HashSet::new();
    for n in &neighbors {
        for w in common_neighbors(graph, v, n)? {
            found.insert(Triangle::new(*v, *n, w));
        }
    }
    let mut triangles: Vec<Triangle<V>> = found.into_iter().collect();
    triangles.sort_unstable();
    Ok(triangles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::graph::{AdjacencyGraph, EdgeListGraph, EdgeStore, UndirectedGraph};

    fn undirected(edges: &[(u32, u32)]) -> UndirectedGraph<u32> {
        let mut g = UndirectedGraph::with_parallel_edges(true);
        for &(s, t) in edges {
            g.add_vertices_and_edge(s, t).unwrap();
        }
        g
    }

    fn complete(n: u32) -> UndirectedGraph<u32> {
        let mut edges = Vec::new();
        for i in 0..n {
            for j in i + 1..n {
                edges.push((i, j));
            }
        }
        undirected(&edges)
    }

    // --- Triangle value tests ---

    #[test]
    fn test_triangle_order_insensitive() {
        assert_eq!(Triangle::new(3u32, 1, 2), Triangle::new(2, 3, 1));
        let t = Triangle::new(5u32, 1, 9);
        assert_eq!(t.vertices(), [1, 5, 9]);
        assert!(t.has_vertex(&9));
        assert_eq!(t.other_vertex(&9, &1), Some(5));
        assert_eq!(t.other_vertex(&9, &2), None);
        assert!(t.is_valid());
        assert!(!Triangle::new(1u32, 1, 2).is_valid());
    }

    // --- Counting tests ---

    #[test]
    fn test_k4_counts() {
        let g = complete(4);
        assert_eq!(graph_triangle_count(&g).unwrap(), 4);
        assert_eq!(vertex_triangle_count(&g, &0).unwrap(), 3);
        assert_eq!(pair_triangle_count(&g, &0, &1).unwrap(), 2);
    }

    #[test]
    fn test_four_cycle_has_no_triangles() {
        let g = undirected(&[(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert_eq!(graph_triangle_count(&g).unwrap(), 0);
        assert_eq!(vertex_triangle_count(&g, &0).unwrap(), 0);
    }

    #[test]
    fn test_pair_count_for_non_adjacent_pair() {
        // 0 and 2 share neighbors 1 and 3 without being adjacent
        let g = undirected(&[(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert_eq!(pair_triangle_count(&g, &0, &2).unwrap(), 2);
    }

    #[test]
    fn test_self_loops_ignored() {
        let g = undirected(&[(0, 1), (1, 2), (2, 0), (0, 0), (1, 1)]);
        assert_eq!(vertex_triangle_count(&g, &0).unwrap(), 1);
        assert_eq!(graph_triangle_count(&g).unwrap(), 1);
    }

    #[test]
    fn test_parallel_edges_multiply() {
        // Triangle 0-1-2 with the 0-2 edge doubled
        let g = undirected(&[(0, 1), (1, 2), (2, 0), (0, 2)]);
        assert_eq!(pair_triangle_count(&g, &0, &1).unwrap(), 2);
        assert_eq!(vertex_triangle_count(&g, &1).unwrap(), 2);
    }

    #[test]
    fn test_directed_counts_out_view() {
        let mut g = AdjacencyGraph::new();
        for (s, t) in [(0u32, 1), (1, 0), (1, 2), (2, 1), (0, 2), (2, 0)] {
            g.add_vertices_and_edge(s, t).unwrap();
        }
        assert_eq!(graph_triangle_count(&g).unwrap(), 1);
    }

    #[test]
    fn test_edge_list_graph_counts() {
        let mut g = EdgeListGraph::new();
        for (s, t) in [(0u32, 1), (1, 2), (2, 0), (2, 3)] {
            g.add_vertices_and_edge(s, t).unwrap();
        }
        assert_eq!(graph_triangle_count(&g).unwrap(), 1);
        assert_eq!(vertex_triangle_count(&g, &3).unwrap(), 0);
    }

    #[test]
    fn test_missing_vertex() {
        let g = complete(3);
        let err = vertex_triangle_count(&g, &10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(triangles_of(&g, &10).is_err());
    }

    // --- Listing tests ---

    #[test]
    fn test_triangles_of_k4_vertex() {
        let g = complete(4);
        let listed = triangles_of(&g, &0).unwrap();
        assert_eq!(
            listed,
            vec![
                Triangle::new(0, 1, 2),
                Triangle::new(0, 1, 3),
                Triangle::new(0, 2, 3)
            ]
        );
    }

    #[test]
    fn test_triangles_of_distinct_despite_parallel_edges() {
        let g = undirected(&[(0, 1), (1, 2), (2, 0), (0, 2)]);
        assert_eq!(triangles_of(&g, &0).unwrap(), vec![Triangle::new(0, 1, 2)]);
    }
}
