use std::collections::HashSet;

use crate::error::{GraphError, Result};
use crate::graph::{AdjacencyQuery, Vertex};

/// Degree information for a single vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegreeEntry<V> {
    pub vertex: V,
    pub out_degree: usize,
    /// Full adjacency size; on a bidirectional graph this is out + in.
    pub degree: usize,
}

/// Vertices ranked by adjacent degree.
///
/// If `top_n` is 0, returns every vertex. Ties are broken by vertex id
/// (ascending).
pub fn degree_centrality<G, V>(graph: &G, top_n: usize) -> Result<Vec<DegreeEntry<V>>>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    let mut results = graph
        .vertices()
        .map(|v| {
            Ok(DegreeEntry {
                vertex: v,
                out_degree: graph.out_degree(&v)?,
                degree: graph.adjacent_degree(&v)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    results.sort_by(|a, b| b.degree.cmp(&a.degree).then(a.vertex.cmp(&b.vertex)));

    if top_n > 0 && top_n < results.len() {
        results.truncate(top_n);
    }
    Ok(results)
}

/// Fraction of the adjacency entries of `set` that leave it.
///
/// Every member must be in the graph. A set whose members have no edges at
/// all has conductance 0.
pub fn set_conductance<G, V>(graph: &G, set: &HashSet<V>) -> Result<f64>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    let mut leaving = 0usize;
    let mut total = 0usize;
    for v in set {
        for n in graph.adjacent_edges(v)? {
            if !set.contains(&n) {
                leaving += 1;
            }
            total += 1;
        }
    }
    if total == 0 {
        return Ok(0.0);
    }
    Ok(leaving as f64 / total as f64)
}

/// Conductance of `v` together with its neighbors.
pub fn neighborhood_conductance<G, V>(graph: &G, v: &V) -> Result<f64>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    if !graph.contains_vertex(v) {
        return Err(GraphError::vertex_not_found(v));
    }
    let mut neighborhood: HashSet<V> = graph.adjacent_edges(v)?.collect();
    neighborhood.insert(*v);
    set_conductance(graph, &neighborhood)
}
