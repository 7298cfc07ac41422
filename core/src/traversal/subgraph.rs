use std::collections::HashSet;

use crate::error::{GraphError, Result};
use crate::graph::{AdjacencyQuery, EdgeStore, Vertex};

use super::components::Components;

/// What an extraction copied into the target graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubgraphSummary {
    pub vertex_count: usize,
    pub edge_count: usize,
}

/// Copy `vertices` and every edge between them from `graph` into `target`.
///
/// Directed sources are read through their out-edges; undirected ones emit
/// each edge from its lower endpoint only, so nothing is copied twice.
/// Parallel edges are copied as far as `target` accepts them.
pub fn induced_subgraph<G, H, V>(
    graph: &G,
    vertices: &HashSet<V>,
    target: &mut H,
) -> Result<SubgraphSummary>
where
    G: AdjacencyQuery<V>,
    H: EdgeStore<V>,
    V: Vertex,
{
    target.ensure_mutable()?;
    let mut summary = SubgraphSummary::default();

    // Phase 1: vertices, so isolated members survive
    let mut members: Vec<V> = vertices.iter().copied().collect();
    members.sort_unstable();
    for &v in &members {
        if !graph.contains_vertex(&v) {
            return Err(GraphError::vertex_not_found(&v));
        }
        target.add_vertex(v)?;
        summary.vertex_count += 1;
    }

    // Phase 2: edges with both endpoints inside the set
    let directed = graph.is_directed();
    for &v in &members {
        let neighbors: Vec<V> = if directed {
            graph.out_edges(&v)?.collect()
        } else {
            graph.adjacent_edges(&v)?.filter(|n| v <= *n).collect()
        };
        for n in neighbors {
            if vertices.contains(&n) && target.add_edge(v, n)? {
                summary.edge_count += 1;
            }
        }
    }

    tracing::debug!(
        vertices = summary.vertex_count,
        edges = summary.edge_count,
        "induced subgraph extracted"
    );
    Ok(summary)
}

/// Copy the largest component of `components` into `target`.
pub fn component_subgraph<G, H, V>(
    graph: &G,
    components: &Components<V>,
    target: &mut H,
) -> Result<SubgraphSummary>
where
    G: AdjacencyQuery<V>,
    H: EdgeStore<V>,
    V: Vertex,
{
    let Some((largest, _)) = components.largest() else {
        return Ok(SubgraphSummary::default());
    };
    let members: HashSet<V> = components.members(largest).into_iter().collect();
    induced_subgraph(graph, &members, target)
}
