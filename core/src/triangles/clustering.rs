use tracing::instrument;

use crate::error::Result;
use crate::graph::{AdjacencyQuery, Vertex};

use super::cache::TriangleCache;
use super::counting::vertex_triangle_count;

fn coefficient<G, V>(graph: &G, v: &V, triangles: u64) -> Result<f64>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    let degree = graph
        .adjacent_degree(v)?
        .saturating_sub(graph.multiplicity(v, v)?);
    if degree <= 1 {
        return Ok(0.0);
    }
    let pairs = (degree * (degree - 1)) as f64;
    let triangles = triangles as f64;
    if graph.adjacency_is_symmetric() {
        Ok(2.0 * triangles / pairs)
    } else {
        Ok(triangles / pairs)
    }
}

/// Local clustering coefficient of `v`.
///
/// Self-loops do not count towards the degree, and a vertex with fewer than
/// two other neighbor entries scores 0.
pub fn clustering_coefficient<G, V>(graph: &G, v: &V) -> Result<f64>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    let triangles = vertex_triangle_count(graph, v)?;
    coefficient(graph, v, triangles)
}

/// Like [`clustering_coefficient`], reading the triangle count through `cache`.
pub fn clustering_coefficient_cached<G, V>(
    graph: &G,
    v: &V,
    cache: &TriangleCache<V>,
) -> Result<f64>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    let triangles = cache.triangle_count(graph, v)?;
    coefficient(graph, v, triangles)
}

/// Mean local coefficient over all vertices, skipping NaN scores.
/// Returns NaN for a graph without vertices.
#[instrument(skip(graph, cache), fields(vertices = graph.vertex_count(), cached = cache.is_some()))]
pub fn average_clustering<G, V>(graph: &G, cache: Option<&TriangleCache<V>>) -> Result<f64>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    let mut sum = 0.0;
    let mut counted = 0usize;
    for v in graph.vertices() {
        let c = match cache {
            Some(cache) => clustering_coefficient_cached(graph, &v, cache)?,
            None => clustering_coefficient(graph, &v)?,
        };
        if c.is_nan() {
            continue;
        }
        sum += c;
        counted += 1;
    }
    Ok(sum / counted as f64)
}
