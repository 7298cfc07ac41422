//! Triangle counting by neighbor-set intersection, a concurrent per-graph
//! count cache, and the clustering coefficients built on top.
//!
//! Counts respect parallel edges: a triangle whose sides are doubled is
//! counted once per combination of parallel edges. Self-loops never
//! contribute.

mod cache;
mod clustering;
mod counting;

pub use cache::{CacheStats, TriangleCache};
pub use clustering::{average_clustering, clustering_coefficient, clustering_coefficient_cached};
pub use counting::{
    graph_triangle_count, pair_triangle_count, triangles_of, vertex_triangle_count, Triangle,
};
