//! Traversal algorithms over the [`AdjacencyQuery`](crate::graph::AdjacencyQuery)
//! contract.
//!
//! Everything here is iterative: depth-first search keeps an explicit frame
//! stack, and the component, path and metric routines are built on it or on
//! the indexed heap. Algorithms allocate their per-run state and drop it on
//! return; graphs are only borrowed.

mod components;
mod dfs;
mod metrics;
mod paths;
mod subgraph;

pub use components::{connected_components, strongly_connected_components, Components};
pub use dfs::{DepthFirstSearch, DfsSummary, DfsVisitor, Follow, NoopVisitor, VisitedState};
pub use metrics::{degree_centrality, neighborhood_conductance, set_conductance, DegreeEntry};
pub use paths::{dijkstra, dijkstra_weighted, hop_distances, ShortestPaths};
pub use subgraph::{component_subgraph, induced_subgraph, SubgraphSummary};
