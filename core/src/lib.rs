//! walkgraph-core: In-memory large-graph engine.
//!
//! Sharded adjacency storage for directed, undirected, bidirectional and
//! edge-list graphs, iterative traversal algorithms that survive graphs far
//! deeper than the call stack, cached triangle counting, and streaming
//! import/export in a compact binary format or delimited text.
//!
//! The engine is consumed through the [`graph::AdjacencyQuery`] contract
//! (indexed neighbor access) plus mutation events, which is all a
//! random-walk sampler needs. The library owns no threads or global state;
//! the bench crate drives it from the command line.

pub mod config;
pub mod containers;
pub mod error;
pub mod graph;
pub mod io;
pub mod traversal;
pub mod triangles;

pub use config::{BucketOptions, ChunkOptions, GraphOptions, IoOptions};
pub use error::{ErrorKind, GraphError, Result};
pub use graph::{
    AdjacencyGraph, AdjacencyQuery, BidirectionalGraph, Edge, EdgeListGraph, EdgeStore,
    GraphBase, GraphEvent, GraphId, Observable, UndirectedGraph, Vertex, VertexStore, Weighted,
    WeightedGraph,
};
pub use io::{GraphReader, GraphWriter};
pub use triangles::TriangleCache;
