//! Graph serialization: a sentinel-delimited little-endian `i32` stream and
//! delimited text.
//!
//! Both formats are record oriented: a source vertex followed by its
//! neighbors. Readers bulk-load records through
//! [`EdgeStore::add_vertex_and_out_edges`] and can be repositioned anywhere
//! in the stream; [`GraphReader::calibrate`] then snaps forward to the next
//! record boundary, so a file can be split into byte ranges and read in
//! parts. Vertex ids must parse from and print to the chosen format.

mod binary;
mod text;

use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::graph::{
    AdjacencyGraph, AdjacencyQuery, BidirectionalGraph, EdgeStore, UndirectedGraph, Vertex,
};

pub use binary::{BinaryGraphReader, BinaryGraphWriter, BinaryId, EMPTY, END_OF_LINE, END_OF_LINE_2};
pub use text::{TextGraphReader, TextGraphWriter, TextLayout};

/// On-disk layouts, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GraphFormat {
    /// `.bin`: sentinel-delimited `i32` stream
    Binary,
    /// `.csv`: one `v,n1,n2` line per vertex
    AdjacencyCsv,
    /// `.txt`: one `u<TAB>v` line per edge
    EdgePairs,
}

impl GraphFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "bin" => Some(GraphFormat::Binary),
            "csv" => Some(GraphFormat::AdjacencyCsv),
            "txt" => Some(GraphFormat::EdgePairs),
            _ => None,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Text layout for the text formats, `None` for binary.
    pub fn text_layout(self) -> Option<TextLayout> {
        match self {
            GraphFormat::Binary => None,
            GraphFormat::AdjacencyCsv => Some(TextLayout::Adjacency),
            GraphFormat::EdgePairs => Some(TextLayout::EdgePairs),
        }
    }
}

/// Counts from one `read_into` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadSummary {
    pub records: usize,
    /// Edges the target graph accepted.
    pub edges: usize,
    /// Tokens or values that could not be turned into a vertex id.
    pub skipped: usize,
}

/// Counts from one write call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub records: usize,
    pub edges: usize,
}

impl WriteSummary {
    fn add(&mut self, neighbors: usize) {
        self.records += 1;
        self.edges += neighbors;
    }
}

pub trait GraphReader<V: Vertex> {
    /// Read every record from the current position to the end of the stream
    /// into `graph`, creating vertices as needed.
    fn read_into<G: EdgeStore<V>>(&mut self, graph: &mut G) -> Result<ReadSummary>;

    /// Current byte offset.
    fn position(&mut self) -> Result<u64>;

    /// Move to `position` (clamped to the stream length), then calibrate.
    fn set_position(&mut self, position: u64) -> Result<()>;

    /// Stream length in bytes.
    fn length(&mut self) -> Result<u64>;

    /// Back to the first byte.
    fn reset(&mut self) -> Result<()>;

    /// Advance to the start of the next whole record, unless already at the
    /// start or the end of the stream.
    fn calibrate(&mut self) -> Result<()>;

    fn read_graph(&mut self) -> Result<AdjacencyGraph<V>> {
        let mut graph = AdjacencyGraph::new();
        self.read_into(&mut graph)?;
        Ok(graph)
    }

    /// Each record line is taken as a set of undirected edges, so the input
    /// should list every edge once, as
    /// [`GraphWriter::write_graph_as_undirected`] does.
    fn read_undirected(&mut self) -> Result<UndirectedGraph<V>> {
        let mut graph = UndirectedGraph::new();
        self.read_into(&mut graph)?;
        Ok(graph)
    }

    fn read_bidirectional(&mut self) -> Result<BidirectionalGraph<V>> {
        let mut graph = BidirectionalGraph::new();
        self.read_into(&mut graph)?;
        Ok(graph)
    }
}

pub trait GraphWriter<V: Vertex> {
    /// Emit one record. An empty `neighbors` slice still records `source`.
    fn write_record(&mut self, source: V, neighbors: &[V]) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    /// Directed graphs are written through their out-edges, undirected ones
    /// as by [`write_graph_as_undirected`](Self::write_graph_as_undirected).
    fn write_graph<G>(&mut self, graph: &G) -> Result<WriteSummary>
    where
        G: AdjacencyQuery<V>,
    {
        if !graph.is_directed() {
            return self.write_graph_as_undirected(graph);
        }
        let mut summary = WriteSummary::default();
        let mut neighbors = Vec::new();
        for v in graph.vertices() {
            neighbors.clear();
            neighbors.extend(graph.out_edges(&v)?);
            self.write_record(v, &neighbors)?;
            summary.add(neighbors.len());
        }
        self.flush()?;
        tracing::info!(records = summary.records, edges = summary.edges, "graph written");
        Ok(summary)
    }

    /// Write the full adjacency keeping only neighbors `>=` their source, so
    /// every symmetric pair is stored once. On a bidirectional graph this
    /// folds in- and out-edges together.
    fn write_graph_as_undirected<G>(&mut self, graph: &G) -> Result<WriteSummary>
    where
        G: AdjacencyQuery<V>,
    {
        let mut summary = WriteSummary::default();
        let mut neighbors = Vec::new();
        for v in graph.vertices() {
            neighbors.clear();
            neighbors.extend(graph.adjacent_edges(&v)?.filter(|n| *n >= v));
            self.write_record(v, &neighbors)?;
            summary.add(neighbors.len());
        }
        self.flush()?;
        tracing::info!(
            records = summary.records,
            edges = summary.edges,
            "graph written as undirected"
        );
        Ok(summary)
    }

    /// Write a detached piece of adjacency, e.g. one produced by a
    /// partitioned reader. With `directed == false` the same `>=` filter as
    /// `write_graph_as_undirected` applies.
    fn write_part<I, N>(&mut self, part: I, directed: bool) -> Result<WriteSummary>
    where
        I: IntoIterator<Item = (V, N)>,
        N: IntoIterator<Item = V>,
    {
        let mut summary = WriteSummary::default();
        let mut neighbors = Vec::new();
        for (v, list) in part {
            neighbors.clear();
            neighbors.extend(list.into_iter().filter(|n| directed || *n >= v));
            self.write_record(v, &neighbors)?;
            summary.add(neighbors.len());
        }
        Ok(summary)
    }
}
