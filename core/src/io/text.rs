use std::fmt::Display;
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::str::FromStr;

use crate::config::IoOptions;
use crate::error::{GraphError, Result};
use crate::graph::{EdgeStore, Vertex};

use super::{GraphReader, GraphWriter, ReadSummary};

const DELIMITERS: [char; 3] = [' ', ',', '\t'];

/// Line layout written by [`TextGraphWriter`]. The reader accepts both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextLayout {
    /// `u<TAB>v`, one line per edge
    #[default]
    EdgePairs,
    /// `v,n1,n2,...`, one line per vertex
    Adjacency,
}

/// Reads delimited text: the first token of a line is the source, the rest
/// are its neighbors. Lines starting with a comment marker are ignored, as
/// are lines whose first token is not a vertex id. Bad neighbor tokens are
/// skipped without dropping the rest of the line.
#[derive(Debug)]
pub struct TextGraphReader<R> {
    inner: BufReader<R>,
    comment_markers: Vec<String>,
}

impl<R: Read + Seek> TextGraphReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            comment_markers: IoOptions::default().comment_markers,
        }
    }

    pub fn with_options(inner: R, options: &IoOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            inner: BufReader::new(inner),
            comment_markers: options.comment_markers.clone(),
        })
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }

    fn is_comment(&self, line: &str) -> bool {
        self.comment_markers
            .iter()
            .any(|marker| !marker.is_empty() && line.starts_with(marker.as_str()))
    }
}

impl<R, V> GraphReader<V> for TextGraphReader<R>
where
    R: Read + Seek,
    V: Vertex + FromStr,
{
    fn read_into<G: EdgeStore<V>>(&mut self, graph: &mut G) -> Result<ReadSummary> {
        let mut summary = ReadSummary::default();
        let mut raw: Vec<u8> = Vec::new();
        let mut neighbors: Vec<V> = Vec::new();

        loop {
            raw.clear();
            if self.inner.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            // Invalid UTF-8 becomes U+FFFD, which then fails to parse as an id
            let line = String::from_utf8_lossy(&raw);
            let record = line.trim_end_matches(['\n', '\r']);
            if record.is_empty() || self.is_comment(record) {
                continue;
            }

            let mut tokens = record.split(DELIMITERS).filter(|t| !t.is_empty());
            let Some(first) = tokens.next() else {
                continue;
            };
            let Ok(source) = first.parse::<V>() else {
                summary.skipped += 1;
                tracing::trace!(token = first, "skipping line with unparseable source");
                continue;
            };

            neighbors.clear();
            for token in tokens {
                match token.parse::<V>() {
                    Ok(n) => neighbors.push(n),
                    Err(_) => {
                        summary.skipped += 1;
                        tracing::trace!(token, "skipping unparseable neighbor");
                    }
                }
            }
            summary.edges += graph.add_vertex_and_out_edges(source, neighbors.drain(..))?;
            summary.records += 1;
        }

        tracing::info!(
            records = summary.records,
            edges = summary.edges,
            skipped = summary.skipped,
            "text graph read"
        );
        Ok(summary)
    }

    fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    fn set_position(&mut self, position: u64) -> Result<()> {
        let length = GraphReader::<V>::length(self)?;
        self.inner.seek(SeekFrom::Start(position.min(length)))?;
        GraphReader::<V>::calibrate(self)
    }

    fn length(&mut self) -> Result<u64> {
        let here = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(here))?;
        Ok(end)
    }

    fn reset(&mut self) -> Result<()> {
        self.inner.seek(SeekFrom::Start(0))?;
        Ok(())
    }

    fn calibrate(&mut self) -> Result<()> {
        let position = self.inner.stream_position()?;
        let length = GraphReader::<V>::length(self)?;
        if position == 0 || position >= length {
            return Ok(());
        }
        // Step back one byte: if it is the newline ending the previous line
        // the cursor was already at a line start and stays there.
        self.inner.seek(SeekFrom::Start(position - 1))?;
        let mut skipped = Vec::new();
        self.inner.read_until(b'\n', &mut skipped)?;
        Ok(())
    }
}

/// Writes delimited text in either [`TextLayout`].
///
/// A vertex with nothing to write still gets a line holding just its id, so
/// isolated vertices survive a round trip.
#[derive(Debug)]
pub struct TextGraphWriter<W: Write> {
    out: BufWriter<W>,
    layout: TextLayout,
}

impl<W: Write> TextGraphWriter<W> {
    pub fn new(inner: W, layout: TextLayout) -> Self {
        Self {
            out: BufWriter::new(inner),
            layout,
        }
    }

    pub fn layout(&self) -> TextLayout {
        self.layout
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.out
            .into_inner()
            .map_err(|e| GraphError::Io(e.into_error()))
    }
}

impl<W, V> GraphWriter<V> for TextGraphWriter<W>
where
    W: Write,
    V: Vertex + Display,
{
    fn write_record(&mut self, source: V, neighbors: &[V]) -> Result<()> {
        if neighbors.is_empty() {
            writeln!(self.out, "{source}")?;
            return Ok(());
        }
        match self.layout {
            TextLayout::EdgePairs => {
                for n in neighbors {
                    writeln!(self.out, "{source}\t{n}")?;
                }
            }
            TextLayout::Adjacency => {
                write!(self.out, "{source}")?;
                for n in neighbors {
                    write!(self.out, ",{n}")?;
                }
                writeln!(self.out)?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        AdjacencyGraph, AdjacencyQuery, BidirectionalGraph, GraphBase, UndirectedGraph,
        VertexStore,
    };
    use std::collections::HashMap;
    use std::io::Cursor;

    fn reader(text: &str) -> TextGraphReader<Cursor<Vec<u8>>> {
        TextGraphReader::new(Cursor::new(text.as_bytes().to_vec()))
    }

    fn adjacency_of<G: AdjacencyQuery<u32>>(g: &G) -> HashMap<u32, Vec<u32>> {
        g.vertices()
            .map(|v| {
                let mut ns: Vec<u32> = g.adjacent_edges(&v).unwrap().collect();
                ns.sort_unstable();
                (v, ns)
            })
            .collect()
    }

    // --- Reader tests ---

    #[test]
    fn test_mixed_delimiters_and_comments() {
        let text = "# header\n1 2,3\t4\n\n2,3\n# 9 9\n5\n";
        let g: AdjacencyGraph<u32> = reader(text).read_graph().unwrap();
        assert_eq!(g.vertex_count(), 5);
        assert_eq!(g.edge_count(), 4);
        assert!(g.contains_edge(&1, &4));
        assert!(!g.contains_vertex(&9));
    }

    #[test]
    fn test_invalid_utf8_token_skipped() {
        let bytes = b"1 2\n3 4 \xff\xfe\n5 6\n".to_vec();
        let mut g: AdjacencyGraph<u32> = AdjacencyGraph::new();
        let summary = TextGraphReader::new(Cursor::new(bytes))
            .read_into(&mut g)
            .unwrap();
        assert_eq!(summary.records, 3);
        assert_eq!(summary.edges, 3);
        assert_eq!(summary.skipped, 1);
        assert!(g.contains_edge(&3, &4));
        assert!(g.contains_edge(&5, &6));
        assert_eq!(g.vertex_count(), 6);
    }

    #[test]
    fn test_bad_tokens_skipped() {
        let text = "x 1 2\n1 two 3\n-4 5\n";
        let mut g: AdjacencyGraph<u32> = AdjacencyGraph::new();
        let summary = reader(text).read_into(&mut g).unwrap();
        assert_eq!(summary.records, 1);
        assert_eq!(summary.skipped, 3);
        assert!(g.contains_edge(&1, &3));
        assert!(!g.contains_vertex(&2));
    }

    #[test]
    fn test_crlf_lines() {
        let g: AdjacencyGraph<u32> = reader("1\t2\r\n2\t3\r\n").read_graph().unwrap();
        assert!(g.contains_edge(&2, &3));
    }

    #[test]
    fn test_custom_comment_markers() {
        let options = IoOptions {
            comment_markers: vec!["%".to_string(), "//".to_string()],
            ..IoOptions::default()
        };
        let data = Cursor::new(b"% matrix market\n// note\n1 2\n".to_vec());
        let mut r = TextGraphReader::with_options(data, &options).unwrap();
        let g: AdjacencyGraph<u32> = r.read_graph().unwrap();
        assert_eq!(g.vertex_count(), 2);
    }

    #[test]
    fn test_read_as_bidirectional() {
        let g: BidirectionalGraph<u32> = reader("1 2\n3 2\n").read_bidirectional().unwrap();
        assert_eq!(g.in_degree(&2).unwrap(), 2);
    }

    #[test]
    fn test_string_vertices() {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        struct Tag(u8);
        impl FromStr for Tag {
            type Err = ();
            fn from_str(s: &str) -> std::result::Result<Self, ()> {
                match s.as_bytes() {
                    [b] if b.is_ascii_lowercase() => Ok(Tag(*b)),
                    _ => Err(()),
                }
            }
        }
        let g: AdjacencyGraph<Tag> = reader("a b c\nb c\n").read_graph().unwrap();
        assert_eq!(g.edge_count(), 3);
        assert!(g.contains_edge(&Tag(b'b'), &Tag(b'c')));
    }

    // --- Calibration tests ---

    #[test]
    fn test_calibrate_to_next_line() {
        // Lines start at 0, 4, 10
        let mut r = reader("1 2\n3 4 5\n6\n");
        for (from, to) in [(0, 0), (1, 4), (4, 4), (5, 10), (9, 10), (10, 10), (99, 12)] {
            GraphReader::<u32>::set_position(&mut r, from).unwrap();
            assert_eq!(GraphReader::<u32>::position(&mut r).unwrap(), to, "from {from}");
        }
    }

    #[test]
    fn test_partitioned_read_covers_every_line() {
        let text = "1 2\n3 4 5\n6 7\n8\n9 1\n";
        let length = text.len() as u64;
        let mut merged: AdjacencyGraph<u32> = AdjacencyGraph::new();
        let mut r = reader(text);

        // Each part reads whole lines from its calibrated start until the
        // next part's calibrated start.
        let cuts: Vec<u64> = [0, 5, 13, length]
            .into_iter()
            .map(|p| {
                GraphReader::<u32>::set_position(&mut r, p).unwrap();
                GraphReader::<u32>::position(&mut r).unwrap()
            })
            .collect();
        for pair in cuts.windows(2) {
            let slice = &text.as_bytes()[pair[0] as usize..pair[1] as usize];
            let mut part = TextGraphReader::new(Cursor::new(slice.to_vec()));
            part.read_into(&mut merged).unwrap();
        }

        let whole: AdjacencyGraph<u32> = reader(text).read_graph().unwrap();
        assert_eq!(adjacency_of(&merged), adjacency_of(&whole));
    }

    // --- Writer tests ---

    #[test]
    fn test_edge_pairs_layout() {
        let mut g = AdjacencyGraph::new();
        g.add_vertices_and_edge(1u32, 2).unwrap();
        g.add_vertices_and_edge(1u32, 3).unwrap();
        let mut w = TextGraphWriter::new(Vec::new(), TextLayout::EdgePairs);
        w.write_graph(&g).unwrap();
        let out = String::from_utf8(w.into_inner().unwrap()).unwrap();
        let mut lines: Vec<&str> = out.lines().collect();
        lines.sort_unstable();
        assert_eq!(lines, vec!["1\t2", "1\t3", "2", "3"]);
    }

    #[test]
    fn test_adjacency_layout_undirected_filter() {
        let mut g = UndirectedGraph::new();
        g.add_vertices_and_edge(2u32, 1).unwrap();
        g.add_vertices_and_edge(2u32, 3).unwrap();
        let mut w = TextGraphWriter::new(Vec::new(), TextLayout::Adjacency);
        let summary = w.write_graph(&g).unwrap();
        assert_eq!(summary.edges, 2);
        let out = String::from_utf8(w.into_inner().unwrap()).unwrap();
        let mut lines: Vec<&str> = out.lines().collect();
        lines.sort_unstable();
        assert_eq!(lines, vec!["1,2", "2,3", "3"]);
    }

    #[test]
    fn test_write_part_filters_when_undirected() {
        let mut w = TextGraphWriter::new(Vec::new(), TextLayout::Adjacency);
        let part = vec![(5u32, vec![1u32, 5, 9])];
        w.write_part(part.clone(), false).unwrap();
        w.write_part(part, true).unwrap();
        let out = String::from_utf8(w.into_inner().unwrap()).unwrap();
        assert_eq!(out, "5,5,9\n5,1,5,9\n");
    }

    #[test]
    fn test_round_trip_both_layouts() {
        let mut g = UndirectedGraph::new();
        for (s, t) in [(0u32, 1), (1, 2), (2, 0), (1, 1), (3, 4), (4, 3)] {
            g.add_vertices_and_edge(s, t).unwrap();
        }
        g.add_vertex(7).unwrap();

        for layout in [TextLayout::EdgePairs, TextLayout::Adjacency] {
            let mut w = TextGraphWriter::new(Vec::new(), layout);
            w.write_graph(&g).unwrap();
            let bytes = w.into_inner().unwrap();
            let back: UndirectedGraph<u32> = TextGraphReader::new(Cursor::new(bytes))
                .read_undirected()
                .unwrap();
            assert_eq!(back.edge_count(), g.edge_count(), "{layout:?}");
            assert_eq!(adjacency_of(&back), adjacency_of(&g), "{layout:?}");
        }
    }
}
