use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::config::IoOptions;
use crate::error::{GraphError, Result};
use crate::graph::{EdgeStore, Vertex};

use super::{GraphReader, GraphWriter, ReadSummary};

/// Terminates a record.
pub const END_OF_LINE: i32 = -1;
/// Alternate record terminator, accepted on read.
pub const END_OF_LINE_2: i32 = -2;
/// Padding, skipped on read.
pub const EMPTY: i32 = -3;

const INT_BYTES: u64 = 4;

fn is_sentinel(value: i32) -> bool {
    value == END_OF_LINE || value == END_OF_LINE_2
}

/// Vertex types that fit the binary format's non-negative `i32` ids.
pub trait BinaryId: Vertex {
    fn from_raw(raw: i32) -> Option<Self>;
    fn to_raw(self) -> Option<i32>;
}

macro_rules! impl_binary_id {
    ($($t:ty),*) => {
        $(
            impl BinaryId for $t {
                fn from_raw(raw: i32) -> Option<Self> {
                    if raw < 0 {
                        return None;
                    }
                    <$t>::try_from(raw).ok()
                }

                fn to_raw(self) -> Option<i32> {
                    i32::try_from(self).ok().filter(|raw| *raw >= 0)
                }
            }
        )*
    };
}

impl_binary_id!(i32, i64, u16, u32, u64, usize);

/// Reads the sentinel-delimited `i32` stream in fixed-size blocks.
///
/// A record is a source id, its neighbor ids, then [`END_OF_LINE`] or
/// [`END_OF_LINE_2`]. A source followed directly by a sentinel is an
/// isolated vertex. [`EMPTY`] values are padding.
#[derive(Debug)]
pub struct BinaryGraphReader<R> {
    inner: R,
    block_ints: usize,
}

impl<R: Read + Seek> BinaryGraphReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            block_ints: IoOptions::default().block_ints,
        }
    }

    pub fn with_options(inner: R, options: &IoOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            inner,
            block_ints: options.block_ints,
        })
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Fill `buf` as far as the stream allows; returns the bytes read.
    fn fill_block(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R, V> GraphReader<V> for BinaryGraphReader<R>
where
    R: Read + Seek,
    V: BinaryId,
{
    fn read_into<G: EdgeStore<V>>(&mut self, graph: &mut G) -> Result<ReadSummary> {
        let mut summary = ReadSummary::default();
        let mut block = vec![0u8; self.block_ints * INT_BYTES as usize];
        // None: expecting a source id; Some(None): the source was unusable
        let mut source: Option<Option<V>> = None;
        let mut neighbors: Vec<V> = Vec::new();

        loop {
            let filled = self.fill_block(&mut block)?;
            let whole = filled - filled % INT_BYTES as usize;
            for chunk in block[..whole].chunks_exact(INT_BYTES as usize) {
                let value = LittleEndian::read_i32(chunk);
                if value == EMPTY {
                    continue;
                }
                if is_sentinel(value) {
                    if let Some(Some(v)) = source.take() {
                        summary.edges += graph.add_vertex_and_out_edges(v, neighbors.drain(..))?;
                        summary.records += 1;
                    }
                    neighbors.clear();
                    continue;
                }
                let id = V::from_raw(value);
                if id.is_none() {
                    summary.skipped += 1;
                    tracing::trace!(value, "skipping value that is not a vertex id");
                }
                if source.is_none() {
                    source = Some(id);
                } else if let Some(n) = id {
                    neighbors.push(n);
                }
            }
            if filled < block.len() {
                if filled != whole {
                    tracing::warn!(
                        trailing_bytes = filled - whole,
                        "binary graph stream ends mid-value, ignoring the partial value"
                    );
                }
                break;
            }
        }

        // Final record without a terminator
        if let Some(Some(v)) = source {
            summary.edges += graph.add_vertex_and_out_edges(v, neighbors.drain(..))?;
            summary.records += 1;
        }

        tracing::info!(
            records = summary.records,
            edges = summary.edges,
            skipped = summary.skipped,
            "binary graph read"
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
        let length = GraphReader::<V>::length(self)?;
        let position = self.inner.stream_position()?;
        let aligned = position - position % INT_BYTES;
        self.inner.seek(SeekFrom::Start(aligned))?;
        if aligned < INT_BYTES || aligned >= length {
            return Ok(());
        }

        // Re-read the value before the cursor so a position right after a
        // sentinel stays put.
        let mut at = self.inner.seek(SeekFrom::Start(aligned - INT_BYTES))?;
        while at + INT_BYTES <= length {
            let value = self.inner.read_i32::<LittleEndian>()?;
            at += INT_BYTES;
            if is_sentinel(value) {
                return Ok(());
            }
        }
        self.inner.seek(SeekFrom::Start(length))?;
        Ok(())
    }
}

/// Writes the sentinel-delimited `i32` stream, terminating each record with
/// [`END_OF_LINE`].
#[derive(Debug)]
pub struct BinaryGraphWriter<W: Write> {
    out: BufWriter<W>,
}

impl<W: Write> BinaryGraphWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            out: BufWriter::new(inner),
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.out
            .into_inner()
            .map_err(|e| GraphError::Io(e.into_error()))
    }

    fn raw<V: BinaryId>(v: V) -> Result<i32> {
        v.to_raw().ok_or_else(|| {
            GraphError::invalid_argument(format!(
                "vertex {v:?} does not fit a non-negative 32-bit id"
            ))
        })
    }
}

impl<W, V> GraphWriter<V> for BinaryGraphWriter<W>
where
    W: Write,
    V: BinaryId,
{
    fn write_record(&mut self, source: V, neighbors: &[V]) -> Result<()> {
        // Validate first so a bad id never leaves half a record behind
        let source = Self::raw(source)?;
        let neighbors = neighbors
            .iter()
            .map(|&n| Self::raw(n))
            .collect::<Result<Vec<i32>>>()?;

        self.out.write_i32::<LittleEndian>(source)?;
        for n in neighbors {
            self.out.write_i32::<LittleEndian>(n)?;
        }
        self.out.write_i32::<LittleEndian>(END_OF_LINE)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
