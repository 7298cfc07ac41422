//! Engine settings: defaults, bounds, and JSON loading.
//!
//! Each settings struct mirrors a group of named knobs with a default and a
//! validated `[min, max]` range. Wrappers typically deserialize them from a
//! JSON document; missing fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

pub const DEFAULT_SHARDS: usize = 15;
pub const MAX_SHARDS: usize = 4096;

pub const DEFAULT_CHUNK_SIZE: usize = 10_000_000;

pub const DEFAULT_SET_CAPACITY: usize = 1000;
pub const DEFAULT_GROW_LOAD: usize = 500;
pub const DEFAULT_SHRINK_LOAD: usize = 100;
pub const DEFAULT_MIN_BUCKETS: usize = 10;
pub const DEFAULT_MAX_BUCKETS: usize = 50_000;

pub const DEFAULT_BLOCK_INTS: usize = 1 << 16;
pub const MAX_BLOCK_INTS: usize = 1 << 28;

fn check_range(name: &str, value: usize, min: usize, max: usize) -> Result<()> {
    if value < min || value > max {
        return Err(GraphError::invalid_argument(format!(
            "{name} = {value} outside [{min}, {max}]"
        )));
    }
    Ok(())
}

/// Storage layout of a graph instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    /// Number of adjacency shards; fixed for the graph's lifetime.
    pub shards: usize,
    /// Initial per-shard capacity hint.
    pub shard_capacity: usize,
    pub allow_parallel_edges: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            shards: DEFAULT_SHARDS,
            shard_capacity: 0,
            allow_parallel_edges: true,
        }
    }
}

impl GraphOptions {
    pub fn validate(&self) -> Result<()> {
        check_range("shards", self.shards, 1, MAX_SHARDS)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn with_parallel_edges(mut self, allow: bool) -> Self {
        self.allow_parallel_edges = allow;
        self
    }

    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }
}

/// Chunk geometry for [`ChunkedList`](crate::containers::ChunkedList).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkOptions {
    pub chunk_size: usize,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE }
    }
}

impl ChunkOptions {
    pub fn validate(&self) -> Result<()> {
        check_range("chunk_size", self.chunk_size, 1, usize::MAX)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }
}

/// Resize policy for [`BucketedHashSet`](crate::containers::BucketedHashSet).
///
/// The set doubles its bucket count once `len >= buckets * grow_load` and
/// halves it once `len < buckets * shrink_load`. `shrink_load` must stay
/// below half of `grow_load`, so a resize in one direction never sets up an
/// immediate resize back. The bucket count never
/// drops below `min_buckets` through shrinking and never grows past
/// `max_buckets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketOptions {
    pub initial_capacity: usize,
    pub grow_load: usize,
    pub shrink_load: usize,
    pub min_buckets: usize,
    pub max_buckets: usize,
}

impl Default for BucketOptions {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_SET_CAPACITY,
            grow_load: DEFAULT_GROW_LOAD,
            shrink_load: DEFAULT_SHRINK_LOAD,
            min_buckets: DEFAULT_MIN_BUCKETS,
            max_buckets: DEFAULT_MAX_BUCKETS,
        }
    }
}

impl BucketOptions {
    pub fn validate(&self) -> Result<()> {
        check_range("initial_capacity", self.initial_capacity, 1, usize::MAX)?;
        check_range("grow_load", self.grow_load, 1, usize::MAX)?;
        check_range("shrink_load", self.shrink_load, 0, (self.grow_load - 1) / 2)?;
        check_range("min_buckets", self.min_buckets, 1, usize::MAX)?;
        check_range("max_buckets", self.max_buckets, self.min_buckets, usize::MAX)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }
}

/// Stream settings shared by the graph readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoOptions {
    /// Binary reader block size, in 32-bit integers.
    pub block_ints: usize,
    /// Text lines starting with any of these prefixes are skipped.
    pub comment_markers: Vec<String>,
}

impl Default for IoOptions {
    fn default() -> Self {
        Self {
            block_ints: DEFAULT_BLOCK_INTS,
            comment_markers: vec!["#".to_string()],
        }
    }
}

impl IoOptions {
    pub fn validate(&self) -> Result<()> {
        check_range("block_ints", self.block_ints, 1, MAX_BLOCK_INTS)?;
        if self.comment_markers.iter().any(|m| m.is_empty()) {
            return Err(GraphError::invalid_argument(
                "comment marker must not be empty",
            ));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults_validate() {
        GraphOptions::default().validate().unwrap();
        ChunkOptions::default().validate().unwrap();
        BucketOptions::default().validate().unwrap();
        IoOptions::default().validate().unwrap();
    }

    #[test]
    fn test_graph_options_partial_json() {
        let opts = GraphOptions::from_json(r#"{"shards": 31}"#).unwrap();
        assert_eq!(opts.shards, 31);
        assert!(opts.allow_parallel_edges);
    }

    #[test]
    fn test_zero_shards_rejected() {
        let err = GraphOptions::from_json(r#"{"shards": 0}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_malformed_json() {
        let err = IoOptions::from_json("{block_ints:").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_bucket_shrink_above_grow_rejected() {
        let opts = BucketOptions {
            shrink_load: 600,
            ..BucketOptions::default()
        };
        assert_eq!(opts.validate().unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_bucket_shrink_at_half_grow_rejected() {
        let opts = BucketOptions {
            grow_load: 4,
            shrink_load: 2,
            ..BucketOptions::default()
        };
        assert_eq!(opts.validate().unwrap_err().kind(), ErrorKind::InvalidArgument);
        let opts = BucketOptions {
            grow_load: 5,
            shrink_load: 2,
            ..BucketOptions::default()
        };
        opts.validate().unwrap();
    }

    #[test]
    fn test_empty_comment_marker_rejected() {
        let err = IoOptions::from_json(r##"{"comment_markers": ["#", ""]}"##).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
