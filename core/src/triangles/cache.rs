use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockUpgradableReadGuard};
use serde::Serialize;

use crate::error::Result;
use crate::graph::{AdjacencyQuery, GraphId, Vertex};

use super::counting::vertex_triangle_count;

type CountMap<V> = Arc<Mutex<HashMap<V, u64>>>;

/// Counters since the cache was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Counts computed by a thread that lost the insert race and were dropped.
    pub discarded: u64,
    pub graphs: usize,
}

/// Per-vertex triangle counts, one map per graph instance.
///
/// Safe to share across threads (`Arc<TriangleCache<V>>`). The graph
/// registry sits behind an upgradable read lock: lookups of an already
/// registered graph only take the shared lock, and the exclusive lock is
/// held just long enough to register a new graph. Each graph's map has its
/// own mutex, so work on one graph never waits on another.
///
/// Counts are computed outside every lock. Two threads missing on the same
/// vertex may both compute it; the first insert wins and the other result is
/// discarded. Entries are never invalidated when a graph changes: call
/// [`clear`](Self::clear) after mutating a graph whose counts are cached.
pub struct TriangleCache<V> {
    graphs: RwLock<HashMap<GraphId, CountMap<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    discarded: AtomicU64,
}

impl<V: Vertex> Default for TriangleCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Vertex> TriangleCache<V> {
    pub fn new() -> Self {
        Self {
            graphs: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    fn counts_for(&self, id: GraphId) -> CountMap<V> {
        if let Some(counts) = self.graphs.read().get(&id) {
            return Arc::clone(counts);
        }

        let registry = self.graphs.upgradable_read();
        if let Some(counts) = registry.get(&id) {
            return Arc::clone(counts);
        }
        let mut registry = RwLockUpgradableReadGuard::upgrade(registry);
        let counts: CountMap<V> = Arc::new(Mutex::new(HashMap::new()));
        registry.insert(id, Arc::clone(&counts));
        tracing::debug!(graph = %id, "triangle cache registered graph");
        counts
    }

    /// Triangles containing `v`, computed on first request and cached.
    pub fn triangle_count<G>(&self, graph: &G, v: &V) -> Result<u64>
    where
        G: AdjacencyQuery<V>,
    {
        let counts = self.counts_for(graph.id());
        if let Some(&count) = counts.lock().get(v) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(count);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let computed = vertex_triangle_count(graph, v)?;

        let mut counts = counts.lock();
        match counts.entry(*v) {
            Entry::Occupied(existing) => {
                self.discarded.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(vertex = ?v, "triangle count computed twice, keeping first");
                Ok(*existing.get())
            }
            Entry::Vacant(slot) => Ok(*slot.insert(computed)),
        }
    }

    /// The cached count, without computing anything.
    pub fn cached(&self, id: GraphId, v: &V) -> Option<u64> {
        let counts = self.graphs.read().get(&id).map(Arc::clone)?;
        let count = counts.lock().get(v).copied();
        count
    }

    /// Number of cached vertices for graph `id`.
    pub fn cached_len(&self, id: GraphId) -> usize {
        self.graphs
            .read()
            .get(&id)
            .map_or(0, |counts| counts.lock().len())
    }

    /// Forget every count for graph `id`. Returns false if nothing was cached.
    ///
    /// A count being computed concurrently for this graph may still land in
    /// the detached map and is then lost; it does not resurrect the entry.
    pub fn clear(&self, id: GraphId) -> bool {
        let removed = self.graphs.write().remove(&id);
        match removed {
            Some(counts) => {
                counts.lock().clear();
                tracing::debug!(graph = %id, "triangle cache cleared");
                true
            }
            None => false,
        }
    }

    pub fn clear_all(&self) {
        self.graphs.write().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            graphs: self.graphs.read().len(),
        }
    }
}

impl<V> std::fmt::Debug for TriangleCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriangleCache")
            .field("graphs", &self.graphs.read().len())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}
