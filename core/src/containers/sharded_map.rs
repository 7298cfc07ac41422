//! Key-value store partitioned across a fixed number of independent maps.
//!
//! Keys are routed by `((hash mod N) + N) mod N`, where the hash comes from
//! a router hasher owned by the instance, so the placement of a key never
//! changes for the lifetime of the map. Each shard resizes independently,
//! which keeps the cost of any single rehash bounded to one shard's worth
//! of entries.
//!
//! There is no internal synchronization: sharding is purely a locality and
//! resize-amortization device.

use std::collections::hash_map::{self, Entry, HashMap, RandomState};
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::FusedIterator;

use crate::config::DEFAULT_SHARDS;
use crate::error::{GraphError, Result};

#[derive(Debug, Clone)]
pub struct ShardedMap<K, V, S = RandomState> {
    shards: Vec<HashMap<K, V, S>>,
    router: S,
}

impl<K: Hash + Eq, V> ShardedMap<K, V, RandomState> {
    /// Create a map with `shards` empty shards.
    pub fn new(shards: usize) -> Result<Self> {
        Self::with_capacity(shards, 0)
    }

    /// Create a map whose shards are pre-sized to hold `capacity` entries in total.
    pub fn with_capacity(shards: usize, capacity: usize) -> Result<Self> {
        if shards == 0 {
            return Err(GraphError::invalid_argument("shard count must be positive"));
        }
        let per_shard = capacity.div_ceil(shards);
        Self::with_factory(shards, |_| HashMap::with_capacity(per_shard))
    }
}

impl<K: Hash + Eq, V> Default for ShardedMap<K, V, RandomState> {
    fn default() -> Self {
        Self {
            shards: (0..DEFAULT_SHARDS).map(|_| HashMap::new()).collect(),
            router: RandomState::new(),
        }
    }
}

impl<K, V, S> ShardedMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Create a map whose shard backing maps come from `factory`, which is
    /// called once per shard index in order.
    pub fn with_factory<F>(shards: usize, factory: F) -> Result<Self>
    where
        F: FnMut(usize) -> HashMap<K, V, S>,
    {
        if shards == 0 {
            return Err(GraphError::invalid_argument("shard count must be positive"));
        }
        Ok(Self {
            shards: (0..shards).map(factory).collect(),
            router: S::default(),
        })
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Index of the shard that owns `key`.
    pub fn shard_of(&self, key: &K) -> usize {
        let hash = self.router.hash_one(key) as i64;
        let n = self.shards.len() as i64;
        (((hash % n) + n) % n) as usize
    }

    /// Add a new entry. Fails with `DuplicateKey` if `key` is already present.
    pub fn insert(&mut self, key: K, value: V) -> Result<()>
    where
        K: fmt::Debug,
    {
        match self.entry(key) {
            Entry::Occupied(occupied) => Err(GraphError::duplicate_key(occupied.key())),
            Entry::Vacant(vacant) => {
                vacant.insert(value);
                Ok(())
            }
        }
    }

    /// Set the value for `key`, returning the previous value if there was one.
    pub fn insert_or_replace(&mut self, key: K, value: V) -> Option<V> {
        let shard = self.shard_of(&key);
        self.shards[shard].insert(key, value)
    }

    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        let shard = self.shard_of(&key);
        self.shards[shard].entry(key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.shards[self.shard_of(key)].get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let shard = self.shard_of(key);
        self.shards[shard].get_mut(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.shards[self.shard_of(key)].contains_key(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let shard = self.shard_of(key);
        self.shards[shard].remove(key)
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        for shard in &mut self.shards {
            shard.retain(&mut keep);
        }
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(HashMap::is_empty)
    }

    /// Remove every entry. Shard count and routing are unchanged.
    pub fn clear(&mut self) {
        for shard in &mut self.shards {
            shard.clear();
        }
    }

    /// Entries in shard-round-robin order: the first entry of each shard,
    /// then the second of each, and so on.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            shards: self.shards.iter().map(HashMap::iter).collect(),
            cursor: 0,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Mutable values, shard by shard.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.shards.iter_mut().flat_map(HashMap::values_mut)
    }

    /// Mutable entries, shard by shard.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> + '_ {
        self.shards.iter_mut().flat_map(HashMap::iter_mut)
    }

    /// Per-shard entry counts, for diagnostics.
    pub fn shard_lens(&self) -> Vec<usize> {
        self.shards.iter().map(HashMap::len).collect()
    }
}

/// Round-robin iterator over a [`ShardedMap`].
pub struct Iter<'a, K, V> {
    shards: Vec<hash_map::Iter<'a, K, V>>,
    cursor: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.shards.len();
        for _ in 0..n {
            let shard = self.cursor;
            self.cursor = (self.cursor + 1) % n;
            if let Some(item) = self.shards[shard].next() {
                return Some(item);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.shards.iter().map(ExactSizeIterator::len).sum();
        (remaining, Some(remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a ShardedMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashSet;

    #[test]
    fn test_zero_shards_rejected() {
        let err = ShardedMap::<u32, u32>::new(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_default_has_fifteen_shards() {
        let map: ShardedMap<u32, u32> = ShardedMap::default();
        assert_eq!(map.shard_count(), 15);
    }

    #[test]
    fn test_insert_get_remove() {
        let mut map = ShardedMap::new(4).unwrap();
        map.insert(1u64, "a").unwrap();
        map.insert(2u64, "b").unwrap();
        assert_eq!(map.get(&1), Some(&"a"));
        assert_eq!(map.len(), 2);
        assert_eq!(map.remove(&1), Some("a"));
        assert_eq!(map.get(&1), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_duplicate_key() {
        let mut map = ShardedMap::new(3).unwrap();
        map.insert(7u32, 1).unwrap();
        let err = map.insert(7u32, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateKey);
        assert_eq!(map.get(&7), Some(&1));
    }

    #[test]
    fn test_insert_or_replace() {
        let mut map = ShardedMap::new(3).unwrap();
        assert_eq!(map.insert_or_replace(7u32, 1), None);
        assert_eq!(map.insert_or_replace(7u32, 2), Some(1));
        assert_eq!(map.get(&7), Some(&2));
    }

    #[test]
    fn test_routing_is_stable() {
        let mut map = ShardedMap::new(7).unwrap();
        for k in 0..200u32 {
            map.insert(k, k).unwrap();
        }
        for k in 0..200u32 {
            let shard = map.shard_of(&k);
            assert!(shard < 7);
            assert_eq!(map.shard_of(&k), shard);
        }
        assert_eq!(map.shard_lens().iter().sum::<usize>(), 200);
    }

    #[test]
    fn test_round_robin_enumeration() {
        let mut map = ShardedMap::new(5).unwrap();
        for k in 0..100u32 {
            map.insert(k, ()).unwrap();
        }
        // While every shard still has entries, consecutive items come from
        // consecutive shards.
        let min_len = *map.shard_lens().iter().min().unwrap();
        let order: Vec<usize> = map.keys().map(|k| map.shard_of(k)).collect();
        for (i, shard) in order.iter().take(min_len * 5).enumerate() {
            assert_eq!(*shard, i % 5);
        }
        let keys: HashSet<u32> = map.keys().copied().collect();
        assert_eq!(keys.len(), 100);
    }

    #[test]
    fn test_factory_called_per_shard() {
        let mut calls = Vec::new();
        let map: ShardedMap<u8, u8> = ShardedMap::with_factory(4, |i| {
            calls.push(i);
            HashMap::with_capacity(8)
        })
        .unwrap();
        assert_eq!(calls, vec![0, 1, 2, 3]);
        assert!(map.is_empty());
    }

    #[test]
    fn test_clear_and_retain() {
        let mut map = ShardedMap::new(3).unwrap();
        for k in 0..10u32 {
            map.insert(k, k * 2).unwrap();
        }
        map.retain(|k, _| k % 2 == 0);
        assert_eq!(map.len(), 5);
        for v in map.values_mut() {
            *v += 1;
        }
        assert_eq!(map.get(&4), Some(&9));
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.shard_count(), 3);
    }

    #[test]
    fn test_iter_size_hint() {
        let mut map = ShardedMap::new(3).unwrap();
        for k in 0..10u32 {
            map.insert(k, ()).unwrap();
        }
        let mut it = map.iter();
        assert_eq!(it.len(), 10);
        it.next();
        assert_eq!(it.len(), 9);
    }
}
