//! Hash set built from a resizable array of bucket lists.
//!
//! Membership operations hash into one bucket (`abs(hash) mod buckets`) and
//! scan it. Because the buckets are plain lists, the set also offers stable
//! positional access: element `i` is found by walking bucket lengths, so the
//! set can stand in where a caller needs both `contains` and `get(i)`.
//! Enumeration order is bucket-major and changes whenever the set resizes.

use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash};

use crate::config::BucketOptions;
use crate::error::{GraphError, Result};

const SMALL_CAPACITY: usize = 100;
const CAPACITY_PER_BUCKET: usize = 10_000;
const MAX_INITIAL_BUCKETS: usize = 10_000;

#[derive(Clone)]
pub struct BucketedHashSet<T, S = RandomState> {
    buckets: Vec<Vec<T>>,
    len: usize,
    hasher: S,
    grow_load: usize,
    shrink_load: usize,
    floor: usize,
    ceiling: usize,
}

impl<T: Hash + Eq> BucketedHashSet<T, RandomState> {
    pub fn new() -> Self {
        Self::build(&BucketOptions::default())
    }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_options(&BucketOptions {
            initial_capacity: capacity,
            ..BucketOptions::default()
        })
    }

    pub fn with_options(options: &BucketOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self::build(options))
    }

    fn build(options: &BucketOptions) -> Self {
        let initial = if options.initial_capacity < SMALL_CAPACITY {
            1
        } else {
            (options.initial_capacity / CAPACITY_PER_BUCKET)
                .clamp(options.min_buckets, MAX_INITIAL_BUCKETS.max(options.min_buckets))
        };
        let ceiling = options.max_buckets.max(initial);
        Self {
            buckets: (0..initial).map(|_| Vec::new()).collect(),
            len: 0,
            hasher: RandomState::new(),
            grow_load: options.grow_load,
            shrink_load: options.shrink_load,
            floor: options.min_buckets.min(initial),
            ceiling,
        }
    }
}

impl<T: Hash + Eq> Default for BucketedHashSet<T, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + Eq, S: BuildHasher> BucketedHashSet<T, S> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_of(&self, item: &T, buckets: usize) -> usize {
        let hash = self.hasher.hash_one(item) as i64;
        (hash.unsigned_abs() % buckets as u64) as usize
    }

    pub fn contains(&self, item: &T) -> bool {
        let bucket = self.bucket_of(item, self.buckets.len());
        self.buckets[bucket].contains(item)
    }

    /// Add `item`. Returns false if it was already present.
    pub fn insert(&mut self, item: T) -> bool {
        let bucket = self.bucket_of(&item, self.buckets.len());
        if self.buckets[bucket].contains(&item) {
            return false;
        }
        self.buckets[bucket].push(item);
        self.len += 1;
        self.maybe_grow();
        true
    }

    /// Remove `item`. Returns false if it was absent.
    pub fn remove(&mut self, item: &T) -> bool {
        let bucket = self.bucket_of(item, self.buckets.len());
        match self.buckets[bucket].iter().position(|x| x == item) {
            Some(offset) => {
                self.buckets[bucket].swap_remove(offset);
                self.len -= 1;
                self.maybe_shrink();
                true
            }
            None => false,
        }
    }

    /// Position of `item` in enumeration order.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        let bucket = self.bucket_of(item, self.buckets.len());
        let offset = self.buckets[bucket].iter().position(|x| x == item)?;
        let before: usize = self.buckets[..bucket].iter().map(Vec::len).sum();
        Some(before + offset)
    }

    fn locate(&self, index: usize) -> Result<(usize, usize)> {
        if index >= self.len {
            return Err(GraphError::out_of_range(index, self.len));
        }
        let mut remaining = index;
        for (bucket, items) in self.buckets.iter().enumerate() {
            if remaining < items.len() {
                return Ok((bucket, remaining));
            }
            remaining -= items.len();
        }
        Err(GraphError::out_of_range(index, self.len))
    }

    /// Element at position `index` in enumeration order.
    pub fn get(&self, index: usize) -> Result<&T> {
        let (bucket, offset) = self.locate(index)?;
        Ok(&self.buckets[bucket][offset])
    }

    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let (bucket, offset) = self.locate(index)?;
        let item = self.buckets[bucket].swap_remove(offset);
        self.len -= 1;
        self.maybe_shrink();
        Ok(item)
    }

    /// Positions are derived from hashing, so they cannot be chosen.
    pub fn insert_at(&mut self, _index: usize, _item: T) -> Result<()> {
        Err(GraphError::unsupported(
            "positional insert into a bucketed hash set",
        ))
    }

    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.buckets.iter().flat_map(|b| b.iter())
    }

    fn maybe_grow(&mut self) {
        let buckets = self.buckets.len();
        if self.len >= buckets.saturating_mul(self.grow_load) && buckets < self.ceiling {
            self.rehash((buckets * 2).min(self.ceiling));
        }
    }

    fn maybe_shrink(&mut self) {
        let buckets = self.buckets.len();
        let target = buckets / 2;
        if self.len < buckets.saturating_mul(self.shrink_load) && target >= self.floor.max(1) {
            self.rehash(target);
        }
    }

    fn rehash(&mut self, count: usize) {
        let mut buckets: Vec<Vec<T>> = (0..count).map(|_| Vec::new()).collect();
        for item in std::mem::take(&mut self.buckets).into_iter().flatten() {
            let bucket = self.bucket_of(&item, count);
            buckets[bucket].push(item);
        }
        self.buckets = buckets;
    }
}

impl<T: fmt::Debug, S> fmt::Debug for BucketedHashSet<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.buckets.iter().flat_map(|b| b.iter()))
            .finish()
    }
}

impl<T: Hash + Eq, S: BuildHasher> Extend<T> for BucketedHashSet<T, S> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}
