//! Sequence stored across fixed-capacity chunks.
//!
//! Every chunk except the last is kept full, so index `i` lives at chunk
//! `i / chunk_size`, offset `i % chunk_size`. Positional insert and removal
//! shift elements across chunk boundaries to preserve that layout; they are
//! O(n) in the worst case and meant for occasional use.

use std::fmt;

use crate::config::{ChunkOptions, DEFAULT_CHUNK_SIZE};
use crate::error::{GraphError, Result};

#[derive(Clone)]
pub struct ChunkedList<T> {
    chunks: Vec<Vec<T>>,
    chunk_size: usize,
    len: usize,
}

impl<T> ChunkedList<T> {
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            len: 0,
        }
    }

    pub fn with_chunk_size(chunk_size: usize) -> Result<Self> {
        ChunkOptions { chunk_size }.validate()?;
        Ok(Self {
            chunks: Vec::new(),
            chunk_size,
            len: 0,
        })
    }

    pub fn with_options(options: &ChunkOptions) -> Result<Self> {
        Self::with_chunk_size(options.chunk_size)
    }

    /// Pre-allocate enough chunks to hold `capacity` elements.
    pub fn with_capacity(capacity: usize, chunk_size: usize) -> Result<Self> {
        let mut list = Self::with_chunk_size(chunk_size)?;
        let mut remaining = capacity;
        while remaining > 0 {
            let take = remaining.min(chunk_size);
            list.chunks.push(Vec::with_capacity(take));
            remaining -= take;
        }
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of allocated chunks, including empty trailing ones.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    fn locate(&self, index: usize) -> (usize, usize) {
        (index / self.chunk_size, index % self.chunk_size)
    }

    /// Append an element, opening a new chunk only when every existing one is full.
    pub fn push(&mut self, value: T) {
        let chunk_size = self.chunk_size;
        match self.chunks.iter_mut().find(|c| c.len() < chunk_size) {
            Some(chunk) => chunk.push(value),
            None => {
                let mut chunk = Vec::new();
                chunk.push(value);
                self.chunks.push(chunk);
            }
        }
        self.len += 1;
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        let (chunk, offset) = self.locate(index);
        self.chunks[chunk].get(offset)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        let (chunk, offset) = self.locate(index);
        self.chunks[chunk].get_mut(offset)
    }

    /// Replace the element at `index`, returning the old one.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        let len = self.len;
        let slot = self
            .get_mut(index)
            .ok_or_else(|| GraphError::out_of_range(index, len))?;
        Ok(std::mem::replace(slot, value))
    }

    /// Insert at `index` (which may equal `len`), pushing later elements
    /// one slot to the right across chunk boundaries.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        if index > self.len {
            return Err(GraphError::out_of_range(index, self.len));
        }
        if index == self.len {
            self.push(value);
            return Ok(());
        }
        let (mut chunk, offset) = self.locate(index);
        self.chunks[chunk].insert(offset, value);
        // Carry the overflow of each full chunk into the head of the next.
        while self.chunks[chunk].len() > self.chunk_size {
            let carry = match self.chunks[chunk].pop() {
                Some(v) => v,
                None => break,
            };
            chunk += 1;
            if chunk == self.chunks.len() {
                self.chunks.push(Vec::new());
            }
            self.chunks[chunk].insert(0, carry);
        }
        self.len += 1;
        Ok(())
    }

    /// Remove and return the element at `index`, pulling later elements one
    /// slot to the left across chunk boundaries.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        if index >= self.len {
            return Err(GraphError::out_of_range(index, self.len));
        }
        let (chunk, offset) = self.locate(index);
        let removed = self.chunks[chunk].remove(offset);
        for next in chunk + 1..self.chunks.len() {
            if self.chunks[next].is_empty() {
                break;
            }
            let head = self.chunks[next].remove(0);
            self.chunks[next - 1].push(head);
        }
        self.len -= 1;
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.len = 0;
    }

    /// Drop empty trailing chunks and release unused chunk capacity.
    pub fn trim_excess(&mut self) {
        while self.chunks.last().is_some_and(Vec::is_empty) {
            self.chunks.pop();
        }
        for chunk in &mut self.chunks {
            chunk.shrink_to_fit();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.chunks.iter().flat_map(|c| c.iter())
    }

    /// Keep only the elements for which `keep` returns true, preserving order.
    /// Returns the number of removed elements.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.len;
        let mut kept = ChunkedList {
            chunks: Vec::new(),
            chunk_size: self.chunk_size,
            len: 0,
        };
        for chunk in std::mem::take(&mut self.chunks) {
            for value in chunk {
                if keep(&value) {
                    kept.push(value);
                }
            }
        }
        *self = kept;
        before - self.len
    }
}

impl<T: PartialEq> ChunkedList<T> {
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.iter().position(|v| v == value)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.index_of(value).is_some()
    }

    /// Remove the first occurrence of `value`.
    pub fn remove(&mut self, value: &T) -> bool {
        match self.index_of(value) {
            Some(index) => self.remove_at(index).is_ok(),
            None => false,
        }
    }
}

impl<T> Default for ChunkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for ChunkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Extend<T> for ChunkedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> FromIterator<T> for ChunkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn list_of(chunk: usize, n: usize) -> ChunkedList<usize> {
        let mut list = ChunkedList::with_chunk_size(chunk).unwrap();
        list.extend(0..n);
        list
    }

    fn assert_layout(list: &ChunkedList<usize>) {
        let total: usize = list.chunks.iter().map(Vec::len).sum();
        assert_eq!(total, list.len());
        let non_empty = list.chunks.iter().filter(|c| !c.is_empty()).count();
        for chunk in list.chunks.iter().take(non_empty.saturating_sub(1)) {
            assert_eq!(chunk.len(), list.chunk_size());
        }
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let err = ChunkedList::<u8>::with_chunk_size(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_push_spans_chunks() {
        let list = list_of(4, 10);
        assert_eq!(list.len(), 10);
        assert_eq!(list.chunk_count(), 3);
        for i in 0..10 {
            assert_eq!(list.get(i), Some(&i));
        }
        assert_eq!(list.get(10), None);
        assert_layout(&list);
    }

    #[test]
    fn test_set_out_of_range() {
        let mut list = list_of(4, 3);
        assert_eq!(list.set(1, 99).unwrap(), 1);
        assert_eq!(list.get(1), Some(&99));
        let err = list.set(3, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
    }

    #[test]
    fn test_insert_cascades() {
        let mut list = list_of(3, 9);
        list.insert(1, 100).unwrap();
        let values: Vec<usize> = list.iter().copied().collect();
        assert_eq!(values, vec![0, 100, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(list.chunk_count(), 4);
        assert_layout(&list);
    }

    #[test]
    fn test_insert_at_end_and_past_end() {
        let mut list = list_of(3, 3);
        list.insert(3, 7).unwrap();
        assert_eq!(list.get(3), Some(&7));
        assert_eq!(list.insert(9, 1).unwrap_err().kind(), ErrorKind::IndexOutOfRange);
    }

    #[test]
    fn test_remove_at_cascades() {
        let mut list = list_of(3, 8);
        assert_eq!(list.remove_at(0).unwrap(), 0);
        let values: Vec<usize> = list.iter().copied().collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5, 6, 7]);
        for i in 0..7 {
            assert_eq!(list.get(i), Some(&(i + 1)));
        }
        assert_layout(&list);
    }

    #[test]
    fn test_push_after_remove_keeps_order() {
        let mut list = list_of(2, 6);
        list.remove_at(1).unwrap();
        list.push(42);
        let values: Vec<usize> = list.iter().copied().collect();
        assert_eq!(values, vec![0, 2, 3, 4, 5, 42]);
        assert_layout(&list);
    }

    #[test]
    fn test_remove_by_value() {
        let mut list = list_of(4, 6);
        assert!(list.remove(&3));
        assert!(!list.remove(&3));
        assert!(!list.contains(&3));
        assert_eq!(list.index_of(&4), Some(3));
    }

    #[test]
    fn test_with_capacity_then_fill() {
        let mut list = ChunkedList::with_capacity(10, 4).unwrap();
        assert_eq!(list.chunk_count(), 3);
        list.extend(0..10usize);
        assert_eq!(list.chunk_count(), 3);
        assert_eq!(list.get(9), Some(&9));
        assert_layout(&list);
    }

    #[test]
    fn test_trim_excess() {
        let mut list = list_of(2, 4);
        list.remove_at(0).unwrap();
        list.remove_at(0).unwrap();
        list.trim_excess();
        assert_eq!(list.chunk_count(), 1);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_retain() {
        let mut list = list_of(3, 10);
        let removed = list.retain(|v| v % 2 == 0);
        assert_eq!(removed, 5);
        let values: Vec<usize> = list.iter().copied().collect();
        assert_eq!(values, vec![0, 2, 4, 6, 8]);
        assert_layout(&list);
    }
}
