//! Array-backed binary min-heap of `(priority, value)` pairs.
//!
//! Ordering comes from an injected comparison rather than `Ord`, so callers
//! can heap on `f64` distances or reverse orders without wrapper types.
//! Values are located by linear scan for `update` / `minimum_update`; there is
//! no value-to-slot index.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{GraphError, Result};

/// Comparison used by [`BinaryHeap::new`].
pub type NaturalOrder<P> = fn(&P, &P) -> Ordering;

pub struct BinaryHeap<P, V, C = NaturalOrder<P>> {
    items: Vec<(P, V)>,
    compare: C,
}

impl<P: Ord, V> BinaryHeap<P, V, NaturalOrder<P>> {
    pub fn new() -> Self {
        Self::with_comparison(P::cmp)
    }
}

impl<P: Ord, V> Default for BinaryHeap<P, V, NaturalOrder<P>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, V, C> BinaryHeap<P, V, C>
where
    C: Fn(&P, &P) -> Ordering,
{
    pub fn with_comparison(compare: C) -> Self {
        Self::with_capacity(16, compare)
    }

    pub fn with_capacity(capacity: usize, compare: C) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            compare,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    fn less_or_equal(&self, i: usize, j: usize) -> bool {
        (self.compare)(&self.items[i].0, &self.items[j].0) != Ordering::Greater
    }

    pub fn push(&mut self, priority: P, value: V) {
        self.items.push((priority, value));
        self.sift_up(self.items.len() - 1);
    }

    /// The minimum entry without removing it.
    pub fn peek(&self) -> Result<(&P, &V)> {
        self.items
            .first()
            .map(|(p, v)| (p, v))
            .ok_or_else(|| GraphError::out_of_range(0, 0))
    }

    /// Remove and return the minimum entry.
    pub fn pop(&mut self) -> Result<(P, V)> {
        self.remove_at(0)
    }

    pub fn get(&self, index: usize) -> Result<(&P, &V)> {
        self.items
            .get(index)
            .map(|(p, v)| (p, v))
            .ok_or_else(|| GraphError::out_of_range(index, self.items.len()))
    }

    /// Remove the entry at heap slot `index`.
    ///
    /// The tail entry fills the hole and is sifted in whichever direction
    /// restores the heap order.
    pub fn remove_at(&mut self, index: usize) -> Result<(P, V)> {
        let len = self.items.len();
        if index >= len {
            return Err(GraphError::out_of_range(index, len));
        }
        Ok(self.take(index))
    }

    /// Remove the entry at an in-bounds `index` and restore heap order.
    fn take(&mut self, index: usize) -> (P, V) {
        let removed = self.items.swap_remove(index);
        if index < self.items.len() {
            if index > 0 && !self.less_or_equal((index - 1) / 2, index) {
                self.sift_up(index);
            } else {
                self.sift_down(index);
            }
        }
        removed
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.less_or_equal(parent, index) {
                break;
            }
            self.items.swap(parent, index);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * index + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && !self.less_or_equal(left, right) {
                right
            } else {
                left
            };
            if self.less_or_equal(index, child) {
                break;
            }
            self.items.swap(index, child);
            index = child;
        }
    }

    /// Entries in heap-array order.
    pub fn iter(&self) -> impl Iterator<Item = (&P, &V)> + '_ {
        self.items.iter().map(|(p, v)| (p, v))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.items.iter().map(|(_, v)| v)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<P, V, C> BinaryHeap<P, V, C>
where
    V: PartialEq,
    C: Fn(&P, &P) -> Ordering,
{
    pub fn index_of(&self, value: &V) -> Option<usize> {
        self.items.iter().position(|(_, v)| v == value)
    }

    /// Set the priority of `value`, inserting it if absent.
    pub fn update(&mut self, priority: P, value: V) {
        if let Some(index) = self.index_of(&value) {
            self.take(index);
        }
        self.push(priority, value);
    }

    /// Lower the priority of `value` (decrease-key), inserting it if absent.
    ///
    /// Returns false, leaving the heap unchanged, when `value` is present with
    /// a priority strictly smaller than `priority`.
    pub fn minimum_update(&mut self, priority: P, value: V) -> bool {
        if let Some(index) = self.index_of(&value) {
            if (self.compare)(&priority, &self.items[index].0) == Ordering::Greater {
                return false;
            }
            self.take(index);
        }
        self.push(priority, value);
        true
    }
}

impl<P: fmt::Debug, V: fmt::Debug, C> fmt::Debug for BinaryHeap<P, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryHeap")
            .field("items", &self.items)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn drain<P: Copy, V, C: Fn(&P, &P) -> Ordering>(heap: &mut BinaryHeap<P, V, C>) -> Vec<P> {
        let mut out = Vec::new();
        while let Ok((p, _)) = heap.pop() {
            out.push(p);
        }
        out
    }

    #[test]
    fn test_pop_in_order() {
        let mut heap = BinaryHeap::new();
        for (p, v) in [(5, 'a'), (1, 'b'), (4, 'c'), (2, 'd'), (3, 'e')] {
            heap.push(p, v);
        }
        assert_eq!(heap.peek().unwrap(), (&1, &'b'));
        assert_eq!(drain(&mut heap), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_heap_errors() {
        let mut heap: BinaryHeap<u32, u32> = BinaryHeap::new();
        assert_eq!(heap.peek().unwrap_err().kind(), ErrorKind::IndexOutOfRange);
        assert_eq!(heap.pop().unwrap_err().kind(), ErrorKind::IndexOutOfRange);
        assert_eq!(heap.get(0).unwrap_err().kind(), ErrorKind::IndexOutOfRange);
    }

    #[test]
    fn test_reverse_comparison() {
        let mut heap = BinaryHeap::with_comparison(|a: &i32, b: &i32| b.cmp(a));
        for p in [3, 9, 1, 7] {
            heap.push(p, ());
        }
        assert_eq!(drain(&mut heap), vec![9, 7, 3, 1]);
    }

    #[test]
    fn test_float_priorities() {
        let mut heap = BinaryHeap::with_comparison(|a: &f64, b: &f64| a.total_cmp(b));
        heap.push(2.5, "x");
        heap.push(0.5, "y");
        heap.push(1.5, "z");
        assert_eq!(heap.pop().unwrap(), (0.5, "y"));
    }

    #[test]
    fn test_remove_at_sifts_up() {
        // Tail entry (priority 2) lands under a larger parent after removal.
        let mut heap = BinaryHeap::new();
        for p in [0, 10, 1, 11, 12, 2, 3, 13, 14, 15, 16, 4] {
            heap.push(p, p);
        }
        let slot = heap.index_of(&11).unwrap();
        assert_eq!(heap.remove_at(slot).unwrap(), (11, 11));
        assert_eq!(drain(&mut heap), vec![0, 1, 2, 3, 4, 10, 12, 13, 14, 15, 16]);
    }

    #[test]
    fn test_remove_at_out_of_range() {
        let mut heap = BinaryHeap::new();
        heap.push(1, 1);
        assert_eq!(heap.remove_at(1).unwrap_err().kind(), ErrorKind::IndexOutOfRange);
    }

    #[test]
    fn test_update_moves_value() {
        let mut heap = BinaryHeap::new();
        heap.push(1, "a");
        heap.push(2, "b");
        heap.update(0, "b");
        assert_eq!(heap.len(), 2);
        assert_eq!(heap.pop().unwrap(), (0, "b"));
        heap.update(5, "c");
        assert_eq!(heap.len(), 2);
    }

    #[test]
    fn test_updates_keep_heap_order() {
        let mut heap = BinaryHeap::new();
        for v in 0..20u32 {
            heap.push(v * 10, v);
        }
        heap.update(500, 3);
        assert!(heap.minimum_update(1, 15));
        assert!(!heap.minimum_update(95, 9));
        let popped: Vec<(u32, u32)> = std::iter::from_fn(|| heap.pop().ok()).collect();
        assert_eq!(popped.len(), 20);
        assert_eq!(popped[1], (1, 15));
        assert_eq!(popped.last(), Some(&(500, 3)));
        assert!(popped.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[test]
    fn test_minimum_update() {
        let mut heap = BinaryHeap::new();
        heap.push(5, 'v');
        assert!(!heap.minimum_update(7, 'v'));
        assert_eq!(heap.peek().unwrap(), (&5, &'v'));
        assert!(heap.minimum_update(5, 'v'));
        assert!(heap.minimum_update(2, 'v'));
        assert_eq!(heap.len(), 1);
        assert_eq!(heap.peek().unwrap(), (&2, &'v'));
        assert!(heap.minimum_update(9, 'w'));
        assert_eq!(heap.len(), 2);
    }

    #[test]
    fn test_values_and_iter() {
        let mut heap = BinaryHeap::new();
        heap.push(2, 20);
        heap.push(1, 10);
        let mut values: Vec<i32> = heap.values().copied().collect();
        values.sort();
        assert_eq!(values, vec![10, 20]);
        assert_eq!(heap.iter().count(), 2);
    }
}
