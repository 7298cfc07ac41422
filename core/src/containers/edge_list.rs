//! Per-vertex neighbor sequences.
//!
//! Graphs that allow parallel edges keep a plain list; graphs that forbid
//! them pair the list with a hash set so membership checks stay O(1) while
//! indexed access keeps working.

use std::collections::HashSet;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub enum EdgeList<V> {
    /// Ordered neighbors, duplicates allowed.
    List(Vec<V>),
    /// Ordered distinct neighbors plus a membership index.
    Set { order: Vec<V>, members: HashSet<V> },
}

impl<V: Copy + Eq + Hash> EdgeList<V> {
    pub fn new(allow_parallel_edges: bool) -> Self {
        if allow_parallel_edges {
            EdgeList::List(Vec::new())
        } else {
            EdgeList::Set {
                order: Vec::new(),
                members: HashSet::new(),
            }
        }
    }

    pub fn allows_duplicates(&self) -> bool {
        matches!(self, EdgeList::List(_))
    }

    pub fn as_slice(&self) -> &[V] {
        match self {
            EdgeList::List(items) => items,
            EdgeList::Set { order, .. } => order,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<V> {
        self.as_slice().get(index).copied()
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, V>> {
        self.as_slice().iter().copied()
    }

    pub fn contains(&self, target: &V) -> bool {
        match self {
            EdgeList::List(items) => items.contains(target),
            EdgeList::Set { members, .. } => members.contains(target),
        }
    }

    pub fn index_of(&self, target: &V) -> Option<usize> {
        if let EdgeList::Set { members, .. } = self {
            if !members.contains(target) {
                return None;
            }
        }
        self.as_slice().iter().position(|v| v == target)
    }

    /// Number of entries equal to `target`.
    pub fn count_of(&self, target: &V) -> usize {
        match self {
            EdgeList::List(items) => items.iter().filter(|v| *v == target).count(),
            EdgeList::Set { members, .. } => usize::from(members.contains(target)),
        }
    }

    /// Append `target`. A set-backed list refuses duplicates.
    pub fn push(&mut self, target: V) -> bool {
        match self {
            EdgeList::List(items) => {
                items.push(target);
                true
            }
            EdgeList::Set { order, members } => {
                if members.insert(target) {
                    order.push(target);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Remove the first entry equal to `target`.
    pub fn remove(&mut self, target: &V) -> bool {
        let Some(index) = self.index_of(target) else {
            return false;
        };
        match self {
            EdgeList::List(items) => {
                items.remove(index);
            }
            EdgeList::Set { order, members } => {
                order.remove(index);
                members.remove(target);
            }
        }
        true
    }

    /// Remove every entry matching `predicate`, returning the removed entries in order.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> Vec<V>
    where
        F: FnMut(&V) -> bool,
    {
        let mut removed = Vec::new();
        let order = match self {
            EdgeList::List(items) => items,
            EdgeList::Set { order, .. } => order,
        };
        order.retain(|v| {
            if predicate(v) {
                removed.push(*v);
                false
            } else {
                true
            }
        });
        if let EdgeList::Set { members, .. } = self {
            for v in &removed {
                members.remove(v);
            }
        }
        removed
    }

    /// Remove every entry, returning them in order.
    pub fn take_all(&mut self) -> Vec<V> {
        match self {
            EdgeList::List(items) => std::mem::take(items),
            EdgeList::Set { order, members } => {
                members.clear();
                std::mem::take(order)
            }
        }
    }

    /// Copy into a list with the requested duplicate policy. Converting a
    /// list with duplicates into a set-backed one keeps the first occurrence.
    pub fn converted(&self, allow_parallel_edges: bool) -> Self {
        let mut out = EdgeList::new(allow_parallel_edges);
        for v in self.iter() {
            out.push(v);
        }
        out
    }
}
