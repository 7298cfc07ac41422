//! Mutation notifications.
//!
//! Each graph owns a [`GraphEvents`] registry. Callbacks run synchronously,
//! in registration order, after the mutation they describe is complete, so a
//! subscriber always observes a consistent graph. One event fires per
//! logical mutation; an undirected edge is reported once even though both
//! adjacency sides change.

use std::fmt;

use super::edge::Edge;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphEvent<V> {
    VertexAdded(V),
    VertexRemoved(V),
    EdgeAdded(Edge<V>),
    EdgeRemoved(Edge<V>),
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Subscriber<V> = Box<dyn FnMut(&GraphEvent<V>) + Send + Sync>;

pub struct GraphEvents<V> {
    subscribers: Vec<(SubscriptionId, Subscriber<V>)>,
    next_id: u64,
}

impl<V> GraphEvents<V> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&GraphEvent<V>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn emit(&mut self, event: &GraphEvent<V>) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<V> Default for GraphEvents<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for GraphEvents<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphEvents")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
