use std::hash::{Hash, Hasher};

use super::Vertex;

/// An edge record. Equality is direction-aware: directed edges compare as
/// ordered pairs, undirected edges treat `(a, b)` and `(b, a)` as the same.
#[derive(Debug, Clone, Copy)]
pub struct Edge<V> {
    pub source: V,
    pub target: V,
    pub directed: bool,
}

impl<V: Vertex> Edge<V> {
    pub fn directed(source: V, target: V) -> Self {
        Self {
            source,
            target,
            directed: true,
        }
    }

    pub fn undirected(source: V, target: V) -> Self {
        Self {
            source,
            target,
            directed: false,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn is_incident(&self, v: &V) -> bool {
        self.source == *v || self.target == *v
    }

    /// The endpoint opposite `v`, or `None` if `v` is not an endpoint.
    pub fn other(&self, v: &V) -> Option<V> {
        if self.source == *v {
            Some(self.target)
        } else if self.target == *v {
            Some(self.source)
        } else {
            None
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            source: self.target,
            target: self.source,
            directed: self.directed,
        }
    }

    /// Endpoints as `(min, max)`.
    pub fn ordered_endpoints(&self) -> (V, V) {
        if self.source <= self.target {
            (self.source, self.target)
        } else {
            (self.target, self.source)
        }
    }
}

impl<V: PartialEq> PartialEq for Edge<V> {
    fn eq(&self, other: &Self) -> bool {
        if self.directed != other.directed {
            return false;
        }
        let forward = self.source == other.source && self.target == other.target;
        if self.directed {
            forward
        } else {
            forward || (self.source == other.target && self.target == other.source)
        }
    }
}

impl<V: Eq> Eq for Edge<V> {}

impl<V: Vertex> Hash for Edge<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.directed.hash(state);
        if self.directed {
            (self.source, self.target).hash(state);
        } else {
            self.ordered_endpoints().hash(state);
        }
    }
}

/// How two `(source, target)` pairs are judged to be the same edge when a
/// graph refuses parallel edges.
#[derive(Debug, Clone, Copy)]
pub enum EdgeEquality<V> {
    /// Ordered pairs must match.
    Directed,
    /// Either orientation matches.
    Undirected,
    /// Caller-supplied `(s1, t1, s2, t2) -> same edge?`.
    Custom(fn(&V, &V, &V, &V) -> bool),
}

impl<V: Vertex> EdgeEquality<V> {
    pub fn matches(&self, s1: &V, t1: &V, s2: &V, t2: &V) -> bool {
        match self {
            EdgeEquality::Directed => s1 == s2 && t1 == t2,
            EdgeEquality::Undirected => (s1 == s2 && t1 == t2) || (s1 == t2 && t1 == s2),
            EdgeEquality::Custom(f) => f(s1, t1, s2, t2),
        }
    }
}
