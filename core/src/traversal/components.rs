use std::collections::HashMap;

use tracing::instrument;

use crate::error::{GraphError, Result};
use crate::graph::{AdjacencyQuery, Vertex};

use super::dfs::{DepthFirstSearch, DfsVisitor, Follow};

/// Component assignment produced by [`connected_components`] or
/// [`strongly_connected_components`]. Ids are dense, `0..count`.
#[derive(Debug, Clone)]
pub struct Components<V> {
    assignment: HashMap<V, usize>,
    count: usize,
}

impl<V: Vertex> Components<V> {
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn component_of(&self, v: &V) -> Option<usize> {
        self.assignment.get(v).copied()
    }

    pub fn assignment(&self) -> &HashMap<V, usize> {
        &self.assignment
    }

    /// Vertex count per component id.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.count];
        for &id in self.assignment.values() {
            sizes[id] += 1;
        }
        sizes
    }

    /// Id and size of the biggest component; the lowest id wins ties.
    pub fn largest(&self) -> Option<(usize, usize)> {
        self.sizes()
            .into_iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
    }

    /// Members of component `id`, sorted.
    pub fn members(&self, id: usize) -> Vec<V> {
        let mut members: Vec<V> = self
            .assignment
            .iter()
            .filter(|(_, &c)| c == id)
            .map(|(&v, _)| v)
            .collect();
        members.sort_unstable();
        members
    }

    pub fn into_assignment(self) -> HashMap<V, usize> {
        self.assignment
    }
}

struct ComponentRecorder<V> {
    assignment: HashMap<V, usize>,
    count: usize,
}

impl<V: Vertex> DfsVisitor<V> for ComponentRecorder<V> {
    fn start_vertex(&mut self, _root: V) -> Result<()> {
        self.count += 1;
        Ok(())
    }

    fn discover_vertex(&mut self, v: V, _depth: usize) -> Result<()> {
        self.assignment.insert(v, self.count - 1);
        Ok(())
    }
}

/// Connected components: one DFS tree per component over the adjacency view.
///
/// On undirected and bidirectional graphs these are the weakly connected
/// components. An [`AdjacencyGraph`](crate::graph::AdjacencyGraph) only
/// exposes out-edges, so there the result depends on the order the forest
/// visits roots: with a single edge `1 -> 0`, starting at 1 gives one
/// component and starting at 0 gives two.
#[instrument(skip(graph), fields(vertices = graph.vertex_count()))]
pub fn connected_components<G, V>(graph: &G) -> Result<Components<V>>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    let mut recorder = ComponentRecorder {
        assignment: HashMap::with_capacity(graph.vertex_count()),
        count: 0,
    };
    DepthFirstSearch::new(graph).run(&mut recorder)?;
    tracing::debug!(components = recorder.count, "connected components");
    Ok(Components {
        assignment: recorder.assignment,
        count: recorder.count,
    })
}

struct SccRecorder<'g, G, V> {
    graph: &'g G,
    discover_time: HashMap<V, usize>,
    roots: HashMap<V, V>,
    assignment: HashMap<V, usize>,
    open: Vec<V>,
    time: usize,
    count: usize,
}

impl<G, V> SccRecorder<'_, G, V>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    fn root_of(&self, v: &V) -> Result<V> {
        self.roots
            .get(v)
            .copied()
            .ok_or_else(|| GraphError::vertex_not_found(v))
    }

    fn discovered_at(&self, v: &V) -> Result<usize> {
        self.discover_time
            .get(v)
            .copied()
            .ok_or_else(|| GraphError::vertex_not_found(v))
    }
}

impl<G, V> DfsVisitor<V> for SccRecorder<'_, G, V>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    fn discover_vertex(&mut self, v: V, _depth: usize) -> Result<()> {
        self.roots.insert(v, v);
        self.discover_time.insert(v, self.time);
        self.time += 1;
        self.open.push(v);
        Ok(())
    }

    fn finish_vertex(&mut self, v: V) -> Result<()> {
        let graph = self.graph;
        for w in graph.out_edges(&v)? {
            if self.assignment.contains_key(&w) {
                continue;
            }
            let root_v = self.root_of(&v)?;
            let root_w = self.root_of(&w)?;
            if self.discovered_at(&root_w)? < self.discovered_at(&root_v)? {
                self.roots.insert(v, root_w);
            }
        }

        if self.root_of(&v)? == v {
            while let Some(w) = self.open.pop() {
                self.assignment.insert(w, self.count);
                if w == v {
                    break;
                }
            }
            self.count += 1;
        }
        Ok(())
    }
}

/// Strongly connected components over the out-direction view.
///
/// Runs in one DFS pass: each vertex tracks the root with the earliest
/// discover time reachable through out-neighbors whose component is still
/// open, and a vertex that remains its own root closes a component.
#[instrument(skip(graph), fields(vertices = graph.vertex_count()))]
pub fn strongly_connected_components<G, V>(graph: &G) -> Result<Components<V>>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    let n = graph.vertex_count();
    let mut recorder = SccRecorder {
        graph,
        discover_time: HashMap::with_capacity(n),
        roots: HashMap::with_capacity(n),
        assignment: HashMap::with_capacity(n),
        open: Vec::new(),
        time: 0,
        count: 0,
    };
    DepthFirstSearch::new(graph)
        .following(Follow::Outgoing)
        .run(&mut recorder)?;
    tracing::debug!(components = recorder.count, "strongly connected components");
    Ok(Components {
        assignment: recorder.assignment,
        count: recorder.count,
    })
}
