use crate::containers::ShardedMap;
use crate::error::{GraphError, Result};
use crate::graph::{AdjacencyQuery, Vertex};

/// Per-vertex progress during one traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitedState {
    #[default]
    NotVisited,
    /// Discovered, neighbors still being explored.
    PartiallyVisited,
    /// Finished.
    Visited,
}

/// Which neighbor view the search walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Follow {
    /// Every adjacency entry (both directions on a bidirectional graph).
    #[default]
    Adjacent,
    /// Only out-neighbors.
    Outgoing,
}

/// Receives DFS events in discovery order. Every method defaults to a no-op;
/// returning an error stops the search and hands the error to the caller.
pub trait DfsVisitor<V> {
    /// A new tree begins at `root`.
    fn start_vertex(&mut self, _root: V) -> Result<()> {
        Ok(())
    }

    fn discover_vertex(&mut self, _v: V, _depth: usize) -> Result<()> {
        Ok(())
    }

    fn examine_edge(&mut self, _source: V, _target: V) -> Result<()> {
        Ok(())
    }

    /// `target` was not visited yet and becomes a child of `source`.
    fn tree_edge(&mut self, _source: V, _target: V) -> Result<()> {
        Ok(())
    }

    /// `target` is still on the stack: the edge closes a cycle.
    fn back_edge(&mut self, _source: V, _target: V) -> Result<()> {
        Ok(())
    }

    fn forward_or_cross_edge(&mut self, _source: V, _target: V) -> Result<()> {
        Ok(())
    }

    fn finish_vertex(&mut self, _v: V) -> Result<()> {
        Ok(())
    }
}

/// Visitor that ignores every event, for callers that only want the summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopVisitor;

impl<V> DfsVisitor<V> for NoopVisitor {}

/// Counts from one completed search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DfsSummary {
    pub trees: usize,
    pub discovered: usize,
    pub tree_edges: usize,
    pub back_edges: usize,
    pub forward_or_cross_edges: usize,
}

#[derive(Debug, Clone, Copy)]
struct Frame<V> {
    vertex: V,
    cursor: usize,
    depth: usize,
}

/// Iterative depth-first search over any [`AdjacencyQuery`] graph.
///
/// Neighbors are fetched by index (`adjacent_edge(v, i)`), so the explicit
/// stack holds only a cursor per frame and deep graphs cannot overflow the
/// call stack.
///
/// ```
/// use walkgraph_core::graph::{EdgeStore, UndirectedGraph};
/// use walkgraph_core::traversal::{DepthFirstSearch, NoopVisitor};
///
/// let mut g = UndirectedGraph::new();
/// g.add_vertices_and_edge(1u32, 2).unwrap();
/// g.add_vertices_and_edge(3u32, 4).unwrap();
///
/// let summary = DepthFirstSearch::new(&g).run(&mut NoopVisitor).unwrap();
/// assert_eq!(summary.trees, 2);
/// assert_eq!(summary.discovered, 4);
/// ```
#[derive(Debug)]
pub struct DepthFirstSearch<'g, G, V> {
    graph: &'g G,
    root: Option<V>,
    max_depth: usize,
    follow: Follow,
}

impl<'g, G, V> DepthFirstSearch<'g, G, V>
where
    G: AdjacencyQuery<V>,
    V: Vertex,
{
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            root: None,
            max_depth: usize::MAX,
            follow: Follow::Adjacent,
        }
    }

    /// Restrict the search to the vertices reachable from `root`.
    pub fn with_root(mut self, root: V) -> Self {
        self.root = Some(root);
        self
    }

    /// Vertices at depth `max_depth` are discovered and finished without
    /// examining their edges. Roots are at depth 0.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn following(mut self, follow: Follow) -> Self {
        self.follow = follow;
        self
    }

    pub fn run<Vis>(&self, visitor: &mut Vis) -> Result<DfsSummary>
    where
        Vis: DfsVisitor<V>,
    {
        let mut states: ShardedMap<V, VisitedState> = ShardedMap::default();
        let mut stack: Vec<Frame<V>> = Vec::new();
        let mut summary = DfsSummary::default();

        match self.root {
            Some(root) => {
                if !self.graph.contains_vertex(&root) {
                    return Err(GraphError::vertex_not_found(&root));
                }
                self.visit_tree(root, &mut states, &mut stack, visitor, &mut summary)?;
            }
            None => {
                for v in self.graph.vertices() {
                    if states.contains_key(&v) {
                        continue;
                    }
                    self.visit_tree(v, &mut states, &mut stack, visitor, &mut summary)?;
                }
            }
        }

        tracing::trace!(
            trees = summary.trees,
            discovered = summary.discovered,
            "dfs complete"
        );
        Ok(summary)
    }

    fn degree(&self, v: &V) -> Result<usize> {
        match self.follow {
            Follow::Adjacent => self.graph.adjacent_degree(v),
            Follow::Outgoing => self.graph.out_degree(v),
        }
    }

    fn neighbor(&self, v: &V, index: usize) -> Result<V> {
        match self.follow {
            Follow::Adjacent => self.graph.adjacent_edge(v, index),
            Follow::Outgoing => self.graph.out_edge(v, index),
        }
    }

    fn visit_tree<Vis>(
        &self,
        root: V,
        states: &mut ShardedMap<V, VisitedState>,
        stack: &mut Vec<Frame<V>>,
        visitor: &mut Vis,
        summary: &mut DfsSummary,
    ) -> Result<()>
    where
        Vis: DfsVisitor<V>,
    {
        summary.trees += 1;
        visitor.start_vertex(root)?;
        states.insert_or_replace(root, VisitedState::PartiallyVisited);
        summary.discovered += 1;
        visitor.discover_vertex(root, 0)?;
        stack.push(Frame {
            vertex: root,
            cursor: 0,
            depth: 0,
        });

        while let Some(frame) = stack.last_mut() {
            let Frame {
                vertex: u,
                cursor,
                depth,
            } = *frame;
            let degree = if depth >= self.max_depth {
                0
            } else {
                self.degree(&u)?
            };

            if cursor >= degree {
                stack.pop();
                states.insert_or_replace(u, VisitedState::Visited);
                visitor.finish_vertex(u)?;
                continue;
            }
            frame.cursor += 1;

            let v = self.neighbor(&u, cursor)?;
            visitor.examine_edge(u, v)?;
            match states.get(&v).copied().unwrap_or_default() {
                VisitedState::NotVisited => {
                    summary.tree_edges += 1;
                    visitor.tree_edge(u, v)?;
                    states.insert_or_replace(v, VisitedState::PartiallyVisited);
                    summary.discovered += 1;
                    visitor.discover_vertex(v, depth + 1)?;
                    stack.push(Frame {
                        vertex: v,
                        cursor: 0,
                        depth: depth + 1,
                    });
                }
                VisitedState::PartiallyVisited => {
                    summary.back_edges += 1;
                    visitor.back_edge(u, v)?;
                }
                VisitedState::Visited => {
                    summary.forward_or_cross_edges += 1;
                    visitor.forward_or_cross_edge(u, v)?;
                }
            }
        }
        Ok(())
    }
}
