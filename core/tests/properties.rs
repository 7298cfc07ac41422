use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Cursor;

use proptest::prelude::*;

use walkgraph_core::containers::{BinaryHeap, ChunkedList, ShardedMap};
use walkgraph_core::io::{
    BinaryGraphReader, BinaryGraphWriter, TextGraphReader, TextGraphWriter, TextLayout,
};
use walkgraph_core::traversal::{connected_components, DepthFirstSearch, DfsVisitor, NoopVisitor};
use walkgraph_core::triangles::graph_triangle_count;
use walkgraph_core::{
    AdjacencyGraph, AdjacencyQuery, BidirectionalGraph, EdgeStore, GraphBase, GraphReader,
    GraphWriter, UndirectedGraph, VertexStore,
};

#[derive(Debug, Clone)]
enum Op {
    AddEdge(u8, u8),
    RemoveEdge(u8, u8),
    RemoveVertex(u8),
    ClearAdjacent(u8),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0u8..16, 0u8..16).prop_map(|(s, t)| Op::AddEdge(s, t)),
        2 => (0u8..16, 0u8..16).prop_map(|(s, t)| Op::RemoveEdge(s, t)),
        1 => (0u8..16).prop_map(Op::RemoveVertex),
        1 => (0u8..16).prop_map(Op::ClearAdjacent),
    ]
}

fn apply<G: EdgeStore<u8>>(graph: &mut G, op: &Op) {
    match *op {
        Op::AddEdge(s, t) => {
            graph.add_vertices_and_edge(s, t).unwrap();
        }
        Op::RemoveEdge(s, t) => {
            graph.remove_edge(&s, &t).unwrap();
        }
        Op::RemoveVertex(v) => {
            graph.remove_vertex(&v).unwrap();
        }
        Op::ClearAdjacent(v) => {
            if graph.contains_vertex(&v) {
                graph.clear_adjacent_edges(&v).unwrap();
            }
        }
    }
}

/// Sorted neighbor lists, for comparing graphs independent of iteration order.
fn adjacency<G: AdjacencyQuery<u16>>(graph: &G) -> BTreeMap<u16, Vec<u16>> {
    graph
        .vertices()
        .map(|v| {
            let mut ns: Vec<u16> = graph.adjacent_edges(&v).unwrap().collect();
            ns.sort_unstable();
            (v, ns)
        })
        .collect()
}

/// Event positions, for checking the relative order of DFS callbacks.
#[derive(Default)]
struct EventOrder {
    events: usize,
    first_back_edge: Option<usize>,
    finished: HashMap<u16, usize>,
}

impl DfsVisitor<u16> for EventOrder {
    fn back_edge(&mut self, _source: u16, _target: u16) -> walkgraph_core::Result<()> {
        self.events += 1;
        self.first_back_edge.get_or_insert(self.events);
        Ok(())
    }

    fn finish_vertex(&mut self, v: u16) -> walkgraph_core::Result<()> {
        self.events += 1;
        self.finished.insert(v, self.events);
        Ok(())
    }
}

fn arb_edges() -> impl Strategy<Value = Vec<(u16, u16)>> {
    prop::collection::vec((0u16..40, 0u16..40), 0..120)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // --- Graph invariants ---

    #[test]
    fn undirected_adjacency_stays_symmetric(ops in prop::collection::vec(arb_op(), 1..80)) {
        let mut g: UndirectedGraph<u8> = UndirectedGraph::new();
        for op in &ops {
            apply(&mut g, op);
            let mut logical = 0;
            for v in g.vertices() {
                for n in g.adjacent_edges(&v).unwrap() {
                    prop_assert!(g.contains_edge(&n, &v), "{v} -> {n} without {n} -> {v}");
                    prop_assert_eq!(
                        g.multiplicity(&v, &n).unwrap(),
                        g.multiplicity(&n, &v).unwrap()
                    );
                    if v <= n {
                        logical += 1;
                    }
                }
            }
            prop_assert_eq!(g.edge_count(), logical);
        }
    }

    #[test]
    fn directed_edge_count_matches_entries(ops in prop::collection::vec(arb_op(), 1..80)) {
        let mut g: AdjacencyGraph<u8> = AdjacencyGraph::new();
        for op in &ops {
            apply(&mut g, op);
        }
        let entries: usize = g.vertices().map(|v| g.out_degree(&v).unwrap()).sum();
        prop_assert_eq!(g.edge_count(), entries);
        prop_assert_eq!(g.edges().count(), entries);
    }

    #[test]
    fn bidirectional_in_and_out_agree(ops in prop::collection::vec(arb_op(), 1..80)) {
        let mut g: BidirectionalGraph<u8> = BidirectionalGraph::new();
        for op in &ops {
            apply(&mut g, op);
        }
        let out: usize = g.vertices().map(|v| g.out_degree(&v).unwrap()).sum();
        let inc: usize = g.vertices().map(|v| g.in_degree(&v).unwrap()).sum();
        prop_assert_eq!(out, g.edge_count());
        prop_assert_eq!(inc, g.edge_count());
    }

    // --- Containers ---

    #[test]
    fn sharded_map_tracks_live_keys(
        ops in prop::collection::vec((any::<bool>(), 0u32..200), 0..300),
        shards in 1usize..32,
    ) {
        let mut map: ShardedMap<u32, u32> = ShardedMap::new(shards).unwrap();
        let mut live: HashSet<u32> = HashSet::new();
        for (insert, key) in ops {
            if insert {
                let fresh = live.insert(key);
                prop_assert_eq!(map.insert(key, key * 2).is_ok(), fresh);
            } else {
                prop_assert_eq!(map.remove(&key).is_some(), live.remove(&key));
            }
        }
        prop_assert_eq!(map.len(), live.len());
        let keys: HashSet<u32> = map.keys().copied().collect();
        prop_assert_eq!(keys, live);
    }

    #[test]
    fn chunked_list_indexes_across_chunks(chunk_size in 1usize..8, extra in 0usize..40) {
        let n = chunk_size * 3 + extra;
        let mut list = ChunkedList::with_chunk_size(chunk_size).unwrap();
        for i in 0..n {
            list.push(i * 7);
        }
        prop_assert!(list.chunk_count() >= 3);
        prop_assert_eq!(list.len(), n);
        for i in 0..n {
            prop_assert_eq!(list.get(i).copied(), Some(i * 7));
        }
    }

    #[test]
    fn heap_pops_in_priority_order(items in prop::collection::vec((any::<i32>(), any::<u32>()), 0..200)) {
        let mut heap = BinaryHeap::new();
        for &(p, v) in &items {
            heap.push(p, v);
        }
        let mut last = i32::MIN;
        let mut popped = 0;
        while let Ok((p, _)) = heap.pop() {
            prop_assert!(p >= last);
            last = p;
            popped += 1;
        }
        prop_assert_eq!(popped, items.len());
    }

    // --- Serialization ---

    #[test]
    fn binary_round_trip_directed(edges in arb_edges(), isolated in prop::collection::vec(40u16..60, 0..5)) {
        let mut g: AdjacencyGraph<u16> = AdjacencyGraph::new();
        for &(s, t) in &edges {
            g.add_vertices_and_edge(s, t).unwrap();
        }
        g.add_vertex_range(isolated).unwrap();

        let mut writer = BinaryGraphWriter::new(Vec::new());
        writer.write_graph(&g).unwrap();
        let bytes = writer.into_inner().unwrap();
        let back: AdjacencyGraph<u16> = BinaryGraphReader::new(Cursor::new(bytes)).read_graph().unwrap();

        prop_assert_eq!(back.edge_count(), g.edge_count());
        prop_assert_eq!(adjacency(&back), adjacency(&g));
    }

    #[test]
    fn text_round_trip_undirected(edges in arb_edges(), pairs in any::<bool>()) {
        let mut g: UndirectedGraph<u16> = UndirectedGraph::new();
        for &(s, t) in &edges {
            g.add_vertices_and_edge(s, t).unwrap();
        }
        let layout = if pairs { TextLayout::EdgePairs } else { TextLayout::Adjacency };

        let mut writer = TextGraphWriter::new(Vec::new(), layout);
        writer.write_graph(&g).unwrap();
        let bytes = writer.into_inner().unwrap();
        let back: UndirectedGraph<u16> = TextGraphReader::new(Cursor::new(bytes)).read_undirected().unwrap();

        prop_assert_eq!(back.edge_count(), g.edge_count());
        prop_assert_eq!(adjacency(&back), adjacency(&g));
    }

    #[test]
    fn calibrate_lands_on_record_boundary(edges in arb_edges(), offset in any::<u64>()) {
        let mut g: AdjacencyGraph<u16> = AdjacencyGraph::new();
        for &(s, t) in &edges {
            g.add_vertices_and_edge(s, t).unwrap();
        }
        let mut writer = BinaryGraphWriter::new(Vec::new());
        writer.write_graph(&g).unwrap();
        let bytes = writer.into_inner().unwrap();
        let length = bytes.len() as u64;

        let mut reader = BinaryGraphReader::new(Cursor::new(bytes.clone()));
        let target = if length == 0 { 0 } else { offset % (length + 1) };
        GraphReader::<u16>::set_position(&mut reader, target).unwrap();
        let at = GraphReader::<u16>::position(&mut reader).unwrap();

        prop_assert!(at % 4 == 0 || at == length);
        if at != 0 && at != length {
            let i = at as usize;
            let before = i32::from_le_bytes([bytes[i - 4], bytes[i - 3], bytes[i - 2], bytes[i - 1]]);
            prop_assert!(before == -1 || before == -2, "landed at {} after {}", at, before);
        }
    }

    // --- Algorithms ---

    #[test]
    fn dag_has_no_back_edges(edges in arb_edges()) {
        let mut g: AdjacencyGraph<u16> = AdjacencyGraph::new();
        for &(s, t) in &edges {
            if s < t {
                g.add_vertices_and_edge(s, t).unwrap();
            }
        }
        let summary = DepthFirstSearch::new(&g).run(&mut NoopVisitor).unwrap();
        prop_assert_eq!(summary.back_edges, 0);
        prop_assert_eq!(summary.discovered, g.vertex_count());
    }

    #[test]
    fn cycle_yields_back_edge(edges in arb_edges(), len in 1u16..10) {
        let mut g: AdjacencyGraph<u16> = AdjacencyGraph::new();
        for &(s, t) in &edges {
            g.add_vertices_and_edge(s, t).unwrap();
        }
        // Ring 100 -> 101 -> ... -> 100 + len -> 100
        for i in 0..len {
            g.add_vertices_and_edge(100 + i, 101 + i).unwrap();
        }
        g.add_vertices_and_edge(100 + len, 100).unwrap();

        let mut order = EventOrder::default();
        let summary = DepthFirstSearch::new(&g).with_root(100).run(&mut order).unwrap();
        prop_assert!(summary.back_edges >= 1);
        let first_back = order.first_back_edge.unwrap();
        for v in 100..=100 + len {
            prop_assert!(first_back < order.finished[&v]);
        }
    }
}

// --- Fixed scenarios ---

#[test]
fn disjoint_triangles_form_two_components() {
    let g = undirected(&[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]);
    let cc = connected_components(&g).unwrap();
    assert_eq!(cc.count(), 2);
    assert_eq!(cc.component_of(&0), cc.component_of(&2));
    assert_eq!(cc.component_of(&3), cc.component_of(&5));
    assert_ne!(cc.component_of(&0), cc.component_of(&3));
    assert_eq!(graph_triangle_count(&g).unwrap(), 2);
}

fn undirected(edges: &[(u32, u32)]) -> UndirectedGraph<u32> {
    let mut g = UndirectedGraph::new();
    for &(s, t) in edges {
        g.add_vertices_and_edge(s, t).unwrap();
    }
    g
}

#[test]
fn cycle_and_complete_triangle_counts() {
    let cycle = undirected(&[(0, 1), (1, 2), (2, 3), (3, 0)]);
    assert_eq!(graph_triangle_count(&cycle).unwrap(), 0);

    let k4 = undirected(&[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    assert_eq!(graph_triangle_count(&k4).unwrap(), 4);
}
