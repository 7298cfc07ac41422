use std::collections::VecDeque;
use std::io::Cursor;
use std::process::ExitCode;
use std::time::Instant;

use serde::Serialize;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use walkgraph_core::io::{BinaryGraphReader, BinaryGraphWriter};
use walkgraph_core::traversal::{
    connected_components, strongly_connected_components, DepthFirstSearch, NoopVisitor,
};
use walkgraph_core::triangles::{average_clustering, graph_triangle_count};
use walkgraph_core::{
    AdjacencyGraph, EdgeStore, GraphBase, GraphOptions, GraphReader, GraphWriter, Result,
    TriangleCache, UndirectedGraph,
};

const DEFAULT_NODES: u64 = 200_000;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let positional: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|a| !a.starts_with("--") || *a == "--help")
        .collect();

    let mode = positional.first().copied().unwrap_or("all");
    let node_count: u64 = positional
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_NODES);

    if mode == "help" || mode == "--help" {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let generators: Vec<(&str, Generator)> = match mode {
        "lsystem" => vec![("L-system tree", gen_lsystem)],
        "scalefree" => vec![("Scale-free (edge sampling)", gen_scale_free)],
        "smallworld" => vec![("Small-world (Watts-Strogatz)", gen_small_world)],
        "random" => vec![("Erdos-Renyi random", gen_random)],
        "barbell" => vec![("Barbell (clique-bridge-clique)", gen_barbell)],
        "dla" => vec![("DLA (organic branching)", gen_dla)],
        "chain" => vec![("Deep chain", gen_chain)],
        "all" => vec![
            ("L-system tree", gen_lsystem as Generator),
            ("Scale-free (edge sampling)", gen_scale_free),
            ("Small-world (Watts-Strogatz)", gen_small_world),
            ("Erdos-Renyi random", gen_random),
            ("Barbell (clique-bridge-clique)", gen_barbell),
            ("DLA (organic branching)", gen_dla),
            ("Deep chain", gen_chain),
        ],
        _ => {
            eprintln!("Unknown mode: {}. Use --help for options.", mode);
            return ExitCode::FAILURE;
        }
    };

    if !json {
        println!("walkgraph-bench");
        println!("===============");
        println!();
    }

    let mut reports = Vec::with_capacity(generators.len());
    for (name, generator) in generators {
        match run_benchmark(name, generator, node_count) {
            Ok(report) => {
                if !json {
                    print_report(&report);
                }
                reports.push(report);
            }
            Err(e) => {
                tracing::error!(generator = name, error = %e, "benchmark failed");
                return ExitCode::FAILURE;
            }
        }
    }

    if json {
        match serde_json::to_string_pretty(&reports) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                tracing::error!(error = %e, "could not serialize report");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

fn print_usage() {
    println!("Usage: walkgraph-bench [mode] [node_count] [--json]");
    println!();
    println!("Modes:");
    println!("  all         Run all generators and benchmark each (default)");
    println!("  lsystem     Fractal branching tree (deep paths)");
    println!("  scalefree   Preferential attachment via edge sampling (hub-and-spoke)");
    println!("  smallworld  Watts-Strogatz ring lattice + shortcuts");
    println!("  random      Erdos-Renyi uniform random edges");
    println!("  barbell     Two dense cliques connected by a thin bridge");
    println!("  dla         Diffusion-limited aggregation (organic branching)");
    println!("  chain       One path through every node (deepest possible DFS)");
    println!();
    println!("Default node_count: {}", DEFAULT_NODES);
    println!("Log level comes from RUST_LOG (default: warn).");
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct Timed<T> {
    ms: f64,
    #[serde(flatten)]
    result: T,
}

fn timed<T>(f: impl FnOnce() -> Result<T>) -> Result<Timed<T>> {
    let t = Instant::now();
    let result = f()?;
    Ok(Timed {
        ms: t.elapsed().as_secs_f64() * 1000.0,
        result,
    })
}

#[derive(Debug, Serialize)]
struct DfsReport {
    trees: usize,
    discovered: usize,
    back_edges: usize,
}

#[derive(Debug, Serialize)]
struct ComponentReport {
    count: usize,
    largest: usize,
}

#[derive(Debug, Serialize)]
struct TriangleReport {
    count: u64,
}

#[derive(Debug, Serialize)]
struct ClusteringReport {
    average: f64,
    cache_hits: u64,
    cache_misses: u64,
}

#[derive(Debug, Serialize)]
struct RoundTripReport {
    bytes: usize,
    edges_read: usize,
}

#[derive(Debug, Serialize)]
struct BenchReport {
    generator: String,
    nodes: usize,
    edges: usize,
    generate_ms: f64,
    dfs: Timed<DfsReport>,
    components: Timed<ComponentReport>,
    strong_components: Timed<ComponentReport>,
    triangles: Timed<TriangleReport>,
    clustering: Timed<ClusteringReport>,
    binary_round_trip: Timed<RoundTripReport>,
}

fn run_benchmark(name: &str, generator: Generator, node_count: u64) -> Result<BenchReport> {
    tracing::info!(generator = name, node_count, "generating");

    let t = Instant::now();
    let generated = generator(node_count);
    let options = GraphOptions::default();
    let mut graph: UndirectedGraph<u64> = UndirectedGraph::with_options(&options)?;
    generated.load_into(&mut graph)?;
    let generate_ms = t.elapsed().as_secs_f64() * 1000.0;

    let dfs = timed(|| {
        let summary = DepthFirstSearch::new(&graph).run(&mut NoopVisitor)?;
        Ok(DfsReport {
            trees: summary.trees,
            discovered: summary.discovered,
            back_edges: summary.back_edges,
        })
    })?;

    let components = timed(|| {
        let cc = connected_components(&graph)?;
        Ok(ComponentReport {
            count: cc.count(),
            largest: cc.largest().map_or(0, |(_, size)| size),
        })
    })?;

    // SCC needs edge direction, so it runs on a directed copy of the same edges
    let mut directed: AdjacencyGraph<u64> = AdjacencyGraph::with_options(&options)?;
    generated.load_into(&mut directed)?;
    let strong_components = timed(|| {
        let scc = strongly_connected_components(&directed)?;
        Ok(ComponentReport {
            count: scc.count(),
            largest: scc.largest().map_or(0, |(_, size)| size),
        })
    })?;
    drop(directed);

    let triangles = timed(|| {
        Ok(TriangleReport {
            count: graph_triangle_count(&graph)?,
        })
    })?;

    let cache = TriangleCache::new();
    let clustering = timed(|| {
        let average = average_clustering(&graph, Some(&cache))?;
        let stats = cache.stats();
        Ok(ClusteringReport {
            average,
            cache_hits: stats.hits,
            cache_misses: stats.misses,
        })
    })?;

    let binary_round_trip = timed(|| {
        let mut writer = BinaryGraphWriter::new(Vec::new());
        writer.write_graph(&graph)?;
        let bytes = writer.into_inner()?;
        let len = bytes.len();
        let back: UndirectedGraph<u64> =
            BinaryGraphReader::new(Cursor::new(bytes)).read_undirected()?;
        Ok(RoundTripReport {
            bytes: len,
            edges_read: back.edge_count(),
        })
    })?;

    Ok(BenchReport {
        generator: name.to_string(),
        nodes: graph.vertex_count(),
        edges: graph.edge_count(),
        generate_ms,
        dfs,
        components,
        strong_components,
        triangles,
        clustering,
        binary_round_trip,
    })
}

fn print_report(r: &BenchReport) {
    println!("--- {} ---", r.generator);
    println!(
        "Generated in {:.1}ms: {} nodes, {} edges",
        r.generate_ms, r.nodes, r.edges
    );
    println!();
    println!("{:<20} {:>10}  result", "step", "time");
    println!("{:-<20} {:->10}  {:-<30}", "", "", "");
    println!(
        "{:<20} {:>8.1}ms  {} trees, {} discovered, {} back edges",
        "dfs", r.dfs.ms, r.dfs.result.trees, r.dfs.result.discovered, r.dfs.result.back_edges
    );
    println!(
        "{:<20} {:>8.1}ms  {} components, largest {}",
        "components", r.components.ms, r.components.result.count, r.components.result.largest
    );
    println!(
        "{:<20} {:>8.1}ms  {} components, largest {}",
        "strong components",
        r.strong_components.ms,
        r.strong_components.result.count,
        r.strong_components.result.largest
    );
    println!(
        "{:<20} {:>8.1}ms  {} triangles",
        "triangles", r.triangles.ms, r.triangles.result.count
    );
    println!(
        "{:<20} {:>8.1}ms  average {:.4} ({} hits, {} misses)",
        "clustering",
        r.clustering.ms,
        r.clustering.result.average,
        r.clustering.result.cache_hits,
        r.clustering.result.cache_misses
    );
    println!(
        "{:<20} {:>8.1}ms  {} bytes, {} edges read back",
        "binary round trip",
        r.binary_round_trip.ms,
        r.binary_round_trip.result.bytes,
        r.binary_round_trip.result.edges_read
    );
    println!();
}

// ---------------------------------------------------------------------------
// Generators: O(n) or O(n + edges), single-threaded, deterministic
// ---------------------------------------------------------------------------

type Generator = fn(u64) -> GeneratedEdges;

/// Vertex count plus edge list, loadable into any graph variant.
struct GeneratedEdges {
    nodes: u64,
    edges: Vec<(u64, u64)>,
}

impl GeneratedEdges {
    fn with_capacity(nodes: u64, edges: usize) -> Self {
        Self {
            nodes,
            edges: Vec::with_capacity(edges),
        }
    }

    fn edge(&mut self, source: u64, target: u64) {
        self.edges.push((source, target));
    }

    fn load_into<G: EdgeStore<u64>>(&self, graph: &mut G) -> Result<()> {
        graph.add_vertex_range(0..self.nodes)?;
        graph.add_edge_range(self.edges.iter().copied())?;
        Ok(())
    }
}

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Ternary tree grown level by level: logarithmic depth, no cycles.
fn gen_lsystem(node_count: u64) -> GeneratedEdges {
    let mut generated = GeneratedEdges::with_capacity(node_count, node_count as usize);
    let branching = 3u64;

    let mut next_id: u64 = 1;
    let mut frontier: Vec<u64> = vec![0];

    while next_id < node_count && !frontier.is_empty() {
        let mut next_frontier = Vec::with_capacity(frontier.len() * branching as usize);
        for &parent in &frontier {
            for _ in 0..branching {
                if next_id >= node_count {
                    break;
                }
                generated.edge(parent, next_id);
                next_frontier.push(next_id);
                next_id += 1;
            }
        }
        frontier = next_frontier;
    }

    generated
}

/// Preferential attachment by sampling a random endpoint of an existing
/// edge, so high-degree nodes are picked proportionally more often.
fn gen_scale_free(node_count: u64) -> GeneratedEdges {
    let edges_per_node = 10u64;
    let mut generated =
        GeneratedEdges::with_capacity(node_count, (node_count * edges_per_node) as usize);
    let mut rng = FastRng::new(12345);

    let mut endpoints: Vec<u64> = Vec::with_capacity((node_count * edges_per_node * 2) as usize);

    // Seed clique
    let seed = 5u64.min(node_count);
    for i in 0..seed {
        for j in (i + 1)..seed {
            generated.edge(i, j);
            endpoints.push(i);
            endpoints.push(j);
        }
    }

    for new_node in seed..node_count {
        if endpoints.is_empty() {
            break;
        }
        for _ in 0..edges_per_node.min(new_node) {
            let target = endpoints[rng.next(endpoints.len() as u64) as usize];
            if target != new_node {
                generated.edge(new_node, target);
                endpoints.push(new_node);
                endpoints.push(target);
            }
        }
    }

    generated
}

/// Watts-Strogatz: ring lattice with `k` forward neighbors, each edge
/// rewired to a random node with probability `p`.
fn gen_small_world(node_count: u64) -> GeneratedEdges {
    let k = 10u64;
    let p = 0.05f64;
    let mut generated = GeneratedEdges::with_capacity(node_count, (node_count * k) as usize);
    let mut rng = FastRng::new(67890);

    for i in 0..node_count {
        for j in 1..=k.min(node_count.saturating_sub(1)) {
            let neighbor = (i + j) % node_count;
            if rng.next_f64() < p {
                let rewired = rng.next(node_count);
                generated.edge(i, if rewired != i { rewired } else { neighbor });
            } else {
                generated.edge(i, neighbor);
            }
        }
    }

    generated
}

/// Erdos-Renyi: about ten uniform random edges per node.
fn gen_random(node_count: u64) -> GeneratedEdges {
    let target_edges = node_count * 10;
    let mut generated = GeneratedEdges::with_capacity(node_count, target_edges as usize);
    let mut rng = FastRng::new(54321);

    for _ in 0..target_edges {
        let from = rng.next(node_count);
        let to = rng.next(node_count);
        if from != to {
            generated.edge(from, to);
        }
    }

    generated
}

/// Two dense random clusters joined by a chain of ten bridge nodes.
fn gen_barbell(node_count: u64) -> GeneratedEdges {
    let bridge_len = 10u64.min(node_count);
    let clique_size = (node_count - bridge_len) / 2;
    let mut generated =
        GeneratedEdges::with_capacity(node_count, (clique_size * 40 + bridge_len) as usize);
    let mut rng = FastRng::new(99999);

    let b_start = clique_size + bridge_len;
    for offset in [0, b_start] {
        for i in 0..clique_size {
            for _ in 0..20u64.min(clique_size.saturating_sub(1)) {
                let target = rng.next(clique_size);
                if target != i {
                    generated.edge(offset + i, offset + target);
                }
            }
        }
    }

    // Bridge: last node of A -> chain -> first node of B
    if clique_size > 0 {
        let mut prev = clique_size - 1;
        for id in clique_size..b_start {
            generated.edge(prev, id);
            prev = id;
        }
        generated.edge(prev, b_start);
    }

    generated
}

/// Diffusion-limited aggregation, simplified: each node sticks to a random
/// node on a bounded "surface" of recent additions, with an occasional
/// long-range second edge.
fn gen_dla(node_count: u64) -> GeneratedEdges {
    let mut generated = GeneratedEdges::with_capacity(node_count, (node_count * 2) as usize);
    let mut rng = FastRng::new(77777);

    let surface_max = 10_000usize;
    let mut surface: VecDeque<u64> = VecDeque::with_capacity(surface_max + 1);
    surface.push_back(0);

    for new_node in 1..node_count {
        let attach_to = surface[rng.next(surface.len() as u64) as usize];
        generated.edge(new_node, attach_to);

        if rng.next(10) == 0 && new_node > 1 {
            let other = rng.next(new_node);
            if other != attach_to {
                generated.edge(new_node, other);
            }
        }

        surface.push_back(new_node);
        if surface.len() > surface_max {
            surface.pop_front();
        }
    }

    generated
}

/// A single path 0 - 1 - ... - n-1. DFS depth equals the node count.
fn gen_chain(node_count: u64) -> GeneratedEdges {
    let mut generated = GeneratedEdges::with_capacity(node_count, node_count as usize);
    for i in 1..node_count {
        generated.edge(i - 1, i);
    }
    generated
}
