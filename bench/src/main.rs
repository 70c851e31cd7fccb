//! pathfind-bench: run Dijkstra and A* side by side.
//!
//! ```text
//! pathfind-bench synthetic --generator grid --nodes 250000
//! pathfind-bench transit --edges map_edges.txt --coords map_nodes.txt \
//!     --query 65:157 --query 1:173
//! pathfind-bench --json synthetic --generator all
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default
//! `pathfind_bench=info,pathfind_core=warn`).

mod generators;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use pathfind_core::{transit, EuclideanHeuristic, SearchObserver, ShortestPath, UndirectedGraph};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::generators::{Generator, Workload};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "pathfind-bench")]
#[command(about = "Compare Dijkstra and A* shortest-path search on synthetic or transit graphs")]
struct Cli {
    /// Print a JSON report instead of tables
    #[arg(long, global = true, env = "PATHFIND_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate graphs and query random vertex pairs
    Synthetic {
        #[arg(long, value_enum, default_value_t = GeneratorKind::All)]
        generator: GeneratorKind,

        /// Vertices per generated graph
        #[arg(long, env = "PATHFIND_NODES", default_value_t = 10_000,
              value_parser = clap::value_parser!(u32).range(2..))]
        nodes: u32,

        /// RNG seed for reproducible graphs and queries
        #[arg(long, env = "PATHFIND_SEED", default_value_t = 42)]
        seed: u64,

        /// Random queries per graph, in addition to first-to-last vertex
        #[arg(long, default_value_t = 5)]
        queries: usize,
    },
    /// Load a transit map and query station pairs
    Transit {
        /// Edge list: `<from> <to> <mode>` per line
        #[arg(long, env = "PATHFIND_EDGES")]
        edges: PathBuf,

        /// Station coordinates: `<station> <x> <y>` per line
        #[arg(long, env = "PATHFIND_COORDS")]
        coords: PathBuf,

        /// Station pair as FROM:TO (repeatable)
        #[arg(long = "query", value_parser = parse_query, required = true)]
        queries: Vec<(u32, u32)>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GeneratorKind {
    Grid,
    Smallworld,
    Random,
    Barbell,
    All,
}

const GENERATORS: [(&str, Generator); 4] = [
    ("Grid (jittered lattice)", generators::gen_grid),
    ("Small-world (Watts-Strogatz)", generators::gen_small_world),
    ("Random geometric", generators::gen_random),
    ("Barbell (cluster-bridge-cluster)", generators::gen_barbell),
];

impl GeneratorKind {
    fn generators(self) -> Vec<(&'static str, Generator)> {
        match self {
            Self::Grid => vec![GENERATORS[0]],
            Self::Smallworld => vec![GENERATORS[1]],
            Self::Random => vec![GENERATORS[2]],
            Self::Barbell => vec![GENERATORS[3]],
            Self::All => GENERATORS.to_vec(),
        }
    }
}

fn parse_query(s: &str) -> Result<(u32, u32), String> {
    let (from, to) = s
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got '{s}'"))?;
    let from = from.trim().parse().map_err(|_| format!("invalid station '{from}'"))?;
    let to = to.trim().parse().map_err(|_| format!("invalid station '{to}'"))?;
    Ok((from, to))
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ModeReport {
    /// None if the target was unreachable.
    distance: Option<f64>,
    hops: usize,
    visited: usize,
    relaxations: usize,
    millis: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    path: Vec<u32>,
}

#[derive(Serialize)]
struct QueryReport {
    source: u32,
    target: u32,
    dijkstra: ModeReport,
    astar: ModeReport,
}

impl QueryReport {
    fn agrees(&self) -> bool {
        match (self.dijkstra.distance, self.astar.distance) {
            (Some(d), Some(a)) => (d - a).abs() <= 1e-9 * d.max(1.0),
            (None, None) => true,
            _ => false,
        }
    }
}

#[derive(Serialize)]
struct WorkloadReport {
    name: String,
    nodes: usize,
    edges: usize,
    build_millis: f64,
    queries: Vec<QueryReport>,
}

/// Counts successful edge relaxations.
#[derive(Default)]
struct RelaxationCounter(usize);

impl<V> SearchObserver<V> for RelaxationCounter {
    fn on_traverse(&mut self, _from: &V, _to: &V) {
        self.0 += 1;
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pathfind_bench=info,pathfind_core=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let reports = match cli.command {
        Command::Synthetic { generator, nodes, seed, queries } => {
            let mut reports = Vec::new();
            for (name, gen) in generator.generators() {
                reports.push(run_synthetic(name, gen, nodes, seed, queries, cli.json)?);
            }
            reports
        }
        Command::Transit { edges, coords, queries } => {
            vec![run_transit(&edges, &coords, &queries, cli.json)?]
        }
    };

    let disagreements = reports
        .iter()
        .flat_map(|r| r.queries.iter())
        .filter(|q| !q.agrees())
        .count();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    if disagreements > 0 {
        bail!("{disagreements} queries where A* and Dijkstra distances differ");
    }
    Ok(())
}

fn run_synthetic(
    name: &str,
    generator: Generator,
    node_count: u32,
    seed: u64,
    query_count: usize,
    json: bool,
) -> anyhow::Result<WorkloadReport> {
    tracing::info!(generator = name, nodes = node_count, seed, "generating graph");

    let t = Instant::now();
    let mut workload: Workload = generator(node_count, seed)
        .with_context(|| format!("generating {name}"))?;
    let build_millis = t.elapsed().as_secs_f64() * 1000.0;
    let heuristic = workload.heuristic();

    // First vertex to last vertex is the long query on every generator.
    let mut pairs = vec![(0, node_count - 1)];
    for _ in 0..query_count {
        pairs.push((workload.pick(node_count), workload.pick(node_count)));
    }

    if !json {
        println!("--- {} ---", name);
        println!(
            "Generated in {:.1}ms: {} nodes, {} edges",
            build_millis,
            workload.graph.vertex_count(),
            workload.graph.edge_count()
        );
    }

    let queries = run_queries(&workload.graph, &heuristic, &pairs, false)?;
    if !json {
        print_table(&queries);
    }

    Ok(WorkloadReport {
        name: name.to_string(),
        nodes: workload.graph.vertex_count(),
        edges: workload.graph.edge_count(),
        build_millis,
        queries,
    })
}

fn run_transit(
    edges: &Path,
    coords: &Path,
    pairs: &[(u32, u32)],
    json: bool,
) -> anyhow::Result<WorkloadReport> {
    let t = Instant::now();
    let graph = transit::load_transit_graph_file(edges)
        .with_context(|| format!("loading transit edges from {}", edges.display()))?;
    let points = transit::load_coordinates_file(coords)
        .with_context(|| format!("loading station coordinates from {}", coords.display()))?;
    let build_millis = t.elapsed().as_secs_f64() * 1000.0;

    let heuristic = transit::transit_heuristic(points)?;
    tracing::info!(
        stations = graph.vertex_count(),
        connections = graph.edge_count(),
        total_weight = graph.total_weight(),
        with_coordinates = heuristic.len(),
        "transit map loaded"
    );

    let queries = run_queries(&graph, &heuristic, pairs, true)?;
    if !json {
        println!(
            "Transit map: {} stations, {} connections",
            graph.vertex_count(),
            graph.edge_count()
        );
        print_table(&queries);
        for q in &queries {
            println!("{} -> {} (Dijkstra): {:?}", q.source, q.target, q.dijkstra.path);
            println!("{} -> {} (A*):       {:?}", q.source, q.target, q.astar.path);
        }
    }

    Ok(WorkloadReport {
        name: "transit".to_string(),
        nodes: graph.vertex_count(),
        edges: graph.edge_count(),
        build_millis,
        queries,
    })
}

/// Run every pair under both modes, reusing one search object per mode.
fn run_queries<G: UndirectedGraph<u32>>(
    graph: &G,
    heuristic: &EuclideanHeuristic<u32>,
    pairs: &[(u32, u32)],
    keep_paths: bool,
) -> anyhow::Result<Vec<QueryReport>> {
    let mut dijkstra = ShortestPath::dijkstra(graph);
    let mut astar = ShortestPath::astar(graph, heuristic);

    let mut reports = Vec::with_capacity(pairs.len());
    for &(source, target) in pairs {
        let report = QueryReport {
            source,
            target,
            dijkstra: run_mode(&mut dijkstra, source, target, keep_paths)?,
            astar: run_mode(&mut astar, source, target, keep_paths)?,
        };
        if !report.agrees() {
            tracing::warn!(
                source,
                target,
                dijkstra = ?report.dijkstra.distance,
                astar = ?report.astar.distance,
                "A* and Dijkstra disagree; heuristic may be inconsistent"
            );
        }
        reports.push(report);
    }
    Ok(reports)
}

fn run_mode<G: UndirectedGraph<u32>>(
    search: &mut ShortestPath<'_, u32, G>,
    source: u32,
    target: u32,
    keep_path: bool,
) -> anyhow::Result<ModeReport> {
    let mut counter = RelaxationCounter::default();
    let t = Instant::now();
    search
        .search_observed(&source, &target, &mut counter)
        .with_context(|| format!("searching {source} -> {target}"))?;
    let millis = t.elapsed().as_secs_f64() * 1000.0;

    let path = search.shortest_path()?;
    let distance = search.distance()?;
    Ok(ModeReport {
        distance: distance.is_finite().then_some(distance),
        hops: path.len().saturating_sub(1),
        visited: search.visited().unwrap_or(0),
        relaxations: counter.0,
        millis,
        path: if keep_path { path.to_vec() } else { Vec::new() },
    })
}

fn print_table(queries: &[QueryReport]) {
    println!();
    println!(
        "{:>8} {:>8} {:>12} {:>6} {:>10} {:>10} {:>9} {:>9}",
        "from", "to", "distance", "hops", "dij.visit", "a*.visit", "dij.ms", "a*.ms"
    );
    println!(
        "{:->8} {:->8} {:->12} {:->6} {:->10} {:->10} {:->9} {:->9}",
        "", "", "", "", "", "", "", ""
    );
    for q in queries {
        let distance = match q.dijkstra.distance {
            Some(d) => format!("{:.2}", d),
            None => "unreachable".to_string(),
        };
        println!(
            "{:>8} {:>8} {:>12} {:>6} {:>10} {:>10} {:>9.3} {:>9.3}{}",
            q.source,
            q.target,
            distance,
            q.dijkstra.hops,
            q.dijkstra.visited,
            q.astar.visited,
            q.dijkstra.millis,
            q.astar.millis,
            if q.agrees() { "" } else { "  MISMATCH" }
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        assert_eq!(parse_query("65:157"), Ok((65, 157)));
        assert_eq!(parse_query(" 1 : 2 "), Ok((1, 2)));
        assert!(parse_query("65-157").is_err());
        assert!(parse_query("a:1").is_err());
    }

    #[test]
    fn test_cli_parses_transit_queries() {
        let cli = Cli::try_parse_from([
            "pathfind-bench",
            "transit",
            "--edges",
            "e.txt",
            "--coords",
            "c.txt",
            "--query",
            "1:2",
            "--query",
            "3:4",
        ])
        .unwrap();
        match cli.command {
            Command::Transit { queries, .. } => assert_eq!(queries, vec![(1, 2), (3, 4)]),
            _ => panic!("expected transit"),
        }
    }

    #[test]
    fn test_cli_rejects_single_node() {
        assert!(Cli::try_parse_from(["pathfind-bench", "synthetic", "--nodes", "1"]).is_err());
    }

    #[test]
    fn test_run_queries_reports_agreement() {
        let mut workload = generators::gen_grid(400, 7).unwrap();
        let heuristic = workload.heuristic();
        let pairs = [(0, 399), (workload.pick(400), workload.pick(400))];
        let reports = run_queries(&workload.graph, &heuristic, &pairs, true).unwrap();
        assert_eq!(reports.len(), 2);
        for r in &reports {
            assert!(r.agrees());
            assert!(r.astar.visited <= r.dijkstra.visited);
            assert_eq!(r.dijkstra.path.first(), Some(&r.source));
            assert!(r.dijkstra.relaxations > 0 || r.source == r.target);
        }
    }

    #[test]
    fn test_unreachable_serializes_as_null() {
        let report = ModeReport {
            distance: None,
            hops: 0,
            visited: 3,
            relaxations: 2,
            millis: 0.0,
            path: Vec::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["distance"].is_null());
        assert!(json.get("path").is_none());
    }
}
