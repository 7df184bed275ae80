//! End-to-end sketch: a perpetual walker on a two-community graph.
//!
//! Each tick is what a host scheduler would run on its timer. The walk state is
//! round-tripped through its string token every tick, the way a host would persist
//! it between invocations. Halfway through, the node the walker sits on is deleted
//! to show the stale-reference restart.
//!
//! RUST_LOG=noderank=debug cargo run --example noderank_demo

use noderank::{GraphStore, MemoryGraph, NodeId, NodeRankConfig, WalkEngine, WalkState};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Seeded two-block stochastic block model; every edge is walkable both ways.
fn sbm_two_block(n: usize, p_in: f64, p_out: f64, seed: u64) -> MemoryGraph {
    assert!(n >= 4);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let g = MemoryGraph::new();
    let half = n / 2;
    let ids: Vec<NodeId> = (0..n)
        .map(|i| g.add_node([if i < half { "Left" } else { "Right" }]))
        .collect();
    for i in 0..n {
        for j in (i + 1)..n {
            let same = (i < half) == (j < half);
            let p = if same { p_in } else { p_out };
            if rng.random::<f64>() < p {
                g.add_undirected(ids[i], ids[j], "KNOWS").expect("both endpoints exist");
            }
        }
    }
    g
}

/// Load a directed edge list (two whitespace-separated node ids per line).
///
/// Lines starting with `#` are ignored.
fn from_edgelist(path: &Path) -> Result<MemoryGraph, String> {
    let txt = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

    let mut edges: Vec<(u64, u64)> = Vec::new();
    let mut max_node = 0u64;
    for (line_no, line) in txt.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut it = line.split_whitespace();
        let a = it.next().ok_or_else(|| format!("line {}: missing src", line_no + 1))?;
        let b = it.next().ok_or_else(|| format!("line {}: missing dst", line_no + 1))?;
        let u: u64 = a.parse().map_err(|e| format!("line {}: bad src '{a}': {e}", line_no + 1))?;
        let v: u64 = b.parse().map_err(|e| format!("line {}: bad dst '{b}': {e}", line_no + 1))?;
        max_node = max_node.max(u).max(v);
        edges.push((u, v));
    }
    if edges.is_empty() {
        return Err("edgelist produced empty graph".to_string());
    }

    // Fresh store: ids are handed out 0, 1, 2, ... so they line up with the file.
    let g = MemoryGraph::new();
    for _ in 0..=max_node {
        g.add_node(["Node"]);
    }
    for (u, v) in edges {
        g.add_relationship(u, v, "LINKS_TO").map_err(|e| e.to_string())?;
    }
    Ok(g)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // NODERANK_EDGELIST=/path/to/edges.txt cargo run --example noderank_demo
    let g = match std::env::var("NODERANK_EDGELIST") {
        Ok(path) => from_edgelist(Path::new(&path))?,
        Err(_) => sbm_two_block(200, 0.05, 0.005, 123),
    };
    println!("graph: nodes={}, relationships={}", g.node_count(), g.relationship_count());

    let config = NodeRankConfig::default().with_seed(9).with_max_top_rank_nodes(10);
    let mut engine = WalkEngine::new(config)?;

    let ticks = 50_000usize;
    let mut token: Option<String> = engine.initialize(&g)?.map(|s| s.to_string());
    for tick in 0..ticks {
        let previous = token.as_deref().map(str::parse::<WalkState>).transpose()?;
        if tick == ticks / 2 {
            if let Some(state) = previous {
                println!("tick {tick}: deleting node {} under the walker", state.node_id());
                g.remove_node(state.node_id())?;
            }
        }
        token = engine.step(previous, &g)?.map(|s| s.to_string());
    }

    let stats = engine.stats();
    println!(
        "ticks={} advances={} restarts={} dead_ends={} idle={}",
        stats.ticks, stats.advances, stats.restarts, stats.dead_ends, stats.idle
    );
    println!("total rank: {}", g.total_rank());

    engine.top_ranked_mut().retain_existing(&g)?;
    println!("top-10 by visit count:");
    for &(node, rank) in engine.top_ranked().top() {
        let labels = g.node(node)?.labels.join(",");
        println!("  node {node:4}  rank={rank:6}  labels={labels}");
    }

    engine.shutdown();
    Ok(())
}
