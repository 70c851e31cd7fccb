//! Synthetic graph generators.
//!
//! Every vertex gets plane coordinates and every edge weighs at least its
//! straight-line length, so the Euclidean heuristic is consistent on all of
//! them and A* must agree with Dijkstra.

use std::collections::HashMap;
use std::f64::consts::TAU;

use pathfind_core::{AdjacencyListGraph, EuclideanHeuristic, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Mean distance between neighbouring vertices.
const SPACING: f64 = 10.0;

/// A generated graph together with the coordinates of its vertices.
pub struct Workload {
    pub graph: AdjacencyListGraph<u32>,
    coords: HashMap<u32, Point>,
    rng: StdRng,
}

impl Workload {
    fn new(node_count: u32, seed: u64) -> Self {
        Self {
            graph: AdjacencyListGraph::with_capacity(node_count as usize),
            coords: HashMap::with_capacity(node_count as usize),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn place(&mut self, id: u32, x: f64, y: f64) {
        self.coords.insert(id, Point::new(x, y));
        self.graph.add_vertex(id);
    }

    /// Connect two placed vertices with a weight of 1x to 2x their distance.
    fn link(&mut self, a: u32, b: u32) -> pathfind_core::Result<()> {
        if a == b {
            return Ok(());
        }
        let straight = match (self.coords.get(&a), self.coords.get(&b)) {
            (Some(pa), Some(pb)) => pa.distance(pb),
            _ => return Err(pathfind_core::Error::VertexNotFound(format!("{a} or {b}"))),
        };
        let weight = straight * self.rng.gen_range(1.0..2.0);
        self.graph.add_edge(a, b, weight)?;
        Ok(())
    }

    pub fn heuristic(&self) -> EuclideanHeuristic<u32> {
        EuclideanHeuristic::new(self.coords.clone())
    }

    /// Draw a uniformly random vertex id below `bound`.
    pub fn pick(&mut self, bound: u32) -> u32 {
        self.rng.gen_range(0..bound)
    }
}

pub type Generator = fn(u32, u64) -> pathfind_core::Result<Workload>;

/// Jittered square lattice with sparse diagonals.
///
/// Many near-equal routes between distant corners; the case where the
/// heuristic prunes the most.
pub fn gen_grid(node_count: u32, seed: u64) -> pathfind_core::Result<Workload> {
    let mut w = Workload::new(node_count, seed);
    let side = (node_count as f64).sqrt().ceil().max(1.0) as u32;
    let id = |x: u32, y: u32| y * side + x;

    for i in 0..node_count {
        let (x, y) = (i % side, i / side);
        let jx = w.rng.gen_range(-0.3..0.3) * SPACING;
        let jy = w.rng.gen_range(-0.3..0.3) * SPACING;
        w.place(i, x as f64 * SPACING + jx, y as f64 * SPACING + jy);
    }

    for i in 0..node_count {
        let (x, y) = (i % side, i / side);
        if x + 1 < side && id(x + 1, y) < node_count {
            w.link(i, id(x + 1, y))?;
        }
        if id(x, y + 1) < node_count {
            w.link(i, id(x, y + 1))?;
        }
        if x + 1 < side && id(x + 1, y + 1) < node_count && w.rng.gen_bool(0.15) {
            w.link(i, id(x + 1, y + 1))?;
        }
    }

    Ok(w)
}

/// Small-world (Watts-Strogatz): ring lattice + random rewiring.
///
/// Vertices sit on a circle, each linked to its `k` successors; each link is
/// rewired to a random vertex with probability `p`, creating long chords.
pub fn gen_small_world(node_count: u32, seed: u64) -> pathfind_core::Result<Workload> {
    let k = 3u32;
    let p = 0.05f64;
    let mut w = Workload::new(node_count, seed);
    let radius = node_count as f64 * SPACING / TAU;

    for i in 0..node_count {
        let angle = TAU * i as f64 / node_count as f64;
        w.place(i, radius * angle.cos(), radius * angle.sin());
    }

    for i in 0..node_count {
        for j in 1..=k {
            let neighbor = (i + j) % node_count;
            if w.rng.gen_bool(p) {
                let rewired = w.pick(node_count);
                w.link(i, rewired)?;
            } else {
                w.link(i, neighbor)?;
            }
        }
    }

    Ok(w)
}

/// Random points in a square, each linked to its successor and to a few
/// random vertices. The successor chain keeps the graph connected.
pub fn gen_random(node_count: u32, seed: u64) -> pathfind_core::Result<Workload> {
    let extra = 2u32;
    let mut w = Workload::new(node_count, seed);
    let side = (node_count as f64).sqrt() * SPACING;

    for i in 0..node_count {
        let x = w.rng.gen_range(0.0..side.max(1.0));
        let y = w.rng.gen_range(0.0..side.max(1.0));
        w.place(i, x, y);
    }

    for i in 0..node_count {
        if i + 1 < node_count {
            w.link(i, i + 1)?;
        }
        for _ in 0..extra {
            let other = w.pick(node_count);
            w.link(i, other)?;
        }
    }

    Ok(w)
}

/// Barbell: two dense clusters joined by a thin bridge.
///
/// Every route between the clusters funnels through the bridge chain.
pub fn gen_barbell(node_count: u32, seed: u64) -> pathfind_core::Result<Workload> {
    let bridge_len = 10u32.min(node_count);
    let cluster = (node_count - bridge_len) / 2;
    let mut w = Workload::new(node_count, seed);
    let extent = (cluster.max(1) as f64).sqrt() * SPACING;
    let gap = extent;

    // Cluster A: ids 0..cluster, square at the origin
    for i in 0..cluster {
        let x = w.rng.gen_range(0.0..extent);
        let y = w.rng.gen_range(0.0..extent);
        w.place(i, x, y);
    }

    // Bridge: straight line from the right edge of A to the left edge of B
    let bridge_start = cluster;
    for i in 0..bridge_len {
        let x = extent + gap * (i + 1) as f64 / (bridge_len + 1) as f64;
        w.place(bridge_start + i, x, extent / 2.0);
    }

    // Cluster B: the remaining ids, square to the right of the bridge
    let b_start = bridge_start + bridge_len;
    for i in b_start..node_count {
        let x = extent + gap + w.rng.gen_range(0.0..extent);
        let y = w.rng.gen_range(0.0..extent);
        w.place(i, x, y);
    }

    for (start, end) in [(0, cluster), (b_start, node_count)] {
        let size = end - start;
        if size < 2 {
            continue;
        }
        for i in start..end {
            if i + 1 < end {
                w.link(i, i + 1)?;
            }
            for _ in 0..5 {
                let other = start + w.pick(size);
                w.link(i, other)?;
            }
        }
    }

    for i in 0..bridge_len {
        let id = bridge_start + i;
        if i > 0 {
            w.link(id - 1, id)?;
        } else if cluster > 0 {
            w.link(cluster - 1, id)?;
        }
    }
    if bridge_len > 0 && b_start < node_count {
        w.link(b_start - 1, b_start)?;
    }

    Ok(w)
}
