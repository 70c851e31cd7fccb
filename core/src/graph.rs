use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{Error, Result};

/// Read-only view of a weighted undirected graph.
///
/// This is all the search needs from graph storage. Lookups on vertices or
/// edges that do not exist are caller errors and return
/// [`Error::VertexNotFound`] / [`Error::EdgeNotFound`].
pub trait UndirectedGraph<V> {
    /// All vertices, in no particular order.
    fn vertex_set<'a>(&'a self) -> impl Iterator<Item = &'a V>
    where
        V: 'a;

    /// Neighbours of `v`. Fails if `v` is not in the graph.
    fn neighbor_set<'a>(&'a self, v: &V) -> Result<impl Iterator<Item = &'a V>>
    where
        V: 'a;

    /// Weight of the edge `v -- w`. Fails if the edge does not exist.
    fn weight(&self, v: &V, w: &V) -> Result<f64>;

    fn contains_vertex(&self, v: &V) -> bool;

    fn contains_edge(&self, v: &V, w: &V) -> bool;

    /// Number of neighbours of `v`. Fails if `v` is not in the graph.
    fn degree(&self, v: &V) -> Result<usize>;

    fn vertex_count(&self) -> usize;

    fn edge_count(&self) -> usize;
}

/// Undirected weighted graph stored as a map of neighbour maps.
///
/// Each edge is stored under both endpoints, so `neighbors[v][w]` and
/// `neighbors[w][v]` always hold the same weight. Multi-edges are not
/// supported: adding an existing edge overwrites its weight.
#[derive(Debug, Clone)]
pub struct AdjacencyListGraph<V> {
    neighbors: HashMap<V, HashMap<V, f64>>,
    edge_count: usize,
}

impl<V> AdjacencyListGraph<V>
where
    V: Eq + Hash + Clone + Debug,
{
    pub fn new() -> Self {
        Self {
            neighbors: HashMap::new(),
            edge_count: 0,
        }
    }

    /// Pre-allocate for a known vertex count.
    pub fn with_capacity(vertex_count: usize) -> Self {
        Self {
            neighbors: HashMap::with_capacity(vertex_count),
            edge_count: 0,
        }
    }

    /// Add an isolated vertex. Returns false if it already existed.
    pub fn add_vertex(&mut self, v: V) -> bool {
        if self.neighbors.contains_key(&v) {
            return false;
        }
        self.neighbors.insert(v, HashMap::new());
        true
    }

    /// Add the edge `v -- w` with `weight`, creating missing endpoints.
    ///
    /// Returns `Ok(true)` if the edge is new, `Ok(false)` if an existing
    /// edge's weight was overwritten. Negative and NaN weights are rejected.
    pub fn add_edge(&mut self, v: V, w: V, weight: f64) -> Result<bool> {
        if weight.is_nan() || weight < 0.0 {
            return Err(Error::InvalidWeight {
                from: format!("{v:?}"),
                to: format!("{w:?}"),
                weight,
            });
        }

        let is_new = !self.contains_edge(&v, &w);
        if is_new {
            self.edge_count += 1;
        }
        self.neighbors
            .entry(v.clone())
            .or_default()
            .insert(w.clone(), weight);
        self.neighbors.entry(w).or_default().insert(v, weight);
        Ok(is_new)
    }

    /// Add `v -- w` with weight 1.
    pub fn add_unit_edge(&mut self, v: V, w: V) -> Result<bool> {
        self.add_edge(v, w, 1.0)
    }

    /// Sum of all edge weights, each undirected edge counted once.
    pub fn total_weight(&self) -> f64 {
        let doubled: f64 = self
            .neighbors
            .iter()
            .flat_map(|(v, adj)| adj.iter().filter(move |(w, _)| *w != v))
            .map(|(_, weight)| weight)
            .sum();
        let loops: f64 = self
            .neighbors
            .iter()
            .filter_map(|(v, adj)| adj.get(v))
            .sum();
        doubled / 2.0 + loops
    }
}

impl<V> Default for AdjacencyListGraph<V>
where
    V: Eq + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> UndirectedGraph<V> for AdjacencyListGraph<V>
where
    V: Eq + Hash + Clone + Debug,
{
    fn vertex_set<'a>(&'a self) -> impl Iterator<Item = &'a V>
    where
        V: 'a,
    {
        self.neighbors.keys()
    }

    fn neighbor_set<'a>(&'a self, v: &V) -> Result<impl Iterator<Item = &'a V>>
    where
        V: 'a,
    {
        self.neighbors
            .get(v)
            .map(|adj| adj.keys())
            .ok_or_else(|| Error::vertex_not_found(v))
    }

    fn weight(&self, v: &V, w: &V) -> Result<f64> {
        self.neighbors
            .get(v)
            .and_then(|adj| adj.get(w))
            .copied()
            .ok_or_else(|| Error::edge_not_found(v, w))
    }

    fn contains_vertex(&self, v: &V) -> bool {
        self.neighbors.contains_key(v)
    }

    fn contains_edge(&self, v: &V, w: &V) -> bool {
        self.neighbors
            .get(v)
            .is_some_and(|adj| adj.contains_key(w))
    }

    fn degree(&self, v: &V) -> Result<usize> {
        self.neighbors
            .get(v)
            .map(|adj| adj.len())
            .ok_or_else(|| Error::vertex_not_found(v))
    }

    fn vertex_count(&self) -> usize {
        self.neighbors.len()
    }

    fn edge_count(&self) -> usize {
        self.edge_count
    }
}
