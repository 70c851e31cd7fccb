//! pathfind-core: shortest paths in weighted undirected graphs.
//!
//! Two layers:
//! - [`IndexMinPQ`], a binary min-heap with a key → position index, giving
//!   O(1) priority lookup and O(log n) change / removal of arbitrary keys.
//! - [`ShortestPath`], a single relaxation loop that runs Dijkstra when no
//!   heuristic is supplied and A* when one is.
//!
//! The search only sees graphs through the read-only [`UndirectedGraph`]
//! trait; [`AdjacencyListGraph`] is the bundled implementation, and
//! [`transit`] loads transit-map data into it.

mod error;
mod graph;
mod heuristic;
mod pq;
mod search;
pub mod transit;

pub use error::{Error, Result};
pub use graph::{AdjacencyListGraph, UndirectedGraph};
pub use heuristic::{check_consistency, ConsistencyViolation, EuclideanHeuristic, Heuristic, Point};
pub use pq::IndexMinPQ;
pub use search::{
    astar, dijkstra, NoopObserver, Route, SearchObserver, SearchOutcome, ShortestPath,
};
