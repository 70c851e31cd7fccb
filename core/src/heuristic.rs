use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{Error, Result};
use crate::graph::UndirectedGraph;

/// Estimated cost between two vertices, used as the A* priority offset.
///
/// Implementations must be admissible (never overestimate the true remaining
/// cost) and consistent (`h(v, t) <= weight(v, w) + h(w, t)` for every edge),
/// otherwise the first extraction of the target is not guaranteed optimal.
/// Use [`check_consistency`] to verify a heuristic against a graph.
pub trait Heuristic<V> {
    fn estimated_cost(&self, u: &V, v: &V) -> f64;
}

impl<V, F> Heuristic<V> for F
where
    F: Fn(&V, &V) -> f64,
{
    fn estimated_cost(&self, u: &V, v: &V) -> f64 {
        self(u, v)
    }
}

/// A point in the plane (map or pixel coordinates).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Straight-line distance between vertex coordinates, divided by `scale`.
///
/// Vertices without coordinates estimate 0, which keeps the heuristic
/// admissible at the cost of falling back to Dijkstra behaviour there.
#[derive(Debug, Clone)]
pub struct EuclideanHeuristic<V> {
    coords: HashMap<V, Point>,
    scale: f64,
}

impl<V: Eq + Hash> EuclideanHeuristic<V> {
    pub fn new(coords: HashMap<V, Point>) -> Self {
        Self { coords, scale: 1.0 }
    }

    /// `scale` converts coordinate units into edge-weight units. It must be
    /// finite and positive, or estimates would come out NaN or infinite.
    pub fn with_scale(coords: HashMap<V, Point>, scale: f64) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::InvalidScale(scale));
        }
        Ok(Self { coords, scale })
    }

    pub fn coordinates(&self, v: &V) -> Option<&Point> {
        self.coords.get(v)
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

impl<V: Eq + Hash> Heuristic<V> for EuclideanHeuristic<V> {
    fn estimated_cost(&self, u: &V, v: &V) -> f64 {
        match (self.coords.get(u), self.coords.get(v)) {
            (Some(a), Some(b)) => a.distance(b) / self.scale,
            _ => 0.0,
        }
    }
}

/// An edge across which the heuristic drops by more than the edge weight.
///
/// `from == to` marks a single vertex whose estimate is itself invalid:
/// nonzero at the target, or NaN, infinite or negative anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyViolation<V> {
    pub from: V,
    pub to: V,
    pub weight: f64,
    pub drop: f64,
}

/// Tolerance for floating-point noise in consistency checks.
pub(crate) const CONSISTENCY_EPSILON: f64 = 1e-9;

/// Estimates must be finite and non-negative; a NaN priority breaks the
/// frontier's ordering.
pub(crate) fn is_valid_estimate(estimate: f64) -> bool {
    estimate.is_finite() && estimate >= 0.0
}

/// Check `h(v, target) <= weight(v, w) + h(w, target)` on every edge,
/// `h(target, target) == 0`, and that every estimate is a finite,
/// non-negative number.
///
/// Returns the violating edges (both directions of an undirected edge are
/// checked). An empty result means A* with this heuristic is optimal for
/// `target`.
pub fn check_consistency<V, G, H>(
    graph: &G,
    heuristic: &H,
    target: &V,
) -> Result<Vec<ConsistencyViolation<V>>>
where
    V: Clone + Debug,
    G: UndirectedGraph<V>,
    H: Heuristic<V> + ?Sized,
{
    let mut violations = Vec::new();

    let at_target = heuristic.estimated_cost(target, target);
    if is_valid_estimate(at_target) && at_target > CONSISTENCY_EPSILON {
        violations.push(ConsistencyViolation {
            from: target.clone(),
            to: target.clone(),
            weight: 0.0,
            drop: at_target,
        });
    }

    for v in graph.vertex_set() {
        let hv = heuristic.estimated_cost(v, target);
        if !is_valid_estimate(hv) {
            violations.push(ConsistencyViolation {
                from: v.clone(),
                to: v.clone(),
                weight: 0.0,
                drop: hv,
            });
            continue;
        }
        for w in graph.neighbor_set(v)? {
            let hw = heuristic.estimated_cost(w, target);
            if !is_valid_estimate(hw) {
                // reported under `w` itself
                continue;
            }
            let weight = graph.weight(v, w)?;
            let drop = hv - hw;
            if drop > weight + CONSISTENCY_EPSILON {
                violations.push(ConsistencyViolation {
                    from: v.clone(),
                    to: w.clone(),
                    weight,
                    drop,
                });
            }
        }
    }

    Ok(violations)
}
