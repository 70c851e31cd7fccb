//! Loaders for transit-map data: a station graph whose edges are labelled
//! with a transport mode, and pixel coordinates for each station.
//!
//! Edge list, one connection per line: `<from> <to> <mode>`, e.g. `1 8 Taxi`.
//! Coordinates, one station per line: `<station> <x> <y>`.
//! Blank lines and lines starting with `#` are skipped.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{AdjacencyListGraph, UndirectedGraph};
use crate::heuristic::{EuclideanHeuristic, Point};

pub type StationId = u32;

/// Pixels per unit of edge cost when turning map coordinates into a heuristic.
pub const PIXELS_PER_COST_UNIT: f64 = 50.0;

/// Transport mode of a connection, which fixes its cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Taxi,
    Bus,
    /// Underground and any other long-distance link.
    Underground,
}

impl TransportMode {
    /// Unknown labels (`UBahn`, `Boot`, ...) are treated as underground.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Taxi" => Self::Taxi,
            "Bus" => Self::Bus,
            _ => Self::Underground,
        }
    }

    pub fn cost(self) -> f64 {
        match self {
            Self::Taxi => 2.0,
            Self::Bus => 3.0,
            Self::Underground => 5.0,
        }
    }
}

/// Build the station graph from an edge list.
///
/// Stations linked by several modes keep only the cheapest one.
pub fn load_transit_graph<R: BufRead>(reader: R) -> Result<AdjacencyListGraph<StationId>> {
    let mut graph = AdjacencyListGraph::new();

    for (line_no, fields) in records(reader) {
        let fields = fields?;
        let [from, to, mode] = expect_fields::<3>(line_no, &fields)?;
        let from: StationId = parse_field(line_no, from, "station")?;
        let to: StationId = parse_field(line_no, to, "station")?;
        let cost = TransportMode::from_label(mode).cost();

        let cheaper = graph
            .weight(&from, &to)
            .map_or(true, |existing| cost < existing);
        if cheaper {
            graph.add_edge(from, to, cost)?;
        }
    }

    debug!(
        stations = graph.vertex_count(),
        connections = graph.edge_count(),
        total_weight = graph.total_weight(),
        "transit graph loaded"
    );
    Ok(graph)
}

/// Read station coordinates.
pub fn load_coordinates<R: BufRead>(reader: R) -> Result<HashMap<StationId, Point>> {
    let mut coords = HashMap::new();

    for (line_no, fields) in records(reader) {
        let fields = fields?;
        let [id, x, y] = expect_fields::<3>(line_no, &fields)?;
        let id: StationId = parse_field(line_no, id, "station")?;
        let x: f64 = parse_field(line_no, x, "x coordinate")?;
        let y: f64 = parse_field(line_no, y, "y coordinate")?;
        coords.insert(id, Point::new(x, y));
    }

    debug!(stations = coords.len(), "station coordinates loaded");
    Ok(coords)
}

/// Straight-line heuristic over pixel coordinates, scaled to edge cost units.
pub fn transit_heuristic(
    coords: HashMap<StationId, Point>,
) -> Result<EuclideanHeuristic<StationId>> {
    EuclideanHeuristic::with_scale(coords, PIXELS_PER_COST_UNIT)
}

pub fn load_transit_graph_file(path: impl AsRef<Path>) -> Result<AdjacencyListGraph<StationId>> {
    load_transit_graph(BufReader::new(File::open(path)?))
}

pub fn load_coordinates_file(path: impl AsRef<Path>) -> Result<HashMap<StationId, Point>> {
    load_coordinates(BufReader::new(File::open(path)?))
}

/// Non-empty, non-comment lines split on whitespace, with 1-based line numbers.
fn records<R: BufRead>(reader: R) -> impl Iterator<Item = (usize, Result<Vec<String>>)> {
    reader
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let fields = line.map_err(Error::from).map(|l| {
                l.split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            });
            (i + 1, fields)
        })
        .filter(|(_, fields)| match fields {
            Ok(f) => !f.is_empty() && !f[0].starts_with('#'),
            Err(_) => true,
        })
}

fn expect_fields<const N: usize>(line: usize, fields: &[String]) -> Result<[&str; N]> {
    if fields.len() != N {
        return Err(Error::Parse {
            line,
            message: format!("expected {} fields, found {}", N, fields.len()),
        });
    }
    Ok(std::array::from_fn(|i| fields[i].as_str()))
}

fn parse_field<T: FromStr>(line: usize, raw: &str, what: &str) -> Result<T> {
    raw.parse().map_err(|_| Error::Parse {
        line,
        message: format!("invalid {} '{}'", what, raw),
    })
}
