use thiserror::Error;

/// Errors raised by the graph view, the search and the file loaders.
///
/// Vertex and edge identifiers are carried in their `Debug` rendering so the
/// enum stays independent of the vertex type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("vertex not found: {0}")]
    VertexNotFound(String),

    #[error("edge not found: {from} -- {to}")]
    EdgeNotFound { from: String, to: String },

    #[error("invalid weight {weight} on edge {from} -- {to}: weights must be non-negative")]
    InvalidWeight { from: String, to: String, weight: f64 },

    #[error("invalid heuristic scale {0}: must be finite and greater than zero")]
    InvalidScale(f64),

    #[error("no shortest path computed: call search() first")]
    NoSearch,

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn vertex_not_found<V: std::fmt::Debug>(v: &V) -> Self {
        Self::VertexNotFound(format!("{v:?}"))
    }

    pub(crate) fn edge_not_found<V: std::fmt::Debug>(from: &V, to: &V) -> Self {
        Self::EdgeNotFound {
            from: format!("{from:?}"),
            to: format!("{to:?}"),
        }
    }
}
