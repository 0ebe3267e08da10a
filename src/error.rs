use crate::{TriangleId, VertexId};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("vertex {0:?} does not exist")]
    MissingVertex(VertexId),
    #[error("point ({x}, {y}) does not lie within bounds")]
    OutOfBounds { x: f64, y: f64 },
    #[error("point ({x}, {y}) coincides with vertex {existing:?}")]
    DuplicatePoint { x: f64, y: f64, existing: VertexId },
    #[error("point ({x}, {y}) has a non-finite coordinate")]
    NonFinite { x: f64, y: f64 },
    #[error("cannot triangulate an empty point set")]
    NoPoints,
    #[error("triangle {0:?} is degenerate, it has no circumcenter")]
    DegenerateTriangle(TriangleId),
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// Internal consistency failures of the triangle tree.
/// These indicate misuse (e.g. out of order undo) or a corrupted structure.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("triangle {triangle:?} not found in incident triangles of vertex {vertex:?}")]
    TriangleNotFound {
        triangle: TriangleId,
        vertex: VertexId,
    },
    #[error("triangle {0:?} does not exist")]
    MissingTriangle(TriangleId),
    #[error("triangle {0:?} is not a leaf")]
    NotALeaf(TriangleId),
    #[error("cannot flip triangles that do not share an edge ({unique}, {common})")]
    NotAdjacent { unique: usize, common: usize },
    #[error("cannot uninsert triangle {triangle:?}: {reason}")]
    CannotUninsert {
        triangle: TriangleId,
        reason: &'static str,
    },
    #[error("cannot unflip triangles {first:?} and {second:?}: {reason}")]
    CannotUnflip {
        first: TriangleId,
        second: TriangleId,
        reason: &'static str,
    },
    #[error("walk around vertex {0:?} did not terminate")]
    Unterminated(VertexId),
}
