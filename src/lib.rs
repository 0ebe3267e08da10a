//! Incremental delaunay triangulation backed by a split and flip triangle tree,
//! with exact undo of insertions and natural neighbour interpolation on top.
//!
//! ```rust
//! use natural_neighbour::{Interpolator, Vertex};
//!
//! let vertices = (0..5).map(|i| {
//!     let angle = i as f64 * 2. * std::f64::consts::PI / 5.;
//!     Vertex::new(10. * angle.sin(), 10. * angle.cos(), [2., 3., 5., 7., 11.][i])
//! });
//! let mut interpolator = Interpolator::new(vertices).unwrap();
//! let value = interpolator.interpolate(0., 0.).unwrap();
//! assert!((value - 5.6).abs() < 1e-8);
//! ```
mod context;
mod error;
pub mod interpolation;
pub mod loader;
mod points;
mod shape;
mod triangles;
mod triangulation;
pub mod utils;
pub mod voronoi;

pub use error::{Error, InvariantViolation, Result};
pub use interpolation::Interpolator;
pub use triangulation::{
    Observer, Triangles, Triangulation, TriangulationBuilder, Undo, UndoStep,
};
pub use voronoi::Region;

/// exported to enable observer
pub use context::Context;
pub use points::{Vertex, VertexId, VertexStore};
pub use shape::{Children, Point, TriangleNode};
pub use triangles::{TriangleId, TriangleStore};

#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub points: [Point; 3],
}
