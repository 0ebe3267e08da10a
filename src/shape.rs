use crate::{triangles::TriangleId, VertexId};

#[derive(Debug, Clone, Copy)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Default for Point {
    fn default() -> Self {
        Self { x: 0., y: 0. }
    }
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// whether two points are same.
    /// Note: the lib don't support duplicate point, so eq means they are same point
    ///    not two point with equal values
    pub fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<Point> for robust::Coord<f64> {
    fn from(p: Point) -> Self {
        robust::Coord { x: p.x, y: p.y }
    }
}

/// Children of a triangle node, each variant is one state of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Children {
    /// Active triangle, part of the live mesh
    #[default]
    Leaf,
    /// Retired by inserting a point inside it
    Split([TriangleId; 3]),
    /// Retired by an edge flip, the partner node holds the same pair
    Flipped([TriangleId; 2]),
}

impl Children {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf)
    }

    pub fn as_slice(&self) -> &[TriangleId] {
        match self {
            Children::Leaf => &[],
            Children::Split(ids) => ids,
            Children::Flipped(ids) => ids,
        }
    }
}

/// A node of the triangle tree.
///
/// Vertices are always stored in clockwise order. Leaves are the live mesh,
/// retired nodes keep their children so a split or flip can be undone.
#[derive(Debug, Clone, Copy)]
pub struct TriangleNode {
    pub vertices: [VertexId; 3],
    pub children: Children,
}

impl TriangleNode {
    pub fn new(a: VertexId, b: VertexId, c: VertexId) -> Self {
        Self {
            vertices: [a, b, c],
            children: Children::Leaf,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_leaf()
    }

    /// get vertex index
    #[inline(always)]
    pub fn vertex_index(&self, vertex: VertexId) -> Option<usize> {
        self.vertices.iter().position(|v| *v == vertex)
    }

    pub fn has_vertex(&self, vertex: VertexId) -> bool {
        self.vertex_index(vertex).is_some()
    }

    /// The two vertices forming the edge across from `vertex`
    pub fn edge_opposite(&self, vertex: VertexId) -> Option<(VertexId, VertexId)> {
        Some(match self.vertex_index(vertex)? {
            0 => (self.vertices[1], self.vertices[2]),
            1 => (self.vertices[0], self.vertices[2]),
            _ => (self.vertices[0], self.vertices[1]),
        })
    }

    /// The first vertex of this triangle that is not a vertex of `other`
    pub fn vertex_not_in(&self, other: &TriangleNode) -> Option<VertexId> {
        self.vertices
            .iter()
            .copied()
            .find(|v| !other.has_vertex(*v))
    }
}
