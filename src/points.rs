use crate::{
    shape::Point,
    triangles::{TriangleId, TriangleStore},
};

/// Type alias to the underlying type for VertexId.
/// VertexId compare is in hot path, e.g. shared vertex checks during flips
type NumType = u32;

/// new type for vertex id, currently is the index in the vertex store
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct VertexId(pub(crate) NumType);

impl VertexId {
    /// Get the inner value as usize
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }

    pub fn from_index(index: usize) -> Self {
        debug_assert!(index <= NumType::MAX as usize, "vertex index {index} out of range");
        Self(index as NumType)
    }
}

/// A data point of the triangulation.
///
/// `incident` lists the live (leaf) triangles that use this vertex as a
/// corner. It is maintained by the triangle operations, never by callers.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub point: Point,
    pub value: f64,
    incident: Vec<TriangleId>,
}

impl Vertex {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self {
            point: Point::new(x, y),
            value,
            incident: Vec::new(),
        }
    }

    /// Live triangles this vertex is a corner of, in no particular order
    pub fn incident(&self) -> &[TriangleId] {
        &self.incident
    }

    pub(crate) fn add_incident(&mut self, triangle: TriangleId) {
        self.incident.push(triangle);
    }

    /// Remove `triangle` by swapping in the last entry.
    /// Returns false if the triangle is not registered.
    pub(crate) fn remove_incident(&mut self, triangle: TriangleId) -> bool {
        match self.incident.iter().position(|t| *t == triangle) {
            Some(idx) => {
                self.incident.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear_incident(&mut self) {
        self.incident.clear();
    }
}

/// Vertex store
#[derive(Debug, Clone, Default)]
pub struct VertexStore {
    vertices: Vec<Vertex>,
}

impl VertexStore {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(cap),
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Add a vertex, any incident triangles it carries are dropped
    pub fn push(&mut self, mut vertex: Vertex) -> VertexId {
        let vertex_id = VertexId(self.vertices.len() as NumType);
        vertex.clear_incident();
        self.vertices.push(vertex);
        vertex_id
    }

    /// Remove the last vertex if it is `vertex_id` and no triangle uses it
    pub fn pop_detached(&mut self, vertex_id: VertexId) -> Option<Vertex> {
        if vertex_id.as_usize() + 1 != self.vertices.len() {
            return None;
        }
        if !self.vertices.last()?.incident.is_empty() {
            return None;
        }
        self.vertices.pop()
    }

    pub fn get(&self, vertex_id: VertexId) -> Option<&Vertex> {
        self.vertices.get(vertex_id.as_usize())
    }

    pub(crate) fn get_mut(&mut self, vertex_id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(vertex_id.as_usize())
    }

    /// iter all vertices
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(idx, v)| (VertexId(idx as NumType), v))
    }

    /// Distinct vertices sharing a live triangle with `vertex_id`, excluding itself.
    ///
    /// These are the natural neighbours of the vertex: their Voronoi cells
    /// share an edge with its cell.
    pub fn connected_vertices(
        &self,
        vertex_id: VertexId,
        triangles: &TriangleStore,
    ) -> Vec<VertexId> {
        let Some(vertex) = self.get(vertex_id) else {
            return vec![];
        };
        let mut result = Vec::<VertexId>::with_capacity(vertex.incident.len());
        for t in vertex.incident.iter() {
            let Some(triangle) = triangles.get(*t) else {
                continue;
            };
            for v in triangle.vertices {
                if v != vertex_id && !result.contains(&v) {
                    result.push(v);
                }
            }
        }
        result
    }
}
