use crate::shape::TriangleNode;

#[derive(Debug, Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TriangleId(usize);

impl TriangleId {
    pub fn as_usize(&self) -> usize {
        self.0
    }

    pub fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// Triangle store, an append-only arena holding every node of the triangle tree.
// Note: Retired nodes stay in place so splits and flips can be reverted. Only
//       the tail created by the most recent insertion is ever truncated.
#[derive(Debug, Clone, Default)]
pub struct TriangleStore {
    triangles: Vec<TriangleNode>,
}

impl TriangleStore {
    pub fn new() -> Self {
        Self { triangles: vec![] }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    /// Returns number of triangles, retired ones included
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// insert a new triangle
    pub fn insert(&mut self, triangle: TriangleNode) -> TriangleId {
        let id = TriangleId::from_index(self.triangles.len());
        self.triangles.push(triangle);
        id
    }

    pub fn get(&self, id: TriangleId) -> Option<&TriangleNode> {
        self.triangles.get(id.as_usize())
    }

    pub fn get_mut(&mut self, id: TriangleId) -> Option<&mut TriangleNode> {
        self.triangles.get_mut(id.as_usize())
    }

    /// Drop every node from `len` on
    pub(crate) fn truncate(&mut self, len: usize) {
        self.triangles.truncate(len);
    }

    pub fn iter(&self) -> impl Iterator<Item = (TriangleId, &TriangleNode)> {
        self.triangles
            .iter()
            .enumerate()
            .map(|(idx, t)| (TriangleId::from_index(idx), t))
    }

    /// iter the live triangles
    pub fn leaves(&self) -> impl Iterator<Item = (TriangleId, &TriangleNode)> {
        self.iter().filter(|(_, t)| t.is_leaf())
    }
}
