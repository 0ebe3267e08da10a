use crate::{
    error::{Error, InvariantViolation, Result},
    points::{Vertex, VertexStore},
    shape::{Children, Point, TriangleNode},
    triangles::{TriangleId, TriangleStore},
    utils::{curl_z, det3_ones, in_circle, is_clockwise, orient_2d},
    VertexId,
};

/// Owns the vertex and triangle arenas and implements the triangle tree
/// operations on top of them.
#[derive(Debug, Clone)]
pub struct Context {
    pub vertices: VertexStore,
    pub triangles: TriangleStore,

    // reusable flip check queue to reduce alloc overhead
    pub(crate) flip_queue: Vec<TriangleId>,
}

impl Context {
    pub fn new(vertices: VertexStore) -> Self {
        let triangles = TriangleStore::with_capacity(vertices.len() * 9);
        Self {
            vertices,
            triangles,
            flip_queue: Vec::with_capacity(32),
        }
    }

    pub fn node(&self, triangle: TriangleId) -> Result<&TriangleNode, InvariantViolation> {
        self.triangles
            .get(triangle)
            .ok_or(InvariantViolation::MissingTriangle(triangle))
    }

    fn node_mut(&mut self, triangle: TriangleId) -> Result<&mut TriangleNode, InvariantViolation> {
        self.triangles
            .get_mut(triangle)
            .ok_or(InvariantViolation::MissingTriangle(triangle))
    }

    pub fn vertex(&self, vertex: VertexId) -> Result<&Vertex> {
        self.vertices.get(vertex).ok_or(Error::MissingVertex(vertex))
    }

    fn vertex_mut(&mut self, vertex: VertexId) -> Result<&mut Vertex> {
        self.vertices
            .get_mut(vertex)
            .ok_or(Error::MissingVertex(vertex))
    }

    pub fn point(&self, vertex: VertexId) -> Result<Point> {
        self.vertex(vertex).map(|v| v.point)
    }

    /// Corner coordinates of a triangle, in its stored (clockwise) order
    pub fn corners(&self, triangle: TriangleId) -> Result<[Point; 3]> {
        let [a, b, c] = self.node(triangle)?.vertices;
        Ok([self.point(a)?, self.point(b)?, self.point(c)?])
    }

    /// Create a leaf triangle, normalized to clockwise order and registered
    /// with its vertices.
    pub fn new_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) -> Result<TriangleId> {
        let (pa, pb, pc) = (self.point(a)?, self.point(b)?, self.point(c)?);
        let (a, b) = if is_clockwise(pa, pb, pc) { (a, b) } else { (b, a) };

        let triangle = self.triangles.insert(TriangleNode::new(a, b, c));
        self.register(triangle)?;
        Ok(triangle)
    }

    fn register(&mut self, triangle: TriangleId) -> Result<()> {
        for v in self.node(triangle)?.vertices {
            self.vertex_mut(v)?.add_incident(triangle);
        }
        Ok(())
    }

    fn unregister(&mut self, triangle: TriangleId) -> Result<()> {
        for v in self.node(triangle)?.vertices {
            if !self.vertex_mut(v)?.remove_incident(triangle) {
                return Err(InvariantViolation::TriangleNotFound {
                    triangle,
                    vertex: v,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Whether `p` lies inside or on the boundary of the triangle
    pub fn contains(&self, triangle: TriangleId, p: Point) -> Result<bool> {
        let [a, b, c] = self.corners(triangle)?;
        // every edge of a clockwise triangle sees interior points with non-positive curl
        Ok(curl_z(p, a, b) <= 0. && curl_z(p, b, c) <= 0. && curl_z(p, c, a) <= 0.)
    }

    /// Whether `p` lies inside the triangle, boundary excluded
    pub fn contains_strictly(&self, triangle: TriangleId, p: Point) -> Result<bool> {
        let [a, b, c] = self.corners(triangle)?;
        Ok(curl_z(p, a, b) < 0. && curl_z(p, b, c) < 0. && curl_z(p, c, a) < 0.)
    }

    pub fn circumcenter(&self, triangle: TriangleId) -> Result<Point> {
        let [p1, p2, p3] = self.corners(triangle)?;
        if orient_2d(p1, p2, p3).is_collinear() {
            return Err(Error::DegenerateTriangle(triangle));
        }

        let m1 = p1.x * p1.x + p1.y * p1.y;
        let m2 = p2.x * p2.x + p2.y * p2.y;
        let m3 = p3.x * p3.x + p3.y * p3.y;
        let f = 1. / (2. * det3_ones(p1.x, p1.y, p2.x, p2.y, p3.x, p3.y));
        let center = Point::new(
            f * det3_ones(m1, p1.y, m2, p2.y, m3, p3.y),
            -f * det3_ones(m1, p1.x, m2, p2.x, m3, p3.x),
        );

        if !center.is_finite() {
            return Err(Error::DegenerateTriangle(triangle));
        }
        Ok(center)
    }

    /// Find the leaf below `triangle` containing `p`.
    /// Returns None if `p` is outside of `triangle`.
    pub fn search(&self, triangle: TriangleId, p: Point) -> Result<Option<TriangleId>> {
        if !self.contains(triangle, p)? {
            return Ok(None);
        }

        let mut leaf = triangle;
        loop {
            let node = self.node(leaf)?;
            if node.is_leaf() {
                return Ok(Some(leaf));
            }

            let mut next = None;
            for child in node.children.as_slice() {
                if self.contains(*child, p)? {
                    next = Some(*child);
                    break;
                }
            }

            match next {
                Some(child) => leaf = child,
                None => return Ok(None),
            }
        }
    }

    /// Split a leaf into three children around `vertex`
    pub fn split(&mut self, triangle: TriangleId, vertex: VertexId) -> Result<[TriangleId; 3]> {
        let node = *self.node(triangle)?;
        if !node.is_leaf() {
            return Err(InvariantViolation::NotALeaf(triangle).into());
        }
        self.vertex(vertex)?;

        self.unregister(triangle)?;

        let [a, b, c] = node.vertices;
        let children = [
            self.new_triangle(a, b, vertex)?,
            self.new_triangle(b, c, vertex)?,
            self.new_triangle(c, a, vertex)?,
        ];
        self.node_mut(triangle)?.children = Children::Split(children);

        Ok(children)
    }

    /// Revert [`Self::split`] around `vertex`, the children must still be leaves
    pub fn unsplit(&mut self, triangle: TriangleId, vertex: VertexId) -> Result<()> {
        let Children::Split(children) = self.node(triangle)?.children else {
            return Err(InvariantViolation::CannotUninsert {
                triangle,
                reason: "triangle was not split by an insertion",
            }
            .into());
        };

        for child in children {
            let child = self.node(child)?;
            if !child.has_vertex(vertex) {
                return Err(InvariantViolation::CannotUninsert {
                    triangle,
                    reason: "triangle was split around another vertex",
                }
                .into());
            }
            if !child.is_leaf() {
                return Err(InvariantViolation::CannotUninsert {
                    triangle,
                    reason: "children have been split or flipped further",
                }
                .into());
            }
        }

        for child in children {
            self.unregister(child)?;
        }
        self.register(triangle)?;
        self.node_mut(triangle)?.children = Children::Leaf;

        Ok(())
    }

    /// Replace the shared edge of two adjacent leaves by the other diagonal of
    /// their quadrilateral. Both retire with the same pair of children.
    pub fn flip(&mut self, first: TriangleId, second: TriangleId) -> Result<[TriangleId; 2]> {
        let t1 = *self.node(first)?;
        let t2 = *self.node(second)?;

        let mut common = Vec::<VertexId>::with_capacity(3);
        let mut unique = Vec::<VertexId>::with_capacity(4);
        for v in t1.vertices {
            if t2.has_vertex(v) {
                common.push(v);
            } else {
                unique.push(v);
            }
        }
        unique.extend(t2.vertices.iter().filter(|v| !t1.has_vertex(**v)));

        if first == second || unique.len() != 2 || common.len() != 2 {
            return Err(InvariantViolation::NotAdjacent {
                unique: unique.len(),
                common: common.len(),
            }
            .into());
        }
        for (id, t) in [(first, &t1), (second, &t2)] {
            if !t.is_leaf() {
                return Err(InvariantViolation::NotALeaf(id).into());
            }
        }

        self.unregister(first)?;
        self.unregister(second)?;

        let (u0, u1) = (unique[0], unique[1]);
        let (c0, c1) = (common[0], common[1]);
        let children = if is_clockwise(self.point(u0)?, self.point(u1)?, self.point(c0)?) {
            [self.new_triangle(u0, u1, c0)?, self.new_triangle(u1, u0, c1)?]
        } else {
            [self.new_triangle(u0, u1, c1)?, self.new_triangle(u1, u0, c0)?]
        };

        self.node_mut(first)?.children = Children::Flipped(children);
        self.node_mut(second)?.children = Children::Flipped(children);

        Ok(children)
    }

    /// Revert [`Self::flip`] of `first` and `second`
    pub fn unflip(&mut self, first: TriangleId, second: TriangleId) -> Result<()> {
        let cannot_unflip = |reason| InvariantViolation::CannotUnflip {
            first,
            second,
            reason,
        };

        let Children::Flipped(children) = self.node(first)?.children else {
            return Err(cannot_unflip("triangle was not produced by a flip").into());
        };
        if first == second || self.node(second)?.children != Children::Flipped(children) {
            return Err(cannot_unflip("not created in the same flip operation").into());
        }
        for child in children {
            if !self.node(child)?.is_leaf() {
                return Err(cannot_unflip("children have been split or flipped further").into());
            }
        }

        for child in children {
            self.unregister(child)?;
        }
        self.register(first)?;
        self.register(second)?;
        self.node_mut(first)?.children = Children::Leaf;
        self.node_mut(second)?.children = Children::Leaf;

        Ok(())
    }

    /// Whether the vertex of `other` not shared with `triangle` stays outside
    /// the circumcircle of `triangle`.
    pub fn is_delaunay_with(&self, triangle: TriangleId, other: TriangleId) -> Result<bool> {
        let Some(p) = self.opposite_vertex(other, triangle)? else {
            return Ok(true);
        };
        let [a, b, c] = self.corners(triangle)?;
        if orient_2d(a, b, c).is_collinear() {
            // a sliver left by a point landing on an edge, always flip it away
            return Ok(false);
        }

        Ok(in_circle(a, b, c, self.point(p)?) >= 0.)
    }

    /// The live triangle across the edge of `triangle` not touching `vertex`
    pub fn opposite_triangle(
        &self,
        triangle: TriangleId,
        vertex: VertexId,
    ) -> Result<Option<TriangleId>> {
        match self.node(triangle)?.edge_opposite(vertex) {
            Some((a, b)) => self.adjacent_across(triangle, a, b),
            None => Ok(None),
        }
    }

    /// The vertex of `triangle` that is not a vertex of `other`
    pub fn opposite_vertex(
        &self,
        triangle: TriangleId,
        other: TriangleId,
    ) -> Result<Option<VertexId>> {
        let other = self.node(other)?;
        Ok(self.node(triangle)?.vertex_not_in(other))
    }

    /// The live triangle, other than `triangle`, having both `a` and `b` as vertices
    pub fn adjacent_across(
        &self,
        triangle: TriangleId,
        a: VertexId,
        b: VertexId,
    ) -> Result<Option<TriangleId>> {
        let b_incident = self.vertex(b)?.incident();
        Ok(self
            .vertex(a)?
            .incident()
            .iter()
            .copied()
            .find(|t| *t != triangle && b_incident.contains(t)))
    }

    pub fn connected_vertices(&self, vertex: VertexId) -> Result<Vec<VertexId>> {
        self.vertex(vertex)?;
        Ok(self.vertices.connected_vertices(vertex, &self.triangles))
    }
}
