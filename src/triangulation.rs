use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::error::{Error, InvariantViolation, Result};
use crate::points::{Vertex, VertexId, VertexStore};
use crate::triangles::TriangleId;
use crate::{shape::*, Context, Triangle};

/// Observer for triangulation, used to monitor insertions and their undo,
/// e.g. to count flips or to draw intermediate states.
#[allow(unused_variables)]
pub trait Observer {
    /// About to insert a vertex
    fn will_insert(&mut self, vertex_id: VertexId, context: &Context) {}

    /// A leaf was split around the inserted vertex
    #[inline]
    fn split(&mut self, triangle_id: TriangleId, context: &Context) {}

    /// Two triangles flipped their shared edge
    #[inline]
    fn flipped(
        &mut self,
        triangle_id: TriangleId,
        opposite_triangle_id: TriangleId,
        context: &Context,
    ) {
    }

    /// The vertex is inserted and every affected edge is locally delaunay
    fn inserted(&mut self, vertex_id: VertexId, context: &Context) {}

    /// An insertion was reverted
    fn undone(&mut self, vertex_id: VertexId, context: &Context) {}
}

/// Default dummy observer, blank impl, so all calls should be optimized out by compiler.
impl Observer for () {}

/// One reversal recorded by an undoable insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoStep {
    /// Revert the split of a leaf around a vertex
    Unsplit(TriangleId, VertexId),
    /// Revert the flip of a triangle pair
    Unflip(TriangleId, TriangleId),
}

/// Reverts one [`Triangulation::add_point`], hand it back to [`Triangulation::undo`].
///
/// Undos must be applied in reverse order of the insertions they belong to.
/// After a successful undo the inserted vertex id is no longer valid.
/// Dropping an `Undo` makes its insertion permanent.
#[must_use = "an insertion is only reverted by passing its Undo to Triangulation::undo"]
#[derive(Debug)]
pub struct Undo {
    /// insertion serial, ids are reused after compaction so they can not identify it
    serial: u64,
    vertex: VertexId,
    steps: Vec<UndoStep>,
    /// triangle arena length before and after the insertion
    triangles_before: usize,
    triangles_after: usize,
}

impl Undo {
    /// The vertex this undo removes
    pub fn vertex(&self) -> VertexId {
        self.vertex
    }

    /// Recorded reversals, oldest first
    pub fn steps(&self) -> &[UndoStep] {
        &self.steps
    }

    fn split_triangle(&self) -> Option<TriangleId> {
        self.steps.iter().find_map(|s| match s {
            UndoStep::Unsplit(t, _) => Some(*t),
            UndoStep::Unflip(..) => None,
        })
    }
}

/// Triangulation Builder
///
/// # Example
/// ```rust
///    use natural_neighbour::{Point, TriangulationBuilder, Vertex};
///
///    let triangulation = TriangulationBuilder::default()
///        .include_bounds(Point::new(-100., -100.), Point::new(100., 100.))
///        .shuffle(42)
///        .build(vec![
///            Vertex::new(0., 0., 1.),
///            Vertex::new(10., 0., 2.),
///            Vertex::new(0., 10., 3.),
///        ])
///        .unwrap();
///    assert_eq!(triangulation.leaves().count(), 7);
/// ```
#[derive(Clone, Debug)]
pub struct TriangulationBuilder {
    margin: f64,
    bounds: Option<(Point, Point)>,
    seed: Option<u64>,
}

impl Default for TriangulationBuilder {
    fn default() -> Self {
        Self {
            margin: 3.,
            bounds: None,
            seed: None,
        }
    }
}

impl TriangulationBuilder {
    /// Scale of the bounding triangle, in half spans of the bounding box
    pub fn margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Grow the bounding box to cover `min`..`max`, so later insertions there are in bounds
    pub fn include_bounds(mut self, min: Point, max: Point) -> Self {
        self.bounds = Some((min, max));
        self
    }

    /// Insert vertices in a random order seeded by `seed`, vertex ids keep the input order
    pub fn shuffle(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// build the triangulation
    pub fn build(self, vertices: impl IntoIterator<Item = Vertex>) -> Result<Triangulation> {
        let vertices = vertices.into_iter().collect::<Vec<_>>();
        if vertices.is_empty() {
            return Err(Error::NoPoints);
        }
        for v in vertices.iter() {
            check_finite(v.point)?;
        }

        let mut store = VertexStore::with_capacity(vertices.len() + 3);
        for v in vertices {
            store.push(v);
        }
        let data_len = store.len();

        let mut order = (0..data_len as u32).map(VertexId).collect::<Vec<_>>();
        if let Some(seed) = self.seed {
            order.shuffle(&mut StdRng::seed_from_u64(seed));
        }

        let (min, max) = self.bounding_box(&store);
        let mut context = Context::new(store);
        let root = bounding_triangle(&mut context, min, max, self.margin)?;

        let mut triangulation = Triangulation {
            context,
            root,
            data_len,
            next_serial: 0,
            pending: Vec::new(),
        };

        for vertex_id in order {
            triangulation.insert(vertex_id, None, &mut ())?;
        }

        tracing::debug!(
            vertices = data_len,
            triangles = triangulation.context.triangles.len(),
            "triangulation built"
        );
        Ok(triangulation)
    }

    fn bounding_box(&self, vertices: &VertexStore) -> (Point, Point) {
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);

        let extra = self.bounds.into_iter().flat_map(|(a, b)| [a, b]);
        for p in vertices.iter().map(|(_, v)| v.point).chain(extra) {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }
}

/// Relative growth of the half span, keeps box corners strictly inside the bounding triangle
const BOUNDS_PADDING: f64 = 1.01;

/// Add the three corners of a triangle enclosing `min`..`max` and create it
fn bounding_triangle(
    context: &mut Context,
    min: Point,
    max: Point,
    margin: f64,
) -> Result<TriangleId> {
    let cx = (min.x + max.x) / 2.;
    let cy = (min.y + max.y) / 2.;
    let mut s = (max.x - min.x).max(max.y - min.y) / 2.;
    if !(s > 0.) {
        // single point or all points identical
        s = 1.;
    }
    // with a margin of 3 the top left box corner sits exactly on an edge
    let s = margin * s * BOUNDS_PADDING;

    let a = context.vertices.push(Vertex::new(cx, cy + s, 0.));
    let b = context.vertices.push(Vertex::new(cx + s, cy, 0.));
    let c = context.vertices.push(Vertex::new(cx - s, cy - s, 0.));
    context.new_triangle(a, b, c)
}

fn check_finite(p: Point) -> Result<()> {
    if p.is_finite() {
        Ok(())
    } else {
        Err(Error::NonFinite { x: p.x, y: p.y })
    }
}

/// An incrementally built delaunay triangulation.
///
/// The live mesh is the set of leaves of a triangle tree rooted at a
/// bounding triangle. Data vertices come first in the vertex store, the
/// three bounding corners follow them.
#[derive(Debug, Clone)]
pub struct Triangulation {
    context: Context,
    root: TriangleId,
    /// number of data vertices given at construction
    data_len: usize,
    next_serial: u64,
    /// serials of insertions whose undo has not run yet
    pending: Vec<u64>,
}

/// Live triangles of a triangulation, the ones touching the bounding corners excluded
pub struct Triangles<'a> {
    triangulation: &'a Triangulation,
    next: usize,
}

impl<'a> Iterator for Triangles<'a> {
    type Item = Triangle;

    fn next(&mut self) -> Option<Self::Item> {
        let triangles = &self.triangulation.context.triangles;
        while self.next < triangles.len() {
            let tri_id = TriangleId::from_index(self.next);
            self.next += 1;

            let Some(triangle) = triangles.get(tri_id) else {
                continue;
            };
            if !triangle.is_leaf()
                || triangle
                    .vertices
                    .iter()
                    .any(|v| self.triangulation.is_bounding_vertex(*v))
            {
                continue;
            }

            let Ok(points) = self.triangulation.context.corners(tri_id) else {
                continue;
            };
            return Some(Triangle { points });
        }
        None
    }
}

impl Triangulation {
    /// Triangulate `vertices` in the given order, see [`TriangulationBuilder`] for options.
    /// A random order gives a shallower triangle tree.
    pub fn new(vertices: impl IntoIterator<Item = Vertex>) -> Result<Self> {
        TriangulationBuilder::default().build(vertices)
    }

    pub fn builder() -> TriangulationBuilder {
        TriangulationBuilder::default()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn root(&self) -> TriangleId {
        self.root
    }

    pub fn vertex(&self, vertex_id: VertexId) -> Option<&Vertex> {
        self.context.vertices.get(vertex_id)
    }

    /// iter all vertices, bounding corners included
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.context.vertices.iter()
    }

    pub fn triangle(&self, triangle_id: TriangleId) -> Option<&TriangleNode> {
        self.context.triangles.get(triangle_id)
    }

    /// Whether the vertex is one of the three corners of the bounding triangle
    pub fn is_bounding_vertex(&self, vertex_id: VertexId) -> bool {
        let idx = vertex_id.as_usize();
        idx >= self.data_len && idx < self.data_len + 3
    }

    /// The live triangle containing `point`
    pub fn locate(&self, point: Point) -> Option<TriangleId> {
        self.context.search(self.root, point).ok().flatten()
    }

    /// iter the live triangle ids, bounding triangles included
    pub fn leaves(&self) -> impl Iterator<Item = TriangleId> + '_ {
        self.context.triangles.leaves().map(|(id, _)| id)
    }

    /// Live triangles not touching the bounding corners
    pub fn triangles(&self) -> Triangles<'_> {
        Triangles {
            triangulation: self,
            next: 0,
        }
    }

    pub fn circumcenter(&self, triangle_id: TriangleId) -> Result<Point> {
        self.context.circumcenter(triangle_id)
    }

    /// Natural neighbours of a vertex
    pub fn connected_vertices(&self, vertex_id: VertexId) -> Result<Vec<VertexId>> {
        self.context.connected_vertices(vertex_id)
    }

    pub fn adjacent_across(
        &self,
        triangle_id: TriangleId,
        a: VertexId,
        b: VertexId,
    ) -> Result<Option<TriangleId>> {
        self.context.adjacent_across(triangle_id, a, b)
    }

    /// Add a vertex, returning its id and the [`Undo`] removing it again.
    /// Fails with [`Error::OutOfBounds`] and no change if the vertex is outside of the bounding triangle.
    pub fn add_point(&mut self, vertex: Vertex) -> Result<(VertexId, Undo)> {
        self.add_point_with_observer(vertex, &mut ())
    }

    pub fn add_point_with_observer(
        &mut self,
        vertex: Vertex,
        observer: &mut impl Observer,
    ) -> Result<(VertexId, Undo)> {
        check_finite(vertex.point)?;

        let triangles_before = self.context.triangles.len();
        let vertex_id = self.context.vertices.push(vertex);

        let mut steps = Vec::new();
        if let Err(e) = self.insert(vertex_id, Some(&mut steps), observer) {
            if steps.is_empty() {
                // rejected before touching the mesh
                self.context.vertices.pop_detached(vertex_id);
            }
            return Err(e);
        }

        let serial = self.next_serial;
        self.next_serial += 1;
        self.pending.push(serial);

        let undo = Undo {
            serial,
            vertex: vertex_id,
            steps,
            triangles_before,
            triangles_after: self.context.triangles.len(),
        };
        Ok((vertex_id, undo))
    }

    /// Revert an insertion, replaying its steps most recent first.
    /// Stops at the first failing step, an insertion can only be undone once.
    pub fn undo(&mut self, undo: Undo) -> Result<()> {
        self.undo_with_observer(undo, &mut ())
    }

    pub fn undo_with_observer(&mut self, undo: Undo, observer: &mut impl Observer) -> Result<()> {
        let Some(pending_idx) = self.pending.iter().rposition(|s| *s == undo.serial) else {
            return Err(InvariantViolation::CannotUninsert {
                triangle: undo.split_triangle().unwrap_or(self.root),
                reason: "insertion was already undone",
            }
            .into());
        };

        for step in undo.steps.iter().rev() {
            match *step {
                UndoStep::Unsplit(t, v) => self.context.unsplit(t, v)?,
                UndoStep::Unflip(t1, t2) => self.context.unflip(t1, t2)?,
            }
        }
        self.pending.remove(pending_idx);
        observer.undone(undo.vertex, &self.context);

        // every node created by the insertion is unreachable now, if nothing
        // was appended after it the arena can shrink back
        if self.context.triangles.len() == undo.triangles_after {
            self.context.triangles.truncate(undo.triangles_before);
            self.context.vertices.pop_detached(undo.vertex);
        } else {
            tracing::trace!(vertex = ?undo.vertex, "undo out of order, arena not compacted");
        }

        tracing::trace!(vertex = ?undo.vertex, steps = undo.steps.len(), "insertion undone");
        Ok(())
    }

    /// Locate, split, then flip until every triangle around the new vertex is locally delaunay.
    /// `steps` records the reversals when the insertion is undoable.
    fn insert(
        &mut self,
        vertex_id: VertexId,
        mut steps: Option<&mut Vec<UndoStep>>,
        observer: &mut impl Observer,
    ) -> Result<()> {
        let point = self.context.point(vertex_id)?;
        let out_of_bounds = Error::OutOfBounds {
            x: point.x,
            y: point.y,
        };
        if !self.context.contains_strictly(self.root, point)? {
            return Err(out_of_bounds);
        }
        let Some(leaf) = self.context.search(self.root, point)? else {
            return Err(out_of_bounds);
        };
        for v in self.context.node(leaf)?.vertices {
            if self.context.point(v)?.eq(&point) {
                return Err(Error::DuplicatePoint {
                    x: point.x,
                    y: point.y,
                    existing: v,
                });
            }
        }

        observer.will_insert(vertex_id, &self.context);
        self.context.split(leaf, vertex_id)?;
        if let Some(steps) = steps.as_mut() {
            steps.push(UndoStep::Unsplit(leaf, vertex_id));
        }
        observer.split(leaf, &self.context);

        // check each of the new triangles against the neighbour across from the new vertex
        let mut to_check = std::mem::take(&mut self.context.flip_queue);
        to_check.clear();
        to_check.extend_from_slice(self.context.vertex(vertex_id)?.incident());

        let mut flips = 0usize;
        let mut idx = 0;
        let result = loop {
            let Some(&t1) = to_check.get(idx) else {
                break Ok(());
            };
            idx += 1;

            match self.legalize(t1, vertex_id) {
                Ok(Some((t2, children))) => {
                    if let Some(steps) = steps.as_mut() {
                        steps.push(UndoStep::Unflip(t1, t2));
                    }
                    observer.flipped(t1, t2, &self.context);
                    to_check.extend_from_slice(&children);
                    flips += 1;
                }
                Ok(None) => {}
                Err(e) => break Err(e),
            }
        };

        // give back the queue
        self.context.flip_queue = to_check;
        result?;

        tracing::trace!(vertex = ?vertex_id, flips, "vertex inserted");
        observer.inserted(vertex_id, &self.context);
        Ok(())
    }

    /// Flip `triangle` with its neighbour across from `vertex` if their edge is not delaunay.
    /// Returns the neighbour and the two new triangles when flipped.
    fn legalize(
        &mut self,
        triangle: TriangleId,
        vertex: VertexId,
    ) -> Result<Option<(TriangleId, [TriangleId; 2])>> {
        if !self.context.node(triangle)?.is_leaf() {
            return Ok(None);
        }
        let Some(opposite) = self.context.opposite_triangle(triangle, vertex)? else {
            // boundary of the mesh
            return Ok(None);
        };
        if self.context.is_delaunay_with(triangle, opposite)? {
            return Ok(None);
        }

        let children = self.context.flip(triangle, opposite)?;
        Ok(Some((opposite, children)))
    }
}

impl Triangulation {
    pub fn verify_triangles(&self) -> bool {
        self.illegal_triangles().is_empty()
    }

    /// Live adjacent pairs failing the local delaunay check
    pub fn illegal_triangles(&self) -> Vec<(TriangleId, TriangleId)> {
        let mut result = Vec::<(TriangleId, TriangleId)>::new();

        for (t_id, triangle) in self.context.triangles.leaves() {
            for v in triangle.vertices {
                let Ok(Some(opposite)) = self.context.opposite_triangle(t_id, v) else {
                    continue;
                };
                if !matches!(self.context.is_delaunay_with(t_id, opposite), Ok(true)) {
                    result.push((t_id, opposite));
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::Rng;

    use super::*;

    #[derive(Default)]
    struct CountingOb {
        will_insert_count: u64,
        split_count: u64,
        flip_count: u64,
        insert_count: u64,
        undo_count: u64,
    }

    impl Observer for CountingOb {
        fn will_insert(&mut self, _vertex_id: VertexId, _context: &Context) {
            self.will_insert_count += 1;
        }

        fn split(&mut self, _triangle_id: TriangleId, _context: &Context) {
            self.split_count += 1;
        }

        fn flipped(
            &mut self,
            _triangle_id: TriangleId,
            _opposite_triangle_id: TriangleId,
            _context: &Context,
        ) {
            self.flip_count += 1;
        }

        fn inserted(&mut self, _vertex_id: VertexId, _context: &Context) {
            self.insert_count += 1;
        }

        fn undone(&mut self, _vertex_id: VertexId, _context: &Context) {
            self.undo_count += 1;
        }
    }

    fn ring(n: usize, radius: f64) -> Vec<Vertex> {
        (0..n)
            .map(|i| {
                let angle = i as f64 * 2. * std::f64::consts::PI / n as f64;
                Vertex::new(radius * angle.sin(), radius * angle.cos(), i as f64)
            })
            .collect()
    }

    fn random_vertices(n: usize) -> Vec<Vertex> {
        let mut rng = rand::thread_rng();
        (0..n)
            .map(|_| Vertex::new(rng.gen_range(0.0..800.), rng.gen_range(0.0..800.), 0.))
            .collect()
    }

    /// sorted live triangles and sorted incident sets, for exact state comparison
    fn snapshot(triangulation: &Triangulation) -> (Vec<TriangleId>, Vec<Vec<TriangleId>>) {
        let mut leaves = triangulation.leaves().collect::<Vec<_>>();
        leaves.sort();
        let incident = triangulation
            .vertices()
            .map(|(_, v)| {
                let mut incident = v.incident().to_vec();
                incident.sort();
                incident
            })
            .collect();
        (leaves, incident)
    }

    #[test]
    fn test_ring_center_degree() {
        let mut vertices = ring(5, 10.);
        vertices.push(Vertex::new(0., 0., 0.));
        let triangulation = Triangulation::new(vertices).unwrap();

        let center = VertexId(5);
        assert_eq!(triangulation.connected_vertices(center).unwrap().len(), 5);
        assert!(triangulation.verify_triangles());
    }

    #[test]
    fn test_bounding_triangle() {
        let triangulation = Triangulation::new(vec![
            Vertex::new(0., 0., 0.),
            Vertex::new(4., 2., 0.),
        ])
        .unwrap();
        // center (2, 1), half span 2
        let corners = triangulation.context().corners(triangulation.root()).unwrap();
        let mut corners = corners.map(|p| (p.x, p.y)).to_vec();
        corners.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let r = 6. * BOUNDS_PADDING;
        let expected = [(2. - r, 1. - r), (2., 1. + r), (2. + r, 1.)];
        for (corner, expected) in corners.iter().zip(expected) {
            assert_relative_eq!(corner.0, expected.0);
            assert_relative_eq!(corner.1, expected.1);
        }

        // every corner of the bounding box is strictly inside
        let square = Triangulation::new(vec![
            Vertex::new(0., 0., 0.),
            Vertex::new(10., 10., 0.),
        ])
        .unwrap();
        for (x, y) in [(0., 0.), (10., 0.), (0., 10.), (10., 10.)] {
            assert!(square
                .context()
                .contains_strictly(square.root(), Point::new(x, y))
                .unwrap());
        }

        assert!(triangulation.is_bounding_vertex(VertexId(2)));
        assert!(triangulation.is_bounding_vertex(VertexId(4)));
        assert!(!triangulation.is_bounding_vertex(VertexId(1)));
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(
            Triangulation::new(Vec::<Vertex>::new()).unwrap_err(),
            Error::NoPoints
        );

        let triangulation = Triangulation::new(vec![Vertex::new(3., 3., 1.)]).unwrap();
        assert_eq!(triangulation.leaves().count(), 3);
        assert_eq!(triangulation.triangles().count(), 0);
    }

    #[test]
    fn test_non_finite() {
        assert!(matches!(
            Triangulation::new(vec![Vertex::new(f64::NAN, 0., 0.)]),
            Err(Error::NonFinite { .. })
        ));
    }

    #[test]
    fn test_live_triangle_count() {
        // n points inside the bounding triangle produce 2n + 1 triangles
        let vertices = random_vertices(100);
        let triangulation = Triangulation::new(vertices).unwrap();
        assert_eq!(triangulation.leaves().count(), 201);
        assert!(triangulation.verify_triangles());
    }

    #[test]
    fn test_add_point_undo() {
        let mut triangulation = Triangulation::new(random_vertices(50)).unwrap();
        let before = snapshot(&triangulation);
        let triangles_before = triangulation.context().triangles.len();
        let vertices_before = triangulation.context().vertices.len();

        let mut ob = CountingOb::default();
        let (vertex_id, undo) = triangulation
            .add_point_with_observer(Vertex::new(400., 400., 1.), &mut ob)
            .unwrap();
        assert_eq!(ob.will_insert_count, 1);
        assert_eq!(ob.split_count, 1);
        assert_eq!(ob.insert_count, 1);
        assert_eq!(undo.steps().len() as u64, 1 + ob.flip_count);
        assert!(matches!(undo.steps()[0], UndoStep::Unsplit(_, v) if v == vertex_id));
        assert!(undo.steps()[1..]
            .iter()
            .all(|s| matches!(s, UndoStep::Unflip(_, _))));
        assert_eq!(undo.vertex(), vertex_id);
        assert!(triangulation.verify_triangles());
        assert!(triangulation.connected_vertices(vertex_id).unwrap().len() >= 3);

        triangulation.undo_with_observer(undo, &mut ob).unwrap();
        assert_eq!(ob.undo_count, 1);
        assert_eq!(snapshot(&triangulation), before);
        assert_eq!(triangulation.context().triangles.len(), triangles_before);
        assert_eq!(triangulation.context().vertices.len(), vertices_before);
    }

    #[test]
    fn test_nested_undo() {
        let mut triangulation = Triangulation::new(random_vertices(30)).unwrap();
        let s0 = snapshot(&triangulation);
        let (_, u1) = triangulation.add_point(Vertex::new(100., 100., 0.)).unwrap();
        let s1 = snapshot(&triangulation);
        let (_, u2) = triangulation.add_point(Vertex::new(101., 99., 0.)).unwrap();
        assert!(triangulation.verify_triangles());

        triangulation.undo(u2).unwrap();
        assert_eq!(snapshot(&triangulation), s1);
        triangulation.undo(u1).unwrap();
        assert_eq!(snapshot(&triangulation), s0);
    }

    #[test]
    fn test_out_of_order_undo_fails() {
        let mut triangulation = Triangulation::new(vec![
            Vertex::new(0., 0., 0.),
            Vertex::new(10., 0., 0.),
            Vertex::new(0., 10., 0.),
            Vertex::new(10., 10., 0.),
        ])
        .unwrap();
        let (_, u1) = triangulation.add_point(Vertex::new(5., 5., 0.)).unwrap();
        let (_, _u2) = triangulation.add_point(Vertex::new(6., 4.8, 0.)).unwrap();

        // the second insertion split a triangle created by the first
        assert!(matches!(
            triangulation.undo(u1),
            Err(Error::Invariant(
                InvariantViolation::CannotUninsert { .. } | InvariantViolation::CannotUnflip { .. }
            ))
        ));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut triangulation = Triangulation::new(ring(5, 10.)).unwrap();
        let before = snapshot(&triangulation);
        let vertices_before = triangulation.context().vertices.len();

        let mut ob = CountingOb::default();
        let err = triangulation
            .add_point_with_observer(Vertex::new(1000., 1000., 0.), &mut ob)
            .unwrap_err();
        assert_eq!(err, Error::OutOfBounds { x: 1000., y: 1000. });
        assert_eq!(ob.will_insert_count, 0);
        assert_eq!(snapshot(&triangulation), before);
        assert_eq!(triangulation.context().vertices.len(), vertices_before);
    }

    #[test]
    fn test_duplicate_point() {
        let mut triangulation = Triangulation::new(ring(5, 10.)).unwrap();
        let before = snapshot(&triangulation);
        let mut ob = CountingOb::default();
        let err = triangulation
            .add_point_with_observer(Vertex::new(0., 10., 0.), &mut ob)
            .unwrap_err();
        assert_eq!(
            err,
            Error::DuplicatePoint {
                x: 0.,
                y: 10.,
                existing: VertexId(0)
            }
        );
        assert_eq!(ob.will_insert_count, 0);
        assert_eq!(snapshot(&triangulation), before);
    }

    #[test]
    fn test_undo_twice_fails() {
        let mut triangulation = Triangulation::new(vec![
            Vertex::new(0., 0., 0.),
            Vertex::new(10., 0., 0.),
            Vertex::new(10., 10., 0.),
            Vertex::new(0., 10., 0.),
        ])
        .unwrap();

        let (_, undo) = triangulation.add_point(Vertex::new(5., 5., 0.)).unwrap();
        let replay = Undo {
            serial: undo.serial,
            vertex: undo.vertex,
            steps: undo.steps.clone(),
            triangles_before: undo.triangles_before,
            triangles_after: undo.triangles_after,
        };
        triangulation.undo(undo).unwrap();

        // same place, so the compacted arena hands out the same ids again
        let (vertex_id, _undo) = triangulation.add_point(Vertex::new(5., 5., 0.)).unwrap();
        assert_eq!(vertex_id, replay.vertex());
        let after = snapshot(&triangulation);

        assert!(matches!(
            triangulation.undo(replay),
            Err(Error::Invariant(InvariantViolation::CannotUninsert { .. }))
        ));
        assert_eq!(snapshot(&triangulation), after);
        assert!(triangulation.vertex(vertex_id).is_some());
        assert_eq!(triangulation.connected_vertices(vertex_id).unwrap().len(), 4);
    }

    #[test]
    fn test_margin() {
        let vertices = vec![Vertex::new(0., 0., 0.), Vertex::new(4., 2., 0.)];
        let mut narrow = Triangulation::new(vertices.clone()).unwrap();
        assert!(matches!(
            narrow.add_point(Vertex::new(12., 1., 0.)),
            Err(Error::OutOfBounds { .. })
        ));

        let mut wide = Triangulation::builder().margin(10.).build(vertices).unwrap();
        let corners = wide.context().corners(wide.root()).unwrap();
        let max_x = corners.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        // center x 2, half span 2
        assert_relative_eq!(max_x, 2. + 10. * 2. * BOUNDS_PADDING);

        let (_, undo) = wide.add_point(Vertex::new(12., 1., 0.)).unwrap();
        assert!(wide.verify_triangles());
        wide.undo(undo).unwrap();
    }

    #[test]
    fn test_missing_vertex() {
        let triangulation = Triangulation::new(vec![Vertex::new(1., 1., 0.)]).unwrap();
        let missing = VertexId(10);
        assert_eq!(
            triangulation.connected_vertices(missing),
            Err(Error::MissingVertex(missing))
        );
        assert!(triangulation.vertex(missing).is_none());
    }

    #[test]
    fn test_point_on_edge() {
        let mut triangulation = Triangulation::new(vec![
            Vertex::new(0., 0., 0.),
            Vertex::new(10., 0., 0.),
            Vertex::new(10., 10., 0.),
            Vertex::new(0., 10., 0.),
        ])
        .unwrap();
        let before = snapshot(&triangulation);

        // midpoint of a hull edge
        let (vertex_id, undo) = triangulation.add_point(Vertex::new(5., 0., 0.)).unwrap();
        assert!(triangulation.locate(Point::new(5., 0.)).is_some());
        assert!(triangulation.connected_vertices(vertex_id).unwrap().len() >= 3);
        assert!(triangulation.verify_triangles());

        triangulation.undo(undo).unwrap();
        assert_eq!(snapshot(&triangulation), before);
    }

    #[test]
    fn test_shuffle_same_mesh() {
        let vertices = random_vertices(60);
        let plain = Triangulation::new(vertices.clone()).unwrap();
        let shuffled = Triangulation::builder()
            .shuffle(7)
            .build(vertices)
            .unwrap();

        let edges = |t: &Triangulation| {
            (0..60)
                .map(|i| {
                    let mut c = t.connected_vertices(VertexId(i)).unwrap();
                    c.sort();
                    c
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(edges(&plain), edges(&shuffled));
    }

    #[test]
    fn test_include_bounds() {
        let vertices = ring(5, 1.);
        let mut narrow = Triangulation::new(vertices.clone()).unwrap();
        assert!(narrow.add_point(Vertex::new(50., 50., 0.)).is_err());

        let mut wide = Triangulation::builder()
            .include_bounds(Point::new(-100., -100.), Point::new(100., 100.))
            .build(vertices)
            .unwrap();
        let (_, undo) = wide.add_point(Vertex::new(50., 50., 0.)).unwrap();
        wide.undo(undo).unwrap();
    }

    #[test]
    fn test_triangles_iter() {
        let triangulation = Triangulation::new(vec![
            Vertex::new(0., 0., 0.),
            Vertex::new(10., 0., 0.),
            Vertex::new(10., 10., 0.),
            Vertex::new(0., 10., 0.),
            Vertex::new(4., 6., 0.),
        ])
        .unwrap();
        // convex hull of 4 corners and one interior point
        assert_eq!(triangulation.triangles().count(), 4);
    }
}
