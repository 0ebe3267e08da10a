use crate::{
    error::{Error, InvariantViolation, Result},
    utils::triangle_area,
    Point, TriangleId, Triangulation, VertexId,
};

/// Voronoi cell of a vertex, the polygon through the circumcenters of its
/// live triangles in adjacency order.
#[derive(Debug, Clone)]
pub struct Region {
    pub center: Point,
    pub vertices: Vec<Point>,
    /// false when the fan of triangles hits the bounding triangle's boundary,
    /// then `vertices` is an open chain
    pub closed: bool,
}

impl Region {
    pub fn new(triangulation: &Triangulation, vertex_id: VertexId) -> Result<Self> {
        let vertex = triangulation
            .vertex(vertex_id)
            .ok_or(Error::MissingVertex(vertex_id))?;
        let incident = vertex.incident();
        let Some(&first) = incident.first() else {
            return Err(Error::MissingVertex(vertex_id));
        };
        let (ahead, behind) = triangulation
            .triangle(first)
            .ok_or(InvariantViolation::MissingTriangle(first))?
            .edge_opposite(vertex_id)
            .ok_or(InvariantViolation::TriangleNotFound {
                triangle: first,
                vertex: vertex_id,
            })?;

        // walk one way around the vertex, and the other way too if the fan is open
        let limit = incident.len();
        let mut fan = walk(triangulation, vertex_id, first, ahead, limit)?;
        let closed = fan.closed;
        if !closed {
            let back = walk(triangulation, vertex_id, first, behind, limit)?;
            fan.triangles.reverse();
            fan.triangles.pop();
            fan.triangles.extend(back.triangles);
        }

        let vertices = fan
            .triangles
            .into_iter()
            .map(|t| triangulation.circumcenter(t))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            center: vertex.point,
            vertices,
            closed,
        })
    }

    /// Area of the polygon, fanned from the center.
    /// An open region counts only the wedges between consecutive circumcenters.
    pub fn area(&self) -> f64 {
        let mut area = self
            .vertices
            .windows(2)
            .map(|w| triangle_area(self.center, w[0], w[1]))
            .sum::<f64>();
        if self.closed {
            if let (Some(last), Some(first)) = (self.vertices.last(), self.vertices.first()) {
                area += triangle_area(self.center, *last, *first);
            }
        }
        area
    }
}

struct Fan {
    triangles: Vec<TriangleId>,
    closed: bool,
}

/// Collect the triangles around `center`, starting at `start` and crossing its edge to `towards` first
fn walk(
    triangulation: &Triangulation,
    center: VertexId,
    start: TriangleId,
    towards: VertexId,
    limit: usize,
) -> Result<Fan> {
    let mut triangles = vec![start];
    let mut current = start;
    let mut towards = towards;

    loop {
        let Some(next) = triangulation.adjacent_across(current, center, towards)? else {
            return Ok(Fan {
                triangles,
                closed: false,
            });
        };
        if next == start {
            return Ok(Fan {
                triangles,
                closed: true,
            });
        }
        if triangles.len() >= limit {
            return Err(InvariantViolation::Unterminated(center).into());
        }

        towards = triangulation
            .context()
            .opposite_vertex(next, current)?
            .ok_or(InvariantViolation::NotAdjacent {
                unique: 0,
                common: 3,
            })?;
        triangles.push(next);
        current = next;
    }
}
