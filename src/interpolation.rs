use crate::{
    error::{Error, Result},
    voronoi::Region,
    Triangulation, Vertex, VertexId,
};

/// Natural neighbour (Sibson) interpolation over the values of a triangulation's vertices.
///
/// Each query inserts a probe vertex, measures how much of every neighbour's
/// cell the probe takes, then undoes the insertion. The triangulation is left
/// as it was found.
#[derive(Debug, Clone)]
pub struct Interpolator {
    triangulation: Triangulation,
}

/// Cell areas with the probe inserted
struct Stolen {
    neighbours: Vec<(VertexId, f64)>,
    probe_area: f64,
}

impl From<Triangulation> for Interpolator {
    fn from(triangulation: Triangulation) -> Self {
        Self { triangulation }
    }
}

impl Interpolator {
    pub fn new(vertices: impl IntoIterator<Item = Vertex>) -> Result<Self> {
        Triangulation::new(vertices).map(Self::from)
    }

    pub fn triangulation(&self) -> &Triangulation {
        &self.triangulation
    }

    pub fn into_triangulation(self) -> Triangulation {
        self.triangulation
    }

    /// Interpolated value at (x, y).
    ///
    /// Returns the vertex value when the point coincides with a vertex, and
    /// [`Error::OutOfBounds`] outside of the bounding triangle.
    pub fn interpolate(&mut self, x: f64, y: f64) -> Result<f64> {
        let (probe, undo) = match self.triangulation.add_point(Vertex::new(x, y, 0.)) {
            Ok(inserted) => inserted,
            Err(Error::DuplicatePoint { existing, .. }) => {
                return self
                    .triangulation
                    .vertex(existing)
                    .map(|v| v.value)
                    .ok_or(Error::MissingVertex(existing));
            }
            Err(e) => return Err(e),
        };

        let measured = self.measure(probe);
        self.triangulation.undo(undo)?;
        let stolen = measured?;

        let mut value = 0.;
        for (neighbour, after) in stolen.neighbours {
            let before = Region::new(&self.triangulation, neighbour)?.area();
            let neighbour_value = self
                .triangulation
                .vertex(neighbour)
                .ok_or(Error::MissingVertex(neighbour))?
                .value;
            value += neighbour_value * (before - after);
        }

        tracing::trace!(x, y, value, probe_area = stolen.probe_area, "interpolated");
        Ok(value / stolen.probe_area)
    }

    fn measure(&self, probe: VertexId) -> Result<Stolen> {
        let mut neighbours = Vec::new();
        for v in self.triangulation.connected_vertices(probe)? {
            // bounding corners carry no value
            if self.triangulation.is_bounding_vertex(v) {
                continue;
            }
            neighbours.push((v, Region::new(&self.triangulation, v)?.area()));
        }
        let probe_area = Region::new(&self.triangulation, probe)?.area();
        Ok(Stolen {
            neighbours,
            probe_area,
        })
    }
}
