use crate::Vertex;

#[derive(thiserror::Error, Debug)]
pub enum LoaderError {
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Loader loads a point source into vertices.
/// e.g: PlainFileLoader reads whitespace separated `x y [value]` lines from a file
pub trait Loader {
    fn load(&mut self, source: &str) -> Result<Vec<Vertex>, LoaderError>;
}

/// Loaders can load data from file
#[derive(Default)]
pub struct PlainFileLoader {}

impl Loader for PlainFileLoader {
    fn load(&mut self, path: &str) -> Result<Vec<Vertex>, LoaderError> {
        let value = std::fs::read_to_string(path)?;
        parse_vertices(&value)
    }
}

/// Parse `x y [value]` lines, a missing value is 0.
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_vertices(source: &str) -> Result<Vec<Vertex>, LoaderError> {
    let mut vertices = vec![];
    for (idx, line) in source.lines().enumerate() {
        if let Some(vertex) = parse_vertex(line, idx + 1)? {
            vertices.push(vertex);
        }
    }
    Ok(vertices)
}

fn parse_vertex(line: &str, line_no: usize) -> Result<Option<Vertex>, LoaderError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let parse_err = |reason: String| LoaderError::Parse {
        line: line_no,
        reason,
    };
    let parse = |field: &str| {
        field
            .parse::<f64>()
            .map_err(|e| parse_err(format!("{field:?}: {e}")))
    };

    let fields = line.split_whitespace().collect::<Vec<_>>();
    let (x, y, value) = match fields.as_slice() {
        [x, y] => (parse(x)?, parse(y)?, 0.),
        [x, y, value] => (parse(x)?, parse(y)?, parse(value)?),
        _ => {
            return Err(parse_err(format!(
                "expected 2 or 3 fields, got {}",
                fields.len()
            )))
        }
    };

    Ok(Some(Vertex::new(x, y, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vertices() {
        let source = "# x y value\n0 0 1.5\n\n  10 0\n5 8.5 -2\n";
        let vertices = parse_vertices(source).unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!((vertices[0].point.x, vertices[0].value), (0., 1.5));
        assert_eq!((vertices[1].point.x, vertices[1].value), (10., 0.));
        assert_eq!((vertices[2].point.y, vertices[2].value), (8.5, -2.));
    }

    #[test]
    fn test_parse_error_line() {
        let err = parse_vertices("0 0\n1 x\n").unwrap_err();
        assert!(matches!(err, LoaderError::Parse { line: 2, .. }));

        let err = parse_vertices("0 0 0 0\n").unwrap_err();
        assert!(matches!(err, LoaderError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = PlainFileLoader::default()
            .load("/nonexistent/points.dat")
            .unwrap_err();
        assert!(matches!(err, LoaderError::Io(_)));
    }
}
