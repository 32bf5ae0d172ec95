use std::io;
use std::num::ParseFloatError;
use std::path::PathBuf;

use thiserror::Error;

/// Geometry that cannot be intersected or shaded.
///
/// Raised at construction time (a shape with a zero radius, collinear triangle
/// vertices, a zero-length normal) so that no division by a vanishing
/// magnitude ever reaches the render loop.
#[derive(Copy, Clone, Debug, Error, PartialEq)]
pub enum DegenerateGeometryError {
    #[error("cannot normalize a zero-length vector")]
    ZeroVector,

    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f64 },

    #[error("triangle vertices are collinear")]
    CollinearTriangle,

    #[error("point does not lie on any face of the shape")]
    NoFace,
}

/// A failure while reading a scene description.
#[derive(Debug, Error)]
pub enum SceneParseError {
    #[error("could not read scene file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: `{kind}` takes {expected} numeric fields, found {found}")]
    FieldCount {
        line: usize,
        kind: String,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: field {field} (`{value}`) is not a number")]
    InvalidNumber {
        line: usize,
        field: usize,
        value: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("line {line}: {source}")]
    Geometry {
        line: usize,
        #[source]
        source: DegenerateGeometryError,
    },
}

impl SceneParseError {
    /// The 1-based line of the scene description the error refers to.
    pub fn line(&self) -> Option<usize> {
        match self {
            SceneParseError::Io { .. } => None,
            SceneParseError::FieldCount { line, .. }
                | SceneParseError::InvalidNumber { line, .. }
                | SceneParseError::Geometry { line, .. } => Some(*line),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed config file {path:?}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A failure while rendering or saving an image.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("worker for tile {tile} panicked")]
    WorkerPanicked { tile: usize },

    #[error("worker for tile {tile} did not finish in time")]
    WorkerTimedOut { tile: usize },

    #[error("tile {tile}: {source}")]
    Geometry {
        tile: usize,
        #[source]
        source: DegenerateGeometryError,
    },

    #[error("could not write image to {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not encode image to {path:?}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[test]
fn parse_errors_report_their_line() {
    let e = SceneParseError::FieldCount {
        line: 3,
        kind: "sphere".into(),
        expected: 7,
        found: 6,
    };

    assert_eq!(e.line(), Some(3));
    assert_eq!(e.to_string(), "line 3: `sphere` takes 7 numeric fields, found 6");
}

#[test]
fn degenerate_geometry_message() {
    let e = DegenerateGeometryError::NonPositive { what: "radius", value: 0.0 };
    assert_eq!(e.to_string(), "radius must be positive, got 0");
}
