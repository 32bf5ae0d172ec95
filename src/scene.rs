use std::fs;
use std::path::Path;

use tracing::{ debug, info, warn };

use crate::color::Color;
use crate::error::SceneParseError;
use crate::shape::Shape;
use crate::vector::Vector3D;

/// Number of numeric fields following each shape keyword.
fn arity(kind: &str) -> Option<usize> {
    match kind {
        "plane" => Some(6),
        "sphere" => Some(7),
        "cube" => Some(10),
        "cylinder" => Some(11),
        "tetrahedron" => Some(15),
        _ => None,
    }
}

fn vector(v: &[f64]) -> Vector3D {
    Vector3D::new(v[0], v[1], v[2])
}

fn color(v: &[f64]) -> Color {
    Color::rgb(v[0], v[1], v[2])
}

/// Parses the numeric fields of a line. `fields` excludes the keyword.
fn parse_fields(line: usize, fields: &[&str]) -> Result<Vec<f64>, SceneParseError> {
    fields.iter()
        .enumerate()
        .map(|(i, field)| {
            let field = field.trim();
            field.parse::<f64>().map_err(|source| SceneParseError::InvalidNumber {
                line,
                field: i + 1,
                value: field.into(),
                source,
            })
        })
        .collect()
}

/// Parses a single scene line.
///
/// Returns `Ok(None)` for lines that describe no shape: blank lines and lines
/// with an unknown keyword.
fn parse_line(line: usize, text: &str) -> Result<Option<Shape>, SceneParseError> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let params: Vec<&str> = text.split(',').collect();
    let kind = params[0].trim();

    let expected = match arity(kind) {
        Some(n) => n,
        None => {
            warn!(line, keyword = kind, "skipping line with unknown shape keyword");
            return Ok(None);
        },
    };

    let found = params.len() - 1;
    if found != expected {
        return Err(SceneParseError::FieldCount {
            line,
            kind: kind.into(),
            expected,
            found,
        });
    }

    let v = parse_fields(line, &params[1..])?;
    let shape = match kind {
        "plane" => Shape::plane(vector(&v[0..3]), vector(&v[3..6])),
        "sphere" => Shape::sphere(vector(&v[0..3]), v[3], color(&v[4..7])),
        "cube" => Shape::cube(vector(&v[0..3]), v[3], vector(&v[4..7]), color(&v[7..10])),
        "cylinder" => Shape::cylinder(vector(&v[0..3]), v[3], v[4],
            vector(&v[5..8]), color(&v[8..11])),
        _ => Shape::tetrahedron([
            vector(&v[0..3]),
            vector(&v[3..6]),
            vector(&v[6..9]),
            vector(&v[9..12]),
        ], color(&v[12..15])),
    };

    let shape = shape.map_err(|source| SceneParseError::Geometry { line, source })?;
    debug!(line, kind, "parsed shape");
    Ok(Some(shape))
}

/// Parses a scene description into its shapes, in file order.
///
/// Each line holds one shape, as a keyword followed by comma-separated
/// numbers:
///
/// ```text
/// plane,px,py,pz,nx,ny,nz
/// sphere,px,py,pz,radius,r,g,b
/// cube,px,py,pz,length,rx,ry,rz,r,g,b
/// cylinder,px,py,pz,height,radius,rx,ry,rz,r,g,b
/// tetrahedron,x1,y1,z1,x2,y2,z2,x3,y3,z3,x4,y4,z4,r,g,b
/// ```
///
/// Rotations are Euler angles in degrees. Lines with an unknown keyword are
/// skipped with a warning. Any other malformed line aborts parsing, so a
/// scene is never built with some of its shapes silently missing.
///
/// ```
/// # use tiled_ray_tracer::scene::parse_scene;
/// let shapes = parse_scene("plane,0,-0.5,0,0,1,0\nsphere,0,0,1,0.5,1,0,0\n").unwrap();
/// assert_eq!(shapes.len(), 2);
/// ```
pub fn parse_scene(text: &str) -> Result<Vec<Shape>, SceneParseError> {
    let mut shapes = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(shape) = parse_line(i + 1, line)? {
            shapes.push(shape);
        }
    }

    Ok(shapes)
}

/// Reads and parses a scene description file.
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Vec<Shape>, SceneParseError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| SceneParseError::Io {
        path: path.into(),
        source,
    })?;

    let shapes = parse_scene(&text)?;
    info!(path = %path.display(), shapes = shapes.len(), "scene loaded");
    Ok(shapes)
}

#[test]
fn parse_every_kind() {
    use crate::shape::ShapeKind;

    let text = "\
plane,0,-0.5,0,0,1,0
sphere,0,0,1,0.5,1,0,0
cube,1,0,2,0.5,0,45,0,0,1,0
cylinder,-1,0,2,1,0.25,90,0,0,0,0,1
tetrahedron,0,0,0,1,0,0,0,1,0,0,0,1,1,1,0
";
    let shapes = parse_scene(text).unwrap();

    assert_eq!(shapes.len(), 5);
    assert!(matches!(shapes[0].kind, ShapeKind::Plane { .. }));
    assert!(matches!(shapes[1].kind, ShapeKind::Sphere { radius, .. } if radius == 0.5));
    assert!(matches!(shapes[2].kind, ShapeKind::Cube(_)));
    assert!(matches!(shapes[3].kind, ShapeKind::Cylinder(_)));
    assert!(matches!(shapes[4].kind, ShapeKind::Tetrahedron(_)));

    assert_eq!(shapes[1].color_at(Vector3D::zero()), Color::red());
    assert_eq!(shapes[4].color_at(Vector3D::zero()), Color::rgb(1.0, 1.0, 0.0));
}

#[test]
fn cylinder_rotation_is_in_degrees() {
    use crate::shape::ShapeKind;

    let shapes = parse_scene("cylinder,0,0,0,2,1,90,0,0,1,1,1").unwrap();

    match shapes[0].kind {
        ShapeKind::Cylinder(ref c) => assert_eq!(c.axis, Vector3D::new(0.0, 0.0, 1.0)),
        _ => panic!("expected a cylinder"),
    }
}

#[test]
fn fields_may_carry_whitespace() {
    let shapes = parse_scene("sphere, 0, 0, 1, 0.5, 1, 0, 0\r\n").unwrap();

    assert_eq!(shapes.len(), 1);
}

#[test]
fn unknown_keywords_and_blank_lines_are_skipped() {
    let text = "\
torus,0,0,0,1,0.25

sphere,0,0,1,0.5,1,0,0
";
    let shapes = parse_scene(text).unwrap();

    assert_eq!(shapes.len(), 1);
}

#[test]
fn wrong_field_count_names_the_line() {
    let text = "plane,0,-0.5,0,0,1,0\nsphere,0,0,1,0.5,1,0\n";
    let err = parse_scene(text).unwrap_err();

    assert_eq!(err.line(), Some(2));
    assert!(matches!(err, SceneParseError::FieldCount { expected: 7, found: 6, .. }));
}

#[test]
fn non_numeric_field_names_the_line() {
    let text = "sphere,0,0,1,0.5,1,0,0\n\nsphere,0,zero,1,0.5,1,0,0\n";
    let err = parse_scene(text).unwrap_err();

    match err {
        SceneParseError::InvalidNumber { line, field, ref value, .. } => {
            assert_eq!(line, 3);
            assert_eq!(field, 2);
            assert_eq!(value, "zero");
        },
        _ => panic!("unexpected error {:?}", err),
    }
}

#[test]
fn degenerate_shape_names_the_line() {
    let err = parse_scene("plane,0,0,0,0,0,0").unwrap_err();

    assert_eq!(err.line(), Some(1));
    assert!(matches!(err, SceneParseError::Geometry { .. }));
}

#[test]
fn missing_scene_file_is_an_io_error() {
    let err = load_scene("/nonexistent/scene.txt").unwrap_err();

    assert!(matches!(err, SceneParseError::Io { .. }));
    assert_eq!(err.line(), None);
}
