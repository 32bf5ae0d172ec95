use std::fmt;
use std::sync::Arc;

use crate::color::Color;
use crate::vector::Vector3D;

/// A position-dependent surface color.
pub trait Pattern: fmt::Debug + Send + Sync {
    fn pattern_at(&self, p: Vector3D) -> Color;
}

/// The color of a surface: either constant, or computed from the hit point.
///
/// Procedural colors are evaluated lazily, only when a point is shaded.
#[derive(Clone, Debug)]
pub enum SurfaceColor {
    Constant(Color),
    Procedural(Arc<dyn Pattern>),
}

impl SurfaceColor {
    pub fn checker(primary: Color, secondary: Color) -> SurfaceColor {
        SurfaceColor::Procedural(Arc::new(CheckerPattern::new(primary, secondary)))
    }

    pub fn color_at(&self, p: Vector3D) -> Color {
        match self {
            SurfaceColor::Constant(c) => *c,
            SurfaceColor::Procedural(pattern) => pattern.pattern_at(p),
        }
    }
}

impl From<Color> for SurfaceColor {
    fn from(c: Color) -> SurfaceColor {
        SurfaceColor::Constant(c)
    }
}

/// A checkerboard in the XZ plane with half-unit squares.
///
/// For a point `(x, y, z)`, the `primary` color is used when
/// `floor(2x) mod 2 == floor(2z) mod 2`; otherwise, `secondary` is. The Y
/// coordinate is ignored, so the pattern is meant for horizontal planes.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CheckerPattern {
    primary: Color,
    secondary: Color,
}

impl CheckerPattern {
    pub fn new(primary: Color, secondary: Color) -> CheckerPattern {
        CheckerPattern { primary, secondary }
    }
}

impl Pattern for CheckerPattern {
    fn pattern_at(&self, p: Vector3D) -> Color {
        let cell_x = (2.0 * p.x).floor().rem_euclid(2.0);
        let cell_z = (2.0 * p.z).floor().rem_euclid(2.0);

        if cell_x == cell_z {
            self.primary
        } else {
            self.secondary
        }
    }
}

#[test]
fn checker_alternates_along_x() {
    let pattern = CheckerPattern::new(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Vector3D::new(0.1, 0.0, 0.1)), Color::white());
    assert_eq!(pattern.pattern_at(Vector3D::new(0.6, 0.0, 0.1)), Color::black());
    assert_eq!(pattern.pattern_at(Vector3D::new(1.1, 0.0, 0.1)), Color::white());
}

#[test]
fn checker_alternates_along_z() {
    let pattern = CheckerPattern::new(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Vector3D::new(0.1, 0.0, 0.6)), Color::black());
    assert_eq!(pattern.pattern_at(Vector3D::new(0.6, 0.0, 0.6)), Color::white());
}

#[test]
fn checker_is_constant_along_y() {
    let pattern = CheckerPattern::new(Color::white(), Color::black());

    for y in &[-3.0, 0.0, 0.5, 7.25] {
        assert_eq!(pattern.pattern_at(Vector3D::new(0.1, *y, 0.1)), Color::white());
    }
}

#[test]
fn checker_continues_across_origin() {
    let pattern = CheckerPattern::new(Color::white(), Color::black());

    // floor(-0.2) = -1 is odd, so the cell just left of the origin differs.
    assert_eq!(pattern.pattern_at(Vector3D::new(-0.1, 0.0, 0.1)), Color::black());
    assert_eq!(pattern.pattern_at(Vector3D::new(-0.1, 0.0, -0.1)), Color::white());
}

#[test]
fn constant_color_ignores_position() {
    let c = SurfaceColor::from(Color::red());

    assert_eq!(c.color_at(Vector3D::new(10.0, -4.0, 2.5)), Color::red());
}
