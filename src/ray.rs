use crate::vector::Vector3D;
use crate::error::DegenerateGeometryError;

/// A ray with an origin point and a unit-length direction.
///
/// Every intersection routine assumes `direction` is normalized, so the
/// constructor normalizes and refuses a zero direction.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray3D {
    pub origin: Vector3D,
    pub direction: Vector3D,
}

impl Ray3D {
    pub fn new(origin: Vector3D, direction: Vector3D)
        -> Result<Ray3D, DegenerateGeometryError> {
        Ok(Ray3D { origin, direction: direction.normalize()? })
    }

    /// Builds a ray from a point towards another point.
    pub fn towards(origin: Vector3D, target: Vector3D)
        -> Result<Ray3D, DegenerateGeometryError> {
        Self::new(origin, target - origin)
    }

    pub fn position(&self, t: f64) -> Vector3D {
        self.origin + (t * self.direction)
    }
}

#[test]
fn ray_position() {
    let r = Ray3D::new(
                Vector3D::new(2.0, 3.0, 4.0),
                Vector3D::new(1.0, 0.0, 0.0)
            ).unwrap();

    assert_eq!(r.position(0.0), Vector3D::new(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Vector3D::new(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Vector3D::new(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Vector3D::new(4.5, 3.0, 4.0));
}

#[test]
fn ray_direction_is_normalized() {
    let r = Ray3D::new(Vector3D::zero(), Vector3D::new(0.0, 3.0, 4.0)).unwrap();

    assert_eq!(r.direction, Vector3D::new(0.0, 0.6, 0.8));
}

#[test]
fn ray_towards_same_point_fails() {
    let p = Vector3D::new(1.0, 1.0, 1.0);

    assert_eq!(Ray3D::towards(p, p), Err(DegenerateGeometryError::ZeroVector));
}
