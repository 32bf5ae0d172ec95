use std::ops::{ Add, Sub, Neg, Mul };

use serde::{ Serialize, Deserialize };

use crate::feq;
use crate::consts::NORMALIZE_EPSILON;
use crate::error::DegenerateGeometryError;
use crate::matrix::Matrix3D;

/// A three-component vector, used both for points and for directions.
///
/// Equality is approximate (see `feq`), which is what the tests want; the
/// render code itself never compares vectors for equality.
///
/// In config files a vector is written as a plain `[x, y, z]` array.
#[derive(Debug, Default, Copy, Clone, PartialOrd, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PartialEq for Vector3D {
    fn eq(&self, other: &Vector3D) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

impl From<[f64; 3]> for Vector3D {
    fn from(v: [f64; 3]) -> Vector3D {
        Vector3D { x: v[0], y: v[1], z: v[2] }
    }
}

impl From<Vector3D> for [f64; 3] {
    fn from(v: Vector3D) -> [f64; 3] {
        [v.x, v.y, v.z]
    }
}

impl Vector3D {
    pub fn new(x: f64, y: f64, z: f64) -> Vector3D {
        Vector3D { x, y, z }
    }

    pub fn zero() -> Vector3D {
        Vector3D { x: 0.0, y: 0.0, z: 0.0 }
    }

    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Scales a vector to unit length.
    ///
    /// Fails for vectors too short to have a meaningful direction instead of
    /// dividing by a vanishing magnitude.
    ///
    /// ```
    /// # use tiled_ray_tracer::vector::Vector3D;
    /// let v = Vector3D::new(4.0, 0.0, 0.0);
    /// assert_eq!(v.normalize(), Ok(Vector3D::new(1.0, 0.0, 0.0)));
    /// assert!(Vector3D::zero().normalize().is_err());
    /// ```
    pub fn normalize(&self) -> Result<Vector3D, DegenerateGeometryError> {
        let mag = self.magnitude();
        if !(mag > NORMALIZE_EPSILON) {
            return Err(DegenerateGeometryError::ZeroVector);
        }

        Ok(*self * (1.0 / mag))
    }

    pub fn dot(&self, other: &Vector3D) -> f64 {
        self.x * other.x
            + self.y * other.y
            + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3D) -> Vector3D {
        Vector3D {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Reflects a vector across a normal: `v - 2·dot(v, n)·n`.
    pub fn reflect(&self, normal: &Vector3D) -> Vector3D {
        *self - (*normal * 2.0 * self.dot(normal))
    }

    /// Rotates a vector about the origin by Euler angles given in degrees.
    ///
    /// The X rotation is applied first, then Y, then Z.
    pub fn rotate(&self, degrees: Vector3D) -> Vector3D {
        Matrix3D::rotation(degrees) * *self
    }
}

impl Add for Vector3D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vector3D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vector3D {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// Scalar right-multiplication.
impl Mul<f64> for Vector3D {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other,
        }
    }
}

/// Scalar left-multiplication.
///
/// ```
/// # use tiled_ray_tracer::vector::Vector3D;
/// let v = Vector3D::new(1.0, -2.0, 3.0);
/// assert_eq!(2.0 * v, v * 2.0);
/// ```
impl Mul<Vector3D> for f64 {
    type Output = Vector3D;

    fn mul(self, other: Vector3D) -> Vector3D {
        other * self
    }
}

/* Tests */

#[test]
fn add_vectors() {
    let a1 = Vector3D::new(3.0, -2.0, 5.0);
    let a2 = Vector3D::new(-2.0, 3.0, 1.0);

    assert_eq!(a1 + a2, Vector3D::new(1.0, 1.0, 6.0));
}

#[test]
fn sub_vectors() {
    let p1 = Vector3D::new(3.0, 2.0, 1.0);
    let p2 = Vector3D::new(5.0, 6.0, 7.0);

    assert_eq!(p1 - p2, Vector3D::new(-2.0, -4.0, -6.0));
}

#[test]
fn neg_vector() {
    let a = Vector3D::new(1.0, -2.0, 3.0);

    assert_eq!(-a, Vector3D::new(-1.0, 2.0, -3.0));
}

#[test]
fn magnitude_neg() {
    let v = Vector3D::new(-1.0, -2.0, -3.0);

    assert_eq!(v.magnitude(), f64::sqrt(14.0));
}

#[test]
fn normalize_dirty() {
    let v = Vector3D::new(1.0, 2.0, 3.0);
    let e = Vector3D::new(
        1.0 / f64::sqrt(14.0),
        2.0 / f64::sqrt(14.0),
        3.0 / f64::sqrt(14.0)
    );

    assert_eq!(v.normalize().unwrap(), e);
    assert!(feq(v.normalize().unwrap().magnitude(), 1.0));
}

#[test]
fn normalize_tiny_vector_fails() {
    let v = Vector3D::new(1e-14, 0.0, 0.0);

    assert_eq!(v.normalize(), Err(DegenerateGeometryError::ZeroVector));
}

#[test]
fn normalize_nan_vector_fails() {
    let v = Vector3D::new(f64::NAN, 0.0, 0.0);

    assert!(v.normalize().is_err());
}

#[test]
fn dot_vectors() {
    let a = Vector3D::new(1.0, 2.0, 3.0);
    let b = Vector3D::new(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn cross_vectors() {
    let a = Vector3D::new(1.0, 2.0, 3.0);
    let b = Vector3D::new(2.0, 3.0, 4.0);

    assert_eq!(a.cross(&b), Vector3D::new(-1.0, 2.0, -1.0));
    assert_eq!(b.cross(&a), Vector3D::new(1.0, -2.0, 1.0));
}

#[test]
fn reflect_45() {
    let v = Vector3D::new(1.0, -1.0, 0.0);
    let n = Vector3D::new(0.0, 1.0, 0.0);

    assert_eq!(v.reflect(&n), Vector3D::new(1.0, 1.0, 0.0));
}

#[test]
fn reflect_off_slanted_surface() {
    let v = Vector3D::new(0.0, -1.0, 0.0);
    let n = Vector3D::new(2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0, 0.0);

    assert_eq!(v.reflect(&n), Vector3D::new(1.0, 0.0, 0.0));
}

#[test]
fn rotate_about_each_axis() {
    let y = Vector3D::new(0.0, 1.0, 0.0);

    assert_eq!(y.rotate(Vector3D::new(90.0, 0.0, 0.0)), Vector3D::new(0.0, 0.0, 1.0));
    assert_eq!(y.rotate(Vector3D::new(0.0, 90.0, 0.0)), y);
    assert_eq!(y.rotate(Vector3D::new(0.0, 0.0, 90.0)), Vector3D::new(-1.0, 0.0, 0.0));
}

#[test]
fn rotation_order_is_x_then_y_then_z() {
    // X by 90 takes Y to Z, then Y by 90 takes Z to X.
    let y = Vector3D::new(0.0, 1.0, 0.0);

    assert_eq!(y.rotate(Vector3D::new(90.0, 90.0, 0.0)), Vector3D::new(1.0, 0.0, 0.0));
}

#[test]
fn deserialize_from_array() {
    let v: Vector3D = serde_json::from_str("[0.0, 0.35, -1.0]").unwrap();

    assert_eq!(v, Vector3D::new(0.0, 0.35, -1.0));
}
