use std::ops::{ Index, IndexMut, Mul };

use crate::feq;
use crate::vector::Vector3D;

/// A 3x3 matrix, stored row-major.
///
/// Only rotations are needed by the renderer: shapes are positioned by their
/// own parameters, and rotated cubes and cylinders bake the rotation into
/// their geometry once at construction.
#[derive(Copy, Clone, Debug, Default)]
pub struct Matrix3D {
    data: [f64; 9],
}

/// Determines whether two `Matrix3D`s are equal.
///
/// Matrices are compared element-wise and approximately.
impl PartialEq for Matrix3D {
    fn eq(&self, other: &Matrix3D) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl From<[f64; 9]> for Matrix3D {
    fn from(data: [f64; 9]) -> Matrix3D {
        Matrix3D { data }
    }
}

impl Index<(usize, usize)> for Matrix3D {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[(index.0 * 3) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix3D {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f64 {
        &mut self.data[(index.0 * 3) + index.1]
    }
}

impl Matrix3D {
    /// Instantiates a 3x3 identity matrix.
    pub fn identity() -> Matrix3D {
        let mut buf = [0.0; 9];
        buf[0] = 1.0; buf[4] = 1.0; buf[8] = 1.0;

        Matrix3D { data: buf }
    }

    /// Rotation about the X axis by `r` radians.
    ///
    /// ```
    /// # use tiled_ray_tracer::vector::Vector3D;
    /// # use tiled_ray_tracer::matrix::Matrix3D;
    /// let v = Vector3D::new(0.0, 1.0, 0.0);
    /// let m = Matrix3D::rotation_x(std::f64::consts::PI / 2.0);
    /// assert_eq!(m * v, Vector3D::new(0.0, 0.0, 1.0));
    /// ```
    pub fn rotation_x(r: f64) -> Matrix3D {
        let mut rotate = Self::identity();
        rotate[(1, 1)] =  r.cos();
        rotate[(1, 2)] = -r.sin();
        rotate[(2, 1)] =  r.sin();
        rotate[(2, 2)] =  r.cos();

        rotate
    }

    /// Rotation about the Y axis by `r` radians.
    pub fn rotation_y(r: f64) -> Matrix3D {
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  r.cos();
        rotate[(0, 2)] =  r.sin();
        rotate[(2, 0)] = -r.sin();
        rotate[(2, 2)] =  r.cos();

        rotate
    }

    /// Rotation about the Z axis by `r` radians.
    pub fn rotation_z(r: f64) -> Matrix3D {
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  r.cos();
        rotate[(0, 1)] = -r.sin();
        rotate[(1, 0)] =  r.sin();
        rotate[(1, 1)] =  r.cos();

        rotate
    }

    /// Composes the three axis rotations for Euler angles in degrees.
    ///
    /// The result is `Rz * Ry * Rx`, so a vector is rotated about X first.
    pub fn rotation(degrees: Vector3D) -> Matrix3D {
        let radians = degrees * (std::f64::consts::PI / 180.0);

        Self::rotation_z(radians.z)
            * Self::rotation_y(radians.y)
            * Self::rotation_x(radians.x)
    }
}

impl Mul<Matrix3D> for Matrix3D {
    type Output = Matrix3D;

    fn mul(self, other: Matrix3D) -> Matrix3D {
        let mut product = Matrix3D::default();
        for r in 0..3 {
            for c in 0..3 {
                product[(r, c)] = (0..3).map(|k| self[(r, k)] * other[(k, c)]).sum();
            }
        }

        product
    }
}

impl Mul<Vector3D> for Matrix3D {
    type Output = Vector3D;

    fn mul(self, v: Vector3D) -> Vector3D {
        Vector3D {
            x: self[(0, 0)] * v.x + self[(0, 1)] * v.y + self[(0, 2)] * v.z,
            y: self[(1, 0)] * v.x + self[(1, 1)] * v.y + self[(1, 2)] * v.z,
            z: self[(2, 0)] * v.x + self[(2, 1)] * v.y + self[(2, 2)] * v.z,
        }
    }
}

#[test]
fn multiply_by_identity() {
    let m = Matrix3D::from([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);

    assert_eq!(m * Matrix3D::identity(), m);
    assert_eq!(Matrix3D::identity() * m, m);
}

#[test]
fn multiply_matrices() {
    let a = Matrix3D::from([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    let b = Matrix3D::from([9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);

    assert_eq!(a * b,
        Matrix3D::from([30.0, 24.0, 18.0, 84.0, 69.0, 54.0, 138.0, 114.0, 90.0]));
}

#[test]
fn zero_rotation_is_identity() {
    assert_eq!(Matrix3D::rotation(Vector3D::zero()), Matrix3D::identity());
}

#[test]
fn rotation_preserves_length() {
    let v = Vector3D::new(1.0, 2.0, 3.0);
    let r = Matrix3D::rotation(Vector3D::new(30.0, -45.0, 60.0)) * v;

    assert!(feq(r.magnitude(), v.magnitude()));
}

#[test]
fn rotate_z_quarter_turn() {
    let v = Vector3D::new(1.0, 0.0, 0.0);
    let m = Matrix3D::rotation_z(std::f64::consts::PI / 2.0);

    assert_eq!(m * v, Vector3D::new(0.0, 1.0, 0.0));
}
