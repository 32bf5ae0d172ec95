pub mod consts;
pub mod error;

pub mod vector;
pub mod matrix;
pub mod ray;
pub mod geometry;
pub mod shape;

pub mod color;
pub mod pattern;
pub mod light;

pub mod config;
pub mod world;
pub mod camera;
pub mod canvas;

pub mod scene;
pub mod parallel;

use consts::FEQ_EPSILON;

/// Approximate float equality, used by the `PartialEq` impls of vectors,
/// matrices and colors.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
