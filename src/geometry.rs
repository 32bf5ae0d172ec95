//! Closed-form intersection routines and the planar pieces shapes are built
//! from.
//!
//! Every routine takes a ray whose direction is unit length and returns the
//! distance along it to the nearest surface point in front of the origin, or
//! `None` when there is no such point.

use std::cmp::Ordering;

use crate::consts::{ PARALLEL_EPSILON, ON_PLANE_EPSILON };
use crate::error::DegenerateGeometryError;
use crate::ray::Ray3D;
use crate::vector::Vector3D;

/// Intersects a ray with the infinite plane through `point` with `normal`.
///
/// Rays within `PARALLEL_EPSILON` of parallel never hit, whatever their
/// origin.
pub fn intersect_plane(ray: &Ray3D, point: Vector3D, normal: Vector3D)
    -> Option<f64> {
    let denom = ray.direction.dot(&normal);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let d = (point - ray.origin).dot(&normal) / denom;
    if d < 0.0 {
        return None;
    }

    Some(d)
}

/// Intersects a ray with a sphere.
///
/// Of the two roots, the smaller non-negative one is returned, so a ray
/// starting inside the sphere hits its far side. A tangent ray (zero
/// discriminant) is a miss.
pub fn intersect_sphere(ray: &Ray3D, center: Vector3D, radius: f64)
    -> Option<f64> {
    let a = ray.direction.dot(&ray.direction);
    let center_to_origin = ray.origin - center;
    let b = 2.0 * ray.direction.dot(&center_to_origin);
    let c = center_to_origin.dot(&center_to_origin) - radius * radius;

    let disc = b * b - 4.0 * a * c;
    if disc <= 0.0 {
        return None;
    }

    let disc_sqrt = disc.sqrt();
    let mut t0 = (-b - disc_sqrt) / (2.0 * a);
    let mut t1 = (-b + disc_sqrt) / (2.0 * a);
    if t0 > t1 {
        std::mem::swap(&mut t0, &mut t1);
    }

    if t1 < 0.0 {
        None
    } else if t0 < 0.0 {
        Some(t1)
    } else {
        Some(t0)
    }
}

/// Classifies a point already known to lie in the triangle's plane.
///
/// Uses barycentric coordinates `u` (along `p3 - p1`) and `v` (along
/// `p2 - p1`): the point is inside iff both are in `[0, 1]` and
/// `u + v <= 1`. Edges and vertices count as inside.
pub fn point_in_triangle(p1: Vector3D, p2: Vector3D, p3: Vector3D,
    m: Vector3D) -> bool {
    let v0 = p3 - p1;
    let v1 = p2 - p1;
    let v2 = m - p1;

    let dot00 = v0.dot(&v0);
    let dot01 = v0.dot(&v1);
    let dot02 = v0.dot(&v2);
    let dot11 = v1.dot(&v1);
    let dot12 = v1.dot(&v2);

    let inv_denom = 1.0 / (dot00 * dot11 - dot01 * dot01);

    let u = (dot11 * dot02 - dot01 * dot12) * inv_denom;
    if u < 0.0 || u > 1.0 {
        return false;
    }

    let v = (dot00 * dot12 - dot01 * dot02) * inv_denom;
    if v < 0.0 || v > 1.0 {
        return false;
    }

    u + v <= 1.0
}

/// A flat triangle with a normal fixed at construction.
///
/// The stored normal follows the winding `p1 -> p2 -> p3`; which side faces
/// a viewer is decided per query by `facing`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrianglePlane {
    pub p1: Vector3D,
    pub p2: Vector3D,
    pub p3: Vector3D,
    pub normal: Vector3D,
}

impl TrianglePlane {
    pub fn new(p1: Vector3D, p2: Vector3D, p3: Vector3D)
        -> Result<TrianglePlane, DegenerateGeometryError> {
        let normal = (p2 - p1).cross(&(p3 - p1)).normalize()
            .map_err(|_| DegenerateGeometryError::CollinearTriangle)?;

        Ok(TrianglePlane { p1, p2, p3, normal })
    }

    pub fn intersect(&self, ray: &Ray3D) -> Option<f64> {
        let d = intersect_plane(ray, self.p1, self.normal)?;
        if point_in_triangle(self.p1, self.p2, self.p3, ray.position(d)) {
            Some(d)
        } else {
            None
        }
    }

    /// Distance of `point` from the triangle's plane.
    pub fn residual(&self, point: Vector3D) -> f64 {
        (point - self.p1).dot(&self.normal).abs()
    }

    /// Whether `point` lies on the triangle (within `ON_PLANE_EPSILON` of the
    /// plane, and inside the edges).
    pub fn contains(&self, point: Vector3D) -> bool {
        self.residual(point) < ON_PLANE_EPSILON
            && point_in_triangle(self.p1, self.p2, self.p3, point)
    }

    /// The normal, flipped if needed so that it points towards `viewer`.
    pub fn facing(&self, viewer: Vector3D) -> Vector3D {
        if (self.p1 - viewer).dot(&self.normal) < 0.0 {
            self.normal
        } else {
            -self.normal
        }
    }
}

/// Nearest hit among a set of triangles.
pub fn intersect_triangles(ray: &Ray3D, triangles: &[TrianglePlane])
    -> Option<f64> {
    triangles.iter()
        .filter_map(|t| t.intersect(ray))
        .fold(None, |nearest, d| match nearest {
            Some(n) if n <= d => Some(n),
            _ => Some(d),
        })
}

/// The face of a polyhedron that a surface point lies on.
///
/// The first face whose plane residual is within `ON_PLANE_EPSILON` wins.
/// Rounding can leave a genuine hit point just outside that tolerance, so in
/// that case the face with the smallest residual is used instead.
pub fn face_at(faces: &[TrianglePlane], point: Vector3D)
    -> Option<&TrianglePlane> {
    faces.iter()
        .find(|f| f.residual(point) < ON_PLANE_EPSILON)
        .or_else(|| faces.iter().min_by(|a, b|
            a.residual(point).partial_cmp(&b.residual(point))
                .unwrap_or(Ordering::Equal)
        ))
}

/// Splits a planar quadrilateral into two triangles.
///
/// The first triangle is `(v0, v1, v2)`. The second is made of `v3` and the
/// two vertices nearest to it, in input order; for a rectangle that
/// means the split runs along the `v1`-`v2` diagonal opposite `v0`.
pub fn split_square(square: [Vector3D; 4])
    -> Result<[TrianglePlane; 2], DegenerateGeometryError> {
    let first = TrianglePlane::new(square[0], square[1], square[2])?;

    let mut farthest = 0;
    let mut max_dist = 0.0;
    for (i, v) in square[..3].iter().enumerate() {
        let dist = (*v - square[3]).magnitude();
        if dist > max_dist {
            max_dist = dist;
            farthest = i;
        }
    }

    let rest: Vec<Vector3D> = (0..4)
        .filter(|&i| i != farthest)
        .map(|i| square[i])
        .collect();
    let second = TrianglePlane::new(rest[0], rest[1], rest[2])?;

    Ok([first, second])
}

/// A flat disc, used for the end caps of cylinders.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CirclePlane {
    pub position: Vector3D,
    pub radius: f64,
    pub normal: Vector3D,
}

impl CirclePlane {
    pub fn new(position: Vector3D, radius: f64, normal: Vector3D) -> CirclePlane {
        CirclePlane { position, radius, normal }
    }

    /// Intersects a ray with the disc; hits on the plane outside the radius
    /// are misses.
    pub fn intersect(&self, ray: &Ray3D) -> Option<f64> {
        let d = intersect_plane(ray, self.position, self.normal)?;
        if (ray.position(d) - self.position).magnitude() <= self.radius {
            Some(d)
        } else {
            None
        }
    }

    /// Whether `point` lies on the disc, strictly inside its rim.
    pub fn contains(&self, point: Vector3D) -> bool {
        (point - self.position).dot(&self.normal).abs() < ON_PLANE_EPSILON
            && (point - self.position).magnitude() < self.radius
    }
}

#[cfg(test)]
fn ray(origin: (f64, f64, f64), direction: (f64, f64, f64)) -> Ray3D {
    Ray3D::new(
        Vector3D::new(origin.0, origin.1, origin.2),
        Vector3D::new(direction.0, direction.1, direction.2),
    ).unwrap()
}

#[test]
fn ray_aimed_at_sphere_center_hits_at_distance_minus_radius() {
    let center = Vector3D::zero();
    for &(d, r) in &[(5.0, 1.0), (3.0, 2.5), (100.0, 0.25), (1.5, 1.0)] {
        let direction = Vector3D::new(1.0, 2.0, -2.0).normalize().unwrap();
        let r3 = Ray3D::new(center + direction * d, -direction).unwrap();

        let t = intersect_sphere(&r3, center, r).unwrap();
        assert!((t - (d - r)).abs() < 1e-6, "d={} r={} t={}", d, r, t);
    }
}

#[test]
fn ray_inside_sphere_hits_far_side() {
    let r = ray((0.0, 0.0, 0.0), (0.0, 0.0, 1.0));

    assert_eq!(intersect_sphere(&r, Vector3D::zero(), 1.0), Some(1.0));
}

#[test]
fn sphere_behind_ray_is_missed() {
    let r = ray((0.0, 0.0, 5.0), (0.0, 0.0, 1.0));

    assert_eq!(intersect_sphere(&r, Vector3D::zero(), 1.0), None);
}

#[test]
fn tangent_ray_misses_sphere() {
    let r = ray((0.0, 1.0, -5.0), (0.0, 0.0, 1.0));

    assert_eq!(intersect_sphere(&r, Vector3D::zero(), 1.0), None);
}

#[test]
fn ray_parallel_to_plane_never_hits() {
    let point = Vector3D::new(0.0, -0.5, 0.0);
    let normal = Vector3D::new(0.0, 1.0, 0.0);

    for &y in &[-0.5, -10.0, 0.0, 3.0] {
        let r = ray((1.0, y, -2.0), (1.0, 0.0, 1.0));
        assert_eq!(intersect_plane(&r, point, normal), None);
    }

    // Just inside the parallel tolerance.
    let r = ray((0.0, 1.0, 0.0), (1.0, -5e-7, 0.0));
    assert_eq!(intersect_plane(&r, point, normal), None);
}

#[test]
fn ray_intersecting_plane_from_above_and_below() {
    let point = Vector3D::zero();
    let normal = Vector3D::new(0.0, 1.0, 0.0);

    let above = ray((0.0, 1.0, 0.0), (0.0, -1.0, 0.0));
    let below = ray((0.0, -2.0, 0.0), (0.0, 1.0, 0.0));
    let away = ray((0.0, 1.0, 0.0), (0.0, 1.0, 0.0));

    assert_eq!(intersect_plane(&above, point, normal), Some(1.0));
    assert_eq!(intersect_plane(&below, point, normal), Some(2.0));
    assert_eq!(intersect_plane(&away, point, normal), None);
}

#[test]
fn point_in_triangle_is_invariant_under_rotation_of_vertices() {
    let a = Vector3D::new(0.0, 0.0, 0.0);
    let b = Vector3D::new(1.0, 0.0, 0.0);
    let c = Vector3D::new(0.0, 1.0, 0.0);

    let points = [
        (Vector3D::new(0.2, 0.2, 0.0), true),
        (Vector3D::new(0.1, 0.7, 0.0), true),
        (Vector3D::new(0.6, 0.3, 0.0), true),
        (Vector3D::new(0.33, 0.33, 0.0), true),
        (Vector3D::new(0.5, 0.6, 0.0), false),
        (Vector3D::new(-0.1, 0.5, 0.0), false),
        (Vector3D::new(0.3, -0.05, 0.0), false),
        (Vector3D::new(0.9, 0.9, 0.0), false),
        (Vector3D::new(2.0, -0.5, 0.0), false),
    ];

    for (p, inside) in points.iter() {
        assert_eq!(point_in_triangle(a, b, c, *p), *inside, "{:?}", p);
        assert_eq!(point_in_triangle(b, c, a, *p), *inside, "{:?}", p);
        assert_eq!(point_in_triangle(c, a, b, *p), *inside, "{:?}", p);
    }
}

#[test]
fn triangle_normal_from_winding() {
    let t = TrianglePlane::new(
        Vector3D::new(0.0, 1.0, 0.0),
        Vector3D::new(-1.0, 0.0, 0.0),
        Vector3D::new(1.0, 0.0, 0.0),
    ).unwrap();

    assert_eq!(t.normal, Vector3D::new(0.0, 0.0, 1.0));
}

#[test]
fn collinear_triangle_is_rejected() {
    let t = TrianglePlane::new(
        Vector3D::new(0.0, 0.0, 0.0),
        Vector3D::new(1.0, 1.0, 1.0),
        Vector3D::new(2.0, 2.0, 2.0),
    );

    assert_eq!(t, Err(DegenerateGeometryError::CollinearTriangle));
}

#[test]
fn triangle_normal_faces_the_viewer() {
    let t = TrianglePlane::new(
        Vector3D::new(0.0, 1.0, 0.0),
        Vector3D::new(-1.0, 0.0, 0.0),
        Vector3D::new(1.0, 0.0, 0.0),
    ).unwrap();

    assert_eq!(t.facing(Vector3D::new(0.0, 0.0, -5.0)), Vector3D::new(0.0, 0.0, -1.0));
    assert_eq!(t.facing(Vector3D::new(0.0, 0.0, 5.0)), Vector3D::new(0.0, 0.0, 1.0));
}

#[test]
fn ray_strikes_and_misses_triangle() {
    let t = TrianglePlane::new(
        Vector3D::new(0.0, 1.0, 0.0),
        Vector3D::new(-1.0, 0.0, 0.0),
        Vector3D::new(1.0, 0.0, 0.0),
    ).unwrap();

    let hit = ray((0.0, 0.5, -2.0), (0.0, 0.0, 1.0));
    let miss_edge = ray((1.0, 1.0, -2.0), (0.0, 0.0, 1.0));
    let parallel = ray((0.0, -1.0, -2.0), (0.0, 1.0, 0.0));

    assert_eq!(t.intersect(&hit), Some(2.0));
    assert_eq!(t.intersect(&miss_edge), None);
    assert_eq!(t.intersect(&parallel), None);
}

#[test]
fn square_is_split_along_the_inner_diagonal() {
    // v0 and v3 are opposite corners.
    let square = [
        Vector3D::new(1.0, 1.0, 0.0),
        Vector3D::new(1.0, -1.0, 0.0),
        Vector3D::new(-1.0, 1.0, 0.0),
        Vector3D::new(-1.0, -1.0, 0.0),
    ];

    let [first, second] = split_square(square).unwrap();

    assert_eq!((first.p1, first.p2, first.p3), (square[0], square[1], square[2]));
    assert_eq!((second.p1, second.p2, second.p3), (square[1], square[2], square[3]));

    // Together the two halves cover the square.
    for &(x, y) in &[(0.9, 0.9), (-0.9, -0.9), (0.5, -0.7), (-0.2, 0.6)] {
        let p = Vector3D::new(x, y, 0.0);
        assert!(first.contains(p) || second.contains(p), "({}, {})", x, y);
    }
}

#[test]
fn face_lookup_falls_back_to_nearest_plane() {
    let floor = TrianglePlane::new(
        Vector3D::new(0.0, 0.0, 0.0),
        Vector3D::new(0.0, 0.0, 1.0),
        Vector3D::new(1.0, 0.0, 0.0),
    ).unwrap();
    let wall = TrianglePlane::new(
        Vector3D::new(0.0, 0.0, 0.0),
        Vector3D::new(0.0, 1.0, 0.0),
        Vector3D::new(0.0, 0.0, 1.0),
    ).unwrap();
    let faces = [floor, wall];

    assert_eq!(face_at(&faces, Vector3D::new(0.0, 0.5, 0.5)), Some(&wall));
    assert_eq!(face_at(&faces, Vector3D::new(0.5, 1e-9, 0.25)), Some(&floor));
    assert_eq!(face_at(&[], Vector3D::zero()), None);
}

#[test]
fn nearest_of_several_triangles() {
    let near = TrianglePlane::new(
        Vector3D::new(-1.0, -1.0, 1.0),
        Vector3D::new(1.0, -1.0, 1.0),
        Vector3D::new(0.0, 1.0, 1.0),
    ).unwrap();
    let far = TrianglePlane::new(
        Vector3D::new(-1.0, -1.0, 3.0),
        Vector3D::new(1.0, -1.0, 3.0),
        Vector3D::new(0.0, 1.0, 3.0),
    ).unwrap();

    let r = ray((0.0, 0.0, 0.0), (0.0, 0.0, 1.0));
    assert_eq!(intersect_triangles(&r, &[far, near]), Some(1.0));
    assert_eq!(intersect_triangles(&r, &[]), None);
}

#[test]
fn disc_hits_only_inside_radius() {
    let cap = CirclePlane::new(Vector3D::new(0.0, 1.0, 0.0), 0.5,
        Vector3D::new(0.0, 1.0, 0.0));

    let inside = ray((0.2, 3.0, 0.0), (0.0, -1.0, 0.0));
    let outside = ray((0.8, 3.0, 0.0), (0.0, -1.0, 0.0));

    assert_eq!(cap.intersect(&inside), Some(2.0));
    assert_eq!(cap.intersect(&outside), None);
    assert!(cap.contains(Vector3D::new(0.2, 1.0, 0.0)));
    assert!(!cap.contains(Vector3D::new(0.2, 1.1, 0.0)));
}
