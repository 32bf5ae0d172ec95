use crate::color::Color;
use crate::error::DegenerateGeometryError;
use crate::geometry::{ TrianglePlane, CirclePlane, intersect_plane,
    intersect_sphere, intersect_triangles, face_at, split_square };
use crate::light::Material;
use crate::pattern::SurfaceColor;
use crate::ray::Ray3D;
use crate::vector::Vector3D;

/// A finite cylinder around an arbitrary axis, closed by two discs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cylinder {
    pub position: Vector3D,
    pub height: f64,
    pub radius: f64,

    /// Unit vector along the cylinder's axis.
    pub axis: Vector3D,

    /// The top (`+axis`) and bottom (`-axis`) caps.
    pub caps: [CirclePlane; 2],
}

/// A cube, stored as the 12 triangles of its 6 faces.
#[derive(Clone, Debug, PartialEq)]
pub struct Cube {
    pub position: Vector3D,
    pub half_extent: f64,
    pub rotation: Vector3D,
    pub faces: Vec<TrianglePlane>,
}

#[derive(Clone, Debug)]
pub enum ShapeKind {
    /// An infinite plane through `position`, with a unit `normal`.
    Plane { position: Vector3D, normal: Vector3D },

    Sphere { position: Vector3D, radius: f64 },

    Cylinder(Cylinder),

    Cube(Cube),

    /// A tetrahedron, stored as its 4 triangular faces.
    Tetrahedron([TrianglePlane; 4]),

    /// A lone triangle.
    Triangle(TrianglePlane),
}

/// A shape in a scene: its geometry plus the material it is shaded with.
///
/// All derived geometry (cube faces, cylinder caps, triangle normals) is
/// computed once by the constructors and never changes afterwards.
#[derive(Clone, Debug)]
pub struct Shape {
    pub kind: ShapeKind,
    pub material: Material,
}

fn positive(what: &'static str, value: f64) -> Result<f64, DegenerateGeometryError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(DegenerateGeometryError::NonPositive { what, value })
    }
}

/// Material used for every solid: constant color, half reflective.
fn solid_material(color: Color) -> Material {
    Material {
        color: SurfaceColor::Constant(color),
        reflection: Some(0.5),
        ..Default::default()
    }
}

impl Shape {
    /// Creates a plane with a white/black checkerboard.
    ///
    /// The normal does not need to be unit length, but it can't be zero.
    pub fn plane(position: Vector3D, normal: Vector3D)
        -> Result<Shape, DegenerateGeometryError> {
        Ok(Shape {
            kind: ShapeKind::Plane { position, normal: normal.normalize()? },
            material: Material {
                color: SurfaceColor::checker(Color::white(), Color::black()),
                diffuse: Some(0.75),
                specular: Some(0.5),
                reflection: Some(0.25),
            },
        })
    }

    pub fn sphere(position: Vector3D, radius: f64, color: Color)
        -> Result<Shape, DegenerateGeometryError> {
        Ok(Shape {
            kind: ShapeKind::Sphere { position, radius: positive("radius", radius)? },
            material: solid_material(color),
        })
    }

    /// Creates a cylinder centered at `position`.
    ///
    /// The axis starts out along +Y and is rotated by `rotation` (Euler
    /// angles in degrees, X first).
    pub fn cylinder(position: Vector3D, height: f64, radius: f64,
        rotation: Vector3D, color: Color) -> Result<Shape, DegenerateGeometryError> {
        let height = positive("height", height)?;
        let radius = positive("radius", radius)?;
        let axis = Vector3D::new(0.0, 1.0, 0.0).rotate(rotation).normalize()?;

        let top = CirclePlane::new(position + axis * (height / 2.0), radius, axis);
        let bottom = CirclePlane::new(position - axis * (height / 2.0), radius, -axis);

        Ok(Shape {
            kind: ShapeKind::Cylinder(Cylinder {
                position, height, radius, axis,
                caps: [top, bottom],
            }),
            material: solid_material(color),
        })
    }

    /// Creates a cube centered at `position` with edges `length` long,
    /// rotated by `rotation` (Euler angles in degrees, X first).
    pub fn cube(position: Vector3D, length: f64, rotation: Vector3D, color: Color)
        -> Result<Shape, DegenerateGeometryError> {
        let half_extent = positive("length", length)? / 2.0;

        let x = Vector3D::new(half_extent, 0.0, 0.0).rotate(rotation);
        let y = Vector3D::new(0.0, half_extent, 0.0).rotate(rotation);
        let z = Vector3D::new(0.0, 0.0, half_extent).rotate(rotation);

        // Faces in order +x, -x, +y, -y, +z, -z. Each gets its 4 corners in
        // the order the corners are generated below.
        let mut squares: [Vec<Vector3D>; 6] = Default::default();
        for (i, &sx) in [x, -x].iter().enumerate() {
            for (j, &sy) in [y, -y].iter().enumerate() {
                for (k, &sz) in [z, -z].iter().enumerate() {
                    let corner = position + sx + sy + sz;
                    squares[i].push(corner);
                    squares[2 + j].push(corner);
                    squares[4 + k].push(corner);
                }
            }
        }

        let mut faces = Vec::with_capacity(12);
        for s in squares.iter() {
            faces.extend_from_slice(&split_square([s[0], s[1], s[2], s[3]])?);
        }

        Ok(Shape {
            kind: ShapeKind::Cube(Cube { position, half_extent, rotation, faces }),
            material: solid_material(color),
        })
    }

    pub fn tetrahedron(vertices: [Vector3D; 4], color: Color)
        -> Result<Shape, DegenerateGeometryError> {
        let [a, b, c, d] = vertices;
        let faces = [
            TrianglePlane::new(a, b, c)?,
            TrianglePlane::new(a, b, d)?,
            TrianglePlane::new(a, c, d)?,
            TrianglePlane::new(b, c, d)?,
        ];

        Ok(Shape {
            kind: ShapeKind::Tetrahedron(faces),
            material: solid_material(color),
        })
    }

    pub fn triangle(p1: Vector3D, p2: Vector3D, p3: Vector3D, color: Color)
        -> Result<Shape, DegenerateGeometryError> {
        Ok(Shape {
            kind: ShapeKind::Triangle(TrianglePlane::new(p1, p2, p3)?),
            material: solid_material(color),
        })
    }

    /// Replaces the shape's material.
    pub fn with_material(mut self, material: Material) -> Shape {
        self.material = material;
        self
    }

    /// Distance along `ray` to the nearest point of the shape in front of
    /// the ray's origin.
    pub fn intersect(&self, ray: &Ray3D) -> Option<f64> {
        match self.kind {
            ShapeKind::Plane { position, normal }
                => intersect_plane(ray, position, normal),
            ShapeKind::Sphere { position, radius }
                => intersect_sphere(ray, position, radius),
            ShapeKind::Cylinder(ref cylinder) => cylinder.intersect(ray),
            ShapeKind::Cube(ref cube) => cube.intersect(ray),
            ShapeKind::Tetrahedron(ref faces) => intersect_triangles(ray, faces),
            ShapeKind::Triangle(ref triangle) => triangle.intersect(ray),
        }
    }

    /// The unit surface normal at `point`, a point on the shape.
    ///
    /// Planes, spheres and cylinders report their geometric outward normal.
    /// Triangle-based shapes have no inherent outside, so their normal is
    /// flipped to face `viewer`.
    pub fn normal_at(&self, point: Vector3D, viewer: Vector3D)
        -> Result<Vector3D, DegenerateGeometryError> {
        match self.kind {
            ShapeKind::Plane { normal, .. } => Ok(normal),
            ShapeKind::Sphere { position, .. } => (point - position).normalize(),
            ShapeKind::Cylinder(ref cylinder) => cylinder.normal_at(point),
            ShapeKind::Cube(ref cube) => face_at(&cube.faces, point)
                .map(|face| face.facing(viewer))
                .ok_or(DegenerateGeometryError::NoFace),
            ShapeKind::Tetrahedron(ref faces) => face_at(faces, point)
                .map(|face| face.facing(viewer))
                .ok_or(DegenerateGeometryError::NoFace),
            ShapeKind::Triangle(ref triangle) => Ok(triangle.facing(viewer)),
        }
    }

    /// The material color at `point`.
    pub fn color_at(&self, point: Vector3D) -> Color {
        self.material.color.color_at(point)
    }
}

impl Cylinder {
    /// Intersects the lateral surface and both caps, keeping the nearest.
    ///
    /// The lateral surface is an infinite cylinder cut off with a bounding
    /// sphere test, `|hit - center|² < radius² + (height/2)²`, rather than an
    /// exact test along the axis. The sphere touches the rims, so this is
    /// exact for the first hit of most rays but can accept a lateral hit a
    /// little beyond a cap when the ray is nearly parallel to the axis.
    pub fn intersect(&self, ray: &Ray3D) -> Option<f64> {
        let p = self.axis * ray.direction.dot(&self.axis) - ray.direction;
        let to_center = self.position - ray.origin;
        let q = to_center - self.axis * to_center.dot(&self.axis);

        let a = p.dot(&p);
        let b = 2.0 * p.dot(&q);
        let c = q.dot(&q) - self.radius * self.radius;

        let bound = self.radius * self.radius + (self.height / 2.0).powi(2);
        let within_bound = |t: f64| {
            let from_center = ray.position(t) - self.position;
            from_center.dot(&from_center) < bound
        };

        let mut dist = None;
        if a.abs() < f64::EPSILON {
            // Parallel to the axis; the quadratic degenerates to `bt + c = 0`.
            if b != 0.0 {
                let t = -c / b;
                if t > 0.0 {
                    dist = Some(t);
                }
            }
        } else {
            let disc = b * b - 4.0 * a * c;
            if disc > 0.0 {
                let disc_sqrt = disc.sqrt();
                let mut t0 = (-b - disc_sqrt) / (2.0 * a);
                let mut t1 = (-b + disc_sqrt) / (2.0 * a);
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }

                if t1 >= 0.0 {
                    let t = if t0 < 0.0 { t1 } else { t0 };
                    if within_bound(t) {
                        dist = Some(t);
                    }
                }
            }
        }

        for cap in self.caps.iter() {
            if let Some(t) = cap.intersect(ray) {
                if dist.map_or(true, |d| t < d) {
                    dist = Some(t);
                }
            }
        }

        dist
    }

    pub fn normal_at(&self, point: Vector3D) -> Result<Vector3D, DegenerateGeometryError> {
        if let Some(cap) = self.caps.iter().find(|cap| cap.contains(point)) {
            return Ok(cap.normal);
        }

        // Project onto the axis, then point away from it.
        let on_axis = self.position
            - self.axis * (self.position - point).dot(&self.axis);
        (point - on_axis).normalize()
    }
}

impl Cube {
    /// Radius of the sphere through the cube's corners.
    pub fn bounding_radius(&self) -> f64 {
        3.0f64.sqrt() * self.half_extent
    }

    /// Intersects the faces, after a cheap check against the bounding sphere.
    pub fn intersect(&self, ray: &Ray3D) -> Option<f64> {
        intersect_sphere(ray, self.position, self.bounding_radius())?;
        intersect_triangles(ray, &self.faces)
    }
}

#[cfg(test)]
fn ray(origin: (f64, f64, f64), direction: (f64, f64, f64)) -> Ray3D {
    Ray3D::new(
        Vector3D::new(origin.0, origin.1, origin.2),
        Vector3D::new(direction.0, direction.1, direction.2),
    ).unwrap()
}

#[cfg(test)]
fn feq_opt(a: Option<f64>, b: f64) -> bool {
    a.map_or(false, |a| crate::feq(a, b))
}

#[test]
fn plane_normal_is_normalized() {
    let s = Shape::plane(Vector3D::zero(), Vector3D::new(0.0, 3.0, 0.0)).unwrap();

    assert_eq!(s.normal_at(Vector3D::new(4.0, 0.0, 1.0), Vector3D::new(0.0, 1.0, -1.0)).unwrap(),
        Vector3D::new(0.0, 1.0, 0.0));
}

#[test]
fn plane_with_zero_normal_is_degenerate() {
    let res = Shape::plane(Vector3D::zero(), Vector3D::zero());

    assert_eq!(res.unwrap_err(), DegenerateGeometryError::ZeroVector);
}

#[test]
fn plane_is_checkered() {
    let s = Shape::plane(Vector3D::zero(), Vector3D::new(0.0, 1.0, 0.0)).unwrap();

    assert_eq!(s.color_at(Vector3D::new(0.1, 0.0, 0.1)), Color::white());
    assert_eq!(s.color_at(Vector3D::new(0.6, 0.0, 0.1)), Color::black());
    assert_eq!(s.material.reflection(), 0.25);
}

#[test]
fn sphere_needs_positive_radius() {
    let res = Shape::sphere(Vector3D::zero(), 0.0, Color::red());

    assert!(matches!(res, Err(DegenerateGeometryError::NonPositive { what: "radius", .. })));
}

#[test]
fn sphere_normal_points_outward() {
    let s = Shape::sphere(Vector3D::new(0.0, 0.0, 1.0), 0.5, Color::red()).unwrap();
    let viewer = Vector3D::new(0.0, 0.0, -5.0);

    assert_eq!(s.normal_at(Vector3D::new(0.0, 0.0, 0.5), viewer).unwrap(),
        Vector3D::new(0.0, 0.0, -1.0));
    assert_eq!(s.normal_at(Vector3D::new(0.5, 0.0, 1.0), viewer).unwrap(),
        Vector3D::new(1.0, 0.0, 0.0));
}

#[test]
fn upright_cylinder_hits_side() {
    let s = Shape::cylinder(Vector3D::zero(), 2.0, 1.0, Vector3D::zero(),
        Color::red()).unwrap();

    let r = ray((0.0, 0.0, -5.0), (0.0, 0.0, 1.0));
    assert!(feq_opt(s.intersect(&r), 4.0));

    let n = s.normal_at(Vector3D::new(0.0, 0.0, -1.0), r.origin).unwrap();
    assert_eq!(n, Vector3D::new(0.0, 0.0, -1.0));
}

#[test]
fn upright_cylinder_hits_top_cap() {
    let s = Shape::cylinder(Vector3D::zero(), 2.0, 1.0, Vector3D::zero(),
        Color::red()).unwrap();

    let r = ray((0.5, 5.0, 0.0), (0.0, -1.0, 0.0));
    assert_eq!(s.intersect(&r), Some(4.0));

    let n = s.normal_at(r.position(4.0), r.origin).unwrap();
    assert_eq!(n, Vector3D::new(0.0, 1.0, 0.0));
}

#[test]
fn cylinder_ray_along_axis_outside_radius_misses() {
    let s = Shape::cylinder(Vector3D::zero(), 2.0, 1.0, Vector3D::zero(),
        Color::red()).unwrap();

    let r = ray((2.0, 5.0, 0.0), (0.0, -1.0, 0.0));
    assert_eq!(s.intersect(&r), None);
}

#[test]
fn cylinder_ray_past_the_end_misses() {
    let s = Shape::cylinder(Vector3D::zero(), 2.0, 1.0, Vector3D::zero(),
        Color::red()).unwrap();

    let r = ray((0.0, 3.0, -5.0), (0.0, 0.0, 1.0));
    assert_eq!(s.intersect(&r), None);
}

#[test]
fn tipped_cylinder_lies_along_x() {
    // Y rotated 90 degrees about Z points along -X.
    let s = Shape::cylinder(Vector3D::zero(), 4.0, 0.5,
        Vector3D::new(0.0, 0.0, 90.0), Color::red()).unwrap();

    if let ShapeKind::Cylinder(ref c) = s.kind {
        assert_eq!(c.axis, Vector3D::new(-1.0, 0.0, 0.0));
    } else {
        panic!("expected a cylinder");
    }

    let side = ray((1.5, 0.0, -5.0), (0.0, 0.0, 1.0));
    assert!(feq_opt(s.intersect(&side), 4.5));

    let end = ray((10.0, 0.0, 0.0), (-1.0, 0.0, 0.0));
    assert!(feq_opt(s.intersect(&end), 8.0));
}

#[test]
fn cube_is_made_of_twelve_triangles() {
    let s = Shape::cube(Vector3D::zero(), 2.0, Vector3D::new(30.0, 0.0, 30.0),
        Color::red()).unwrap();

    match s.kind {
        ShapeKind::Cube(ref cube) => {
            assert_eq!(cube.faces.len(), 12);
            for face in cube.faces.iter() {
                assert!(feq_opt(Some(face.residual(Vector3D::zero())), 1.0));
            }
        },
        _ => panic!("expected a cube"),
    }
}

#[test]
fn axis_aligned_cube_hit_and_normal() {
    let s = Shape::cube(Vector3D::new(0.0, 0.0, 2.0), 1.0, Vector3D::zero(),
        Color::red()).unwrap();
    let viewer = Vector3D::zero();

    let r = ray((0.1, 0.2, 0.0), (0.0, 0.0, 1.0));
    let t = s.intersect(&r).unwrap();
    assert!(crate::feq(t, 1.5));

    let n = s.normal_at(r.position(t), viewer).unwrap();
    assert_eq!(n, Vector3D::new(0.0, 0.0, -1.0));
}

#[test]
fn cube_normal_faces_viewer_on_side_faces() {
    let s = Shape::cube(Vector3D::zero(), 2.0, Vector3D::zero(), Color::red()).unwrap();
    let viewer = Vector3D::new(10.0, 0.3, 0.2);

    let r = Ray3D::towards(viewer, Vector3D::new(0.0, 0.3, 0.2)).unwrap();
    let t = s.intersect(&r).unwrap();
    assert!(crate::feq(t, 9.0));
    assert_eq!(s.normal_at(r.position(t), viewer).unwrap(), Vector3D::new(1.0, 0.0, 0.0));
}

#[test]
fn cube_broad_phase_rejects_distant_rays() {
    let s = Shape::cube(Vector3D::zero(), 2.0, Vector3D::new(45.0, 45.0, 0.0),
        Color::red()).unwrap();

    // Passes at distance 2 from the center; the corners are only sqrt(3) out.
    let r = ray((2.0, 0.0, -5.0), (0.0, 0.0, 1.0));
    assert_eq!(s.intersect(&r), None);
}

#[test]
fn rotated_cube_still_blocks_its_center() {
    let s = Shape::cube(Vector3D::zero(), 1.0, Vector3D::new(30.0, 20.0, 10.0),
        Color::red()).unwrap();

    let r = ray((0.0, 0.0, -5.0), (0.0, 0.0, 1.0));
    // The near face is somewhere between the inscribed and the bounding
    // sphere.
    let t = s.intersect(&r).unwrap();
    assert!(t >= 5.0 - 0.5 * 3.0f64.sqrt() && t <= 4.5 + 1e-9, "t={}", t);
}

#[test]
fn tetrahedron_hit_and_normal() {
    let s = Shape::tetrahedron([
        Vector3D::new(-1.0, -1.0, 0.0),
        Vector3D::new(1.0, -1.0, 0.0),
        Vector3D::new(0.0, 1.0, 0.0),
        Vector3D::new(0.0, 0.0, 2.0),
    ], Color::red()).unwrap();
    let viewer = Vector3D::new(0.0, 0.0, -3.0);

    let r = Ray3D::towards(viewer, Vector3D::zero()).unwrap();
    let t = s.intersect(&r).unwrap();
    assert!(crate::feq(t, 3.0));
    assert_eq!(s.normal_at(r.position(t), viewer).unwrap(), Vector3D::new(0.0, 0.0, -1.0));
}

#[test]
fn flat_tetrahedron_is_degenerate() {
    let res = Shape::tetrahedron([
        Vector3D::new(0.0, 0.0, 0.0),
        Vector3D::new(1.0, 0.0, 0.0),
        Vector3D::new(2.0, 0.0, 0.0),
        Vector3D::new(0.0, 0.0, 1.0),
    ], Color::red());

    assert_eq!(res.unwrap_err(), DegenerateGeometryError::CollinearTriangle);
}

#[test]
fn lone_triangle_faces_viewer() {
    let s = Shape::triangle(
        Vector3D::new(0.0, 1.0, 2.0),
        Vector3D::new(-1.0, 0.0, 2.0),
        Vector3D::new(1.0, 0.0, 2.0),
        Color::white(),
    ).unwrap();
    let viewer = Vector3D::new(0.0, 0.5, 10.0);

    let r = Ray3D::towards(viewer, Vector3D::new(0.0, 0.5, 2.0)).unwrap();
    assert!(feq_opt(s.intersect(&r), 8.0));
    assert_eq!(s.normal_at(Vector3D::new(0.0, 0.5, 2.0), viewer).unwrap(),
        Vector3D::new(0.0, 0.0, 1.0));
}

#[test]
fn material_can_be_replaced() {
    let s = Shape::sphere(Vector3D::zero(), 1.0, Color::red()).unwrap()
        .with_material(Material { diffuse: Some(0.2), ..Default::default() });

    assert_eq!(s.material.diffuse, Some(0.2));
    assert_eq!(s.material.reflection(), 1.0);
    assert_eq!(s.color_at(Vector3D::zero()), Color::white());
}
