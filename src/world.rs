use crate::color::Color;
use crate::config::RenderConfig;
use crate::consts::SURFACE_OFFSET;
use crate::error::DegenerateGeometryError;
use crate::light::lighting;
use crate::ray::Ray3D;
use crate::shape::Shape;
use crate::vector::Vector3D;

/// A lit surface point found by `World::trace_ray`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hit {
    /// Index of the shape that was hit in `World::objects`.
    pub index: usize,
    pub point: Vector3D,
    pub normal: Vector3D,

    /// The shaded color of the point, before any reflection is added.
    pub color: Color,
}

/// A world with objects and light.
///
/// Worlds collect all objects as well as the render configuration (light,
/// camera position and shading constants). A world is built once and only
/// read while rendering, so it can be shared between worker threads.
#[derive(Clone, Debug, Default)]
pub struct World {
    pub objects: Vec<Shape>,
    pub config: RenderConfig,
}

impl World {
    pub fn new(objects: Vec<Shape>, config: RenderConfig) -> World {
        World { objects, config }
    }

    /// Creates an empty world with the given configuration.
    pub fn empty(config: RenderConfig) -> World {
        World { objects: Vec::new(), config }
    }

    /// Finds the nearest object along a ray.
    ///
    /// Returns the object's index and the hit distance. When two objects are
    /// hit at exactly the same distance, the one added first wins.
    pub fn find_first_hit(&self, r: &Ray3D) -> Option<(usize, f64)> {
        let mut nearest: Option<(usize, f64)> = None;
        for (i, obj) in self.objects.iter().enumerate() {
            if let Some(t) = obj.intersect(r) {
                match nearest {
                    Some((_, n)) if n <= t => {},
                    _ => nearest = Some((i, t)),
                }
            }
        }

        nearest
    }

    /// Determines whether a surface point on object `index` is shadowed.
    ///
    /// A ray is cast from just above the surface towards the light. Any hit on
    /// another object counts, wherever it lies along that ray.
    pub fn is_shadowed(&self, index: usize, point: Vector3D, normal: Vector3D)
        -> Result<bool, DegenerateGeometryError> {
        let origin = point + normal * SURFACE_OFFSET;
        let r = Ray3D::towards(origin, self.config.light.position)?;

        Ok(self.objects.iter()
            .enumerate()
            .filter(|&(i, _)| i != index)
            .any(|(_, obj)| obj.intersect(&r).is_some()))
    }

    /// Traces a single ray and shades the point it hits.
    ///
    /// Returns `None` if nothing is hit, or if the hit point is in shadow: a
    /// shadowed point receives no light at all, not even ambient.
    pub fn trace_ray(&self, r: &Ray3D) -> Result<Option<Hit>, DegenerateGeometryError> {
        let (index, t) = match self.find_first_hit(r) {
            Some(hit) => hit,
            None => return Ok(None),
        };

        let obj = &self.objects[index];
        let point = r.position(t);
        let normal = obj.normal_at(point, self.config.camera)?;

        if self.is_shadowed(index, point, normal)? {
            return Ok(None);
        }

        let surface = obj.color_at(point);
        let color = lighting(&obj.material, surface, point, normal, &self.config)?;

        Ok(Some(Hit { index, point, normal, color }))
    }

    /// Determines the color seen along a ray, following mirror reflections.
    ///
    /// At most `depth_max` rays are traced, the primary ray included. Each
    /// bounce is weighted by the product of the reflection coefficients of
    /// the surfaces before it; the walk stops at the first ray that comes up
    /// empty. The result is clamped to `[0, 1]`.
    pub fn color_at(&self, r: Ray3D) -> Result<Color, DegenerateGeometryError> {
        let mut color = Color::black();
        let mut attenuation = 1.0;
        let mut r = r;

        for _ in 0..self.config.depth_max {
            let hit = match self.trace_ray(&r)? {
                Some(hit) => hit,
                None => break,
            };

            color += attenuation * hit.color;

            r = Ray3D::new(
                hit.point + hit.normal * SURFACE_OFFSET,
                r.direction.reflect(&hit.normal),
            )?;
            attenuation *= self.objects[hit.index].material.reflection();
        }

        Ok(color.clamp())
    }
}

#[cfg(test)]
fn floor() -> Shape {
    Shape::plane(Vector3D::zero(), Vector3D::new(0.0, 1.0, 0.0)).unwrap()
}

#[cfg(test)]
fn shadow_config() -> RenderConfig {
    use crate::light::PointLight;

    RenderConfig {
        light: PointLight::new(Vector3D::new(0.0, 10.0, 0.0), Color::white()),
        ..Default::default()
    }
}

#[test]
fn empty_world_is_black() {
    let w = World::empty(Default::default());
    let r = Ray3D::new(Vector3D::zero(), Vector3D::new(0.0, 0.0, 1.0)).unwrap();

    assert_eq!(w.find_first_hit(&r), None);
    assert_eq!(w.trace_ray(&r).unwrap(), None);
    assert_eq!(w.color_at(r).unwrap(), Color::black());
}

#[test]
fn nearest_object_is_found() {
    let w = World::new(vec![
        Shape::sphere(Vector3D::new(0.0, 0.0, 10.0), 1.0, Color::red()).unwrap(),
        Shape::sphere(Vector3D::new(0.0, 0.0, 5.0), 1.0, Color::red()).unwrap(),
    ], Default::default());
    let r = Ray3D::new(Vector3D::zero(), Vector3D::new(0.0, 0.0, 1.0)).unwrap();

    assert_eq!(w.find_first_hit(&r), Some((1, 4.0)));
}

#[test]
fn ties_go_to_the_first_object() {
    let sphere = Shape::sphere(Vector3D::new(0.0, 0.0, 5.0), 1.0, Color::red()).unwrap();
    let w = World::new(vec![sphere.clone(), sphere], Default::default());
    let r = Ray3D::new(Vector3D::zero(), Vector3D::new(0.0, 0.0, 1.0)).unwrap();

    assert_eq!(w.find_first_hit(&r), Some((0, 4.0)));
}

#[test]
fn occluded_point_is_pure_background() {
    let occluder = Shape::sphere(Vector3D::new(0.0, 5.0, 0.0), 1.0, Color::red()).unwrap();
    let w = World::new(vec![floor(), occluder], shadow_config());
    let r = Ray3D::towards(Vector3D::new(0.0, 1.0, -1.0), Vector3D::zero()).unwrap();

    assert!(w.is_shadowed(0, Vector3D::zero(), Vector3D::new(0.0, 1.0, 0.0)).unwrap());
    assert_eq!(w.trace_ray(&r).unwrap(), None);
    assert_eq!(w.color_at(r).unwrap(), Color::black());
}

#[test]
fn unoccluded_point_is_lit() {
    let w = World::new(vec![floor()], shadow_config());
    let r = Ray3D::towards(Vector3D::new(0.0, 1.0, -1.0), Vector3D::zero()).unwrap();

    assert!(!w.is_shadowed(0, Vector3D::zero(), Vector3D::new(0.0, 1.0, 0.0)).unwrap());

    let c = w.color_at(r).unwrap();
    assert!(c.r > 0.05 && c.g > 0.05 && c.b > 0.05, "{:?}", c);
}

#[test]
fn shape_does_not_shadow_itself() {
    let sphere = Shape::sphere(Vector3D::zero(), 1.0, Color::red()).unwrap();
    let w = World::new(vec![sphere], shadow_config());

    // The far side of the sphere faces away from the light, but is not in
    // shadow by the sphere itself.
    let bottom = Vector3D::new(0.0, -1.0, 0.0);
    assert!(!w.is_shadowed(0, bottom, bottom).unwrap());
}

#[test]
fn hit_reports_point_and_normal() {
    let w = World::new(vec![floor()], shadow_config());
    let r = Ray3D::towards(Vector3D::new(0.0, 1.0, -1.0), Vector3D::zero()).unwrap();

    let hit = w.trace_ray(&r).unwrap().unwrap();
    assert_eq!(hit.index, 0);
    assert_eq!(hit.point, Vector3D::zero());
    assert_eq!(hit.normal, Vector3D::new(0.0, 1.0, 0.0));

    // Angle of incidence equals angle of reflection.
    let reflected = r.direction.reflect(&hit.normal);
    assert_eq!(reflected, Vector3D::new(0.0, 1.0, 1.0).normalize().unwrap());
    assert!(crate::feq(-r.direction.dot(&hit.normal), reflected.dot(&hit.normal)));
}

#[test]
fn reflected_sphere_brightens_the_floor() {
    use crate::light::PointLight;

    let config = RenderConfig {
        camera: Vector3D::new(0.0, 1.0, -1.0),
        light: PointLight::new(Vector3D::new(0.0, 10.0, -10.0), Color::white()),
        depth_max: 1,
        ..Default::default()
    };
    let mirror_ball = Shape::sphere(Vector3D::new(0.0, 2.0, 2.0), 0.5, Color::red()).unwrap();
    let w1 = World::new(vec![floor(), mirror_ball], config.clone());
    let w2 = World { config: RenderConfig { depth_max: 2, ..config }, ..w1.clone() };
    let r = Ray3D::towards(Vector3D::new(0.0, 1.0, -1.0), Vector3D::zero()).unwrap();

    let direct = w1.color_at(r).unwrap();
    let bounced = w2.color_at(r).unwrap();

    assert!(bounced.r > direct.r, "{:?} vs {:?}", bounced, direct);
    assert!(bounced.g >= direct.g);
}

#[test]
fn bounce_into_empty_sky_adds_nothing() {
    let w1 = World::new(vec![floor()], RenderConfig { depth_max: 1, ..shadow_config() });
    let w5 = World::new(vec![floor()], RenderConfig { depth_max: 5, ..shadow_config() });
    let r = Ray3D::towards(Vector3D::new(0.0, 1.0, -1.0), Vector3D::zero()).unwrap();

    assert_eq!(w1.color_at(r).unwrap(), w5.color_at(r).unwrap());
}

#[test]
fn plane_and_red_sphere_scene() {
    let config = RenderConfig { depth_max: 1, ..Default::default() };
    let w = World::new(vec![
        Shape::plane(Vector3D::new(0.0, -0.5, 0.0), Vector3D::new(0.0, 1.0, 0.0)).unwrap(),
        Shape::sphere(Vector3D::new(0.0, 0.0, 1.0), 0.5, Color::red()).unwrap(),
    ], config.clone());

    let at_sphere = Ray3D::towards(config.camera, Vector3D::new(0.0, 0.0, 1.0)).unwrap();
    let c = w.color_at(at_sphere).unwrap();
    assert!(c.r > 0.9, "{:?}", c);
    assert!(c.g < 0.5 && c.b < 0.5, "{:?}", c);
    assert!(crate::feq(c.g, c.b));

    let at_sky = Ray3D::towards(config.camera, Vector3D::new(0.0, 5.0, 1.0)).unwrap();
    let c = w.color_at(at_sky).unwrap();
    assert_eq!((c.r, c.g, c.b), (0.0, 0.0, 0.0));
}
