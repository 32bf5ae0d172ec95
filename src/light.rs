use serde::{ Serialize, Deserialize };

use crate::color::Color;
use crate::config::RenderConfig;
use crate::error::DegenerateGeometryError;
use crate::pattern::SurfaceColor;
use crate::vector::Vector3D;

/// A point light.
///
/// A very simple light source. Provides a color and a position where light is
/// produced from. Shadows cast by it are hard-edged.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vector3D,
    pub color: Color,
}

impl PointLight {
    pub fn new(position: Vector3D, color: Color) -> PointLight {
        PointLight { position, color }
    }
}

impl Default for PointLight {
    fn default() -> PointLight {
        PointLight {
            position: Vector3D::new(5.0, 5.0, -10.0),
            color: Color::white(),
        }
    }
}

/// A material record.
///
/// Coefficients left as `None` fall back to the render-wide defaults in
/// `RenderConfig` (diffuse and specular) or to 1.0 (reflection).
#[derive(Clone, Debug)]
pub struct Material {
    pub color: SurfaceColor,

    pub diffuse: Option<f64>,
    pub specular: Option<f64>,

    /// Fraction of the light arriving from the mirror direction that is
    /// passed on to the previous bounce, in `[0, 1]`.
    pub reflection: Option<f64>,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            color: SurfaceColor::Constant(Color::white()),
            diffuse: None,
            specular: None,
            reflection: None,
        }
    }
}

impl Material {
    pub fn reflection(&self) -> f64 {
        self.reflection.unwrap_or(1.0)
    }
}

/// Shades a lit surface point with Lambert diffuse and Blinn-Phong specular
/// terms plus a flat ambient term.
///
/// `surface` is the material color already evaluated at `point`. The viewer
/// is always the camera, also for points reached by reflected rays. Shadows
/// are handled by the caller: this function assumes the light is visible.
pub fn lighting(material: &Material, surface: Color, point: Vector3D,
    normal: Vector3D, config: &RenderConfig)
    -> Result<Color, DegenerateGeometryError> {
    let light = &config.light;
    let to_light = (light.position - point).normalize()?;
    let to_viewer = (config.camera - point).normalize()?;

    let diffuse_c = material.diffuse.unwrap_or(config.diffuse_c);
    let specular_c = material.specular.unwrap_or(config.specular_c);

    let mut color = Color::gray(config.ambient);

    // Lambert
    color += diffuse_c * normal.dot(&to_light).max(0.0) * surface;

    // Blinn-Phong. With the light exactly opposite the viewer there is no
    // halfway vector, and no highlight.
    if let Ok(halfway) = (to_light + to_viewer).normalize() {
        let factor = normal.dot(&halfway).max(0.0).powf(config.specular_k);
        color += specular_c * factor * light.color;
    }

    Ok(color)
}

#[cfg(test)]
fn head_on_config() -> RenderConfig {
    RenderConfig {
        camera: Vector3D::new(0.0, 0.0, -10.0),
        light: PointLight::new(Vector3D::new(0.0, 0.0, -10.0), Color::white()),
        ..Default::default()
    }
}

#[test]
fn eye_and_light_straight_ahead() {
    let config = head_on_config();
    let m = Material::default();

    let res = lighting(&m, Color::rgb(1.0, 0.5, 0.0), Vector3D::zero(),
        Vector3D::new(0.0, 0.0, -1.0), &config).unwrap();

    // ambient + full diffuse + full specular
    assert_eq!(res, Color::rgb(2.05, 1.55, 1.05));
}

#[test]
fn light_behind_surface_leaves_only_ambient() {
    let mut config = head_on_config();
    config.light.position = Vector3D::new(0.0, 0.0, 10.0);
    config.camera = Vector3D::new(0.0, 5.0, 10.0);
    let m = Material::default();

    let res = lighting(&m, Color::white(), Vector3D::zero(),
        Vector3D::new(0.0, 0.0, -1.0), &config).unwrap();

    assert_eq!(res, Color::gray(0.05));
}

#[test]
fn material_coefficients_override_defaults() {
    let config = head_on_config();
    let m = Material {
        diffuse: Some(0.5),
        specular: Some(0.0),
        ..Default::default()
    };

    let res = lighting(&m, Color::white(), Vector3D::zero(),
        Vector3D::new(0.0, 0.0, -1.0), &config).unwrap();

    assert_eq!(res, Color::gray(0.55));
}

#[test]
fn diffuse_falls_off_with_angle() {
    let mut config = head_on_config();
    config.light.position = Vector3D::new(0.0, 10.0, -10.0);
    let m = Material { specular: Some(0.0), ..Default::default() };

    let res = lighting(&m, Color::white(), Vector3D::zero(),
        Vector3D::new(0.0, 0.0, -1.0), &config).unwrap();

    let expected = 0.05 + 2.0f64.sqrt() / 2.0;
    assert_eq!(res, Color::gray(expected));
}

#[test]
fn light_opposite_viewer_has_no_highlight() {
    let mut config = head_on_config();
    config.light.position = Vector3D::new(0.0, 0.0, 10.0);
    let m = Material::default();

    let res = lighting(&m, Color::white(), Vector3D::zero(),
        Vector3D::new(0.0, 0.0, 1.0), &config).unwrap();

    assert_eq!(res, Color::gray(1.05));
}

#[test]
fn reflection_defaults_to_one() {
    assert_eq!(Material::default().reflection(), 1.0);
    assert_eq!(Material { reflection: Some(0.25), ..Default::default() }.reflection(), 0.25);
}
