use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{ Serialize, Deserialize };

use crate::consts::*;
use crate::error::ConfigError;
use crate::light::PointLight;
use crate::vector::Vector3D;

/// Every tunable of a render, in one immutable value.
///
/// The configuration is handed explicitly to the world, the camera and the
/// tile scheduler. When read from JSON, any field that is left out keeps its
/// default, so a file only needs to name what it changes:
///
/// ```
/// # use tiled_ray_tracer::config::RenderConfig;
/// let config: RenderConfig = serde_json::from_str(r#"{ "depth_max": 1 }"#).unwrap();
/// assert_eq!(config.depth_max, 1);
/// assert_eq!(config.width, 400);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Image width in pixels (400).
    pub width: usize,

    /// Image height in pixels (300).
    pub height: usize,

    /// Camera position, `(0, 0.35, -1)`. The camera looks through a screen
    /// window lying in the `z = 0` plane.
    pub camera: Vector3D,

    /// Vertical center of the screen window (0.25).
    pub screen_center_y: f64,

    /// The single point light, at `(5, 5, -10)` and white by default.
    pub light: PointLight,

    /// Flat ambient term added to every lit point (0.05).
    pub ambient: f64,

    /// Lambert coefficient for materials that don't set one (1.0).
    pub diffuse_c: f64,

    /// Blinn-Phong coefficient for materials that don't set one (1.0).
    pub specular_c: f64,

    /// Blinn-Phong exponent (50).
    pub specular_k: f64,

    /// Maximum number of traced rays per pixel, the primary ray included (5).
    pub depth_max: usize,

    /// Number of tiles along each image axis (8).
    pub divisions: usize,

    /// Optional limit on how long the scheduler waits for each tile.
    pub worker_timeout_secs: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        RenderConfig {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            camera: Vector3D::new(0.0, 0.35, -1.0),
            screen_center_y: SCREEN_CENTER_Y,
            light: PointLight::default(),
            ambient: AMBIENT,
            diffuse_c: DIFFUSE_C,
            specular_c: SPECULAR_C,
            specular_k: SPECULAR_K,
            depth_max: REFLECTION_DEPTH,
            divisions: TILE_DIVISIONS,
            worker_timeout_secs: None,
        }
    }
}

impl RenderConfig {
    /// Reads a configuration from a JSON file and validates it.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<RenderConfig, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.into(),
            source,
        })?;

        let config: RenderConfig = serde_json::from_str(&text)
            .map_err(|source| ConfigError::Json { path: path.into(), source })?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that cannot produce an image.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "image must be at least 1x1, got {}x{}", self.width, self.height
            )));
        }

        if self.divisions == 0 {
            return Err(ConfigError::Invalid("divisions must be at least 1".into()));
        }

        Ok(())
    }

    pub fn worker_timeout(&self) -> Option<Duration> {
        self.worker_timeout_secs.map(Duration::from_secs)
    }
}

#[test]
fn defaults_match_reference_setup() {
    let c = RenderConfig::default();

    assert_eq!((c.width, c.height), (400, 300));
    assert_eq!(c.camera, Vector3D::new(0.0, 0.35, -1.0));
    assert_eq!(c.light.position, Vector3D::new(5.0, 5.0, -10.0));
    assert_eq!(c.ambient, 0.05);
    assert_eq!(c.diffuse_c, 1.0);
    assert_eq!(c.specular_c, 1.0);
    assert_eq!(c.specular_k, 50.0);
    assert_eq!(c.depth_max, 5);
    assert_eq!(c.divisions, 8);
    assert!(c.validate().is_ok());
}

#[test]
fn partial_json_overrides_named_fields() {
    let c: RenderConfig = serde_json::from_str(r#"{
        "width": 64,
        "camera": [0.0, 1.0, -3.0],
        "light": { "position": [0.0, 10.0, 0.0], "color": [1.0, 0.5, 0.5] }
    }"#).unwrap();

    assert_eq!(c.width, 64);
    assert_eq!(c.height, 300);
    assert_eq!(c.camera, Vector3D::new(0.0, 1.0, -3.0));
    assert_eq!(c.light.position, Vector3D::new(0.0, 10.0, 0.0));
}

#[test]
fn unknown_fields_are_rejected() {
    let res: Result<RenderConfig, _> = serde_json::from_str(r#"{ "widht": 64 }"#);

    assert!(res.is_err());
}

#[test]
fn zero_divisions_is_invalid() {
    let c = RenderConfig { divisions: 0, ..Default::default() };

    assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn empty_image_is_invalid() {
    let c = RenderConfig { height: 0, ..Default::default() };

    assert!(c.validate().is_err());
}

#[test]
fn missing_config_file_reports_io_error() {
    let res = RenderConfig::from_json_file("/nonexistent/render.json");

    assert!(matches!(res, Err(ConfigError::Io { .. })));
}
