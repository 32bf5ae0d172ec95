use crate::config::RenderConfig;
use crate::error::DegenerateGeometryError;
use crate::ray::Ray3D;
use crate::vector::Vector3D;

/// A camera record for generating a canvas.
///
/// The camera sits at a fixed point and looks through a screen window in the
/// `z = 0` plane. The window spans `x` in `[-1, 1]`; its height follows the
/// image aspect ratio and is centered on `screen_center_y`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Camera {
    /// The horizontal size of the resultant canvas.
    pub hsize: usize,

    /// The vertical size of the resultant canvas.
    pub vsize: usize,

    pub origin: Vector3D,

    /// Screen window as `(left, bottom, right, top)`.
    pub window: (f64, f64, f64, f64),
}

/// The `i`th of `n` evenly spaced samples from `start` to `end`, both ends
/// included.
fn linspace(start: f64, end: f64, n: usize, i: usize) -> f64 {
    if n < 2 {
        return start;
    }

    start + (end - start) * (i as f64) / ((n - 1) as f64)
}

impl Camera {
    pub fn new(config: &RenderConfig) -> Camera {
        let aspect = (config.width as f64) / (config.height as f64);
        let window = (
            -1.0,
            -1.0 / aspect + config.screen_center_y,
            1.0,
            1.0 / aspect + config.screen_center_y,
        );

        Camera {
            hsize: config.width,
            vsize: config.height,
            origin: config.camera,
            window,
        }
    }

    /// The point on the screen window that pixel `(px, py)` looks at.
    ///
    /// Row 0 is the top of the image. The first and last columns (and rows)
    /// land exactly on the window's edges.
    pub fn screen_point(&self, px: usize, py: usize) -> Vector3D {
        let (left, bottom, right, top) = self.window;
        let x = linspace(left, right, self.hsize, px);
        let y = linspace(bottom, top, self.vsize, self.vsize - 1 - py);

        Vector3D::new(x, y, 0.0)
    }

    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Result<Ray3D, DegenerateGeometryError> {
        Ray3D::towards(self.origin, self.screen_point(px, py))
    }
}

#[test]
fn window_follows_aspect_ratio() {
    let c = Camera::new(&RenderConfig::default());

    let (left, bottom, right, top) = c.window;
    assert_eq!((left, right), (-1.0, 1.0));
    assert!(crate::feq(bottom, -0.5));
    assert!(crate::feq(top, 1.0));
}

#[test]
fn corners_land_on_window_edges() {
    let c = Camera::new(&RenderConfig::default());

    assert_eq!(c.screen_point(0, 0), Vector3D::new(-1.0, 1.0, 0.0));
    assert_eq!(c.screen_point(399, 0), Vector3D::new(1.0, 1.0, 0.0));
    assert_eq!(c.screen_point(0, 299), Vector3D::new(-1.0, -0.5, 0.0));
    assert_eq!(c.screen_point(399, 299), Vector3D::new(1.0, -0.5, 0.0));
}

#[test]
fn ray_through_top_left_corner() {
    let config = RenderConfig {
        width: 3,
        height: 3,
        camera: Vector3D::new(0.0, 0.0, -1.0),
        screen_center_y: 0.0,
        ..Default::default()
    };
    let c = Camera::new(&config);

    let r = c.ray_for_pixel(0, 0).unwrap();
    assert_eq!(r.origin, Vector3D::new(0.0, 0.0, -1.0));
    assert_eq!(r.direction, Vector3D::new(-1.0, 1.0, 1.0).normalize().unwrap());

    let r = c.ray_for_pixel(1, 1).unwrap();
    assert_eq!(r.direction, Vector3D::new(0.0, 0.0, 1.0));
}

#[test]
fn single_pixel_image_looks_at_window_corner() {
    let config = RenderConfig { width: 1, height: 1, ..Default::default() };
    let c = Camera::new(&config);

    assert_eq!(c.screen_point(0, 0), Vector3D::new(-1.0, -0.75, 0.0));
}
