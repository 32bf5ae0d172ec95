// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

// Below this |dot(D, N)| a ray is treated as parallel to a plane.
pub const PARALLEL_EPSILON: f64 = 1e-6;

// Residual tolerance for "is this point on that plane" checks.
pub const ON_PLANE_EPSILON: f64 = 1e-15;

// Offset along the normal for secondary (shadow and reflected) ray origins.
pub const SURFACE_OFFSET: f64 = 1e-4;

// Magnitudes below this cannot be normalized.
pub const NORMALIZE_EPSILON: f64 = 1e-12;

// Default render parameters
pub const CANVAS_WIDTH: usize = 400;
pub const CANVAS_HEIGHT: usize = 300;
pub const SCREEN_CENTER_Y: f64 = 0.25;
pub const OUT_FILE: &str = "out.png";

// Default shading parameters
pub const AMBIENT: f64 = 0.05;
pub const DIFFUSE_C: f64 = 1.0;
pub const SPECULAR_C: f64 = 1.0;
pub const SPECULAR_K: f64 = 50.0;

// Maximum number of reflection bounces per pixel
pub const REFLECTION_DEPTH: usize = 5;

// Tiles per image axis
pub const TILE_DIVISIONS: usize = 8;
