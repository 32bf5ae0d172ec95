use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::mpsc::{ self, RecvTimeoutError };
use std::thread;
use std::time::Instant;

use tracing::{ debug, info };

use crate::camera::Camera;
use crate::canvas::Canvas;
use crate::error::{ DegenerateGeometryError, RenderError };
use crate::world::World;

/// A rectangle of pixels rendered by one worker.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    pub index: usize,
    pub x0: usize,
    pub y0: usize,
    pub width: usize,
    pub height: usize,
}

/// Splits `0..n` into at most `divisions` contiguous `(start, len)` slices.
///
/// Every slice but the last is `n / divisions` long; the last one absorbs
/// the remainder. With fewer than `divisions` items each slice is one item.
fn slices(n: usize, divisions: usize) -> Vec<(usize, usize)> {
    let divisions = divisions.max(1).min(n);
    if divisions == 0 {
        return Vec::new();
    }

    let step = n / divisions;
    (0..divisions)
        .map(|i| {
            let start = i * step;
            let end = if i + 1 == divisions { n } else { start + step };
            (start, end - start)
        })
        .collect()
}

/// Partitions a `width` by `height` image into disjoint tiles covering every
/// pixel exactly once, `divisions` slices along each axis.
pub fn partition(width: usize, height: usize, divisions: usize) -> Vec<Tile> {
    let mut tiles = Vec::new();
    for &(y0, tile_height) in slices(height, divisions).iter() {
        for &(x0, tile_width) in slices(width, divisions).iter() {
            tiles.push(Tile {
                index: tiles.len(),
                x0,
                y0,
                width: tile_width,
                height: tile_height,
            });
        }
    }

    tiles
}

/// Renders the pixels of one tile into a tile-sized canvas.
pub fn render_tile(world: &World, camera: &Camera, tile: &Tile)
    -> Result<Canvas, DegenerateGeometryError> {
    let mut canvas = Canvas::new(tile.width, tile.height);

    for y in 0..tile.height {
        for x in 0..tile.width {
            let ray = camera.ray_for_pixel(tile.x0 + x, tile.y0 + y)?;
            let color = world.color_at(ray)?;
            canvas.write_pixel(x, y, &color);
        }
    }

    Ok(canvas)
}

/// Renders a world in parallel, one thread per tile.
///
/// All workers are started before any result is awaited. They share the
/// world and camera read-only, and each sends back its own tile, which is
/// summed into a black canvas in whatever order tiles arrive.
///
/// The render fails as a whole if any tile fails: on a geometry error, if a
/// worker panics, or if the configured timeout passes while waiting for the
/// next tile.
pub fn parallel_render(world: World, camera: Camera) -> Result<Canvas, RenderError> {
    let timeout = world.config.worker_timeout();
    let tiles = partition(camera.hsize, camera.vsize, world.config.divisions);
    let total = tiles.len();

    info!(width = camera.hsize, height = camera.vsize, tiles = total,
        objects = world.objects.len(), "rendering");
    let start = Instant::now();

    let world = Arc::new(world);
    let camera = Arc::new(camera);
    let (sender, receiver) = mpsc::channel();

    for tile in tiles.iter().copied() {
        let world = Arc::clone(&world);
        let camera = Arc::clone(&camera);
        let sender = sender.clone();

        thread::spawn(move || {
            let result = render_tile(&world, &camera, &tile);

            // The receiver is only gone once the render has already failed.
            let _ = sender.send((tile, result));
        });
    }

    // Only the workers hold senders now, so the channel disconnects once
    // they have all finished or died.
    drop(sender);

    let mut canvas = Canvas::new(camera.hsize, camera.vsize);
    let mut pending: BTreeSet<usize> = tiles.iter().map(|t| t.index).collect();
    let mut last_percent = 0;

    loop {
        let next = match pending.iter().next() {
            Some(&index) => index,
            None => break,
        };

        let received = match timeout {
            Some(t) => receiver.recv_timeout(t),
            None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        let (tile, result) = match received {
            Ok(message) => message,
            Err(RecvTimeoutError::Timeout) =>
                return Err(RenderError::WorkerTimedOut { tile: next }),
            // A worker that died without sending its tile panicked.
            Err(RecvTimeoutError::Disconnected) =>
                return Err(RenderError::WorkerPanicked { tile: next }),
        };

        let part = result.map_err(|source| RenderError::Geometry { tile: tile.index, source })?;
        canvas.accumulate(tile.x0, tile.y0, &part);
        pending.remove(&tile.index);

        let done = total - pending.len();
        debug!(tile = tile.index, x0 = tile.x0, y0 = tile.y0, "tile finished");

        let percent = done * 100 / total;
        if percent / 10 > last_percent / 10 {
            info!("{}% done", percent);
        }
        last_percent = percent;
    }

    info!(elapsed = ?start.elapsed(), "render finished");
    Ok(canvas)
}

#[cfg(test)]
fn test_world(config: crate::config::RenderConfig) -> World {
    use crate::color::Color;
    use crate::shape::Shape;
    use crate::vector::Vector3D;

    World::new(vec![
        Shape::plane(Vector3D::new(0.0, -0.5, 0.0), Vector3D::new(0.0, 1.0, 0.0)).unwrap(),
        Shape::sphere(Vector3D::new(0.0, 0.0, 1.0), 0.5, Color::red()).unwrap(),
        Shape::cube(Vector3D::new(0.8, -0.25, 1.5), 0.5, Vector3D::new(0.0, 30.0, 0.0),
            Color::rgb(0.0, 0.0, 1.0)).unwrap(),
    ], config)
}

#[test]
fn slices_absorb_remainder_in_last() {
    assert_eq!(slices(10, 3), vec![(0, 3), (3, 3), (6, 4)]);
    assert_eq!(slices(8, 8), vec![(0, 1), (1, 1), (2, 1), (3, 1),
        (4, 1), (5, 1), (6, 1), (7, 1)]);
    assert_eq!(slices(3, 8), vec![(0, 1), (1, 1), (2, 1)]);
    assert_eq!(slices(5, 1), vec![(0, 5)]);
}

#[test]
fn partition_covers_every_pixel_once() {
    for &(w, h, d) in &[(400, 300, 8), (17, 5, 4), (3, 2, 8), (1, 1, 8), (10, 10, 1)] {
        let tiles = partition(w, h, d);
        let mut hits = vec![0; w * h];
        for t in tiles.iter() {
            for y in t.y0..t.y0 + t.height {
                for x in t.x0..t.x0 + t.width {
                    hits[y * w + x] += 1;
                }
            }
        }

        assert!(hits.iter().all(|&n| n == 1), "{}x{} / {}", w, h, d);
        assert!(tiles.len() <= d * d);
    }
}

#[test]
fn default_partition_has_64_tiles() {
    let tiles = partition(400, 300, 8);

    assert_eq!(tiles.len(), 64);
    assert_eq!(tiles[0], Tile { index: 0, x0: 0, y0: 0, width: 50, height: 37 });
    assert_eq!(tiles[63], Tile { index: 63, x0: 350, y0: 259, width: 50, height: 41 });
}

#[test]
fn tile_count_does_not_change_the_image() {
    use crate::config::RenderConfig;

    let config = RenderConfig { width: 24, height: 18, depth_max: 3, ..Default::default() };
    let camera = Camera::new(&config);

    let whole = parallel_render(test_world(RenderConfig { divisions: 1, ..config.clone() }),
        camera).unwrap();

    for &divisions in &[3, 4, 7] {
        let tiled = parallel_render(
            test_world(RenderConfig { divisions, ..config.clone() }), camera).unwrap();

        for y in 0..18 {
            for x in 0..24 {
                let a = whole.read_pixel(x, y).unwrap();
                let b = tiled.read_pixel(x, y).unwrap();
                assert_eq!((a.r, a.g, a.b), (b.r, b.g, b.b), "({}, {}) with {}", x, y, divisions);
            }
        }
    }
}

#[test]
fn tile_matches_sequential_render() {
    use crate::config::RenderConfig;

    let config = RenderConfig { width: 12, height: 9, ..Default::default() };
    let camera = Camera::new(&config);
    let world = test_world(config);

    let tile = Tile { index: 0, x0: 4, y0: 3, width: 5, height: 4 };
    let canvas = render_tile(&world, &camera, &tile).unwrap();

    for y in 0..4 {
        for x in 0..5 {
            let ray = camera.ray_for_pixel(4 + x, 3 + y).unwrap();
            assert_eq!(canvas.read_pixel(x, y), Some(world.color_at(ray).unwrap()));
        }
    }
}

#[test]
fn degenerate_ray_fails_the_render() {
    use crate::config::RenderConfig;
    use crate::vector::Vector3D;

    // The camera sits on the screen window, right where the center pixel
    // looks.
    let config = RenderConfig {
        width: 3,
        height: 3,
        camera: Vector3D::zero(),
        screen_center_y: 0.0,
        divisions: 3,
        ..Default::default()
    };
    let camera = Camera::new(&config);

    let err = parallel_render(test_world(config), camera).unwrap_err();
    assert!(matches!(err, RenderError::Geometry { tile: 4, .. }), "{:?}", err);
}
