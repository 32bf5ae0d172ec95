use std::io;
use std::io::Write;
use std::fs::File;
use std::path::Path;

use crate::color::Color;
use crate::error::RenderError;

/// A canvas for drawing pixels.
///
/// This structure stores the results of the ray tracer. A canvas is either
/// the full image, or one tile of it while a worker renders; finished tiles
/// are summed into the full image with `accumulate`.
///
/// Once rendering finishes, the `Canvas` can be saved as a plain PPM file, or
/// in any format the `image` crate can encode.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored as a flattened vector.
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a new black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// Out-of-bounds pixels are ignored. Rows and columns are zero-indexed,
    /// `y` being the row of the pixel and `x` the column.
    ///
    /// # Examples
    ///
    /// Writing a pixel to the fourth column, second row on an 8-by-8 canvas:
    ///
    /// ```
    /// # use tiled_ray_tracer::color::Color;
    /// # use tiled_ray_tracer::canvas::Canvas;
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &purple);
    /// assert_eq!(canvas.read_pixel(4, 2).unwrap(), purple);
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *pixel;
    }

    /// Reads a color from a location on the `Canvas`, or `None` if the
    /// location is out-of-bounds.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// Adds every pixel of `tile` onto this canvas, with the tile's top-left
    /// corner placed at `(x0, y0)`.
    ///
    /// Parts of the tile falling outside the canvas are dropped. Tiles that
    /// don't overlap can be accumulated in any order onto a black canvas and
    /// give the same image.
    pub fn accumulate(&mut self, x0: usize, y0: usize, tile: &Canvas) {
        for ty in 0..tile.height {
            let y = y0 + ty;
            if y >= self.height {
                break;
            }

            for tx in 0..tile.width {
                let x = x0 + tx;
                if x >= self.width {
                    break;
                }

                self.pixels[(y * self.width) + x] += tile.pixels[(ty * tile.width) + tx];
            }
        }
    }

    /// Writes the canvas as a plain (P3) PPM image.
    ///
    /// Lines in the PPM output are clamped to 70 columns. A channel value
    /// that would cross the 70 column mark starts the next line instead.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?; // Maximum color value

        // Write channel values one at a time, breaking the line before any
        // value that would run past the 70 column mark.
        let mut col = 0;
        for pixel in self.pixels.iter() {
            for value in pixel.to_rgb8().iter() {
                let s = value.to_string();
                if col == 0 {
                    write!(out, "{}", s)?;
                    col = s.len();
                } else if col + 1 + s.len() > 70 {
                    write!(out, "\n{}", s)?;
                    col = s.len();
                } else {
                    write!(out, " {}", s)?;
                    col += 1 + s.len();
                }
            }
        }

        writeln!(out)
    }

    /// Converts the canvas into an 8-bit RGB image, row 0 at the top.
    pub fn to_rgb_image(&self) -> image::RgbImage {
        let mut img = image::RgbImage::new(self.width as u32, self.height as u32);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let color = self.pixels[(y as usize * self.width) + x as usize];
            *pixel = image::Rgb(color.to_rgb8());
        }

        img
    }

    /// Saves a canvas to an image file.
    ///
    /// A `.ppm` extension selects the plain PPM writer; anything else is
    /// encoded by the `image` crate based on the extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RenderError> {
        let path = path.as_ref();
        let is_ppm = path.extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("ppm"));

        if is_ppm {
            let io_error = |source| RenderError::Io { path: path.into(), source };
            let mut out = io::BufWriter::new(File::create(path).map_err(io_error)?);
            self.write_ppm(&mut out).map_err(io_error)?;
            out.flush().map_err(io_error)
        } else {
            self.to_rgb_image()
                .save(path)
                .map_err(|source| RenderError::Encode { path: path.into(), source })
        }
    }
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!(c.width, 10);
    assert_eq!(c.height, 20);
    for y in 0..20 {
        for x in 0..10 {
            assert_eq!(c.read_pixel(x, y), Some(Color::black()));
        }
    }
}

#[test]
fn out_of_bounds_pixels_are_ignored() {
    let mut c = Canvas::new(2, 2);
    c.write_pixel(2, 0, &Color::white());

    assert_eq!(c.read_pixel(2, 0), None);
    assert_eq!(c.pixels.iter().filter(|&&p| p == Color::white()).count(), 0);
}

#[test]
fn accumulate_places_tile_at_offset() {
    let mut full = Canvas::new(4, 3);
    let mut tile = Canvas::new(2, 2);
    tile.write_pixel(0, 0, &Color::red());
    tile.write_pixel(1, 1, &Color::white());

    full.accumulate(2, 1, &tile);

    assert_eq!(full.read_pixel(2, 1), Some(Color::red()));
    assert_eq!(full.read_pixel(3, 2), Some(Color::white()));
    assert_eq!(full.read_pixel(0, 0), Some(Color::black()));
    assert_eq!(full.read_pixel(3, 1), Some(Color::black()));
}

#[test]
fn accumulate_clips_to_canvas() {
    let mut full = Canvas::new(2, 2);
    let mut tile = Canvas::new(2, 2);
    tile.write_pixel(0, 0, &Color::gray(0.5));
    tile.write_pixel(1, 1, &Color::gray(0.5));

    full.accumulate(1, 1, &tile);

    assert_eq!(full.read_pixel(1, 1), Some(Color::gray(0.5)));
    assert_eq!(full.read_pixel(0, 0), Some(Color::black()));
}

#[test]
fn ppm_header_and_pixel_data() {
    let mut c = Canvas::new(5, 3);
    c.write_pixel(0, 0, &Color::rgb(1.5, 0.0, 0.0));
    c.write_pixel(2, 1, &Color::rgb(0.0, 0.5, 0.0));
    c.write_pixel(4, 2, &Color::rgb(-0.5, 0.0, 1.0));

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(&lines[..3], &["P3", "5 3", "255"]);
    assert!(text.starts_with("P3\n5 3\n255\n255 0 0 0 0 0"));
    assert!(text.contains("0 128 0"));
    assert!(text.ends_with("0 0 255\n"));
}

#[test]
fn ppm_lines_stay_within_70_columns() {
    let mut c = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            c.write_pixel(x, y, &Color::rgb(1.0, 0.8, 0.6));
        }
    }

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    for line in text.lines() {
        assert!(line.len() <= 70, "{:?}", line);
    }

    let values: Vec<&str> = text.lines().skip(3)
        .flat_map(|l| l.split_whitespace())
        .collect();
    assert_eq!(values.len(), 10 * 2 * 3);
    assert_eq!(&values[..3], &["255", "204", "153"]);
}

#[test]
fn rgb_image_keeps_row_order() {
    let mut c = Canvas::new(2, 2);
    c.write_pixel(1, 0, &Color::red());

    let img = c.to_rgb_image();
    assert_eq!(img.get_pixel(1, 0), &image::Rgb([255, 0, 0]));
    assert_eq!(img.get_pixel(1, 1), &image::Rgb([0, 0, 0]));
}
