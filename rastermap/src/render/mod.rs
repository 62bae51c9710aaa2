//! Raster drawing seam used by the map renderer.
//!
//! Everything the render pipeline paints goes through the [`Canvas`] trait. [`ImageCanvas`] is the
//! in-memory implementation used by [`Map::render`](crate::map::Map::render).

use crate::color::Color;
use crate::decoded_image::DecodedImage;

mod clip;
mod image_canvas;
mod text;

pub use clip::{draw_polyline, visible_ring, ClipRect, Position};
pub use image_canvas::ImageCanvas;
pub use text::{FontFace, ShapedText};

/// Largest distance from the canvas origin a [`PixelPoint`] is created with by
/// [`PixelPoint::from_position`].
pub const MAX_PIXEL_COORDINATE: f64 = (1 << 24) as f64;

/// Point in canvas pixel coordinates, `y` growing downwards.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl PixelPoint {
    /// Creates a new point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Rounds a canvas position to whole pixels.
    ///
    /// Coordinates are limited to [`MAX_PIXEL_COORDINATE`] pixels from the origin. Clip geometry
    /// with [`ClipRect`] first where the exact position of far away points matters.
    pub fn from_position((x, y): Position) -> Self {
        let convert = |value: f64| {
            if value.is_nan() {
                0
            } else {
                value
                    .round()
                    .clamp(-MAX_PIXEL_COORDINATE, MAX_PIXEL_COORDINATE) as i32
            }
        };

        Self::new(convert(x), convert(y))
    }

    /// Position of the pixel as `f64`.
    pub fn position(&self) -> Position {
        (self.x as f64, self.y as f64)
    }
}

/// Axis aligned rectangle in pixel coordinates.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left column.
    pub x: i32,
    /// Top row.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Creates a new rectangle.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Column right after the last one of the rectangle.
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Row right after the last one of the rectangle.
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Returns true if the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Overlapping part of two rectangles, `None` if they do not overlap.
    pub fn intersection(&self, other: &PixelRect) -> Option<PixelRect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= x || bottom <= y {
            return None;
        }

        Some(PixelRect::new(x, y, (right - x) as u32, (bottom - y) as u32))
    }
}

/// Parameters of a text label.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Font to render with. `None` lets the canvas pick a default.
    pub font: Option<FontFace>,
    /// Font size in pixels.
    pub size: f64,
    /// Text color.
    pub color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: None,
            size: 10.0,
            color: Color::BLACK,
        }
    }
}

/// Raster drawing surface.
///
/// Coordinates outside the surface are valid arguments: implementations clip silently.
pub trait Canvas {
    /// Width and height of the surface.
    fn size(&self) -> (u32, u32);

    /// Draws the `src` part of `image` so that its top-left pixel lands on `dst`, alpha blended
    /// over the existing content.
    fn blit(&mut self, image: &DecodedImage, dst: PixelPoint, src: PixelRect);

    /// Draws a straight line segment of the given width.
    fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: Color, width: f64);

    /// Fills a closed ring using the even-odd rule.
    fn fill_polygon(&mut self, points: &[PixelPoint], color: Color);

    /// Fills a rectangle.
    fn fill_rect(&mut self, rect: PixelRect, color: Color);

    /// Draws the border of a rectangle.
    fn stroke_rect(&mut self, rect: PixelRect, color: Color, width: f64);

    /// Fills a circle.
    fn fill_circle(&mut self, center: PixelPoint, radius: f64, color: Color);

    /// Draws a single line of text with its top-left corner at `position`.
    fn draw_text(&mut self, text: &str, position: PixelPoint, style: &TextStyle);

    /// Width and height the text would take when drawn with `style`.
    fn measure_text(&self, text: &str, style: &TextStyle) -> (u32, u32);
}
