use image::{Rgba, RgbaImage};
use tiny_skia::{
    ColorU8, FillRule, IntSize, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, PixmapPaint,
    Rect, Stroke, Transform,
};

use crate::color::Color;
use crate::decoded_image::DecodedImage;
use crate::error::GisError;
use crate::render::text::ShapedText;
use crate::render::{Canvas, ClipRect, FontFace, PixelPoint, PixelRect, Position, TextStyle};

/// Advance of one character relative to the font size, used to measure text when no font can be
/// loaded at all.
const FALLBACK_CHAR_ADVANCE: f64 = 0.6;

/// Margin kept around the canvas when clipping shapes, on top of the stroke width.
const CLIP_MARGIN: f64 = 2.0;

/// [`Canvas`] backed by a `tiny-skia` pixmap.
///
/// Lines, polygons and circles are rasterized without anti-aliasing, at the centers of the
/// pixels given as coordinates, and alpha blended over the existing content. Text is shaped and
/// drawn anti-aliased with the font of the [`TextStyle`], or the bundled font if it has none.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCanvas {
    pixmap: Pixmap,
}

impl ImageCanvas {
    /// Creates a white canvas of the given size.
    pub fn new(width: u32, height: u32) -> Result<Self, GisError> {
        Self::filled(width, height, Color::WHITE)
    }

    /// Creates a canvas filled with `background`.
    pub fn filled(width: u32, height: u32, background: Color) -> Result<Self, GisError> {
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            GisError::InvalidViewport(format!("cannot create a {width}x{height} canvas"))
        })?;
        pixmap.fill(skia_color(background));

        Ok(Self { pixmap })
    }

    /// Rendered pixels, not premultiplied.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.pixmap.width(), self.pixmap.height(), |x, y| {
            Rgba(
                self.pixel(x, y)
                    .unwrap_or(Color::TRANSPARENT)
                    .to_u8_array(),
            )
        })
    }

    /// Color of the pixel at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixmap.pixel(x, y).map(|pixel| {
            let color = pixel.demultiply();
            Color::rgba(color.red(), color.green(), color.blue(), color.alpha())
        })
    }

    fn clip_rect(&self, width: f64) -> ClipRect {
        ClipRect::for_canvas(self.size(), width.max(0.0) + CLIP_MARGIN)
    }

    fn shape(text: &str, style: &TextStyle) -> Option<ShapedText> {
        match &style.font {
            Some(face) => face.shape(text, style.size),
            None => FontFace::bundled()?.shape(text, style.size),
        }
    }
}

fn skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r(), color.g(), color.b(), color.a())
}

fn paint(color: Color, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r(), color.g(), color.b(), color.a());
    paint.anti_alias = anti_alias;
    paint
}

/// Center of the pixel at the given position.
fn pixel_center((x, y): Position) -> (f32, f32) {
    (x as f32 + 0.5, y as f32 + 0.5)
}

fn ring_path(ring: &[Position]) -> Option<Path> {
    let (first, rest) = ring.split_first()?;
    let mut builder = PathBuilder::new();
    let (x, y) = pixel_center(*first);
    builder.move_to(x, y);
    for point in rest {
        let (x, y) = pixel_center(*point);
        builder.line_to(x, y);
    }
    builder.close();
    builder.finish()
}

/// Converts a region of an image into a premultiplied pixmap.
fn image_region(image: &DecodedImage, region: PixelRect) -> Option<Pixmap> {
    let size = IntSize::from_wh(region.width, region.height)?;
    let rgba = image.as_rgba();

    let mut data = Vec::with_capacity(region.width as usize * region.height as usize * 4);
    for y in region.y..region.bottom() {
        for x in region.x..region.right() {
            let pixel = rgba.get_pixel(x as u32, y as u32);
            let color = ColorU8::from_rgba(pixel[0], pixel[1], pixel[2], pixel[3]).premultiply();
            data.extend([color.red(), color.green(), color.blue(), color.alpha()]);
        }
    }

    Pixmap::from_vec(data, size)
}

impl Canvas for ImageCanvas {
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn blit(&mut self, image: &DecodedImage, dst: PixelPoint, src: PixelRect) {
        let image_rect = PixelRect::new(0, 0, image.width(), image.height());
        let Some(region) = src.intersection(&image_rect) else {
            return;
        };

        let x = dst.x.saturating_add(region.x - src.x);
        let y = dst.y.saturating_add(region.y - src.y);
        let (width, height) = self.size();
        let target = PixelRect::new(x, y, region.width, region.height);
        if target
            .intersection(&PixelRect::new(0, 0, width, height))
            .is_none()
        {
            return;
        }

        let Some(pixmap) = image_region(image, region) else {
            return;
        };
        self.pixmap.draw_pixmap(
            x,
            y,
            pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: Color, width: f64) {
        if color.is_transparent() {
            return;
        }
        let Some((from, to)) = self
            .clip_rect(width)
            .clip_segment(from.position(), to.position())
        else {
            return;
        };

        let mut builder = PathBuilder::new();
        let (x, y) = pixel_center(from);
        builder.move_to(x, y);
        let (x, y) = pixel_center(to);
        builder.line_to(x, y);
        let Some(path) = builder.finish() else {
            return;
        };

        let stroke = Stroke {
            // zero width is a one pixel hairline
            width: if width <= 1.0 { 0.0 } else { width as f32 },
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        self.pixmap.stroke_path(
            &path,
            &paint(color, false),
            &stroke,
            Transform::identity(),
            None,
        );
    }

    fn fill_polygon(&mut self, points: &[PixelPoint], color: Color) {
        if points.len() < 3 || color.is_transparent() {
            return;
        }

        let ring: Vec<Position> = points.iter().map(PixelPoint::position).collect();
        let clipped = self.clip_rect(0.0).clip_ring(&ring);
        if clipped.len() < 3 {
            return;
        }
        let Some(path) = ring_path(&clipped) else {
            return;
        };

        self.pixmap.fill_path(
            &path,
            &paint(color, false),
            FillRule::EvenOdd,
            Transform::identity(),
            None,
        );
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Color) {
        if color.is_transparent() {
            return;
        }
        let (width, height) = self.size();
        let Some(visible) = rect.intersection(&PixelRect::new(0, 0, width, height)) else {
            return;
        };
        let Some(rect) = Rect::from_xywh(
            visible.x as f32,
            visible.y as f32,
            visible.width as f32,
            visible.height as f32,
        ) else {
            return;
        };

        self.pixmap
            .fill_rect(rect, &paint(color, false), Transform::identity(), None);
    }

    fn stroke_rect(&mut self, rect: PixelRect, color: Color, width: f64) {
        if rect.is_empty() {
            return;
        }

        let border = (width.round().max(1.0) as u32)
            .min(rect.width.div_ceil(2))
            .min(rect.height.div_ceil(2));
        if 2 * border >= rect.width || 2 * border >= rect.height {
            self.fill_rect(rect, color);
            return;
        }

        // Sides do not overlap, so translucent borders are blended once.
        let inner_height = rect.height - 2 * border;
        let b = border as i32;
        self.fill_rect(PixelRect::new(rect.x, rect.y, rect.width, border), color);
        self.fill_rect(
            PixelRect::new(rect.x, rect.bottom() - b, rect.width, border),
            color,
        );
        self.fill_rect(PixelRect::new(rect.x, rect.y + b, border, inner_height), color);
        self.fill_rect(
            PixelRect::new(rect.right() - b, rect.y + b, border, inner_height),
            color,
        );
    }

    fn fill_circle(&mut self, center: PixelPoint, radius: f64, color: Color) {
        if radius <= 0.0 || color.is_transparent() {
            return;
        }
        if !self.clip_rect(radius).contains(center.position()) {
            return;
        }

        let (x, y) = pixel_center(center.position());
        let Some(path) = PathBuilder::from_circle(x, y, radius as f32) else {
            return;
        };

        self.pixmap.fill_path(
            &path,
            &paint(color, false),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    fn draw_text(&mut self, text: &str, position: PixelPoint, style: &TextStyle) {
        if text.trim().is_empty() || style.color.is_transparent() {
            return;
        }
        let Some(shaped) = Self::shape(text, style) else {
            log::debug!("No font to draw label {text:?}");
            return;
        };

        let (text_width, text_height) = shaped.size();
        let text_rect = PixelRect::new(position.x, position.y, text_width, text_height);
        let (width, height) = self.size();
        if text_rect
            .intersection(&PixelRect::new(0, 0, width, height))
            .is_none()
        {
            return;
        }

        let paint = paint(style.color, true);
        let transform = Transform::from_translate(position.x as f32, position.y as f32);
        for glyph in &shaped.glyphs {
            self.pixmap
                .fill_path(glyph, &paint, FillRule::Winding, transform, None);
        }
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> (u32, u32) {
        match Self::shape(text, style) {
            Some(shaped) => shaped.size(),
            None => {
                let width = text.chars().count() as f64 * style.size * FALLBACK_CHAR_ADVANCE;
                (width.ceil() as u32, style.size.ceil() as u32)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn count(canvas: &ImageCanvas, matches: impl Fn(Color) -> bool) -> usize {
        let (width, height) = canvas.size();
        (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y).is_some_and(&matches))
            .count()
    }

    fn canvas(width: u32, height: u32) -> ImageCanvas {
        ImageCanvas::new(width, height).unwrap()
    }

    #[test]
    fn starts_white() {
        let canvas = canvas(4, 3);
        assert_eq!(count(&canvas, |c| c == Color::WHITE), 12);
        assert_eq!(canvas.pixel(4, 0), None);
        assert_eq!(canvas.to_image().dimensions(), (4, 3));
        assert_eq!(canvas.to_image().get_pixel(3, 2), &Rgba([255, 255, 255, 255]));

        assert_matches!(ImageCanvas::new(0, 3), Err(GisError::InvalidViewport(_)));
    }

    #[test]
    fn thin_line_is_continuous() {
        let mut canvas = canvas(20, 20);
        canvas.draw_line(PixelPoint::new(0, 5), PixelPoint::new(10, 5), Color::BLACK, 1.0);
        for x in 1..10 {
            assert_eq!(canvas.pixel(x, 5), Some(Color::BLACK), "x = {x}");
        }
        assert_eq!(count(&canvas, |c| c != Color::WHITE && c != Color::BLACK), 0);
        assert_eq!(canvas.pixel(5, 3), Some(Color::WHITE));
        assert_eq!(canvas.pixel(15, 5), Some(Color::WHITE));

        canvas.draw_line(PixelPoint::new(0, 8), PixelPoint::new(10, 18), Color::RED, 1.0);
        for y in 9..18 {
            assert!(
                (0..20).any(|x| canvas.pixel(x, y) == Some(Color::RED)),
                "row {y} has a gap"
            );
        }
    }

    #[test]
    fn wide_line_covers_more() {
        let mut canvas = canvas(30, 30);
        canvas.draw_line(PixelPoint::new(5, 10), PixelPoint::new(25, 10), Color::BLACK, 5.0);
        for y in 9..=11 {
            assert_eq!(canvas.pixel(15, y), Some(Color::BLACK));
        }
        assert_eq!(canvas.pixel(15, 15), Some(Color::WHITE));
        assert!(count(&canvas, |c| c == Color::BLACK) > 20 * 4);
    }

    #[test]
    fn line_outside_is_clipped() {
        let mut canvas = canvas(64, 64);
        canvas.draw_line(PixelPoint::new(-50, -50), PixelPoint::new(-10, -10), Color::BLACK, 3.0);
        assert_eq!(canvas, self::canvas(64, 64));

        canvas.draw_line(
            PixelPoint::new(-200_000, 10),
            PixelPoint::new(200_000, 10),
            Color::BLACK,
            2.0,
        );
        for x in [0, 32, 63] {
            assert_eq!(canvas.pixel(x, 10), Some(Color::BLACK), "x = {x}");
        }

        canvas.draw_line(
            PixelPoint::new(i32::MIN, i32::MIN),
            PixelPoint::new(i32::MAX, i32::MAX),
            Color::RED,
            1.0,
        );
        assert!(count(&canvas, |c| c == Color::RED) >= 60);
    }

    #[test]
    fn fill_square() {
        let mut canvas = canvas(10, 10);
        let square = [
            PixelPoint::new(2, 2),
            PixelPoint::new(7, 2),
            PixelPoint::new(7, 7),
            PixelPoint::new(2, 7),
        ];
        canvas.fill_polygon(&square, Color::BLUE);

        for (x, y) in [(3, 3), (5, 4), (6, 6)] {
            assert_eq!(canvas.pixel(x, y), Some(Color::BLUE));
        }
        for (x, y) in [(0, 0), (9, 5), (5, 9), (1, 4)] {
            assert_eq!(canvas.pixel(x, y), Some(Color::WHITE));
        }
        assert_eq!(count(&canvas, |c| c != Color::WHITE && c != Color::BLUE), 0);
    }

    #[test]
    fn fill_ignores_degenerate() {
        let mut canvas = canvas(10, 10);
        canvas.fill_polygon(&[PixelPoint::new(1, 1), PixelPoint::new(5, 5)], Color::BLACK);
        canvas.fill_polygon(&[], Color::BLACK);
        assert_eq!(canvas, self::canvas(10, 10));
    }

    #[test]
    fn huge_polygon_is_clipped() {
        let mut canvas = canvas(16, 16);
        let around = [
            PixelPoint::new(-1_000_000, -1_000_000),
            PixelPoint::new(1_000_000, -1_000_000),
            PixelPoint::new(1_000_000, 1_000_000),
            PixelPoint::new(-1_000_000, 1_000_000),
        ];
        canvas.fill_polygon(&around, Color::BLUE);
        assert_eq!(count(&canvas, |c| c == Color::BLUE), 16 * 16);
    }

    #[test]
    fn translucent_fill_blends_once() {
        let mut canvas = canvas(10, 10);
        canvas.fill_rect(PixelRect::new(0, 0, 10, 10), Color::rgba(0, 0, 0, 128));

        let pixel = canvas.pixel(5, 5).unwrap();
        assert!((126..=128).contains(&pixel.r()), "{pixel:?}");
        assert_eq!(pixel.a(), 255);
        assert_eq!(count(&canvas, |c| c == pixel), 100);
    }

    #[test]
    fn stroke_rect_leaves_interior() {
        let mut canvas = canvas(10, 10);
        canvas.stroke_rect(PixelRect::new(2, 2, 6, 6), Color::RED, 1.0);

        assert_eq!(count(&canvas, |c| c == Color::RED), 20);
        for (x, y) in [(2, 2), (7, 4), (4, 7), (7, 7)] {
            assert_eq!(canvas.pixel(x, y), Some(Color::RED));
        }
        for (x, y) in [(4, 4), (1, 1), (8, 8)] {
            assert_eq!(canvas.pixel(x, y), Some(Color::WHITE));
        }

        let mut translucent = self::canvas(10, 10);
        translucent.stroke_rect(PixelRect::new(0, 0, 10, 10), Color::rgba(0, 0, 0, 128), 2.0);
        let corner = translucent.pixel(0, 0);
        assert_eq!(translucent.pixel(1, 5), corner);
        assert_eq!(translucent.pixel(5, 8), corner);
        assert_eq!(translucent.pixel(2, 2), Some(Color::WHITE));
    }

    #[test]
    fn blit_clips_to_canvas() {
        let mut canvas = canvas(10, 10);
        let tile = DecodedImage::solid(8, 8, Color::RED);
        canvas.blit(&tile, PixelPoint::new(-4, -4), PixelRect::new(0, 0, 8, 8));
        assert_eq!(count(&canvas, |c| c == Color::RED), 16);
        assert_eq!(canvas.pixel(3, 3), Some(Color::RED));
        assert_eq!(canvas.pixel(4, 4), Some(Color::WHITE));

        // source rectangle larger than the image
        canvas.blit(&tile, PixelPoint::new(6, 6), PixelRect::new(4, 4, 8, 8));
        assert_eq!(count(&canvas, |c| c == Color::RED), 32);
        assert_eq!(canvas.pixel(9, 9), Some(Color::RED));
    }

    #[test]
    fn blit_blends_transparent_pixels() {
        let mut canvas = canvas(4, 4);
        let clear = DecodedImage::solid(4, 4, Color::TRANSPARENT);
        canvas.blit(&clear, PixelPoint::new(0, 0), PixelRect::new(0, 0, 4, 4));
        assert_eq!(canvas, self::canvas(4, 4));
    }

    #[test]
    fn circle() {
        let mut canvas = canvas(20, 20);
        canvas.fill_circle(PixelPoint::new(10, 10), 4.0, Color::BLUE);
        assert_eq!(canvas.pixel(10, 10), Some(Color::BLUE));
        assert_eq!(canvas.pixel(10, 13), Some(Color::BLUE));
        assert_eq!(canvas.pixel(10, 16), Some(Color::WHITE));
        assert_eq!(canvas.pixel(14, 14), Some(Color::WHITE));

        let before = canvas.clone();
        canvas.fill_circle(PixelPoint::new(i32::MAX, 10), 4.0, Color::BLUE);
        canvas.fill_circle(PixelPoint::new(5, 5), 0.0, Color::BLUE);
        assert_eq!(canvas, before);
    }

    #[test]
    fn text_is_drawn_inside_its_box() {
        let mut canvas = canvas(200, 60);
        let style = TextStyle {
            size: 20.0,
            ..Default::default()
        };

        let (width, height) = canvas.measure_text("Rosario", &style);
        assert!(width > 40 && width < 140, "{width}");
        assert!(height >= 20 && height < 40, "{height}");

        canvas.draw_text("Rosario", PixelPoint::new(10, 10), &style);
        let dark = |c: Color| c.r() < 128;
        assert!(count(&canvas, dark) > 30);

        let (x_end, y_end) = (10 + width + 2, 10 + height + 2);
        for y in 0..60 {
            for x in 0..200 {
                if canvas.pixel(x, y).is_some_and(|c| c != Color::WHITE) {
                    assert!((8..x_end).contains(&x) && (8..y_end).contains(&y), "({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn text_uses_style_font_and_color() {
        let style = TextStyle {
            font: FontFace::bundled(),
            size: 16.0,
            color: Color::RED,
        };
        let mut canvas = canvas(120, 40);
        canvas.draw_text("Paraná", PixelPoint::new(2, 2), &style);
        assert!(count(&canvas, |c| c.r() > 200 && c.g() < 128) > 10);

        let mut blank = self::canvas(120, 40);
        blank.draw_text("   ", PixelPoint::new(2, 2), &style);
        blank.draw_text("Paraná", PixelPoint::new(500, 2), &style);
        assert_eq!(blank, self::canvas(120, 40));
    }
}
