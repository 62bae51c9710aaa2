//! Text shaping with `rustybuzz` and glyph outlines for the raster canvas.

use std::fmt::{Debug, Formatter};
use std::sync::{Arc, OnceLock};

use rustybuzz::ttf_parser::{GlyphId, OutlineBuilder};
use rustybuzz::UnicodeBuffer;
use tiny_skia::{Path, PathBuilder};

/// Font file contents and the index of the face in the file.
#[derive(Clone)]
pub struct FontFace {
    data: Arc<Vec<u8>>,
    index: u32,
}

impl FontFace {
    /// Contents of the font bundled with the crate (Tuffy, public domain).
    pub const BUNDLED_DATA: &'static [u8] = include_bytes!("../../data/fonts/Tuffy.ttf");

    /// Family name of the bundled font.
    pub const BUNDLED_FAMILY: &'static str = "Tuffy";

    /// Wraps font data. Returns `None` if the data has no parsable face at `index`.
    pub fn new(data: Arc<Vec<u8>>, index: u32) -> Option<Self> {
        rustybuzz::Face::from_slice(&data, index)?;
        Some(Self { data, index })
    }

    /// The font bundled with the crate, used when no other font is available.
    pub fn bundled() -> Option<Self> {
        static BUNDLED: OnceLock<Option<FontFace>> = OnceLock::new();
        BUNDLED
            .get_or_init(|| Self::new(Arc::new(Self::BUNDLED_DATA.to_vec()), 0))
            .clone()
    }

    /// Index of the face in the font file.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Shapes a single line of text at `size` pixels.
    ///
    /// Glyphs are placed relative to the top-left corner of the line box, which is as high as
    /// the distance from the ascender to the descender of the face.
    pub fn shape(&self, text: &str, size: f64) -> Option<ShapedText> {
        let face = rustybuzz::Face::from_slice(&self.data, self.index)?;
        let scale = size as f32 / face.units_per_em() as f32;
        let baseline = face.ascender() as f32 * scale;
        let height = (face.ascender() as f32 - face.descender() as f32) * scale;

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();
        let glyph_buffer = rustybuzz::shape(&face, &[], buffer);

        let mut glyphs = vec![];
        let mut advance = 0.0;
        for (info, position) in glyph_buffer
            .glyph_infos()
            .iter()
            .zip(glyph_buffer.glyph_positions())
        {
            let mut builder = GlyphPathBuilder::new(
                scale,
                advance + position.x_offset as f32 * scale,
                baseline - position.y_offset as f32 * scale,
            );
            face.outline_glyph(GlyphId(info.glyph_id as u16), &mut builder);
            // whitespace has no outline
            if let Some(path) = builder.finish() {
                glyphs.push(path);
            }

            advance += position.x_advance as f32 * scale;
        }

        Some(ShapedText {
            glyphs,
            width: advance,
            height,
        })
    }
}

impl Debug for FontFace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("len", &self.data.len())
            .field("index", &self.index)
            .finish()
    }
}

impl PartialEq for FontFace {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && (Arc::ptr_eq(&self.data, &other.data) || self.data == other.data)
    }
}

/// A shaped line of text.
#[derive(Debug, Clone)]
pub struct ShapedText {
    /// Glyph outlines in pixels relative to the top-left corner of the line.
    pub glyphs: Vec<Path>,
    /// Sum of the glyph advances.
    pub width: f32,
    /// Height of the line box.
    pub height: f32,
}

impl ShapedText {
    /// Size of the line box in whole pixels.
    pub fn size(&self) -> (u32, u32) {
        (
            self.width.max(0.0).ceil() as u32,
            self.height.max(0.0).ceil() as u32,
        )
    }
}

/// Converts font units to pixels with `y` growing downwards.
struct GlyphPathBuilder {
    builder: PathBuilder,
    scale: f32,
    x: f32,
    baseline: f32,
}

impl GlyphPathBuilder {
    fn new(scale: f32, x: f32, baseline: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            scale,
            x,
            baseline,
        }
    }

    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.x + x * self.scale, self.baseline - y * self.scale)
    }

    fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x, y) = self.point(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x2, y2) = self.point(x2, y2);
        let (x, y) = self.point(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
