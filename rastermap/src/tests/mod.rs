//! Test doubles shared by the unit tests of the crate.

use std::cell::RefCell;
use std::path::PathBuf;

use crate::basemap::{BasemapProvider, TileSource};
use crate::color::Color;
use crate::decoded_image::DecodedImage;
use crate::error::GisError;
use crate::render::{Canvas, PixelPoint, PixelRect, TextStyle};
use crate::tile_grid::TileIndex;

/// A call made on a [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    Blit {
        dst: PixelPoint,
        src: PixelRect,
    },
    Line {
        from: PixelPoint,
        to: PixelPoint,
        color: Color,
        width: f64,
    },
    FillPolygon {
        points: Vec<PixelPoint>,
        color: Color,
    },
    FillRect {
        rect: PixelRect,
        color: Color,
    },
    StrokeRect {
        rect: PixelRect,
        color: Color,
        width: f64,
    },
    FillCircle {
        center: PixelPoint,
        radius: f64,
        color: Color,
    },
    Text {
        text: String,
        position: PixelPoint,
        style: TextStyle,
    },
}

/// Canvas that only records what is drawn on it.
pub struct RecordingCanvas {
    size: (u32, u32),
    ops: Vec<CanvasOp>,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            ops: vec![],
        }
    }

    pub fn ops(&self) -> &[CanvasOp] {
        &self.ops
    }

    pub fn lines(&self) -> Vec<(PixelPoint, PixelPoint, Color, f64)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                CanvasOp::Line {
                    from,
                    to,
                    color,
                    width,
                } => Some((*from, *to, *color, *width)),
                _ => None,
            })
            .collect()
    }

    pub fn fills(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, CanvasOp::FillPolygon { .. }))
            .count()
    }

    pub fn blits(&self) -> Vec<(PixelPoint, PixelRect)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                CanvasOp::Blit { dst, src } => Some((*dst, *src)),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<(String, PixelPoint)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                CanvasOp::Text { text, position, .. } => Some((text.clone(), *position)),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn blit(&mut self, _image: &DecodedImage, dst: PixelPoint, src: PixelRect) {
        self.ops.push(CanvasOp::Blit { dst, src });
    }

    fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: Color, width: f64) {
        self.ops.push(CanvasOp::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn fill_polygon(&mut self, points: &[PixelPoint], color: Color) {
        self.ops.push(CanvasOp::FillPolygon {
            points: points.to_vec(),
            color,
        });
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Color) {
        self.ops.push(CanvasOp::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: PixelRect, color: Color, width: f64) {
        self.ops.push(CanvasOp::StrokeRect { rect, color, width });
    }

    fn fill_circle(&mut self, center: PixelPoint, radius: f64, color: Color) {
        self.ops.push(CanvasOp::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, position: PixelPoint, style: &TextStyle) {
        self.ops.push(CanvasOp::Text {
            text: text.to_string(),
            position,
            style: style.clone(),
        });
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> (u32, u32) {
        (
            (text.chars().count() as f64 * style.size * 0.6).ceil() as u32,
            style.size.ceil() as u32,
        )
    }
}

/// Tile source serving solid 256×256 tiles whose color depends on the tile index.
#[derive(Default)]
pub struct MemoryTileSource {
    requests: RefCell<Vec<(String, TileIndex)>>,
    failing: Option<TileIndex>,
}

impl MemoryTileSource {
    pub fn failing_on(mut self, index: TileIndex) -> Self {
        self.failing = Some(index);
        self
    }

    pub fn requests(&self) -> Vec<(String, TileIndex)> {
        self.requests.borrow().clone()
    }

    pub fn tile_color(index: TileIndex) -> Color {
        Color::rgb(
            (index.x % 200) as u8 + 40,
            (index.y % 200) as u8 + 40,
            (index.z * 7 % 256) as u8,
        )
    }
}

impl TileSource for MemoryTileSource {
    fn load(&self, provider: &BasemapProvider, index: TileIndex) -> Result<DecodedImage, GisError> {
        self.requests
            .borrow_mut()
            .push((provider.id().to_string(), index));

        if self.failing == Some(index) {
            return Err(GisError::TileFetchFailure {
                index,
                reason: "tile is configured to fail".into(),
            });
        }

        Ok(DecodedImage::solid(256, 256, Self::tile_color(index)))
    }
}

/// Fresh empty directory under the system temp dir.
pub fn temp_dir(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("rastermap-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&path);
    std::fs::create_dir_all(&path).expect("failed to create temp dir");
    path
}
