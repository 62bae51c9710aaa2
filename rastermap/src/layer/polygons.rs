use rastermap_types::geometry::buffer_line;
use rastermap_types::{GeoPoint, Ring};

use crate::color::Color;
use crate::error::GisError;
use crate::layer::Overlay;
use crate::render::{draw_polyline, visible_ring, Canvas, Position};
use crate::viewport::PixelProjector;

/// Set of polygons sharing one fill and an optional outline.
///
/// Each polygon is a list of rings. Only the first ring is filled, every ring is outlined.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonsLayer {
    polygons: Vec<Vec<Ring>>,
    fill: Color,
    stroke: Option<Color>,
    width: f64,
}

impl PolygonsLayer {
    /// Creates a new layer. `width` is the outline width and is only used with a `stroke`.
    pub fn new(polygons: Vec<Vec<Ring>>, fill: Color, stroke: Option<Color>, width: f64) -> Self {
        Self {
            polygons,
            fill,
            stroke,
            width,
        }
    }

    /// Layer of polygons approximating `lines` buffered by `meters` on each side.
    ///
    /// Lines with less than two points are rejected with [`GisError::MalformedGeometry`].
    pub fn from_lines(
        lines: &[Vec<GeoPoint>],
        meters: f64,
        fill: Color,
        stroke: Option<Color>,
        width: f64,
    ) -> Result<Self, GisError> {
        let mut polygons = Vec::with_capacity(lines.len());
        for line in lines {
            if line.len() < 2 {
                return Err(GisError::MalformedGeometry(format!(
                    "cannot buffer a line with {} points",
                    line.len()
                )));
            }

            polygons.push(vec![buffer_line(line, meters)]);
        }

        Ok(Self::new(polygons, fill, stroke, width))
    }

    /// Polygons of the layer.
    pub fn polygons(&self) -> &[Vec<Ring>] {
        &self.polygons
    }
}

impl Overlay for PolygonsLayer {
    fn render(&self, canvas: &mut dyn Canvas, projector: &PixelProjector) {
        let stroke_width = if self.stroke.is_some() { self.width } else { 0.0 };
        for rings in &self.polygons {
            for (idx, ring) in rings.iter().enumerate() {
                let points: Vec<Position> = ring.iter().map(|p| projector.position(*p)).collect();

                if idx == 0 {
                    if let Some(visible) = visible_ring(canvas.size(), &points, stroke_width) {
                        canvas.fill_polygon(&visible, self.fill);
                    }
                }

                if let Some(stroke) = self.stroke {
                    draw_polyline(canvas, &points, stroke, self.width);
                }
            }
        }
    }
}
