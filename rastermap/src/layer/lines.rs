use rastermap_types::{GeoPoint, Ring};

use crate::color::Color;
use crate::error::GisError;
use crate::layer::Overlay;
use crate::render::{draw_polyline, Canvas};
use crate::viewport::PixelProjector;

/// Set of polylines drawn with one stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct LinesLayer {
    lines: Vec<Ring>,
    stroke: Color,
    width: f64,
}

impl LinesLayer {
    /// Creates a new layer.
    ///
    /// Every line must have at least two points, otherwise [`GisError::MalformedGeometry`] is
    /// returned and nothing is created.
    pub fn new(lines: Vec<Vec<GeoPoint>>, stroke: Color, width: f64) -> Result<Self, GisError> {
        if let Some(position) = lines.iter().position(|line| line.len() < 2) {
            return Err(GisError::MalformedGeometry(format!(
                "line {position} must have at least 2 points, got {}",
                lines[position].len()
            )));
        }

        Ok(Self {
            lines,
            stroke,
            width,
        })
    }

    /// Lines of the layer.
    pub fn lines(&self) -> &[Ring] {
        &self.lines
    }

    /// Stroke color.
    pub fn stroke(&self) -> Color {
        self.stroke
    }

    /// Stroke width in pixels.
    pub fn width(&self) -> f64 {
        self.width
    }
}

impl Overlay for LinesLayer {
    fn render(&self, canvas: &mut dyn Canvas, projector: &PixelProjector) {
        for line in &self.lines {
            let points: Vec<_> = line.iter().map(|p| projector.position(*p)).collect();
            draw_polyline(canvas, &points, self.stroke, self.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rastermap_types::lonlat;

    use super::*;
    use crate::render::PixelPoint;
    use crate::tests::RecordingCanvas;

    #[test]
    fn short_line_is_rejected() {
        let result = LinesLayer::new(
            vec![
                vec![lonlat!(0.0, 0.0), lonlat!(1.0, 1.0)],
                vec![lonlat!(2.0, 2.0)],
            ],
            Color::RED,
            2.0,
        );
        assert_matches!(result, Err(GisError::MalformedGeometry(msg)) if msg.contains("line 1"));
    }

    #[test]
    fn draws_every_segment() {
        let layer = LinesLayer::new(
            vec![
                vec![lonlat!(0.0, 0.0), lonlat!(45.0, 0.0), lonlat!(90.0, 0.0)],
                vec![lonlat!(-90.0, 0.0), lonlat!(-45.0, 0.0)],
            ],
            Color::RED,
            3.0,
        )
        .unwrap();

        let mut canvas = RecordingCanvas::new(256, 256);
        layer.render(&mut canvas, &PixelProjector::new(0.0, 0.0, 0));

        let lines = canvas.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].0, PixelPoint::new(128, 128));
        assert_eq!(lines[2].1, PixelPoint::new(96, 128));
        assert!(lines.iter().all(|l| l.2 == Color::RED && l.3 == 3.0));
    }

    #[test]
    fn world_wide_line_at_deep_zoom() {
        let layer = LinesLayer::new(
            vec![vec![lonlat!(-179.0, 0.0), lonlat!(179.0, 0.0)]],
            Color::RED,
            2.0,
        )
        .unwrap();
        let (x, y) = rastermap_types::projection::to_global_px(lonlat!(0.0, 0.0), 24);

        let mut canvas = RecordingCanvas::new(64, 64);
        layer.render(&mut canvas, &PixelProjector::new(x - 32.0, y - 32.0, 24));

        let lines = canvas.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!((lines[0].0.y, lines[0].1.y), (32, 32));
        assert!(lines[0].0.x < 0 && lines[0].1.x > 64);
    }
}
