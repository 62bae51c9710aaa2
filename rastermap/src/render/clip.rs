//! Clipping of projected geometry before it is converted to whole pixels.
//!
//! At deep zoom levels a feature a few kilometers away from the map area is billions of pixels
//! away from the canvas. Positions stay in `f64` until the geometry is cut down to the canvas
//! grown by a margin, and only then become [`PixelPoint`]s.

use super::{Canvas, PixelPoint};
use crate::color::Color;

/// Canvas position in pixels before it is converted to a [`PixelPoint`].
pub type Position = (f64, f64);

/// Margin around the canvas kept by clipping, on top of the stroke width.
const CLIP_MARGIN: f64 = 2.0;

/// Axis aligned clipping area.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClipRect {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

#[derive(Copy, Clone)]
enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl ClipRect {
    /// Creates a clipping area from its corners.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Canvas of the given size grown by `margin` pixels on every side.
    pub fn for_canvas((width, height): (u32, u32), margin: f64) -> Self {
        Self::new(
            -margin,
            -margin,
            width as f64 + margin,
            height as f64 + margin,
        )
    }

    /// Returns true if the position is inside the area or on its border.
    pub fn contains(&self, (x, y): Position) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Part of the segment inside the area, `None` if the segment misses it.
    ///
    /// Endpoints inside the area are returned unchanged.
    pub fn clip_segment(&self, from: Position, to: Position) -> Option<(Position, Position)> {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let mut t_in = 0.0;
        let mut t_out = 1.0;

        // Liang-Barsky: p is the direction towards the boundary, q the distance to it.
        for (p, q) in [
            (-dx, from.0 - self.min_x),
            (dx, self.max_x - from.0),
            (-dy, from.1 - self.min_y),
            (dy, self.max_y - from.1),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }

            let t = q / p;
            if p < 0.0 {
                if t > t_out {
                    return None;
                }
                if t > t_in {
                    t_in = t;
                }
            } else {
                if t < t_in {
                    return None;
                }
                if t < t_out {
                    t_out = t;
                }
            }
        }

        let at = |t: f64| (from.0 + t * dx, from.1 + t * dy);
        let start = if t_in > 0.0 { at(t_in) } else { from };
        let end = if t_out < 1.0 { at(t_out) } else { to };
        Some((start, end))
    }

    /// Part of a closed ring inside the area. Vertices inside the area keep their order.
    ///
    /// A ring crossing the area several times may come back with zero-width bridges along the
    /// border; they are outside the canvas as long as the area has a margin.
    pub fn clip_ring(&self, ring: &[Position]) -> Vec<Position> {
        let mut output = ring.to_vec();

        // Sutherland-Hodgman, one edge at a time.
        for edge in [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom] {
            let input = std::mem::take(&mut output);
            let Some(&last) = input.last() else {
                break;
            };

            let mut prev = last;
            for &current in &input {
                let current_inside = self.inside(edge, current);
                if current_inside != self.inside(edge, prev) {
                    output.push(self.intersect(edge, prev, current));
                }
                if current_inside {
                    output.push(current);
                }
                prev = current;
            }
        }

        output
    }

    fn inside(&self, edge: Edge, (x, y): Position) -> bool {
        match edge {
            Edge::Left => x >= self.min_x,
            Edge::Right => x <= self.max_x,
            Edge::Top => y >= self.min_y,
            Edge::Bottom => y <= self.max_y,
        }
    }

    fn intersect(&self, edge: Edge, a: Position, b: Position) -> Position {
        match edge {
            Edge::Left | Edge::Right => {
                let x = if matches!(edge, Edge::Left) {
                    self.min_x
                } else {
                    self.max_x
                };
                let t = (x - a.0) / (b.0 - a.0);
                (x, a.1 + t * (b.1 - a.1))
            }
            Edge::Top | Edge::Bottom => {
                let y = if matches!(edge, Edge::Top) {
                    self.min_y
                } else {
                    self.max_y
                };
                let t = (y - a.1) / (b.1 - a.1);
                (a.0 + t * (b.0 - a.0), y)
            }
        }
    }
}

/// Draws every segment of a polyline, skipping the parts that cannot show on the canvas.
pub fn draw_polyline(canvas: &mut dyn Canvas, points: &[Position], color: Color, width: f64) {
    let clip = ClipRect::for_canvas(canvas.size(), width + CLIP_MARGIN);
    for segment in points.windows(2) {
        if let Some((from, to)) = clip.clip_segment(segment[0], segment[1]) {
            canvas.draw_line(
                PixelPoint::from_position(from),
                PixelPoint::from_position(to),
                color,
                width,
            );
        }
    }
}

/// Part of a ring that can show on a canvas of the given size, outlined with `stroke_width`,
/// with repeated pixels collapsed.
///
/// Returns `None` if fewer than three distinct pixels remain.
pub fn visible_ring(
    canvas_size: (u32, u32),
    ring: &[Position],
    stroke_width: f64,
) -> Option<Vec<PixelPoint>> {
    let clip = ClipRect::for_canvas(canvas_size, stroke_width + CLIP_MARGIN);
    let mut points: Vec<PixelPoint> = clip
        .clip_ring(ring)
        .into_iter()
        .map(PixelPoint::from_position)
        .collect();
    points.dedup();

    (points.len() >= 3).then_some(points)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn area() -> ClipRect {
        ClipRect::new(0.0, 0.0, 100.0, 50.0)
    }

    #[test]
    fn segment_inside_is_unchanged() {
        let segment = ((10.5, 10.0), (90.0, 40.25));
        assert_eq!(area().clip_segment(segment.0, segment.1), Some(segment));
    }

    #[test]
    fn segment_crossing_area() {
        let (from, to) = area()
            .clip_segment((-1.0e12, 25.0), (1.0e12, 25.0))
            .unwrap();
        assert_abs_diff_eq!(from.0, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(to.0, 100.0, epsilon = 1e-3);
        assert_eq!((from.1, to.1), (25.0, 25.0));

        let (from, to) = area().clip_segment((50.0, 25.0), (50.0, 1.0e15)).unwrap();
        assert_eq!(from, (50.0, 25.0));
        assert_abs_diff_eq!(to.1, 50.0, epsilon = 1e-3);
    }

    #[test]
    fn segment_missing_area() {
        assert_eq!(area().clip_segment((-10.0, -10.0), (-5.0, 60.0)), None);
        assert_eq!(area().clip_segment((110.0, 60.0), (200.0, -60.0)), None);
        assert_eq!(area().clip_segment((-10.0, 5.0), (5.0, -10.0)), None);
    }

    #[test]
    fn ring_inside_keeps_vertices() {
        let ring = [(10.0, 10.0), (20.0, 10.0), (20.0, 20.0), (10.0, 10.0)];
        assert_eq!(area().clip_ring(&ring), ring.to_vec());
    }

    #[test]
    fn ring_around_area_becomes_area() {
        let ring = [(-1.0e10, -1.0e10), (1.0e10, -1.0e10), (1.0e10, 1.0e10), (-1.0e10, 1.0e10)];
        let clipped = area().clip_ring(&ring);
        assert_eq!(clipped.len(), 4);
        for corner in [(0.0, 0.0), (100.0, 0.0), (100.0, 50.0), (0.0, 50.0)] {
            assert!(clipped.contains(&corner), "{clipped:?}");
        }
    }

    #[test]
    fn ring_outside_is_empty() {
        let ring = [(200.0, 10.0), (300.0, 10.0), (250.0, 40.0)];
        assert!(area().clip_ring(&ring).is_empty());
        assert_eq!(visible_ring((100, 50), &ring, 1.0), None);
    }

    #[test]
    fn visible_ring_collapses_pixels() {
        let ring = [(10.0, 10.0), (10.2, 10.1), (30.0, 10.0), (30.0, 30.0)];
        let points = visible_ring((100, 50), &ring, 1.0).unwrap();
        assert_eq!(
            points,
            vec![
                PixelPoint::new(10, 10),
                PixelPoint::new(30, 10),
                PixelPoint::new(30, 30)
            ]
        );
    }
}
