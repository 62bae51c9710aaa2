//! Overlay layers drawn over the classified features.
//!
//! Overlays are explicit data added through the [`Map`](crate::map::Map) API and are always
//! painted after the styled layers in a fixed order: polygons, lines, then points.

mod lines;
mod points;
mod polygons;

pub use lines::LinesLayer;
pub use points::{MarkerIcon, MarkerShape, PointRecord, PointsLayer, DEFAULT_MARKER_SIZE};
pub use polygons::PolygonsLayer;

use crate::render::Canvas;
use crate::viewport::PixelProjector;

/// Overlay that can be painted on a canvas.
pub trait Overlay {
    /// Draws the overlay. Coordinates are projected with `projector`.
    fn render(&self, canvas: &mut dyn Canvas, projector: &PixelProjector);
}
