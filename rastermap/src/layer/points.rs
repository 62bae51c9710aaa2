use rastermap_types::GeoPoint;

use crate::color::Color;
use crate::decoded_image::DecodedImage;
use crate::layer::Overlay;
use crate::render::{Canvas, PixelPoint, PixelRect, TextStyle};
use crate::viewport::PixelProjector;

/// Width and height of the built-in marker in pixels.
pub const DEFAULT_MARKER_SIZE: u32 = 32;

const MARKER_OUTER_RADIUS: i32 = 7;
const MARKER_INNER_RADIUS: i32 = 5;
const LABEL_GAP: i32 = 4;

/// Shape of a built-in marker.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MarkerShape {
    /// Round dot.
    #[default]
    Circle,
    /// Axis aligned square.
    Square,
    /// Triangle pointing up.
    Triangle,
    /// Square rotated by 45°.
    Diamond,
}

impl MarkerShape {
    /// Shape by its index, as used by symbol numbers in point data. Unknown indices give a circle.
    pub fn from_symbol(symbol: u32) -> Self {
        match symbol {
            1 => Self::Square,
            2 => Self::Triangle,
            3 => Self::Diamond,
            _ => Self::Circle,
        }
    }
}

/// Image drawn for every point of a [`PointsLayer`], centered on the point.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerIcon {
    /// Built-in marker: an outer shape in `stroke` with a smaller one in `fill` on top.
    Shape {
        /// Marker shape.
        shape: MarkerShape,
        /// Inner color.
        fill: Color,
        /// Outer ring color.
        stroke: Color,
    },
    /// Image marker, e.g. loaded from a PNG file.
    Image(DecodedImage),
}

impl Default for MarkerIcon {
    fn default() -> Self {
        Self::Shape {
            shape: MarkerShape::Circle,
            fill: Color::rgb(220, 60, 60),
            stroke: Color::WHITE,
        }
    }
}

impl MarkerIcon {
    /// Width and height of the icon in pixels.
    pub fn size(&self) -> (u32, u32) {
        match self {
            MarkerIcon::Shape { .. } => (DEFAULT_MARKER_SIZE, DEFAULT_MARKER_SIZE),
            MarkerIcon::Image(image) => (image.width(), image.height()),
        }
    }

    fn draw(&self, canvas: &mut dyn Canvas, center: PixelPoint) {
        match self {
            MarkerIcon::Shape {
                shape,
                fill,
                stroke,
            } => {
                draw_shape(canvas, *shape, center, MARKER_OUTER_RADIUS, *stroke);
                draw_shape(canvas, *shape, center, MARKER_INNER_RADIUS, *fill);
            }
            MarkerIcon::Image(image) => {
                let dst = PixelPoint::new(
                    center.x - image.width() as i32 / 2,
                    center.y - image.height() as i32 / 2,
                );
                canvas.blit(image, dst, PixelRect::new(0, 0, image.width(), image.height()));
            }
        }
    }
}

fn draw_shape(canvas: &mut dyn Canvas, shape: MarkerShape, c: PixelPoint, r: i32, color: Color) {
    match shape {
        MarkerShape::Circle => canvas.fill_circle(c, r as f64, color),
        MarkerShape::Square => canvas.fill_rect(
            PixelRect::new(c.x - r, c.y - r, (2 * r + 1) as u32, (2 * r + 1) as u32),
            color,
        ),
        MarkerShape::Triangle => canvas.fill_polygon(
            &[
                PixelPoint::new(c.x, c.y - r),
                PixelPoint::new(c.x + r, c.y + r),
                PixelPoint::new(c.x - r, c.y + r),
            ],
            color,
        ),
        MarkerShape::Diamond => canvas.fill_polygon(
            &[
                PixelPoint::new(c.x, c.y - r),
                PixelPoint::new(c.x + r, c.y),
                PixelPoint::new(c.x, c.y + r),
                PixelPoint::new(c.x - r, c.y),
            ],
            color,
        ),
    }
}

/// Single point of a [`PointsLayer`].
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    /// Position of the point.
    pub position: GeoPoint,
    /// Text drawn to the right of the marker.
    pub label: Option<String>,
}

impl PointRecord {
    /// Creates a new record.
    pub fn new(position: GeoPoint, label: Option<String>) -> Self {
        Self { position, label }
    }
}

/// Markers with optional text labels.
#[derive(Debug, Clone, PartialEq)]
pub struct PointsLayer {
    points: Vec<PointRecord>,
    icon: Option<MarkerIcon>,
    label_style: Option<TextStyle>,
}

impl PointsLayer {
    /// Creates a new layer. Labels are drawn only if `label_style` is given.
    ///
    /// Without an icon only the labels are drawn, anchored at the point itself.
    pub fn new(
        points: Vec<PointRecord>,
        icon: Option<MarkerIcon>,
        label_style: Option<TextStyle>,
    ) -> Self {
        Self {
            points,
            icon,
            label_style,
        }
    }

    /// Points of the layer.
    pub fn points(&self) -> &[PointRecord] {
        &self.points
    }

    /// Marker icon.
    pub fn icon(&self) -> Option<&MarkerIcon> {
        self.icon.as_ref()
    }

    /// Style of the labels.
    pub fn label_style(&self) -> Option<&TextStyle> {
        self.label_style.as_ref()
    }
}

impl Overlay for PointsLayer {
    fn render(&self, canvas: &mut dyn Canvas, projector: &PixelProjector) {
        let icon_width = self.icon.as_ref().map(|icon| icon.size().0).unwrap_or(0);

        for point in &self.points {
            let center = projector.project(point.position);
            if let Some(icon) = &self.icon {
                icon.draw(canvas, center);
            }

            let (Some(label), Some(style)) = (point.label.as_deref(), &self.label_style) else {
                continue;
            };
            if label.trim().is_empty() {
                continue;
            }

            let (_, text_height) = canvas.measure_text(label, style);
            let position = PixelPoint::new(
                center.x + icon_width as i32 / 2 + LABEL_GAP,
                center.y - text_height as i32 / 2,
            );
            canvas.draw_text(label, position, style);
        }
    }
}
