//! Features loaded into the map and the single place that decides how they are rasterized.

use rastermap_types::{GeoPoint, Geom, Ring};

use crate::color::Color;
use crate::ontology::SemanticLayer;
use crate::render::{draw_polyline, visible_ring, Canvas, PixelPoint, Position};
use crate::style::StyleRule;
use crate::viewport::PixelProjector;

/// Feature attributes.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// How [`Feature::draw`] paints a feature.
///
/// Chosen by the map for every layer before drawing:
/// * water polygons and lines are drawn with [`DrawMode::Outline`],
/// * other classified layers use [`DrawMode::Styled`] with their style rule,
/// * [`DrawMode::LegacyFill`] paints polygons with a single fill and no outline.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawMode {
    /// Outline of every polygon ring, no fill. Lines are drawn with the same color and width.
    Outline {
        /// Outline color.
        color: Color,
        /// Outline width in pixels.
        width: f64,
    },
    /// Fill and stroke from a style rule.
    Styled(StyleRule),
    /// Single color fill of polygons, thin lines.
    LegacyFill(Color),
}

/// Geometry with attributes and the semantic layer assigned by the classifier.
///
/// The layer is assigned once when the feature is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    geometry: Geom,
    properties: Properties,
    layer: Option<SemanticLayer>,
}

impl Feature {
    /// Creates a new feature.
    pub fn new(geometry: Geom, properties: Properties, layer: Option<SemanticLayer>) -> Self {
        Self {
            geometry,
            properties,
            layer,
        }
    }

    /// Geometry of the feature.
    pub fn geometry(&self) -> &Geom {
        &self.geometry
    }

    /// Attributes of the feature.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Layer assigned by the classifier, `None` if unclassified.
    pub fn layer(&self) -> Option<SemanticLayer> {
        self.layer
    }

    /// Value of the `name` property.
    pub fn label(&self) -> Option<&str> {
        self.properties
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Mean of all coordinates of a linear geometry. `None` for other geometry types.
    pub fn centroid(&self) -> Option<GeoPoint> {
        let points: Vec<&GeoPoint> = self.geometry.lines().iter().flatten().collect();
        if points.is_empty() {
            return None;
        }

        let count = points.len() as f64;
        let lon = points.iter().map(|p| p.lon()).sum::<f64>() / count;
        let lat = points.iter().map(|p| p.lat()).sum::<f64>() / count;
        Some(GeoPoint::new(lon, lat))
    }

    /// Middle coordinate of a linear geometry, with all sub-lines taken as one sequence.
    pub fn middle_point(&self) -> Option<GeoPoint> {
        let points: Vec<&GeoPoint> = self.geometry.lines().iter().flatten().collect();
        if points.len() < 2 {
            return None;
        }

        Some(*points[points.len() / 2])
    }

    /// Draws the feature on the canvas. Points are not drawn here.
    pub fn draw(&self, canvas: &mut dyn Canvas, projector: &PixelProjector, mode: &DrawMode) {
        match &self.geometry {
            Geom::Point(_) => {}
            Geom::LineString(line) => draw_lines(canvas, projector, std::slice::from_ref(line), mode),
            Geom::MultiLineString(lines) => draw_lines(canvas, projector, lines, mode),
            Geom::Polygon(rings) => draw_polygon(canvas, projector, rings, mode),
            Geom::MultiPolygon(polygons) => {
                for rings in polygons {
                    draw_polygon(canvas, projector, rings, mode);
                }
            }
        }
    }
}

fn project_ring(projector: &PixelProjector, ring: &Ring) -> Vec<Position> {
    ring.iter().map(|p| projector.position(*p)).collect()
}

/// Visible part of the projected ring with consecutive duplicate pixels collapsed. `None` if
/// fewer than 3 points remain, so degenerate rings never reach the fill.
fn fillable_ring(
    canvas: &dyn Canvas,
    projector: &PixelProjector,
    ring: &Ring,
    stroke_width: f64,
) -> Option<Vec<PixelPoint>> {
    visible_ring(canvas.size(), &project_ring(projector, ring), stroke_width)
}

fn draw_polygon(
    canvas: &mut dyn Canvas,
    projector: &PixelProjector,
    rings: &[Ring],
    mode: &DrawMode,
) {
    for ring in rings {
        match mode {
            DrawMode::Outline { color, width } => {
                let points = project_ring(projector, ring);
                if points.len() >= 2 {
                    draw_polyline(canvas, &points, *color, *width);
                }
            }
            DrawMode::Styled(rule) => {
                let width = rule.stroke_width.unwrap_or(1.0);
                let Some(points) = fillable_ring(canvas, projector, ring, width) else {
                    continue;
                };

                if let Some(fill) = rule.fill {
                    canvas.fill_polygon(&points, fill);
                }

                if let Some(stroke) = rule.stroke {
                    for pair in points.windows(2) {
                        canvas.draw_line(pair[0], pair[1], stroke, width);
                    }
                    if let (Some(first), Some(last)) = (points.first(), points.last()) {
                        canvas.draw_line(*last, *first, stroke, width);
                    }
                }
            }
            DrawMode::LegacyFill(color) => {
                if let Some(points) = fillable_ring(canvas, projector, ring, 0.0) {
                    canvas.fill_polygon(&points, *color);
                }
            }
        }
    }
}

fn draw_lines(canvas: &mut dyn Canvas, projector: &PixelProjector, lines: &[Ring], mode: &DrawMode) {
    for line in lines {
        let points = project_ring(projector, line);
        match mode {
            DrawMode::Outline { color, width } => draw_polyline(canvas, &points, *color, *width),
            DrawMode::Styled(rule) => {
                if let Some(stroke) = rule.stroke {
                    draw_polyline(canvas, &points, stroke, rule.line_width());
                }
                if let (Some(_), Some(casing), Some(casing_width)) =
                    (rule.stroke, rule.fill, rule.fill_width)
                {
                    draw_polyline(canvas, &points, casing, casing_width);
                }
            }
            DrawMode::LegacyFill(color) => draw_polyline(canvas, &points, *color, 1.0),
        }
    }
}
