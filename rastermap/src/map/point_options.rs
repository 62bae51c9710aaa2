use rastermap_types::GeoPoint;

use crate::color::Color;
use crate::layer::{MarkerIcon, MarkerShape};

/// Appearance of a group of points added with [`Map::add_points`](super::Map::add_points).
#[derive(Debug, Clone, PartialEq)]
pub struct PointsOptions {
    /// Marker drawn for every point. `None` draws labels only.
    pub icon: Option<MarkerIcon>,
    /// Label font family or font file. The catalog default is used if not set or not found.
    pub font: Option<String>,
    /// Label size in pixels.
    pub size: f64,
    /// Label color.
    pub color: Color,
}

impl Default for PointsOptions {
    fn default() -> Self {
        Self {
            icon: Some(MarkerIcon::default()),
            font: None,
            size: 12.0,
            color: Color::BLACK,
        }
    }
}

/// Single marker added with [`Map::add_point`](super::Map::add_point).
#[derive(Debug, Clone, PartialEq)]
pub struct PointSpec {
    /// Position of the marker.
    pub position: GeoPoint,
    /// Text drawn next to the marker.
    pub label: Option<String>,
    /// Marker color.
    pub color: Color,
    /// Marker shape.
    pub shape: MarkerShape,
}

impl PointSpec {
    /// Circle marker of the default color at the given position.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            position: GeoPoint::new(lon, lat),
            label: None,
            color: Color::rgb(220, 60, 60),
            shape: MarkerShape::Circle,
        }
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the marker color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Sets the marker shape.
    pub fn with_shape(mut self, shape: MarkerShape) -> Self {
        self.shape = shape;
        self
    }

    pub(super) fn icon(&self) -> MarkerIcon {
        MarkerIcon::Shape {
            shape: self.shape,
            fill: self.color,
            stroke: Color::WHITE,
        }
    }
}
