//! See [`Style`].

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::GisError;

/// Semantic layer a classified feature is drawn in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Motorways and trunk roads.
    Motorway,
    /// Primary roads.
    Primary,
    /// Secondary roads.
    Secondary,
    /// Tertiary and residential streets.
    Street,
    /// Service roads, tracks and paths. Also receives unclassified lines.
    Minor,
    /// Railways.
    #[serde(alias = "rails")]
    Rail,
    /// Rivers, streams and water bodies.
    Water,
    /// Parks and green areas.
    #[serde(alias = "parks")]
    Park,
}

impl LayerKind {
    /// All kinds, roads first.
    pub const ALL: [LayerKind; 8] = [
        LayerKind::Motorway,
        LayerKind::Primary,
        LayerKind::Secondary,
        LayerKind::Street,
        LayerKind::Minor,
        LayerKind::Rail,
        LayerKind::Water,
        LayerKind::Park,
    ];

    /// Returns true for the road classes.
    pub fn is_road(&self) -> bool {
        matches!(
            self,
            Self::Motorway | Self::Primary | Self::Secondary | Self::Street | Self::Minor
        )
    }

    /// Name of the kind as used in style documents.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Motorway => "motorway",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Street => "street",
            Self::Minor => "minor",
            Self::Rail => "rail",
            Self::Water => "water",
            Self::Park => "park",
        }
    }
}

impl Display for LayerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Sub-kind of a water feature. Only selects the stroke width.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WaterKind {
    /// Rivers and canals.
    River,
    /// Streams.
    Stream,
    /// Anything else.
    Minor,
}

impl WaterKind {
    /// Outline width of the water feature in pixels.
    pub fn stroke_width(&self) -> f64 {
        match self {
            WaterKind::River => 2.5,
            WaterKind::Stream => 1.5,
            WaterKind::Minor => 1.0,
        }
    }
}

/// Visual rule of a semantic layer.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleRule {
    /// Outline (polygons) or line color.
    pub stroke: Option<Color>,
    /// Width of the stroke in pixels.
    pub stroke_width: Option<f64>,
    /// Interior color of polygons, inner casing color of lines.
    pub fill: Option<Color>,
    /// Width of the inner casing of lines in pixels.
    pub fill_width: Option<f64>,
}

impl StyleRule {
    /// Rule with only a stroke.
    pub fn stroke(color: Color, width: f64) -> Self {
        Self {
            stroke: Some(color),
            stroke_width: Some(width),
            ..Default::default()
        }
    }

    /// Rule with only a fill.
    pub fn fill(color: Color) -> Self {
        Self {
            fill: Some(color),
            ..Default::default()
        }
    }

    /// Stroke width rounded to whole pixels, at least 1.
    pub fn line_width(&self) -> f64 {
        self.stroke_width.map(f64::round).unwrap_or(1.0).max(1.0)
    }
}

/// Rules of the road classes.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadStyles {
    /// Motorways.
    pub motorway: Option<StyleRule>,
    /// Primary roads.
    pub primary: Option<StyleRule>,
    /// Secondary roads.
    pub secondary: Option<StyleRule>,
    /// Streets.
    pub street: Option<StyleRule>,
    /// Minor roads and unclassified lines.
    pub minor: Option<StyleRule>,
}

impl RoadStyles {
    /// Rule of the given road class. `None` for non-road kinds.
    pub fn get(&self, kind: LayerKind) -> Option<&StyleRule> {
        match kind {
            LayerKind::Motorway => self.motorway.as_ref(),
            LayerKind::Primary => self.primary.as_ref(),
            LayerKind::Secondary => self.secondary.as_ref(),
            LayerKind::Street => self.street.as_ref(),
            LayerKind::Minor => self.minor.as_ref(),
            _ => None,
        }
    }
}

/// Appearance of point features loaded from GeoJSON.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsStyle {
    /// Label color.
    pub color: Option<Color>,
    /// Label font size in pixels.
    pub size: Option<f64>,
    /// Label font family or font file path.
    pub font: Option<String>,
    /// Image file to use as a marker.
    pub icon: Option<PathBuf>,
    /// Fill color of the default circle marker.
    pub icon_fill: Option<Color>,
    /// Stroke color of the default circle marker.
    pub icon_stroke: Option<Color>,
}

/// Style of a map: rules for every semantic layer and the order layers are painted in.
///
/// Layers absent from `order` are never drawn, as are layers without a rule.
///
/// Documents may spell the rail and park sections `rails` and `parks`. When both spellings are
/// present the singular one is used.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StyleDocument")]
pub struct Style {
    /// Road rules by class.
    pub roads: RoadStyles,
    /// Rail rule.
    pub rail: Option<StyleRule>,
    /// Water rule. Water is only drawn when the rule has a stroke color.
    pub water: Option<StyleRule>,
    /// Park rule.
    pub park: Option<StyleRule>,
    /// Point features appearance.
    pub points: Option<PointsStyle>,
    /// Paint order, back to front.
    pub order: Vec<LayerKind>,
}

/// Style as written in JSON, with both spellings of the plural sections.
#[derive(Default, Deserialize)]
#[serde(default)]
struct StyleDocument {
    roads: RoadStyles,
    rail: Option<StyleRule>,
    rails: Option<StyleRule>,
    water: Option<StyleRule>,
    park: Option<StyleRule>,
    parks: Option<StyleRule>,
    points: Option<PointsStyle>,
    order: Vec<LayerKind>,
}

impl From<StyleDocument> for Style {
    fn from(doc: StyleDocument) -> Self {
        if doc.rail.is_some() && doc.rails.is_some() {
            log::warn!("Style has both `rail` and `rails` sections, using `rail`");
        }
        if doc.park.is_some() && doc.parks.is_some() {
            log::warn!("Style has both `park` and `parks` sections, using `park`");
        }

        Self {
            roads: doc.roads,
            rail: doc.rail.or(doc.rails),
            water: doc.water,
            park: doc.park.or(doc.parks),
            points: doc.points,
            order: doc.order,
        }
    }
}

impl Style {
    /// Parses a style from its JSON definition.
    pub fn from_json(json: &str) -> Result<Self, GisError> {
        serde_json::from_str(json).map_err(|err| GisError::InvalidStyle(err.to_string()))
    }

    /// Loads a style from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GisError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Rule of the given layer kind.
    pub fn rule_for(&self, kind: LayerKind) -> Option<&StyleRule> {
        match kind {
            LayerKind::Rail => self.rail.as_ref(),
            LayerKind::Water => self.water.as_ref(),
            LayerKind::Park => self.park.as_ref(),
            road => self.roads.get(road),
        }
    }

    /// Built-in light style: pale roads with gray casings over light water and parks.
    pub fn light() -> Self {
        Self {
            roads: RoadStyles {
                motorway: Some(StyleRule {
                    stroke: Some(Color::rgb(100, 100, 100)),
                    stroke_width: Some(10.0),
                    fill: Some(Color::rgb(245, 245, 245)),
                    fill_width: Some(6.0),
                }),
                primary: Some(StyleRule {
                    stroke: Some(Color::rgb(140, 140, 140)),
                    stroke_width: Some(7.0),
                    fill: Some(Color::rgb(240, 240, 240)),
                    fill_width: Some(4.0),
                }),
                secondary: Some(StyleRule {
                    stroke: Some(Color::rgb(170, 170, 170)),
                    stroke_width: Some(5.0),
                    fill: Some(Color::rgb(250, 250, 250)),
                    fill_width: Some(3.0),
                }),
                street: Some(StyleRule::stroke(Color::rgb(220, 220, 220), 1.0)),
                minor: Some(StyleRule::stroke(Color::rgb(230, 230, 230), 1.0)),
            },
            rail: Some(StyleRule {
                stroke: Some(Color::rgb(80, 80, 80)),
                stroke_width: Some(6.0),
                fill: Some(Color::rgb(230, 70, 70)),
                fill_width: Some(4.0),
            }),
            water: Some(StyleRule {
                stroke: Some(Color::rgb(120, 180, 240)),
                fill: Some(Color::rgb(168, 208, 255)),
                ..Default::default()
            }),
            park: Some(StyleRule::fill(Color::rgb(205, 238, 203))),
            points: Some(PointsStyle {
                color: Some(Color::BLACK),
                size: Some(10.0),
                icon_fill: Some(Color::rgb(220, 60, 60)),
                icon_stroke: Some(Color::WHITE),
                ..Default::default()
            }),
            order: vec![
                LayerKind::Water,
                LayerKind::Park,
                LayerKind::Minor,
                LayerKind::Street,
                LayerKind::Secondary,
                LayerKind::Primary,
                LayerKind::Motorway,
                LayerKind::Rail,
            ],
        }
    }
}
