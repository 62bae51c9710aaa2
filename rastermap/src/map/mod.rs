//! [`Map`] ties everything together: it holds the loaded data and renders it over the basemap.

use std::collections::HashSet;
use std::path::Path;

use geojson::GeoJson;
use rastermap_types::geo::CrsNormalizer;
use rastermap_types::geojson::convert_geometry;
use rastermap_types::projection::TILE_SIZE;
use rastermap_types::{BBox, GeoPoint, Geom, Ring};
use serde_json::Value;

use crate::basemap::{BasemapProvider, TileSource};
use crate::color::Color;
use crate::decoded_image::DecodedImage;
use crate::error::GisError;
use crate::feature::{DrawMode, Feature, Properties};
use crate::font::FontCatalog;
use crate::layer::{LinesLayer, MarkerIcon, Overlay, PointRecord, PointsLayer, PolygonsLayer};
use crate::legend::{Legend, LegendItem, LegendPosition};
use crate::ontology::{road_class, water_kind, Ontology, SemanticLayer};
use crate::render::{Canvas, ImageCanvas, PixelPoint, PixelRect, TextStyle};
use crate::style::{LayerKind, Style};
use crate::tile_grid::{Tile, TileGrid};
use crate::viewport::PixelProjector;

mod buckets;
mod builder;
mod options;
mod point_options;

pub use buckets::LayerBuckets;
pub use builder::MapBuilder;
pub use options::{BBoxOption, MapOptions};
pub use point_options::{PointSpec, PointsOptions};

const LINE_LABEL_SIZE: f64 = 10.0;
const DEFAULT_POINT_LABEL_SIZE: f64 = 12.0;

/// Points overlay. GeoJSON points take their appearance from the style at render time.
#[derive(Debug, Clone)]
enum PointsOverlay {
    Fixed(PointsLayer),
    Styled(Vec<PointRecord>),
}

/// Map to render: area, basemap, loaded data and style.
///
/// A map is created with a [`MapBuilder`]. Nothing can be rendered until a [`Style`] is set, and
/// every render produces the whole image from scratch, so rendering an unchanged map with a
/// deterministic tile source gives the same image every time.
pub struct Map {
    bbox: BBox,
    zoom: u32,
    viewport: Option<(u32, u32)>,
    basemap: BasemapProvider,
    tile_source: Box<dyn TileSource>,
    ontology: Ontology,
    fonts: FontCatalog,
    line_labels: bool,
    used_labels: HashSet<String>,
    layers: LayerBuckets,
    polygons_layers: Vec<PolygonsLayer>,
    lines_layers: Vec<LinesLayer>,
    points_layers: Vec<PointsOverlay>,
    legend: Option<Legend>,
    style: Option<Style>,
    image: Option<ImageCanvas>,
}

impl std::fmt::Debug for Map {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("bbox", &self.bbox)
            .field("zoom", &self.zoom)
            .field("viewport", &self.viewport)
            .field("basemap", &self.basemap)
            .field("features", &self.layers.len())
            .field("polygons_layers", &self.polygons_layers.len())
            .field("lines_layers", &self.lines_layers.len())
            .field("points_layers", &self.points_layers.len())
            .field("legend", &self.legend.is_some())
            .field("style", &self.style.is_some())
            .finish_non_exhaustive()
    }
}

impl Map {
    /// Area of the map. In viewport mode this is the box fitted to the image.
    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    /// Zoom level.
    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Width and height of the output image, if set.
    pub fn viewport(&self) -> Option<(u32, u32)> {
        self.viewport
    }

    /// Basemap provider.
    pub fn basemap(&self) -> &BasemapProvider {
        &self.basemap
    }

    /// Style used for rendering.
    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    /// Sets the style. Required before rendering.
    pub fn set_style(&mut self, style: Style) {
        self.style = Some(style);
    }

    /// Classified features loaded from GeoJSON.
    pub fn layers(&self) -> &LayerBuckets {
        &self.layers
    }

    /// Legend, if set.
    pub fn legend(&self) -> Option<&Legend> {
        self.legend.as_ref()
    }

    /// Image produced by the last successful [`Map::render`] call.
    pub fn image(&self) -> Option<&ImageCanvas> {
        self.image.as_ref()
    }

    /// Size of the rendered image: the viewport, or the whole tile grid in tile mode.
    pub fn canvas_size(&self) -> (u32, u32) {
        match self.viewport {
            Some(size) => size,
            None => self.tile_grid().canvas_size(),
        }
    }

    fn tile_grid(&self) -> TileGrid {
        TileGrid::for_bbox(&self.bbox, self.zoom)
    }

    /// Loads a GeoJSON document and sorts its features into layers.
    ///
    /// Coordinates are converted from the CRS named in the `crs` member of the document (CRS84 if
    /// there is none). Returns the number of features added.
    pub fn add_geojson(&mut self, json: &str) -> Result<usize, GisError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|err| GisError::MalformedGeometry(format!("invalid GeoJSON: {err}")))?;
        let crs_name = value
            .pointer("/crs/properties/name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let normalizer = CrsNormalizer::from_name(crs_name.as_deref())?;

        let features = match GeoJson::from_json_value(value)? {
            GeoJson::FeatureCollection(collection) => collection.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(geometry) => vec![geojson::Feature {
                bbox: None,
                geometry: Some(geometry),
                id: None,
                properties: None,
                foreign_members: None,
            }],
        };

        let mut added = 0;
        let mut points = vec![];
        let mut labels = vec![];

        for feature in features {
            let Some(geometry) = feature.geometry else {
                log::warn!("Skipping feature without geometry");
                continue;
            };
            let Some(geom) = convert_geometry(&geometry, &normalizer)? else {
                log::warn!("Skipping feature with unsupported geometry {}", type_name(&geometry.value));
                continue;
            };

            let properties: Properties = feature.properties.unwrap_or_default();
            let geometry_type = geom.geometry_type();
            let layer = self.ontology.classify(&properties, geometry_type);
            let feature = Feature::new(geom, properties, layer);

            if self.line_labels && geometry_type.is_linear() {
                if let Some(label) = self.line_label(&feature) {
                    labels.push(label);
                }
            }

            added += 1;
            if let Geom::Point(position) = feature.geometry() {
                points.push(PointRecord::new(*position, feature.label().map(str::to_string)));
                continue;
            }

            match layer {
                Some(SemanticLayer::Water) => {
                    let kind = water_kind(feature.properties());
                    self.layers.push_water(kind, feature);
                }
                Some(SemanticLayer::Road) => {
                    let kind = road_class(feature.properties());
                    self.layers.push(kind, feature);
                }
                Some(SemanticLayer::Rail) => self.layers.push(LayerKind::Rail, feature),
                Some(SemanticLayer::Park) => self.layers.push(LayerKind::Park, feature),
                Some(SemanticLayer::Point) | None if geometry_type.is_linear() => {
                    self.layers.push(LayerKind::Minor, feature)
                }
                _ => {
                    log::debug!("Dropping unclassified {geometry_type} feature");
                    added -= 1;
                }
            }
        }

        if !points.is_empty() {
            self.points_layers.push(PointsOverlay::Styled(points));
        }
        if !labels.is_empty() {
            let style = self.text_style(None, LINE_LABEL_SIZE, Color::BLACK);
            self.points_layers
                .push(PointsOverlay::Fixed(PointsLayer::new(labels, None, Some(style))));
        }

        log::debug!("Loaded {added} GeoJSON features");
        Ok(added)
    }

    /// Loads a GeoJSON file. See [`Map::add_geojson`].
    pub fn add_geojson_file(&mut self, path: impl AsRef<Path>) -> Result<usize, GisError> {
        let json = std::fs::read_to_string(path)?;
        self.add_geojson(&json)
    }

    /// Label at the middle of a named line, once per distinct `wikidata` id or name.
    fn line_label(&mut self, feature: &Feature) -> Option<PointRecord> {
        let name = feature.label()?;
        let key = feature
            .properties()
            .get("wikidata")
            .and_then(Value::as_str)
            .unwrap_or(name)
            .to_string();
        if self.used_labels.contains(&key) {
            return None;
        }

        let position = feature.middle_point()?;
        self.used_labels.insert(key);
        Some(PointRecord::new(position, Some(name.to_string())))
    }

    /// Adds a points overlay built from arbitrary records.
    ///
    /// `lon`, `lat` and `label` extract the position and the label text of every record.
    pub fn add_points<T>(
        &mut self,
        data: &[T],
        lon: impl Fn(&T) -> f64,
        lat: impl Fn(&T) -> f64,
        label: impl Fn(&T) -> Option<String>,
        options: PointsOptions,
    ) {
        let points = data
            .iter()
            .map(|row| PointRecord::new(GeoPoint::new(lon(row), lat(row)), label(row)))
            .collect();
        let text_style = self.text_style(options.font.as_deref(), options.size, options.color);

        self.points_layers.push(PointsOverlay::Fixed(PointsLayer::new(
            points,
            options.icon,
            Some(text_style),
        )));
    }

    /// Adds a single marker.
    pub fn add_point(&mut self, point: PointSpec) {
        let text_style = self.text_style(None, DEFAULT_POINT_LABEL_SIZE, Color::BLACK);
        let layer = PointsLayer::new(
            vec![PointRecord::new(point.position, point.label.clone())],
            Some(point.icon()),
            Some(text_style),
        );

        self.points_layers.push(PointsOverlay::Fixed(layer));
    }

    /// Adds a lines overlay. Every line must have at least two points.
    pub fn add_lines(
        &mut self,
        lines: Vec<Vec<GeoPoint>>,
        stroke: Color,
        width: f64,
    ) -> Result<(), GisError> {
        self.lines_layers.push(LinesLayer::new(lines, stroke, width)?);
        Ok(())
    }

    /// Adds a polygons overlay. The first ring of every polygon is filled, all rings are outlined
    /// if `stroke` is given.
    pub fn add_polygons(
        &mut self,
        polygons: Vec<Vec<Ring>>,
        fill: Color,
        stroke: Option<Color>,
        width: f64,
    ) {
        self.polygons_layers
            .push(PolygonsLayer::new(polygons, fill, stroke, width));
    }

    /// Adds polygons approximating `lines` widened by `meters` on each side.
    pub fn add_buffered_lines(
        &mut self,
        lines: &[Vec<GeoPoint>],
        meters: f64,
        fill: Color,
        stroke: Option<Color>,
    ) -> Result<(), GisError> {
        self.polygons_layers
            .push(PolygonsLayer::from_lines(lines, meters, fill, stroke, 1.0)?);
        Ok(())
    }

    /// Sets the legend, replacing the previous one.
    pub fn set_legend(
        &mut self,
        position: LegendPosition,
        items: impl IntoIterator<Item = LegendItem>,
    ) {
        let mut legend =
            Legend::new(position).with_text_style(self.text_style(None, 10.0, Color::BLACK));
        for item in items {
            legend.add(item.color, item.label);
        }

        self.legend = Some(legend);
    }

    fn text_style(&self, font: Option<&str>, size: f64, color: Color) -> TextStyle {
        let resolved = font.and_then(|name| {
            let face = self.fonts.resolve(name);
            if face.is_none() {
                log::warn!("Font {name:?} not found, using the default font");
            }
            face
        });

        TextStyle {
            font: resolved.or_else(|| self.fonts.default_font()),
            size,
            color,
        }
    }

    /// Renders the map into a new image, kept by the map until the next render.
    pub fn render(&mut self) -> Result<&ImageCanvas, GisError> {
        let (width, height) = self.canvas_size();
        let mut canvas = ImageCanvas::new(width, height)?;
        self.render_into(&mut canvas)?;

        Ok(self.image.insert(canvas))
    }

    /// Renders the map on the given canvas, which is expected to have the size returned by
    /// [`Map::canvas_size`].
    ///
    /// Nothing is drawn if the style is missing or any of the tiles or icons cannot be loaded.
    pub fn render_into(&self, canvas: &mut dyn Canvas) -> Result<(), GisError> {
        let style = self.style.as_ref().ok_or(GisError::MissingStyle)?;
        let points_layers = self.resolve_points(style)?;

        let grid = self.tile_grid();
        let tiles = grid.fetch(self.tile_source.as_ref(), &self.basemap)?;

        let projector = match self.viewport {
            Some(_) => {
                let projector = PixelProjector::for_viewport(&self.bbox, self.zoom);
                composite_viewport(canvas, &tiles, &projector);
                projector
            }
            None => {
                composite_tiles(canvas, &tiles, &grid);
                PixelProjector::for_tiles(&grid)
            }
        };

        self.draw_layers(canvas, &projector, style);

        for layer in &self.polygons_layers {
            layer.render(canvas, &projector);
        }
        for layer in &self.lines_layers {
            layer.render(canvas, &projector);
        }
        for layer in &points_layers {
            layer.render(canvas, &projector);
        }

        if let Some(legend) = &self.legend {
            legend.render(canvas);
        }

        log::info!(
            "Rendered {} tiles and {} features at zoom {}",
            tiles.len(),
            self.layers.len(),
            self.zoom
        );

        Ok(())
    }

    fn draw_layers(&self, canvas: &mut dyn Canvas, projector: &PixelProjector, style: &Style) {
        for kind in &style.order {
            let Some(rule) = style.rule_for(*kind) else {
                continue;
            };

            if *kind == LayerKind::Water {
                let Some(stroke) = rule.stroke else {
                    continue;
                };
                for (water_kind, feature) in self.layers.water() {
                    let mode = DrawMode::Outline {
                        color: stroke,
                        width: water_kind.stroke_width(),
                    };
                    feature.draw(canvas, projector, &mode);
                }
                continue;
            }

            let mode = DrawMode::Styled(rule.clone());
            for feature in self.layers.features(*kind) {
                if feature.geometry().geometry_type().is_areal() || rule.stroke.is_some() {
                    feature.draw(canvas, projector, &mode);
                }
            }
        }
    }

    /// Points overlays in drawing order with the GeoJSON points styled by `style.points`.
    fn resolve_points(&self, style: &Style) -> Result<Vec<PointsLayer>, GisError> {
        let has_styled = self
            .points_layers
            .iter()
            .any(|overlay| matches!(overlay, PointsOverlay::Styled(_)));
        let appearance = if has_styled {
            Some(self.points_appearance(style)?)
        } else {
            None
        };

        let mut layers = Vec::with_capacity(self.points_layers.len());
        for overlay in &self.points_layers {
            match (overlay, &appearance) {
                (PointsOverlay::Fixed(layer), _) => layers.push(layer.clone()),
                (PointsOverlay::Styled(points), Some((icon, text_style))) => {
                    layers.push(PointsLayer::new(
                        points.clone(),
                        Some(icon.clone()),
                        Some(text_style.clone()),
                    ));
                }
                (PointsOverlay::Styled(_), None) => {}
            }
        }

        Ok(layers)
    }

    fn points_appearance(&self, style: &Style) -> Result<(MarkerIcon, TextStyle), GisError> {
        let Some(points) = &style.points else {
            log::warn!("Style has no points section, using default point appearance");
            return Ok((
                MarkerIcon::default(),
                self.text_style(None, DEFAULT_POINT_LABEL_SIZE, Color::BLACK),
            ));
        };

        let icon = match (&points.icon, points.icon_fill, points.icon_stroke) {
            (Some(path), _, _) => MarkerIcon::Image(DecodedImage::new(&std::fs::read(path)?)?),
            (None, Some(fill), Some(stroke)) => MarkerIcon::Shape {
                shape: Default::default(),
                fill,
                stroke,
            },
            _ => MarkerIcon::default(),
        };

        let text_style = self.text_style(
            points.font.as_deref(),
            points.size.unwrap_or(DEFAULT_POINT_LABEL_SIZE),
            points.color.unwrap_or(Color::BLACK),
        );

        Ok((icon, text_style))
    }
}

fn type_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Copies every tile to its place on a canvas covering the whole grid.
fn composite_tiles(canvas: &mut dyn Canvas, tiles: &[Tile], grid: &TileGrid) {
    for tile in tiles {
        let src = PixelRect::new(0, 0, TILE_SIZE, TILE_SIZE);
        canvas.blit(&tile.image, grid.tile_offset(tile.index), src);
    }
}

/// Copies the part of every tile that overlaps the canvas.
fn composite_viewport(canvas: &mut dyn Canvas, tiles: &[Tile], projector: &PixelProjector) {
    let (width, height) = canvas.size();
    let canvas_rect = PixelRect::new(0, 0, width, height);

    for tile in tiles {
        let dst = projector.project_global(
            tile.index.x as f64 * TILE_SIZE as f64,
            tile.index.y as f64 * TILE_SIZE as f64,
        );
        let tile_rect = PixelRect::new(dst.x, dst.y, TILE_SIZE, TILE_SIZE);

        let Some(overlap) = tile_rect.intersection(&canvas_rect) else {
            continue;
        };

        let src = PixelRect::new(
            overlap.x - dst.x,
            overlap.y - dst.y,
            overlap.width,
            overlap.height,
        );
        canvas.blit(&tile.image, PixelPoint::new(overlap.x, overlap.y), src);
    }
}
