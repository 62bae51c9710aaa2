use std::collections::HashSet;
use std::path::PathBuf;

use rastermap_types::geo::{Crs, CrsNormalizer};
use rastermap_types::BBox;

use super::{LayerBuckets, Map};
use crate::basemap::{BasemapProvider, RestTileSource, TileCache, TileSource};
use crate::error::GisError;
use crate::extents::Extents;
use crate::font::FontCatalog;
use crate::ontology::Ontology;
use crate::style::Style;
use crate::tile_grid::validate_zoom;
use crate::viewport::viewport_bbox;

/// Convenience type to initialize a [`Map`].
///
/// ```ignore
/// use rastermap::{BasemapProvider, MapBuilder};
/// use rastermap::rastermap_types::BBox;
///
/// let map = MapBuilder::new(BBox::new(-58.55, -34.75, -58.35, -34.55)?, 12)
///     .with_basemap(BasemapProvider::Osm)
///     .with_viewport(800, 600)
///     .with_tile_cache("target/tiles")
///     .build()?;
/// ```
pub struct MapBuilder {
    bbox: BBox,
    extent: Option<String>,
    zoom: u32,
    basemap: BasemapProvider,
    viewport: Option<(u32, u32)>,
    crs: Option<Crs>,
    fitted_bbox: bool,
    tile_source: Option<Box<dyn TileSource>>,
    tile_cache_dir: Option<PathBuf>,
    offline: bool,
    font_catalog: Option<FontCatalog>,
    ontology: Option<Ontology>,
    line_labels: bool,
    style: Option<Style>,
}

impl MapBuilder {
    /// Creates a builder for a map of the given area at the given zoom level.
    pub fn new(bbox: BBox, zoom: u32) -> Self {
        Self {
            bbox,
            extent: None,
            zoom,
            basemap: BasemapProvider::default(),
            viewport: None,
            crs: None,
            fitted_bbox: false,
            tile_source: None,
            tile_cache_dir: None,
            offline: false,
            font_catalog: None,
            ontology: None,
            line_labels: true,
            style: None,
        }
    }

    /// Sets the area of the map.
    ///
    /// Replaces the value set by the [`MapBuilder::with_extent`] method.
    pub fn with_bbox(mut self, bbox: BBox) -> Self {
        self.bbox = bbox;
        self.extent = None;
        self
    }

    /// Sets the area of the map to a named extent, e.g. `"argentina"`.
    ///
    /// Unknown names make [`MapBuilder::build`] fail with [`GisError::InvalidBBox`].
    pub fn with_extent(mut self, name: impl Into<String>) -> Self {
        self.extent = Some(name.into());
        self
    }

    /// Sets the zoom level. Levels above [`MAX_ZOOM`](crate::tile_grid::MAX_ZOOM) are rejected on
    /// build.
    pub fn with_zoom(mut self, zoom: u32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Sets the basemap. Defaults to [`BasemapProvider::CartoLight`].
    pub fn with_basemap(mut self, basemap: BasemapProvider) -> Self {
        self.basemap = basemap;
        self
    }

    /// Renders into an image of exactly `width × height` pixels instead of the whole tile grid.
    ///
    /// Unless [`MapBuilder::with_fitted_bbox`] is set, the area is replaced by the box of that
    /// size around the center of the given area.
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Some((width, height));
        self
    }

    /// CRS the bounding box coordinates are given in. Defaults to CRS84.
    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }

    /// Uses the area as is in viewport mode, e.g. when it was computed with
    /// [`bbox_for_image`](crate::viewport::bbox_for_image).
    pub fn with_fitted_bbox(mut self, fitted: bool) -> Self {
        self.fitted_bbox = fitted;
        self
    }

    /// Sets the source of basemap tiles.
    ///
    /// If set, [`MapBuilder::with_tile_cache`] and [`MapBuilder::with_offline_mode`] are ignored,
    /// as the source must already be configured.
    pub fn with_tile_source(mut self, source: impl TileSource + 'static) -> Self {
        self.tile_source = Some(Box::new(source));
        self
    }

    /// Caches downloaded tiles in the given folder. The folder is created if needed.
    pub fn with_tile_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.tile_cache_dir = Some(path.into());
        self
    }

    /// Only uses cached tiles, without network access.
    pub fn with_offline_mode(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Sets the fonts available for labels. Defaults to the system fonts and the bundled font.
    pub fn with_font_catalog(mut self, catalog: FontCatalog) -> Self {
        self.font_catalog = Some(catalog);
        self
    }

    /// Sets the classification rules for GeoJSON features. Defaults to the built-in ontology.
    pub fn with_ontology(mut self, ontology: Ontology) -> Self {
        self.ontology = Some(ontology);
        self
    }

    /// Enables labels along named GeoJSON lines. Enabled by default.
    pub fn with_line_labels(mut self, enabled: bool) -> Self {
        self.line_labels = enabled;
        self
    }

    /// Sets the style, so the map can be rendered right away.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Consumes the builder and creates a map.
    pub fn build(self) -> Result<Map, GisError> {
        let zoom = validate_zoom(self.zoom as i64)?;

        let bbox = match &self.extent {
            Some(name) => Extents::fetch(name)?,
            None => self.bbox,
        };
        let bbox = match self.crs {
            Some(crs) => normalize_bbox(&bbox, crs)?,
            None => bbox,
        };

        let bbox = match self.viewport {
            Some((width, height)) if !self.fitted_bbox => {
                viewport_bbox(&bbox, zoom, width, height)?
            }
            Some((width, height)) => {
                if width == 0 || height == 0 {
                    return Err(GisError::InvalidViewport(format!(
                        "viewport must be at least 1x1 pixels, got {width}x{height}"
                    )));
                }
                bbox
            }
            None => bbox,
        };

        let tile_source = match self.tile_source {
            Some(source) => {
                if self.tile_cache_dir.is_some() || self.offline {
                    log::warn!("Tile cache and offline settings are ignored for a custom tile source");
                }
                source
            }
            None => {
                let cache = self.tile_cache_dir.map(TileCache::new).transpose()?;
                let mut source = RestTileSource::new(cache)?;
                source.set_offline_mode(self.offline);
                Box::new(source)
            }
        };

        let ontology = match self.ontology {
            Some(ontology) => ontology,
            None => Ontology::builtin()?,
        };

        Ok(Map {
            bbox,
            zoom,
            viewport: self.viewport,
            basemap: self.basemap,
            tile_source,
            ontology,
            fonts: self.font_catalog.unwrap_or_else(FontCatalog::system),
            line_labels: self.line_labels,
            used_labels: HashSet::new(),
            layers: LayerBuckets::new(),
            polygons_layers: vec![],
            lines_layers: vec![],
            points_layers: vec![],
            legend: None,
            style: self.style,
            image: None,
        })
    }
}

/// Bounding box with both corners converted from `crs` into lon/lat.
fn normalize_bbox(bbox: &BBox, crs: Crs) -> Result<BBox, GisError> {
    let normalizer = CrsNormalizer::new(crs);
    let a = normalizer.normalize(bbox.min_lon(), bbox.min_lat())?;
    let b = normalizer.normalize(bbox.max_lon(), bbox.max_lat())?;

    Ok(BBox::new(
        a.lon().min(b.lon()),
        a.lat().min(b.lat()),
        a.lon().max(b.lon()),
        a.lat().max(b.lat()),
    )?)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;

    use super::*;
    use crate::tests::{temp_dir, MemoryTileSource};

    fn bbox() -> BBox {
        BBox::new(-58.55, -34.75, -58.35, -34.55).unwrap()
    }

    fn builder() -> MapBuilder {
        MapBuilder::new(bbox(), 12)
            .with_tile_source(MemoryTileSource::default())
            .with_font_catalog(FontCatalog::empty())
    }

    #[test]
    fn tile_mode_keeps_bbox() {
        let map = builder().build().unwrap();
        assert_eq!(map.bbox(), bbox());
        assert_eq!(map.viewport(), None);
        assert_eq!(map.basemap(), &BasemapProvider::CartoLight);
    }

    #[test]
    fn viewport_refits_bbox() {
        let map = builder().with_viewport(800, 600).build().unwrap();
        assert_ne!(map.bbox(), bbox());
        assert_abs_diff_eq!(map.bbox().center().lon(), bbox().center().lon(), epsilon = 1e-9);

        let fitted = builder()
            .with_viewport(800, 600)
            .with_fitted_bbox(true)
            .build()
            .unwrap();
        assert_eq!(fitted.bbox(), bbox());
    }

    #[test]
    fn invalid_settings() {
        assert_matches!(builder().with_zoom(31).build(), Err(GisError::InvalidZoom(31)));
        assert_matches!(
            builder().with_viewport(0, 600).build(),
            Err(GisError::InvalidViewport(_))
        );
        assert_matches!(
            builder().with_viewport(0, 600).with_fitted_bbox(true).build(),
            Err(GisError::InvalidViewport(_))
        );
        assert_matches!(
            builder().with_extent("atlantis").build(),
            Err(GisError::InvalidBBox(_))
        );
    }

    #[test]
    fn map_debug_skips_sources() {
        let map = builder().build().unwrap();
        let debug = format!("{map:?}");
        assert!(debug.starts_with("Map {"), "{debug}");
        assert!(debug.contains("zoom: 12"), "{debug}");
        assert!(debug.ends_with(", .. }"), "{debug}");
    }

    #[test]
    fn named_extent() {
        let map = builder().with_extent("argentina").build().unwrap();
        assert_eq!(map.bbox().to_array(), [-73.6, -55.1, -53.6, -21.8]);
    }

    #[test]
    fn bbox_in_other_crs() {
        // lat, lon axis order
        let swapped = BBox::new(-34.75, -58.55, -34.55, -58.35).unwrap();
        let map = MapBuilder::new(swapped, 12)
            .with_crs(Crs::Epsg4326)
            .with_tile_source(MemoryTileSource::default())
            .with_font_catalog(FontCatalog::empty())
            .build()
            .unwrap();

        let expected = bbox().to_array();
        for (actual, expected) in map.bbox().to_array().into_iter().zip(expected) {
            assert_abs_diff_eq!(actual, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn default_source_with_cache() {
        let dir = temp_dir("builder-cache").join("tiles");
        let map = MapBuilder::new(bbox(), 12)
            .with_tile_cache(&dir)
            .with_offline_mode(true)
            .with_font_catalog(FontCatalog::empty())
            .build()
            .unwrap();

        assert!(dir.is_dir());
        assert_eq!(map.zoom(), 12);
    }
}
