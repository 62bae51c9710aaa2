use std::path::{Path, PathBuf};

use rastermap_types::geo::Crs;
use rastermap_types::BBox;
use serde::{Deserialize, Serialize};

use super::MapBuilder;
use crate::basemap::BasemapProvider;
use crate::error::GisError;
use crate::extents::Extents;
use crate::tile_grid::validate_zoom;

/// Area of the map in a configuration file: explicit coordinates or an extent name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BBoxOption {
    /// `[min_lon, min_lat, max_lon, max_lat]`, in the configured CRS.
    Values(Vec<f64>),
    /// Name of a bundled extent.
    Extent(String),
}

/// Map configuration as read from a JSON document.
///
/// ```json
/// {
///     "bbox": [-58.55, -34.75, -58.35, -34.55],
///     "zoom": 12,
///     "basemap": "osm",
///     "width": 800,
///     "height": 600
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapOptions {
    /// Area of the map.
    pub bbox: BBoxOption,
    /// Zoom level.
    pub zoom: i64,
    /// Basemap provider id.
    #[serde(default)]
    pub basemap: Option<String>,
    /// Date of time-varying imagery, e.g. `"2024-01-15"`.
    #[serde(default)]
    pub time: Option<String>,
    /// Image width. Must be given together with `height`.
    #[serde(default)]
    pub width: Option<u32>,
    /// Image height. Must be given together with `width`.
    #[serde(default)]
    pub height: Option<u32>,
    /// CRS of `bbox` values.
    #[serde(default)]
    pub crs: Option<String>,
    /// Use `bbox` as is in viewport mode.
    #[serde(default)]
    pub fitted_bbox: bool,
    /// Folder for cached tiles.
    #[serde(default)]
    pub tile_cache_dir: Option<PathBuf>,
    /// Only use cached tiles.
    #[serde(default)]
    pub offline: bool,
}

impl MapOptions {
    /// Parses options from JSON.
    pub fn from_json(json: &str) -> Result<Self, GisError> {
        serde_json::from_str(json).map_err(|err| GisError::InvalidOptions(err.to_string()))
    }

    /// Loads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GisError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Validates the options and creates a builder with them.
    pub fn into_builder(self) -> Result<MapBuilder, GisError> {
        let zoom = validate_zoom(self.zoom)?;
        let bbox = match &self.bbox {
            BBoxOption::Values(values) => BBox::from_slice(values)?,
            BBoxOption::Extent(name) => Extents::fetch(name)?,
        };

        let mut builder = MapBuilder::new(bbox, zoom)
            .with_fitted_bbox(self.fitted_bbox)
            .with_offline_mode(self.offline);

        if let Some(id) = &self.basemap {
            let mut basemap = BasemapProvider::from_id(id)?;
            if let Some(time) = &self.time {
                basemap = basemap.with_time(time.clone());
            }
            builder = builder.with_basemap(basemap);
        }

        match (self.width, self.height) {
            (Some(width), Some(height)) => builder = builder.with_viewport(width, height),
            (None, None) => {}
            _ => {
                return Err(GisError::InvalidViewport(
                    "width and height must be provided together".into(),
                ))
            }
        }

        if let Some(crs) = &self.crs {
            builder = builder.with_crs(Crs::from_name(crs)?);
        }

        if let Some(dir) = self.tile_cache_dir {
            builder = builder.with_tile_cache(dir);
        }

        Ok(builder)
    }
}
