//! Error types used by the crate.

use rastermap_types::GisTypesError;
use thiserror::Error;

use crate::tile_grid::TileIndex;

/// Rastermap error type.
///
/// Every error aborts the operation that detected it. The map never recovers from a lower level
/// failure, so a failed render produces no image.
#[derive(Debug, Error)]
pub enum GisError {
    /// Bounding box is not `[min_lon, min_lat, max_lon, max_lat]` with `min < max`, or a named
    /// extent is unknown.
    #[error("invalid bounding box: {0}")]
    InvalidBBox(String),
    /// Zoom level is negative or too large.
    #[error("invalid zoom level: {0}")]
    InvalidZoom(i64),
    /// Viewport width and height must be given together and be positive.
    #[error("invalid viewport: {0}")]
    InvalidViewport(String),
    /// Coordinate reference system identifier is not recognized.
    #[error("unsupported CRS: {0}")]
    UnsupportedCrs(String),
    /// Basemap provider identifier is not recognized.
    #[error("unsupported basemap provider: {0}")]
    UnsupportedBasemapProvider(String),
    /// A tile could not be downloaded or read from the cache.
    #[error("failed to fetch tile {index:?}: {reason}")]
    TileFetchFailure {
        /// Index of the tile.
        index: TileIndex,
        /// Description of the failure.
        reason: String,
    },
    /// Render was requested before a style was assigned to the map.
    #[error("map style must be set before rendering")]
    MissingStyle,
    /// Input geometry lacks the coordinate structure its type requires.
    #[error("malformed geometry: {0}")]
    MalformedGeometry(String),
    /// Style or ontology definition cannot be parsed.
    #[error("invalid style: {0}")]
    InvalidStyle(String),
    /// Map configuration document cannot be parsed.
    #[error("invalid map options: {0}")]
    InvalidOptions(String),
    /// HTTP client could not be initialized.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    /// Image decoding error.
    #[error("image decode error: {0:?}")]
    ImageDecode(#[from] image::ImageError),
    /// Error reading/writing data to the FS.
    #[error("failed to access file: {0}")]
    FsIo(#[from] std::io::Error),
}

impl From<GisTypesError> for GisError {
    fn from(value: GisTypesError) -> Self {
        match value {
            GisTypesError::InvalidBBox(msg) => Self::InvalidBBox(msg),
            GisTypesError::UnsupportedCrs(msg) => Self::UnsupportedCrs(msg),
            GisTypesError::MalformedGeometry(msg) => Self::MalformedGeometry(msg),
        }
    }
}

impl From<geojson::Error> for GisError {
    fn from(value: geojson::Error) -> Self {
        Self::MalformedGeometry(value.to_string())
    }
}
