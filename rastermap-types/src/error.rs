//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GisTypesError {
    /// Bounding box is not `[min_lon, min_lat, max_lon, max_lat]` with `min < max`.
    #[error("invalid bounding box: {0}")]
    InvalidBBox(String),
    /// Coordinate reference system identifier is not recognized.
    #[error("unsupported CRS: {0}")]
    UnsupportedCrs(String),
    /// Geometry is missing the coordinate structure its type requires.
    #[error("malformed geometry: {0}")]
    MalformedGeometry(String),
}
