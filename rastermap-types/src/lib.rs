//! Geographic primitives used by `rastermap`.
//!
//! The crate is deliberately free of rendering concerns. It contains:
//!
//! * [`BBox`] and [`GeoPoint`], the WGS84 building blocks every other module works with,
//! * [`Geom`], the tagged union of supported geometry types,
//! * [`projection`], Web Mercator math between lon/lat, global pixels and tile indices,
//! * [`geo`], coordinate reference system identifiers and the normalizer that turns input
//!   coordinates into `[lon, lat]` degrees.

pub mod bbox;
pub mod error;
pub mod geo;
pub mod geometry;
pub mod point;
pub mod projection;

#[cfg(feature = "geojson")]
pub mod geojson;

pub use bbox::BBox;
pub use error::GisTypesError;
pub use geometry::{Geom, GeometryType, Ring};
pub use point::GeoPoint;
