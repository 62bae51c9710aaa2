//! Rastermap renders geographic vector data over raster basemap tiles into a single image.
//!
//! # Quick start
//!
//! ```no_run
//! use rastermap::{BasemapProvider, MapBuilder, Style};
//! use rastermap::rastermap_types::BBox;
//!
//! let mut map = MapBuilder::new(BBox::new(-60.75, -33.02, -60.62, -32.90)?, 14)
//!     .with_basemap(BasemapProvider::Osm)
//!     .with_viewport(1024, 768)
//!     .with_tile_cache("target/tiles")
//!     .build()?;
//!
//! map.add_geojson_file("rosario.geojson")?;
//! map.set_style(Style::light());
//! map.render()?.to_image().save("rosario.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # How a map is rendered
//!
//! * The [`TileGrid`](tile_grid::TileGrid) covering the map area is fetched from a
//!   [`TileSource`](basemap::TileSource), by default over HTTP with an optional file cache, and
//!   composited on the canvas. Without a viewport the image is the whole tile grid, with one it is
//!   exactly the requested size.
//! * GeoJSON features are converted from their CRS into lon/lat, classified by the
//!   [`Ontology`](ontology::Ontology) and painted layer by layer in the order given by the
//!   [`Style`].
//! * Overlays added through the [`Map`] API come next: polygons, lines and points, and the
//!   [`Legend`](legend::Legend) last.
//!
//! All drawing goes through the [`Canvas`](render::Canvas) trait. The built-in
//! [`ImageCanvas`](render::ImageCanvas) rasterizes with `tiny-skia` and shapes labels with
//! `rustybuzz`, falling back to a font bundled with the crate when no other font is found.

pub mod basemap;
mod color;
pub mod decoded_image;
pub mod error;
pub mod extents;
pub mod feature;
pub mod font;
pub mod layer;
pub mod legend;
pub mod map;
pub mod ontology;
pub mod render;
pub mod style;
pub mod tile_grid;
pub mod viewport;

#[cfg(test)]
pub(crate) mod tests;

pub use basemap::BasemapProvider;
pub use color::Color;
pub use error::GisError;
pub use map::{Map, MapBuilder, MapOptions};
pub use style::Style;

// Reexport rastermap_types
pub use rastermap_types;
