//! Raster basemaps: tile providers and the machinery that loads their tiles.

mod file_cache;
mod provider;
mod source;

pub use file_cache::{TileCache, TileFormat};
pub use provider::{BasemapProvider, DEFAULT_TIME};
pub use source::{RestTileSource, TileSource};
