//! XYZ tile arithmetic: which tiles cover a bounding box and where each one lands on the canvas.

use std::fmt::{Display, Formatter};

use rastermap_types::projection::{lat_to_tile_y, lon_to_tile_x, TILE_SIZE};
use rastermap_types::BBox;

use crate::basemap::{BasemapProvider, TileSource};
use crate::decoded_image::DecodedImage;
use crate::error::GisError;
use crate::render::PixelPoint;

/// Largest zoom level accepted by the map.
pub const MAX_ZOOM: u32 = 30;

/// Checks that a zoom level is in `0..=MAX_ZOOM`.
pub fn validate_zoom(zoom: i64) -> Result<u32, GisError> {
    if (0..=MAX_ZOOM as i64).contains(&zoom) {
        Ok(zoom as u32)
    } else {
        Err(GisError::InvalidZoom(zoom))
    }
}

/// Index of a tile in the XYZ scheme (`y = 0` at the north edge).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileIndex {
    /// X index.
    pub x: u32,
    /// Y index.
    pub y: u32,
    /// Z index.
    pub z: u32,
}

impl TileIndex {
    /// Create a new index instance.
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

impl Display for TileIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// A fetched tile. Tiles are never modified after loading.
#[derive(Debug, Clone)]
pub struct Tile {
    /// Index of the tile.
    pub index: TileIndex,
    /// Decoded tile image.
    pub image: DecodedImage,
}

/// Closed rectangle of tiles `[x_min, x_max] × [y_min, y_max]` covering a bounding box.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TileGrid {
    x_min: u32,
    x_max: u32,
    y_min: u32,
    y_max: u32,
    zoom: u32,
}

impl TileGrid {
    /// Tiles covering `bbox` at `zoom`.
    ///
    /// The north edge of the box gives the smallest `y`.
    pub fn for_bbox(bbox: &BBox, zoom: u32) -> Self {
        Self {
            x_min: lon_to_tile_x(bbox.min_lon(), zoom),
            x_max: lon_to_tile_x(bbox.max_lon(), zoom),
            y_min: lat_to_tile_y(bbox.max_lat(), zoom),
            y_max: lat_to_tile_y(bbox.min_lat(), zoom),
            zoom,
        }
    }

    /// Zoom level of the grid.
    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Number of tile columns.
    pub fn cols(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    /// Number of tile rows.
    pub fn rows(&self) -> u32 {
        self.y_max - self.y_min + 1
    }

    /// Global pixel coordinates of the top-left corner of the grid.
    pub fn origin(&self) -> (f64, f64) {
        (
            self.x_min as f64 * TILE_SIZE as f64,
            self.y_min as f64 * TILE_SIZE as f64,
        )
    }

    /// Size of the canvas that holds every tile of the grid.
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.cols() * TILE_SIZE, self.rows() * TILE_SIZE)
    }

    /// Tile indices in row-major order, north to south and west to east.
    pub fn indices(&self) -> impl Iterator<Item = TileIndex> + '_ {
        (self.y_min..=self.y_max)
            .flat_map(move |y| (self.x_min..=self.x_max).map(move |x| TileIndex::new(x, y, self.zoom)))
    }

    /// Position of the tile's top-left pixel on a canvas of [`TileGrid::canvas_size`].
    pub fn tile_offset(&self, index: TileIndex) -> PixelPoint {
        PixelPoint::new(
            ((index.x as i64 - self.x_min as i64) * TILE_SIZE as i64) as i32,
            ((index.y as i64 - self.y_min as i64) * TILE_SIZE as i64) as i32,
        )
    }

    /// Loads every tile of the grid from `source`.
    ///
    /// The first failure aborts the whole fetch.
    pub fn fetch(
        &self,
        source: &dyn TileSource,
        provider: &BasemapProvider,
    ) -> Result<Vec<Tile>, GisError> {
        log::debug!(
            "Fetching {}x{} tiles of {provider} at zoom {}",
            self.cols(),
            self.rows(),
            self.zoom
        );

        self.indices()
            .map(|index| {
                Ok(Tile {
                    index,
                    image: source.load(provider, index)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::tests::MemoryTileSource;

    fn scenario_bbox() -> BBox {
        BBox::new(-60.6, -31.8, -60.5, -31.7).unwrap()
    }

    #[test]
    fn zoom_validation() {
        assert_eq!(validate_zoom(0).unwrap(), 0);
        assert_eq!(validate_zoom(30).unwrap(), 30);
        assert_matches!(validate_zoom(-1), Err(GisError::InvalidZoom(-1)));
        assert_matches!(validate_zoom(31), Err(GisError::InvalidZoom(31)));
    }

    #[test]
    fn grid_for_bbox() {
        let grid = TileGrid::for_bbox(&scenario_bbox(), 15);
        assert_eq!(grid.cols(), 10);
        assert_eq!(grid.rows(), 12);
        assert_eq!(grid.origin(), (10868.0 * 256.0, 19428.0 * 256.0));
        assert_eq!(grid.canvas_size(), (2560, 3072));
    }

    #[test]
    fn row_major_order() {
        let bbox = BBox::new(-1.0, -1.0, 1.0, 1.0).unwrap();
        let grid = TileGrid::for_bbox(&bbox, 1);
        let indices: Vec<_> = grid.indices().collect();
        assert_eq!(
            indices,
            vec![
                TileIndex::new(0, 0, 1),
                TileIndex::new(1, 0, 1),
                TileIndex::new(0, 1, 1),
                TileIndex::new(1, 1, 1),
            ]
        );
        assert_eq!(grid.tile_offset(TileIndex::new(1, 1, 1)), PixelPoint::new(256, 256));
    }

    #[test]
    fn whole_world_stays_on_grid() {
        let bbox = BBox::new(-180.0, -85.06, 180.0, 85.06).unwrap();
        let grid = TileGrid::for_bbox(&bbox, 2);
        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.rows(), 4);
    }

    #[test]
    fn fetch_loads_every_tile() {
        let source = MemoryTileSource::default();
        let grid = TileGrid::for_bbox(&BBox::new(-1.0, -1.0, 1.0, 1.0).unwrap(), 1);
        let tiles = grid.fetch(&source, &BasemapProvider::Osm).unwrap();
        assert_eq!(tiles.len(), 4);
        assert_eq!(source.requests().len(), 4);
    }

    #[test]
    fn fetch_fails_on_first_error() {
        let source = MemoryTileSource::default().failing_on(TileIndex::new(1, 0, 1));
        let grid = TileGrid::for_bbox(&BBox::new(-1.0, -1.0, 1.0, 1.0).unwrap(), 1);
        assert_matches!(
            grid.fetch(&source, &BasemapProvider::Osm),
            Err(GisError::TileFetchFailure { index, .. }) if index == TileIndex::new(1, 0, 1)
        );
        assert_eq!(source.requests().len(), 2);
    }
}
