//! Fitting bounding boxes to images and projecting coordinates onto the canvas.

use rastermap_types::projection::{from_global_px, to_global_px};
use rastermap_types::{BBox, GeoPoint};

use crate::error::GisError;
use crate::feature::Feature;
use crate::render::PixelPoint;
use crate::tile_grid::TileGrid;

const MIN_FIT_SPAN_PX: f64 = 1.0;

/// Bounding box that exactly fills a `width × height` image at `zoom`, centered on the center of
/// `bbox`.
///
/// Only the center of `bbox` is used: its extent is replaced by the image extent.
pub fn viewport_bbox(bbox: &BBox, zoom: u32, width: u32, height: u32) -> Result<BBox, GisError> {
    check_viewport(width, height)?;

    let (center_x, center_y) = to_global_px(bbox.center(), zoom);
    let half_w = width as f64 / 2.0;
    let half_h = height as f64 / 2.0;

    pixel_box_to_bbox(
        center_x - half_w,
        center_y - half_h,
        center_x + half_w,
        center_y + half_h,
        zoom,
    )
}

/// Bounding box enclosing all `points` with `padding_px` pixels of margin, grown along its
/// shorter axis to the `width / height` aspect ratio.
///
/// The box is only ever enlarged, so every point stays inside the image.
pub fn bbox_for_image<'a>(
    points: impl IntoIterator<Item = &'a GeoPoint>,
    zoom: u32,
    width: u32,
    height: u32,
    padding_px: f64,
) -> Result<BBox, GisError> {
    check_viewport(width, height)?;

    let mut points = points.into_iter().map(|p| to_global_px(*p, zoom));
    let Some((x, y)) = points.next() else {
        return Err(GisError::InvalidBBox("no coordinates to fit".into()));
    };

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (x, y, x, y);
    for (x, y) in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    min_x -= padding_px;
    min_y -= padding_px;
    max_x += padding_px;
    max_y += padding_px;

    // A single point or a straight row of points still gets a box of at least a pixel.
    let grow_x = (MIN_FIT_SPAN_PX - (max_x - min_x)).max(0.0) / 2.0;
    let grow_y = (MIN_FIT_SPAN_PX - (max_y - min_y)).max(0.0) / 2.0;
    min_x -= grow_x;
    max_x += grow_x;
    min_y -= grow_y;
    max_y += grow_y;

    let target_ratio = width as f64 / height as f64;
    let box_w = max_x - min_x;
    let box_h = max_y - min_y;

    if box_w / box_h > target_ratio {
        let delta = (box_w / target_ratio - box_h) / 2.0;
        min_y -= delta;
        max_y += delta;
    } else {
        let delta = (box_h * target_ratio - box_w) / 2.0;
        min_x -= delta;
        max_x += delta;
    }

    pixel_box_to_bbox(min_x, min_y, max_x, max_y, zoom)
}

/// [`bbox_for_image`] over every coordinate of the given features.
pub fn bbox_for_features(
    features: &[Feature],
    zoom: u32,
    width: u32,
    height: u32,
    padding_px: f64,
) -> Result<BBox, GisError> {
    bbox_for_image(
        features.iter().flat_map(|f| f.geometry().iter_points()),
        zoom,
        width,
        height,
        padding_px,
    )
}

fn check_viewport(width: u32, height: u32) -> Result<(), GisError> {
    if width == 0 || height == 0 {
        return Err(GisError::InvalidViewport(format!(
            "viewport must be at least 1x1 pixels, got {width}x{height}"
        )));
    }

    Ok(())
}

fn pixel_box_to_bbox(
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    zoom: u32,
) -> Result<BBox, GisError> {
    let north_west = from_global_px(min_x, min_y, zoom);
    let south_east = from_global_px(max_x, max_y, zoom);

    Ok(BBox::new(
        north_west.lon(),
        south_east.lat(),
        south_east.lon(),
        north_west.lat(),
    )?)
}

/// Maps lon/lat to canvas pixels: global pixel position minus the canvas origin, rounded.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PixelProjector {
    origin_x: f64,
    origin_y: f64,
    zoom: u32,
}

impl PixelProjector {
    /// Creates a projector with the given global pixel origin.
    pub fn new(origin_x: f64, origin_y: f64, zoom: u32) -> Self {
        Self {
            origin_x,
            origin_y,
            zoom,
        }
    }

    /// Projector for a canvas holding the whole tile grid.
    pub fn for_tiles(grid: &TileGrid) -> Self {
        let (origin_x, origin_y) = grid.origin();
        Self::new(origin_x, origin_y, grid.zoom())
    }

    /// Projector for a canvas whose top-left corner is the north-west corner of `bbox`.
    pub fn for_viewport(bbox: &BBox, zoom: u32) -> Self {
        let (origin_x, origin_y) = to_global_px(bbox.north_west(), zoom);
        Self::new(origin_x, origin_y, zoom)
    }

    /// Zoom level of the projection.
    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Global pixel coordinates of the canvas top-left corner.
    pub fn origin(&self) -> (f64, f64) {
        (self.origin_x, self.origin_y)
    }

    /// Canvas position of a point, rounded to whole pixels but not limited to the `i32` range.
    ///
    /// Geometry is clipped in these coordinates before it is converted to [`PixelPoint`]s, so
    /// features far outside the canvas at deep zoom levels keep their shape.
    pub fn position(&self, point: GeoPoint) -> (f64, f64) {
        let (x, y) = to_global_px(point, self.zoom);
        (
            (x - self.origin_x).round(),
            (y - self.origin_y).round(),
        )
    }

    /// Canvas position of a point. See [`PixelPoint::from_position`] for positions far away
    /// from the canvas.
    pub fn project(&self, point: GeoPoint) -> PixelPoint {
        PixelPoint::from_position(self.position(point))
    }

    /// Canvas position of a global pixel position.
    pub fn project_global(&self, x: f64, y: f64) -> PixelPoint {
        PixelPoint::from_position((x - self.origin_x, y - self.origin_y))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use rastermap_types::lonlat;

    use super::*;

    fn pixel_span(bbox: &BBox, zoom: u32) -> (f64, f64) {
        let (x1, y1) = to_global_px(bbox.north_west(), zoom);
        let (x2, y2) = to_global_px(bbox.south_east(), zoom);
        (x2 - x1, y2 - y1)
    }

    #[test]
    fn viewport_spans_requested_pixels() {
        let bbox = BBox::new(-58.53, -34.71, -58.33, -34.53).unwrap();
        for (zoom, width, height) in [(10, 800, 600), (13, 1024, 1024), (16, 300, 900)] {
            let fitted = viewport_bbox(&bbox, zoom, width, height).unwrap();
            let (w, h) = pixel_span(&fitted, zoom);
            assert_abs_diff_eq!(w, width as f64, epsilon = 1.0);
            assert_abs_diff_eq!(h, height as f64, epsilon = 1.0);
        }
    }

    #[test]
    fn viewport_keeps_center() {
        let bbox = BBox::new(-60.6, -31.8, -60.5, -31.7).unwrap();
        let fitted = viewport_bbox(&bbox, 12, 640, 480).unwrap();
        assert_abs_diff_eq!(fitted.center().lon(), -60.55, epsilon = 1e-9);
        assert_abs_diff_eq!(fitted.center().lat(), -31.75, epsilon = 0.01);
    }

    #[test]
    fn empty_viewport_rejected() {
        let bbox = BBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
        assert_matches!(viewport_bbox(&bbox, 3, 0, 10), Err(GisError::InvalidViewport(_)));
    }

    #[test]
    fn image_fit_grows_short_axis() {
        let points = [lonlat!(-58.40, -34.60), lonlat!(-58.38, -34.61)];
        let zoom = 14;
        let fitted = bbox_for_image(&points, zoom, 800, 800, 20.0).unwrap();
        let (w, h) = pixel_span(&fitted, zoom);
        assert_abs_diff_eq!(w, h, epsilon = 1e-6);

        for point in &points {
            assert!(fitted.contains(point));
        }

        let (px0, _) = to_global_px(points[0], zoom);
        let (px1, _) = to_global_px(points[1], zoom);
        assert_abs_diff_eq!(w, px1 - px0 + 40.0, epsilon = 1e-6);
    }

    #[test]
    fn image_fit_single_point() {
        let points = [lonlat!(10.0, 50.0)];
        let fitted = bbox_for_image(&points, 10, 400, 200, 10.0).unwrap();
        let (w, h) = pixel_span(&fitted, 10);
        assert_abs_diff_eq!(w, 40.0, epsilon = 1e-6);
        assert_abs_diff_eq!(h, 20.0, epsilon = 1e-6);
    }

    #[test]
    fn image_fit_single_point_without_padding() {
        let point = lonlat!(-60.55, -31.75);
        let fitted = bbox_for_image([&point], 15, 400, 200, 0.0).unwrap();
        let (w, h) = pixel_span(&fitted, 15);
        assert!(h >= 1.0 - 1e-6, "{h}");
        assert_abs_diff_eq!(w, 2.0 * h, epsilon = 1e-6);
        assert!(fitted.contains(&point));

        let row = [lonlat!(-60.56, -31.75), lonlat!(-60.54, -31.75)];
        let fitted = bbox_for_image(&row, 15, 100, 100, 0.0).unwrap();
        let (w, h) = pixel_span(&fitted, 15);
        assert_abs_diff_eq!(w, h, epsilon = 1e-6);
    }

    #[test]
    fn image_fit_needs_points() {
        let points: [GeoPoint; 0] = [];
        assert_matches!(
            bbox_for_image(&points, 10, 400, 200, 10.0),
            Err(GisError::InvalidBBox(_))
        );
    }

    #[test]
    fn projector_origins() {
        let bbox = BBox::new(-60.6, -31.8, -60.5, -31.7).unwrap();
        let grid = TileGrid::for_bbox(&bbox, 15);
        let tiles = PixelProjector::for_tiles(&grid);
        assert_eq!(tiles.project_global(10868.0 * 256.0, 19428.0 * 256.0), PixelPoint::new(0, 0));

        let viewport = PixelProjector::for_viewport(&bbox, 15);
        assert_eq!(viewport.project(bbox.north_west()), PixelPoint::new(0, 0));
        let south_east = viewport.project(bbox.south_east());
        assert!(south_east.x > 0 && south_east.y > 0);
    }

    #[test]
    fn far_points_at_deep_zoom() {
        let bbox = BBox::new(-60.56, -31.76, -60.54, -31.74).unwrap();
        let projector = PixelProjector::for_viewport(&bbox, 30);

        let (x, _) = projector.position(lonlat!(179.0, -31.75));
        assert!(x > i32::MAX as f64);

        let far_east = projector.project(lonlat!(179.0, -31.75));
        let far_west = projector.project(lonlat!(-179.0, -31.75));
        assert!(far_east.x > 0 && far_east.x < i32::MAX / 2);
        assert!(far_west.x < 0 && far_west.x > i32::MIN / 2);
    }
}
