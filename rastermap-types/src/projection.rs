//! Web Mercator math for the XYZ tiling scheme.
//!
//! Global pixel space at zoom `z` is a square of `256 * 2^z` pixels with `(0, 0)` at the
//! north-west corner (`lon = -180`, `lat = MAX_LAT`). Tile indices are global pixels divided by
//! [`TILE_SIZE`].

use std::f64::consts::PI;

use crate::point::GeoPoint;

/// Width and height of a single tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// Highest latitude representable in Web Mercator. Latitudes are clamped to `±MAX_LAT` before
/// projecting, since the projection diverges at the poles.
pub const MAX_LAT: f64 = 85.05112878;

/// Earth radius used by the spherical Web Mercator projection, in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

fn world_size(zoom: u32) -> f64 {
    TILE_SIZE as f64 * 2f64.powi(zoom as i32)
}

/// Number of tiles along one axis at the given zoom.
pub fn tiles_per_axis(zoom: u32) -> u32 {
    1u32 << zoom.min(31)
}

/// Longitude to global pixel X.
pub fn lon_to_global_x(lon: f64, zoom: u32) -> f64 {
    (lon + 180.0) / 360.0 * world_size(zoom)
}

/// Latitude to global pixel Y. The latitude is clamped to `±MAX_LAT` first.
pub fn lat_to_global_y(lat: f64, zoom: u32) -> f64 {
    let lat_rad = lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    let merc = (lat_rad.tan() + 1.0 / lat_rad.cos()).ln();
    (1.0 - merc / PI) / 2.0 * world_size(zoom)
}

/// Global pixel X to longitude.
pub fn global_x_to_lon(x: f64, zoom: u32) -> f64 {
    x / world_size(zoom) * 360.0 - 180.0
}

/// Global pixel Y to latitude.
pub fn global_y_to_lat(y: f64, zoom: u32) -> f64 {
    let n = PI * (1.0 - 2.0 * y / world_size(zoom));
    n.sinh().atan().to_degrees()
}

/// Projects a point into global pixel space.
pub fn to_global_px(point: GeoPoint, zoom: u32) -> (f64, f64) {
    (
        lon_to_global_x(point.lon(), zoom),
        lat_to_global_y(point.lat(), zoom),
    )
}

/// Unprojects a global pixel position.
pub fn from_global_px(x: f64, y: f64, zoom: u32) -> GeoPoint {
    GeoPoint::new(global_x_to_lon(x, zoom), global_y_to_lat(y, zoom))
}

/// Tile column containing the given longitude, clamped to the tile grid.
pub fn lon_to_tile_x(lon: f64, zoom: u32) -> u32 {
    clamp_tile(lon_to_global_x(lon, zoom) / TILE_SIZE as f64, zoom)
}

/// Tile row containing the given latitude, clamped to the tile grid. North maps to smaller rows.
pub fn lat_to_tile_y(lat: f64, zoom: u32) -> u32 {
    clamp_tile(lat_to_global_y(lat, zoom) / TILE_SIZE as f64, zoom)
}

fn clamp_tile(value: f64, zoom: u32) -> u32 {
    let max = (tiles_per_axis(zoom) - 1) as f64;
    value.floor().clamp(0.0, max) as u32
}

/// Longitude to Web Mercator X in meters.
pub fn mercator_x(lon: f64) -> f64 {
    lon.to_radians() * EARTH_RADIUS
}

/// Latitude to Web Mercator Y in meters.
pub fn mercator_y(lat: f64) -> f64 {
    (PI / 4.0 + lat.to_radians() / 2.0).tan().ln() * EARTH_RADIUS
}

/// Web Mercator meters to lon/lat degrees.
pub fn mercator_to_lonlat(x: f64, y: f64) -> GeoPoint {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
    GeoPoint::new(lon, lat)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn latitude_round_trip() {
        for zoom in 0..=18 {
            let mut lat = -MAX_LAT;
            while lat <= MAX_LAT {
                let y = lat_to_global_y(lat, zoom);
                assert_abs_diff_eq!(global_y_to_lat(y, zoom), lat, epsilon = 1e-6);
                lat += 0.731;
            }
        }
    }

    #[test]
    fn longitude_round_trip() {
        for zoom in [0, 3, 11, 18] {
            let mut lon = -180.0;
            while lon <= 180.0 {
                let x = lon_to_global_x(lon, zoom);
                assert_abs_diff_eq!(global_x_to_lon(x, zoom), lon, epsilon = 1e-9);
                lon += 1.25;
            }
        }
    }

    #[test]
    fn latitude_is_clamped() {
        let zoom = 4;
        assert!(lat_to_global_y(90.0, zoom).is_finite());
        assert_abs_diff_eq!(
            lat_to_global_y(90.0, zoom),
            lat_to_global_y(MAX_LAT, zoom),
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(lat_to_global_y(MAX_LAT, zoom), 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(
            lat_to_global_y(-MAX_LAT, zoom),
            world_size(zoom),
            epsilon = 1e-3
        );
    }

    #[test]
    fn equator_and_meridian_map_to_world_center() {
        assert_abs_diff_eq!(lon_to_global_x(0.0, 1), 256.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lat_to_global_y(0.0, 1), 256.0, epsilon = 1e-9);
    }

    #[test]
    fn tile_indices() {
        assert_eq!(lon_to_tile_x(-180.0, 3), 0);
        assert_eq!(lon_to_tile_x(0.0, 3), 4);
        assert_eq!(lon_to_tile_x(180.0, 3), 7);
        assert_eq!(lat_to_tile_y(MAX_LAT, 3), 0);
        assert_eq!(lat_to_tile_y(-89.0, 3), 7);

        assert_eq!(lon_to_tile_x(-60.6, 15), 10868);
        assert_eq!(lon_to_tile_x(-60.5, 15), 10877);
        assert_eq!(lat_to_tile_y(-31.7, 15), 19428);
        assert_eq!(lat_to_tile_y(-31.8, 15), 19439);
    }

    #[test]
    fn mercator_meters() {
        let point = mercator_to_lonlat(mercator_x(-58.3816), mercator_y(-34.6037));
        assert_abs_diff_eq!(point, GeoPoint::new(-58.3816, -34.6037), epsilon = 1e-9);
    }
}
