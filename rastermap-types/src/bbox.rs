use serde::{Deserialize, Serialize};

use crate::error::GisTypesError;
use crate::point::GeoPoint;

/// Bounding box in WGS84 degrees: `[min_lon, min_lat, max_lon, max_lat]`.
///
/// A box can only be constructed with finite values and `min < max` on both axes.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
}

impl BBox {
    /// Creates a new bounding box, validating its extent.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, GisTypesError> {
        let values = [min_lon, min_lat, max_lon, max_lat];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GisTypesError::InvalidBBox(format!(
                "non-finite value in {values:?}"
            )));
        }
        if min_lon >= max_lon || min_lat >= max_lat {
            return Err(GisTypesError::InvalidBBox(format!(
                "expected [min_lon, min_lat, max_lon, max_lat] with min < max, got {values:?}"
            )));
        }

        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// Creates a bounding box from a slice that must contain exactly 4 values.
    pub fn from_slice(values: &[f64]) -> Result<Self, GisTypesError> {
        match values {
            [min_lon, min_lat, max_lon, max_lat] => {
                Self::new(*min_lon, *min_lat, *max_lon, *max_lat)
            }
            _ => Err(GisTypesError::InvalidBBox(format!(
                "expected 4 values, got {}",
                values.len()
            ))),
        }
    }

    /// Smallest box containing all the given points. Returns `None` if there are no points or
    /// the points are degenerate on one of the axes.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (mut min_lon, mut min_lat) = (first.lon(), first.lat());
        let (mut max_lon, mut max_lat) = (min_lon, min_lat);

        for p in points {
            min_lon = min_lon.min(p.lon());
            min_lat = min_lat.min(p.lat());
            max_lon = max_lon.max(p.lon());
            max_lat = max_lat.max(p.lat());
        }

        Self::new(min_lon, min_lat, max_lon, max_lat).ok()
    }

    /// Box of roughly `radius_km` around a point, using a spherical approximation of
    /// 111 km per degree.
    pub fn around_point(lon: f64, lat: f64, radius_km: f64) -> Result<Self, GisTypesError> {
        let delta_lat = radius_km / 111.0;
        let delta_lon = radius_km / (111.0 * lat.to_radians().cos());

        Self::new(
            lon - delta_lon,
            lat - delta_lat,
            lon + delta_lon,
            lat + delta_lat,
        )
    }

    /// Western edge.
    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }

    /// Southern edge.
    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    /// Eastern edge.
    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }

    /// Northern edge.
    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Arithmetic center of the box.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// North-west corner.
    pub fn north_west(&self) -> GeoPoint {
        GeoPoint::new(self.min_lon, self.max_lat)
    }

    /// South-east corner.
    pub fn south_east(&self) -> GeoPoint {
        GeoPoint::new(self.max_lon, self.min_lat)
    }

    /// Returns true if the point lies inside the box or on its border.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.min_lon <= point.lon()
            && self.max_lon >= point.lon()
            && self.min_lat <= point.lat()
            && self.max_lat >= point.lat()
    }

    /// Smallest box containing both `self` and `other`.
    pub fn merge(&self, other: Self) -> Self {
        Self {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    /// Values as `[min_lon, min_lat, max_lon, max_lat]`.
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }
}

impl TryFrom<[f64; 4]> for BBox {
    type Error = GisTypesError;

    fn try_from(value: [f64; 4]) -> Result<Self, Self::Error> {
        Self::new(value[0], value[1], value[2], value[3])
    }
}

impl TryFrom<Vec<f64>> for BBox {
    type Error = GisTypesError;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_slice(&value)
    }
}

impl From<BBox> for [f64; 4] {
    fn from(value: BBox) -> Self {
        value.to_array()
    }
}
