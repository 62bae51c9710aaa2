use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::GisTypesError;
use crate::geo::gauss_kruger::GaussKruger;
use crate::point::GeoPoint;
use crate::projection::mercator_to_lonlat;

/// Coordinate reference system of input coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[non_exhaustive]
pub enum Crs {
    /// OGC CRS84: longitude, latitude in degrees. Also used when no CRS is specified.
    #[default]
    Crs84,
    /// EPSG:4326: latitude, longitude in degrees (axis order swapped relative to CRS84).
    Epsg4326,
    /// EPSG:3857: spherical Web Mercator, meters.
    Epsg3857,
    /// Gauss-Krüger Argentina (POSGAR), zone `1..=7`, easting/northing in meters.
    GaussKrugerArgentina(u8),
}

impl Crs {
    /// OGC URN of CRS84.
    pub const CRS84_URN: &'static str = "urn:ogc:def:crs:OGC:1.3:CRS84";

    /// Parses a CRS identifier as found in GeoJSON `crs.properties.name` members.
    ///
    /// Accepts plain `EPSG:<code>` identifiers as well as `urn:ogc:def:crs:EPSG::<code>` URNs.
    pub fn from_name(name: &str) -> Result<Self, GisTypesError> {
        let trimmed = name.trim();
        let upper = trimmed.to_ascii_uppercase();

        if upper == Self::CRS84_URN.to_ascii_uppercase()
            || upper == "CRS84"
            || upper == "OGC:CRS84"
            || upper == "URN:OGC:DEF:CRS:OGC::CRS84"
        {
            return Ok(Crs::Crs84);
        }

        let code = upper
            .strip_prefix("URN:OGC:DEF:CRS:EPSG::")
            .or_else(|| upper.strip_prefix("URN:OGC:DEF:CRS:EPSG:"))
            .or_else(|| upper.strip_prefix("EPSG:"))
            .and_then(|code| code.parse::<u32>().ok())
            .ok_or_else(|| GisTypesError::UnsupportedCrs(trimmed.to_string()))?;

        match code {
            4326 => Ok(Crs::Epsg4326),
            3857 | 900913 => Ok(Crs::Epsg3857),
            22191..=22197 => Ok(Crs::GaussKrugerArgentina((code - 22190) as u8)),
            _ => Err(GisTypesError::UnsupportedCrs(trimmed.to_string())),
        }
    }

    /// Resolves an optional identifier; `None` means CRS84.
    pub fn from_optional_name(name: Option<&str>) -> Result<Self, GisTypesError> {
        match name {
            Some(name) => Self::from_name(name),
            None => Ok(Crs::Crs84),
        }
    }
}

impl FromStr for Crs {
    type Err = GisTypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl Display for Crs {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Crs::Crs84 => f.write_str(Self::CRS84_URN),
            Crs::Epsg4326 => f.write_str("EPSG:4326"),
            Crs::Epsg3857 => f.write_str("EPSG:3857"),
            Crs::GaussKrugerArgentina(zone) => write!(f, "EPSG:{}", 22190 + *zone as u32),
        }
    }
}

/// Converts coordinate pairs in a given [`Crs`] into `[lon, lat]` degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CrsNormalizer {
    crs: Crs,
    gauss_kruger: Option<GaussKruger>,
}

impl CrsNormalizer {
    /// Creates a normalizer for the given CRS.
    pub fn new(crs: Crs) -> Self {
        let gauss_kruger = match crs {
            Crs::GaussKrugerArgentina(zone) => GaussKruger::argentina_zone(zone),
            _ => None,
        };

        Self { crs, gauss_kruger }
    }

    /// Creates a normalizer from a CRS identifier. `None` means CRS84.
    pub fn from_name(name: Option<&str>) -> Result<Self, GisTypesError> {
        Ok(Self::new(Crs::from_optional_name(name)?))
    }

    /// The input CRS.
    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// Normalizes a coordinate pair. The meaning of `first` and `second` depends on the CRS
    /// (e.g. latitude first for EPSG:4326, easting first for projected systems).
    pub fn normalize(&self, first: f64, second: f64) -> Result<GeoPoint, GisTypesError> {
        if !first.is_finite() || !second.is_finite() {
            return Err(GisTypesError::MalformedGeometry(format!(
                "non-finite coordinate ({first}, {second})"
            )));
        }

        let point = match self.crs {
            Crs::Crs84 => GeoPoint::new(first, second),
            Crs::Epsg4326 => GeoPoint::new(second, first),
            Crs::Epsg3857 => mercator_to_lonlat(first, second),
            Crs::GaussKrugerArgentina(zone) => self
                .gauss_kruger
                .ok_or_else(|| GisTypesError::UnsupportedCrs(format!("Gauss-Krüger zone {zone}")))?
                .unproject(first, second),
        };

        Ok(point)
    }

    /// Normalizes a position given as a slice, ignoring any ordinate after the second one.
    pub fn normalize_position(&self, position: &[f64]) -> Result<GeoPoint, GisTypesError> {
        match position {
            [first, second, ..] => self.normalize(*first, *second),
            _ => Err(GisTypesError::MalformedGeometry(format!(
                "position must have at least 2 ordinates, got {}",
                position.len()
            ))),
        }
    }
}
