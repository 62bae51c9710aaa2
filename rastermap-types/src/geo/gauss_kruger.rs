use std::f64::consts::FRAC_PI_2;

use crate::geo::datum::Datum;
use crate::point::GeoPoint;

const FALSE_EASTING: f64 = 500_000.0;

/// Inverse Gauss-Krüger (transverse Mercator, scale 1) for the Argentine zones.
///
/// The northing is measured from the south pole, so the meridian arc between the equator and
/// latitude -90° is added to it before the footprint latitude is computed.
///
/// <div class="warning">
/// The series are truncated at a fixed order regardless of the distance from the central
/// meridian. Results are good to a few hundredths of a degree inside the zone and degrade
/// quickly for far-from-zone eastings. Use for visualization, never for geodesy.
/// </div>
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussKruger {
    datum: Datum,
    central_meridian: f64,
}

impl GaussKruger {
    /// Creates a projection with the given central meridian (degrees) on the WGS84 ellipsoid.
    pub fn new(central_meridian: f64) -> Self {
        Self {
            datum: Datum::WGS84,
            central_meridian,
        }
    }

    /// Projection for the Argentine zone `1..=7` (central meridian `-72 + 3 * (zone - 1)`).
    pub fn argentina_zone(zone: u8) -> Option<Self> {
        if (1..=7).contains(&zone) {
            Some(Self::new(-72.0 + 3.0 * (zone as f64 - 1.0)))
        } else {
            None
        }
    }

    /// Central meridian in degrees.
    pub fn central_meridian(&self) -> f64 {
        self.central_meridian
    }

    /// Converts easting/northing in meters into lon/lat degrees.
    pub fn unproject(&self, easting: f64, northing: f64) -> GeoPoint {
        let a = self.datum.semimajor();
        let e2 = self.datum.eccentricity_sq();
        let ep2 = self.datum.second_eccentricity_sq();

        let x = easting - FALSE_EASTING;
        let m = northing + self.meridian_arc(-FRAC_PI_2);

        let footprint = self.footprint_latitude(m);
        let (sin_fp, cos_fp) = footprint.sin_cos();
        let tan_fp = footprint.tan();

        let c1 = ep2 * cos_fp * cos_fp;
        let t1 = tan_fp * tan_fp;
        let w = 1.0 - e2 * sin_fp * sin_fp;
        let n1 = a / w.sqrt();
        let r1 = a * (1.0 - e2) / w.powf(1.5);
        let d = x / n1;

        let d2 = d * d;
        let d3 = d2 * d;
        let d4 = d2 * d2;
        let d5 = d4 * d;
        let d6 = d3 * d3;

        let lat = footprint
            - (n1 * tan_fp / r1)
                * (d2 / 2.0 - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d4 / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                        * d6
                        / 720.0);

        let lon = self.central_meridian.to_radians()
            + (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d5
                    / 120.0)
                / cos_fp;

        GeoPoint::new(lon.to_degrees(), lat.to_degrees())
    }

    /// Length of the meridian arc from the equator to the latitude `phi` (radians).
    fn meridian_arc(&self, phi: f64) -> f64 {
        let a = self.datum.semimajor();
        let e2 = self.datum.eccentricity_sq();
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        a * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }

    /// Latitude whose meridian arc equals `m`, from the rectifying latitude series.
    fn footprint_latitude(&self, m: f64) -> f64 {
        let a = self.datum.semimajor();
        let e2 = self.datum.eccentricity_sq();
        let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2 * e2 * e2 / 256.0));

        let root = (1.0 - e2).sqrt();
        let e1 = (1.0 - root) / (1.0 + root);

        let j1 = 3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0;
        let j2 = 21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0;
        let j3 = 151.0 * e1.powi(3) / 96.0;
        let j4 = 1097.0 * e1.powi(4) / 512.0;

        mu + j1 * (2.0 * mu).sin()
            + j2 * (4.0 * mu).sin()
            + j3 * (6.0 * mu).sin()
            + j4 * (8.0 * mu).sin()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn zone_meridians() {
        assert_eq!(GaussKruger::argentina_zone(1).unwrap().central_meridian(), -72.0);
        assert_eq!(GaussKruger::argentina_zone(5).unwrap().central_meridian(), -60.0);
        assert_eq!(GaussKruger::argentina_zone(7).unwrap().central_meridian(), -54.0);
        assert!(GaussKruger::argentina_zone(0).is_none());
        assert!(GaussKruger::argentina_zone(8).is_none());
    }

    #[test]
    fn meridian_arc_to_pole() {
        let gk = GaussKruger::new(0.0);
        assert_abs_diff_eq!(gk.meridian_arc(FRAC_PI_2), 10_001_965.7295, epsilon = 0.01);
        assert_abs_diff_eq!(gk.meridian_arc(0.0), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn central_meridian_reference() {
        let point = GaussKruger::argentina_zone(5)
            .unwrap()
            .unproject(500_000.0, 6_200_000.0);
        assert_abs_diff_eq!(point.lon(), -60.0, epsilon = 0.01);
        assert_abs_diff_eq!(point.lat(), -34.9, epsilon = 1.0);
        assert_abs_diff_eq!(point.lat(), -34.345, epsilon = 0.01);
    }

    #[test]
    fn easting_offset_moves_east() {
        let point = GaussKruger::argentina_zone(5)
            .unwrap()
            .unproject(600_000.0, 6_200_000.0);
        assert_abs_diff_eq!(point.lon(), -58.913, epsilon = 0.01);
        assert_abs_diff_eq!(point.lat(), -34.340, epsilon = 0.01);
    }
}
