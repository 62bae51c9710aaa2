/// Reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datum {
    semimajor: f64,
    inv_flattening: f64,
}

impl Datum {
    /// WGS84 ellipsoid.
    pub const WGS84: Self = Datum {
        semimajor: 6_378_137.0,
        inv_flattening: 298.257223563,
    };

    /// Semi-major axis in meters.
    pub fn semimajor(&self) -> f64 {
        self.semimajor
    }

    /// Inverse flattening `1/f`.
    pub fn inv_flattening(&self) -> f64 {
        self.inv_flattening
    }

    /// Flattening `f`.
    pub fn flattening(&self) -> f64 {
        1.0 / self.inv_flattening
    }

    /// First eccentricity squared: `e² = 2f - f²`.
    pub fn eccentricity_sq(&self) -> f64 {
        let f = self.flattening();
        2.0 * f - f * f
    }

    /// Second eccentricity squared: `e'² = e² / (1 - e²)`.
    pub fn second_eccentricity_sq(&self) -> f64 {
        let e2 = self.eccentricity_sq();
        e2 / (1.0 - e2)
    }
}

impl Default for Datum {
    fn default() -> Self {
        Self::WGS84
    }
}
