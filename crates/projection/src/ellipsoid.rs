//! Reference ellipsoids.

use dged_common::Datum;

/// Reference ellipsoid defined by semi-major axis and flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (meters)
    pub a: f64,
    /// Flattening
    pub f: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6378137.0,
        f: 1.0 / 298.257223563,
    };

    pub const GRS80: Ellipsoid = Ellipsoid {
        a: 6378137.0,
        f: 1.0 / 298.257222101,
    };

    /// Ellipsoid used by a datum.
    pub fn for_datum(datum: Datum) -> Self {
        match datum {
            Datum::Wgs84 => Self::WGS84,
            Datum::Etrs89 | Datum::Nad83 => Self::GRS80,
        }
    }

    /// First eccentricity.
    pub fn eccentricity(&self) -> f64 {
        (self.f * (2.0 - self.f)).sqrt()
    }

    /// Third flattening n = f / (2 - f).
    pub fn third_flattening(&self) -> f64 {
        self.f / (2.0 - self.f)
    }
}
