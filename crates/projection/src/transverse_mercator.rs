//! Transverse Mercator projection.
//!
//! Uses the Krüger series in the third flattening n, carried to fourth
//! order. Within a UTM zone this is accurate to well below a millimeter,
//! and still accurate to a few millimeters several zones away from the
//! central meridian.
//!
//! The projection parameters are:
//! - Central meridian (lon0) and scale factor on it (k0)
//! - False easting and false northing in meters
//! - The reference ellipsoid

use dged_common::{Hemisphere, UtmZone};

use crate::ellipsoid::Ellipsoid;

/// UTM scale factor on the central meridian.
pub const UTM_SCALE_FACTOR: f64 = 0.9996;
/// UTM false easting (meters).
pub const UTM_FALSE_EASTING: f64 = 500000.0;
/// UTM false northing for southern zones (meters).
pub const UTM_FALSE_NORTHING_SOUTH: f64 = 10000000.0;

/// Transverse Mercator projection with precomputed series coefficients.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    /// Central meridian in degrees
    pub lon0: f64,
    /// Scale factor on the central meridian
    pub k0: f64,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
    /// First eccentricity
    e: f64,
    /// Rectifying radius
    big_a: f64,
    /// Forward series coefficients
    alpha: [f64; 4],
    /// Inverse series coefficients
    beta: [f64; 4],
    /// Conformal to geodetic latitude coefficients
    delta: [f64; 4],
}

impl TransverseMercator {
    /// Create a projection from its defining parameters.
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let n = ellipsoid.third_flattening();
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;

        let big_a = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0);

        let alpha = [
            n / 2.0 - 2.0 / 3.0 * n2 + 5.0 / 16.0 * n3 + 41.0 / 180.0 * n4,
            13.0 / 48.0 * n2 - 3.0 / 5.0 * n3 + 557.0 / 1440.0 * n4,
            61.0 / 240.0 * n3 - 103.0 / 140.0 * n4,
            49561.0 / 161280.0 * n4,
        ];
        let beta = [
            n / 2.0 - 2.0 / 3.0 * n2 + 37.0 / 96.0 * n3 - 1.0 / 360.0 * n4,
            1.0 / 48.0 * n2 + 1.0 / 15.0 * n3 - 437.0 / 1440.0 * n4,
            17.0 / 480.0 * n3 - 37.0 / 840.0 * n4,
            4397.0 / 161280.0 * n4,
        ];
        let delta = [
            2.0 * n - 2.0 / 3.0 * n2 - 2.0 * n3 + 116.0 / 45.0 * n4,
            7.0 / 3.0 * n2 - 8.0 / 5.0 * n3 - 227.0 / 45.0 * n4,
            56.0 / 15.0 * n3 - 136.0 / 35.0 * n4,
            4279.0 / 630.0 * n4,
        ];

        Self {
            lon0,
            k0,
            false_easting,
            false_northing,
            e: ellipsoid.eccentricity(),
            big_a,
            alpha,
            beta,
            delta,
        }
    }

    /// Standard UTM projection for a zone.
    pub fn utm(zone: UtmZone, ellipsoid: Ellipsoid) -> Self {
        let false_northing = match zone.hemisphere() {
            Hemisphere::North => 0.0,
            Hemisphere::South => UTM_FALSE_NORTHING_SOUTH,
        };
        Self::new(
            ellipsoid,
            zone.central_meridian(),
            UTM_SCALE_FACTOR,
            UTM_FALSE_EASTING,
            false_northing,
        )
    }

    /// Project geographic coordinates (degrees) to (easting, northing) in meters.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let phi = lat_deg.to_radians();
        let lambda = normalize_longitude(lon_deg - self.lon0).to_radians();

        let sin_phi = phi.sin();
        let t = (sin_phi.atanh() - self.e * (self.e * sin_phi).atanh()).sinh();
        let xi_p = t.atan2(lambda.cos());
        let eta_p = (lambda.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, alpha) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        let easting = self.false_easting + self.k0 * self.big_a * eta;
        let northing = self.false_northing + self.k0 * self.big_a * xi;
        (easting, northing)
    }

    /// Unproject (easting, northing) in meters to (lon, lat) in degrees.
    pub fn inverse(&self, easting: f64, northing: f64) -> (f64, f64) {
        let xi = (northing - self.false_northing) / (self.k0 * self.big_a);
        let eta = (easting - self.false_easting) / (self.k0 * self.big_a);

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, beta) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let mut phi = chi;
        for (j, delta) in self.delta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            phi += delta * (k * chi).sin();
        }

        let lambda = eta_p.sinh().atan2(xi_p.cos());

        (
            normalize_longitude(self.lon0 + lambda.to_degrees()),
            phi.to_degrees(),
        )
    }
}

/// Wrap a longitude difference into [-180, 180].
fn normalize_longitude(mut lon: f64) -> f64 {
    while lon > 180.0 {
        lon -= 360.0;
    }
    while lon < -180.0 {
        lon += 360.0;
    }
    lon
}
