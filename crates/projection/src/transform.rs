//! Point transformation between coordinate reference systems.
//!
//! All coordinates are in x/y order: longitude/easting first, then
//! latitude/northing. Geographic and UTM systems on WGS84, ETRS89 and NAD83
//! are projected natively and the three datums are treated as coincident.
//! Every other EPSG code goes through proj4rs via WGS84 geographic, with
//! whatever datum shift its PROJ.4 definition carries.

use dged_common::CrsCode;
use proj4rs::proj::Proj;
use thiserror::Error;

use crate::ellipsoid::Ellipsoid;
use crate::transverse_mercator::TransverseMercator;

/// Result type alias using ProjectionError.
pub type Result<T> = std::result::Result<T, ProjectionError>;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Non-finite input coordinate ({x}, {y})")]
    NonFiniteInput { x: f64, y: f64 },

    #[error("Latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} outside [-180, 360]")]
    LongitudeOutOfRange(f64),

    #[error("No PROJ.4 definition for EPSG:{0}")]
    UnknownDefinition(u32),

    #[error("proj4rs failed for EPSG:{epsg}: {message}")]
    Proj4 { epsg: u32, message: String },

    #[error("Transform from {from} to {to} produced a non-finite result")]
    NonFiniteOutput { from: CrsCode, to: CrsCode },
}

const WGS84_LONGLAT: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// One side of a transform.
#[derive(Debug, Clone)]
enum Endpoint {
    Geographic,
    Projected(TransverseMercator),
    Proj4 { epsg: u32, geographic: bool },
}

impl Endpoint {
    fn for_crs(crs: CrsCode) -> Self {
        match crs {
            CrsCode::Geographic(_) => Endpoint::Geographic,
            CrsCode::Utm(datum, zone) => {
                Endpoint::Projected(TransverseMercator::utm(zone, Ellipsoid::for_datum(datum)))
            }
            CrsCode::Other(epsg) => Endpoint::Proj4 {
                epsg,
                geographic: crs.is_geographic(),
            },
        }
    }

    fn is_geographic(&self) -> bool {
        matches!(self, Endpoint::Geographic | Endpoint::Proj4 { geographic: true, .. })
    }
}

fn proj(epsg: u32, definition: &str) -> Result<Proj> {
    Proj::from_proj_string(definition).map_err(|e| ProjectionError::Proj4 {
        epsg,
        message: format!("{e:?}"),
    })
}

/// Run one point through proj4rs. Geographic sides are in degrees.
fn proj4_transform(
    epsg: u32,
    from: (&str, bool),
    to: (&str, bool),
    x: f64,
    y: f64,
) -> Result<(f64, f64)> {
    let source = proj(epsg, from.0)?;
    let target = proj(epsg, to.0)?;

    let mut point = if from.1 {
        (x.to_radians(), y.to_radians(), 0.0)
    } else {
        (x, y, 0.0)
    };
    proj4rs::transform::transform(&source, &target, &mut point).map_err(|e| ProjectionError::Proj4 {
        epsg,
        message: format!("{e:?}"),
    })?;

    if to.1 {
        Ok((point.0.to_degrees(), point.1.to_degrees()))
    } else {
        Ok((point.0, point.1))
    }
}

fn definition(epsg: u32) -> Result<&'static str> {
    CrsCode::Other(epsg)
        .proj4()
        .ok_or(ProjectionError::UnknownDefinition(epsg))
}

/// Immutable transform from one CRS to another.
///
/// Cheap to clone and safe to share between threads.
#[derive(Debug, Clone)]
pub struct Transformer {
    from: CrsCode,
    to: CrsCode,
    source: Endpoint,
    target: Endpoint,
}

impl Transformer {
    pub fn new(from: CrsCode, to: CrsCode) -> Self {
        Self {
            from,
            to,
            source: Endpoint::for_crs(from),
            target: Endpoint::for_crs(to),
        }
    }

    pub fn source_crs(&self) -> CrsCode {
        self.from
    }

    pub fn target_crs(&self) -> CrsCode {
        self.to
    }

    /// True when source and target share a projection and no math is needed.
    pub fn is_identity(&self) -> bool {
        match (self.from, self.to) {
            (CrsCode::Geographic(_), CrsCode::Geographic(_)) => true,
            (CrsCode::Utm(_, a), CrsCode::Utm(_, b)) => a == b,
            (CrsCode::Other(a), CrsCode::Other(b)) => a == b,
            _ => false,
        }
    }

    /// Transform a single point.
    ///
    /// Geographic input must lie within latitude [-90, 90] and longitude
    /// [-180, 360], even when no transformation is needed.
    pub fn transform(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::NonFiniteInput { x, y });
        }
        if self.source.is_geographic() {
            check_geographic(x, y)?;
        }
        if self.is_identity() {
            return Ok((x, y));
        }

        let (lon, lat) = match &self.source {
            Endpoint::Geographic => (x, y),
            Endpoint::Projected(tm) => tm.inverse(x, y),
            Endpoint::Proj4 { epsg, geographic } => {
                proj4_transform(*epsg, (definition(*epsg)?, *geographic), (WGS84_LONGLAT, true), x, y)?
            }
        };
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ProjectionError::LatitudeOutOfRange(lat));
        }

        let (out_x, out_y) = match &self.target {
            Endpoint::Geographic => (lon, lat),
            Endpoint::Projected(tm) => tm.forward(lon, lat),
            Endpoint::Proj4 { epsg, geographic } => {
                proj4_transform(*epsg, (WGS84_LONGLAT, true), (definition(*epsg)?, *geographic), lon, lat)?
            }
        };
        if !out_x.is_finite() || !out_y.is_finite() {
            return Err(ProjectionError::NonFiniteOutput {
                from: self.from,
                to: self.to,
            });
        }
        Ok((out_x, out_y))
    }

    /// Transform several points, stopping at the first failure.
    pub fn transform_points(&self, points: &[(f64, f64)]) -> Result<Vec<(f64, f64)>> {
        points.iter().map(|&(x, y)| self.transform(x, y)).collect()
    }
}

fn check_geographic(lon: f64, lat: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ProjectionError::LatitudeOutOfRange(lat));
    }
    if !(-180.0..=360.0).contains(&lon) {
        return Err(ProjectionError::LongitudeOutOfRange(lon));
    }
    Ok(())
}
