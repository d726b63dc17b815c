//! Output reference selection.

use std::fmt;
use std::str::FromStr;

use dged_common::{CrsCode, CrsParseError, Hemisphere, UtmZone};
use projection::Transformer;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::extent::RasterExtent;

/// Destination CRS of a tiling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutputReference {
    pub crs: CrsCode,
}

impl OutputReference {
    /// WGS84 geographic, the only geographic output.
    pub const GEOGRAPHIC: OutputReference = OutputReference { crs: CrsCode::WGS84 };

    pub fn utm(zone: UtmZone) -> Self {
        Self {
            crs: CrsCode::wgs84_utm(zone),
        }
    }

    pub fn epsg(&self) -> u32 {
        self.crs.epsg()
    }

    pub fn zone(&self) -> Option<UtmZone> {
        self.crs.utm_zone()
    }

    pub fn hemisphere(&self) -> Option<Hemisphere> {
        self.zone().map(|zone| zone.hemisphere())
    }
}

/// How the UTM zone of a projected run is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneSelection {
    /// Infer from the raster's center point
    #[default]
    Autodetect,
    Explicit(UtmZone),
}

impl FromStr for ZoneSelection {
    type Err = CrsParseError;

    /// `autodetect` (or an empty string) or a zone such as `32N`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("autodetect") {
            Ok(ZoneSelection::Autodetect)
        } else {
            trimmed.parse().map(ZoneSelection::Explicit)
        }
    }
}

impl fmt::Display for ZoneSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneSelection::Autodetect => write!(f, "autodetect"),
            ZoneSelection::Explicit(zone) => write!(f, "{}", zone),
        }
    }
}

/// Choose the UTM output reference for a raster.
///
/// Autodetection projects the extent center to WGS84 and applies the plain
/// six-degree zone rule, so it misplaces rasters in the Norway and Svalbard
/// exception areas. Pass an explicit zone there.
pub fn select_utm_reference(extent: &RasterExtent, selection: ZoneSelection) -> Result<OutputReference> {
    let zone = match selection {
        ZoneSelection::Explicit(zone) => zone,
        ZoneSelection::Autodetect => {
            let (cx, cy) = extent.center();
            let (lon, lat) = Transformer::new(extent.crs, CrsCode::WGS84).transform(cx, cy)?;
            debug!(lon, lat, "Raster center in WGS84");
            let zone = UtmZone::from_lon_lat(lon, lat);
            info!(zone = %zone, "Autodetected UTM zone");
            zone
        }
    };
    Ok(OutputReference::utm(zone))
}
