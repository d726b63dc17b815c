//! Coordinate Reference System types and utilities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Horizontal datum of a supported CRS.
///
/// The three datums differ by well under a meter, so transformations treat
/// them as coincident and only the ellipsoid parameters are kept apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Datum {
    /// WGS84 (EPSG:4326, UTM 326xx/327xx)
    Wgs84,
    /// ETRS89 (EPSG:4258, UTM 258xx)
    Etrs89,
    /// NAD83 (EPSG:4269, UTM 269xx)
    Nad83,
}

impl Datum {
    /// EPSG code of the geographic CRS on this datum.
    pub fn geographic_epsg(&self) -> u32 {
        match self {
            Datum::Wgs84 => 4326,
            Datum::Etrs89 => 4258,
            Datum::Nad83 => 4269,
        }
    }
}

/// Hemisphere of a UTM zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    /// Hemisphere from the sign of a latitude (0 is north).
    pub fn from_latitude(lat: f64) -> Self {
        if lat < 0.0 {
            Hemisphere::South
        } else {
            Hemisphere::North
        }
    }

    /// Single letter used in file names and zone strings.
    pub fn letter(&self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
        }
    }
}

/// A UTM zone: number 1-60 plus hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UtmZone {
    number: u8,
    hemisphere: Hemisphere,
}

impl UtmZone {
    /// Create a zone, validating the zone number.
    pub fn new(number: u8, hemisphere: Hemisphere) -> Result<Self, CrsParseError> {
        if !(1..=60).contains(&number) {
            return Err(CrsParseError::InvalidZone(number.to_string()));
        }
        Ok(Self { number, hemisphere })
    }

    /// Zone containing a geographic point, by the plain six-degree rule.
    ///
    /// This ignores the Norway and Svalbard exceptions. Longitudes outside
    /// [-180, 180] (0-360 rasters) are wrapped first; 180 itself stays in
    /// zone 60.
    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        let lon = if (-180.0..=180.0).contains(&lon) {
            lon
        } else {
            let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
            debug!(lon, wrapped, "Wrapped longitude into [-180, 180) for zone lookup");
            wrapped
        };
        let number = ((lon + 180.0) / 6.0).floor() as i64 + 1;
        Self {
            number: number.clamp(1, 60) as u8,
            hemisphere: Hemisphere::from_latitude(lat),
        }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    /// Longitude of the zone's central meridian in degrees.
    pub fn central_meridian(&self) -> f64 {
        self.number as f64 * 6.0 - 183.0
    }

    /// Zone string used in DGED file names, e.g. `32N` or `09S`.
    pub fn label(&self) -> String {
        format!("{:02}{}", self.number, self.hemisphere.letter())
    }
}

impl FromStr for UtmZone {
    type Err = CrsParseError;

    /// Parse a zone string such as `32N`, `09S` or `9s`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || CrsParseError::InvalidZone(s.to_string());

        let letter = trimmed.chars().last().ok_or_else(invalid)?;
        let hemisphere = match letter.to_ascii_uppercase() {
            'N' => Hemisphere::North,
            'S' => Hemisphere::South,
            _ => return Err(invalid()),
        };

        let digits = &trimmed[..trimmed.len() - letter.len_utf8()];
        if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let number: u8 = digits.parse().map_err(|_| invalid())?;

        UtmZone::new(number, hemisphere).map_err(|_| invalid())
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Coordinate reference systems, keyed by EPSG code.
///
/// Geographic and UTM systems on the three common datums get their own
/// variants, since they are the output systems and are projected natively.
/// Any other code in the EPSG database is carried as [`CrsCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// Geographic lat/lon in degrees
    Geographic(Datum),
    /// Universal Transverse Mercator, meters
    Utm(Datum, UtmZone),
    /// Any other EPSG code with a PROJ.4 definition
    Other(u32),
}

impl CrsCode {
    /// WGS84 geographic, the fixed output of geographic mode.
    pub const WGS84: CrsCode = CrsCode::Geographic(Datum::Wgs84);

    /// WGS84 UTM for the given zone.
    pub fn wgs84_utm(zone: UtmZone) -> Self {
        CrsCode::Utm(Datum::Wgs84, zone)
    }

    /// Map a numeric EPSG code onto a CRS.
    ///
    /// Codes outside the native set are accepted when the EPSG database
    /// has a definition for them.
    pub fn from_epsg(code: u32) -> Result<Self, CrsParseError> {
        let utm = |datum, number: u32, hemisphere| {
            UtmZone::new(number as u8, hemisphere)
                .map(|zone| CrsCode::Utm(datum, zone))
                .map_err(|_| CrsParseError::UnsupportedEpsg(code))
        };

        match code {
            4326 => Ok(CrsCode::Geographic(Datum::Wgs84)),
            4258 => Ok(CrsCode::Geographic(Datum::Etrs89)),
            4269 => Ok(CrsCode::Geographic(Datum::Nad83)),
            32601..=32660 => utm(Datum::Wgs84, code - 32600, Hemisphere::North),
            32701..=32760 => utm(Datum::Wgs84, code - 32700, Hemisphere::South),
            25828..=25838 => utm(Datum::Etrs89, code - 25800, Hemisphere::North),
            26901..=26923 => utm(Datum::Nad83, code - 26900, Hemisphere::North),
            _ if proj4_definition(code).is_some() => Ok(CrsCode::Other(code)),
            _ => Err(CrsParseError::UnsupportedEpsg(code)),
        }
    }

    /// Numeric EPSG code.
    pub fn epsg(&self) -> u32 {
        match self {
            CrsCode::Geographic(datum) => datum.geographic_epsg(),
            CrsCode::Utm(datum, zone) => {
                let number = zone.number() as u32;
                match (datum, zone.hemisphere()) {
                    (Datum::Wgs84, Hemisphere::North) => 32600 + number,
                    (Datum::Wgs84, Hemisphere::South) => 32700 + number,
                    (Datum::Etrs89, _) => 25800 + number,
                    (Datum::Nad83, _) => 26900 + number,
                }
            }
            CrsCode::Other(code) => *code,
        }
    }

    /// PROJ.4 definition from the EPSG database.
    pub fn proj4(&self) -> Option<&'static str> {
        proj4_definition(self.epsg())
    }

    /// Parse an `EPSG:nnnn` string (case-insensitive) or a bare code.
    pub fn parse(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();
        let digits = normalized.strip_prefix("EPSG:").unwrap_or(&normalized);
        let code = digits
            .parse::<u32>()
            .map_err(|_| CrsParseError::InvalidCrsString(s.to_string()))?;
        Self::from_epsg(code)
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        match self {
            CrsCode::Geographic(_) => true,
            CrsCode::Utm(..) => false,
            CrsCode::Other(_) => self.proj4().is_some_and(|def| def.contains("+proj=longlat")),
        }
    }

    pub fn utm_zone(&self) -> Option<UtmZone> {
        match self {
            CrsCode::Utm(_, zone) => Some(*zone),
            _ => None,
        }
    }
}

fn proj4_definition(code: u32) -> Option<&'static str> {
    u16::try_from(code)
        .ok()
        .and_then(crs_definitions::from_code)
        .map(|def| def.proj4)
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported EPSG code: {0}")]
    UnsupportedEpsg(u32),

    #[error("Invalid CRS string: {0}")]
    InvalidCrsString(String),

    #[error("Invalid UTM zone '{0}': expected 1-60 followed by N or S (e.g. 32N or 09S)")]
    InvalidZone(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_zone_to_epsg() {
        let zone: UtmZone = "32N".parse().unwrap();
        assert_eq!(CrsCode::wgs84_utm(zone).epsg(), 32632);

        let zone: UtmZone = "09s".parse().unwrap();
        assert_eq!(CrsCode::wgs84_utm(zone).epsg(), 32709);

        let zone: UtmZone = "9N".parse().unwrap();
        assert_eq!(CrsCode::wgs84_utm(zone).epsg(), 32609);
    }

    #[test]
    fn test_invalid_zone_strings() {
        for s in ["", "N", "32", "61N", "0N", "32X", "132N", "3.2N", "-1S"] {
            assert!(s.parse::<UtmZone>().is_err(), "{s} should be rejected");
        }
    }

    #[test]
    fn test_zone_label_is_padded() {
        let zone = UtmZone::new(9, Hemisphere::South).unwrap();
        assert_eq!(zone.label(), "09S");
        assert_eq!(zone.central_meridian(), -129.0);
    }

    #[test]
    fn test_from_epsg_roundtrip() {
        for code in [4326, 4258, 4269, 32601, 32632, 32660, 32701, 32733, 25832, 26918] {
            assert_eq!(CrsCode::from_epsg(code).unwrap().epsg(), code);
        }
        assert!(CrsCode::from_epsg(32661).is_err());
        assert!(CrsCode::from_epsg(32600).is_err());
        assert!(CrsCode::from_epsg(999_999).is_err());
    }

    #[test]
    fn test_other_epsg_codes() {
        for code in [3857, 3035, 2056, 27700] {
            let crs = CrsCode::from_epsg(code).unwrap();
            assert_eq!(crs, CrsCode::Other(code));
            assert_eq!(crs.epsg(), code);
            assert!(!crs.is_geographic());
            assert!(crs.proj4().is_some());
            assert_eq!(crs.utm_zone(), None);
        }

        // NAD27 is geographic but has no native variant
        let nad27 = CrsCode::from_epsg(4267).unwrap();
        assert_eq!(nad27, CrsCode::Other(4267));
        assert!(nad27.is_geographic());
    }

    #[test]
    fn test_parse_crs() {
        assert_eq!(CrsCode::parse("EPSG:4326").unwrap(), CrsCode::WGS84);
        assert_eq!(CrsCode::parse("epsg:32632").unwrap().epsg(), 32632);
        assert!(CrsCode::parse("CRS:84").is_err());
    }

    #[test]
    fn test_zone_from_lon_lat() {
        let zone = UtmZone::from_lon_lat(9.5, 55.0);
        assert_eq!(zone.number(), 32);
        assert_eq!(zone.hemisphere(), Hemisphere::North);

        let zone = UtmZone::from_lon_lat(-180.0, -10.0);
        assert_eq!(zone.number(), 1);
        assert_eq!(zone.hemisphere(), Hemisphere::South);

        // 180 would compute zone 61
        assert_eq!(UtmZone::from_lon_lat(180.0, 0.0).number(), 60);
    }

    #[test]
    fn test_zone_from_wrapped_longitude() {
        // 0-360 rasters: 189.5E is 170.5W
        assert_eq!(UtmZone::from_lon_lat(189.5, 10.0).number(), 2);
        assert_eq!(UtmZone::from_lon_lat(369.5, 55.0).number(), 32);
        assert_eq!(UtmZone::from_lon_lat(-189.5, 0.0).number(), 59);
    }
}
