//! DGED tile file names.
//!
//! Geographic names encode the tile's south-west corner in degrees,
//! minutes and seconds with a precision that depends on the level:
//!
//! ```text
//! levels 0-3:   DGEDL2GtA_55N011E_A_U_01
//! levels 4b-6:  DGEDL5GtD_5506N01112E_A_U_01
//! levels 7-9:   DGEDL7GtF_550130N0111230E_A_U_01
//! ```
//!
//! UTM names encode zone, then northing and easting of the south-west
//! corner, in kilometers for levels 4b-6 and meters otherwise:
//!
//! ```text
//! DGEDL5UtD_32N6100_690_A_U_01
//! ```

use std::fmt;

use dged_common::{Hemisphere, UtmZone};
use serde::Serialize;

use crate::error::{Result, TilingError};
use crate::levels::Level;

const SECURITY_CLASSES: [char; 5] = ['T', 'S', 'C', 'R', 'U'];

/// Classification fields appended to every tile name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCodes {
    source_type: char,
    security_class: char,
    product_version: String,
}

impl Default for ProductCodes {
    fn default() -> Self {
        Self {
            source_type: 'A',
            security_class: 'U',
            product_version: "01".to_string(),
        }
    }
}

impl ProductCodes {
    /// Validate the three codes.
    ///
    /// Source type is one letter A-Z, security class one of T, S, C, R, U
    /// and product version exactly two digits. Letters are upper-cased.
    pub fn new(source_type: &str, security_class: &str, product_version: &str) -> Result<Self> {
        let source_type = single_letter(source_type)
            .filter(char::is_ascii_alphabetic)
            .ok_or_else(|| TilingError::InvalidProductCode {
                field: "source type",
                value: source_type.to_string(),
                expected: "a single letter A-Z",
            })?;

        let security_class = single_letter(security_class)
            .filter(|c| SECURITY_CLASSES.contains(c))
            .ok_or_else(|| TilingError::InvalidProductCode {
                field: "security class",
                value: security_class.to_string(),
                expected: "one of T, S, C, R or U",
            })?;

        let version = product_version.trim();
        if version.len() != 2 || !version.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TilingError::InvalidProductCode {
                field: "product version",
                value: product_version.to_string(),
                expected: "two digits, e.g. 01",
            });
        }

        Ok(Self {
            source_type,
            security_class,
            product_version: version.to_string(),
        })
    }

    pub fn source_type(&self) -> char {
        self.source_type
    }

    pub fn security_class(&self) -> char {
        self.security_class
    }

    pub fn product_version(&self) -> &str {
        &self.product_version
    }
}

impl fmt::Display for ProductCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.source_type, self.security_class, self.product_version
        )
    }
}

fn single_letter(s: &str) -> Option<char> {
    let mut chars = s.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c.to_ascii_uppercase()),
        _ => None,
    }
}

/// Unsigned degrees, minutes and whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dms {
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Dms {
    /// Magnitude of a decimal-degree value, rounded to the nearest second.
    ///
    /// Rounding first keeps tile origins such as `0.1 * 551` from landing
    /// one second short.
    pub fn from_decimal(value: f64) -> Self {
        let total = (value.abs() * 3600.0).round() as u64;
        Self {
            degrees: (total / 3600) as u32,
            minutes: ((total % 3600) / 60) as u32,
            seconds: (total % 60) as u32,
        }
    }

    pub fn to_decimal(&self) -> f64 {
        self.degrees as f64 + self.minutes as f64 / 60.0 + self.seconds as f64 / 3600.0
    }
}

fn east_west(lon: f64) -> char {
    if lon < 0.0 {
        'W'
    } else {
        'E'
    }
}

/// Name of a geographic tile with south-west corner `(min_lon, min_lat)`.
pub fn geographic_tile_name(
    level: Level,
    size_letter: char,
    min_lon: f64,
    min_lat: f64,
    codes: &ProductCodes,
) -> String {
    let lat = Dms::from_decimal(min_lat);
    let lon = Dms::from_decimal(min_lon);
    let ns = Hemisphere::from_latitude(min_lat).letter();
    let ew = east_west(min_lon);

    let origin = if level.is_degree_named() {
        format!("{:02}{}{:03}{}", lat.degrees, ns, lon.degrees, ew)
    } else if level.is_minute_named() {
        format!(
            "{:02}{:02}{}{:03}{:02}{}",
            lat.degrees, lat.minutes, ns, lon.degrees, lon.minutes, ew
        )
    } else {
        format!(
            "{:02}{:02}{:02}{}{:03}{:02}{:02}{}",
            lat.degrees, lat.minutes, lat.seconds, ns, lon.degrees, lon.minutes, lon.seconds, ew
        )
    };

    format!("DGEDL{}Gt{}_{}_{}", level, size_letter, origin, codes)
}

/// Name of a UTM tile with south-west corner `(min_easting, min_northing)`.
pub fn utm_tile_name(
    level: Level,
    size_letter: char,
    zone: UtmZone,
    min_easting: f64,
    min_northing: f64,
    codes: &ProductCodes,
) -> String {
    let scale = if level.is_minute_named() { 1000.0 } else { 1.0 };
    let north = (min_northing / scale).trunc() as i64;
    let east = (min_easting / scale).trunc() as i64;
    format!(
        "DGEDL{}Ut{}_{}{}_{}_{}",
        level,
        size_letter,
        zone.label(),
        north,
        east,
        codes
    )
}

/// Recover `(min_lon, min_lat)` from a geographic tile name.
///
/// Returns `None` for anything that is not a well-formed geographic name.
pub fn parse_geographic_origin(name: &str) -> Option<(f64, f64)> {
    let origin = name.strip_prefix("DGEDL")?.split('_').nth(1)?;
    let ns_pos = origin.find(['N', 'S'])?;
    let (lat_digits, rest) = origin.split_at(ns_pos);
    let ns = rest.chars().next()?;
    let rest = &rest[1..];
    let ew = rest.chars().last()?;
    let lon_digits = rest.strip_suffix(['E', 'W'])?;

    let lat = parse_dms_digits(lat_digits, 2)?;
    let lon = parse_dms_digits(lon_digits, 3)?;
    let lat = if ns == 'S' { -lat } else { lat };
    let lon = if ew == 'W' { -lon } else { lon };
    Some((lon, lat))
}

/// Parse `D..D[MM[SS]]` with a fixed-width degree field.
fn parse_dms_digits(digits: &str, degree_width: usize) -> Option<f64> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number = |start: usize, len: usize| digits[start..start + len].parse::<u32>().ok();

    let (minutes, seconds) = match digits.len().checked_sub(degree_width)? {
        0 => (0, 0),
        2 => (number(degree_width, 2)?, 0),
        4 => (number(degree_width, 2)?, number(degree_width + 2, 2)?),
        _ => return None,
    };
    let dms = Dms {
        degrees: number(0, degree_width)?,
        minutes,
        seconds,
    };
    Some(dms.to_decimal())
}
