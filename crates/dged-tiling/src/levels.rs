//! DGED product levels and their tiling parameters.
//!
//! Geographic tiles are sized in arc-minutes with latitude spacing in
//! arc-seconds. Projected (UTM) tiles are sized by ground sample distance
//! times the number of posts. Longitude spacing in geographic mode widens
//! towards the poles through [`longitude_spacing_multiplier`].

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{Result, TilingError};

/// Output mode of a tiling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Geographic,
    Projected,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Geographic => write!(f, "geographic"),
            Mode::Projected => write!(f, "projected (UTM)"),
        }
    }
}

/// A DGED product level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    L0,
    L1,
    L2,
    L3,
    L4b,
    L4,
    L5,
    L6,
    L7,
    L8,
    L9,
}

impl Level {
    pub const ALL: [Level; 11] = [
        Level::L0,
        Level::L1,
        Level::L2,
        Level::L3,
        Level::L4b,
        Level::L4,
        Level::L5,
        Level::L6,
        Level::L7,
        Level::L8,
        Level::L9,
    ];

    /// Level code as used on the command line and in file names.
    pub fn code(&self) -> &'static str {
        match self {
            Level::L0 => "0",
            Level::L1 => "1",
            Level::L2 => "2",
            Level::L3 => "3",
            Level::L4b => "4b",
            Level::L4 => "4",
            Level::L5 => "5",
            Level::L6 => "6",
            Level::L7 => "7",
            Level::L8 => "8",
            Level::L9 => "9",
        }
    }

    /// Levels 4b to 6 name tiles to the minute (geographic) or kilometer (UTM).
    pub fn is_minute_named(&self) -> bool {
        matches!(self, Level::L4b | Level::L4 | Level::L5 | Level::L6)
    }

    /// Levels 0 to 3 name geographic tiles to the whole degree.
    pub fn is_degree_named(&self) -> bool {
        matches!(self, Level::L0 | Level::L1 | Level::L2 | Level::L3)
    }

    /// Tiling parameters of this level in the given mode.
    pub fn params(&self, mode: Mode) -> Result<LevelParams> {
        let params = match mode {
            Mode::Geographic => geographic_params(*self).map(LevelParams::Geographic),
            Mode::Projected => projected_params(*self).map(LevelParams::Projected),
        };
        params.ok_or(TilingError::LevelNotAvailable { level: *self, mode })
    }
}

impl FromStr for Level {
    type Err = TilingError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_ascii_lowercase();
        Level::ALL
            .into_iter()
            .find(|level| level.code() == code)
            .ok_or_else(|| TilingError::UnknownLevel(s.to_string()))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Geographic tiling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeographicLevelParams {
    /// Tile edge in arc-minutes
    pub tile_minutes: f64,
    /// Latitude sample spacing in arc-seconds
    pub lat_spacing_seconds: f64,
    pub size_letter: char,
}

impl GeographicLevelParams {
    /// Tile edge in degrees.
    pub fn tile_dimension(&self) -> f64 {
        self.tile_minutes / 60.0
    }

    /// Latitude resolution in degrees.
    pub fn lat_resolution(&self) -> f64 {
        self.lat_spacing_seconds / 3600.0
    }

    /// Longitude resolution in degrees for tiles starting at `latitude`.
    pub fn lon_resolution(&self, latitude: f64) -> f64 {
        longitude_spacing_multiplier(latitude) * self.lat_resolution()
    }
}

/// UTM tiling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedLevelParams {
    /// Ground sample distance in meters
    pub gsd: f64,
    /// Samples along one tile edge
    pub posts: u32,
    pub size_letter: char,
}

impl ProjectedLevelParams {
    /// Tile edge in meters.
    pub fn tile_dimension(&self) -> f64 {
        (self.posts - 1) as f64 * self.gsd
    }
}

/// Parameters of a level in one mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelParams {
    Geographic(GeographicLevelParams),
    Projected(ProjectedLevelParams),
}

impl LevelParams {
    /// Tile edge in output units (degrees or meters).
    pub fn tile_dimension(&self) -> f64 {
        match self {
            LevelParams::Geographic(p) => p.tile_dimension(),
            LevelParams::Projected(p) => p.tile_dimension(),
        }
    }

    pub fn size_letter(&self) -> char {
        match self {
            LevelParams::Geographic(p) => p.size_letter,
            LevelParams::Projected(p) => p.size_letter,
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            LevelParams::Geographic(_) => Mode::Geographic,
            LevelParams::Projected(_) => Mode::Projected,
        }
    }
}

fn geographic_params(level: Level) -> Option<GeographicLevelParams> {
    let (tile_minutes, lat_spacing_seconds, size_letter) = match level {
        Level::L0 => (60.0, 30.0, 'A'),
        Level::L1 => (60.0, 3.0, 'A'),
        Level::L2 => (60.0, 1.0, 'A'),
        Level::L3 => (60.0, 0.4, 'A'),
        Level::L4b => (15.0, 0.15, 'C'),
        Level::L4 => (15.0, 0.12, 'C'),
        Level::L5 => (6.0, 0.06, 'D'),
        Level::L6 => (3.0, 0.03, 'E'),
        Level::L7 => (1.5, 0.015, 'F'),
        Level::L8 => (1.0, 0.0075, 'G'),
        Level::L9 => (1.0, 0.00375, 'G'),
    };
    Some(GeographicLevelParams {
        tile_minutes,
        lat_spacing_seconds,
        size_letter,
    })
}

fn projected_params(level: Level) -> Option<ProjectedLevelParams> {
    let (gsd, posts, size_letter) = match level {
        Level::L0 | Level::L1 | Level::L2 | Level::L3 => return None,
        Level::L4b => (5.0, 5001, 'C'),
        Level::L4 => (4.0, 6251, 'C'),
        Level::L5 => (2.0, 5001, 'D'),
        Level::L6 => (1.0, 5001, 'E'),
        Level::L7 => (0.5, 5001, 'F'),
        Level::L8 => (0.25, 5001, 'G'),
        Level::L9 => (0.125, 10001, 'G'),
    };
    Some(ProjectedLevelParams {
        gsd,
        posts,
        size_letter,
    })
}

/// A latitude band with its longitude spacing multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatitudeBand {
    pub zone: i8,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_multiplier: f64,
}

const fn band(zone: i8, lat_min: f64, lat_max: f64, lon_multiplier: f64) -> LatitudeBand {
    LatitudeBand {
        zone,
        lat_min,
        lat_max,
        lon_multiplier,
    }
}

/// Latitude bands sorted by `lat_min`.
pub const LATITUDE_BANDS: [LatitudeBand; 12] = [
    band(-6, -90.0, -85.0, 10.0),
    band(-5, -85.0, -80.0, 5.0),
    band(-4, -80.0, -70.0, 3.0),
    band(-3, -70.0, -60.0, 2.0),
    band(-2, -60.0, -50.0, 1.5),
    band(-1, -50.0, 0.0, 1.0),
    band(1, 0.0, 50.0, 1.0),
    band(2, 50.0, 60.0, 1.5),
    band(3, 60.0, 70.0, 2.0),
    band(4, 70.0, 80.0, 3.0),
    band(5, 80.0, 85.0, 5.0),
    band(6, 85.0, 90.0, 10.0),
];

/// Band with the greatest `lat_min` not above `latitude`.
pub fn latitude_band(latitude: f64) -> Option<&'static LatitudeBand> {
    let idx = LATITUDE_BANDS.partition_point(|band| band.lat_min <= latitude);
    idx.checked_sub(1).map(|i| &LATITUDE_BANDS[i])
}

/// Longitude spacing multiplier for a latitude. Below every band it is 1.
pub fn longitude_spacing_multiplier(latitude: f64) -> f64 {
    latitude_band(latitude).map_or(1.0, |band| band.lon_multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!("5".parse::<Level>().unwrap(), Level::L5);
        assert_eq!("4b".parse::<Level>().unwrap(), Level::L4b);
        assert_eq!("4B".parse::<Level>().unwrap(), Level::L4b);
        for level in Level::ALL {
            assert_eq!(level.code().parse::<Level>().unwrap(), level);
        }
    }

    #[test]
    fn test_unknown_level() {
        for code in ["", "10", "4a", "five", "-1"] {
            assert!(
                matches!(code.parse::<Level>(), Err(TilingError::UnknownLevel(_))),
                "{code:?} should be unknown"
            );
        }
    }

    #[test]
    fn test_projected_level_5() {
        let params = Level::L5.params(Mode::Projected).unwrap();
        assert_eq!(params.tile_dimension(), 10000.0);
        assert_eq!(params.size_letter(), 'D');
    }

    #[test]
    fn test_geographic_level_5() {
        let LevelParams::Geographic(params) = Level::L5.params(Mode::Geographic).unwrap() else {
            panic!("expected geographic parameters");
        };
        assert!((params.tile_dimension() - 0.1).abs() < 1e-15);
        assert_eq!(params.lat_resolution(), 0.06 / 3600.0);
    }

    #[test]
    fn test_low_levels_not_projected() {
        for level in [Level::L0, Level::L1, Level::L2, Level::L3] {
            assert!(matches!(
                level.params(Mode::Projected),
                Err(TilingError::LevelNotAvailable { .. })
            ));
            assert!(level.params(Mode::Geographic).is_ok());
        }
    }

    #[test]
    fn test_projected_tile_dimensions() {
        let expected = [
            (Level::L4b, 25000.0),
            (Level::L4, 25000.0),
            (Level::L6, 5000.0),
            (Level::L7, 2500.0),
            (Level::L8, 1250.0),
            (Level::L9, 1250.0),
        ];
        for (level, dim) in expected {
            assert_eq!(level.params(Mode::Projected).unwrap().tile_dimension(), dim);
        }
    }

    #[test]
    fn test_multiplier_bands() {
        assert_eq!(longitude_spacing_multiplier(55.0), 1.5);
        assert_eq!(longitude_spacing_multiplier(50.0), 1.5);
        assert_eq!(longitude_spacing_multiplier(49.999), 1.0);
        assert_eq!(longitude_spacing_multiplier(0.0), 1.0);
        assert_eq!(longitude_spacing_multiplier(-50.0), 1.0);
        assert_eq!(longitude_spacing_multiplier(-50.001), 1.5);
        assert_eq!(longitude_spacing_multiplier(-89.0), 10.0);
        assert_eq!(longitude_spacing_multiplier(90.0), 10.0);
        assert_eq!(longitude_spacing_multiplier(-91.0), 1.0);
    }

    #[test]
    fn test_bands_sorted_and_contiguous() {
        for pair in LATITUDE_BANDS.windows(2) {
            assert!(pair[0].lat_min < pair[1].lat_min);
            assert_eq!(pair[0].lat_max, pair[1].lat_min);
        }
    }

    /// The last row with `latitude >= lat_min` wins.
    #[test]
    fn test_matches_last_match_scan() {
        let scan = |lat: f64| {
            let mut multiplier = 1.0;
            for band in LATITUDE_BANDS.iter() {
                if lat >= band.lat_min {
                    multiplier = band.lon_multiplier;
                }
            }
            multiplier
        };
        let mut lat = -95.0;
        while lat <= 95.0 {
            assert_eq!(longitude_spacing_multiplier(lat), scan(lat), "lat {lat}");
            lat += 0.25;
        }
    }
}
