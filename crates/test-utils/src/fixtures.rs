//! Common test fixtures for DEM tiling tests.
//!
//! Values are plain tuples and arrays so this crate stays independent of
//! the crates under test.

/// Extents as (min_x, min_y, max_x, max_y).
pub mod extent {
    /// Small geographic extent over Zealand, Denmark (degrees)
    pub const ZEALAND_GEO: (f64, f64, f64, f64) = (11.0, 55.0, 12.5, 56.0);

    /// The same area in UTM 32N (meters)
    pub const ZEALAND_UTM32N: (f64, f64, f64, f64) = (630000.0, 6095000.0, 730000.0, 6210000.0);

    /// Southern hemisphere extent around Sydney (degrees)
    pub const SYDNEY_GEO: (f64, f64, f64, f64) = (150.9, -34.1, 151.4, -33.6);

    /// Extent straddling the equator and prime meridian (degrees)
    pub const GULF_OF_GUINEA: (f64, f64, f64, f64) = (-0.5, -0.5, 0.5, 0.5);

    /// Exactly one level-5 geographic tile (0.1 degree)
    pub const ONE_LEVEL5_TILE: (f64, f64, f64, f64) = (10.0, 55.0, 10.1, 55.1);

    /// Projected box from the 4-tile grid scenario (meters)
    pub const FOUR_TILE_BOX: (f64, f64, f64, f64) = (0.0, 0.0, 10001.0, 10001.0);
}

/// GDAL-ordered geotransforms with matching raster sizes.
pub mod geotransform {
    /// 1/3 arc-second DEM over part of Zealand, 1800 x 1200 pixels
    pub const ZEALAND_GEO: [f64; 6] = [11.0, 1.0 / 10800.0, 0.0, 56.0, 0.0, -1.0 / 10800.0];
    pub const ZEALAND_GEO_SIZE: (u32, u32) = (1800, 1200);

    /// 2 m DEM in UTM 32N, 5000 x 5000 pixels
    pub const ZEALAND_UTM32N: [f64; 6] = [690000.0, 2.0, 0.0, 6110000.0, 0.0, -2.0];
    pub const ZEALAND_UTM32N_SIZE: (u32, u32) = (5000, 5000);

    /// 10 m DEM in UTM 56S around Sydney, 2000 x 2000 pixels
    pub const SYDNEY_UTM56S: [f64; 6] = [320000.0, 10.0, 0.0, 6260000.0, 0.0, -10.0];
    pub const SYDNEY_UTM56S_SIZE: (u32, u32) = (2000, 2000);
}

/// Reference projections computed with the full Krüger series on WGS84.
pub mod utm_points {
    /// A known geographic point and its UTM coordinates.
    #[derive(Debug, Clone, Copy)]
    pub struct UtmPoint {
        pub lon: f64,
        pub lat: f64,
        pub epsg: u32,
        pub easting: f64,
        pub northing: f64,
    }

    /// Central meridian of zone 32 on the equator
    pub const ZONE32_ORIGIN: UtmPoint = UtmPoint {
        lon: 9.0,
        lat: 0.0,
        epsg: 32632,
        easting: 500000.0,
        northing: 0.0,
    };

    pub const DENMARK: UtmPoint = UtmPoint {
        lon: 12.0,
        lat: 55.0,
        epsg: 32632,
        easting: 691875.632,
        northing: 6098907.825,
    };

    pub const SYDNEY: UtmPoint = UtmPoint {
        lon: 151.2093,
        lat: -33.8688,
        epsg: 32756,
        easting: 334368.634,
        northing: 6250948.345,
    };

    pub const ALL: [UtmPoint; 3] = [ZONE32_ORIGIN, DENMARK, SYDNEY];
}

/// DGED level codes.
pub mod levels {
    pub const ALL: [&str; 11] = ["0", "1", "2", "3", "4b", "4", "5", "6", "7", "8", "9"];

    /// Levels with a projected (UTM) table entry
    pub const PROJECTED: [&str; 7] = ["4b", "4", "5", "6", "7", "8", "9"];

    /// Levels named with minute precision
    pub const MINUTE_NAMED: [&str; 4] = ["4b", "4", "5", "6"];
}

/// Minimal sidecar template using every supported placeholder.
pub const SIDECAR_TEMPLATE: &str = "<dged>\n  <name>{{BASENAME}}</name>\n  <level>{{LEVEL}}</level>\n  <gsd>{{GSD}}</gsd>\n  <date>{{DATE}}</date>\n  <crs>{{EPSG}}</crs>\n</dged>\n";
