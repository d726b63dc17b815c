//! Raster source abstraction.

use dged_common::{CrsCode, GeoTransform};
use geotiff_parser::GeoTiffInfo;

/// What tile planning needs to know about an input raster.
pub trait RasterSource {
    /// Raster size in pixels as (width, height).
    fn dimensions(&self) -> (u32, u32);

    fn geotransform(&self) -> GeoTransform;

    /// Native coordinate reference system.
    fn crs(&self) -> CrsCode;
}

impl RasterSource for GeoTiffInfo {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn geotransform(&self) -> GeoTransform {
        self.geotransform
    }

    fn crs(&self) -> CrsCode {
        self.crs
    }
}

/// Raster description held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterInfo {
    pub width: u32,
    pub height: u32,
    pub geotransform: GeoTransform,
    pub crs: CrsCode,
}

impl RasterSource for RasterInfo {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn geotransform(&self) -> GeoTransform {
        self.geotransform
    }

    fn crs(&self) -> CrsCode {
        self.crs
    }
}
