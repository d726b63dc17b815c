//! Affine geotransform of a raster grid.

use serde::{Deserialize, Serialize};

use crate::error::{DgedError, DgedResult};

/// GDAL-ordered affine transform from pixel (col, row) to map (x, y).
///
/// ```text
/// x = origin_x + col * pixel_width + row * row_skew
/// y = origin_y + col * col_skew    + row * pixel_height
/// ```
///
/// `pixel_height` is negative for the usual north-up raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_skew: f64,
    pub origin_y: f64,
    pub col_skew: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Build from the six GDAL coefficients.
    pub fn from_gdal(coefficients: [f64; 6]) -> Self {
        let [origin_x, pixel_width, row_skew, origin_y, col_skew, pixel_height] = coefficients;
        Self {
            origin_x,
            pixel_width,
            row_skew,
            origin_y,
            col_skew,
            pixel_height,
        }
    }

    /// North-up transform without rotation.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self::from_gdal([origin_x, pixel_width, 0.0, origin_y, 0.0, pixel_height])
    }

    /// The six coefficients in GDAL order.
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_skew,
            self.origin_y,
            self.col_skew,
            self.pixel_height,
        ]
    }

    /// Map coordinates of a (possibly fractional) pixel position.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + col * self.pixel_width + row * self.row_skew,
            self.origin_y + col * self.col_skew + row * self.pixel_height,
        )
    }

    pub fn is_rotated(&self) -> bool {
        self.row_skew != 0.0 || self.col_skew != 0.0
    }

    /// Reject transforms that cannot describe a grid.
    pub fn validate(&self) -> DgedResult<()> {
        if self.to_gdal().iter().any(|c| !c.is_finite()) {
            return Err(DgedError::InvalidGeoTransform(format!(
                "non-finite coefficient in {:?}",
                self.to_gdal()
            )));
        }
        if self.pixel_width == 0.0 || self.pixel_height == 0.0 {
            return Err(DgedError::InvalidGeoTransform(
                "pixel size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
