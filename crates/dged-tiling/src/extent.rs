//! Native extent of a source raster.

use dged_common::{BoundingBox, CrsCode, DgedError};
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, TilingError};
use crate::source::RasterSource;

/// Bounding rectangle of a raster in its own CRS.
///
/// Coordinates are always x/y: longitude or easting in x, latitude or
/// northing in y. A GeoTIFF geotransform maps columns to x and rows to y
/// whatever the authority axis order of the CRS, so nothing is swapped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RasterExtent {
    pub bbox: BoundingBox,
    pub crs: CrsCode,
}

impl RasterExtent {
    /// Resolve the extent from the geotransform and pixel size.
    ///
    /// The far corner is `origin + size * pixel size` on each axis; skew
    /// terms are not taken into account. A geographic extent must fit in
    /// longitude [-180, 360] and latitude [-90, 90], give or take one
    /// pixel; anything else means the raster is tagged with the wrong CRS.
    pub fn from_source(source: &impl RasterSource) -> Result<Self> {
        let geotransform = source.geotransform();
        geotransform.validate()?;

        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(DgedError::invalid_parameter(
                "raster",
                format!("raster has no pixels ({} x {})", width, height),
            )
            .into());
        }

        let far_x = geotransform.origin_x + width as f64 * geotransform.pixel_width;
        let far_y = geotransform.origin_y + height as f64 * geotransform.pixel_height;
        let bbox = BoundingBox::from_corners(
            (geotransform.origin_x, geotransform.origin_y),
            (far_x, far_y),
        );

        let crs = source.crs();
        if crs.is_geographic() {
            let slack = geotransform.pixel_width.abs().max(geotransform.pixel_height.abs());
            let domain = BoundingBox::new(-180.0 - slack, -90.0 - slack, 360.0 + slack, 90.0 + slack);
            if !domain.contains(&bbox) {
                return Err(TilingError::InvalidGeographicExtent { bbox, crs });
            }
        }

        debug!(%bbox, %crs, "Resolved raster extent");
        Ok(Self { bbox, crs })
    }

    /// Corners in the order lower-left, upper-left, upper-right, lower-right.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let b = &self.bbox;
        [
            (b.min_x, b.min_y),
            (b.min_x, b.max_y),
            (b.max_x, b.max_y),
            (b.max_x, b.min_y),
        ]
    }

    pub fn center(&self) -> (f64, f64) {
        self.bbox.center()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RasterInfo;
    use dged_common::GeoTransform;

    fn raster(gt: [f64; 6], width: u32, height: u32, epsg: u32) -> RasterInfo {
        RasterInfo {
            width,
            height,
            geotransform: GeoTransform::from_gdal(gt),
            crs: CrsCode::from_epsg(epsg).unwrap(),
        }
    }

    #[test]
    fn test_north_up_projected() {
        let extent =
            RasterExtent::from_source(&raster([690000.0, 2.0, 0.0, 6110000.0, 0.0, -2.0], 5000, 5000, 32632))
                .unwrap();
        assert_eq!(extent.bbox, BoundingBox::new(690000.0, 6100000.0, 700000.0, 6110000.0));
    }

    #[test]
    fn test_geographic_keeps_lon_in_x() {
        let extent =
            RasterExtent::from_source(&raster([11.0, 0.001, 0.0, 56.0, 0.0, -0.001], 1500, 1000, 4326))
                .unwrap();
        assert!((extent.bbox.min_x - 11.0).abs() < 1e-12);
        assert!((extent.bbox.max_x - 12.5).abs() < 1e-12);
        assert!((extent.bbox.min_y - 55.0).abs() < 1e-12);
        assert_eq!(extent.bbox.max_y, 56.0);
    }

    #[test]
    fn test_metres_tagged_as_wgs84_rejected() {
        let err =
            RasterExtent::from_source(&raster([690000.0, 2.0, 0.0, 6110000.0, 0.0, -2.0], 5000, 5000, 4326))
                .unwrap_err();
        assert!(matches!(err, TilingError::InvalidGeographicExtent { .. }));
        assert!(err.to_string().contains("EPSG:4326"));

        // Longitude alone out of range
        assert!(
            RasterExtent::from_source(&raster([400.0, 0.1, 0.0, 10.0, 0.0, -0.1], 10, 10, 4258)).is_err()
        );
    }

    #[test]
    fn test_geographic_edges_accepted() {
        // Global grid, 0-360 grid and a half-pixel overshoot at the poles
        for gt in [
            [-180.0, 0.25, 0.0, 90.0, 0.0, -0.25],
            [0.0, 0.25, 0.0, 90.0, 0.0, -0.25],
            [-180.125, 0.25, 0.0, 90.125, 0.0, -0.25],
        ] {
            let extent = RasterExtent::from_source(&raster(gt, 1440, 720, 4326));
            assert!(extent.is_ok(), "{gt:?}");
        }
    }

    #[test]
    fn test_south_up_is_sorted() {
        let extent =
            RasterExtent::from_source(&raster([0.0, 1.0, 0.0, 0.0, 0.0, 1.0], 10, 20, 32632)).unwrap();
        assert_eq!(extent.bbox, BoundingBox::new(0.0, 0.0, 10.0, 20.0));
    }

    #[test]
    fn test_corner_order() {
        let extent =
            RasterExtent::from_source(&raster([0.0, 1.0, 0.0, 20.0, 0.0, -1.0], 10, 20, 32632)).unwrap();
        assert_eq!(
            extent.corners(),
            [(0.0, 0.0), (0.0, 20.0), (10.0, 20.0), (10.0, 0.0)]
        );
    }

    #[test]
    fn test_empty_raster_rejected() {
        assert!(RasterExtent::from_source(&raster([0.0, 1.0, 0.0, 0.0, 0.0, -1.0], 0, 10, 32632)).is_err());
        assert!(RasterExtent::from_source(&raster([0.0, 0.0, 0.0, 0.0, 0.0, -1.0], 10, 10, 32632)).is_err());
    }
}
