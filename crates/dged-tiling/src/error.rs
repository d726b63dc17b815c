//! Error types for tile planning.

use dged_common::{BoundingBox, CrsCode, CrsParseError, DgedError};
use projection::ProjectionError;
use thiserror::Error;

use crate::levels::{Level, Mode};

/// Result type alias using TilingError.
pub type Result<T> = std::result::Result<T, TilingError>;

/// Errors raised while resolving a tile plan.
///
/// All of them are input errors and fatal for the run.
#[derive(Debug, Error)]
pub enum TilingError {
    #[error("Unknown product level '{0}': expected one of 0, 1, 2, 3, 4b, 4, 5, 6, 7, 8, 9")]
    UnknownLevel(String),

    #[error("Product level {level} is not available in {mode} mode")]
    LevelNotAvailable { level: Level, mode: Mode },

    #[error("Tile dimension must be positive, got {0}")]
    InvalidTileDimension(f64),

    #[error("Bounding box {0} has zero or negative area")]
    DegenerateBoundingBox(BoundingBox),

    #[error("Extent {bbox} is not valid for geographic {crs}: expected longitude -180..360 and latitude -90..90 (is the raster tagged with the right CRS?)")]
    InvalidGeographicExtent { bbox: BoundingBox, crs: CrsCode },

    #[error("Invalid {field} '{value}': {expected}")]
    InvalidProductCode {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error(transparent)]
    Crs(#[from] CrsParseError),

    #[error(transparent)]
    Raster(#[from] DgedError),

    #[error("Coordinate transformation failed: {0}")]
    Projection(#[from] ProjectionError),
}
