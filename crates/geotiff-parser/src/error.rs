//! Error types for GeoTIFF header reading.

use thiserror::Error;

/// Result type for GeoTIFF parser operations.
pub type GeoTiffResult<T> = Result<T, GeoTiffError>;

/// Error types for GeoTIFF parsing.
#[derive(Error, Debug)]
pub enum GeoTiffError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The TIFF container itself could not be decoded
    #[error("TIFF decode error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// Neither tiepoint/scale nor a transformation matrix is present
    #[error("Missing georeferencing: {0}")]
    MissingGeoreference(String),

    /// GeoKeyDirectory is absent or names no EPSG code
    #[error("Missing spatial reference: {0}")]
    MissingSpatialReference(String),

    /// Tag present but malformed
    #[error("Invalid GeoTIFF tag {tag}: {message}")]
    InvalidTag { tag: u16, message: String },

    /// EPSG code outside the supported set
    #[error(transparent)]
    UnsupportedCrs(#[from] dged_common::CrsParseError),
}
