//! Error types shared by the DGED tiling crates.

use thiserror::Error;

use crate::crs::CrsParseError;

/// Result type alias using DgedError.
pub type DgedResult<T> = Result<T, DgedError>;

/// Primary error type for tile-plan resolution.
///
/// Every variant is an input error: retrying with the same input cannot
/// succeed, so callers report them and stop.
#[derive(Debug, Error)]
pub enum DgedError {
    #[error("Invalid CRS: {0}")]
    InvalidCrs(#[from] CrsParseError),

    #[error("Invalid geotransform: {0}")]
    InvalidGeoTransform(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },
}

impl DgedError {
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        DgedError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}
