//! Common types shared across the DGED tiling crates.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod geotransform;

pub use bbox::BoundingBox;
pub use crs::{CrsCode, CrsParseError, Datum, Hemisphere, UtmZone};
pub use error::{DgedError, DgedResult};
pub use geotransform::GeoTransform;
