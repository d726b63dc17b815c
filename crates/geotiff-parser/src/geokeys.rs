//! GeoKeyDirectory decoding.
//!
//! The directory is a flat `u16` array: a four-value header
//! (version, revision, minor revision, key count) followed by one
//! `(key id, tag location, count, value)` quadruple per key. Only keys
//! stored inline (tag location 0) are needed here.

use crate::error::{GeoTiffError, GeoTiffResult};

pub const GEO_KEY_DIRECTORY_TAG: u16 = 34735;

pub const GT_MODEL_TYPE: u16 = 1024;
pub const GT_RASTER_TYPE: u16 = 1025;
pub const GEOGRAPHIC_TYPE: u16 = 2048;
pub const PROJECTED_CS_TYPE: u16 = 3072;

pub const MODEL_TYPE_PROJECTED: u16 = 1;
pub const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
pub const RASTER_PIXEL_IS_POINT: u16 = 2;

/// "User defined" marker for code-valued keys.
const USER_DEFINED: u16 = 32767;

/// Inline-valued keys from a GeoKeyDirectory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoKeys {
    entries: Vec<(u16, u16)>,
}

impl GeoKeys {
    pub fn parse(directory: &[u16]) -> GeoTiffResult<Self> {
        let invalid = |message: String| GeoTiffError::InvalidTag {
            tag: GEO_KEY_DIRECTORY_TAG,
            message,
        };

        if directory.len() < 4 {
            return Err(invalid(format!("header has {} values", directory.len())));
        }
        let count = directory[3] as usize;
        let body = &directory[4..];
        if body.len() < count * 4 {
            return Err(invalid(format!(
                "{} keys declared but only {} values follow",
                count,
                body.len()
            )));
        }

        let entries = body
            .chunks_exact(4)
            .take(count)
            .filter(|entry| entry[1] == 0)
            .map(|entry| (entry[0], entry[3]))
            .collect();
        Ok(Self { entries })
    }

    pub fn get(&self, key: u16) -> Option<u16> {
        self.entries
            .iter()
            .find(|(id, _)| *id == key)
            .map(|(_, value)| *value)
    }

    pub fn model_type(&self) -> Option<u16> {
        self.get(GT_MODEL_TYPE)
    }

    pub fn is_pixel_is_point(&self) -> bool {
        self.get(GT_RASTER_TYPE) == Some(RASTER_PIXEL_IS_POINT)
    }

    /// EPSG code chosen by the model type.
    ///
    /// Without a model type the projected key wins over the geographic one.
    pub fn epsg(&self) -> Option<u16> {
        let usable = |code: Option<u16>| code.filter(|c| *c != 0 && *c != USER_DEFINED);
        match self.model_type() {
            Some(MODEL_TYPE_GEOGRAPHIC) => usable(self.get(GEOGRAPHIC_TYPE)),
            Some(MODEL_TYPE_PROJECTED) => usable(self.get(PROJECTED_CS_TYPE)),
            _ => usable(self.get(PROJECTED_CS_TYPE)).or(usable(self.get(GEOGRAPHIC_TYPE))),
        }
    }
}
