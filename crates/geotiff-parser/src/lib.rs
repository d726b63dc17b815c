//! GeoTIFF header reader for elevation rasters.
//!
//! Reads only what tile planning needs: raster dimensions, the affine
//! geotransform and the EPSG code. Pixel data is never decoded.
//!
//! # Georeferencing sources
//!
//! - ModelTiepoint (33922) + ModelPixelScale (33550) for north-up rasters
//! - ModelTransformation (34264) for rasters with rotation or skew
//! - GeoKeyDirectory (34735) for the EPSG code and PixelIsPoint flag

pub mod error;
pub mod geokeys;

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use dged_common::{CrsCode, GeoTransform};
use tiff::decoder::Decoder;
use tiff::tags::Tag;
use tracing::debug;

pub use error::{GeoTiffError, GeoTiffResult};
pub use geokeys::GeoKeys;

const MODEL_PIXEL_SCALE_TAG: u16 = 33550;
const MODEL_TIEPOINT_TAG: u16 = 33922;
const MODEL_TRANSFORMATION_TAG: u16 = 34264;

/// Header information of a single-image GeoTIFF.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTiffInfo {
    pub width: u32,
    pub height: u32,
    /// Pixel-corner geotransform (PixelIsPoint already shifted)
    pub geotransform: GeoTransform,
    pub crs: CrsCode,
    /// Raster declared GTRasterTypeGeoKey = PixelIsPoint
    pub pixel_is_point: bool,
}

impl GeoTiffInfo {
    /// Read the header of a GeoTIFF on disk.
    pub fn from_file(path: &Path) -> GeoTiffResult<Self> {
        let file = File::open(path)?;
        let info = Self::from_reader(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            crs = %info.crs,
            "Read GeoTIFF header"
        );
        Ok(info)
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> GeoTiffResult<Self> {
        let mut decoder = Decoder::new(reader)?;
        let (width, height) = decoder.dimensions()?;

        let directory = read_u16_tag(&mut decoder, geokeys::GEO_KEY_DIRECTORY_TAG)?
            .ok_or_else(|| {
                GeoTiffError::MissingSpatialReference("no GeoKeyDirectory tag".to_string())
            })?;
        let keys = GeoKeys::parse(&directory)?;

        let epsg = keys.epsg().ok_or_else(|| {
            GeoTiffError::MissingSpatialReference("GeoKeyDirectory names no EPSG code".to_string())
        })?;
        let crs = CrsCode::from_epsg(epsg as u32)?;

        let mut geotransform = read_geotransform(&mut decoder)?;
        let pixel_is_point = keys.is_pixel_is_point();
        if pixel_is_point {
            // Tie point refers to the pixel center; move to the corner
            let (origin_x, origin_y) = geotransform.apply(-0.5, -0.5);
            geotransform.origin_x = origin_x;
            geotransform.origin_y = origin_y;
        }

        Ok(Self {
            width,
            height,
            geotransform,
            crs,
            pixel_is_point,
        })
    }
}

fn read_f64_tag<R: Read + Seek>(decoder: &mut Decoder<R>, tag: u16) -> GeoTiffResult<Option<Vec<f64>>> {
    match decoder.find_tag(Tag::from_u16_exhaustive(tag))? {
        Some(value) => Ok(Some(value.into_f64_vec()?)),
        None => Ok(None),
    }
}

fn read_u16_tag<R: Read + Seek>(decoder: &mut Decoder<R>, tag: u16) -> GeoTiffResult<Option<Vec<u16>>> {
    match decoder.find_tag(Tag::from_u16_exhaustive(tag))? {
        Some(value) => Ok(Some(value.into_u16_vec()?)),
        None => Ok(None),
    }
}

/// Build the geotransform from whichever georeferencing tags are present.
fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> GeoTiffResult<GeoTransform> {
    if let Some(matrix) = read_f64_tag(decoder, MODEL_TRANSFORMATION_TAG)? {
        return geotransform_from_matrix(&matrix);
    }

    let tiepoint = read_f64_tag(decoder, MODEL_TIEPOINT_TAG)?;
    let scale = read_f64_tag(decoder, MODEL_PIXEL_SCALE_TAG)?;
    match (tiepoint, scale) {
        (Some(tiepoint), Some(scale)) => geotransform_from_tiepoint(&tiepoint, &scale),
        _ => Err(GeoTiffError::MissingGeoreference(
            "expected ModelTiepoint with ModelPixelScale, or ModelTransformation".to_string(),
        )),
    }
}

fn geotransform_from_tiepoint(tiepoint: &[f64], scale: &[f64]) -> GeoTiffResult<GeoTransform> {
    if tiepoint.len() < 6 {
        return Err(GeoTiffError::InvalidTag {
            tag: MODEL_TIEPOINT_TAG,
            message: format!("expected 6 values, got {}", tiepoint.len()),
        });
    }
    if scale.len() < 2 {
        return Err(GeoTiffError::InvalidTag {
            tag: MODEL_PIXEL_SCALE_TAG,
            message: format!("expected at least 2 values, got {}", scale.len()),
        });
    }
    if tiepoint.len() > 6 {
        debug!(count = tiepoint.len() / 6, "Multiple tie points, using the first");
    }

    // Tiepoint: [i, j, k, x, y, z]; pixel scale is positive going south
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
    let (scale_x, scale_y) = (scale[0], scale[1]);
    Ok(GeoTransform::north_up(
        x - i * scale_x,
        y + j * scale_y,
        scale_x,
        -scale_y,
    ))
}

/// Row-major 4x4 model transformation matrix.
fn geotransform_from_matrix(matrix: &[f64]) -> GeoTiffResult<GeoTransform> {
    if matrix.len() != 16 {
        return Err(GeoTiffError::InvalidTag {
            tag: MODEL_TRANSFORMATION_TAG,
            message: format!("expected 16 values, got {}", matrix.len()),
        });
    }
    Ok(GeoTransform::from_gdal([
        matrix[3], matrix[0], matrix[1], matrix[7], matrix[4], matrix[5],
    ]))
}
