//! Test data generators: synthetic elevation grids and GeoTIFF files.
//!
//! The GeoTIFF writer only emits the tags the header reader consumes, so
//! tests can build a georeferenced raster of any size without fixture files.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tiff::TiffResult;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GEO_KEY_DIRECTORY: u16 = 34735;

const GT_MODEL_TYPE: u16 = 1024;
const GT_RASTER_TYPE: u16 = 1025;
const GEOGRAPHIC_TYPE: u16 = 2048;
const PROJECTED_CS_TYPE: u16 = 3072;

/// Creates an elevation grid with predictable values.
///
/// Each cell value is `row * 10 + col * 0.5` meters, in row-major order.
///
/// ```
/// use test_utils::create_elevation_grid;
///
/// let grid = create_elevation_grid(4, 3);
/// assert_eq!(grid.len(), 12);
/// assert_eq!(grid[1], 0.5);
/// assert_eq!(grid[4], 10.0);
/// ```
pub fn create_elevation_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push(row as f32 * 10.0 + col as f32 * 0.5);
        }
    }
    data
}

/// How the synthetic file georeferences its pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Georeference {
    /// ModelTiepoint + ModelPixelScale
    TiepointScale,
    /// ModelTransformation matrix, which allows skew
    Transformation,
    /// No georeferencing tags at all
    None,
}

/// Description of a single-band Float32 GeoTIFF to write.
#[derive(Debug, Clone)]
pub struct SyntheticGeoTiff {
    pub width: u32,
    pub height: u32,
    /// GDAL-ordered geotransform
    pub geotransform: [f64; 6],
    /// EPSG code, written to the GeoKeyDirectory when present
    pub epsg: Option<u16>,
    pub geographic: bool,
    pub pixel_is_point: bool,
    pub georeference: Georeference,
}

impl SyntheticGeoTiff {
    /// Geographic raster on the given datum (4326, 4258 or 4269).
    pub fn geographic(epsg: u16, geotransform: [f64; 6], size: (u32, u32)) -> Self {
        Self {
            width: size.0,
            height: size.1,
            geotransform,
            epsg: Some(epsg),
            geographic: true,
            pixel_is_point: false,
            georeference: Georeference::TiepointScale,
        }
    }

    /// Projected raster, e.g. EPSG 32632.
    pub fn projected(epsg: u16, geotransform: [f64; 6], size: (u32, u32)) -> Self {
        Self {
            geographic: false,
            ..Self::geographic(epsg, geotransform, size)
        }
    }

    pub fn with_pixel_is_point(mut self) -> Self {
        self.pixel_is_point = true;
        self
    }

    pub fn with_georeference(mut self, georeference: Georeference) -> Self {
        self.georeference = georeference;
        self
    }

    pub fn without_epsg(mut self) -> Self {
        self.epsg = None;
        self
    }

    /// Write the file.
    pub fn write(&self, path: &Path) -> TiffResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        let mut encoder = TiffEncoder::new(writer)?;
        let mut image = encoder.new_image::<colortype::Gray32Float>(self.width, self.height)?;

        let [ox, pw, rs, oy, cs, ph] = self.geotransform;
        match self.georeference {
            Georeference::TiepointScale => {
                let scale = [pw, -ph, 0.0];
                let tiepoint = [0.0, 0.0, 0.0, ox, oy, 0.0];
                image
                    .encoder()
                    .write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), &scale[..])?;
                image
                    .encoder()
                    .write_tag(Tag::Unknown(MODEL_TIEPOINT), &tiepoint[..])?;
            }
            Georeference::Transformation => {
                let matrix = [
                    pw, rs, 0.0, ox, //
                    cs, ph, 0.0, oy, //
                    0.0, 0.0, 0.0, 0.0, //
                    0.0, 0.0, 0.0, 1.0,
                ];
                image
                    .encoder()
                    .write_tag(Tag::Unknown(MODEL_TRANSFORMATION), &matrix[..])?;
            }
            Georeference::None => {}
        }

        let keys = self.geo_keys();
        image
            .encoder()
            .write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), &keys[..])?;

        let data = create_elevation_grid(self.width as usize, self.height as usize);
        image.write_data(&data)?;
        Ok(())
    }

    /// GeoKeyDirectory: header then (key, location, count, value) entries.
    fn geo_keys(&self) -> Vec<u16> {
        let model_type = if self.geographic { 2 } else { 1 };
        let raster_type = if self.pixel_is_point { 2 } else { 1 };

        let mut entries = vec![[GT_MODEL_TYPE, 0, 1, model_type], [GT_RASTER_TYPE, 0, 1, raster_type]];
        if let Some(epsg) = self.epsg {
            let key = if self.geographic {
                GEOGRAPHIC_TYPE
            } else {
                PROJECTED_CS_TYPE
            };
            entries.push([key, 0, 1, epsg]);
        }

        let mut keys = vec![1, 1, 0, entries.len() as u16];
        keys.extend(entries.into_iter().flatten());
        keys
    }
}
