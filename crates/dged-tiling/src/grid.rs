//! Tile grid enumeration.
//!
//! Tiles sit on a global grid anchored at the CRS origin: tile `(ix, iy)`
//! starts at `(ix * d, iy * d)`. Each tile reaches one sample past its
//! nominal edge (the "hanging pixel") so neighbours share a border row and
//! column.

use std::ops::Range;

use dged_common::{BoundingBox, DgedError};
use serde::Serialize;

use crate::error::{Result, TilingError};
use crate::levels::longitude_spacing_multiplier;

/// Sample spacing of the output tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridResolution {
    /// Same spacing for every tile.
    Fixed { x: f64, y: f64 },
    /// Geographic spacing: x is the latitude spacing scaled by the band
    /// multiplier at each tile row's minimum latitude.
    LatitudeDependent { lat: f64 },
}

impl GridResolution {
    /// (x, y) resolution for a tile row starting at `row_min_y`.
    pub fn at(&self, row_min_y: f64) -> (f64, f64) {
        match *self {
            GridResolution::Fixed { x, y } => (x, y),
            GridResolution::LatitudeDependent { lat } => {
                (longitude_spacing_multiplier(row_min_y) * lat, lat)
            }
        }
    }

    fn is_valid(&self) -> bool {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        match *self {
            GridResolution::Fixed { x, y } => positive(x) && positive(y),
            GridResolution::LatitudeDependent { lat } => positive(lat),
        }
    }
}

/// Geometry of one enumerated tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileBounds {
    pub ix: i64,
    pub iy: i64,
    pub min_x: f64,
    pub min_y: f64,
    /// Includes the hanging pixel
    pub max_x: f64,
    /// Includes the hanging pixel
    pub max_y: f64,
    pub res_x: f64,
    pub res_y: f64,
}

/// The tiles covering a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGrid {
    tile_dimension: f64,
    resolution: GridResolution,
    x_start: i64,
    x_end: i64,
    y_start: i64,
    y_end: i64,
}

impl TileGrid {
    /// Every tile overlapping `bbox`. The exclusive upper index is
    /// `floor(max / d) + 1`, so a box ending exactly on a tile edge picks up
    /// the tile starting there.
    pub fn new(bbox: &BoundingBox, tile_dimension: f64, resolution: GridResolution) -> Result<Self> {
        if !(tile_dimension.is_finite() && tile_dimension > 0.0) {
            return Err(TilingError::InvalidTileDimension(tile_dimension));
        }
        if !resolution.is_valid() {
            return Err(DgedError::invalid_parameter(
                "resolution",
                format!("sample spacing must be positive, got {:?}", resolution),
            )
            .into());
        }

        let index = |v: f64| (v / tile_dimension).floor() as i64;
        Ok(Self {
            tile_dimension,
            resolution,
            x_start: index(bbox.min_x),
            x_end: index(bbox.max_x) + 1,
            y_start: index(bbox.min_y),
            y_end: index(bbox.max_y) + 1,
        })
    }

    pub fn tile_dimension(&self) -> f64 {
        self.tile_dimension
    }

    pub fn x_range(&self) -> Range<i64> {
        self.x_start..self.x_end
    }

    pub fn y_range(&self) -> Range<i64> {
        self.y_start..self.y_end
    }

    pub fn columns(&self) -> usize {
        (self.x_end - self.x_start).max(0) as usize
    }

    pub fn rows(&self) -> usize {
        (self.y_end - self.y_start).max(0) as usize
    }

    pub fn len(&self) -> usize {
        self.columns() * self.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bounds of the tile at grid index `(ix, iy)`.
    pub fn tile(&self, ix: i64, iy: i64) -> TileBounds {
        let d = self.tile_dimension;
        let min_x = ix as f64 * d;
        let min_y = iy as f64 * d;
        let (res_x, res_y) = self.resolution.at(min_y);
        TileBounds {
            ix,
            iy,
            min_x,
            min_y,
            max_x: (ix + 1) as f64 * d + res_x,
            max_y: (iy + 1) as f64 * d + res_y,
            res_x,
            res_y,
        }
    }

    /// Tiles row by row (y outer, x inner).
    pub fn iter(&self) -> TileGridIter {
        TileGridIter {
            grid: *self,
            position: 0,
        }
    }
}

impl IntoIterator for TileGrid {
    type Item = TileBounds;
    type IntoIter = TileGridIter;

    fn into_iter(self) -> TileGridIter {
        self.iter()
    }
}

/// Iterator over a [`TileGrid`] in row-major order.
#[derive(Debug, Clone)]
pub struct TileGridIter {
    grid: TileGrid,
    position: usize,
}

impl Iterator for TileGridIter {
    type Item = TileBounds;

    fn next(&mut self) -> Option<TileBounds> {
        if self.position >= self.grid.len() {
            return None;
        }
        let columns = self.grid.columns();
        let ix = self.grid.x_start + (self.position % columns) as i64;
        let iy = self.grid.y_start + (self.position / columns) as i64;
        self.position += 1;
        Some(self.grid.tile(ix, iy))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.len().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileGridIter {}

/// Whole percent of `done` out of `total`, truncated.
pub fn progress_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) as u128 * 100) / total as u128) as u8
}
