//! Tile plan: the resolved grid of named output tiles for one raster.

use dged_common::{BoundingBox, Hemisphere, UtmZone};
use projection::Transformer;
use serde::{Serialize, Serializer};
use tracing::info;

use crate::bounds::{transform_bounds, CornerPolicy};
use crate::error::Result;
use crate::extent::RasterExtent;
use crate::grid::{progress_percent, GridResolution, TileBounds, TileGrid, TileGridIter};
use crate::levels::{Level, LevelParams, Mode};
use crate::naming::{geographic_tile_name, utm_tile_name, ProductCodes};
use crate::reference::{select_utm_reference, OutputReference, ZoneSelection};
use crate::source::RasterSource;

/// One named output tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileSpec {
    /// 1-based position in the plan
    pub sequence: usize,
    pub total: usize,
    /// Whole percent of the plan done once this tile is
    pub progress: u8,
    pub level: Level,
    pub basename: String,
    pub epsg: u32,
    pub hemisphere: Hemisphere,
    #[serde(serialize_with = "serialize_zone")]
    pub zone: Option<UtmZone>,
    #[serde(flatten)]
    pub bounds: TileBounds,
}

impl TileSpec {
    /// Sample spacing reported in sidecar metadata.
    ///
    /// In geographic mode this is the longitude spacing of the tile row.
    pub fn gsd(&self) -> f64 {
        self.bounds.res_x
    }
}

fn serialize_zone<S: Serializer>(zone: &Option<UtmZone>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match zone {
        Some(zone) => serializer.serialize_str(&zone.label()),
        None => serializer.serialize_none(),
    }
}

/// Resolved tiling of one raster at one level.
///
/// A plan is an immutable value: enumerating it twice yields identical
/// tiles, so an interrupted run can be resumed by re-planning.
#[derive(Debug, Clone)]
pub struct TilePlan {
    level: Level,
    params: LevelParams,
    extent: RasterExtent,
    reference: OutputReference,
    bbox: BoundingBox,
    grid: TileGrid,
}

impl TilePlan {
    /// Plan WGS84 geographic tiles.
    pub fn geographic(raster: &impl RasterSource, level: Level, policy: CornerPolicy) -> Result<Self> {
        let params = level.params(Mode::Geographic)?;
        let extent = RasterExtent::from_source(raster)?;
        let reference = OutputReference::GEOGRAPHIC;
        Self::build(level, params, extent, reference, policy)
    }

    /// Plan UTM tiles in an explicit or autodetected zone.
    pub fn projected(
        raster: &impl RasterSource,
        level: Level,
        zone: ZoneSelection,
        policy: CornerPolicy,
    ) -> Result<Self> {
        let params = level.params(Mode::Projected)?;
        let extent = RasterExtent::from_source(raster)?;
        let reference = select_utm_reference(&extent, zone)?;
        Self::build(level, params, extent, reference, policy)
    }

    fn build(
        level: Level,
        params: LevelParams,
        extent: RasterExtent,
        reference: OutputReference,
        policy: CornerPolicy,
    ) -> Result<Self> {
        let transformer = Transformer::new(extent.crs, reference.crs);
        let bbox = transform_bounds(&extent, &transformer, policy)?;

        let resolution = match params {
            LevelParams::Geographic(p) => GridResolution::LatitudeDependent {
                lat: p.lat_resolution(),
            },
            LevelParams::Projected(p) => GridResolution::Fixed { x: p.gsd, y: p.gsd },
        };
        let grid = TileGrid::new(&bbox, params.tile_dimension(), resolution)?;

        info!(
            level = %level,
            crs = %reference.crs,
            %bbox,
            tile_dimension = grid.tile_dimension(),
            columns = grid.columns(),
            rows = grid.rows(),
            tiles = grid.len(),
            "Resolved tile plan"
        );

        Ok(Self {
            level,
            params,
            extent,
            reference,
            bbox,
            grid,
        })
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn params(&self) -> &LevelParams {
        &self.params
    }

    pub fn mode(&self) -> Mode {
        self.params.mode()
    }

    pub fn extent(&self) -> &RasterExtent {
        &self.extent
    }

    pub fn reference(&self) -> OutputReference {
        self.reference
    }

    /// Bounding box in the output CRS.
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Lazily enumerate the named tiles, row by row.
    pub fn tiles<'a>(&'a self, codes: &'a ProductCodes) -> Tiles<'a> {
        Tiles {
            plan: self,
            codes,
            inner: self.grid.iter(),
            done: 0,
        }
    }

    fn name(&self, bounds: &TileBounds, codes: &ProductCodes) -> String {
        let letter = self.params.size_letter();
        match self.reference.zone() {
            Some(zone) => utm_tile_name(self.level, letter, zone, bounds.min_x, bounds.min_y, codes),
            None => geographic_tile_name(self.level, letter, bounds.min_x, bounds.min_y, codes),
        }
    }
}

/// Iterator returned by [`TilePlan::tiles`].
#[derive(Debug, Clone)]
pub struct Tiles<'a> {
    plan: &'a TilePlan,
    codes: &'a ProductCodes,
    inner: TileGridIter,
    done: usize,
}

impl Iterator for Tiles<'_> {
    type Item = TileSpec;

    fn next(&mut self) -> Option<TileSpec> {
        let bounds = self.inner.next()?;
        self.done += 1;

        let total = self.plan.len();
        let zone = self.plan.reference.zone();
        let hemisphere = match zone {
            Some(zone) => zone.hemisphere(),
            None => Hemisphere::from_latitude(bounds.min_y),
        };

        Some(TileSpec {
            sequence: self.done,
            total,
            progress: progress_percent(self.done, total),
            level: self.plan.level,
            basename: self.plan.name(&bounds, self.codes),
            epsg: self.plan.reference.epsg(),
            hemisphere,
            zone,
            bounds,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Tiles<'_> {}
