//! Cut an elevation raster into DGED product tiles.
//!
//! The tile geometry and names come from [`dged_tiling`]. This crate drives
//! the external GDAL programs for each tile and writes the sidecar metadata.

pub mod config;
pub mod runner;
pub mod sidecar;
pub mod tools;

use anyhow::{bail, Context, Result};
use dged_tiling::TilePlan;
use geotiff_parser::GeoTiffInfo;

use crate::config::Command;

/// Read the input raster header and resolve its tile plan.
pub fn resolve_plan(command: &Command) -> Result<TilePlan> {
    let args = command.tile_args();
    let raster = GeoTiffInfo::from_file(&args.input_raster)
        .with_context(|| format!("Failed to open input raster: {}", args.input_raster.display()))?;

    let plan = match command {
        Command::Geo(_) => TilePlan::geographic(&raster, args.product_level, args.corner_policy()),
        Command::Utm(utm) => TilePlan::projected(
            &raster,
            args.product_level,
            utm.utm_zone,
            args.corner_policy(),
        ),
    };
    let plan =
        plan.with_context(|| format!("Failed to resolve tile plan for {}", args.input_raster.display()))?;

    if let Some(max_tiles) = args.max_tiles {
        if plan.len() > max_tiles {
            bail!(
                "Tile plan for {} has {} tiles, more than --max-tiles {}",
                args.input_raster.display(),
                plan.len(),
                max_tiles
            );
        }
    }
    Ok(plan)
}
