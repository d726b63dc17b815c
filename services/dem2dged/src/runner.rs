//! Per-tile processing of a resolved tile plan.
//!
//! For every tile the runner warps the raster, edits the tile header and
//! writes the sidecar. A tile whose sidecar already exists is skipped, so
//! re-running an interrupted batch picks up where it stopped. A failed tile
//! is logged and the batch carries on.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dged_tiling::grid::progress_percent;
use dged_tiling::{ProductCodes, TilePlan, TileSpec};
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::config::ToolConfig;
use crate::sidecar::{raster_path, sidecar_path, SidecarTemplate};
use crate::tools::{edit_command, warp_command, ToolRunner};

/// Result of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileOutcome {
    Written,
    /// Sidecar already present
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileFailure {
    pub basename: String,
    pub error: String,
}

/// Totals of a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: Vec<TileFailure>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(mut self, basename: &str, result: Result<TileOutcome>) -> Self {
        match result {
            Ok(TileOutcome::Written) => self.written += 1,
            Ok(TileOutcome::Skipped) => self.skipped += 1,
            Err(e) => self.failed.push(TileFailure {
                basename: basename.to_string(),
                error: format!("{:#}", e),
            }),
        }
        self
    }

    fn merge(mut self, other: Self) -> Self {
        self.written += other.written;
        self.skipped += other.skipped;
        self.failed.extend(other.failed);
        self
    }
}

pub struct TileRunner<'a> {
    tools: &'a ToolConfig,
    runner: &'a dyn ToolRunner,
    template: &'a SidecarTemplate,
    input: &'a Path,
    output_folder: &'a Path,
    date: NaiveDate,
}

impl<'a> TileRunner<'a> {
    pub fn new(
        tools: &'a ToolConfig,
        runner: &'a dyn ToolRunner,
        template: &'a SidecarTemplate,
        input: &'a Path,
        output_folder: &'a Path,
        date: NaiveDate,
    ) -> Self {
        Self {
            tools,
            runner,
            template,
            input,
            output_folder,
            date,
        }
    }

    /// Process every tile of `plan`, `jobs` at a time.
    ///
    /// Tiles are enumerated as they are processed; the plan is never held
    /// in memory as a whole.
    pub fn run(&self, plan: &TilePlan, codes: &ProductCodes, jobs: usize) -> Result<RunSummary> {
        create_output_folder(self.output_folder)?;

        let tiles = plan.tiles(codes);
        let total = tiles.len();
        let done = AtomicUsize::new(0);
        info!(tiles = total, jobs, folder = %self.output_folder.display(), "Processing tiles");

        let mut summary = if jobs <= 1 {
            tiles.fold(RunSummary::default(), |summary, tile| {
                let result = self.process_counted(&tile, &done);
                summary.record(&tile.basename, result)
            })
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .context("Failed to build worker pool")?;
            let mut summary = pool.install(|| {
                tiles
                    .par_bridge()
                    .fold(RunSummary::default, |summary, tile| {
                        let result = self.process_counted(&tile, &done);
                        summary.record(&tile.basename, result)
                    })
                    .reduce(RunSummary::default, RunSummary::merge)
            });
            summary.failed.sort_by(|a, b| a.basename.cmp(&b.basename));
            summary
        };
        summary.total = total;

        info!(
            total = summary.total,
            written = summary.written,
            skipped = summary.skipped,
            failed = summary.failed.len(),
            "All done"
        );
        Ok(summary)
    }

    fn process_counted(&self, tile: &TileSpec, done: &AtomicUsize) -> Result<TileOutcome> {
        let result = self.process(tile);
        let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
        match &result {
            Ok(TileOutcome::Written) => {
                info!(tile = %tile.basename, "{}% done", progress_percent(finished, tile.total));
            }
            Ok(TileOutcome::Skipped) => {}
            Err(e) => error!(tile = %tile.basename, error = %format!("{:#}", e), "Tile failed"),
        }
        result
    }

    /// Warp, edit and describe one tile.
    pub fn process(&self, tile: &TileSpec) -> Result<TileOutcome> {
        let sidecar = sidecar_path(self.output_folder, tile);
        if sidecar.is_file() {
            warn!(
                path = %sidecar.display(),
                "Sidecar already exists, skipping tile (delete it to regenerate)"
            );
            return Ok(TileOutcome::Skipped);
        }

        let raster = raster_path(self.output_folder, tile);
        debug!(
            tile = %tile.basename,
            min_x = tile.bounds.min_x,
            min_y = tile.bounds.min_y,
            max_x = tile.bounds.max_x,
            max_y = tile.bounds.max_y,
            "Creating elevation tile"
        );

        let warp = warp_command(self.tools, self.input, tile, &raster);
        self.runner
            .run(&warp)
            .with_context(|| format!("Resampling {}", tile.basename))?;

        let edit = edit_command(self.tools, tile, &raster);
        self.runner
            .run(&edit)
            .with_context(|| format!("Editing header of {}", tile.basename))?;

        self.template.write(tile, self.date, self.output_folder)?;
        Ok(TileOutcome::Written)
    }
}

/// Create `folder` and its parents when missing.
pub fn create_output_folder(folder: &Path) -> Result<()> {
    if !folder.exists() {
        info!(folder = %folder.display(), "Creating output folder");
        fs::create_dir_all(folder)
            .with_context(|| format!("Failed to create output folder: {}", folder.display()))?;
    }
    Ok(())
}

/// Write the plan as one JSON object per line. Returns the tile count.
pub fn write_plan_json<W: Write>(plan: &TilePlan, codes: &ProductCodes, out: &mut W) -> Result<usize> {
    let mut count = 0;
    for tile in plan.tiles(codes) {
        serde_json::to_writer(&mut *out, &tile).context("Failed to serialize tile")?;
        writeln!(out)?;
        count += 1;
    }
    Ok(count)
}

/// Warn about GDAL distributions that ship without `gdal_edit.py`.
pub fn check_platform() {
    if cfg!(windows) {
        warn!(
            "Some GDAL distributions for Windows do not include gdal_edit.py; \
             check that AREA_OR_POINT=Point is set in the output (gdalinfo)"
        );
    } else {
        debug!(os = std::env::consts::OS, "Platform check passed");
    }
}
