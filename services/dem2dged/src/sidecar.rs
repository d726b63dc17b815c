//! Sidecar XML metadata written next to each tile.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dged_tiling::TileSpec;

/// A metadata template with `{{KEYWORD}}` placeholders.
///
/// Recognised keywords are `BASENAME`, `LEVEL`, `GSD`, `DATE` and `EPSG`.
/// Anything else is copied through untouched.
#[derive(Debug, Clone)]
pub struct SidecarTemplate {
    template: String,
}

impl SidecarTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let template = fs::read_to_string(path)
            .with_context(|| format!("Failed to read sidecar template: {}", path.display()))?;
        Ok(Self::new(template))
    }

    pub fn render(&self, tile: &TileSpec, date: NaiveDate) -> String {
        self.template
            .replace("{{BASENAME}}", &tile.basename)
            .replace("{{LEVEL}}", tile.level.code())
            .replace("{{GSD}}", &tile.gsd().to_string())
            .replace("{{DATE}}", &date.format("%Y-%m-%d").to_string())
            .replace("{{EPSG}}", &format!("EPSG:{}", tile.epsg))
    }

    /// Write `{basename}.xml` into `folder`.
    pub fn write(&self, tile: &TileSpec, date: NaiveDate, folder: &Path) -> Result<PathBuf> {
        let path = sidecar_path(folder, tile);
        fs::write(&path, self.render(tile, date))
            .with_context(|| format!("Failed to write sidecar: {}", path.display()))?;
        Ok(path)
    }
}

pub fn sidecar_path(folder: &Path, tile: &TileSpec) -> PathBuf {
    folder.join(format!("{}.xml", tile.basename))
}

pub fn raster_path(folder: &Path, tile: &TileSpec) -> PathBuf {
    folder.join(format!("{}.tif", tile.basename))
}
