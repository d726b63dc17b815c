//! Command line and external tool configuration.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dged_tiling::{CornerPolicy, Level, Mode, ProductCodes, ZoneSelection};
use serde::{Deserialize, Serialize};

pub const ENV_GDALWARP: &str = "DEM2DGED_GDALWARP";
pub const ENV_GDAL_EDIT: &str = "DEM2DGED_GDAL_EDIT";
pub const ENV_VERTICAL_EPSG: &str = "DEM2DGED_VERTICAL_EPSG";

#[derive(Parser, Debug)]
#[command(name = "dem2dged")]
#[command(about = "Cut an elevation raster into DGED product tiles")]
#[command(version)]
pub struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Debug logging and external tool output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Tiles in WGS84 geographic coordinates
    Geo(TileArgs),

    /// Tiles in a WGS84 UTM zone
    Utm(UtmArgs),
}

impl Command {
    pub fn tile_args(&self) -> &TileArgs {
        match self {
            Command::Geo(args) => args,
            Command::Utm(args) => &args.tile,
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Command::Geo(_) => Mode::Geographic,
            Command::Utm(_) => Mode::Projected,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct UtmArgs {
    #[command(flatten)]
    pub tile: TileArgs,

    /// UTM zone such as 32N or 09S, or "autodetect" from the raster center
    #[arg(long, default_value = "autodetect")]
    pub utm_zone: ZoneSelection,
}

/// Arguments shared by both output modes.
#[derive(Args, Debug, Clone)]
pub struct TileArgs {
    /// Elevation raster (GeoTIFF)
    pub input_raster: PathBuf,

    /// Folder receiving tiles and sidecar files, created if missing
    pub output_folder: PathBuf,

    /// DGED product level: 0, 1, 2, 3, 4b, 4, 5, 6, 7, 8 or 9
    #[arg(long, default_value = "5")]
    pub product_level: Level,

    /// Sidecar XML template [default: DGED_GEO_TEMPLATE.xml or DGED_UTM_TEMPLATE.xml]
    #[arg(long)]
    pub xml_template: Option<PathBuf>,

    /// Source type letter
    #[arg(long, default_value = "A")]
    pub source_type: String,

    /// Security classification: T, S, C, R or U
    #[arg(long, default_value = "U")]
    pub security_class: String,

    /// Two-digit product version
    #[arg(long, default_value = "01")]
    pub product_version: String,

    /// Print the tile plan as JSON lines and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Tiles processed in parallel
    #[arg(short, long, default_value_t = 1, env = "DEM2DGED_JOBS")]
    pub jobs: usize,

    /// Reproject all four extent corners instead of two
    #[arg(long)]
    pub all_corners: bool,

    /// Refuse plans with more tiles than this
    #[arg(long, env = "DEM2DGED_MAX_TILES")]
    pub max_tiles: Option<usize>,

    /// YAML file with external tool settings
    #[arg(long, env = "DEM2DGED_CONFIG")]
    pub config: Option<PathBuf>,
}

impl TileArgs {
    pub fn product_codes(&self) -> dged_tiling::Result<ProductCodes> {
        ProductCodes::new(&self.source_type, &self.security_class, &self.product_version)
    }

    pub fn corner_policy(&self) -> CornerPolicy {
        if self.all_corners {
            CornerPolicy::AllCorners
        } else {
            CornerPolicy::Diagonal
        }
    }

    pub fn template_path(&self, mode: Mode) -> PathBuf {
        match (&self.xml_template, mode) {
            (Some(path), _) => path.clone(),
            (None, Mode::Geographic) => PathBuf::from("DGED_GEO_TEMPLATE.xml"),
            (None, Mode::Projected) => PathBuf::from("DGED_UTM_TEMPLATE.xml"),
        }
    }
}

/// Settings of the external GDAL programs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// gdalwarp program name or path
    pub gdalwarp: String,
    /// gdal_edit program name or path
    pub gdal_edit: String,
    /// Vertical datum appended to the output CRS (EGM2008 by default)
    pub vertical_epsg: u32,
    pub nodata: f64,
    pub resampling: String,
    pub compression: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            gdalwarp: "gdalwarp".to_string(),
            gdal_edit: "gdal_edit.py".to_string(),
            vertical_epsg: 3855,
            nodata: -32767.0,
            resampling: "cubic".to_string(),
            compression: "LZW".to_string(),
        }
    }
}

impl ToolConfig {
    /// Defaults, then the optional YAML file, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Read a YAML file. Missing keys keep their defaults.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read tool config: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse tool config: {}", path.display()))
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(program) = lookup(ENV_GDALWARP) {
            self.gdalwarp = program;
        }
        if let Some(program) = lookup(ENV_GDAL_EDIT) {
            self.gdal_edit = program;
        }
        if let Some(epsg) = lookup(ENV_VERTICAL_EPSG) {
            self.vertical_epsg = epsg
                .trim()
                .parse()
                .with_context(|| format!("{} must be an EPSG code, got '{}'", ENV_VERTICAL_EPSG, epsg))?;
        }
        Ok(())
    }
}
