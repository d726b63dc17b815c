//! External GDAL program invocations.
//!
//! Each written tile takes two calls: `gdalwarp` cuts and resamples the
//! tile, then `gdal_edit` stamps the compound CRS and point sampling onto
//! the header. Commands are built as plain values so they can be logged
//! and checked without running anything.

use std::fmt;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use dged_tiling::TileSpec;
use thiserror::Error;
use tracing::debug;

use crate::config::ToolConfig;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    fn arg(mut self, arg: impl ToString) -> Self {
        self.args.push(arg.to_string());
        self
    }

    fn path(self, path: &Path) -> Self {
        self.arg(path.display())
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

fn compound_crs(config: &ToolConfig, tile: &TileSpec) -> String {
    format!("{}+{}", tile.epsg, config.vertical_epsg)
}

/// `gdalwarp` call cutting `tile` out of `input` into `output`.
pub fn warp_command(config: &ToolConfig, input: &Path, tile: &TileSpec, output: &Path) -> ToolCommand {
    let b = &tile.bounds;
    ToolCommand::new(&config.gdalwarp)
        .arg("-t_srs")
        .arg(format!("EPSG:{}", compound_crs(config, tile)))
        .arg("-te")
        .arg(b.min_x)
        .arg(b.min_y)
        .arg(b.max_x)
        .arg(b.max_y)
        .arg("-dstnodata")
        .arg(config.nodata)
        .arg("-tr")
        .arg(b.res_x)
        .arg(b.res_y)
        .arg("-r")
        .arg(&config.resampling)
        .arg("-co")
        .arg(format!("COMPRESS={}", config.compression))
        .arg("--config")
        .arg("GTIFF_REPORT_COMPD_CS")
        .arg("YES")
        .path(input)
        .path(output)
}

/// `gdal_edit` call marking `output` as point sampled in the compound CRS.
pub fn edit_command(config: &ToolConfig, tile: &TileSpec, output: &Path) -> ToolCommand {
    ToolCommand::new(&config.gdal_edit)
        .arg("--config")
        .arg("GTIFF_REPORT_COMPD_CS")
        .arg("YES")
        .arg("-a_srs")
        .arg(format!("epsg:{}", compound_crs(config, tile)))
        .arg("-mo")
        .arg("AREA_OR_POINT=POINT")
        .path(output)
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed { program: String, status: ExitStatus },
}

/// Runs external commands.
pub trait ToolRunner: Send + Sync {
    fn run(&self, command: &ToolCommand) -> Result<(), ToolError>;
}

/// Runs commands as child processes, waiting for each to exit.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    /// Pass the child's stdout and stderr through
    pub verbose: bool,
}

impl ProcessRunner {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn stdio(&self) -> Stdio {
        if self.verbose {
            Stdio::inherit()
        } else {
            Stdio::null()
        }
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, command: &ToolCommand) -> Result<(), ToolError> {
        debug!(command = %command, "Running");
        let status = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(self.stdio())
            .stderr(self.stdio())
            .status()
            .map_err(|source| ToolError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ToolError::Failed {
                program: command.program.clone(),
                status,
            })
        }
    }
}
