//! dem2dged command line entry point.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use dem2dged::config::{Cli, LogFormat, ToolConfig};
use dem2dged::runner::{check_platform, write_plan_json, TileRunner};
use dem2dged::sidecar::SidecarTemplate;
use dem2dged::tools::ProcessRunner;

fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %format!("{:#}", e), "dem2dged failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose { "debug" } else { cli.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = fmt().with_env_filter(filter).with_target(true).with_writer(io::stderr);
    match cli.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

/// Returns whether every tile succeeded.
fn run(cli: &Cli) -> Result<bool> {
    let args = cli.command.tile_args();
    let mode = cli.command.mode();
    info!(
        input = %args.input_raster.display(),
        level = %args.product_level,
        %mode,
        "Starting dem2dged"
    );

    let codes = args.product_codes()?;
    let plan = dem2dged::resolve_plan(&cli.command)?;

    if args.dry_run {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        let count = write_plan_json(&plan, &codes, &mut out)?;
        out.flush().context("Failed to write tile plan")?;
        info!(tiles = count, "Dry run, no tiles written");
        return Ok(true);
    }

    check_platform();
    let tools = ToolConfig::load(args.config.as_deref())?;
    let template_path = args.template_path(mode);
    let template = SidecarTemplate::load(&template_path)?;
    let process_runner = ProcessRunner::new(cli.verbose);

    let runner = TileRunner::new(
        &tools,
        &process_runner,
        &template,
        &args.input_raster,
        &args.output_folder,
        Local::now().date_naive(),
    );
    let summary = runner.run(&plan, &codes, args.jobs)?;

    for failure in &summary.failed {
        error!(tile = %failure.basename, error = %failure.error, "Tile not written");
    }
    if !summary.is_success() {
        error!(
            failed = summary.failed.len(),
            total = summary.total,
            "Some tiles failed"
        );
    }
    Ok(summary.is_success())
}
