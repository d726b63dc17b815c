//! End-to-end runs against a synthetic GeoTIFF with a recording tool runner.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use clap::Parser;
use dem2dged::config::{Cli, ToolConfig};
use dem2dged::runner::{write_plan_json, TileOutcome, TileRunner};
use dem2dged::sidecar::SidecarTemplate;
use dem2dged::tools::{ToolCommand, ToolError, ToolRunner};
use dged_tiling::{ProductCodes, TilePlan};
use test_utils::{temp_test_dir, SyntheticGeoTiff, SIDECAR_TEMPLATE};

const UTM_NAMES: [&str; 4] = [
    "DGEDL5UtD_32N6100_690_A_U_01",
    "DGEDL5UtD_32N6100_700_A_U_01",
    "DGEDL5UtD_32N6110_690_A_U_01",
    "DGEDL5UtD_32N6110_700_A_U_01",
];

/// Records every command. Resampling fails for tiles whose name contains
/// `fail_on`.
#[derive(Default)]
struct RecordingRunner {
    commands: Mutex<Vec<ToolCommand>>,
    fail_on: Option<String>,
}

impl RecordingRunner {
    fn failing_on(basename: &str) -> Self {
        Self {
            fail_on: Some(basename.to_string()),
            ..Self::default()
        }
    }

    fn commands(&self) -> Vec<ToolCommand> {
        self.commands.lock().unwrap().clone()
    }
}

impl ToolRunner for RecordingRunner {
    fn run(&self, command: &ToolCommand) -> Result<(), ToolError> {
        self.commands.lock().unwrap().push(command.clone());
        let failing = self
            .fail_on
            .as_deref()
            .is_some_and(|name| command.program == "gdalwarp" && command.args.iter().any(|a| a.contains(name)));
        if failing {
            return Err(ToolError::Spawn {
                program: command.program.clone(),
                source: io::Error::new(io::ErrorKind::Other, "simulated failure"),
            });
        }
        Ok(())
    }
}

/// 10 km square in UTM 32N at 20 m, covering four level-5 tiles.
fn write_utm_raster(dir: &Path) -> PathBuf {
    let path = dir.join("dem_utm.tif");
    SyntheticGeoTiff::projected(32632, [690000.0, 20.0, 0.0, 6110000.0, 0.0, -20.0], (500, 500))
        .write(&path)
        .unwrap();
    path
}

fn utm_plan(input: &Path, output: &Path) -> TilePlan {
    let cli = Cli::try_parse_from([
        OsStr::new("dem2dged"),
        OsStr::new("utm"),
        input.as_os_str(),
        output.as_os_str(),
        OsStr::new("--utm-zone"),
        OsStr::new("32N"),
    ])
    .unwrap();
    dem2dged::resolve_plan(&cli.command).unwrap()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 16).unwrap()
}

fn xml_files(folder: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(folder)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".xml"))
        .collect();
    names.sort();
    names
}

#[test]
fn test_writes_every_tile() {
    let dir = temp_test_dir();
    let input = write_utm_raster(dir.path());
    let output = dir.path().join("tiles");
    let plan = utm_plan(&input, &output);

    let tools = ToolConfig::default();
    let runner = RecordingRunner::default();
    let template = SidecarTemplate::new(SIDECAR_TEMPLATE);
    let tile_runner = TileRunner::new(&tools, &runner, &template, &input, &output, date());

    let summary = tile_runner.run(&plan, &ProductCodes::default(), 1).unwrap();
    assert!(summary.is_success());
    assert_eq!(summary.total, 4);
    assert_eq!(summary.written, 4);

    let expected: Vec<String> = UTM_NAMES.iter().map(|n| format!("{n}.xml")).collect();
    assert_eq!(xml_files(&output), expected);

    // Warp then edit, tile by tile
    let commands = runner.commands();
    assert_eq!(commands.len(), 8);
    assert_eq!(commands[0].program, "gdalwarp");
    assert_eq!(commands[1].program, "gdal_edit.py");
    assert_eq!(commands[0].args[1], "EPSG:32632+3855");
    assert_eq!(&commands[0].args[3..7], ["690000", "6100000", "700002", "6110002"]);
    assert!(commands[1].args.last().unwrap().ends_with("DGEDL5UtD_32N6100_690_A_U_01.tif"));
}

#[test]
fn test_sidecar_content() {
    let dir = temp_test_dir();
    let input = write_utm_raster(dir.path());
    let output = dir.path().join("tiles");
    let plan = utm_plan(&input, &output);

    let tools = ToolConfig::default();
    let runner = RecordingRunner::default();
    let template = SidecarTemplate::new(SIDECAR_TEMPLATE);
    TileRunner::new(&tools, &runner, &template, &input, &output, date())
        .run(&plan, &ProductCodes::default(), 1)
        .unwrap();

    let xml = fs::read_to_string(output.join("DGEDL5UtD_32N6110_700_A_U_01.xml")).unwrap();
    assert!(xml.contains("<name>DGEDL5UtD_32N6110_700_A_U_01</name>"));
    assert!(xml.contains("<level>5</level>"));
    assert!(xml.contains("<gsd>2</gsd>"));
    assert!(xml.contains("<date>2024-05-16</date>"));
    assert!(xml.contains("<crs>EPSG:32632</crs>"));
    assert!(!xml.contains("{{"));
}

#[test]
fn test_resume_skips_existing_sidecar() {
    let dir = temp_test_dir();
    let input = write_utm_raster(dir.path());
    let output = dir.path().join("tiles");
    fs::create_dir_all(&output).unwrap();
    let existing = output.join(format!("{}.xml", UTM_NAMES[0]));
    fs::write(&existing, "kept").unwrap();

    let plan = utm_plan(&input, &output);
    let tools = ToolConfig::default();
    let runner = RecordingRunner::default();
    let template = SidecarTemplate::new(SIDECAR_TEMPLATE);
    let tile_runner = TileRunner::new(&tools, &runner, &template, &input, &output, date());

    let summary = tile_runner.run(&plan, &ProductCodes::default(), 1).unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.written, 3);
    assert_eq!(runner.commands().len(), 6);
    assert!(runner
        .commands()
        .iter()
        .all(|c| !c.args.iter().any(|a| a.contains(UTM_NAMES[0]))));
    assert_eq!(fs::read_to_string(&existing).unwrap(), "kept");

    // A second run finds everything done
    let summary = tile_runner.run(&plan, &ProductCodes::default(), 1).unwrap();
    assert_eq!(summary.skipped, 4);
    assert_eq!(runner.commands().len(), 6);
}

#[test]
fn test_failed_tile_does_not_stop_batch() {
    let dir = temp_test_dir();
    let input = write_utm_raster(dir.path());
    let output = dir.path().join("tiles");
    let plan = utm_plan(&input, &output);

    let tools = ToolConfig::default();
    let runner = RecordingRunner::failing_on(UTM_NAMES[1]);
    let template = SidecarTemplate::new(SIDECAR_TEMPLATE);
    let tile_runner = TileRunner::new(&tools, &runner, &template, &input, &output, date());

    let summary = tile_runner.run(&plan, &ProductCodes::default(), 1).unwrap();
    assert!(!summary.is_success());
    assert_eq!(summary.written, 3);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].basename, UTM_NAMES[1]);
    assert!(summary.failed[0].error.contains("simulated failure"));

    // No sidecar for the failed tile, so the next run retries it
    assert!(!output.join(format!("{}.xml", UTM_NAMES[1])).exists());
    assert_eq!(xml_files(&output).len(), 3);

    let failed_tile = plan
        .tiles(&ProductCodes::default())
        .find(|t| t.basename == UTM_NAMES[1])
        .unwrap();
    let retry = TileRunner::new(&tools, &RecordingRunner::default(), &template, &input, &output, date())
        .process(&failed_tile)
        .unwrap();
    assert_eq!(retry, TileOutcome::Written);
}

#[test]
fn test_parallel_jobs_write_same_tiles() {
    let dir = temp_test_dir();
    let input = write_utm_raster(dir.path());
    let output = dir.path().join("nested").join("tiles");
    let plan = utm_plan(&input, &output);

    let tools = ToolConfig::default();
    let runner = RecordingRunner::default();
    let template = SidecarTemplate::new(SIDECAR_TEMPLATE);
    let summary = TileRunner::new(&tools, &runner, &template, &input, &output, date())
        .run(&plan, &ProductCodes::default(), 3)
        .unwrap();

    assert_eq!(summary.written, 4);
    assert_eq!(runner.commands().len(), 8);
    let expected: Vec<String> = UTM_NAMES.iter().map(|n| format!("{n}.xml")).collect();
    assert_eq!(xml_files(&output), expected);
}

#[test]
fn test_parallel_failures_are_collected() {
    let dir = temp_test_dir();
    let input = write_utm_raster(dir.path());
    let output = dir.path().join("tiles");
    let plan = utm_plan(&input, &output);

    let tools = ToolConfig::default();
    let runner = RecordingRunner::failing_on("_690_");
    let template = SidecarTemplate::new(SIDECAR_TEMPLATE);
    let summary = TileRunner::new(&tools, &runner, &template, &input, &output, date())
        .run(&plan, &ProductCodes::default(), 4)
        .unwrap();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.written, 2);
    let failed: Vec<&str> = summary.failed.iter().map(|f| f.basename.as_str()).collect();
    assert_eq!(failed, [UTM_NAMES[0], UTM_NAMES[2]]);
}

#[test]
fn test_max_tiles_limit() {
    let dir = temp_test_dir();
    let input = write_utm_raster(dir.path());
    let output = dir.path().join("tiles");

    let parse = |max: &str| {
        Cli::try_parse_from([
            OsStr::new("dem2dged"),
            OsStr::new("utm"),
            input.as_os_str(),
            output.as_os_str(),
            OsStr::new("--utm-zone"),
            OsStr::new("32N"),
            OsStr::new("--max-tiles"),
            OsStr::new(max),
        ])
        .unwrap()
    };

    let err = dem2dged::resolve_plan(&parse("3").command).unwrap_err();
    assert!(format!("{:#}", err).contains("4 tiles"));
    assert_eq!(dem2dged::resolve_plan(&parse("4").command).unwrap().len(), 4);
}

#[test]
fn test_metric_raster_tagged_wgs84_is_fatal() {
    let dir = temp_test_dir();
    let input = dir.path().join("mislabelled.tif");
    SyntheticGeoTiff::geographic(4326, [690000.0, 200.0, 0.0, 6110000.0, 0.0, -200.0], (50, 50))
        .write(&input)
        .unwrap();

    let cli = Cli::try_parse_from([
        OsStr::new("dem2dged"),
        OsStr::new("geo"),
        input.as_os_str(),
        dir.path().as_os_str(),
        OsStr::new("--product-level"),
        OsStr::new("9"),
    ])
    .unwrap();
    let err = dem2dged::resolve_plan(&cli.command).unwrap_err();
    assert!(format!("{:#}", err).contains("EPSG:4326"));
}

#[test]
fn test_dry_run_json_lines() {
    let dir = temp_test_dir();
    let input = write_utm_raster(dir.path());
    let output = dir.path().join("tiles");
    let plan = utm_plan(&input, &output);

    let mut buffer = Vec::new();
    let count = write_plan_json(&plan, &ProductCodes::default(), &mut buffer).unwrap();
    assert_eq!(count, 4);

    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 4);
    for (line, name) in lines.iter().zip(UTM_NAMES) {
        assert_eq!(line["basename"], name);
        assert_eq!(line["epsg"], 32632);
    }
    assert_eq!(lines[3]["sequence"], 4);
    assert_eq!(lines[3]["progress"], 100);
    assert!(!output.exists());
}

#[test]
fn test_geographic_plan_from_cli() {
    let dir = temp_test_dir();
    let input = dir.path().join("dem_geo.tif");
    SyntheticGeoTiff::geographic(4326, [11.0, 1.0 / 600.0, 0.0, 56.0, 0.0, -1.0 / 600.0], (100, 100))
        .write(&input)
        .unwrap();
    let output = dir.path().join("tiles");

    let cli = Cli::try_parse_from([
        OsStr::new("dem2dged"),
        OsStr::new("geo"),
        input.as_os_str(),
        output.as_os_str(),
        OsStr::new("--product-level"),
        OsStr::new("2"),
    ])
    .unwrap();
    let plan = dem2dged::resolve_plan(&cli.command).unwrap();
    let names: Vec<String> = plan.tiles(&ProductCodes::default()).map(|t| t.basename).collect();
    assert_eq!(names, ["DGEDL2GtA_55N011E_A_U_01", "DGEDL2GtA_56N011E_A_U_01"]);
}

#[test]
fn test_unreadable_input_is_fatal() {
    let dir = temp_test_dir();
    let input = dir.path().join("missing.tif");
    let cli = Cli::try_parse_from([
        OsStr::new("dem2dged"),
        OsStr::new("geo"),
        input.as_os_str(),
        dir.path().as_os_str(),
    ])
    .unwrap();
    let err = dem2dged::resolve_plan(&cli.command).unwrap_err();
    assert!(format!("{:#}", err).contains("missing.tif"));
}
