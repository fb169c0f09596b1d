//! Unit tests for the `size-report` command wiring.

use super::helpers::{GolWorkspace, stdout_text, write_utf8};
use super::*;
use crate::size_report::{SizeReportCommandConfig, run_size_report_with};
use camino::Utf8PathBuf;
use golcheck_core::test_support::FakeGol;
use golcheck_data::SizeReportError;
use golcheck_data::report::DEFAULT_DATASETS;
use rstest::rstest;

fn args_for(workspace: &GolWorkspace, datasets: &[&str]) -> SizeReportArgs {
    SizeReportArgs {
        gol_exe: Some(workspace.gol_exe.clone()),
        mapdata_dir: Some(workspace.mapdata.clone()),
        work_dir: Some(workspace.work.clone()),
        dataset: datasets.iter().map(|name| (*name).to_owned()).collect(),
        ..SizeReportArgs::default()
    }
}

#[rstest]
#[case(ARG_GOL_EXE, ENV_SIZE_REPORT_GOL_EXE)]
#[case(ARG_MAPDATA_DIR, ENV_SIZE_REPORT_MAPDATA_DIR)]
fn converting_without_required_fields_errors(
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let workspace = GolWorkspace::new();
    let mut args = args_for(&workspace, &[]);
    if field == ARG_GOL_EXE {
        args.gol_exe = None;
    } else {
        args.mapdata_dir = None;
    }

    let err = SizeReportCommandConfig::try_from(args).expect_err("missing field should error");
    assert!(matches!(
        err,
        CliError::MissingArgument { field: missing, env } if missing == field && env == env_var
    ));
}

#[rstest]
fn conversion_fills_in_defaults() {
    let args = SizeReportArgs {
        gol_exe: Some(Utf8PathBuf::from("/opt/gol")),
        mapdata_dir: Some(Utf8PathBuf::from("/mapdata")),
        ..SizeReportArgs::default()
    };

    let config = SizeReportCommandConfig::try_from(args).expect("config should build");

    assert_eq!(config.report.work_dir, Utf8PathBuf::from("."));
    assert_eq!(config.report.datasets, DEFAULT_DATASETS);
    assert_eq!(config.report.levels, "0,3,6,9,12");
    assert_eq!(config.report.max_features, 10_000_000);
}

#[rstest]
fn relative_mapdata_dir_survives_a_separate_work_dir() {
    let args = SizeReportArgs {
        gol_exe: Some(Utf8PathBuf::from("gol")),
        mapdata_dir: Some(Utf8PathBuf::from("mapdata")),
        work_dir: Some(Utf8PathBuf::from("scratch")),
        ..SizeReportArgs::default()
    };

    let config = SizeReportCommandConfig::try_from(args).expect("config should build");

    let cwd = Utf8PathBuf::from_path_buf(std::env::current_dir().expect("current dir"))
        .expect("utf-8 current dir");
    assert_eq!(config.gol_exe, cwd.join("gol"));
    assert_eq!(config.report.mapdata_dir, cwd.join("mapdata"));
    assert_eq!(config.report.work_dir, Utf8PathBuf::from("scratch"));
}

#[rstest]
fn overrides_reach_the_report_configuration() {
    let workspace = GolWorkspace::new();
    let args = SizeReportArgs {
        levels: Some("0,6".to_owned()),
        max_features: Some(500),
        ..args_for(&workspace, &["monaco"])
    };

    let config = SizeReportCommandConfig::try_from(args).expect("config should build");

    assert_eq!(config.report.datasets, ["monaco"]);
    assert_eq!(config.report.levels, "0,6");
    assert_eq!(config.report.max_features, 500);
}

#[rstest]
fn prints_the_csv_report() {
    let workspace = GolWorkspace::new();
    write_utf8(&workspace.mapdata.join("monaco.osm.pbf"), &[0_u8; 40]);
    let config = SizeReportCommandConfig::try_from(args_for(&workspace, &["monaco"]))
        .expect("config should build");
    config.validate_sources().expect("layout is valid");
    let gol = FakeGol::new().with_artefacts(workspace.work.clone(), 20, 10);
    let mut stdout = Vec::new();

    run_size_report_with(&config, &gol, &mut stdout).expect("report succeeds");

    assert_eq!(
        stdout_text(&stdout),
        "file,pbf_size,gol_size,gob_size,gol_ratio,gob_ratio\n\
         monaco,40,20,10,0.500,0.250\n"
    );
}

#[rstest]
fn missing_source_surfaces_as_a_size_report_error() {
    let workspace = GolWorkspace::new();
    let config = SizeReportCommandConfig::try_from(args_for(&workspace, &["atlantis"]))
        .expect("config should build");
    let gol = FakeGol::new().with_artefacts(workspace.work.clone(), 1, 1);

    let err = run_size_report_with(&config, &gol, &mut Vec::new()).expect_err("no source");

    assert!(matches!(
        err,
        CliError::SizeReport(SizeReportError::MissingArtefact { .. })
    ));
}
