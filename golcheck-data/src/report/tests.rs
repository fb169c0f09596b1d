use super::*;
use golcheck_core::test_support::FakeGol;
use rstest::{fixture, rstest};
use std::fs;
use tempfile::TempDir;

struct Workspace {
    _temp: TempDir,
    mapdata: Utf8PathBuf,
    work: Utf8PathBuf,
}

#[fixture]
fn workspace() -> Workspace {
    let temp = TempDir::new().expect("failed to create temporary directory");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 temp path");
    let mapdata = root.join("mapdata");
    let work = root.join("work");
    fs::create_dir_all(&mapdata).expect("create mapdata directory");
    fs::create_dir_all(&work).expect("create work directory");
    Workspace {
        _temp: temp,
        mapdata,
        work,
    }
}

fn write_source(dir: &Utf8Path, name: &str, bytes: usize) {
    fs::write(dir.join(format!("{name}.osm.pbf")), vec![0_u8; bytes]).expect("write source");
}

fn report_text(buffer: Vec<u8>) -> String {
    String::from_utf8(buffer).expect("CSV is UTF-8")
}

#[rstest]
fn writes_header_and_one_row_per_dataset(workspace: Workspace) {
    write_source(&workspace.mapdata, "berlin", 200);
    write_source(&workspace.mapdata, "liguria", 400);
    let gol = FakeGol::new().with_artefacts(workspace.work.clone(), 100, 50);
    let config = SizeReportConfig::new(workspace.mapdata.clone(), workspace.work.clone())
        .with_datasets(["berlin", "liguria"]);
    let mut out = Vec::new();

    let sizes = generate_size_report(&gol, &config, &mut out).expect("report succeeds");

    assert_eq!(
        report_text(out),
        "file,pbf_size,gol_size,gob_size,gol_ratio,gob_ratio\n\
         berlin,200,100,50,0.500,0.250\n\
         liguria,400,100,50,0.250,0.125\n"
    );
    assert_eq!(sizes.len(), 2);
}

#[rstest]
fn passes_levels_cap_and_yes_to_build(workspace: Workspace) {
    write_source(&workspace.mapdata, "ireland", 10);
    let gol = FakeGol::new().with_artefacts(workspace.work.clone(), 1, 1);
    let config = SizeReportConfig::new(workspace.mapdata.clone(), workspace.work.clone())
        .with_datasets(["ireland"]);

    generate_size_report(&gol, &config, &mut Vec::new()).expect("report succeeds");

    let source = workspace.mapdata.join("ireland");
    assert_eq!(
        gol.calls(),
        [
            vec![
                "build",
                "ireland",
                source.as_str(),
                "-l",
                "0,3,6,9,12",
                "-n",
                "10000000",
                "-Y"
            ],
            vec!["save", "ireland", "-Y"],
        ]
    );
}

#[rstest]
fn missing_artefact_names_the_path(workspace: Workspace) {
    write_source(&workspace.mapdata, "berlin", 10);
    let config = SizeReportConfig::new(workspace.mapdata.clone(), workspace.work.clone())
        .with_datasets(["berlin"]);
    let mut out = Vec::new();

    let err = generate_size_report(&FakeGol::new(), &config, &mut out)
        .expect_err("no artefacts were saved");

    match err {
        SizeReportError::MissingArtefact { path, .. } => {
            assert_eq!(path, workspace.work.join("berlin.gol"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(
        report_text(out),
        "file,pbf_size,gol_size,gob_size,gol_ratio,gob_ratio\n"
    );
}

#[rstest]
fn missing_source_is_reported_before_artefacts(workspace: Workspace) {
    let gol = FakeGol::new().with_artefacts(workspace.work.clone(), 1, 1);
    let config = SizeReportConfig::new(workspace.mapdata.clone(), workspace.work.clone())
        .with_datasets(["philippines"]);

    let err = generate_size_report(&gol, &config, &mut Vec::new()).expect_err("no source");

    assert!(matches!(
        err,
        SizeReportError::MissingArtefact { ref path, .. }
            if path.as_str().ends_with("philippines.osm.pbf")
    ));
}

#[rstest]
fn failed_build_is_logged_and_measuring_continues(workspace: Workspace) {
    write_source(&workspace.mapdata, "bavaria", 8);
    let gol = FakeGol::new()
        .with_exit("build", 1)
        .with_artefacts(workspace.work.clone(), 4, 2);
    let config = SizeReportConfig::new(workspace.mapdata.clone(), workspace.work.clone())
        .with_datasets(["bavaria"]);

    let sizes = generate_size_report(&gol, &config, &mut Vec::new()).expect("report succeeds");

    assert_eq!(
        sizes,
        [DatasetSizes {
            name: "bavaria".to_owned(),
            pbf: 8,
            gol: 4,
            gob: 2,
        }]
    );
}

#[rstest]
fn empty_source_leaves_ratios_blank(workspace: Workspace) {
    write_source(&workspace.mapdata, "empty", 0);
    let gol = FakeGol::new().with_artefacts(workspace.work.clone(), 3, 3);
    let config = SizeReportConfig::new(workspace.mapdata.clone(), workspace.work.clone())
        .with_datasets(["empty"]);
    let mut out = Vec::new();

    generate_size_report(&gol, &config, &mut out).expect("report succeeds");

    assert!(report_text(out).ends_with("\nempty,0,3,3,,\n"));
}

#[rstest]
fn default_configuration_covers_the_standard_datasets() {
    let config = SizeReportConfig::new("/mapdata", "/work");
    assert_eq!(config.datasets, DEFAULT_DATASETS);
    assert_eq!(config.levels, "0,3,6,9,12");
    assert_eq!(config.max_features, 10_000_000);
}
