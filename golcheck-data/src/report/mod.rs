//! CSV report comparing `.osm.pbf` sources with the artefacts the engine saves.
//!
//! For every dataset the engine builds a database from
//! `<mapdata_dir>/<name>`, saves it into the runner's working directory and
//! the report records the sizes of `<name>.osm.pbf`, `<name>.gol` and
//! `<name>.gob`.

mod error;

pub use error::SizeReportError;

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use golcheck_core::{CommandRunner, GolCommand};
use log::{debug, warn};
use serde::Serialize;

/// Datasets measured when none are configured.
pub const DEFAULT_DATASETS: [&str; 8] = [
    "bavaria",
    "berlin",
    "de-2024-11-28",
    "ireland",
    "it-2025-02-14",
    "fr-2024-04-11",
    "liguria",
    "philippines",
];
/// Zoom levels passed to `build -l`.
pub const DEFAULT_LEVELS: &str = "0,3,6,9,12";
/// Feature cap passed to `build -n`.
pub const DEFAULT_MAX_FEATURES: u64 = 10_000_000;
/// CSV columns, in order.
pub const HEADER: [&str; 6] = [
    "file",
    "pbf_size",
    "gol_size",
    "gob_size",
    "gol_ratio",
    "gob_ratio",
];

/// Inputs for [`generate_size_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeReportConfig {
    /// Directory holding `<name>.osm.pbf` sources.
    pub mapdata_dir: Utf8PathBuf,
    /// Directory the engine saves `.gol`/`.gob` artefacts into.
    pub work_dir: Utf8PathBuf,
    /// Dataset names, measured in order.
    pub datasets: Vec<String>,
    /// Value of `-l`.
    pub levels: String,
    /// Value of `-n`.
    pub max_features: u64,
}

impl SizeReportConfig {
    /// Configuration measuring [`DEFAULT_DATASETS`].
    pub fn new(mapdata_dir: impl Into<Utf8PathBuf>, work_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            mapdata_dir: mapdata_dir.into(),
            work_dir: work_dir.into(),
            datasets: DEFAULT_DATASETS.map(str::to_owned).to_vec(),
            levels: DEFAULT_LEVELS.to_owned(),
            max_features: DEFAULT_MAX_FEATURES,
        }
    }

    /// Replace the dataset list.
    #[must_use]
    pub fn with_datasets<I, S>(mut self, datasets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.datasets = datasets.into_iter().map(Into::into).collect();
        self
    }

    fn pbf_path(&self, name: &str) -> Utf8PathBuf {
        self.mapdata_dir.join(format!("{name}.osm.pbf"))
    }

    fn artefact_path(&self, name: &str, extension: &str) -> Utf8PathBuf {
        self.work_dir.join(format!("{name}.{extension}"))
    }
}

/// Measured sizes of one dataset, in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSizes {
    /// Dataset name.
    pub name: String,
    /// Size of the `.osm.pbf` source.
    pub pbf: u64,
    /// Size of the saved `.gol` file.
    pub gol: u64,
    /// Size of the saved `.gob` file.
    pub gob: u64,
}

impl DatasetSizes {
    /// `.gol` size divided by the source size; `None` for an empty source.
    #[must_use]
    pub fn gol_ratio(&self) -> Option<f64> {
        ratio(self.gol, self.pbf)
    }

    /// `.gob` size divided by the source size; `None` for an empty source.
    #[must_use]
    pub fn gob_ratio(&self) -> Option<f64> {
        ratio(self.gob, self.pbf)
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "ratios are reported to three decimals, far above f64 rounding"
)]
fn ratio(size: u64, source: u64) -> Option<f64> {
    (source != 0).then(|| size as f64 / source as f64)
}

#[derive(Debug, Serialize)]
struct SizeRow<'a> {
    file: &'a str,
    pbf_size: u64,
    gol_size: u64,
    gob_size: u64,
    gol_ratio: Option<String>,
    gob_ratio: Option<String>,
}

impl<'a> From<&'a DatasetSizes> for SizeRow<'a> {
    fn from(sizes: &'a DatasetSizes) -> Self {
        let three_places = |value: f64| format!("{value:.3}");
        Self {
            file: &sizes.name,
            pbf_size: sizes.pbf,
            gol_size: sizes.gol,
            gob_size: sizes.gob,
            gol_ratio: sizes.gol_ratio().map(three_places),
            gob_ratio: sizes.gob_ratio().map(three_places),
        }
    }
}

/// Build, save and measure each configured dataset, writing CSV to `out`.
///
/// The header goes out first and every row is flushed once measured, so a
/// later failure leaves the earlier rows intact. A non-zero exit from
/// `build` or `save` is logged and the dataset is still measured.
///
/// # Errors
/// Fails when the engine cannot be started, when a measured file is missing
/// or when writing to `out` fails.
///
/// # Examples
/// ```
/// # use camino::Utf8PathBuf;
/// # use golcheck_core::test_support::FakeGol;
/// # use golcheck_data::{SizeReportConfig, generate_size_report};
/// let temp = tempfile::tempdir().expect("create temp directory");
/// let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 path");
/// std::fs::write(dir.join("monaco.osm.pbf"), [0_u8; 100]).expect("write source");
/// let gol = FakeGol::new().with_artefacts(dir.clone(), 50, 25);
/// let config = SizeReportConfig::new(dir.clone(), dir).with_datasets(["monaco"]);
/// let mut csv = Vec::new();
/// generate_size_report(&gol, &config, &mut csv).expect("report");
/// assert_eq!(
///     String::from_utf8(csv).expect("UTF-8 CSV"),
///     "file,pbf_size,gol_size,gob_size,gol_ratio,gob_ratio\nmonaco,100,50,25,0.500,0.250\n"
/// );
/// ```
pub fn generate_size_report(
    runner: &dyn CommandRunner,
    config: &SizeReportConfig,
    out: &mut dyn Write,
) -> Result<Vec<DatasetSizes>, SizeReportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    writer.write_record(HEADER)?;
    flush(&mut writer)?;

    let mut measured = Vec::with_capacity(config.datasets.len());
    for name in &config.datasets {
        let build = GolCommand::build(name.as_str(), config.mapdata_dir.join(name))
            .with_levels(config.levels.as_str())
            .with_max_features(config.max_features)
            .assuming_yes();
        run_logged(runner, &build)?;
        let save = GolCommand::Save {
            name: name.clone(),
            assume_yes: true,
        };
        run_logged(runner, &save)?;

        let sizes = DatasetSizes {
            name: name.clone(),
            pbf: measure(&config.pbf_path(name))?,
            gol: measure(&config.artefact_path(name, "gol"))?,
            gob: measure(&config.artefact_path(name, "gob"))?,
        };
        debug!("measured {sizes:?}");
        writer.serialize(SizeRow::from(&sizes))?;
        flush(&mut writer)?;
        measured.push(sizes);
    }
    Ok(measured)
}

fn run_logged(runner: &dyn CommandRunner, command: &GolCommand) -> Result<(), SizeReportError> {
    let request = command.to_request();
    let run = runner
        .run(&request)
        .map_err(|source| SizeReportError::Runner {
            step: request.args().join(" "),
            source,
        })?;
    if !run.success() {
        warn!(
            "`{}` exited with {:?}: {}",
            run.command_line(),
            run.exit_code(),
            run.stderr().trim()
        );
    }
    Ok(())
}

fn measure(path: &Utf8Path) -> Result<u64, SizeReportError> {
    golcheck_fs::file_size(path).map_err(|source| SizeReportError::MissingArtefact {
        path: path.to_path_buf(),
        source,
    })
}

fn flush<W: Write>(writer: &mut csv::Writer<W>) -> Result<(), SizeReportError> {
    writer
        .flush()
        .map_err(|source| SizeReportError::Flush { source })
}

#[cfg(test)]
mod tests;
