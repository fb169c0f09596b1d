//! Size-report command implementation for the golcheck CLI.

use camino::Utf8PathBuf;
use clap::Parser;
use golcheck_core::{CommandRunner, ProcessRunner};
use golcheck_data::report::{DEFAULT_LEVELS, DEFAULT_MAX_FEATURES};
use golcheck_data::{SizeReportConfig, generate_size_report};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::validate::{anchor, require_dir, require_file};
use crate::{
    ARG_DATASET, ARG_GOL_EXE, ARG_LEVELS, ARG_MAPDATA_DIR, ARG_MAX_FEATURES, ARG_WORK_DIR,
    CliError, ENV_SIZE_REPORT_GOL_EXE, ENV_SIZE_REPORT_MAPDATA_DIR,
};

/// CLI arguments for the `size-report` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "size-report",
    long_about = "Build and save each dataset with the GOL binary, then print a \
                 CSV comparing the .osm.pbf source with the saved .gol and \
                 .gob files. Paths can come from CLI flags, configuration \
                 files, or environment variables.",
    about = "Print a CSV of source and artefact sizes"
)]
#[ortho_config(prefix = "GOLCHECK")]
pub(crate) struct SizeReportArgs {
    /// Path to the GOL executable.
    #[arg(long = ARG_GOL_EXE, value_name = "path")]
    #[serde(default)]
    pub(crate) gol_exe: Option<Utf8PathBuf>,
    /// Directory holding `<name>.osm.pbf` sources.
    #[arg(long = ARG_MAPDATA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) mapdata_dir: Option<Utf8PathBuf>,
    /// Directory the GOL binary saves into (defaults to ".").
    #[arg(long = ARG_WORK_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) work_dir: Option<Utf8PathBuf>,
    /// Dataset to measure; repeat to replace the default list.
    #[arg(long = ARG_DATASET, value_name = "name")]
    #[serde(default)]
    pub(crate) dataset: Vec<String>,
    /// Zoom levels passed to `build -l`.
    #[arg(long = ARG_LEVELS, value_name = "list")]
    #[serde(default)]
    pub(crate) levels: Option<String>,
    /// Feature cap passed to `build -n`.
    #[arg(long = ARG_MAX_FEATURES, value_name = "count")]
    #[serde(default)]
    pub(crate) max_features: Option<u64>,
}

impl SizeReportArgs {
    pub(crate) fn into_config(self) -> Result<SizeReportCommandConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SizeReportCommandConfig::try_from(merged)
    }
}

/// Resolved `size-report` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SizeReportCommandConfig {
    pub(crate) gol_exe: Utf8PathBuf,
    pub(crate) report: SizeReportConfig,
}

impl SizeReportCommandConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_file(&self.gol_exe, ARG_GOL_EXE)?;
        require_dir(&self.report.mapdata_dir, ARG_MAPDATA_DIR)?;
        require_dir(&self.report.work_dir, ARG_WORK_DIR)?;
        Ok(())
    }
}

impl TryFrom<SizeReportArgs> for SizeReportCommandConfig {
    type Error = CliError;

    fn try_from(args: SizeReportArgs) -> Result<Self, Self::Error> {
        let gol_exe = args.gol_exe.ok_or(CliError::MissingArgument {
            field: ARG_GOL_EXE,
            env: ENV_SIZE_REPORT_GOL_EXE,
        })?;
        let mapdata_dir = args.mapdata_dir.ok_or(CliError::MissingArgument {
            field: ARG_MAPDATA_DIR,
            env: ENV_SIZE_REPORT_MAPDATA_DIR,
        })?;
        let work_dir = args.work_dir.unwrap_or_else(|| Utf8PathBuf::from("."));

        let mapdata_dir = anchor(mapdata_dir, ARG_MAPDATA_DIR)?;
        let mut report = SizeReportConfig::new(mapdata_dir, work_dir);
        if !args.dataset.is_empty() {
            report = report.with_datasets(args.dataset);
        }
        report.levels = args.levels.unwrap_or_else(|| DEFAULT_LEVELS.to_owned());
        report.max_features = args.max_features.unwrap_or(DEFAULT_MAX_FEATURES);

        Ok(Self {
            gol_exe: anchor(gol_exe, ARG_GOL_EXE)?,
            report,
        })
    }
}

pub(super) fn run_size_report(args: SizeReportArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let runner = ProcessRunner::new(config.gol_exe.clone()).in_dir(config.report.work_dir.clone());
    let mut stdout = std::io::stdout().lock();
    run_size_report_with(&config, &runner, &mut stdout)
}

pub(crate) fn run_size_report_with(
    config: &SizeReportCommandConfig,
    runner: &dyn CommandRunner,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    generate_size_report(runner, &config.report, writer)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SizeReportCommandConfig, CliError> {
    let merged = SizeReportArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SizeReportCommandConfig::try_from(merged)
}
