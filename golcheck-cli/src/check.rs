//! Check command implementation for the golcheck CLI.

use camino::Utf8PathBuf;
use clap::Parser;
use golcheck_core::scenario::{DEFAULT_DATASET, DEFAULT_EMPTY_QUERIES, DEFAULT_QUERIES};
use golcheck_core::{CommandRunner, ProcessRunner, Suite, SuiteConfig, SuiteReport};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::validate::{anchor, require_dir, require_file};
use crate::{
    ARG_DATABASE, ARG_DATASET, ARG_EMPTY_QUERY, ARG_GOL_EXE, ARG_MAPDATA_DIR, ARG_ONLY,
    ARG_QUERY, ARG_WORK_DIR, CliError, ENV_CHECK_DATABASE, ENV_CHECK_GOL_EXE,
    ENV_CHECK_MAPDATA_DIR,
};

/// CLI arguments for the `check` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "check",
    long_about = "Run the black-box scenario suite against a GOL binary: \
                 build/save/load, option and format rejection, the version \
                 banner and cross-format query consistency. Paths can come \
                 from CLI flags, configuration files, or environment \
                 variables.",
    about = "Run the scenario suite against a GOL binary"
)]
#[ortho_config(prefix = "GOLCHECK")]
pub(crate) struct CheckArgs {
    /// Path to the GOL executable.
    #[arg(long = ARG_GOL_EXE, value_name = "path")]
    #[serde(default)]
    pub(crate) gol_exe: Option<Utf8PathBuf>,
    /// Existing database queried by the query scenarios.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Directory holding the source datasets.
    #[arg(long = ARG_MAPDATA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) mapdata_dir: Option<Utf8PathBuf>,
    /// Dataset built by the build scenarios (defaults to "liguria").
    #[arg(long = ARG_DATASET, value_name = "name")]
    #[serde(default)]
    pub(crate) dataset: Option<String>,
    /// Directory the GOL binary runs in (defaults to ".").
    #[arg(long = ARG_WORK_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) work_dir: Option<Utf8PathBuf>,
    /// Query expected to match features; repeat to replace the defaults.
    #[arg(long = ARG_QUERY, value_name = "filter")]
    #[serde(default)]
    pub(crate) query: Vec<String>,
    /// Query expected to match nothing; repeat to replace the defaults.
    #[arg(long = ARG_EMPTY_QUERY, value_name = "filter")]
    #[serde(default)]
    pub(crate) empty_query: Vec<String>,
    /// Run only scenarios whose name contains this text.
    #[arg(long = ARG_ONLY, value_name = "pattern")]
    #[serde(default)]
    pub(crate) only: Option<String>,
}

impl CheckArgs {
    pub(crate) fn into_config(self) -> Result<CheckConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CheckConfig::try_from(merged)
    }
}

/// Resolved `check` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CheckConfig {
    pub(crate) gol_exe: Utf8PathBuf,
    pub(crate) work_dir: Utf8PathBuf,
    pub(crate) suite: SuiteConfig,
    pub(crate) only: Option<String>,
}

impl CheckConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_file(&self.gol_exe, ARG_GOL_EXE)?;
        require_dir(&self.suite.mapdata_dir, ARG_MAPDATA_DIR)?;
        require_dir(&self.work_dir, ARG_WORK_DIR)?;
        Ok(())
    }

    pub(crate) fn suite(&self) -> Suite {
        let suite = Suite::standard(&self.suite);
        match &self.only {
            Some(pattern) => suite.matching(pattern),
            None => suite,
        }
    }
}

impl TryFrom<CheckArgs> for CheckConfig {
    type Error = CliError;

    fn try_from(args: CheckArgs) -> Result<Self, Self::Error> {
        let gol_exe = args.gol_exe.ok_or(CliError::MissingArgument {
            field: ARG_GOL_EXE,
            env: ENV_CHECK_GOL_EXE,
        })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_CHECK_DATABASE,
        })?;
        let mapdata_dir = args.mapdata_dir.ok_or(CliError::MissingArgument {
            field: ARG_MAPDATA_DIR,
            env: ENV_CHECK_MAPDATA_DIR,
        })?;

        let mut suite = SuiteConfig::new(
            anchor(database, ARG_DATABASE)?,
            anchor(mapdata_dir, ARG_MAPDATA_DIR)?,
        );
        suite.dataset = args.dataset.unwrap_or_else(|| DEFAULT_DATASET.to_owned());
        suite.queries = or_defaults(args.query, &DEFAULT_QUERIES);
        suite.empty_queries = or_defaults(args.empty_query, &DEFAULT_EMPTY_QUERIES);

        Ok(Self {
            gol_exe: anchor(gol_exe, ARG_GOL_EXE)?,
            work_dir: args.work_dir.unwrap_or_else(|| Utf8PathBuf::from(".")),
            suite,
            only: args.only,
        })
    }
}

fn or_defaults(values: Vec<String>, defaults: &[&str]) -> Vec<String> {
    if values.is_empty() {
        defaults.iter().map(|value| (*value).to_owned()).collect()
    } else {
        values
    }
}

pub(super) fn run_check(args: CheckArgs) -> Result<(), CliError> {
    let config = resolve_check_config(args)?;
    let runner = ProcessRunner::new(config.gol_exe.clone()).in_dir(config.work_dir.clone());
    let mut stdout = std::io::stdout().lock();
    run_check_with(&config, &runner, &mut stdout)
}

pub(crate) fn resolve_check_config(args: CheckArgs) -> Result<CheckConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Run the configured suite and print one line per scenario.
pub(crate) fn run_check_with(
    config: &CheckConfig,
    runner: &dyn CommandRunner,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let report = config.suite().run(runner);
    write_report(writer, &report)?;
    let total = report.outcomes().len();
    let failed = total - report.passed();
    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed { failed, total })
    }
}

fn write_report(writer: &mut dyn Write, report: &SuiteReport) -> Result<(), CliError> {
    for outcome in report.outcomes() {
        let written = match (outcome.failure(), outcome.count()) {
            (Some(failure), _) => writeln!(writer, "FAIL {}: {failure}", outcome.name()),
            (None, Some(count)) => writeln!(writer, "PASS {} ({count} features)", outcome.name()),
            (None, None) => writeln!(writer, "PASS {}", outcome.name()),
        };
        written.map_err(CliError::WriteOutput)?;
    }
    writeln!(
        writer,
        "{} of {} scenarios passed",
        report.passed(),
        report.outcomes().len()
    )
    .map_err(CliError::WriteOutput)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<CheckConfig, CliError> {
    let merged = CheckArgs::merge_from_layers(layers).map_err(CliError::from)?;
    CheckConfig::try_from(merged)
}
