//! Command-line interface for checking the GOL tool from the outside.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod check;
mod error;
mod fetch;
mod size_report;
mod validate;

pub use error::CliError;

use check::CheckArgs;
use fetch::FetchArgs;
use size_report::SizeReportArgs;

pub(crate) const ARG_GOL_EXE: &str = "gol-exe";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_MAPDATA_DIR: &str = "mapdata-dir";
pub(crate) const ARG_WORK_DIR: &str = "work-dir";
pub(crate) const ARG_DATASET: &str = "dataset";
pub(crate) const ARG_QUERY: &str = "query";
pub(crate) const ARG_EMPTY_QUERY: &str = "empty-query";
pub(crate) const ARG_ONLY: &str = "only";
pub(crate) const ARG_LEVELS: &str = "levels";
pub(crate) const ARG_MAX_FEATURES: &str = "max-features";
pub(crate) const ARG_SEQUENCE_NUMBER: &str = "sequence-number";
pub(crate) const ARG_OUTPUT_DIR: &str = "output-dir";
pub(crate) const ARG_METADATA: &str = "metadata";
pub(crate) const ARG_USER_AGENT: &str = "user-agent";
pub(crate) const ARG_LIMIT: &str = "limit";

pub(crate) const ENV_CHECK_GOL_EXE: &str = "GOLCHECK_CMDS_CHECK_GOL_EXE";
pub(crate) const ENV_CHECK_DATABASE: &str = "GOLCHECK_CMDS_CHECK_DATABASE";
pub(crate) const ENV_CHECK_MAPDATA_DIR: &str = "GOLCHECK_CMDS_CHECK_MAPDATA_DIR";
pub(crate) const ENV_SIZE_REPORT_GOL_EXE: &str = "GOLCHECK_CMDS_SIZE_REPORT_GOL_EXE";
pub(crate) const ENV_SIZE_REPORT_MAPDATA_DIR: &str = "GOLCHECK_CMDS_SIZE_REPORT_MAPDATA_DIR";
pub(crate) const ENV_FETCH_SEQUENCE_NUMBER: &str = "GOLCHECK_CMDS_FETCH_SEQUENCE_NUMBER";

/// Run the golcheck CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, when a
/// command cannot complete or when any check scenario fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Check(args) => check::run_check(args),
        Command::SizeReport(args) => size_report::run_size_report(args),
        Command::Fetch(args) => fetch::run_fetch(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "golcheck",
    about = "Black-box checks and batch tooling for the GOL command-line tool",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the scenario suite against a GOL binary.
    Check(CheckArgs),
    /// Build, save and measure datasets, printing a CSV report.
    SizeReport(SizeReportArgs),
    /// Mirror OSM replication change files by sequence number.
    Fetch(FetchArgs),
}

#[cfg(test)]
mod tests;
