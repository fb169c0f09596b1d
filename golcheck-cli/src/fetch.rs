//! Fetch command implementation for the golcheck CLI.

use camino::Utf8PathBuf;
use clap::Parser;
use golcheck_data::{
    BaseUrl, ChangeSource, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, FetchLog, HttpChangeSource,
    MirrorOptions, MirrorReport, SequenceNumber, StopReason, mirror_changes,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::validate::allow_dir;
use crate::{
    ARG_LIMIT, ARG_METADATA, ARG_OUTPUT_DIR, ARG_SEQUENCE_NUMBER, ARG_USER_AGENT, CliError,
    ENV_FETCH_SEQUENCE_NUMBER,
};

/// CLI arguments for the `fetch` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "fetch",
    long_about = "Download OSM replication change and state files, one \
                 sequence number after another, into an aaa/bbb/ccc tree \
                 mirroring the feed. Stops at the first file that cannot be \
                 downloaded.",
    about = "Mirror replication change files by sequence number",
    allow_missing_positional = true
)]
#[ortho_config(prefix = "GOLCHECK")]
pub(crate) struct FetchArgs {
    /// Base URL of the replication feed (defaults to the public minutely feed).
    #[arg(value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// First sequence number to download. A lone positional is taken as
    /// the sequence number.
    #[arg(value_name = "sequence", required = true)]
    #[serde(default)]
    pub(crate) sequence_number: Option<u64>,
    /// Directory receiving the mirrored tree (defaults to ".").
    #[arg(long = ARG_OUTPUT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) output_dir: Option<Utf8PathBuf>,
    /// SQLite file recording every stored download.
    #[arg(long = ARG_METADATA, value_name = "path")]
    #[serde(default)]
    pub(crate) metadata: Option<Utf8PathBuf>,
    /// User-Agent header sent with every request.
    #[arg(long = ARG_USER_AGENT, value_name = "agent")]
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
    /// Stop after this many sequences.
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<u64>,
}

impl FetchArgs {
    pub(crate) fn into_config(self) -> Result<FetchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        FetchConfig::try_from(merged)
    }
}

/// Resolved `fetch` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchConfig {
    pub(crate) base_url: BaseUrl,
    pub(crate) start: SequenceNumber,
    pub(crate) output_dir: Utf8PathBuf,
    pub(crate) metadata: Option<Utf8PathBuf>,
    pub(crate) user_agent: String,
    pub(crate) limit: Option<u64>,
}

impl FetchConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        allow_dir(&self.output_dir, ARG_OUTPUT_DIR)
    }

    /// `true` once `sequence` lies `limit` or more past the start.
    fn limit_reached(&self, sequence: SequenceNumber) -> bool {
        self.limit.is_some_and(|limit| {
            u64::from(sequence.get()).saturating_sub(u64::from(self.start.get())) >= limit
        })
    }
}

impl TryFrom<FetchArgs> for FetchConfig {
    type Error = CliError;

    fn try_from(args: FetchArgs) -> Result<Self, Self::Error> {
        let raw_start = args.sequence_number.ok_or(CliError::MissingArgument {
            field: ARG_SEQUENCE_NUMBER,
            env: ENV_FETCH_SEQUENCE_NUMBER,
        })?;
        let start = SequenceNumber::try_from(raw_start)?;
        let base_url = match args.base_url.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => BaseUrl::parse(raw)?,
            _ => BaseUrl::from(DEFAULT_BASE_URL),
        };

        Ok(Self {
            base_url,
            start,
            output_dir: args.output_dir.unwrap_or_else(|| Utf8PathBuf::from(".")),
            metadata: args.metadata,
            user_agent: args
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
            limit: args.limit,
        })
    }
}

pub(super) fn run_fetch(args: FetchArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let source = HttpChangeSource::new(config.base_url.clone().into_inner())
        .with_user_agent(config.user_agent.clone());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let mut stdout = std::io::stdout().lock();
    runtime.block_on(run_fetch_with(&config, &source, &mut stdout))
}

/// Mirror the feed and print what was stored and why the run ended.
///
/// A failed download is the expected way for a run to end, so it is reported
/// but not returned as an error.
pub(crate) async fn run_fetch_with(
    config: &FetchConfig,
    source: &dyn ChangeSource,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let log = config
        .metadata
        .as_deref()
        .map(FetchLog::initialise)
        .transpose()?;
    let mut options = MirrorOptions::new(config.start, &config.output_dir);
    if let Some(log) = log.as_ref() {
        options = options.with_log(log);
    }

    let report = mirror_changes(source, options, |sequence| config.limit_reached(sequence)).await?;
    write_report(writer, &report).map_err(CliError::WriteOutput)
}

fn write_report(writer: &mut dyn Write, report: &MirrorReport) -> std::io::Result<()> {
    for file in &report.files {
        writeln!(writer, "Downloaded {}", file.url)?;
    }
    match &report.stop {
        StopReason::FetchFailed {
            sequence, error, ..
        } => writeln!(writer, "Stopped at sequence {sequence}: {error}")?,
        StopReason::Requested { sequence } => {
            writeln!(writer, "Stopped before sequence {sequence}")?;
        }
        StopReason::Exhausted => writeln!(writer, "Reached the last sequence number")?,
    }
    writeln!(
        writer,
        "Mirrored {} sequences ({} bytes) in {:.2} seconds",
        report.completed,
        report.bytes_written(),
        report.elapsed.as_secs_f64()
    )
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<FetchConfig, CliError> {
    let merged = FetchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    FetchConfig::try_from(merged)
}
