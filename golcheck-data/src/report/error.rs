use std::io;

use camino::Utf8PathBuf;
use golcheck_core::RunnerError;
use thiserror::Error;

/// Errors that stop a size report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SizeReportError {
    /// The engine could not be started.
    #[error("failed to run `{step}`: {source}")]
    Runner {
        /// Command line that could not be run.
        step: String,
        /// Underlying runner error.
        source: RunnerError,
    },
    /// A file the report measures does not exist or is not a regular file.
    #[error("missing artefact {path}: {source}")]
    MissingArtefact {
        /// Expected location.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Writing a CSV row failed.
    #[error("failed to write size report: {source}")]
    Csv {
        /// Underlying CSV error.
        #[from]
        source: csv::Error,
    },
    /// Flushing the output failed.
    #[error("failed to flush size report: {source}")]
    Flush {
        /// Underlying I/O error.
        source: io::Error,
    },
}
