use thiserror::Error;

use crate::{OutputFormat, RunnerError, ValidationError};

/// Why a scenario stopped before completing.
#[derive(Debug, Error)]
pub enum ScenarioFailure {
    /// The child process could not be run at all.
    #[error("`{step}` could not be run: {source}")]
    Runner {
        /// Command line of the failing step.
        step: String,
        /// Underlying runner error.
        #[source]
        source: RunnerError,
    },
    /// The child exited with a different code than the scenario expects.
    #[error("`{step}` exited with {actual:?}, expected {expected}: {stderr}")]
    UnexpectedExit {
        /// Command line of the failing step.
        step: String,
        /// Exit code the scenario requires.
        expected: i32,
        /// Observed exit code; `None` when killed by a signal.
        actual: Option<i32>,
        /// Trimmed standard error of the step.
        stderr: String,
    },
    /// Output of a query step failed validation.
    #[error("`{step}` produced invalid {format} output: {source}")]
    Validation {
        /// Command line of the failing step.
        step: String,
        /// Format that was validated.
        format: OutputFormat,
        /// Validation error.
        #[source]
        source: ValidationError,
    },
    /// Version output did not mention the product.
    #[error("version output does not mention {product:?}: {stdout:?}")]
    MissingProductName {
        /// Expected product name.
        product: String,
        /// Captured standard output.
        stdout: String,
    },
    /// A usage error was reported without the expected diagnostic.
    #[error("stderr does not mention {needle:?}: {stderr:?}")]
    MissingDiagnostic {
        /// Word expected in the diagnostic, compared case-insensitively.
        needle: &'static str,
        /// Captured standard error.
        stderr: String,
    },
    /// A query expected to match features matched none.
    #[error("query {filter:?} returned no features")]
    EmptyResult {
        /// Query filter.
        filter: String,
    },
    /// A query expected to match nothing returned features.
    #[error("query {filter:?} returned {count} features, expected none")]
    UnexpectedResults {
        /// Query filter.
        filter: String,
        /// Reported count.
        count: usize,
    },
}
