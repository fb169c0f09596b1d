//! Core types for checking the GOL command-line tool from the outside.
//!
//! The engine is an external, precompiled binary. This crate runs it as a
//! child process, validates what `query` prints in each output format and
//! drives declarative scenarios whose ground truth is the feature count
//! reported by `-f count`.
//!
//! Boundaries:
//! - No knowledge of the engine's storage format or filter semantics.
//! - A non-zero exit code is data, never a runner error.

#![forbid(unsafe_code)]

mod command;
mod format;
mod invocation;
mod runner;
pub mod scenario;
mod validate;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use command::GolCommand;
pub use format::{OutputFormat, UnknownFormat};
pub use invocation::{CommandRequest, EXIT_SUCCESS, EXIT_USAGE, Invocation};
pub use runner::{CommandRunner, ProcessRunner, RunnerError};
pub use scenario::{
    Scenario, ScenarioFailure, ScenarioKind, ScenarioOutcome, StepRecord, Suite, SuiteConfig,
    SuiteReport, check_consistency,
};
pub use validate::{
    ValidationError, check_count, check_geojson, check_lines, check_wkt, count_lines, parse_count,
    validate,
};
