//! Facade crate for the golcheck harness.
//!
//! This crate re-exports the process runner, output validators and scenario
//! types, and exposes the size report and replication mirror behind the
//! `data` feature.

#![forbid(unsafe_code)]

pub use golcheck_core::{
    CommandRequest, CommandRunner, GolCommand, Invocation, OutputFormat, ProcessRunner,
    RunnerError, Scenario, ScenarioFailure, ScenarioKind, ScenarioOutcome, Suite, SuiteConfig,
    SuiteReport, ValidationError, check_consistency, validate,
};

#[cfg(feature = "data")]
pub use golcheck_data::{
    DatasetSizes, FetchLog, HttpChangeSource, MirrorOptions, MirrorReport, ReplicationError,
    SequenceNumber, SizeReportConfig, SizeReportError, StopReason, generate_size_report,
    mirror_changes,
};
