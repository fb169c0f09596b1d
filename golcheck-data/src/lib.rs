//! Batch jobs that sit next to the GOL checks.
//!
//! Responsibilities:
//! - Measure the artefacts the engine writes for a list of datasets and
//!   report them as CSV.
//! - Mirror OSM replication change files from a base URL by sequence number.
//!
//! Boundaries:
//! - The engine is driven only through [`golcheck_core::CommandRunner`].
//! - HTTP access sits behind [`replication::ChangeSource`] so the mirror loop
//!   runs without a network in tests.

#![forbid(unsafe_code)]

pub mod replication;
pub mod report;

pub use replication::{
    BaseUrl, ChangeSource, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, FetchLog, HttpChangeSource,
    MirrorOptions, MirrorReport, ReplicationError, SequenceCursor, SequenceNumber, SequencePath,
    StopReason, TransportError, mirror_changes,
};
pub use report::{DatasetSizes, SizeReportConfig, SizeReportError, generate_size_report};
