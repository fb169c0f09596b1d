//! Error types produced by the replication mirror.

use std::{io, num::TryFromIntError};

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that abort a mirror run.
///
/// A failed download is not one of them: it ends the run with
/// [`super::StopReason::FetchFailed`] instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReplicationError {
    /// The base URL could not be parsed.
    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        /// Rejected input.
        url: String,
        /// Parser diagnostic.
        source: url::ParseError,
    },
    /// A sequence number exceeded nine decimal digits.
    #[error("sequence number {value} exceeds {max}", max = super::SequenceNumber::MAX)]
    SequenceOutOfRange {
        /// Rejected value.
        value: u64,
    },
    /// Preparing an output directory failed.
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Writing a downloaded file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Destination of the download.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Opening the fetch log failed.
    #[error("failed to initialise fetch log at {path}: {source}")]
    InitialiseLog {
        /// Location of the SQLite database.
        path: Utf8PathBuf,
        /// Underlying SQLite error.
        source: rusqlite::Error,
    },
    /// Recording a stored file failed.
    #[error("failed to record fetch: {source}")]
    RecordLog {
        /// Underlying SQLite error.
        source: rusqlite::Error,
    },
    /// A value could not be converted for SQLite.
    #[error("failed to prepare fetch metadata for persistence ({what}): {source}")]
    RecordLogValue {
        /// Description of the value that failed to convert.
        what: &'static str,
        /// Underlying conversion error.
        source: TryFromIntError,
    },
}

/// Transport-level errors encountered while fetching a file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The server answered with anything other than `200 OK`.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short description of the status.
        message: String,
    },
    /// The request failed before or during the body transfer.
    #[error("network error contacting {url}: {source}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// I/O error reported by the transport.
        source: io::Error,
    },
    /// The body could not be written to the local sink.
    #[error("failed to store body of {url}: {source}")]
    Sink {
        /// Fully qualified request URL.
        url: String,
        /// Local I/O error.
        source: io::Error,
    },
}
