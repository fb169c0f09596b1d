//! Sequential mirroring of OSM replication change files.
//!
//! A replication feed publishes `aaa/bbb/ccc.osc.gz` and `aaa/bbb/ccc.state.txt`
//! for every nine-digit sequence number. [`mirror_changes`] walks a
//! [`SequenceCursor`] and copies both files into the same layout on disk until
//! the first download fails.

mod cursor;
mod error;
mod log;
mod ops;
mod source;
mod types;
mod util;

#[cfg(any(test, feature = "test-support"))]
mod test_support;
#[cfg(any(test, feature = "test-support"))]
pub use test_support::{StubChangeSource, block_on_for_tests};

pub use cursor::SequenceCursor;
pub use error::{ReplicationError, TransportError};
pub use self::log::FetchLog;
pub use ops::mirror_changes;
pub use source::{ChangeSource, DEFAULT_USER_AGENT, HttpChangeSource};
pub use types::{
    BaseUrl, MirrorOptions, MirrorReport, ReplicationFile, SequenceNumber, SequencePath,
    StopReason, StoredFile,
};
pub use util::DEFAULT_BASE_URL;
