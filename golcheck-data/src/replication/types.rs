//! Domain wrappers for replication endpoints, sequence numbers and mirror results.

use std::{fmt, ops::Deref, time::Duration};

use camino::{Utf8Path, Utf8PathBuf};
use url::Url;

use super::{FetchLog, ReplicationError, TransportError};

/// Base URL of a replication feed, without a trailing slash.
///
/// # Examples
/// ```
/// # use golcheck_data::replication::BaseUrl;
/// let url = BaseUrl::parse("https://planet.openstreetmap.org/replication/minute/")
///     .expect("valid URL");
/// assert_eq!(url.as_ref(), "https://planet.openstreetmap.org/replication/minute");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Wrap `value` without validation.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parse `raw` as an absolute URL and drop trailing slashes.
    ///
    /// # Errors
    /// Returns [`ReplicationError::InvalidBaseUrl`] when `raw` is not an
    /// absolute URL.
    pub fn parse(raw: &str) -> Result<Self, ReplicationError> {
        Url::parse(raw).map_err(|source| ReplicationError::InvalidBaseUrl {
            url: raw.to_owned(),
            source,
        })?;
        Ok(Self::new(raw.trim_end_matches('/')))
    }

    /// Consume the wrapper and return the inner [`String`].
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for BaseUrl {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for BaseUrl {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replication sequence number in `0..=999_999_999`.
///
/// # Examples
/// ```
/// # use golcheck_data::replication::SequenceNumber;
/// let seq = SequenceNumber::try_from(6_154_321_u64).expect("in range");
/// assert_eq!(seq.path().to_string(), "006/154/321");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceNumber(u32);

impl SequenceNumber {
    /// Largest number that fits the nine-digit layout.
    pub const MAX: u32 = 999_999_999;

    /// Numeric value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The following number, or `None` past [`Self::MAX`].
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        if self.0 < Self::MAX {
            Some(Self(self.0 + 1))
        } else {
            None
        }
    }

    /// Directory groups and file stem for this number.
    #[must_use]
    pub fn path(self) -> SequencePath {
        let digits = format!("{:09}", self.0);
        let (group, rest) = digits.split_at(3);
        let (subgroup, stem) = rest.split_at(3);
        SequencePath {
            group: group.to_owned(),
            subgroup: subgroup.to_owned(),
            stem: stem.to_owned(),
        }
    }
}

impl TryFrom<u64> for SequenceNumber {
    type Error = ReplicationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .filter(|number| *number <= Self::MAX)
            .map(Self)
            .ok_or(ReplicationError::SequenceOutOfRange { value })
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `aaa/bbb/ccc` split of a nine-digit sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencePath {
    /// Leading three digits.
    pub group: String,
    /// Middle three digits.
    pub subgroup: String,
    /// Trailing three digits, used as the file stem.
    pub stem: String,
}

impl SequencePath {
    /// Directory holding both files, relative to the feed root.
    #[must_use]
    pub fn directory(&self) -> Utf8PathBuf {
        Utf8Path::new(&self.group).join(&self.subgroup)
    }

    /// File name of `kind` for this sequence.
    #[must_use]
    pub fn file_name(&self, kind: ReplicationFile) -> String {
        format!("{}{}", self.stem, kind.suffix())
    }

    /// Path of `kind` relative to the feed root.
    #[must_use]
    pub fn relative(&self, kind: ReplicationFile) -> Utf8PathBuf {
        self.directory().join(self.file_name(kind))
    }

    /// URL of `kind` under `base`.
    #[must_use]
    pub fn url(&self, base: &BaseUrl, kind: ReplicationFile) -> String {
        format!(
            "{base}/{}/{}/{}",
            self.group,
            self.subgroup,
            self.file_name(kind)
        )
    }
}

impl fmt::Display for SequencePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.group, self.subgroup, self.stem)
    }
}

/// The two files published per sequence number, in download order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplicationFile {
    /// Gzipped osmChange document.
    Change,
    /// Replication state written after the change file.
    State,
}

impl ReplicationFile {
    /// Download order.
    pub const ALL: [Self; 2] = [Self::Change, Self::State];

    /// Suffix appended to the file stem.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Change => ".osc.gz",
            Self::State => ".state.txt",
        }
    }
}

/// One file written under the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Sequence the file belongs to.
    pub sequence: SequenceNumber,
    /// Which of the two files it is.
    pub kind: ReplicationFile,
    /// Source URL.
    pub url: String,
    /// Final location on disk.
    pub path: Utf8PathBuf,
    /// Body length.
    pub bytes: u64,
}

/// Why a mirror run ended.
#[derive(Debug)]
pub enum StopReason {
    /// A download failed; nothing was written for it.
    FetchFailed {
        /// Sequence whose file could not be fetched.
        sequence: SequenceNumber,
        /// URL that failed.
        url: String,
        /// Transport diagnostic.
        error: TransportError,
    },
    /// The stop predicate asked to end before this sequence.
    Requested {
        /// First sequence that was not fetched.
        sequence: SequenceNumber,
    },
    /// Every sequence up to [`SequenceNumber::MAX`] was stored.
    Exhausted,
}

/// Summary of a mirror run.
#[derive(Debug)]
pub struct MirrorReport {
    /// Files stored, in download order.
    pub files: Vec<StoredFile>,
    /// Number of sequences for which both files were stored.
    pub completed: u64,
    /// Why the run ended.
    pub stop: StopReason,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

impl MirrorReport {
    /// Total bytes written.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.files.iter().map(|file| file.bytes).sum()
    }
}

/// Options controlling where a mirror run starts and writes.
///
/// # Examples
/// ```
/// # use camino::Utf8Path;
/// # use golcheck_data::replication::{MirrorOptions, SequenceNumber};
/// let start = SequenceNumber::try_from(42_u64).expect("in range");
/// let options = MirrorOptions::new(start, Utf8Path::new("mirror"));
/// assert!(options.log.is_none());
/// assert_eq!(options.start, start);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MirrorOptions<'a> {
    /// First sequence to fetch.
    pub start: SequenceNumber,
    /// Directory that receives the `aaa/bbb/` tree.
    pub output_root: &'a Utf8Path,
    /// Optional fetch log used for persistence.
    pub log: Option<&'a FetchLog>,
}

impl<'a> MirrorOptions<'a> {
    /// Options starting at `start` and writing below `output_root`.
    #[must_use]
    pub const fn new(start: SequenceNumber, output_root: &'a Utf8Path) -> Self {
        Self {
            start,
            output_root,
            log: None,
        }
    }

    /// Record every stored file in `log`.
    #[must_use]
    pub const fn with_log(mut self, log: &'a FetchLog) -> Self {
        self.log = Some(log);
        self
    }
}
