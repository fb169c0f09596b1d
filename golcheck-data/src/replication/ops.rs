use std::{
    io::{self, Write},
    time::Instant,
};

use camino::Utf8Path;
use log::{info, warn};
use tempfile::NamedTempFile;

use super::source::ChangeSource;
use super::{
    MirrorOptions, MirrorReport, ReplicationError, ReplicationFile, SequenceCursor,
    SequenceNumber, StopReason, StoredFile, TransportError,
};

/// Mirror change and state files until a fetch fails, `stop` returns `true`
/// or the sequence range is exhausted.
///
/// For each sequence number the `.osc.gz` file is fetched before the
/// `.state.txt` file, and both land in `<output_root>/aaa/bbb/`. Bodies are
/// staged in a temporary file under `output_root` and only renamed into
/// place once complete, so a failed download creates no directories. Provide a [`super::FetchLog`] through `options` to
/// record every stored file.
///
/// # Errors
/// Download failures end the run with [`StopReason::FetchFailed`]. Local I/O
/// and fetch-log failures are returned as [`ReplicationError`].
///
/// # Examples
/// ```
/// # use camino::Utf8Path;
/// # use golcheck_data::replication::{
/// #     BaseUrl, MirrorOptions, ReplicationError, SequenceNumber, StopReason, StubChangeSource,
/// #     block_on_for_tests, mirror_changes,
/// # };
/// # fn example() -> Result<(), ReplicationError> {
/// let temp = tempfile::tempdir().expect("create temp directory");
/// let root = Utf8Path::from_path(temp.path()).expect("UTF-8 temp path");
/// let start = SequenceNumber::try_from(1_u64)?;
/// let source = StubChangeSource::new(BaseUrl::from("https://example.org"))
///     .with_sequence(start, b"change".to_vec(), b"state".to_vec());
/// let report = block_on_for_tests(mirror_changes(
///     &source,
///     MirrorOptions::new(start, root),
///     |_| false,
/// ))?;
/// assert_eq!(report.completed, 1);
/// assert!(matches!(report.stop, StopReason::FetchFailed { .. }));
/// assert!(root.join("000/000/001.osc.gz").is_file());
/// # Ok(())
/// # }
/// # example().expect("mirror succeeds");
/// ```
pub async fn mirror_changes<S, F>(
    source: &S,
    options: MirrorOptions<'_>,
    mut stop: F,
) -> Result<MirrorReport, ReplicationError>
where
    S: ChangeSource + ?Sized,
    F: FnMut(SequenceNumber) -> bool,
{
    let started = Instant::now();
    let mut files = Vec::new();
    let mut completed = 0_u64;

    let reason = 'mirror: {
        for sequence in SequenceCursor::new(options.start) {
            if stop(sequence) {
                break 'mirror StopReason::Requested { sequence };
            }
            let path = sequence.path();
            for kind in ReplicationFile::ALL {
                let url = path.url(source.base_url(), kind);
                let target = options.output_root.join(path.relative(kind));
                info!("downloading {url}");
                match store(source, &url, options.output_root, &target).await? {
                    Ok(bytes) => {
                        let stored = StoredFile {
                            sequence,
                            kind,
                            url,
                            path: target,
                            bytes,
                        };
                        if let Some(log) = options.log {
                            log.record(&stored)?;
                        }
                        files.push(stored);
                    }
                    Err(error) => {
                        warn!("fetch failed, stopping: {error}");
                        break 'mirror StopReason::FetchFailed {
                            sequence,
                            url,
                            error,
                        };
                    }
                }
            }
            completed += 1;
        }
        StopReason::Exhausted
    };

    let report = MirrorReport {
        files,
        completed,
        stop: reason,
        elapsed: started.elapsed(),
    };
    info!(
        "mirrored {} sequences ({} bytes) in {:.2}s",
        report.completed,
        report.bytes_written(),
        report.elapsed.as_secs_f64()
    );
    Ok(report)
}

/// Fetch `url` into `target` through a staging file under `root`.
///
/// The outer error is a local failure; the inner one is a failed download,
/// after which nothing exists at `target` and its directory is untouched.
async fn store<S: ChangeSource + ?Sized>(
    source: &S,
    url: &str,
    root: &Utf8Path,
    target: &Utf8Path,
) -> Result<Result<u64, TransportError>, ReplicationError> {
    let create_error = |dir: &Utf8Path, err: io::Error| ReplicationError::CreateDir {
        path: dir.to_path_buf(),
        source: err,
    };
    golcheck_fs::ensure_dir(root).map_err(|err| create_error(root, err))?;
    let write_error = |err: io::Error| ReplicationError::Write {
        path: target.to_path_buf(),
        source: err,
    };
    let mut staging = NamedTempFile::new_in(root).map_err(write_error)?;
    let bytes = match source.fetch(url, &mut staging).await {
        Ok(bytes) => bytes,
        Err(TransportError::Sink { source: err, .. }) => return Err(write_error(err)),
        Err(error) => return Ok(Err(error)),
    };
    staging.flush().map_err(write_error)?;
    let dir = target.parent().unwrap_or(root);
    golcheck_fs::ensure_dir(dir).map_err(|err| create_error(dir, err))?;
    staging
        .persist(target)
        .map_err(|err| write_error(err.error))?;
    Ok(Ok(bytes))
}
