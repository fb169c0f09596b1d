//! Behavioural coverage for the replication mirror.

use crate::replication::test_support::{StubChangeSource, block_on_for_tests};
use crate::replication::{
    BaseUrl, MirrorOptions, MirrorReport, ReplicationError, SequenceNumber, StopReason,
    mirror_changes,
};
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tempfile::TempDir;

type MirrorResultCell = RefCell<Option<Result<MirrorReport, ReplicationError>>>;

#[derive(Debug, Default)]
struct MirrorContext {
    source: RefCell<Option<StubChangeSource>>,
    output: RefCell<Option<TempDir>>,
    result: MirrorResultCell,
}

#[fixture]
fn mirror_context() -> MirrorContext {
    MirrorContext::default()
}

fn sequence(value: u64) -> SequenceNumber {
    match SequenceNumber::try_from(value) {
        Ok(sequence) => sequence,
        Err(err) => panic!("invalid sequence {value}: {err}"),
    }
}

#[given("a feed publishing sequences {first:u64} to {last:u64}")]
fn feed(#[from(mirror_context)] ctx: &MirrorContext, first: u64, last: u64) {
    let stub = (first..=last).fold(
        StubChangeSource::new(BaseUrl::from("https://example.org/minute")),
        |stub, value| {
            stub.with_sequence(
                sequence(value),
                format!("change {value}").into_bytes(),
                format!("state {value}").into_bytes(),
            )
        },
    );
    *ctx.source.borrow_mut() = Some(stub);
}

#[given("an empty output directory")]
fn output_directory(#[from(mirror_context)] ctx: &MirrorContext) {
    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temporary directory: {err}"),
    };
    *ctx.output.borrow_mut() = Some(dir);
}

#[when("I mirror the feed from sequence {start:u64}")]
fn mirror(#[from(mirror_context)] ctx: &MirrorContext, start: u64) {
    let source_borrow = ctx.source.borrow();
    let stub = source_borrow
        .as_ref()
        .unwrap_or_else(|| panic!("feed must be initialised"));
    let output_borrow = ctx.output.borrow();
    let root = output_borrow
        .as_ref()
        .and_then(|dir| Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).ok())
        .unwrap_or_else(|| panic!("output directory must be prepared"));
    let outcome = block_on_for_tests(mirror_changes(
        stub,
        MirrorOptions::new(sequence(start), &root),
        |_| false,
    ));
    *ctx.result.borrow_mut() = Some(outcome);
}

#[then("{count:u64} sequences are stored")]
fn sequences_stored(#[from(mirror_context)] ctx: &MirrorContext, count: u64) {
    let borrowed = ctx.result.borrow();
    let Some(Ok(report)) = borrowed.as_ref() else {
        panic!("mirror should have completed without local errors");
    };
    assert_eq!(report.completed, count);
    let output_borrow = ctx.output.borrow();
    let dir = output_borrow
        .as_ref()
        .unwrap_or_else(|| panic!("output directory must be prepared"));
    for file in &report.files {
        assert!(file.path.starts_with(dir.path()));
        assert!(file.path.is_file(), "{} should exist", file.path);
    }
}

#[then("the run stops at sequence {stop:u64}")]
fn run_stops_at(#[from(mirror_context)] ctx: &MirrorContext, stop: u64) {
    let borrowed = ctx.result.borrow();
    let Some(Ok(report)) = borrowed.as_ref() else {
        panic!("mirror should have completed without local errors");
    };
    match &report.stop {
        StopReason::FetchFailed { sequence: failed, .. } => assert_eq!(*failed, sequence(stop)),
        other => panic!("unexpected stop reason {other:?}"),
    }
}

#[scenario(path = "tests/features/replication_mirror.feature", index = 0)]
fn mirrors_until_feed_runs_out(mirror_context: MirrorContext) {
    let _ = mirror_context;
}

#[scenario(path = "tests/features/replication_mirror.feature", index = 1)]
fn starting_past_the_end(mirror_context: MirrorContext) {
    let _ = mirror_context;
}
