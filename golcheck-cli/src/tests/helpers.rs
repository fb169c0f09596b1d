//! Temporary directory layouts shared by the CLI tests.

use camino::Utf8PathBuf;
use golcheck_core::test_support::FakeGol;
use std::fs;
use tempfile::TempDir;

/// A fake GOL install: an executable path, a mapdata directory and a work
/// directory, all below one temporary root.
pub(super) struct GolWorkspace {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) gol_exe: Utf8PathBuf,
    pub(super) mapdata: Utf8PathBuf,
    pub(super) work: Utf8PathBuf,
}

impl GolWorkspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let gol_exe = root.join("gol");
        let mapdata = root.join("mapdata");
        let work = root.join("work");
        write_utf8(&gol_exe, b"#!/bin/sh\n");
        fs::create_dir_all(&mapdata).expect("create mapdata dir");
        fs::create_dir_all(&work).expect("create work dir");
        Self {
            _dir: dir,
            root,
            gol_exe,
            mapdata,
            work,
        }
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.work.join("monaco")
    }
}

pub(super) fn write_utf8(path: &Utf8PathBuf, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(path, contents).expect("write file");
}

/// A fake binary that answers the default consistency queries.
pub(super) fn healthy_gol() -> FakeGol {
    FakeGol::new()
        .with_query("*", 42)
        .with_query("w[highway][name=A*]", 3)
        .with_query("a[boundary=administrative][name='La Condamine']", 1)
}

pub(super) fn stdout_text(buffer: &[u8]) -> String {
    String::from_utf8(buffer.to_vec()).expect("stdout utf-8")
}
