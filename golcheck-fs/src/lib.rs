//! Capability-based filesystem helpers shared by the golcheck crates.
//!
//! Every helper resolves an ambient directory for the parent of the supplied
//! path and performs the operation relative to it, so callers can pass
//! absolute or relative UTF-8 paths interchangeably.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io;
use std::path::Component;

/// Resolve an ambient directory for the given path and return the directory with the file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("target should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Ensure the parent directory for `path` exists.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => ensure_dir(parent),
        None => Ok(()),
    }
}

/// Create `dir` and any missing ancestors.
pub fn ensure_dir(dir: &Utf8Path) -> io::Result<()> {
    if dir.as_str().is_empty() || dir == Utf8Path::new("/") {
        return Ok(());
    }
    let (base_dir, relative) = base_dir_and_relative(dir)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)
}

/// Return whether a path exists and is a regular file.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Return whether a path exists and is a directory.
pub fn dir_is_dir(path: &Utf8Path) -> io::Result<bool> {
    if path.file_name().is_none() {
        // `/`, `.` and `..` have no file name but are directories when they resolve.
        return fs_utf8::Dir::open_ambient_dir(path, ambient_authority())
            .and_then(|dir| dir.dir_metadata())
            .map(|meta| meta.is_dir());
    }
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_dir())
}

/// Size of the file at `path` in bytes.
pub fn file_size(path: &Utf8Path) -> io::Result<u64> {
    let (dir, name) = open_dir_and_file(path)?;
    let meta = dir.metadata(name.as_str())?;
    if meta.is_file() {
        Ok(meta.len())
    } else {
        Err(io::Error::other(format!("{path} is not a regular file")))
    }
}

/// Split an absolute or relative path into an ambient base directory and a relative suffix.
pub fn base_dir_and_relative(parent: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_parent = parent.as_std_path();

    let (base, relative) = match std_parent.components().next() {
        // Windows drive or UNC prefix.
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;

            let base = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_parent.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other("failed to strip prefix from path"))?
                .to_path_buf();
            (base, relative)
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other("failed to strip root from absolute path"))?
                .to_path_buf();
            (base, relative)
        }
        _ => (Utf8PathBuf::from("."), std_parent.to_path_buf()),
    };

    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    let relative =
        Utf8PathBuf::from_path_buf(relative).map_err(|_| io::Error::other("non-UTF-8 path"))?;

    Ok((dir, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn workspace() -> (TempDir, Utf8PathBuf) {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 tempdir");
        (tmp, root)
    }

    #[rstest]
    fn ensure_parent_dir_creates_nested_directories(workspace: (TempDir, Utf8PathBuf)) {
        let (_tmp, root) = workspace;
        let target = root.join("000").join("123").join("456.osc.gz");
        ensure_parent_dir(&target).expect("create parents");
        assert!(root.join("000").join("123").is_dir());
        assert!(!target.exists(), "only the parent should be created");
    }

    #[rstest]
    fn ensure_dir_is_idempotent(workspace: (TempDir, Utf8PathBuf)) {
        let (_tmp, root) = workspace;
        let dir = root.join("mirror");
        ensure_dir(&dir).expect("first create");
        ensure_dir(&dir).expect("second create");
        assert!(dir_is_dir(&dir).expect("inspect"));
    }

    #[rstest]
    fn file_size_reports_length(workspace: (TempDir, Utf8PathBuf)) {
        let (_tmp, root) = workspace;
        let path = root.join("liguria.gol");
        fs::write(&path, b"twelve bytes").expect("write file");
        assert_eq!(file_size(&path).expect("size"), 12);
        assert!(file_is_file(&path).expect("inspect"));
    }

    #[rstest]
    fn file_size_rejects_directories(workspace: (TempDir, Utf8PathBuf)) {
        let (_tmp, root) = workspace;
        let err = file_size(&root).expect_err("directory has no file size");
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }

    #[rstest]
    fn missing_files_surface_not_found(workspace: (TempDir, Utf8PathBuf)) {
        let (_tmp, root) = workspace;
        let err = file_is_file(&root.join("absent.gol")).expect_err("missing file");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
