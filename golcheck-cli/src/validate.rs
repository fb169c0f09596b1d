//! Up-front path checks shared by the subcommands.

use std::io::{self, ErrorKind};

use camino::{Utf8Path, Utf8PathBuf};

use crate::CliError;

pub(crate) fn require_file(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match golcheck_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == ErrorKind::NotFound => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub(crate) fn require_dir(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match golcheck_fs::dir_is_dir(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::NotADirectory {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == ErrorKind::NotFound => Err(CliError::NotADirectory {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Accept a missing directory (it will be created) but reject anything else.
pub(crate) fn allow_dir(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match require_dir(path, field) {
        Err(CliError::NotADirectory { .. }) if !path.exists() => Ok(()),
        other => other,
    }
}

/// Anchor a relative path to the current directory.
///
/// The GOL binary runs inside the work directory, so any path handed to it
/// must not depend on where the harness itself was started.
pub(crate) fn anchor(path: Utf8PathBuf, field: &'static str) -> Result<Utf8PathBuf, CliError> {
    if path.is_absolute() {
        return Ok(path);
    }
    std::path::absolute(&path)
        .and_then(|resolved| {
            Utf8PathBuf::from_path_buf(resolved).map_err(|_| {
                io::Error::new(ErrorKind::InvalidData, "current directory is not UTF-8")
            })
        })
        .map_err(|source| CliError::InspectSourcePath {
            field,
            path,
            source,
        })
}
