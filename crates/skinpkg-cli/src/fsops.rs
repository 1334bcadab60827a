//! Small filesystem primitives shared by import and export.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

/// Copy `src` to `dest`, creating `dest`'s parent directories first.
///
/// # Errors
///
/// Returns any I/O error from directory creation or the copy.
pub fn copy_file(src: &Path, dest: &Path) -> io::Result<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dest)
}

/// Copy `src` to `dest` if `src` is a file. Returns whether a copy happened.
///
/// # Errors
///
/// Returns any I/O error from the copy.
pub fn copy_if_exists(src: &Path, dest: &Path) -> io::Result<bool> {
    if !src.is_file() {
        return Ok(false);
    }
    copy_file(src, dest)?;
    Ok(true)
}

/// Write `contents` to `path`, creating parent directories first.
///
/// # Errors
///
/// Returns any I/O error from directory creation or the write.
pub fn write_file(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

/// Remove a file; a missing file is not an error. Returns whether a file was removed.
///
/// # Errors
///
/// Returns any I/O error other than `NotFound`.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Names of the non-hidden directories directly under `dir`, sorted. A
/// missing or unreadable `dir` yields nothing.
#[must_use]
pub fn dir_names(dir: &Path) -> Vec<String> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| !name.starts_with('.'))
        .collect()
}
