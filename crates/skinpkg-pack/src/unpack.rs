//! Extracts a gzip-compressed theme archive.

use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use log::debug;
use skinpkg_core::manifest::MANIFEST_FILE;
use tempfile::TempDir;

use crate::error::PackError;

/// Unpack a theme archive into `dest_dir` and return the package root inside it.
///
/// The destination directory is created if it does not exist. Existing files
/// are overwritten.
///
/// # Errors
///
/// Returns [`PackError::Io`] on any I/O or decompression failure, or
/// [`PackError::NoPackage`] if no `manifest.json` is found at the archive root
/// or one level below it.
pub fn unpack_theme(archive_path: &Path, dest_dir: &Path) -> Result<PathBuf, PackError> {
    std::fs::create_dir_all(dest_dir)?;
    let file = File::open(archive_path)?;
    let decoder = GzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.to_path_buf();
        debug!("unpacking: {}", path.display());
        entry.unpack_in(dest_dir)?;
    }

    find_package_root(dest_dir)
}

/// Unpack a theme archive into a new temporary directory.
///
/// The returned [`TempDir`] owns the directory; it is deleted when dropped.
///
/// # Errors
///
/// Same as [`unpack_theme`].
pub fn unpack_to_tempdir(archive_path: &Path) -> Result<(TempDir, PathBuf), PackError> {
    let tmp = TempDir::new()?;
    let root = unpack_theme(archive_path, tmp.path())?;
    Ok((tmp, root))
}

fn find_package_root(dir: &Path) -> Result<PathBuf, PackError> {
    if dir.join(MANIFEST_FILE).is_file() {
        return Ok(dir.to_path_buf());
    }
    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() && path.join(MANIFEST_FILE).is_file() {
            candidates.push(path);
        }
    }
    candidates.sort();
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| PackError::NoPackage(MANIFEST_FILE.to_owned()))
}
