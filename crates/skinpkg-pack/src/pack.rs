//! Creates a gzip-compressed theme archive from a package directory.

use std::fs::File;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use skinpkg_core::manifest::MANIFEST_FILE;

use crate::error::PackError;

/// Extension appended to archive file names.
pub const ARCHIVE_EXTENSION: &str = "theme.tar.gz";

/// Pack a theme package directory into a gzip-compressed tarball at `output_path`.
///
/// Entries are stored under a single top-level directory named after the
/// package directory, so unpacking recreates `<name>/manifest.json`. Hidden
/// files other than `.media` directories are excluded.
///
/// # Errors
///
/// Returns [`PackError::MissingFile`] if `manifest.json` is absent, or
/// [`PackError::Io`] on any I/O failure.
pub fn pack_theme(source_dir: &Path, output_path: &Path) -> Result<(), PackError> {
    if !source_dir.join(MANIFEST_FILE).is_file() {
        return Err(PackError::MissingFile(MANIFEST_FILE.to_owned()));
    }
    let top = source_dir
        .file_name()
        .map_or_else(|| "theme".into(), |n| n.to_os_string());

    let file = File::create(output_path)?;
    let encoder = GzEncoder::new(file, Compression::best());
    let mut archive = tar::Builder::new(encoder);
    archive.follow_symlinks(false);

    append_dir(&mut archive, source_dir, Path::new(&top))?;

    archive.into_inner()?.finish()?;
    Ok(())
}

fn append_dir<W: std::io::Write>(
    archive: &mut tar::Builder<W>,
    dir: &Path,
    name_in_archive: &Path,
) -> Result<(), PackError> {
    archive.append_dir(name_in_archive, dir)?;

    let mut entries = std::fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        let path = entry.path();

        if name_str.starts_with('.') && !(name_str == ".media" && path.is_dir()) {
            continue;
        }

        let target = name_in_archive.join(&name);
        debug!("packing: {}", path.display());

        if path.is_dir() {
            append_dir(archive, &path, &target)?;
        } else {
            archive.append_path_with_name(&path, &target)?;
        }
    }
    Ok(())
}
