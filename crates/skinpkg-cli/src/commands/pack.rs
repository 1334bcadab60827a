//! `skinpkg pack <PATH>` — update a package manifest and archive the package.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use skinpkg_pack::pack::{pack_theme, ARCHIVE_EXTENSION};
use skinpkg_resolve::registry::SystemRegistry;
use skinpkg_resolve::updater::{package_name, ManifestUpdater};

use crate::config::CliConfig;

/// Default archive path for `package`: `<parent>/<name>.theme.tar.gz`.
#[must_use]
pub fn default_output(package: &Path) -> PathBuf {
    let name = format!("{}.{ARCHIVE_EXTENSION}", package_name(package));
    package
        .parent()
        .map_or_else(|| PathBuf::from(&name), |p| p.join(&name))
}

/// Re-derive the manifest of `package`, then pack it to `output` (or the
/// default archive path). Returns the archive path.
///
/// # Errors
///
/// Returns an error if the manifest cannot be updated or the archive cannot be written.
pub fn run_pack(cfg: &CliConfig, package: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let path = cfg.resolve_package(package);
    let layout = cfg.layout();
    let registry = SystemRegistry::load(&layout).ok();

    ManifestUpdater::new(&layout, registry.as_ref())
        .update(&path)
        .with_context(|| format!("failed to update '{}'", path.display()))?;

    let output = output.map_or_else(|| default_output(&path), Path::to_path_buf);
    pack_theme(&path, &output).with_context(|| format!("failed to pack '{}'", path.display()))?;
    println!("packed: {}", output.display());
    Ok(output)
}
