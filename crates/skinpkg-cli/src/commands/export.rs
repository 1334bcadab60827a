//! `skinpkg export <DEST>` — capture the installed theme as a new package.

use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use skinpkg_resolve::registry::SystemRegistry;

use crate::config::CliConfig;
use crate::export::{export_theme, ExportOptions};

/// Export the device theme to `dest`.
///
/// # Errors
///
/// Returns an error if `dest` exists or any file cannot be written.
pub fn run_export(cfg: &CliConfig, dest: &Path, opts: &ExportOptions) -> Result<()> {
    let dest = cfg.resolve_package(dest);
    let layout = cfg.layout();
    let registry = SystemRegistry::load(&layout).unwrap_or_else(|e| {
        warn!("{e}; system assets will not be exported");
        SystemRegistry::default()
    });

    let manifest = export_theme(&layout, &registry, &dest, opts)
        .with_context(|| format!("failed to export to '{}'", dest.display()))?;
    println!(
        "exported '{}' to {} ({} wallpapers, {} icons)",
        manifest.theme_info.name,
        dest.display(),
        manifest.content.wallpapers.count,
        manifest.path_mappings.icons.len()
    );
    Ok(())
}
