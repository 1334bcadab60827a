//! `skinpkg update <PATH>` — re-derive a package manifest without importing.

use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use skinpkg_core::manifest::ThemeManifest;
use skinpkg_core::types::Category;
use skinpkg_resolve::registry::SystemRegistry;
use skinpkg_resolve::updater::{ManifestUpdater, Outcome};

use crate::config::CliConfig;

/// Re-derive and rewrite `<package>/manifest.json`.
///
/// An unreadable system registry is not fatal here: tagged names then
/// resolve only through the legacy layout.
///
/// # Errors
///
/// Returns an error if `package` is not a directory or the manifest cannot be written.
pub fn run_update(cfg: &CliConfig, package: &Path) -> Result<ThemeManifest> {
    let path = cfg.resolve_package(package);
    let layout = cfg.layout();
    let registry = match SystemRegistry::load(&layout) {
        Ok(registry) => Some(registry),
        Err(e) => {
            warn!("{e}; system names will not be resolved");
            None
        }
    };

    let (manifest, report) = ManifestUpdater::new(&layout, registry.as_ref())
        .update(&path)
        .with_context(|| format!("failed to update '{}'", path.display()))?;

    for category in Category::ALL {
        let name = category.as_str();
        match report.outcome(category) {
            Some(Outcome::Updated { count, layout: source }) => {
                println!("{name:<10} {count:>4} ({source:?} layout)");
            }
            Some(Outcome::Failed(reason)) => println!("{name:<10} failed: {reason}"),
            None => {}
        }
    }
    println!("updated: {}", path.join(skinpkg_core::manifest::MANIFEST_FILE).display());
    Ok(manifest)
}
