//! `skinpkg import <PATH>` — apply a theme package to the device.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::CliConfig;
use crate::importer::{ImportReport, Importer};
use crate::notify::ConsoleSink;
use crate::validate::StructuralValidator;

/// Import the package directory or archive at `package`.
///
/// # Errors
///
/// Returns an error if the import is aborted; see [`crate::importer::ImportError`].
pub fn run_import(cfg: &CliConfig, package: &Path) -> Result<ImportReport> {
    let path = cfg.resolve_package(package);
    let importer = Importer::new(
        cfg.layout(),
        Box::new(StructuralValidator),
        Box::new(ConsoleSink),
    );
    let report = importer
        .import_path(&path)
        .with_context(|| format!("failed to import '{}'", path.display()))?;

    println!(
        "{} files copied, {} skipped, {} failed",
        report.copied, report.skipped, report.failed
    );
    for slot in &report.font_backups {
        println!("backed up factory font for {slot:?}");
    }
    Ok(report)
}
