//! Orchestrates the full theme import pipeline.
//!
//! The sequence is fixed: purge installed wallpapers and icons, re-derive the
//! package manifest, validate it, copy every mapping, install fonts (backing up
//! the factory font once), then write accent and LED settings from the
//! manifest. There is no rollback; a failure mid-way leaves the device with a
//! mix of removed and newly applied assets.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use thiserror::Error;

use skinpkg_core::manifest::{PathMapping, ThemeManifest};
use skinpkg_core::settings::{format_leds, merge_accents};
use skinpkg_core::types::{Category, FontSlot};
use skinpkg_pack::unpack::unpack_to_tempdir;
use skinpkg_resolve::error::{RegistryError, UpdateError};
use skinpkg_resolve::layout::{DeviceLayout, BACKGROUND_FILE, ICON_FILE};
use skinpkg_resolve::registry::SystemRegistry;
use skinpkg_resolve::updater::ManifestUpdater;

use crate::fsops::{copy_file, dir_names, remove_if_exists, write_file};
use crate::lock::ImportLock;
use crate::notify::MessageSink;
use crate::validate::{check_accents, check_leds, ManifestValidationError, ManifestValidator};

/// Errors that abort an import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The installed systems could not be listed.
    #[error("system registry unavailable: {0}")]
    Registry(#[from] RegistryError),
    /// Another import holds the lock.
    #[error("another import is in progress (lock '{}')", .0.display())]
    Busy(PathBuf),
    /// The package manifest could not be re-derived or written.
    #[error("manifest update failed: {0}")]
    Update(#[from] UpdateError),
    /// The re-derived manifest failed validation.
    #[error("manifest validation failed: {0}")]
    Validation(#[from] ManifestValidationError),
    /// An archive could not be unpacked.
    #[error("pack error: {0}")]
    Pack(#[from] skinpkg_pack::error::PackError),
    /// An I/O error outside per-asset processing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// What an import did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Name of the applied theme.
    pub theme_name: String,
    /// Previously installed assets removed during purge.
    pub purged: usize,
    /// Files copied to the device.
    pub copied: usize,
    /// Mappings skipped because their source was missing.
    pub skipped: usize,
    /// Mappings or settings that failed to write or were rejected.
    pub failed: usize,
    /// Font slots whose factory font was backed up by this import.
    pub font_backups: Vec<FontSlot>,
    /// Accent colors were written.
    pub accents_applied: bool,
    /// LED settings were written.
    pub leds_applied: bool,
}

/// Applies theme packages to a device.
pub struct Importer {
    layout: DeviceLayout,
    validator: Box<dyn ManifestValidator>,
    sink: Box<dyn MessageSink>,
}

impl Importer {
    /// Create a new `Importer`.
    ///
    /// # Arguments
    ///
    /// * `layout` — Fixed device destinations.
    /// * `validator` — Checks the re-derived manifest before any copy.
    /// * `sink` — Receives the final success message.
    #[must_use]
    pub fn new(
        layout: DeviceLayout,
        validator: Box<dyn ManifestValidator>,
        sink: Box<dyn MessageSink>,
    ) -> Self {
        Self {
            layout,
            validator,
            sink,
        }
    }

    /// Import a package directory, or a `.tar.gz` archive of one.
    ///
    /// # Errors
    ///
    /// See [`Importer::import`]; additionally [`ImportError::Pack`] if the
    /// archive cannot be unpacked.
    pub fn import_path(&self, path: &Path) -> Result<ImportReport, ImportError> {
        if path.is_file() {
            let (_tmp, root) = unpack_to_tempdir(path)?;
            debug!("unpacked {} to {}", path.display(), root.display());
            return self.import(&root);
        }
        self.import(path)
    }

    /// Apply the package at `package` to the device.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Busy`] if another import is running,
    /// [`ImportError::Registry`] if installed systems cannot be listed,
    /// [`ImportError::Update`] if the manifest cannot be written, or
    /// [`ImportError::Validation`] if it fails validation. Per-asset failures
    /// are logged and counted in the report instead.
    pub fn import(&self, package: &Path) -> Result<ImportReport, ImportError> {
        info!("importing theme from {}", package.display());
        let _lock = ImportLock::acquire(&self.layout.import_lock).map_err(|e| {
            if e.kind() == io::ErrorKind::WouldBlock {
                ImportError::Busy(self.layout.import_lock.clone())
            } else {
                ImportError::Io(e)
            }
        })?;

        let registry = SystemRegistry::load(&self.layout)?;

        let purged = purge_installed(&self.layout, &registry);
        debug!("purged {purged} installed assets");

        let updater = ManifestUpdater::new(&self.layout, Some(&registry));
        let (manifest, update) = updater.update(package)?;
        for category in update.failed() {
            warn!("{category} could not be re-derived; using its previous manifest section");
        }

        self.validator.validate(&manifest, &self.layout)?;

        let mut report = ImportReport {
            theme_name: manifest.theme_info.name.clone(),
            purged,
            ..ImportReport::default()
        };

        for category in [Category::Wallpapers, Category::Icons, Category::Overlays] {
            let mappings = manifest
                .path_mappings
                .sequence(category)
                .unwrap_or_default();
            apply_mappings(package, category, mappings, &mut report);
        }
        self.apply_fonts(package, &manifest, &mut report);
        self.apply_settings(&manifest, &mut report);

        info!(
            "imported '{}': {} copied, {} skipped, {} failed",
            report.theme_name, report.copied, report.skipped, report.failed
        );
        self.sink
            .show(&format!("Applied theme '{}'", report.theme_name));
        Ok(report)
    }

    fn apply_fonts(
        &self,
        package: &Path,
        manifest: &ThemeManifest,
        report: &mut ImportReport,
    ) {
        for (active, backup) in [
            (FontSlot::OgFont, FontSlot::OgBackup),
            (FontSlot::NextFont, FontSlot::NextBackup),
        ] {
            let Some(mapping) = manifest.path_mappings.fonts.get(&active) else {
                continue;
            };
            let src = package.join(&mapping.theme_path);
            if !src.is_file() {
                warn!("font source '{}' missing, skipping", mapping.theme_path);
                report.skipped += 1;
                continue;
            }

            let live = self.layout.font_path(active);
            let backup_path = self.layout.font_path(backup);
            if !backup_path.exists() && live.exists() {
                if let Err(e) = copy_file(live, backup_path) {
                    // Never overwrite a factory font we could not back up.
                    error!("failed to back up {}: {e}", live.display());
                    report.failed += 1;
                    continue;
                }
                info!("backed up factory font to {}", backup_path.display());
                report.font_backups.push(active);
            }

            match copy_file(&src, live) {
                Ok(_) => report.copied += 1,
                Err(e) => {
                    error!("failed to install font {}: {e}", live.display());
                    report.failed += 1;
                }
            }
        }
    }

    /// Write inline settings. A category with a malformed color is skipped
    /// and counted as failed; the rest of the import is unaffected.
    fn apply_settings(&self, manifest: &ThemeManifest, report: &mut ImportReport) {
        let accents = manifest.accent_colors.as_ref().filter(|accents| {
            check_accents(accents)
                .map_err(|e| {
                    error!("not applying accent colors: {e}");
                    report.failed += 1;
                })
                .is_ok()
        });
        let leds = manifest.led_settings.as_ref().filter(|leds| {
            check_leds(leds)
                .map_err(|e| {
                    error!("not applying LED settings: {e}");
                    report.failed += 1;
                })
                .is_ok()
        });

        if let Some(accents) = accents {
            let path = &self.layout.accent_settings;
            let existing = match fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
                Err(e) => {
                    warn!("cannot read {}: {e}; writing accents only", path.display());
                    String::new()
                }
            };
            match write_file(path, &merge_accents(&existing, accents)) {
                Ok(()) => report.accents_applied = true,
                Err(e) => {
                    error!("failed to write {}: {e}", path.display());
                    report.failed += 1;
                }
            }
        }

        if let Some(leds) = leds {
            let path = &self.layout.led_settings;
            match write_file(path, &format_leds(leds)) {
                Ok(()) => report.leds_applied = true,
                Err(e) => {
                    error!("failed to write {}: {e}", path.display());
                    report.failed += 1;
                }
            }
        }
    }
}

fn apply_mappings(
    package: &Path,
    category: Category,
    mappings: &[PathMapping],
    report: &mut ImportReport,
) {
    for mapping in mappings {
        let src = package.join(&mapping.theme_path);
        if !src.is_file() {
            warn!("{category} source '{}' missing, skipping", mapping.theme_path);
            report.skipped += 1;
            continue;
        }
        match copy_file(&src, &mapping.system_path) {
            Ok(_) => {
                debug!("{} -> {}", mapping.theme_path, mapping.system_path.display());
                report.copied += 1;
            }
            Err(e) => {
                error!(
                    "failed to copy '{}' to {}: {e}",
                    mapping.theme_path,
                    mapping.system_path.display()
                );
                report.failed += 1;
            }
        }
    }
}

/// Every device location a wallpaper or icon can be installed to.
#[must_use]
pub fn installed_asset_paths(layout: &DeviceLayout, registry: &SystemRegistry) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = layout
        .special_assets()
        .into_iter()
        .map(Path::to_path_buf)
        .collect();

    for entry in registry.entries() {
        paths.push(entry.media_path.join(BACKGROUND_FILE));
        paths.push(entry.media_path.join(ICON_FILE));
    }
    for tool in dir_names(&layout.tools_root) {
        paths.push(layout.tool_media_dir(&tool).join(ICON_FILE));
    }
    for collection in dir_names(&layout.collections_root) {
        let media = layout.collection_media_dir(&collection);
        paths.push(media.join(BACKGROUND_FILE));
        paths.push(media.join(ICON_FILE));
    }
    paths
}

/// Remove every installed wallpaper and icon. Missing files are fine; other
/// removal failures are logged. Returns the number of files removed.
#[must_use]
pub fn purge_installed(layout: &DeviceLayout, registry: &SystemRegistry) -> usize {
    let mut removed = 0;
    for path in installed_asset_paths(layout, registry) {
        match remove_if_exists(&path) {
            Ok(true) => removed += 1,
            Ok(false) => {}
            Err(e) => error!("failed to remove {}: {e}", path.display()),
        }
    }
    removed
}
