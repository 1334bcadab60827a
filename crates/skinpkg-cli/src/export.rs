//! Builds a theme package from the assets currently installed on a device.
//!
//! Assets are laid out in the current package layout and the package
//! manifest is then produced by the manifest updater, so an exported package
//! imports back onto the same device paths.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, info, warn};
use skinpkg_core::manifest::{ThemeInfo, ThemeManifest};
use skinpkg_core::settings::{format_accents, format_leds, parse_accents, parse_leds};
use skinpkg_core::types::{FontSlot, SettingsSlot};
use skinpkg_resolve::error::UpdateError;
use skinpkg_resolve::layout::{DeviceLayout, BACKGROUND_FILE, ICON_FILE};
use skinpkg_resolve::registry::SystemRegistry;
use skinpkg_resolve::resolver::{
    COLLECTION_ICONS_DIR, COLLECTION_WALLPAPERS_DIR, FONTS_DIR, OVERLAYS_DIR, SYSTEM_ICONS_DIR,
    SYSTEM_WALLPAPERS_DIR, TOOL_ICONS_DIR,
};
use skinpkg_resolve::updater::{write_manifest, ManifestUpdater, TOOL_VERSION};
use thiserror::Error;
use walkdir::WalkDir;

use crate::fsops::{copy_if_exists, dir_names, write_file};

/// Errors produced while exporting.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The destination already exists.
    #[error("destination '{}' already exists", .0.display())]
    DestinationExists(PathBuf),
    /// A file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The manifest could not be produced.
    #[error("manifest update failed: {0}")]
    Update(#[from] UpdateError),
}

/// Authoring fields for an exported package.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Theme display name.
    pub name: String,
    /// Author name.
    pub author: String,
    /// Version string.
    pub version: String,
}

impl ExportOptions {
    /// Options with the default version.
    #[must_use]
    pub fn new(name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
            version: ThemeInfo::default().version,
        }
    }
}

/// Copy the device's installed theme into a new package at `dest` and write
/// its manifest. Returns the manifest.
///
/// Fonts are exported only when a factory backup exists, since otherwise the
/// live font is the factory one.
///
/// # Errors
///
/// Returns [`ExportError::DestinationExists`] if `dest` exists, or an I/O or
/// manifest error.
pub fn export_theme(
    layout: &DeviceLayout,
    registry: &SystemRegistry,
    dest: &Path,
    opts: &ExportOptions,
) -> Result<ThemeManifest, ExportError> {
    if dest.exists() {
        return Err(ExportError::DestinationExists(dest.to_path_buf()));
    }
    fs::create_dir_all(dest)?;
    info!("exporting device theme to {}", dest.display());

    let copied = export_assets(layout, registry, dest)?;
    export_settings(layout, dest)?;

    let manifest = ThemeManifest {
        theme_info: ThemeInfo {
            name: opts.name.clone(),
            version: opts.version.clone(),
            author: opts.author.clone(),
            creation_date: Utc::now(),
            exported_by: TOOL_VERSION.to_owned(),
        },
        ..ThemeManifest::default()
    };
    write_manifest(dest, &manifest)?;

    let (manifest, _) = ManifestUpdater::new(layout, Some(registry)).update(dest)?;
    info!("exported '{}' ({copied} files)", manifest.theme_info.name);
    Ok(manifest)
}

/// Copy wallpapers, icons, overlays and customized fonts into the package.
/// Returns the number of files copied.
fn export_assets(
    layout: &DeviceLayout,
    registry: &SystemRegistry,
    dest: &Path,
) -> io::Result<usize> {
    let mut copied = 0usize;
    let mut copy = |src: &Path, rel: String| -> io::Result<()> {
        if copy_if_exists(src, &dest.join(&rel))? {
            debug!("{} -> {rel}", src.display());
            copied += 1;
        }
        Ok(())
    };

    for (stem, src) in [
        ("Root", &layout.root_background),
        ("Root-Media", &layout.root_media_background),
        ("Recently Played", &layout.recently_played_background),
        ("Tools", &layout.tools_background),
        ("Collections", &layout.collections_background),
    ] {
        copy(src, format!("{SYSTEM_WALLPAPERS_DIR}/{stem}.png"))?;
    }
    for (stem, src) in [
        ("Recently Played", &layout.recently_played_icon),
        ("Tools", &layout.tools_icon),
        ("Collections", &layout.collections_icon),
    ] {
        copy(src, format!("{SYSTEM_ICONS_DIR}/{stem}.png"))?;
    }

    for entry in registry.entries() {
        let stem = format!("{} ({})", entry.name, entry.tag);
        copy(
            &entry.media_path.join(BACKGROUND_FILE),
            format!("{SYSTEM_WALLPAPERS_DIR}/{stem}.png"),
        )?;
        copy(
            &entry.media_path.join(ICON_FILE),
            format!("{SYSTEM_ICONS_DIR}/{stem}.png"),
        )?;
    }

    for tool in dir_names(&layout.tools_root) {
        copy(
            &layout.tool_media_dir(&tool).join(ICON_FILE),
            format!("{TOOL_ICONS_DIR}/{tool}.png"),
        )?;
    }
    for collection in dir_names(&layout.collections_root) {
        let media = layout.collection_media_dir(&collection);
        copy(
            &media.join(BACKGROUND_FILE),
            format!("{COLLECTION_WALLPAPERS_DIR}/{collection}.png"),
        )?;
        copy(
            &media.join(ICON_FILE),
            format!("{COLLECTION_ICONS_DIR}/{collection}.png"),
        )?;
    }

    for overlay in overlay_files(&layout.overlays_root) {
        copy(
            &layout.overlays_root.join(&overlay),
            format!("{OVERLAYS_DIR}/{overlay}"),
        )?;
    }

    for (active, backup) in [
        (FontSlot::OgFont, FontSlot::OgBackup),
        (FontSlot::NextFont, FontSlot::NextBackup),
    ] {
        let backup_path = layout.font_path(backup);
        if !backup_path.is_file() {
            continue;
        }
        copy(
            layout.font_path(active),
            format!("{FONTS_DIR}/{}", active.package_file_name()),
        )?;
        copy(backup_path, format!("{FONTS_DIR}/{}", backup.package_file_name()))?;
    }
    Ok(copied)
}

/// Write the device settings files into the package, normalized. Unparseable
/// device files are skipped.
fn export_settings(layout: &DeviceLayout, dest: &Path) -> io::Result<()> {
    if let Some(text) = read_optional(&layout.accent_settings)? {
        match parse_accents(&text) {
            Ok(accents) => write_file(
                &dest.join(SettingsSlot::Accents.package_path()),
                &format_accents(&accents),
            )?,
            Err(e) => warn!(
                "skipping accents from {}: {e}",
                layout.accent_settings.display()
            ),
        }
    }
    if let Some(text) = read_optional(&layout.led_settings)? {
        match parse_leds(&text) {
            Ok(leds) => write_file(
                &dest.join(SettingsSlot::Leds.package_path()),
                &format_leds(&leds),
            )?,
            Err(e) => warn!(
                "skipping LED settings from {}: {e}",
                layout.led_settings.display()
            ),
        }
    }
    Ok(())
}

fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// `<system>/<file>.png` paths under the device overlays directory.
fn overlay_files(root: &Path) -> Vec<String> {
    WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let rel = e.path().strip_prefix(root).ok()?;
            let rel = rel.to_str()?.replace('\\', "/");
            let png = Path::new(&rel)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            (png && !rel.starts_with('.')).then_some(rel)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn existing_destination_is_rejected() {
        let device = tempdir().unwrap();
        let layout = DeviceLayout::new(device.path(), "tg5040");
        let out = tempdir().unwrap();
        let err = export_theme(
            &layout,
            &SystemRegistry::default(),
            out.path(),
            &ExportOptions::new("X", "me"),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::DestinationExists(_)));
    }

    #[test]
    fn factory_fonts_are_not_exported() {
        let device = tempdir().unwrap();
        let layout = DeviceLayout::new(device.path(), "tg5040");
        fs::create_dir_all(layout.og_font.parent().unwrap()).unwrap();
        fs::write(&layout.og_font, b"factory").unwrap();
        fs::write(&layout.next_font, b"custom").unwrap();
        fs::write(&layout.next_font_backup, b"factory").unwrap();

        let out = tempdir().unwrap();
        let pkg = out.path().join("Mine.theme");
        let manifest = export_theme(
            &layout,
            &SystemRegistry::default(),
            &pkg,
            &ExportOptions::new("Mine", "me"),
        )
        .unwrap();

        assert!(!pkg.join("Fonts/OG.ttf").exists());
        assert_eq!(fs::read(pkg.join("Fonts/Next.ttf")).unwrap(), b"custom");
        assert!(manifest.content.fonts.next_replaced);
        assert!(!manifest.content.fonts.og_replaced);
    }

    #[test]
    fn overlay_paths_are_system_relative() {
        let device = tempdir().unwrap();
        let root = device.path().join("Overlays");
        fs::create_dir_all(root.join("GB")).unwrap();
        fs::write(root.join("GB/grid.png"), b"png").unwrap();
        fs::write(root.join("GB/notes.txt"), b"x").unwrap();
        assert_eq!(overlay_files(&root), ["GB/grid.png"]);
    }
}
