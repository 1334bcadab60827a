//! Re-derives a package manifest from the package's current file tree.
//!
//! Each category's mapping section is replaced wholesale by a fresh scan; a
//! legacy-layout scan runs only when the current layout finds nothing for that
//! category. A failing category keeps its previous section.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use skinpkg_core::manifest::{ThemeInfo, ThemeManifest, MANIFEST_FILE};
use skinpkg_core::settings::{parse_accents, parse_leds};
use skinpkg_core::types::{Category, SettingsSlot};
use tempfile::NamedTempFile;

use crate::error::{CategoryError, UpdateError};
use crate::layout::DeviceLayout;
use crate::registry::SystemRegistry;
use crate::resolver::{Layout, PathResolver, Resolution};

/// Producing-tool string recorded in new manifests.
pub const TOOL_VERSION: &str = concat!("skinpkg ", env!("CARGO_PKG_VERSION"));

/// Result of re-deriving one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The section was replaced.
    Updated {
        /// Mappings (or extracted settings files) found.
        count: usize,
        /// Which package layout supplied them.
        layout: Layout,
    },
    /// The section was left untouched because processing failed.
    Failed(String),
}

/// Per-category outcomes of one update pass, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// One entry per category.
    pub categories: Vec<(Category, Outcome)>,
}

impl UpdateReport {
    /// Outcome recorded for `category`.
    #[must_use]
    pub fn outcome(&self, category: Category) -> Option<&Outcome> {
        self.categories
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, o)| o)
    }

    /// Categories whose processing failed.
    pub fn failed(&self) -> impl Iterator<Item = Category> + '_ {
        self.categories
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::Failed(_)))
            .map(|(c, _)| *c)
    }
}

/// Re-derives manifests using a [`PathResolver`].
#[derive(Debug, Clone, Copy)]
pub struct ManifestUpdater<'a> {
    resolver: PathResolver<'a>,
}

impl<'a> ManifestUpdater<'a> {
    /// Create an updater for the given device.
    #[must_use]
    pub fn new(layout: &'a DeviceLayout, registry: Option<&'a SystemRegistry>) -> Self {
        Self {
            resolver: PathResolver::new(layout, registry),
        }
    }

    /// Load the package's manifest (or a default), re-derive every category,
    /// and write the result back to `<root>/manifest.json`.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::NotAPackage`] if `root` is not a directory, or an
    /// I/O or serialization error if the manifest cannot be written. Errors in
    /// individual categories are reported in the [`UpdateReport`] instead.
    pub fn update(&self, root: &Path) -> Result<(ThemeManifest, UpdateReport), UpdateError> {
        if !root.is_dir() {
            return Err(UpdateError::NotAPackage(root.to_path_buf()));
        }
        let mut manifest = load_manifest(root);
        let report = self.rederive(root, &mut manifest);
        write_manifest(root, &manifest)?;
        info!(
            "updated manifest for '{}' ({} failed categories)",
            manifest.theme_info.name,
            report.failed().count()
        );
        Ok((manifest, report))
    }

    /// Re-derive every category of `manifest` in place without writing it.
    pub fn rederive(&self, root: &Path, manifest: &mut ThemeManifest) -> UpdateReport {
        let mut report = UpdateReport::default();
        for category in Category::ALL {
            let outcome = match self.update_category(root, category, manifest) {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(
                        "failed to update {category} for '{}': {e}; keeping previous section",
                        root.display()
                    );
                    Outcome::Failed(e.to_string())
                }
            };
            report.categories.push((category, outcome));
        }
        manifest.refresh_content();
        report
    }

    fn update_category(
        &self,
        root: &Path,
        category: Category,
        manifest: &mut ThemeManifest,
    ) -> Result<Outcome, CategoryError> {
        let mut layout = Layout::Current;
        let mut resolution = self.resolver.resolve(root, category, Layout::Current)?;
        if resolution.is_empty() {
            let legacy = self.resolver.resolve(root, category, Layout::Legacy)?;
            if !legacy.is_empty() {
                info!("{category}: nothing in current layout, using legacy layout");
                layout = Layout::Legacy;
                resolution = legacy;
            }
        }
        let count = resolution.len();

        match resolution {
            Resolution::Listed(mappings) => {
                if let Some(section) = manifest.path_mappings.sequence_mut(category) {
                    *section = mappings;
                }
            }
            Resolution::Fonts(fonts) => manifest.path_mappings.fonts = fonts,
            Resolution::Settings(slot, None) => {
                if manifest.path_mappings.settings.remove(&slot).is_some() {
                    debug!("dropped stale {category} settings mapping");
                }
            }
            Resolution::Settings(slot, Some(mapping)) => {
                let text = fs::read_to_string(root.join(&mapping.theme_path))?;
                match slot {
                    SettingsSlot::Accents => {
                        manifest.accent_colors = Some(parse_accents(&text)?);
                    }
                    SettingsSlot::Leds => manifest.led_settings = Some(parse_leds(&text)?),
                }
                manifest.path_mappings.settings.remove(&slot);
                debug!("inlined {category} from '{}'", mapping.theme_path);
            }
        }

        Ok(Outcome::Updated { count, layout })
    }
}

/// Read `<root>/manifest.json`, falling back to a default manifest when it is
/// missing or not a JSON object. A malformed section falls back to its
/// default on its own. Empty authoring fields are filled in.
#[must_use]
pub fn load_manifest(root: &Path) -> ThemeManifest {
    let path = root.join(MANIFEST_FILE);
    let mut manifest = match fs::read_to_string(&path) {
        Ok(raw) => match ThemeManifest::from_json_sections(&raw) {
            Ok((manifest, bad)) => {
                for (section, e) in bad {
                    warn!("malformed '{section}' in '{}': {e}; using defaults", path.display());
                }
                manifest
            }
            Err(e) => {
                warn!("malformed manifest '{}': {e}; starting fresh", path.display());
                ThemeManifest::default()
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("no manifest at '{}'", path.display());
            ThemeManifest::default()
        }
        Err(e) => {
            warn!("cannot read manifest '{}': {e}; starting fresh", path.display());
            ThemeManifest::default()
        }
    };
    fill_info_defaults(&mut manifest.theme_info, root);
    manifest
}

fn fill_info_defaults(info: &mut ThemeInfo, root: &Path) {
    if info.name.trim().is_empty() {
        info.name = package_name(root);
    }
    if info.version.trim().is_empty() {
        info.version = ThemeInfo::default().version;
    }
    if info.creation_date == DateTime::<Utc>::default() {
        info.creation_date = Utc::now();
    }
    if info.exported_by.is_empty() {
        info.exported_by = TOOL_VERSION.to_owned();
    }
}

/// Display name derived from a package directory, without a `.theme` suffix.
#[must_use]
pub fn package_name(root: &Path) -> String {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.strip_suffix(".theme").unwrap_or(&name).to_owned()
}

/// Write `manifest` to `<root>/manifest.json` through a temporary file and a
/// rename, so readers never see a half-written manifest.
///
/// # Errors
///
/// Returns an I/O or serialization error.
pub fn write_manifest(root: &Path, manifest: &ThemeManifest) -> Result<(), UpdateError> {
    let json = manifest.to_json_pretty()?;
    let mut tmp = NamedTempFile::new_in(root)?;
    tmp.write_all(json.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(root.join(MANIFEST_FILE)).map_err(|e| e.error)?;
    Ok(())
}
