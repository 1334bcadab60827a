//! Structural checks on a re-derived manifest before anything is copied.
//!
//! Settings colors are checked separately by [`check_accents`] and
//! [`check_leds`], so a bad settings file costs only its own category.

use std::collections::HashSet;

use skinpkg_core::manifest::{PathMapping, ThemeManifest};
use skinpkg_core::settings::{AccentColors, LedSettings, LedZone};
use skinpkg_core::types::{validate_color, validate_theme_path, Category, ValidationError};
use skinpkg_resolve::layout::DeviceLayout;
use thiserror::Error;

/// Errors produced by manifest validation.
#[derive(Debug, Error)]
pub enum ManifestValidationError {
    /// `theme_info.name` is blank.
    #[error("theme name is missing")]
    MissingName,
    /// `theme_info.version` is blank.
    #[error("theme version is missing")]
    MissingVersion,
    /// A theme path is empty, absolute or escapes the package.
    #[error("{category}: {source}")]
    ThemePath {
        /// Category holding the mapping.
        category: Category,
        /// Underlying check failure.
        source: ValidationError,
    },
    /// The same theme path appears twice in one category.
    #[error("{category}: duplicate theme path '{path}'")]
    DuplicateThemePath {
        /// Category holding the mappings.
        category: Category,
        /// Repeated path.
        path: String,
    },
    /// A destination is relative or outside the device SD root.
    #[error("{category}: destination '{path}' is outside the device root")]
    OutsideDevice {
        /// Category holding the mapping.
        category: Category,
        /// Offending destination.
        path: String,
    },
    /// A font mapping does not point at its slot's device path.
    #[error("fonts: '{0}' is not a device font location")]
    FontDestination(String),
    /// A color value is malformed.
    #[error("{field}: {source}")]
    Color {
        /// Which setting holds the color.
        field: String,
        /// Underlying check failure.
        source: ValidationError,
    },
}

/// Validation collaborator consulted by the import engine.
pub trait ManifestValidator {
    /// Check `manifest` against `layout`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ManifestValidationError`] encountered.
    fn validate(&self, manifest: &ThemeManifest, layout: &DeviceLayout)
        -> Result<(), ManifestValidationError>;
}

/// Required fields and path shapes.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralValidator;

impl ManifestValidator for StructuralValidator {
    fn validate(
        &self,
        manifest: &ThemeManifest,
        layout: &DeviceLayout,
    ) -> Result<(), ManifestValidationError> {
        let info = &manifest.theme_info;
        if info.name.trim().is_empty() {
            return Err(ManifestValidationError::MissingName);
        }
        if info.version.trim().is_empty() {
            return Err(ManifestValidationError::MissingVersion);
        }

        let maps = &manifest.path_mappings;
        for category in [Category::Wallpapers, Category::Icons, Category::Overlays] {
            check_mappings(category, maps.sequence(category).unwrap_or_default(), layout)?;
        }

        let fonts: Vec<PathMapping> = maps.fonts.values().cloned().collect();
        check_mappings(Category::Fonts, &fonts, layout)?;
        for (slot, mapping) in &maps.fonts {
            if mapping.system_path != layout.font_path(*slot) {
                return Err(ManifestValidationError::FontDestination(
                    mapping.system_path.display().to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Check every set accent color.
///
/// # Errors
///
/// Returns [`ManifestValidationError::Color`] for the first malformed value.
pub fn check_accents(accents: &AccentColors) -> Result<(), ManifestValidationError> {
    for (key, value) in accents.present() {
        check_color(&format!("accents.{key}"), value)?;
    }
    Ok(())
}

/// Check both colors of every LED zone.
///
/// # Errors
///
/// Returns [`ManifestValidationError::Color`] for the first malformed value.
pub fn check_leds(leds: &LedSettings) -> Result<(), ManifestValidationError> {
    for zone in LedZone::ALL {
        let s = leds.zone(zone);
        check_color(&format!("leds.[{}].color1", zone.section()), &s.color1)?;
        check_color(&format!("leds.[{}].color2", zone.section()), &s.color2)?;
    }
    Ok(())
}

fn check_mappings(
    category: Category,
    mappings: &[PathMapping],
    layout: &DeviceLayout,
) -> Result<(), ManifestValidationError> {
    let mut seen = HashSet::new();
    for m in mappings {
        validate_theme_path(&m.theme_path)
            .map_err(|source| ManifestValidationError::ThemePath { category, source })?;
        if !seen.insert(m.theme_path.as_str()) {
            return Err(ManifestValidationError::DuplicateThemePath {
                category,
                path: m.theme_path.clone(),
            });
        }
        if !m.system_path.is_absolute() || !m.system_path.starts_with(&layout.sd_root) {
            return Err(ManifestValidationError::OutsideDevice {
                category,
                path: m.system_path.display().to_string(),
            });
        }
    }
    Ok(())
}

fn check_color(field: &str, value: &str) -> Result<(), ManifestValidationError> {
    validate_color(value).map_err(|source| ManifestValidationError::Color {
        field: field.to_owned(),
        source,
    })
}
