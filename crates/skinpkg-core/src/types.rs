//! Closed enums for asset categories and mapping slots, plus validated primitives.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a domain value fails validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The value is empty.
    #[error("value must not be empty")]
    Empty,
    /// A color is not `#RRGGBB` or `0xRRGGBB`.
    #[error("invalid color value '{0}': expected #RRGGBB or 0xRRGGBB")]
    InvalidColor(String),
    /// A package-relative path is absolute or escapes the package root.
    #[error("theme path '{0}' must be relative and stay inside the package")]
    InvalidThemePath(String),
    /// A device path is not absolute.
    #[error("system path '{0}' must be absolute")]
    RelativeSystemPath(String),
}

/// One content category of a theme package.
///
/// Every per-category pass (resolution, manifest update, import) dispatches on
/// this enum rather than on string keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// System, special-location and collection backgrounds.
    Wallpapers,
    /// System, tool, collection and special-location icons.
    Icons,
    /// Per-system screen overlays.
    Overlays,
    /// Replacement UI fonts.
    Fonts,
    /// Accent color settings.
    Accents,
    /// LED zone settings.
    Leds,
}

impl Category {
    /// All categories in processing order.
    pub const ALL: [Category; 6] = [
        Category::Wallpapers,
        Category::Icons,
        Category::Overlays,
        Category::Fonts,
        Category::Accents,
        Category::Leds,
    ];

    /// Lowercase name used in logs and manifest keys.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Wallpapers => "wallpapers",
            Category::Icons => "icons",
            Category::Overlays => "overlays",
            Category::Fonts => "fonts",
            Category::Accents => "accents",
            Category::Leds => "leds",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical slot for a font mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSlot {
    /// Replacement for the original ("OG") UI font.
    OgFont,
    /// Packaged copy of the factory OG font.
    OgBackup,
    /// Replacement for the "Next" UI font.
    NextFont,
    /// Packaged copy of the factory Next font.
    NextBackup,
}

impl FontSlot {
    /// All slots in processing order.
    pub const ALL: [FontSlot; 4] = [
        FontSlot::OgFont,
        FontSlot::OgBackup,
        FontSlot::NextFont,
        FontSlot::NextBackup,
    ];

    /// Whether this slot holds a backup rather than an active font.
    #[must_use]
    pub fn is_backup(self) -> bool {
        matches!(self, FontSlot::OgBackup | FontSlot::NextBackup)
    }

    /// File name of this slot under the package `Fonts/` directory.
    #[must_use]
    pub fn package_file_name(self) -> &'static str {
        match self {
            FontSlot::OgFont => "OG.ttf",
            FontSlot::OgBackup => "OG.backup.ttf",
            FontSlot::NextFont => "Next.ttf",
            FontSlot::NextBackup => "Next.backup.ttf",
        }
    }
}

/// Logical slot for a settings mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsSlot {
    /// `Settings/minuisettings.txt`.
    Accents,
    /// `Settings/ledsettings_brick.txt`.
    Leds,
}

impl SettingsSlot {
    /// Path of the settings file relative to the package root.
    #[must_use]
    pub fn package_path(self) -> &'static str {
        match self {
            SettingsSlot::Accents => "Settings/minuisettings.txt",
            SettingsSlot::Leds => "Settings/ledsettings_brick.txt",
        }
    }
}

/// Provenance of a wallpaper mapping, recorded under [`meta::WALLPAPER_TYPE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallpaperType {
    /// Main menu background.
    Main,
    /// Main menu media-directory background.
    Media,
    /// Recently Played background.
    RecentlyPlayed,
    /// Tools list background.
    Tools,
    /// Collections list background.
    Collections,
    /// Per-system background.
    System,
    /// Per-collection background.
    Collection,
}

impl WallpaperType {
    /// Metadata string for this type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WallpaperType::Main => "Main",
            WallpaperType::Media => "Media",
            WallpaperType::RecentlyPlayed => "RecentlyPlayed",
            WallpaperType::Tools => "Tools",
            WallpaperType::Collections => "Collections",
            WallpaperType::System => "System",
            WallpaperType::Collection => "Collection",
        }
    }
}

/// Provenance of an icon mapping, recorded under [`meta::ICON_TYPE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconType {
    /// Per-system icon.
    System,
    /// Per-tool icon.
    Tool,
    /// Per-collection icon.
    Collection,
    /// Icon of a fixed main-menu entry (Recently Played, Tools, Collections).
    Special,
}

impl IconType {
    /// Metadata string for this type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IconType::System => "System",
            IconType::Tool => "Tool",
            IconType::Collection => "Collection",
            IconType::Special => "Special",
        }
    }
}

/// Metadata keys used in [`crate::manifest::PathMapping::metadata`].
pub mod meta {
    /// Display name of the system the asset belongs to.
    pub const SYSTEM_NAME: &str = "SystemName";
    /// Parenthesized system tag.
    pub const SYSTEM_TAG: &str = "SystemTag";
    /// [`super::WallpaperType`] string.
    pub const WALLPAPER_TYPE: &str = "WallpaperType";
    /// [`super::IconType`] string.
    pub const ICON_TYPE: &str = "IconType";
    /// Tool directory name.
    pub const TOOL_NAME: &str = "ToolName";
    /// Collection directory name.
    pub const COLLECTION_NAME: &str = "CollectionName";
}

/// Check that `value` is a `#RRGGBB` or `0xRRGGBB` color.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidColor`] otherwise.
pub fn validate_color(value: &str) -> Result<(), ValidationError> {
    let hex = value
        .strip_prefix('#')
        .or_else(|| value.strip_prefix("0x"))
        .or_else(|| value.strip_prefix("0X"));
    match hex {
        Some(h) if h.len() == 6 && h.chars().all(|c| c.is_ascii_hexdigit()) => Ok(()),
        _ => Err(ValidationError::InvalidColor(value.to_owned())),
    }
}

/// Check that a package-relative path is relative and has no `..` segments.
///
/// # Errors
///
/// Returns [`ValidationError::Empty`] or [`ValidationError::InvalidThemePath`].
pub fn validate_theme_path(path: &str) -> Result<(), ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::Empty);
    }
    if path.starts_with('/') || path.split('/').any(|seg| seg == "..") {
        return Err(ValidationError::InvalidThemePath(path.to_owned()));
    }
    Ok(())
}
