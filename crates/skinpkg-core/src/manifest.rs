//! Theme manifest type representing `manifest.json` inside a theme package.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::settings::{AccentColors, LedSettings};
use crate::types::{meta, Category, FontSlot, IconType, SettingsSlot};

/// File name of the manifest sidecar at the package root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// The contents of a `manifest.json` file inside a theme package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeManifest {
    /// Authoring information.
    #[serde(default)]
    pub theme_info: ThemeInfo,
    /// Summary of what the package contains.
    #[serde(default)]
    pub content: Content,
    /// Package-to-device path mappings per category.
    #[serde(default)]
    pub path_mappings: PathMappings,
    /// Accent colors, inlined once extracted from the package settings file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_colors: Option<AccentColors>,
    /// LED zone settings, inlined once extracted from the package settings file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub led_settings: Option<LedSettings>,
}

/// Authoring information for a theme package. Absent fields take their
/// [`Default`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeInfo {
    /// Display name.
    pub name: String,
    /// Free-form version string.
    pub version: String,
    /// Author name.
    pub author: String,
    /// When the package was created. The Unix epoch means unknown.
    pub creation_date: DateTime<Utc>,
    /// Version string of the tool that produced the manifest.
    pub exported_by: String,
}

impl Default for ThemeInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: "1.0.0".to_owned(),
            author: String::new(),
            creation_date: DateTime::<Utc>::default(),
            exported_by: String::new(),
        }
    }
}

/// Presence flags and counts per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Content {
    /// Wallpaper summary.
    pub wallpapers: WallpaperContent,
    /// Icon summary.
    pub icons: IconContent,
    /// Overlay summary.
    pub overlays: OverlayContent,
    /// Font summary.
    pub fonts: FontContent,
    /// Settings summary.
    pub settings: SettingsContent,
}

/// Wallpaper summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallpaperContent {
    /// Whether any wallpaper is mapped.
    pub present: bool,
    /// Number of wallpaper mappings.
    pub count: usize,
}

/// Icon summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconContent {
    /// Whether any icon is mapped.
    pub present: bool,
    /// System and special-location icons.
    pub system_count: usize,
    /// Tool icons.
    pub tool_count: usize,
    /// Collection icons.
    pub collection_count: usize,
}

/// Overlay summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayContent {
    /// Whether any overlay is mapped.
    pub present: bool,
    /// Overlay system directories, sorted.
    pub systems: Vec<String>,
}

/// Font summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontContent {
    /// Whether any font is mapped.
    pub present: bool,
    /// The OG font is replaced.
    pub og_replaced: bool,
    /// The Next font is replaced.
    pub next_replaced: bool,
}

/// Settings summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsContent {
    /// Accent colors are inlined in the manifest.
    pub accents_included: bool,
    /// LED settings are inlined in the manifest.
    pub leds_included: bool,
}

/// One package asset and where it goes on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMapping {
    /// Path relative to the package root, `/`-separated.
    pub theme_path: String,
    /// Absolute destination on the device.
    pub system_path: PathBuf,
    /// Provenance, keyed by the constants in [`crate::types::meta`].
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl PathMapping {
    /// Create a mapping with empty metadata.
    #[must_use]
    pub fn new(theme_path: impl Into<String>, system_path: impl Into<PathBuf>) -> Self {
        Self {
            theme_path: theme_path.into(),
            system_path: system_path.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Builder-style metadata insertion.
    #[must_use]
    pub fn with_meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_owned(), value.into());
        self
    }

    /// Look up a metadata value.
    #[must_use]
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Mapping collections per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathMappings {
    /// Wallpaper mappings, ordered by theme path.
    pub wallpapers: Vec<PathMapping>,
    /// Icon mappings, ordered by theme path.
    pub icons: Vec<PathMapping>,
    /// Overlay mappings, ordered by theme path.
    pub overlays: Vec<PathMapping>,
    /// Font mappings keyed by slot.
    pub fonts: BTreeMap<FontSlot, PathMapping>,
    /// Settings-file mappings keyed by slot. Emptied once settings are inlined.
    pub settings: BTreeMap<SettingsSlot, PathMapping>,
}

impl PathMappings {
    /// Sequence-typed mappings of `category`, or `None` for keyed categories.
    #[must_use]
    pub fn sequence(&self, category: Category) -> Option<&[PathMapping]> {
        match category {
            Category::Wallpapers => Some(&self.wallpapers),
            Category::Icons => Some(&self.icons),
            Category::Overlays => Some(&self.overlays),
            Category::Fonts | Category::Accents | Category::Leds => None,
        }
    }

    /// Mutable sequence-typed mappings of `category`, or `None` for keyed categories.
    pub fn sequence_mut(&mut self, category: Category) -> Option<&mut Vec<PathMapping>> {
        match category {
            Category::Wallpapers => Some(&mut self.wallpapers),
            Category::Icons => Some(&mut self.icons),
            Category::Overlays => Some(&mut self.overlays),
            Category::Fonts | Category::Accents | Category::Leds => None,
        }
    }

    /// Number of mappings held for `category`.
    #[must_use]
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Wallpapers => self.wallpapers.len(),
            Category::Icons => self.icons.len(),
            Category::Overlays => self.overlays.len(),
            Category::Fonts => self.fonts.len(),
            Category::Accents => usize::from(self.settings.contains_key(&SettingsSlot::Accents)),
            Category::Leds => usize::from(self.settings.contains_key(&SettingsSlot::Leds)),
        }
    }
}

/// Deserialize `fields[name]`, or `None` if it is absent or malformed.
fn section<T: DeserializeOwned>(
    fields: &Map<String, Value>,
    name: &'static str,
    bad: &mut Vec<(&'static str, serde_json::Error)>,
) -> Option<T> {
    let value = fields.get(name)?;
    match T::deserialize(value) {
        Ok(v) => Some(v),
        Err(e) => {
            bad.push((name, e));
            None
        }
    }
}

impl ThemeManifest {
    /// Parse a manifest from JSON text.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the text is not a valid manifest.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Parse a manifest one top-level section at a time.
    ///
    /// A section that fails to deserialize is replaced by its default and
    /// reported alongside the section name, so one bad field does not discard
    /// the rest of the manifest.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the text is not JSON, or is not a
    /// JSON object.
    pub fn from_json_sections(
        raw: &str,
    ) -> Result<(Self, Vec<(&'static str, serde_json::Error)>), serde_json::Error> {
        let fields: Map<String, Value> = serde_json::from_str(raw)?;
        let mut bad = Vec::new();
        let manifest = Self {
            theme_info: section(&fields, "theme_info", &mut bad).unwrap_or_default(),
            content: section(&fields, "content", &mut bad).unwrap_or_default(),
            path_mappings: section(&fields, "path_mappings", &mut bad).unwrap_or_default(),
            accent_colors: section(&fields, "accent_colors", &mut bad).flatten(),
            led_settings: section(&fields, "led_settings", &mut bad).flatten(),
        };
        Ok((manifest, bad))
    }

    /// Serialize to pretty-printed JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }

    /// Recompute [`Content`] from the current mappings and inline settings.
    pub fn refresh_content(&mut self) {
        let maps = &self.path_mappings;

        let icon_count = |ty: IconType| {
            maps.icons
                .iter()
                .filter(|m| m.meta(meta::ICON_TYPE) == Some(ty.as_str()))
                .count()
        };

        let overlay_systems: BTreeSet<String> = maps
            .overlays
            .iter()
            .filter_map(|m| m.meta(meta::SYSTEM_TAG).map(str::to_owned))
            .collect();

        let og = maps.fonts.contains_key(&FontSlot::OgFont);
        let next = maps.fonts.contains_key(&FontSlot::NextFont);

        self.content = Content {
            wallpapers: WallpaperContent {
                present: !maps.wallpapers.is_empty(),
                count: maps.wallpapers.len(),
            },
            icons: IconContent {
                present: !maps.icons.is_empty(),
                system_count: icon_count(IconType::System) + icon_count(IconType::Special),
                tool_count: icon_count(IconType::Tool),
                collection_count: icon_count(IconType::Collection),
            },
            overlays: OverlayContent {
                present: !maps.overlays.is_empty(),
                systems: overlay_systems.into_iter().collect(),
            },
            fonts: FontContent {
                present: og || next,
                og_replaced: og,
                next_replaced: next,
            },
            settings: SettingsContent {
                accents_included: self.accent_colors.is_some(),
                leds_included: self.led_settings.is_some(),
            },
        };
    }
}
