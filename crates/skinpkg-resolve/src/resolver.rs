//! Maps files inside a theme package onto device destinations.
//!
//! Rules are tried in order and the first match wins:
//!
//! 1. special names (`Root`, `Recently Played`, `Tools`, ...) map to fixed paths;
//! 2. `Name (TAG)` names are looked up in the [`SystemRegistry`] by tag, and
//!    unknown tags fall back to a synthesized `Roms/Name (TAG)/.media` directory;
//! 3. bare icon names are looked up by system name;
//! 4. anything else is left unresolved and logged.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use skinpkg_core::manifest::PathMapping;
use skinpkg_core::types::{meta, Category, FontSlot, IconType, SettingsSlot, WallpaperType};
use walkdir::WalkDir;

use crate::layout::{DeviceLayout, BACKGROUND_FILE, ICON_FILE};
use crate::naming::{is_png, split_tag, stem};
use crate::registry::SystemRegistry;

/// Package directory of system and special-location wallpapers.
pub const SYSTEM_WALLPAPERS_DIR: &str = "Wallpapers/SystemWallpapers";
/// Package directory of collection wallpapers.
pub const COLLECTION_WALLPAPERS_DIR: &str = "Wallpapers/CollectionWallpapers";
/// Package directory of system and special-location icons.
pub const SYSTEM_ICONS_DIR: &str = "Icons/SystemIcons";
/// Package directory of tool icons.
pub const TOOL_ICONS_DIR: &str = "Icons/ToolIcons";
/// Package directory of collection icons.
pub const COLLECTION_ICONS_DIR: &str = "Icons/CollectionIcons";
/// Package directory of per-system overlay directories.
pub const OVERLAYS_DIR: &str = "Overlays";
/// Package directory of fonts.
pub const FONTS_DIR: &str = "Fonts";

/// Which package directory structure to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// The preferred `Wallpapers/SystemWallpapers`-style layout.
    Current,
    /// The deprecated `Wallpapers/Root/bg.png`-style layout.
    Legacy,
}

/// Fresh mappings for one category, shaped like its manifest section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Wallpapers, icons or overlays, ordered by theme path.
    Listed(Vec<PathMapping>),
    /// Fonts keyed by slot.
    Fonts(BTreeMap<FontSlot, PathMapping>),
    /// A settings file for the slot, if the package has one.
    Settings(SettingsSlot, Option<PathMapping>),
}

impl Resolution {
    /// Number of mappings produced.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Resolution::Listed(v) => v.len(),
            Resolution::Fonts(m) => m.len(),
            Resolution::Settings(_, file) => usize::from(file.is_some()),
        }
    }

    /// Whether nothing was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Computes device destinations for package files.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    layout: &'a DeviceLayout,
    registry: Option<&'a SystemRegistry>,
}

impl<'a> PathResolver<'a> {
    /// Create a resolver. Without a registry, tag and bare-name rules are
    /// disabled for the current layout; special names and legacy paths still
    /// resolve.
    #[must_use]
    pub fn new(layout: &'a DeviceLayout, registry: Option<&'a SystemRegistry>) -> Self {
        Self { layout, registry }
    }

    /// The device layout destinations are computed against.
    #[must_use]
    pub fn layout(&self) -> &'a DeviceLayout {
        self.layout
    }

    /// Scan `root` for `category` using the given package layout.
    ///
    /// Missing package directories yield an empty resolution. Resolving the
    /// same unchanged tree twice yields the same mappings in the same order.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if an existing package directory cannot be read.
    pub fn resolve(
        &self,
        root: &Path,
        category: Category,
        layout: Layout,
    ) -> io::Result<Resolution> {
        Ok(match (category, layout) {
            (Category::Wallpapers, Layout::Current) => {
                Resolution::Listed(self.current_wallpapers(root)?)
            }
            (Category::Wallpapers, Layout::Legacy) => {
                Resolution::Listed(self.legacy_wallpapers(root)?)
            }
            (Category::Icons, Layout::Current) => Resolution::Listed(self.current_icons(root)?),
            (Category::Icons, Layout::Legacy) => Resolution::Listed(self.legacy_icons(root)?),
            (Category::Overlays, Layout::Current) => Resolution::Listed(self.overlays(root)?),
            (Category::Overlays, Layout::Legacy) => Resolution::Listed(Vec::new()),
            (Category::Fonts, layout) => Resolution::Fonts(self.fonts(root, layout)),
            (Category::Accents, Layout::Current) => {
                self.settings_file(root, SettingsSlot::Accents)
            }
            (Category::Leds, Layout::Current) => self.settings_file(root, SettingsSlot::Leds),
            (Category::Accents, Layout::Legacy) => {
                Resolution::Settings(SettingsSlot::Accents, None)
            }
            (Category::Leds, Layout::Legacy) => Resolution::Settings(SettingsSlot::Leds, None),
        })
    }

    /// Resolve a file from the system wallpapers directory by its base name.
    #[must_use]
    pub fn system_wallpaper(&self, theme_path: &str, stem: &str) -> Option<PathMapping> {
        if let Some((ty, dest)) = self.special_wallpaper(stem) {
            return Some(
                PathMapping::new(theme_path, dest)
                    .with_meta(meta::SYSTEM_NAME, stem)
                    .with_meta(meta::WALLPAPER_TYPE, ty.as_str()),
            );
        }
        let (name, tag) = split_tag(stem)?;
        let (system, media) = self.tagged_media_dir(name, tag)?;
        Some(system_mapping(theme_path, media.join(BACKGROUND_FILE), &system, tag)
            .with_meta(meta::WALLPAPER_TYPE, WallpaperType::System.as_str()))
    }

    /// Resolve a file from the system icons directory by its base name.
    #[must_use]
    pub fn system_icon(&self, theme_path: &str, stem: &str) -> Option<PathMapping> {
        if let Some(dest) = self.special_icon(stem) {
            return Some(
                PathMapping::new(theme_path, dest)
                    .with_meta(meta::SYSTEM_NAME, stem)
                    .with_meta(meta::ICON_TYPE, IconType::Special.as_str()),
            );
        }
        let (system, tag, media) = if let Some((name, tag)) = split_tag(stem) {
            let (system, media) = self.tagged_media_dir(name, tag)?;
            (system, tag.to_owned(), media)
        } else {
            let entry = self.registry?.by_name(stem)?;
            (entry.name.clone(), entry.tag.clone(), entry.media_path.clone())
        };
        Some(system_mapping(theme_path, media.join(ICON_FILE), &system, &tag)
            .with_meta(meta::ICON_TYPE, IconType::System.as_str()))
    }

    pub(crate) fn special_wallpaper(&self, stem: &str) -> Option<(WallpaperType, PathBuf)> {
        let l = self.layout;
        let (ty, path) = match stem {
            "Root" => (WallpaperType::Main, &l.root_background),
            "Root-Media" => (WallpaperType::Media, &l.root_media_background),
            "Recently Played" => (WallpaperType::RecentlyPlayed, &l.recently_played_background),
            "Tools" => (WallpaperType::Tools, &l.tools_background),
            "Collections" => (WallpaperType::Collections, &l.collections_background),
            _ => return None,
        };
        Some((ty, path.clone()))
    }

    pub(crate) fn special_icon(&self, stem: &str) -> Option<PathBuf> {
        let l = self.layout;
        match stem {
            "Recently Played" => Some(l.recently_played_icon.clone()),
            "Tools" => Some(l.tools_icon.clone()),
            "Collections" => Some(l.collections_icon.clone()),
            _ => None,
        }
    }

    /// Current-layout tag lookup; needs a registry.
    fn tagged_media_dir(&self, name: &str, tag: &str) -> Option<(String, PathBuf)> {
        let Some(registry) = self.registry else {
            debug!("no system registry; tag '{tag}' left unresolved");
            return None;
        };
        if let Some(entry) = registry.by_tag(tag) {
            return Some((entry.name.clone(), entry.media_path.clone()));
        }
        self.synthesized(name, tag)
    }

    /// Legacy-layout tag lookup; synthesizes even without a registry.
    pub(crate) fn legacy_media_dir(&self, name: &str, tag: &str) -> Option<(String, PathBuf)> {
        if let Some(entry) = self.registry.and_then(|r| r.by_tag(tag)) {
            return Some((entry.name.clone(), entry.media_path.clone()));
        }
        self.synthesized(name, tag)
    }

    fn synthesized(&self, name: &str, tag: &str) -> Option<(String, PathBuf)> {
        if name.is_empty() {
            return None;
        }
        debug!("tag '{tag}' not installed; synthesizing media path for '{name}'");
        Some((name.to_owned(), self.layout.synthesized_media_dir(name, tag)))
    }

    fn current_wallpapers(&self, root: &Path) -> io::Result<Vec<PathMapping>> {
        let mut out = BTreeMap::new();
        for file in png_files(&root.join(SYSTEM_WALLPAPERS_DIR))? {
            let theme_path = format!("{SYSTEM_WALLPAPERS_DIR}/{file}");
            match self.system_wallpaper(&theme_path, stem(&file)) {
                Some(mapping) => insert(&mut out, mapping),
                None => unresolved(Category::Wallpapers, &theme_path),
            }
        }
        for file in png_files(&root.join(COLLECTION_WALLPAPERS_DIR))? {
            let name = stem(&file);
            insert(
                &mut out,
                PathMapping::new(
                    format!("{COLLECTION_WALLPAPERS_DIR}/{file}"),
                    self.layout.collection_media_dir(name).join(BACKGROUND_FILE),
                )
                .with_meta(meta::COLLECTION_NAME, name)
                .with_meta(meta::WALLPAPER_TYPE, WallpaperType::Collection.as_str()),
            );
        }
        Ok(out.into_values().collect())
    }

    fn current_icons(&self, root: &Path) -> io::Result<Vec<PathMapping>> {
        let mut out = BTreeMap::new();
        for file in png_files(&root.join(SYSTEM_ICONS_DIR))? {
            let theme_path = format!("{SYSTEM_ICONS_DIR}/{file}");
            match self.system_icon(&theme_path, stem(&file)) {
                Some(mapping) => insert(&mut out, mapping),
                None => unresolved(Category::Icons, &theme_path),
            }
        }
        for file in png_files(&root.join(TOOL_ICONS_DIR))? {
            insert(&mut out, self.tool_icon(format!("{TOOL_ICONS_DIR}/{file}"), stem(&file)));
        }
        for file in png_files(&root.join(COLLECTION_ICONS_DIR))? {
            insert(
                &mut out,
                self.collection_icon(format!("{COLLECTION_ICONS_DIR}/{file}"), stem(&file)),
            );
        }
        Ok(out.into_values().collect())
    }

    pub(crate) fn tool_icon(&self, theme_path: String, tool: &str) -> PathMapping {
        PathMapping::new(theme_path, self.layout.tool_media_dir(tool).join(ICON_FILE))
            .with_meta(meta::TOOL_NAME, tool)
            .with_meta(meta::ICON_TYPE, IconType::Tool.as_str())
    }

    pub(crate) fn collection_icon(&self, theme_path: String, collection: &str) -> PathMapping {
        PathMapping::new(
            theme_path,
            self.layout.collection_media_dir(collection).join(ICON_FILE),
        )
        .with_meta(meta::COLLECTION_NAME, collection)
        .with_meta(meta::ICON_TYPE, IconType::Collection.as_str())
    }

    fn overlays(&self, root: &Path) -> io::Result<Vec<PathMapping>> {
        let dir = root.join(OVERLAYS_DIR);
        let mut out = BTreeMap::new();
        for system in subdirs(&dir)? {
            let system_name = self
                .registry
                .and_then(|r| r.by_tag(&system))
                .map_or(system.as_str(), |e| e.name.as_str())
                .to_owned();
            for file in png_files(&dir.join(&system))? {
                insert(
                    &mut out,
                    PathMapping::new(
                        format!("{OVERLAYS_DIR}/{system}/{file}"),
                        self.layout.overlays_root.join(&system).join(&file),
                    )
                    .with_meta(meta::SYSTEM_NAME, system_name.clone())
                    .with_meta(meta::SYSTEM_TAG, system.clone()),
                );
            }
        }
        Ok(out.into_values().collect())
    }

    fn fonts(&self, root: &Path, layout: Layout) -> BTreeMap<FontSlot, PathMapping> {
        let candidates: Vec<(FontSlot, &str)> = match layout {
            Layout::Current => FontSlot::ALL
                .into_iter()
                .map(|slot| (slot, slot.package_file_name()))
                .collect(),
            Layout::Legacy => vec![
                (FontSlot::OgFont, "font1.ttf"),
                (FontSlot::NextFont, "font2.ttf"),
            ],
        };

        let dir = root.join(FONTS_DIR);
        candidates
            .into_iter()
            .filter(|(_, file)| dir.join(file).is_file())
            .map(|(slot, file)| {
                let mapping = PathMapping::new(
                    format!("{FONTS_DIR}/{file}"),
                    self.layout.font_path(slot),
                );
                (slot, mapping)
            })
            .collect()
    }

    fn settings_file(&self, root: &Path, slot: SettingsSlot) -> Resolution {
        let rel = slot.package_path();
        if !root.join(rel).is_file() {
            return Resolution::Settings(slot, None);
        }
        let dest = match slot {
            SettingsSlot::Accents => &self.layout.accent_settings,
            SettingsSlot::Leds => &self.layout.led_settings,
        };
        Resolution::Settings(slot, Some(PathMapping::new(rel, dest.clone())))
    }
}

fn system_mapping(theme_path: &str, dest: PathBuf, system: &str, tag: &str) -> PathMapping {
    PathMapping::new(theme_path, dest)
        .with_meta(meta::SYSTEM_NAME, system)
        .with_meta(meta::SYSTEM_TAG, tag)
}

/// Insert keyed by theme path so a path never appears twice in one pass.
pub(crate) fn insert(out: &mut BTreeMap<String, PathMapping>, mapping: PathMapping) {
    out.entry(mapping.theme_path.clone()).or_insert(mapping);
}

pub(crate) fn unresolved(category: Category, theme_path: &str) {
    info!("no destination for {category} asset '{theme_path}', skipping");
}

/// Non-hidden PNG files directly inside `dir`, sorted by name.
/// A missing directory yields nothing.
pub(crate) fn png_files(dir: &Path) -> io::Result<Vec<String>> {
    Ok(children(dir, false)?
        .into_iter()
        .filter(|name| is_png(name))
        .collect())
}

/// Non-hidden subdirectories of `dir`, sorted by name.
pub(crate) fn subdirs(dir: &Path) -> io::Result<Vec<String>> {
    children(dir, true)
}

fn children(dir: &Path, want_dirs: bool) -> io::Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_dir() != want_dirs {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        names.push(name);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SystemEntry;

    fn registry(layout: &DeviceLayout) -> SystemRegistry {
        SystemRegistry::new(vec![SystemEntry {
            name: "Game Boy".to_owned(),
            tag: "GB".to_owned(),
            media_path: layout.roms_root.join("Game Boy (GB)").join(".media"),
        }])
    }

    #[test]
    fn special_wallpaper_names_map_to_fixed_paths() {
        let layout = DeviceLayout::new("/sd", "tg5040");
        let reg = registry(&layout);
        let resolver = PathResolver::new(&layout, Some(&reg));
        let m = resolver.system_wallpaper("w/Root-Media.png", "Root-Media").unwrap();
        assert_eq!(m.system_path, layout.root_media_background);
        assert_eq!(m.meta(meta::WALLPAPER_TYPE), Some("Media"));
    }

    #[test]
    fn unknown_tag_synthesizes_under_roms() {
        let layout = DeviceLayout::new("/sd", "tg5040");
        let reg = registry(&layout);
        let resolver = PathResolver::new(&layout, Some(&reg));
        let m = resolver
            .system_wallpaper("w/Virtual Boy (VB).png", "Virtual Boy (VB)")
            .unwrap();
        assert_eq!(
            m.system_path,
            PathBuf::from("/sd/Roms/Virtual Boy (VB)/.media/bg.png")
        );
        assert_eq!(m.meta(meta::SYSTEM_TAG), Some("VB"));
    }

    #[test]
    fn bare_icon_name_matches_system_name() {
        let layout = DeviceLayout::new("/sd", "tg5040");
        let reg = registry(&layout);
        let resolver = PathResolver::new(&layout, Some(&reg));
        let m = resolver.system_icon("i/Game Boy.png", "Game Boy").unwrap();
        assert_eq!(
            m.system_path,
            PathBuf::from("/sd/Roms/Game Boy (GB)/.media/icon.png")
        );
        assert!(resolver.system_icon("i/Atari.png", "Atari").is_none());
    }

    #[test]
    fn bare_wallpaper_name_is_unresolved() {
        let layout = DeviceLayout::new("/sd", "tg5040");
        let reg = registry(&layout);
        let resolver = PathResolver::new(&layout, Some(&reg));
        assert!(resolver.system_wallpaper("w/Game Boy.png", "Game Boy").is_none());
    }

    #[test]
    fn without_registry_only_special_names_resolve() {
        let layout = DeviceLayout::new("/sd", "tg5040");
        let resolver = PathResolver::new(&layout, None);
        assert!(resolver.system_wallpaper("w/Root.png", "Root").is_some());
        assert!(resolver
            .system_wallpaper("w/Game Boy (GB).png", "Game Boy (GB)")
            .is_none());
        assert!(resolver.system_icon("i/Tools.png", "Tools").is_some());
    }
}
