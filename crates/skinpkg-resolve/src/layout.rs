//! Fixed device destinations, injected into the resolver and import engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skinpkg_core::types::FontSlot;

/// Default SD card mount point on the device.
pub const DEFAULT_SD_ROOT: &str = "/mnt/SDCARD";
/// Default platform directory name.
pub const DEFAULT_PLATFORM: &str = "tg5040";

/// Name of the hidden per-location media directory.
pub const MEDIA_DIR: &str = ".media";
/// File name of a background inside a media directory.
pub const BACKGROUND_FILE: &str = "bg.png";
/// File name of an icon inside a media directory.
pub const ICON_FILE: &str = "icon.png";

/// Every fixed filesystem location the theme engine reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLayout {
    /// SD card root.
    pub sd_root: PathBuf,
    /// Main menu background.
    pub root_background: PathBuf,
    /// Main menu media-directory background.
    pub root_media_background: PathBuf,
    /// Shared media directory holding special-location icons.
    pub root_media_dir: PathBuf,
    /// Recently Played background.
    pub recently_played_background: PathBuf,
    /// Recently Played icon.
    pub recently_played_icon: PathBuf,
    /// Tools list background.
    pub tools_background: PathBuf,
    /// Tools icon.
    pub tools_icon: PathBuf,
    /// Collections list background.
    pub collections_background: PathBuf,
    /// Collections icon.
    pub collections_icon: PathBuf,
    /// Directory holding one `Name (TAG)` directory per system.
    pub roms_root: PathBuf,
    /// Directory holding one directory per tool.
    pub tools_root: PathBuf,
    /// Directory holding one directory per collection.
    pub collections_root: PathBuf,
    /// Directory holding one overlay directory per system.
    pub overlays_root: PathBuf,
    /// Active OG font.
    pub og_font: PathBuf,
    /// Factory OG font backup.
    pub og_font_backup: PathBuf,
    /// Active Next font.
    pub next_font: PathBuf,
    /// Factory Next font backup.
    pub next_font_backup: PathBuf,
    /// Device accent settings file.
    pub accent_settings: PathBuf,
    /// Device LED settings file.
    pub led_settings: PathBuf,
    /// Advisory lock held for the duration of an import.
    pub import_lock: PathBuf,
}

impl DeviceLayout {
    /// Derive every destination from an SD card root and platform name.
    #[must_use]
    pub fn new(sd_root: impl Into<PathBuf>, platform: &str) -> Self {
        let sd: PathBuf = sd_root.into();
        let media = sd.join(MEDIA_DIR);
        let tools_root = sd.join("Tools").join(platform);
        let collections_root = sd.join("Collections");
        let res = sd.join(".system").join("res");
        let shared = sd.join(".userdata").join("shared");

        Self {
            root_background: sd.join(BACKGROUND_FILE),
            root_media_background: media.join(BACKGROUND_FILE),
            recently_played_background: sd
                .join("Recently Played")
                .join(MEDIA_DIR)
                .join(BACKGROUND_FILE),
            recently_played_icon: media.join("Recently Played.png"),
            tools_background: tools_root.join(MEDIA_DIR).join(BACKGROUND_FILE),
            tools_icon: media.join("Tools.png"),
            collections_background: collections_root.join(MEDIA_DIR).join(BACKGROUND_FILE),
            collections_icon: media.join("Collections.png"),
            roms_root: sd.join("Roms"),
            tools_root,
            collections_root,
            overlays_root: sd.join("Overlays"),
            og_font: res.join("font1.ttf"),
            og_font_backup: res.join("font1.backup.ttf"),
            next_font: res.join("font2.ttf"),
            next_font_backup: res.join("font2.backup.ttf"),
            accent_settings: shared.join("minuisettings.txt"),
            led_settings: shared.join("ledsettings_brick.txt"),
            import_lock: shared.join(".skinpkg-import.lock"),
            root_media_dir: media,
            sd_root: sd,
        }
    }

    /// Device path of a font slot.
    #[must_use]
    pub fn font_path(&self, slot: FontSlot) -> &Path {
        match slot {
            FontSlot::OgFont => &self.og_font,
            FontSlot::OgBackup => &self.og_font_backup,
            FontSlot::NextFont => &self.next_font,
            FontSlot::NextBackup => &self.next_font_backup,
        }
    }

    /// Media directory of a system that is not in the registry.
    #[must_use]
    pub fn synthesized_media_dir(&self, name: &str, tag: &str) -> PathBuf {
        self.roms_root.join(format!("{name} ({tag})")).join(MEDIA_DIR)
    }

    /// Media directory of a tool.
    #[must_use]
    pub fn tool_media_dir(&self, tool: &str) -> PathBuf {
        self.tools_root.join(tool).join(MEDIA_DIR)
    }

    /// Media directory of a collection.
    #[must_use]
    pub fn collection_media_dir(&self, collection: &str) -> PathBuf {
        self.collections_root.join(collection).join(MEDIA_DIR)
    }

    /// Background and icon paths at fixed special locations.
    #[must_use]
    pub fn special_assets(&self) -> [&Path; 8] {
        [
            &self.root_background,
            &self.root_media_background,
            &self.recently_played_background,
            &self.recently_played_icon,
            &self.tools_background,
            &self.tools_icon,
            &self.collections_background,
            &self.collections_icon,
        ]
    }
}

impl Default for DeviceLayout {
    fn default() -> Self {
        Self::new(DEFAULT_SD_ROOT, DEFAULT_PLATFORM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_uses_sdcard_paths() {
        let layout = DeviceLayout::default();
        assert_eq!(layout.root_background, PathBuf::from("/mnt/SDCARD/bg.png"));
        assert_eq!(
            layout.tools_background,
            PathBuf::from("/mnt/SDCARD/Tools/tg5040/.media/bg.png")
        );
        assert_eq!(
            layout.led_settings,
            PathBuf::from("/mnt/SDCARD/.userdata/shared/ledsettings_brick.txt")
        );
    }

    #[test]
    fn synthesized_dir_combines_name_and_tag() {
        let layout = DeviceLayout::new("/sd", "tg5040");
        assert_eq!(
            layout.synthesized_media_dir("Neo Geo Pocket", "NGP"),
            PathBuf::from("/sd/Roms/Neo Geo Pocket (NGP)/.media")
        );
    }
}
