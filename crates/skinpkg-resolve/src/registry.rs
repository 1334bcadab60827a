//! Installed systems discovered from the device ROMs directory.

use std::path::PathBuf;

use log::debug;

use crate::error::RegistryError;
use crate::layout::{DeviceLayout, MEDIA_DIR};
use crate::naming::split_tag;

/// One installed system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemEntry {
    /// Display name, e.g. `Game Boy`.
    pub name: String,
    /// Tag, e.g. `GB`.
    pub tag: String,
    /// Media directory holding the system's `bg.png` and `icon.png`.
    pub media_path: PathBuf,
}

/// Ordered list of installed systems.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemRegistry {
    entries: Vec<SystemEntry>,
}

impl SystemRegistry {
    /// Build a registry from explicit entries, keeping their order.
    #[must_use]
    pub fn new(entries: Vec<SystemEntry>) -> Self {
        Self { entries }
    }

    /// Scan `layout.roms_root` for `Name (TAG)` directories, ordered by name.
    ///
    /// Directories without a tag are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unreadable`] if the ROMs directory cannot be listed.
    pub fn load(layout: &DeviceLayout) -> Result<Self, RegistryError> {
        let unreadable = |source| RegistryError::Unreadable {
            path: layout.roms_root.clone(),
            source,
        };

        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(&layout.roms_root).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            dirs.push(name);
        }
        dirs.sort();

        let entries = dirs
            .into_iter()
            .filter_map(|dir| {
                let Some((name, tag)) = split_tag(&dir) else {
                    debug!("skipping untagged system directory '{dir}'");
                    return None;
                };
                Some(SystemEntry {
                    name: name.to_owned(),
                    tag: tag.to_owned(),
                    media_path: layout.roms_root.join(&dir).join(MEDIA_DIR),
                })
            })
            .collect();

        Ok(Self { entries })
    }

    /// First entry whose tag equals `tag` (case-sensitive).
    #[must_use]
    pub fn by_tag(&self, tag: &str) -> Option<&SystemEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }

    /// First entry whose display name equals `name`.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&SystemEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// All entries in registry order.
    #[must_use]
    pub fn entries(&self) -> &[SystemEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_reads_tagged_rom_dirs_in_order() {
        let dir = tempdir().unwrap();
        let layout = DeviceLayout::new(dir.path(), "tg5040");
        fs::create_dir_all(layout.roms_root.join("Super Nintendo (SFC)")).unwrap();
        fs::create_dir_all(layout.roms_root.join("Game Boy (GB)")).unwrap();
        fs::create_dir_all(layout.roms_root.join("Ports")).unwrap();
        fs::write(layout.roms_root.join("readme (X).txt"), "").unwrap();

        let registry = SystemRegistry::load(&layout).unwrap();
        let tags: Vec<&str> = registry.entries().iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, ["GB", "SFC"]);
        assert_eq!(
            registry.by_tag("GB").unwrap().media_path,
            layout.roms_root.join("Game Boy (GB)").join(".media")
        );
    }

    #[test]
    fn tag_lookup_is_case_sensitive() {
        let registry = SystemRegistry::new(vec![SystemEntry {
            name: "Game Boy".to_owned(),
            tag: "GB".to_owned(),
            media_path: PathBuf::from("/Roms/Game Boy (GB)/.media"),
        }]);
        assert!(registry.by_tag("gb").is_none());
        assert!(registry.by_name("Game Boy").is_some());
    }

    #[test]
    fn missing_roms_dir_is_an_error() {
        let dir = tempdir().unwrap();
        let layout = DeviceLayout::new(dir.path().join("nope"), "tg5040");
        assert!(SystemRegistry::load(&layout).is_err());
    }
}
