//! Deprecated package layouts: one directory per destination, fixed file names.
//!
//! ```text
//! Wallpapers/Root/bg.png
//! Wallpapers/Root/.media/bg.png
//! Wallpapers/Systems/Game Boy (GB)/bg.png
//! Wallpapers/Collections/<name>/bg.png
//! Icons/Systems/(GB)/icon.png
//! Icons/Tools/<tool>.png
//! ```

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use skinpkg_core::manifest::PathMapping;
use skinpkg_core::types::{meta, Category, IconType, WallpaperType};

use crate::layout::{BACKGROUND_FILE, ICON_FILE, MEDIA_DIR};
use crate::naming::{split_tag, stem};
use crate::resolver::{insert, png_files, subdirs, unresolved, PathResolver};

/// Legacy wallpaper directories that name a special location.
const SPECIAL_WALLPAPER_DIRS: [&str; 4] = ["Root", "Recently Played", "Tools", "Collections"];

impl PathResolver<'_> {
    pub(crate) fn legacy_wallpapers(&self, root: &Path) -> io::Result<Vec<PathMapping>> {
        let base = root.join("Wallpapers");
        let mut out = BTreeMap::new();

        for dir in SPECIAL_WALLPAPER_DIRS {
            let theme_path = format!("Wallpapers/{dir}/{BACKGROUND_FILE}");
            if base.join(dir).join(BACKGROUND_FILE).is_file() {
                self.push_special_wallpaper(&mut out, theme_path, dir);
            }
        }
        if base.join("Root").join(MEDIA_DIR).join(BACKGROUND_FILE).is_file() {
            let theme_path = format!("Wallpapers/Root/{MEDIA_DIR}/{BACKGROUND_FILE}");
            self.push_special_wallpaper(&mut out, theme_path, "Root-Media");
        }

        for dir in subdirs(&base.join("Systems"))? {
            if !base.join("Systems").join(&dir).join(BACKGROUND_FILE).is_file() {
                continue;
            }
            let theme_path = format!("Wallpapers/Systems/{dir}/{BACKGROUND_FILE}");
            let resolved = split_tag(&dir).and_then(|(name, tag)| {
                self.legacy_media_dir(name, tag)
                    .map(|(system, media)| (system, tag, media))
            });
            match resolved {
                Some((system, tag, media)) => insert(
                    &mut out,
                    PathMapping::new(theme_path, media.join(BACKGROUND_FILE))
                        .with_meta(meta::SYSTEM_NAME, system)
                        .with_meta(meta::SYSTEM_TAG, tag)
                        .with_meta(meta::WALLPAPER_TYPE, WallpaperType::System.as_str()),
                ),
                None => unresolved(Category::Wallpapers, &theme_path),
            }
        }

        for name in subdirs(&base.join("Collections"))? {
            if !base.join("Collections").join(&name).join(BACKGROUND_FILE).is_file() {
                continue;
            }
            insert(
                &mut out,
                PathMapping::new(
                    format!("Wallpapers/Collections/{name}/{BACKGROUND_FILE}"),
                    self.layout().collection_media_dir(&name).join(BACKGROUND_FILE),
                )
                .with_meta(meta::COLLECTION_NAME, name.clone())
                .with_meta(meta::WALLPAPER_TYPE, WallpaperType::Collection.as_str()),
            );
        }

        Ok(out.into_values().collect())
    }

    fn push_special_wallpaper(
        &self,
        out: &mut BTreeMap<String, PathMapping>,
        theme_path: String,
        special: &str,
    ) {
        if let Some((ty, dest)) = self.special_wallpaper(special) {
            insert(
                out,
                PathMapping::new(theme_path, dest)
                    .with_meta(meta::SYSTEM_NAME, special)
                    .with_meta(meta::WALLPAPER_TYPE, ty.as_str()),
            );
        }
    }

    pub(crate) fn legacy_icons(&self, root: &Path) -> io::Result<Vec<PathMapping>> {
        let base = root.join("Icons");
        let mut out = BTreeMap::new();

        for file in png_files(&base)? {
            let name = stem(&file);
            let theme_path = format!("Icons/{file}");
            match self.special_icon(name) {
                Some(dest) => insert(
                    &mut out,
                    PathMapping::new(theme_path, dest)
                        .with_meta(meta::SYSTEM_NAME, name)
                        .with_meta(meta::ICON_TYPE, IconType::Special.as_str()),
                ),
                None => unresolved(Category::Icons, &theme_path),
            }
        }

        for dir in subdirs(&base.join("Systems"))? {
            if !base.join("Systems").join(&dir).join(ICON_FILE).is_file() {
                continue;
            }
            let theme_path = format!("Icons/Systems/{dir}/{ICON_FILE}");
            let resolved = split_tag(&dir).and_then(|(name, tag)| {
                self.legacy_media_dir(name, tag)
                    .map(|(system, media)| (system, tag, media))
            });
            match resolved {
                Some((system, tag, media)) => insert(
                    &mut out,
                    PathMapping::new(theme_path, media.join(ICON_FILE))
                        .with_meta(meta::SYSTEM_NAME, system)
                        .with_meta(meta::SYSTEM_TAG, tag)
                        .with_meta(meta::ICON_TYPE, IconType::System.as_str()),
                ),
                None => unresolved(Category::Icons, &theme_path),
            }
        }

        for file in png_files(&base.join("Tools"))? {
            insert(&mut out, self.tool_icon(format!("Icons/Tools/{file}"), stem(&file)));
        }
        for file in png_files(&base.join("Collections"))? {
            insert(
                &mut out,
                self.collection_icon(format!("Icons/Collections/{file}"), stem(&file)),
            );
        }

        Ok(out.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::tempdir;

    use crate::layout::DeviceLayout;
    use crate::resolver::PathResolver;

    #[test]
    fn legacy_wallpapers_resolve_fixed_dirs_and_tags() {
        let pkg = tempdir().unwrap();
        let w = pkg.path().join("Wallpapers");
        fs::create_dir_all(w.join("Root/.media")).unwrap();
        fs::create_dir_all(w.join("Systems/(GB)")).unwrap();
        fs::create_dir_all(w.join("Systems/Game Gear (GG)")).unwrap();
        fs::write(w.join("Root/bg.png"), b"png").unwrap();
        fs::write(w.join("Root/.media/bg.png"), b"png").unwrap();
        fs::write(w.join("Systems/(GB)/bg.png"), b"png").unwrap();
        fs::write(w.join("Systems/Game Gear (GG)/bg.png"), b"png").unwrap();

        let layout = DeviceLayout::new("/sd", "tg5040");
        let resolver = PathResolver::new(&layout, None);
        let maps = resolver.legacy_wallpapers(pkg.path()).unwrap();

        let pairs: Vec<(&str, PathBuf)> = maps
            .iter()
            .map(|m| (m.theme_path.as_str(), m.system_path.clone()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Wallpapers/Root/.media/bg.png", layout.root_media_background.clone()),
                ("Wallpapers/Root/bg.png", layout.root_background.clone()),
                (
                    "Wallpapers/Systems/Game Gear (GG)/bg.png",
                    PathBuf::from("/sd/Roms/Game Gear (GG)/.media/bg.png")
                ),
            ]
        );
    }

    #[test]
    fn legacy_icons_cover_tools_and_specials() {
        let pkg = tempdir().unwrap();
        let i = pkg.path().join("Icons");
        fs::create_dir_all(i.join("Tools")).unwrap();
        fs::write(i.join("Tools/Clock.png"), b"png").unwrap();
        fs::write(i.join("Recently Played.png"), b"png").unwrap();

        let layout = DeviceLayout::new("/sd", "tg5040");
        let resolver = PathResolver::new(&layout, None);
        let maps = resolver.legacy_icons(pkg.path()).unwrap();
        assert_eq!(maps.len(), 2);
        assert_eq!(maps[0].theme_path, "Icons/Recently Played.png");
        assert_eq!(maps[0].system_path, layout.recently_played_icon);
        assert_eq!(
            maps[1].system_path,
            PathBuf::from("/sd/Tools/tg5040/Clock/.media/icon.png")
        );
    }
}
