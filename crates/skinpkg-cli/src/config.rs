//! CLI configuration — read/write `~/.skinpkg/config.toml`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use skinpkg_resolve::layout::{DeviceLayout, DEFAULT_PLATFORM, DEFAULT_SD_ROOT};

/// Environment variable overriding [`CliConfig::sd_root`].
pub const SD_ROOT_ENV: &str = "SKINPKG_SD_ROOT";
/// Environment variable overriding [`CliConfig::platform`].
pub const PLATFORM_ENV: &str = "SKINPKG_PLATFORM";

/// Persisted CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// SD card mount point.
    pub sd_root:    PathBuf,
    /// Platform directory name under `Tools/`.
    pub platform:   String,
    /// Directory holding theme packages; relative package names resolve here.
    pub themes_dir: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        let sd_root = PathBuf::from(DEFAULT_SD_ROOT);
        Self {
            themes_dir: sd_root.join("Themes"),
            platform: DEFAULT_PLATFORM.to_owned(),
            sd_root,
        }
    }
}

impl CliConfig {
    /// Device destinations derived from this configuration.
    #[must_use]
    pub fn layout(&self) -> DeviceLayout {
        DeviceLayout::new(&self.sd_root, &self.platform)
    }

    /// Apply `SKINPKG_SD_ROOT` and `SKINPKG_PLATFORM` if set.
    #[must_use]
    pub fn apply_env(mut self) -> Self {
        if let Ok(sd) = std::env::var(SD_ROOT_ENV) {
            debug!("{SD_ROOT_ENV}={sd}");
            self.sd_root = PathBuf::from(sd);
        }
        if let Ok(platform) = std::env::var(PLATFORM_ENV) {
            debug!("{PLATFORM_ENV}={platform}");
            self.platform = platform;
        }
        self
    }

    /// Resolve a package argument: absolute or existing paths are used as-is,
    /// anything else is looked up in [`CliConfig::themes_dir`].
    #[must_use]
    pub fn resolve_package(&self, arg: &Path) -> PathBuf {
        if arg.is_absolute() || arg.exists() {
            arg.to_path_buf()
        } else {
            self.themes_dir.join(arg)
        }
    }
}

/// Return the default path for the CLI config file (`~/.skinpkg/config.toml`).
#[must_use]
pub fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_owned());
    PathBuf::from(home).join(".skinpkg").join("config.toml")
}

/// Write `cfg` to `path`, creating parent directories if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be written.
pub fn save_config(cfg: &CliConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string(cfg)?)?;
    Ok(())
}

/// Load and deserialize a [`CliConfig`] from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or deserialized.
pub fn load_config(path: &Path) -> Result<CliConfig> {
    let raw = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}

/// Load `path` if it exists, else defaults; environment overrides apply either way.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or deserialized.
pub fn load_or_default(path: &Path) -> Result<CliConfig> {
    let cfg = if path.exists() {
        load_config(path)?
    } else {
        debug!("no config at {}; using defaults", path.display());
        CliConfig::default()
    };
    Ok(cfg.apply_env())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn config_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = CliConfig {
            sd_root:    PathBuf::from("/media/sd"),
            platform:   "rg35xx".to_owned(),
            themes_dir: PathBuf::from("/media/sd/Themes"),
        };
        save_config(&cfg, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "platform = \"rg35xx\"\n").unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.platform, "rg35xx");
        assert_eq!(loaded.sd_root, PathBuf::from(DEFAULT_SD_ROOT));
    }

    #[test]
    fn layout_uses_configured_platform() {
        let cfg = CliConfig {
            platform: "rg35xx".to_owned(),
            ..CliConfig::default()
        };
        assert!(cfg.layout().tools_root.ends_with("Tools/rg35xx"));
    }

    #[test]
    fn relative_package_resolves_into_themes_dir() {
        let cfg = CliConfig::default();
        let resolved = cfg.resolve_package(Path::new("No Such Theme.theme"));
        assert_eq!(resolved, cfg.themes_dir.join("No Such Theme.theme"));
    }
}
