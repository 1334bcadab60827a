//! `skinpkg config` — write `~/.skinpkg/config.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{load_config, save_config, CliConfig};

/// Update the fields given and save the configuration to `path`.
///
/// # Errors
///
/// Returns an error if the existing file is unreadable or the new one cannot be written.
pub fn run_config(
    path: &Path,
    sd_root: Option<PathBuf>,
    platform: Option<String>,
    themes_dir: Option<PathBuf>,
) -> Result<CliConfig> {
    let mut cfg = if path.exists() {
        load_config(path)?
    } else {
        CliConfig::default()
    };
    if let Some(sd_root) = sd_root {
        cfg.sd_root = sd_root;
    }
    if let Some(platform) = platform {
        cfg.platform = platform;
    }
    if let Some(themes_dir) = themes_dir {
        cfg.themes_dir = themes_dir;
    }
    save_config(&cfg, path).with_context(|| format!("failed to write {}", path.display()))?;
    println!("saved: {}", path.display());
    Ok(cfg)
}
