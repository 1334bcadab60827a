use std::path::PathBuf;

use clap::{Parser, Subcommand};
use skinpkg_cli::config::{default_config_path, load_or_default};
use skinpkg_cli::export::ExportOptions;

#[derive(Parser)]
#[command(name = "skinpkg", about = "Theme package manager for handheld device skins")]
struct Cli {
    /// Config file (default: ~/.skinpkg/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a theme package directory or .theme.tar.gz archive to the device
    Import { path: PathBuf },
    /// Re-derive a package's manifest.json from its files
    Update { path: PathBuf },
    /// Capture the device's installed theme as a new package
    Export {
        dest: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        author: String,
        #[arg(long, default_value = "1.0.0")]
        version: String,
    },
    /// Update a package's manifest and archive it as .theme.tar.gz
    Pack {
        path: PathBuf,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Write CLI configuration
    Config {
        #[arg(long)]
        sd_root: Option<PathBuf>,
        #[arg(long)]
        platform: Option<String>,
        #[arg(long)]
        themes_dir: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);

    let load = || load_or_default(&config_path);

    match cli.command {
        Commands::Import { path } => {
            skinpkg_cli::commands::import::run_import(&load()?, &path)?;
        }
        Commands::Update { path } => {
            skinpkg_cli::commands::update::run_update(&load()?, &path)?;
        }
        Commands::Export {
            dest,
            name,
            author,
            version,
        } => {
            let opts = ExportOptions {
                name,
                author,
                version,
            };
            skinpkg_cli::commands::export::run_export(&load()?, &dest, &opts)?;
        }
        Commands::Pack { path, output } => {
            skinpkg_cli::commands::pack::run_pack(&load()?, &path, output.as_deref())?;
        }
        Commands::Config {
            sd_root,
            platform,
            themes_dir,
        } => {
            skinpkg_cli::commands::config::run_config(&config_path, sd_root, platform, themes_dir)?;
        }
    }
    Ok(())
}
