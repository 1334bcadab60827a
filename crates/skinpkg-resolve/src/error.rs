//! Error types for registry loading and manifest updates.

use std::path::PathBuf;

use skinpkg_core::settings::SettingsError;
use thiserror::Error;

/// The system registry could not be obtained.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The ROMs directory could not be listed.
    #[error("cannot read system directory '{path}': {source}")]
    Unreadable {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Failure while re-deriving one category. Logged and isolated to that category.
#[derive(Debug, Error)]
pub enum CategoryError {
    /// Reading the package tree failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A settings file in the package is malformed.
    #[error("settings parse error: {0}")]
    Settings(#[from] SettingsError),
}

/// Errors that abort a manifest update as a whole.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The package root is not a directory.
    #[error("theme package '{0}' is not a directory")]
    NotAPackage(PathBuf),
    /// Writing the manifest failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The manifest could not be serialized.
    #[error("manifest serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
