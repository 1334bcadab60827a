//! skinpkg CLI library — command implementations and import orchestration.
#![deny(clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

/// CLI subcommand implementations.
pub mod commands;
/// CLI configuration — read/write `~/.skinpkg/config.toml`.
pub mod config;
pub mod export;
pub mod fsops;
pub mod importer;
pub mod lock;
pub mod notify;
pub mod validate;
