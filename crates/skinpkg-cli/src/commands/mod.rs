//! One module per `skinpkg` subcommand.

pub mod config;
pub mod export;
pub mod import;
pub mod pack;
pub mod update;
