//! Core domain types for the skinpkg theme ecosystem.
#![deny(clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod manifest;
pub mod settings;
pub mod types;
