//! Path resolution and manifest re-derivation for theme packages.
#![deny(clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod error;
pub mod layout;
mod legacy;
pub mod naming;
pub mod registry;
pub mod resolver;
pub mod updater;
