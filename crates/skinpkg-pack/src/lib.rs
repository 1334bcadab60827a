//! Packing and unpacking of `.theme.tar.gz` archives.
#![deny(clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod error;
pub mod pack;
pub mod unpack;
