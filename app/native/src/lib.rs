//! Caravel - rotates the desktop background through a catalog of wallpaper
//! definitions.
//!
//! The library reads GNOME background catalog documents, keeps a rotation
//! order over them and writes the chosen wallpaper into the desktop settings.
//! The `caravel` binary exposes this as a daemon and a set of CLI commands.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod markup;
pub mod platform;
pub mod schema;
pub mod settings;
pub mod wallpaper;
