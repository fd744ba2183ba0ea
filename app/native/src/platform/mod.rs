//! Platform helpers for paths and external commands.
//!
//! - [`path`] - Shell-like path expansion
//! - [`command`] - Executable lookup

pub mod command;
pub mod path;

pub use command::resolve_binary;
pub use path::{expand, expand_and_resolve, file_uri};
