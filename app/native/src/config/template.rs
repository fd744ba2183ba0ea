//! Configuration template generation.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
#[must_use]
pub fn generate_config_template() -> String {
    r#"// Caravel Configuration File
// ==========================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.
//
// Run `caravel schema` for the JSON Schema of this file.

{
  // Settings backend for the desktop background, lock screen and color
  // scheme: "gsettings" (the real desktop) or "file" (JSON files only).
  // "backend": "gsettings",

  // Directory for Caravel's own settings files. Relative paths are resolved
  // against this file's directory. Empty means ~/.local/share/caravel.
  // "storePath": "",

  // Seconds per daemon timer tick. One tick counts one minute of the delay.
  // "tickSeconds": 60,

  // Use the dark variant on the lock screen while the desktop is dark.
  // Set to false to always show the light variant there.
  // "lockscreenDarkVariant": true,

  // Initial values for Caravel's settings. Once changed with the CLI the
  // stored values take precedence.
  // "defaults": {
  //   // Directory containing the wallpaper catalog documents
  //   "backgroundPropertiesPath": "/usr/share/gnome-background-properties",
  //
  //   // Minutes between wallpaper changes (1 to 1440)
  //   "delay": 5,
  //
  //   // Shuffle the catalog instead of following its order
  //   "random": false,
  //
  //   // Also change the lock screen background
  //   "changeLockscreen": false
  // }
}
"#
    .to_string()
}

/// Writes the configuration template to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn create_config_file(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, generate_config_template())
}
