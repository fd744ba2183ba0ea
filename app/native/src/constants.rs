//! Settings namespaces, keys and defaults shared across the crate.

/// Settings namespace owned by Caravel.
pub const APP_SCHEMA: &str = "org.gnome.shell.extensions.caravel";

/// Desktop background settings namespace.
pub const BACKGROUND_SCHEMA: &str = "org.gnome.desktop.background";

/// Lock screen background settings namespace.
pub const SCREENSAVER_SCHEMA: &str = "org.gnome.desktop.screensaver";

/// Desktop interface settings namespace, read for the color scheme.
pub const INTERFACE_SCHEMA: &str = "org.gnome.desktop.interface";

/// Default catalog directory.
pub const BACKGROUND_PROPERTIES_DEFAULT: &str = "/usr/share/gnome-background-properties";

/// Application keys.
pub mod app_keys {
    pub const DELAY: &str = "delay";
    pub const RANDOM: &str = "random";
    pub const BACKGROUND_PROPERTIES_PATH: &str = "background-properties-path";
    pub const ELAPSED_TIME: &str = "elapsed-time";
    pub const CHANGE_LOCKSCREEN: &str = "change-lockscreen";
    pub const CURRENT_WALLPAPER: &str = "current-wallpaper";
}

/// Background keys, shared by the desktop and lock screen namespaces.
pub mod background_keys {
    pub const PICTURE_URI: &str = "picture-uri";
    pub const PICTURE_URI_DARK: &str = "picture-uri-dark";
    pub const PICTURE_OPTIONS: &str = "picture-options";
    pub const COLOR_SHADING_TYPE: &str = "color-shading-type";
    pub const PRIMARY_COLOR: &str = "primary-color";
    pub const SECONDARY_COLOR: &str = "secondary-color";
}

/// Interface key holding the preferred color scheme.
pub const COLOR_SCHEME_KEY: &str = "color-scheme";

/// Color scheme value that selects dark variants.
pub const PREFER_DARK: &str = "prefer-dark";

/// Prefix turning an absolute path into a file URI.
pub const FILE_URI_PREFIX: &str = "file://";

/// Rotation delay bounds and default, in minutes.
pub const DELAY_MINUTES_MIN: u32 = 1;
pub const DELAY_MINUTES_MAX: u32 = 24 * 60;
pub const DELAY_MINUTES_DEFAULT: u32 = 5;

/// Environment variable overriding the log filter.
pub const LOG_ENV_VAR: &str = "CARAVEL_LOG";

/// Log filter used when [`LOG_ENV_VAR`] is unset.
pub const DEFAULT_LOG_FILTER: &str = "caravel=info,caravel_lib=info";
