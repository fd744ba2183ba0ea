//! Dark mode detection.

use super::SettingsStore;
use crate::constants::{COLOR_SCHEME_KEY, PREFER_DARK};

/// Answers whether the desktop currently prefers dark variants.
pub trait Appearance {
    fn is_dark_mode(&self) -> bool;
}

/// Reads the interface namespace's `color-scheme` key.
///
/// Dark mode is on exactly when the key equals `prefer-dark`.
pub struct ColorSchemeAppearance {
    interface: Box<dyn SettingsStore>,
}

impl ColorSchemeAppearance {
    #[must_use]
    pub fn new(interface: Box<dyn SettingsStore>) -> Self { Self { interface } }
}

impl Appearance for ColorSchemeAppearance {
    fn is_dark_mode(&self) -> bool {
        self.interface.get_string(COLOR_SCHEME_KEY).as_deref() == Some(PREFER_DARK)
    }
}

/// A fixed answer, for dry runs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedAppearance(pub bool);

impl Appearance for FixedAppearance {
    fn is_dark_mode(&self) -> bool { self.0 }
}
