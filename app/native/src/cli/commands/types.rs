//! Argument types shared by the CLI commands.

use clap::ValueEnum;

use crate::wallpaper::OrderMode;

/// Rotation order as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliOrderMode {
    /// Follow the catalog listing order.
    Sequential,
    /// Visit the catalog in a random permutation.
    #[value(alias = "random")]
    Shuffled,
}

impl From<CliOrderMode> for OrderMode {
    fn from(mode: CliOrderMode) -> Self {
        match mode {
            CliOrderMode::Sequential => Self::Sequential,
            CliOrderMode::Shuffled => Self::Shuffled,
        }
    }
}
