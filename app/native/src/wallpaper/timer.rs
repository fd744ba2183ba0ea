//! Minute-based rotation timer.

use serde::Serialize;

use crate::constants::{DELAY_MINUTES_DEFAULT, DELAY_MINUTES_MAX, DELAY_MINUTES_MIN};
use crate::settings::SettingValue;

/// Minutes between wallpaper changes, within `1..=1440`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Delay(u32);

impl Delay {
    /// The delay used when none is configured or the stored one is invalid.
    pub const DEFAULT: Self = Self(DELAY_MINUTES_DEFAULT);

    /// Returns `None` if `minutes` is outside `1..=1440`.
    #[must_use]
    pub fn new(minutes: i64) -> Option<Self> {
        u32::try_from(minutes)
            .ok()
            .filter(|m| (DELAY_MINUTES_MIN..=DELAY_MINUTES_MAX).contains(m))
            .map(Self)
    }

    #[must_use]
    pub const fn minutes(self) -> u32 { self.0 }
}

impl Default for Delay {
    fn default() -> Self { Self::DEFAULT }
}

impl std::fmt::Display for Delay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} min", self.0)
    }
}

impl From<Delay> for SettingValue {
    fn from(delay: Delay) -> Self { Self::Int(i32::try_from(delay.0).unwrap_or(i32::MAX)) }
}

/// Counts elapsed minutes and reports when the delay has been reached.
///
/// The timer does not sleep; the daemon calls [`RotationTimer::tick`] once
/// per minute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationTimer {
    delay: Delay,
    elapsed: u32,
    running: bool,
}

impl RotationTimer {
    /// Creates a running timer, resuming from `elapsed` minutes.
    #[must_use]
    pub const fn new(delay: Delay, elapsed: u32) -> Self {
        Self { delay, elapsed, running: true }
    }

    /// Counts one minute. Returns `true` when the delay is reached, in which
    /// case the elapsed count starts over.
    pub const fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }

        self.elapsed += 1;
        if self.elapsed >= self.delay.minutes() {
            self.elapsed = 0;
            return true;
        }
        false
    }

    /// Starts counting from zero.
    pub const fn restart(&mut self) { self.elapsed = 0; }

    pub const fn pause(&mut self) { self.running = false; }

    pub const fn resume(&mut self) { self.running = true; }

    /// Changes the delay. Elapsed minutes are kept, so a shorter delay may
    /// fire on the next tick.
    pub const fn set_delay(&mut self, delay: Delay) { self.delay = delay; }

    #[must_use]
    pub const fn delay(&self) -> Delay { self.delay }

    #[must_use]
    pub const fn elapsed(&self) -> u32 { self.elapsed }

    #[must_use]
    pub const fn is_running(&self) -> bool { self.running }

    /// Minutes left until the next rotation.
    #[must_use]
    pub const fn remaining(&self) -> u32 { self.delay.minutes().saturating_sub(self.elapsed) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_bounds() {
        assert_eq!(Delay::new(1).map(Delay::minutes), Some(1));
        assert_eq!(Delay::new(1440).map(Delay::minutes), Some(1440));
        assert!(Delay::new(0).is_none());
        assert!(Delay::new(1441).is_none());
        assert!(Delay::new(-5).is_none());
        assert_eq!(Delay::default().minutes(), 5);
    }

    #[test]
    fn test_tick_fires_at_delay() {
        let mut timer = RotationTimer::new(Delay::new(3).unwrap(), 0);

        assert!(!timer.tick());
        assert!(!timer.tick());
        assert!(timer.tick());
        assert_eq!(timer.elapsed(), 0);
        assert_eq!(timer.remaining(), 3);
    }

    #[test]
    fn test_resumes_from_elapsed() {
        let mut timer = RotationTimer::new(Delay::new(10).unwrap(), 9);
        assert!(timer.tick());
    }

    #[test]
    fn test_elapsed_beyond_delay_fires_next_tick() {
        let mut timer = RotationTimer::new(Delay::new(5).unwrap(), 0);
        timer.tick();
        timer.tick();
        timer.tick();
        timer.set_delay(Delay::new(2).unwrap());
        assert!(timer.tick());
    }

    #[test]
    fn test_paused_timer_does_not_count() {
        let mut timer = RotationTimer::new(Delay::new(1).unwrap(), 0);
        timer.pause();
        assert!(!timer.tick());
        assert_eq!(timer.elapsed(), 0);

        timer.resume();
        assert!(timer.tick());
    }

    #[test]
    fn test_restart() {
        let mut timer = RotationTimer::new(Delay::new(5).unwrap(), 4);
        timer.restart();
        assert_eq!(timer.elapsed(), 0);
        assert!(timer.is_running());
    }
}
