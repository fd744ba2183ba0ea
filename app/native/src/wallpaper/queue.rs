//! Rotation order over the catalog.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::WallpaperRecord;

/// Order in which catalog entries are visited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    /// Listing order.
    #[default]
    Sequential,
    /// A random permutation of the listing.
    Shuffled,
}

impl OrderMode {
    /// Maps the stored `random` flag to a mode.
    #[must_use]
    pub const fn from_random(random: bool) -> Self {
        if random { Self::Shuffled } else { Self::Sequential }
    }

    #[must_use]
    pub const fn is_random(self) -> bool { matches!(self, Self::Shuffled) }
}

impl std::fmt::Display for OrderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Shuffled => write!(f, "shuffled"),
        }
    }
}

/// Shuffles `items` in place with a backward Fisher–Yates pass.
///
/// For each position `i` from the end down to 1, swaps it with a uniformly
/// chosen position in `0..=i`. Slices with fewer than two items are left
/// untouched.
pub fn fisher_yates<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// The ordered sequence of wallpapers and the position in it.
///
/// The queue keeps the listing order it was loaded with so that switching
/// back to sequential mode restores it without reading the catalog again.
#[derive(Debug)]
pub struct RotationQueue {
    listing: Vec<WallpaperRecord>,
    entries: Vec<WallpaperRecord>,
    current_index: usize,
    mode: OrderMode,
    rng: StdRng,
}

impl RotationQueue {
    /// Creates an empty queue seeded from the thread-local generator.
    #[must_use]
    pub fn new(mode: OrderMode) -> Self {
        Self::with_rng(mode, StdRng::from_rng(&mut rand::rng()))
    }

    /// Creates an empty queue with a deterministic shuffle sequence.
    #[must_use]
    pub fn with_seed(mode: OrderMode, seed: u64) -> Self {
        Self::with_rng(mode, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mode: OrderMode, rng: StdRng) -> Self {
        Self {
            listing: Vec::new(),
            entries: Vec::new(),
            current_index: 0,
            mode,
            rng,
        }
    }

    /// Replaces the entries with `records` and rewinds to the first one.
    ///
    /// In shuffled mode the records are shuffled once.
    pub fn load(&mut self, records: Vec<WallpaperRecord>) {
        self.listing = records;
        self.rebuild();
        self.current_index = 0;
    }

    /// Advances to the next entry and returns it.
    ///
    /// Queues with fewer than two entries do not advance and return `None`.
    pub fn next(&mut self) -> Option<&WallpaperRecord> {
        if self.entries.len() < 2 {
            return None;
        }

        self.current_index = (self.current_index + 1) % self.entries.len();
        self.entries.get(self.current_index)
    }

    /// The entry [`RotationQueue::next`] would move to, without moving.
    ///
    /// A single-entry queue previews that entry.
    #[must_use]
    pub fn preview(&self) -> Option<&WallpaperRecord> {
        if self.entries.is_empty() {
            return None;
        }
        self.entries.get((self.current_index + 1) % self.entries.len())
    }

    /// The entry at the current position.
    #[must_use]
    pub fn current(&self) -> Option<&WallpaperRecord> { self.entries.get(self.current_index) }

    /// Switches the order mode. Setting the current mode again does nothing.
    ///
    /// Entering shuffled mode shuffles the entries in place and keeps the
    /// current position as a number. Entering sequential mode reloads the
    /// listing, rewinding to the first entry.
    pub fn set_mode(&mut self, mode: OrderMode) {
        if mode == self.mode {
            return;
        }

        self.mode = mode;
        match mode {
            OrderMode::Sequential => {
                let listing = std::mem::take(&mut self.listing);
                self.load(listing);
            }
            OrderMode::Shuffled => {
                self.rebuild();
                if self.current_index >= self.entries.len() {
                    self.current_index = 0;
                }
            }
        }
    }

    /// Moves the current position to the entry read from `source_path`.
    ///
    /// Returns `false` and leaves the position alone if no entry matches.
    pub fn seek(&mut self, source_path: &Path) -> bool {
        match self.entries.iter().position(|record| record.source_path == source_path) {
            Some(index) => {
                self.current_index = index;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> OrderMode { self.mode }

    #[must_use]
    pub const fn current_index(&self) -> usize { self.current_index }

    #[must_use]
    pub fn entries(&self) -> &[WallpaperRecord] { &self.entries }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    fn rebuild(&mut self) {
        self.entries = self.listing.clone();
        if self.mode.is_random() {
            fisher_yates(&mut self.entries, &mut self.rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn records(count: usize) -> Vec<WallpaperRecord> {
        (0..count).map(|i| WallpaperRecord::new(format!("/cat/{i}.xml"))).collect()
    }

    fn paths(queue: &RotationQueue) -> Vec<PathBuf> {
        queue.entries().iter().map(|r| r.source_path.clone()).collect()
    }

    fn sorted(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
        paths.sort();
        paths
    }

    #[test]
    fn test_order_mode_from_random() {
        assert_eq!(OrderMode::from_random(true), OrderMode::Shuffled);
        assert_eq!(OrderMode::from_random(false), OrderMode::Sequential);
        assert!(OrderMode::Shuffled.is_random());
        assert_eq!(OrderMode::Shuffled.to_string(), "shuffled");
    }

    #[test]
    fn test_fisher_yates_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in [0usize, 1, 2, 5, 31] {
            let mut items: Vec<usize> = (0..len).collect();
            fisher_yates(&mut items, &mut rng);
            items.sort_unstable();
            assert_eq!(items, (0..len).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_fisher_yates_is_deterministic_per_seed() {
        let mut a: Vec<u32> = (0..20).collect();
        let mut b = a.clone();
        fisher_yates(&mut a, &mut StdRng::seed_from_u64(42));
        fisher_yates(&mut b, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_sequential_load_keeps_order() {
        let mut queue = RotationQueue::new(OrderMode::Sequential);
        queue.load(records(3));

        assert_eq!(queue.current_index(), 0);
        assert_eq!(paths(&queue), records(3).into_iter().map(|r| r.source_path).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffled_load_is_permutation() {
        let mut queue = RotationQueue::with_seed(OrderMode::Shuffled, 3);
        queue.load(records(12));

        let expected: Vec<PathBuf> = records(12).into_iter().map(|r| r.source_path).collect();
        assert_eq!(sorted(paths(&queue)), sorted(expected));
        assert_eq!(queue.len(), 12);
    }

    #[test]
    fn test_next_wraps_around() {
        let mut queue = RotationQueue::new(OrderMode::Sequential);
        queue.load(records(3));

        let visited: Vec<PathBuf> =
            (0..4).map(|_| queue.next().unwrap().source_path.clone()).collect();

        assert_eq!(visited, vec![
            PathBuf::from("/cat/1.xml"),
            PathBuf::from("/cat/2.xml"),
            PathBuf::from("/cat/0.xml"),
            PathBuf::from("/cat/1.xml"),
        ]);
    }

    #[test]
    fn test_preview_matches_next() {
        let mut queue = RotationQueue::with_seed(OrderMode::Shuffled, 11);
        queue.load(records(5));

        for _ in 0..7 {
            let previewed = queue.preview().cloned();
            assert_eq!(queue.next().cloned(), previewed);
        }
    }

    #[test]
    fn test_singleton_queue_does_not_advance() {
        let mut queue = RotationQueue::new(OrderMode::Sequential);
        queue.load(records(1));

        assert!(queue.next().is_none());
        assert_eq!(queue.current_index(), 0);
        assert_eq!(queue.preview().unwrap().source_path, PathBuf::from("/cat/0.xml"));
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = RotationQueue::new(OrderMode::Shuffled);
        queue.load(Vec::new());

        assert!(queue.is_empty());
        assert!(queue.next().is_none());
        assert!(queue.preview().is_none());
        assert!(queue.current().is_none());
    }

    #[test]
    fn test_set_mode_round_trip_restores_listing() {
        let mut queue = RotationQueue::with_seed(OrderMode::Sequential, 5);
        queue.load(records(8));
        let listing = paths(&queue);

        queue.set_mode(OrderMode::Shuffled);
        assert_eq!(queue.mode(), OrderMode::Shuffled);
        assert_eq!(sorted(paths(&queue)), sorted(listing.clone()));

        queue.set_mode(OrderMode::Sequential);
        assert_eq!(paths(&queue), listing);
    }

    #[test]
    fn test_set_mode_keeps_numeric_position() {
        let mut queue = RotationQueue::with_seed(OrderMode::Sequential, 5);
        queue.load(records(6));
        queue.next();
        queue.next();

        queue.set_mode(OrderMode::Shuffled);
        assert_eq!(queue.current_index(), 2);
    }

    #[test]
    fn test_sequential_mode_rewinds() {
        let mut queue = RotationQueue::with_seed(OrderMode::Shuffled, 1);
        queue.load(records(5));
        queue.next();
        queue.next();
        assert_eq!(queue.current_index(), 2);

        queue.set_mode(OrderMode::Sequential);
        assert_eq!(queue.current_index(), 0);
        assert_eq!(queue.current().unwrap().source_path, PathBuf::from("/cat/0.xml"));
        assert_eq!(queue.preview().unwrap().source_path, PathBuf::from("/cat/1.xml"));
    }

    #[test]
    fn test_set_same_mode_is_noop() {
        let mut queue = RotationQueue::with_seed(OrderMode::Shuffled, 9);
        queue.load(records(10));
        let before = paths(&queue);

        queue.set_mode(OrderMode::Shuffled);
        assert_eq!(paths(&queue), before);
    }

    #[test]
    fn test_seek() {
        let mut queue = RotationQueue::new(OrderMode::Sequential);
        queue.load(records(4));

        assert!(queue.seek(Path::new("/cat/2.xml")));
        assert_eq!(queue.current_index(), 2);
        assert_eq!(queue.preview().unwrap().source_path, PathBuf::from("/cat/3.xml"));

        assert!(!queue.seek(Path::new("/cat/missing.xml")));
        assert_eq!(queue.current_index(), 2);
    }

    #[test]
    fn test_reload_rewinds() {
        let mut queue = RotationQueue::new(OrderMode::Sequential);
        queue.load(records(4));
        queue.next();
        queue.load(records(2));
        assert_eq!(queue.current_index(), 0);
    }
}
