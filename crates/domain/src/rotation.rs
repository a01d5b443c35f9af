//! Feed rotation for adapters that pick one feed per call

use std::sync::atomic::{AtomicUsize, Ordering};

/// Cycles through a list of feeds, one step per call.
///
/// Replaces a random pick: results still vary across calls, but a seeded
/// start makes the sequence reproducible.
#[derive(Debug)]
pub struct FeedRotation {
    cursor: AtomicUsize,
}

impl FeedRotation {
    /// Start at a fixed position (reduced modulo the feed count on use)
    pub fn starting_at(start: usize) -> Self {
        Self {
            cursor: AtomicUsize::new(start),
        }
    }

    /// Start at a random position
    pub fn random_start() -> Self {
        Self::starting_at(rand::random::<u32>() as usize)
    }

    /// Start at `seed` when given, otherwise at a random position
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::starting_at(seed as usize),
            None => Self::random_start(),
        }
    }

    /// Return the next feed and advance the cursor
    pub fn next<'a>(&self, feeds: &'a [String]) -> Option<&'a str> {
        if feeds.is_empty() {
            return None;
        }
        let position = self.cursor.fetch_add(1, Ordering::Relaxed);
        feeds.get(position % feeds.len()).map(String::as_str)
    }
}

impl Default for FeedRotation {
    fn default() -> Self {
        Self::random_start()
    }
}
