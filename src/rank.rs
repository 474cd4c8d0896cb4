//! Ordering and truncation of arrival candidates.

use std::num::NonZeroUsize;

/// Sorts minutes ascending and keeps the soonest `max_trains`.
pub fn rank(mut candidates: Vec<u32>, max_trains: NonZeroUsize) -> Vec<u32> {
    candidates.sort();
    candidates.truncate(max_trains.get());
    candidates
}
