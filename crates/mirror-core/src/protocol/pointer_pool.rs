//! Reusable storage for the point records of Mouse events.
//!
//! A touch gesture produces a Mouse event for every motion sample, and almost
//! all of them carry between one and a handful of contacts.  Rather than
//! allocating a fresh `Vec` per sample, the decoder keeps one pre-sized array
//! per contact count and lends it out for the lifetime of a single event:
//!
//! 1. the decoder calls [`PointerPool::acquire`] with the wire count and
//!    overwrites every record;
//! 2. the dispatcher handles the event;
//! 3. the event is handed back and [`PointerPool::release`] returns the
//!    array to its bucket.
//!
//! Decode and dispatch are strictly sequential, so a bucket is never lent
//! twice at once.  Counts above the largest bucket get a one-off allocation
//! that is dropped on release.

use crate::protocol::events::PointerSample;

/// Largest contact count served from a pre-sized bucket by default.
pub const DEFAULT_MAX_POOLED_POINTERS: usize = 8;

/// Pool of point-record arrays keyed by contact count.
#[derive(Debug)]
pub struct PointerPool {
    /// `buckets[n]` holds an array of exactly `n` records while it is not lent out.
    buckets: Vec<Vec<PointerSample>>,
    max_pooled: usize,
}

impl PointerPool {
    /// Creates a pool with buckets for 0..=[`DEFAULT_MAX_POOLED_POINTERS`] contacts.
    pub fn new() -> Self {
        Self::with_max_pooled(DEFAULT_MAX_POOLED_POINTERS)
    }

    /// Creates a pool with buckets for 0..=`max_pooled` contacts, each filled
    /// with inert records.
    pub fn with_max_pooled(max_pooled: usize) -> Self {
        let buckets = (0..=max_pooled)
            .map(|count| vec![PointerSample::default(); count])
            .collect();
        Self {
            buckets,
            max_pooled,
        }
    }

    /// Largest count served from a bucket.
    pub fn max_pooled(&self) -> usize {
        self.max_pooled
    }

    /// Returns an array of exactly `count` records.
    ///
    /// For pooled counts the records keep whatever the previous event wrote;
    /// the caller overwrites all of them.
    pub fn acquire(&mut self, count: usize) -> Vec<PointerSample> {
        if count > self.max_pooled {
            return vec![PointerSample::default(); count];
        }
        let mut points = std::mem::take(&mut self.buckets[count]);
        if points.len() != count {
            // The bucket is still lent out (its event was never released).
            points.resize(count, PointerSample::default());
        }
        points
    }

    /// Hands an array obtained from [`acquire`](Self::acquire) back to the pool.
    ///
    /// Arrays larger than the biggest bucket are dropped.
    pub fn release(&mut self, points: Vec<PointerSample>) {
        let count = points.len();
        if count <= self.max_pooled {
            self.buckets[count] = points;
        }
    }
}

impl Default for PointerPool {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_returns_exact_length_for_every_count() {
        let mut pool = PointerPool::new();
        for count in 0..=20 {
            let points = pool.acquire(count);
            assert_eq!(points.len(), count);
            pool.release(points);
        }
    }

    #[test]
    fn test_pooled_counts_reuse_the_same_allocation() {
        let mut pool = PointerPool::new();
        for count in 1..=DEFAULT_MAX_POOLED_POINTERS {
            // Arrange
            let first = pool.acquire(count);
            let first_ptr = first.as_ptr();
            pool.release(first);

            // Act
            let second = pool.acquire(count);

            // Assert
            assert_eq!(second.as_ptr(), first_ptr, "count {count} must reuse its bucket");
            pool.release(second);
        }
    }

    #[test]
    fn test_pooled_records_are_not_cleared_between_uses() {
        let mut pool = PointerPool::new();
        let mut points = pool.acquire(2);
        points[1] = PointerSample::new(30, 40, 1);
        pool.release(points);

        let points = pool.acquire(2);

        assert_eq!(points[1], PointerSample::new(30, 40, 1));
    }

    #[test]
    fn test_oversized_counts_get_a_fresh_array_each_time() {
        let mut pool = PointerPool::new();

        let first = pool.acquire(9);
        let second = pool.acquire(9);

        assert_eq!(first.len(), 9);
        assert_eq!(second.len(), 9);
        assert_ne!(first.as_ptr(), second.as_ptr());
    }

    #[test]
    fn test_release_of_oversized_array_leaves_buckets_alone() {
        let mut pool = PointerPool::new();
        let eight = pool.acquire(8);
        let eight_ptr = eight.as_ptr();
        pool.release(eight);

        pool.release(vec![PointerSample::default(); 12]);

        assert_eq!(pool.acquire(8).as_ptr(), eight_ptr);
    }

    #[test]
    fn test_acquire_while_lent_out_still_returns_exact_length() {
        let mut pool = PointerPool::new();
        let _lent = pool.acquire(3);

        let again = pool.acquire(3);

        assert_eq!(again.len(), 3);
    }

    #[test]
    fn test_custom_max_pooled_moves_the_allocation_threshold() {
        let mut pool = PointerPool::with_max_pooled(2);
        assert_eq!(pool.max_pooled(), 2);
        assert_eq!(pool.buckets.len(), 3);

        let three = pool.acquire(3);
        assert_eq!(three.len(), 3);
        pool.release(three);

        // Only the 0, 1 and 2 buckets exist; the 3-record array was dropped.
        assert_eq!(pool.buckets.len(), 3);
        assert!(pool.buckets.iter().enumerate().all(|(n, b)| b.len() == n));
    }
}
