//! Tree-shared identifier generator.

use super::id::RESERVED_IDS;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic source of global ids.
///
/// One generator is shared by every cluster of a tree, so ids handed out
/// anywhere in the tree never collide. The counter starts one past the
/// reserved range and the first generated id is `RESERVED_IDS + 2`.
#[derive(Debug)]
pub struct IdGenerator {
    /// Last generated id.
    counter: AtomicU64,
}

impl IdGenerator {
    /// Creates a generator whose first id is 11.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(RESERVED_IDS + 1)
    }

    /// Creates a generator that treats `count` as the last generated id.
    #[must_use]
    pub fn starting_at(count: u64) -> Self {
        Self {
            counter: AtomicU64::new(count.max(RESERVED_IDS + 1)),
        }
    }

    /// Returns the next unique id.
    pub fn generate(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the last generated id.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    /// Fast-forwards the counter so later ids are all greater than `count`.
    ///
    /// Never rewinds: a `count` below the current value is ignored.
    pub fn set_count(&self, count: u64) {
        self.counter.fetch_max(count, Ordering::Relaxed);
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_starts_above_reserved_range() {
        let ids = IdGenerator::new();
        assert_eq!(ids.count(), 10);
        assert_eq!(ids.generate(), 11);
        assert_eq!(ids.generate(), 12);
        assert_eq!(ids.count(), 12);
    }

    #[test]
    fn test_set_count_fast_forwards() {
        let ids = IdGenerator::new();
        ids.set_count(100);
        assert_eq!(ids.generate(), 101);

        // Never rewinds
        ids.set_count(50);
        assert_eq!(ids.count(), 101);
        assert_eq!(ids.generate(), 102);
    }

    #[test]
    fn test_starting_at_clamps_reserved() {
        let ids = IdGenerator::starting_at(3);
        assert_eq!(ids.generate(), 11);
    }

    proptest! {
        #[test]
        fn prop_generated_ids_are_distinct(n in 1usize..500, skip in 0u64..1000) {
            let ids = IdGenerator::new();
            ids.set_count(skip);
            let mut seen = std::collections::HashSet::new();
            for _ in 0..n {
                let id = ids.generate();
                prop_assert!(id > RESERVED_IDS);
                prop_assert!(id > skip);
                prop_assert!(seen.insert(id));
            }
        }
    }
}
