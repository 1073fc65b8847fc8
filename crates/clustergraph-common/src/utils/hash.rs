//! Hash map and set aliases used across the workspace.
//!
//! Keys are small integers (ids, handles), so a fast non-cryptographic hasher
//! is used instead of SipHash.

/// A `hashbrown` map keyed with `ahash`.
pub type FxHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;

/// A `hashbrown` set keyed with `ahash`.
pub type FxHashSet<T> = hashbrown::HashSet<T, ahash::RandomState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_and_set() {
        let mut map: FxHashMap<u64, &str> = FxHashMap::default();
        map.insert(11, "a");
        map.insert(12, "b");
        assert_eq!(map.get(&11), Some(&"a"));

        let mut set: FxHashSet<u64> = FxHashSet::default();
        assert!(set.insert(11));
        assert!(!set.insert(11));
    }
}
