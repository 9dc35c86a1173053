//! Uncompressed containers: one stored key (and value) per entry.

use crate::layout::{self, Traversal};
use size_of::SizeOf;
use std::iter::FusedIterator;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// An immutable set over a layout-ordered key array.
#[derive(Debug, Clone, PartialEq, Eq, SizeOf)]
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
pub struct SortedSet<K> {
    keys: Vec<K>,
}

/// Accumulates strictly ascending keys for a [`SortedSet`].
#[derive(Debug, Clone)]
pub struct SortedSetBuilder<K> {
    keys: Vec<K>,
}

impl<K: Ord> SortedSetBuilder<K> {
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
        }
    }

    /// Appends a key.
    ///
    /// # Panics
    ///
    /// Panics unless `key` is strictly greater than every key already
    /// pushed.
    pub fn push(&mut self, key: K) {
        assert!(
            self.keys.last().map_or(true, |last| *last < key),
            "keys must be pushed in strictly ascending order"
        );
        self.keys.push(key);
    }

    /// Removes and returns the most recent key. Panics when empty; the
    /// composite classifier only calls this after peeking [`Self::last`].
    pub(crate) fn pop(&mut self) -> K {
        self.keys.pop().expect("pop on an empty builder")
    }

    pub(crate) fn last(&self) -> Option<&K> {
        self.keys.last()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Reorders the accumulated keys into the search layout and returns
    /// the immutable set.
    pub fn freeze(self) -> SortedSet<K> {
        SortedSet {
            keys: layout::make_order(self.keys),
        }
    }
}

impl<K: Ord> Default for SortedSetBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> SortedSet<K> {
    pub fn builder() -> SortedSetBuilder<K> {
        SortedSetBuilder::new()
    }

    pub fn contains(&self, key: &K) -> bool {
        layout::search(&self.keys, key).map_or(false, |pi| self.keys[pi] == *key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in ascending order.
    pub fn iter(&self) -> SortedSetIter<'_, K> {
        SortedSetIter {
            keys: &self.keys,
            indices: layout::iter_forward(self.keys.len()),
        }
    }

    /// Adopts a key array that is already in the search layout, e.g. one
    /// produced by [`SortedSet::into_raw`].
    pub fn from_raw(keys: Vec<K>) -> Self {
        Self { keys }
    }

    /// The layout-ordered key array.
    pub fn into_raw(self) -> Vec<K> {
        self.keys
    }
}

impl<K: Ord> FromIterator<K> for SortedSet<K> {
    /// Sorts the input and freezes it. Duplicate keys panic, as any
    /// out-of-order append does.
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut keys: Vec<K> = iter.into_iter().collect();
        keys.sort_unstable();
        let mut builder = SortedSetBuilder::with_capacity(keys.len());
        for key in keys {
            builder.push(key);
        }
        builder.freeze()
    }
}

impl<'a, K: Ord> IntoIterator for &'a SortedSet<K> {
    type Item = &'a K;
    type IntoIter = SortedSetIter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over a [`SortedSet`].
#[derive(Debug, Clone)]
pub struct SortedSetIter<'a, K> {
    keys: &'a [K],
    indices: Traversal,
}

impl<'a, K> Iterator for SortedSetIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.indices.next().map(|pi| &self.keys[pi])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<K> FusedIterator for SortedSetIter<'_, K> {}

/// An immutable map over parallel layout-ordered key and value arrays.
#[derive(Debug, Clone, PartialEq, Eq, SizeOf)]
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
pub struct SortedMap<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
}

/// Accumulates strictly ascending entries for a [`SortedMap`].
#[derive(Debug, Clone)]
pub struct SortedMapBuilder<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
}

impl<K: Ord, V> SortedMapBuilder<K, V> {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Appends an entry.
    ///
    /// # Panics
    ///
    /// Panics unless `key` is strictly greater than every key already
    /// pushed.
    pub fn push(&mut self, key: K, value: V) {
        assert!(
            self.keys.last().map_or(true, |last| *last < key),
            "keys must be pushed in strictly ascending order"
        );
        self.keys.push(key);
        self.values.push(value);
    }

    /// Removes and returns the most recent entry. Panics when empty.
    pub(crate) fn pop(&mut self) -> (K, V) {
        let key = self.keys.pop().expect("pop on an empty builder");
        let value = self.values.pop().expect("pop on an empty builder");
        (key, value)
    }

    pub(crate) fn last(&self) -> Option<(&K, &V)> {
        Some((self.keys.last()?, self.values.last()?))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Reorders both columns into the search layout and returns the
    /// immutable map.
    pub fn freeze(self) -> SortedMap<K, V> {
        SortedMap {
            keys: layout::make_order(self.keys),
            values: layout::make_order(self.values),
        }
    }
}

impl<K: Ord, V> Default for SortedMapBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> SortedMap<K, V> {
    pub fn builder() -> SortedMapBuilder<K, V> {
        SortedMapBuilder::new()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let pi = layout::search(&self.keys, key)?;
        (self.keys[pi] == *key).then(|| &self.values[pi])
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> SortedMapIter<'_, K, V> {
        SortedMapIter {
            keys: &self.keys,
            values: &self.values,
            indices: layout::iter_forward(self.keys.len()),
        }
    }

    /// Adopts parallel columns that are already in the search layout.
    ///
    /// # Panics
    ///
    /// Panics when the columns disagree on length.
    pub fn from_raw(keys: Vec<K>, values: Vec<V>) -> Self {
        assert_eq!(keys.len(), values.len(), "parallel columns must match");
        Self { keys, values }
    }

    /// The layout-ordered `(keys, values)` columns.
    pub fn into_raw(self) -> (Vec<K>, Vec<V>) {
        (self.keys, self.values)
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for SortedMap<K, V> {
    /// Sorts the input by key and freezes it. Duplicate keys panic.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries: Vec<(K, V)> = iter.into_iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        let mut builder = SortedMapBuilder::with_capacity(entries.len());
        for (key, value) in entries {
            builder.push(key, value);
        }
        builder.freeze()
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a SortedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = SortedMapIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over a [`SortedMap`].
#[derive(Debug, Clone)]
pub struct SortedMapIter<'a, K, V> {
    keys: &'a [K],
    values: &'a [V],
    indices: Traversal,
}

impl<'a, K, V> Iterator for SortedMapIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.indices.next().map(|pi| (&self.keys[pi], &self.values[pi]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<K, V> FusedIterator for SortedMapIter<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::{SortedMap, SortedSet};
    use rand::prelude::*;
    use rand_xoshiro::Xoshiro256StarStar;
    use std::collections::BTreeSet;

    #[test]
    fn set_membership() {
        let set: SortedSet<i32> = [12, 3, 7, 20, 1].into_iter().collect();
        assert_eq!(set.len(), 5);
        assert!(!set.is_empty());
        for key in [1, 3, 7, 12, 20] {
            assert!(set.contains(&key));
        }
        for key in [0, 2, 13, 21] {
            assert!(!set.contains(&key));
        }
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 3, 7, 12, 20]);
    }

    #[test]
    fn empty_set() {
        let set: SortedSet<u64> = [].into_iter().collect();
        assert!(set.is_empty());
        assert!(!set.contains(&0));
        assert_eq!(set.iter().next(), None);
    }

    #[test]
    fn set_matches_btreeset_on_random_input() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(0x5eed);
        for _ in 0..50 {
            let n = rng.gen_range(0..100);
            let reference: BTreeSet<u32> = (0..n).map(|_| rng.gen_range(0..500)).collect();
            let set: SortedSet<u32> = reference.iter().copied().collect();
            assert_eq!(set.len(), reference.len());
            for key in 0..500 {
                assert_eq!(set.contains(&key), reference.contains(&key));
            }
            assert_eq!(
                set.iter().copied().collect::<Vec<_>>(),
                reference.iter().copied().collect::<Vec<_>>()
            );
        }
    }

    #[test]
    #[should_panic(expected = "strictly ascending")]
    fn duplicate_keys_rejected() {
        let _: SortedSet<i32> = [1, 2, 2].into_iter().collect();
    }

    #[test]
    fn map_lookup() {
        let map: SortedMap<u32, &str> =
            [(2, "two"), (9, "nine"), (5, "five")].into_iter().collect();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&2), Some(&"two"));
        assert_eq!(map.get(&5), Some(&"five"));
        assert_eq!(map.get(&9), Some(&"nine"));
        assert_eq!(map.get(&4), None);
        assert!(map.contains_key(&9));
        assert!(!map.contains_key(&0));
        assert_eq!(
            map.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(),
            [(2, "two"), (5, "five"), (9, "nine")]
        );
    }

    #[test]
    fn raw_round_trip() {
        let set: SortedSet<i32> = (0..40).collect();
        let restored = SortedSet::from_raw(set.clone().into_raw());
        assert_eq!(set, restored);

        let map: SortedMap<i32, i32> = (0..40).map(|k| (k, k * k)).collect();
        let (keys, values) = map.clone().into_raw();
        assert_eq!(SortedMap::from_raw(keys, values), map);
    }

    #[cfg(feature = "with-serde")]
    #[test]
    fn serde_round_trip() {
        let set: SortedSet<i16> = [5, 1, 9, 2].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        let restored: SortedSet<i16> = serde_json::from_str(&json).unwrap();
        assert_eq!(set, restored);
    }
}
