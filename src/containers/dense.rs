//! Dense map: runs of consecutive keys over arbitrary values. The run
//! columns live in the search layout; the values themselves stay in one
//! shared buffer in append order, addressed by a per-run offset.

use crate::algebra::{is_adjacent, Discrete};
use crate::layout::{self, Traversal};
use size_of::SizeOf;
use std::iter::FusedIterator;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// An immutable map that stores one entry per run of consecutive keys,
/// with each key's value held in a side buffer.
///
/// Only `low_keys`/`high_keys`/`value_indices` are layout-ordered;
/// `value_data` keeps its natural append order and is indexed by
/// `value_indices[run] + (key - low_keys[run])`.
#[derive(Debug, Clone, PartialEq, Eq, SizeOf)]
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
pub struct DenseMap<K, V> {
    len: usize,
    low_keys: Vec<K>,
    high_keys: Vec<K>,
    value_indices: Vec<usize>,
    value_data: Vec<V>,
}

/// Accumulates ascending entries and runs for a [`DenseMap`].
#[derive(Debug, Clone)]
pub struct DenseMapBuilder<K, V> {
    len: usize,
    low_keys: Vec<K>,
    high_keys: Vec<K>,
    value_indices: Vec<usize>,
    value_data: Vec<V>,
}

impl<K: Discrete, V> DenseMapBuilder<K, V> {
    pub fn new() -> Self {
        Self {
            len: 0,
            low_keys: Vec::new(),
            high_keys: Vec::new(),
            value_indices: Vec::new(),
            value_data: Vec::new(),
        }
    }

    /// Appends a single entry, extending the final run when the key is
    /// adjacent.
    ///
    /// # Panics
    ///
    /// Panics unless `key` is strictly greater than every key appended
    /// so far.
    pub fn push(&mut self, key: K, value: V) {
        assert!(
            self.high_keys.last().map_or(true, |last| *last < key),
            "keys must be pushed in strictly ascending order"
        );
        let merge = self
            .high_keys
            .last()
            .map_or(false, |last| is_adjacent(last, &key));
        if merge {
            *self.high_keys.last_mut().expect("merge into empty builder") = key;
        } else {
            self.low_keys.push(key.clone());
            self.high_keys.push(key);
            self.value_indices.push(self.value_data.len());
        }
        self.value_data.push(value);
        self.len += 1;
    }

    /// Appends the run starting at `low` covering one key per value in
    /// `values`, merging with the final run when adjacent.
    ///
    /// # Panics
    ///
    /// Panics when `values` is empty, the run's high key falls off the
    /// key space, or `low` is not strictly greater than every key
    /// appended so far.
    pub fn push_run(&mut self, low: K, values: Vec<V>) {
        assert!(!values.is_empty(), "a run must cover at least one key");
        assert!(
            self.high_keys.last().map_or(true, |last| *last < low),
            "keys must be pushed in strictly ascending order"
        );
        let high = low.advance(values.len() - 1).expect("run exceeds its key space");
        let merge = self
            .high_keys
            .last()
            .map_or(false, |last| is_adjacent(last, &low));
        if merge {
            *self.high_keys.last_mut().expect("merge into empty builder") = high;
        } else {
            self.low_keys.push(low);
            self.high_keys.push(high);
            self.value_indices.push(self.value_data.len());
        }
        self.len += values.len();
        self.value_data.extend(values);
    }

    /// Number of keys (not runs) appended so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reorders the run columns into the search layout and returns the
    /// immutable map. The value buffer is adopted as is.
    pub fn freeze(self) -> DenseMap<K, V> {
        DenseMap {
            len: self.len,
            low_keys: layout::make_order(self.low_keys),
            high_keys: layout::make_order(self.high_keys),
            value_indices: layout::make_order(self.value_indices),
            value_data: self.value_data,
        }
    }
}

impl<K: Discrete, V> Default for DenseMapBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Discrete, V> DenseMap<K, V> {
    pub fn builder() -> DenseMapBuilder<K, V> {
        DenseMapBuilder::new()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let pi = layout::search(&self.low_keys, key)?;
        if *key > self.high_keys[pi] {
            return None;
        }
        let offset = self.low_keys[pi]
            .distance(key)
            .expect("frozen run bounds out of order");
        Some(&self.value_data[self.value_indices[pi] + offset])
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Number of keys, counting every key inside each run.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of stored runs.
    pub fn runs(&self) -> usize {
        self.low_keys.len()
    }

    /// Every entry in ascending key order.
    pub fn iter(&self) -> DenseMapIter<'_, K, V> {
        DenseMapIter {
            low_keys: &self.low_keys,
            high_keys: &self.high_keys,
            value_indices: &self.value_indices,
            value_data: &self.value_data,
            runs: layout::iter_forward(self.low_keys.len()),
            cur: None,
        }
    }

    /// Adopts columns from [`DenseMap::into_raw`]: layout-ordered run
    /// columns plus the append-ordered value buffer.
    ///
    /// # Panics
    ///
    /// Panics when the run columns disagree on length.
    pub fn from_raw(
        len: usize,
        low_keys: Vec<K>,
        high_keys: Vec<K>,
        value_indices: Vec<usize>,
        value_data: Vec<V>,
    ) -> Self {
        assert_eq!(low_keys.len(), high_keys.len(), "parallel columns must match");
        assert_eq!(low_keys.len(), value_indices.len(), "parallel columns must match");
        Self {
            len,
            low_keys,
            high_keys,
            value_indices,
            value_data,
        }
    }

    /// The key count, the layout-ordered run columns, and the value
    /// buffer.
    #[allow(clippy::type_complexity)]
    pub fn into_raw(self) -> (usize, Vec<K>, Vec<K>, Vec<usize>, Vec<V>) {
        (
            self.len,
            self.low_keys,
            self.high_keys,
            self.value_indices,
            self.value_data,
        )
    }
}

impl<K: Discrete, V> FromIterator<(K, V)> for DenseMap<K, V> {
    /// Sorts the input by key and freezes it. Duplicate keys panic.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries: Vec<(K, V)> = iter.into_iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        let mut builder = DenseMapBuilder::new();
        for (key, value) in entries {
            builder.push(key, value);
        }
        builder.freeze()
    }
}

impl<'a, K: Discrete, V> IntoIterator for &'a DenseMap<K, V> {
    type Item = (K, &'a V);
    type IntoIter = DenseMapIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending entry iterator over a [`DenseMap`].
#[derive(Debug, Clone)]
pub struct DenseMapIter<'a, K, V> {
    low_keys: &'a [K],
    high_keys: &'a [K],
    value_indices: &'a [usize],
    value_data: &'a [V],
    runs: Traversal,
    /// Next key of the run in progress, its position in the value
    /// buffer, and how many entries the run still holds.
    cur: Option<(K, usize, usize)>,
}

impl<'a, K: Discrete, V> Iterator for DenseMapIter<'a, K, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, at, left) = match self.cur.take() {
            Some(run) => run,
            None => {
                let pi = self.runs.next()?;
                let low = self.low_keys[pi].clone();
                let span = low
                    .distance(&self.high_keys[pi])
                    .expect("frozen run bounds out of order")
                    + 1;
                (low, self.value_indices[pi], span)
            }
        };
        if left > 1 {
            let next = key.forward().expect("run exceeds its key space");
            self.cur = Some((next, at + 1, left - 1));
        }
        Some((key, &self.value_data[at]))
    }
}

impl<K: Discrete, V> FusedIterator for DenseMapIter<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::DenseMap;

    #[test]
    fn dense_runs_with_arbitrary_values() {
        let map: DenseMap<i32, char> = [(0, 'a'), (1, 'x'), (2, 'q'), (10, 'z')]
            .into_iter()
            .collect();
        assert_eq!(map.len(), 4);
        assert_eq!(map.runs(), 2);
        assert_eq!(map.get(&0), Some(&'a'));
        assert_eq!(map.get(&1), Some(&'x'));
        assert_eq!(map.get(&2), Some(&'q'));
        assert_eq!(map.get(&10), Some(&'z'));
        assert_eq!(map.get(&3), None);
        assert_eq!(map.get(&-1), None);
        assert_eq!(
            map.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            [0, 1, 2, 10]
        );
        assert_eq!(
            map.iter().map(|(_, v)| *v).collect::<Vec<_>>(),
            ['a', 'x', 'q', 'z']
        );
    }

    #[test]
    fn push_run_extends_adjacent_runs() {
        let mut builder = DenseMap::builder();
        builder.push_run(0u8, vec!["zero", "one"]);
        builder.push_run(2, vec!["two"]);
        builder.push_run(9, vec!["nine"]);
        let map = builder.freeze();
        assert_eq!(map.runs(), 2);
        assert_eq!(map.len(), 4);
        assert_eq!(map.get(&1), Some(&"one"));
        assert_eq!(map.get(&2), Some(&"two"));
        assert_eq!(map.get(&9), Some(&"nine"));
        assert_eq!(map.get(&5), None);
    }

    #[test]
    fn values_keep_append_order_across_freeze() {
        // Enough runs that the layout reorders the run columns; the
        // value buffer must still line up through the indirection.
        let entries: Vec<(u32, u32)> = (0..50).map(|k| (k * 3, k + 1000)).collect();
        let map: DenseMap<u32, u32> = entries.iter().copied().collect();
        assert_eq!(map.runs(), 50);
        for (k, v) in entries {
            assert_eq!(map.get(&k), Some(&v));
        }
    }

    #[test]
    fn raw_round_trip() {
        let map: DenseMap<u16, String> = [(3, "a"), (4, "b"), (9, "c")]
            .into_iter()
            .map(|(k, v)| (k, v.to_owned()))
            .collect();
        let (len, low, high, idx, data) = map.clone().into_raw();
        assert_eq!(DenseMap::from_raw(len, low, high, idx, data), map);
    }
}
