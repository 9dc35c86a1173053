//! Delta-compressed map: runs where the value climbs by one for every
//! key step collapse into a single stored entry holding the run's first
//! value.

use crate::algebra::{is_adjacent, Discrete};
use crate::layout::{self, Traversal};
use size_of::SizeOf;
use std::iter::FusedIterator;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// An immutable map whose storage holds one entry per run of consecutive
/// keys with values in lockstep (`value(k + 1) = value(k) + 1`).
#[derive(Debug, Clone, PartialEq, Eq, SizeOf)]
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
pub struct DeltaMap<K, V> {
    len: usize,
    low_keys: Vec<K>,
    high_keys: Vec<K>,
    values: Vec<V>,
}

/// Accumulates ascending entries and runs for a [`DeltaMap`].
#[derive(Debug, Clone)]
pub struct DeltaMapBuilder<K, V> {
    len: usize,
    low_keys: Vec<K>,
    high_keys: Vec<K>,
    values: Vec<V>,
}

impl<K: Discrete, V: Discrete> DeltaMapBuilder<K, V> {
    pub fn new() -> Self {
        Self {
            len: 0,
            low_keys: Vec::new(),
            high_keys: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Appends a single entry, extending the final run when the key is
    /// adjacent and the value continues its progression.
    pub fn push(&mut self, key: K, value: V) {
        let high = key.clone();
        self.push_run(key, high, value);
    }

    /// Appends the run `[low, high]` whose value at `low` is `value`
    /// (and climbs by one per key), merging with the final run when the
    /// progression continues across the boundary.
    ///
    /// # Panics
    ///
    /// Panics unless `low <= high` and `low` is strictly greater than
    /// every key appended so far.
    pub fn push_run(&mut self, low: K, high: K, value: V) {
        assert!(
            self.high_keys.last().map_or(true, |last| *last < low),
            "keys must be pushed in strictly ascending order"
        );
        assert!(low <= high, "range bounds out of order");
        let span = low.distance(&high).expect("range span overflows usize") + 1;
        let merge = match (self.low_keys.last(), self.high_keys.last(), self.values.last()) {
            (Some(last_low), Some(last_high), Some(last_value)) => {
                is_adjacent(last_high, &low)
                    && last_low
                        .distance(&low)
                        .and_then(|steps| last_value.advance(steps))
                        .map_or(false, |expected| expected == value)
            }
            _ => false,
        };
        if merge {
            *self.high_keys.last_mut().expect("merge into empty builder") = high;
        } else {
            self.low_keys.push(low);
            self.high_keys.push(high);
            self.values.push(value);
        }
        self.len += span;
    }

    /// Removes and returns the most recent run. Panics when empty.
    pub(crate) fn pop_run(&mut self) -> (K, K, V) {
        let low = self.low_keys.pop().expect("pop on an empty builder");
        let high = self.high_keys.pop().expect("pop on an empty builder");
        let value = self.values.pop().expect("pop on an empty builder");
        self.len -= low.distance(&high).expect("run bounds out of order") + 1;
        (low, high, value)
    }

    pub(crate) fn last_run(&self) -> Option<(&K, &K, &V)> {
        Some((
            self.low_keys.last()?,
            self.high_keys.last()?,
            self.values.last()?,
        ))
    }

    /// Number of keys (not runs) appended so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reorders the run columns into the search layout and returns the
    /// immutable map.
    pub fn freeze(self) -> DeltaMap<K, V> {
        DeltaMap {
            len: self.len,
            low_keys: layout::make_order(self.low_keys),
            high_keys: layout::make_order(self.high_keys),
            values: layout::make_order(self.values),
        }
    }
}

impl<K: Discrete, V: Discrete> Default for DeltaMapBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Discrete, V: Discrete> DeltaMap<K, V> {
    pub fn builder() -> DeltaMapBuilder<K, V> {
        DeltaMapBuilder::new()
    }

    /// The value at `key`, reconstructed from the run's first value.
    pub fn get(&self, key: &K) -> Option<V> {
        let pi = layout::search(&self.low_keys, key)?;
        if *key > self.high_keys[pi] {
            return None;
        }
        let steps = self.low_keys[pi]
            .distance(key)
            .expect("frozen run bounds out of order");
        Some(self.values[pi].advance(steps).expect("value exceeds its space"))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        layout::search(&self.low_keys, key).map_or(false, |pi| *key <= self.high_keys[pi])
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

    /// Every entry in ascending key order, reconstructing the values.
    pub fn iter(&self) -> DeltaMapIter<'_, K, V> {
        DeltaMapIter {
            low_keys: &self.low_keys,
            high_keys: &self.high_keys,
            values: &self.values,
            runs: layout::iter_forward(self.low_keys.len()),
            cur: None,
        }
    }

    /// Adopts run columns that are already in the search layout.
    ///
    /// # Panics
    ///
    /// Panics when the columns disagree on length.
    pub fn from_raw(len: usize, low_keys: Vec<K>, high_keys: Vec<K>, values: Vec<V>) -> Self {
        assert_eq!(low_keys.len(), high_keys.len(), "parallel columns must match");
        assert_eq!(low_keys.len(), values.len(), "parallel columns must match");
        Self {
            len,
            low_keys,
            high_keys,
            values,
        }
    }

    /// The key count and the layout-ordered `(low, high, first value)`
    /// columns.
    pub fn into_raw(self) -> (usize, Vec<K>, Vec<K>, Vec<V>) {
        (self.len, self.low_keys, self.high_keys, self.values)
    }
}

impl<K: Discrete, V: Discrete> FromIterator<(K, V)> for DeltaMap<K, V> {
    /// Sorts the input by key and freezes it. Duplicate keys panic.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries: Vec<(K, V)> = iter.into_iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        let mut builder = DeltaMapBuilder::new();
        for (key, value) in entries {
            builder.push(key, value);
        }
        builder.freeze()
    }
}

impl<'a, K: Discrete, V: Discrete> IntoIterator for &'a DeltaMap<K, V> {
    type Item = (K, V);
    type IntoIter = DeltaMapIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending entry iterator over a [`DeltaMap`], reconstructing values.
#[derive(Debug, Clone)]
pub struct DeltaMapIter<'a, K, V> {
    low_keys: &'a [K],
    high_keys: &'a [K],
    values: &'a [V],
    runs: Traversal,
    /// Next key and value of the run in progress and how many entries it
    /// still holds.
    cur: Option<(K, V, usize)>,
}

impl<K: Discrete, V: Discrete> Iterator for DeltaMapIter<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        let (key, value, left) = match self.cur.take() {
            Some(run) => run,
            None => {
                let pi = self.runs.next()?;
                let low = self.low_keys[pi].clone();
                let span = low
                    .distance(&self.high_keys[pi])
                    .expect("frozen run bounds out of order")
                    + 1;
                (low, self.values[pi].clone(), span)
            }
        };
        if left > 1 {
            let next_key = key.forward().expect("run exceeds its key space");
            let next_value = value.forward().expect("value exceeds its space");
            self.cur = Some((next_key, next_value, left - 1));
        }
        Some((key, value))
    }
}

impl<K: Discrete, V: Discrete> FusedIterator for DeltaMapIter<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::DeltaMap;

    #[test]
    fn coalesces_lockstep_runs() {
        let map: DeltaMap<u32, u32> = [(10, 100), (11, 101), (12, 102), (20, 50)]
            .into_iter()
            .collect();
        assert_eq!(map.len(), 4);
        assert_eq!(map.runs(), 2);
        assert_eq!(map.get(&10), Some(100));
        assert_eq!(map.get(&11), Some(101));
        assert_eq!(map.get(&12), Some(102));
        assert_eq!(map.get(&20), Some(50));
        assert_eq!(map.get(&15), None);
        assert_eq!(map.get(&13), None);
        assert!(map.contains_key(&12));
        assert!(!map.contains_key(&19));
    }

    #[test]
    fn equal_values_do_not_coalesce() {
        // Adjacent keys with a flat value are two separate runs here;
        // flat runs belong to the range map.
        let map: DeltaMap<u8, u8> = [(1, 5), (2, 5)].into_iter().collect();
        assert_eq!(map.runs(), 2);
        assert_eq!(map.get(&1), Some(5));
        assert_eq!(map.get(&2), Some(5));
    }

    #[test]
    fn whole_runs_merge_across_the_boundary() {
        let mut builder = DeltaMap::builder();
        builder.push_run(0u32, 4, 10u32);
        // Value at key 5 continues the progression: 10 + 5.
        builder.push_run(5, 9, 15);
        // Break in the progression starts a fresh run.
        builder.push_run(10, 10, 0);
        let map = builder.freeze();
        assert_eq!(map.runs(), 2);
        assert_eq!(map.len(), 11);
        assert_eq!(map.get(&7), Some(17));
        assert_eq!(map.get(&10), Some(0));
    }

    #[test]
    fn iteration_reconstructs_values() {
        let entries = [(10u64, 100u64), (11, 101), (12, 102), (20, 50)];
        let map: DeltaMap<u64, u64> = entries.into_iter().collect();
        assert_eq!(map.iter().collect::<Vec<_>>(), entries);
    }

    #[test]
    fn raw_round_trip() {
        let map: DeltaMap<i32, i32> = [(0, 7), (1, 8), (2, 9), (9, 1)].into_iter().collect();
        let (len, low, high, values) = map.clone().into_raw();
        assert_eq!(DeltaMap::from_raw(len, low, high, values), map);
    }
}
