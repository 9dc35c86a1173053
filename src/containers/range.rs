//! Range-compressed containers: consecutive keys collapse into
//! `[low, high]` runs, one stored entry per run.

use crate::algebra::{is_adjacent, Discrete};
use crate::layout::{self, Traversal};
use size_of::SizeOf;
use std::iter::FusedIterator;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// An immutable set whose storage holds one entry per run of consecutive
/// keys.
#[derive(Debug, Clone, PartialEq, Eq, SizeOf)]
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
pub struct RangeSet<K> {
    len: usize,
    low_keys: Vec<K>,
    high_keys: Vec<K>,
}

/// Accumulates ascending keys and runs for a [`RangeSet`].
#[derive(Debug, Clone)]
pub struct RangeSetBuilder<K> {
    len: usize,
    low_keys: Vec<K>,
    high_keys: Vec<K>,
}

impl<K: Discrete> RangeSetBuilder<K> {
    pub fn new() -> Self {
        Self {
            len: 0,
            low_keys: Vec::new(),
            high_keys: Vec::new(),
        }
    }

    /// Appends a single key, merging it into the final run when
    /// adjacent.
    pub fn push(&mut self, key: K) {
        let high = key.clone();
        self.push_range(key, high);
    }

    /// Appends the whole run `[low, high]`, merging with the final run
    /// when `low` is adjacent to its high key.
    ///
    /// # Panics
    ///
    /// Panics unless `low <= high` and `low` is strictly greater than
    /// every key appended so far.
    pub fn push_range(&mut self, low: K, high: K) {
        assert!(
            self.high_keys.last().map_or(true, |last| *last < low),
            "keys must be pushed in strictly ascending order"
        );
        assert!(low <= high, "range bounds out of order");
        let span = low.distance(&high).expect("range span overflows usize") + 1;
        let merge = self
            .high_keys
            .last()
            .map_or(false, |last| is_adjacent(last, &low));
        if merge {
            *self.high_keys.last_mut().expect("merge into empty builder") = high;
        } else {
            self.low_keys.push(low);
            self.high_keys.push(high);
        }
        self.len += span;
    }

    pub(crate) fn last_high(&self) -> Option<&K> {
        self.high_keys.last()
    }

    /// Number of keys (not runs) appended so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reorders the run columns into the search layout and returns the
    /// immutable set.
    pub fn freeze(self) -> RangeSet<K> {
        RangeSet {
            len: self.len,
            low_keys: layout::make_order(self.low_keys),
            high_keys: layout::make_order(self.high_keys),
        }
    }
}

impl<K: Discrete> Default for RangeSetBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Discrete> RangeSet<K> {
    pub fn builder() -> RangeSetBuilder<K> {
        RangeSetBuilder::new()
    }

    pub fn contains(&self, key: &K) -> bool {
        // A floor hit guarantees low <= key; the run holds it iff key
        // is also within the high bound.
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

    /// Every key in ascending order, expanding runs.
    pub fn iter(&self) -> RangeSetIter<'_, K> {
        RangeSetIter {
            low_keys: &self.low_keys,
            high_keys: &self.high_keys,
            runs: layout::iter_forward(self.low_keys.len()),
            cur: None,
        }
    }

    /// Adopts run columns that are already in the search layout. `len`
    /// is the total key count the runs expand to.
    ///
    /// # Panics
    ///
    /// Panics when the columns disagree on length.
    pub fn from_raw(len: usize, low_keys: Vec<K>, high_keys: Vec<K>) -> Self {
        assert_eq!(low_keys.len(), high_keys.len(), "parallel columns must match");
        Self {
            len,
            low_keys,
            high_keys,
        }
    }

    /// The key count and the layout-ordered `(low, high)` columns.
    pub fn into_raw(self) -> (usize, Vec<K>, Vec<K>) {
        (self.len, self.low_keys, self.high_keys)
    }
}

impl<K: Discrete> FromIterator<K> for RangeSet<K> {
    /// Sorts the input and freezes it. Duplicate keys panic.
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut keys: Vec<K> = iter.into_iter().collect();
        keys.sort_unstable();
        let mut builder = RangeSetBuilder::new();
        for key in keys {
            builder.push(key);
        }
        builder.freeze()
    }
}

impl<'a, K: Discrete> IntoIterator for &'a RangeSet<K> {
    type Item = K;
    type IntoIter = RangeSetIter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending key iterator over a [`RangeSet`], expanding runs.
#[derive(Debug, Clone)]
pub struct RangeSetIter<'a, K> {
    low_keys: &'a [K],
    high_keys: &'a [K],
    runs: Traversal,
    /// Next key of the run in progress and how many keys it still holds.
    cur: Option<(K, usize)>,
}

impl<K: Discrete> Iterator for RangeSetIter<'_, K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        let (key, left) = match self.cur.take() {
            Some(run) => run,
            None => {
                let pi = self.runs.next()?;
                let low = self.low_keys[pi].clone();
                let span = low
                    .distance(&self.high_keys[pi])
                    .expect("frozen run bounds out of order")
                    + 1;
                (low, span)
            }
        };
        if left > 1 {
            let next = key.forward().expect("run exceeds its key space");
            self.cur = Some((next, left - 1));
        }
        Some(key)
    }
}

impl<K: Discrete> FusedIterator for RangeSetIter<'_, K> {}

/// An immutable map whose storage holds one entry per run of consecutive
/// keys sharing one value.
#[derive(Debug, Clone, PartialEq, Eq, SizeOf)]
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
pub struct RangeMap<K, V> {
    len: usize,
    low_keys: Vec<K>,
    high_keys: Vec<K>,
    values: Vec<V>,
}

/// Accumulates ascending entries and runs for a [`RangeMap`].
#[derive(Debug, Clone)]
pub struct RangeMapBuilder<K, V> {
    len: usize,
    low_keys: Vec<K>,
    high_keys: Vec<K>,
    values: Vec<V>,
}

impl<K: Discrete, V: Eq> RangeMapBuilder<K, V> {
    pub fn new() -> Self {
        Self {
            len: 0,
            low_keys: Vec::new(),
            high_keys: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Appends a single entry, merging it into the final run when the
    /// key is adjacent and the value matches.
    pub fn push(&mut self, key: K, value: V) {
        let high = key.clone();
        self.push_run(key, high, value);
    }

    /// Appends the run `[low, high] -> value`, merging with the final
    /// run when adjacent and equal-valued.
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
        let merge = match (self.high_keys.last(), self.values.last()) {
            (Some(last_high), Some(last_value)) => {
                is_adjacent(last_high, &low) && *last_value == value
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
    pub fn freeze(self) -> RangeMap<K, V> {
        RangeMap {
            len: self.len,
            low_keys: layout::make_order(self.low_keys),
            high_keys: layout::make_order(self.high_keys),
            values: layout::make_order(self.values),
        }
    }
}

impl<K: Discrete, V: Eq> Default for RangeMapBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Discrete, V: Eq> RangeMap<K, V> {
    pub fn builder() -> RangeMapBuilder<K, V> {
        RangeMapBuilder::new()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let pi = layout::search(&self.low_keys, key)?;
        (*key <= self.high_keys[pi]).then(|| &self.values[pi])
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

    /// Every entry in ascending key order, expanding runs. The value
    /// reference repeats for each key of a run.
    pub fn iter(&self) -> RangeMapIter<'_, K, V> {
        RangeMapIter {
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

    /// The key count and the layout-ordered `(low, high, value)`
    /// columns.
    pub fn into_raw(self) -> (usize, Vec<K>, Vec<K>, Vec<V>) {
        (self.len, self.low_keys, self.high_keys, self.values)
    }
}

impl<K: Discrete, V: Eq> FromIterator<(K, V)> for RangeMap<K, V> {
    /// Sorts the input by key and freezes it. Duplicate keys panic.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries: Vec<(K, V)> = iter.into_iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        let mut builder = RangeMapBuilder::new();
        for (key, value) in entries {
            builder.push(key, value);
        }
        builder.freeze()
    }
}

impl<'a, K: Discrete, V: Eq> IntoIterator for &'a RangeMap<K, V> {
    type Item = (K, &'a V);
    type IntoIter = RangeMapIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending entry iterator over a [`RangeMap`], expanding runs.
#[derive(Debug, Clone)]
pub struct RangeMapIter<'a, K, V> {
    low_keys: &'a [K],
    high_keys: &'a [K],
    values: &'a [V],
    runs: Traversal,
    /// Next key of the run in progress, its value slot, and how many
    /// keys the run still holds.
    cur: Option<(K, usize, usize)>,
}

impl<'a, K: Discrete, V> Iterator for RangeMapIter<'a, K, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, slot, left) = match self.cur.take() {
            Some(run) => run,
            None => {
                let pi = self.runs.next()?;
                let low = self.low_keys[pi].clone();
                let span = low
                    .distance(&self.high_keys[pi])
                    .expect("frozen run bounds out of order")
                    + 1;
                (low, pi, span)
            }
        };
        if left > 1 {
            let next = key.forward().expect("run exceeds its key space");
            self.cur = Some((next, slot, left - 1));
        }
        Some((key, &self.values[slot]))
    }
}

impl<K: Discrete, V> FusedIterator for RangeMapIter<'_, K, V> {}
