//! Multi-strategy containers: each incoming entry is routed to
//! whichever child storage keeps the whole collection smallest.

use crate::algebra::{is_adjacent, Discrete};
use crate::containers::delta::{DeltaMap, DeltaMapBuilder};
use crate::containers::range::{RangeMap, RangeMapBuilder, RangeSet, RangeSetBuilder};
use crate::containers::sorted::{SortedMap, SortedMapBuilder, SortedSet, SortedSetBuilder};
use crate::merge::MinIter;
use itertools::Either;
use size_of::SizeOf;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// Which compressed child an explicit run append targets: a flat run of
/// one repeated value, or a run whose value climbs with the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Range,
    Delta,
}

/// An immutable set that keeps isolated keys in a [`SortedSet`] and runs
/// of consecutive keys in a [`RangeSet`].
#[derive(Debug, Clone, PartialEq, Eq, SizeOf)]
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
pub struct AutoSet<K> {
    simple: SortedSet<K>,
    ranges: RangeSet<K>,
}

/// Accumulates ascending keys for an [`AutoSet`], routing each append.
#[derive(Debug, Clone)]
pub struct AutoSetBuilder<K> {
    simple: SortedSetBuilder<K>,
    ranges: RangeSetBuilder<K>,
}

impl<K: Discrete> AutoSetBuilder<K> {
    pub fn new() -> Self {
        Self {
            simple: SortedSetBuilder::new(),
            ranges: RangeSetBuilder::new(),
        }
    }

    /// Appends a single key.
    pub fn push(&mut self, key: K) {
        let high = key.clone();
        self.push_range(key, high);
    }

    /// Appends the run `[low, high]`.
    ///
    /// A scalar run that neighbors nothing lands in the simple child;
    /// anything longer, or anything adjacent to existing keys, goes to
    /// the range child, pulling the simple child's last key along when
    /// that key becomes the start of a run.
    ///
    /// # Panics
    ///
    /// Panics unless `low <= high` and `low` is strictly greater than
    /// every key appended so far.
    pub fn push_range(&mut self, low: K, high: K) {
        assert!(
            self.simple.last().map_or(true, |last| *last < low),
            "keys must be pushed in strictly ascending order"
        );
        assert!(
            self.ranges.last_high().map_or(true, |last| *last < low),
            "keys must be pushed in strictly ascending order"
        );
        assert!(low <= high, "range bounds out of order");

        if self.simple.last().map_or(false, |last| is_adjacent(last, &low)) {
            let seed = self.simple.pop();
            self.ranges.push_range(seed, high);
            return;
        }
        let extends = self
            .ranges
            .last_high()
            .map_or(false, |last| is_adjacent(last, &low));
        if low != high || extends {
            self.ranges.push_range(low, high);
            return;
        }
        self.simple.push(low);
    }

    pub fn len(&self) -> usize {
        self.simple.len() + self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freezes both children.
    pub fn freeze(self) -> AutoSet<K> {
        AutoSet {
            simple: self.simple.freeze(),
            ranges: self.ranges.freeze(),
        }
    }
}

impl<K: Discrete> Default for AutoSetBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Discrete> AutoSet<K> {
    pub fn builder() -> AutoSetBuilder<K> {
        AutoSetBuilder::new()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.simple.contains(key) || self.ranges.contains(key)
    }

    pub fn len(&self) -> usize {
        self.simple.len() + self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every key in ascending order, merged across both children.
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        MinIter::new([
            Either::Left(self.simple.iter().cloned()),
            Either::Right(self.ranges.iter()),
        ])
    }

    /// The singleton child.
    pub fn simple(&self) -> &SortedSet<K> {
        &self.simple
    }

    /// The run child.
    pub fn ranges(&self) -> &RangeSet<K> {
        &self.ranges
    }

    /// Reassembles a set from frozen children, e.g. from
    /// [`AutoSet::into_parts`].
    pub fn from_parts(simple: SortedSet<K>, ranges: RangeSet<K>) -> Self {
        Self { simple, ranges }
    }

    pub fn into_parts(self) -> (SortedSet<K>, RangeSet<K>) {
        (self.simple, self.ranges)
    }
}

impl<K: Discrete> FromIterator<K> for AutoSet<K> {
    /// Sorts the input and freezes it. Duplicate keys panic.
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut keys: Vec<K> = iter.into_iter().collect();
        keys.sort_unstable();
        let mut builder = AutoSetBuilder::new();
        for key in keys {
            builder.push(key);
        }
        builder.freeze()
    }
}

/// An immutable map that distributes entries over three children:
/// isolated entries in a [`SortedMap`], flat-valued runs in a
/// [`RangeMap`], and lockstep-valued runs in a [`DeltaMap`].
#[derive(Debug, Clone, PartialEq, Eq, SizeOf)]
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
pub struct AutoMap<K, V> {
    simple: SortedMap<K, V>,
    ranges: RangeMap<K, V>,
    deltas: DeltaMap<K, V>,
}

/// Accumulates ascending entries for an [`AutoMap`], routing each
/// append to the child that can keep absorbing the longest run.
#[derive(Debug, Clone)]
pub struct AutoMapBuilder<K, V> {
    simple: SortedMapBuilder<K, V>,
    ranges: RangeMapBuilder<K, V>,
    deltas: DeltaMapBuilder<K, V>,
}

impl<K: Discrete, V: Discrete> AutoMapBuilder<K, V> {
    pub fn new() -> Self {
        Self {
            simple: SortedMapBuilder::new(),
            ranges: RangeMapBuilder::new(),
            deltas: DeltaMapBuilder::new(),
        }
    }

    /// Appends a single entry.
    pub fn push(&mut self, key: K, value: V) {
        let high = key.clone();
        self.append(key, high, value, None);
    }

    /// Appends the run `[low, high]` of the given kind. For
    /// [`RunKind::Range`] every key maps to `value`; for
    /// [`RunKind::Delta`] the value at `low` is `value` and climbs by
    /// one per key.
    pub fn push_run(&mut self, low: K, high: K, value: V, kind: RunKind) {
        self.append(low, high, value, Some(kind));
    }

    fn append(&mut self, low: K, high: K, value: V, kind: Option<RunKind>) {
        assert!(
            self.simple.last().map_or(true, |(last, _)| *last < low),
            "keys must be pushed in strictly ascending order"
        );
        assert!(
            self.ranges.last_run().map_or(true, |(_, last, _)| *last < low),
            "keys must be pushed in strictly ascending order"
        );
        assert!(
            self.deltas.last_run().map_or(true, |(_, last, _)| *last < low),
            "keys must be pushed in strictly ascending order"
        );
        assert!(low <= high, "range bounds out of order");
        let scalar = low == high;

        // An adjacent singleton in the simple child becomes the first
        // entry of a fresh run.
        let (seed_range, seed_delta) = match self.simple.last() {
            Some((last_key, last_value)) if is_adjacent(last_key, &low) => (
                (scalar || kind == Some(RunKind::Range)) && *last_value == value,
                (scalar || kind == Some(RunKind::Delta)) && is_adjacent(last_value, &value),
            ),
            _ => (false, false),
        };
        if seed_range {
            let (seed_key, _) = self.simple.pop();
            self.ranges.push_run(seed_key, high, value);
            return;
        }
        if seed_delta {
            let (seed_key, seed_value) = self.simple.pop();
            self.deltas.push_run(seed_key, high, seed_value);
            return;
        }

        // When a length-2 run of one kind could continue as the other
        // kind, reshape (2, 1) into (1, 2): hand the run's first entry
        // back to the simple child so the surviving run is the one that
        // can keep absorbing appends.
        if scalar {
            let reshape = match self.ranges.last_run() {
                Some((run_low, run_high, run_value)) => {
                    is_adjacent(run_low, run_high)
                        && is_adjacent(run_high, &low)
                        && is_adjacent(run_value, &value)
                }
                None => false,
            };
            if reshape {
                let (run_low, run_high, run_value) = self.ranges.pop_run();
                self.simple.push(run_low, run_value.clone());
                self.deltas.push_run(run_high, low, run_value);
                return;
            }
            // The delta side checks value adjacency rather than
            // equality: the run's stored value is its first, one step
            // behind the value at its high key.
            let reshape = match self.deltas.last_run() {
                Some((run_low, run_high, run_value)) => {
                    is_adjacent(run_low, run_high)
                        && is_adjacent(run_high, &low)
                        && is_adjacent(run_value, &value)
                }
                None => false,
            };
            if reshape {
                let (run_low, run_high, run_value) = self.deltas.pop_run();
                self.simple.push(run_low, run_value);
                self.ranges.push_run(run_high, low, value);
                return;
            }
        }

        if scalar || kind == Some(RunKind::Range) {
            let extends = scalar
                && self.ranges.last_run().map_or(false, |(_, run_high, run_value)| {
                    is_adjacent(run_high, &low) && *run_value == value
                });
            if !scalar || extends {
                self.ranges.push_run(low, high, value);
                return;
            }
        }
        if scalar || kind == Some(RunKind::Delta) {
            let extends = scalar
                && match self.deltas.last_run() {
                    Some((run_low, run_high, run_value)) => {
                        is_adjacent(run_high, &low)
                            && run_low
                                .distance(&low)
                                .and_then(|steps| run_value.advance(steps))
                                .map_or(false, |expected| expected == value)
                    }
                    None => false,
                };
            if !scalar || extends {
                self.deltas.push_run(low, high, value);
                return;
            }
        }
        debug_assert!(scalar);
        self.simple.push(low, value);
    }

    pub fn len(&self) -> usize {
        self.simple.len() + self.ranges.len() + self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freezes all three children.
    pub fn freeze(self) -> AutoMap<K, V> {
        AutoMap {
            simple: self.simple.freeze(),
            ranges: self.ranges.freeze(),
            deltas: self.deltas.freeze(),
        }
    }
}

impl<K: Discrete, V: Discrete> Default for AutoMapBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Discrete, V: Discrete> AutoMap<K, V> {
    pub fn builder() -> AutoMapBuilder<K, V> {
        AutoMapBuilder::new()
    }

    /// The value at `key`. A key lives in at most one child, so the
    /// children are probed in fixed order and the first hit wins.
    pub fn get(&self, key: &K) -> Option<V> {
        if let Some(value) = self.simple.get(key) {
            return Some(value.clone());
        }
        if let Some(value) = self.ranges.get(key) {
            return Some(value.clone());
        }
        self.deltas.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.simple.contains_key(key)
            || self.ranges.contains_key(key)
            || self.deltas.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.simple.len() + self.ranges.len() + self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every entry in ascending key order, merged across the children.
    pub fn iter(&self) -> impl Iterator<Item = (K, V)> + '_ {
        MinIter::with_order(
            [
                Either::Left(Either::Left(
                    self.simple.iter().map(|(k, v)| (k.clone(), v.clone())),
                )),
                Either::Left(Either::Right(
                    self.ranges.iter().map(|(k, v)| (k, v.clone())),
                )),
                Either::Right(self.deltas.iter()),
            ],
            |a: &(K, V), b: &(K, V)| a.0 < b.0,
        )
    }

    /// The singleton child.
    pub fn simple(&self) -> &SortedMap<K, V> {
        &self.simple
    }

    /// The flat-run child.
    pub fn ranges(&self) -> &RangeMap<K, V> {
        &self.ranges
    }

    /// The lockstep-run child.
    pub fn deltas(&self) -> &DeltaMap<K, V> {
        &self.deltas
    }

    /// Reassembles a map from frozen children, e.g. from
    /// [`AutoMap::into_parts`].
    pub fn from_parts(
        simple: SortedMap<K, V>,
        ranges: RangeMap<K, V>,
        deltas: DeltaMap<K, V>,
    ) -> Self {
        Self {
            simple,
            ranges,
            deltas,
        }
    }

    pub fn into_parts(self) -> (SortedMap<K, V>, RangeMap<K, V>, DeltaMap<K, V>) {
        (self.simple, self.ranges, self.deltas)
    }
}

impl<K: Discrete, V: Discrete> FromIterator<(K, V)> for AutoMap<K, V> {
    /// Sorts the input by key and freezes it. Duplicate keys panic.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries: Vec<(K, V)> = iter.into_iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        let mut builder = AutoMapBuilder::new();
        for (key, value) in entries {
            builder.push(key, value);
        }
        builder.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::{AutoMap, AutoSet, RunKind};

    #[test]
    fn set_routes_runs_and_outliers() {
        let set: AutoSet<i32> = [1, 2, 3, 5, 7, 8, 9].into_iter().collect();
        assert_eq!(set.len(), 7);
        // 5 stays an outlier; 7 is pulled into a run once 8 arrives.
        assert_eq!(set.simple().iter().copied().collect::<Vec<_>>(), [5]);
        assert_eq!(set.ranges().runs(), 2);
        assert_eq!(
            set.ranges().iter().collect::<Vec<_>>(),
            [1, 2, 3, 7, 8, 9]
        );
        assert!(set.contains(&5));
        assert!(!set.contains(&4));
        assert!(!set.contains(&6));
        assert_eq!(set.iter().collect::<Vec<_>>(), [1, 2, 3, 5, 7, 8, 9]);
    }

    #[test]
    fn every_set_key_lives_in_exactly_one_child() {
        let keys = [0i64, 1, 2, 10, 12, 13, 20, 30, 31, 32, 33, 40];
        let set: AutoSet<i64> = keys.into_iter().collect();
        assert_eq!(set.len(), keys.len());
        for key in keys {
            assert_ne!(set.simple().contains(&key), set.ranges().contains(&key));
        }
    }

    #[test]
    fn set_run_appends() {
        let mut builder = AutoSet::builder();
        builder.push_range(0u32, 4);
        builder.push(6);
        builder.push_range(7, 9);
        let set = builder.freeze();
        // 6 was an outlier until [7, 9] arrived adjacent to it.
        assert!(set.simple().is_empty());
        assert_eq!(set.ranges().runs(), 2);
        assert_eq!(set.len(), 9);
    }

    #[test]
    fn map_routes_by_value_shape() {
        let map: AutoMap<i32, i32> =
            [(1, 10), (2, 10), (3, 10), (5, 99), (6, 100), (7, 101)]
                .into_iter()
                .collect();
        assert_eq!(map.len(), 6);
        assert!(map.simple().is_empty());
        assert_eq!(map.ranges().runs(), 1);
        assert_eq!(map.deltas().runs(), 1);
        assert_eq!(map.get(&2), Some(10));
        assert_eq!(map.get(&6), Some(100));
        assert_eq!(map.get(&7), Some(101));
        assert_eq!(map.get(&4), None);
        assert_eq!(
            map.iter().collect::<Vec<_>>(),
            [(1, 10), (2, 10), (3, 10), (5, 99), (6, 100), (7, 101)]
        );
    }

    #[test]
    fn every_map_key_lives_in_exactly_one_child() {
        let entries = [
            (0u32, 5u32),
            (1, 5),
            (2, 5),
            (4, 9),
            (8, 20),
            (9, 21),
            (10, 22),
            (14, 3),
        ];
        let map: AutoMap<u32, u32> = entries.into_iter().collect();
        for (key, value) in entries {
            let hits = usize::from(map.simple().contains_key(&key))
                + usize::from(map.ranges().contains_key(&key))
                + usize::from(map.deltas().contains_key(&key));
            assert_eq!(hits, 1, "key {key}");
            assert_eq!(map.get(&key), Some(value));
        }
        assert_eq!(map.get(&3), None);
        assert_eq!(map.get(&11), None);
    }

    #[test]
    fn flat_pair_reshapes_into_delta() {
        // [4, 5] -> 7 is a flat pair; 6 -> 8 turns its tail into a
        // climbing run and returns 4 to the simple child.
        let map: AutoMap<u8, u8> = [(4, 7), (5, 7), (6, 8)].into_iter().collect();
        assert_eq!(map.simple().len(), 1);
        assert_eq!(map.simple().get(&4), Some(&7));
        assert!(map.ranges().is_empty());
        assert_eq!(map.deltas().runs(), 1);
        assert_eq!(map.get(&5), Some(7));
        assert_eq!(map.get(&6), Some(8));
    }

    #[test]
    fn climbing_pair_reshapes_into_range() {
        // [4, 5] climbing 7, 8; then 6 -> 8 flattens the tail.
        let map: AutoMap<u8, u8> = [(4, 7), (5, 8), (6, 8)].into_iter().collect();
        assert_eq!(map.simple().len(), 1);
        assert_eq!(map.simple().get(&4), Some(&7));
        assert!(map.deltas().is_empty());
        assert_eq!(map.ranges().runs(), 1);
        assert_eq!(map.get(&5), Some(8));
        assert_eq!(map.get(&6), Some(8));
    }

    #[test]
    fn map_run_appends() {
        let mut builder = AutoMap::builder();
        builder.push_run(0u32, 3, 1u32, RunKind::Range);
        builder.push_run(10, 13, 100, RunKind::Delta);
        builder.push(20, 7);
        let map = builder.freeze();
        assert_eq!(map.len(), 9);
        assert_eq!(map.get(&2), Some(1));
        assert_eq!(map.get(&12), Some(102));
        assert_eq!(map.get(&20), Some(7));
        assert_eq!(map.get(&14), None);
    }

    #[test]
    fn parts_round_trip() {
        let set: AutoSet<i32> = [1, 2, 3, 9].into_iter().collect();
        let (simple, ranges) = set.clone().into_parts();
        assert_eq!(AutoSet::from_parts(simple, ranges), set);

        let map: AutoMap<i32, i32> = [(1, 1), (2, 2), (3, 3), (9, 9)].into_iter().collect();
        let (simple, ranges, deltas) = map.clone().into_parts();
        assert_eq!(AutoMap::from_parts(simple, ranges, deltas), map);
    }

    #[cfg(feature = "with-serde")]
    #[test]
    fn serde_round_trip() {
        let map: AutoMap<u16, u16> = [(1, 4), (2, 4), (3, 4), (8, 1), (9, 2)]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&map).unwrap();
        let restored: AutoMap<u16, u16> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, restored);
        assert_eq!(restored.get(&2), Some(4));
        assert_eq!(restored.get(&9), Some(2));
    }
}
