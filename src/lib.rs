//! Immutable ordered sets and maps laid out for cache-friendly binary search.
//!
//! A classical sorted array answers a lookup with a binary search whose
//! probe sequence jumps across the whole allocation; every probe is a
//! likely cache miss. This crate instead stores the sorted data as an
//! implicit binary search tree in breadth-first order, so the first few
//! probes of every lookup touch the same handful of cache lines and the
//! comparison at each level is branch-predictable. The [`layout`] module
//! defines that order for arbitrary sizes (not just `2^k - 1`) together
//! with the bijection between *logical* (sorted) and *physical* (stored)
//! positions.
//!
//! On top of the layout sit the containers: [`SortedSet`] and
//! [`SortedMap`] store every key individually, [`RangeSet`] and
//! [`RangeMap`] coalesce runs of consecutive keys, [`DeltaMap`] coalesces
//! runs whose values count up in lockstep with the keys, [`DenseMap`]
//! coalesces consecutive keys over arbitrary values, and [`AutoSet`] /
//! [`AutoMap`] route each incoming entry to whichever strategy stores it
//! smallest.
//!
//! All containers are build-then-freeze: a builder accepts appends in
//! strictly ascending key order and `freeze` produces the immutable,
//! queryable container. There is no post-freeze mutation, which also
//! makes every frozen container safe to share across threads.

pub mod algebra;
pub mod containers;
pub mod layout;
pub mod merge;

pub use algebra::{is_adjacent, Discrete};
pub use containers::{
    AutoMap, AutoMapBuilder, AutoSet, AutoSetBuilder, DeltaMap, DeltaMapBuilder, DenseMap,
    DenseMapBuilder, RangeMap, RangeMapBuilder, RangeSet, RangeSetBuilder, RunKind, SortedMap,
    SortedMapBuilder, SortedSet, SortedSetBuilder,
};
pub use merge::MinIter;
