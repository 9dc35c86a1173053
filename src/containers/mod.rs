//! The container family.
//!
//! One file per storage strategy. Every container comes in two types: a
//! builder that accepts appends in strictly ascending key order, and the
//! frozen, immutable container the builder's `freeze` produces. Freezing
//! reorders each parallel column of the builder into the search layout;
//! after that only reads exist, so a frozen container is freely shareable.
//!
//! The `from_raw`/`into_raw` (and `from_parts`/`into_parts` on the
//! composites) pairs move the frozen storage in and out without
//! re-sorting; they trust the caller to hand back columns that came from
//! a frozen container, as does the optional serde support.

pub mod auto;
pub mod delta;
pub mod dense;
pub mod range;
pub mod sorted;

pub use auto::{AutoMap, AutoMapBuilder, AutoSet, AutoSetBuilder, RunKind};
pub use delta::{DeltaMap, DeltaMapBuilder};
pub use dense::{DenseMap, DenseMapBuilder};
pub use range::{RangeMap, RangeMapBuilder, RangeSet, RangeSetBuilder};
pub use sorted::{SortedMap, SortedMapBuilder, SortedSet, SortedSetBuilder};
