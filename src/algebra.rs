//! Arithmetic on keys that sit on a discrete number line.
//!
//! The range-compressed containers need just enough structure on their
//! keys (and, for delta compression, their values) to ask three
//! questions: what is the point after `k`, how many steps lie between two
//! points, and where do I land `n` steps after `k`. [`Discrete`] captures
//! exactly that, and a blanket impl covers every primitive integer.

use num::{NumCast, PrimInt};

/// A totally ordered type whose values form a discrete line.
///
/// The laws mirror ordinary integer stepping: `forward` is the immediate
/// successor (`k.forward() > Some(k)` whenever it exists), `distance`
/// counts forward steps, and `advance` replays them. All three report
/// `None` instead of wrapping when a result falls off the representable
/// line; callers treat that as "not adjacent" or "out of key space"
/// rather than as an error.
pub trait Discrete: Ord + Clone {
    /// The next point on the line, or `None` at the upper end.
    fn forward(&self) -> Option<Self>;

    /// The number of forward steps from `self` to `other`.
    ///
    /// `None` when `other` precedes `self`, or when the step count does
    /// not fit in a `usize`.
    fn distance(&self, other: &Self) -> Option<usize>;

    /// The point `steps` forward from `self`, or `None` past the end.
    fn advance(&self, steps: usize) -> Option<Self>;
}

impl<T> Discrete for T
where
    T: PrimInt,
{
    fn forward(&self) -> Option<Self> {
        self.checked_add(&T::one())
    }

    fn distance(&self, other: &Self) -> Option<usize> {
        if other < self {
            return None;
        }
        // A span that overflows the signed key type (e.g. `i8::MIN` to
        // `i8::MAX`) also exceeds what the compressed containers can
        // enumerate, so collapsing it to `None` is fine.
        other.checked_sub(self).and_then(|span| span.to_usize())
    }

    fn advance(&self, steps: usize) -> Option<Self> {
        let steps = <T as NumCast>::from(steps)?;
        self.checked_add(&steps)
    }
}

/// Does `right` immediately follow `left`?
///
/// Saturation at the top of the key space counts as "no": `u8::MAX` has
/// no successor, so nothing is adjacent to it from below.
#[inline]
pub fn is_adjacent<T: Discrete>(left: &T, right: &T) -> bool {
    left.forward().as_ref() == Some(right)
}

#[cfg(test)]
mod tests {
    use super::{is_adjacent, Discrete};

    #[test]
    fn integer_stepping() {
        assert_eq!(41u32.forward(), Some(42));
        assert_eq!(u8::MAX.forward(), None);
        assert_eq!((-1i64).forward(), Some(0));

        assert_eq!(3u16.distance(&10), Some(7));
        assert_eq!(10u16.distance(&3), None);
        assert_eq!((-5i32).distance(&5), Some(10));

        assert_eq!(7i8.advance(3), Some(10));
        assert_eq!(120i8.advance(10), None);
    }

    #[test]
    fn adjacency() {
        assert!(is_adjacent(&4u64, &5));
        assert!(!is_adjacent(&4u64, &6));
        assert!(!is_adjacent(&5u64, &4));
        assert!(!is_adjacent(&u8::MAX, &0));
        assert!(is_adjacent(&-1i16, &0));
    }
}
