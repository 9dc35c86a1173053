//! Lazy k-way merge of already-sorted iterators.

/// Merges `k >= 0` sorted iterators into one sorted stream.
///
/// Each call to `next` hands out the least of the sources' current
/// fronts. Nothing is deduplicated: if two sources yield the same value,
/// both copies come out. Ties go to an arbitrary source. Exhausted
/// sources are dropped, so an empty source costs nothing after
/// construction.
///
/// The number of sources is expected to be small (the composite
/// containers merge two or three children); the fronts live in a plain
/// vector and selection is a linear scan.
pub struct MinIter<I: Iterator, F> {
    /// Per-source state: the front value and the iterator behind it.
    fronts: Vec<(I::Item, I)>,
    is_less: F,
}

impl<I> MinIter<I, fn(&I::Item, &I::Item) -> bool>
where
    I: Iterator,
    I::Item: Ord,
{
    /// Merge by the items' own ordering.
    pub fn new<S>(sources: S) -> Self
    where
        S: IntoIterator<Item = I>,
    {
        Self::with_order(sources, |a, b| a < b)
    }
}

impl<I, F> MinIter<I, F>
where
    I: Iterator,
    F: FnMut(&I::Item, &I::Item) -> bool,
{
    /// Merge with an explicit strict-less predicate.
    ///
    /// Used where items carry payload that is not itself ordered, e.g.
    /// map entries merged by key alone.
    pub fn with_order<S>(sources: S, is_less: F) -> Self
    where
        S: IntoIterator<Item = I>,
    {
        let fronts = sources
            .into_iter()
            .filter_map(|mut source| source.next().map(|front| (front, source)))
            .collect();
        Self { fronts, is_less }
    }
}

impl<I, F> Iterator for MinIter<I, F>
where
    I: Iterator,
    F: FnMut(&I::Item, &I::Item) -> bool,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        if self.fronts.is_empty() {
            return None;
        }
        let mut least = 0;
        for i in 1..self.fronts.len() {
            if (self.is_less)(&self.fronts[i].0, &self.fronts[least].0) {
                least = i;
            }
        }
        let (front, source) = &mut self.fronts[least];
        match source.next() {
            Some(refill) => Some(std::mem::replace(front, refill)),
            None => Some(self.fronts.swap_remove(least).0),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let mut lower = self.fronts.len();
        let mut upper = Some(lower);
        for (_, source) in &self.fronts {
            let (source_lower, source_upper) = source.size_hint();
            lower += source_lower;
            upper = upper.zip(source_upper).map(|(a, b)| a + b);
        }
        (lower, upper)
    }
}

#[cfg(test)]
mod tests {
    use super::MinIter;

    fn merged(sources: Vec<Vec<i32>>) -> Vec<i32> {
        MinIter::new(sources.into_iter().map(Vec::into_iter)).collect()
    }

    #[test]
    fn merges_sorted_sources() {
        assert_eq!(
            merged(vec![vec![1, 4, 7], vec![2, 5, 8], vec![3, 6, 9]]),
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9]
        );
        assert_eq!(merged(vec![vec![1, 2, 3], vec![]]), vec![1, 2, 3]);
        assert_eq!(merged(vec![]), Vec::<i32>::new());
        assert_eq!(merged(vec![vec![], vec![]]), Vec::<i32>::new());
    }

    #[test]
    fn keeps_duplicates() {
        assert_eq!(
            merged(vec![vec![1, 3, 5], vec![1, 2, 3]]),
            vec![1, 1, 2, 3, 3, 5]
        );
    }

    #[test]
    fn uneven_lengths() {
        assert_eq!(
            merged(vec![vec![10], vec![1, 2, 3, 4, 5], vec![0, 20]]),
            vec![0, 1, 2, 3, 4, 5, 10, 20]
        );
    }

    #[test]
    fn custom_order_merges_by_key() {
        let left = vec![(1, "a"), (4, "b")];
        let right = vec![(2, "c"), (3, "d")];
        let out: Vec<(i32, &str)> = MinIter::with_order(
            [left.into_iter(), right.into_iter()],
            |a: &(i32, &str), b: &(i32, &str)| a.0 < b.0,
        )
        .collect();
        assert_eq!(out, vec![(1, "a"), (2, "c"), (3, "d"), (4, "b")]);
    }
}
