use crate::{
    predicate::{Contains, Intersects, Overlaps, SpanPredicate},
    span::Span,
    traversal,
    witness::IntervalTree,
};

/// Queries available on every interval tree.
///
/// All `get_*` and `fill_*` methods produce values ascending by start. Queries
/// never fail: an empty tree or a window nothing matches gives an empty result.
pub trait IntervalTreeAlgorithms: IntervalTree + Sized {
    /// Checks if any value matches `predicate` against the window
    /// `[start, start + length)`
    #[inline]
    #[must_use]
    fn any<P>(&self, start: usize, length: usize, predicate: P) -> bool
    where
        P: SpanPredicate,
    {
        traversal::any(self, Span::new(start, length), &predicate)
    }

    /// Appends every value matching `predicate` against the window
    /// `[start, start + length)` to `out`, returns the number of appended values
    #[inline]
    fn fill_matches<'a, P>(
        &'a self,
        start: usize,
        length: usize,
        predicate: P,
        out: &mut Vec<&'a Self::Value>,
    ) -> usize
    where
        P: SpanPredicate,
    {
        traversal::fill_matches(self, Span::new(start, length), &predicate, out)
    }

    /// Gets the values overlapping the window
    #[inline]
    #[must_use]
    fn get_overlapping(&self, start: usize, length: usize) -> Vec<&Self::Value> {
        let mut out = Vec::new();
        let _count = self.fill_overlapping(start, length, &mut out);
        out
    }

    /// Gets the values intersecting the window
    #[inline]
    #[must_use]
    fn get_intersecting(&self, start: usize, length: usize) -> Vec<&Self::Value> {
        let mut out = Vec::new();
        let _count = self.fill_intersecting(start, length, &mut out);
        out
    }

    /// Gets the values containing the window
    #[inline]
    #[must_use]
    fn get_containing(&self, start: usize, length: usize) -> Vec<&Self::Value> {
        let mut out = Vec::new();
        let _count = self.fill_containing(start, length, &mut out);
        out
    }

    /// Appends the values overlapping the window to `out`
    #[inline]
    fn fill_overlapping<'a>(
        &'a self,
        start: usize,
        length: usize,
        out: &mut Vec<&'a Self::Value>,
    ) -> usize {
        self.fill_matches(start, length, Overlaps, out)
    }

    /// Appends the values intersecting the window to `out`
    #[inline]
    fn fill_intersecting<'a>(
        &'a self,
        start: usize,
        length: usize,
        out: &mut Vec<&'a Self::Value>,
    ) -> usize {
        self.fill_matches(start, length, Intersects, out)
    }

    /// Appends the values containing the window to `out`
    #[inline]
    fn fill_containing<'a>(
        &'a self,
        start: usize,
        length: usize,
        out: &mut Vec<&'a Self::Value>,
    ) -> usize {
        self.fill_matches(start, length, Contains, out)
    }

    /// Checks if any value overlaps the window
    #[inline]
    #[must_use]
    fn has_overlapping(&self, start: usize, length: usize) -> bool {
        self.any(start, length, Overlaps)
    }

    /// Checks if any value intersects the window
    #[inline]
    #[must_use]
    fn has_intersecting(&self, start: usize, length: usize) -> bool {
        self.any(start, length, Intersects)
    }

    /// Checks if any value contains the window
    #[inline]
    #[must_use]
    fn has_containing(&self, start: usize, length: usize) -> bool {
        self.any(start, length, Contains)
    }

    /// Checks if any value touches `position`, ends included
    #[inline]
    #[must_use]
    fn has_intersecting_position(&self, position: usize) -> bool {
        self.has_intersecting(position, 0)
    }
}

impl<Tr> IntervalTreeAlgorithms for Tr where Tr: IntervalTree {}
