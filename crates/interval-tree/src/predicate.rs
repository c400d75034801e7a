use crate::span::Span;

/// A test applied to a candidate span against a query window.
///
/// Any predicate handed to a tree query must only accept candidates that
/// also satisfy [`Intersects`]; subtrees that cannot intersect the query
/// window are pruned before the predicate ever sees them.
pub trait SpanPredicate {
    /// Returns `true` if `candidate` matches `query`
    fn test(&self, candidate: Span, query: Span) -> bool;
}

/// Matches candidates that contain the query window.
///
/// A zero-length query positioned exactly at the end of a candidate is not
/// contained by it.
#[derive(Clone, Copy, Debug, Default)]
#[allow(clippy::exhaustive_structs)] // unit marker
pub struct Contains;

impl SpanPredicate for Contains {
    #[inline]
    fn test(&self, candidate: Span, query: Span) -> bool {
        if query.is_empty() {
            candidate.start <= query.start && query.end() < candidate.end()
        } else {
            candidate.start <= query.start && query.end() <= candidate.end()
        }
    }
}

/// Matches candidates that intersect the query window, endpoints included.
#[derive(Clone, Copy, Debug, Default)]
#[allow(clippy::exhaustive_structs)] // unit marker
pub struct Intersects;

impl SpanPredicate for Intersects {
    #[inline]
    fn test(&self, candidate: Span, query: Span) -> bool {
        query.start <= candidate.end() && query.end() >= candidate.start
    }
}

/// Matches candidates that share at least one position with the query window.
///
/// A zero-length query overlaps a candidate only when it lies strictly
/// inside it. Spans that merely touch never overlap.
#[derive(Clone, Copy, Debug, Default)]
#[allow(clippy::exhaustive_structs)] // unit marker
pub struct Overlaps;

impl SpanPredicate for Overlaps {
    #[inline]
    fn test(&self, candidate: Span, query: Span) -> bool {
        if query.is_empty() {
            return candidate.start < query.start && query.start < candidate.end();
        }
        let overlap_start = candidate.start.max(query.start);
        let overlap_end = candidate.end().min(query.end());
        overlap_start < overlap_end
    }
}

/// Predicate backed by a closure
#[derive(Clone, Copy, Debug)]
pub struct FnPredicate<F>(F);

impl<F> FnPredicate<F> {
    /// Wraps `f` as a predicate
    #[inline]
    #[must_use]
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> SpanPredicate for FnPredicate<F>
where
    F: Fn(Span, Span) -> bool,
{
    #[inline]
    fn test(&self, candidate: Span, query: Span) -> bool {
        (self.0)(candidate, query)
    }
}
