use std::fmt;

/// A half-open range `[start, start + length)` of text positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub struct Span {
    /// First position covered by the span
    pub start: usize,
    /// Number of positions covered by the span
    pub length: usize,
}

impl Span {
    /// The span covering every representable position.
    pub const FULL: Span = Span {
        start: 0,
        length: usize::MAX,
    };

    /// Creates a new `Span`
    #[inline]
    #[must_use]
    pub const fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Creates a new `Span` covering `[start, end)`
    ///
    /// # Panics
    ///
    /// This method panics when `end` is less than `start`
    #[inline]
    #[must_use]
    pub fn from_bounds(start: usize, end: usize) -> Self {
        assert!(start <= end, "invalid span bounds: {start}..{end}");
        Self {
            start,
            length: end.wrapping_sub(start),
        }
    }

    /// Exclusive end of the span. Saturates instead of wrapping.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start.saturating_add(self.length)
    }

    /// Returns `true` if the span has zero length.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl fmt::Display for Span {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.start, self.end())
    }
}

/// Maps a value stored in an interval tree to the span it occupies.
///
/// Implementations must be pure: the span reported for a value must not
/// change while the value is stored in a tree, otherwise query results are
/// unspecified.
pub trait IntervalIntrospector<T> {
    /// Start position of `value`
    fn start(&self, value: &T) -> usize;

    /// Length of `value`
    fn length(&self, value: &T) -> usize;

    /// Span of `value`
    #[inline]
    fn span(&self, value: &T) -> Span {
        Span::new(self.start(value), self.length(value))
    }

    /// Exclusive end of `value`
    #[inline]
    fn end(&self, value: &T) -> usize {
        self.span(value).end()
    }
}

/// Introspector for trees that store `Span`s directly
#[derive(Clone, Copy, Debug, Default)]
#[allow(clippy::exhaustive_structs)] // unit marker
pub struct SpanIntrospector;

impl IntervalIntrospector<Span> for SpanIntrospector {
    #[inline]
    fn start(&self, value: &Span) -> usize {
        value.start
    }

    #[inline]
    fn length(&self, value: &Span) -> usize {
        value.length
    }

    #[inline]
    fn span(&self, value: &Span) -> Span {
        *value
    }
}

/// Introspector backed by a closure returning the span of a value
#[derive(Clone, Copy, Debug)]
pub struct FnIntrospector<F>(F);

impl<F> FnIntrospector<F> {
    /// Wraps `f` as an introspector
    #[inline]
    #[must_use]
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

impl<T, F> IntervalIntrospector<T> for FnIntrospector<F>
where
    F: Fn(&T) -> Span,
{
    #[inline]
    fn start(&self, value: &T) -> usize {
        (self.0)(value).start
    }

    #[inline]
    fn length(&self, value: &T) -> usize {
        (self.0)(value).length
    }

    #[inline]
    fn span(&self, value: &T) -> Span {
        (self.0)(value)
    }
}
