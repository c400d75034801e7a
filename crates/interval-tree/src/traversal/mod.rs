use std::fmt;

use clippy_utilities::OverflowArithmetic;

use crate::{
    pool::PooledStack,
    predicate::SpanPredicate,
    span::{IntervalIntrospector, Span},
    witness::{Frame, IntervalTree, NodeOf, TreeWitness},
};


/// Checks if any value in `tree` matches `predicate` against `query`.
///
/// Depth-first, unordered, and stops at the first match.
#[inline]
pub fn any<Tr, P>(tree: &Tr, query: Span, predicate: &P) -> bool
where
    Tr: IntervalTree,
    P: SpanPredicate + ?Sized,
{
    let witness = Tr::Witness::default();
    let Some(root) = witness.try_root(tree) else {
        return false;
    };
    let introspector = tree.introspector();
    let mut stack = tree.stack_pool().lease();
    stack.push((root, false));
    while let Some((node, _)) = stack.pop() {
        if predicate.test(introspector.span(witness.value_of(tree, node)), query) {
            return true;
        }
        if let Some(right) = witness.try_right(tree, node) {
            if should_visit_right(tree, node, right, query) {
                stack.push((right, false));
            }
        }
        if let Some(left) = witness.try_left(tree, node) {
            if should_visit_left(tree, left, query) {
                stack.push((left, false));
            }
        }
    }
    false
}

/// Appends every value in `tree` matching `predicate` against `query` to
/// `out`, ascending by start, and returns how many were appended.
#[inline]
pub fn fill_matches<'a, Tr, P>(
    tree: &'a Tr,
    query: Span,
    predicate: &P,
    out: &mut Vec<&'a Tr::Value>,
) -> usize
where
    Tr: IntervalTree,
    P: SpanPredicate + ?Sized,
{
    let introspector = tree.introspector();
    let before = out.len();
    out.extend(
        Iter::within(tree, query)
            .filter(|value| predicate.test(introspector.span(value), query)),
    );
    out.len().overflow_sub(before)
}

/// Whether the left subtree rooted at `left` may hold a value intersecting `query`
#[inline]
fn should_visit_left<Tr>(tree: &Tr, left: NodeOf<Tr>, query: Span) -> bool
where
    Tr: IntervalTree,
{
    max_end(tree, left) >= query.start
}

/// Whether the right subtree of `node`, rooted at `right`, may hold a value
/// intersecting `query`
#[inline]
fn should_visit_right<Tr>(tree: &Tr, node: NodeOf<Tr>, right: NodeOf<Tr>, query: Span) -> bool
where
    Tr: IntervalTree,
{
    let witness = Tr::Witness::default();
    tree.introspector().start(witness.value_of(tree, node)) <= query.end()
        && max_end(tree, right) >= query.start
}

/// Largest end among the values of the subtree rooted at `node`
#[inline]
fn max_end<Tr>(tree: &Tr, node: NodeOf<Tr>) -> usize
where
    Tr: IntervalTree,
{
    let witness = Tr::Witness::default();
    let max_node = witness.max_end_node_of(tree, node);
    tree.introspector().end(witness.value_of(tree, max_node))
}

/// An in-order iterator over the values of an interval tree, ascending by
/// start.
///
/// Subtrees that cannot intersect the iterator's window are skipped; the
/// iterator returned by a tree's `iter` covers [`Span::FULL`] and therefore
/// yields every value.
pub struct Iter<'a, Tr>
where
    Tr: IntervalTree,
{
    /// The tree being walked
    tree: &'a Tr,
    /// Window used to prune subtrees
    query: Span,
    /// Pending frames, leased from the tree's pool
    stack: PooledStack<'a, Frame<NodeOf<Tr>>>,
}

impl<'a, Tr> Iter<'a, Tr>
where
    Tr: IntervalTree,
{
    /// Creates an iterator over every value of `tree`
    #[inline]
    #[must_use]
    pub fn new(tree: &'a Tr) -> Self {
        Self::within(tree, Span::FULL)
    }

    /// Creates an iterator over the values of `tree` that may intersect `query`
    fn within(tree: &'a Tr, query: Span) -> Self {
        let mut stack = tree.stack_pool().lease();
        if let Some(root) = Tr::Witness::default().try_root(tree) {
            stack.push((root, false));
        }
        Self { tree, query, stack }
    }
}

impl<'a, Tr> Iterator for Iter<'a, Tr>
where
    Tr: IntervalTree,
{
    type Item = &'a Tr::Value;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let witness = Tr::Witness::default();
        while let Some((node, visited)) = self.stack.pop() {
            if visited {
                return Some(witness.value_of(self.tree, node));
            }
            if let Some(right) = witness.try_right(self.tree, node) {
                if should_visit_right(self.tree, node, right, self.query) {
                    self.stack.push((right, false));
                }
            }
            self.stack.push((node, true));
            if let Some(left) = witness.try_left(self.tree, node) {
                if should_visit_left(self.tree, left, self.query) {
                    self.stack.push((left, false));
                }
            }
        }
        None
    }
}

impl<Tr> fmt::Debug for Iter<'_, Tr>
where
    Tr: IntervalTree,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("query", &self.query)
            .field("pending", &self.stack.len())
            .finish_non_exhaustive()
    }
}
