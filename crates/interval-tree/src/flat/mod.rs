use std::{fmt, marker::PhantomData};

use clippy_utilities::OverflowArithmetic;
use tracing::debug;

use crate::{
    config::IntervalTreeConfig,
    error::IntervalTreeError,
    pool::StackPool,
    span::IntervalIntrospector,
    traversal::Iter,
    witness::{Frame, IntervalTree, TreeWitness},
};

#[cfg(test)]
mod tests;

/// An immutable interval tree laid out as a complete binary tree in a flat
/// array.
///
/// The node at slot `i` has its children at slots `2i + 1` and `2i + 2`. The
/// array is allocated once when the tree is built and never changes
/// afterwards, so a tree can be shared by any number of readers.
pub struct FlatIntervalTree<T, I> {
    /// Slots of the complete tree, in breadth-first order
    slots: Box<[Slot<T>]>,
    /// Maps values to their spans
    introspector: I,
    /// Scratch stacks for traversals
    stacks: StackPool<Frame<usize>>,
}

/// A slot of the flat array
#[derive(Debug)]
struct Slot<T> {
    /// Value stored in the slot
    value: T,
    /// Slot of this subtree whose value ends last
    max_end_index: usize,
}

impl<T, I> FlatIntervalTree<T, I>
where
    I: IntervalIntrospector<T>,
{
    /// Creates a tree holding no value. Does not allocate.
    #[inline]
    #[must_use]
    pub fn empty(introspector: I) -> Self {
        Self {
            slots: Box::default(),
            introspector,
            stacks: StackPool::default(),
        }
    }

    /// Creates a tree holding every value of `values`, in any order.
    #[inline]
    #[must_use]
    pub fn create<V>(introspector: I, values: V) -> Self
    where
        V: IntoIterator<Item = T>,
    {
        Self::create_from_unsorted(introspector, values)
    }

    /// Creates a tree from values that are not sorted by start.
    #[inline]
    #[must_use]
    pub fn create_from_unsorted<V>(introspector: I, values: V) -> Self
    where
        V: IntoIterator<Item = T>,
    {
        let values = sorted_by_start(&introspector, values);
        Self::build(introspector, values, IntervalTreeConfig::default())
    }

    /// Creates a tree from values that are not sorted by start, according to `config`.
    ///
    /// # Errors
    ///
    /// Return `IntervalTreeError::InvalidConfig` if `config` is rejected by
    /// [`IntervalTreeConfig::validate`]
    #[inline]
    pub fn create_from_unsorted_with_config<V>(
        introspector: I,
        values: V,
        config: IntervalTreeConfig,
    ) -> Result<Self, IntervalTreeError>
    where
        V: IntoIterator<Item = T>,
    {
        config.validate()?;
        let values = sorted_by_start(&introspector, values);
        Ok(Self::build(introspector, values, config))
    }

    /// Creates a tree from values sorted ascending by start.
    ///
    /// Unsorted input is a contract violation: it is caught by a debug
    /// assertion, and query results on the resulting tree are unspecified in
    /// release builds. Use [`FlatIntervalTree::try_create_from_sorted`] when
    /// the order is not guaranteed.
    ///
    /// # Panics
    ///
    /// In debug builds, this method panics when `values` is not sorted
    #[inline]
    #[must_use]
    pub fn create_from_sorted<V>(introspector: I, values: V) -> Self
    where
        V: IntoIterator<Item = T>,
    {
        let values: Vec<T> = values.into_iter().collect();
        debug_assert!(
            first_unsorted(&introspector, &values).is_none(),
            "values must be sorted by start"
        );
        Self::build(introspector, values, IntervalTreeConfig::default())
    }

    /// Creates a tree from values sorted ascending by start, according to `config`.
    ///
    /// # Errors
    ///
    /// Return `IntervalTreeError::InvalidConfig` if `config` is rejected by
    /// [`IntervalTreeConfig::validate`]
    ///
    /// # Panics
    ///
    /// In debug builds, this method panics when `values` is not sorted
    #[inline]
    pub fn create_from_sorted_with_config<V>(
        introspector: I,
        values: V,
        config: IntervalTreeConfig,
    ) -> Result<Self, IntervalTreeError>
    where
        V: IntoIterator<Item = T>,
    {
        config.validate()?;
        let values: Vec<T> = values.into_iter().collect();
        debug_assert!(
            first_unsorted(&introspector, &values).is_none(),
            "values must be sorted by start"
        );
        Ok(Self::build(introspector, values, config))
    }

    /// Creates a tree from values sorted ascending by start, checking the order.
    ///
    /// # Errors
    ///
    /// Return `IntervalTreeError::Unsorted` naming the first value that starts
    /// before its predecessor
    #[inline]
    pub fn try_create_from_sorted<V>(introspector: I, values: V) -> Result<Self, IntervalTreeError>
    where
        V: IntoIterator<Item = T>,
    {
        Self::try_create_from_sorted_with_config(
            introspector,
            values,
            IntervalTreeConfig::default(),
        )
    }

    /// Creates a tree from values sorted ascending by start, checking the
    /// order, according to `config`.
    ///
    /// # Errors
    ///
    /// Return `IntervalTreeError::InvalidConfig` if `config` is rejected, or
    /// `IntervalTreeError::Unsorted` naming the first value that starts before
    /// its predecessor
    #[inline]
    pub fn try_create_from_sorted_with_config<V>(
        introspector: I,
        values: V,
        config: IntervalTreeConfig,
    ) -> Result<Self, IntervalTreeError>
    where
        V: IntoIterator<Item = T>,
    {
        config.validate()?;
        let values: Vec<T> = values.into_iter().collect();
        if let Some(index) = first_unsorted(&introspector, &values) {
            let start = values.get(index).map_or(0, |v| introspector.start(v));
            let previous_start = index
                .checked_sub(1)
                .and_then(|i| values.get(i))
                .map_or(0, |v| introspector.start(v));
            return Err(IntervalTreeError::Unsorted {
                index,
                start,
                previous_start,
            });
        }
        Ok(Self::build(introspector, values, config))
    }

    /// Builds a tree from `values` already known to be sorted by start, with
    /// an already validated `config`.
    pub(crate) fn build(introspector: I, values: Vec<T>, config: IntervalTreeConfig) -> Self {
        let slots = build_complete_tree(&introspector, values).into_boxed_slice();
        debug!(
            "built flat interval tree of {} values, height {}",
            slots.len(),
            height_of(slots.len())
        );
        Self {
            slots,
            introspector,
            stacks: StackPool::new(*config.pool()),
        }
    }

    /// Gets an iterator over the values of the tree, sorted by start.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, Self> {
        Iter::new(self)
    }

    /// Number of levels of the tree, zero when it is empty
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        height_of(self.slots.len())
    }

    /// Returns the number of values in the tree.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the tree contains no values.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Number of levels of a complete tree of `len` nodes
fn height_of(len: usize) -> usize {
    len.checked_ilog2().map_or(0, |h| {
        usize::try_from(h)
            .unwrap_or_else(|_| unreachable!("log2 of usize always fits in usize"))
            .overflow_add(1)
    })
}

/// Collects `values` sorted by start
fn sorted_by_start<T, I, V>(introspector: &I, values: V) -> Vec<T>
where
    I: IntervalIntrospector<T>,
    V: IntoIterator<Item = T>,
{
    let mut values: Vec<T> = values.into_iter().collect();
    values.sort_unstable_by_key(|v| introspector.start(v));
    values
}

/// Index of the first value that starts before its predecessor
fn first_unsorted<T, I>(introspector: &I, values: &[T]) -> Option<usize>
where
    I: IntervalIntrospector<T>,
{
    values
        .windows(2)
        .position(|w| match *w {
            [ref prev, ref next] => introspector.start(prev) > introspector.start(next),
            _ => false,
        })
        .map(|i| i.overflow_add(1))
}

/// Left child slot of `slot`
fn left_child(slot: usize) -> usize {
    slot.overflow_mul(2).overflow_add(1)
}

/// Right child slot of `slot`
fn right_child(slot: usize) -> usize {
    slot.overflow_mul(2).overflow_add(2)
}

/// Number of nodes in the left subtree of a complete tree of `len` nodes.
///
/// The top `h` levels of the tree form a perfect tree of `2^h - 1` nodes, the
/// remaining nodes sit on the bottom level, filling it from the left. The
/// left subtree owns half of the perfect part below the root plus as many of
/// the bottom nodes as fit under its half of the bottom level.
fn complete_left_len(len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let height = len.overflow_add(1).ilog2();
    let perfect = 2_usize.pow(height).overflow_sub(1);
    if len == perfect {
        return perfect.overflow_div(2);
    }
    let overflow = len.overflow_sub(perfect);
    let left_bottom_capacity = 2_usize.pow(height.overflow_sub(1));
    perfect
        .overflow_sub(1)
        .overflow_div(2)
        .overflow_add(overflow.min(left_bottom_capacity))
}

/// Slot assigned to each rank of `len` sorted values in the complete tree
fn complete_tree_slots(len: usize) -> Vec<usize> {
    let mut slot_of_rank = vec![0; len];
    // (slot, first rank, number of ranks) of every subtree still to lay out
    let mut frames = vec![(0_usize, 0_usize, len)];
    while let Some((slot, first, count)) = frames.pop() {
        if count == 0 {
            continue;
        }
        let left_len = complete_left_len(count);
        let rank = first.overflow_add(left_len);
        if let Some(s) = slot_of_rank.get_mut(rank) {
            *s = slot;
        }
        frames.push((left_child(slot), first, left_len));
        frames.push((
            right_child(slot),
            rank.overflow_add(1),
            count.overflow_sub(left_len).overflow_sub(1),
        ));
    }
    slot_of_rank
}

/// Lays sorted `values` out as a complete tree and computes every slot's
/// max end index. The returned vector is exactly as long as its capacity.
fn build_complete_tree<T, I>(introspector: &I, values: Vec<T>) -> Vec<Slot<T>>
where
    I: IntervalIntrospector<T>,
{
    let len = values.len();
    let mut placed: Vec<Option<T>> = std::iter::repeat_with(|| None).take(len).collect();
    for (value, slot) in values.into_iter().zip(complete_tree_slots(len)) {
        if let Some(p) = placed.get_mut(slot) {
            *p = Some(value);
        }
    }
    let mut slots = Vec::with_capacity(len);
    slots.extend(
        placed
            .into_iter()
            .flatten()
            .enumerate()
            .map(|(max_end_index, value)| Slot {
                value,
                max_end_index,
            }),
    );
    debug_assert!(slots.len() == len, "every slot must be filled exactly once");
    augment(introspector, &mut slots);
    slots
}

/// Sets the max end index of every slot, children before parents.
fn augment<T, I>(introspector: &I, slots: &mut [Slot<T>])
where
    I: IntervalIntrospector<T>,
{
    let end_of = |all: &[Slot<T>], index: usize| {
        all.get(index).map_or_else(
            || unreachable!("max end index {index} is out of bounds"),
            |s| introspector.end(&s.value),
        )
    };
    for slot in (0..slots.len()).rev() {
        let mut max_end_index = slot;
        for child in [left_child(slot), right_child(slot)] {
            if let Some(child_max) = slots.get(child).map(|c| c.max_end_index) {
                if end_of(&*slots, child_max) > end_of(&*slots, max_end_index) {
                    max_end_index = child_max;
                }
            }
        }
        if let Some(s) = slots.get_mut(slot) {
            s.max_end_index = max_end_index;
        }
    }
}

impl<T, I> Default for FlatIntervalTree<T, I>
where
    I: IntervalIntrospector<T> + Default,
{
    #[inline]
    fn default() -> Self {
        Self::empty(I::default())
    }
}

impl<'a, T, I> IntoIterator for &'a FlatIntervalTree<T, I>
where
    I: IntervalIntrospector<T>,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, FlatIntervalTree<T, I>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, I> fmt::Debug for FlatIntervalTree<T, I>
where
    T: fmt::Debug,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatIntervalTree")
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

impl<T, I> IntervalTree for FlatIntervalTree<T, I>
where
    I: IntervalIntrospector<T>,
{
    type Value = T;
    type Introspector = I;
    type Witness = FlatWitness<T, I>;

    #[inline]
    fn introspector(&self) -> &I {
        &self.introspector
    }

    #[inline]
    fn stack_pool(&self) -> &StackPool<Frame<usize>> {
        &self.stacks
    }
}

/// Navigates the slots of a [`FlatIntervalTree`]
pub struct FlatWitness<T, I>(PhantomData<fn() -> (T, I)>);

impl<T, I> Clone for FlatWitness<T, I> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, I> Copy for FlatWitness<T, I> {}

impl<T, I> Default for FlatWitness<T, I> {
    #[inline]
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T, I> fmt::Debug for FlatWitness<T, I> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FlatWitness")
    }
}

#[allow(clippy::indexing_slicing)] // Nodes handed out by the witness are always inbound
impl<T, I> TreeWitness<T> for FlatWitness<T, I>
where
    I: IntervalIntrospector<T>,
{
    type Tree = FlatIntervalTree<T, I>;
    type Node = usize;

    #[inline]
    fn try_root(self, tree: &Self::Tree) -> Option<usize> {
        (!tree.slots.is_empty()).then_some(0)
    }

    #[inline]
    fn try_left(self, tree: &Self::Tree, node: usize) -> Option<usize> {
        let left = left_child(node);
        (left < tree.slots.len()).then_some(left)
    }

    #[inline]
    fn try_right(self, tree: &Self::Tree, node: usize) -> Option<usize> {
        let right = right_child(node);
        (right < tree.slots.len()).then_some(right)
    }

    #[inline]
    fn value_of(self, tree: &Self::Tree, node: usize) -> &T {
        &tree.slots[node].value
    }

    #[inline]
    fn max_end_node_of(self, tree: &Self::Tree, node: usize) -> usize {
        tree.slots[node].max_end_index
    }
}
