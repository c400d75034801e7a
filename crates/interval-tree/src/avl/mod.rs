use std::{fmt, marker::PhantomData};

use clippy_utilities::OverflowArithmetic;
use petgraph::graph::{DefaultIx, IndexType, NodeIndex};
use tracing::debug;

use crate::{
    config::{IntervalTreeConfig, StackPoolConfig},
    error::IntervalTreeError,
    flat::FlatIntervalTree,
    pool::StackPool,
    span::IntervalIntrospector,
    traversal::Iter,
    witness::{Frame, IntervalTree, TreeWitness},
};


/// A mutable interval tree, which supports incremental insertion.
///
/// Values are ordered by start in an AVL tree whose nodes also track the
/// value with the largest end in their subtree. Values are never removed; use
/// [`AvlIntervalTree::clear`] or build a new tree instead.
pub struct AvlIntervalTree<T, I, Ix = DefaultIx> {
    /// Vector that stores nodes
    nodes: Vec<Node<T, Ix>>,
    /// Root of the interval tree
    root: Option<NodeIndex<Ix>>,
    /// Maps values to their spans
    introspector: I,
    /// Scratch stacks for traversals
    stacks: StackPool<Frame<NodeIndex<Ix>>>,
    /// The config the tree was created with
    config: IntervalTreeConfig,
}

impl<T, I, Ix> AvlIntervalTree<T, I, Ix>
where
    I: IntervalIntrospector<T>,
    Ix: IndexType,
{
    /// Creates an empty `AvlIntervalTree` with room for `capacity` values.
    #[inline]
    #[must_use]
    pub fn with_capacity(introspector: I, capacity: usize) -> Self {
        Self::from_config(
            introspector,
            IntervalTreeConfig::new(capacity, StackPoolConfig::default()),
        )
    }

    /// Creates an empty `AvlIntervalTree` according to `config`
    ///
    /// # Errors
    ///
    /// Return `IntervalTreeError::InvalidConfig` if `config` is rejected by
    /// [`IntervalTreeConfig::validate`]
    #[inline]
    pub fn with_config(
        introspector: I,
        config: IntervalTreeConfig,
    ) -> Result<Self, IntervalTreeError> {
        config.validate()?;
        Ok(Self::from_config(introspector, config))
    }

    /// Inserts a value into the tree.
    ///
    /// # Panics
    ///
    /// This method panics when the tree is at the maximum number of nodes for its index
    #[inline]
    pub fn insert(&mut self, value: T) {
        let node_idx = NodeIndex::new(self.nodes.len());
        // check for max capacity, except if we use usize
        assert!(
            <Ix as IndexType>::max().index() == !0 || NodeIndex::end() != node_idx,
            "Reached maximum number of nodes"
        );
        self.nodes.push(Node::new(value, node_idx));
        let root = match self.root {
            Some(root) => self.insert_inner(root, node_idx),
            None => node_idx,
        };
        self.root = Some(root);
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
        usize::from(self.height_of(self.root))
    }

    /// Removes all values from the tree
    #[inline]
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Returns the number of values in the tree.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree contains no values.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Turns the tree into an immutable [`FlatIntervalTree`] holding the same
    /// values.
    #[inline]
    #[must_use]
    pub fn freeze(self) -> FlatIntervalTree<T, I> {
        let order = self.in_order();
        let mut values: Vec<Option<T>> = self.nodes.into_iter().map(|n| Some(n.value)).collect();
        let sorted: Vec<T> = order
            .into_iter()
            .filter_map(|idx| values.get_mut(idx.index()).and_then(Option::take))
            .collect();
        debug!("freezing avl interval tree of {} values", sorted.len());
        FlatIntervalTree::build(self.introspector, sorted, self.config)
    }
}

impl<T, I> AvlIntervalTree<T, I>
where
    I: IntervalIntrospector<T>,
{
    /// Creates an empty `AvlIntervalTree`
    #[inline]
    #[must_use]
    pub fn new(introspector: I) -> Self {
        Self::from_config(introspector, IntervalTreeConfig::default())
    }

    /// Creates a tree holding every value of `values`
    #[inline]
    #[must_use]
    pub fn create<V>(introspector: I, values: V) -> Self
    where
        V: IntoIterator<Item = T>,
    {
        let mut tree = Self::new(introspector);
        tree.extend(values);
        tree
    }
}

impl<T, I, Ix> Default for AvlIntervalTree<T, I, Ix>
where
    I: IntervalIntrospector<T> + Default,
    Ix: IndexType,
{
    #[inline]
    fn default() -> Self {
        Self::from_config(I::default(), IntervalTreeConfig::default())
    }
}

impl<T, I, Ix> AvlIntervalTree<T, I, Ix>
where
    I: IntervalIntrospector<T>,
    Ix: IndexType,
{
    /// Creates an empty tree from an already validated `config`
    fn from_config(introspector: I, config: IntervalTreeConfig) -> Self {
        Self {
            nodes: Vec::with_capacity(*config.initial_capacity()),
            root: None,
            introspector,
            stacks: StackPool::new(*config.pool()),
            config,
        }
    }

    /// Inserts node `z` into the subtree rooted at `x` and returns the new
    /// root of that subtree.
    fn insert_inner(&mut self, x: NodeIndex<Ix>, z: NodeIndex<Ix>) -> NodeIndex<Ix> {
        if self.start(z) < self.start(x) {
            let left = match self.node_ref(x, Node::left) {
                Some(left) => self.insert_inner(left, z),
                None => z,
            };
            self.node_mut(x, Node::set_left(Some(left)));
        } else {
            let right = match self.node_ref(x, Node::right) {
                Some(right) => self.insert_inner(right, z),
                None => z,
            };
            self.node_mut(x, Node::set_right(Some(right)));
        }
        self.update(x);
        self.rebalance(x)
    }

    /// Restores the AVL property at `x`, returning the new subtree root.
    fn rebalance(&mut self, x: NodeIndex<Ix>) -> NodeIndex<Ix> {
        match self.balance(x) {
            -2 => {
                let right = self.right_child(x);
                if self.balance(right) == 1 {
                    let new_right = self.right_rotate(right);
                    self.node_mut(x, Node::set_right(Some(new_right)));
                }
                self.left_rotate(x)
            }
            2 => {
                let left = self.left_child(x);
                if self.balance(left) == -1 {
                    let new_left = self.left_rotate(left);
                    self.node_mut(x, Node::set_left(Some(new_left)));
                }
                self.right_rotate(x)
            }
            _ => x,
        }
    }

    /// Binary tree left rotate.
    fn left_rotate(&mut self, x: NodeIndex<Ix>) -> NodeIndex<Ix> {
        let y = self.right_child(x);
        self.node_mut(x, Node::set_right(self.node_ref(y, Node::left)));
        self.node_mut(y, Node::set_left(Some(x)));
        self.update(x);
        self.update(y);
        y
    }

    /// Binary tree right rotate.
    fn right_rotate(&mut self, x: NodeIndex<Ix>) -> NodeIndex<Ix> {
        let y = self.left_child(x);
        self.node_mut(x, Node::set_left(self.node_ref(y, Node::right)));
        self.node_mut(y, Node::set_right(Some(x)));
        self.update(x);
        self.update(y);
        y
    }

    /// Recalculates height and max end of `x` from its children
    fn update(&mut self, x: NodeIndex<Ix>) {
        let left = self.node_ref(x, Node::left);
        let right = self.node_ref(x, Node::right);
        let height = self.height_of(left).max(self.height_of(right)).overflow_add(1);
        self.node_mut(x, Node::set_height(height));
        self.recaculate_max(x);
    }

    /// Recaculate max end node from left and right childrens
    fn recaculate_max(&mut self, x: NodeIndex<Ix>) {
        self.node_mut(x, Node::set_max_end_node(x));
        if let Some(left) = self.node_ref(x, Node::left) {
            if self.max_end(left) > self.max_end(x) {
                self.node_mut(x, Node::set_max_end_node(self.node_ref(left, Node::max_end_node)));
            }
        }
        if let Some(right) = self.node_ref(x, Node::right) {
            if self.max_end(right) > self.max_end(x) {
                self.node_mut(
                    x,
                    Node::set_max_end_node(self.node_ref(right, Node::max_end_node)),
                );
            }
        }
    }

    /// Height of the left subtree minus the height of the right subtree
    fn balance(&self, x: NodeIndex<Ix>) -> i16 {
        let left = i16::from(self.height_of(self.node_ref(x, Node::left)));
        let right = i16::from(self.height_of(self.node_ref(x, Node::right)));
        left.overflow_sub(right)
    }

    /// Arena indices of all nodes, sorted by start
    fn in_order(&self) -> Vec<NodeIndex<Ix>> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = Vec::new();
        let mut x = self.root;
        while x.is_some() || !stack.is_empty() {
            while let Some(node) = x {
                stack.push(node);
                x = self.node_ref(node, Node::left);
            }
            if let Some(node) = stack.pop() {
                order.push(node);
                x = self.node_ref(node, Node::right);
            }
        }
        order
    }
}

// Convenient methods for reference or mutate nodes
#[allow(clippy::missing_docs_in_private_items)] // Trivial convenient methods
#[allow(clippy::indexing_slicing)] // Won't panic since all the indices we used are inbound
impl<'a, T, I, Ix> AvlIntervalTree<T, I, Ix>
where
    I: IntervalIntrospector<T>,
    Ix: IndexType,
{
    fn node_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<T, Ix>) -> R,
    {
        op(&self.nodes[node.index()])
    }

    fn node_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<T, Ix>) -> R,
    {
        op(&mut self.nodes[node.index()])
    }

    fn left_child(&self, node: NodeIndex<Ix>) -> NodeIndex<Ix> {
        self.node_ref(node, Node::left)
            .unwrap_or_else(|| unreachable!("left-heavy node must have a left child"))
    }

    fn right_child(&self, node: NodeIndex<Ix>) -> NodeIndex<Ix> {
        self.node_ref(node, Node::right)
            .unwrap_or_else(|| unreachable!("right-heavy node must have a right child"))
    }

    fn height_of(&self, node: Option<NodeIndex<Ix>>) -> u8 {
        node.map_or(0, |x| self.node_ref(x, Node::height))
    }

    fn start(&self, node: NodeIndex<Ix>) -> usize {
        self.introspector.start(self.node_ref(node, Node::value))
    }

    fn end(&self, node: NodeIndex<Ix>) -> usize {
        self.introspector.end(self.node_ref(node, Node::value))
    }

    fn max_end(&self, node: NodeIndex<Ix>) -> usize {
        self.end(self.node_ref(node, Node::max_end_node))
    }
}

impl<T, I, Ix> Extend<T> for AvlIntervalTree<T, I, Ix>
where
    I: IntervalIntrospector<T>,
    Ix: IndexType,
{
    #[inline]
    fn extend<V: IntoIterator<Item = T>>(&mut self, values: V) {
        for value in values {
            self.insert(value);
        }
    }
}

impl<'a, T, I, Ix> IntoIterator for &'a AvlIntervalTree<T, I, Ix>
where
    I: IntervalIntrospector<T>,
    Ix: IndexType,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, AvlIntervalTree<T, I, Ix>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, I, Ix> fmt::Debug for AvlIntervalTree<T, I, Ix>
where
    T: fmt::Debug,
    I: IntervalIntrospector<T>,
    Ix: IndexType,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvlIntervalTree")
            .field("len", &self.len())
            .field("height", &self.height())
            .field("values", &self.iter().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<T, I, Ix> IntervalTree for AvlIntervalTree<T, I, Ix>
where
    I: IntervalIntrospector<T>,
    Ix: IndexType,
{
    type Value = T;
    type Introspector = I;
    type Witness = AvlWitness<T, I, Ix>;

    #[inline]
    fn introspector(&self) -> &I {
        &self.introspector
    }

    #[inline]
    fn stack_pool(&self) -> &StackPool<Frame<NodeIndex<Ix>>> {
        &self.stacks
    }
}

/// Navigates the nodes of an [`AvlIntervalTree`]
pub struct AvlWitness<T, I, Ix>(PhantomData<fn() -> (T, I, Ix)>);

impl<T, I, Ix> Clone for AvlWitness<T, I, Ix> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, I, Ix> Copy for AvlWitness<T, I, Ix> {}

impl<T, I, Ix> Default for AvlWitness<T, I, Ix> {
    #[inline]
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T, I, Ix> fmt::Debug for AvlWitness<T, I, Ix> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AvlWitness")
    }
}

impl<T, I, Ix> TreeWitness<T> for AvlWitness<T, I, Ix>
where
    I: IntervalIntrospector<T>,
    Ix: IndexType,
{
    type Tree = AvlIntervalTree<T, I, Ix>;
    type Node = NodeIndex<Ix>;

    #[inline]
    fn try_root(self, tree: &Self::Tree) -> Option<NodeIndex<Ix>> {
        tree.root
    }

    #[inline]
    fn try_left(self, tree: &Self::Tree, node: NodeIndex<Ix>) -> Option<NodeIndex<Ix>> {
        tree.node_ref(node, Node::left)
    }

    #[inline]
    fn try_right(self, tree: &Self::Tree, node: NodeIndex<Ix>) -> Option<NodeIndex<Ix>> {
        tree.node_ref(node, Node::right)
    }

    #[inline]
    fn value_of(self, tree: &Self::Tree, node: NodeIndex<Ix>) -> &T {
        tree.node_ref(node, Node::value)
    }

    #[inline]
    fn max_end_node_of(self, tree: &Self::Tree, node: NodeIndex<Ix>) -> NodeIndex<Ix> {
        tree.node_ref(node, Node::max_end_node)
    }
}

/// Node of the interval tree
#[derive(Debug)]
struct Node<T, Ix> {
    /// Left children
    left: Option<NodeIndex<Ix>>,
    /// Right children
    right: Option<NodeIndex<Ix>>,
    /// Number of levels of the subtree rooted at this node
    height: u8,
    /// The node of this subtree whose value ends last
    max_end_node: NodeIndex<Ix>,
    /// Value of the node
    value: T,
}

// Convenient getter/setter methods
#[allow(clippy::missing_docs_in_private_items)] // Trivial convenient methods
impl<T, Ix> Node<T, Ix>
where
    Ix: IndexType,
{
    fn new(value: T, index: NodeIndex<Ix>) -> Self {
        Node {
            left: None,
            right: None,
            height: 1,
            max_end_node: index,
            value,
        }
    }

    fn left(&self) -> Option<NodeIndex<Ix>> {
        self.left
    }

    fn right(&self) -> Option<NodeIndex<Ix>> {
        self.right
    }

    fn height(&self) -> u8 {
        self.height
    }

    fn max_end_node(&self) -> NodeIndex<Ix> {
        self.max_end_node
    }

    fn value(&self) -> &T {
        &self.value
    }

    fn set_left(left: Option<NodeIndex<Ix>>) -> impl FnOnce(&mut Node<T, Ix>) {
        move |node: &mut Node<T, Ix>| {
            node.left = left;
        }
    }

    fn set_right(right: Option<NodeIndex<Ix>>) -> impl FnOnce(&mut Node<T, Ix>) {
        move |node: &mut Node<T, Ix>| {
            node.right = right;
        }
    }

    fn set_height(height: u8) -> impl FnOnce(&mut Node<T, Ix>) {
        move |node: &mut Node<T, Ix>| {
            node.height = height;
        }
    }

    fn set_max_end_node(max_end_node: NodeIndex<Ix>) -> impl FnOnce(&mut Node<T, Ix>) {
        move |node: &mut Node<T, Ix>| {
            node.max_end_node = max_end_node;
        }
    }
}
