use crate::{pool::StackPool, span::IntervalIntrospector};

/// Navigation contract over one backing representation of an interval tree.
///
/// A witness is a stateless zero-size value. The traversal engine is generic
/// over it, so every representation gets its own fully specialized copy of
/// the query algorithms without dynamic dispatch.
pub trait TreeWitness<T>: Copy + Default {
    /// The tree this witness navigates
    type Tree: ?Sized;
    /// Handle of a node inside `Tree`
    type Node: Copy;

    /// Root of `tree`, `None` if the tree is empty
    fn try_root(self, tree: &Self::Tree) -> Option<Self::Node>;

    /// Left child of `node`
    fn try_left(self, tree: &Self::Tree, node: Self::Node) -> Option<Self::Node>;

    /// Right child of `node`
    fn try_right(self, tree: &Self::Tree, node: Self::Node) -> Option<Self::Node>;

    /// Value stored at `node`
    fn value_of(self, tree: &Self::Tree, node: Self::Node) -> &T;

    /// The node of `node`'s subtree, possibly `node` itself, whose value ends last
    fn max_end_node_of(self, tree: &Self::Tree, node: Self::Node) -> Self::Node;
}

/// A traversal frame: a node and whether its left subtree was already explored
pub type Frame<N> = (N, bool);

/// Node handle type of the tree `Tr`
pub type NodeOf<Tr> =
    <<Tr as IntervalTree>::Witness as TreeWitness<<Tr as IntervalTree>::Value>>::Node;

/// An interval tree that can be queried by the generic traversal engine.
///
/// Implementors must keep their nodes ordered by start and maintain, for every
/// node, the node of its subtree with the largest end.
pub trait IntervalTree {
    /// Values stored in the tree
    type Value;
    /// Maps values to their spans
    type Introspector: IntervalIntrospector<Self::Value>;
    /// Navigation strategy for this representation
    type Witness: TreeWitness<Self::Value, Tree = Self>;

    /// The introspector the tree was built with
    fn introspector(&self) -> &Self::Introspector;

    /// Pool of scratch stacks used by traversals over this tree
    fn stack_pool(&self) -> &StackPool<Frame<<Self::Witness as TreeWitness<Self::Value>>::Node>>;
}
