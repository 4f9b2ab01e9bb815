//! Positional binary tree
//!
//! Nodes live in an arena owned by [`BinaryTree`] and are addressed by
//! [`NodeId`]. Every node has an implicit positional index: the root is 0,
//! the left child of `i` is `2i + 1` and the right child is `2i + 2`.
//! Count, indices and the sparse array form are all derived from
//! reachability, never cached.

mod node;
mod traversal;

pub use node::{parent_index, BinaryTreeNode, NodeId, Side};
pub use traversal::{IndexPath, InorderIter, PostorderIter, PreorderIter};

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use thiserror::Error;
use tracing::trace;

/// Widest sparse array [`BinaryTree::to_array`] will materialize
pub const MAX_ARRAY_SPAN: usize = 1 << 20;

/// Errors raised by structural edits and index lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// A node was offered as its own child
    #[error("node {0} cannot be its own parent")]
    SelfParenting(NodeId),

    /// Attaching the child would close a cycle through the parent's ancestors
    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle {
        /// Prospective parent
        parent: NodeId,
        /// Prospective child (an ancestor of `parent`)
        child: NodeId,
    },

    /// A node that still has a parent was offered as root
    #[error("node {0} has a parent and cannot become the root")]
    RootHasParent(NodeId),

    /// Positional lookup with a negative index
    #[error("negative node index {0}")]
    NegativeIndex(i64),

    /// Id from another arena or out of range
    #[error("node {0} does not belong to this tree")]
    UnknownNode(NodeId),

    /// Node sits too deep for its positional index to fit in a usize
    #[error("positional index of node {0} overflows")]
    IndexOverflow(NodeId),

    /// The sparse array form would be unreasonably wide
    #[error("sparse array span {0} exceeds limit {MAX_ARRAY_SPAN}")]
    SpanTooLarge(usize),
}

/// Arena-backed binary tree with positional indexing
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinaryTree<V> {
    nodes: Vec<BinaryTreeNode<V>>,
    root: Option<NodeId>,
}

impl<V> Default for BinaryTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> BinaryTree<V> {
    /// Create empty tree
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Build a complete tree from values in level order
    pub fn from_values(values: impl IntoIterator<Item = V>) -> Self {
        let mut tree = Self::new();
        tree.build(values);
        tree
    }

    /// Allocate a lonely node (no parent, no children)
    pub fn new_node(&mut self, value: V) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(BinaryTreeNode::new(value));
        id
    }

    /// Node record, if the id belongs to this arena
    pub fn node(&self, id: NodeId) -> Option<&BinaryTreeNode<V>> {
        self.nodes.get(id.0)
    }

    /// Value stored at a node
    pub fn value(&self, id: NodeId) -> Option<&V> {
        self.node(id).map(BinaryTreeNode::value)
    }

    /// Left child of a node
    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(BinaryTreeNode::left)
    }

    /// Right child of a node
    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(BinaryTreeNode::right)
    }

    /// Child of a node on the given side
    pub fn child(&self, id: NodeId, side: Side) -> Option<NodeId> {
        self.node(id).and_then(|n| n.child(side))
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(BinaryTreeNode::parent)
    }

    /// Which side of its parent a node hangs on
    pub fn side_of(&self, id: NodeId) -> Option<Side> {
        let parent = self.parent(id)?;
        if self.left(parent) == Some(id) {
            Some(Side::Left)
        } else {
            Some(Side::Right)
        }
    }

    /// True if the node is a leaf
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).map_or(true, BinaryTreeNode::is_leaf)
    }

    /// Current root
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// True when nothing is reachable
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes reachable from the root
    pub fn count(&self) -> usize {
        self.preorder().count()
    }

    /// Total arena slots, reachable or not
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    fn check(&self, id: NodeId) -> Result<(), StructuralError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(StructuralError::UnknownNode(id))
        }
    }

    /// Replace the root
    ///
    /// The previous root is left intact as a detached subtree.
    pub fn set_root(&mut self, node: Option<NodeId>) -> Result<(), StructuralError> {
        if let Some(id) = node {
            self.check(id)?;
            if self.nodes[id.0].parent().is_some() {
                return Err(StructuralError::RootHasParent(id));
            }
        }
        trace!(root = ?node, "set root");
        self.root = node;
        Ok(())
    }

    /// Set the left child of `parent`
    pub fn set_left(
        &mut self,
        parent: NodeId,
        child: Option<NodeId>,
    ) -> Result<(), StructuralError> {
        self.set_child(parent, Side::Left, child)
    }

    /// Set the right child of `parent`
    pub fn set_right(
        &mut self,
        parent: NodeId,
        child: Option<NodeId>,
    ) -> Result<(), StructuralError> {
        self.set_child(parent, Side::Right, child)
    }

    /// Set a child slot
    ///
    /// The incoming child is first detached from its previous parent and
    /// the slot's previous occupant is detached from `parent`.
    pub fn set_child(
        &mut self,
        parent: NodeId,
        side: Side,
        child: Option<NodeId>,
    ) -> Result<(), StructuralError> {
        self.check(parent)?;
        if let Some(c) = child {
            self.check(c)?;
            if c == parent {
                return Err(StructuralError::SelfParenting(parent));
            }
            if self.ancestors(parent).any(|a| a == c) {
                return Err(StructuralError::Cycle { parent, child: c });
            }
        }
        if self.nodes[parent.0].child(side) == child {
            return Ok(());
        }

        if let Some(c) = child {
            self.detach(c);
            if self.root == Some(c) {
                self.root = None;
            }
        }
        if let Some(old) = self.nodes[parent.0].child(side) {
            self.nodes[old.0].set_parent(None);
        }
        self.nodes[parent.0].set_child(side, child);
        if let Some(c) = child {
            self.nodes[c.0].set_parent(Some(parent));
        }
        trace!(%parent, ?side, ?child, "set child");
        Ok(())
    }

    /// Cut a node loose from its parent, keeping its own subtree
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let slot = &mut self.nodes[parent.0];
        if slot.left() == Some(id) {
            slot.set_child(Side::Left, None);
        } else if slot.right() == Some(id) {
            slot.set_child(Side::Right, None);
        }
        self.nodes[id.0].set_parent(None);
    }

    /// Iterator over the strict ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |n| self.parent(*n))
    }

    /// Root-to-node path of a node, relative to its topmost ancestor
    pub fn path_of(&self, id: NodeId) -> Result<IndexPath, StructuralError> {
        self.check(id)?;
        let mut sides = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            sides.push(self.side_of(current).unwrap_or(Side::Left));
            current = parent;
        }
        let mut path = IndexPath::new();
        for side in sides.into_iter().rev() {
            path.push_level(side);
        }
        Ok(path)
    }

    /// Positional index of a node
    ///
    /// Computed from the node's parent chain, so a node outside the main
    /// tree gets its index relative to its own topmost ancestor.
    pub fn get_index(&self, id: NodeId) -> Result<usize, StructuralError> {
        self.path_of(id)?
            .to_index()
            .ok_or(StructuralError::IndexOverflow(id))
    }

    /// Node at a positional index, rejecting negative indices
    pub fn get_node(&self, index: i64) -> Result<Option<NodeId>, StructuralError> {
        let index = usize::try_from(index).map_err(|_| StructuralError::NegativeIndex(index))?;
        Ok(self.node_at(index))
    }

    /// Node at a positional index
    pub fn node_at(&self, index: usize) -> Option<NodeId> {
        IndexPath::from_index(index).resolve(self)
    }

    /// Preorder iterator from the root
    pub fn preorder(&self) -> PreorderIter<'_, V> {
        PreorderIter::new(self, self.root)
    }

    /// Preorder iterator over the subtree rooted at `start`
    pub fn preorder_from(&self, start: NodeId) -> PreorderIter<'_, V> {
        PreorderIter::new(self, Some(start))
    }

    /// Inorder iterator from the root
    pub fn inorder(&self) -> InorderIter<'_, V> {
        InorderIter::new(self, self.root)
    }

    /// Inorder iterator over the subtree rooted at `start`
    pub fn inorder_from(&self, start: NodeId) -> InorderIter<'_, V> {
        InorderIter::new(self, Some(start))
    }

    /// Postorder iterator from the root
    pub fn postorder(&self) -> PostorderIter<'_, V> {
        PostorderIter::new(self, self.root)
    }

    /// Nodes in preorder
    pub fn to_preorder_array(&self) -> Vec<NodeId> {
        self.preorder().collect()
    }

    /// Nodes in inorder
    pub fn to_inorder_array(&self) -> Vec<NodeId> {
        self.inorder().collect()
    }

    /// Nodes in postorder
    pub fn to_postorder_array(&self) -> Vec<NodeId> {
        self.postorder().collect()
    }

    /// Reachable nodes paired with their positional indices, in preorder
    pub fn indexed_nodes(&self) -> Result<Vec<(NodeId, usize)>, StructuralError> {
        let mut out = Vec::new();
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 0)).into_iter().collect();
        while let Some((id, index)) = stack.pop() {
            out.push((id, index));
            for side in [Side::Right, Side::Left] {
                if let Some(child) = self.child(id, side) {
                    let child_index = side
                        .child_index(index)
                        .ok_or(StructuralError::IndexOverflow(child))?;
                    stack.push((child, child_index));
                }
            }
        }
        Ok(out)
    }

    /// Reachable nodes paired with their root-to-node paths, in preorder
    ///
    /// Unlike [`Self::indexed_nodes`] this never overflows, however deep
    /// the tree.
    pub fn pathed_nodes(&self) -> Vec<(NodeId, IndexPath)> {
        let mut out = Vec::new();
        let mut stack: Vec<(NodeId, IndexPath)> =
            self.root.map(|r| (r, IndexPath::new())).into_iter().collect();
        while let Some((id, path)) = stack.pop() {
            for side in [Side::Right, Side::Left] {
                if let Some(child) = self.child(id, side) {
                    stack.push((child, path.child(side)));
                }
            }
            out.push((id, path));
        }
        out
    }

    /// Sparse positional array: slot `i` holds the node at index `i`
    ///
    /// Trailing empty slots are trimmed; an empty tree gives an empty array.
    pub fn to_array(&self) -> Result<Vec<Option<NodeId>>, StructuralError> {
        let indexed = self.indexed_nodes()?;
        let Some(span) = indexed.iter().map(|(_, i)| i + 1).max() else {
            return Ok(Vec::new());
        };
        if span > MAX_ARRAY_SPAN {
            return Err(StructuralError::SpanTooLarge(span));
        }
        let mut slots = vec![None; span];
        for (id, index) in indexed {
            slots[index] = Some(id);
        }
        Ok(slots)
    }

    /// Replace the contents with a complete tree built from level-order values
    ///
    /// Fresh nodes are allocated; previously issued ids stay valid but
    /// unreachable.
    pub fn build(&mut self, values: impl IntoIterator<Item = V>) {
        let ids: Vec<NodeId> = values.into_iter().map(|v| self.new_node(v)).collect();
        for (i, &id) in ids.iter().enumerate().skip(1) {
            let parent = ids[(i - 1) / 2];
            let side = if i % 2 == 1 { Side::Left } else { Side::Right };
            self.nodes[parent.0].set_child(side, Some(id));
            self.nodes[id.0].set_parent(Some(parent));
        }
        self.root = ids.first().copied();
        trace!(count = ids.len(), "built complete tree");
    }

    /// Exchange the positions of two nodes
    ///
    /// Each node keeps its id and value but takes over the other's parent
    /// and children, so a node identity follows its value. Adjacent nodes
    /// (one the parent of the other) and siblings are handled.
    pub fn swap_nodes(&mut self, a: NodeId, b: NodeId) -> Result<(), StructuralError> {
        self.check(a)?;
        self.check(b)?;
        if a == b {
            return Ok(());
        }
        let swap = |x: Option<NodeId>| {
            x.map(|n| {
                if n == a {
                    b
                } else if n == b {
                    a
                } else {
                    n
                }
            })
        };

        let (pa, la, ra) = self.nodes[a.0].links();
        let (pb, lb, rb) = self.nodes[b.0].links();

        let mut neighbours: Vec<NodeId> = [pa, la, ra, pb, lb, rb]
            .into_iter()
            .flatten()
            .filter(|n| *n != a && *n != b)
            .collect();
        neighbours.sort();
        neighbours.dedup();
        for n in neighbours {
            let (p, l, r) = self.nodes[n.0].links();
            self.nodes[n.0].set_links((swap(p), swap(l), swap(r)));
        }

        self.nodes[a.0].set_links((swap(pb), swap(lb), swap(rb)));
        self.nodes[b.0].set_links((swap(pa), swap(la), swap(ra)));
        self.root = swap(self.root);
        trace!(%a, %b, "swapped node positions");
        Ok(())
    }

    /// Values of the given nodes, in order
    pub fn values_of(&self, ids: impl IntoIterator<Item = NodeId>) -> Vec<V>
    where
        V: Clone,
    {
        ids.into_iter()
            .filter_map(|id| self.value(id).cloned())
            .collect()
    }

    /// Sparse array of values
    pub fn to_value_array(&self) -> Result<Vec<Option<V>>, StructuralError>
    where
        V: Clone,
    {
        Ok(self
            .to_array()?
            .into_iter()
            .map(|slot| slot.and_then(|id| self.value(id).cloned()))
            .collect())
    }

    /// Deep copy of the reachable structure into a fresh, compact arena
    pub fn copy_tree(&self) -> Self
    where
        V: Clone,
    {
        let order = self.to_preorder_array();
        let remap: HashMap<NodeId, NodeId> = order
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, NodeId(i)))
            .collect();
        let map = |x: Option<NodeId>| x.and_then(|n| remap.get(&n).copied());
        let nodes = order
            .iter()
            .map(|id| {
                let old = &self.nodes[id.0];
                let mut node = BinaryTreeNode::new(old.value().clone());
                let (p, l, r) = old.links();
                node.set_links((map(p), map(l), map(r)));
                node
            })
            .collect();
        Self {
            nodes,
            root: map(self.root),
        }
    }

    /// Copy the tree and carry one node across by its root-to-node path
    pub fn copy_tree_tracking(&self, node: Option<NodeId>) -> (Self, Option<IndexPath>)
    where
        V: Clone,
    {
        let path = node
            .filter(|n| self.preorder().any(|r| r == *n))
            .and_then(|n| self.path_of(n).ok());
        (self.copy_tree(), path)
    }
}

impl<V: PartialOrd> BinaryTree<V> {
    /// Left subtrees hold strictly smaller values, right subtrees hold
    /// values at least as large
    ///
    /// Equal values always go right, so an equal value found on the left
    /// breaks the order even though the inorder sequence never decreases.
    pub fn satisfies_search_order(&self) -> bool {
        // (node, inclusive lower bound, exclusive upper bound)
        let mut stack: Vec<(NodeId, Option<&V>, Option<&V>)> =
            self.root.map(|r| (r, None, None)).into_iter().collect();
        while let Some((id, lower, upper)) = stack.pop() {
            let Some(value) = self.value(id) else {
                return false;
            };
            if lower.is_some_and(|lo| value < lo) || upper.is_some_and(|hi| value >= hi) {
                return false;
            }
            stack.extend(self.left(id).map(|l| (l, lower, Some(value))));
            stack.extend(self.right(id).map(|r| (r, Some(value), upper)));
        }
        true
    }

    /// Every node is at least as large as its children
    pub fn satisfies_heap_order(&self) -> bool {
        self.preorder().all(|id| {
            [self.left(id), self.right(id)]
                .into_iter()
                .flatten()
                .all(|c| self.value(c) <= self.value(id))
        })
    }

    /// Nodes occupy exactly the indices `0..count`
    pub fn is_complete(&self) -> bool {
        match self.indexed_nodes() {
            Ok(indexed) => {
                let count = indexed.len();
                indexed.iter().all(|(_, i)| *i < count)
            }
            Err(_) => false,
        }
    }
}

impl<V> Index<NodeId> for BinaryTree<V> {
    type Output = BinaryTreeNode<V>;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

impl<V: fmt::Display> fmt::Display for BinaryTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_array() {
            Ok(slots) => {
                write!(f, "[")?;
                for (i, slot) in slots.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match slot.and_then(|id| self.value(id)) {
                        Some(v) => write!(f, "{v}")?,
                        None => write!(f, "n")?,
                    }
                }
                write!(f, "]")
            }
            Err(_) => write!(f, "<{} nodes>", self.count()),
        }
    }
}
