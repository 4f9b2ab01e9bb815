//! Arena node records
//!
//! Links are stored as [`NodeId`]s into the owning tree's arena, so a
//! parent link never keeps a node alive on its own.

use std::fmt;

/// Handle to a node in a [`BinaryTree`](super::BinaryTree) arena
///
/// Identity is stable for the lifetime of the arena: ids are never reused,
/// and structural rewiring moves a node without changing its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena slot
    pub fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which child slot of a parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// Left child, index 2i + 1
    Left,

    /// Right child, index 2i + 2
    Right,
}

impl Side {
    /// Index of this child of the node at `parent`, `None` on overflow
    pub fn child_index(self, parent: usize) -> Option<usize> {
        let base = parent.checked_mul(2)?;
        match self {
            Side::Left => base.checked_add(1),
            Side::Right => base.checked_add(2),
        }
    }

    /// Side an index occupies under its parent (`None` for the root)
    pub fn of_index(index: usize) -> Option<Side> {
        match index {
            0 => None,
            i if i % 2 == 1 => Some(Side::Left),
            _ => Some(Side::Right),
        }
    }

    /// The other side
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Parent index of a non-root positional index
pub fn parent_index(index: usize) -> Option<usize> {
    index.checked_sub(1).map(|i| i / 2)
}

/// One node record: a value and three optional links
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinaryTreeNode<V> {
    value: V,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
}

impl<V> BinaryTreeNode<V> {
    pub(crate) fn new(value: V) -> Self {
        Self {
            value,
            left: None,
            right: None,
            parent: None,
        }
    }

    /// Stored value
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Left child
    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    /// Right child
    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    /// Parent link
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child on the given side
    pub fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// True when no parent link is set
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// True when neither child is set
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn links(&self) -> (Option<NodeId>, Option<NodeId>, Option<NodeId>) {
        (self.parent, self.left, self.right)
    }

    pub(crate) fn set_links(
        &mut self,
        (parent, left, right): (Option<NodeId>, Option<NodeId>, Option<NodeId>),
    ) {
        self.parent = parent;
        self.left = left;
        self.right = right;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_indices() {
        assert_eq!(Side::Left.child_index(0), Some(1));
        assert_eq!(Side::Right.child_index(0), Some(2));
        assert_eq!(Side::Right.child_index(12), Some(26));
        assert_eq!(Side::Left.child_index(usize::MAX), None);
    }

    #[test]
    fn test_side_and_parent_of_index() {
        assert_eq!(Side::of_index(0), None);
        assert_eq!(Side::of_index(5), Some(Side::Left));
        assert_eq!(Side::of_index(26), Some(Side::Right));
        assert_eq!(parent_index(0), None);
        assert_eq!(parent_index(26), Some(12));
        assert_eq!(parent_index(5), Some(2));
    }

    #[test]
    fn test_fresh_node_is_lonely() {
        let node = BinaryTreeNode::new(7);
        assert!(node.is_root());
        assert!(node.is_leaf());
        assert_eq!(*node.value(), 7);
    }
}
