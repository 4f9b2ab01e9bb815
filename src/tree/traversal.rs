//! Positional paths and stack-based traversals
//!
//! A positional index is decomposed into one left/right bit per level,
//! read from the root down. Traversals keep an explicit stack of pending
//! nodes instead of recursing, so a degenerate chain never grows the call
//! stack.

use std::fmt;

use bitvec::vec::BitVec;

use super::{BinaryTree, NodeId, Side};

/// Root-to-node path, one bit per level (0 = left, 1 = right)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexPath {
    bits: BitVec,
}

impl IndexPath {
    /// Empty path (the root)
    pub fn new() -> Self {
        Self {
            bits: BitVec::new(),
        }
    }

    /// Decompose a positional index into row/column and read the column
    /// bits from the most significant end
    pub fn from_index(index: usize) -> Self {
        let slot = index as u128 + 1;
        let row = slot.ilog2();
        let column = slot - (1u128 << row);
        let bits = (0..row).rev().map(|bit| (column >> bit) & 1 == 1).collect();
        Self { bits }
    }

    /// Push one level
    pub fn push_level(&mut self, side: Side) {
        self.bits.push(side == Side::Right);
    }

    /// Path one level further down
    pub fn child(&self, side: Side) -> Self {
        let mut path = self.clone();
        path.push_level(side);
        path
    }

    /// Pop one level
    pub fn pop_level(&mut self) -> Option<Side> {
        self.bits.pop().map(to_side)
    }

    /// Number of levels below the root
    pub fn depth(&self) -> usize {
        self.bits.len()
    }

    /// Tokens from the root down
    pub fn sides(&self) -> impl Iterator<Item = Side> + '_ {
        self.bits.iter().by_vals().map(to_side)
    }

    /// Recompose the positional index, `None` on overflow
    pub fn to_index(&self) -> Option<usize> {
        self.sides()
            .try_fold(0usize, |index, side| side.child_index(index))
    }

    /// Walk the path from the tree's root
    pub fn resolve<V>(&self, tree: &BinaryTree<V>) -> Option<NodeId> {
        let mut node = tree.root()?;
        for side in self.sides() {
            node = tree.node(node)?.child(side)?;
        }
        Some(node)
    }
}

/// Decimal index when it fits a `usize`, otherwise `L`/`R` per level
impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(index) = self.to_index() {
            return write!(f, "{index}");
        }
        for side in self.sides() {
            let c = match side {
                Side::Left => 'L',
                Side::Right => 'R',
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

fn to_side(bit: bool) -> Side {
    if bit {
        Side::Right
    } else {
        Side::Left
    }
}

/// Preorder iterator over the nodes reachable from a start node
#[derive(Debug)]
pub struct PreorderIter<'a, V> {
    tree: &'a BinaryTree<V>,
    stack: Vec<NodeId>,
}

impl<'a, V> PreorderIter<'a, V> {
    pub(crate) fn new(tree: &'a BinaryTree<V>, start: Option<NodeId>) -> Self {
        Self {
            tree,
            stack: start.into_iter().collect(),
        }
    }
}

impl<V> Iterator for PreorderIter<'_, V> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some(node) = self.tree.node(id) {
            self.stack.extend(node.right());
            self.stack.extend(node.left());
        }
        Some(id)
    }
}

/// Inorder iterator
#[derive(Debug)]
pub struct InorderIter<'a, V> {
    tree: &'a BinaryTree<V>,
    stack: Vec<NodeId>,
    current: Option<NodeId>,
}

impl<'a, V> InorderIter<'a, V> {
    pub(crate) fn new(tree: &'a BinaryTree<V>, start: Option<NodeId>) -> Self {
        Self {
            tree,
            stack: Vec::new(),
            current: start,
        }
    }
}

impl<V> Iterator for InorderIter<'_, V> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some(id) = self.current {
            self.stack.push(id);
            self.current = self.tree.node(id).and_then(|n| n.left());
        }
        let id = self.stack.pop()?;
        self.current = self.tree.node(id).and_then(|n| n.right());
        Some(id)
    }
}

/// Postorder iterator
#[derive(Debug)]
pub struct PostorderIter<'a, V> {
    tree: &'a BinaryTree<V>,
    // (node, children already pushed)
    stack: Vec<(NodeId, bool)>,
}

impl<'a, V> PostorderIter<'a, V> {
    pub(crate) fn new(tree: &'a BinaryTree<V>, start: Option<NodeId>) -> Self {
        Self {
            tree,
            stack: start.map(|id| (id, false)).into_iter().collect(),
        }
    }
}

impl<V> Iterator for PostorderIter<'_, V> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let (id, expanded) = self.stack.pop()?;
            if expanded {
                return Some(id);
            }
            self.stack.push((id, true));
            if let Some(node) = self.tree.node(id) {
                self.stack.extend(node.right().map(|r| (r, false)));
                self.stack.extend(node.left().map(|l| (l, false)));
            }
        }
    }
}
