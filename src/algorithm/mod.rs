//! Algorithm units
//!
//! Every operation runs inside one harness, [`AlgorithmUnit`]:
//!
//! 1. **Construct**: validate parameters, capture the target node by
//!    positional index, deep-copy the tree and the current selection.
//! 2. **Start**: a top-level unit replaces the producer's timeline, closes
//!    any array panel and re-selects the captured selection. Nested units
//!    skip all of this and share the outer timeline.
//! 3. **Body**: the BST or heap routine mutates the live tree and describes
//!    each move to the producer.
//! 4. **End**: optionally pause on the resulting tree; a top-level unit
//!    closes its timeline.
//! 5. **Undo**: replace the live tree with a copy of the snapshot.
//!
//! Start and end listeners are fired by whoever plays the timeline, when
//! the start and end markers complete (see [`crate::Session`]).

mod bst;
mod heap;
mod random;

pub use random::{heapify_array, random_bs_tree, random_heap_values, MAX_RANDOM_HEAP};

use std::fmt;

use rand::RngCore;
use thiserror::Error;
use tracing::{debug, warn};

use crate::animation::AnimationProducer;
use crate::tree::{BinaryTree, IndexPath, NodeId, Side, StructuralError};

/// Value type stored by algorithm trees
pub type Value = i64;

/// Errors raised while constructing or running a unit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmError {
    /// Generator interval is empty
    #[error("invalid range: min {min} > max {max}")]
    InvalidRange {
        /// Lower bound
        min: Value,
        /// Upper bound
        max: Value,
    },

    /// Node-taking operation constructed without a node
    #[error("{0} needs a target node")]
    MissingTarget(&'static str),

    /// Target node is not reachable from the root
    #[error("node {0} is not reachable in the tree")]
    TargetNotInTree(NodeId),

    /// Re-execution found no node at the captured position
    #[error("no node at positional index {0} to run against")]
    TargetLost(IndexPath),

    /// Operation only runs inside another unit
    #[error("{0} only runs as part of another operation")]
    NestedOnly(&'static str),

    /// Heap operation found a gap in the positional layout
    #[error("heap has no node at positional index {0}")]
    IncompleteHeap(usize),

    /// Underlying tree edit failed
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

/// The closed set of operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Replace the tree with a random search tree over `min..=max`
    RandomBsTree {
        /// Lower bound
        min: Value,
        /// Upper bound
        max: Value,
    },
    /// Insert a value into a search tree
    BstInsert(Value),
    /// Look a value up in a search tree
    BstFind(Value),
    /// Delete the target node from a search tree
    BstDelete,
    /// Rightmost node below the target
    BstGetMax,
    /// Leftmost node below the target
    BstGetMin,
    /// In-order predecessor of the target
    BstPredecessor,
    /// In-order successor of the target
    BstSuccessor,
    /// Nodes in preorder
    PreorderArray,
    /// Nodes in inorder
    InorderArray,
    /// Nodes in postorder
    PostorderArray,
    /// Replace the tree with a random max-heap over `min..=max`
    RandomHeap {
        /// Lower bound
        min: Value,
        /// Upper bound
        max: Value,
    },
    /// Build a max-heap from level-order values
    BuildHeap(Vec<Value>),
    /// Insert a value into a heap
    HeapInsert(Value),
    /// Delete the target node from a heap
    HeapDelete,
    /// Sift the target node up; nested only
    HeapifyUp,
    /// Sift the target node down; nested only
    HeapifyDown,
    /// Remove and return the root of a heap
    ExtractMax,
    /// Select the root of a heap
    HeapGetMax,
    /// Sort a heap's values without changing the heap
    HeapSort,
}

impl Operation {
    /// True if the operation acts on a target node
    pub fn needs_node(&self) -> bool {
        matches!(
            self,
            Operation::BstDelete
                | Operation::BstGetMax
                | Operation::BstGetMin
                | Operation::BstPredecessor
                | Operation::BstSuccessor
                | Operation::HeapDelete
                | Operation::HeapifyUp
                | Operation::HeapifyDown
        )
    }

    /// True for sift steps that only run inside another heap operation
    pub fn is_nested_only(&self) -> bool {
        matches!(self, Operation::HeapifyUp | Operation::HeapifyDown)
    }

    /// True for operations on max-heaps
    pub fn is_heap(&self) -> bool {
        matches!(
            self,
            Operation::RandomHeap { .. }
                | Operation::BuildHeap(_)
                | Operation::HeapInsert(_)
                | Operation::HeapDelete
                | Operation::HeapifyUp
                | Operation::HeapifyDown
                | Operation::ExtractMax
                | Operation::HeapGetMax
                | Operation::HeapSort
        )
    }

    /// Short name used in descriptions
    pub fn name(&self) -> &'static str {
        match self {
            Operation::RandomBsTree { .. } => "randomBSTree",
            Operation::BstInsert(_) | Operation::HeapInsert(_) => "insert",
            Operation::BstFind(_) => "find",
            Operation::BstDelete | Operation::HeapDelete => "delete",
            Operation::BstGetMax | Operation::HeapGetMax => "getMax",
            Operation::BstGetMin => "getMin",
            Operation::BstPredecessor => "getPredecessor",
            Operation::BstSuccessor => "getSuccessor",
            Operation::PreorderArray => "toPreorderArray",
            Operation::InorderArray => "toInorderArray",
            Operation::PostorderArray => "toPostorderArray",
            Operation::RandomHeap { .. } => "randomHeap",
            Operation::BuildHeap(_) => "buildHeap",
            Operation::HeapifyUp => "heapifyUp",
            Operation::HeapifyDown => "heapifyDown",
            Operation::ExtractMax => "extractMax",
            Operation::HeapSort => "heapSort",
        }
    }

    fn validate(&self) -> Result<(), AlgorithmError> {
        match *self {
            Operation::RandomBsTree { min, max } | Operation::RandomHeap { min, max }
                if min > max =>
            {
                Err(AlgorithmError::InvalidRange { min, max })
            }
            _ => Ok(()),
        }
    }
}

/// A node reported by a unit, with its value at the time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Found {
    /// Node identity in the live tree
    pub node: NodeId,
    /// Its value
    pub value: Value,
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.node)
    }
}

/// What a unit returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to report
    Done,
    /// A node, or `None` when the search came up empty
    Node(Option<Found>),
    /// An ordered list of nodes
    Nodes(Vec<Found>),
    /// An ordered list of values
    Values(Vec<Value>),
}

impl Outcome {
    /// The reported node, if any
    pub fn node(&self) -> Option<Found> {
        match self {
            Outcome::Node(found) => *found,
            _ => None,
        }
    }

    /// Reported values in order
    pub fn values(&self) -> Vec<Value> {
        match self {
            Outcome::Done | Outcome::Node(None) => Vec::new(),
            Outcome::Node(Some(found)) => vec![found.value],
            Outcome::Nodes(nodes) => nodes.iter().map(|f| f.value).collect(),
            Outcome::Values(values) => values.clone(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Done => write!(f, "done"),
            Outcome::Node(None) => write!(f, "null"),
            Outcome::Node(Some(found)) => write!(f, "{found}"),
            Outcome::Nodes(_) | Outcome::Values(_) => write!(f, "{:?}", self.values()),
        }
    }
}

/// Callback fired at a timeline marker; receives the unit's description
pub type Listener = Box<dyn FnMut(&str)>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    path: IndexPath,
    value: Value,
}

/// Shared execution context handed down to nested units
pub(crate) struct Run<'a> {
    pub(crate) tree: &'a mut BinaryTree<Value>,
    pub(crate) producer: &'a mut dyn AnimationProducer,
    pub(crate) rng: &'a mut dyn RngCore,
}

impl Run<'_> {
    /// Construct and run a nested unit on the live tree
    pub(crate) fn nested(
        &mut self,
        op: Operation,
        target: Option<NodeId>,
    ) -> Result<Outcome, AlgorithmError> {
        let mut unit = AlgorithmUnit::nested(op, self.tree, target)?;
        unit.run(self)
    }

    pub(crate) fn value(&self, id: NodeId) -> Result<Value, AlgorithmError> {
        self.tree
            .value(id)
            .copied()
            .ok_or(AlgorithmError::Structural(StructuralError::UnknownNode(id)))
    }

    pub(crate) fn path(&self, id: NodeId) -> Result<IndexPath, AlgorithmError> {
        Ok(self.tree.path_of(id)?)
    }

    pub(crate) fn found(&self, id: NodeId) -> Result<Found, AlgorithmError> {
        Ok(Found {
            node: id,
            value: self.value(id)?,
        })
    }
}

/// One executable, undoable operation bound to a tree snapshot
pub struct AlgorithmUnit {
    op: Operation,
    target: Option<Target>,
    snapshot: BinaryTree<Value>,
    selected_path: Option<IndexPath>,
    nested: bool,
    redo_calls: u32,
    generated: Option<BinaryTree<Value>>,
    start_listeners: Vec<Listener>,
    end_listeners: Vec<Listener>,
}

impl fmt::Debug for AlgorithmUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmUnit")
            .field("op", &self.op)
            .field("target", &self.target)
            .field("nested", &self.nested)
            .field("redo_calls", &self.redo_calls)
            .field("start_listeners", &self.start_listeners.len())
            .field("end_listeners", &self.end_listeners.len())
            .finish()
    }
}

impl AlgorithmUnit {
    /// Construct a top-level unit
    ///
    /// Takes the snapshot, remembers the producer's selection by path and
    /// clears it. Fails before touching anything if the parameters are
    /// invalid or the operation only runs nested.
    pub fn new(
        op: Operation,
        tree: &BinaryTree<Value>,
        target: Option<NodeId>,
        producer: &mut dyn AnimationProducer,
    ) -> Result<Self, AlgorithmError> {
        if op.is_nested_only() {
            return Err(AlgorithmError::NestedOnly(op.name()));
        }
        let unit = Self::build(op, tree, target, false, producer.selected())?;
        producer.clear_selection();
        Ok(unit)
    }

    /// Construct a unit that runs inside another one
    fn nested(
        op: Operation,
        tree: &BinaryTree<Value>,
        target: Option<NodeId>,
    ) -> Result<Self, AlgorithmError> {
        Self::build(op, tree, target, true, None)
    }

    fn build(
        op: Operation,
        tree: &BinaryTree<Value>,
        target: Option<NodeId>,
        nested: bool,
        selected: Option<NodeId>,
    ) -> Result<Self, AlgorithmError> {
        op.validate()?;
        let target = if op.needs_node() {
            let node = target.ok_or(AlgorithmError::MissingTarget(op.name()))?;
            if !tree.preorder().any(|n| n == node) {
                return Err(AlgorithmError::TargetNotInTree(node));
            }
            let value = tree
                .value(node)
                .copied()
                .ok_or(AlgorithmError::TargetNotInTree(node))?;
            Some(Target {
                path: tree.path_of(node)?,
                value,
            })
        } else {
            None
        };
        let (snapshot, selected_path) = tree.copy_tree_tracking(selected);
        Ok(Self {
            op,
            target,
            snapshot,
            selected_path,
            nested,
            redo_calls: 0,
            generated: None,
            start_listeners: Vec::new(),
            end_listeners: Vec::new(),
        })
    }

    /// Operation this unit runs
    pub fn operation(&self) -> &Operation {
        &self.op
    }

    /// True for units invoked inside another unit
    pub fn is_subalgorithm(&self) -> bool {
        self.nested
    }

    /// How many times the unit has executed
    pub fn redo_calls(&self) -> u32 {
        self.redo_calls
    }

    /// Tree as it was when the unit was constructed
    pub fn snapshot(&self) -> &BinaryTree<Value> {
        &self.snapshot
    }

    /// Positional index of the target node, `None` if it has none or sits
    /// deeper than a `usize` index reaches
    pub fn target_index(&self) -> Option<usize> {
        self.target.as_ref().and_then(|t| t.path.to_index())
    }

    /// Root-to-node path of the target node
    pub fn target_path(&self) -> Option<&IndexPath> {
        self.target.as_ref().map(|t| &t.path)
    }

    /// Path of the selection captured at construction
    pub fn selected_path(&self) -> Option<&IndexPath> {
        self.selected_path.as_ref()
    }

    /// Run (or re-run) the unit against the live tree
    pub fn execute(
        &mut self,
        tree: &mut BinaryTree<Value>,
        producer: &mut dyn AnimationProducer,
        rng: &mut dyn RngCore,
    ) -> Result<Outcome, AlgorithmError> {
        let mut run = Run {
            tree,
            producer,
            rng,
        };
        self.run(&mut run)
    }

    fn run(&mut self, run: &mut Run<'_>) -> Result<Outcome, AlgorithmError> {
        self.redo_calls += 1;
        debug!(
            op = self.op.name(),
            nested = self.nested,
            redo_calls = self.redo_calls,
            "unit start"
        );
        let target = match &self.target {
            Some(t) => Some(
                t.path
                    .resolve(run.tree)
                    .ok_or_else(|| AlgorithmError::TargetLost(t.path.clone()))?,
            ),
            None => None,
        };

        if !self.nested {
            let label = self.to_string();
            run.producer.reset_timeline(&label, run.tree);
            run.producer.remove_array();
            self.restore_selection(run);
        }

        let outcome = self.body(run, target)?;

        if self.shows_result() {
            run.producer.show_tree(1.0);
        }
        if !self.nested {
            run.producer.finish_timeline();
        }
        debug!(op = self.op.name(), %outcome, "unit finished");
        Ok(outcome)
    }

    fn restore_selection(&self, run: &mut Run<'_>) {
        let Some(path) = &self.selected_path else {
            run.producer.select(None, false);
            return;
        };
        match path.resolve(run.tree) {
            Some(node) if run.producer.selected() != Some(node) => {
                run.producer.select(Some(node), true);
            }
            Some(_) => {}
            None => warn!(%path, "selected node no longer resolvable"),
        }
    }

    fn shows_result(&self) -> bool {
        match self.op {
            Operation::HeapifyUp
            | Operation::HeapifyDown
            | Operation::BuildHeap(_)
            | Operation::ExtractMax => false,
            Operation::BstGetMax
            | Operation::BstGetMin
            | Operation::BstPredecessor
            | Operation::BstSuccessor
            | Operation::HeapDelete => !self.nested,
            _ => true,
        }
    }

    fn body(
        &mut self,
        run: &mut Run<'_>,
        target: Option<NodeId>,
    ) -> Result<Outcome, AlgorithmError> {
        let node = || target.ok_or(AlgorithmError::MissingTarget(self.op.name()));
        match &self.op {
            Operation::RandomBsTree { min, max } => {
                let tree = match &self.generated {
                    Some(cached) => cached.copy_tree(),
                    None => {
                        let fresh = random_bs_tree(run.rng, *min, *max);
                        self.generated = Some(fresh.copy_tree());
                        fresh
                    }
                };
                bst::install(run, tree)
            }
            Operation::BstInsert(value) => bst::insert(run, *value),
            Operation::BstFind(value) => bst::find(run, *value),
            Operation::BstDelete => bst::delete(run, node()?),
            Operation::BstGetMax => bst::extreme(run, node()?, Side::Right),
            Operation::BstGetMin => bst::extreme(run, node()?, Side::Left),
            Operation::BstPredecessor => bst::neighbour(run, node()?, Side::Left),
            Operation::BstSuccessor => bst::neighbour(run, node()?, Side::Right),
            Operation::PreorderArray => bst::traverse(run, bst::Order::Pre),
            Operation::InorderArray => bst::traverse(run, bst::Order::In),
            Operation::PostorderArray => bst::traverse(run, bst::Order::Post),
            Operation::RandomHeap { min, max } => {
                let tree = match &self.generated {
                    Some(cached) => cached.copy_tree(),
                    None => {
                        let values = random_heap_values(run.rng, *min, *max);
                        let fresh = BinaryTree::from_values(values);
                        self.generated = Some(fresh.copy_tree());
                        fresh
                    }
                };
                heap::install(run, tree)
            }
            Operation::BuildHeap(values) => heap::build(run, values),
            Operation::HeapInsert(value) => heap::insert(run, *value),
            Operation::HeapDelete => heap::delete(run, node()?),
            Operation::HeapifyUp => heap::heapify_up(run, node()?),
            Operation::HeapifyDown => heap::heapify_down(run, node()?),
            Operation::ExtractMax => heap::extract_max(run),
            Operation::HeapGetMax => heap::get_max(run),
            Operation::HeapSort => heap::sort(run, &self.snapshot),
        }
    }

    /// Replace the live tree with a copy of the snapshot
    pub fn undo(&self, tree: &mut BinaryTree<Value>) {
        debug!(op = self.op.name(), "undo");
        *tree = self.snapshot.copy_tree();
    }

    /// Register a callback for the start marker
    pub fn add_start_listener(&mut self, listener: impl FnMut(&str) + 'static) {
        self.start_listeners.push(Box::new(listener));
    }

    /// Register a callback for the end marker
    pub fn add_end_listener(&mut self, listener: impl FnMut(&str) + 'static) {
        self.end_listeners.push(Box::new(listener));
    }

    /// Fire start listeners (never for nested units)
    pub fn fire_start_listeners(&mut self) {
        self.fire(true);
    }

    /// Fire end listeners (never for nested units)
    pub fn fire_end_listeners(&mut self) {
        self.fire(false);
    }

    fn fire(&mut self, start: bool) {
        if self.nested {
            return;
        }
        let label = self.to_string();
        let listeners = if start {
            &mut self.start_listeners
        } else {
            &mut self.end_listeners
        };
        for listener in listeners.iter_mut() {
            listener(&label);
        }
    }
}

impl fmt::Display for AlgorithmUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.op.name();
        match (&self.op, &self.generated) {
            (Operation::RandomBsTree { .. } | Operation::RandomHeap { .. }, Some(tree)) => {
                let slots = tree.to_value_array().unwrap_or_default();
                let parts: Vec<String> = slots
                    .iter()
                    .map(|slot| slot.map_or_else(|| "n".to_string(), |v| v.to_string()))
                    .collect();
                write!(f, "{name}({})", parts.join(", "))
            }
            (Operation::RandomBsTree { min, max } | Operation::RandomHeap { min, max }, None) => {
                write!(f, "{name}(min: {min}, max: {max})")
            }
            (Operation::BstInsert(v) | Operation::BstFind(v) | Operation::HeapInsert(v), _) => {
                write!(f, "{name}(value: {v})")
            }
            (Operation::BuildHeap(values), _) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{name}({})", parts.join(", "))
            }
            _ => match &self.target {
                Some(t) => write!(f, "{name}(value: {}, index: {})", t.value, t.path),
                None => write!(f, "{name}()"),
            },
        }
    }
}
