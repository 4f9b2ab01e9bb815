//! Max-heap routines
//!
//! Heaps are complete trees: nodes occupy positional indices `0..count`
//! with no gaps, so the next free slot is always `count` and the last
//! node is always at `count - 1`.

use tracing::trace;

use super::{AlgorithmError, Found, Operation, Outcome, Run, Value};
use crate::animation::{Actor, Comparison, Glyph, Place};
use crate::tree::{parent_index, BinaryTree, IndexPath, NodeId, Side};

fn node_at(run: &Run<'_>, index: usize) -> Result<NodeId, AlgorithmError> {
    run.tree
        .node_at(index)
        .ok_or(AlgorithmError::IncompleteHeap(index))
}

/// Node count of a tree whose nodes fill indices `0..count`, or the first
/// empty index
fn require_complete(run: &Run<'_>) -> Result<usize, AlgorithmError> {
    let count = run.tree.count();
    if run.tree.is_complete() {
        return Ok(count);
    }
    let gap = (0..count)
        .find(|&i| run.tree.node_at(i).is_none())
        .unwrap_or(count);
    Err(AlgorithmError::IncompleteHeap(gap))
}

/// Show a comparison with the operands in their on-screen order
fn compare_in_place(
    run: &mut Run<'_>,
    upper: NodeId,
    lower: NodeId,
) -> Result<(), AlgorithmError> {
    let upper_value = run.value(upper)?;
    let lower_value = run.value(lower)?;
    match run.tree.side_of(lower) {
        Some(Side::Left) => run.producer.compare(
            Actor::Node(lower),
            Comparison::between(lower_value, upper_value),
            Actor::Node(upper),
        ),
        _ => run.producer.compare(
            Actor::Node(upper),
            Comparison::between(upper_value, lower_value),
            Actor::Node(lower),
        ),
    }
    Ok(())
}

fn swap(run: &mut Run<'_>, a: NodeId, b: NodeId) -> Result<(), AlgorithmError> {
    run.tree.swap_nodes(a, b)?;
    let a_at = (a, run.path(a)?);
    let b_at = (b, run.path(b)?);
    run.producer.swap(a_at, b_at);
    Ok(())
}

/// Swap in a generated heap
pub(crate) fn install(
    run: &mut Run<'_>,
    tree: BinaryTree<Value>,
) -> Result<Outcome, AlgorithmError> {
    *run.tree = tree;
    run.producer.redraw_tree(run.tree);
    Ok(Outcome::Done)
}

pub(crate) fn heapify_up(run: &mut Run<'_>, node: NodeId) -> Result<Outcome, AlgorithmError> {
    while let Some(parent) = run.tree.parent(node) {
        compare_in_place(run, parent, node)?;
        if run.value(parent)? >= run.value(node)? {
            break;
        }
        swap(run, node, parent)?;
    }
    Ok(Outcome::Done)
}

pub(crate) fn heapify_down(run: &mut Run<'_>, node: NodeId) -> Result<Outcome, AlgorithmError> {
    loop {
        let greater = match (run.tree.left(node), run.tree.right(node)) {
            (None, None) => break,
            (Some(left), Some(right)) => {
                let (lv, rv) = (run.value(left)?, run.value(right)?);
                if lv >= rv {
                    run.producer.compare(
                        Actor::Node(left),
                        Comparison::GreaterOrEqual,
                        Actor::Node(right),
                    );
                    left
                } else {
                    run.producer
                        .compare(Actor::Node(left), Comparison::Less, Actor::Node(right));
                    right
                }
            }
            (Some(only), None) | (None, Some(only)) => only,
        };
        compare_in_place(run, node, greater)?;
        if run.value(node)? >= run.value(greater)? {
            break;
        }
        swap(run, node, greater)?;
    }
    Ok(Outcome::Done)
}

pub(crate) fn build(run: &mut Run<'_>, values: &[Value]) -> Result<Outcome, AlgorithmError> {
    run.tree.build(values.iter().copied());
    run.producer.redraw_tree(run.tree);
    run.producer.show_tree(1.0);
    for index in (0..values.len() / 2).rev() {
        let node = node_at(run, index)?;
        run.nested(Operation::HeapifyDown, Some(node))?;
    }
    Ok(Outcome::Done)
}

pub(crate) fn insert(run: &mut Run<'_>, value: Value) -> Result<Outcome, AlgorithmError> {
    let index = require_complete(run)?;
    let node = run.tree.new_node(value);
    let actor = Actor::Node(node);

    if index == 0 {
        run.tree.set_root(Some(node))?;
        run.producer.show(actor, Glyph::Value(value), Place::index(0));
        run.producer.select(Some(node), true);
        run.producer.select(None, false);
        return Ok(Outcome::Node(Some(Found { node, value })));
    }

    run.producer
        .show(actor, Glyph::Value(value), Place::index(index));
    run.producer.select(Some(node), true);
    let parent_slot = parent_index(index).ok_or(AlgorithmError::IncompleteHeap(index))?;
    let parent = node_at(run, parent_slot)?;
    let side = Side::of_index(index).unwrap_or(Side::Left);
    run.tree.set_child(parent, side, Some(node))?;
    run.producer.add_edge(parent, node);
    run.producer.show_tree(1.0);
    run.nested(Operation::HeapifyUp, Some(node))?;
    run.producer.select(None, false);
    trace!(value, index, "heap insert");
    Ok(Outcome::Node(Some(run.found(node)?)))
}

pub(crate) fn delete(run: &mut Run<'_>, node: NodeId) -> Result<Outcome, AlgorithmError> {
    let deleted = run.found(node)?;
    let count = require_complete(run)?;

    if count == 1 {
        run.tree.set_root(None)?;
        run.producer.remove(Actor::Node(node), true);
        return Ok(Outcome::Node(Some(deleted)));
    }

    let last = node_at(run, count - 1)?;
    if node != last {
        swap(run, node, last)?;
    }
    if let Some(parent) = run.tree.parent(node) {
        run.producer.remove_edge(parent, node);
    }
    run.tree.detach(node);
    run.producer.remove(Actor::Node(node), true);

    if node != last {
        run.nested(Operation::HeapifyUp, Some(last))?;
        run.nested(Operation::HeapifyDown, Some(last))?;
    }
    Ok(Outcome::Node(Some(deleted)))
}

pub(crate) fn extract_max(run: &mut Run<'_>) -> Result<Outcome, AlgorithmError> {
    let Some(root) = run.tree.root() else {
        return Ok(Outcome::Node(None));
    };
    let max = run.found(root)?;
    run.nested(Operation::HeapDelete, Some(root))?;
    Ok(Outcome::Node(Some(max)))
}

pub(crate) fn get_max(run: &mut Run<'_>) -> Result<Outcome, AlgorithmError> {
    let root = run.tree.root();
    run.producer.select(root, true);
    match root {
        Some(root) => Ok(Outcome::Node(Some(run.found(root)?))),
        None => Ok(Outcome::Node(None)),
    }
}

/// Repeatedly move the root out to the array panel, then restore the heap
///
/// Each round relocates the last node into the root's structural position
/// (taking over the root's children) instead of swapping values, so the
/// extracted root keeps its identity while it travels to the panel.
pub(crate) fn sort(
    run: &mut Run<'_>,
    snapshot: &BinaryTree<Value>,
) -> Result<Outcome, AlgorithmError> {
    let count = require_complete(run)?;
    run.producer.add_array(count);
    let mut extracted: Vec<Value> = Vec::with_capacity(count);

    for index in (1..count).rev() {
        let root = node_at(run, 0)?;
        let node = node_at(run, index)?;
        let root_value = run.value(root)?;
        run.producer.select(Some(node), true);
        run.producer.show_tree(1.0);

        if let Some(parent) = run.tree.parent(node) {
            run.producer.remove_edge(parent, node);
        }
        run.tree.detach(node);
        let left = run.tree.left(root);
        let right = run.tree.right(root);
        for (side, child) in [(Side::Left, left), (Side::Right, right)] {
            if let Some(child) = child {
                run.producer.remove_edge(root, child);
                run.tree.set_child(node, side, Some(child))?;
                run.producer.add_edge(node, child);
            }
        }
        run.tree.set_root(Some(node))?;
        run.producer
            .swap((node, IndexPath::new()), (root, IndexPath::from_index(index)));

        let ghost = run.producer.new_probe();
        run.producer
            .show(ghost, Glyph::Value(root_value), Place::index(index));
        run.producer.remove(Actor::Node(root), false);
        run.producer.move_to(ghost, Place::ArraySlot(index));
        run.producer.show_tree(0.25);
        run.producer.remove(ghost, false);
        run.producer.insert_into_array(index, root_value);
        extracted.push(root_value);

        run.nested(Operation::HeapifyDown, Some(node))?;
    }

    if let Some(root) = run.tree.root() {
        let value = run.value(root)?;
        run.producer.remove(Actor::Node(root), false);
        run.producer.insert_into_array(0, value);
        extracted.push(value);
    }

    *run.tree = snapshot.copy_tree();
    run.producer.select(None, false);
    run.producer.redraw_tree(run.tree);
    extracted.reverse();
    Ok(Outcome::Values(extracted))
}

#[cfg(test)]
mod tests {
    use super::super::AlgorithmUnit;
    use super::*;
    use crate::animation::TimelineProducer;
    use crate::config::SessionConfig;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn run_op(
        tree: &mut BinaryTree<Value>,
        op: Operation,
        target: Option<NodeId>,
    ) -> Outcome {
        let mut producer = TimelineProducer::new(&SessionConfig::default());
        let mut rng = SmallRng::seed_from_u64(5);
        let mut unit = AlgorithmUnit::new(op, tree, target, &mut producer).unwrap();
        unit.execute(tree, &mut producer, &mut rng).unwrap()
    }

    fn heap(values: &[Value]) -> BinaryTree<Value> {
        let mut tree = BinaryTree::new();
        run_op(&mut tree, Operation::BuildHeap(values.to_vec()), None);
        tree
    }

    #[test]
    fn test_build_heap_orders_values() {
        let tree = heap(&[3, 1, 4, 1, 5]);
        assert!(tree.satisfies_heap_order());
        assert!(tree.is_complete());
        assert_eq!(tree.to_string(), "[5, 3, 4, 1, 1]");
    }

    #[test]
    fn test_insert_sifts_up() {
        let mut tree = heap(&[5, 3, 4]);
        run_op(&mut tree, Operation::HeapInsert(9), None);
        assert_eq!(tree.to_string(), "[9, 5, 4, 3]");
    }

    #[test]
    fn test_insert_into_empty_heap() {
        let mut tree = BinaryTree::new();
        let found = run_op(&mut tree, Operation::HeapInsert(2), None).node();
        assert_eq!(found.map(|f| f.value), Some(2));
        assert_eq!(tree.count(), 1);
    }

    #[test]
    fn test_delete_inner_node() {
        let mut tree = heap(&[9, 8, 7, 1, 2, 6, 5]);
        let eight = tree.node_at(1);
        run_op(&mut tree, Operation::HeapDelete, eight);
        assert_eq!(tree.count(), 6);
        assert!(tree.satisfies_heap_order());
        assert!(tree.is_complete());
        assert!(!tree.values_of(tree.preorder()).contains(&8));
    }

    #[test]
    fn test_delete_last_and_only() {
        let mut tree = heap(&[4, 2]);
        let last = tree.node_at(1);
        run_op(&mut tree, Operation::HeapDelete, last);
        assert_eq!(tree.to_string(), "[4]");
        let root = tree.root();
        run_op(&mut tree, Operation::HeapDelete, root);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_extract_max_returns_root() {
        let mut tree = heap(&[3, 1, 4, 1, 5]);
        let max = run_op(&mut tree, Operation::ExtractMax, None).node().unwrap();
        assert_eq!(max.value, 5);
        assert_eq!(tree.count(), 4);
        assert!(tree.satisfies_heap_order());
    }

    #[test]
    fn test_sort_restores_shape() {
        let mut tree = heap(&[3, 1, 4, 1, 5]);
        let before = tree.to_value_array().unwrap();
        let sorted = run_op(&mut tree, Operation::HeapSort, None);
        assert_eq!(sorted, Outcome::Values(vec![1, 1, 3, 4, 5]));
        assert_eq!(tree.to_value_array().unwrap(), before);
    }

    #[test]
    fn test_sort_empty_heap() {
        let mut tree = BinaryTree::new();
        assert_eq!(
            run_op(&mut tree, Operation::HeapSort, None),
            Outcome::Values(Vec::new())
        );
    }

    #[test]
    fn test_heapify_down_from_root() {
        let mut tree = BinaryTree::from_values([1, 5, 3]);
        let root = tree.root().unwrap();
        let mut producer = TimelineProducer::new(&SessionConfig::default());
        let mut rng = SmallRng::seed_from_u64(5);
        let mut run = Run {
            tree: &mut tree,
            producer: &mut producer,
            rng: &mut rng,
        };
        heapify_down(&mut run, root).unwrap();
        assert_eq!(tree.to_string(), "[5, 1, 3]");
    }

    #[test]
    fn test_heapify_only_runs_nested() {
        let tree = BinaryTree::from_values([1, 5, 3]);
        let mut producer = TimelineProducer::new(&SessionConfig::default());
        for op in [Operation::HeapifyUp, Operation::HeapifyDown] {
            let name = op.name();
            let err = AlgorithmUnit::new(op, &tree, tree.root(), &mut producer).unwrap_err();
            assert_eq!(err, AlgorithmError::NestedOnly(name));
        }
        assert!(producer.timeline().is_empty());
    }

    #[test]
    fn test_gapped_tree_rejected_before_mutation() {
        // [5, n, 8]
        let mut tree = BinaryTree::from_values([5]);
        let root = tree.root().unwrap();
        let eight = tree.new_node(8);
        tree.set_right(root, Some(eight)).unwrap();
        let before = tree.to_string();

        let mut producer = TimelineProducer::new(&SessionConfig::default());
        let mut rng = SmallRng::seed_from_u64(5);
        for (op, target) in [
            (Operation::HeapInsert(1), None),
            (Operation::HeapDelete, Some(eight)),
            (Operation::HeapSort, None),
            (Operation::ExtractMax, None),
        ] {
            let mut unit = AlgorithmUnit::new(op, &tree, target, &mut producer).unwrap();
            let err = unit.execute(&mut tree, &mut producer, &mut rng).unwrap_err();
            assert_eq!(err, AlgorithmError::IncompleteHeap(1));
            assert_eq!(tree.to_string(), before);
        }
    }
}
