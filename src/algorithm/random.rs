//! Random search trees and heaps
//!
//! Search trees grow from a root near the middle of the interval. Each
//! child draws from the half of the remaining range nearest its parent, so
//! siblings never overlap and search order holds by construction. Branching
//! gets less likely with depth and stops after level 4.

use rand::{Rng, RngCore};
use tracing::debug;

use super::Value;
use crate::tree::{BinaryTree, NodeId, Side};

/// Most nodes a random heap will hold
pub const MAX_RANDOM_HEAP: usize = 31;

fn branch_chance(level: u32, rng: &mut dyn RngCore) -> f64 {
    if level <= 3 && rng.gen::<f64>() < 0.5 {
        return 1.0;
    }
    match level {
        1 => 0.95,
        2 => 0.7,
        3 => 0.4,
        4 => 0.2,
        _ => 0.0,
    }
}

/// Half of a positive distance, rounding halves up
fn half(distance: Value) -> Value {
    distance / 2 + distance % 2
}

/// Random search tree over `min..=max` (caller guarantees `min <= max`)
pub fn random_bs_tree(rng: &mut dyn RngCore, min: Value, max: Value) -> BinaryTree<Value> {
    let mut tree = BinaryTree::new();
    let eps = (max as f64 - min as f64) / 4.0;
    let low = (min as f64 + eps).floor() as Value;
    let high = (max as f64 - eps).ceil() as Value;
    let root_value = rng.gen_range(low.min(high)..=high.max(low));
    let root = tree.new_node(root_value);
    // root is parentless, set_root cannot fail
    if tree.set_root(Some(root)).is_ok() {
        grow(&mut tree, rng, root, root_value, 1, min, max);
    }
    debug!(min, max, count = tree.count(), "generated random search tree");
    tree
}

fn grow(
    tree: &mut BinaryTree<Value>,
    rng: &mut dyn RngCore,
    node: NodeId,
    value: Value,
    level: u32,
    mut min: Value,
    mut max: Value,
) {
    if min >= value.saturating_sub(1) || value.saturating_add(1) >= max {
        return;
    }
    let chance = branch_chance(level, rng);

    if chance > rng.gen::<f64>() {
        let eps = half(value.saturating_sub(min));
        let left_value = rng.gen_range(min + eps..=value - 1);
        if left_value == min {
            min += 1;
        }
        let left = tree.new_node(left_value);
        if tree.set_child(node, Side::Left, Some(left)).is_ok() {
            grow(tree, rng, left, left_value, level + 1, min, value - 1);
        }
    }

    if chance > rng.gen::<f64>() {
        let eps = half(max.saturating_sub(value));
        let right_value = rng.gen_range(value + 1..=max - eps);
        if right_value == max {
            max -= 1;
        }
        let right = tree.new_node(right_value);
        if tree.set_child(node, Side::Right, Some(right)).is_ok() {
            grow(tree, rng, right, right_value, level + 1, value + 1, max);
        }
    }
}

/// Distinct random values over `min..=max` arranged in max-heap order
///
/// Draws between 1 and [`MAX_RANDOM_HEAP`] values (never more than the
/// interval holds) and heapifies them bottom-up.
pub fn random_heap_values(rng: &mut dyn RngCore, min: Value, max: Value) -> Vec<Value> {
    let span = (max as i128 - min as i128 + 1).clamp(1, MAX_RANDOM_HEAP as i128) as usize;
    let count = rng.gen_range(1..=span);
    let mut values: Vec<Value> = Vec::with_capacity(count);
    while values.len() < count {
        let candidate = rng.gen_range(min..=max);
        if !values.contains(&candidate) {
            values.push(candidate);
        }
    }
    heapify_array(&mut values);
    debug!(min, max, count, "generated random heap");
    values
}

/// Bottom-up max-heapify of a level-order array
pub fn heapify_array(values: &mut [Value]) {
    for start in (0..values.len() / 2).rev() {
        let mut i = start;
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut largest = i;
            if left < values.len() && values[left] > values[largest] {
                largest = left;
            }
            if right < values.len() && values[right] > values[largest] {
                largest = right;
            }
            if largest == i {
                break;
            }
            values.swap(i, largest);
            i = largest;
        }
    }
}
