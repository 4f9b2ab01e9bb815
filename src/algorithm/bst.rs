//! Binary search tree routines
//!
//! Ties route right: a value equal to a node's value belongs in its right
//! subtree.

use tracing::trace;

use super::{AlgorithmError, Found, Operation, Outcome, Run, Value};
use crate::animation::{Actor, Comparison, Glyph, Place};
use crate::tree::{BinaryTree, NodeId, Side};

/// Traversal order for the array routines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Order {
    Pre,
    In,
    Post,
}

/// Swap in a generated tree
pub(crate) fn install(
    run: &mut Run<'_>,
    tree: BinaryTree<Value>,
) -> Result<Outcome, AlgorithmError> {
    *run.tree = tree;
    run.producer.redraw_tree(run.tree);
    Ok(Outcome::Done)
}

pub(crate) fn insert(run: &mut Run<'_>, value: Value) -> Result<Outcome, AlgorithmError> {
    let node = run.tree.new_node(value);
    let actor = Actor::Node(node);
    run.producer
        .show(actor, Glyph::Value(value), Place::next_to_index(0));

    let Some(mut current) = run.tree.root() else {
        run.tree.set_root(Some(node))?;
        run.producer.move_to(actor, Place::index(0));
        run.producer.select(None, false);
        return Ok(Outcome::Node(Some(Found { node, value })));
    };

    loop {
        let current_value = run.value(current)?;
        let side = if value >= current_value {
            run.producer
                .compare(actor, Comparison::GreaterOrEqual, Actor::Node(current));
            Side::Right
        } else {
            run.producer
                .compare(actor, Comparison::Less, Actor::Node(current));
            Side::Left
        };
        match run.tree.child(current, side) {
            Some(next) => {
                run.producer.move_to(actor, Place::NextTo(Actor::Node(next)));
                current = next;
            }
            None => {
                let slot = run.path(current)?.child(side);
                run.tree.set_child(current, side, Some(node))?;
                trace!(value, %slot, "inserted leaf");
                run.producer.move_to(actor, Place::Index(slot));
                run.producer.add_edge(current, node);
                break;
            }
        }
    }

    run.producer.select(None, false);
    Ok(Outcome::Node(Some(Found { node, value })))
}

pub(crate) fn find(run: &mut Run<'_>, value: Value) -> Result<Outcome, AlgorithmError> {
    let Some(mut current) = run.tree.root() else {
        return Ok(Outcome::Node(None));
    };
    let probe = run.producer.new_probe();
    run.producer
        .show(probe, Glyph::Value(value), Place::next_to_index(0));

    loop {
        let current_value = run.value(current)?;
        let here = Actor::Node(current);
        if value == current_value {
            run.producer.compare(probe, Comparison::Equal, here);
            run.producer.move_to(probe, Place::At(here));
            run.producer.remove(probe, false);
            run.producer.select(Some(current), true);
            return Ok(Outcome::Node(Some(run.found(current)?)));
        }
        let side = if value > current_value {
            run.producer.compare(probe, Comparison::Greater, here);
            Side::Right
        } else {
            run.producer.compare(probe, Comparison::Less, here);
            Side::Left
        };
        match run.tree.child(current, side) {
            Some(next) => {
                run.producer.move_to(probe, Place::NextTo(Actor::Node(next)));
                current = next;
            }
            None => {
                let slot = run.path(current)?.child(side);
                run.producer.move_to(probe, Place::NextToIndex(slot));
                run.producer.remove(probe, true);
                run.producer.select(None, false);
                return Ok(Outcome::Node(None));
            }
        }
    }
}

pub(crate) fn delete(run: &mut Run<'_>, node: NodeId) -> Result<Outcome, AlgorithmError> {
    let deleted = run.found(node)?;

    if run.tree.left(node).is_some() && run.tree.right(node).is_some() {
        let successor = run
            .nested(Operation::BstSuccessor, Some(node))?
            .node()
            .map(|f| f.node)
            .ok_or(AlgorithmError::TargetLost(run.path(node)?))?;
        run.tree.swap_nodes(node, successor)?;
        let moved = (node, run.path(node)?);
        let promoted = (successor, run.path(successor)?);
        run.producer.swap(moved, promoted);
    }

    let parent = run.tree.parent(node);
    let child = run.tree.left(node).or(run.tree.right(node));
    run.producer.remove(Actor::Node(node), true);
    if let Some(p) = parent {
        run.producer.remove_edge(p, node);
    }

    match child {
        Some(child) => {
            run.producer.remove_edge(node, child);
            match parent {
                Some(p) => {
                    let side = run.tree.side_of(node).unwrap_or(Side::Left);
                    run.tree.set_child(p, side, Some(child))?;
                }
                None => {
                    run.tree.detach(child);
                    run.tree.set_root(Some(child))?;
                }
            }
            let moves = run
                .tree
                .inorder_from(child)
                .map(|n| run.tree.path_of(n).map(|path| (n, path)))
                .collect::<Result<Vec<_>, _>>()?;
            run.producer.move_subtree(&moves);
            if let Some(p) = parent {
                run.producer.add_edge(p, child);
            }
        }
        None => match parent {
            Some(_) => run.tree.detach(node),
            None => run.tree.set_root(None)?,
        },
    }

    run.producer.select(None, false);
    Ok(Outcome::Node(Some(deleted)))
}

/// Walk to the extreme node on `side` below `node`: right for max, left for min
pub(crate) fn extreme(
    run: &mut Run<'_>,
    node: NodeId,
    side: Side,
) -> Result<Outcome, AlgorithmError> {
    let glyph = match side {
        Side::Left => Glyph::DownLeft,
        Side::Right => Glyph::DownRight,
    };
    let probe = run.producer.new_probe();
    run.producer
        .show(probe, glyph, Place::NextTo(Actor::Node(node)));

    let mut current = node;
    while let Some(next) = run.tree.child(current, side) {
        run.producer.relabel(probe, glyph, false);
        run.producer.move_to(probe, Place::NextTo(Actor::Node(next)));
        current = next;
    }

    run.producer.relabel(probe, glyph, true);
    run.producer.move_to(probe, Place::At(Actor::Node(current)));
    run.producer.remove(probe, false);
    run.producer.select(Some(current), true);
    Ok(Outcome::Node(Some(run.found(current)?)))
}

/// In-order neighbour on `side`: left for predecessor, right for successor
pub(crate) fn neighbour(
    run: &mut Run<'_>,
    node: NodeId,
    side: Side,
) -> Result<Outcome, AlgorithmError> {
    let here = Actor::Node(node);

    if let Some(child) = run.tree.child(node, side) {
        let (glyph, op) = match side {
            Side::Left => (Glyph::DownLeft, Operation::BstGetMax),
            Side::Right => (Glyph::DownRight, Operation::BstGetMin),
        };
        let probe = run.producer.new_probe();
        run.producer.show(probe, glyph, Place::NextTo(here));
        run.producer.move_to(probe, Place::NextTo(Actor::Node(child)));
        run.producer.remove(probe, false);
        return run.nested(op, Some(child));
    }

    let probe = run.producer.new_probe();
    run.producer.show(probe, Glyph::Up, Place::NextTo(here));
    // Climbing out of a `side` child is the wrong direction; the answer is
    // the first ancestor entered from the opposite side.
    let mut current = node;
    loop {
        let Some(parent) = run.tree.parent(current) else {
            run.producer.relabel(probe, Glyph::Up, true);
            run.producer.remove(probe, true);
            run.producer.select(None, false);
            return Ok(Outcome::Node(None));
        };
        let from = run.tree.side_of(current).unwrap_or(Side::Left);
        let glyph = match from {
            Side::Right => Glyph::UpLeft,
            Side::Left => Glyph::UpRight,
        };
        run.producer.relabel(probe, glyph, false);
        run.producer.move_to(probe, Place::NextTo(Actor::Node(parent)));
        if from != side {
            run.producer.relabel(probe, glyph, true);
            run.producer.move_to(probe, Place::At(Actor::Node(parent)));
            run.producer.remove(probe, false);
            run.producer.select(Some(parent), true);
            return Ok(Outcome::Node(Some(run.found(parent)?)));
        }
        current = parent;
    }
}

pub(crate) fn traverse(run: &mut Run<'_>, order: Order) -> Result<Outcome, AlgorithmError> {
    let count = run.tree.count();
    run.producer.add_array(count);
    let probe = run.producer.new_probe();
    run.producer.show(probe, Glyph::Down, Place::next_to_index(0));

    let mut visited = Vec::with_capacity(count);
    match run.tree.root() {
        Some(root) => {
            walk(run, order, root, probe, &mut visited)?;
            run.producer.remove(probe, false);
        }
        None => {
            run.producer.relabel(probe, Glyph::Down, true);
            run.producer.remove(probe, true);
        }
    }
    Ok(Outcome::Nodes(visited))
}

fn walk(
    run: &mut Run<'_>,
    order: Order,
    node: NodeId,
    probe: Actor,
    visited: &mut Vec<Found>,
) -> Result<(), AlgorithmError> {
    if order == Order::Pre {
        visit(run, node, visited)?;
    }
    descend(run, order, node, Side::Left, probe, visited)?;
    if order == Order::In {
        visit(run, node, visited)?;
    }
    descend(run, order, node, Side::Right, probe, visited)?;
    if order == Order::Post {
        visit(run, node, visited)?;
    }
    Ok(())
}

fn descend(
    run: &mut Run<'_>,
    order: Order,
    node: NodeId,
    side: Side,
    probe: Actor,
    visited: &mut Vec<Found>,
) -> Result<(), AlgorithmError> {
    let glyph = match side {
        Side::Left => Glyph::DownLeft,
        Side::Right => Glyph::DownRight,
    };
    let child = run.tree.child(node, side);
    run.producer.relabel(probe, glyph, child.is_none());
    if let Some(child) = child {
        run.producer.move_to(probe, Place::NextTo(Actor::Node(child)));
        walk(run, order, child, probe, visited)?;
        run.producer.relabel(probe, Glyph::Up, false);
        run.producer.move_to(probe, Place::NextTo(Actor::Node(node)));
    }
    Ok(())
}

fn visit(run: &mut Run<'_>, node: NodeId, visited: &mut Vec<Found>) -> Result<(), AlgorithmError> {
    let found = run.found(node)?;
    let slot = visited.len();
    let ghost = run.producer.new_probe();
    run.producer
        .show(ghost, Glyph::Value(found.value), Place::At(Actor::Node(node)));
    run.producer.move_to(ghost, Place::ArraySlot(slot));
    run.producer.show_tree(0.25);
    run.producer.remove(ghost, false);
    run.producer.insert_into_array(slot, found.value);
    visited.push(found);
    Ok(())
}
