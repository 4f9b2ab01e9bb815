//! Search tree operations through a session

use treestep::{Operation, Outcome, StepAction};
use test_helpers::*;

const SAMPLE: [i64; 7] = [5, 3, 8, 1, 4, 7, 9];

#[test]
fn test_insert_builds_search_tree() {
    let session = bst_session(&[5, 3, 8, 1]);
    assert_eq!(
        level_values(session.tree()),
        vec![Some(5), Some(3), Some(8), Some(1)]
    );
    assert_eq!(inorder_values(session.tree()), vec![1, 3, 5, 8]);
}

#[test]
fn test_equal_values_go_right() {
    let session = bst_session(&[5, 5]);
    assert_eq!(level_values(session.tree()), vec![Some(5), None, Some(5)]);
}

#[test]
fn test_traversal_arrays() {
    let mut session = bst_session(&[5, 3, 8, 1]);
    let pre = session.submit(Operation::PreorderArray, None).unwrap();
    assert_eq!(pre.values(), vec![5, 3, 1, 8]);
    let ino = session.submit(Operation::InorderArray, None).unwrap();
    assert_eq!(ino.values(), vec![1, 3, 5, 8]);
    let post = session.submit(Operation::PostorderArray, None).unwrap();
    assert_eq!(post.values(), vec![1, 3, 8, 5]);

    let filled = session
        .timeline()
        .steps()
        .iter()
        .filter(|s| matches!(s.action, StepAction::InsertIntoArray { .. }))
        .count();
    assert_eq!(filled, 4);
}

#[test]
fn test_find_selects_match() {
    let mut session = bst_session(&SAMPLE);
    let found = session.submit(Operation::BstFind(4), None).unwrap();
    let expected = node_with(session.tree(), 4);
    assert_eq!(found.node().map(|f| f.node), Some(expected));
    assert_eq!(session.selected_node(), Some(expected));
}

#[test]
fn test_find_missing_value() {
    let mut session = bst_session(&SAMPLE);
    let found = session.submit(Operation::BstFind(6), None).unwrap();
    assert_eq!(found, Outcome::Node(None));
    assert_eq!(session.selected_node(), None);

    let mut empty = new_session();
    let found = empty.submit(Operation::BstFind(6), None).unwrap();
    assert_eq!(found, Outcome::Node(None));
}

#[test]
fn test_delete_leaf() {
    let mut session = bst_session(&[5, 3, 8, 1]);
    let one = node_with(session.tree(), 1);
    let deleted = session.submit(Operation::BstDelete, Some(one)).unwrap();
    assert_eq!(deleted.node().map(|f| f.value), Some(1));
    assert_eq!(level_values(session.tree()), vec![Some(5), Some(3), Some(8)]);
}

#[test]
fn test_delete_splices_single_child() {
    let mut session = bst_session(&[5, 3, 8, 1]);
    let three = node_with(session.tree(), 3);
    session.submit(Operation::BstDelete, Some(three)).unwrap();
    assert_eq!(level_values(session.tree()), vec![Some(5), Some(1), Some(8)]);
}

#[test]
fn test_delete_two_children_promotes_successor() {
    let mut session = bst_session(&SAMPLE);
    let root = session.tree().root().unwrap();
    let deleted = session.submit(Operation::BstDelete, Some(root)).unwrap();
    assert_eq!(deleted.node().map(|f| f.value), Some(5));
    assert_eq!(
        level_values(session.tree()),
        vec![Some(7), Some(3), Some(8), Some(1), Some(4), None, Some(9)]
    );
    assert!(session.tree().satisfies_search_order());
}

#[test]
fn test_delete_root_with_one_child() {
    let mut session = bst_session(&[5, 8, 9]);
    let root = session.tree().root().unwrap();
    session.submit(Operation::BstDelete, Some(root)).unwrap();
    assert_eq!(level_values(session.tree()), vec![Some(8), None, Some(9)]);
}

#[test]
fn test_delete_last_node_empties_tree() {
    let mut session = bst_session(&[5]);
    let root = session.tree().root().unwrap();
    session.submit(Operation::BstDelete, Some(root)).unwrap();
    assert!(session.tree().is_empty());
    assert_eq!(session.tree().to_string(), "[]");
}

#[test]
fn test_extremes() {
    let mut session = bst_session(&SAMPLE);
    let three = node_with(session.tree(), 3);
    let max = session.submit(Operation::BstGetMax, Some(three)).unwrap();
    assert_eq!(max.node().map(|f| f.value), Some(4));

    session.select_node(None);
    let min = session.submit(Operation::BstGetMin, None).unwrap();
    assert_eq!(min.node().map(|f| f.value), Some(1));
}

#[test]
fn test_neighbours() {
    let mut session = bst_session(&SAMPLE);
    let cases = [
        (Operation::BstPredecessor, 5, Some(4)),
        (Operation::BstSuccessor, 4, Some(5)),
        (Operation::BstSuccessor, 3, Some(4)),
        (Operation::BstPredecessor, 7, Some(5)),
        (Operation::BstSuccessor, 9, None),
        (Operation::BstPredecessor, 1, None),
    ];
    for (op, from, expected) in cases {
        let node = node_with(session.tree(), from);
        let name = op.name();
        let outcome = session.submit(op, Some(node)).unwrap();
        assert_eq!(
            outcome.node().map(|f| f.value),
            expected,
            "{name} from {from}"
        );
    }
}

#[test]
fn test_random_tree_replays_identically() {
    let mut session = new_session();
    session
        .submit(Operation::RandomBsTree { min: 0, max: 99 }, None)
        .unwrap();
    let first = session.tree().to_string();
    assert!(session.tree().satisfies_search_order());

    session.skip_backward().unwrap();
    assert_eq!(session.tree().to_string(), first);
}

#[test]
fn test_timeline_is_bracketed_by_markers() {
    let mut session = bst_session(&[5, 3]);
    session.submit(Operation::BstInsert(4), None).unwrap();
    let steps = session.timeline().steps();
    assert!(matches!(
        &steps[0].action,
        StepAction::Start { label } if label == "insert(value: 4)"
    ));
    assert!(matches!(steps[1].action, StepAction::RedrawTree { .. }));
    assert!(matches!(steps.last().map(|s| &s.action), Some(StepAction::End)));
}

#[test]
fn test_chain_deeper_than_index_range() {
    let values: Vec<i64> = (0..70).collect();
    let mut session = bst_session(&values);
    assert_eq!(session.tree().count(), 70);
    assert!(session.tree().satisfies_search_order());

    let missing = session.submit(Operation::BstFind(1000), None).unwrap();
    assert_eq!(missing, Outcome::Node(None));

    let deepest = session.submit(Operation::BstFind(69), None).unwrap();
    assert_eq!(deepest.node().map(|f| f.value), Some(69));
    session.submit(Operation::BstDelete, None).unwrap();
    assert_eq!(session.tree().count(), 69);
    assert_eq!(
        session.history().current_unit().map(|u| u.to_string()),
        Some(format!("delete(value: 69, index: {})", "R".repeat(69)))
    );

    session.skip_backward().unwrap();
    assert_eq!(session.tree().count(), 69);
    assert_eq!(inorder_values(session.tree()), (0..69).collect::<Vec<_>>());
}
