//! Max-heap operations through a session

use test_case::test_case;
use treestep::{Operation, Outcome, Value};
use test_helpers::*;

fn dense(values: &[Value]) -> Vec<Option<Value>> {
    values.iter().copied().map(Some).collect()
}

#[test_case(&[3, 1, 4, 1, 5], &[5, 3, 4, 1, 1] ; "mixed with duplicates")]
#[test_case(&[1, 2, 3, 4, 5, 6, 7], &[7, 5, 6, 4, 2, 1, 3] ; "ascending")]
#[test_case(&[9, 8, 7], &[9, 8, 7] ; "already a heap")]
#[test_case(&[4], &[4] ; "single value")]
fn test_build_heap(input: &[Value], expected: &[Value]) {
    let session = heap_session(input);
    assert_eq!(level_values(session.tree()), dense(expected));
    assert!(session.tree().is_complete());
}

#[test]
fn test_build_empty_heap() {
    let session = heap_session(&[]);
    assert!(session.tree().is_empty());
}

#[test_case(&[5, 3, 4], 6, &[6, 5, 4, 3] ; "rises to root")]
#[test_case(&[5, 3, 4], 2, &[5, 3, 4, 2] ; "stays at bottom")]
#[test_case(&[], 7, &[7] ; "into empty heap")]
fn test_heap_insert(start: &[Value], value: Value, expected: &[Value]) {
    let mut session = heap_session(start);
    session.submit(Operation::HeapInsert(value), None).unwrap();
    assert_eq!(level_values(session.tree()), dense(expected));
    assert!(session.tree().satisfies_heap_order());
}

#[test]
fn test_extract_max() {
    let mut session = heap_session(&[3, 1, 4, 1, 5]);
    let max = session.submit(Operation::ExtractMax, None).unwrap();
    assert_eq!(max.node().map(|f| f.value), Some(5));
    assert_eq!(level_values(session.tree()), dense(&[4, 3, 1, 1]));
}

#[test]
fn test_extract_from_empty_heap() {
    let mut session = new_session();
    let max = session.submit(Operation::ExtractMax, None).unwrap();
    assert_eq!(max, Outcome::Node(None));
}

#[test]
fn test_delete_inner_node() {
    let mut session = heap_session(&[9, 7, 8, 1, 2]);
    let seven = session.tree().node_at(1).unwrap();
    let deleted = session.submit(Operation::HeapDelete, Some(seven)).unwrap();
    assert_eq!(deleted.node().map(|f| f.value), Some(7));
    assert_eq!(level_values(session.tree()), dense(&[9, 2, 8, 1]));
    assert!(session.tree().is_complete());
}

#[test]
fn test_delete_last_node() {
    let mut session = heap_session(&[9, 7, 8]);
    let last = session.tree().node_at(2).unwrap();
    session.submit(Operation::HeapDelete, Some(last)).unwrap();
    assert_eq!(level_values(session.tree()), dense(&[9, 7]));
}

#[test]
fn test_get_max_selects_root() {
    let mut session = heap_session(&[2, 9, 4]);
    let max = session.submit(Operation::HeapGetMax, None).unwrap();
    assert_eq!(max.node().map(|f| f.value), Some(9));
    assert_eq!(session.selected_node(), session.tree().root());
}

#[test_case(&[3, 1, 4, 1, 5] ; "with duplicates")]
#[test_case(&[10, -3, 7, 0, 22, 5, 5, 1] ; "negatives")]
#[test_case(&[] ; "empty")]
fn test_sort_leaves_heap_unchanged(values: &[Value]) {
    let mut session = heap_session(values);
    let before = session.tree().to_string();
    let sorted = session.submit(Operation::HeapSort, None).unwrap();

    let mut expected = values.to_vec();
    expected.sort_unstable();
    assert_eq!(sorted, Outcome::Values(expected));
    assert_eq!(session.tree().to_string(), before);
}

#[test]
fn test_random_heap_is_valid() {
    let mut session = new_session();
    session
        .submit(Operation::RandomHeap { min: -50, max: 50 }, None)
        .unwrap();
    let tree = session.tree();
    assert!(tree.is_complete());
    assert!(tree.satisfies_heap_order());

    let mut values = tree.values_of(tree.preorder());
    let count = values.len();
    values.sort_unstable();
    values.dedup();
    assert_eq!(values.len(), count);
}
