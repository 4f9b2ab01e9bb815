//! Structural behaviour of the arena tree

use treestep::tree::IndexPath;
use treestep::{BinaryTree, Side, StructuralError};

/// 5 with left child 3, and 3 with right child 4
fn lopsided() -> BinaryTree<i64> {
    let mut tree = BinaryTree::new();
    let five = tree.new_node(5);
    let three = tree.new_node(3);
    let four = tree.new_node(4);
    tree.set_root(Some(five)).unwrap();
    tree.set_left(five, Some(three)).unwrap();
    tree.set_right(three, Some(four)).unwrap();
    tree
}

#[test]
fn test_sparse_array_has_gaps() {
    let tree = lopsided();
    assert_eq!(
        tree.to_value_array().unwrap(),
        vec![Some(5), Some(3), None, None, Some(4)]
    );
    assert_eq!(tree.to_string(), "[5, 3, n, n, 4]");
}

#[test]
fn test_index_lookup_round_trips() {
    let tree = lopsided();
    for node in tree.preorder() {
        let index = tree.get_index(node).unwrap();
        assert_eq!(tree.node_at(index), Some(node));
    }
    assert_eq!(tree.get_node(2), Ok(None));
    assert_eq!(tree.get_node(-1), Err(StructuralError::NegativeIndex(-1)));
}

#[test]
fn test_index_path_bits() {
    let path = IndexPath::from_index(5);
    assert_eq!(path.depth(), 2);
    assert_eq!(path.sides().collect::<Vec<_>>(), vec![Side::Right, Side::Left]);
    assert_eq!(path.to_index(), Some(5));

    let tree = BinaryTree::from_values(0..6);
    let node = path.resolve(&tree).unwrap();
    assert_eq!(tree.value(node), Some(&5));
}

#[test]
fn test_self_parenting_rejected() {
    let mut tree = lopsided();
    let root = tree.root().unwrap();
    assert_eq!(
        tree.set_right(root, Some(root)),
        Err(StructuralError::SelfParenting(root))
    );
}

#[test]
fn test_cycle_rejected() {
    let mut tree = lopsided();
    let root = tree.root().unwrap();
    let leaf = tree.node_at(4).unwrap();
    assert!(matches!(
        tree.set_left(leaf, Some(root)),
        Err(StructuralError::Cycle { .. })
    ));
    assert_eq!(tree.count(), 3);
}

#[test]
fn test_root_with_parent_rejected() {
    let mut tree = lopsided();
    let three = tree.node_at(1).unwrap();
    assert_eq!(
        tree.set_root(Some(three)),
        Err(StructuralError::RootHasParent(three))
    );
}

#[test]
fn test_attaching_moves_child() {
    let mut tree = lopsided();
    let root = tree.root().unwrap();
    let four = tree.node_at(4).unwrap();
    tree.set_right(root, Some(four)).unwrap();
    assert_eq!(
        tree.to_value_array().unwrap(),
        vec![Some(5), Some(3), Some(4)]
    );
    assert!(tree.is_leaf(tree.node_at(1).unwrap()));
}

#[test]
fn test_traversal_orders() {
    let tree = BinaryTree::from_values([1, 2, 3, 4, 5]);
    assert_eq!(tree.values_of(tree.preorder()), vec![1, 2, 4, 5, 3]);
    assert_eq!(tree.values_of(tree.inorder()), vec![4, 2, 5, 1, 3]);
    assert_eq!(tree.values_of(tree.postorder()), vec![4, 5, 2, 3, 1]);
}

#[test]
fn test_swap_parent_and_child() {
    let mut tree = BinaryTree::from_values([1, 2, 3]);
    let root = tree.root().unwrap();
    let left = tree.left(root).unwrap();
    tree.swap_nodes(root, left).unwrap();

    assert_eq!(tree.root(), Some(left));
    assert_eq!(tree.parent(root), Some(left));
    assert_eq!(
        tree.to_value_array().unwrap(),
        vec![Some(2), Some(1), Some(3)]
    );
}

#[test]
fn test_swap_siblings() {
    let mut tree = BinaryTree::from_values([1, 2, 3, 4]);
    let two = tree.node_at(1).unwrap();
    let three = tree.node_at(2).unwrap();
    tree.swap_nodes(two, three).unwrap();
    assert_eq!(
        tree.to_value_array().unwrap(),
        vec![Some(1), Some(3), Some(2), Some(4)]
    );
    assert_eq!(tree.parent(tree.node_at(3).unwrap()), Some(three));
}

#[test]
fn test_copy_is_compact_and_independent() {
    let mut tree = lopsided();
    let orphan = tree.new_node(99);
    let copy = tree.copy_tree();
    assert_eq!(copy.arena_len(), 3);
    assert_eq!(copy.to_string(), tree.to_string());

    tree.set_right(tree.root().unwrap(), Some(orphan)).unwrap();
    assert_eq!(copy.count(), 3);
    assert_eq!(tree.count(), 4);
}

#[test]
fn test_heap_shape_checks() {
    let heap = BinaryTree::from_values([9, 7, 8, 1]);
    assert!(heap.is_complete());
    assert!(heap.satisfies_heap_order());
    assert!(!lopsided().is_complete());
    assert!(lopsided().satisfies_search_order());
}

#[test]
fn test_duplicate_on_left_is_out_of_search_order() {
    let mut tree = lopsided();
    let three = tree.node_at(1).unwrap();
    let dup = tree.new_node(3);
    tree.set_left(three, Some(dup)).unwrap();
    // inorder 3, 3, 4, 5 never decreases
    assert_eq!(tree.values_of(tree.inorder()), vec![3, 3, 4, 5]);
    assert!(!tree.satisfies_search_order());

    tree.set_left(three, None).unwrap();
    let four = tree.node_at(4).unwrap();
    tree.set_right(four, Some(dup)).unwrap();
    // 3 right of 4
    assert!(!tree.satisfies_search_order());
}
