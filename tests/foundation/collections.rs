//! Integration tests for NodeList
//!
//! Tests document-order maintenance, union, and structural sharing.

use arbor_foundation::{DocumentId, NodeId, NodeList};

fn n(i: u32) -> NodeId {
    NodeId::new(DocumentId(7), i)
}

// =============================================================================
// Ordered Insertion
// =============================================================================

#[test]
fn push_in_order_skips_repeat_of_last() {
    let mut list = NodeList::new();
    list.push_in_order(n(1));
    list.push_in_order(n(1));
    list.push_in_order(n(4));
    assert_eq!(list.len(), 2);
    assert_eq!(list.last(), Some(n(4)));
}

#[test]
fn insert_in_order_places_and_deduplicates() {
    let mut list: NodeList = [n(2), n(8)].into_iter().collect();
    assert!(list.insert_in_order(n(5)));
    assert!(list.insert_in_order(n(1)));
    assert!(!list.insert_in_order(n(8)));
    let nodes: Vec<_> = list.iter().collect();
    assert_eq!(nodes, vec![n(1), n(2), n(5), n(8)]);
}

#[test]
fn collect_sorts_and_deduplicates() {
    let list: NodeList = [n(9), n(3), n(9), n(0)].into_iter().collect();
    let nodes: Vec<_> = list.into_iter().collect();
    assert_eq!(nodes, vec![n(0), n(3), n(9)]);
}

// =============================================================================
// Union
// =============================================================================

#[test]
fn union_merges_without_duplicates() {
    let a: NodeList = [n(1), n(3), n(5)].into_iter().collect();
    let b: NodeList = [n(2), n(3), n(6)].into_iter().collect();
    let nodes: Vec<_> = a.union(&b).iter().collect();
    assert_eq!(nodes, vec![n(1), n(2), n(3), n(5), n(6)]);
}

#[test]
fn union_with_empty_is_identity() {
    let a: NodeList = [n(1), n(2)].into_iter().collect();
    assert_eq!(a.union(&NodeList::new()), a);
    assert_eq!(NodeList::new().union(&a), a);
}

#[test]
fn clones_are_independent_snapshots() {
    let mut a = NodeList::unit(n(1));
    let snapshot = a.clone();
    a.push_in_order(n(2));
    assert_eq!(snapshot.len(), 1);
    assert_eq!(a.len(), 2);
}
