//! Integration tests for names and node handles

use std::collections::HashSet;

use arbor_foundation::{DocumentId, NamePool, NodeId, NodeKind, QName};

#[test]
fn qname_equality_ignores_prefix() {
    let a = QName::new("x", "urn:modes", "toc");
    let b = QName::new("y", "urn:modes", "toc");
    let c = QName::new("x", "urn:other", "toc");
    assert_eq!(a, b);
    assert_ne!(a, c);
    let set: HashSet<_> = [a, b, c].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn qname_renderings() {
    let name = QName::new("m", "urn:modes", "toc");
    assert_eq!(name.to_string(), "m:toc");
    assert_eq!(name.clark_name(), "{urn:modes}toc");
    assert_eq!(QName::local("toc").clark_name(), "toc");
}

#[test]
fn name_pool_interns_by_expanded_name() {
    let mut pool = NamePool::new();
    let a = pool.intern(&QName::new("p", "urn:a", "item"));
    let b = pool.intern(&QName::new("q", "urn:a", "item"));
    let c = pool.intern_local("item");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.name(c), Some(&QName::local("item")));
    assert_eq!(pool.lookup(&QName::local("missing")), None);
}

#[test]
fn node_order_is_document_order() {
    let doc = DocumentId(1);
    assert!(NodeId::new(doc, 3) < NodeId::new(doc, 10));
    assert!(doc.root().is_root());
    assert!(NodeId::new(DocumentId(1), 99) < NodeId::new(DocumentId(2), 0));
}

#[test]
fn node_kind_indices_are_dense() {
    let mut seen: Vec<usize> = NodeKind::ALL.iter().map(|k| k.index()).collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..NodeKind::COUNT).collect::<Vec<_>>());
    assert!(NodeKind::Element.is_named());
    assert!(!NodeKind::Text.is_named());
}
