//! Integration tests for documents and the builder

use arbor_foundation::{DocumentId, ErrorKind, NamePool, NodeKind};
use arbor_tree::DocumentBuilder;

// =============================================================================
// Construction
// =============================================================================

#[test]
fn builder_assigns_document_order_handles() {
    let mut names = NamePool::new();
    let mut b = DocumentBuilder::new(DocumentId(4), &mut names);
    let chapter = b.start_element("chapter");
    let id = b.attribute("id", "c1");
    let title = b.text_element("title", "Intro");
    let note = b.comment("draft");
    b.end_element();
    let doc = b.finish().unwrap();

    assert!(chapter < id && id < title && title < note);
    assert_eq!(doc.id(), DocumentId(4));
    assert_eq!(doc.kind(doc.root()), Some(NodeKind::Document));
    assert_eq!(doc.kind(id), Some(NodeKind::Attribute));
    assert_eq!(doc.parent(id), Some(chapter));
    assert_eq!(doc.parent(chapter), Some(doc.root()));
    assert!(!doc.is_empty());
}

#[test]
fn unbalanced_documents_are_rejected() {
    let mut names = NamePool::new();
    let mut b = DocumentBuilder::new(DocumentId(1), &mut names);
    b.start_element("open");
    let err = b.finish().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MalformedTree(_)));

    let mut b = DocumentBuilder::new(DocumentId(1), &mut names);
    b.end_element();
    assert!(b.finish().is_err());
}

#[test]
fn attribute_after_content_is_rejected() {
    let mut names = NamePool::new();
    let mut b = DocumentBuilder::new(DocumentId(1), &mut names);
    b.start_element("p");
    b.text("body");
    b.attribute("late", "1");
    b.end_element();
    let err = b.finish().unwrap_err();
    assert!(format!("{err}").contains("late"));
}

// =============================================================================
// Navigation
// =============================================================================

#[test]
fn string_value_concatenates_descendant_text() {
    let mut names = NamePool::new();
    let mut b = DocumentBuilder::new(DocumentId(1), &mut names);
    let p = b.start_element("p");
    b.attribute("class", "lead");
    b.text("Hello, ");
    b.text_element("em", "world");
    b.comment("ignored");
    b.text("!");
    b.end_element();
    let doc = b.finish().unwrap();
    assert_eq!(doc.string_value(p).as_deref(), Some("Hello, world!"));
    assert_eq!(doc.string_value(doc.root()).as_deref(), Some("Hello, world!"));
}

#[test]
fn children_skip_attributes_and_descendants() {
    let mut names = NamePool::new();
    let mut b = DocumentBuilder::new(DocumentId(1), &mut names);
    let list = b.start_element("list");
    b.attribute("type", "ordered");
    let first = b.start_element("item");
    b.text_element("label", "one");
    b.end_element();
    let second = b.text_element("item", "two");
    b.end_element();
    let doc = b.finish().unwrap();

    let children: Vec<_> = doc.children(list).collect();
    assert_eq!(children, vec![first, second]);
}

#[test]
fn attribute_lookup_by_name() {
    let mut names = NamePool::new();
    let mut b = DocumentBuilder::new(DocumentId(1), &mut names);
    let e = b.start_element("e");
    b.attribute("a", "1");
    let attr_b = b.attribute("b", "2");
    b.end_element();
    let doc = b.finish().unwrap();
    let code_b = names.intern_local("b");
    let code_c = names.intern_local("c");
    assert_eq!(doc.attribute(e, code_b), Some(attr_b));
    assert_eq!(doc.attribute(e, code_c), None);
    assert_eq!(doc.string_value(attr_b).as_deref(), Some("2"));
}
