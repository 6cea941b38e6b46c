//! Integration tests for key definitions and lookups

use std::sync::Arc;

use arbor_engine::{
    AsciiCaseBlindCollation, AttributeValue, Context, FunctionExpression, KeyDefinition,
    KeyManager, NodeTestPattern,
};
use arbor_foundation::{AtomicValue, DocumentId, ErrorKind, NamePool, NodeId, QName};
use arbor_tree::{DocumentBuilder, DocumentPool};

struct Catalog {
    pool: DocumentPool,
    names: NamePool,
    doc: DocumentId,
    books: Vec<NodeId>,
    magazine: NodeId,
}

/// `<catalog><book isbn="1" author="Ann"/><magazine issn="9" author="Ann"/>
/// <book isbn="2" author="Bob"/><book isbn="3" author="ann"/></catalog>`
fn catalog() -> Catalog {
    let mut pool = DocumentPool::new();
    let mut names = NamePool::new();
    let doc = pool.allocate_id();
    let mut b = DocumentBuilder::new(doc, &mut names);
    b.start_element("catalog");
    fn book(b: &mut DocumentBuilder<'_>, isbn: &str, author: &str) -> NodeId {
        let node = b.start_element("book");
        b.attribute("isbn", isbn);
        b.attribute("author", author);
        b.end_element();
        node
    }
    let first = book(&mut b, "1", "Ann");
    let magazine = b.start_element("magazine");
    b.attribute("issn", "9");
    b.attribute("author", "Ann");
    b.end_element();
    let second = book(&mut b, "2", "Bob");
    let third = book(&mut b, "3", "ann");
    b.end_element();
    pool.add(b.finish().unwrap());
    Catalog {
        pool,
        names,
        doc,
        books: vec![first, second, third],
        magazine,
    }
}

fn by(names: &mut NamePool, element: &str, attr: &str) -> KeyDefinition {
    KeyDefinition::new(
        Arc::new(NodeTestPattern::element(names, element)),
        Arc::new(AttributeValue::new(names, attr)),
    )
}

fn lookup(keys: &KeyManager, c: &Catalog, name: &str, value: AtomicValue) -> Vec<NodeId> {
    let ctx = Context::new(&c.pool).with_keys(keys);
    keys.select_by_key(&QName::local(name), c.doc, Some(&value), &ctx)
        .unwrap()
        .collect()
}

#[test]
fn results_follow_document_order_across_definitions() {
    let mut c = catalog();
    let mut keys = KeyManager::new();
    let author = QName::local("author");
    keys.add_key_definition(author.clone(), by(&mut c.names, "magazine", "author"))
        .unwrap();
    keys.add_key_definition(author, by(&mut c.names, "book", "author"))
        .unwrap();

    let found = lookup(&keys, &c, "author", AtomicValue::string("Ann"));
    assert_eq!(found, vec![c.books[0], c.magazine]);
    assert_eq!(keys.key_definition_set(&QName::local("author")).unwrap().definitions().len(), 2);
}

#[test]
fn typed_lookups_need_general_comparison() {
    let mut c = catalog();
    let mut keys = KeyManager::new();
    keys.add_key_definition(QName::local("isbn"), by(&mut c.names, "book", "isbn"))
        .unwrap();
    keys.add_key_definition(
        QName::local("isbn-gc"),
        by(&mut c.names, "book", "isbn").with_general_comparison(true),
    )
    .unwrap();

    assert!(lookup(&keys, &c, "isbn", AtomicValue::Integer(2)).is_empty());
    assert_eq!(lookup(&keys, &c, "isbn-gc", AtomicValue::Integer(2)), vec![c.books[1]]);
    assert_eq!(lookup(&keys, &c, "isbn-gc", AtomicValue::Double(2.0)), vec![c.books[1]]);
    assert_eq!(lookup(&keys, &c, "isbn", AtomicValue::untyped("3")), vec![c.books[2]]);
}

#[test]
fn backwards_compatible_keys_match_string_forms() {
    let mut c = catalog();
    let mut keys = KeyManager::new();
    keys.add_key_definition(
        QName::local("isbn"),
        by(&mut c.names, "book", "isbn").with_backwards_compatible(true),
    )
    .unwrap();
    assert_eq!(lookup(&keys, &c, "isbn", AtomicValue::Double(1.0)), vec![c.books[0]]);
    assert_eq!(lookup(&keys, &c, "isbn", AtomicValue::string("3")), vec![c.books[2]]);
}

#[test]
fn collation_applies_to_both_sides() {
    let mut c = catalog();
    let mut keys = KeyManager::new();
    keys.add_key_definition(
        QName::local("author"),
        by(&mut c.names, "book", "author").with_collation(Arc::new(AsciiCaseBlindCollation)),
    )
    .unwrap();
    let found = lookup(&keys, &c, "author", AtomicValue::string("ANN"));
    assert_eq!(found, vec![c.books[0], c.books[2]]);
}

#[test]
fn self_referencing_key_is_circular() {
    let mut c = catalog();
    let mut keys = KeyManager::new();
    let name = QName::local("self");
    let inner = name.clone();
    let use_expression = FunctionExpression::new("key('self', 'Ann')", move |ctx: &Context<'_>| {
        if let (Some(keys), Some(node)) = (ctx.keys(), ctx.item()) {
            keys.select_by_key(&inner, node.document, Some(&AtomicValue::string("Ann")), ctx)?;
        }
        Ok(vec![AtomicValue::string("Ann")])
    });
    keys.add_key_definition(
        name.clone(),
        KeyDefinition::new(
            Arc::new(NodeTestPattern::element(&mut c.names, "book")),
            Arc::new(use_expression),
        ),
    )
    .unwrap();

    let ctx = Context::new(&c.pool).with_keys(&keys);
    let err = keys
        .select_by_key(&name, c.doc, Some(&AtomicValue::string("Ann")), &ctx)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::CircularKey(ref k) if *k == name));
}

#[test]
fn several_sought_values_are_unioned() {
    let mut c = catalog();
    let mut keys = KeyManager::new();
    keys.add_key_definition(QName::local("isbn"), by(&mut c.names, "book", "isbn"))
        .unwrap();
    let ctx = Context::new(&c.pool);
    let found: Vec<_> = keys
        .select_by_keys(
            &QName::local("isbn"),
            c.doc,
            &[AtomicValue::string("3"), AtomicValue::string("1"), AtomicValue::string("3")],
            &ctx,
        )
        .unwrap()
        .collect();
    assert_eq!(found, vec![c.books[0], c.books[2]]);
}

#[test]
fn undefined_key_is_reported() {
    let c = catalog();
    let keys = KeyManager::new();
    let ctx = Context::new(&c.pool);
    let err = keys
        .select_by_key(&QName::local("nope"), c.doc, Some(&AtomicValue::string("x")), &ctx)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownKey(_)));
}
