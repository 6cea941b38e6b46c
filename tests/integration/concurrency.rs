//! Lookups from many threads at once
//!
//! A compiled stylesheet is shared read-only; index builds are serialized
//! inside the key manager and every thread sees the same results.

use std::sync::Arc;
use std::thread;

use arbor_engine::{
    ActionId, AttributeValue, Context, Declaration, KeyDefinition, KeyManager, ModeName,
    ModuleId, NodeTestPattern, RuleManager,
};
use arbor_foundation::{AtomicValue, DocumentId, NamePool, NodeId, QName};
use arbor_tree::{DocumentBuilder, DocumentPool};

const THREADS: usize = 8;

/// A document of `count` `row` elements with `group` attributes cycling
/// through `0..10`.
fn rows(pool: &mut DocumentPool, names: &mut NamePool, count: usize) -> (DocumentId, Vec<NodeId>) {
    let doc = pool.allocate_id();
    let mut b = DocumentBuilder::new(doc, names);
    b.start_element("table");
    let mut nodes = Vec::with_capacity(count);
    for i in 0..count {
        let row = b.start_element("row");
        b.attribute("group", &(i % 10).to_string());
        b.end_element();
        nodes.push(row);
    }
    b.end_element();
    pool.add(b.finish().unwrap());
    (doc, nodes)
}

fn group_key(names: &mut NamePool) -> KeyManager {
    let mut keys = KeyManager::new();
    keys.add_key_definition(
        QName::local("group"),
        KeyDefinition::new(
            Arc::new(NodeTestPattern::element(names, "row")),
            Arc::new(AttributeValue::new(names, "group")),
        ),
    )
    .unwrap();
    keys
}

#[test]
fn concurrent_lookups_build_each_index_once() {
    let mut names = NamePool::new();
    let mut pool = DocumentPool::new();
    let (first, first_rows) = rows(&mut pool, &mut names, 200);
    let (second, _) = rows(&mut pool, &mut names, 50);
    let keys = group_key(&mut names);
    let name = QName::local("group");

    thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let (keys, pool, name) = (&keys, &pool, &name);
                s.spawn(move || {
                    let ctx = Context::new(pool);
                    let doc = if t % 2 == 0 { first } else { second };
                    let value = AtomicValue::string(&(t % 10).to_string());
                    let found: Vec<_> =
                        keys.select_by_key(name, doc, Some(&value), &ctx).unwrap().collect();
                    (doc, found)
                })
            })
            .collect();
        for handle in handles {
            let (doc, found) = handle.join().unwrap();
            let expected = if doc == first { 20 } else { 5 };
            assert_eq!(found.len(), expected);
            assert!(found.windows(2).all(|w| w[0] < w[1]));
        }
    });

    assert_eq!(keys.indexed_documents(), 2);
    let ctx = Context::new(&pool);
    let zero: Vec<_> = keys
        .select_by_key(&name, first, Some(&AtomicValue::string("0")), &ctx)
        .unwrap()
        .collect();
    assert_eq!(zero.first(), first_rows.first());
}

#[test]
fn shared_rules_dispatch_from_many_threads() {
    let mut names = NamePool::new();
    let mut pool = DocumentPool::new();
    let (_, nodes) = rows(&mut pool, &mut names, 100);
    let mut rules = RuleManager::new();
    rules.set_template_rule(
        Arc::new(NodeTestPattern::element(&mut names, "row")),
        ActionId(7),
        &ModeName::Default,
        &Declaration::new(ModuleId(0), 0),
        None,
    );
    rules.compute_rankings();

    thread::scope(|s| {
        for chunk in nodes.chunks(nodes.len() / 4) {
            let (rules, pool) = (&rules, &pool);
            s.spawn(move || {
                let ctx = Context::new(pool);
                for node in chunk {
                    let rule = rules.get_template_rule(*node, None, &ctx).unwrap();
                    assert_eq!(rule.map(|r| r.action()), Some(ActionId(7)));
                }
            });
        }
    });
}
