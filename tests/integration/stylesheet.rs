//! A small stylesheet run end to end
//!
//! Rules and keys are compiled once, then applied to documents held in a
//! pool. Discarding a document releases its key indexes.

use std::sync::Arc;

use arbor_engine::{
    ActionId, AttributeValue, Context, Declaration, KeyDefinition, KeyManager, ModeName,
    ModuleId, NodeTestPattern, PredicatePattern, RuleManager,
};
use arbor_foundation::{AtomicValue, DocumentId, NamePool, NodeId, NodeKind, QName, TreeModel};
use arbor_tree::{DocumentBuilder, DocumentPool};

const CHAPTER: ActionId = ActionId(1);
const XREF: ActionId = ActionId(2);
const ANY_ELEMENT: ActionId = ActionId(3);
const TEXT: ActionId = ActionId(4);

struct Stylesheet {
    rules: RuleManager,
    keys: Arc<KeyManager>,
}

fn compile(names: &mut NamePool) -> Stylesheet {
    let decl = Declaration::new(ModuleId(0), 0);
    let mut rules = RuleManager::new();
    rules.set_template_rule(
        Arc::new(NodeTestPattern::element(names, "chapter")),
        CHAPTER,
        &ModeName::Default,
        &decl,
        None,
    );
    let target = names.intern_local("target");
    let xref = PredicatePattern::new(
        NodeTestPattern::element(names, "xref"),
        "xref[@target]",
        move |node, ctx: &Context<'_>| Ok(ctx.tree().attribute(node, target).is_some()),
    );
    rules.set_template_rule(Arc::new(xref), XREF, &ModeName::Default, &decl, None);
    rules.set_template_rule(
        Arc::new(NodeTestPattern::kind(NodeKind::Element)),
        ANY_ELEMENT,
        &ModeName::Default,
        &decl,
        None,
    );
    rules.set_template_rule(
        Arc::new(NodeTestPattern::kind(NodeKind::Text)),
        TEXT,
        &ModeName::All,
        &decl,
        None,
    );
    rules.compute_rankings();

    let mut keys = KeyManager::new();
    keys.add_key_definition(
        QName::local("chapter-by-id"),
        KeyDefinition::new(
            Arc::new(NodeTestPattern::element(names, "chapter")),
            Arc::new(AttributeValue::new(names, "id")),
        ),
    )
    .unwrap();
    Stylesheet {
        rules,
        keys: Arc::new(keys),
    }
}

/// `<book><chapter id="intro">Hello</chapter><xref target="intro"/><xref/>
/// <chapter id="end"/></book>`
fn book(pool: &mut DocumentPool, names: &mut NamePool) -> (DocumentId, Vec<NodeId>) {
    let doc = pool.allocate_id();
    let mut b = DocumentBuilder::new(doc, names);
    b.start_element("book");
    let intro = b.start_element("chapter");
    b.attribute("id", "intro");
    let hello = b.text("Hello");
    b.end_element();
    let linked = b.start_element("xref");
    b.attribute("target", "intro");
    b.end_element();
    let dangling = b.start_element("xref");
    b.end_element();
    let end = b.start_element("chapter");
    b.attribute("id", "end");
    b.end_element();
    b.end_element();
    pool.add(b.finish().unwrap());
    (doc, vec![intro, hello, linked, dangling, end])
}

fn action_for(sheet: &Stylesheet, node: NodeId, ctx: &Context<'_>) -> Option<ActionId> {
    sheet
        .rules
        .get_template_rule(node, None, ctx)
        .unwrap()
        .map(|rule| rule.action())
}

#[test]
fn templates_and_keys_cooperate() {
    let mut names = NamePool::new();
    let mut pool = DocumentPool::new();
    let sheet = compile(&mut names);
    let (doc, nodes) = book(&mut pool, &mut names);
    let [intro, hello, linked, dangling, end] = nodes[..] else {
        panic!("unexpected fixture");
    };

    let ctx = Context::new(&pool).with_keys(&sheet.keys);
    assert_eq!(action_for(&sheet, intro, &ctx), Some(CHAPTER));
    assert_eq!(action_for(&sheet, hello, &ctx), Some(TEXT));
    assert_eq!(action_for(&sheet, linked, &ctx), Some(XREF));
    assert_eq!(action_for(&sheet, dangling, &ctx), Some(ANY_ELEMENT));

    // Follow the cross-reference through the key.
    let target_name = names.intern_local("target");
    let target = pool
        .attribute(linked, target_name)
        .and_then(|attr| pool.string_value(attr))
        .unwrap();
    let chapters: Vec<_> = sheet
        .keys
        .select_by_key(
            &QName::local("chapter-by-id"),
            doc,
            Some(&AtomicValue::String(target)),
            &ctx,
        )
        .unwrap()
        .collect();
    assert_eq!(chapters, vec![intro]);

    let rule = sheet.rules.get_template_rule(end, None, &ctx).unwrap().unwrap();
    let next = sheet
        .rules
        .get_next_match_rule(end, None, rule, &ctx)
        .unwrap()
        .map(|r| r.action());
    assert_eq!(next, Some(ANY_ELEMENT));
}

#[test]
fn discarding_a_document_drops_its_indexes() {
    let mut names = NamePool::new();
    let mut pool = DocumentPool::new();
    let sheet = compile(&mut names);
    pool.register_observer(&sheet.keys);
    let (first, _) = book(&mut pool, &mut names);
    let (second, _) = book(&mut pool, &mut names);

    let key = QName::local("chapter-by-id");
    let value = AtomicValue::string("end");
    {
        let ctx = Context::new(&pool);
        for doc in [first, second] {
            assert_eq!(sheet.keys.select_by_key(&key, doc, Some(&value), &ctx).unwrap().len(), 1);
        }
    }
    assert_eq!(sheet.keys.indexed_documents(), 2);

    assert!(pool.discard(first).is_some());
    assert_eq!(sheet.keys.indexed_documents(), 1);
    assert!(!sheet.keys.release_document(first));

    let ctx = Context::new(&pool);
    assert_eq!(sheet.keys.select_by_key(&key, second, Some(&value), &ctx).unwrap().len(), 1);
}
