//! Integration tests for modes and the rule manager

use std::sync::Arc;

use arbor_engine::{
    ActionId, BuiltInAction, BuiltInRuleSet, Context, Declaration, EngineConfig, Mode, ModeName, ModuleId, NodeTestPattern,
    RuleManager,
};
use arbor_foundation::{NamePool, NodeKind, QName, TreeModel};
use arbor_tree::{DocumentBuilder, DocumentPool};

fn decl() -> Declaration {
    Declaration::new(ModuleId(0), 0)
}

#[test]
fn named_modes_are_isolated() {
    let mut names = NamePool::new();
    let mut pool = DocumentPool::new();
    let doc = pool.allocate_id();
    let mut b = DocumentBuilder::new(doc, &mut names);
    let p = b.text_element("p", "x");
    pool.add(b.finish().unwrap());

    let toc = ModeName::from(QName::local("toc"));
    let mut rules = RuleManager::new();
    let pattern = Arc::new(NodeTestPattern::element(&mut names, "p"));
    rules.set_template_rule(pattern, ActionId(1), &toc, &decl(), None);
    rules.compute_rankings();

    let ctx = Context::new(&pool);
    assert!(rules.get_template_rule(p, None, &ctx).unwrap().is_none());
    let mode = rules.mode(&toc).unwrap();
    assert_eq!(
        rules.get_template_rule(p, Some(mode), &ctx).unwrap().map(|r| r.action()),
        Some(ActionId(1))
    );
    assert!(!mode.is_default());
    assert!(rules.unnamed_mode().is_default());
}

#[test]
fn all_modes_rules_reach_every_mode() {
    let mut rules = RuleManager::new();
    let early = ModeName::from(QName::local("early"));
    rules.get_or_create_mode(&early);
    rules.set_template_rule(
        Arc::new(NodeTestPattern::kind(NodeKind::Text)),
        ActionId(9),
        &ModeName::All,
        &decl(),
        None,
    );
    let late = ModeName::from(QName::local("late"));
    rules.get_or_create_mode(&late);
    rules.compute_rankings();

    for name in [&ModeName::Default, &early, &late] {
        let mode = rules.mode(name).unwrap();
        assert_eq!(mode.rule_count(), 1, "mode {name:?}");
        assert!(mode.is_empty(), "propagated rules are not explicit");
    }
}

#[test]
fn modes_by_namespace() {
    let mut rules = RuleManager::new();
    rules.get_or_create_mode(&ModeName::from(QName::new("a", "urn:one", "x")));
    rules.get_or_create_mode(&ModeName::from(QName::new("a", "urn:one", "y")));
    rules.get_or_create_mode(&ModeName::from(QName::new("b", "urn:two", "x")));
    assert_eq!(rules.modes_in_namespace("urn:one").len(), 2);
    assert_eq!(rules.modes_in_namespace("urn:none").len(), 0);
}

#[test]
fn standalone_mode_ranks_and_counts() {
    let mut names = NamePool::new();
    let mut mode = Mode::new(None, &EngineConfig::default());
    let p = Arc::new(NodeTestPattern::element(&mut names, "p"));
    mode.add_rule(p, ActionId(1), &decl(), 0.0, true);
    mode.add_rule(Arc::new(NodeTestPattern::empty()), ActionId(2), &decl(), 0.0, true);
    mode.add_rule(
        Arc::new(NodeTestPattern::kind(NodeKind::Element)),
        ActionId(3),
        &decl(),
        -0.5,
        true,
    );
    assert_eq!(mode.rule_count(), 2);
    assert!(!mode.is_ranked());
    mode.compute_rankings();
    assert!(mode.is_ranked());
    let ranks: Vec<_> = mode.rules().map(|r| (r.action(), r.rank())).collect();
    assert!(ranks.contains(&(ActionId(1), 1)));
    assert!(ranks.contains(&(ActionId(3), 0)));
}

#[test]
fn unmatched_nodes_fall_back_to_built_in_rules() {
    let mut names = NamePool::new();
    let mut pool = DocumentPool::new();
    let doc = pool.allocate_id();
    let mut b = DocumentBuilder::new(doc, &mut names);
    b.start_element("p");
    let text = b.text("x");
    let comment = b.comment("note");
    b.end_element();
    pool.add(b.finish().unwrap());

    let mut rules = RuleManager::new();
    rules.compute_rankings();
    let mode = rules.unnamed_mode();
    assert_eq!(mode.built_in_rules(), BuiltInRuleSet::Stringify);

    let ctx = Context::new(&pool);
    let fallback = |node| {
        assert!(rules.get_template_rule(node, None, &ctx).unwrap().is_none());
        mode.built_in_rules().action(pool.node_kind(node).unwrap())
    };
    assert_eq!(fallback(text), BuiltInAction::CopyStringValue);
    assert_eq!(fallback(comment), BuiltInAction::Skip);
}
