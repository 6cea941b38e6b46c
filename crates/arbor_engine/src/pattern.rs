//! Match patterns.
//!
//! A [`Pattern`] decides whether a node matches and reports enough static
//! information for a mode to file its rule into the right chain without
//! evaluating it.

use std::fmt;
use std::sync::Arc;

use arbor_foundation::{DocumentId, NameCode, NamePool, NodeId, NodeKind, Result};

use crate::context::Context;

/// Static classification of a pattern, used to choose its rule chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PatternClass {
    /// The pattern can never match; rules using it are discarded.
    Never,
    /// The pattern may match nodes of several kinds.
    Unclassified,
    /// The pattern only matches nodes of one kind.
    Kind(NodeKind),
    /// The pattern only matches nodes of one kind with one name.
    KindAndName(NodeKind, NameCode),
}

/// A match pattern.
///
/// `Display` gives the pattern's source text; it is used in diagnostics and
/// to recognise duplicate key definitions.
pub trait Pattern: fmt::Display + Send + Sync {
    /// Tests whether `node` matches.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluating a predicate fails.
    fn matches(&self, node: NodeId, ctx: &Context<'_>) -> Result<bool>;

    /// The priority used when a rule gives none.
    fn default_priority(&self) -> f64;

    /// Classifies the pattern by the node kind and name it requires.
    fn classify(&self) -> PatternClass;

    /// Returns true if matching depends on nothing beyond the kind and name
    /// reported by [`classify`](Pattern::classify).
    fn is_node_test(&self) -> bool {
        false
    }

    /// For a union pattern, its two branches.
    fn union_branches(&self) -> Option<(Arc<dyn Pattern>, Arc<dyn Pattern>)> {
        None
    }

    /// Selects every matching node of a document, in document order.
    fn select_nodes<'a>(
        &'a self,
        document: DocumentId,
        ctx: &Context<'a>,
    ) -> Box<dyn Iterator<Item = Result<NodeId>> + 'a> {
        let ctx = *ctx;
        Box::new(
            ctx.tree()
                .document_order_nodes(document)
                .filter_map(move |node| match self.matches(node, &ctx) {
                    Ok(true) => Some(Ok(node)),
                    Ok(false) => None,
                    Err(e) => Some(Err(e)),
                }),
        )
    }
}

// =============================================================================
// Node Test Patterns
// =============================================================================

/// The node test of a [`NodeTestPattern`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeTest {
    /// `node()`: any node.
    AnyNode,
    /// A kind test such as `text()` or `*`.
    Kind(NodeKind),
    /// A name test such as `para` or `@id`.
    Name(NodeKind, NameCode),
    /// `empty-sequence()`: matches nothing.
    Empty,
}

/// A pattern consisting of a single node test.
#[derive(Clone, Debug)]
pub struct NodeTestPattern {
    test: NodeTest,
    text: Arc<str>,
}

impl NodeTestPattern {
    /// Creates a pattern from a test and its source text.
    #[must_use]
    pub fn new(test: NodeTest, text: impl Into<Arc<str>>) -> Self {
        Self {
            test,
            text: text.into(),
        }
    }

    /// `node()`
    #[must_use]
    pub fn any_node() -> Self {
        Self::new(NodeTest::AnyNode, "node()")
    }

    /// A kind test. Elements display as `*`, attributes as `@*`.
    #[must_use]
    pub fn kind(kind: NodeKind) -> Self {
        let text = match kind {
            NodeKind::Element => "*".to_string(),
            NodeKind::Attribute => "@*".to_string(),
            other => other.to_string(),
        };
        Self::new(NodeTest::Kind(kind), text)
    }

    /// An element name test in no namespace.
    pub fn element(names: &mut NamePool, local: &str) -> Self {
        let code = names.intern_local(local);
        Self::new(NodeTest::Name(NodeKind::Element, code), local)
    }

    /// An attribute name test in no namespace.
    pub fn attribute(names: &mut NamePool, local: &str) -> Self {
        let code = names.intern_local(local);
        Self::new(NodeTest::Name(NodeKind::Attribute, code), format!("@{local}"))
    }

    /// `empty-sequence()`
    #[must_use]
    pub fn empty() -> Self {
        Self::new(NodeTest::Empty, "empty-sequence()")
    }

    /// Returns the node test.
    #[must_use]
    pub fn test(&self) -> NodeTest {
        self.test
    }

    /// Tests a node's kind and name against the node test.
    #[must_use]
    pub fn test_node(&self, node: NodeId, ctx: &Context<'_>) -> bool {
        let tree = ctx.tree();
        match self.test {
            NodeTest::AnyNode => tree.node_kind(node).is_some(),
            NodeTest::Kind(kind) => tree.node_kind(node) == Some(kind),
            NodeTest::Name(kind, name) => {
                tree.node_kind(node) == Some(kind) && tree.node_name(node) == Some(name)
            }
            NodeTest::Empty => false,
        }
    }
}

impl fmt::Display for NodeTestPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Pattern for NodeTestPattern {
    fn matches(&self, node: NodeId, ctx: &Context<'_>) -> Result<bool> {
        Ok(self.test_node(node, ctx))
    }

    fn default_priority(&self) -> f64 {
        match self.test {
            NodeTest::Name(..) => 0.0,
            NodeTest::AnyNode | NodeTest::Kind(_) | NodeTest::Empty => -0.5,
        }
    }

    fn classify(&self) -> PatternClass {
        match self.test {
            NodeTest::AnyNode => PatternClass::Unclassified,
            NodeTest::Kind(kind) => PatternClass::Kind(kind),
            NodeTest::Name(kind, name) => PatternClass::KindAndName(kind, name),
            NodeTest::Empty => PatternClass::Never,
        }
    }

    fn is_node_test(&self) -> bool {
        self.test != NodeTest::Empty
    }
}

// =============================================================================
// Union Patterns
// =============================================================================

/// `left | right`
#[derive(Clone)]
pub struct UnionPattern {
    left: Arc<dyn Pattern>,
    right: Arc<dyn Pattern>,
}

impl UnionPattern {
    /// Creates a union of two patterns.
    #[must_use]
    pub fn new(left: Arc<dyn Pattern>, right: Arc<dyn Pattern>) -> Self {
        Self { left, right }
    }
}

impl fmt::Display for UnionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.left, self.right)
    }
}

impl fmt::Debug for UnionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnionPattern({self})")
    }
}

impl Pattern for UnionPattern {
    fn matches(&self, node: NodeId, ctx: &Context<'_>) -> Result<bool> {
        Ok(self.left.matches(node, ctx)? || self.right.matches(node, ctx)?)
    }

    fn default_priority(&self) -> f64 {
        0.5
    }

    fn classify(&self) -> PatternClass {
        match (self.left.classify(), self.right.classify()) {
            (PatternClass::Never, other) | (other, PatternClass::Never) => other,
            (a, b) if a == b => a,
            (
                PatternClass::Kind(k1) | PatternClass::KindAndName(k1, _),
                PatternClass::Kind(k2) | PatternClass::KindAndName(k2, _),
            ) if k1 == k2 => PatternClass::Kind(k1),
            _ => PatternClass::Unclassified,
        }
    }

    fn union_branches(&self) -> Option<(Arc<dyn Pattern>, Arc<dyn Pattern>)> {
        Some((Arc::clone(&self.left), Arc::clone(&self.right)))
    }
}

// =============================================================================
// Predicate Patterns
// =============================================================================

/// Predicate evaluated against a node that already passed the base test.
pub type NodePredicate = dyn Fn(NodeId, &Context<'_>) -> Result<bool> + Send + Sync;

/// A node test refined by a predicate, such as `para[@type='note']`.
///
/// The predicate may be arbitrarily complex (it may even perform key
/// lookups through the context), so rules using it never skip the match
/// test.
#[derive(Clone)]
pub struct PredicatePattern {
    base: NodeTestPattern,
    predicate: Arc<NodePredicate>,
    text: Arc<str>,
    priority: f64,
}

impl PredicatePattern {
    /// Creates a predicate pattern over a base node test.
    pub fn new<F>(base: NodeTestPattern, text: impl Into<Arc<str>>, predicate: F) -> Self
    where
        F: Fn(NodeId, &Context<'_>) -> Result<bool> + Send + Sync + 'static,
    {
        Self {
            base,
            predicate: Arc::new(predicate),
            text: text.into(),
            priority: 0.5,
        }
    }

    /// Overrides the default priority (0.5).
    #[must_use]
    pub fn with_default_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }
}

impl fmt::Display for PredicatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for PredicatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PredicatePattern({})", self.text)
    }
}

impl Pattern for PredicatePattern {
    fn matches(&self, node: NodeId, ctx: &Context<'_>) -> Result<bool> {
        if !self.base.test_node(node, ctx) {
            return Ok(false);
        }
        (self.predicate)(node, &ctx.seated_on(node))
    }

    fn default_priority(&self) -> f64 {
        self.priority
    }

    fn classify(&self) -> PatternClass {
        self.base.classify()
    }
}
