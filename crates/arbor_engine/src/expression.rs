//! Use-expressions: compute the key values of a matched node.

use std::fmt;
use std::sync::Arc;

use arbor_foundation::{AtomicValue, Error, ErrorKind, NameCode, NamePool, NodeId, PrimitiveType, Result};

use crate::context::Context;

/// A lazily evaluated sequence of atomic values.
pub type AtomicSequence<'a> = Box<dyn Iterator<Item = Result<AtomicValue>> + 'a>;

/// An expression evaluated with a matched node as the context item.
///
/// `Display` gives the expression's source text.
pub trait UseExpression: fmt::Display + Send + Sync {
    /// Evaluates the expression.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression cannot be evaluated at all; errors
    /// for individual items are reported through the sequence.
    fn evaluate<'a>(&'a self, ctx: &Context<'a>) -> Result<AtomicSequence<'a>>;
}

fn context_item(ctx: &Context<'_>) -> Result<NodeId> {
    ctx.item().ok_or_else(|| {
        Error::new(ErrorKind::Expression(
            "the context item is absent".to_string(),
        ))
    })
}

/// `.`: the string value of the context node, as `xs:untypedAtomic`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContextStringValue;

impl fmt::Display for ContextStringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(".")
    }
}

impl UseExpression for ContextStringValue {
    fn evaluate<'a>(&'a self, ctx: &Context<'a>) -> Result<AtomicSequence<'a>> {
        let node = context_item(ctx)?;
        let value = ctx.tree().string_value(node).map(AtomicValue::UntypedAtomic);
        Ok(Box::new(value.into_iter().map(Ok)))
    }
}

/// `@name`: the value of one attribute of the context node, as
/// `xs:untypedAtomic`. Empty if the attribute is absent.
#[derive(Clone, Debug)]
pub struct AttributeValue {
    name: NameCode,
    text: Arc<str>,
}

impl AttributeValue {
    /// Creates an attribute reference in no namespace.
    pub fn new(names: &mut NamePool, local: &str) -> Self {
        Self {
            name: names.intern_local(local),
            text: format!("@{local}").into(),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl UseExpression for AttributeValue {
    fn evaluate<'a>(&'a self, ctx: &Context<'a>) -> Result<AtomicSequence<'a>> {
        let node = context_item(ctx)?;
        let tree = ctx.tree();
        let value = tree
            .attribute(node, self.name)
            .and_then(|attr| tree.string_value(attr))
            .map(AtomicValue::UntypedAtomic);
        Ok(Box::new(value.into_iter().map(Ok)))
    }
}

/// Casts every item of an inner expression to a primitive type.
#[derive(Clone)]
pub struct CastExpression {
    inner: Arc<dyn UseExpression>,
    target: PrimitiveType,
}

impl CastExpression {
    /// Creates `inner cast as target`.
    #[must_use]
    pub fn new(inner: Arc<dyn UseExpression>, target: PrimitiveType) -> Self {
        Self { inner, target }
    }
}

impl fmt::Display for CastExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cast as {}", self.inner, self.target)
    }
}

impl fmt::Debug for CastExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CastExpression({self})")
    }
}

impl UseExpression for CastExpression {
    fn evaluate<'a>(&'a self, ctx: &Context<'a>) -> Result<AtomicSequence<'a>> {
        let target = self.target;
        let items = self.inner.evaluate(ctx)?;
        Ok(Box::new(
            items.map(move |item| item.and_then(|value| value.convert(target))),
        ))
    }
}

/// Host function computing key values for a node.
pub type UseFunction = dyn Fn(&Context<'_>) -> Result<Vec<AtomicValue>> + Send + Sync;

/// A use-expression backed by a closure.
///
/// The closure receives the context seated on the matched node, so it can
/// navigate the tree or perform further key lookups.
#[derive(Clone)]
pub struct FunctionExpression {
    function: Arc<UseFunction>,
    text: Arc<str>,
}

impl FunctionExpression {
    /// Wraps a closure; `text` is the expression's source text.
    pub fn new<F>(text: impl Into<Arc<str>>, function: F) -> Self
    where
        F: Fn(&Context<'_>) -> Result<Vec<AtomicValue>> + Send + Sync + 'static,
    {
        Self {
            function: Arc::new(function),
            text: text.into(),
        }
    }
}

impl fmt::Display for FunctionExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for FunctionExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionExpression({})", self.text)
    }
}

impl UseExpression for FunctionExpression {
    fn evaluate<'a>(&'a self, ctx: &Context<'a>) -> Result<AtomicSequence<'a>> {
        let values = (self.function)(ctx)?;
        Ok(Box::new(values.into_iter().map(Ok)))
    }
}
