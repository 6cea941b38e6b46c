//! Built key indexes and the sequences they return.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use arbor_foundation::{AtomicValue, NodeId, NodeList, PrimitiveType};

use crate::collation::Collation;

/// A hashable index key.
///
/// Strings are stored as collation keys; numbers as the bit pattern of a
/// canonical `f64`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyValue {
    /// A (collated) string value.
    Text(Arc<str>),
    /// A number, as `f64` bits with `-0.0` folded into `0.0`.
    Number(u64),
    /// A boolean.
    Boolean(bool),
}

impl KeyValue {
    /// Builds the index key for a string value.
    #[must_use]
    pub fn text(value: &str, collation: Option<&Arc<dyn Collation>>) -> Self {
        match collation {
            Some(c) => Self::Text(c.collation_key(value)),
            None => Self::Text(value.into()),
        }
    }

    /// Builds the index key for a number. `NaN` equals nothing, so it has no
    /// key.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn number(value: f64) -> Option<Self> {
        if value.is_nan() {
            return None;
        }
        let canonical = if value == 0.0 { 0.0_f64 } else { value };
        Some(Self::Number(canonical.to_bits()))
    }

    /// Builds the index key for an atomic value, using its own type.
    #[must_use]
    pub fn from_atomic(value: &AtomicValue, collation: Option<&Arc<dyn Collation>>) -> Option<Self> {
        match value {
            AtomicValue::String(s) | AtomicValue::UntypedAtomic(s) | AtomicValue::AnyUri(s) => {
                Some(Self::text(s, collation))
            }
            AtomicValue::Boolean(b) => Some(Self::Boolean(*b)),
            other => other.as_double().and_then(Self::number),
        }
    }
}

// =============================================================================
// Key Index
// =============================================================================

/// The index of one key over one document for one sought type.
#[derive(Clone, Debug, Default)]
pub struct KeyIndex {
    entries: HashMap<KeyValue, NodeList>,
    found_types: BTreeSet<PrimitiveType>,
}

impl KeyIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Files `node` under `value`.
    ///
    /// While the first definition of a key is indexed, nodes arrive in
    /// document order and only need comparing with the last entry.
    pub(crate) fn insert(&mut self, value: KeyValue, node: NodeId, in_order: bool) {
        let nodes = self.entries.entry(value).or_default();
        if in_order {
            nodes.push_in_order(node);
        } else {
            nodes.insert_in_order(node);
        }
    }

    pub(crate) fn record_type(&mut self, ty: PrimitiveType) {
        self.found_types.insert(ty);
    }

    /// The nodes filed under `value`.
    #[must_use]
    pub fn get(&self, value: &KeyValue) -> Option<&NodeList> {
        self.entries.get(value)
    }

    /// Number of distinct key values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no node was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Primitive types produced by the use-expressions while building, if
    /// they were recorded.
    pub fn found_types(&self) -> impl Iterator<Item = PrimitiveType> + '_ {
        self.found_types.iter().copied()
    }
}

// =============================================================================
// Node Sequence
// =============================================================================

/// The result of a key lookup: nodes in document order, without duplicates.
///
/// Owns a cheap snapshot of the index entry, so it stays valid after the
/// index cache is unlocked or the document's indexes are released.
#[derive(Clone, Debug, Default)]
pub struct NodeSequence {
    nodes: NodeList,
    position: usize,
}

impl NodeSequence {
    pub(crate) fn new(nodes: NodeList) -> Self {
        Self { nodes, position: 0 }
    }

    /// An empty sequence.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The nodes not yet returned.
    #[must_use]
    pub fn into_list(self) -> NodeList {
        if self.position == 0 {
            return self.nodes;
        }
        self.nodes.iter().skip(self.position).collect()
    }
}

impl Iterator for NodeSequence {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.nodes.get(self.position)?;
        self.position += 1;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.nodes.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for NodeSequence {}
