//! Persistent node lists with structural sharing.
//!
//! A thin wrapper around the `im` crate's persistent vector, specialised to
//! node handles kept in document order with no duplicates.

use std::fmt;
use std::iter::FromIterator;

use crate::node::NodeId;

/// A document-ordered, duplicate-free list of nodes.
///
/// Cloning is O(1), so a caller can take a snapshot of an index entry and
/// iterate it after the index lock has been released.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct NodeList(im::Vector<NodeId>);

impl NodeList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self(im::Vector::new())
    }

    /// Creates a list holding one node.
    #[must_use]
    pub fn unit(node: NodeId) -> Self {
        Self(im::Vector::unit(node))
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets a node by position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.0.get(index).copied()
    }

    /// Returns the last node.
    #[must_use]
    pub fn last(&self) -> Option<NodeId> {
        self.0.last().copied()
    }

    /// Appends a node that is known to be at or after the current last node.
    ///
    /// Appending the node that is already last is a no-op.
    pub fn push_in_order(&mut self, node: NodeId) {
        if self.0.last() != Some(&node) {
            self.0.push_back(node);
        }
    }

    /// Inserts a node at its document-order position, unless already present.
    ///
    /// Returns true if the node was inserted.
    pub fn insert_in_order(&mut self, node: NodeId) -> bool {
        if self.0.last().is_none_or(|last| *last < node) {
            self.0.push_back(node);
            return true;
        }
        match self.0.binary_search(&node) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, node);
                true
            }
        }
    }

    /// Merges two lists into one, in document order with duplicates removed.
    #[must_use]
    pub fn union(&self, other: &NodeList) -> NodeList {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        let mut merged = im::Vector::new();
        let mut left = self.0.iter().peekable();
        let mut right = other.0.iter().peekable();
        loop {
            let next = match (left.peek(), right.peek()) {
                (Some(a), Some(b)) if a < b => left.next(),
                (Some(a), Some(b)) if b < a => right.next(),
                (Some(_), Some(_)) => {
                    right.next();
                    left.next()
                }
                (Some(_), None) => left.next(),
                (None, Some(_)) => right.next(),
                (None, None) => break,
            };
            if let Some(node) = next {
                merged.push_back(*node);
            }
        }
        NodeList(merged)
    }

    /// Iterates the nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Debug for NodeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl FromIterator<NodeId> for NodeList {
    /// Collects nodes, sorting them and removing duplicates.
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        let mut nodes: Vec<NodeId> = iter.into_iter().collect();
        nodes.sort_unstable();
        nodes.dedup();
        Self(nodes.into_iter().collect())
    }
}

impl IntoIterator for NodeList {
    type Item = NodeId;
    type IntoIter = im::vector::ConsumingIter<NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
