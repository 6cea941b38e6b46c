//! Immutable documents stored as a flat arena in document order.
//!
//! Each node records the index one past its last descendant, so subtrees
//! are contiguous ranges and sibling traversal is a jump rather than a walk.

// Node counts are bounded by u32 at build time.
#![allow(clippy::cast_possible_truncation)]

use std::sync::Arc;

use arbor_foundation::{DocumentId, NameCode, NodeId, NodeKind};

/// One node in the arena.
#[derive(Clone, Debug)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) name: Option<NameCode>,
    pub(crate) parent: Option<u32>,
    /// Content of text, comment, attribute, PI and namespace nodes.
    pub(crate) value: Option<Arc<str>>,
    /// One past the last node of this subtree.
    pub(crate) end: u32,
}

/// An immutable tree.
///
/// Attributes and namespaces of an element immediately follow it, before its
/// children. Index 0 is the document node.
#[derive(Clone, Debug)]
pub struct Document {
    id: DocumentId,
    nodes: Vec<NodeData>,
}

impl Document {
    pub(crate) fn from_parts(id: DocumentId, nodes: Vec<NodeData>) -> Self {
        Self { id, nodes }
    }

    /// Returns this document's id.
    #[must_use]
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Returns the document node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.id.root()
    }

    /// Returns the number of nodes, the document node included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the document holds only its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn data(&self, node: NodeId) -> Option<&NodeData> {
        if node.document != self.id {
            return None;
        }
        self.nodes.get(node.index as usize)
    }

    fn handle(&self, index: u32) -> NodeId {
        NodeId::new(self.id, index)
    }

    /// Returns the kind of a node.
    #[must_use]
    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.data(node).map(|d| d.kind)
    }

    /// Returns the name of a node, if it has one.
    #[must_use]
    pub fn name(&self, node: NodeId) -> Option<NameCode> {
        self.data(node).and_then(|d| d.name)
    }

    /// Returns the parent of a node.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.data(node)
            .and_then(|d| d.parent)
            .map(|p| self.handle(p))
    }

    /// Returns the string value of a node.
    ///
    /// For documents and elements this is the concatenation of all
    /// descendant text nodes.
    #[must_use]
    pub fn string_value(&self, node: NodeId) -> Option<Arc<str>> {
        let data = self.data(node)?;
        match data.kind {
            NodeKind::Document | NodeKind::Element => {
                let range = (node.index as usize + 1)..(data.end as usize);
                let mut texts = self.nodes[range]
                    .iter()
                    .filter(|d| d.kind == NodeKind::Text)
                    .filter_map(|d| d.value.as_deref());
                match (texts.next(), texts.next()) {
                    (None, _) => Some("".into()),
                    (Some(only), None) => Some(only.into()),
                    (Some(first), Some(second)) => {
                        let mut joined = String::from(first);
                        joined.push_str(second);
                        texts.for_each(|t| joined.push_str(t));
                        Some(joined.into())
                    }
                }
            }
            _ => Some(data.value.clone().unwrap_or_else(|| "".into())),
        }
    }

    /// Finds an attribute of an element by name.
    #[must_use]
    pub fn attribute(&self, element: NodeId, name: NameCode) -> Option<NodeId> {
        let data = self.data(element)?;
        if data.kind != NodeKind::Element {
            return None;
        }
        ((element.index + 1)..data.end)
            .take_while(|&i| {
                matches!(
                    self.nodes[i as usize].kind,
                    NodeKind::Attribute | NodeKind::Namespace
                )
            })
            .find(|&i| {
                let d = &self.nodes[i as usize];
                d.kind == NodeKind::Attribute && d.name == Some(name)
            })
            .map(|i| self.handle(i))
    }

    /// Iterates the children of a node (attributes and namespaces excluded).
    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let (next, end) = match self.data(node) {
            Some(d) => (node.index + 1, d.end),
            None => (0, 0),
        };
        Children {
            document: self,
            next,
            end,
        }
    }

    /// Iterates every node in document order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(|i| self.handle(i))
    }
}

struct Children<'a> {
    document: &'a Document,
    next: u32,
    end: u32,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while self.next < self.end {
            let index = self.next;
            let data = &self.document.nodes[index as usize];
            self.next = data.end;
            if !matches!(data.kind, NodeKind::Attribute | NodeKind::Namespace) {
                return Some(self.document.handle(index));
            }
        }
        None
    }
}
