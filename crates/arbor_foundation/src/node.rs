//! Node and document handles.
//!
//! Trees are owned elsewhere; the engine only ever holds these small `Copy`
//! handles. A node's `index` is its position in document order, so comparing
//! two nodes of the same document is a plain integer comparison.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identity of a document (the root of one tree).
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DocumentId(pub u64);

impl DocumentId {
    /// Returns the handle of this document's root node.
    #[must_use]
    pub const fn root(self) -> NodeId {
        NodeId::new(self, 0)
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc{}", self.0)
    }
}

/// Handle to a node within a document.
///
/// # Layout
/// - `document`: the owning document
/// - `index`: position of the node in document order (root is 0)
///
/// The derived ordering is document order within one document; nodes of
/// different documents are ordered by document id, which is stable but
/// otherwise arbitrary.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeId {
    /// The document this node belongs to.
    pub document: DocumentId,
    /// Position in document order.
    pub index: u32,
}

impl NodeId {
    /// Creates a node handle.
    #[must_use]
    pub const fn new(document: DocumentId, index: u32) -> Self {
        Self { document, index }
    }

    /// Returns true if this is the document root.
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.index == 0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}#{})", self.document.0, self.index)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.document, self.index)
    }
}

/// The seven kinds of node in the tree model.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeKind {
    /// Document (root) node.
    Document,
    /// Element node.
    Element,
    /// Attribute node.
    Attribute,
    /// Text node.
    Text,
    /// Comment node.
    Comment,
    /// Processing instruction node.
    ProcessingInstruction,
    /// Namespace node.
    Namespace,
}

impl NodeKind {
    /// Number of node kinds.
    pub const COUNT: usize = 7;

    /// All node kinds, in declaration order.
    pub const ALL: [NodeKind; Self::COUNT] = [
        Self::Document,
        Self::Element,
        Self::Attribute,
        Self::Text,
        Self::Comment,
        Self::ProcessingInstruction,
        Self::Namespace,
    ];

    /// Dense index of this kind, suitable for array lookup.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Document => 0,
            Self::Element => 1,
            Self::Attribute => 2,
            Self::Text => 3,
            Self::Comment => 4,
            Self::ProcessingInstruction => 5,
            Self::Namespace => 6,
        }
    }

    /// Returns true for the kinds whose nodes are looked up by name
    /// (elements and attributes).
    #[must_use]
    pub const fn is_named(self) -> bool {
        matches!(self, Self::Element | Self::Attribute)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Document => "document-node()",
            Self::Element => "element()",
            Self::Attribute => "attribute()",
            Self::Text => "text()",
            Self::Comment => "comment()",
            Self::ProcessingInstruction => "processing-instruction()",
            Self::Namespace => "namespace-node()",
        };
        f.write_str(name)
    }
}
