//! The tree collaborator interface.
//!
//! The engine never owns trees. It navigates them through [`TreeModel`] and
//! learns about discarded documents through [`DocumentObserver`].

use std::sync::Arc;

use crate::name::NameCode;
use crate::node::{DocumentId, NodeId, NodeKind};

/// Read access to one or more trees.
///
/// Methods taking a handle the model does not know return `None` (or an
/// empty iterator) rather than panicking.
pub trait TreeModel: Send + Sync {
    /// Returns the kind of a node.
    fn node_kind(&self, node: NodeId) -> Option<NodeKind>;

    /// Returns the name of an element, attribute, processing instruction or
    /// namespace node.
    fn node_name(&self, node: NodeId) -> Option<NameCode>;

    /// Returns the string value of a node.
    fn string_value(&self, node: NodeId) -> Option<Arc<str>>;

    /// Returns the parent of a node (the owning element, for attributes).
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the attribute of an element with the given name.
    fn attribute(&self, element: NodeId, name: NameCode) -> Option<NodeId>;

    /// Iterates the children of a node in document order.
    fn children(&self, node: NodeId) -> Box<dyn Iterator<Item = NodeId> + '_>;

    /// Iterates every node of a document, the root included, in document
    /// order. Attributes and namespaces follow their element and precede its
    /// children.
    fn document_order_nodes(&self, document: DocumentId) -> Box<dyn Iterator<Item = NodeId> + '_>;
}

/// Notified when a document is discarded, so per-document state can be
/// released.
pub trait DocumentObserver: Send + Sync {
    /// Called once when a document leaves its pool.
    fn document_discarded(&self, document: DocumentId);
}
