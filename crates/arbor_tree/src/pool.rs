//! The document pool: a [`TreeModel`] over every live document.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use arbor_foundation::{DocumentId, DocumentObserver, NameCode, NodeId, NodeKind, TreeModel};
use tracing::debug;

use crate::document::Document;

/// Owns documents and tells observers when they are discarded.
///
/// Observers are held weakly; dropping an observer unregisters it.
#[derive(Default)]
pub struct DocumentPool {
    documents: HashMap<DocumentId, Document>,
    observers: Vec<Weak<dyn DocumentObserver>>,
    next_id: u64,
}

impl DocumentPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a fresh document id for a document about to be built.
    pub fn allocate_id(&mut self) -> DocumentId {
        self.next_id += 1;
        DocumentId(self.next_id)
    }

    /// Adds a built document, replacing any document with the same id.
    pub fn add(&mut self, document: Document) -> DocumentId {
        let id = document.id();
        self.next_id = self.next_id.max(id.0);
        self.documents.insert(id, document);
        id
    }

    /// Gets a document by id.
    #[must_use]
    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    /// Returns true if the pool holds the document.
    #[must_use]
    pub fn contains(&self, id: DocumentId) -> bool {
        self.documents.contains_key(&id)
    }

    /// Returns the number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if the pool holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Registers an observer to be told about discarded documents.
    pub fn register_observer<O: DocumentObserver + 'static>(&mut self, observer: &Arc<O>) {
        let weak = Arc::downgrade(observer);
        let weak: Weak<dyn DocumentObserver> = weak;
        self.observers.push(weak);
    }

    /// Removes a document and notifies live observers.
    ///
    /// Returns the document, or `None` if it was not in the pool (in which
    /// case nobody is notified).
    pub fn discard(&mut self, id: DocumentId) -> Option<Document> {
        let document = self.documents.remove(&id)?;
        self.observers.retain(|weak| weak.strong_count() > 0);
        debug!(document = %id, observers = self.observers.len(), "document discarded");
        for observer in self.observers.iter().filter_map(Weak::upgrade) {
            observer.document_discarded(id);
        }
        Some(document)
    }

    fn document_of(&self, node: NodeId) -> Option<&Document> {
        self.documents.get(&node.document)
    }
}

impl TreeModel for DocumentPool {
    fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.document_of(node)?.kind(node)
    }

    fn node_name(&self, node: NodeId) -> Option<NameCode> {
        self.document_of(node)?.name(node)
    }

    fn string_value(&self, node: NodeId) -> Option<Arc<str>> {
        self.document_of(node)?.string_value(node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.document_of(node)?.parent(node)
    }

    fn attribute(&self, element: NodeId, name: NameCode) -> Option<NodeId> {
        self.document_of(element)?.attribute(element, name)
    }

    fn children(&self, node: NodeId) -> Box<dyn Iterator<Item = NodeId> + '_> {
        match self.document_of(node) {
            Some(document) => Box::new(document.children(node)),
            None => Box::new(std::iter::empty()),
        }
    }

    fn document_order_nodes(&self, document: DocumentId) -> Box<dyn Iterator<Item = NodeId> + '_> {
        match self.documents.get(&document) {
            Some(document) => Box::new(document.nodes()),
            None => Box::new(std::iter::empty()),
        }
    }
}
