//! Event-style document construction.

use std::sync::Arc;

use arbor_foundation::{DocumentId, Error, ErrorKind, NameCode, NamePool, NodeId, NodeKind, QName, Result};

use crate::document::{Document, NodeData};

/// Builds a [`Document`] from a stream of start/end/content events.
///
/// Node handles are returned as nodes are created, so callers can refer to
/// them before the document is finished. Misuse (an attribute after content,
/// an unbalanced `end_element`) is recorded and reported by [`finish`].
///
/// [`finish`]: DocumentBuilder::finish
pub struct DocumentBuilder<'p> {
    id: DocumentId,
    names: &'p mut NamePool,
    nodes: Vec<NodeData>,
    /// Indexes of open elements; the document node is always at the bottom.
    open: Vec<u32>,
    attributes_allowed: bool,
    error: Option<Error>,
}

impl<'p> DocumentBuilder<'p> {
    /// Starts a document, interning names into `names`.
    pub fn new(id: DocumentId, names: &'p mut NamePool) -> Self {
        Self {
            id,
            names,
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                name: None,
                parent: None,
                value: None,
                end: 0,
            }],
            open: vec![0],
            attributes_allowed: false,
            error: None,
        }
    }

    fn fail(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(Error::new(ErrorKind::MalformedTree(message.into())));
        }
    }

    fn push(&mut self, kind: NodeKind, name: Option<NameCode>, value: Option<Arc<str>>) -> NodeId {
        let Ok(index) = u32::try_from(self.nodes.len()) else {
            self.fail("too many nodes");
            return NodeId::new(self.id, u32::MAX);
        };
        let parent = self.open.last().copied();
        self.nodes.push(NodeData {
            kind,
            name,
            parent,
            value,
            end: index + 1,
        });
        NodeId::new(self.id, index)
    }

    fn push_content(&mut self, kind: NodeKind, name: Option<NameCode>, value: Option<Arc<str>>) -> NodeId {
        self.attributes_allowed = false;
        self.push(kind, name, value)
    }

    /// Opens an element in no namespace.
    pub fn start_element(&mut self, local: &str) -> NodeId {
        let name = self.names.intern_local(local);
        self.start_element_code(name)
    }

    /// Opens an element with a qualified name.
    pub fn start_element_qname(&mut self, name: &QName) -> NodeId {
        let name = self.names.intern(name);
        self.start_element_code(name)
    }

    fn start_element_code(&mut self, name: NameCode) -> NodeId {
        let node = self.push_content(NodeKind::Element, Some(name), None);
        self.open.push(node.index);
        self.attributes_allowed = true;
        node
    }

    /// Adds an attribute to the element just opened.
    pub fn attribute(&mut self, local: &str, value: &str) -> NodeId {
        let name = self.names.intern_local(local);
        if !self.attributes_allowed {
            self.fail(format!("attribute {local} added after element content"));
        }
        self.push(NodeKind::Attribute, Some(name), Some(value.into()))
    }

    /// Adds a namespace node to the element just opened.
    pub fn namespace(&mut self, prefix: &str, uri: &str) -> NodeId {
        let name = self.names.intern_local(prefix);
        if !self.attributes_allowed {
            self.fail(format!("namespace {prefix} added after element content"));
        }
        self.push(NodeKind::Namespace, Some(name), Some(uri.into()))
    }

    /// Adds a text node.
    pub fn text(&mut self, content: &str) -> NodeId {
        self.push_content(NodeKind::Text, None, Some(content.into()))
    }

    /// Adds a comment.
    pub fn comment(&mut self, content: &str) -> NodeId {
        self.push_content(NodeKind::Comment, None, Some(content.into()))
    }

    /// Adds a processing instruction.
    pub fn processing_instruction(&mut self, target: &str, content: &str) -> NodeId {
        let name = self.names.intern_local(target);
        self.push_content(NodeKind::ProcessingInstruction, Some(name), Some(content.into()))
    }

    /// Adds an element holding a single text node.
    pub fn text_element(&mut self, local: &str, content: &str) -> NodeId {
        let element = self.start_element(local);
        self.text(content);
        self.end_element();
        element
    }

    /// Closes the innermost open element.
    pub fn end_element(&mut self) {
        if self.open.len() <= 1 {
            self.fail("end_element without a matching start_element");
            return;
        }
        self.attributes_allowed = false;
        if let Some(index) = self.open.pop() {
            self.close(index);
        }
    }

    fn close(&mut self, index: u32) {
        let end = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
        if let Some(data) = self.nodes.get_mut(index as usize) {
            data.end = end;
        }
    }

    /// Finishes the document.
    ///
    /// # Errors
    ///
    /// Returns `MalformedTree` if an element is still open or any event was
    /// out of order.
    pub fn finish(mut self) -> Result<Document> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        if self.open.len() > 1 {
            return Err(Error::new(ErrorKind::MalformedTree(format!(
                "{} element(s) left open",
                self.open.len() - 1
            ))));
        }
        self.close(0);
        Ok(Document::from_parts(self.id, self.nodes))
    }
}
