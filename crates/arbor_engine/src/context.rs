//! Evaluation context handed to patterns and use-expressions.

use std::fmt;

use arbor_foundation::{NodeId, TreeModel};

use crate::key::KeyManager;

/// A cheap, copyable evaluation context.
///
/// Holds the tree being navigated, the key manager (so expressions can call
/// back into key lookups), and the context item.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    tree: &'a dyn TreeModel,
    keys: Option<&'a KeyManager>,
    item: Option<NodeId>,
}

impl<'a> Context<'a> {
    /// Creates a context over a tree, with no context item.
    #[must_use]
    pub fn new(tree: &'a dyn TreeModel) -> Self {
        Self {
            tree,
            keys: None,
            item: None,
        }
    }

    /// Makes a key manager reachable from this context.
    #[must_use]
    pub fn with_keys(mut self, keys: &'a KeyManager) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Returns a copy of this context with `node` as the context item.
    #[must_use]
    pub fn seated_on(mut self, node: NodeId) -> Self {
        self.item = Some(node);
        self
    }

    /// Returns the tree model.
    #[must_use]
    pub fn tree(&self) -> &'a dyn TreeModel {
        self.tree
    }

    /// Returns the key manager, if one is attached.
    #[must_use]
    pub fn keys(&self) -> Option<&'a KeyManager> {
        self.keys
    }

    /// Returns the context item.
    #[must_use]
    pub fn item(&self) -> Option<NodeId> {
        self.item
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("item", &self.item)
            .field("keys", &self.keys.is_some())
            .finish_non_exhaustive()
    }
}
