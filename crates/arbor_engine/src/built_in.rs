//! Built-in template rules: what a driver does for a node no rule matches.

use arbor_foundation::NodeKind;

/// The built-in action for one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltInAction {
    /// Apply templates to the node's children, in the current mode.
    ApplyToChildren,
    /// Write the node's string value as text.
    CopyStringValue,
    /// Produce nothing.
    Skip,
}

/// A set of built-in template rules, carried by every mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum BuiltInRuleSet {
    /// The XSLT 1.0 and 2.0 rules: recurse through documents and elements,
    /// copy text and attribute values, ignore everything else.
    #[default]
    Stringify,
}

impl BuiltInRuleSet {
    /// The action this rule set takes for a node of `kind`.
    #[must_use]
    pub fn action(self, kind: NodeKind) -> BuiltInAction {
        match self {
            Self::Stringify => match kind {
                NodeKind::Document | NodeKind::Element => BuiltInAction::ApplyToChildren,
                NodeKind::Text | NodeKind::Attribute => BuiltInAction::CopyStringValue,
                NodeKind::Comment | NodeKind::ProcessingInstruction | NodeKind::Namespace => {
                    BuiltInAction::Skip
                }
            },
        }
    }
}
