//! Compiled key declarations.

use std::fmt;
use std::sync::Arc;

use arbor_foundation::{Error, QName, Result};

use crate::collation::Collation;
use crate::expression::UseExpression;
use crate::pattern::Pattern;

/// One `xsl:key` declaration: which nodes to index and under which values.
#[derive(Clone)]
pub struct KeyDefinition {
    matcher: Arc<dyn Pattern>,
    use_expression: Arc<dyn UseExpression>,
    collation_name: Option<String>,
    collation: Option<Arc<dyn Collation>>,
    backwards_compatible: bool,
    general_comparison: bool,
}

impl KeyDefinition {
    /// Creates a definition using the default collation.
    #[must_use]
    pub fn new(matcher: Arc<dyn Pattern>, use_expression: Arc<dyn UseExpression>) -> Self {
        Self {
            matcher,
            use_expression,
            collation_name: None,
            collation: None,
            backwards_compatible: false,
            general_comparison: false,
        }
    }

    /// Uses an explicit collation for string values.
    #[must_use]
    pub fn with_collation(mut self, collation: Arc<dyn Collation>) -> Self {
        self.collation_name = Some(collation.uri().to_string());
        self.collation = Some(collation);
        self
    }

    /// Marks the declaration as running in backwards-compatible mode: every
    /// value is indexed as a string.
    #[must_use]
    pub fn with_backwards_compatible(mut self, enabled: bool) -> Self {
        self.backwards_compatible = enabled;
        self
    }

    /// Selects general-comparison semantics: untyped values are cast to the
    /// sought type, and values that cannot be compared are errors rather
    /// than skipped.
    #[must_use]
    pub fn with_general_comparison(mut self, enabled: bool) -> Self {
        self.general_comparison = enabled;
        self
    }

    /// The match pattern.
    #[must_use]
    pub fn matcher(&self) -> &Arc<dyn Pattern> {
        &self.matcher
    }

    /// The use-expression.
    #[must_use]
    pub fn use_expression(&self) -> &Arc<dyn UseExpression> {
        &self.use_expression
    }

    /// The collation URI, or `None` for the default collation.
    #[must_use]
    pub fn collation_name(&self) -> Option<&str> {
        self.collation_name.as_deref()
    }

    /// The collation, or `None` for codepoint comparison.
    #[must_use]
    pub fn collation(&self) -> Option<&Arc<dyn Collation>> {
        self.collation.as_ref()
    }

    /// True if declared in backwards-compatible mode.
    #[must_use]
    pub fn is_backwards_compatible(&self) -> bool {
        self.backwards_compatible
    }

    /// True if general-comparison semantics apply.
    #[must_use]
    pub fn is_general_comparison(&self) -> bool {
        self.general_comparison
    }

    /// Two definitions are duplicates if they have the same pattern and the
    /// same use-expression, by identity or by source text.
    #[must_use]
    pub fn is_duplicate_of(&self, other: &KeyDefinition) -> bool {
        let same_match = Arc::ptr_eq(&self.matcher, &other.matcher)
            || self.matcher.to_string() == other.matcher.to_string();
        let same_use = Arc::ptr_eq(&self.use_expression, &other.use_expression)
            || self.use_expression.to_string() == other.use_expression.to_string();
        same_match && same_use
    }
}

impl fmt::Debug for KeyDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDefinition")
            .field("match", &self.matcher.to_string())
            .field("use", &self.use_expression.to_string())
            .field("collation", &self.collation_name)
            .field("backwards_compatible", &self.backwards_compatible)
            .field("general_comparison", &self.general_comparison)
            .finish()
    }
}

// =============================================================================
// Key Definition Set
// =============================================================================

/// Every definition sharing one key name.
#[derive(Clone, Debug)]
pub struct KeyDefinitionSet {
    name: QName,
    ordinal: usize,
    members: Vec<KeyDefinition>,
    collation_name: Option<String>,
    backwards_compatible: bool,
}

impl KeyDefinitionSet {
    /// Creates an empty set. `ordinal` is unique within a key manager.
    #[must_use]
    pub fn new(name: QName, ordinal: usize) -> Self {
        Self {
            name,
            ordinal,
            members: Vec::new(),
            collation_name: None,
            backwards_compatible: false,
        }
    }

    /// Adds a definition.
    ///
    /// Returns `false` if an identical definition was already present, in
    /// which case the set is unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CollationConflict` if the definition's collation differs from
    /// the one already in force for this key.
    pub fn add(&mut self, definition: KeyDefinition) -> Result<bool> {
        if self.members.is_empty() {
            self.collation_name = definition.collation_name.clone();
        } else {
            if self.collation_name != definition.collation_name {
                return Err(Error::collation_conflict(
                    self.name.clone(),
                    self.collation_name.clone(),
                    definition.collation_name.clone(),
                ));
            }
            if self.members.iter().any(|m| m.is_duplicate_of(&definition)) {
                return Ok(false);
            }
        }
        if definition.backwards_compatible {
            self.backwards_compatible = true;
        }
        self.members.push(definition);
        Ok(true)
    }

    /// The key name.
    #[must_use]
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// The key's ordinal within its manager.
    #[must_use]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// The definitions, in declaration order.
    #[must_use]
    pub fn definitions(&self) -> &[KeyDefinition] {
        &self.members
    }

    /// The collation URI shared by every definition.
    #[must_use]
    pub fn collation_name(&self) -> Option<&str> {
        self.collation_name.as_deref()
    }

    /// The collation shared by every definition.
    #[must_use]
    pub fn collation(&self) -> Option<&Arc<dyn Collation>> {
        self.members.first().and_then(KeyDefinition::collation)
    }

    /// True if any definition is backwards compatible.
    #[must_use]
    pub fn is_backwards_compatible(&self) -> bool {
        self.backwards_compatible
    }

    /// True if any definition uses general-comparison semantics.
    #[must_use]
    pub fn is_general_comparison(&self) -> bool {
        self.members.iter().any(KeyDefinition::is_general_comparison)
    }

    /// True if no definition has been added (the key is only pre-registered).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
