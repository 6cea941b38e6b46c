//! Template rules.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use arbor_foundation::{NodeId, Result};

use crate::context::Context;
use crate::pattern::Pattern;

/// Handle to a rule's action (a template) in the driver's own arena.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub u32);

/// Identity of the stylesheet module that declared a rule.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

/// Where a rule was declared: its module and that module's import
/// precedences.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// The declaring module.
    pub module: ModuleId,
    /// Import precedence of the module.
    pub precedence: i32,
    /// Lowest precedence of any module imported (directly or indirectly) by
    /// the declaring module.
    pub min_import_precedence: i32,
}

impl Declaration {
    /// Creates a declaration for a module that imports nothing.
    #[must_use]
    pub fn new(module: ModuleId, precedence: i32) -> Self {
        Self {
            module,
            precedence,
            min_import_precedence: precedence,
        }
    }

    /// Sets the minimum import precedence.
    #[must_use]
    pub fn with_min_import_precedence(mut self, min: i32) -> Self {
        self.min_import_precedence = min;
        self
    }
}

// =============================================================================
// Rule
// =============================================================================

/// A pattern paired with an action, ranked for dispatch.
///
/// Rules are immutable once registered, apart from `rank`, which the owning
/// mode assigns when it computes rankings.
#[derive(Clone)]
pub struct Rule {
    pattern: Arc<dyn Pattern>,
    action: ActionId,
    module: ModuleId,
    precedence: i32,
    min_import_precedence: i32,
    priority: f64,
    sequence: u32,
    rank: u32,
    always_matches: bool,
}

impl Rule {
    pub(crate) fn new(
        pattern: Arc<dyn Pattern>,
        action: ActionId,
        declaration: &Declaration,
        priority: f64,
        sequence: u32,
    ) -> Self {
        Self {
            pattern,
            action,
            module: declaration.module,
            precedence: declaration.precedence,
            min_import_precedence: declaration.min_import_precedence,
            priority: if priority.is_nan() { 0.0 } else { priority },
            sequence,
            rank: 0,
            always_matches: false,
        }
    }

    pub(crate) fn with_always_matches(mut self, always: bool) -> Self {
        self.always_matches = always;
        self
    }

    pub(crate) fn set_rank(&mut self, rank: u32) {
        self.rank = rank;
    }

    /// The match pattern.
    #[must_use]
    pub fn pattern(&self) -> &Arc<dyn Pattern> {
        &self.pattern
    }

    /// The action to run when this rule is chosen.
    #[must_use]
    pub fn action(&self) -> ActionId {
        self.action
    }

    /// The declaring module.
    #[must_use]
    pub fn module(&self) -> ModuleId {
        self.module
    }

    /// Import precedence.
    #[must_use]
    pub fn precedence(&self) -> i32 {
        self.precedence
    }

    /// Minimum import precedence of the declaring module.
    #[must_use]
    pub fn min_import_precedence(&self) -> i32 {
        self.min_import_precedence
    }

    /// Priority among rules of equal precedence.
    #[must_use]
    pub fn priority(&self) -> f64 {
        self.priority
    }

    /// Declaration sequence within the mode.
    #[must_use]
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Rank within the mode; meaningful once rankings are computed.
    #[must_use]
    pub fn rank(&self) -> u32 {
        self.rank
    }

    /// True if every node reaching this rule's chain matches it.
    #[must_use]
    pub fn always_matches(&self) -> bool {
        self.always_matches
    }

    /// Tests a node, skipping the pattern when the rule always matches.
    ///
    /// # Errors
    ///
    /// Propagates pattern evaluation errors.
    pub fn matches(&self, node: NodeId, ctx: &Context<'_>) -> Result<bool> {
        if self.always_matches {
            return Ok(true);
        }
        self.pattern.matches(node, ctx)
    }

    /// Compares by assigned rank.
    #[must_use]
    pub fn compare_rank(&self, other: &Rule) -> Ordering {
        self.rank.cmp(&other.rank)
    }

    /// Compares by `(precedence, priority)`, the order ranks encode.
    #[must_use]
    pub fn compare_computed_rank(&self, other: &Rule) -> Ordering {
        self.precedence.cmp(&other.precedence).then_with(|| {
            self.priority
                .partial_cmp(&other.priority)
                .unwrap_or(Ordering::Equal)
        })
    }

    /// True if this rule must be placed ahead of `other` in a chain: it has
    /// higher precedence, or equal precedence and priority at least as high.
    #[must_use]
    pub(crate) fn precedes(&self, other: &Rule) -> bool {
        other.precedence < self.precedence
            || (other.precedence == self.precedence && other.priority <= self.priority)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("pattern", &self.pattern.to_string())
            .field("action", &self.action)
            .field("precedence", &self.precedence)
            .field("priority", &self.priority)
            .field("sequence", &self.sequence)
            .field("rank", &self.rank)
            .finish_non_exhaustive()
    }
}
