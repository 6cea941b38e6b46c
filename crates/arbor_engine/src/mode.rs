//! Modes: rule chains and node dispatch.
//!
//! Rules are filed into chains by the node kind and name their pattern
//! requires. A node is only ever tested against three chains: the chain for
//! its name (elements and attributes), the unnamed chain for its kind, and
//! the generic chain for patterns that could not be classified.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use arbor_foundation::{Error, ErrorKind, NameCode, NodeId, NodeKind, QName, Result};
use tracing::{debug, trace, warn};

use crate::built_in::BuiltInRuleSet;
use crate::config::{EngineConfig, RecoveryPolicy};
use crate::context::Context;
use crate::pattern::{Pattern, PatternClass};
use crate::rule::{ActionId, Declaration, ModuleId, Rule};

// =============================================================================
// Rule Chain
// =============================================================================

/// Rules ordered by descending `(precedence, priority)`.
///
/// Among rules of equal rank the most recently added comes first.
#[derive(Clone, Debug, Default)]
pub struct RuleChain {
    rules: Vec<Rule>,
}

impl RuleChain {
    /// Inserts a rule ahead of the first rule it outranks or ties with.
    pub(crate) fn insert(&mut self, rule: Rule) {
        let position = self
            .rules
            .iter()
            .position(|existing| rule.precedes(existing))
            .unwrap_or(self.rules.len());
        self.rules.insert(position, rule);
    }

    /// Iterates rules from highest rank down.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The three chains a node can be tested against.
type Candidates<'m> = [Option<&'m RuleChain>; 3];

// =============================================================================
// Mode
// =============================================================================

/// A processing mode: every rule registered for one mode name, indexed for
/// dispatch.
///
/// Built during stylesheet compilation; after [`compute_rankings`] it is
/// read-only and may be shared between threads.
///
/// [`compute_rankings`]: Mode::compute_rankings
#[derive(Clone, Debug)]
pub struct Mode {
    name: Option<QName>,
    /// Chains for patterns classified by kind only, indexed by `NodeKind::index`.
    by_kind: [RuleChain; NodeKind::COUNT],
    named_elements: HashMap<NameCode, RuleChain>,
    named_attributes: HashMap<NameCode, RuleChain>,
    generic: RuleChain,
    /// Action, module and sequence of the last rule added.
    most_recent: Option<(ActionId, ModuleId, u32)>,
    has_explicit_rules: bool,
    rule_count: usize,
    ranked: bool,
    policy: RecoveryPolicy,
    trace_dispatch: bool,
    built_in: BuiltInRuleSet,
}

impl Mode {
    /// Creates an empty mode. `None` names the default mode.
    #[must_use]
    pub fn new(name: Option<QName>, config: &EngineConfig) -> Self {
        Self {
            name,
            by_kind: Default::default(),
            named_elements: HashMap::new(),
            named_attributes: HashMap::new(),
            generic: RuleChain::default(),
            most_recent: None,
            has_explicit_rules: false,
            rule_count: 0,
            ranked: false,
            policy: config.recovery_policy,
            trace_dispatch: config.trace_dispatch,
            built_in: BuiltInRuleSet::default(),
        }
    }

    /// Creates a named mode seeded with every rule of the all-modes mode.
    ///
    /// The copied rules do not make the new mode non-empty.
    #[must_use]
    pub(crate) fn derived_from(all_modes: &Mode, name: QName) -> Self {
        Self {
            name: Some(name),
            has_explicit_rules: false,
            ranked: false,
            ..all_modes.clone()
        }
    }

    /// The mode name, or `None` for the default mode.
    #[must_use]
    pub fn name(&self) -> Option<&QName> {
        self.name.as_ref()
    }

    /// Returns true for the default (unnamed) mode.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.name.is_none()
    }

    /// The built-in rules a driver applies when [`get_rule`](Mode::get_rule)
    /// finds nothing.
    #[must_use]
    pub fn built_in_rules(&self) -> BuiltInRuleSet {
        self.built_in
    }

    /// Replaces the built-in rules.
    pub fn set_built_in_rules(&mut self, rules: BuiltInRuleSet) {
        self.built_in = rules;
    }

    /// Returns true if no rule was registered explicitly for this mode.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.has_explicit_rules
    }

    /// Returns the number of rules across all chains.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    /// Returns true once rankings are computed and no rule was added since.
    #[must_use]
    pub fn is_ranked(&self) -> bool {
        self.ranked
    }

    fn display_name(&self) -> String {
        self.name
            .as_ref()
            .map_or_else(|| "#default".to_string(), QName::clark_name)
    }

    /// Adds a rule to the chain its pattern classifies into.
    ///
    /// Union patterns are not split here; see
    /// [`RuleManager::set_template_rule`](crate::RuleManager::set_template_rule).
    /// `explicit` is false for rules propagated from the all-modes mode.
    /// Patterns that can never match are dropped. A `NaN` priority counts
    /// as `0`.
    pub fn add_rule(
        &mut self,
        pattern: Arc<dyn Pattern>,
        action: ActionId,
        declaration: &Declaration,
        priority: f64,
        explicit: bool,
    ) {
        if explicit {
            self.has_explicit_rules = true;
        }
        let class = pattern.classify();
        if class == PatternClass::Never {
            debug!(mode = %self.display_name(), pattern = %pattern, "rule discarded: pattern matches nothing");
            return;
        }

        let sequence = match self.most_recent {
            None => 0,
            Some((last_action, last_module, last_sequence))
                if last_action == action && last_module == declaration.module =>
            {
                last_sequence
            }
            Some((_, _, last_sequence)) => last_sequence + 1,
        };
        self.most_recent = Some((action, declaration.module, sequence));

        let always_matches = pattern.is_node_test()
            && match class {
                PatternClass::Unclassified | PatternClass::Kind(_) => true,
                PatternClass::KindAndName(kind, _) => kind.is_named(),
                PatternClass::Never => false,
            };
        let rule = Rule::new(pattern, action, declaration, priority, sequence)
            .with_always_matches(always_matches);

        let chain = match class {
            PatternClass::KindAndName(NodeKind::Element, name) => {
                self.named_elements.entry(name).or_default()
            }
            PatternClass::KindAndName(NodeKind::Attribute, name) => {
                self.named_attributes.entry(name).or_default()
            }
            PatternClass::KindAndName(kind, _) | PatternClass::Kind(kind) => {
                &mut self.by_kind[kind.index()]
            }
            PatternClass::Unclassified | PatternClass::Never => &mut self.generic,
        };
        chain.insert(rule);
        self.rule_count += 1;
        self.ranked = false;
    }

    fn chains_mut(&mut self) -> impl Iterator<Item = &mut RuleChain> {
        self.by_kind
            .iter_mut()
            .chain(self.named_elements.values_mut())
            .chain(self.named_attributes.values_mut())
            .chain(std::iter::once(&mut self.generic))
    }

    /// Walks every rule in every chain.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.by_kind
            .iter()
            .chain(self.named_elements.values())
            .chain(self.named_attributes.values())
            .chain(std::iter::once(&self.generic))
            .flat_map(RuleChain::iter)
    }

    /// Assigns ranks so that comparing ranks is equivalent to comparing
    /// `(precedence, priority)`.
    pub fn compute_rankings(&mut self) {
        let name = self.display_name();
        let mut all: Vec<&mut Rule> = self
            .chains_mut()
            .flat_map(|chain| chain.rules.iter_mut())
            .collect();
        all.sort_by(|a, b| a.compare_computed_rank(b));

        let mut rank = 0;
        for i in 0..all.len() {
            if i > 0 && all[i - 1].compare_computed_rank(&*all[i]) != Ordering::Equal {
                rank += 1;
            }
            all[i].set_rank(rank);
        }
        let distinct = if all.is_empty() { 0 } else { rank + 1 };
        debug!(mode = %name, rules = all.len(), ranks = distinct, "ranks computed");
        self.ranked = true;
    }

    fn candidates(&self, node: NodeId, ctx: &Context<'_>) -> Option<Candidates<'_>> {
        let tree = ctx.tree();
        let kind = tree.node_kind(node)?;
        let named = match kind {
            NodeKind::Element => tree
                .node_name(node)
                .and_then(|name| self.named_elements.get(&name)),
            NodeKind::Attribute => tree
                .node_name(node)
                .and_then(|name| self.named_attributes.get(&name)),
            _ => None,
        };
        Some([named, Some(&self.by_kind[kind.index()]), Some(&self.generic)])
    }

    /// Returns the best rule matching `node`.
    ///
    /// # Errors
    ///
    /// Returns `RanksNotComputed` if rules were added since the last ranking
    /// pass, `AmbiguousMatch` under [`RecoveryPolicy::DoNotRecover`], and any
    /// error raised by a pattern.
    pub fn get_rule(&self, node: NodeId, ctx: &Context<'_>) -> Result<Option<&Rule>> {
        self.find(node, ctx, &|_| true)
    }

    /// Returns the best rule matching `node` among rules whose precedence
    /// lies in `min..=max` (`xsl:apply-imports`).
    ///
    /// # Errors
    ///
    /// As for [`get_rule`](Mode::get_rule).
    pub fn get_rule_in_range(
        &self,
        node: NodeId,
        ctx: &Context<'_>,
        min: i32,
        max: i32,
    ) -> Result<Option<&Rule>> {
        self.find(node, ctx, &|rule| (min..=max).contains(&rule.precedence()))
    }

    /// Returns the best rule matching `node` that ranks below `current`, or
    /// ties with it but was declared earlier (`xsl:next-match`).
    ///
    /// # Errors
    ///
    /// As for [`get_rule`](Mode::get_rule).
    pub fn get_next_rule(
        &self,
        node: NodeId,
        ctx: &Context<'_>,
        current: &Rule,
    ) -> Result<Option<&Rule>> {
        let (rank, sequence) = (current.rank(), current.sequence());
        self.find(node, ctx, &|rule| {
            rule.rank() < rank || (rule.rank() == rank && rule.sequence() < sequence)
        })
    }

    fn find(
        &self,
        node: NodeId,
        ctx: &Context<'_>,
        filter: &dyn Fn(&Rule) -> bool,
    ) -> Result<Option<&Rule>> {
        if !self.ranked && self.rule_count > 0 {
            return Err(Error::new(ErrorKind::RanksNotComputed(self.display_name())));
        }
        let Some(chains) = self.candidates(node, ctx) else {
            return Ok(None);
        };
        let mut best = None;
        for chain in chains.into_iter().flatten() {
            best = self.search_chain(node, ctx, best, chain, filter)?;
        }
        if self.trace_dispatch {
            trace!(
                mode = %self.display_name(),
                node = %node,
                rule = ?best.map(|r: &Rule| r.pattern().to_string()),
                "dispatch"
            );
        }
        Ok(best)
    }

    fn search_chain<'m>(
        &self,
        node: NodeId,
        ctx: &Context<'_>,
        mut best: Option<&'m Rule>,
        chain: &'m RuleChain,
        filter: &dyn Fn(&Rule) -> bool,
    ) -> Result<Option<&'m Rule>> {
        for rule in chain.iter().filter(|rule| filter(rule)) {
            let Some(current) = best else {
                if rule.matches(node, ctx)? {
                    // Chains are rank-ordered: the first match is the best
                    // here. Keep walking only to report ties.
                    best = Some(rule);
                    if self.policy == RecoveryPolicy::RecoverSilently {
                        break;
                    }
                }
                continue;
            };
            match rule.compare_rank(current) {
                Ordering::Less => break,
                Ordering::Equal => {
                    if rule.matches(node, ctx)? {
                        self.report_ambiguity(node, current, rule)?;
                        if rule.sequence() >= current.sequence() {
                            best = Some(rule);
                        }
                        break;
                    }
                }
                Ordering::Greater => {
                    if rule.matches(node, ctx)? {
                        best = Some(rule);
                    }
                }
            }
        }
        Ok(best)
    }

    fn report_ambiguity(&self, node: NodeId, first: &Rule, second: &Rule) -> Result<()> {
        if first.action() == second.action() && first.sequence() == second.sequence() {
            return Ok(());
        }
        match self.policy {
            RecoveryPolicy::RecoverSilently => Ok(()),
            RecoveryPolicy::RecoverWithWarnings => {
                warn!(
                    mode = %self.display_name(),
                    node = %node,
                    first = %first.pattern(),
                    second = %second.pattern(),
                    "ambiguous rule match"
                );
                Ok(())
            }
            RecoveryPolicy::DoNotRecover => Err(Error::ambiguous_match(
                node,
                first.pattern().to_string(),
                second.pattern().to_string(),
            )),
        }
    }
}
