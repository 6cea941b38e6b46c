//! The rule manager: every mode of a compiled stylesheet.

use std::collections::HashMap;
use std::sync::Arc;

use arbor_foundation::{NodeId, QName, Result};
use tracing::debug;

use crate::config::EngineConfig;
use crate::context::Context;
use crate::mode::Mode;
use crate::pattern::Pattern;
use crate::rule::{ActionId, Declaration, Rule};

/// Which mode a template rule is registered in.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModeName {
    /// The default (unnamed) mode.
    Default,
    /// A named mode.
    Named(QName),
    /// Every mode (`mode="#all"`), including modes created later.
    All,
}

impl From<QName> for ModeName {
    fn from(name: QName) -> Self {
        Self::Named(name)
    }
}

/// Registry of modes by name.
///
/// Rules registered against [`ModeName::All`] live in a pseudo-mode and are
/// copied into the default mode, every existing named mode, and every named
/// mode created afterwards.
pub struct RuleManager {
    config: EngineConfig,
    unnamed: Mode,
    modes: HashMap<QName, Mode>,
    all_modes: Option<Mode>,
}

impl Default for RuleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleManager {
    /// Creates a manager with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates a manager whose modes all use `config`.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            unnamed: Mode::new(None, &config),
            modes: HashMap::new(),
            all_modes: None,
            config,
        }
    }

    /// The configuration shared by every mode.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The default mode.
    #[must_use]
    pub fn unnamed_mode(&self) -> &Mode {
        &self.unnamed
    }

    /// Looks up a mode without creating it.
    #[must_use]
    pub fn mode(&self, name: &ModeName) -> Option<&Mode> {
        match name {
            ModeName::Default => Some(&self.unnamed),
            ModeName::Named(name) => self.modes.get(name),
            ModeName::All => self.all_modes.as_ref(),
        }
    }

    /// Returns a mode, creating it if absent.
    ///
    /// A new named mode starts with a copy of every all-modes rule.
    pub fn get_or_create_mode(&mut self, name: &ModeName) -> &mut Mode {
        match name {
            ModeName::Default => &mut self.unnamed,
            ModeName::All => {
                let config = &self.config;
                self.all_modes
                    .get_or_insert_with(|| Mode::new(Some(QName::new("", "", "#all")), config))
            }
            ModeName::Named(name) => {
                let all_modes = self.all_modes.as_ref();
                let config = &self.config;
                self.modes.entry(name.clone()).or_insert_with(|| {
                    debug!(mode = %name.clark_name(), "mode created");
                    match all_modes {
                        Some(all) => Mode::derived_from(all, name.clone()),
                        None => Mode::new(Some(name.clone()), config),
                    }
                })
            }
        }
    }

    /// Returns the named modes whose name is in namespace `uri`.
    #[must_use]
    pub fn modes_in_namespace(&self, uri: &str) -> Vec<&Mode> {
        self.modes
            .iter()
            .filter(|(name, _)| name.namespace() == uri)
            .map(|(_, mode)| mode)
            .collect()
    }

    /// Registers a template rule.
    ///
    /// Union patterns are split into their branches, each registered with
    /// the same action (so they share a declaration sequence). With no
    /// explicit `priority`, each branch uses its own default priority.
    pub fn set_template_rule(
        &mut self,
        pattern: Arc<dyn Pattern>,
        action: ActionId,
        mode: &ModeName,
        declaration: &Declaration,
        priority: Option<f64>,
    ) {
        if let Some((left, right)) = pattern.union_branches() {
            self.set_template_rule(left, action, mode, declaration, priority);
            self.set_template_rule(right, action, mode, declaration, priority);
            return;
        }
        let priority = priority
            .filter(|p| !p.is_nan())
            .unwrap_or_else(|| pattern.default_priority());

        self.get_or_create_mode(mode)
            .add_rule(Arc::clone(&pattern), action, declaration, priority, true);

        if *mode == ModeName::All {
            self.unnamed
                .add_rule(Arc::clone(&pattern), action, declaration, priority, false);
            for named in self.modes.values_mut() {
                named.add_rule(Arc::clone(&pattern), action, declaration, priority, false);
            }
        }
    }

    /// Computes rankings for every mode.
    pub fn compute_rankings(&mut self) {
        self.unnamed.compute_rankings();
        for mode in self.modes.values_mut() {
            mode.compute_rankings();
        }
        if let Some(all) = self.all_modes.as_mut() {
            all.compute_rankings();
        }
    }

    /// Finds the rule for `node` in `mode` (the default mode if `None`).
    ///
    /// # Errors
    ///
    /// As for [`Mode::get_rule`].
    pub fn get_template_rule<'m>(
        &'m self,
        node: NodeId,
        mode: Option<&'m Mode>,
        ctx: &Context<'_>,
    ) -> Result<Option<&'m Rule>> {
        mode.unwrap_or(&self.unnamed).get_rule(node, ctx)
    }

    /// Finds the rule for `node` among precedences `min..=max`.
    ///
    /// # Errors
    ///
    /// As for [`Mode::get_rule`].
    pub fn get_template_rule_in_range<'m>(
        &'m self,
        node: NodeId,
        mode: Option<&'m Mode>,
        min: i32,
        max: i32,
        ctx: &Context<'_>,
    ) -> Result<Option<&'m Rule>> {
        mode.unwrap_or(&self.unnamed)
            .get_rule_in_range(node, ctx, min, max)
    }

    /// Finds the rule `xsl:next-match` would invoke after `current`.
    ///
    /// # Errors
    ///
    /// As for [`Mode::get_rule`].
    pub fn get_next_match_rule<'m>(
        &'m self,
        node: NodeId,
        mode: Option<&'m Mode>,
        current: &Rule,
        ctx: &Context<'_>,
    ) -> Result<Option<&'m Rule>> {
        mode.unwrap_or(&self.unnamed)
            .get_next_rule(node, ctx, current)
    }
}
