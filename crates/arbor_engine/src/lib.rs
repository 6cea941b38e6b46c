//! Template rule dispatch and key indexing for Arbor.
//!
//! This crate provides:
//! - [`Pattern`] / [`UseExpression`] / [`Collation`] - The matching and
//!   evaluation seams, with the concrete implementations the engine ships
//! - [`Rule`] / [`Mode`] - Ranked rule chains and node dispatch
//! - [`RuleManager`] - Modes by name, including the all-modes pseudo-mode
//! - [`BuiltInRuleSet`] - What to do for nodes no rule matches
//! - [`KeyDefinition`] / [`KeyDefinitionSet`] - Compiled key declarations
//! - [`KeyManager`] - Lazily built, per-document key indexes
//! - [`EngineConfig`] - Recovery policy and dispatch tracing

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod built_in;
pub mod collation;
pub mod config;
pub mod context;
pub mod expression;
pub mod key;
pub mod mode;
pub mod pattern;
pub mod rule;
pub mod rule_manager;

pub use built_in::{BuiltInAction, BuiltInRuleSet};
pub use collation::{AsciiCaseBlindCollation, CodepointCollation, Collation};
pub use config::{EngineConfig, RecoveryPolicy};
pub use context::Context;
pub use expression::{AtomicSequence, AttributeValue, CastExpression, ContextStringValue, FunctionExpression, UseExpression};
pub use key::{KeyDefinition, KeyDefinitionSet, KeyIndex, KeyManager, KeyValue, NodeSequence};
pub use mode::{Mode, RuleChain};
pub use pattern::{NodeTest, NodeTestPattern, Pattern, PatternClass, PredicatePattern, UnionPattern};
pub use rule::{ActionId, Declaration, ModuleId, Rule};
pub use rule_manager::{ModeName, RuleManager};
