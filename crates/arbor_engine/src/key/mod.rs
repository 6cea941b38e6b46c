//! Key declarations and the per-document key index cache.
//!
//! - [`KeyDefinition`] / [`KeyDefinitionSet`]: compiled `xsl:key` declarations
//! - [`KeyManager`]: builds, caches and serves indexes
//! - [`KeyIndex`] / [`KeyValue`]: one built index and its hashable keys
//! - [`NodeSequence`]: the result of a lookup

mod definition;
mod index;
mod manager;

pub use definition::{KeyDefinition, KeyDefinitionSet};
pub use index::{KeyIndex, KeyValue, NodeSequence};
pub use manager::KeyManager;
