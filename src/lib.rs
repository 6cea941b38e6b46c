//! Arbor - XSLT template rule dispatch and key indexing
//!
//! This crate re-exports all layers of the Arbor system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: arbor_engine     - Patterns, modes, rule dispatch, key indexes
//! Layer 1: arbor_tree       - Arena documents, builder, document pool
//! Layer 0: arbor_foundation - Core types (NodeId, QName, AtomicValue, Error)
//! ```

pub use arbor_engine as engine;
pub use arbor_foundation as foundation;
pub use arbor_tree as tree;
