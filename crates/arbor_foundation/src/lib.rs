//! Core handles, names, atomic values, and errors for Arbor.
//!
//! This crate provides:
//! - [`NodeId`] / [`DocumentId`] - Arena handles with document-order comparison
//! - [`QName`], [`NamePool`], [`NameCode`] - Qualified names and their fingerprints
//! - [`AtomicValue`] / [`PrimitiveType`] - Typed atomic values and casting
//! - [`NodeList`] - Persistent document-ordered node lists
//! - [`TreeModel`] / [`DocumentObserver`] - The tree collaborator interface
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;
pub mod name;
pub mod node;
pub mod tree;
pub mod value;

pub use collections::NodeList;
pub use error::{Error, ErrorContext, ErrorKind};
pub use name::{NameCode, NamePool, QName};
pub use node::{DocumentId, NodeId, NodeKind};
pub use tree::{DocumentObserver, TreeModel};
pub use value::{AtomicValue, PrimitiveType};

/// Result type alias using the Arbor error type.
pub type Result<T> = std::result::Result<T, Error>;
