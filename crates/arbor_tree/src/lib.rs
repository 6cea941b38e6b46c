//! Arena document trees and the document pool for Arbor.
//!
//! This crate provides:
//! - [`Document`] - An immutable tree stored in document order
//! - [`DocumentBuilder`] - Event-style construction of documents
//! - [`DocumentPool`] - A [`TreeModel`] over many documents, with discard
//!   notification
//!
//! [`TreeModel`]: arbor_foundation::TreeModel

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builder;
pub mod document;
pub mod pool;

pub use builder::DocumentBuilder;
pub use document::Document;
pub use pool::DocumentPool;
