//! Integration tests for Layer 0: Foundation
//!
//! Tests for names, node handles, node lists, atomic values, and errors.

mod collections;
mod names;
