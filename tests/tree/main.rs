//! Integration tests for Layer 1: Tree
//!
//! Tests for document construction, navigation, and the document pool.

mod documents;
