//! Integration tests for Layer 2: Engine
//!
//! Tests for patterns, rule dispatch, modes, and key indexes.

mod keys;
mod modes;
