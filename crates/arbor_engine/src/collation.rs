//! Collations used to compare string key values.

use std::fmt;
use std::sync::Arc;

/// A string collation.
///
/// Two strings are equal under the collation iff their collation keys are
/// equal.
pub trait Collation: fmt::Debug + Send + Sync {
    /// The collation URI.
    fn uri(&self) -> &str;

    /// Returns the key under which `value` is indexed.
    fn collation_key(&self, value: &str) -> Arc<str>;
}

/// Unicode codepoint collation (the default).
#[derive(Clone, Copy, Debug, Default)]
pub struct CodepointCollation;

impl CodepointCollation {
    /// The codepoint collation URI.
    pub const URI: &'static str = "http://www.w3.org/2005/xpath-functions/collation/codepoint";
}

impl Collation for CodepointCollation {
    fn uri(&self) -> &str {
        Self::URI
    }

    fn collation_key(&self, value: &str) -> Arc<str> {
        value.into()
    }
}

/// Compares strings ignoring ASCII case; other characters compare by
/// codepoint.
#[derive(Clone, Copy, Debug, Default)]
pub struct AsciiCaseBlindCollation;

impl AsciiCaseBlindCollation {
    /// The HTML ASCII case-insensitive collation URI.
    pub const URI: &'static str =
        "http://www.w3.org/2005/xpath-functions/collation/html-ascii-case-insensitive";
}

impl Collation for AsciiCaseBlindCollation {
    fn uri(&self) -> &str {
        Self::URI
    }

    fn collation_key(&self, value: &str) -> Arc<str> {
        value.to_ascii_lowercase().into()
    }
}
