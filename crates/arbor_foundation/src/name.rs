//! Qualified names and name interning.
//!
//! Mode names and key names are carried as [`QName`]s. Node names are
//! interned into [`NameCode`] fingerprints so that rule chains can be keyed
//! by a plain integer.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A qualified name: namespace URI plus local part, with an optional prefix.
///
/// Equality and hashing ignore the prefix.
#[derive(Clone, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QName {
    prefix: Arc<str>,
    namespace: Arc<str>,
    local: Arc<str>,
}

impl QName {
    /// Creates a name with a prefix and namespace URI.
    #[must_use]
    pub fn new(prefix: &str, namespace: &str, local: &str) -> Self {
        Self {
            prefix: prefix.into(),
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Creates a name in no namespace.
    #[must_use]
    pub fn local(local: &str) -> Self {
        Self::new("", "", local)
    }

    /// Returns the prefix (possibly empty).
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the namespace URI (empty for no namespace).
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the local part.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// Returns the name as `prefix:local`, or just `local` when unprefixed.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.prefix.is_empty() {
            self.local.to_string()
        } else {
            format!("{}:{}", self.prefix, self.local)
        }
    }

    /// Returns the name in Clark notation, `{uri}local`.
    #[must_use]
    pub fn clark_name(&self) -> String {
        if self.namespace.is_empty() {
            self.local.to_string()
        } else {
            format!("{{{}}}{}", self.namespace, self.local)
        }
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.local == other.local && self.namespace == other.namespace
    }
}

impl std::hash::Hash for QName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.local.hash(state);
    }
}

impl fmt::Debug for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QName({})", self.clark_name())
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Interned name fingerprint.
///
/// Two names with the same namespace URI and local part always receive the
/// same code from a given [`NamePool`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NameCode(pub(crate) u32);

impl NameCode {
    /// Returns the raw index of this name.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NameCode({})", self.0)
    }
}

/// Interner mapping qualified names to [`NameCode`]s and back.
///
/// It is not thread-safe; use external synchronization if needed.
#[derive(Clone, Debug, Default)]
pub struct NamePool {
    /// Names by code.
    names: Vec<QName>,
    /// Map from name to code.
    codes: HashMap<QName, NameCode>,
}

impl NamePool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a name, returning its code.
    ///
    /// # Panics
    ///
    /// Panics if the number of interned names exceeds `u32::MAX`.
    pub fn intern(&mut self, name: &QName) -> NameCode {
        if let Some(&code) = self.codes.get(name) {
            return code;
        }
        let code = NameCode(u32::try_from(self.names.len()).expect("too many interned names"));
        self.names.push(name.clone());
        self.codes.insert(name.clone(), code);
        code
    }

    /// Interns a name in no namespace.
    pub fn intern_local(&mut self, local: &str) -> NameCode {
        self.intern(&QName::local(local))
    }

    /// Looks up a name without interning it.
    #[must_use]
    pub fn lookup(&self, name: &QName) -> Option<NameCode> {
        self.codes.get(name).copied()
    }

    /// Gets the name for a code.
    #[must_use]
    pub fn name(&self, code: NameCode) -> Option<&QName> {
        self.names.get(code.0 as usize)
    }

    /// Returns the number of interned names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no names have been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
