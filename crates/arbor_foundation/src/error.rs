//! Error types for the Arbor system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::name::QName;
use crate::node::NodeId;
use crate::value::PrimitiveType;

/// The main error type for Arbor operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a frame onto this error's context, creating the context if needed.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Creates a collation conflict error.
    #[must_use]
    pub fn collation_conflict(key: QName, existing: Option<String>, found: Option<String>) -> Self {
        Self::new(ErrorKind::CollationConflict {
            key,
            existing,
            found,
        })
    }

    /// Creates a circular key definition error.
    #[must_use]
    pub fn circular_key(key: QName) -> Self {
        Self::new(ErrorKind::CircularKey(key))
    }

    /// Creates an unknown key error.
    #[must_use]
    pub fn unknown_key(key: QName) -> Self {
        Self::new(ErrorKind::UnknownKey(key))
    }

    /// Creates an ambiguous rule match error.
    #[must_use]
    pub fn ambiguous_match(node: NodeId, first: String, second: String) -> Self {
        Self::new(ErrorKind::AmbiguousMatch {
            node,
            first,
            second,
        })
    }

    /// Creates a non-comparable value error.
    #[must_use]
    pub fn non_comparable(sought: PrimitiveType, found: PrimitiveType) -> Self {
        Self::new(ErrorKind::NonComparable { sought, found })
    }

    /// Creates a failed conversion error.
    #[must_use]
    pub fn conversion_failed(value: impl Into<String>, target: PrimitiveType) -> Self {
        Self::new(ErrorKind::ConversionFailed {
            value: value.into(),
            target,
        })
    }

    /// Returns the XSLT/XPath error code for this error, if it has one.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        self.kind.code()
    }
}

/// Categorized error kinds.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Key definitions sharing a name disagree on their collation.
    #[error(
        "all keys named {key} must use the same collation (found {}, expected {})",
        .found.as_deref().unwrap_or("the default collation"),
        .existing.as_deref().unwrap_or("the default collation")
    )]
    CollationConflict {
        /// The key name.
        key: QName,
        /// Collation URI already in force for the key.
        existing: Option<String>,
        /// Collation URI of the conflicting definition.
        found: Option<String>,
    },

    /// A key's index was requested while that same index was being built.
    #[error("key definition {0} is circular")]
    CircularKey(QName),

    /// No key with this name has been declared.
    #[error("no key named {0} has been defined")]
    UnknownKey(QName),

    /// Two rules of identical rank matched the same node.
    #[error("ambiguous rule match for {node}: matches both \"{first}\" and \"{second}\"")]
    AmbiguousMatch {
        /// The node that was being matched.
        node: NodeId,
        /// The pattern of the rule that was chosen.
        first: String,
        /// The pattern of the competing rule.
        second: String,
    },

    /// A key value cannot be compared with the sought value.
    #[error("cannot compare {found} with {sought}")]
    NonComparable {
        /// Primitive type of the sought value.
        sought: PrimitiveType,
        /// Primitive type of the value produced by the use expression.
        found: PrimitiveType,
    },

    /// An atomic value could not be cast to the required type.
    #[error("cannot convert \"{value}\" to {target}")]
    ConversionFailed {
        /// Lexical form of the value.
        value: String,
        /// The target type.
        target: PrimitiveType,
    },

    /// Rule lookup was attempted before ranks were computed for the mode.
    #[error("ranks have not been computed for mode {0}")]
    RanksNotComputed(String),

    /// A pattern failed while being evaluated.
    #[error("pattern error: {0}")]
    Pattern(String),

    /// An expression failed while being evaluated.
    #[error("expression error: {0}")]
    Expression(String),

    /// A tree was built out of order (attribute after content, unbalanced
    /// elements).
    #[error("malformed tree: {0}")]
    MalformedTree(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ErrorKind {
    /// Returns the XSLT/XPath error code for this kind, if it has one.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::CollationConflict { .. } => Some("XTSE1220"),
            Self::CircularKey(_) => Some("XTDE0640"),
            Self::UnknownKey(_) => Some("XTDE1260"),
            Self::AmbiguousMatch { .. } => Some("XTRE0540"),
            Self::NonComparable { .. } => Some("XPTY0004"),
            Self::ConversionFailed { .. } => Some("FORG0001"),
            Self::RanksNotComputed(_)
            | Self::Pattern(_)
            | Self::Expression(_)
            | Self::MalformedTree(_)
            | Self::Internal(_) => None,
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Stylesheet module or key name.
    pub source: Option<String>,
    /// Line number in source.
    pub line: Option<usize>,
    /// Stack of key builds or rule evaluations in progress.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source location.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line number.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
