//! Atomic values and their primitive types.
//!
//! Only the primitive types that key indexes distinguish are modelled.
//! Decimals are held as `f64`: key lookups promote every numeric to double
//! before comparing, so exact decimal arithmetic is never needed here.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::Result;

/// The primitive type of an atomic value.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PrimitiveType {
    /// `xs:string`
    String,
    /// `xs:untypedAtomic`
    UntypedAtomic,
    /// `xs:anyURI`
    AnyUri,
    /// `xs:boolean`
    Boolean,
    /// `xs:integer`
    Integer,
    /// `xs:decimal`
    Decimal,
    /// `xs:float`
    Float,
    /// `xs:double`
    Double,
}

impl PrimitiveType {
    /// Returns true for string, untypedAtomic and anyURI.
    #[must_use]
    pub const fn is_string_like(self) -> bool {
        matches!(self, Self::String | Self::UntypedAtomic | Self::AnyUri)
    }

    /// Returns true for the numeric types.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Decimal | Self::Float | Self::Double
        )
    }

    /// Returns true if values of the two types can be compared with `eq`.
    ///
    /// untypedAtomic is treated as string; the string-like types are
    /// mutually comparable, as are the numeric types.
    #[must_use]
    pub const fn is_comparable(self, other: Self) -> bool {
        if self.is_string_like() {
            other.is_string_like()
        } else if self.is_numeric() {
            other.is_numeric()
        } else {
            matches!(other, Self::Boolean)
        }
    }

    /// Returns the `xs:` name of the type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::String => "xs:string",
            Self::UntypedAtomic => "xs:untypedAtomic",
            Self::AnyUri => "xs:anyURI",
            Self::Boolean => "xs:boolean",
            Self::Integer => "xs:integer",
            Self::Decimal => "xs:decimal",
            Self::Float => "xs:float",
            Self::Double => "xs:double",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An atomic value.
///
/// Values are immutable and cheap to clone.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AtomicValue {
    /// `xs:string`
    String(Arc<str>),
    /// `xs:untypedAtomic`, typically the string value of a node.
    UntypedAtomic(Arc<str>),
    /// `xs:anyURI`
    AnyUri(Arc<str>),
    /// `xs:boolean`
    Boolean(bool),
    /// `xs:integer`
    Integer(i64),
    /// `xs:decimal`
    Decimal(f64),
    /// `xs:float`
    Float(f32),
    /// `xs:double`
    Double(f64),
}

impl AtomicValue {
    /// Creates a string value.
    #[must_use]
    pub fn string(s: &str) -> Self {
        Self::String(s.into())
    }

    /// Creates an untypedAtomic value.
    #[must_use]
    pub fn untyped(s: &str) -> Self {
        Self::UntypedAtomic(s.into())
    }

    /// Returns the primitive type of this value.
    #[must_use]
    pub const fn primitive_type(&self) -> PrimitiveType {
        match self {
            Self::String(_) => PrimitiveType::String,
            Self::UntypedAtomic(_) => PrimitiveType::UntypedAtomic,
            Self::AnyUri(_) => PrimitiveType::AnyUri,
            Self::Boolean(_) => PrimitiveType::Boolean,
            Self::Integer(_) => PrimitiveType::Integer,
            Self::Decimal(_) => PrimitiveType::Decimal,
            Self::Float(_) => PrimitiveType::Float,
            Self::Double(_) => PrimitiveType::Double,
        }
    }

    /// Returns true if this is a float or double `NaN`.
    #[must_use]
    pub fn is_nan(&self) -> bool {
        match self {
            Self::Float(f) => f.is_nan(),
            Self::Double(d) | Self::Decimal(d) => d.is_nan(),
            _ => false,
        }
    }

    /// Returns the value as a double, for numeric values only.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Decimal(d) | Self::Double(d) => Some(*d),
            Self::Float(f) => Some(f64::from(*f)),
            _ => None,
        }
    }

    /// Returns the string value (the result of casting to `xs:string`).
    #[must_use]
    pub fn string_value(&self) -> Arc<str> {
        match self {
            Self::String(s) | Self::UntypedAtomic(s) | Self::AnyUri(s) => Arc::clone(s),
            Self::Boolean(b) => (if *b { "true" } else { "false" }).into(),
            Self::Integer(n) => n.to_string().into(),
            Self::Decimal(d) => format_decimal(*d).into(),
            Self::Float(f) => format_double(f64::from(*f)).into(),
            Self::Double(d) => format_double(*d).into(),
        }
    }

    /// Casts this value to another primitive type.
    ///
    /// # Errors
    ///
    /// Returns `ConversionFailed` if the value has no valid representation in
    /// the target type.
    #[allow(clippy::cast_possible_truncation)]
    pub fn convert(&self, target: PrimitiveType) -> Result<AtomicValue> {
        if self.primitive_type() == target {
            return Ok(self.clone());
        }
        let fail = || Error::conversion_failed(self.string_value().as_ref(), target);
        match target {
            PrimitiveType::String => Ok(Self::String(self.string_value())),
            PrimitiveType::UntypedAtomic => Ok(Self::UntypedAtomic(self.string_value())),
            PrimitiveType::AnyUri => match self {
                Self::String(s) | Self::UntypedAtomic(s) => Ok(Self::AnyUri(s.trim().into())),
                _ => Err(fail()),
            },
            PrimitiveType::Boolean => match self {
                Self::String(s) | Self::UntypedAtomic(s) => match s.trim() {
                    "true" | "1" => Ok(Self::Boolean(true)),
                    "false" | "0" => Ok(Self::Boolean(false)),
                    _ => Err(fail()),
                },
                Self::AnyUri(_) => Err(fail()),
                _ => {
                    let d = self.as_double().ok_or_else(fail)?;
                    Ok(Self::Boolean(d != 0.0 && !d.is_nan()))
                }
            },
            PrimitiveType::Double => self.to_double().map(Self::Double).ok_or_else(fail),
            PrimitiveType::Float => self
                .to_double()
                .map(|d| Self::Float(d as f32))
                .ok_or_else(fail),
            PrimitiveType::Decimal => match self {
                Self::String(s) | Self::UntypedAtomic(s) => {
                    parse_decimal(s).map(Self::Decimal).ok_or_else(fail)
                }
                _ => self
                    .to_double()
                    .filter(|d| d.is_finite())
                    .map(Self::Decimal)
                    .ok_or_else(fail),
            },
            PrimitiveType::Integer => match self {
                Self::String(s) | Self::UntypedAtomic(s) => {
                    s.trim().parse::<i64>().map(Self::Integer).map_err(|_| fail())
                }
                _ => self
                    .to_double()
                    .filter(|d| d.is_finite() && d.abs() < 9.2e18)
                    .map(|d| Self::Integer(d.trunc() as i64))
                    .ok_or_else(fail),
            },
        }
    }

    /// Numeric view used by the numeric casts; strings are parsed with
    /// `xs:double` lexical rules.
    fn to_double(&self) -> Option<f64> {
        match self {
            Self::String(s) | Self::UntypedAtomic(s) => parse_double(s),
            Self::AnyUri(_) => None,
            Self::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => self.as_double(),
        }
    }
}

impl fmt::Display for AtomicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_value())
    }
}

/// Parses an `xs:double` lexical form (`INF`, `-INF` and `NaN` included).
#[must_use]
pub fn parse_double(s: &str) -> Option<f64> {
    let s = s.trim();
    match s {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        "" => None,
        _ if s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')) =>
        {
            s.parse::<f64>().ok()
        }
        _ => None,
    }
}

/// Parses an `xs:decimal` lexical form (no exponent, no special values).
fn parse_decimal(s: &str) -> Option<f64> {
    let s = s.trim();
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    let mut seen_digit = false;
    let mut seen_point = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_point => seen_point = true,
            _ => return None,
        }
    }
    if seen_digit { s.parse::<f64>().ok() } else { None }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn format_double(d: f64) -> String {
    if d.is_nan() {
        "NaN".to_string()
    } else if d.is_infinite() {
        (if d > 0.0 { "INF" } else { "-INF" }).to_string()
    } else if d == 0.0 {
        (if d.is_sign_negative() { "-0" } else { "0" }).to_string()
    } else if d.fract() == 0.0 && d.abs() < 1e15 {
        format!("{}", d as i64)
    } else {
        format!("{d}")
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn format_decimal(d: f64) -> String {
    if d.fract() == 0.0 && d.abs() < 1e15 {
        format!("{}", d as i64)
    } else {
        format!("{d}")
    }
}
