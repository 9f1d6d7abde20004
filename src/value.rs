//! Dynamic value representation shared by every converter.
//!
//! This module provides the [`Value`] enum, the canonical intermediary that all
//! four decoders produce and all four encoders consume. It mirrors the value
//! kinds of a dynamically typed host runtime: nil, booleans, numbers, strings,
//! tables, and opaque host objects that have no interchange representation.
//!
//! ## Creating Values
//!
//! ```rust
//! use table_codec::{table, Number, Value};
//!
//! let nil = Value::Nil;
//! let flag = Value::from(true);
//! let count = Value::from(42);
//! let text = Value::from("hello");
//! let list = Value::from(table!["a", "b"]);
//!
//! assert!(nil.is_nil());
//! assert_eq!(count, Value::Number(Number::Integer(42)));
//! assert!(list.is_table());
//! ```
//!
//! ## Numbers
//!
//! The host has a single numeric type, so [`Number`] compares numerically
//! across its variants: `Integer(1)` equals `Float(1.0)`. The variant only
//! records whether the source format spelled the number as an exact integer.

use crate::table::Table;
use std::fmt;

/// A dynamically-typed host value.
///
/// Tables are reference handles; cloning a `Value::Table` clones the handle,
/// not the contents. Equality is structural for tables (see [`Table`]).
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Number(Number),
    String(String),
    Table(Table),
    Opaque(Opaque),
}

/// A numeric value, tracking integer exactness where the source format does.
///
/// # Examples
///
/// ```rust
/// use table_codec::Number;
///
/// assert!(Number::Integer(42).is_integer());
/// assert_eq!(Number::Integer(2), Number::Float(2.0));
/// assert_eq!(Number::Float(2.5).as_i64(), None);
/// ```
#[derive(Clone, Copy, Debug)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

/// A host object that cannot be marshaled, such as a function or userdata.
///
/// Encoders reject it with [`Error::UnsupportedValueType`](crate::Error::UnsupportedValueType),
/// naming `type_name` in the message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Opaque {
    pub type_name: &'static str,
    pub handle: usize,
}

impl Opaque {
    #[must_use]
    pub const fn new(type_name: &'static str, handle: usize) -> Self {
        Opaque { type_name, handle }
    }
}

impl Number {
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    /// Converts this number to an `i64` if it holds an exact integer.
    ///
    /// Floats qualify when they have no fractional part and fit in range.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => Some(*i),
            Number::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b,
            (Number::Integer(i), Number::Float(f)) | (Number::Float(f), Number::Integer(i)) => {
                *i as f64 == *f
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Float(fl) => f.write_str(&format_float(*fl)),
        }
    }
}

/// Significant digits the host prints a float with.
const FLOAT_DIGITS: i32 = 14;

/// Formats `value` the way the host prints floats (C's `%.14g`): 14
/// significant digits, trailing zeros dropped, and exponent notation when
/// the exponent is below -4 or at least 14.
///
/// ```rust
/// use table_codec::Number;
///
/// assert_eq!(Number::Float(1e20).to_string(), "1e+20");
/// assert_eq!(Number::Float(0.1 + 0.2).to_string(), "0.3");
/// assert_eq!(Number::Float(1.5e-7).to_string(), "1.5e-07");
/// ```
pub(crate) fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // rounding to the target precision first fixes the exponent
    let scientific = format!("{:.*e}", (FLOAT_DIGITS - 1) as usize, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= FLOAT_DIGITS {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (FLOAT_DIGITS - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Integer(value as i64)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(value)
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Number::Integer(value as i64)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl Value {
    /// Returns the host type name of this value, as used in error messages.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use table_codec::{Opaque, Value};
    ///
    /// assert_eq!(Value::Nil.type_name(), "nil");
    /// assert_eq!(Value::from(1.5).type_name(), "number");
    /// assert_eq!(Value::Opaque(Opaque::new("function", 7)).type_name(), "function");
    /// ```
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Table(_) => "table",
            Value::Opaque(o) => o.type_name,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self, Value::Table(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(|n| n.as_i64())
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(|n| n.as_f64())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Converts a string or number to text, the way the host runtime does
    /// when a string is expected. Every other kind yields `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use table_codec::Value;
    ///
    /// assert_eq!(Value::from("id").coerce_string().as_deref(), Some("id"));
    /// assert_eq!(Value::from(7).coerce_string().as_deref(), Some("7"));
    /// assert_eq!(Value::from(true).coerce_string(), None);
    /// ```
    #[must_use]
    pub fn coerce_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value.as_i64().ok_or(crate::Error::TypeMismatch {
            expected: "an integer",
            found: value.type_name(),
        })
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value.as_f64().ok_or(crate::Error::TypeMismatch {
            expected: "a number",
            found: value.type_name(),
        })
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value.as_bool().ok_or(crate::Error::TypeMismatch {
            expected: "a boolean",
            found: value.type_name(),
        })
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(crate::Error::TypeMismatch {
                expected: "a string",
                found: other.type_name(),
            }),
        }
    }
}

impl TryFrom<Value> for Table {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Table(t) => Ok(t),
            other => Err(crate::Error::TypeMismatch {
                expected: "a table",
                found: other.type_name(),
            }),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(Number::Integer(value as i64))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::Integer(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(Number::Integer(value as i64))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Float(value))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Table> for Value {
    fn from(value: Table) -> Self {
        Value::Table(value)
    }
}

impl From<Opaque> for Value {
    fn from(value: Opaque) -> Self {
        Value::Opaque(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table;

    #[test]
    fn test_number_equality_is_numeric() {
        assert_eq!(Number::Integer(3), Number::Float(3.0));
        assert_eq!(Number::Float(3.0), Number::Integer(3));
        assert_ne!(Number::Integer(3), Number::Float(3.5));
        assert_ne!(Number::Float(f64::NAN), Number::Float(f64::NAN));
    }

    #[test]
    fn test_number_as_i64() {
        assert_eq!(Number::Integer(42).as_i64(), Some(42));
        assert_eq!(Number::Float(42.0).as_i64(), Some(42));
        assert_eq!(Number::Float(42.5).as_i64(), None);
        assert_eq!(Number::Float(f64::INFINITY).as_i64(), None);
    }

    #[test]
    fn test_number_display() {
        assert_eq!(Number::Integer(-7).to_string(), "-7");
        assert_eq!(Number::Float(2.0).to_string(), "2");
        assert_eq!(Number::Float(0.25).to_string(), "0.25");
        assert_eq!(Number::Float(1e20).to_string(), "1e+20");
        assert_eq!(Number::Float(-1.5e-7).to_string(), "-1.5e-07");
        assert_eq!(Number::Float(123456.789).to_string(), "123456.789");
        assert_eq!(Number::Float(1e14).to_string(), "1e+14");
        assert_eq!(Number::Float(99999999999999.0).to_string(), "99999999999999");
        assert_eq!(Number::Float(0.0001).to_string(), "0.0001");
        assert_eq!(Number::Float(f64::INFINITY).to_string(), "inf");
    }

    #[test]
    fn test_tryfrom() {
        assert_eq!(i64::try_from(Value::from(42)).unwrap(), 42);
        assert_eq!(f64::try_from(Value::from(42)).unwrap(), 42.0);
        assert!(bool::try_from(Value::from(1)).is_err());
        assert_eq!(String::try_from(Value::from("x")).unwrap(), "x");
        assert!(String::try_from(Value::from(1)).is_err());
        assert!(Table::try_from(Value::from(table![1])).is_ok());
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i32>), Value::Nil);
        assert_eq!(Value::from(Some("a")), Value::from("a"));
    }

    #[test]
    fn test_coerce_string() {
        assert_eq!(Value::from(1.5).coerce_string().as_deref(), Some("1.5"));
        assert_eq!(Value::Nil.coerce_string(), None);
        assert_eq!(Value::from(table![]).coerce_string(), None);
    }
}
