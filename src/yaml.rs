//! YAML conversion.
//!
//! Decoding is event-driven, like the JSON converter: a serde [`Visitor`]
//! builds tables straight from `serde_yaml`'s parser. Encoding builds a
//! `serde_yaml::Value` tree and hands it to `serde_yaml` for emission;
//! whitespace and quoting style are the emitter's business.
//!
//! ## Scalar rules
//!
//! String scalars are typed from their literal text, whether or not they were
//! quoted in the source:
//!
//! - exactly `true`, `True` or `TRUE` decode as `true`, and exactly `false`,
//!   `False` or `FALSE` decode as `false`. No other spellings count.
//! - otherwise, if the *whole* text parses as a number, it decodes as one
//!   (integer first, then float);
//! - otherwise the text stays a string.
//!
//! Mapping keys are never typed: a key is the literal text of its scalar.
//! A key spelled as a YAML null (`~`, `null`, or empty) is rejected.
//!
//! On the way out every number is written as a double-precision literal.
//!
//! ## Nil asymmetry
//!
//! A [`Value::Nil`] inside a sequence encodes as YAML `null`, but a `Nil`
//! mapping value drops its key entirely:
//!
//! ```rust
//! use table_codec::{table, yaml, Value};
//!
//! let bytes = yaml::serialize(&table!{"a" => Value::Nil, "b" => "x"}).unwrap();
//! assert_eq!(bytes, b"b: x\n");
//! ```

use crate::classify::{classify, mapping_key, Shape};
use crate::guard::CycleGuard;
use crate::{Error, Format, Number, Options, Result, Table, Value};
use serde::de::{self, DeserializeSeed, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor};
use serde_yaml::{Mapping, Value as YamlValue};
use std::cell::Cell;
use std::fmt;

/// Serializes `table` to YAML.
///
/// # Errors
///
/// - [`Error::CyclicStructure`] if a table contains itself
/// - [`Error::NonStringKey`] for a boolean mapping key
/// - [`Error::UnsupportedValueType`] for an [`Opaque`](crate::Opaque) value
pub fn serialize(table: &Table) -> Result<Vec<u8>> {
    serialize_with_options(table, &Options::default())
}

/// Serializes `table` to YAML with custom options.
///
/// Only `max_depth` applies; the YAML layout is fixed by the emitter.
pub fn serialize_with_options(table: &Table, options: &Options) -> Result<Vec<u8>> {
    let mut guard = CycleGuard::new(options.max_depth);
    let tree = encode_table(table, &mut guard)?;
    let out = serde_yaml::to_string(&tree).map_err(|e| Error::emit(Format::Yaml, e))?;

    tracing::debug!(format = "yaml", bytes = out.len(), "serialized table");
    Ok(out.into_bytes())
}

/// Decodes a single YAML document into a fresh value.
///
/// Mapping keys keep the literal text they have in the source, so `True`,
/// `007` and `0x10` stay exactly that.
///
/// # Errors
///
/// - [`Error::EmptyInput`] for a zero-length buffer
/// - [`Error::Syntax`] for malformed YAML or a multi-document stream
/// - [`Error::NonScalarKey`] for a null, sequence or mapping key
pub fn deserialize(input: &[u8]) -> Result<Value> {
    if input.is_empty() {
        return Err(Error::EmptyInput);
    }

    let non_scalar = Cell::new(false);
    let decoded = ValueSeed {
        non_scalar: &non_scalar,
    }
    .deserialize(serde_yaml::Deserializer::from_slice(input));

    match decoded {
        Ok(value) => {
            tracing::debug!(format = "yaml", bytes = input.len(), "deserialized document");
            Ok(value)
        }
        Err(_) if non_scalar.get() => Err(Error::NonScalarKey),
        Err(e) => Err(Error::syntax(Format::Yaml, e)),
    }
}

/// Types a scalar from its literal text.
fn decode_scalar(text: &str) -> Value {
    match text {
        "true" | "True" | "TRUE" => Value::Bool(true),
        "false" | "False" | "FALSE" => Value::Bool(false),
        _ => parse_number(text).map_or_else(|| Value::String(text.to_string()), Value::Number),
    }
}

/// Parses `text` as a number only if the entire string is consumed.
fn parse_number(text: &str) -> Option<Number> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::Integer(i));
    }
    text.parse::<f64>().ok().map(Number::Float)
}

fn is_null_spelling(text: &str) -> bool {
    matches!(text, "" | "~" | "null" | "Null" | "NULL")
}

/// Builds values from parser events.
///
/// `non_scalar` is raised when a mapping key is not a scalar, so the caller
/// can report [`Error::NonScalarKey`] instead of a parse failure.
#[derive(Clone, Copy)]
struct ValueSeed<'a> {
    non_scalar: &'a Cell<bool>,
}

impl<'de> DeserializeSeed<'de> for ValueSeed<'_> {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for ValueSeed<'_> {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any YAML value")
    }

    fn visit_bool<E>(self, value: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(value))
    }

    fn visit_i64<E>(self, value: i64) -> std::result::Result<Value, E> {
        Ok(Value::Number(Number::Integer(value)))
    }

    fn visit_u64<E>(self, value: u64) -> std::result::Result<Value, E> {
        match i64::try_from(value) {
            Ok(i) => Ok(Value::Number(Number::Integer(i))),
            Err(_) => Ok(Value::Number(Number::Float(value as f64))),
        }
    }

    fn visit_i128<E>(self, value: i128) -> std::result::Result<Value, E> {
        Ok(Value::Number(Number::Float(value as f64)))
    }

    fn visit_u128<E>(self, value: u128) -> std::result::Result<Value, E> {
        Ok(Value::Number(Number::Float(value as f64)))
    }

    fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
        Ok(Value::Number(Number::Float(value)))
    }

    fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E> {
        Ok(decode_scalar(value))
    }

    fn visit_unit<E>(self) -> std::result::Result<Value, E> {
        Ok(Value::Nil)
    }

    fn visit_none<E>(self) -> std::result::Result<Value, E> {
        Ok(Value::Nil)
    }

    fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let table = Table::with_capacity(seq.size_hint().unwrap_or(0));
        let mut index: i64 = 0;
        while let Some(element) = seq.next_element_seed(self)? {
            index += 1;
            table.set(index, element);
        }
        Ok(Value::Table(table))
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let table = Table::with_capacity(map.size_hint().unwrap_or(0));
        let key_seed = KeySeed {
            non_scalar: self.non_scalar,
        };
        while let Some(key) = map.next_key_seed(key_seed)? {
            let value = map.next_value_seed(self)?;
            // keys that coincide: last one wins
            table.set(key, value);
        }
        Ok(Value::Table(table))
    }

    /// A tagged node (`!point {x: 1}`) decodes as its untagged content.
    fn visit_enum<A>(self, data: A) -> std::result::Result<Value, A::Error>
    where
        A: EnumAccess<'de>,
    {
        let (_tag, content) = data.variant::<String>()?;
        content.newtype_variant_seed(self)
    }
}

/// Reads a mapping key as the literal text of its scalar.
#[derive(Clone, Copy)]
struct KeySeed<'a> {
    non_scalar: &'a Cell<bool>,
}

impl<'de> DeserializeSeed<'de> for KeySeed<'_> {
    type Value = String;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<String, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        // the whole document is already parsed, so a failure here means the
        // key is not a scalar
        deserializer.deserialize_str(self).map_err(|e| {
            self.non_scalar.set(true);
            e
        })
    }
}

impl<'de> Visitor<'de> for KeySeed<'_> {
    type Value = String;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a scalar mapping key")
    }

    fn visit_str<E>(self, value: &str) -> std::result::Result<String, E>
    where
        E: de::Error,
    {
        if is_null_spelling(value) {
            return Err(E::custom("null mapping key"));
        }
        Ok(value.to_string())
    }
}

fn encode_table(table: &Table, guard: &mut CycleGuard) -> Result<YamlValue> {
    let mut scope = guard.enter(table)?;

    match classify(table) {
        Shape::Sequence(items) => {
            let mut sequence = Vec::with_capacity(items.len());
            for item in &items {
                sequence.push(encode_value(item, &mut scope)?);
            }
            Ok(YamlValue::Sequence(sequence))
        }
        Shape::Mapping(entries) => {
            let mut mapping = Mapping::with_capacity(entries.len());
            for (key, value) in &entries {
                let name = mapping_key(key)
                    .ok_or_else(|| Error::non_string_key(Format::Yaml, key.type_name()))?;
                if value.is_nil() {
                    continue;
                }
                mapping.insert(YamlValue::String(name), encode_value(value, &mut scope)?);
            }
            Ok(YamlValue::Mapping(mapping))
        }
    }
}

fn encode_value(value: &Value, guard: &mut CycleGuard) -> Result<YamlValue> {
    match value {
        Value::Nil => Ok(YamlValue::Null),
        Value::Bool(b) => Ok(YamlValue::Bool(*b)),
        Value::Number(n) => Ok(YamlValue::Number(serde_yaml::Number::from(n.as_f64()))),
        Value::String(s) => Ok(YamlValue::String(s.clone())),
        Value::Table(t) => encode_table(t, guard),
        Value::Opaque(_) => Err(Error::unsupported_value(Format::Yaml, value.type_name())),
    }
}
