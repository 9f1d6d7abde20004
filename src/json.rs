//! JSON conversion.
//!
//! Decoding is event-driven: a serde [`Visitor`] receives the parser's
//! events (`visit_map`, `visit_seq`, scalars) and builds tables as they
//! arrive. Encoding classifies every table, builds a `serde_json::Value`
//! tree and lets `serde_json` render it.
//!
//! ## Scalar rules
//!
//! - Integer literals that fit in `i64` decode as [`Number::Integer`];
//!   larger unsigned literals and literals with a fraction or exponent
//!   decode as [`Number::Float`].
//! - `null` decodes as [`Value::Nil`]. Inside an array it still occupies its
//!   index, so `[1, null]` has keys `1` and `2`.
//! - [`Value::Nil`] encodes as `null` in every position. Non-finite floats
//!   have no JSON form and also encode as `null`.
//!
//! ```rust
//! use table_codec::{json, table, Value};
//!
//! let bytes = json::serialize(&table!{"name" => "Alice", "tags" => table!["a", "b"]}).unwrap();
//! assert_eq!(bytes, br#"{"name":"Alice","tags":["a","b"]}"#);
//!
//! let value = json::deserialize(&bytes).unwrap();
//! let table = value.as_table().unwrap();
//! assert_eq!(table.get("name"), Value::from("Alice"));
//! ```

use crate::classify::{classify, mapping_key, Shape};
use crate::guard::CycleGuard;
use crate::{Error, Format, Number, Options, Result, Table, Value};
use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Value as JsonValue};
use std::cell::Cell;
use std::fmt;

/// Serializes `table` to compact JSON.
///
/// # Errors
///
/// - [`Error::CyclicStructure`] if a table contains itself
/// - [`Error::KeyType`] for a boolean mapping key
/// - [`Error::UnsupportedValueType`] for an [`Opaque`](crate::Opaque) value
pub fn serialize(table: &Table) -> Result<Vec<u8>> {
    serialize_with_options(table, &Options::default())
}

/// Serializes `table` to JSON with custom options.
pub fn serialize_with_options(table: &Table, options: &Options) -> Result<Vec<u8>> {
    let mut guard = CycleGuard::new(options.max_depth);
    let tree = encode_table(table, &mut guard)?;

    let out = if options.pretty {
        serde_json::to_vec_pretty(&tree)
    } else {
        serde_json::to_vec(&tree)
    }
    .map_err(|e| Error::emit(Format::Json, e))?;

    tracing::debug!(format = "json", bytes = out.len(), "serialized table");
    Ok(out)
}

/// Decodes a JSON document into a fresh value.
///
/// # Errors
///
/// - [`Error::EmptyInput`] for a zero-length buffer
/// - [`Error::Syntax`] for malformed JSON, invalid UTF-8 or trailing data
/// - [`Error::BinaryUnsupported`] if the parser reports a binary scalar
pub fn deserialize(input: &[u8]) -> Result<Value> {
    if input.is_empty() {
        return Err(Error::EmptyInput);
    }

    let binary = Cell::new(false);
    let mut de = serde_json::Deserializer::from_slice(input);
    let decoded = ValueSeed { binary: &binary }
        .deserialize(&mut de)
        .and_then(|value| de.end().map(|()| value));

    match decoded {
        Ok(value) => {
            tracing::debug!(format = "json", bytes = input.len(), "deserialized document");
            Ok(value)
        }
        Err(_) if binary.get() => Err(Error::BinaryUnsupported),
        Err(e) => Err(Error::syntax(Format::Json, e)),
    }
}

fn encode_table(table: &Table, guard: &mut CycleGuard) -> Result<JsonValue> {
    let mut scope = guard.enter(table)?;

    match classify(table) {
        Shape::Sequence(items) => {
            let mut array = Vec::with_capacity(items.len());
            for item in &items {
                array.push(encode_value(item, &mut scope)?);
            }
            Ok(JsonValue::Array(array))
        }
        Shape::Mapping(entries) => {
            let mut object = Map::with_capacity(entries.len());
            for (key, value) in &entries {
                let name = mapping_key(key).ok_or(Error::KeyType {
                    found: key.type_name(),
                })?;
                object.insert(name, encode_value(value, &mut scope)?);
            }
            Ok(JsonValue::Object(object))
        }
    }
}

fn encode_value(value: &Value, guard: &mut CycleGuard) -> Result<JsonValue> {
    match value {
        Value::Nil => Ok(JsonValue::Null),
        Value::Bool(b) => Ok(JsonValue::Bool(*b)),
        Value::Number(Number::Integer(i)) => Ok(JsonValue::from(*i)),
        Value::Number(Number::Float(f)) => Ok(serde_json::Number::from_f64(*f)
            .map_or(JsonValue::Null, JsonValue::Number)),
        Value::String(s) => Ok(JsonValue::String(s.clone())),
        Value::Table(t) => encode_table(t, guard),
        Value::Opaque(_) => Err(Error::unsupported_value(Format::Json, value.type_name())),
    }
}

/// Builds values straight from parser events.
///
/// `binary` is raised when the parser hands over a byte-string scalar, so the
/// caller can report it as [`Error::BinaryUnsupported`] rather than as a
/// generic parse failure.
#[derive(Clone, Copy)]
struct ValueSeed<'a> {
    binary: &'a Cell<bool>,
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
        formatter.write_str("any valid JSON value")
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

    fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
        Ok(Value::Number(Number::Float(value)))
    }

    fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(value.to_string()))
    }

    fn visit_string<E>(self, value: String) -> std::result::Result<Value, E> {
        Ok(Value::String(value))
    }

    fn visit_bytes<E>(self, _value: &[u8]) -> std::result::Result<Value, E>
    where
        E: de::Error,
    {
        self.binary.set(true);
        Err(E::custom("binary json values are not supported"))
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
        while let Some(key) = map.next_key::<String>()? {
            let value = map.next_value_seed(self)?;
            table.set(key, value);
        }
        Ok(Value::Table(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{table, Opaque};

    fn encode(table: &Table) -> String {
        String::from_utf8(serialize(table).unwrap()).unwrap()
    }

    fn decode(text: &str) -> Value {
        deserialize(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_classification() {
        assert_eq!(encode(&table!["a", "b", "c"]), r#"["a","b","c"]"#);
        assert_eq!(encode(&table! {1 => "a", 3 => "c"}), r#"{"1":"a","3":"c"}"#);
        assert_eq!(encode(&Table::new()), "[]");
    }

    #[test]
    fn test_nil_encodes_as_null() {
        assert_eq!(
            encode(&table! {"a" => Value::Nil, "b" => 1}),
            r#"{"a":null,"b":1}"#
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(encode(&table![1, 2.5, -3]), "[1,2.5,-3]");
        assert_eq!(encode(&table![2.0]), "[2.0]");
        assert_eq!(encode(&table![f64::NAN, f64::INFINITY]), "[null,null]");
    }

    #[test]
    fn test_floats_round_trip_exactly() {
        for f in [1.9432074656054558e-171, 0.1 + 0.2, 5e-324, f64::MAX, -2.2250738585072014e-308] {
            let back = decode(&encode(&table![f]));
            let t = back.as_table().unwrap();
            match t.get(1) {
                Value::Number(Number::Float(g)) => assert_eq!(g.to_bits(), f.to_bits(), "{}", f),
                other => panic!("Expected float, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_boolean_key_is_rejected() {
        let err = serialize(&table! {true => 1}).unwrap_err();
        assert_eq!(err, Error::KeyType { found: "boolean" });
    }

    #[test]
    fn test_opaque_value_is_rejected() {
        let err = serialize(&table![Opaque::new("function", 1)]).unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedValueType {
                format: Format::Json,
                found: "function"
            }
        );
    }

    #[test]
    fn test_cycle_and_shared_sibling() {
        let shared = table!["x"];
        let root = table! {"a" => shared.clone(), "b" => shared.clone()};
        assert_eq!(encode(&root), r#"{"a":["x"],"b":["x"]}"#);

        shared.set(2, root.clone());
        assert_eq!(serialize(&root), Err(Error::CyclicStructure));
        shared.remove(2);
        assert!(serialize(&root).is_ok());
    }

    #[test]
    fn test_decode_number_kinds() {
        let value = decode("[1, 1.0, 1e2, -5, 18446744073709551615]");
        let t = value.as_table().unwrap();
        assert!(matches!(t.get(1), Value::Number(Number::Integer(1))));
        assert!(matches!(t.get(2), Value::Number(Number::Float(_))));
        assert!(matches!(t.get(3), Value::Number(Number::Float(_))));
        assert!(matches!(t.get(4), Value::Number(Number::Integer(-5))));
        assert!(matches!(t.get(5), Value::Number(Number::Float(_))));
    }

    #[test]
    fn test_decode_null_keeps_position() {
        let value = decode("[1, null, 3]");
        let t = value.as_table().unwrap();
        assert_eq!(t.key_count(), 3);
        assert_eq!(t.get(2), Value::Nil);
        assert_eq!(t.get(3), Value::from(3));

        let value = decode(r#"{"a": null}"#);
        assert!(value.as_table().unwrap().contains_key("a"));
    }

    #[test]
    fn test_decode_nested() {
        let value = decode(r#"{"user": {"name": "Alice", "tags": ["x", "y"]}, "ok": true}"#);
        let expected = table! {
            "user" => table! {"name" => "Alice", "tags" => table!["x", "y"]},
            "ok" => true,
        };
        assert_eq!(value, Value::Table(expected));
    }

    #[test]
    fn test_decode_scalar_root() {
        assert_eq!(decode("\"hi\""), Value::from("hi"));
        assert_eq!(decode("null"), Value::Nil);
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(deserialize(b""), Err(Error::EmptyInput));
        assert!(matches!(
            deserialize(b"{\"a\": }"),
            Err(Error::Syntax { format: Format::Json, .. })
        ));
        assert!(matches!(
            deserialize(b"[1] [2]"),
            Err(Error::Syntax { .. })
        ));
        assert!(matches!(
            deserialize(b"\"\xff\""),
            Err(Error::Syntax { .. })
        ));
    }

    #[test]
    fn test_binary_event_is_reported() {
        let binary = Cell::new(false);
        let result: std::result::Result<Value, serde_json::Error> =
            Visitor::visit_bytes(ValueSeed { binary: &binary }, b"\x00");
        assert!(result.is_err());
        assert!(binary.get());
    }
}
