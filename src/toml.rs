//! TOML conversion.
//!
//! A TOML document is always a table, so the root table is written as the
//! document table whatever its shape: its keys are coerced to strings even
//! when it would otherwise classify as a sequence. Nested tables follow the
//! shared classifier.
//!
//! TOML has no null, so a [`Value::Nil`] mapping value drops its key, as in
//! YAML. Every number is written as a float, which deliberately loses the
//! integer/float distinction on the way out; on the way in, TOML integers
//! keep it.
//!
//! ```rust
//! use table_codec::{table, toml};
//!
//! let bytes = toml::serialize(&table!{"port" => 8080, "host" => "localhost"}).unwrap();
//! assert_eq!(bytes, b"port = 8080.0\nhost = \"localhost\"\n");
//! ```

use crate::classify::{classify, mapping_key, Shape};
use crate::guard::CycleGuard;
use crate::{Error, Format, Key, Number, Options, Result, Table, Value};
use ::toml::{Table as TomlTable, Value as TomlValue};

/// Serializes `table` as a TOML document.
///
/// # Errors
///
/// - [`Error::CyclicStructure`] if a table contains itself
/// - [`Error::NonStringKey`] for a boolean mapping key
/// - [`Error::UnsupportedValueType`] for an [`Opaque`](crate::Opaque) value
/// - [`Error::Emit`] if the emitter rejects the document
pub fn serialize(table: &Table) -> Result<Vec<u8>> {
    serialize_with_options(table, &Options::default())
}

/// Serializes `table` as a TOML document with custom options.
pub fn serialize_with_options(table: &Table, options: &Options) -> Result<Vec<u8>> {
    let mut guard = CycleGuard::new(options.max_depth);
    let document = {
        let mut scope = guard.enter(table)?;
        encode_entries(&table.entries(), &mut scope)?
    };

    let out = if options.pretty {
        ::toml::to_string_pretty(&document)
    } else {
        ::toml::to_string(&document)
    }
    .map_err(|e| Error::emit(Format::Toml, e))?;

    tracing::debug!(format = "toml", bytes = out.len(), "serialized table");
    Ok(out.into_bytes())
}

/// Decodes a TOML document into a fresh table.
///
/// Date-time values become strings in their TOML spelling.
///
/// # Errors
///
/// - [`Error::EmptyInput`] for a zero-length buffer
/// - [`Error::Syntax`] for malformed TOML or invalid UTF-8
pub fn deserialize(input: &[u8]) -> Result<Value> {
    if input.is_empty() {
        return Err(Error::EmptyInput);
    }

    let text = std::str::from_utf8(input).map_err(|e| Error::syntax(Format::Toml, e))?;
    let document: TomlTable =
        ::toml::from_str(text).map_err(|e| Error::syntax(Format::Toml, e.message()))?;

    tracing::debug!(format = "toml", bytes = input.len(), "deserialized document");
    Ok(Value::Table(decode_table(&document)))
}

fn decode_table(document: &TomlTable) -> Table {
    document
        .iter()
        .map(|(key, value)| (Key::from(key.as_str()), decode_value(value)))
        .collect()
}

fn decode_value(value: &TomlValue) -> Value {
    match value {
        TomlValue::String(s) => Value::String(s.clone()),
        TomlValue::Integer(i) => Value::Number(Number::Integer(*i)),
        TomlValue::Float(f) => Value::Number(Number::Float(*f)),
        TomlValue::Boolean(b) => Value::Bool(*b),
        TomlValue::Datetime(dt) => Value::String(dt.to_string()),
        TomlValue::Array(items) => Value::Table(items.iter().map(decode_value).collect()),
        TomlValue::Table(table) => Value::Table(decode_table(table)),
    }
}

fn encode_entries(entries: &[(Key, Value)], guard: &mut CycleGuard) -> Result<TomlTable> {
    let mut out = TomlTable::new();
    for (key, value) in entries {
        let name = mapping_key(key)
            .ok_or_else(|| Error::non_string_key(Format::Toml, key.type_name()))?;
        if value.is_nil() {
            continue;
        }
        out.insert(name, encode_value(value, guard)?);
    }
    Ok(out)
}

fn encode_table(table: &Table, guard: &mut CycleGuard) -> Result<TomlValue> {
    let mut scope = guard.enter(table)?;

    match classify(table) {
        Shape::Sequence(items) => {
            let mut array = Vec::with_capacity(items.len());
            for item in &items {
                array.push(encode_value(item, &mut scope)?);
            }
            Ok(TomlValue::Array(array))
        }
        Shape::Mapping(entries) => Ok(TomlValue::Table(encode_entries(&entries, &mut scope)?)),
    }
}

fn encode_value(value: &Value, guard: &mut CycleGuard) -> Result<TomlValue> {
    match value {
        Value::Bool(b) => Ok(TomlValue::Boolean(*b)),
        Value::Number(n) => Ok(TomlValue::Float(n.as_f64())),
        Value::String(s) => Ok(TomlValue::String(s.clone())),
        Value::Table(t) => encode_table(t, guard),
        // sequences never hold nil and mappings skip it
        Value::Nil | Value::Opaque(_) => {
            Err(Error::unsupported_value(Format::Toml, value.type_name()))
        }
    }
}
