//! Array/map classification of host tables.
//!
//! A host table has no declared shape, so every encoder asks [`classify`]
//! whether to emit it as a sequence or as a mapping. The rule is shared by
//! all tree-building converters:
//!
//! - `len` is the border: the largest `N` such that keys `1..N` are all
//!   present with non-nil values.
//! - The table is a **sequence** iff every key present is an integer in
//!   `[1, len]`. A table with no keys is an empty sequence.
//! - Anything else (a hole, an integer key past the border, or a
//!   non-integer key) makes it a **mapping**.
//!
//! ```rust
//! use table_codec::classify::{classify, Shape};
//! use table_codec::table;
//!
//! assert!(matches!(classify(&table!["a", "b"]), Shape::Sequence(_)));
//! assert!(matches!(classify(&table!{1 => "a", 3 => "c"}), Shape::Mapping(_)));
//! assert!(matches!(classify(&table![]), Shape::Sequence(ref v) if v.is_empty()));
//! ```

use crate::{Key, Table, Value};

/// The shape a table takes when it is encoded.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Values at keys `1..=len`, in index order.
    Sequence(Vec<Value>),
    /// All entries, in the table's insertion order.
    Mapping(Vec<(Key, Value)>),
}

impl Shape {
    #[must_use]
    pub const fn is_sequence(&self) -> bool {
        matches!(self, Shape::Sequence(_))
    }
}

/// Classifies `table` as a sequence or a mapping and takes a snapshot of its
/// contents in that shape.
#[must_use]
pub fn classify(table: &Table) -> Shape {
    let entries = table.entries();
    let len = table.len();

    let dense = entries.iter().all(|(key, _)| match key {
        Key::Integer(i) => *i >= 1 && (*i as u64) <= len as u64,
        _ => false,
    });

    if dense {
        let mut items = vec![Value::Nil; len];
        for (key, value) in entries {
            if let Key::Integer(i) = key {
                items[i as usize - 1] = value;
            }
        }
        Shape::Sequence(items)
    } else {
        Shape::Mapping(entries)
    }
}

/// Converts a mapping key to its string form.
///
/// Strings pass through and numbers render the way the host prints them.
/// Booleans have no string form; callers report their format's key error.
#[must_use]
pub fn mapping_key(key: &Key) -> Option<String> {
    match key {
        Key::String(s) => Some(s.clone()),
        Key::Integer(i) => Some(i.to_string()),
        Key::Float(f) => Some(crate::value::format_float(*f)),
        Key::Bool(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table;

    #[test]
    fn test_dense_table_is_sequence() {
        let shape = classify(&table!["a", "b", "c"]);
        assert_eq!(
            shape,
            Shape::Sequence(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn test_sequence_orders_by_index() {
        let t = table! {3 => "c", 1 => "a", 2 => "b"};
        assert_eq!(
            classify(&t),
            Shape::Sequence(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn test_empty_table_is_empty_sequence() {
        assert_eq!(classify(&Table::new()), Shape::Sequence(vec![]));
    }

    #[test]
    fn test_hole_makes_mapping() {
        let shape = classify(&table! {1 => "a", 3 => "c"});
        assert!(!shape.is_sequence());
    }

    #[test]
    fn test_nil_entry_is_a_hole() {
        let shape = classify(&table! {1 => "a", 2 => Value::Nil});
        assert!(!shape.is_sequence());
    }

    #[test]
    fn test_non_integer_keys_make_mapping() {
        assert!(!classify(&table! {1 => "a", "n" => 1}).is_sequence());
        assert!(!classify(&table! {1.5 => "a"}).is_sequence());
        assert!(!classify(&table! {0 => "a"}).is_sequence());
        assert!(!classify(&table! {-1 => "a"}).is_sequence());
    }

    #[test]
    fn test_mapping_keeps_insertion_order() {
        let shape = classify(&table! {"b" => 1, "a" => 2});
        assert_eq!(
            shape,
            Shape::Mapping(vec![
                (Key::from("b"), Value::from(1)),
                (Key::from("a"), Value::from(2)),
            ])
        );
    }

    #[test]
    fn test_mapping_key_coercion() {
        assert_eq!(mapping_key(&Key::from("k")).as_deref(), Some("k"));
        assert_eq!(mapping_key(&Key::from(3)).as_deref(), Some("3"));
        assert_eq!(mapping_key(&Key::from(0.5)).as_deref(), Some("0.5"));
        assert_eq!(mapping_key(&Key::from(true)), None);
    }

    #[test]
    fn test_float_keys_use_host_spelling() {
        assert_eq!(mapping_key(&Key::from(1e20)).as_deref(), Some("1e+20"));
        assert_eq!(mapping_key(&Key::from(2.5e-9)).as_deref(), Some("2.5e-09"));
        assert_eq!(Key::from(1e20).to_string(), "1e+20");
    }
}
