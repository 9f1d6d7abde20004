/// Builds a [`Table`](crate::Table) from a literal.
///
/// `table![a, b, c]` sets keys `1..=3` by position, so a nil element keeps
/// its slot and leaves a hole. `table!{k => v, ..}` builds a table with the
/// given keys in order, and `table![]` an empty table.
/// Keys and values go through `Into<Key>` and `Into<Value>`.
///
/// ```rust
/// use table_codec::{table, Value};
///
/// let list = table!["a", "b"];
/// let record = table! {"tag" => "item", "children" => table![]};
/// assert_eq!(list.get(1), Value::from("a"));
/// assert_eq!(record.get("tag"), Value::from("item"));
/// ```
#[macro_export]
macro_rules! table {
    () => {
        $crate::Table::new()
    };

    ($($key:expr => $value:expr),+ $(,)?) => {{
        let table = $crate::Table::new();
        $(
            table.set($key, $value);
        )+
        table
    }};

    ($($value:expr),+ $(,)?) => {{
        let table = $crate::Table::new();
        let mut index: i64 = 0;
        $(
            index += 1;
            table.set(index, $value);
        )+
        table
    }};
}

#[cfg(test)]
mod tests {
    use crate::{Key, Number, Table, Value};

    #[test]
    fn test_table_macro_empty() {
        assert!(table![].is_empty());
        assert!(table! {}.is_empty());
    }

    #[test]
    fn test_table_macro_sequence() {
        let t = table![1, "two", 3.0];
        assert_eq!(t.len(), 3);
        assert_eq!(t.get(1), Value::Number(Number::Integer(1)));
        assert_eq!(t.get(2), Value::String("two".to_string()));
    }

    #[test]
    fn test_table_macro_nil_keeps_its_position() {
        let t = table![1, Value::Nil, 3];
        assert_eq!(t.key_count(), 3);
        assert_eq!(t.get(2), Value::Nil);
        assert_eq!(t.get(3), Value::from(3));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_table_macro_mapping() {
        let t = table! {
            "name" => "Alice",
            "tags" => table!["a", "b"],
            7 => true,
        };
        assert_eq!(t.key_count(), 3);
        assert_eq!(t.entries()[2].0, Key::Integer(7));
        assert!(matches!(t.get("tags"), Value::Table(ref inner) if inner.len() == 2));

        let nested: Table = t.get("tags").try_into().unwrap();
        assert_eq!(nested.get(2), Value::from("b"));
    }
}
