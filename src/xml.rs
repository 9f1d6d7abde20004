//! XML conversion.
//!
//! XML has no natural sequence/mapping reading, so this converter works with
//! *element records* instead: tables with the fields
//!
//! | Field | Kind | Notes |
//! |-------|------|-------|
//! | `tag` | string | element name, mandatory and non-empty |
//! | `attr` | table of string → string | optional on encode, always present on decode |
//! | `text` | string | direct text content, omitted when empty |
//! | `children` | sequence of records | optional on encode, always present on decode |
//!
//! Decoding uses `roxmltree` for the element tree. Encoding writes the text
//! itself: one tab per nesting level, one element per line, and
//! self-closing tags for elements with neither text nor children.
//!
//! ```rust
//! use table_codec::{table, xml};
//!
//! let record = table! {
//!     "tag" => "a",
//!     "attr" => table! {"id" => "1"},
//!     "children" => table![table! {"tag" => "b"}],
//! };
//! assert_eq!(xml::serialize(&record).unwrap(), b"<a id=\"1\">\n\t<b/>\n</a>\n");
//! ```

use crate::guard::CycleGuard;
use crate::{Error, Format, Key, Options, Result, Table, Value};
use roxmltree::{Document, ExpandedName, Node, ParsingOptions};

/// Serializes an element record to XML text.
///
/// # Errors
///
/// - [`Error::TagMissing`] if `tag` is absent, empty or not a string
/// - [`Error::AttrKeyType`] / [`Error::AttrValueType`] for non-string attributes
/// - [`Error::ChildrenType`] if `children` or one of its entries is not a table
/// - [`Error::FieldType`] if `attr` is not a table or `text` is not a string
/// - [`Error::CyclicStructure`] if a record contains itself
pub fn serialize(record: &Table) -> Result<Vec<u8>> {
    serialize_with_options(record, &Options::default())
}

/// Serializes an element record with custom options.
///
/// Only `max_depth` applies; the layout is fixed.
pub fn serialize_with_options(record: &Table, options: &Options) -> Result<Vec<u8>> {
    let mut guard = CycleGuard::new(options.max_depth);
    let mut out = String::with_capacity(1024);
    emit_element(record, &mut guard, &mut out, 0)?;

    tracing::debug!(format = "xml", bytes = out.len(), "serialized table");
    Ok(out.into_bytes())
}

/// Decodes an XML document into the element record of its root.
///
/// # Errors
///
/// - [`Error::EmptyInput`] for a zero-length buffer
/// - [`Error::Syntax`] for malformed XML, invalid UTF-8 or a missing root
pub fn deserialize(input: &[u8]) -> Result<Value> {
    if input.is_empty() {
        return Err(Error::EmptyInput);
    }

    let text = std::str::from_utf8(input).map_err(|e| Error::syntax(Format::Xml, e))?;
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document =
        Document::parse_with_options(text, options).map_err(|e| Error::syntax(Format::Xml, e))?;

    tracing::debug!(format = "xml", bytes = input.len(), "deserialized document");
    Ok(Value::Table(decode_element(document.root_element())))
}

fn decode_element(node: Node<'_, '_>) -> Table {
    let record = Table::with_capacity(4);
    record.set("tag", qualified_name(node, node.tag_name()));

    let attr = Table::new();
    for (name, uri) in declared_namespaces(node) {
        attr.set(name, uri);
    }
    for a in node.attributes() {
        let name = match a.namespace() {
            Some(ns) => qualified_name(node, ExpandedName::from((ns, a.name()))),
            None => a.name().to_string(),
        };
        attr.set(name, a.value());
    }
    record.set("attr", attr);

    let text: String = node
        .children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect();
    if !text.trim().is_empty() {
        record.set("text", text);
    }

    let children: Table = node
        .children()
        .filter(|child| child.is_element())
        .map(|child| Value::Table(decode_element(child)))
        .collect();
    record.set("children", children);

    record
}

/// Namespace bindings introduced by `node` itself, as `xmlns` / `xmlns:p`
/// attributes. Bindings inherited unchanged from the parent are skipped.
fn declared_namespaces(node: Node<'_, '_>) -> Vec<(String, String)> {
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|parent| parent.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    node.namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| {
            let name = match ns.name() {
                Some(prefix) => format!("xmlns:{}", prefix),
                None => "xmlns".to_string(),
            };
            (name, ns.uri().to_string())
        })
        .collect()
}

/// Renders `name` as `prefix:local` when its namespace is bound to a prefix.
fn qualified_name(node: Node<'_, '_>, name: ExpandedName<'_, '_>) -> String {
    let prefix = name
        .namespace()
        .and_then(|ns| node.lookup_prefix(ns))
        .filter(|prefix| !prefix.is_empty());
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, name.name()),
        None => name.name().to_string(),
    }
}

fn emit_element(
    record: &Table,
    guard: &mut CycleGuard,
    out: &mut String,
    depth: usize,
) -> Result<()> {
    let mut scope = guard.enter(record)?;

    let tag = record
        .get("tag")
        .coerce_string()
        .filter(|tag| !tag.is_empty())
        .ok_or(Error::TagMissing)?;

    let attr = match record.get("attr") {
        Value::Nil => None,
        Value::Table(t) => Some(t),
        other => {
            return Err(Error::FieldType {
                field: "attr",
                expected: "a table",
                found: other.type_name(),
            })
        }
    };

    let text = match record.get("text") {
        Value::Nil => None,
        other => Some(other.coerce_string().ok_or(Error::FieldType {
            field: "text",
            expected: "a string",
            found: other.type_name(),
        })?),
    };

    let children = match record.get("children") {
        Value::Nil => Vec::new(),
        Value::Table(t) => (1..=t.len()).map(|i| t.get(i)).collect(),
        other => {
            return Err(Error::ChildrenType {
                found: other.type_name(),
            })
        }
    };

    emit_indent(out, depth);
    out.push('<');
    out.push_str(&tag);
    if let Some(attr) = attr {
        emit_attributes(&attr, out)?;
    }

    let has_text = text.as_deref().is_some_and(|t| !t.is_empty());
    if children.is_empty() && !has_text {
        out.push_str("/>\n");
        return Ok(());
    }

    out.push('>');
    if let Some(text) = &text {
        escape_into(out, text);
    }
    if !children.is_empty() {
        out.push('\n');
        for child in &children {
            match child {
                Value::Table(child) => emit_element(child, &mut scope, out, depth + 1)?,
                other => {
                    return Err(Error::ChildrenType {
                        found: other.type_name(),
                    })
                }
            }
        }
        emit_indent(out, depth);
    }
    out.push_str("</");
    out.push_str(&tag);
    out.push_str(">\n");
    Ok(())
}

fn emit_attributes(attr: &Table, out: &mut String) -> Result<()> {
    for (key, value) in attr.entries() {
        let name = match &key {
            Key::String(s) => s.clone(),
            Key::Integer(_) | Key::Float(_) => key.to_string(),
            Key::Bool(_) => {
                return Err(Error::AttrKeyType {
                    found: key.type_name(),
                })
            }
        };
        let value = value.coerce_string().ok_or(Error::AttrValueType {
            found: value.type_name(),
        })?;

        out.push(' ');
        out.push_str(&name);
        out.push_str("=\"");
        escape_into(out, &value);
        out.push('"');
    }
    Ok(())
}

fn emit_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

/// Escapes the five XML special characters; everything else passes through.
fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table;

    fn encode(record: &Table) -> String {
        String::from_utf8(serialize(record).unwrap()).unwrap()
    }

    fn decode(text: &str) -> Table {
        match deserialize(text.as_bytes()).unwrap() {
            Value::Table(t) => t,
            other => panic!("Expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_self_closing_and_text() {
        assert_eq!(encode(&table! {"tag" => "a"}), "<a/>\n");
        assert_eq!(encode(&table! {"tag" => "a", "text" => "x"}), "<a>x</a>\n");
        assert_eq!(encode(&table! {"tag" => "a", "text" => ""}), "<a/>\n");
    }

    #[test]
    fn test_nested_layout() {
        let record = table! {
            "tag" => "root",
            "children" => table![
                table! {"tag" => "item", "text" => "one"},
                table! {"tag" => "group", "children" => table![table! {"tag" => "leaf"}]},
            ],
        };
        assert_eq!(
            encode(&record),
            "<root>\n\t<item>one</item>\n\t<group>\n\t\t<leaf/>\n\t</group>\n</root>\n"
        );
    }

    #[test]
    fn test_text_and_children_together() {
        let record = table! {
            "tag" => "p",
            "text" => "hi",
            "children" => table![table! {"tag" => "br"}],
        };
        assert_eq!(encode(&record), "<p>hi\n\t<br/>\n</p>\n");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(
            encode(&table! {"tag" => "t", "text" => "a & b < c"}),
            "<t>a &amp; b &lt; c</t>\n"
        );
        assert_eq!(
            encode(&table! {"tag" => "t", "attr" => table! {"q" => "\"it's\" > x"}}),
            "<t q=\"&quot;it&apos;s&quot; &gt; x\"/>\n"
        );
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        assert_eq!(encode(&table! {"tag" => "a", "extra" => 5}), "<a/>\n");
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(
            encode(&table! {"tag" => "n", "attr" => table! {"v" => 2}, "text" => 1.5}),
            "<n v=\"2\">1.5</n>\n"
        );
        assert_eq!(
            encode(&table! {"tag" => "n", "attr" => table! {"big" => 1e20}, "text" => 1e-7}),
            "<n big=\"1e+20\">1e-07</n>\n"
        );
    }

    #[test]
    fn test_record_errors() {
        assert_eq!(serialize(&table! {"text" => "x"}), Err(Error::TagMissing));
        assert_eq!(serialize(&table! {"tag" => ""}), Err(Error::TagMissing));
        assert_eq!(serialize(&table! {"tag" => true}), Err(Error::TagMissing));
        assert_eq!(
            serialize(&table! {"tag" => "a", "attr" => table! {true => "x"}}),
            Err(Error::AttrKeyType { found: "boolean" })
        );
        assert_eq!(
            serialize(&table! {"tag" => "a", "attr" => table! {"k" => table![]}}),
            Err(Error::AttrValueType { found: "table" })
        );
        assert_eq!(
            serialize(&table! {"tag" => "a", "children" => table!["b"]}),
            Err(Error::ChildrenType { found: "string" })
        );
        assert_eq!(
            serialize(&table! {"tag" => "a", "children" => "b"}),
            Err(Error::ChildrenType { found: "string" })
        );
        assert_eq!(
            serialize(&table! {"tag" => "a", "attr" => "id"}),
            Err(Error::FieldType {
                field: "attr",
                expected: "a table",
                found: "string"
            })
        );
        assert_eq!(
            serialize(&table! {"tag" => "a", "text" => false}),
            Err(Error::FieldType {
                field: "text",
                expected: "a string",
                found: "boolean"
            })
        );
    }

    #[test]
    fn test_cycle_and_shared_child() {
        let leaf = table! {"tag" => "leaf"};
        let root = table! {"tag" => "r", "children" => table![leaf.clone(), leaf.clone()]};
        assert_eq!(encode(&root), "<r>\n\t<leaf/>\n\t<leaf/>\n</r>\n");

        leaf.set("children", table![root.clone()]);
        assert_eq!(serialize(&root), Err(Error::CyclicStructure));
        leaf.remove("children");
    }

    #[test]
    fn test_decode_record_shape() {
        let t = decode("<a id=\"1\" z=\"2\" b=\"3\">hello<b/><!-- note --><c>x</c></a>");
        assert_eq!(t.get("tag"), Value::from("a"));
        assert_eq!(t.get("text"), Value::from("hello"));

        let attr: Table = t.get("attr").try_into().unwrap();
        let names: Vec<Key> = attr.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec![Key::from("id"), Key::from("z"), Key::from("b")]);

        let children: Table = t.get("children").try_into().unwrap();
        assert_eq!(children.len(), 2);
        let c: Table = children.get(2).try_into().unwrap();
        assert_eq!(c.get("text"), Value::from("x"));
    }

    #[test]
    fn test_decode_direct_text_only() {
        let t = decode("<a>outer<b>inner</b>tail</a>");
        assert_eq!(t.get("text"), Value::from("outertail"));
    }

    #[test]
    fn test_decode_empty_element_has_no_text() {
        let t = decode("<a/>");
        assert!(!t.contains_key("text"));
        assert_eq!(t.get("attr"), Value::Table(Table::new()));
        assert_eq!(t.get("children"), Value::Table(Table::new()));
    }

    #[test]
    fn test_decode_unescapes() {
        let t = decode("<a v=\"&quot;x&quot;\">1 &lt; 2</a>");
        assert_eq!(t.get("text"), Value::from("1 < 2"));
        let attr: Table = t.get("attr").try_into().unwrap();
        assert_eq!(attr.get("v"), Value::from("\"x\""));
    }

    #[test]
    fn test_decode_prefixed_names() {
        let t = decode("<x:a xmlns:x=\"urn:x\" x:id=\"7\"/>");
        assert_eq!(t.get("tag"), Value::from("x:a"));
        let attr: Table = t.get("attr").try_into().unwrap();
        assert_eq!(attr.get("x:id"), Value::from("7"));
    }

    #[test]
    fn test_namespace_declarations_survive_re_encoding() {
        let source = "<x:a xmlns:x=\"urn:x\" x:id=\"7\"><x:b/></x:a>";
        let first = decode(source);
        let attr: Table = first.get("attr").try_into().unwrap();
        assert_eq!(attr.get("xmlns:x"), Value::from("urn:x"));
        assert_eq!(attr.get("x:id"), Value::from("7"));

        let encoded = encode(&first);
        assert_eq!(
            encoded,
            "<x:a xmlns:x=\"urn:x\" x:id=\"7\">\n\t<x:b/>\n</x:a>\n"
        );
        assert_eq!(decode(&encoded), first);
    }

    #[test]
    fn test_inherited_namespaces_are_declared_once() {
        let t = decode("<a xmlns=\"urn:d\"><b/><c xmlns=\"urn:other\"/></a>");
        let attr: Table = t.get("attr").try_into().unwrap();
        assert_eq!(attr.get("xmlns"), Value::from("urn:d"));

        let children: Table = t.get("children").try_into().unwrap();
        let b: Table = children.get(1).try_into().unwrap();
        assert_eq!(b.get("attr"), Value::Table(Table::new()));
        let c: Table = children.get(2).try_into().unwrap();
        let c_attr: Table = c.get("attr").try_into().unwrap();
        assert_eq!(c_attr.get("xmlns"), Value::from("urn:other"));
    }

    #[test]
    fn test_round_trip_of_encoder_output() {
        let record = table! {
            "tag" => "config",
            "attr" => table! {"version" => "2"},
            "children" => table![
                table! {"tag" => "name", "attr" => table! {}, "text" => "a & b", "children" => table![]},
            ],
        };
        let back = decode(&encode(&record));
        let expected = table! {
            "tag" => "config",
            "attr" => table! {"version" => "2"},
            "children" => table![
                table! {"tag" => "name", "attr" => table! {}, "text" => "a & b", "children" => table![]},
            ],
        };
        assert_eq!(back, expected);
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(deserialize(b""), Err(Error::EmptyInput));
        assert!(matches!(
            deserialize(b"<a><b></a>"),
            Err(Error::Syntax { format: Format::Xml, .. })
        ));
        assert!(matches!(
            deserialize(b"just text"),
            Err(Error::Syntax { .. })
        ));
        assert!(matches!(
            deserialize(b"<!-- only a comment -->"),
            Err(Error::Syntax { .. })
        ));
    }

    #[test]
    fn test_doctype_is_accepted() {
        let t = decode("<!DOCTYPE note>\n<note>x</note>");
        assert_eq!(t.get("tag"), Value::from("note"));
    }
}
