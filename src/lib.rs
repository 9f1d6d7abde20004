//! # table_codec
//!
//! Marshaling between a dynamic, Lua-style table value and four interchange
//! formats: JSON, YAML, TOML and XML.
//!
//! ## The value model
//!
//! A [`Value`] is nil, a boolean, a [`Number`] (integer or float), a string,
//! a [`Table`] or an [`Opaque`] host object. A table is a single associative
//! container whose keys may be integers, floats, strings or booleans; it
//! plays the part of both array and object. Tables are shared by reference,
//! so one table can appear in several places, or even inside itself.
//!
//! Whether a table is written out as an array or as an object is decided per
//! table by [`classify`](classify::classify): a table whose keys are exactly
//! the integers `1..=n` is a sequence, everything else is a mapping, and the
//! empty table is an empty sequence.
//!
//! ## Quick Start
//!
//! ```rust
//! use table_codec::{json, table, Value};
//!
//! let config = table! {
//!     "name" => "server",
//!     "ports" => table![8080, 8081],
//!     "debug" => false,
//! };
//!
//! let bytes = json::serialize(&config).unwrap();
//! assert_eq!(bytes, br#"{"name":"server","ports":[8080,8081],"debug":false}"#);
//!
//! let back = json::deserialize(&bytes).unwrap();
//! assert_eq!(back, Value::Table(config));
//! ```
//!
//! ### Choosing a format at runtime
//!
//! ```rust
//! use table_codec::{table, Format};
//!
//! let data = table! {"id" => 7};
//! for format in Format::ALL {
//!     let record = table! {"tag" => "item", "attr" => data.clone()};
//!     let input = if format == Format::Xml { &record } else { &data };
//!     let bytes = format.serialize(input).unwrap();
//!     assert!(format.deserialize(&bytes).is_ok());
//! }
//! ```
//!
//! ## Per-format behavior
//!
//! | Format | Numbers out | Nil mapping value | Root |
//! |--------|-------------|-------------------|------|
//! | [`json`] | integer stays integer | `null` | any table |
//! | [`yaml`] | always a float | key omitted | any table |
//! | [`toml`] | always a float | key omitted | always a document table |
//! | [`xml`] | text | n/a | an element record |
//!
//! ## Errors
//!
//! Every operation returns [`Result`]. Errors fall into three groups, see
//! [`ErrorKind`]: bad input (empty buffer, unknown format name), syntax
//! errors reported by the underlying parser, and structural errors in the
//! value being encoded (cycles, unsupported keys or values, malformed XML
//! records).
//!
//! ## Logging
//!
//! Successful conversions emit a `tracing` debug event carrying the format
//! and byte count; rejected cycles emit a trace event. Nothing is printed
//! unless the application installs a subscriber.
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Self-referencing tables are detected instead of recursing forever
//! - Decoding always produces fresh tables that share nothing with each other
//!
//! See `demos/convert.rs` for a small command-line converter; run it with
//! `cargo run --example convert -- <from> <to> < input`.

pub mod classify;
pub mod error;
pub mod format;
pub mod guard;
pub mod json;
pub mod macros;
pub mod options;
pub mod table;
pub mod toml;
pub mod value;
pub mod xml;
pub mod yaml;

pub use error::{Error, ErrorKind, Result};
pub use format::Format;
pub use options::Options;
pub use table::{Key, Table, TableId};
pub use value::{Number, Opaque, Value};
