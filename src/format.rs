//! Format selection and dispatch.
//!
//! [`Format`] names one of the four converters and forwards `serialize` /
//! `deserialize` calls to it, so callers can pick a format at runtime (for
//! example from a file extension or a command-line flag).
//!
//! ```rust
//! use table_codec::{table, Format};
//!
//! let format: Format = "yml".parse().unwrap();
//! assert_eq!(format, Format::Yaml);
//!
//! let bytes = Format::Json.serialize(&table!["a"]).unwrap();
//! assert_eq!(bytes, br#"["a"]"#);
//! ```

use crate::{Error, Options, Result, Table, Value};
use std::fmt;
use std::str::FromStr;

/// One of the supported interchange formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Yaml,
    Toml,
    Xml,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Json, Format::Yaml, Format::Toml, Format::Xml];

    /// Lower-case name, as used in error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Toml => "toml",
            Format::Xml => "xml",
        }
    }

    /// Conventional file extension, without the dot.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Toml => "toml",
            Format::Xml => "xml",
        }
    }

    /// Serializes `table` with default options.
    ///
    /// # Errors
    ///
    /// Fails with the converter's structural errors; see the format modules.
    pub fn serialize(&self, table: &Table) -> Result<Vec<u8>> {
        self.serialize_with_options(table, &Options::default())
    }

    pub fn serialize_with_options(&self, table: &Table, options: &Options) -> Result<Vec<u8>> {
        match self {
            Format::Json => crate::json::serialize_with_options(table, options),
            Format::Yaml => crate::yaml::serialize_with_options(table, options),
            Format::Toml => crate::toml::serialize_with_options(table, options),
            Format::Xml => crate::xml::serialize_with_options(table, options),
        }
    }

    /// Decodes `input` into a fresh value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] for a zero-length buffer and
    /// [`Error::Syntax`] for malformed text.
    pub fn deserialize(&self, input: &[u8]) -> Result<Value> {
        match self {
            Format::Json => crate::json::deserialize(input),
            Format::Yaml => crate::yaml::deserialize(input),
            Format::Toml => crate::toml::deserialize(input),
            Format::Xml => crate::xml::deserialize(input),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "toml" => Ok(Format::Toml),
            "xml" => Ok(Format::Xml),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}
