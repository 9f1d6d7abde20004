//! Error types for table marshaling.
//!
//! Every converter reports failures through the single [`Error`] enum. Each
//! variant belongs to one of three broad categories, exposed through
//! [`Error::kind`]:
//!
//! - **Input**: the buffer handed to a decoder was empty (or a format name
//!   was not recognized)
//! - **Syntax**: the source text was malformed; the reason carries the
//!   underlying parser's diagnostic
//! - **Structural**: the table cannot be represented in the target format
//!   (cycles, non-string keys, missing fields, unsupported value types)
//!
//! All errors abort the current call immediately; no partial output is ever
//! returned.
//!
//! ## Examples
//!
//! ```rust
//! use table_codec::{json, ErrorKind};
//!
//! let err = json::deserialize(b"").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Input);
//!
//! let err = json::deserialize(b"{\"a\": [1, 2").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Syntax);
//! ```

use crate::Format;
use thiserror::Error;

/// Represents every failure a `serialize` or `deserialize` call can produce.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Zero-length input handed to a decoder
    #[error("cannot deserialize empty input")]
    EmptyInput,

    /// Malformed source text
    #[error("{format} parse error: {reason}")]
    Syntax { format: Format, reason: String },

    #[error("cannot serialize cyclic table")]
    CyclicStructure,

    /// JSON object key that has no string form
    #[error("json object keys must be strings, found {found}")]
    KeyType { found: &'static str },

    /// YAML or TOML mapping key that has no string form
    #[error("{format} mapping keys must be strings, found {found}")]
    NonStringKey { format: Format, found: &'static str },

    #[error("yaml mapping keys must be scalars (string/number/bool)")]
    NonScalarKey,

    #[error("unsupported type for {format} serialization: {found}")]
    UnsupportedValueType { format: Format, found: &'static str },

    #[error("binary json values are not supported")]
    BinaryUnsupported,

    #[error("xml element missing non-empty tag")]
    TagMissing,

    #[error("xml attr keys must be strings, found {found}")]
    AttrKeyType { found: &'static str },

    #[error("xml attr values must be strings, found {found}")]
    AttrValueType { found: &'static str },

    #[error("xml children must be tables, found {found}")]
    ChildrenType { found: &'static str },

    /// An element record field holding a value of the wrong kind
    #[error("xml {field} must be {expected}, found {found}")]
    FieldType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Extracting a typed value from a [`Value`](crate::Value) of another kind
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("table nesting exceeds the configured limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// The external emitter refused the native tree
    #[error("{format} emit failed: {reason}")]
    Emit { format: Format, reason: String },

    #[error("unknown format: {0}")]
    UnknownFormat(String),
}

/// Broad failure category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Input,
    Syntax,
    Structural,
}

impl Error {
    /// Creates a syntax error carrying the parser's diagnostic.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use table_codec::{Error, Format};
    ///
    /// let err = Error::syntax(Format::Json, "expected value at line 1 column 1");
    /// assert!(err.to_string().starts_with("json parse error"));
    /// ```
    pub fn syntax<T: ToString>(format: Format, reason: T) -> Self {
        Error::Syntax {
            format,
            reason: reason.to_string(),
        }
    }

    /// Creates an emitter failure for the given format.
    pub fn emit<T: ToString>(format: Format, reason: T) -> Self {
        Error::Emit {
            format,
            reason: reason.to_string(),
        }
    }

    pub fn unsupported_value(format: Format, found: &'static str) -> Self {
        Error::UnsupportedValueType { format, found }
    }

    pub fn non_string_key(format: Format, found: &'static str) -> Self {
        Error::NonStringKey { format, found }
    }

    /// Returns the category this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyInput | Error::UnknownFormat(_) => ErrorKind::Input,
            Error::Syntax { .. } => ErrorKind::Syntax,
            _ => ErrorKind::Structural,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
