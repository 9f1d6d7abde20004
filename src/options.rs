//! Configuration options for serialization.
//!
//! ```rust
//! use table_codec::{json, table, Options};
//!
//! let data = table! {"id" => 1};
//!
//! let compact = json::serialize(&data).unwrap();
//! assert_eq!(compact, br#"{"id":1}"#);
//!
//! let pretty = json::serialize_with_options(&data, &Options::pretty()).unwrap();
//! assert_eq!(pretty, b"{\n  \"id\": 1\n}");
//! ```

/// Configuration options for the `serialize_with_options` entry points.
///
/// - `pretty`: multi-line output for JSON and TOML. YAML and XML layouts are
///   fixed and ignore it.
/// - `max_depth`: the deepest table nesting an encoder will walk before
///   failing with [`Error::DepthLimitExceeded`](crate::Error::DepthLimitExceeded).
///   `None` (the default) leaves it unbounded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub pretty: bool,
    pub max_depth: Option<usize>,
}

impl Options {
    /// Creates default options (compact output, unbounded depth).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use table_codec::Options;
    ///
    /// let options = Options::new();
    /// assert!(!options.pretty);
    /// assert_eq!(options.max_depth, None);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pretty() -> Self {
        Options {
            pretty: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Caps table nesting depth during encoding.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use table_codec::{json, table, Error, Options};
    ///
    /// let nested = table![table![table![1]]];
    /// let options = Options::new().with_max_depth(2);
    /// assert_eq!(
    ///     json::serialize_with_options(&nested, &options),
    ///     Err(Error::DepthLimitExceeded { limit: 2 })
    /// );
    /// ```
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}
