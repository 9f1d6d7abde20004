//! The host table: a reference-counted, insertion-ordered associative array.
//!
//! [`Table`] is the single composite type of the host runtime. The same table
//! can be read as a sequence (keys `1..N`) or as a map, so the classification
//! is derived at encode time by [`classify`](crate::classify::classify) rather
//! than stored here.
//!
//! Tables are handles: cloning one clones the reference, and two handles to
//! the same allocation share a [`TableId`]. That identity is used only for
//! cycle detection; equality between tables is structural.
//!
//! Entries live in an [`IndexMap`] so iteration follows insertion order,
//! which keeps encoder output deterministic.
//!
//! ## Examples
//!
//! ```rust
//! use table_codec::{Key, Table, Value};
//!
//! let list = Table::new();
//! list.push("a");
//! list.push("b");
//! assert_eq!(list.len(), 2);
//! assert_eq!(list.get(2), Value::from("b"));
//!
//! let map = Table::new();
//! map.set("name", "Alice");
//! map.set(Key::from(2.0), "two"); // integral float keys normalize to integers
//! assert!(map.contains_key(2));
//! ```

use crate::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// A table key.
///
/// Float keys holding an integral value are normalized to [`Key::Integer`]
/// by the `From<f64>` conversion, so `t[2.0]` and `t[2]` address the same slot.
#[derive(Clone, Debug)]
pub enum Key {
    Integer(i64),
    Float(f64),
    String(String),
    Bool(bool),
}

impl Key {
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Key::Integer(_) | Key::Float(_) => "number",
            Key::String(_) => "string",
            Key::Bool(_) => "boolean",
        }
    }

    #[inline]
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Key::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Integer(a), Key::Integer(b)) => a == b,
            (Key::Float(a), Key::Float(b)) => a.to_bits() == b.to_bits(),
            (Key::String(a), Key::String(b)) => a == b,
            (Key::Bool(a), Key::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Key::Integer(i) => i.hash(state),
            Key::Float(f) => f.to_bits().hash(state),
            Key::String(s) => s.hash(state),
            Key::Bool(b) => b.hash(state),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Integer(i) => write!(f, "{}", i),
            Key::Float(fl) => f.write_str(&crate::value::format_float(*fl)),
            Key::String(s) => write!(f, "{}", s),
            Key::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Integer(value as i64)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Integer(value)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Integer(value as i64)
    }
}

impl From<f64> for Key {
    fn from(value: f64) -> Self {
        if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
            Key::Integer(value as i64)
        } else {
            Key::Float(value)
        }
    }
}

impl From<bool> for Key {
    fn from(value: bool) -> Self {
        Key::Bool(value)
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::String(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::String(value.to_string())
    }
}

/// The reference identity of a [`Table`] allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TableId(usize);

/// A handle to a host table.
///
/// A key may be present with an explicit [`Value::Nil`]; decoders produce
/// this for `null` members so that mappings keep their keys. For sequence
/// purposes such an entry counts as a hole.
#[derive(Clone, Default)]
pub struct Table(Rc<RefCell<IndexMap<Key, Value>>>);

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Table::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Table(Rc::new(RefCell::new(IndexMap::with_capacity(capacity))))
    }

    /// Sets `key` to `value`, returning the previous value if the key was present.
    ///
    /// An existing key keeps its position in iteration order.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        self.0.borrow_mut().insert(key.into(), value.into())
    }

    /// Returns the value stored under `key`, or [`Value::Nil`] when absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use table_codec::{Table, Value};
    ///
    /// let t = Table::new();
    /// t.set("a", 1);
    /// assert_eq!(t.get("a"), Value::from(1));
    /// assert_eq!(t.get("missing"), Value::Nil);
    /// ```
    #[must_use]
    pub fn get(&self, key: impl Into<Key>) -> Value {
        self.0
            .borrow()
            .get(&key.into())
            .cloned()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.0.borrow().contains_key(&key.into())
    }

    /// Removes `key`, preserving the order of the remaining entries.
    pub fn remove(&self, key: impl Into<Key>) -> Option<Value> {
        self.0.borrow_mut().shift_remove(&key.into())
    }

    /// Appends `value` at index `len() + 1`.
    pub fn push(&self, value: impl Into<Value>) {
        let next = self.len() + 1;
        self.set(next, value);
    }

    /// Returns the border of the table: the largest `N` such that keys `1..N`
    /// are all present with non-nil values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use table_codec::{table, Value};
    ///
    /// assert_eq!(table!["a", "b", "c"].len(), 3);
    /// assert_eq!(table!{1 => "a", 3 => "c"}.len(), 1);
    /// assert_eq!(table!{1 => "a", 2 => Value::Nil}.len(), 1);
    /// ```
    #[must_use]
    pub fn len(&self) -> usize {
        let entries = self.0.borrow();
        let mut n = 0usize;
        while let Some(v) = entries.get(&Key::Integer(n as i64 + 1)) {
            if v.is_nil() {
                break;
            }
            n += 1;
        }
        n
    }

    /// Returns the number of keys present, including keys holding `Nil`.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns `true` if the table has no keys at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Returns an ordered snapshot of the entries.
    ///
    /// Values are handles, so the snapshot is shallow: nested tables are
    /// shared with the original.
    #[must_use]
    pub fn entries(&self) -> Vec<(Key, Value)> {
        self.0
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    #[must_use]
    pub fn id(&self) -> TableId {
        TableId(Rc::as_ptr(&self.0) as *const () as usize)
    }

    /// Returns `true` if both handles refer to the same table.
    #[must_use]
    pub fn ptr_eq(&self, other: &Table) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Structural equality: the same key set with equal values, in any order.
///
/// Comparing tables that contain cycles does not terminate unless the
/// cyclic references are identical handles on both sides.
impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let (a, b) = (self.0.borrow(), other.0.borrow());
        a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.borrow().iter()).finish()
    }
}

impl FromIterator<Value> for Table {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        let entries = iter
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Key::Integer(i as i64 + 1), v))
            .collect();
        Table(Rc::new(RefCell::new(entries)))
    }
}

impl FromIterator<(Key, Value)> for Table {
    fn from_iter<T: IntoIterator<Item = (Key, Value)>>(iter: T) -> Self {
        Table(Rc::new(RefCell::new(IndexMap::from_iter(iter))))
    }
}

impl FromIterator<(String, Value)> for Table {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        iter.into_iter().map(|(k, v)| (Key::String(k), v)).collect()
    }
}
