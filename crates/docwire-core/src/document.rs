//! # Ordered Documents
//!
//! `Document` is an insertion-ordered map from field name to [`Value`].
//! Field order is semantically significant: the generic encoder emits
//! fields in exactly this order.
//!
//! ## Ordering Rules
//!
//! - Inserting a new key appends it.
//! - Replacing an existing key keeps its original position.
//! - Removing a key preserves the relative order of the remaining keys.

use indexmap::IndexMap;

use crate::value::Value;

/// The reserved name of the identifier field of a collection-bound document.
///
/// Wire-visible: other systems locate the identifier in encoded output by
/// this name.
pub const ID_FIELD_NAME: &str = "_id";

/// An ordered, string-keyed mapping of values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document(IndexMap<String, Value>);

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Create an empty document with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity(capacity))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.0.get_mut(name)
    }

    /// Insert a field, returning the previous value if the name was present.
    ///
    /// A replaced field keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Mutable access to `name`, appending `default()` first if it is absent.
    pub fn get_or_insert_with(&mut self, name: &str, default: impl FnOnce() -> Value) -> &mut Value {
        self.0.entry(name.to_owned()).or_insert_with(default)
    }

    /// Remove a field, preserving the order of the remaining fields.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.shift_remove(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Position of `name` in field order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.get_index_of(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.0.iter_mut().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Build a [`Document`] from `name => value` pairs, in order.
///
/// ```
/// use docwire_core::doc;
///
/// let d = doc! { "name" => "Ada", "born" => 1815 };
/// assert_eq!(d.keys().collect::<Vec<_>>(), ["name", "born"]);
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::Document::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut document = $crate::Document::new();
        $(
            document.insert($name, $value);
        )+
        document
    }};
}
