//! # Value Model
//!
//! The polymorphic value carried by document fields, and the `ValueType`
//! tag the encoder registry dispatches on.
//!
//! ## Wire Tags
//!
//! Every `ValueType` carries the element type byte it is written with.
//! `Uuid` shares the binary tag `0x05` and is distinguished by its binary
//! subtype (`0x04`).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::document::Document;
use crate::object_id::ObjectId;

/// Type tag of a [`Value`]. Used as the key of the encoder registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    Null,
    Bool,
    Int32,
    Int64,
    Double,
    String,
    ObjectId,
    DateTime,
    Binary,
    Uuid,
    Array,
    Document,
}

impl ValueType {
    /// Every value type, in declaration order.
    pub const ALL: [ValueType; 12] = [
        ValueType::Null,
        ValueType::Bool,
        ValueType::Int32,
        ValueType::Int64,
        ValueType::Double,
        ValueType::String,
        ValueType::ObjectId,
        ValueType::DateTime,
        ValueType::Binary,
        ValueType::Uuid,
        ValueType::Array,
        ValueType::Document,
    ];

    /// Returns the type name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Double => "double",
            Self::String => "string",
            Self::ObjectId => "objectId",
            Self::DateTime => "dateTime",
            Self::Binary => "binary",
            Self::Uuid => "uuid",
            Self::Array => "array",
            Self::Document => "document",
        }
    }

    /// The element type byte written before the element name.
    pub fn element_type(&self) -> u8 {
        match self {
            Self::Double => 0x01,
            Self::String => 0x02,
            Self::Document => 0x03,
            Self::Array => 0x04,
            Self::Binary | Self::Uuid => 0x05,
            Self::ObjectId => 0x07,
            Self::Bool => 0x08,
            Self::DateTime => 0x09,
            Self::Null => 0x0A,
            Self::Int32 => 0x10,
            Self::Int64 => 0x12,
        }
    }

    /// True for documents and arrays.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Array | Self::Document)
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),
    ObjectId(ObjectId),
    /// UTC instant with millisecond precision.
    DateTime(DateTime<Utc>),
    /// Generic binary data (subtype `0x00`).
    Binary(Vec<u8>),
    Uuid(Uuid),
    Array(Vec<Value>),
    Document(Document),
}

impl Value {
    /// The type tag of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Null => ValueType::Null,
            Self::Bool(_) => ValueType::Bool,
            Self::Int32(_) => ValueType::Int32,
            Self::Int64(_) => ValueType::Int64,
            Self::Double(_) => ValueType::Double,
            Self::String(_) => ValueType::String,
            Self::ObjectId(_) => ValueType::ObjectId,
            Self::DateTime(_) => ValueType::DateTime,
            Self::Binary(_) => ValueType::Binary,
            Self::Uuid(_) => ValueType::Uuid,
            Self::Array(_) => ValueType::Array,
            Self::Document(_) => ValueType::Document,
        }
    }

    /// Build a `DateTime` value, truncating sub-millisecond precision.
    pub fn date_time(dt: DateTime<Utc>) -> Self {
        Self::DateTime(truncate_to_millis(dt))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_document_mut(&mut self) -> Option<&mut Document> {
        match self {
            Self::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_object_id(&self) -> Option<&ObjectId> {
        match self {
            Self::ObjectId(id) => Some(id),
            _ => None,
        }
    }
}

fn truncate_to_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or(dt)
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<ObjectId> for Value {
    fn from(v: ObjectId) -> Self {
        Self::ObjectId(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::date_time(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<Document> for Value {
    fn from(v: Document) -> Self {
        Self::Document(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_value_type_tags() {
        assert_eq!(Value::from(1i32).value_type(), ValueType::Int32);
        assert_eq!(Value::from(1i64).value_type(), ValueType::Int64);
        assert_eq!(Value::from("x").value_type(), ValueType::String);
        assert_eq!(Value::from(Document::new()).value_type(), ValueType::Document);
        assert_eq!(Value::from(Vec::<Value>::new()).value_type(), ValueType::Array);
        assert_eq!(Value::from(None::<i32>).value_type(), ValueType::Null);
    }

    #[test]
    fn test_element_type_bytes() {
        assert_eq!(ValueType::Double.element_type(), 0x01);
        assert_eq!(ValueType::Document.element_type(), 0x03);
        assert_eq!(ValueType::Uuid.element_type(), ValueType::Binary.element_type());
        assert_eq!(ValueType::Int64.element_type(), 0x12);
    }

    #[test]
    fn test_all_covers_every_variant() {
        let mut seen: Vec<_> = ValueType::ALL.to_vec();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 12);
        assert_eq!(ValueType::ALL.iter().filter(|t| t.is_container()).count(), 2);
    }

    #[test]
    fn test_date_time_truncated_to_millis() {
        let dt = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let Value::DateTime(stored) = Value::from(dt) else {
            panic!("expected DateTime");
        };
        assert_eq!(stored.timestamp_millis(), dt.timestamp_millis());
        assert_eq!(stored.timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn test_document_accessors() {
        let mut v = Value::from(Document::new());
        v.as_document_mut().unwrap().insert("k", true);
        assert_eq!(v.as_document().and_then(|d| d.get("k")), Some(&Value::Bool(true)));
        assert!(Value::Int32(1).as_document_mut().is_none());
        assert!(Value::Null.as_document().is_none());
    }

    #[test]
    fn test_value_type_display() {
        assert_eq!(ValueType::ObjectId.to_string(), "objectId");
        assert_eq!(ValueType::Document.to_string(), "document");
    }
}
