//! # Extended JSON Interop
//!
//! Conversion between `serde_json::Value` and the document model.
//! Field order survives the conversion in both directions (`serde_json`
//! is built with `preserve_order`).
//!
//! ## Type Mapping
//!
//! | JSON | Value |
//! |---|---|
//! | `null`, `true`/`false`, string | `Null`, `Bool`, `String` |
//! | integer in `i32` range | `Int32` |
//! | other integer in `i64` range | `Int64` |
//! | fractional number | `Double` |
//! | `{"$oid": "<24 hex>"}` | `ObjectId` |
//! | `{"$date": "<rfc3339>"}` or `{"$date": <millis>}` | `DateTime` |
//! | `{"$uuid": "<uuid>"}` | `Uuid` |
//! | `{"$binary": {"base64": "..", "subType": "00"}}` | `Binary` (`"04"` gives `Uuid`) |
//! | `{"$numberDouble": "NaN" \| "Infinity" \| "-Infinity"}` | non-finite `Double` |
//! | array, object | `Array`, `Document` |
//!
//! Output uses the same wrappers, so identifiers print unambiguously.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Number};
use uuid::Uuid;

use crate::document::Document;
use crate::error::JsonError;
use crate::object_id::ObjectId;
use crate::value::Value;

type Json = serde_json::Value;

impl Value {
    /// Convert a JSON value, recognising Extended JSON wrappers.
    pub fn from_json(json: Json) -> Result<Self, JsonError> {
        match json {
            Json::Null => Ok(Value::Null),
            Json::Bool(b) => Ok(Value::Bool(b)),
            Json::String(s) => Ok(Value::String(s)),
            Json::Number(n) => number_to_value(&n),
            Json::Array(items) => items
                .into_iter()
                .map(Value::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Json::Object(map) => match extended_to_value(&map)? {
                Some(value) => Ok(value),
                None => object_to_document(map).map(Value::Document),
            },
        }
    }

    /// Render as Extended JSON.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int32(n) => json!(n),
            Value::Int64(n) => json!(n),
            Value::Double(f) => match Number::from_f64(*f) {
                Some(n) => Json::Number(n),
                None => json!({ "$numberDouble": non_finite_name(*f) }),
            },
            Value::String(s) => Json::String(s.clone()),
            Value::ObjectId(id) => json!({ "$oid": id.to_hex() }),
            Value::DateTime(dt) => {
                json!({ "$date": dt.to_rfc3339_opts(SecondsFormat::Millis, true) })
            }
            Value::Binary(bytes) => {
                json!({ "$binary": { "base64": STANDARD.encode(bytes), "subType": "00" } })
            }
            Value::Uuid(id) => json!({ "$uuid": id.hyphenated().to_string() }),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Document(d) => d.to_json(),
        }
    }
}

impl Document {
    /// Convert a JSON object into a document.
    ///
    /// # Errors
    ///
    /// `JsonError::NotAnObject` if `json` is not an object, or if the object
    /// is itself an Extended JSON scalar wrapper.
    pub fn from_json(json: Json) -> Result<Self, JsonError> {
        match Value::from_json(json)? {
            Value::Document(d) => Ok(d),
            other => Err(JsonError::NotAnObject(other.value_type().as_str())),
        }
    }

    /// Parse a single JSON object from text.
    pub fn from_json_str(text: &str) -> Result<Self, JsonError> {
        Self::from_json(serde_json::from_str(text)?)
    }

    /// Render as an Extended JSON object, in field order.
    pub fn to_json(&self) -> Json {
        Json::Object(
            self.iter()
                .map(|(k, v)| (k.to_owned(), v.to_json()))
                .collect(),
        )
    }
}

/// Parse a stream of documents: either one JSON array of objects or any
/// number of whitespace/newline separated objects.
pub fn documents_from_json_stream(text: &str) -> Result<Vec<Document>, JsonError> {
    let mut documents = Vec::new();
    for item in serde_json::Deserializer::from_str(text).into_iter::<Json>() {
        match item? {
            Json::Array(items) => {
                for json in items {
                    documents.push(Document::from_json(json)?);
                }
            }
            json => documents.push(Document::from_json(json)?),
        }
    }
    Ok(documents)
}

fn number_to_value(n: &Number) -> Result<Value, JsonError> {
    if let Some(i) = n.as_i64() {
        return Ok(i32::try_from(i).map_or(Value::Int64(i), Value::Int32));
    }
    if let Some(u) = n.as_u64() {
        return Err(JsonError::IntegerOutOfRange(u));
    }
    Ok(Value::Double(n.as_f64().unwrap_or(f64::NAN)))
}

fn object_to_document(map: Map<String, Json>) -> Result<Document, JsonError> {
    let mut document = Document::with_capacity(map.len());
    for (k, v) in map {
        document.insert(k, Value::from_json(v)?);
    }
    Ok(document)
}

/// Returns `Some` when `map` is a single-key Extended JSON wrapper.
fn extended_to_value(map: &Map<String, Json>) -> Result<Option<Value>, JsonError> {
    if map.len() != 1 {
        return Ok(None);
    }
    let Some((key, inner)) = map.iter().next() else {
        return Ok(None);
    };
    let value = match key.as_str() {
        "$oid" => Value::ObjectId(ObjectId::parse_hex(expect_str("$oid", inner)?)?),
        "$date" => Value::date_time(parse_date(inner)?),
        "$uuid" => Value::Uuid(parse_uuid("$uuid", expect_str("$uuid", inner)?)?),
        "$binary" => parse_binary(inner)?,
        "$numberDouble" => Value::Double(parse_number_double(expect_str("$numberDouble", inner)?)?),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn expect_str<'a>(marker: &'static str, json: &'a Json) -> Result<&'a str, JsonError> {
    json.as_str().ok_or_else(|| JsonError::MalformedExtended {
        marker,
        reason: format!("expected a string, found {json}"),
    })
}

fn parse_date(json: &Json) -> Result<DateTime<Utc>, JsonError> {
    let malformed = |reason: String| JsonError::MalformedExtended {
        marker: "$date",
        reason,
    };
    match json {
        Json::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| malformed(format!("{s:?}: {e}"))),
        Json::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| malformed(format!("{n} is not a representable millisecond timestamp"))),
        other => Err(malformed(format!("expected a string or integer, found {other}"))),
    }
}

fn parse_uuid(marker: &'static str, s: &str) -> Result<Uuid, JsonError> {
    Uuid::parse_str(s).map_err(|e| JsonError::MalformedExtended {
        marker,
        reason: e.to_string(),
    })
}

fn parse_binary(json: &Json) -> Result<Value, JsonError> {
    let malformed = |reason: String| JsonError::MalformedExtended {
        marker: "$binary",
        reason,
    };
    let encoded = json
        .get("base64")
        .and_then(Json::as_str)
        .ok_or_else(|| malformed("missing base64 string".into()))?;
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| malformed(e.to_string()))?;
    match json.get("subType").and_then(Json::as_str).unwrap_or("00") {
        "00" | "0" => Ok(Value::Binary(bytes)),
        "04" | "4" => Uuid::from_slice(&bytes)
            .map(Value::Uuid)
            .map_err(|e| malformed(e.to_string())),
        other => Err(malformed(format!("unsupported subType {other:?}"))),
    }
}

fn parse_number_double(s: &str) -> Result<f64, JsonError> {
    match s {
        "NaN" => Ok(f64::NAN),
        "Infinity" => Ok(f64::INFINITY),
        "-Infinity" => Ok(f64::NEG_INFINITY),
        other => other.parse().map_err(|_| JsonError::MalformedExtended {
            marker: "$numberDouble",
            reason: format!("{other:?} is not a number"),
        }),
    }
}

fn non_finite_name(f: f64) -> &'static str {
    if f.is_nan() {
        "NaN"
    } else if f.is_sign_positive() {
        "Infinity"
    } else {
        "-Infinity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn test_field_order_preserved() {
        let d = Document::from_json_str(r#"{"z": 1, "_id": "x", "a": 2}"#).unwrap();
        assert_eq!(d.keys().collect::<Vec<_>>(), ["z", "_id", "a"]);
    }

    #[test]
    fn test_integer_widths() {
        let d = Document::from_json_str(r#"{"small": 42, "big": 9999999999}"#).unwrap();
        assert_eq!(d.get("small"), Some(&Value::Int32(42)));
        assert_eq!(d.get("big"), Some(&Value::Int64(9_999_999_999)));
    }

    #[test]
    fn test_unsigned_overflow_rejected() {
        let err = Document::from_json_str(r#"{"n": 18446744073709551615}"#).unwrap_err();
        assert!(matches!(err, JsonError::IntegerOutOfRange(_)));
    }

    #[test]
    fn test_extended_wrappers() {
        let d = Document::from_json_str(
            r#"{
                "_id": {"$oid": "65a1b2c3d4e5f60718293a4b"},
                "at": {"$date": "2024-01-12T10:00:00.250Z"},
                "ms": {"$date": 1000},
                "u": {"$uuid": "67e55044-10b1-426f-9247-bb680e5fe0c8"},
                "raw": {"$binary": {"base64": "AQID", "subType": "00"}},
                "inf": {"$numberDouble": "-Infinity"}
            }"#,
        )
        .unwrap();
        assert_eq!(
            d.get("_id").and_then(Value::as_object_id).map(ObjectId::to_hex),
            Some("65a1b2c3d4e5f60718293a4b".to_string())
        );
        assert!(matches!(d.get("at"), Some(Value::DateTime(dt)) if dt.timestamp_millis() == 1_705_053_600_250));
        assert!(matches!(d.get("ms"), Some(Value::DateTime(dt)) if dt.timestamp_millis() == 1000));
        assert!(matches!(d.get("u"), Some(Value::Uuid(_))));
        assert_eq!(d.get("raw"), Some(&Value::Binary(vec![1, 2, 3])));
        assert_eq!(d.get("inf"), Some(&Value::Double(f64::NEG_INFINITY)));
    }

    #[test]
    fn test_wrapper_with_extra_keys_is_a_document() {
        let d = Document::from_json_str(r#"{"v": {"$oid": "x", "other": 1}}"#).unwrap();
        assert!(matches!(d.get("v"), Some(Value::Document(_))));
    }

    #[test]
    fn test_malformed_oid() {
        let err = Document::from_json_str(r#"{"_id": {"$oid": "short"}}"#).unwrap_err();
        assert!(matches!(err, JsonError::MalformedExtended { marker: "$oid", .. }));
    }

    #[test]
    fn test_not_an_object() {
        assert!(matches!(
            Document::from_json(json!([1, 2])),
            Err(JsonError::NotAnObject("array"))
        ));
        assert!(matches!(
            Document::from_json(json!({"$oid": "65a1b2c3d4e5f60718293a4b"})),
            Err(JsonError::NotAnObject("objectId"))
        ));
    }

    #[test]
    fn test_to_json_wrappers() {
        let id = ObjectId::from_bytes([0x11; 12]);
        let d = doc! {
            "_id" => id,
            "nested" => doc! { "n" => 1 },
            "list" => vec![Value::from(true), Value::Null],
            "raw" => Value::Binary(vec![1, 2, 3]),
            "nan" => f64::NAN,
        };
        let json = d.to_json();
        assert_eq!(json["_id"], json!({"$oid": "111111111111111111111111"}));
        assert_eq!(json["nested"], json!({"n": 1}));
        assert_eq!(json["list"], json!([true, null]));
        assert_eq!(json["raw"], json!({"$binary": {"base64": "AQID", "subType": "00"}}));
        assert_eq!(json["nan"], json!({"$numberDouble": "NaN"}));
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["_id", "nested", "list", "raw", "nan"]);
    }

    #[test]
    fn test_stream_of_objects_and_arrays() {
        let text = "{\"a\": 1}\n{\"b\": 2}\n[{\"c\": 3}, {\"d\": 4}]\n";
        let docs = documents_from_json_stream(text).unwrap();
        assert_eq!(docs.len(), 4);
        assert!(docs[3].contains_key("d"));
    }

    #[test]
    fn test_stream_rejects_scalars() {
        assert!(documents_from_json_stream("{\"a\": 1} 5").is_err());
        assert!(documents_from_json_stream("").unwrap().is_empty());
    }
}
