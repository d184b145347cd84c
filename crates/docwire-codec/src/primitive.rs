//! Scalar value encoders shared by every codec built on a registry.

use docwire_core::{EncodeError, Value, ValueType};

use crate::registry::{EncodeContext, Encoder};
use crate::writer::ValueWriter;

/// Encodes every scalar [`Value`] through the matching writer method.
///
/// Registered for each non-container `ValueType` by
/// [`EncoderRegistry::with_defaults`](crate::EncoderRegistry::with_defaults).
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveCodecs;

impl PrimitiveCodecs {
    /// The value types this encoder handles.
    pub fn value_types() -> impl Iterator<Item = ValueType> {
        ValueType::ALL.into_iter().filter(|t| !t.is_container())
    }
}

impl Encoder for PrimitiveCodecs {
    fn encode(
        &self,
        writer: &mut dyn ValueWriter,
        value: &mut Value,
        _ctx: &EncodeContext<'_>,
    ) -> Result<(), EncodeError> {
        match value {
            Value::Null => writer.write_null()?,
            Value::Bool(b) => writer.write_bool(*b)?,
            Value::Int32(n) => writer.write_int32(*n)?,
            Value::Int64(n) => writer.write_int64(*n)?,
            Value::Double(f) => writer.write_double(*f)?,
            Value::String(s) => writer.write_string(s)?,
            Value::ObjectId(id) => writer.write_object_id(id)?,
            Value::DateTime(dt) => writer.write_date_time(*dt)?,
            Value::Binary(bytes) => writer.write_binary(bytes)?,
            Value::Uuid(id) => writer.write_uuid(id)?,
            container => {
                return Err(EncodeError::UnsupportedValue {
                    encoder: "PrimitiveCodecs",
                    value_type: container.value_type(),
                })
            }
        }
        Ok(())
    }
}
