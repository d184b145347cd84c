//! # Generic Document Encoding
//!
//! [`encode_fields`] is the one field-iteration routine every document
//! encoder runs. Specialised encoders customise it with an injected policy
//! pair instead of overriding it:
//!
//! - `before_fields`: runs after the document is opened and before any
//!   field is written.
//! - `skip_field`: fields for which it returns `true` are left out of the
//!   ordinary pass.

use std::sync::Arc;

use docwire_core::{Document, EncodeError, Value};

use crate::registry::{EncodeContext, Encoder};
use crate::validator::{FieldNameValidator, StorageFieldNameValidator};
use crate::writer::ValueWriter;

/// Encode `document`: open it, run `before_fields`, emit every field in
/// order except those `skip_field` excludes, close it.
///
/// Each emitted field name is checked by `validator` before it is written;
/// each value is dispatched through the context's registry.
pub fn encode_fields<B, S>(
    writer: &mut dyn ValueWriter,
    document: &mut Document,
    ctx: &EncodeContext<'_>,
    validator: &dyn FieldNameValidator,
    before_fields: B,
    skip_field: S,
) -> Result<(), EncodeError>
where
    B: FnOnce(&mut dyn ValueWriter, &mut Document, &EncodeContext<'_>) -> Result<(), EncodeError>,
    S: Fn(&str) -> bool,
{
    let ctx = ctx.nested()?;
    writer.write_start_document()?;
    before_fields(&mut *writer, &mut *document, &ctx)?;
    for (name, value) in document.iter_mut() {
        if skip_field(name) {
            continue;
        }
        validator.validate(name)?;
        writer.write_name(name)?;
        ctx.write_value(&mut *writer, value)?;
    }
    writer.write_end_document()?;
    Ok(())
}

/// Plain document encoder: fields in order, no pre-pass, nothing skipped.
#[derive(Debug, Clone)]
pub struct DocumentEncoder {
    validator: Arc<dyn FieldNameValidator>,
}

impl DocumentEncoder {
    pub fn new(validator: Arc<dyn FieldNameValidator>) -> Self {
        Self { validator }
    }
}

impl Default for DocumentEncoder {
    fn default() -> Self {
        Self::new(Arc::new(StorageFieldNameValidator))
    }
}

impl Encoder for DocumentEncoder {
    fn encode(
        &self,
        writer: &mut dyn ValueWriter,
        value: &mut Value,
        ctx: &EncodeContext<'_>,
    ) -> Result<(), EncodeError> {
        match value {
            Value::Document(document) => encode_fields(
                writer,
                document,
                ctx,
                self.validator.as_ref(),
                |_, _, _| Ok(()),
                |_| false,
            ),
            other => Err(EncodeError::UnsupportedValue {
                encoder: "DocumentEncoder",
                value_type: other.value_type(),
            }),
        }
    }
}

/// Encodes arrays element by element through the registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayEncoder;

impl Encoder for ArrayEncoder {
    fn encode(
        &self,
        writer: &mut dyn ValueWriter,
        value: &mut Value,
        ctx: &EncodeContext<'_>,
    ) -> Result<(), EncodeError> {
        let Value::Array(items) = value else {
            return Err(EncodeError::UnsupportedValue {
                encoder: "ArrayEncoder",
                value_type: value.value_type(),
            });
        };
        let ctx = ctx.nested()?;
        writer.write_start_array()?;
        for item in items.iter_mut() {
            ctx.write_value(&mut *writer, item)?;
        }
        writer.write_end_array()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::EncoderRegistry;
    use crate::writer::{BinaryWriter, Token, TokenWriter};
    use docwire_core::{doc, ValidationError, ValueType, WriteError};

    fn tokens_of(document: &mut Document) -> Result<TokenWriter, EncodeError> {
        let registry = EncoderRegistry::default();
        let mut writer = TokenWriter::new();
        let mut value = Value::Document(std::mem::take(document));
        let result = registry.context().write_value(&mut writer, &mut value);
        if let Value::Document(d) = value {
            *document = d;
        }
        result.map(|()| writer)
    }

    #[test]
    fn test_fields_in_insertion_order() {
        let mut d = doc! { "z" => 1, "a" => 2, "m" => 3 };
        let writer = tokens_of(&mut d).unwrap();
        assert_eq!(writer.top_level_names(), ["z", "a", "m"]);
    }

    #[test]
    fn test_plain_encoder_does_not_add_id() {
        let mut d = doc! { "name" => "Ada" };
        let writer = tokens_of(&mut d).unwrap();
        assert_eq!(writer.top_level_names(), ["name"]);
        assert!(!d.contains_key("_id"));
    }

    #[test]
    fn test_invalid_field_name_propagates() {
        let mut d = doc! { "ok" => 1, "$bad" => 2 };
        let err = tokens_of(&mut d).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::Validation(ValidationError::InvalidFieldName { ref name, .. }) if name == "$bad"
        ));
    }

    #[test]
    fn test_array_elements_not_validated() {
        let mut d = doc! { "list" => vec![Value::from(1), Value::from(2)] };
        let writer = tokens_of(&mut d).unwrap();
        assert_eq!(
            writer.tokens()[2..6],
            [
                Token::StartArray,
                Token::Value(Value::Int32(1)),
                Token::Value(Value::Int32(2)),
                Token::EndArray,
            ]
        );
    }

    #[test]
    fn test_policy_hooks_applied() {
        let registry = EncoderRegistry::default();
        let mut writer = TokenWriter::new();
        let mut d = doc! { "a" => 1, "hidden" => 2, "b" => 3 };
        encode_fields(
            &mut writer,
            &mut d,
            &registry.context(),
            &StorageFieldNameValidator,
            |w, _, _| {
                w.write_name("first")?;
                w.write_bool(true)?;
                Ok(())
            },
            |name| name == "hidden",
        )
        .unwrap();
        assert_eq!(writer.top_level_names(), ["first", "a", "b"]);
    }

    #[test]
    fn test_depth_limit_applies_to_nesting() {
        let registry = EncoderRegistry::default().with_max_depth(2);
        let mut value = Value::Document(doc! { "a" => doc! { "b" => doc! { "c" => 1 } } });
        let mut writer = TokenWriter::new();
        assert_eq!(
            registry.context().write_value(&mut writer, &mut value),
            Err(EncodeError::MaxDepthExceeded { max: 2 })
        );
    }

    #[test]
    fn test_binary_output_of_nested_document() {
        // {"d": {"x": 1}}
        let registry = EncoderRegistry::default();
        let mut writer = BinaryWriter::new();
        let mut value = Value::Document(doc! { "d" => doc! { "x" => 1 } });
        registry
            .context()
            .write_value(&mut writer, &mut value)
            .unwrap();
        assert_eq!(
            writer.into_bytes().unwrap(),
            [
                0x14, 0, 0, 0, 0x03, b'd', 0, // outer
                0x0c, 0, 0, 0, 0x10, b'x', 0, 1, 0, 0, 0, 0, // inner
                0,
            ]
        );
    }

    #[test]
    fn test_wrong_value_type_refused() {
        let registry = EncoderRegistry::default();
        let mut writer = TokenWriter::new();
        let err = DocumentEncoder::default()
            .encode(&mut writer, &mut Value::Int32(1), &registry.context())
            .unwrap_err();
        assert_eq!(
            err,
            EncodeError::UnsupportedValue {
                encoder: "DocumentEncoder",
                value_type: ValueType::Int32,
            }
        );
        let err = ArrayEncoder
            .encode(&mut writer, &mut Value::Null, &registry.context())
            .unwrap_err();
        assert!(matches!(err, EncodeError::UnsupportedValue { encoder: "ArrayEncoder", .. }));
    }

    #[test]
    fn test_writer_errors_propagate() {
        let registry = EncoderRegistry::default();
        let mut writer = TokenWriter::new();
        let mut d = doc! { "a\0b" => 1 };
        let err = encode_fields(
            &mut writer,
            &mut d,
            &registry.context(),
            &crate::validator::PermissiveFieldNameValidator,
            |_, _, _| Ok(()),
            |_| false,
        )
        .unwrap_err();
        assert_eq!(err, EncodeError::Write(WriteError::InvalidName("a\0b".into())));
    }
}
