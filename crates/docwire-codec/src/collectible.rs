//! # Collectible Documents
//!
//! Codec for documents that go into collections and therefore carry an
//! `_id`. Guarantees for every document it encodes, at any depth:
//!
//! 1. If the document has no `_id` (absent or `null`), one is generated and
//!    inserted before anything about it is written.
//! 2. `_id` is emitted first, exactly once.
//! 3. All other fields follow in their original order.
//!
//! ## Registration
//!
//! [`CollectibleDocumentCodecBuilder::build`] registers the collectible
//! encoder for `ValueType::Document` in the registry it is given, then
//! freezes that registry. Nested documents reached through any encoder are
//! therefore routed back through the same policy.

use std::sync::Arc;

use docwire_core::{
    ConfigurationError, Document, EncodeError, GenerationError, IdGenerator, Value, ValueType,
    ID_FIELD_NAME,
};

use crate::config::CodecConfig;
use crate::document::encode_fields;
use crate::primitive::PrimitiveCodecs;
use crate::registry::{EncodeContext, Encoder, EncoderRegistry};
use crate::validator::{FieldNameValidator, StorageFieldNameValidator};
use crate::writer::{
    BinaryWriter, Token, TokenWriter, ValueWriter, DEFAULT_MAX_DOCUMENT_SIZE, MIN_DOCUMENT_SIZE,
};

/// A codec for values that carry an identity within a collection.
pub trait CollectibleCodec<T> {
    /// Encode `value`, completing its identity if needed.
    fn encode(&self, writer: &mut dyn ValueWriter, value: &mut T) -> Result<(), EncodeError>;

    /// The identifier currently stored on `value`.
    fn get_id<'a>(&self, value: &'a T) -> Option<&'a Value>;
}

/// Document encoder with the identifier-first policy.
#[derive(Debug)]
pub struct CollectibleDocumentEncoder {
    id_generator: Arc<dyn IdGenerator>,
    validator: Arc<dyn FieldNameValidator>,
}

impl CollectibleDocumentEncoder {
    pub fn new(id_generator: Arc<dyn IdGenerator>, validator: Arc<dyn FieldNameValidator>) -> Self {
        Self {
            id_generator,
            validator,
        }
    }

    /// Encode `document` with `_id` first, generating it if absent.
    pub fn encode_document(
        &self,
        writer: &mut dyn ValueWriter,
        document: &mut Document,
        ctx: &EncodeContext<'_>,
    ) -> Result<(), EncodeError> {
        tracing::trace!(fields = document.len(), depth = ctx.depth(), "encoding collectible document");
        encode_fields(
            writer,
            document,
            ctx,
            self.validator.as_ref(),
            |writer, document, ctx| self.write_id(writer, document, ctx),
            |name| name == ID_FIELD_NAME,
        )
    }

    /// Make sure `document` has a non-null `_id`, returning it.
    ///
    /// On generation failure the document is left untouched.
    pub fn ensure_id<'d>(&self, document: &'d mut Document) -> Result<&'d mut Value, GenerationError> {
        if document.get(ID_FIELD_NAME).map_or(true, Value::is_null) {
            let id = self.id_generator.generate()?;
            tracing::debug!(?id, "generated document identifier");
            document.insert(ID_FIELD_NAME, id);
        }
        Ok(document.get_or_insert_with(ID_FIELD_NAME, || Value::Null))
    }

    pub fn get_id<'a>(&self, document: &'a Document) -> Option<&'a Value> {
        document.get(ID_FIELD_NAME)
    }

    fn write_id(
        &self,
        writer: &mut dyn ValueWriter,
        document: &mut Document,
        ctx: &EncodeContext<'_>,
    ) -> Result<(), EncodeError> {
        self.validator.validate(ID_FIELD_NAME)?;
        let id = self.ensure_id(document)?;
        writer.write_name(ID_FIELD_NAME)?;
        ctx.write_value(writer, id)
    }
}

impl Encoder for CollectibleDocumentEncoder {
    fn encode(
        &self,
        writer: &mut dyn ValueWriter,
        value: &mut Value,
        ctx: &EncodeContext<'_>,
    ) -> Result<(), EncodeError> {
        match value {
            Value::Document(document) => self.encode_document(writer, document, ctx),
            other => Err(EncodeError::UnsupportedValue {
                encoder: "CollectibleDocumentEncoder",
                value_type: other.value_type(),
            }),
        }
    }
}

/// Ready-to-use collectible codec: the encoder plus the frozen registry it
/// is registered in.
#[derive(Debug, Clone)]
pub struct CollectibleDocumentCodec {
    encoder: Arc<CollectibleDocumentEncoder>,
    registry: Arc<EncoderRegistry>,
    max_document_size: usize,
}

impl CollectibleDocumentCodec {
    pub fn builder() -> CollectibleDocumentCodecBuilder {
        CollectibleDocumentCodecBuilder::default()
    }

    /// Build the full stack described by `config`.
    pub fn from_config(config: &CodecConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Self::builder()
            .id_generator(config.id_generator.build())
            .field_name_validator(config.field_name_validator())
            .registry(EncoderRegistry::with_defaults(PrimitiveCodecs).with_max_depth(config.max_depth))
            .max_document_size(config.max_document_size)
            .build()
    }

    pub fn registry(&self) -> &EncoderRegistry {
        &self.registry
    }

    pub fn encoder(&self) -> &CollectibleDocumentEncoder {
        &self.encoder
    }

    pub fn max_document_size(&self) -> usize {
        self.max_document_size
    }

    /// Encode `document` into a standalone byte buffer.
    pub fn encode_to_vec(&self, document: &mut Document) -> Result<Vec<u8>, EncodeError> {
        let mut writer = BinaryWriter::with_max_document_size(self.max_document_size);
        self.encode(&mut writer, document)?;
        Ok(writer.into_bytes()?)
    }

    /// Encode `document` into its token trace.
    pub fn encode_to_tokens(&self, document: &mut Document) -> Result<Vec<Token>, EncodeError> {
        let mut writer = TokenWriter::new();
        self.encode(&mut writer, document)?;
        Ok(writer.into_tokens())
    }
}

impl CollectibleCodec<Document> for CollectibleDocumentCodec {
    fn encode(&self, writer: &mut dyn ValueWriter, document: &mut Document) -> Result<(), EncodeError> {
        self.encoder
            .encode_document(writer, document, &self.registry.context())
    }

    fn get_id<'a>(&self, document: &'a Document) -> Option<&'a Value> {
        self.encoder.get_id(document)
    }
}

/// Assembles a [`CollectibleDocumentCodec`].
///
/// Only the identifier generator is required. Defaults: a registry from
/// [`EncoderRegistry::with_defaults`], [`StorageFieldNameValidator`], and
/// [`DEFAULT_MAX_DOCUMENT_SIZE`].
#[derive(Debug, Default)]
pub struct CollectibleDocumentCodecBuilder {
    id_generator: Option<Arc<dyn IdGenerator>>,
    primitive_codecs: Option<PrimitiveCodecs>,
    validator: Option<Arc<dyn FieldNameValidator>>,
    registry: Option<EncoderRegistry>,
    max_document_size: Option<usize>,
}

impl CollectibleDocumentCodecBuilder {
    pub fn id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(id_generator);
        self
    }

    /// Scalar encoders. Registered into the base registry, replacing any
    /// scalar encoders it already holds.
    pub fn primitive_codecs(mut self, primitive_codecs: PrimitiveCodecs) -> Self {
        self.primitive_codecs = Some(primitive_codecs);
        self
    }

    pub fn field_name_validator(mut self, validator: Arc<dyn FieldNameValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Base registry to register the collectible encoder into.
    pub fn registry(mut self, registry: EncoderRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn max_document_size(mut self, max_document_size: usize) -> Self {
        self.max_document_size = Some(max_document_size);
        self
    }

    /// Register the collectible encoder for documents and freeze the registry.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::MissingIdGenerator` if no generator was given.
    /// - `ConfigurationError::InvalidSetting` for a document size limit too
    ///   small to hold an empty document.
    pub fn build(self) -> Result<CollectibleDocumentCodec, ConfigurationError> {
        let id_generator = self
            .id_generator
            .ok_or(ConfigurationError::MissingIdGenerator)?;
        let max_document_size = self.max_document_size.unwrap_or(DEFAULT_MAX_DOCUMENT_SIZE);
        if max_document_size < MIN_DOCUMENT_SIZE {
            return Err(ConfigurationError::InvalidSetting {
                setting: "max_document_size".into(),
                reason: format!(
                    "must be at least {MIN_DOCUMENT_SIZE} bytes, got {max_document_size}"
                ),
            });
        }
        let validator = self
            .validator
            .unwrap_or_else(|| Arc::new(StorageFieldNameValidator));

        let mut registry = match self.registry {
            Some(mut registry) => {
                if let Some(primitives) = self.primitive_codecs {
                    registry.register_primitives(primitives);
                }
                registry
            }
            None => EncoderRegistry::with_defaults(self.primitive_codecs.unwrap_or_default()),
        };

        let encoder = Arc::new(CollectibleDocumentEncoder::new(id_generator, validator));
        registry.register(ValueType::Document, encoder.clone());

        Ok(CollectibleDocumentCodec {
            encoder,
            registry: Arc::new(registry),
            max_document_size,
        })
    }
}
