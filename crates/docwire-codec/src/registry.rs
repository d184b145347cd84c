//! # Encoder Registry
//!
//! Maps each [`ValueType`] to the [`Encoder`] responsible for it. Encoders
//! recurse through an [`EncodeContext`], which dispatches nested values back
//! through the registry, so there is exactly one encoding policy per type at
//! every depth.
//!
//! ## Lifecycle
//!
//! A registry is mutated through `&mut self` during setup only. Codecs
//! freeze it in an `Arc` once their own registrations are done, after which
//! it is shared read-only across encode calls and threads.

use std::collections::HashMap;
use std::sync::Arc;

use docwire_core::{EncodeError, Value, ValueType};

use crate::document::{ArrayEncoder, DocumentEncoder};
use crate::primitive::PrimitiveCodecs;
use crate::writer::ValueWriter;

/// Default limit on nested documents and arrays.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Encodes values of the types it is registered for.
pub trait Encoder: Send + Sync + std::fmt::Debug {
    /// Write `value` into `writer`.
    ///
    /// Takes `&mut Value` because encoders may complete the value while
    /// writing it (the collectible document encoder inserts `_id`).
    fn encode(
        &self,
        writer: &mut dyn ValueWriter,
        value: &mut Value,
        ctx: &EncodeContext<'_>,
    ) -> Result<(), EncodeError>;
}

/// Type-to-encoder lookup table.
#[derive(Debug, Clone)]
pub struct EncoderRegistry {
    encoders: HashMap<ValueType, Arc<dyn Encoder>>,
    max_depth: usize,
}

impl EncoderRegistry {
    /// An empty registry with the default depth limit.
    pub fn new() -> Self {
        Self {
            encoders: HashMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// A registry covering every value type: `primitives` for scalars,
    /// [`ArrayEncoder`] for arrays, and a plain [`DocumentEncoder`] for
    /// documents.
    pub fn with_defaults(primitives: PrimitiveCodecs) -> Self {
        let mut registry = Self::new();
        registry.register_primitives(primitives);
        registry.register(ValueType::Array, Arc::new(ArrayEncoder));
        registry.register(ValueType::Document, Arc::new(DocumentEncoder::default()));
        registry
    }

    /// Set the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Register `encoder` for `value_type`, returning the encoder it replaces.
    pub fn register(
        &mut self,
        value_type: ValueType,
        encoder: Arc<dyn Encoder>,
    ) -> Option<Arc<dyn Encoder>> {
        tracing::debug!(%value_type, ?encoder, "registering encoder");
        self.encoders.insert(value_type, encoder)
    }

    /// Register `primitives` for every scalar type.
    pub fn register_primitives(&mut self, primitives: PrimitiveCodecs) {
        let shared: Arc<dyn Encoder> = Arc::new(primitives);
        for value_type in PrimitiveCodecs::value_types() {
            self.encoders.insert(value_type, Arc::clone(&shared));
        }
    }

    pub fn get(&self, value_type: ValueType) -> Option<&Arc<dyn Encoder>> {
        self.encoders.get(&value_type)
    }

    /// # Errors
    ///
    /// `EncodeError::NoEncoder` when nothing is registered for `value_type`.
    pub fn lookup(&self, value_type: ValueType) -> Result<&Arc<dyn Encoder>, EncodeError> {
        self.get(value_type)
            .ok_or(EncodeError::NoEncoder(value_type))
    }

    pub fn contains(&self, value_type: ValueType) -> bool {
        self.encoders.contains_key(&value_type)
    }

    /// A root context for encoding a top-level value.
    pub fn context(&self) -> EncodeContext<'_> {
        EncodeContext {
            registry: self,
            depth: 0,
        }
    }
}

impl Default for EncoderRegistry {
    fn default() -> Self {
        Self::with_defaults(PrimitiveCodecs)
    }
}

/// Per-call encoding state: the registry and the current nesting depth.
#[derive(Debug, Clone, Copy)]
pub struct EncodeContext<'a> {
    registry: &'a EncoderRegistry,
    depth: usize,
}

impl<'a> EncodeContext<'a> {
    pub fn registry(&self) -> &'a EncoderRegistry {
        self.registry
    }

    /// Number of containers entered so far.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Dispatch `value` to the encoder registered for its type.
    pub fn write_value(
        &self,
        writer: &mut dyn ValueWriter,
        value: &mut Value,
    ) -> Result<(), EncodeError> {
        let encoder = self.registry.lookup(value.value_type())?;
        encoder.encode(writer, value, self)
    }

    /// Context for the contents of a container one level deeper.
    ///
    /// # Errors
    ///
    /// `EncodeError::MaxDepthExceeded` past the registry's limit.
    pub fn nested(&self) -> Result<EncodeContext<'a>, EncodeError> {
        let depth = self.depth + 1;
        if depth > self.registry.max_depth {
            return Err(EncodeError::MaxDepthExceeded {
                max: self.registry.max_depth,
            });
        }
        Ok(EncodeContext {
            registry: self.registry,
            depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::TokenWriter;
    use docwire_core::doc;

    #[test]
    fn test_defaults_cover_every_type() {
        let registry = EncoderRegistry::default();
        for value_type in ValueType::ALL {
            assert!(registry.contains(value_type), "{value_type} missing");
        }
    }

    #[test]
    fn test_empty_registry_reports_missing_encoder() {
        let registry = EncoderRegistry::new();
        let mut writer = TokenWriter::new();
        let mut value = Value::Document(doc! {});
        assert_eq!(
            registry.context().write_value(&mut writer, &mut value),
            Err(EncodeError::NoEncoder(ValueType::Document))
        );
    }

    #[test]
    fn test_register_returns_replaced_encoder() {
        let mut registry = EncoderRegistry::default();
        let previous = registry.register(ValueType::Int32, Arc::new(PrimitiveCodecs));
        assert!(previous.is_some());
        let fresh = EncoderRegistry::new().register(ValueType::Int32, Arc::new(PrimitiveCodecs));
        assert!(fresh.is_none());
    }

    #[test]
    fn test_nested_depth_limit() {
        let registry = EncoderRegistry::new().with_max_depth(2);
        let root = registry.context();
        let one = root.nested().unwrap();
        let two = one.nested().unwrap();
        assert_eq!(two.depth(), 2);
        assert_eq!(two.nested().unwrap_err(), EncodeError::MaxDepthExceeded { max: 2 });
    }

    #[test]
    fn test_dispatch_uses_registered_encoder() {
        let registry = EncoderRegistry::default();
        let mut writer = TokenWriter::new();
        let mut value = Value::Document(doc! { "a" => 1, "b" => vec![Value::from("x")] });
        registry
            .context()
            .write_value(&mut writer, &mut value)
            .unwrap();
        assert_eq!(writer.top_level_names(), ["a", "b"]);
    }
}
