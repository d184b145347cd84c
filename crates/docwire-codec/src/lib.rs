//! # docwire-codec — Identifier-First Document Encoding
//!
//! Encodes [`Document`](docwire_core::Document)s into a BSON-compatible
//! binary format. The centrepiece is [`CollectibleDocumentCodec`]: every
//! document it encodes carries an `_id`, written first, generated on demand.
//!
//! ## Layers
//!
//! - [`writer`]: the `ValueWriter` sink with `BinaryWriter` and `TokenWriter`.
//! - [`validator`]: field-name rules applied by the field pass.
//! - [`primitive`]: scalar encoders.
//! - [`registry`]: type-driven dispatch; nested values recurse through it.
//! - [`document`]: the generic field pass with its injected policy hooks.
//! - [`collectible`]: the identifier-first policy and the codec facade.
//! - [`config`]: YAML-backed settings.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use docwire_codec::{CollectibleCodec, CollectibleDocumentCodec};
//! use docwire_core::{doc, ObjectIdGenerator};
//!
//! let codec = CollectibleDocumentCodec::builder()
//!     .id_generator(Arc::new(ObjectIdGenerator::new()))
//!     .build()
//!     .unwrap();
//!
//! let mut person = doc! { "name" => "Ada" };
//! let bytes = codec.encode_to_vec(&mut person).unwrap();
//! assert!(codec.get_id(&person).is_some());
//! assert_eq!(bytes[4], 0x07); // first element is the ObjectId `_id`
//! ```
//!
//! ## Crate Policy
//!
//! - Registries are mutated during setup only and shared immutably after.
//! - Errors are propagated unchanged; nothing here retries or rolls back.
//! - No `unsafe` code.

pub mod collectible;
pub mod config;
pub mod document;
pub mod primitive;
pub mod registry;
pub mod validator;
pub mod writer;

pub use collectible::{
    CollectibleCodec, CollectibleDocumentCodec, CollectibleDocumentCodecBuilder,
    CollectibleDocumentEncoder,
};
pub use config::CodecConfig;
pub use document::{encode_fields, ArrayEncoder, DocumentEncoder};
pub use primitive::PrimitiveCodecs;
pub use registry::{EncodeContext, Encoder, EncoderRegistry, DEFAULT_MAX_DEPTH};
pub use validator::{FieldNameValidator, PermissiveFieldNameValidator, StorageFieldNameValidator};
pub use writer::{
    BinaryWriter, Token, TokenWriter, ValueWriter, DEFAULT_MAX_DOCUMENT_SIZE, MIN_DOCUMENT_SIZE,
};
