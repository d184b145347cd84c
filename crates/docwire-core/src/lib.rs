//! # docwire-core — Foundational Types for docwire
//!
//! This crate defines the value model every other docwire crate encodes:
//! ordered documents, polymorphic values, ObjectIds, and the identifier
//! generation contract. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Ordered documents.** `Document` preserves insertion order. The
//!    encoder emits fields in this order, apart from the identifier field.
//!
//! 2. **One reserved identifier name.** [`ID_FIELD_NAME`] (`_id`) is the
//!    only name the codec treats specially.
//!
//! 3. **Pluggable generation.** `IdGenerator` is a trait. The codec never
//!    assumes a uniqueness algorithm; `ObjectIdGenerator` and
//!    `UuidGenerator` are the shipped choices.
//!
//! 4. **Typed errors.** Every failure mode has a `thiserror` type in
//!    [`error`]; nothing is stringly typed across crate boundaries.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `docwire-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod error;
pub mod identity;
pub mod json;
pub mod object_id;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use document::{Document, ID_FIELD_NAME};
pub use error::{
    ConfigurationError, DocwireError, EncodeError, GenerationError, JsonError, ValidationError,
    WriteError,
};
pub use identity::{IdGenerator, IdGeneratorKind, ObjectIdGenerator, UuidGenerator};
pub use json::documents_from_json_stream;
pub use object_id::ObjectId;
pub use value::{Value, ValueType};
