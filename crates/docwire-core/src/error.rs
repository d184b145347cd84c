//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout docwire. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Configuration errors surface at construction and are never recovered.
//! - Validation, generation and write errors are propagated unchanged to the
//!   caller of an encode; the encoder does not reinterpret them.
//! - An encode either completes or fails as a whole. The sink may hold a
//!   partial write after a failure.

use thiserror::Error;

use crate::value::ValueType;

/// Top-level error type for docwire.
#[derive(Error, Debug)]
pub enum DocwireError {
    /// Codec construction failed.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A document could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Extended JSON conversion failed.
    #[error("json error: {0}")]
    Json(#[from] JsonError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised while assembling a codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A collectible codec cannot exist without an identifier generator.
    #[error("idGenerator is required for a collectible document codec")]
    MissingIdGenerator,

    /// The configuration source could not be parsed.
    #[error("malformed configuration: {0}")]
    Malformed(String),

    /// A configuration value is out of range.
    #[error("invalid setting {setting}: {reason}")]
    InvalidSetting {
        /// Name of the offending setting.
        setting: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// A field name was rejected by the field-name validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The name breaks a storage naming rule.
    #[error("invalid field name {name:?}: {reason}")]
    InvalidFieldName {
        /// The rejected field name.
        name: String,
        /// The rule it violates.
        reason: String,
    },
}

/// The identifier generator could not produce a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("identifier generation failed: {reason}")]
pub struct GenerationError {
    /// Generator-supplied description of the failure.
    pub reason: String,
}

impl GenerationError {
    /// Create a generation error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The output sink refused a write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    /// The call is not legal in the writer's current state.
    #[error("invalid writer state: {0}")]
    InvalidState(String),

    /// The name cannot be represented on the wire.
    #[error("invalid element name {0:?}: names may not contain NUL")]
    InvalidName(String),

    /// The encoded document exceeds the configured size limit.
    #[error("document size {size} exceeds maximum of {max} bytes")]
    DocumentTooLarge {
        /// Encoded size in bytes.
        size: usize,
        /// Configured maximum in bytes.
        max: usize,
    },

    /// Output was requested before the top-level document was closed.
    #[error("writer output requested before the top-level document was closed")]
    Incomplete,
}

/// Failure of a single encode call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// A field name was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The identifier generator failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The sink refused a write.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// No encoder is registered for the value's type.
    #[error("no encoder registered for value type {0}")]
    NoEncoder(ValueType),

    /// An encoder was handed a value type it does not handle.
    #[error("encoder {encoder} cannot encode values of type {value_type}")]
    UnsupportedValue {
        /// Name of the encoder that refused the value.
        encoder: &'static str,
        /// Type of the refused value.
        value_type: ValueType,
    },

    /// Documents and arrays are nested deeper than the registry allows.
    #[error("maximum nesting depth of {max} exceeded")]
    MaxDepthExceeded {
        /// Configured maximum depth.
        max: usize,
    },
}

/// Error converting between JSON and the document model.
#[derive(Error, Debug)]
pub enum JsonError {
    /// A document was expected but another JSON type was found.
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// An Extended JSON wrapper (`$oid`, `$date`, `$uuid`) is malformed.
    #[error("malformed {marker} value: {reason}")]
    MalformedExtended {
        /// The wrapper key.
        marker: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// An unsigned integer does not fit in a signed 64-bit value.
    #[error("integer {0} is out of range for a 64-bit signed value")]
    IntegerOutOfRange(u64),

    /// Parsing the JSON text failed.
    #[error("json parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}
