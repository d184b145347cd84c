//! # Identifier Generation
//!
//! The `IdGenerator` contract consumed by the collectible document encoder,
//! plus the two generators docwire ships.
//!
//! Global uniqueness is the generator's responsibility. The encoder only
//! guarantees that it asks for an identifier when a document lacks one and
//! writes whatever it receives.

use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConfigurationError, GenerationError};
use crate::object_id::ObjectId;
use crate::value::Value;

const COUNTER_MASK: u32 = 0x00FF_FFFF;

/// Produces a fresh identifier value on every call.
pub trait IdGenerator: Send + Sync + std::fmt::Debug {
    /// Produce a value suitable for use as a document identifier.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` when no identifier can be produced. The
    /// encoder has no fallback and fails the whole encode.
    fn generate(&self) -> Result<Value, GenerationError>;
}

impl<G: IdGenerator + ?Sized> IdGenerator for Arc<G> {
    fn generate(&self) -> Result<Value, GenerationError> {
        (**self).generate()
    }
}

/// Generates [`ObjectId`] identifiers.
///
/// Each generator draws a random 5-byte process tag and a random counter
/// start at construction. The counter advances atomically, so one generator
/// can be shared across threads.
#[derive(Debug)]
pub struct ObjectIdGenerator {
    process_tag: [u8; 5],
    counter: AtomicU32,
}

impl ObjectIdGenerator {
    /// Create a generator with a random process tag and counter start.
    pub fn new() -> Self {
        Self::with_parts(rand::random::<[u8; 5]>(), rand::random::<u32>())
    }

    /// Create a generator with a fixed process tag and counter start.
    pub fn with_parts(process_tag: [u8; 5], counter_start: u32) -> Self {
        Self {
            process_tag,
            counter: AtomicU32::new(counter_start & COUNTER_MASK),
        }
    }

    /// Mint the next ObjectId.
    pub fn next_id(&self) -> Result<ObjectId, GenerationError> {
        let now = Utc::now().timestamp();
        let seconds = u32::try_from(now).map_err(|_| {
            GenerationError::new(format!("clock value {now} is outside the ObjectId range"))
        })?;
        let counter = self.counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;
        Ok(ObjectId::from_parts(seconds, self.process_tag, counter))
    }
}

impl Default for ObjectIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for ObjectIdGenerator {
    fn generate(&self) -> Result<Value, GenerationError> {
        self.next_id().map(Value::ObjectId)
    }
}

/// Generates random (v4) UUID identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> Result<Value, GenerationError> {
        Ok(Value::Uuid(Uuid::new_v4()))
    }
}

/// Selects one of the shipped generators from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdGeneratorKind {
    #[default]
    ObjectId,
    Uuid,
}

impl IdGeneratorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ObjectId => "object_id",
            Self::Uuid => "uuid",
        }
    }

    /// Instantiate the selected generator.
    pub fn build(&self) -> Arc<dyn IdGenerator> {
        match self {
            Self::ObjectId => Arc::new(ObjectIdGenerator::new()),
            Self::Uuid => Arc::new(UuidGenerator),
        }
    }
}

impl std::fmt::Display for IdGeneratorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdGeneratorKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "object_id" | "objectid" | "oid" => Ok(Self::ObjectId),
            "uuid" => Ok(Self::Uuid),
            other => Err(ConfigurationError::InvalidSetting {
                setting: "id_generator".into(),
                reason: format!("unknown generator {other:?}; expected object_id or uuid"),
            }),
        }
    }
}
