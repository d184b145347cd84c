//! # Codec Configuration
//!
//! `CodecConfig` is the on-disk (YAML) description of a collectible codec.
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```yaml
//! id_generator: object_id      # or: uuid
//! validate_field_names: true
//! max_depth: 100
//! max_document_size: 16777216
//! ```

use std::sync::Arc;

use docwire_core::{ConfigurationError, IdGeneratorKind};
use serde::{Deserialize, Serialize};

use crate::registry::DEFAULT_MAX_DEPTH;
use crate::validator::{FieldNameValidator, PermissiveFieldNameValidator, StorageFieldNameValidator};
use crate::writer::{DEFAULT_MAX_DOCUMENT_SIZE, MIN_DOCUMENT_SIZE};

/// Settings for [`CollectibleDocumentCodec::from_config`](crate::CollectibleDocumentCodec::from_config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Generator used when a document has no `_id`.
    pub id_generator: IdGeneratorKind,
    /// Enforce storage field-name rules.
    pub validate_field_names: bool,
    /// Maximum nesting of documents and arrays.
    pub max_depth: usize,
    /// Maximum encoded size of a top-level document, in bytes.
    pub max_document_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            id_generator: IdGeneratorKind::default(),
            validate_field_names: true,
            max_depth: DEFAULT_MAX_DEPTH,
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
        }
    }
}

impl CodecConfig {
    /// Parse and validate a YAML configuration.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigurationError> {
        // serde_yaml reads an empty document as unit, not as an empty map.
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| ConfigurationError::Malformed(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_depth == 0 {
            return Err(ConfigurationError::InvalidSetting {
                setting: "max_depth".into(),
                reason: "must be at least 1 to encode a document".into(),
            });
        }
        if self.max_document_size < MIN_DOCUMENT_SIZE {
            return Err(ConfigurationError::InvalidSetting {
                setting: "max_document_size".into(),
                reason: format!(
                    "must be at least {MIN_DOCUMENT_SIZE} bytes, got {}",
                    self.max_document_size
                ),
            });
        }
        Ok(())
    }

    /// The validator selected by `validate_field_names`.
    pub fn field_name_validator(&self) -> Arc<dyn FieldNameValidator> {
        if self.validate_field_names {
            Arc::new(StorageFieldNameValidator)
        } else {
            Arc::new(PermissiveFieldNameValidator)
        }
    }
}
