//! # Field-Name Validation
//!
//! Storage rules for document field names. The generic field pass runs
//! every document field name through a validator; the collectible pre-pass
//! runs the reserved `_id` name through the same one.
//!
//! Array element names are generated indices and are never validated.

use docwire_core::ValidationError;

/// Decides whether a field name may be stored.
pub trait FieldNameValidator: Send + Sync + std::fmt::Debug {
    /// # Errors
    ///
    /// `ValidationError::InvalidFieldName` naming the violated rule.
    fn validate(&self, name: &str) -> Result<(), ValidationError>;
}

/// The rules a storage collection enforces:
///
/// - no leading `$` (reserved for operators)
/// - no `.` (reserved for dotted paths)
/// - no NUL (names are C strings on the wire)
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageFieldNameValidator;

impl FieldNameValidator for StorageFieldNameValidator {
    fn validate(&self, name: &str) -> Result<(), ValidationError> {
        let reason = if name.starts_with('$') {
            "field names must not start with '$'"
        } else if name.contains('.') {
            "field names must not contain '.'"
        } else if name.contains('\0') {
            "field names must not contain NUL"
        } else {
            return Ok(());
        };
        Err(ValidationError::InvalidFieldName {
            name: name.to_owned(),
            reason: reason.to_owned(),
        })
    }
}

/// Accepts every name. Wire-level constraints still apply in the writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveFieldNameValidator;

impl FieldNameValidator for PermissiveFieldNameValidator {
    fn validate(&self, _name: &str) -> Result<(), ValidationError> {
        Ok(())
    }
}
