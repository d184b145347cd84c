//! # Value Writers
//!
//! `ValueWriter` is the sink the encoders write into: a stream of
//! structural events (start/end of documents and arrays), element names,
//! and scalar values.
//!
//! ## State Rules
//!
//! - The top-level value must be a document.
//! - Inside a document every value is preceded by exactly one `write_name`.
//! - Inside an array names are generated from element indices; an explicit
//!   `write_name` is an error.
//! - Nothing may be written once the top-level document is closed.
//!
//! Both writers enforce these rules through the shared [`Framing`] tracker,
//! so a sequence accepted by `TokenWriter` is also accepted by
//! `BinaryWriter`.

mod binary;
mod token;

pub use binary::{BinaryWriter, DEFAULT_MAX_DOCUMENT_SIZE, MIN_DOCUMENT_SIZE};
pub use token::{render_tokens, top_level_names, Token, TokenWriter};

use chrono::{DateTime, Utc};
use docwire_core::{ObjectId, ValueType, WriteError};
use uuid::Uuid;

/// Destination for an ordered sequence of name/value writes.
pub trait ValueWriter {
    fn write_start_document(&mut self) -> Result<(), WriteError>;
    fn write_end_document(&mut self) -> Result<(), WriteError>;
    fn write_start_array(&mut self) -> Result<(), WriteError>;
    fn write_end_array(&mut self) -> Result<(), WriteError>;

    /// Name the next value written into the current document.
    fn write_name(&mut self, name: &str) -> Result<(), WriteError>;

    fn write_null(&mut self) -> Result<(), WriteError>;
    fn write_bool(&mut self, value: bool) -> Result<(), WriteError>;
    fn write_int32(&mut self, value: i32) -> Result<(), WriteError>;
    fn write_int64(&mut self, value: i64) -> Result<(), WriteError>;
    fn write_double(&mut self, value: f64) -> Result<(), WriteError>;
    fn write_string(&mut self, value: &str) -> Result<(), WriteError>;
    fn write_object_id(&mut self, value: &ObjectId) -> Result<(), WriteError>;
    fn write_date_time(&mut self, value: DateTime<Utc>) -> Result<(), WriteError>;
    fn write_binary(&mut self, value: &[u8]) -> Result<(), WriteError>;
    fn write_uuid(&mut self, value: &Uuid) -> Result<(), WriteError>;
}

/// Where the next value lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot {
    /// The top-level document, which has no element name.
    TopLevel,
    /// An element with the given name (array elements use their index).
    Element(String),
}

#[derive(Debug)]
enum Frame {
    Document { pending_name: Option<String> },
    Array { next_index: usize },
}

/// Nesting and naming state shared by the writer implementations.
#[derive(Debug, Default)]
pub(crate) struct Framing {
    stack: Vec<Frame>,
    complete: bool,
}

impl Framing {
    /// True once the top-level document has been closed.
    pub(crate) fn is_complete(&self) -> bool {
        self.complete
    }

    pub(crate) fn name(&mut self, name: &str) -> Result<(), WriteError> {
        self.ensure_open()?;
        if name.contains('\0') {
            return Err(WriteError::InvalidName(name.to_owned()));
        }
        match self.stack.last_mut() {
            Some(Frame::Document { pending_name }) => {
                if let Some(previous) = pending_name.as_deref() {
                    return Err(WriteError::InvalidState(format!(
                        "name {name:?} written while {previous:?} still awaits a value"
                    )));
                }
                *pending_name = Some(name.to_owned());
                Ok(())
            }
            Some(Frame::Array { .. }) => Err(WriteError::InvalidState(format!(
                "name {name:?} written inside an array"
            ))),
            None => Err(WriteError::InvalidState(format!(
                "name {name:?} written outside any document"
            ))),
        }
    }

    /// Claim the slot for the next value of type `value_type`.
    pub(crate) fn begin_value(&mut self, value_type: ValueType) -> Result<Slot, WriteError> {
        self.ensure_open()?;
        match self.stack.last_mut() {
            None if value_type == ValueType::Document => Ok(Slot::TopLevel),
            None => Err(WriteError::InvalidState(format!(
                "top-level value must be a document, got {value_type}"
            ))),
            Some(Frame::Document { pending_name }) => {
                pending_name.take().map(Slot::Element).ok_or_else(|| {
                    WriteError::InvalidState(format!("{value_type} value written without a name"))
                })
            }
            Some(Frame::Array { next_index }) => {
                let index = *next_index;
                *next_index += 1;
                Ok(Slot::Element(index.to_string()))
            }
        }
    }

    pub(crate) fn push_document(&mut self) {
        self.stack.push(Frame::Document { pending_name: None });
    }

    pub(crate) fn push_array(&mut self) {
        self.stack.push(Frame::Array { next_index: 0 });
    }

    pub(crate) fn end_document(&mut self) -> Result<(), WriteError> {
        self.ensure_open()?;
        match self.stack.last() {
            Some(Frame::Document { pending_name: None }) => {
                self.stack.pop();
                self.complete = self.stack.is_empty();
                Ok(())
            }
            Some(Frame::Document {
                pending_name: Some(name),
            }) => Err(WriteError::InvalidState(format!(
                "document closed while {name:?} still awaits a value"
            ))),
            Some(Frame::Array { .. }) => Err(WriteError::InvalidState(
                "end of document written inside an array".into(),
            )),
            None => Err(WriteError::InvalidState("no open document to end".into())),
        }
    }

    pub(crate) fn end_array(&mut self) -> Result<(), WriteError> {
        self.ensure_open()?;
        match self.stack.last() {
            Some(Frame::Array { .. }) => {
                self.stack.pop();
                Ok(())
            }
            _ => Err(WriteError::InvalidState("no open array to end".into())),
        }
    }

    fn ensure_open(&self) -> Result<(), WriteError> {
        if self.complete {
            return Err(WriteError::InvalidState(
                "top-level document is already complete".into(),
            ));
        }
        Ok(())
    }
}
