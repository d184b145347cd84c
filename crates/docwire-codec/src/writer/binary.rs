//! BSON-compatible binary writer.
//!
//! ```text
//! document := int32 total_len | element* | 0x00
//! element  := type:u8 | name:cstring | payload
//! ```
//!
//! Lengths are little-endian and include themselves. Container lengths are
//! reserved on start and back-patched on end.

use chrono::{DateTime, Utc};
use docwire_core::{ObjectId, ValueType, WriteError};
use uuid::Uuid;

use super::{Framing, Slot, ValueWriter};

/// Default upper bound for an encoded top-level document (16 MiB).
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Smallest possible encoded document: length prefix plus terminator.
pub const MIN_DOCUMENT_SIZE: usize = 5;

const BINARY_SUBTYPE_GENERIC: u8 = 0x00;
const BINARY_SUBTYPE_UUID: u8 = 0x04;

/// Writes documents into an in-memory byte buffer.
#[derive(Debug)]
pub struct BinaryWriter {
    buffer: Vec<u8>,
    framing: Framing,
    /// Offsets of the length prefixes of open containers.
    starts: Vec<usize>,
    max_document_size: usize,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::with_max_document_size(DEFAULT_MAX_DOCUMENT_SIZE)
    }

    pub fn with_max_document_size(max_document_size: usize) -> Self {
        Self {
            buffer: Vec::new(),
            framing: Framing::default(),
            starts: Vec::new(),
            max_document_size,
        }
    }

    /// Bytes written so far, including any unfinished container.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Take the encoded document.
    ///
    /// # Errors
    ///
    /// `WriteError::Incomplete` if the top-level document was never closed.
    pub fn into_bytes(self) -> Result<Vec<u8>, WriteError> {
        if !self.framing.is_complete() {
            return Err(WriteError::Incomplete);
        }
        Ok(self.buffer)
    }

    fn header(&mut self, value_type: ValueType) -> Result<(), WriteError> {
        match self.framing.begin_value(value_type)? {
            Slot::TopLevel => {}
            Slot::Element(name) => {
                self.buffer.push(value_type.element_type());
                self.buffer.extend_from_slice(name.as_bytes());
                self.buffer.push(0);
            }
        }
        Ok(())
    }

    fn open_container(&mut self, value_type: ValueType) -> Result<(), WriteError> {
        self.header(value_type)?;
        self.starts.push(self.buffer.len());
        self.buffer.extend_from_slice(&[0; 4]);
        Ok(())
    }

    fn close_container(&mut self) -> Result<(), WriteError> {
        self.buffer.push(0);
        let start = self
            .starts
            .pop()
            .ok_or_else(|| WriteError::InvalidState("no open container".into()))?;
        let size = self.buffer.len() - start;
        let prefix = i32::try_from(size).map_err(|_| WriteError::DocumentTooLarge {
            size,
            max: self.max_document_size,
        })?;
        self.buffer[start..start + 4].copy_from_slice(&prefix.to_le_bytes());
        Ok(())
    }

    fn length_prefixed(&mut self, len: usize) -> Result<(), WriteError> {
        let prefix = i32::try_from(len).map_err(|_| WriteError::DocumentTooLarge {
            size: len,
            max: self.max_document_size,
        })?;
        self.buffer.extend_from_slice(&prefix.to_le_bytes());
        Ok(())
    }
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueWriter for BinaryWriter {
    fn write_start_document(&mut self) -> Result<(), WriteError> {
        self.open_container(ValueType::Document)?;
        self.framing.push_document();
        Ok(())
    }

    fn write_end_document(&mut self) -> Result<(), WriteError> {
        self.framing.end_document()?;
        self.close_container()?;
        if self.framing.is_complete() && self.buffer.len() > self.max_document_size {
            return Err(WriteError::DocumentTooLarge {
                size: self.buffer.len(),
                max: self.max_document_size,
            });
        }
        Ok(())
    }

    fn write_start_array(&mut self) -> Result<(), WriteError> {
        self.open_container(ValueType::Array)?;
        self.framing.push_array();
        Ok(())
    }

    fn write_end_array(&mut self) -> Result<(), WriteError> {
        self.framing.end_array()?;
        self.close_container()
    }

    fn write_name(&mut self, name: &str) -> Result<(), WriteError> {
        self.framing.name(name)
    }

    fn write_null(&mut self) -> Result<(), WriteError> {
        self.header(ValueType::Null)
    }

    fn write_bool(&mut self, value: bool) -> Result<(), WriteError> {
        self.header(ValueType::Bool)?;
        self.buffer.push(u8::from(value));
        Ok(())
    }

    fn write_int32(&mut self, value: i32) -> Result<(), WriteError> {
        self.header(ValueType::Int32)?;
        self.buffer.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_int64(&mut self, value: i64) -> Result<(), WriteError> {
        self.header(ValueType::Int64)?;
        self.buffer.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_double(&mut self, value: f64) -> Result<(), WriteError> {
        self.header(ValueType::Double)?;
        self.buffer.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<(), WriteError> {
        self.header(ValueType::String)?;
        self.length_prefixed(value.len() + 1)?;
        self.buffer.extend_from_slice(value.as_bytes());
        self.buffer.push(0);
        Ok(())
    }

    fn write_object_id(&mut self, value: &ObjectId) -> Result<(), WriteError> {
        self.header(ValueType::ObjectId)?;
        self.buffer.extend_from_slice(&value.bytes());
        Ok(())
    }

    fn write_date_time(&mut self, value: DateTime<Utc>) -> Result<(), WriteError> {
        self.header(ValueType::DateTime)?;
        self.buffer
            .extend_from_slice(&value.timestamp_millis().to_le_bytes());
        Ok(())
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<(), WriteError> {
        self.header(ValueType::Binary)?;
        self.length_prefixed(value.len())?;
        self.buffer.push(BINARY_SUBTYPE_GENERIC);
        self.buffer.extend_from_slice(value);
        Ok(())
    }

    fn write_uuid(&mut self, value: &Uuid) -> Result<(), WriteError> {
        self.header(ValueType::Uuid)?;
        self.length_prefixed(16)?;
        self.buffer.push(BINARY_SUBTYPE_UUID);
        self.buffer.extend_from_slice(value.as_bytes());
        Ok(())
    }
}
