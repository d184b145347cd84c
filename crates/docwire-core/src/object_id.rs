//! # ObjectId
//!
//! A 12-byte identifier laid out as:
//!
//! ```text
//! +--------------------+------------------------+-------------------+
//! | seconds (4, BE)    | process tag (5)        | counter (3, BE)   |
//! +--------------------+------------------------+-------------------+
//! ```
//!
//! Ordering of two ids follows their byte order, so ids minted later by the
//! same generator compare greater within a second.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::JsonError;

/// Length of an ObjectId in bytes.
pub const OBJECT_ID_LEN: usize = 12;

/// A 12-byte document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Wrap raw bytes.
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Assemble an id from its three components. Only the low 24 bits of
    /// `counter` are kept.
    pub fn from_parts(seconds: u32, process_tag: [u8; 5], counter: u32) -> Self {
        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&process_tag);
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; OBJECT_ID_LEN] {
        self.0
    }

    /// Creation time encoded in the first four bytes.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let secs = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        DateTime::from_timestamp(i64::from(secs), 0).unwrap_or_default()
    }

    /// The 24-bit counter in the last three bytes.
    pub fn counter(&self) -> u32 {
        u32::from_be_bytes([0, self.0[9], self.0[10], self.0[11]])
    }

    /// Render the id as 24 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse 24 hex characters (either case).
    pub fn parse_hex(s: &str) -> Result<Self, JsonError> {
        let malformed = |reason: String| JsonError::MalformedExtended {
            marker: "$oid",
            reason,
        };
        if s.len() != OBJECT_ID_LEN * 2 || !s.is_ascii() {
            return Err(malformed(format!(
                "expected {} hex characters, got {s:?}",
                OBJECT_ID_LEN * 2
            )));
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(malformed(format!("invalid hex digit in {s:?}")));
        }
        let mut bytes = [0u8; OBJECT_ID_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = &s[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16)
                .map_err(|_| malformed(format!("invalid hex digit in {s:?}")))?;
        }
        Ok(Self(bytes))
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = JsonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse_hex(&raw).map_err(serde::de::Error::custom)
    }
}
