//! Delta records - minimal descriptions of incremental mutations.
//!
//! A delta carries only the information needed to replay one mutation on
//! another copy of a value. It can be applied to an existing value of the
//! matching kind, or used to materialize a value when the key is absent:
//!
//! ```text
//! Append(a) on payload p  =>  p ++ a
//! Append(a) on absent     =>  a
//! ```
//!
//! Sibling kinds (set-add, list-push, hash-field-set) join this enum with the
//! same shape.

use crate::codec::limits::MAX_PAYLOAD_LEN;
use crate::codec::{Reader, Writer};
use crate::data_type::DataType;
use crate::error::DecodeError;
use serde::{Deserialize, Serialize};

/// Wire discriminant of a delta record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeltaKind {
    Append,
}

impl DeltaKind {
    pub fn tag(self) -> u8 {
        match self {
            DeltaKind::Append => 0,
        }
    }

    pub fn from_tag(kind: u8) -> Result<Self, DecodeError> {
        match kind {
            0 => Ok(DeltaKind::Append),
            _ => Err(DecodeError::UnknownDeltaKind { kind }),
        }
    }

    /// The value type this kind of delta applies to.
    pub fn data_type(self) -> DataType {
        match self {
            DeltaKind::Append => DataType::String,
        }
    }
}

/// The bytes appended to a string payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppendDelta {
    bytes: Vec<u8>,
}

impl AppendDelta {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// One incremental mutation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeltaInfo {
    Append(AppendDelta),
}

impl DeltaInfo {
    /// Delta for appending `bytes` to a string.
    pub fn append(bytes: impl Into<Vec<u8>>) -> Self {
        DeltaInfo::Append(AppendDelta::new(bytes))
    }

    pub fn kind(&self) -> DeltaKind {
        match self {
            DeltaInfo::Append(_) => DeltaKind::Append,
        }
    }

    pub fn data_type(&self) -> DataType {
        self.kind().data_type()
    }

    /// Writes `[kind][payload]`.
    pub fn serialize(&self, writer: &mut Writer) {
        writer.write_byte(self.kind().tag());
        match self {
            DeltaInfo::Append(append) => writer.write_bytes_prefixed(append.bytes()),
        }
    }

    /// Reads a delta written by [`DeltaInfo::serialize`].
    pub fn deserialize(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let kind = DeltaKind::from_tag(reader.read_byte("delta kind")?)?;
        match kind {
            DeltaKind::Append => {
                let bytes = reader.read_bytes_prefixed(MAX_PAYLOAD_LEN, "append delta")?;
                Ok(DeltaInfo::append(bytes))
            }
        }
    }
}
