//! The closed union of value kinds stored under a key.
//!
//! Type dispatch (codec, delta replay, materialization) is an exhaustive
//! `match` over [`TypedValue`]; adding a kind means adding a variant here and
//! the arms the compiler then asks for.

use crate::codec::{Reader, Writer};
use crate::data::TypedData;
use crate::data_type::DataType;
use crate::delta::DeltaInfo;
use crate::error::{DecodeError, Result};
use crate::string::StringValue;
use serde::{Deserialize, Serialize};

/// A value of any supported kind.
///
/// Two values are equal when they have the same kind and the same state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypedValue {
    String(StringValue),
}

impl TypedValue {
    pub fn data_type(&self) -> DataType {
        match self {
            TypedValue::String(s) => s.data_type(),
        }
    }

    /// Replay `delta` on this value.
    pub fn apply_delta(&mut self, delta: &DeltaInfo) -> Result<()> {
        match self {
            TypedValue::String(s) => s.apply_delta(delta),
        }
    }

    /// Build the value an absent key holds after `delta`.
    pub fn from_delta(delta: &DeltaInfo) -> Result<Self> {
        match delta.data_type() {
            DataType::String => Ok(TypedValue::String(StringValue::from_delta(delta)?)),
            data_type => Err(DecodeError::UnsupportedDataType { data_type }.into()),
        }
    }

    pub fn should_remove_on_delete(&self) -> bool {
        match self {
            TypedValue::String(s) => s.should_remove_on_delete(),
        }
    }

    pub fn as_string(&self) -> Option<&StringValue> {
        match self {
            TypedValue::String(s) => Some(s),
        }
    }

    pub fn as_string_mut(&mut self) -> Option<&mut StringValue> {
        match self {
            TypedValue::String(s) => Some(s),
        }
    }

    /// Writes `[type tag][kind payload]`.
    pub fn serialize(&self, writer: &mut Writer) {
        writer.write_byte(self.data_type().tag());
        match self {
            TypedValue::String(s) => s.write_payload(writer),
        }
    }

    /// Reads a value written by [`TypedValue::serialize`].
    pub fn deserialize(reader: &mut Reader<'_>) -> std::result::Result<Self, DecodeError> {
        let data_type = DataType::from_tag(reader.read_byte("data type")?)?;
        match data_type {
            DataType::String => Ok(TypedValue::String(StringValue::read_payload(reader)?)),
            DataType::Hash | DataType::Set | DataType::SortedSet | DataType::List => {
                Err(DecodeError::UnsupportedDataType { data_type })
            }
        }
    }
}

impl From<StringValue> for TypedValue {
    fn from(value: StringValue) -> Self {
        TypedValue::String(value)
    }
}
