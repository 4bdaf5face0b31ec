//! String values and their command set.
//!
//! Numeric commands parse the payload as a strict base-10 signed 64-bit
//! integer and write the result back as decimal text. Range checks happen
//! before anything is mutated, so a failed command leaves the value as it
//! was.
//!
//! `append` replicates through an append delta; every other mutation puts
//! the full value since numeric strings are short.

use crate::codec::limits::MAX_PAYLOAD_LEN;
use crate::codec::{Reader, Writer};
use crate::data::TypedData;
use crate::data_type::{ensure_type, DataType};
use crate::delta::DeltaInfo;
use crate::error::{DataError, DecodeError, Result};
use crate::payload::RawPayload;
use crate::region::Region;
use crate::value::TypedValue;
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringValue {
    value: RawPayload,
}

impl StringValue {
    pub fn new(value: impl Into<RawPayload>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Copy of the payload. Mutating it never touches the stored value.
    pub fn get(&self) -> Vec<u8> {
        self.value.to_bytes()
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn payload(&self) -> &RawPayload {
        &self.value
    }

    /// Replace the payload. Produces no delta.
    pub fn set(&mut self, value: impl Into<RawPayload>) {
        self.value = value.into();
    }

    /// Append `bytes` and commit an append delta. Returns the new length.
    pub fn append<R: Region>(
        &mut self,
        bytes: &[u8],
        region: &R,
        key: &[u8],
    ) -> std::result::Result<usize, R::Error> {
        self.value.append(bytes);
        region.commit_delta(key, DeltaInfo::append(bytes))?;
        trace!(key_len = key.len(), appended = bytes.len(), len = self.value.len(), "append");
        Ok(self.value.len())
    }

    pub fn incr<R: Region>(&mut self, region: &R, key: &[u8]) -> std::result::Result<i64, R::Error> {
        let current = self.parse_value_as_i64()?;
        if current == i64::MAX {
            return Err(DataError::Overflow.into());
        }
        self.store_number(current + 1, region, key, "incr")
    }

    pub fn decr<R: Region>(&mut self, region: &R, key: &[u8]) -> std::result::Result<i64, R::Error> {
        let current = self.parse_value_as_i64()?;
        if current == i64::MIN {
            return Err(DataError::Overflow.into());
        }
        self.store_number(current - 1, region, key, "decr")
    }

    pub fn incrby<R: Region>(
        &mut self,
        region: &R,
        key: &[u8],
        increment: i64,
    ) -> std::result::Result<i64, R::Error> {
        let current = self.parse_value_as_i64()?;
        let result = checked_increment(current, increment)?;
        self.store_number(result, region, key, "incrby")
    }

    pub fn decrby<R: Region>(
        &mut self,
        region: &R,
        key: &[u8],
        decrement: i64,
    ) -> std::result::Result<i64, R::Error> {
        let current = self.parse_value_as_i64()?;
        let result = checked_decrement(current, decrement)?;
        self.store_number(result, region, key, "decrby")
    }

    fn store_number<R: Region>(
        &mut self,
        number: i64,
        region: &R,
        key: &[u8],
        command: &'static str,
    ) -> std::result::Result<i64, R::Error> {
        self.value.set_bytes(number.to_string());
        region.put(key, TypedValue::String(self.clone()))?;
        trace!(command, key_len = key.len(), result = number, "numeric update");
        Ok(number)
    }

    fn parse_value_as_i64(&self) -> Result<i64> {
        std::str::from_utf8(self.value.as_slice())
            .ok()
            .and_then(|text| text.parse::<i64>().ok())
            .ok_or(DataError::NotAnInteger)
    }
}

/// `current + increment`, rejecting results outside the i64 range.
fn checked_increment(current: i64, increment: i64) -> Result<i64> {
    if current >= 0 && increment > i64::MAX - current {
        return Err(DataError::Overflow);
    }
    if current < 0 && increment < i64::MIN - current {
        return Err(DataError::Overflow);
    }
    Ok(current + increment)
}

/// `current - decrement`, rejecting results outside the i64 range.
fn checked_decrement(current: i64, decrement: i64) -> Result<i64> {
    if current <= 0 && decrement != i64::MIN && -decrement < i64::MIN - current {
        return Err(DataError::Overflow);
    }
    if current >= 0 && decrement < current - i64::MAX {
        return Err(DataError::Overflow);
    }
    Ok(current - decrement)
}

impl TypedData for StringValue {
    fn data_type(&self) -> DataType {
        DataType::String
    }

    fn apply_delta(&mut self, delta: &DeltaInfo) -> Result<()> {
        ensure_type(DataType::String, delta.data_type())?;
        match delta {
            DeltaInfo::Append(append) => self.value.append(append.bytes()),
        }
        Ok(())
    }

    fn from_delta(delta: &DeltaInfo) -> Result<Self> {
        ensure_type(DataType::String, delta.data_type())?;
        match delta {
            DeltaInfo::Append(append) => Ok(Self::new(append.bytes())),
        }
    }

    /// An empty string is still a stored value.
    fn should_remove_on_delete(&self) -> bool {
        false
    }

    fn write_payload(&self, writer: &mut Writer) {
        writer.write_bytes_prefixed(self.value.as_slice());
    }

    fn read_payload(reader: &mut Reader<'_>) -> std::result::Result<Self, DecodeError> {
        let bytes = reader.read_bytes_prefixed(MAX_PAYLOAD_LEN, "string payload")?;
        Ok(Self::new(bytes))
    }
}
