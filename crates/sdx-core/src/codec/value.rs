//! Whole-buffer entry points for values and deltas.

use crate::codec::{Reader, Writer};
use crate::delta::DeltaInfo;
use crate::error::DecodeError;
use crate::value::TypedValue;

/// Encode a value as `[type tag][payload]`.
pub fn encode_value(value: &TypedValue) -> Vec<u8> {
    let mut writer = Writer::new();
    value.serialize(&mut writer);
    writer.into_bytes()
}

/// Decode a value, rejecting trailing bytes.
pub fn decode_value(bytes: &[u8]) -> Result<TypedValue, DecodeError> {
    let mut reader = Reader::new(bytes);
    let value = TypedValue::deserialize(&mut reader)?;
    reader.finish("value")?;
    Ok(value)
}

/// Encode a delta as `[delta kind][payload]`.
pub fn encode_delta(delta: &DeltaInfo) -> Vec<u8> {
    let mut writer = Writer::new();
    delta.serialize(&mut writer);
    writer.into_bytes()
}

/// Decode a delta, rejecting trailing bytes.
pub fn decode_delta(bytes: &[u8]) -> Result<DeltaInfo, DecodeError> {
    let mut reader = Reader::new(bytes);
    let delta = DeltaInfo::deserialize(&mut reader)?;
    reader.finish("delta")?;
    Ok(delta)
}
