//! String command entry points over a region.
//!
//! These resolve the key first and then hand off to [`StringValue`]:
//! a missing key reads as nil, `append` on a missing key creates it from the
//! append delta, and the numeric commands treat a missing key as `"0"`.
//! A key holding another kind fails with `TypeMismatch`. Every mutating
//! command runs under [`Region::with_key_locked`].

use sdx_core::{ensure_type, DataError, DataType, DeltaInfo, Region, StringValue, TypedValue};

pub fn get<R: Region>(region: &R, key: &[u8]) -> Result<Option<Vec<u8>>, R::Error> {
    match region.get(key) {
        Some(value) => Ok(Some(into_string(value)?.get())),
        None => Ok(None),
    }
}

/// Store `value` under `key`, replacing whatever was there.
pub fn set<R: Region>(region: &R, key: &[u8], value: &[u8]) -> Result<(), R::Error> {
    region.with_key_locked(key, || {
        region.put(key, TypedValue::from(StringValue::new(value)))
    })
}

/// Returns the length of the string after the append.
///
/// The value is read and extended under the key lock, so the length is that
/// of the stored string.
pub fn append<R: Region>(region: &R, key: &[u8], bytes: &[u8]) -> Result<usize, R::Error> {
    region.with_key_locked(key, || -> Result<usize, R::Error> {
        match region.get(key) {
            Some(value) => into_string(value)?.append(bytes, region, key),
            None => {
                region.commit_delta(key, DeltaInfo::append(bytes))?;
                Ok(bytes.len())
            }
        }
    })
}

pub fn incr<R: Region>(region: &R, key: &[u8]) -> Result<i64, R::Error> {
    region.with_key_locked(key, || -> Result<i64, R::Error> {
        string_or_zero(region, key)?.incr(region, key)
    })
}

pub fn decr<R: Region>(region: &R, key: &[u8]) -> Result<i64, R::Error> {
    region.with_key_locked(key, || -> Result<i64, R::Error> {
        string_or_zero(region, key)?.decr(region, key)
    })
}

pub fn incrby<R: Region>(region: &R, key: &[u8], increment: i64) -> Result<i64, R::Error> {
    region.with_key_locked(key, || -> Result<i64, R::Error> {
        string_or_zero(region, key)?.incrby(region, key, increment)
    })
}

pub fn decrby<R: Region>(region: &R, key: &[u8], decrement: i64) -> Result<i64, R::Error> {
    region.with_key_locked(key, || -> Result<i64, R::Error> {
        string_or_zero(region, key)?.decrby(region, key, decrement)
    })
}

fn string_or_zero<R: Region>(region: &R, key: &[u8]) -> Result<StringValue, DataError> {
    match region.get(key) {
        Some(value) => into_string(value),
        None => Ok(StringValue::new("0")),
    }
}

fn into_string(value: TypedValue) -> Result<StringValue, DataError> {
    ensure_type(DataType::String, value.data_type())?;
    match value {
        TypedValue::String(s) => Ok(s),
    }
}
