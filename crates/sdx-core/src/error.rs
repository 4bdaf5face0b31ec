//! Error types for typed values and the binary codec.

use thiserror::Error;

use crate::data_type::DataType;

/// Errors raised by value commands and delta application.
///
/// The display strings of the arithmetic errors are the exact replies the
/// command protocol sends back to clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,

    #[error("ERR increment or decrement would overflow")]
    Overflow,

    #[error("WRONGTYPE Operation against a key holding the wrong kind of value (expected {expected}, found {found})")]
    TypeMismatch { expected: DataType, found: DataType },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Error during binary decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("varint exceeds maximum length (10 bytes)")]
    VarintTooLong,

    #[error("varint overflow (value exceeds u64)")]
    VarintOverflow,

    #[error("unknown data type tag: {tag}")]
    UnknownDataType { tag: u8 },

    #[error("data type {data_type} has no value implementation")]
    UnsupportedDataType { data_type: DataType },

    #[error("unknown delta kind: {kind}")]
    UnknownDeltaKind { kind: u8 },

    #[error("invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },

    #[error("unknown change kind: {kind}")]
    UnknownChangeKind { kind: u8 },

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: u64,
        max: usize,
    },

    #[error("{count} trailing bytes after {context}")]
    TrailingBytes { context: &'static str, count: usize },
}

pub type Result<T> = std::result::Result<T, DataError>;
