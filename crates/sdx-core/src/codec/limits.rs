//! Bounds applied while decoding untrusted bytes.

/// A u64 LEB128 varint never needs more than 10 bytes.
pub const MAX_VARINT_BYTES: usize = 10;

/// Largest string payload the protocol accepts (512 MiB).
pub const MAX_PAYLOAD_LEN: usize = 512 * 1024 * 1024;

/// Largest key accepted inside a store change frame.
pub const MAX_KEY_LEN: usize = MAX_PAYLOAD_LEN;
