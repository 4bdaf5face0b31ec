//! Primitive encoding/decoding: bytes, LEB128 varints and length-prefixed blocks.

use crate::codec::limits::MAX_VARINT_BYTES;
use crate::error::DecodeError;

// =============================================================================
// DECODING
// =============================================================================

/// Reader over a borrowed byte slice.
///
/// Every read is bounds checked and reports the field being decoded on
/// failure.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current position in the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes not consumed yet.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or(DecodeError::UnexpectedEof { context })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads exactly `n` bytes.
    #[inline]
    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining_len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Reads an unsigned varint (LEB128).
    pub fn read_varint(&mut self, context: &'static str) -> Result<u64, DecodeError> {
        let mut result: u64 = 0;
        let mut shift = 0;

        for _ in 0..MAX_VARINT_BYTES {
            let byte = self.read_byte(context)?;
            let value = (byte & 0x7F) as u64;

            if shift == 63 && value > 1 {
                return Err(DecodeError::VarintOverflow);
            }

            result |= value << shift;

            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }

        Err(DecodeError::VarintTooLong)
    }

    /// Reads a length-prefixed byte block of at most `max_len` bytes.
    pub fn read_bytes_prefixed(
        &mut self,
        max_len: usize,
        field: &'static str,
    ) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_varint(field)?;
        if len > max_len as u64 {
            return Err(DecodeError::LengthExceedsLimit {
                field,
                len,
                max: max_len,
            });
        }
        let bytes = self.read_bytes(len as usize, field)?;
        Ok(bytes.to_vec())
    }

    /// Fails if any input is left over.
    pub fn finish(&self, context: &'static str) -> Result<(), DecodeError> {
        match self.remaining_len() {
            0 => Ok(()),
            count => Err(DecodeError::TrailingBytes { context, count }),
        }
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for encoding binary data.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes an unsigned varint (LEB128).
    pub fn write_varint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.buf.push((value as u8) | 0x80);
            value >>= 7;
        }
        self.buf.push(value as u8);
    }

    /// Writes a length-prefixed byte block.
    pub fn write_bytes_prefixed(&mut self, bytes: &[u8]) {
        self.write_varint(bytes.len() as u64);
        self.write_bytes(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_boundaries() {
        for value in [0u64, 1, 127, 128, 16_383, 16_384, u32::MAX as u64, u64::MAX] {
            let mut writer = Writer::new();
            writer.write_varint(value);
            let bytes = writer.into_bytes();

            let mut reader = Reader::new(&bytes);
            assert_eq!(reader.read_varint("test").unwrap(), value);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn test_varint_single_byte_encoding() {
        let mut writer = Writer::new();
        writer.write_varint(5);
        assert_eq!(writer.as_bytes(), &[5]);
    }

    #[test]
    fn test_varint_overflow() {
        // 10th byte carries more than the single remaining bit
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02];
        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.read_varint("test"), Err(DecodeError::VarintOverflow));
    }

    #[test]
    fn test_varint_too_long() {
        let bytes = [0x80; 11];
        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.read_varint("test"), Err(DecodeError::VarintTooLong));
    }

    #[test]
    fn test_truncated_block() {
        let mut writer = Writer::new();
        writer.write_bytes_prefixed(b"hello");
        let bytes = writer.into_bytes();

        let mut reader = Reader::new(&bytes[..3]);
        assert_eq!(
            reader.read_bytes_prefixed(1024, "payload"),
            Err(DecodeError::UnexpectedEof { context: "payload" })
        );
    }

    #[test]
    fn test_block_over_limit() {
        let mut writer = Writer::new();
        writer.write_bytes_prefixed(b"hello");
        let bytes = writer.into_bytes();

        let mut reader = Reader::new(&bytes);
        assert_eq!(
            reader.read_bytes_prefixed(4, "payload"),
            Err(DecodeError::LengthExceedsLimit {
                field: "payload",
                len: 5,
                max: 4,
            })
        );
    }

    #[test]
    fn test_finish_reports_trailing_bytes() {
        let bytes = [1u8, 2, 3];
        let mut reader = Reader::new(&bytes);
        reader.read_byte("first").unwrap();
        assert_eq!(
            reader.finish("frame"),
            Err(DecodeError::TrailingBytes {
                context: "frame",
                count: 2,
            })
        );
    }
}
