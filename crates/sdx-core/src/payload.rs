//! Raw Payload - the owned byte buffer inside a typed value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An owned, resizable byte sequence.
///
/// A payload is never shared: cloning copies the bytes, and
/// [`RawPayload::to_bytes`] hands out a fresh vector.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawPayload {
    bytes: Vec<u8>,
}

impl RawPayload {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Append bytes in place
    pub fn append(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Replace the whole content
    pub fn set_bytes(&mut self, bytes: impl Into<Vec<u8>>) {
        self.bytes = bytes.into();
    }

    /// Borrow the content without copying.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Copy the content out.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<Vec<u8>> for RawPayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl From<&[u8]> for RawPayload {
    fn from(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }
}

impl From<&str> for RawPayload {
    fn from(s: &str) -> Self {
        Self::from(s.as_bytes())
    }
}

impl fmt::Debug for RawPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawPayload({:?})", String::from_utf8_lossy(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_replace() {
        let mut payload = RawPayload::from("hello");
        payload.append(b"world");
        assert_eq!(payload.as_slice(), b"helloworld");
        assert_eq!(payload.len(), 10);

        payload.set_bytes(b"x".to_vec());
        assert_eq!(payload.as_slice(), b"x");
    }

    #[test]
    fn test_clone_is_deep() {
        let original = RawPayload::from("abc");
        let mut copy = original.clone();
        copy.append(b"def");

        assert_eq!(original.as_slice(), b"abc");
        assert_eq!(copy.as_slice(), b"abcdef");
    }

    #[test]
    fn test_to_bytes_is_detached() {
        let payload = RawPayload::from("abc");
        let mut out = payload.to_bytes();
        out.push(b'!');
        assert_eq!(payload.as_slice(), b"abc");
    }
}
