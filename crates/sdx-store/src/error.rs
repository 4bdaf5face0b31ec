//! Error types for the store layer.

use sdx_core::{DataError, DecodeError};
use sdx_delta::SeqNo;
use thiserror::Error;

/// Errors that can occur in region operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("ERR string exceeds maximum allowed size ({len} > {max} bytes)")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("Peer not found: {0}")]
    PeerNotFound(String),

    #[error("Peer {peer} acknowledged {acked} but changes through {evicted_through} were evicted; full resync required")]
    ResyncRequired {
        peer: String,
        acked: SeqNo,
        evicted_through: SeqNo,
    },

    #[error("Missed changes from {origin}: expected seq {expected}, got {got}")]
    ReplayGap {
        origin: String,
        expected: SeqNo,
        got: SeqNo,
    },
}

impl From<DecodeError> for StoreError {
    fn from(err: DecodeError) -> Self {
        StoreError::Data(DataError::Decode(err))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
