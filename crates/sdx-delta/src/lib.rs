//! SDX Delta - replication bookkeeping for committed changes
//!
//! This crate provides:
//! - A bounded, sequenced outbox of committed changes
//! - Per-peer acknowledgment tracking and garbage collection
//! - Per-origin replay tracking so redelivered changes apply once
//!
//! # Example
//!
//! ```rust
//! use sdx_delta::{AckTracker, DeltaBuffer, Replay, ReplayGuard};
//!
//! let mut outbox: DeltaBuffer<&str> = DeltaBuffer::new(16);
//! let mut acks = AckTracker::new();
//! acks.register_peer("replica2".to_string(), 0);
//!
//! let seq = outbox.push("append:world");
//! assert_eq!(outbox.deltas_since(0).count(), 1);
//!
//! // On replica2
//! let mut guard = ReplayGuard::new();
//! assert_eq!(guard.check("replica1", seq), Replay::Apply);
//! guard.record("replica1", seq);
//!
//! // Back on replica1
//! acks.update_ack("replica2", seq);
//! if let Some(min) = acks.min_acked() {
//!     outbox.ack(min);
//! }
//! assert!(outbox.is_empty());
//! ```

pub mod buffer;

pub use buffer::{AckTracker, DeltaBuffer, ReplicaId, Replay, ReplayGuard, SeqNo, TaggedDelta};
