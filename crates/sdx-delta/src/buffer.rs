//! Outbox of committed changes awaiting replication
//!
//! Every committed change gets the next sequence number. A peer is sent the
//! changes after the last sequence it acknowledged:
//!
//! On local commit c:
//!   seq = seq + 1
//!   D.push((seq, c))
//!
//! On send to peer j:
//!   if acked[j] < evicted_through: full resync
//!   else send D[acked[j]..] to j
//!
//! On ack(seq) from peer j:
//!   acked[j] = max(acked[j], seq)
//!   drop D[..min(acked)]
//!
//! Append deltas are not idempotent, so the buffer never merges or drops a
//! change a peer still needs: once the capacity forces an eviction, lagging
//! peers are told to resync from a snapshot instead.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, warn};

/// Sequence number of a committed change
pub type SeqNo = u64;

/// Replica identifier
pub type ReplicaId = String;

/// A change tagged with its sequence number
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaggedDelta<D> {
    pub seq: SeqNo,
    pub delta: D,
}

/// Bounded buffer of outgoing changes
#[derive(Debug, Clone)]
pub struct DeltaBuffer<D> {
    /// Last sequence number handed out
    current_seq: SeqNo,
    /// Changes not yet acknowledged by every peer
    deltas: VecDeque<TaggedDelta<D>>,
    /// Maximum buffered changes before the oldest is evicted
    capacity: usize,
    /// Highest sequence number evicted before every peer acknowledged it
    evicted_through: SeqNo,
}

impl<D> DeltaBuffer<D> {
    pub fn new(capacity: usize) -> Self {
        Self {
            current_seq: 0,
            deltas: VecDeque::new(),
            capacity: capacity.max(1),
            evicted_through: 0,
        }
    }

    /// Add a change to the buffer, returning its sequence number
    pub fn push(&mut self, delta: D) -> SeqNo {
        self.current_seq += 1;
        self.deltas.push_back(TaggedDelta {
            seq: self.current_seq,
            delta,
        });

        while self.deltas.len() > self.capacity {
            if let Some(evicted) = self.deltas.pop_front() {
                self.evicted_through = evicted.seq;
                debug!(seq = evicted.seq, "evicted unacknowledged change");
            }
        }

        self.current_seq
    }

    /// Changes for a peer that has acked up to `acked_seq`
    pub fn deltas_since(&self, acked_seq: SeqNo) -> impl Iterator<Item = &TaggedDelta<D>> {
        self.deltas.iter().filter(move |td| td.seq > acked_seq)
    }

    /// Whether a peer at `acked_seq` missed changes that are no longer buffered
    pub fn needs_full_sync(&self, acked_seq: SeqNo) -> bool {
        acked_seq < self.evicted_through
    }

    /// Drop every change up to `acked_seq`; returns how many were removed
    pub fn ack(&mut self, acked_seq: SeqNo) -> usize {
        let initial_len = self.deltas.len();
        self.deltas.retain(|td| td.seq > acked_seq);
        initial_len - self.deltas.len()
    }

    pub fn current_seq(&self) -> SeqNo {
        self.current_seq
    }

    pub fn evicted_through(&self) -> SeqNo {
        self.evicted_through
    }

    /// Sequence number of the oldest buffered change
    pub fn oldest_seq(&self) -> Option<SeqNo> {
        self.deltas.front().map(|td| td.seq)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

/// Tracks acknowledgments from peers for garbage collection
#[derive(Debug, Clone, Default)]
pub struct AckTracker {
    /// Maps peer_id -> last acked sequence number
    acked: BTreeMap<ReplicaId, SeqNo>,
}

impl AckTracker {
    pub fn new() -> Self {
        Self {
            acked: BTreeMap::new(),
        }
    }

    /// Register a peer that already holds every change up to `acked`
    pub fn register_peer(&mut self, peer_id: ReplicaId, acked: SeqNo) {
        self.acked.entry(peer_id).or_insert(acked);
    }

    pub fn remove_peer(&mut self, peer_id: &str) -> Option<SeqNo> {
        self.acked.remove(peer_id)
    }

    pub fn contains(&self, peer_id: &str) -> bool {
        self.acked.contains_key(peer_id)
    }

    /// Raise the ack for a peer. Returns false for unknown peers.
    pub fn update_ack(&mut self, peer_id: &str, seq: SeqNo) -> bool {
        match self.acked.get_mut(peer_id) {
            Some(acked) => {
                *acked = (*acked).max(seq);
                true
            }
            None => false,
        }
    }

    /// Move a peer to `seq` after it installed a snapshot
    pub fn reset_ack(&mut self, peer_id: &str, seq: SeqNo) -> bool {
        match self.acked.get_mut(peer_id) {
            Some(acked) => {
                *acked = seq;
                true
            }
            None => false,
        }
    }

    pub fn get_ack(&self, peer_id: &str) -> Option<SeqNo> {
        self.acked.get(peer_id).copied()
    }

    /// Minimum acked sequence across all peers (safe to GC up to this)
    pub fn min_acked(&self) -> Option<SeqNo> {
        self.acked.values().copied().min()
    }

    pub fn peers(&self) -> impl Iterator<Item = &ReplicaId> {
        self.acked.keys()
    }
}

/// Outcome of checking an incoming change against what was already applied
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Replay {
    /// Next in sequence; apply it
    Apply,
    /// Already applied; drop it
    Duplicate,
    /// Changes in between were missed
    Gap { expected: SeqNo, got: SeqNo },
}

/// Per-origin record of the highest applied sequence number
///
/// Keeps a non-idempotent change from being applied twice when a frame is
/// redelivered.
#[derive(Debug, Clone, Default)]
pub struct ReplayGuard {
    applied: BTreeMap<ReplicaId, SeqNo>,
}

impl ReplayGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, origin: &str, seq: SeqNo) -> Replay {
        let last = self.last_applied(origin);
        if seq <= last {
            Replay::Duplicate
        } else if seq != last + 1 {
            Replay::Gap {
                expected: last + 1,
                got: seq,
            }
        } else {
            Replay::Apply
        }
    }

    /// Record `seq` from `origin` as applied
    pub fn record(&mut self, origin: &str, seq: SeqNo) {
        match self.applied.get_mut(origin) {
            Some(last) => *last = (*last).max(seq),
            None => {
                self.applied.insert(origin.to_string(), seq);
            }
        }
    }

    /// Restart tracking for `origin` at `seq`, e.g. after a snapshot
    pub fn reset(&mut self, origin: &str, seq: SeqNo) {
        if seq < self.last_applied(origin) {
            warn!(origin, seq, "replay position moved backwards");
        }
        self.applied.insert(origin.to_string(), seq);
    }

    pub fn last_applied(&self, origin: &str) -> SeqNo {
        self.applied.get(origin).copied().unwrap_or(0)
    }
}
