//! In-memory region: the key map plus its replication endpoints.
//!
//! A region is written to by value commands through the [`Region`] trait and
//! replicates every committed change to registered peers:
//!
//! ```text
//! put(k, v)           ──► entries[k] = v          ──► outbox: Put { k, v }
//! commit_delta(k, d)  ──► entries[k] ⊕= d         ──► outbox: Delta { k, d }
//! remove(k)           ──► entries.remove(k)       ──► outbox: Remove { k }
//! ```
//!
//! Replicas follow a single origin: `receive` replays that origin's frames in
//! sequence order and `install_snapshot` replaces the whole key map. Received
//! changes are not forwarded again.
//!
//! Commands on one key are serialized by a striped key lock held across the
//! command's read and write. Lock order is always key lock, then `entries`,
//! then `replication`, so the outbox sequence matches the order changes hit
//! the map.

use crate::change::{ReplicationFrame, Snapshot, StoreChange};
use crate::config::RegionConfig;
use crate::error::{Result, StoreError};
use parking_lot::{Mutex, RwLock};
use sdx_core::{DeltaInfo, Region, TypedValue};
use sdx_delta::{AckTracker, DeltaBuffer, Replay, ReplayGuard, SeqNo};
use std::collections::hash_map::{DefaultHasher, Entry};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use tracing::{debug, warn};

/// Number of key lock stripes. Keys hashing to the same stripe share a lock.
const KEY_LOCK_STRIPES: usize = 64;

#[derive(Debug)]
struct Replication {
    outbox: DeltaBuffer<StoreChange>,
    acks: AckTracker,
    replayed: ReplayGuard,
}

/// A key map holding typed values, with a replication outbox.
#[derive(Debug)]
pub struct MemoryRegion {
    config: RegionConfig,
    key_locks: Box<[Mutex<()>]>,
    entries: RwLock<HashMap<Vec<u8>, TypedValue>>,
    replication: Mutex<Replication>,
}

impl MemoryRegion {
    pub fn new(config: RegionConfig) -> Self {
        let outbox = DeltaBuffer::new(config.outbox_capacity);
        Self {
            config,
            key_locks: (0..KEY_LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
            entries: RwLock::new(HashMap::new()),
            replication: Mutex::new(Replication {
                outbox,
                acks: AckTracker::new(),
                replayed: ReplayGuard::new(),
            }),
        }
    }

    pub fn config(&self) -> &RegionConfig {
        &self.config
    }

    pub fn replica_id(&self) -> &str {
        &self.config.replica_id
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Sequence number of the last locally committed change.
    pub fn current_seq(&self) -> SeqNo {
        self.replication.lock().outbox.current_seq()
    }

    /// Number of committed changes not yet acknowledged by every peer.
    pub fn pending_len(&self) -> usize {
        self.replication.lock().outbox.len()
    }

    /// Remove `key`, replicating the removal.
    pub fn remove(&self, key: &[u8]) -> Option<TypedValue> {
        let _key_guard = self.key_lock(key).lock();
        self.remove_entry(key)
    }

    /// Remove `key` if its value is empty and its kind asks to be dropped
    /// when emptied. Returns whether the key was removed.
    pub fn remove_if_empty(&self, key: &[u8]) -> bool {
        let _key_guard = self.key_lock(key).lock();
        let droppable = self
            .entries
            .read()
            .get(key)
            .is_some_and(|value| payload_len(value) == 0 && value.should_remove_on_delete());
        droppable && self.remove_entry(key).is_some()
    }

    fn remove_entry(&self, key: &[u8]) -> Option<TypedValue> {
        let mut entries = self.entries.write();
        let removed = entries.remove(key)?;
        let seq = self
            .replication
            .lock()
            .outbox
            .push(StoreChange::Remove { key: key.to_vec() });
        debug!(region = %self.config.name, seq, "remove");
        Some(removed)
    }

    fn key_lock(&self, key: &[u8]) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.key_locks[hasher.finish() as usize % self.key_locks.len()]
    }

    // === Replication: origin side ===

    /// Register a peer. The returned snapshot brings it up to date; later
    /// changes arrive through [`MemoryRegion::pending_for`].
    pub fn register_peer(&self, peer_id: impl Into<String>) -> Snapshot {
        let entries = self.entries.read();
        let mut replication = self.replication.lock();
        let seq = replication.outbox.current_seq();
        let peer_id = peer_id.into();
        debug!(region = %self.config.name, peer = %peer_id, seq, "register peer");
        replication.acks.register_peer(peer_id, seq);
        self.snapshot_locked(&entries, seq)
    }

    /// Frames a peer has not acknowledged, oldest first, at most
    /// `max_batch_size` of them.
    pub fn pending_for(&self, peer_id: &str) -> Result<Vec<ReplicationFrame>> {
        let replication = self.replication.lock();
        let acked = replication
            .acks
            .get_ack(peer_id)
            .ok_or_else(|| StoreError::PeerNotFound(peer_id.to_string()))?;

        if replication.outbox.needs_full_sync(acked) {
            let evicted_through = replication.outbox.evicted_through();
            warn!(region = %self.config.name, peer = peer_id, acked, evicted_through, "peer fell behind the outbox");
            return Err(StoreError::ResyncRequired {
                peer: peer_id.to_string(),
                acked,
                evicted_through,
            });
        }

        Ok(replication
            .outbox
            .deltas_since(acked)
            .take(self.config.max_batch_size.max(1))
            .map(|td| ReplicationFrame {
                origin: self.config.replica_id.clone(),
                seq: td.seq,
                change: td.delta.clone(),
            })
            .collect())
    }

    /// Record that `peer_id` applied everything up to `seq` and drop changes
    /// every peer has. Returns how many changes were dropped.
    pub fn acknowledge(&self, peer_id: &str, seq: SeqNo) -> Result<usize> {
        let mut replication = self.replication.lock();
        if !replication.acks.update_ack(peer_id, seq) {
            return Err(StoreError::PeerNotFound(peer_id.to_string()));
        }
        let removed = match replication.acks.min_acked() {
            Some(min) => replication.outbox.ack(min),
            None => 0,
        };
        if removed > 0 {
            debug!(region = %self.config.name, peer = peer_id, seq, removed, "outbox gc");
        }
        Ok(removed)
    }

    /// Full snapshot for a peer that can no longer catch up from the outbox.
    pub fn resync(&self, peer_id: &str) -> Result<Snapshot> {
        let entries = self.entries.read();
        let mut replication = self.replication.lock();
        let seq = replication.outbox.current_seq();
        if !replication.acks.reset_ack(peer_id, seq) {
            return Err(StoreError::PeerNotFound(peer_id.to_string()));
        }
        if let Some(min) = replication.acks.min_acked() {
            replication.outbox.ack(min);
        }
        debug!(region = %self.config.name, peer = peer_id, seq, "full resync");
        Ok(self.snapshot_locked(&entries, seq))
    }

    /// Every entry as of the current sequence number.
    pub fn snapshot(&self) -> Snapshot {
        let entries = self.entries.read();
        let seq = self.replication.lock().outbox.current_seq();
        self.snapshot_locked(&entries, seq)
    }

    fn snapshot_locked(&self, entries: &HashMap<Vec<u8>, TypedValue>, seq: SeqNo) -> Snapshot {
        let mut entries: Vec<(Vec<u8>, TypedValue)> = entries
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Snapshot {
            origin: self.config.replica_id.clone(),
            seq,
            entries,
        }
    }

    // === Replication: replica side ===

    /// Replay a frame from the origin this region follows.
    ///
    /// Returns `Ok(false)` for a frame that was already applied.
    pub fn receive(&self, frame: &ReplicationFrame) -> Result<bool> {
        let mut entries = self.entries.write();
        let mut replication = self.replication.lock();

        match replication.replayed.check(&frame.origin, frame.seq) {
            Replay::Duplicate => {
                warn!(region = %self.config.name, origin = %frame.origin, seq = frame.seq, "duplicate frame dropped");
                return Ok(false);
            }
            Replay::Gap { expected, got } => {
                return Err(StoreError::ReplayGap {
                    origin: frame.origin.clone(),
                    expected,
                    got,
                });
            }
            Replay::Apply => {}
        }

        match &frame.change {
            StoreChange::Put { key, value } => {
                entries.insert(key.clone(), value.clone());
            }
            StoreChange::Delta { key, delta } => {
                apply_or_materialize(&mut entries, key, delta).inspect_err(|err| {
                    warn!(region = %self.config.name, origin = %frame.origin, seq = frame.seq, %err, "replayed delta rejected");
                })?;
            }
            StoreChange::Remove { key } => {
                entries.remove(key);
            }
        }
        replication.replayed.record(&frame.origin, frame.seq);
        debug!(region = %self.config.name, origin = %frame.origin, seq = frame.seq, "replayed change");
        Ok(true)
    }

    /// Replace every entry with the snapshot's and continue replay after it.
    pub fn install_snapshot(&self, snapshot: Snapshot) {
        let mut entries = self.entries.write();
        let mut replication = self.replication.lock();

        entries.clear();
        entries.extend(snapshot.entries);
        replication.replayed.reset(&snapshot.origin, snapshot.seq);
        debug!(region = %self.config.name, origin = %snapshot.origin, seq = snapshot.seq, keys = entries.len(), "installed snapshot");
    }

    fn check_payload_len(&self, len: usize) -> Result<()> {
        if len > self.config.max_payload_len {
            return Err(StoreError::PayloadTooLarge {
                len,
                max: self.config.max_payload_len,
            });
        }
        Ok(())
    }
}

impl Default for MemoryRegion {
    fn default() -> Self {
        Self::new(RegionConfig::default())
    }
}

impl Region for MemoryRegion {
    type Error = StoreError;

    fn get(&self, key: &[u8]) -> Option<TypedValue> {
        self.entries.read().get(key).cloned()
    }

    fn put(&self, key: &[u8], value: TypedValue) -> Result<()> {
        self.check_payload_len(payload_len(&value))?;

        let mut entries = self.entries.write();
        entries.insert(key.to_vec(), value.clone());
        let seq = self.replication.lock().outbox.push(StoreChange::Put {
            key: key.to_vec(),
            value,
        });
        debug!(region = %self.config.name, seq, "put");
        Ok(())
    }

    fn commit_delta(&self, key: &[u8], delta: DeltaInfo) -> Result<()> {
        let mut entries = self.entries.write();
        let current = entries.get(key).map_or(0, payload_len);
        self.check_payload_len(current + delta_len(&delta))?;

        apply_or_materialize(&mut entries, key, &delta).inspect_err(|err| {
            warn!(region = %self.config.name, %err, "delta rejected");
        })?;
        let seq = self.replication.lock().outbox.push(StoreChange::Delta {
            key: key.to_vec(),
            delta,
        });
        debug!(region = %self.config.name, seq, "commit delta");
        Ok(())
    }

    fn with_key_locked<T>(&self, key: &[u8], f: impl FnOnce() -> T) -> T {
        let _key_guard = self.key_lock(key).lock();
        f()
    }
}

/// Replay `delta` on the value under `key`, or build the value if absent.
fn apply_or_materialize(
    entries: &mut HashMap<Vec<u8>, TypedValue>,
    key: &[u8],
    delta: &DeltaInfo,
) -> Result<()> {
    match entries.entry(key.to_vec()) {
        Entry::Occupied(mut entry) => entry.get_mut().apply_delta(delta)?,
        Entry::Vacant(entry) => {
            entry.insert(TypedValue::from_delta(delta)?);
        }
    }
    Ok(())
}

fn payload_len(value: &TypedValue) -> usize {
    match value {
        TypedValue::String(s) => s.len(),
    }
}

fn delta_len(delta: &DeltaInfo) -> usize {
    match delta {
        DeltaInfo::Append(append) => append.bytes().len(),
    }
}
