//! Changes a region forwards to its peers, and their wire format.
//!
//! ```text
//! change:   [kind][key block][value | delta | -]
//! frame:    [origin block][seq varint][change]
//! snapshot: [origin block][seq varint][count varint]([key block][value])*
//! ```

use sdx_core::codec::limits::MAX_KEY_LEN;
use sdx_core::codec::{Reader, Writer};
use sdx_core::{DecodeError, DeltaInfo, TypedValue};
use sdx_delta::SeqNo;
use serde::{Deserialize, Serialize};

const MAX_ORIGIN_LEN: usize = 256;

/// A committed change to one key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreChange {
    /// The key now holds this whole value.
    Put { key: Vec<u8>, value: TypedValue },
    /// The key's value changed by this delta.
    Delta { key: Vec<u8>, delta: DeltaInfo },
    /// The key was removed.
    Remove { key: Vec<u8> },
}

impl StoreChange {
    pub fn key(&self) -> &[u8] {
        match self {
            StoreChange::Put { key, .. }
            | StoreChange::Delta { key, .. }
            | StoreChange::Remove { key } => key,
        }
    }

    fn kind_tag(&self) -> u8 {
        match self {
            StoreChange::Put { .. } => 0,
            StoreChange::Delta { .. } => 1,
            StoreChange::Remove { .. } => 2,
        }
    }

    pub fn serialize(&self, writer: &mut Writer) {
        writer.write_byte(self.kind_tag());
        writer.write_bytes_prefixed(self.key());
        match self {
            StoreChange::Put { value, .. } => value.serialize(writer),
            StoreChange::Delta { delta, .. } => delta.serialize(writer),
            StoreChange::Remove { .. } => {}
        }
    }

    pub fn deserialize(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let kind = reader.read_byte("change kind")?;
        let key = reader.read_bytes_prefixed(MAX_KEY_LEN, "key")?;
        match kind {
            0 => Ok(StoreChange::Put {
                key,
                value: TypedValue::deserialize(reader)?,
            }),
            1 => Ok(StoreChange::Delta {
                key,
                delta: DeltaInfo::deserialize(reader)?,
            }),
            2 => Ok(StoreChange::Remove { key }),
            _ => Err(DecodeError::UnknownChangeKind { kind }),
        }
    }
}

/// A change as sent to a peer, stamped with its origin and sequence number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationFrame {
    pub origin: String,
    pub seq: SeqNo,
    pub change: StoreChange,
}

impl ReplicationFrame {
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = Writer::new();
        writer.write_bytes_prefixed(self.origin.as_bytes());
        writer.write_varint(self.seq);
        self.change.serialize(&mut writer);
        writer.into_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(bytes);
        let origin = read_origin(&mut reader)?;
        let seq = reader.read_varint("seq")?;
        let change = StoreChange::deserialize(&mut reader)?;
        reader.finish("replication frame")?;
        Ok(Self { origin, seq, change })
    }
}

/// Every entry of a region as of sequence number `seq`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub origin: String,
    pub seq: SeqNo,
    pub entries: Vec<(Vec<u8>, TypedValue)>,
}

impl Snapshot {
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = Writer::new();
        writer.write_bytes_prefixed(self.origin.as_bytes());
        writer.write_varint(self.seq);
        writer.write_varint(self.entries.len() as u64);
        for (key, value) in &self.entries {
            writer.write_bytes_prefixed(key);
            value.serialize(&mut writer);
        }
        writer.into_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(bytes);
        let origin = read_origin(&mut reader)?;
        let seq = reader.read_varint("seq")?;
        let count = reader.read_varint("entry count")?;

        // Every entry takes at least three bytes, so a larger count is a lie
        if count > (reader.remaining_len() / 3) as u64 {
            return Err(DecodeError::LengthExceedsLimit {
                field: "entry count",
                len: count,
                max: reader.remaining_len() / 3,
            });
        }

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let key = reader.read_bytes_prefixed(MAX_KEY_LEN, "key")?;
            let value = TypedValue::deserialize(&mut reader)?;
            entries.push((key, value));
        }
        reader.finish("snapshot")?;
        Ok(Self {
            origin,
            seq,
            entries,
        })
    }
}

fn read_origin(reader: &mut Reader<'_>) -> Result<String, DecodeError> {
    let bytes = reader.read_bytes_prefixed(MAX_ORIGIN_LEN, "origin")?;
    String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { field: "origin" })
}
