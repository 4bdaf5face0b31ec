//! Region configuration.

use sdx_core::codec::limits::MAX_PAYLOAD_LEN;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Configuration for a [`MemoryRegion`](crate::MemoryRegion).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Region name, used in logs.
    pub name: String,
    /// Identifier this region stamps on the changes it originates.
    pub replica_id: String,
    /// Committed changes kept for peers before the oldest is evicted.
    pub outbox_capacity: usize,
    /// Most frames handed to a peer per `pending_for` call; zero counts as one.
    pub max_batch_size: usize,
    /// Largest string payload a write may produce.
    pub max_payload_len: usize,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            replica_id: Ulid::new().to_string(),
            outbox_capacity: 1024,
            max_batch_size: 128,
            max_payload_len: MAX_PAYLOAD_LEN,
        }
    }
}

/// Builder for region configuration.
pub struct RegionConfigBuilder {
    config: RegionConfig,
}

impl RegionConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RegionConfig::default(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn replica_id(mut self, replica_id: impl Into<String>) -> Self {
        self.config.replica_id = replica_id.into();
        self
    }

    pub fn outbox_capacity(mut self, capacity: usize) -> Self {
        self.config.outbox_capacity = capacity;
        self
    }

    /// Clamped to at least one frame.
    pub fn max_batch_size(mut self, size: usize) -> Self {
        self.config.max_batch_size = size.max(1);
        self
    }

    pub fn max_payload_len(mut self, len: usize) -> Self {
        self.config.max_payload_len = len;
        self
    }

    pub fn build(self) -> RegionConfig {
        self.config
    }
}

impl Default for RegionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
