//! # sdx-store
//!
//! Store layer for the Sardonyx data store.
//!
//! This crate provides:
//! - [`MemoryRegion`], an in-memory [`Region`](sdx_core::Region) with a
//!   replication outbox
//! - Origin/replica replication endpoints with sequenced frames and snapshots
//! - The binary format of replicated changes
//! - String command entry points with missing-key semantics
//!
//! ## Example
//!
//! ```rust
//! use sdx_store::{strings, MemoryRegion, RegionConfigBuilder, ReplicationFrame};
//!
//! let primary = MemoryRegion::new(RegionConfigBuilder::new().replica_id("primary").build());
//! let replica = MemoryRegion::new(RegionConfigBuilder::new().replica_id("replica").build());
//! replica.install_snapshot(primary.register_peer("replica"));
//!
//! strings::set(&primary, b"greeting", b"hello").unwrap();
//! strings::append(&primary, b"greeting", b" world").unwrap();
//!
//! for frame in primary.pending_for("replica").unwrap() {
//!     let bytes = frame.encode();
//!     replica.receive(&ReplicationFrame::decode(&bytes).unwrap()).unwrap();
//!     primary.acknowledge("replica", frame.seq).unwrap();
//! }
//!
//! assert_eq!(
//!     strings::get(&replica, b"greeting").unwrap(),
//!     Some(b"hello world".to_vec())
//! );
//! ```

pub mod change;
pub mod config;
pub mod error;
pub mod region;
pub mod strings;

pub use change::{ReplicationFrame, Snapshot, StoreChange};
pub use config::{RegionConfig, RegionConfigBuilder};
pub use error::{Result, StoreError};
pub use region::MemoryRegion;
