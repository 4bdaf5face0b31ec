// File: `crates/sdx-core/src/lib.rs`
//! Typed values for the Sardonyx data store.
//!
//! Each key holds a [`TypedValue`]. A value mutates through protocol commands
//! and, where a mutation is small relative to the value, describes the change
//! as a [`DeltaInfo`] so replicas never receive the whole value again:
//!
//! ```text
//! command ──► StringValue::append ──► Region::commit_delta(key, Append(bytes))
//!         └─► StringValue::incr   ──► Region::put(key, full value)
//! ```
//!
//! On the receiving side the same delta is decoded with [`codec`] and replayed
//! through [`TypedValue::apply_delta`], or materializes a new value when the
//! key is absent.

pub mod codec;
pub mod data;
pub mod data_type;
pub mod delta;
pub mod error;
pub mod payload;
pub mod region;
pub mod string;
pub mod value;

pub use data::TypedData;
pub use data_type::{ensure_type, DataType};
pub use delta::{AppendDelta, DeltaInfo, DeltaKind};
pub use error::{DataError, DecodeError, Result};
pub use payload::RawPayload;
pub use region::Region;
pub use string::StringValue;
pub use value::TypedValue;
