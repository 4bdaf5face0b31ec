//! Boundary with the key-value store that owns typed values.

use crate::delta::DeltaInfo;
use crate::error::DataError;
use crate::value::TypedValue;

/// The store a value command writes through.
///
/// Implementations serialize concurrent commands against the same key and
/// own replication and persistence. Value commands mutate their local copy
/// first and then call into the region, so a failed `put` or `commit_delta`
/// leaves that copy ahead of the replicas.
pub trait Region {
    type Error: From<DataError>;

    /// Copy of the value stored under `key`.
    fn get(&self, key: &[u8]) -> Option<TypedValue>;

    /// Replace the stored value wholesale.
    fn put(&self, key: &[u8], value: TypedValue) -> Result<(), Self::Error>;

    /// Apply `delta` to the stored value (materializing it if absent) and
    /// forward the delta for replication.
    fn commit_delta(&self, key: &[u8], delta: DeltaInfo) -> Result<(), Self::Error>;

    /// Run `f` while no other command on `key` is in flight.
    ///
    /// A command reads a copy of the value and writes the result back, so a
    /// region shared between threads must hold a per-key lock for the whole
    /// of `f`. `f` must not call back into `with_key_locked`. The default
    /// suits regions owned by a single thread.
    fn with_key_locked<T>(&self, key: &[u8], f: impl FnOnce() -> T) -> T {
        let _ = key;
        f()
    }
}
