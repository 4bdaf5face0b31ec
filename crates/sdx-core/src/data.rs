//! The base contract every value kind implements.
//!
//! A kind owns its state, knows its [`DataType`], can write and read its own
//! payload (the type tag is written by [`TypedValue`](crate::value::TypedValue)
//! dispatch, not by the kind), and can replay a [`DeltaInfo`] produced on
//! another node.

use crate::codec::{Reader, Writer};
use crate::data_type::DataType;
use crate::delta::DeltaInfo;
use crate::error::{DecodeError, Result};

pub trait TypedData: Clone + PartialEq + Sized {
    /// The immutable kind identifier.
    fn data_type(&self) -> DataType;

    /// Replay a delta on this value.
    ///
    /// Fails with `TypeMismatch` when the delta targets another kind.
    fn apply_delta(&mut self, delta: &DeltaInfo) -> Result<()>;

    /// Build a fresh value from the first delta seen for an absent key.
    fn from_delta(delta: &DeltaInfo) -> Result<Self>;

    /// Whether the owning store should drop the key once a mutation leaves
    /// this value empty.
    fn should_remove_on_delete(&self) -> bool;

    /// Write the kind-specific fields.
    fn write_payload(&self, writer: &mut Writer);

    /// Read the fields written by [`TypedData::write_payload`].
    fn read_payload(reader: &mut Reader<'_>) -> std::result::Result<Self, DecodeError>;
}
