//! Key types of the command protocol and their wire tags.

use crate::error::{DataError, DecodeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of value stored under a key.
///
/// Every protocol type owns a fixed tag byte so serialized values stay
/// readable across nodes. Only [`DataType::String`] currently has a value
/// implementation; the remaining tags are reserved for the sibling kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataType {
    String,
    Hash,
    Set,
    SortedSet,
    List,
}

impl DataType {
    /// Wire tag for this type.
    pub fn tag(self) -> u8 {
        match self {
            DataType::String => 0,
            DataType::Hash => 1,
            DataType::Set => 2,
            DataType::SortedSet => 3,
            DataType::List => 4,
        }
    }

    /// Inverse of [`DataType::tag`].
    pub fn from_tag(tag: u8) -> std::result::Result<Self, DecodeError> {
        match tag {
            0 => Ok(DataType::String),
            1 => Ok(DataType::Hash),
            2 => Ok(DataType::Set),
            3 => Ok(DataType::SortedSet),
            4 => Ok(DataType::List),
            _ => Err(DecodeError::UnknownDataType { tag }),
        }
    }

    /// The name the protocol's `TYPE` command replies with.
    pub fn name(self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Hash => "hash",
            DataType::Set => "set",
            DataType::SortedSet => "zset",
            DataType::List => "list",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fail with [`DataError::TypeMismatch`] unless `found` is `expected`.
pub fn ensure_type(expected: DataType, found: DataType) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(DataError::TypeMismatch { expected, found })
    }
}
