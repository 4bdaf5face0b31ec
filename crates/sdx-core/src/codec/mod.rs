//! Binary codec for typed values and delta records.
//!
//! The layout is a flat, versionless concatenation:
//!
//! ```text
//! value: [data-type tag][kind payload]
//! delta: [delta kind   ][delta payload]
//! ```
//!
//! Variable-length payloads are written as a LEB128 length followed by the
//! raw bytes. Integers produced by `incr`/`decr` are never encoded
//! separately; they travel as the decimal text payload.

pub mod limits;
pub mod primitives;
mod value;

pub use primitives::{Reader, Writer};
pub use value::{decode_delta, decode_value, encode_delta, encode_value};
