//! Channel-record decoding.
//!
//! A payload is a flat sequence of `(channel id, channel type, data)` records.
//! The codec follows a layered structure:
//! - `layout`: ids, types, widths and ports (source of truth)
//! - `reader`: cursor with bounds-checked reads and byte-order conventions
//! - `value`: raw bytes to physical values (scaling, BCD, flags, hex)
//! - `table`: declarative channel definitions and profile lookup
//! - `parser`: the decode loop (no direct byte indexing)
//! - `error`: in-band decode errors
//!
//! Decoding is pure and contains no I/O. Errors never abort the caller: they
//! are carried in the returned [`DecodedPayload`](crate::DecodedPayload).

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod table;
pub mod value;

pub use error::{DecodeError, PortMismatch};
pub use parser::{decode, decode_channels};
pub use table::{Channel, ChannelDef, Profile, Scalar, SystemChannel, ValueKind};
pub use value::FieldValue;
