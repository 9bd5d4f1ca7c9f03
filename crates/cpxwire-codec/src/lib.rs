//! Serializer/deserializer for CPX@ envelopes carried in kernel port messages.
//!
//! A message is encoded as:
//! - A kernel header, plus a body and one port descriptor per port when the
//!   content carries ports (the COMPLEX bit)
//! - An 8-byte magic `"CPX@"` + version 5
//! - The content dictionary as a tagged value record, 4-byte aligned
//!
//! Ports never appear inline. They are collected in pre-order while the
//! value tree is written and handed back out in the same order on decode.

pub mod codec;
pub mod config;
pub mod envelope;
pub mod error;
pub mod mach;
pub mod reader;
pub mod writer;

pub use codec::{
    deserialize_value, deserialize_value_with_config, serialize_array, serialize_dictionary,
    serialize_value,
};
pub use config::CodecConfig;
pub use envelope::{
    deserialize, deserialize_with_config, serialize, serialize_envelope, serialize_with_config,
    Decoded, ENVELOPE_VERSION, MAGIC,
};
pub use error::{CodecError, Result};
pub use mach::{MachHeader, MachMessage, HEADER_SIZE};
pub use reader::BufferReader;
pub use writer::BufferWriter;
