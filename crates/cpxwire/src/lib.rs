//! Codec for CPX@ envelopes exchanged over kernel port messages.
//!
//! # Crate Structure
//!
//! - [`value`]: the typed value tree, ports and messages
//! - [`codec`]: byte cursors, value records, kernel message layout and the
//!   envelope serializer/deserializer
//!
//! ```no_run
//! use cpxwire::codec::{deserialize, serialize};
//! use cpxwire::value::{Dictionary, Message, Port, Value};
//!
//! let mut content = Dictionary::new();
//! content.set("k", Value::from("v"));
//! let wire = serialize(&Message::new(Port::NULL, Port::NULL, 0, content))?;
//! let decoded = deserialize(wire.as_bytes())?.into_message()?;
//! assert_eq!(decoded.content.get("k").and_then(Value::as_str), Some("v"));
//! # Ok::<(), cpxwire::codec::CodecError>(())
//! ```

/// Re-export value tree types.
pub mod value {
    pub use cpxwire_value::*;
}

/// Re-export codec types.
pub mod codec {
    pub use cpxwire_codec::*;
}

pub use cpxwire_codec::{deserialize, serialize, CodecError, Decoded};
pub use cpxwire_value::{Array, Dictionary, Message, Port, Value};
