//! Typed value tree for CPX@ IPC messages.
//!
//! A message content is a [`Dictionary`] of [`Value`]s. Every value variant
//! carries a stable on-wire tag ([`ValueType`]); port-carrying variants hold
//! a [`Port`] that travels out-of-band from the inline bytes.
//!
//! This crate only models the tree. Encoding and decoding live in
//! `cpxwire-codec`.

pub mod array;
pub mod dictionary;
pub mod message;
pub mod port;
pub mod types;
pub mod value;

pub use array::Array;
pub use dictionary::Dictionary;
pub use message::{Message, CONNECTION_INTERRUPTED_ERROR, MSGID_CONNECTION_INTERRUPTED};
pub use port::Port;
pub use types::ValueType;
pub use value::Value;
