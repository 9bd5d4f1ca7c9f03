//! The CPX@ envelope and its packaging into a kernel message.
//!
//! Inline payload format:
//! ```text
//! ┌───────────────────────┬────────────┬───────────┬───────────┬──────────┐
//! │ Magic (8B)            │ DICT tag   │ Byte size │ Count     │ Entries  │
//! │ "CPX@" 05 00 00 00    │ (4B)       │ (4B)      │ (4B)      │          │
//! └───────────────────────┴────────────┴───────────┴───────────┴──────────┘
//! ```

use bytes::BufMut;
use cpxwire_value::{Dictionary, Message, Value, ValueType, MSGID_CONNECTION_INTERRUPTED};
use tracing::{debug, trace, warn};

use crate::codec::{deserialize_value_with_config, serialize_dictionary};
use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::mach::{
    descriptor_name, msgh_bits, MachHeader, MachMessage, PortDescriptor, BODY_SIZE,
    DESCRIPTOR_TYPE_OFFSET, HEADER_SIZE, MACH_MSGH_BITS_COMPLEX, MACH_MSG_OOL_DESCRIPTOR,
    MACH_MSG_OOL_PORTS_DESCRIPTOR, MACH_MSG_PORT_DESCRIPTOR, OOL_DESCRIPTOR_SIZE,
    OOL_PORTS_DESCRIPTOR_SIZE, PORT_DESCRIPTOR_SIZE,
};
use crate::reader::BufferReader;
use crate::writer::BufferWriter;

/// Envelope magic: "CPX@" followed by version 5 (u32 little-endian).
pub const MAGIC: [u8; 8] = *b"CPX@\x05\x00\x00\x00";

/// Envelope format version carried in the magic.
pub const ENVELOPE_VERSION: u32 = 5;

/// Outcome of decoding a kernel message.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A regular message.
    Message(Message),
    /// The kernel reported that the connection was interrupted. The message
    /// carries the synthetic `{"error": "Connection interrupted"}` content.
    ConnectionInterrupted(Message),
}

impl Decoded {
    /// Borrow the message regardless of kind.
    pub fn message(&self) -> &Message {
        match self {
            Decoded::Message(msg) | Decoded::ConnectionInterrupted(msg) => msg,
        }
    }

    pub fn is_connection_interrupted(&self) -> bool {
        matches!(self, Decoded::ConnectionInterrupted(_))
    }

    /// Take the message, treating a connection interruption as an error.
    pub fn into_message(self) -> Result<Message> {
        match self {
            Decoded::Message(msg) => Ok(msg),
            Decoded::ConnectionInterrupted(_) => Err(CodecError::ConnectionInterrupted),
        }
    }
}

/// Encode the inline envelope for `content`.
///
/// The returned writer holds the envelope bytes and the ports collected from
/// the content, in pre-order.
pub fn serialize_envelope(content: &Dictionary, config: &CodecConfig) -> Result<BufferWriter> {
    let initial = content
        .len()
        .saturating_mul(config.bytes_per_entry_hint)
        .saturating_add(MAGIC.len() + 12)
        .min(config.max_message_size);
    let mut writer = BufferWriter::with_capacity(initial)?;

    writer.write_raw(&MAGIC)?;
    writer.write_u32(ValueType::Dictionary.tag())?;
    serialize_dictionary(&mut writer, content)?;
    Ok(writer)
}

/// Encode a message using the default configuration.
pub fn serialize(message: &Message) -> Result<MachMessage> {
    serialize_with_config(message, &CodecConfig::default())
}

/// Encode a message into a kernel message.
///
/// Messages that carry ports become complex: a body and one port descriptor
/// per collected port, in collection order, sit between the header and the
/// inline payload.
pub fn serialize_with_config(message: &Message, config: &CodecConfig) -> Result<MachMessage> {
    let (inline, ports) = serialize_envelope(&message.content, config)?.into_parts();

    let descriptors_size = if ports.is_empty() {
        0
    } else {
        ports
            .len()
            .checked_mul(PORT_DESCRIPTOR_SIZE)
            .and_then(|size| size.checked_add(BODY_SIZE))
            .ok_or(CodecError::TooLarge {
                what: "descriptor list",
                size: ports.len(),
            })?
    };
    let total = HEADER_SIZE
        .checked_add(descriptors_size)
        .and_then(|size| size.checked_add(inline.len()))
        .ok_or(CodecError::TooLarge {
            what: "message",
            size: usize::MAX,
        })?;
    let wire_size = u32::try_from(total)
        .ok()
        .filter(|_| total <= config.max_message_size)
        .ok_or(CodecError::TooLarge {
            what: "message",
            size: total,
        })?;

    let mut buf = Vec::new();
    buf.try_reserve_exact(total)
        .map_err(|_| CodecError::AllocFailed { requested: total })?;

    let mut bits = msgh_bits(
        message.remote_port.disposition,
        message.local_port.disposition,
    );
    if !ports.is_empty() {
        bits |= MACH_MSGH_BITS_COMPLEX;
    }
    MachHeader {
        bits,
        size: wire_size,
        remote_port: message.remote_port.name,
        local_port: message.local_port.name,
        voucher_port: 0,
        id: message.id,
    }
    .write_to(&mut buf);

    if !ports.is_empty() {
        // bounded by the u32 message size check above
        buf.put_u32_ne(ports.len() as u32);
        for port in &ports {
            PortDescriptor::from(*port).write_to(&mut buf);
        }
    }
    buf.put_slice(&inline);

    debug!(
        id = message.id,
        size = total,
        ports = ports.len(),
        "serialized message"
    );
    Ok(MachMessage::from_bytes(buf))
}

/// Decode a kernel message using the default configuration.
pub fn deserialize(wire: &[u8]) -> Result<Decoded> {
    deserialize_with_config(wire, &CodecConfig::default())
}

/// Decode a kernel message.
///
/// Only the first `header.size` bytes are considered; anything after them
/// (such as a receive trailer) is ignored.
pub fn deserialize_with_config(wire: &[u8], config: &CodecConfig) -> Result<Decoded> {
    let header = MachHeader::parse(wire)?;
    if header.id == MSGID_CONNECTION_INTERRUPTED {
        debug!(id = header.id, "connection interrupted");
        return Ok(Decoded::ConnectionInterrupted(
            Message::connection_interrupted(header.remote(), header.local()),
        ));
    }

    let end = header.size as usize;
    if end > config.max_message_size {
        return Err(CodecError::TooLarge {
            what: "message",
            size: end,
        });
    }
    if end < HEADER_SIZE || end > wire.len() {
        return Err(CodecError::OutOfBounds {
            offset: 0,
            needed: end.max(HEADER_SIZE),
            remaining: wire.len().min(end),
        });
    }

    let mut reader = BufferReader::new(&wire[..end], HEADER_SIZE);
    if header.is_complex() {
        read_descriptors(&mut reader)?;
    }

    let magic = reader.read_array::<8>()?;
    if magic != MAGIC {
        return Err(CodecError::BadEnvelope { found: magic });
    }

    let content = match deserialize_value_with_config(&mut reader, config)? {
        Value::Dictionary(dict) => dict,
        other => {
            return Err(CodecError::BadRootType {
                tag: other.value_type().tag(),
            })
        }
    };

    if reader.remaining() != 0 || reader.unclaimed_ports() != 0 {
        debug!(
            trailing = reader.remaining(),
            unclaimed_ports = reader.unclaimed_ports(),
            "message has unconsumed data"
        );
    }
    debug!(
        id = header.id,
        size = end,
        ports = reader.ports().len(),
        "deserialized message"
    );

    Ok(Decoded::Message(Message::new(
        header.remote(),
        header.local(),
        header.id,
        content,
    )))
}

fn read_descriptors(reader: &mut BufferReader<'_>) -> Result<()> {
    let count = reader.read_u32()?;
    for index in 0..count {
        let descriptor_type = reader.peek(DESCRIPTOR_TYPE_OFFSET + 1)?[DESCRIPTOR_TYPE_OFFSET];
        match descriptor_type {
            MACH_MSG_PORT_DESCRIPTOR => {
                let raw = reader.read_array::<PORT_DESCRIPTOR_SIZE>()?;
                let descriptor = PortDescriptor::parse(&raw);
                trace!(
                    index,
                    name = descriptor.name,
                    disposition = descriptor.disposition,
                    "port descriptor"
                );
                reader.push_port(descriptor.into());
            }
            MACH_MSG_OOL_DESCRIPTOR => {
                reader.read_raw(OOL_DESCRIPTOR_SIZE)?;
                warn!(index, "ignoring out-of-line memory descriptor");
            }
            MACH_MSG_OOL_PORTS_DESCRIPTOR => {
                reader.read_raw(OOL_PORTS_DESCRIPTOR_SIZE)?;
                warn!(index, "ignoring out-of-line ports descriptor");
            }
            other => {
                debug!(
                    index,
                    descriptor = descriptor_name(other),
                    "unsupported descriptor"
                );
                return Err(CodecError::UnknownDescriptor {
                    descriptor_type: other,
                });
            }
        }
    }
    Ok(())
}
