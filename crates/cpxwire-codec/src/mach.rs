//! Kernel message layout.
//!
//! A kernel port message is a fixed header, optionally followed by a body and
//! an array of descriptors (when the COMPLEX bit is set), followed by the
//! inline payload:
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────────────┬────────────────┐
//! │ Header (24B) │ Body (4B)    │ Descriptors          │ Inline payload │
//! │              │ count        │ count × 12B (ports)  │ CPX@ envelope  │
//! └──────────────┴──────────────┴──────────────────────┴────────────────┘
//!                 └──────── only when bits & COMPLEX ────┘
//! ```
//!
//! All fields are native-endian and 4-byte packed, matching the 64-bit
//! platform ABI.

use bytes::{Buf, BufMut};
use cpxwire_value::Port;

use crate::error::{CodecError, Result};

/// Header size: bits + size + remote + local + voucher + id.
pub const HEADER_SIZE: usize = 24;

/// Complex-message body: the descriptor count.
pub const BODY_SIZE: usize = 4;

/// Inline port descriptor size.
pub const PORT_DESCRIPTOR_SIZE: usize = 12;

/// Out-of-line memory descriptor size.
pub const OOL_DESCRIPTOR_SIZE: usize = 16;

/// Out-of-line ports descriptor size.
pub const OOL_PORTS_DESCRIPTOR_SIZE: usize = 16;

/// Every descriptor shape keeps its type in the byte at this offset.
pub const DESCRIPTOR_TYPE_OFFSET: usize = 11;

/// The message carries a body and descriptors.
pub const MACH_MSGH_BITS_COMPLEX: u32 = 0x8000_0000;
pub const MACH_MSGH_BITS_REMOTE_MASK: u32 = 0x0000_001f;
pub const MACH_MSGH_BITS_LOCAL_MASK: u32 = 0x0000_1f00;

pub const MACH_MSG_PORT_DESCRIPTOR: u8 = 0;
pub const MACH_MSG_OOL_DESCRIPTOR: u8 = 1;
pub const MACH_MSG_OOL_PORTS_DESCRIPTOR: u8 = 2;
pub const MACH_MSG_OOL_VOLATILE_DESCRIPTOR: u8 = 3;

/// Combine remote and local dispositions into header bits.
pub const fn msgh_bits(remote: u8, local: u8) -> u32 {
    (remote as u32 & MACH_MSGH_BITS_REMOTE_MASK)
        | ((local as u32) << 8 & MACH_MSGH_BITS_LOCAL_MASK)
}

/// Remote port disposition stored in header bits.
pub const fn msgh_bits_remote(bits: u32) -> u8 {
    (bits & MACH_MSGH_BITS_REMOTE_MASK) as u8
}

/// Local port disposition stored in header bits.
pub const fn msgh_bits_local(bits: u32) -> u8 {
    ((bits & MACH_MSGH_BITS_LOCAL_MASK) >> 8) as u8
}

/// The fixed kernel message header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MachHeader {
    pub bits: u32,
    /// Total message size in bytes, header included.
    pub size: u32,
    pub remote_port: u32,
    pub local_port: u32,
    pub voucher_port: u32,
    pub id: i32,
}

impl MachHeader {
    /// Parse the header at the start of `buf`.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let mut src = buf.get(..HEADER_SIZE).ok_or(CodecError::OutOfBounds {
            offset: 0,
            needed: HEADER_SIZE,
            remaining: buf.len(),
        })?;
        Ok(Self {
            bits: src.get_u32_ne(),
            size: src.get_u32_ne(),
            remote_port: src.get_u32_ne(),
            local_port: src.get_u32_ne(),
            voucher_port: src.get_u32_ne(),
            id: src.get_i32_ne(),
        })
    }

    pub fn write_to<B: BufMut>(&self, dst: &mut B) {
        dst.put_u32_ne(self.bits);
        dst.put_u32_ne(self.size);
        dst.put_u32_ne(self.remote_port);
        dst.put_u32_ne(self.local_port);
        dst.put_u32_ne(self.voucher_port);
        dst.put_i32_ne(self.id);
    }

    pub fn is_complex(&self) -> bool {
        self.bits & MACH_MSGH_BITS_COMPLEX != 0
    }

    /// The remote port with the disposition recorded in the header bits.
    pub fn remote(&self) -> Port {
        Port::new(self.remote_port, msgh_bits_remote(self.bits))
    }

    /// The local port with the disposition recorded in the header bits.
    pub fn local(&self) -> Port {
        Port::new(self.local_port, msgh_bits_local(self.bits))
    }
}

/// An inline port descriptor.
///
/// Layout: `name u32 | pad u32 | pad u16 | disposition u8 | type u8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortDescriptor {
    pub name: u32,
    pub disposition: u8,
}

impl PortDescriptor {
    pub fn parse(raw: &[u8; PORT_DESCRIPTOR_SIZE]) -> Self {
        let mut src = &raw[..];
        let name = src.get_u32_ne();
        src.advance(6);
        Self {
            name,
            disposition: src.get_u8(),
        }
    }

    pub fn write_to<B: BufMut>(&self, dst: &mut B) {
        dst.put_u32_ne(self.name);
        dst.put_u32_ne(0);
        dst.put_u16_ne(0);
        dst.put_u8(self.disposition);
        dst.put_u8(MACH_MSG_PORT_DESCRIPTOR);
    }
}

impl From<Port> for PortDescriptor {
    fn from(port: Port) -> Self {
        Self {
            name: port.name,
            disposition: port.disposition,
        }
    }
}

impl From<PortDescriptor> for Port {
    fn from(descriptor: PortDescriptor) -> Self {
        Port::new(descriptor.name, descriptor.disposition)
    }
}

/// Human-readable name for a descriptor type.
pub fn descriptor_name(descriptor_type: u8) -> &'static str {
    match descriptor_type {
        MACH_MSG_PORT_DESCRIPTOR => "PORT",
        MACH_MSG_OOL_DESCRIPTOR => "OOL",
        MACH_MSG_OOL_PORTS_DESCRIPTOR => "OOL_PORTS",
        MACH_MSG_OOL_VOLATILE_DESCRIPTOR => "OOL_VOLATILE",
        _ => "UNKNOWN",
    }
}

/// An encoded kernel message: header, optional descriptors, inline payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachMessage {
    buf: Vec<u8>,
}

impl MachMessage {
    /// Wrap raw message bytes as received from the kernel.
    pub fn from_bytes(buf: impl Into<Vec<u8>>) -> Self {
        Self { buf: buf.into() }
    }

    /// Parse the header.
    pub fn header(&self) -> Result<MachHeader> {
        MachHeader::parse(&self.buf)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl AsRef<[u8]> for MachMessage {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}
