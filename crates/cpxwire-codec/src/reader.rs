use bytes::Buf;
use cpxwire_value::Port;

use crate::error::{CodecError, Result};
use crate::writer::padding_for;

/// Bounded cursor over a received message.
///
/// The reader borrows the message bytes and never reads past their end;
/// every overrun is reported as [`CodecError::OutOfBounds`]. Offsets are
/// distances from the start of the message. Ports extracted from the
/// descriptor list are handed out in order by [`next_port`](Self::next_port).
#[derive(Debug)]
pub struct BufferReader<'a> {
    buf: &'a [u8],
    pos: usize,
    ports: Vec<Port>,
    next_port: usize,
}

impl<'a> BufferReader<'a> {
    /// Create a reader over `buf` positioned at `start`.
    pub fn new(buf: &'a [u8], start: usize) -> Self {
        Self {
            buf,
            pos: start.min(buf.len()),
            ports: Vec::new(),
            next_port: 0,
        }
    }

    /// Current cursor position.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Bytes left before the end of the message.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Borrow the next `len` bytes without advancing.
    pub fn peek(&self, len: usize) -> Result<&'a [u8]> {
        let buf = self.buf;
        self.pos
            .checked_add(len)
            .and_then(|end| buf.get(self.pos..end))
            .ok_or(CodecError::OutOfBounds {
                offset: self.pos,
                needed: len,
                remaining: self.remaining(),
            })
    }

    /// Consume the next `len` bytes.
    pub fn read_raw(&mut self, len: usize) -> Result<&'a [u8]> {
        let bytes = self.peek(len)?;
        self.pos += len;
        Ok(bytes)
    }

    /// Consume `len` bytes plus the padding that follows them.
    pub fn read_padded(&mut self, len: usize) -> Result<&'a [u8]> {
        let padded = len.checked_add(padding_for(len)).ok_or(CodecError::OutOfBounds {
            offset: self.pos,
            needed: len,
            remaining: self.remaining(),
        })?;
        let bytes = self.read_raw(padded)?;
        Ok(&bytes[..len])
    }

    /// Consume exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_raw(N)?);
        Ok(out)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let mut field = self.read_raw(4)?;
        Ok(field.get_u32_ne())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let mut field = self.read_raw(8)?;
        Ok(field.get_u64_ne())
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let mut field = self.read_raw(8)?;
        Ok(field.get_i64_ne())
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let mut field = self.read_raw(8)?;
        Ok(field.get_f64_ne())
    }

    /// Consume a NUL-terminated, padded string.
    ///
    /// The terminator must appear before the end of the message and the
    /// bytes before it must be UTF-8.
    pub fn read_string(&mut self) -> Result<&'a str> {
        let start = self.pos;
        let rest = &self.buf[start..];
        let nul = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or(CodecError::MalformedString {
                offset: start,
                reason: "missing NUL terminator",
            })?;
        let bytes = self.read_padded(nul + 1)?;
        std::str::from_utf8(&bytes[..nul]).map_err(|_| CodecError::MalformedString {
            offset: start,
            reason: "invalid UTF-8",
        })
    }

    /// Append a port extracted from a descriptor.
    pub fn push_port(&mut self, port: Port) {
        self.ports.push(port);
    }

    /// Hand out the next descriptor port, or the null port once exhausted.
    pub fn next_port(&mut self) -> Port {
        match self.ports.get(self.next_port) {
            Some(port) => {
                self.next_port += 1;
                *port
            }
            None => Port::NULL,
        }
    }

    /// All ports extracted from descriptors.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Number of ports not yet handed out.
    pub fn unclaimed_ports(&self) -> usize {
        self.ports.len() - self.next_port
    }
}
