use bytes::BufMut;
use cpxwire_value::Port;

use crate::error::{CodecError, Result};

/// Number of zero bytes needed to pad `len` up to a multiple of 4.
pub const fn padding_for(len: usize) -> usize {
    (4 - (len % 4)) % 4
}

/// Growable output buffer for the inline envelope bytes.
///
/// Positions handed out by [`offset`](Self::offset) are distances from the
/// buffer start, so they stay valid across reallocation and can be used with
/// [`patch_u32`](Self::patch_u32). Ports encountered while writing are
/// collected on the side in call order.
#[derive(Debug, Default)]
pub struct BufferWriter {
    buf: Vec<u8>,
    ports: Vec<Port>,
}

impl BufferWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with `capacity` bytes reserved up front.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut writer = Self::new();
        writer.ensure(capacity)?;
        Ok(writer)
    }

    /// Make room for at least `additional` more bytes past the cursor.
    pub fn ensure(&mut self, additional: usize) -> Result<()> {
        self.buf
            .try_reserve(additional)
            .map_err(|_| CodecError::AllocFailed {
                requested: self.buf.len().saturating_add(additional),
            })
    }

    /// Append bytes without padding.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<usize> {
        self.ensure(bytes.len())?;
        self.buf.put_slice(bytes);
        Ok(bytes.len())
    }

    /// Append bytes followed by zero padding to the next 4-byte boundary.
    pub fn write_padded(&mut self, bytes: &[u8]) -> Result<usize> {
        let padding = padding_for(bytes.len());
        self.ensure(bytes.len() + padding)?;
        self.buf.put_slice(bytes);
        self.buf.put_bytes(0, padding);
        Ok(bytes.len() + padding)
    }

    pub fn write_u32(&mut self, value: u32) -> Result<usize> {
        self.ensure(4)?;
        self.buf.put_u32_ne(value);
        Ok(4)
    }

    pub fn write_u64(&mut self, value: u64) -> Result<usize> {
        self.ensure(8)?;
        self.buf.put_u64_ne(value);
        Ok(8)
    }

    pub fn write_i64(&mut self, value: i64) -> Result<usize> {
        self.ensure(8)?;
        self.buf.put_i64_ne(value);
        Ok(8)
    }

    pub fn write_f64(&mut self, value: f64) -> Result<usize> {
        self.ensure(8)?;
        self.buf.put_f64_ne(value);
        Ok(8)
    }

    /// Append `s` as a NUL-terminated, padded C string.
    pub fn write_string(&mut self, s: &str) -> Result<usize> {
        if s.as_bytes().contains(&0) {
            return Err(CodecError::InteriorNul {
                offset: self.offset(),
            });
        }
        let len = s.len() + 1;
        let padding = padding_for(len);
        self.ensure(len + padding)?;
        self.buf.put_slice(s.as_bytes());
        self.buf.put_bytes(0, 1 + padding);
        Ok(len + padding)
    }

    /// Record a port for the out-of-band descriptor list.
    pub fn collect_port(&mut self, port: Port) -> Result<()> {
        self.ports
            .try_reserve(1)
            .map_err(|_| CodecError::AllocFailed {
                requested: (self.ports.len() + 1) * std::mem::size_of::<Port>(),
            })?;
        self.ports.push(port);
        Ok(())
    }

    /// Current cursor as a distance from the buffer start.
    pub fn offset(&self) -> usize {
        self.buf.len()
    }

    /// Overwrite 4 bytes at an earlier offset.
    pub fn patch_u32(&mut self, offset: usize, value: u32) -> Result<()> {
        let len = self.buf.len();
        let slot = offset
            .checked_add(4)
            .and_then(|end| self.buf.get_mut(offset..end))
            .ok_or(CodecError::OutOfBounds {
                offset,
                needed: 4,
                remaining: len.saturating_sub(offset),
            })?;
        slot.copy_from_slice(&value.to_ne_bytes());
        Ok(())
    }

    /// Bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Ports collected so far, in collection order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Consume the writer, returning the inline bytes and collected ports.
    pub fn into_parts(self) -> (Vec<u8>, Vec<Port>) {
        (self.buf, self.ports)
    }
}
