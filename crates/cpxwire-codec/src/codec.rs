//! Value record encoding.
//!
//! Wire format of a value record:
//! ```text
//! ┌───────────┬──────────────────────────────────────────────┐
//! │ Tag (4B)  │ Payload (by tag)                             │
//! ├───────────┼──────────────────────────────────────────────┤
//! │ NULL      │ -                                            │
//! │ BOOL      │ u32 0/1                                      │
//! │ (U)INT64  │ 8 bytes                                      │
//! │ DOUBLE    │ 8 bytes                                      │
//! │ STRING    │ u32 len (incl. NUL) + padded NUL-terminated  │
//! │ DATA      │ u32 size + padded bytes                      │
//! │ UUID      │ 16 bytes                                     │
//! │ ARRAY     │ u32 byte size + u32 count + values           │
//! │ DICT      │ u32 byte size + u32 count + (key, value)*    │
//! │ ports     │ - (descriptor travels out-of-band)           │
//! └───────────┴──────────────────────────────────────────────┘
//! ```
//!
//! A container's byte size covers everything after the size field itself.

use bytes::Bytes;
use cpxwire_value::{Array, Dictionary, Value, ValueType};
use tracing::debug;
use uuid::Uuid;

use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::reader::BufferReader;
use crate::writer::BufferWriter;

/// Size of a UUID payload.
pub const UUID_SIZE: usize = 16;

/// Encode one value record. Returns the number of inline bytes written.
pub fn serialize_value(writer: &mut BufferWriter, value: &Value) -> Result<usize> {
    let mut written = writer.write_u32(value.value_type().tag())?;
    written += match value {
        Value::Null => 0,
        Value::Bool(v) => writer.write_u32(u32::from(*v))?,
        Value::Uint64(v) => writer.write_u64(*v)?,
        Value::Int64(v) => writer.write_i64(*v)?,
        Value::Double(v) => writer.write_f64(*v)?,
        Value::String(s) => {
            let len = wire_len("string", s.len() + 1)?;
            writer.write_u32(len)? + writer.write_string(s)?
        }
        Value::Data(data) => {
            let len = wire_len("data", data.len())?;
            writer.write_u32(len)? + writer.write_padded(data)?
        }
        Value::Uuid(uuid) => writer.write_raw(uuid.as_bytes())?,
        Value::Array(array) => serialize_array(writer, array)?,
        Value::Dictionary(dict) => serialize_dictionary(writer, dict)?,
        Value::Fd(port) | Value::SendPort(port) | Value::RecvPort(port) => {
            writer.collect_port(*port)?;
            0
        }
    };
    Ok(written)
}

/// Encode an array body (byte size, count, values).
///
/// Returns the payload size plus the 4-byte size field.
pub fn serialize_array(writer: &mut BufferWriter, array: &Array) -> Result<usize> {
    serialize_container(writer, array.len(), |writer| {
        for value in array {
            serialize_value(writer, value)?;
        }
        Ok(())
    })
}

/// Encode a dictionary body (byte size, count, key/value pairs).
///
/// Returns the payload size plus the 4-byte size field.
pub fn serialize_dictionary(writer: &mut BufferWriter, dict: &Dictionary) -> Result<usize> {
    serialize_container(writer, dict.len(), |writer| {
        for (key, value) in dict.iter() {
            writer.write_string(key)?;
            serialize_value(writer, value)?;
        }
        Ok(())
    })
}

fn serialize_container<F>(
    writer: &mut BufferWriter,
    count: usize,
    write_elements: F,
) -> Result<usize>
where
    F: FnOnce(&mut BufferWriter) -> Result<()>,
{
    let size_offset = writer.offset();
    writer.write_u32(0)?;
    let payload_start = writer.offset();

    writer.write_u32(wire_len("element count", count)?)?;
    write_elements(writer)?;

    let payload_size = writer.offset() - payload_start;
    writer.patch_u32(size_offset, wire_len("container", payload_size)?)?;
    Ok(payload_size + 4)
}

fn wire_len(what: &'static str, size: usize) -> Result<u32> {
    u32::try_from(size).map_err(|_| CodecError::TooLarge { what, size })
}

/// Decode one value record using the default configuration.
pub fn deserialize_value(reader: &mut BufferReader<'_>) -> Result<Value> {
    deserialize_value_with_config(reader, &CodecConfig::default())
}

/// Decode one value record.
///
/// Port values take the next port from the reader's descriptor list. A
/// partially decoded subtree is dropped before an error is returned.
pub fn deserialize_value_with_config(
    reader: &mut BufferReader<'_>,
    config: &CodecConfig,
) -> Result<Value> {
    ValueDecoder {
        reader,
        max_depth: config.max_depth,
    }
    .value(0)
}

struct ValueDecoder<'r, 'a> {
    reader: &'r mut BufferReader<'a>,
    max_depth: usize,
}

impl ValueDecoder<'_, '_> {
    fn value(&mut self, depth: usize) -> Result<Value> {
        let tag_offset = self.reader.offset();
        let tag = self.reader.read_u32()?;
        let ty = ValueType::try_from(tag).map_err(|tag| CodecError::UnknownTag {
            tag,
            offset: tag_offset,
        })?;

        let value = match ty {
            ValueType::Null => Value::Null,
            ValueType::Bool => Value::Bool(self.reader.read_u32()? != 0),
            ValueType::Uint64 => Value::Uint64(self.reader.read_u64()?),
            ValueType::Int64 => Value::Int64(self.reader.read_i64()?),
            ValueType::Double => Value::Double(self.reader.read_f64()?),
            ValueType::String => {
                // the length is recomputed from the terminator
                self.reader.read_u32()?;
                Value::String(self.reader.read_string()?.to_owned())
            }
            ValueType::Data => {
                let size = self.reader.read_u32()? as usize;
                Value::Data(Bytes::copy_from_slice(self.reader.read_padded(size)?))
            }
            ValueType::Uuid => Value::Uuid(Uuid::from_bytes(
                self.reader.read_array::<UUID_SIZE>()?,
            )),
            ValueType::Array => Value::Array(self.array(depth + 1)?),
            ValueType::Dictionary => Value::Dictionary(self.dictionary(depth + 1)?),
            ValueType::Fd => Value::Fd(self.reader.next_port()),
            ValueType::SendPort => Value::SendPort(self.reader.next_port()),
            ValueType::RecvPort => Value::RecvPort(self.reader.next_port()),
        };
        Ok(value)
    }

    fn array(&mut self, depth: usize) -> Result<Array> {
        let (count, byte_size, payload_start) = self.container_header(depth)?;
        let mut array = Array::with_capacity(self.capacity_hint(count));
        for _ in 0..count {
            array.push(self.value(depth)?);
        }
        self.check_size("array", byte_size, payload_start);
        Ok(array)
    }

    fn dictionary(&mut self, depth: usize) -> Result<Dictionary> {
        let (count, byte_size, payload_start) = self.container_header(depth)?;
        let mut dict = Dictionary::with_capacity(self.capacity_hint(count));
        for _ in 0..count {
            let key = self.reader.read_string()?.to_owned();
            let value = self.value(depth)?;
            dict.push(key, value);
        }
        self.check_size("dictionary", byte_size, payload_start);
        Ok(dict)
    }

    /// Read byte size and count. Returns (count, byte size, payload start).
    fn container_header(&mut self, depth: usize) -> Result<(usize, usize, usize)> {
        if depth > self.max_depth {
            return Err(CodecError::DepthExceeded {
                max: self.max_depth,
            });
        }
        let byte_size = self.reader.read_u32()? as usize;
        let payload_start = self.reader.offset();
        let count = self.reader.read_u32()? as usize;
        Ok((count, byte_size, payload_start))
    }

    // every element takes at least a 4-byte tag, so a count can never
    // legitimately exceed the bytes left
    fn capacity_hint(&self, count: usize) -> usize {
        count.min(self.reader.remaining() / 4)
    }

    fn check_size(&self, kind: &'static str, byte_size: usize, payload_start: usize) {
        let consumed = self.reader.offset() - payload_start;
        if consumed != byte_size {
            debug!(
                kind,
                declared = byte_size,
                consumed,
                "container byte size does not match payload"
            );
        }
    }
}
