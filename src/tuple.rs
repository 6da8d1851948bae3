//! Tuple data (`'D'` message payload) codec: pack and parse a data row's
//! attribute vector.
//!
//! Wire shape: `u16 n_attrs, { u32 size, u8[size] value | u32 0xFFFFFFFF }^n`.

use crate::constants::{MAX_ATTR_COUNT, MAX_ATTR_SIZE, NULL_SENTINEL};
use crate::endian::{get_u16, get_u32, put_u32};
use crate::error::{Error, Overflow, Result};
use crate::type_tag::TypeTag;
use bytes::{Bytes, BytesMut};

/// A single column value: `None` represents SQL NULL (the wire's
/// `0xFFFFFFFF` sentinel); `Some` carries the raw value bytes.
pub type Attribute = Option<Bytes>;

/// Serialize an ordered row of attributes into a tuple-data payload
/// (without the leading message type/length frame).
///
/// Empty input yields an empty byte string. Fails with `Overflow` if any
/// attribute is larger than `0xFFFFFFFE` bytes.
pub fn pack_row(row: &[Attribute]) -> Result<Bytes> {
    if row.is_empty() {
        return Ok(Bytes::new());
    }

    if row.len() > MAX_ATTR_COUNT {
        return Err(Error::Overflow(Overflow::AttributeCount { count: row.len() }));
    }

    let mut size = 0usize;
    for (index, attr) in row.iter().enumerate() {
        size += 4;
        if let Some(value) = attr {
            if value.len() as u64 > MAX_ATTR_SIZE as u64 {
                return Err(Error::Overflow(Overflow::AttributeSize { attribute: index }));
            }
            size += value.len();
        }
    }

    let mut buf = BytesMut::with_capacity(size);
    buf.resize(size, 0);
    let mut pos = 0;

    for attr in row {
        match attr {
            None => {
                put_u32(&mut buf[pos..pos + 4], NULL_SENTINEL);
                pos += 4;
            }
            Some(value) => {
                put_u32(&mut buf[pos..pos + 4], value.len() as u32);
                pos += 4;
                buf[pos..pos + value.len()].copy_from_slice(value);
                pos += value.len();
            }
        }
    }

    Ok(buf.freeze())
}

/// Parse a tuple-data payload into its ordered attribute vector.
///
/// `data` begins with a 16-bit big-endian attribute count, followed by
/// that many length-prefixed fields.
pub fn parse_row(data: &[u8]) -> Result<Vec<Attribute>> {
    if data.len() < 2 {
        return Err(Error::TruncatedHeader {
            available: data.len(),
        });
    }

    let natts = get_u16(&data[0..2]);
    let mut attrs = Vec::with_capacity(natts as usize);
    let mut data = &data[2..];

    for attribute in 0..natts {
        if data.len() < 4 {
            return Err(Error::TruncatedAttrSize {
                attribute,
                needed: 4,
                available: data.len(),
            });
        }

        let size = get_u32(&data[0..4]);
        data = &data[4..];

        if size == NULL_SENTINEL {
            attrs.push(None);
            continue;
        }

        let size = size as usize;
        if size > data.len() {
            return Err(Error::InvalidAttrSize {
                attribute,
                size: size as u32,
            });
        }

        attrs.push(Some(Bytes::copy_from_slice(&data[..size])));
        data = &data[size..];
    }

    if !data.is_empty() {
        return Err(Error::TrailingBytes {
            remaining: data.len(),
        });
    }

    Ok(attrs)
}

/// Given an ordered sequence of `(type_tag, payload)` pairs (as yielded by
/// [`crate::stream_buffer::MessageStreamBuffer`]), decode every leading
/// `DataRow` pair into its attribute vector, stopping at the first pair
/// whose tag is not `DataRow`.
pub fn consume_tuple_messages(messages: &[(TypeTag, Bytes)]) -> Result<Vec<Vec<Attribute>>> {
    let mut rows = Vec::new();

    for (tag, payload) in messages {
        if *tag != TypeTag::DataRow {
            break;
        }

        rows.push(parse_row(payload)?);
    }

    Ok(rows)
}
