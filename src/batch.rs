//! Outgoing batch serializer: join a run of heterogeneous outbound
//! messages into a single contiguous buffer.
//!
//! The point of batching is to avoid allocating (and copying into) one
//! `Bytes` per message when many adjacent messages share a shape: a run of
//! raw COPY data lines, or a run of tuple (`'D'`) rows, gets its total size
//! computed up front and its buffer grown once, rather than once per
//! message.

use crate::constants::{DATA_ROW_TYPE, MAX_ATTR_COUNT, NULL_SENTINEL};
use crate::endian::put_u32;
use crate::error::{Error, Overflow, Result};
use crate::tuple::Attribute;
use bytes::{Bytes, BytesMut};
use std::convert::TryInto;

/// Any message type that knows how to serialize its own payload and, when
/// it has one, the wire byte that identifies it.
///
/// `type_byte` returns `None` for the rare message with no type byte at
/// all (e.g. the startup message, which precedes protocol negotiation).
pub trait OutboundMessage {
    fn type_byte(&self) -> Option<u8>;
    fn serialize(&self) -> Bytes;
}

/// One entry in a batch passed to [`cat_messages`].
pub enum BatchElement {
    /// Raw COPY data; framed as a `'d'` message carrying `bytes` verbatim.
    Raw(Bytes),
    /// A data row; framed as a `'D'` message via [`crate::tuple::pack_row`]'s
    /// wire shape.
    Tuple(Vec<Attribute>),
    /// Any other outbound message, serialized through the trait.
    Message(Box<dyn OutboundMessage>),
}

/// Serialize every element of `elements`, in order, into one contiguous
/// buffer ready to be written to the wire.
///
/// Adjacent `Raw` elements and adjacent `Tuple` elements are each batched
/// into a single allocation sized for the whole run before any bytes are
/// copied; `Message` elements are serialized one at a time since nothing
/// can be assumed about their relative sizes.
pub fn cat_messages(elements: &[BatchElement]) -> Result<Bytes> {
    if elements.is_empty() {
        return Ok(Bytes::new());
    }

    let mut buf = BytesMut::new();
    let mut index = 0;

    while index < elements.len() {
        match &elements[index] {
            BatchElement::Raw(_) => index = append_raw_run(&mut buf, elements, index)?,
            BatchElement::Tuple(_) => index = append_tuple_run(&mut buf, elements, index)?,
            BatchElement::Message(message) => {
                append_message(&mut buf, message.as_ref())?;
                index += 1;
            }
        }
    }

    Ok(buf.freeze())
}

fn append_raw_run(buf: &mut BytesMut, elements: &[BatchElement], start: usize) -> Result<usize> {
    let mut end = start;
    let mut run_size: usize = 0;

    while let Some(BatchElement::Raw(bytes)) = elements.get(end) {
        run_size = run_size
            .checked_add(5 + bytes.len())
            .ok_or(Error::Overflow(Overflow::MessageSize))?;
        end += 1;
    }

    buf.reserve(run_size);

    for element in &elements[start..end] {
        let bytes = match element {
            BatchElement::Raw(bytes) => bytes,
            _ => unreachable!("run was scanned for Raw elements only"),
        };

        let msg_length: u32 = (bytes.len() as u64 + 4)
            .try_into()
            .map_err(|_| Error::Overflow(Overflow::MessageSize))?;

        buf.extend_from_slice(&[b'd']);
        let mut length_bytes = [0u8; 4];
        put_u32(&mut length_bytes, msg_length);
        buf.extend_from_slice(&length_bytes);
        buf.extend_from_slice(bytes);
    }

    Ok(end)
}

fn append_tuple_run(buf: &mut BytesMut, elements: &[BatchElement], start: usize) -> Result<usize> {
    let mut end = start;
    let mut run_size: usize = 0;

    while let Some(BatchElement::Tuple(row)) = elements.get(end) {
        if row.len() > MAX_ATTR_COUNT {
            return Err(Error::Overflow(Overflow::AttributeCount { count: row.len() }));
        }

        run_size = run_size
            .checked_add(7 + row.len() * 4)
            .ok_or(Error::Overflow(Overflow::MessageSize))?;
        for attr in row {
            if let Some(value) = attr {
                run_size = run_size
                    .checked_add(value.len())
                    .ok_or(Error::Overflow(Overflow::MessageSize))?;
            }
        }

        end += 1;
    }

    buf.reserve(run_size);

    for element in &elements[start..end] {
        let row = match element {
            BatchElement::Tuple(row) => row,
            _ => unreachable!("run was scanned for Tuple elements only"),
        };

        let mut msg_length: u64 = 4 + 2 + (row.len() as u64 * 4);
        for attr in row {
            if let Some(value) = attr {
                msg_length += value.len() as u64;
            }
        }
        let msg_length: u32 = msg_length
            .try_into()
            .map_err(|_| Error::Overflow(Overflow::MessageSize))?;

        buf.extend_from_slice(&[DATA_ROW_TYPE]);
        let mut header = [0u8; 4];
        put_u32(&mut header, msg_length);
        buf.extend_from_slice(&header);

        let natts = row.len() as u16;
        buf.extend_from_slice(&natts.to_be_bytes());

        for attr in row {
            match attr {
                None => {
                    let mut sentinel = [0u8; 4];
                    put_u32(&mut sentinel, NULL_SENTINEL);
                    buf.extend_from_slice(&sentinel);
                }
                Some(value) => {
                    let mut size = [0u8; 4];
                    put_u32(&mut size, value.len() as u32);
                    buf.extend_from_slice(&size);
                    buf.extend_from_slice(value);
                }
            }
        }
    }

    Ok(end)
}

fn append_message(buf: &mut BytesMut, message: &dyn OutboundMessage) -> Result<()> {
    let serialized = message.serialize();
    let type_byte = message.type_byte();
    let type_len = if type_byte.is_some() { 1 } else { 0 };

    let msg_length: u32 = (serialized.len() as u64 + 4)
        .try_into()
        .map_err(|_| Error::Overflow(Overflow::MessageSize))?;

    buf.reserve(type_len + 4 + serialized.len());

    if let Some(byte) = type_byte {
        buf.extend_from_slice(&[byte]);
    }

    let mut length_bytes = [0u8; 4];
    put_u32(&mut length_bytes, msg_length);
    buf.extend_from_slice(&length_bytes);
    buf.extend_from_slice(&serialized);

    Ok(())
}
