//! Chunked message stream buffer.
//!
//! Accepts arbitrary-size byte chunks as they arrive from a socket reader,
//! identifies framed messages incrementally, and hands them out one at a
//! time without ever concatenating the whole stream into one buffer.
//!
//! The chunk list is a `VecDeque<Bytes>` plus a read cursor
//! `(chunk_index, byte_offset)`. Consumed chunks are dropped from the
//! front of the deque as the cursor passes through them.

use crate::constants::{HEADER_LEN, LENGTH_FIELD_LEN};
use crate::endian::get_u32;
use crate::error::{Error, Result};
use crate::type_tag::{message_type_of, TypeTag};
use bytes::Bytes;
use std::collections::VecDeque;

/// A message as handed back to the caller: its type tag and opaque payload.
pub type Message = (TypeTag, Bytes);

#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    /// Index into `chunks`, 0 being the front (oldest unconsumed chunk).
    chunk: usize,
    /// Byte offset within that chunk.
    offset: usize,
}

/// Buffers pushed byte chunks and yields complete framed messages.
///
/// See the crate-level wire format: `u8 type, u32 length_including_self,
/// u8[length-4] payload`.
#[derive(Debug, Default)]
pub struct MessageStreamBuffer {
    chunks: VecDeque<Bytes>,
    position: Cursor,
}

impl MessageStreamBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of bytes to the tail of the buffer. Empty input is a
    /// no-op; no list node is created for it.
    pub fn write(&mut self, data: Bytes) {
        if data.is_empty() {
            return;
        }

        self.chunks.push_back(data);
    }

    /// Discard all buffered data and reset the read position.
    pub fn truncate(&mut self) {
        self.chunks.clear();
        self.position = Cursor::default();
    }

    /// Whether a complete framed message is available from the current
    /// read position.
    pub fn has_message(&self) -> Result<bool> {
        let cursor = self.position;

        let header = match self.peek(cursor, HEADER_LEN) {
            Some(header) => header,
            None => return Ok(false),
        };

        let payload_len = decode_payload_len(&header)?;
        let after_header = Cursor {
            chunk: cursor.chunk,
            offset: cursor.offset + HEADER_LEN,
        };

        Ok(self.at_least(self.normalize(after_header), payload_len))
    }

    /// Count the complete framed messages currently available from the
    /// current read position, without consuming any of them.
    pub fn length(&self) -> Result<usize> {
        let mut cursor = self.position;
        let mut count = 0;

        loop {
            let header = match self.peek(cursor, HEADER_LEN) {
                Some(header) => header,
                None => break,
            };

            let payload_len = decode_payload_len(&header)?;
            let after_header = self.normalize(Cursor {
                chunk: cursor.chunk,
                offset: cursor.offset + HEADER_LEN,
            });

            match self.advance(after_header, payload_len) {
                Some(next) => {
                    count += 1;
                    cursor = next;
                }
                None => break,
            }
        }

        Ok(count)
    }

    /// Extract one complete message, advancing the read position and
    /// dropping now-unreachable chunks. Returns `Ok(None)` without any
    /// mutation if the buffer does not yet hold a complete message.
    pub fn next_message(&mut self) -> Result<Option<Message>> {
        let cursor = self.position;

        let header = match self.peek(cursor, HEADER_LEN) {
            Some(header) => header,
            None => return Ok(None),
        };

        let payload_len = decode_payload_len(&header)?;
        let after_header = self.normalize(Cursor {
            chunk: cursor.chunk,
            offset: cursor.offset + HEADER_LEN,
        });

        let end = match self.advance(after_header, payload_len) {
            Some(end) => end,
            None => return Ok(None),
        };

        let type_byte = header[0];
        let tag = message_type_of(type_byte).ok_or(Error::UnknownMessageType(type_byte))?;

        let payload = if payload_len == 0 {
            Bytes::new()
        } else {
            Bytes::from(self.copy_range(after_header, payload_len))
        };

        self.commit(end);

        log::trace!(
            "extracted {:?} message, {} byte payload",
            tag,
            payload.len()
        );

        Ok(Some((tag, payload)))
    }

    /// Extract up to `n` complete messages (all available ones if `n` is
    /// `None`). On a decode error partway through, the whole call fails and
    /// the read position is left exactly as it was on entry.
    pub fn read(&mut self, n: Option<usize>) -> Result<Vec<Message>> {
        let mut cursor = self.position;
        let mut messages = Vec::new();

        loop {
            if let Some(limit) = n {
                if messages.len() >= limit {
                    break;
                }
            }

            let header = match self.peek(cursor, HEADER_LEN) {
                Some(header) => header,
                None => break,
            };

            let payload_len = decode_payload_len(&header)?;
            let after_header = self.normalize(Cursor {
                chunk: cursor.chunk,
                offset: cursor.offset + HEADER_LEN,
            });

            let end = match self.advance(after_header, payload_len) {
                Some(end) => end,
                None => break,
            };

            let type_byte = header[0];
            let tag = message_type_of(type_byte).ok_or(Error::UnknownMessageType(type_byte))?;

            let payload = if payload_len == 0 {
                Bytes::new()
            } else {
                Bytes::from(self.copy_range(after_header, payload_len))
            };

            messages.push((tag, payload));
            cursor = end;
        }

        self.commit(cursor);
        Ok(messages)
    }

    /// An iterator that repeatedly calls [`next_message`](Self::next_message),
    /// stopping after yielding `None` or the first error. Not restartable.
    pub fn iter(&mut self) -> Iter<'_> {
        Iter {
            buffer: self,
            done: false,
        }
    }

    /// Return a freshly allocated, contiguous copy of all unconsumed bytes
    /// from the current read position to the buffer's end.
    pub fn getvalue(&self) -> Bytes {
        if self.chunks.is_empty() {
            return Bytes::new();
        }

        let first = &self.chunks[0][self.position.offset..];
        if self.chunks.len() == 1 {
            return Bytes::copy_from_slice(first);
        }

        let mut out = Vec::with_capacity(
            first.len() + self.chunks.iter().skip(1).map(Bytes::len).sum::<usize>(),
        );
        out.extend_from_slice(first);
        for chunk in self.chunks.iter().skip(1) {
            out.extend_from_slice(chunk);
        }

        Bytes::from(out)
    }

    // -- internal cursor arithmetic, mirroring p_at_least/p_seek/p_memcpy --

    /// Folds an offset sitting at or past a chunk boundary into the start
    /// of a later chunk, so later comparisons don't have to special-case
    /// "offset == this chunk's length". Chunks are never empty (`write`
    /// skips empty input), so this always terminates.
    fn normalize(&self, mut cursor: Cursor) -> Cursor {
        while let Some(chunk) = self.chunks.get(cursor.chunk) {
            if cursor.offset < chunk.len() {
                break;
            }
            cursor.offset -= chunk.len();
            cursor.chunk += 1;
        }
        cursor
    }

    fn at_least(&self, cursor: Cursor, amount: usize) -> bool {
        let mut remaining = amount;
        let mut chunk_index = cursor.chunk;
        let mut offset = cursor.offset;

        while let Some(chunk) = self.chunks.get(chunk_index) {
            let available = chunk.len() - offset;
            if available >= remaining {
                return true;
            }
            remaining -= available;
            chunk_index += 1;
            offset = 0;
        }

        remaining == 0
    }

    /// Advance `cursor` by `amount` bytes if enough data is available;
    /// otherwise `None` (mirrors `p_seek` returning short).
    fn advance(&self, cursor: Cursor, amount: usize) -> Option<Cursor> {
        if !self.at_least(cursor, amount) {
            return None;
        }

        let mut chunk_index = cursor.chunk;
        let mut offset = cursor.offset + amount;

        loop {
            match self.chunks.get(chunk_index) {
                Some(chunk) if offset >= chunk.len() && chunk_index + 1 < self.chunks.len() => {
                    offset -= chunk.len();
                    chunk_index += 1;
                }
                _ => break,
            }
        }

        Some(Cursor {
            chunk: chunk_index,
            offset,
        })
    }

    /// Copy up to `len` bytes starting at `cursor` into a stack array,
    /// returning `None` if fewer than `len` bytes are available.
    fn peek(&self, cursor: Cursor, len: usize) -> Option<[u8; HEADER_LEN]> {
        debug_assert!(len <= HEADER_LEN);

        let mut out = [0u8; HEADER_LEN];
        let mut filled = 0;
        let mut chunk_index = cursor.chunk;
        let mut offset = cursor.offset;

        while filled < len {
            let chunk = self.chunks.get(chunk_index)?;
            let available = chunk.len() - offset;
            if available == 0 {
                chunk_index += 1;
                offset = 0;
                continue;
            }

            let take = available.min(len - filled);
            out[filled..filled + take].copy_from_slice(&chunk[offset..offset + take]);
            filled += take;
            offset += take;
            if offset == chunk.len() {
                chunk_index += 1;
                offset = 0;
            }
        }

        Some(out)
    }

    /// Copy exactly `len` bytes starting at `cursor` into a freshly
    /// allocated `Vec`. Caller must have already verified availability.
    fn copy_range(&self, cursor: Cursor, len: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(len);
        let mut chunk_index = cursor.chunk;
        let mut offset = cursor.offset;

        while out.len() < len {
            let chunk = &self.chunks[chunk_index];
            let available = chunk.len() - offset;
            let take = available.min(len - out.len());
            out.extend_from_slice(&chunk[offset..offset + take]);
            offset += take;
            if offset == chunk.len() {
                chunk_index += 1;
                offset = 0;
            }
        }

        out
    }

    /// Commit a new read position: drop chunks strictly before it and
    /// reinstall it relative to the (now shorter) deque.
    fn commit(&mut self, cursor: Cursor) {
        if cursor.chunk > 0 {
            self.chunks.drain(0..cursor.chunk);
        }
        self.position = Cursor {
            chunk: 0,
            offset: cursor.offset,
        };

        if self.chunks.is_empty() {
            self.position = Cursor::default();
        }
    }
}

fn decode_payload_len(header: &[u8; HEADER_LEN]) -> Result<usize> {
    let length = get_u32(&header[1..5]);
    if length < LENGTH_FIELD_LEN {
        log::warn!("invalid message size '{}'", length);
        return Err(Error::InvalidMessageSize { found: length });
    }
    Ok((length - LENGTH_FIELD_LEN) as usize)
}

/// Iterator over the messages in a [`MessageStreamBuffer`], created by
/// [`MessageStreamBuffer::iter`].
pub struct Iter<'a> {
    buffer: &'a mut MessageStreamBuffer,
    done: bool,
}

impl<'a> Iterator for Iter<'a> {
    type Item = Result<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.buffer.next_message() {
            Ok(Some(message)) => Some(Ok(message)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
