//! COPY wire tracker: scans a sequence of buffers being streamed out during
//! `COPY TO STDOUT` and reports how many complete `CopyData` (`'d'`)
//! messages each buffer completes, without copying any payload bytes.
//!
//! The tracker only looks at message headers (`type + u32 length`); it
//! never needs to see `CopyData` payload contents, so updates are O(number
//! of headers in the buffer), not O(buffer length). It stops scanning the
//! moment it sees a message type other than `'d'`, since that marks the
//! end of the COPY stream (typically `CopyDone` or `ErrorResponse`); the
//! remainder of that buffer, from the unexpected message onward, is saved
//! as the "final view" and every later call to `update` fails.

use crate::constants::{COPY_DATA_TYPE, HEADER_LEN};
use crate::endian::get_u32;
use crate::error::{Error, Result};
use bytes::Bytes;

/// Tracks progress through a stream of framed messages, counting complete
/// `CopyData` messages as they arrive in arbitrarily-chunked buffers.
#[derive(Debug)]
pub struct WireTracker {
    /// Bytes of the 4-byte length field accumulated so far, when a header
    /// is split across buffers.
    size_fragment: [u8; 4],
    /// Bytes remaining to complete the in-progress message, valid only
    /// when not mid-header (`continuation == -1`).
    remaining_bytes: u32,
    /// `-1` when not in the middle of a header; `0..=3` counts how many
    /// of the 4 length-field bytes have been captured so far.
    continuation: i8,
    /// Set once a non-`'d'` message type is observed; once set, every
    /// later call to `update` fails.
    final_view: Option<Bytes>,
}

impl WireTracker {
    /// Create a fresh tracker, ready to scan from the start of a COPY
    /// stream.
    pub fn new() -> Self {
        Self {
            size_fragment: [0; 4],
            remaining_bytes: 0,
            continuation: -1,
            final_view: None,
        }
    }

    /// Scan `view` for the boundaries of complete `CopyData` messages,
    /// returning how many were completed. An empty `view` is always a
    /// no-op, even on a terminated tracker.
    ///
    /// Fails with [`Error::Terminated`] if a prior call already observed a
    /// non-`'d'` message, or with [`Error::InvalidHeader`] if a header's
    /// declared length is too small to be valid.
    pub fn update(&mut self, view: &Bytes) -> Result<u32> {
        if view.is_empty() {
            return Ok(0);
        }

        if self.final_view.is_some() {
            return Err(Error::Terminated);
        }

        let buf = &view[..];
        let len = buf.len();
        let mut remaining_bytes = self.remaining_bytes;
        let mut continuation = self.continuation;
        let mut size_fragment = self.size_fragment;
        let mut messages = 0u32;
        let mut position = 0usize;
        let mut final_view = None;

        if continuation >= 0 {
            let sf_len = continuation as usize;
            let added = (4 - sf_len).min(len);
            size_fragment[sf_len..sf_len + added].copy_from_slice(&buf[..added]);
            continuation += added as i8;

            if continuation == 4 {
                let full_len = get_u32(&size_fragment);
                if full_len < 4 {
                    log::warn!("COPY wire header declared invalid size '{}'", full_len);
                    return Err(Error::InvalidHeader { found: full_len });
                }

                remaining_bytes = full_len - sf_len as u32;
                if remaining_bytes == 0 {
                    messages += 1;
                }
                continuation = -1;
            } else {
                self.commit(size_fragment, remaining_bytes, continuation, None);
                return Ok(0);
            }
        }

        loop {
            if remaining_bytes > 0 {
                let target = position + remaining_bytes as usize;
                if target > len {
                    remaining_bytes = (target - len) as u32;
                    position = len;
                } else {
                    remaining_bytes = 0;
                    messages += 1;
                    position = target;
                }
            }

            if position >= len {
                break;
            }

            let msgtype = buf[position];
            if msgtype != COPY_DATA_TYPE {
                final_view = Some(view.slice(position..len));
                break;
            }

            if len - position < HEADER_LEN {
                let captured = (len - position) - 1;
                size_fragment[..captured].copy_from_slice(&buf[position + 1..position + 1 + captured]);
                continuation = captured as i8;
                break;
            }

            let declared = get_u32(&buf[position + 1..position + 5]);
            remaining_bytes = declared + 1;
            if remaining_bytes < HEADER_LEN as u32 {
                log::warn!("COPY wire header declared invalid size '{}'", declared);
                return Err(Error::InvalidHeader { found: declared });
            }
        }

        self.commit(size_fragment, remaining_bytes, continuation, final_view);
        Ok(messages)
    }

    fn commit(
        &mut self,
        size_fragment: [u8; 4],
        remaining_bytes: u32,
        continuation: i8,
        final_view: Option<Bytes>,
    ) {
        self.size_fragment = size_fragment;
        self.remaining_bytes = remaining_bytes;
        self.continuation = continuation;
        self.final_view = final_view;
    }

    /// The length-field bytes accumulated for an in-progress, buffer-split
    /// header. Empty unless a header is currently being completed.
    pub fn size_fragment(&self) -> &[u8] {
        if self.continuation <= 0 {
            &[]
        } else {
            &self.size_fragment[..self.continuation as usize]
        }
    }

    /// Bytes still needed to complete the in-progress message, or `None`
    /// while a header is mid-continuation (the true count isn't known
    /// until the header finishes decoding).
    pub fn remaining_bytes(&self) -> Option<u32> {
        if self.continuation == -1 {
            Some(self.remaining_bytes)
        } else {
            None
        }
    }

    /// The trailing slice starting at the first unexpected (non-`'d'`)
    /// message type seen, if one has been observed yet.
    pub fn final_view(&self) -> Option<&Bytes> {
        self.final_view.as_ref()
    }

    /// Whether a non-`'d'` message has ended this tracker's useful life.
    pub fn is_terminated(&self) -> bool {
        self.final_view.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matches::assert_matches;

    fn b(bytes: &[u8]) -> Bytes {
        Bytes::copy_from_slice(bytes)
    }

    fn copy_message(payload: &[u8]) -> Vec<u8> {
        let mut out = vec![b'd'];
        out.extend_from_slice(&((payload.len() + 4) as u32).to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn counts_single_complete_message() {
        let mut tracker = WireTracker::new();
        let msg = copy_message(b"hello");
        assert_eq!(tracker.update(&b(&msg)).unwrap(), 1);
        assert_eq!(tracker.remaining_bytes(), Some(0));
    }

    #[test]
    fn counts_across_two_buffers() {
        let mut tracker = WireTracker::new();
        let mut msg = copy_message(b"hello world");
        let second_half = msg.split_off(7);

        assert_eq!(tracker.update(&b(&msg)).unwrap(), 0);
        assert_eq!(tracker.remaining_bytes(), Some(9));
        assert_eq!(tracker.update(&b(&second_half)).unwrap(), 1);
    }

    #[test]
    fn header_split_across_buffers() {
        let mut tracker = WireTracker::new();
        let msg = copy_message(b"xy");

        assert_eq!(tracker.update(&b(&msg[..3])).unwrap(), 0);
        assert_eq!(tracker.size_fragment(), &msg[1..3]);
        assert!(tracker.remaining_bytes().is_none());

        assert_eq!(tracker.update(&b(&msg[3..])).unwrap(), 1);
        assert_eq!(tracker.remaining_bytes(), Some(0));
    }

    #[test]
    fn counts_multiple_messages_in_one_buffer() {
        let mut tracker = WireTracker::new();
        let mut buf = copy_message(b"a");
        buf.extend(copy_message(b"bb"));
        buf.extend(copy_message(b"ccc"));

        assert_eq!(tracker.update(&b(&buf)).unwrap(), 3);
    }

    #[test]
    fn stops_at_copy_done_and_terminates() {
        let mut tracker = WireTracker::new();
        let mut buf = copy_message(b"last");
        buf.extend_from_slice(b"c\x00\x00\x00\x04");

        assert_eq!(tracker.update(&b(&buf)).unwrap(), 1);
        assert!(tracker.is_terminated());
        assert_eq!(&tracker.final_view().unwrap()[..], b"c\x00\x00\x00\x04");

        assert_matches!(tracker.update(&b(b"anything")), Err(Error::Terminated));
    }

    #[test]
    fn empty_update_is_always_a_no_op_even_when_terminated() {
        let mut tracker = WireTracker::new();
        let mut buf = copy_message(b"x");
        buf.push(b'c');
        buf.extend_from_slice(&4u32.to_be_bytes());
        tracker.update(&b(&buf)).unwrap();
        assert!(tracker.is_terminated());

        assert_eq!(tracker.update(&b(b"")).unwrap(), 0);
    }

    #[test]
    fn rejects_invalid_header_length() {
        let mut tracker = WireTracker::new();
        let mut buf = vec![b'd'];
        buf.extend_from_slice(&3u32.to_be_bytes());

        assert_matches!(
            tracker.update(&b(&buf)),
            Err(Error::InvalidHeader { found: 3 })
        );
    }

    #[test]
    fn rejects_invalid_header_length_resumed_from_continuation() {
        let mut tracker = WireTracker::new();
        let mut buf = vec![b'd'];
        buf.extend_from_slice(&[0, 0]);
        tracker.update(&b(&buf)).unwrap();

        let rest = [0u8, 2];
        assert_matches!(
            tracker.update(&b(&rest)),
            Err(Error::InvalidHeader { found: 2 })
        );
    }
}
