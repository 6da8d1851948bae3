//! Wire-format constants shared across the codec.
//!
//! Centralized here rather than scattered as magic numbers through
//! `stream_buffer`, `tuple`, `wire_tracker` and `batch`.

/// Bytes in a frame header: 1 type byte + 4 length bytes.
pub const HEADER_LEN: usize = 5;

/// Width of the big-endian length field in a frame header.
pub const LENGTH_FIELD_LEN: u32 = 4;

/// The 32-bit sentinel marking an ABSENT (SQL NULL) attribute value.
pub const NULL_SENTINEL: u32 = 0xFFFF_FFFF;

/// Largest attribute byte length representable in the 32-bit size field
/// (`0xFFFFFFFE`; `0xFFFFFFFF` is reserved for NULL).
pub const MAX_ATTR_SIZE: u32 = 0xFFFF_FFFE;

/// Largest number of attributes representable in the 16-bit attribute count.
pub const MAX_ATTR_COUNT: usize = u16::MAX as usize;

/// The COPY-data message type byte.
pub const COPY_DATA_TYPE: u8 = b'd';

/// The tuple-data (row) message type byte.
pub const DATA_ROW_TYPE: u8 = b'D';
