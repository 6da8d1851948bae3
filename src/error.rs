//! Error and Result types.

use std::error::Error as StdError;
use std::fmt::{self, Display};

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A generic error that represents all the ways a codec operation can fail.
#[derive(Debug)]
pub enum Error {
    /// An argument had the wrong shape for the operation (e.g. a generic
    /// outbound message whose type field could not be framed).
    TypeMismatch(&'static str),

    /// A framed message's length field was less than 4 (the length of the
    /// length field itself).
    InvalidMessageSize { found: u32 },

    /// A COPY wire-tracker header declared a length less than 5.
    InvalidHeader { found: u32 },

    /// A tuple-data payload was shorter than the 2-byte attribute count.
    TruncatedHeader { available: usize },

    /// Not enough bytes remained for an attribute's 4-byte size field.
    TruncatedAttrSize {
        attribute: u16,
        needed: usize,
        available: usize,
    },

    /// An attribute's declared size overruns the remaining input, or would
    /// wrap a pointer/length computation.
    InvalidAttrSize { attribute: u16, size: u32 },

    /// Bytes remained in a tuple-data payload after its declared attributes
    /// were all consumed.
    TrailingBytes { remaining: usize },

    /// A size exceeded what the wire format can represent.
    Overflow(Overflow),

    /// The message type byte has no entry in the message type registry.
    UnknownMessageType(u8),

    /// The COPY wire tracker was updated after it already observed a
    /// non-`'d'` message.
    Terminated,

    /// `process_tuple`/`process_chunk` were called with a processors slice
    /// whose length did not match the inputs.
    ArityMismatch { processors: usize, inputs: usize },
}

/// The specific quantity that overflowed the wire format's representable range.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Overflow {
    /// A single attribute's byte length exceeded `0xFFFFFFFE`.
    AttributeSize { attribute: usize },
    /// A tuple row had more than 65 535 attributes.
    AttributeCount { count: usize },
    /// A framed message's total length exceeded `u32::MAX`.
    MessageSize,
}

impl StdError for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TypeMismatch(what) => write!(f, "type mismatch: {}", what),

            Error::InvalidMessageSize { found } => {
                write!(f, "invalid message size '{}'", found)
            }

            Error::InvalidHeader { found } => {
                write!(f, "message header contained an invalid size '{}'", found)
            }

            Error::TruncatedHeader { available } => write!(
                f,
                "invalid tuple message: {} bytes is too small for the attribute count",
                available
            ),

            Error::TruncatedAttrSize {
                attribute,
                needed,
                available,
            } => write!(
                f,
                "not enough data available for attribute {}'s size header: \
                 needed {} bytes, but only {} remain",
                attribute, needed, available
            ),

            Error::InvalidAttrSize { attribute, size } => {
                write!(f, "attribute {} has invalid size {}", attribute, size)
            }

            Error::TrailingBytes { remaining } => write!(
                f,
                "invalid tuple(D) message, {} remaining bytes after processing all attributes",
                remaining
            ),

            Error::Overflow(Overflow::AttributeSize { attribute }) => write!(
                f,
                "data size of attribute {} is greater than attribute capacity",
                attribute
            ),

            Error::Overflow(Overflow::AttributeCount { count }) => {
                write!(f, "too many attributes in tuple message: {}", count)
            }

            Error::Overflow(Overflow::MessageSize) => {
                f.write_str("message size too large to represent in the wire format")
            }

            Error::UnknownMessageType(byte) => {
                write!(f, "unknown message type: {:?}", *byte as char)
            }

            Error::Terminated => f.write_str("wire tracker has been terminated"),

            Error::ArityMismatch { processors, inputs } => write!(
                f,
                "inconsistent items, {} processors and {} items in row",
                processors, inputs
            ),
        }
    }
}
