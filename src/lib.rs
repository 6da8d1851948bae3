//! A standalone codec for a length-prefixed PostgreSQL-style message
//! stream.
//!
//! https://www.postgresql.org/docs/current/protocol-message-formats.html
//!
//! This crate handles the parts of wire protocol handling that are
//! independent of any particular connection or authentication flow:
//! buffering arbitrarily-chunked input into framed messages, packing and
//! parsing tuple (`DataRow`) payloads, tracking COPY message boundaries
//! for flow control, and batching outgoing messages into as few
//! allocations as possible.
//!
//! Connection setup, authentication, and query execution are out of
//! scope; callers drive this crate's types from whatever transport they
//! use to move bytes to and from the server.

mod apply;
mod batch;
mod constants;
mod error;
mod stream_buffer;
mod tuple;
mod type_tag;
mod wire_tracker;

pub mod endian;

pub use self::{
    apply::{process_chunk, process_chunk_in_place, process_tuple, Generalizer, Processor},
    batch::{cat_messages, BatchElement, OutboundMessage},
    error::{Error, Overflow, Result},
    stream_buffer::{Iter, Message, MessageStreamBuffer},
    tuple::{consume_tuple_messages, pack_row, parse_row, Attribute},
    type_tag::{message_type_of, TypeTag},
    wire_tracker::WireTracker,
};
