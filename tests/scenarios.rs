//! End-to-end scenarios exercising the public API the way a caller would:
//! feed bytes in, read messages/rows back out.

use bytes::Bytes;
use pq_stream_protocol::{
    cat_messages, message_type_of, pack_row, parse_row, Attribute, BatchElement,
    MessageStreamBuffer, OutboundMessage, TypeTag, WireTracker,
};

fn chunk(bytes: &[u8]) -> Bytes {
    Bytes::copy_from_slice(bytes)
}

#[test]
fn s1_single_complete_message_chunked_header() {
    let mut buf = MessageStreamBuffer::new();
    buf.write(chunk(&[0x52, 0x00, 0x00]));
    buf.write(chunk(&[0x00, 0x08, 0xDE, 0xAD, 0xBE, 0xEF]));

    let (tag, payload) = buf.next_message().unwrap().expect("one message available");
    assert_eq!(tag, message_type_of(0x52).unwrap());
    assert_eq!(&payload[..], &[0xDE, 0xAD, 0xBE, 0xEF]);

    assert!(buf.next_message().unwrap().is_none());
}

#[test]
fn s2_payload_split_across_three_chunks() {
    let mut buf = MessageStreamBuffer::new();
    buf.write(chunk(&[0x44, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x01]));
    buf.write(chunk(&[0xFF, 0xFF, 0xFF, 0xFF]));
    buf.write(chunk(&[0x45, 0x00, 0x00, 0x00, 0x04]));

    let messages = buf.read(None).unwrap();
    assert_eq!(messages.len(), 2);

    assert_eq!(messages[0].0, TypeTag::DataRow);
    assert_eq!(&messages[0].1[..], &[0x00, 0x01, 0xFF, 0xFF, 0xFF, 0xFF]);

    assert_eq!(messages[1].0, TypeTag::CommandComplete);
    assert_eq!(messages[1].1.len(), 0);

    let row = parse_row(&messages[0].1).unwrap();
    assert_eq!(row.len(), 1);
    assert_eq!(row[0], None);
}

#[test]
fn s3_tuple_round_trip() {
    let row: Vec<Attribute> = vec![
        Some(Bytes::from_static(b"hi")),
        None,
        Some(Bytes::new()),
    ];

    let packed = pack_row(&row).unwrap();
    assert_eq!(
        &packed[..],
        &[
            0x00, 0x00, 0x00, 0x02, 0x68, 0x69, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00
        ][..]
    );
}

#[test]
fn s4_malformed_length_preserves_buffer() {
    let mut buf = MessageStreamBuffer::new();
    buf.write(chunk(&[0x58, 0x00, 0x00, 0x00, 0x03]));

    let before = buf.getvalue();
    assert!(buf.has_message().is_err());
    assert!(buf.next_message().is_err());
    assert_eq!(buf.getvalue(), before);
}

#[test]
fn s5_wire_tracker_across_copy_end() {
    let mut tracker = WireTracker::new();
    let view = chunk(&[
        0x64, 0x00, 0x00, 0x00, 0x05, 0x61, 0x64, 0x00, 0x00, 0x00, 0x04, 0x43, 0x00, 0x00, 0x00,
        0x04,
    ]);

    let count = tracker.update(&view).unwrap();
    assert_eq!(count, 2);
    assert_eq!(
        &tracker.final_view().expect("terminator observed")[..],
        &[0x43, 0x00, 0x00, 0x00, 0x04]
    );
}

struct RawMessage {
    type_byte: u8,
    payload: Bytes,
}

impl OutboundMessage for RawMessage {
    fn type_byte(&self) -> Option<u8> {
        Some(self.type_byte)
    }

    fn serialize(&self) -> Bytes {
        self.payload.clone()
    }
}

#[test]
fn s6_batch_serializer_mixed() {
    let elements = vec![
        BatchElement::Raw(Bytes::from_static(b"A")),
        BatchElement::Raw(Bytes::from_static(b"BC")),
        BatchElement::Tuple(vec![Some(Bytes::from_static(b"x"))]),
        BatchElement::Message(Box::new(RawMessage {
            type_byte: 0x51,
            payload: Bytes::from_static(b"SEL"),
        })),
    ];

    let out = cat_messages(&elements).unwrap();

    let expected: &[u8] = &[
        0x64, 0x00, 0x00, 0x00, 0x05, 0x41, // 'd' A
        0x64, 0x00, 0x00, 0x00, 0x06, 0x42, 0x43, // 'd' BC
        0x44, 0x00, 0x00, 0x00, 0x0B, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x78, // 'D' [x]
        0x51, 0x00, 0x00, 0x00, 0x07, 0x53, 0x45, 0x4C, // 'Q' SEL
    ];

    assert_eq!(&out[..], expected);
}
