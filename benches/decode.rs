#[macro_use]
extern crate criterion;

use bytes::Bytes;
use criterion::{black_box, Criterion};
use pq_stream_protocol::{parse_row, MessageStreamBuffer};

fn criterion_benchmark(c: &mut Criterion) {
    const DATA_ROW: &[u8] = b"\x44\x00\x00\x00\x1C\x00\x03\
        \x00\x00\x00\x05hello\
        \xFF\xFF\xFF\xFF\
        \x00\x00\x00\x05world";

    c.bench_function("extract DataRow from stream buffer", |b| {
        b.iter(|| {
            let mut buf = MessageStreamBuffer::new();
            buf.write(black_box(Bytes::from_static(DATA_ROW)));
            let _ = buf.next_message().unwrap().unwrap();
        })
    });

    c.bench_function("parse_row three attributes", |b| {
        let payload = &DATA_ROW[5..];
        b.iter(|| {
            let _ = parse_row(black_box(payload)).unwrap();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
