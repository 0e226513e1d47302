//! Parser benchmarks: boolean decoder throughput and header parsing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vp9_syntax::bit_reader::BitReader;
use vp9_syntax::bool_decoder::BoolDecoder;
use vp9_syntax::Vp9Parser;

fn payload(len: usize) -> Vec<u8> {
    let mut state = 0x1234_5678u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 16) as u8
        })
        .collect()
}

fn bench_bool_decoder(c: &mut Criterion) {
    let data = payload(64 * 1024);
    c.bench_function("bool_decoder_100k_bools", |b| {
        b.iter(|| {
            let mut reader = BitReader::new(&data);
            let mut decoder = BoolDecoder::new(&mut reader, data.len()).unwrap();
            let mut ones = 0u32;
            for _ in 0..100_000 {
                ones += decoder.read_bool(black_box(163)).unwrap() as u32;
            }
            ones
        })
    });
}

fn bench_show_existing_header(c: &mut Criterion) {
    c.bench_function("parse_show_existing_frame", |b| {
        let mut parser = Vp9Parser::default();
        b.iter(|| parser.parse_frame(black_box(&[0x8C])).unwrap())
    });
}

criterion_group!(benches, bench_bool_decoder, bench_show_existing_header);
criterion_main!(benches);
