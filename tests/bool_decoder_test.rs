//! Boolean decoder behavior tests: encoder round trips and the
//! statistical behavior of probability-weighted bits.

mod common;

use common::{BoolEncoder, XorShift32};
use vp9_syntax::bit_reader::BitReader;
use vp9_syntax::bool_decoder::BoolDecoder;

#[test]
fn test_encoder_decoder_roundtrip() {
    let mut rng = XorShift32(0xDEAD_BEEF);
    let mut encoder = BoolEncoder::new();
    let mut bits = Vec::new();
    let mut probs = Vec::new();
    for _ in 0..5000 {
        let prob = ((rng.next() >> 8) % 254 + 1) as u8;
        let bit = rng.next() & 1 != 0;
        encoder.write_bool(prob, bit);
        bits.push(bit);
        probs.push(prob);
    }
    let payload = encoder.finish();

    let mut reader = BitReader::new(&payload);
    let mut decoder = BoolDecoder::new(&mut reader, payload.len()).unwrap();
    for (i, (&bit, &prob)) in bits.iter().zip(probs.iter()).enumerate() {
        assert_eq!(decoder.read_bool(prob).unwrap(), bit, "symbol {i}");
    }
}

#[test]
fn test_literal_roundtrip() {
    let mut encoder = BoolEncoder::new();
    let values: [(u32, u8); 6] = [(0, 1), (1, 1), (5, 4), (127, 7), (255, 8), (0x12345, 17)];
    for &(value, bits) in &values {
        encoder.write_literal(value, bits);
    }
    let payload = encoder.finish();

    let mut reader = BitReader::new(&payload);
    let mut decoder = BoolDecoder::new(&mut reader, payload.len()).unwrap();
    for &(value, bits) in &values {
        assert_eq!(decoder.read_literal(bits).unwrap(), value);
    }
}

#[test]
fn test_zero_bit_frequency_tracks_probability() {
    let mut rng = XorShift32(0x1234_5678);
    let payload = rng.fill_bytes(200_000);

    for &prob in &[32u8, 128, 224] {
        let mut reader = BitReader::new(&payload);
        let mut decoder = BoolDecoder::new(&mut reader, payload.len()).unwrap();
        let mut zeros = 0u32;
        let draws = 1_000_000;
        for _ in 0..draws {
            if !decoder.read_bool(prob).unwrap() {
                zeros += 1;
            }
        }
        let frequency = zeros as f64 / draws as f64;
        let expected = prob as f64 / 256.0;
        assert!(
            (frequency - expected).abs() < 0.01,
            "prob {prob}: frequency {frequency:.4}, expected {expected:.4}"
        );
    }
}
