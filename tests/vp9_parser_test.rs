//! VP9 parser integration tests
//!
//! Frames are constructed bit-exactly with the test bit writer and the
//! boolean encoder, then parsed end to end.

mod common;

use common::{BitWriter, BoolEncoder};
use vp9_syntax::probs::{
    FrameContext, DEFAULT_PARTITION_PROBS, DEFAULT_UV_MODE_PROBS, DEFAULT_Y_MODE_PROBS,
    KF_PARTITION_PROBS, KF_UV_MODE_PROBS, KF_Y_MODE_PROBS,
};
use vp9_syntax::tables::{BlockSize, ColorSpace, FrameType, Profile, TxMode, TxSize};
use vp9_syntax::tree::{INTRA_MODE_TREE, PARTITION_TREE};
use vp9_syntax::{ParserOptions, Vp9Parser};

/// Hand-rolled arithmetic payloads end in encoder flush bytes rather
/// than zero padding, so the section-exit padding check is relaxed.
fn lenient() -> ParserOptions {
    ParserOptions {
        strict_reserved_bits: false,
        ..Default::default()
    }
}

// ============================================================================
// Key frame construction
// ============================================================================

/// Compressed header of a lossless key frame: one coefficient update
/// gate and three skip-probability gates, all off.
fn key_frame_compressed_header() -> Vec<u8> {
    let mut enc = BoolEncoder::new();
    enc.write_bit(false);
    for _ in 0..3 {
        enc.write_bool(252, false);
    }
    enc.finish()
}

/// Tile payload for a 128x128 key frame: four 64x64 superblocks, each
/// partition-none, not skipped, DC luma and chroma.
fn key_frame_tile() -> Vec<u8> {
    let mut enc = BoolEncoder::new();
    for _ in 0..4 {
        enc.write_tree(&PARTITION_TREE, &KF_PARTITION_PROBS[12], 0);
        enc.write_bool(192, false); // skip
        enc.write_tree(&INTRA_MODE_TREE, &KF_Y_MODE_PROBS[0][0], 0);
        enc.write_tree(&INTRA_MODE_TREE, &KF_UV_MODE_PROBS[0], 0);
    }
    enc.finish()
}

/// A complete, lossless 128x128 key frame
fn build_key_frame() -> Vec<u8> {
    let mut writer = BitWriter::new();
    writer.push_bits(2, 2); // frame marker
    writer.push_bit(0); // profile low
    writer.push_bit(0); // profile high
    writer.push_flag(false); // show_existing_frame
    writer.push_bit(0); // frame_type: key
    writer.push_flag(true); // show_frame
    writer.push_flag(false); // error_resilient_mode
    writer.push_bits(0x49, 8); // sync code
    writer.push_bits(0x83, 8);
    writer.push_bits(0x42, 8);
    writer.push_bits(1, 3); // color space: Bt601
    writer.push_flag(false); // studio swing
    writer.push_bits(127, 16); // width - 1
    writer.push_bits(127, 16); // height - 1
    writer.push_flag(false); // render size = frame size
    writer.push_flag(false); // refresh_frame_context
    writer.push_flag(true); // frame_parallel_decoding_mode
    writer.push_bits(2, 2); // frame_context_idx, reset to 0 by the parser
    writer.push_bits(0, 6); // loop filter level
    writer.push_bits(0, 3); // sharpness
    writer.push_flag(false); // delta enabled
    writer.push_bits(0, 8); // base_q_idx
    writer.push_flag(false); // delta_q_y_dc
    writer.push_flag(false); // delta_q_uv_dc
    writer.push_flag(false); // delta_q_uv_ac
    writer.push_flag(false); // segmentation
    writer.push_flag(false); // tile rows_log2

    let compressed = key_frame_compressed_header();
    writer.push_bits(compressed.len() as u32, 16);
    writer.byte_align();
    writer.extend_bytes(&compressed);
    writer.extend_bytes(&key_frame_tile());
    writer.finish()
}

// ============================================================================
// Inter frame construction
// ============================================================================

/// Compressed header of a small inter frame. Transform mode is
/// per-block select, and a single diff update with delta 5 flips
/// the first 8x8 transform probability; everything else keeps its
/// loaded value.
fn inter_compressed_header() -> Vec<u8> {
    let mut enc = BoolEncoder::new();
    // tx mode: select
    enc.write_literal(3, 2);
    enc.write_literal(1, 1);
    // tx probs: update the first 8x8 entry
    enc.write_bool(252, true);
    enc.write_literal(0, 1);
    enc.write_literal(5, 4);
    for _ in 0..11 {
        enc.write_bool(252, false);
    }
    // coefficient update gates, one per transform size
    for _ in 0..4 {
        enc.write_bit(false);
    }
    // skip
    for _ in 0..3 {
        enc.write_bool(252, false);
    }
    // inter modes
    for _ in 0..7 * 3 {
        enc.write_bool(252, false);
    }
    // interpolation filter probs skipped: the frame filter is fixed
    // is inter
    for _ in 0..4 {
        enc.write_bool(252, false);
    }
    // equal sign biases force single reference; nothing coded for the
    // reference mode itself
    for _ in 0..5 * 2 {
        enc.write_bool(252, false);
    }
    // y modes
    for _ in 0..4 * 9 {
        enc.write_bool(252, false);
    }
    // partitions
    for _ in 0..16 * 3 {
        enc.write_bool(252, false);
    }
    // mv joints
    for _ in 0..3 {
        enc.write_bool(252, false);
    }
    // mv components: sign, classes, class0 bit, offset bits
    for _ in 0..2 {
        for _ in 0..1 + 10 + 1 + 10 {
            enc.write_bool(252, false);
        }
    }
    // mv fractional parts
    for _ in 0..2 {
        for _ in 0..2 * 3 + 3 {
            enc.write_bool(252, false);
        }
    }
    // no high-precision updates without allow_high_precision_mv
    enc.finish()
}

/// Tile payload for an 8x8 inter frame: the partition walk forces
/// splits down to the single in-range 8x8 block, which is an intra
/// block with skip set.
fn inter_tile() -> Vec<u8> {
    let mut enc = BoolEncoder::new();
    enc.write_tree(&PARTITION_TREE, &DEFAULT_PARTITION_PROBS[0], 0);
    enc.write_bool(192, true); // skip
    enc.write_bool(9, false); // is_inter: intra
    enc.write_bool(66, false); // tx size 4x4, context 1
    enc.write_tree(&INTRA_MODE_TREE, &DEFAULT_Y_MODE_PROBS[1], 0);
    enc.write_tree(&INTRA_MODE_TREE, &DEFAULT_UV_MODE_PROBS[0], 0);
    enc.finish()
}

/// A complete 8x8 non-key frame
fn build_inter_frame(error_resilient: bool) -> Vec<u8> {
    let mut writer = BitWriter::new();
    writer.push_bits(2, 2); // frame marker
    writer.push_bit(0); // profile low
    writer.push_bit(0); // profile high
    writer.push_flag(false); // show_existing_frame
    writer.push_bit(1); // frame_type: non-key
    writer.push_flag(true); // show_frame
    writer.push_flag(error_resilient);
    if !error_resilient {
        writer.push_bits(0, 2); // reset_frame_context
    }
    writer.push_bits(0x01, 8); // refresh_frame_flags
    for _ in 0..3 {
        writer.push_bits(0, 3); // ref_frame_idx
        writer.push_flag(false); // sign bias
    }
    for _ in 0..3 {
        writer.push_flag(false); // found_ref
    }
    writer.push_bits(7, 16); // width - 1
    writer.push_bits(7, 16); // height - 1
    writer.push_flag(false); // render size = frame size
    writer.push_flag(false); // allow_high_precision_mv
    writer.push_flag(false); // filter not switchable
    writer.push_bits(1, 2); // eight-tap
    if !error_resilient {
        writer.push_flag(false); // refresh_frame_context
        writer.push_flag(true); // frame_parallel_decoding_mode
    }
    writer.push_bits(0, 2); // frame_context_idx
    writer.push_bits(0, 6); // loop filter level
    writer.push_bits(0, 3); // sharpness
    writer.push_flag(false); // delta enabled
    writer.push_bits(50, 8); // base_q_idx
    writer.push_flag(false);
    writer.push_flag(false);
    writer.push_flag(false);
    writer.push_flag(false); // segmentation
    writer.push_flag(false); // tile rows_log2

    let compressed = inter_compressed_header();
    writer.push_bits(compressed.len() as u32, 16);
    writer.byte_align();
    writer.extend_bytes(&compressed);
    writer.extend_bytes(&inter_tile());
    writer.finish()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_key_frame_header_fields() {
    let data = build_key_frame();
    let mut parser = Vp9Parser::new(lenient());
    let frame = parser.parse_frame(&data).unwrap();

    assert_eq!(frame.header.frame_type, FrameType::KeyFrame);
    assert_eq!(frame.header.profile, Profile::Profile0);
    assert!(frame.header.show_frame);
    assert_eq!(frame.header.width, 128);
    assert_eq!(frame.header.height, 128);
    assert_eq!(frame.header.bit_depth, 8);
    assert_eq!(frame.header.color_space, ColorSpace::Bt601);
    assert!(frame.header.subsampling_x);
    assert!(frame.header.subsampling_y);
    assert!(frame.header.frame_is_intra);
    assert!(frame.header.lossless);
    assert_eq!(frame.header.tx_mode, TxMode::Only4x4);
    assert_eq!(frame.header.refresh_frame_flags, 0xFF);
    // past independence forces context 0 regardless of the coded index
    assert_eq!(frame.header.frame_context_idx, 0);
    assert_eq!(frame.header.mi_cols, 16);
    assert_eq!(frame.header.mi_rows, 16);
    assert_eq!(frame.header.sb64_cols, 2);
    assert_eq!(frame.header.sb64_rows, 2);
}

#[test]
fn test_key_frame_block_stream() {
    let data = build_key_frame();
    let mut parser = Vp9Parser::new(lenient());
    let frame = parser.parse_frame(&data).unwrap();

    assert_eq!(frame.blocks.len(), 4);
    let positions: Vec<(usize, usize)> =
        frame.blocks.iter().map(|b| (b.mi_row, b.mi_col)).collect();
    assert_eq!(positions, [(0, 0), (0, 8), (8, 0), (8, 8)]);
    for block in &frame.blocks {
        assert_eq!(block.info.block_size, BlockSize::Block64x64);
        assert!(!block.info.skip);
        assert!(!block.info.is_inter);
        assert_eq!(block.info.tx_size, TxSize::Tx4x4);
        assert_eq!(block.info.y_mode as u8, 0);
        assert_eq!(block.info.uv_mode as u8, 0);
        assert_eq!(block.info.segment_id, 0);
    }

    // one partition-none and one skip read per superblock
    assert_eq!(parser.counts().partition[12][0], 4);
    assert_eq!(parser.counts().skip[0][0], 4);
}

#[test]
fn test_key_frame_resets_probability_banks() {
    let data = build_key_frame();
    let mut parser = Vp9Parser::new(lenient());
    parser.parse_frame(&data).unwrap();

    let defaults = FrameContext::default();
    let tables = parser.probability_tables();
    assert_eq!(*tables.current(), defaults);
    for bank in 0..4 {
        assert_eq!(*tables.bank(bank), defaults);
    }
}

#[test]
fn test_parse_is_idempotent() {
    let data = build_key_frame();
    let mut first = Vp9Parser::new(lenient());
    let mut second = Vp9Parser::new(lenient());
    assert_eq!(
        first.parse_frame(&data).unwrap(),
        second.parse_frame(&data).unwrap()
    );

    let data = build_inter_frame(false);
    let mut first = Vp9Parser::new(lenient());
    let mut second = Vp9Parser::new(lenient());
    assert_eq!(
        first.parse_frame(&data).unwrap(),
        second.parse_frame(&data).unwrap()
    );
}

#[test]
fn test_inter_frame_tx_prob_diff_update() {
    let data = build_inter_frame(false);
    let mut parser = Vp9Parser::new(lenient());
    let frame = parser.parse_frame(&data).unwrap();

    assert_eq!(frame.header.frame_type, FrameType::NonKeyFrame);
    assert_eq!(frame.header.tx_mode, TxMode::TxModeSelect);
    assert!(!frame.header.lossless);

    // delta 5 recenters the default 100 to 136
    assert_eq!(parser.probability_tables().current().tx_8x8[0][0], 136);
    assert_eq!(parser.probability_tables().current().tx_8x8[1][0], 66);
    // saved banks are untouched by the working-set update
    assert_eq!(parser.probability_tables().bank(0).tx_8x8[0][0], 100);
}

#[test]
fn test_inter_frame_block_stream() {
    let data = build_inter_frame(false);
    let mut parser = Vp9Parser::new(lenient());
    let frame = parser.parse_frame(&data).unwrap();

    // the 8x8 frame yields exactly one in-range leaf block
    assert_eq!(frame.blocks.len(), 1);
    let info = &frame.blocks[0].info;
    assert_eq!(info.block_size, BlockSize::Block8x8);
    assert!(info.skip);
    assert!(!info.is_inter);
    assert_eq!(info.tx_size, TxSize::Tx4x4);

    // the forced splits on out-of-range halves are counted too
    assert_eq!(parser.counts().partition[12][3], 1);
    assert_eq!(parser.counts().partition[8][3], 1);
    assert_eq!(parser.counts().partition[4][3], 1);
    assert_eq!(parser.counts().partition[0][0], 1);
    assert_eq!(parser.counts().y_mode[1][0], 1);
    assert_eq!(parser.counts().uv_mode[0][0], 1);
    assert_eq!(parser.counts().tx_8x8[1][0], 1);
    assert_eq!(parser.counts().is_inter[0][0], 1);
}

#[test]
fn test_error_resilient_frame_context_reset() {
    let data = build_inter_frame(true);
    let mut parser = Vp9Parser::new(lenient());
    let frame = parser.parse_frame(&data).unwrap();

    assert!(frame.header.error_resilient_mode);
    assert_eq!(frame.header.frame_context_idx, 0);
    assert!(!frame.header.refresh_frame_context);
    assert!(frame.header.frame_parallel_decoding_mode);
}

#[test]
fn test_lossless_condition_follows_quantizer() {
    let key = build_key_frame();
    let inter = build_inter_frame(false);
    let mut parser = Vp9Parser::new(lenient());
    assert!(parser.parse_frame(&key).unwrap().header.lossless);
    let frame = parser.parse_frame(&inter).unwrap();
    assert_eq!(frame.header.quantization.base_q_idx, 50);
    assert!(!frame.header.lossless);
}
