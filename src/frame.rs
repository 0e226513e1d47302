//! Frame-level header state
//!
//! The uncompressed header populates one [`FrameHeader`] per frame. Loop
//! filter deltas and segmentation state outlive a single frame (they only
//! change when the stream updates them), so the parser owns persistent
//! copies and snapshots them into the header it returns.

use crate::tables::{
    ColorRange, ColorSpace, FrameType, InterpFilter, Profile, RefFrame, ReferenceMode, TxMode,
    MAX_SEGMENTS, SEG_LVL_MAX,
};

/// Loop filter parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopFilterParams {
    /// Filter level (0-63)
    pub level: u8,
    /// Sharpness level (0-7)
    pub sharpness: u8,
    /// Per-reference / per-mode delta adjustment enabled
    pub delta_enabled: bool,
    /// Reference frame deltas (intra, last, golden, altref)
    pub ref_deltas: [i8; 4],
    /// Mode deltas (zero mv, non-zero mv)
    pub mode_deltas: [i8; 2],
}

impl LoopFilterParams {
    /// State prescribed by past independence
    pub fn reset(&mut self) {
        self.delta_enabled = true;
        self.ref_deltas[RefFrame::Intra as usize] = 1;
        self.ref_deltas[RefFrame::Last as usize] = 0;
        self.ref_deltas[RefFrame::Golden as usize] = -1;
        self.ref_deltas[RefFrame::AltRef as usize] = -1;
        self.mode_deltas = [0, 0];
    }
}

/// Quantization parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuantizationParams {
    /// Base quantizer index
    pub base_q_idx: u8,
    /// Luma DC delta
    pub delta_q_y_dc: i8,
    /// Chroma DC delta
    pub delta_q_uv_dc: i8,
    /// Chroma AC delta
    pub delta_q_uv_ac: i8,
}

impl QuantizationParams {
    /// Lossless coding: base index and every delta are zero
    pub fn is_lossless(&self) -> bool {
        self.base_q_idx == 0
            && self.delta_q_y_dc == 0
            && self.delta_q_uv_dc == 0
            && self.delta_q_uv_ac == 0
    }
}

/// Segmentation parameters; persistent across frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationParams {
    pub enabled: bool,
    pub update_map: bool,
    pub temporal_update: bool,
    pub abs_or_delta_update: bool,
    /// Segment-id tree probabilities
    pub tree_probs: [u8; 7],
    /// Temporal prediction probabilities
    pub pred_probs: [u8; 3],
    pub feature_enabled: [[bool; SEG_LVL_MAX]; MAX_SEGMENTS],
    pub feature_data: [[i16; SEG_LVL_MAX]; MAX_SEGMENTS],
}

impl Default for SegmentationParams {
    fn default() -> Self {
        SegmentationParams {
            enabled: false,
            update_map: false,
            temporal_update: false,
            abs_or_delta_update: false,
            tree_probs: [255; 7],
            pred_probs: [255; 3],
            feature_enabled: [[false; SEG_LVL_MAX]; MAX_SEGMENTS],
            feature_data: [[0; SEG_LVL_MAX]; MAX_SEGMENTS],
        }
    }
}

impl SegmentationParams {
    /// Whether a feature is active for a segment
    #[inline]
    pub fn feature_active(&self, segment_id: u8, feature: usize) -> bool {
        self.enabled && self.feature_enabled[segment_id as usize][feature]
    }

    /// Clear the per-segment features, as past independence prescribes
    pub fn reset_features(&mut self) {
        self.feature_enabled = [[false; SEG_LVL_MAX]; MAX_SEGMENTS];
        self.feature_data = [[0; SEG_LVL_MAX]; MAX_SEGMENTS];
        self.abs_or_delta_update = false;
    }
}

/// Tile configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileInfo {
    pub cols_log2: u8,
    pub rows_log2: u8,
}

/// VP9 frame header: everything the uncompressed and compressed headers
/// establish about one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub profile: Profile,
    pub show_existing_frame: bool,
    pub frame_to_show_map_index: u8,
    pub frame_type: FrameType,
    pub show_frame: bool,
    pub error_resilient_mode: bool,
    /// Key frame or intra-only frame
    pub frame_is_intra: bool,

    pub bit_depth: u8,
    pub color_space: ColorSpace,
    pub color_range: ColorRange,
    pub subsampling_x: bool,
    pub subsampling_y: bool,

    pub width: u32,
    pub height: u32,
    pub render_width: u32,
    pub render_height: u32,
    /// Frame width in 8x8 mode-info units
    pub mi_cols: usize,
    /// Frame height in 8x8 mode-info units
    pub mi_rows: usize,
    /// Frame width in 64x64 superblocks
    pub sb64_cols: usize,
    /// Frame height in 64x64 superblocks
    pub sb64_rows: usize,

    pub refresh_frame_flags: u8,
    pub ref_frame_idx: [u8; 3],
    /// Sign bias per reference, indexed by `RefFrame`
    pub ref_frame_sign_bias: [bool; 4],
    pub allow_high_precision_mv: bool,
    pub interpolation_filter: InterpFilter,

    pub reset_frame_context: u8,
    pub refresh_frame_context: bool,
    pub frame_parallel_decoding_mode: bool,
    pub frame_context_idx: u8,

    pub loop_filter: LoopFilterParams,
    pub quantization: QuantizationParams,
    pub segmentation: SegmentationParams,
    pub tile_info: TileInfo,

    /// Derived from the quantizer
    pub lossless: bool,
    /// Established by the compressed header
    pub tx_mode: TxMode,
    pub reference_mode: ReferenceMode,
    pub comp_fixed_ref: RefFrame,
    pub comp_var_ref: [RefFrame; 2],

    /// Compressed header size; zero only for show-existing frames
    pub header_size_in_bytes: u16,
}

impl Default for FrameHeader {
    fn default() -> Self {
        FrameHeader {
            profile: Profile::Profile0,
            show_existing_frame: false,
            frame_to_show_map_index: 0,
            frame_type: FrameType::KeyFrame,
            show_frame: false,
            error_resilient_mode: false,
            frame_is_intra: false,
            bit_depth: 8,
            color_space: ColorSpace::Unknown,
            color_range: ColorRange::StudioSwing,
            subsampling_x: true,
            subsampling_y: true,
            width: 0,
            height: 0,
            render_width: 0,
            render_height: 0,
            mi_cols: 0,
            mi_rows: 0,
            sb64_cols: 0,
            sb64_rows: 0,
            refresh_frame_flags: 0,
            ref_frame_idx: [0; 3],
            ref_frame_sign_bias: [false; 4],
            allow_high_precision_mv: false,
            interpolation_filter: InterpFilter::EightTap,
            reset_frame_context: 0,
            refresh_frame_context: false,
            frame_parallel_decoding_mode: false,
            frame_context_idx: 0,
            loop_filter: LoopFilterParams::default(),
            quantization: QuantizationParams::default(),
            segmentation: SegmentationParams::default(),
            tile_info: TileInfo::default(),
            lossless: false,
            tx_mode: TxMode::Only4x4,
            reference_mode: ReferenceMode::SingleReference,
            comp_fixed_ref: RefFrame::AltRef,
            comp_var_ref: [RefFrame::Last, RefFrame::Golden],
            header_size_in_bytes: 0,
        }
    }
}

impl FrameHeader {
    /// Derive the mode-info and superblock geometry from the pixel size
    pub fn compute_image_size(&mut self) {
        self.mi_cols = ((self.width + 7) >> 3) as usize;
        self.mi_rows = ((self.height + 7) >> 3) as usize;
        self.sb64_cols = (self.mi_cols + 7) >> 3;
        self.sb64_rows = (self.mi_rows + 7) >> 3;
    }

    pub fn is_key_frame(&self) -> bool {
        self.frame_type == FrameType::KeyFrame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_size_derivation() {
        let mut header = FrameHeader {
            width: 1920,
            height: 1080,
            ..Default::default()
        };
        header.compute_image_size();
        assert_eq!(header.mi_cols, 240);
        assert_eq!(header.mi_rows, 135);
        assert_eq!(header.sb64_cols, 30);
        assert_eq!(header.sb64_rows, 17);

        header.width = 1;
        header.height = 1;
        header.compute_image_size();
        assert_eq!(header.mi_cols, 1);
        assert_eq!(header.mi_rows, 1);
        assert_eq!(header.sb64_cols, 1);
        assert_eq!(header.sb64_rows, 1);
    }

    #[test]
    fn test_lossless_condition() {
        let mut quant = QuantizationParams::default();
        assert!(quant.is_lossless());
        quant.delta_q_uv_ac = -1;
        assert!(!quant.is_lossless());
        quant.delta_q_uv_ac = 0;
        quant.base_q_idx = 40;
        assert!(!quant.is_lossless());
    }

    #[test]
    fn test_loop_filter_reset() {
        let mut lf = LoopFilterParams::default();
        lf.ref_deltas = [5, 5, 5, 5];
        lf.reset();
        assert!(lf.delta_enabled);
        assert_eq!(lf.ref_deltas, [1, 0, -1, -1]);
        assert_eq!(lf.mode_deltas, [0, 0]);
    }

    #[test]
    fn test_segmentation_feature_active() {
        let mut seg = SegmentationParams::default();
        seg.feature_enabled[2][3] = true;
        assert!(!seg.feature_active(2, 3));
        seg.enabled = true;
        assert!(seg.feature_active(2, 3));
        assert!(!seg.feature_active(1, 3));
    }
}
