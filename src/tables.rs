//! VP9 enums, constants and static lookup tables
//!
//! Everything here is an immutable, process-wide constant: block geometry
//! lookups, the partition subsize mapping, segmentation feature layouts and
//! the probability-remapping table used by the compressed header.

// =============================================================================
// Stream-level constants
// =============================================================================

pub const MAX_TILE_WIDTH_B64: u32 = 64;
pub const MIN_TILE_WIDTH_B64: u32 = 4;
pub const MAX_SEGMENTS: usize = 8;
pub const SEG_LVL_MAX: usize = 4;
pub const SEG_LVL_ALT_Q: usize = 0;
pub const SEG_LVL_ALT_L: usize = 1;
pub const SEG_LVL_REF_FRAME: usize = 2;
pub const SEG_LVL_SKIP: usize = 3;

pub const SKIP_CONTEXTS: usize = 3;
pub const INTER_MODE_CONTEXTS: usize = 7;
pub const INTER_MODES: usize = 4;
pub const INTERP_FILTER_CONTEXTS: usize = 4;
pub const SWITCHABLE_FILTERS: usize = 3;
pub const IS_INTER_CONTEXTS: usize = 4;
pub const COMP_MODE_CONTEXTS: usize = 5;
pub const REF_CONTEXTS: usize = 5;
pub const BLOCK_SIZE_GROUPS: usize = 4;
pub const INTRA_MODES: usize = 10;
pub const PARTITION_CONTEXTS: usize = 16;
pub const PARTITION_TYPES: usize = 4;
pub const TX_SIZE_CONTEXTS: usize = 2;
pub const TX_SIZES: usize = 4;
pub const REFS_PER_FRAME: usize = 3;

pub const MV_JOINTS: usize = 4;
pub const MV_CLASSES: usize = 11;
pub const MV_OFFSET_BITS: usize = 10;
pub const CLASS0_SIZE: usize = 2;
pub const MV_FR_SIZE: usize = 4;

/// Bits per segmentation feature value (alt-Q, alt-LF, ref frame, skip)
pub const SEGMENTATION_FEATURE_BITS: [u8; SEG_LVL_MAX] = [8, 6, 2, 0];
/// Whether a segmentation feature value carries a sign bit
pub const SEGMENTATION_FEATURE_SIGNED: [bool; SEG_LVL_MAX] = [true, true, false, false];

// =============================================================================
// Profiles and color configuration
// =============================================================================

/// VP9 profiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Profile {
    #[default]
    Profile0 = 0, // 8-bit 4:2:0
    Profile1 = 1, // 8-bit 4:2:2, 4:4:4
    Profile2 = 2, // 10/12-bit 4:2:0
    Profile3 = 3, // 10/12-bit 4:2:2, 4:4:4
}

impl Profile {
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => Profile::Profile1,
            2 => Profile::Profile2,
            3 => Profile::Profile3,
            _ => Profile::Profile0,
        }
    }
}

/// VP9 color spaces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum ColorSpace {
    #[default]
    Unknown = 0,
    Bt601 = 1,
    Bt709 = 2,
    Smpte170 = 3,
    Smpte240 = 4,
    Bt2020 = 5,
    Reserved = 6,
    Rgb = 7,
}

impl ColorSpace {
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => ColorSpace::Bt601,
            2 => ColorSpace::Bt709,
            3 => ColorSpace::Smpte170,
            4 => ColorSpace::Smpte240,
            5 => ColorSpace::Bt2020,
            6 => ColorSpace::Reserved,
            7 => ColorSpace::Rgb,
            _ => ColorSpace::Unknown,
        }
    }
}

/// YUV quantization range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorRange {
    #[default]
    StudioSwing,
    FullSwing,
}

// =============================================================================
// Frame-level enums
// =============================================================================

/// Frame types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrameType {
    #[default]
    KeyFrame,
    NonKeyFrame,
}

/// Reference frame slots; the absence of a reference is `Option::None`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum RefFrame {
    Intra = 0,
    Last = 1,
    Golden = 2,
    AltRef = 3,
}

/// Interpolation filter types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum InterpFilter {
    #[default]
    EightTap = 0,
    EightTapSmooth = 1,
    EightTapSharp = 2,
    Bilinear = 3,
    Switchable = 4,
}

/// Mapping from the 2-bit header literal to a concrete filter
pub const INTERP_FILTER_FROM_LITERAL: [InterpFilter; 4] = [
    InterpFilter::EightTapSmooth,
    InterpFilter::EightTap,
    InterpFilter::EightTapSharp,
    InterpFilter::Bilinear,
];

/// Reference selection mode for non-intra frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferenceMode {
    #[default]
    SingleReference,
    CompoundReference,
    ReferenceModeSelect,
}

// =============================================================================
// Block sizes and partitions
// =============================================================================

/// VP9 block sizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum BlockSize {
    Block4x4 = 0,
    Block4x8 = 1,
    Block8x4 = 2,
    #[default]
    Block8x8 = 3,
    Block8x16 = 4,
    Block16x8 = 5,
    Block16x16 = 6,
    Block16x32 = 7,
    Block32x16 = 8,
    Block32x32 = 9,
    Block32x64 = 10,
    Block64x32 = 11,
    Block64x64 = 12,
    Invalid = 13,
}

impl BlockSize {
    /// Width in 8x8 mode-info units
    pub const fn num_8x8_wide(self) -> usize {
        match self {
            BlockSize::Block4x4
            | BlockSize::Block4x8
            | BlockSize::Block8x4
            | BlockSize::Block8x8
            | BlockSize::Block8x16 => 1,
            BlockSize::Block16x8 | BlockSize::Block16x16 | BlockSize::Block16x32 => 2,
            BlockSize::Block32x16 | BlockSize::Block32x32 | BlockSize::Block32x64 => 4,
            BlockSize::Block64x32 | BlockSize::Block64x64 => 8,
            BlockSize::Invalid => 0,
        }
    }

    /// Height in 8x8 mode-info units
    pub const fn num_8x8_high(self) -> usize {
        match self {
            BlockSize::Block4x4
            | BlockSize::Block4x8
            | BlockSize::Block8x4
            | BlockSize::Block8x8
            | BlockSize::Block16x8 => 1,
            BlockSize::Block8x16 | BlockSize::Block16x16 | BlockSize::Block32x16 => 2,
            BlockSize::Block16x32 | BlockSize::Block32x32 | BlockSize::Block64x32 => 4,
            BlockSize::Block32x64 | BlockSize::Block64x64 => 8,
            BlockSize::Invalid => 0,
        }
    }

    /// Width in 4x4 units, saturated at 2 for the sub-8x8 mode loops
    pub const fn num_4x4_wide(self) -> usize {
        match self {
            BlockSize::Block4x4 | BlockSize::Block4x8 => 1,
            BlockSize::Block8x4 | BlockSize::Block8x8 | BlockSize::Block8x16 => 2,
            BlockSize::Block16x8 | BlockSize::Block16x16 | BlockSize::Block16x32 => 4,
            BlockSize::Block32x16 | BlockSize::Block32x32 | BlockSize::Block32x64 => 8,
            BlockSize::Block64x32 | BlockSize::Block64x64 => 16,
            BlockSize::Invalid => 0,
        }
    }

    /// Height in 4x4 units
    pub const fn num_4x4_high(self) -> usize {
        match self {
            BlockSize::Block4x4 | BlockSize::Block8x4 => 1,
            BlockSize::Block4x8 | BlockSize::Block8x8 | BlockSize::Block16x8 => 2,
            BlockSize::Block8x16 | BlockSize::Block16x16 | BlockSize::Block32x16 => 4,
            BlockSize::Block16x32 | BlockSize::Block32x32 | BlockSize::Block64x32 => 8,
            BlockSize::Block32x64 | BlockSize::Block64x64 => 16,
            BlockSize::Invalid => 0,
        }
    }

    /// log2 of the width in mode-info units
    pub const fn mi_width_log2(self) -> u8 {
        match self {
            BlockSize::Block4x4
            | BlockSize::Block4x8
            | BlockSize::Block8x4
            | BlockSize::Block8x8
            | BlockSize::Block8x16 => 0,
            BlockSize::Block16x8 | BlockSize::Block16x16 | BlockSize::Block16x32 => 1,
            BlockSize::Block32x16 | BlockSize::Block32x32 | BlockSize::Block32x64 => 2,
            BlockSize::Block64x32 | BlockSize::Block64x64 => 3,
            BlockSize::Invalid => 0,
        }
    }

    /// log2 of the width in 4x4 units
    pub const fn width_log2(self) -> u8 {
        match self {
            BlockSize::Block4x4 | BlockSize::Block4x8 => 0,
            BlockSize::Block8x4 | BlockSize::Block8x8 | BlockSize::Block8x16 => 1,
            BlockSize::Block16x8 | BlockSize::Block16x16 | BlockSize::Block16x32 => 2,
            BlockSize::Block32x16 | BlockSize::Block32x32 | BlockSize::Block32x64 => 3,
            BlockSize::Block64x32 | BlockSize::Block64x64 => 4,
            BlockSize::Invalid => 0,
        }
    }

    /// log2 of the height in 4x4 units
    pub const fn height_log2(self) -> u8 {
        match self {
            BlockSize::Block4x4 | BlockSize::Block8x4 => 0,
            BlockSize::Block4x8 | BlockSize::Block8x8 | BlockSize::Block16x8 => 1,
            BlockSize::Block8x16 | BlockSize::Block16x16 | BlockSize::Block32x16 => 2,
            BlockSize::Block16x32 | BlockSize::Block32x32 | BlockSize::Block64x32 => 3,
            BlockSize::Block32x64 | BlockSize::Block64x64 => 4,
            BlockSize::Invalid => 0,
        }
    }

    /// Largest transform size that fits the block
    pub const fn max_tx_size(self) -> TxSize {
        match self {
            BlockSize::Block4x4 | BlockSize::Block4x8 | BlockSize::Block8x4 => TxSize::Tx4x4,
            BlockSize::Block8x8 | BlockSize::Block8x16 | BlockSize::Block16x8 => TxSize::Tx8x8,
            BlockSize::Block16x16 | BlockSize::Block16x32 | BlockSize::Block32x16 => {
                TxSize::Tx16x16
            }
            _ => TxSize::Tx32x32,
        }
    }

    /// Mode probability group for inter-frame intra modes
    pub const fn size_group(self) -> usize {
        match self {
            BlockSize::Block4x4 | BlockSize::Block4x8 | BlockSize::Block8x4 => 0,
            BlockSize::Block8x8 | BlockSize::Block8x16 | BlockSize::Block16x8 => 1,
            BlockSize::Block16x16 | BlockSize::Block16x32 | BlockSize::Block32x16 => 2,
            _ => 3,
        }
    }
}

/// Partition types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Partition {
    None = 0,
    Horizontal = 1,
    Vertical = 2,
    Split = 3,
}

impl Partition {
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => Partition::Horizontal,
            2 => Partition::Vertical,
            3 => Partition::Split,
            _ => Partition::None,
        }
    }
}

/// Resulting block size after applying a partition to a square block
pub const fn subsize_lookup(partition: Partition, block_size: BlockSize) -> BlockSize {
    match (partition, block_size) {
        (Partition::None, bs) => bs,

        (Partition::Horizontal, BlockSize::Block64x64) => BlockSize::Block64x32,
        (Partition::Horizontal, BlockSize::Block32x32) => BlockSize::Block32x16,
        (Partition::Horizontal, BlockSize::Block16x16) => BlockSize::Block16x8,
        (Partition::Horizontal, BlockSize::Block8x8) => BlockSize::Block8x4,

        (Partition::Vertical, BlockSize::Block64x64) => BlockSize::Block32x64,
        (Partition::Vertical, BlockSize::Block32x32) => BlockSize::Block16x32,
        (Partition::Vertical, BlockSize::Block16x16) => BlockSize::Block8x16,
        (Partition::Vertical, BlockSize::Block8x8) => BlockSize::Block4x8,

        (Partition::Split, BlockSize::Block64x64) => BlockSize::Block32x32,
        (Partition::Split, BlockSize::Block32x32) => BlockSize::Block16x16,
        (Partition::Split, BlockSize::Block16x16) => BlockSize::Block8x8,
        (Partition::Split, BlockSize::Block8x8) => BlockSize::Block4x4,

        _ => BlockSize::Invalid,
    }
}

// =============================================================================
// Transforms
// =============================================================================

/// Transform sizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum TxSize {
    #[default]
    Tx4x4 = 0,
    Tx8x8 = 1,
    Tx16x16 = 2,
    Tx32x32 = 3,
}

impl TxSize {
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => TxSize::Tx8x8,
            2 => TxSize::Tx16x16,
            3 => TxSize::Tx32x32,
            _ => TxSize::Tx4x4,
        }
    }
}

/// Frame-level transform mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum TxMode {
    #[default]
    Only4x4 = 0,
    Allow8x8 = 1,
    Allow16x16 = 2,
    Allow32x32 = 3,
    TxModeSelect = 4,
}

impl TxMode {
    /// Largest transform size the mode permits
    pub const fn biggest_tx_size(self) -> TxSize {
        match self {
            TxMode::Only4x4 => TxSize::Tx4x4,
            TxMode::Allow8x8 => TxSize::Tx8x8,
            TxMode::Allow16x16 => TxSize::Tx16x16,
            TxMode::Allow32x32 | TxMode::TxModeSelect => TxSize::Tx32x32,
        }
    }
}

// =============================================================================
// Prediction modes
// =============================================================================

/// VP9 intra prediction modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum IntraMode {
    #[default]
    DcPred = 0,
    VPred = 1,
    HPred = 2,
    D45Pred = 3,
    D135Pred = 4,
    D117Pred = 5,
    D153Pred = 6,
    D207Pred = 7,
    D63Pred = 8,
    TmPred = 9,
}

impl IntraMode {
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => IntraMode::VPred,
            2 => IntraMode::HPred,
            3 => IntraMode::D45Pred,
            4 => IntraMode::D135Pred,
            5 => IntraMode::D117Pred,
            6 => IntraMode::D153Pred,
            7 => IntraMode::D207Pred,
            8 => IntraMode::D63Pred,
            9 => IntraMode::TmPred,
            _ => IntraMode::DcPred,
        }
    }
}

/// Inter prediction modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum InterMode {
    NearestMv = 0,
    NearMv = 1,
    #[default]
    ZeroMv = 2,
    NewMv = 3,
}

impl InterMode {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => InterMode::NearestMv,
            1 => InterMode::NearMv,
            3 => InterMode::NewMv,
            _ => InterMode::ZeroMv,
        }
    }
}

// =============================================================================
// Probability remapping
// =============================================================================

/// Maps a term-subexponential delta onto the recentering distance used by
/// the compressed header's probability updates. The first twenty entries
/// are the coarse grid, the rest the remaining values in ascending order.
pub const INV_MAP_TABLE: [u8; 255] = {
    let mut table = [0u8; 255];
    let mut i = 0;
    while i < 20 {
        table[i] = (7 + 13 * i) as u8;
        i += 1;
    }
    let mut v = 1u16;
    while i < 255 {
        let coarse = v >= 7 && v <= 254 && (v - 7) % 13 == 0;
        if !coarse {
            table[i] = v as u8;
            i += 1;
        }
        v += 1;
    }
    table
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_size_mi_units() {
        assert_eq!(BlockSize::Block64x64.num_8x8_wide(), 8);
        assert_eq!(BlockSize::Block64x32.num_8x8_high(), 4);
        assert_eq!(BlockSize::Block8x16.num_8x8_wide(), 1);
        assert_eq!(BlockSize::Block8x16.num_8x8_high(), 2);
        assert_eq!(BlockSize::Block4x8.num_4x4_wide(), 1);
        assert_eq!(BlockSize::Block4x8.num_4x4_high(), 2);
    }

    #[test]
    fn test_subsize_lookup() {
        assert_eq!(
            subsize_lookup(Partition::Split, BlockSize::Block64x64),
            BlockSize::Block32x32
        );
        assert_eq!(
            subsize_lookup(Partition::Horizontal, BlockSize::Block32x32),
            BlockSize::Block32x16
        );
        assert_eq!(
            subsize_lookup(Partition::Vertical, BlockSize::Block8x8),
            BlockSize::Block4x8
        );
        assert_eq!(
            subsize_lookup(Partition::None, BlockSize::Block16x16),
            BlockSize::Block16x16
        );
        assert_eq!(
            subsize_lookup(Partition::Split, BlockSize::Block16x8),
            BlockSize::Invalid
        );
    }

    #[test]
    fn test_max_tx_size() {
        assert_eq!(BlockSize::Block4x8.max_tx_size(), TxSize::Tx4x4);
        assert_eq!(BlockSize::Block8x8.max_tx_size(), TxSize::Tx8x8);
        assert_eq!(BlockSize::Block64x64.max_tx_size(), TxSize::Tx32x32);
    }

    #[test]
    fn test_tx_mode_biggest() {
        assert_eq!(TxMode::Only4x4.biggest_tx_size(), TxSize::Tx4x4);
        assert_eq!(TxMode::TxModeSelect.biggest_tx_size(), TxSize::Tx32x32);
    }

    #[test]
    fn test_inv_map_table_shape() {
        assert_eq!(INV_MAP_TABLE[0], 7);
        assert_eq!(INV_MAP_TABLE[19], 254);
        assert_eq!(INV_MAP_TABLE[20], 1);
        assert_eq!(INV_MAP_TABLE[25], 6);
        // 7 is on the coarse grid, so the fine section skips it
        assert_eq!(INV_MAP_TABLE[26], 8);
        assert_eq!(INV_MAP_TABLE[254], 255);
    }

    #[test]
    fn test_inv_map_table_is_a_permutation() {
        let mut seen = [false; 256];
        for &v in INV_MAP_TABLE.iter() {
            assert!(!seen[v as usize]);
            seen[v as usize] = true;
        }
        // every value 1..=255 appears exactly once
        assert!(!seen[0]);
        assert!(seen[1..].iter().all(|&s| s));
    }
}
