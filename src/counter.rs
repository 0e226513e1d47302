//! Adaptation counters accumulated during a frame parse
//!
//! The shapes mirror the adaptive probability tables so the end-of-frame
//! backward adaptation pass (outside this crate) can walk probability and
//! count side by side. Cleared at the start of every frame that carries a
//! compressed header.

use crate::tables::{
    BLOCK_SIZE_GROUPS, CLASS0_SIZE, COMP_MODE_CONTEXTS, INTER_MODES, INTER_MODE_CONTEXTS,
    INTERP_FILTER_CONTEXTS, INTRA_MODES, IS_INTER_CONTEXTS, MV_CLASSES, MV_FR_SIZE, MV_JOINTS,
    MV_OFFSET_BITS, PARTITION_CONTEXTS, PARTITION_TYPES, REF_CONTEXTS, SKIP_CONTEXTS,
    SWITCHABLE_FILTERS, TX_SIZE_CONTEXTS,
};

/// Counts for one motion-vector component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MvComponentCounts {
    pub sign: [u32; 2],
    pub classes: [u32; MV_CLASSES],
    pub class0: [u32; CLASS0_SIZE],
    pub bits: [[u32; 2]; MV_OFFSET_BITS],
    pub class0_fr: [[u32; MV_FR_SIZE]; CLASS0_SIZE],
    pub fr: [u32; MV_FR_SIZE],
    pub class0_hp: [u32; 2],
    pub hp: [u32; 2],
}

impl Default for MvComponentCounts {
    fn default() -> Self {
        MvComponentCounts {
            sign: [0; 2],
            classes: [0; MV_CLASSES],
            class0: [0; CLASS0_SIZE],
            bits: [[0; 2]; MV_OFFSET_BITS],
            class0_fr: [[0; MV_FR_SIZE]; CLASS0_SIZE],
            fr: [0; MV_FR_SIZE],
            class0_hp: [0; 2],
            hp: [0; 2],
        }
    }
}

/// Counters for every adaptive syntax element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxElementCounter {
    pub partition: [[u32; PARTITION_TYPES]; PARTITION_CONTEXTS],
    pub skip: [[u32; 2]; SKIP_CONTEXTS],
    pub is_inter: [[u32; 2]; IS_INTER_CONTEXTS],
    pub comp_mode: [[u32; 2]; COMP_MODE_CONTEXTS],
    pub single_ref: [[[u32; 2]; 2]; REF_CONTEXTS],
    pub comp_ref: [[u32; 2]; REF_CONTEXTS],
    pub y_mode: [[u32; INTRA_MODES]; BLOCK_SIZE_GROUPS],
    pub uv_mode: [[u32; INTRA_MODES]; INTRA_MODES],
    pub inter_mode: [[u32; INTER_MODES]; INTER_MODE_CONTEXTS],
    pub interp_filter: [[u32; SWITCHABLE_FILTERS]; INTERP_FILTER_CONTEXTS],
    pub tx_8x8: [[u32; 2]; TX_SIZE_CONTEXTS],
    pub tx_16x16: [[u32; 3]; TX_SIZE_CONTEXTS],
    pub tx_32x32: [[u32; 4]; TX_SIZE_CONTEXTS],
    pub mv_joint: [u32; MV_JOINTS],
    pub mv_comp: [MvComponentCounts; 2],
}

impl Default for SyntaxElementCounter {
    fn default() -> Self {
        SyntaxElementCounter {
            partition: [[0; PARTITION_TYPES]; PARTITION_CONTEXTS],
            skip: [[0; 2]; SKIP_CONTEXTS],
            is_inter: [[0; 2]; IS_INTER_CONTEXTS],
            comp_mode: [[0; 2]; COMP_MODE_CONTEXTS],
            single_ref: [[[0; 2]; 2]; REF_CONTEXTS],
            comp_ref: [[0; 2]; REF_CONTEXTS],
            y_mode: [[0; INTRA_MODES]; BLOCK_SIZE_GROUPS],
            uv_mode: [[0; INTRA_MODES]; INTRA_MODES],
            inter_mode: [[0; INTER_MODES]; INTER_MODE_CONTEXTS],
            interp_filter: [[0; SWITCHABLE_FILTERS]; INTERP_FILTER_CONTEXTS],
            tx_8x8: [[0; 2]; TX_SIZE_CONTEXTS],
            tx_16x16: [[0; 3]; TX_SIZE_CONTEXTS],
            tx_32x32: [[0; 4]; TX_SIZE_CONTEXTS],
            mv_joint: [0; MV_JOINTS],
            mv_comp: [MvComponentCounts::default(), MvComponentCounts::default()],
        }
    }
}

impl SyntaxElementCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every counter
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_zeroes_everything() {
        let mut counter = SyntaxElementCounter::new();
        counter.partition[3][1] = 5;
        counter.mv_comp[1].classes[4] = 2;
        counter.clear();
        assert_eq!(counter, SyntaxElementCounter::default());
    }
}
