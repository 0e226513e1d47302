//! Syntax-element tree parsing and context selection
//!
//! Every block-level syntax element is coded as a walk over a small binary
//! tree whose node probabilities come from the working probability set,
//! selected by a context derived from neighbor state. The parser borrows
//! non-owning views of the boolean decoder, the probability tables and the
//! counters for the duration of one element read.

use crate::block::ModeInfo;
use crate::bool_decoder::BoolDecoder;
use crate::counter::SyntaxElementCounter;
use crate::error::Result;
use crate::probs::{FrameContext, KF_PARTITION_PROBS, KF_UV_MODE_PROBS, KF_Y_MODE_PROBS};
use crate::tables::{
    BlockSize, InterMode, InterpFilter, IntraMode, Partition, RefFrame, ReferenceMode, TxSize,
    SWITCHABLE_FILTERS,
};

// =============================================================================
// Symbol trees
// =============================================================================

pub const PARTITION_TREE: [i8; 6] = [0, 2, -1, 4, -2, -3];

pub const INTRA_MODE_TREE: [i8; 18] = [
    0, 2, // dc
    -9, 4, // tm
    -1, 6, // v
    8, 12, //
    -2, 10, // h
    -4, -5, // d135, d117
    -3, 14, // d45
    -8, 16, // d63
    -6, -7, // d153, d207
];

pub const SEGMENT_TREE: [i8; 14] = [2, 4, 6, 8, 10, 12, 0, -1, -2, -3, -4, -5, -6, -7];

pub const INTER_MODE_TREE: [i8; 6] = [-2, 2, 0, 4, -1, -3];

pub const INTERP_FILTER_TREE: [i8; 4] = [0, 2, -1, -2];

pub const MV_JOINT_TREE: [i8; 6] = [0, 2, -1, 4, -2, -3];

pub const MV_CLASS_TREE: [i8; 20] = [
    0, 2, // class 0
    -1, 4, // class 1
    6, 8, //
    -2, -3, // class 2, 3
    10, 12, //
    -4, -5, // class 4, 5
    -6, 14, // class 6
    16, 18, //
    -7, -8, // class 7, 8
    -9, -10, // class 9, 10
];

pub const MV_FR_TREE: [i8; 6] = [0, 2, -1, 4, -2, -3];

/// Leaf order of the switchable-filter tree
const SWITCHABLE_FILTER_FROM_LEAF: [InterpFilter; 3] = [
    InterpFilter::EightTap,
    InterpFilter::EightTapSmooth,
    InterpFilter::EightTapSharp,
];

// =============================================================================
// Context selection
// =============================================================================

/// Partition context from one above and one left context entry
#[inline]
pub fn partition_context(above_entry: u8, left_entry: u8, bsize: BlockSize) -> usize {
    let bsl = bsize.mi_width_log2();
    let above = (above_entry >> bsl) & 1;
    let left = (left_entry >> bsl) & 1;
    bsl as usize * 4 + left as usize * 2 + above as usize
}

/// Sub-block mode of the above neighbor for key-frame mode selection
pub fn above_block_mode(cur: &[IntraMode; 4], above: Option<&ModeInfo>, b: usize) -> IntraMode {
    if b == 0 || b == 1 {
        match above {
            Some(mi) => mi.sub_modes[b + 2],
            None => IntraMode::DcPred,
        }
    } else {
        cur[b - 2]
    }
}

/// Sub-block mode of the left neighbor for key-frame mode selection
pub fn left_block_mode(cur: &[IntraMode; 4], left: Option<&ModeInfo>, b: usize) -> IntraMode {
    if b == 0 || b == 2 {
        match left {
            Some(mi) => mi.sub_modes[b + 1],
            None => IntraMode::DcPred,
        }
    } else {
        cur[b - 1]
    }
}

/// Skip-flag context: number of skipping neighbors
#[inline]
pub fn skip_context(above: Option<&ModeInfo>, left: Option<&ModeInfo>) -> usize {
    above.map_or(0, |mi| mi.skip as usize) + left.map_or(0, |mi| mi.skip as usize)
}

/// Intra/inter context from neighbor prediction types
pub fn is_inter_context(above: Option<&ModeInfo>, left: Option<&ModeInfo>) -> usize {
    match (above, left) {
        (Some(a), Some(l)) => {
            if !a.is_inter && !l.is_inter {
                3
            } else {
                (!a.is_inter || !l.is_inter) as usize
            }
        }
        (Some(e), None) | (None, Some(e)) => 2 * !e.is_inter as usize,
        (None, None) => 0,
    }
}

/// Transform-size context from neighbor sizes
pub fn tx_size_context(
    above: Option<&ModeInfo>,
    left: Option<&ModeInfo>,
    max_tx_size: TxSize,
) -> usize {
    let max = max_tx_size as usize;
    let above_ctx = above.map(|mi| if mi.skip { max } else { mi.tx_size as usize });
    let left_ctx = left.map(|mi| if mi.skip { max } else { mi.tx_size as usize });
    let (a, l) = match (above_ctx, left_ctx) {
        (Some(a), Some(l)) => (a, l),
        (Some(a), None) => (a, a),
        (None, Some(l)) => (l, l),
        (None, None) => (max, max),
    };
    (a + l > max) as usize
}

/// Switchable-filter context from neighbor filters
pub fn interp_filter_context(above: Option<&ModeInfo>, left: Option<&ModeInfo>) -> usize {
    let filter_of = |mi: Option<&ModeInfo>| {
        mi.filter(|mi| mi.is_inter)
            .map_or(SWITCHABLE_FILTERS, |mi| mi.interp_filter as usize)
    };
    let above_type = filter_of(above);
    let left_type = filter_of(left);
    if left_type == above_type {
        left_type
    } else if left_type == SWITCHABLE_FILTERS {
        above_type
    } else if above_type == SWITCHABLE_FILTERS {
        left_type
    } else {
        SWITCHABLE_FILTERS
    }
}

/// Compound-vs-single mode context
pub fn comp_mode_context(
    fixed_ref: RefFrame,
    above: Option<&ModeInfo>,
    left: Option<&ModeInfo>,
) -> usize {
    let fixed = Some(fixed_ref);
    match (above, left) {
        (Some(a), Some(l)) => {
            if !a.has_second_ref() && !l.has_second_ref() {
                ((a.ref_frames[0] == fixed) ^ (l.ref_frames[0] == fixed)) as usize
            } else if !a.has_second_ref() {
                2 + (a.ref_frames[0] == fixed || !a.is_inter) as usize
            } else if !l.has_second_ref() {
                2 + (l.ref_frames[0] == fixed || !l.is_inter) as usize
            } else {
                4
            }
        }
        (Some(e), None) | (None, Some(e)) => {
            if !e.has_second_ref() {
                (e.ref_frames[0] == fixed) as usize
            } else {
                3
            }
        }
        (None, None) => 1,
    }
}

/// Compound-reference context
pub fn comp_ref_context(
    fixed_ref: RefFrame,
    var_refs: [RefFrame; 2],
    var_ref_idx: usize,
    above: Option<&ModeInfo>,
    left: Option<&ModeInfo>,
) -> usize {
    let fixed = Some(fixed_ref);
    let var0 = Some(var_refs[0]);
    let var1 = Some(var_refs[1]);
    let var_ref = |mi: &ModeInfo| {
        if mi.has_second_ref() {
            mi.ref_frames[var_ref_idx]
        } else {
            mi.ref_frames[0]
        }
    };
    match (above, left) {
        (Some(a), Some(l)) => {
            let above_intra = !a.is_inter;
            let left_intra = !l.is_inter;
            if above_intra && left_intra {
                2
            } else if above_intra || left_intra {
                let edge = if above_intra { l } else { a };
                1 + 2 * (var_ref(edge) != var1) as usize
            } else {
                let a_single = !a.has_second_ref();
                let l_single = !l.has_second_ref();
                let vrfa = var_ref(a);
                let vrfl = var_ref(l);
                if vrfa == vrfl && var1 == vrfa {
                    0
                } else if l_single && a_single {
                    if (vrfa == fixed && vrfl == var0) || (vrfl == fixed && vrfa == var0) {
                        4
                    } else if vrfa == vrfl {
                        3
                    } else {
                        1
                    }
                } else if l_single || a_single {
                    let vrfc = if l_single { vrfa } else { vrfl };
                    let rfs = if a_single { vrfa } else { vrfl };
                    if vrfc == var1 && rfs != var1 {
                        1
                    } else if rfs == var1 && vrfc != var1 {
                        2
                    } else {
                        4
                    }
                } else if vrfa == vrfl {
                    4
                } else {
                    2
                }
            }
        }
        (Some(e), None) | (None, Some(e)) => {
            if !e.is_inter {
                2
            } else if e.has_second_ref() {
                4 * (e.ref_frames[var_ref_idx] != var1) as usize
            } else {
                3 * (e.ref_frames[0] != var1) as usize
            }
        }
        (None, None) => 2,
    }
}

/// Single-reference context, first branch (last vs golden/altref)
pub fn single_ref_p1_context(above: Option<&ModeInfo>, left: Option<&ModeInfo>) -> usize {
    let last = Some(RefFrame::Last);
    match (above, left) {
        (Some(a), Some(l)) => {
            let above_intra = !a.is_inter;
            let left_intra = !l.is_inter;
            if above_intra && left_intra {
                2
            } else if above_intra || left_intra {
                let edge = if above_intra { l } else { a };
                if !edge.has_second_ref() {
                    4 * (edge.ref_frames[0] == last) as usize
                } else {
                    1 + (edge.ref_frames[0] == last || edge.ref_frames[1] == last) as usize
                }
            } else {
                let a_second = a.has_second_ref();
                let l_second = l.has_second_ref();
                let (a0, a1) = (a.ref_frames[0], a.ref_frames[1]);
                let (l0, l1) = (l.ref_frames[0], l.ref_frames[1]);
                if a_second && l_second {
                    1 + (a0 == last || a1 == last || l0 == last || l1 == last) as usize
                } else if a_second || l_second {
                    let rfs = if !a_second { a0 } else { l0 };
                    let crf1 = if a_second { a0 } else { l0 };
                    let crf2 = if a_second { a1 } else { l1 };
                    if rfs == last {
                        3 + (crf1 == last || crf2 == last) as usize
                    } else {
                        (crf1 == last || crf2 == last) as usize
                    }
                } else {
                    2 * (a0 == last) as usize + 2 * (l0 == last) as usize
                }
            }
        }
        (Some(e), None) | (None, Some(e)) => {
            if !e.is_inter {
                2
            } else if !e.has_second_ref() {
                4 * (e.ref_frames[0] == last) as usize
            } else {
                1 + (e.ref_frames[0] == last || e.ref_frames[1] == last) as usize
            }
        }
        (None, None) => 2,
    }
}

/// Single-reference context, second branch (golden vs altref)
pub fn single_ref_p2_context(above: Option<&ModeInfo>, left: Option<&ModeInfo>) -> usize {
    let last = Some(RefFrame::Last);
    let golden = Some(RefFrame::Golden);
    let altref = Some(RefFrame::AltRef);
    match (above, left) {
        (Some(a), Some(l)) => {
            let above_intra = !a.is_inter;
            let left_intra = !l.is_inter;
            if above_intra && left_intra {
                2
            } else if above_intra || left_intra {
                let edge = if above_intra { l } else { a };
                if !edge.has_second_ref() {
                    if edge.ref_frames[0] == last {
                        3
                    } else {
                        4 * (edge.ref_frames[0] == golden) as usize
                    }
                } else {
                    1 + 2 * (edge.ref_frames[0] == golden || edge.ref_frames[1] == golden) as usize
                }
            } else {
                let a_second = a.has_second_ref();
                let l_second = l.has_second_ref();
                let (a0, a1) = (a.ref_frames[0], a.ref_frames[1]);
                let (l0, l1) = (l.ref_frames[0], l.ref_frames[1]);
                if a_second && l_second {
                    if a0 == l0 && a1 == l1 {
                        3 * (a0 == golden || a1 == golden || l0 == golden || l1 == golden)
                            as usize
                    } else {
                        2
                    }
                } else if a_second || l_second {
                    let rfs = if !a_second { a0 } else { l0 };
                    let crf1 = if a_second { a0 } else { l0 };
                    let crf2 = if a_second { a1 } else { l1 };
                    if rfs == golden {
                        3 + (crf1 == golden || crf2 == golden) as usize
                    } else if rfs == altref {
                        (crf1 == golden || crf2 == golden) as usize
                    } else {
                        1 + 2 * (crf1 == golden || crf2 == golden) as usize
                    }
                } else if a0 == last && l0 == last {
                    3
                } else if a0 == last || l0 == last {
                    let edge0 = if a0 == last { l0 } else { a0 };
                    4 * (edge0 == golden) as usize
                } else {
                    2 * (a0 == golden) as usize + 2 * (l0 == golden) as usize
                }
            }
        }
        (Some(e), None) | (None, Some(e)) => {
            if !e.is_inter || (e.ref_frames[0] == last && !e.has_second_ref()) {
                2
            } else if !e.has_second_ref() {
                4 * (e.ref_frames[0] == golden) as usize
            } else {
                3 * (e.ref_frames[0] == golden || e.ref_frames[1] == golden) as usize
            }
        }
        (None, None) => 2,
    }
}

// =============================================================================
// Tree parser
// =============================================================================

/// Non-owning view used to resolve one or more syntax elements
pub struct TreeParser<'p, 'r, 'a> {
    bool_dec: &'p mut BoolDecoder<'r, 'a>,
    probs: &'p FrameContext,
    counts: &'p mut SyntaxElementCounter,
}

impl<'p, 'r, 'a> TreeParser<'p, 'r, 'a> {
    pub fn new(
        bool_dec: &'p mut BoolDecoder<'r, 'a>,
        probs: &'p FrameContext,
        counts: &'p mut SyntaxElementCounter,
    ) -> Self {
        TreeParser {
            bool_dec,
            probs,
            counts,
        }
    }
}

impl TreeParser<'_, '_, '_> {
    /// Partition symbol; edge blocks read a constrained form
    pub fn parse_partition(
        &mut self,
        ctx: usize,
        frame_is_intra: bool,
        has_rows: bool,
        has_cols: bool,
    ) -> Result<Partition> {
        let probs = if frame_is_intra {
            &KF_PARTITION_PROBS[ctx]
        } else {
            &self.probs.partition[ctx]
        };
        let partition = if has_rows && has_cols {
            Partition::from_u8(self.bool_dec.read_tree(&PARTITION_TREE, probs)?)
        } else if has_cols {
            if self.bool_dec.read_bool(probs[1])? {
                Partition::Split
            } else {
                Partition::Horizontal
            }
        } else if has_rows {
            if self.bool_dec.read_bool(probs[2])? {
                Partition::Split
            } else {
                Partition::Vertical
            }
        } else {
            Partition::Split
        };
        self.counts.partition[ctx][partition as usize] += 1;
        Ok(partition)
    }

    /// Key-frame y mode; constant tables, not counted
    pub fn parse_default_intra_mode(
        &mut self,
        above_mode: IntraMode,
        left_mode: IntraMode,
    ) -> Result<IntraMode> {
        let probs = &KF_Y_MODE_PROBS[above_mode as usize][left_mode as usize];
        let leaf = self.bool_dec.read_tree(&INTRA_MODE_TREE, probs)?;
        Ok(IntraMode::from_u8(leaf))
    }

    /// Key-frame uv mode; constant tables, not counted
    pub fn parse_default_uv_mode(&mut self, y_mode: IntraMode) -> Result<IntraMode> {
        let probs = &KF_UV_MODE_PROBS[y_mode as usize];
        let leaf = self.bool_dec.read_tree(&INTRA_MODE_TREE, probs)?;
        Ok(IntraMode::from_u8(leaf))
    }

    /// Intra y mode on a non-intra frame, selected by block size group
    pub fn parse_intra_mode(&mut self, size_group: usize) -> Result<IntraMode> {
        let leaf = self
            .bool_dec
            .read_tree(&INTRA_MODE_TREE, &self.probs.y_mode[size_group])?;
        self.counts.y_mode[size_group][leaf as usize] += 1;
        Ok(IntraMode::from_u8(leaf))
    }

    /// Sub-8x8 intra y mode (size group 0)
    pub fn parse_sub_intra_mode(&mut self) -> Result<IntraMode> {
        self.parse_intra_mode(0)
    }

    /// Intra uv mode on a non-intra frame
    pub fn parse_uv_mode(&mut self, y_mode: IntraMode) -> Result<IntraMode> {
        let leaf = self
            .bool_dec
            .read_tree(&INTRA_MODE_TREE, &self.probs.uv_mode[y_mode as usize])?;
        self.counts.uv_mode[y_mode as usize][leaf as usize] += 1;
        Ok(IntraMode::from_u8(leaf))
    }

    /// Explicitly coded segment id
    pub fn parse_segment_id(&mut self, tree_probs: &[u8; 7]) -> Result<u8> {
        self.bool_dec.read_tree(&SEGMENT_TREE, tree_probs)
    }

    /// Temporal segment-id prediction flag
    pub fn parse_seg_id_predicted(&mut self, prob: u8) -> Result<bool> {
        self.bool_dec.read_bool(prob)
    }

    /// Skip flag
    pub fn parse_skip(&mut self, ctx: usize) -> Result<bool> {
        let skip = self.bool_dec.read_bool(self.probs.skip[ctx])?;
        self.counts.skip[ctx][skip as usize] += 1;
        Ok(skip)
    }

    /// Per-block transform size, constrained by the largest allowed size
    pub fn parse_tx_size(&mut self, max_tx_size: TxSize, ctx: usize) -> Result<TxSize> {
        let tx_size = match max_tx_size {
            TxSize::Tx8x8 => {
                let probs = &self.probs.tx_8x8[ctx];
                let size = self.bool_dec.read_bool(probs[0])? as u8;
                self.counts.tx_8x8[ctx][size as usize] += 1;
                size
            }
            TxSize::Tx16x16 => {
                let probs = &self.probs.tx_16x16[ctx];
                let mut size = self.bool_dec.read_bool(probs[0])? as u8;
                if size != 0 {
                    size += self.bool_dec.read_bool(probs[1])? as u8;
                }
                self.counts.tx_16x16[ctx][size as usize] += 1;
                size
            }
            TxSize::Tx32x32 => {
                let probs = &self.probs.tx_32x32[ctx];
                let mut size = self.bool_dec.read_bool(probs[0])? as u8;
                if size != 0 {
                    size += self.bool_dec.read_bool(probs[1])? as u8;
                    if size == 2 {
                        size += self.bool_dec.read_bool(probs[2])? as u8;
                    }
                }
                self.counts.tx_32x32[ctx][size as usize] += 1;
                size
            }
            TxSize::Tx4x4 => 0,
        };
        Ok(TxSize::from_u8(tx_size))
    }

    /// Intra/inter decision
    pub fn parse_is_inter(&mut self, ctx: usize) -> Result<bool> {
        let is_inter = self.bool_dec.read_bool(self.probs.is_inter[ctx])?;
        self.counts.is_inter[ctx][is_inter as usize] += 1;
        Ok(is_inter)
    }

    /// Per-block single-vs-compound decision
    pub fn parse_comp_mode(&mut self, ctx: usize) -> Result<ReferenceMode> {
        let compound = self.bool_dec.read_bool(self.probs.comp_mode[ctx])?;
        self.counts.comp_mode[ctx][compound as usize] += 1;
        Ok(if compound {
            ReferenceMode::CompoundReference
        } else {
            ReferenceMode::SingleReference
        })
    }

    /// Index of the variable reference of a compound pair
    pub fn parse_comp_ref(&mut self, ctx: usize) -> Result<usize> {
        let bit = self.bool_dec.read_bool(self.probs.comp_ref[ctx])?;
        self.counts.comp_ref[ctx][bit as usize] += 1;
        Ok(bit as usize)
    }

    /// First single-reference branch
    pub fn parse_single_ref_p1(&mut self, ctx: usize) -> Result<bool> {
        let bit = self.bool_dec.read_bool(self.probs.single_ref[ctx][0])?;
        self.counts.single_ref[ctx][0][bit as usize] += 1;
        Ok(bit)
    }

    /// Second single-reference branch
    pub fn parse_single_ref_p2(&mut self, ctx: usize) -> Result<bool> {
        let bit = self.bool_dec.read_bool(self.probs.single_ref[ctx][1])?;
        self.counts.single_ref[ctx][1][bit as usize] += 1;
        Ok(bit)
    }

    /// Inter prediction mode, selected by the mv-reference mode context
    pub fn parse_inter_mode(&mut self, ctx: usize) -> Result<InterMode> {
        let leaf = self
            .bool_dec
            .read_tree(&INTER_MODE_TREE, &self.probs.inter_mode[ctx])?;
        self.counts.inter_mode[ctx][leaf as usize] += 1;
        Ok(InterMode::from_u8(leaf))
    }

    /// Switchable interpolation filter
    pub fn parse_interp_filter(&mut self, ctx: usize) -> Result<InterpFilter> {
        let leaf = self
            .bool_dec
            .read_tree(&INTERP_FILTER_TREE, &self.probs.interp_filter[ctx])?;
        self.counts.interp_filter[ctx][leaf as usize] += 1;
        Ok(SWITCHABLE_FILTER_FROM_LEAF[leaf as usize])
    }

    /// Motion-vector joint
    pub fn parse_mv_joint(&mut self) -> Result<u8> {
        let joint = self
            .bool_dec
            .read_tree(&MV_JOINT_TREE, &self.probs.mv.joints)?;
        self.counts.mv_joint[joint as usize] += 1;
        Ok(joint)
    }

    /// One motion-vector component difference, in 1/8 pel
    pub fn parse_mv_component(&mut self, comp: usize, use_hp: bool) -> Result<i32> {
        let probs = &self.probs.mv.comps[comp];
        let sign = self.bool_dec.read_bool(probs.sign)?;
        self.counts.mv_comp[comp].sign[sign as usize] += 1;

        let class = self.bool_dec.read_tree(&MV_CLASS_TREE, &probs.classes)?;
        self.counts.mv_comp[comp].classes[class as usize] += 1;

        let magnitude = if class == 0 {
            let class0_bit = self.bool_dec.read_bool(probs.class0_bit)? as usize;
            self.counts.mv_comp[comp].class0[class0_bit] += 1;

            let fr = self
                .bool_dec
                .read_tree(&MV_FR_TREE, &probs.class0_fr[class0_bit])?;
            self.counts.mv_comp[comp].class0_fr[class0_bit][fr as usize] += 1;

            let hp = if use_hp {
                let bit = self.bool_dec.read_bool(probs.class0_hp)?;
                self.counts.mv_comp[comp].class0_hp[bit as usize] += 1;
                bit as usize
            } else {
                1
            };
            ((class0_bit << 3) | ((fr as usize) << 1) | hp) + 1
        } else {
            let num_bits = class as usize;
            let mut offset = 0usize;
            for i in 0..num_bits {
                let bit = self.bool_dec.read_bool(probs.bits[i])?;
                self.counts.mv_comp[comp].bits[i][bit as usize] += 1;
                offset |= (bit as usize) << i;
            }

            let fr = self.bool_dec.read_tree(&MV_FR_TREE, &probs.fr)?;
            self.counts.mv_comp[comp].fr[fr as usize] += 1;

            let hp = if use_hp {
                let bit = self.bool_dec.read_bool(probs.hp)?;
                self.counts.mv_comp[comp].hp[bit as usize] += 1;
                bit as usize
            } else {
                1
            };
            (2 << (num_bits + 2)) + (((offset << 3) | ((fr as usize) << 1) | hp) + 1)
        };

        Ok(if sign {
            -(magnitude as i32)
        } else {
            magnitude as i32
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inter_info(ref0: RefFrame, ref1: Option<RefFrame>) -> ModeInfo {
        ModeInfo {
            is_inter: true,
            ref_frames: [Some(ref0), ref1],
            ..Default::default()
        }
    }

    fn intra_info() -> ModeInfo {
        ModeInfo {
            is_inter: false,
            ref_frames: [Some(RefFrame::Intra), None],
            ..Default::default()
        }
    }

    #[test]
    fn test_partition_context_range() {
        assert_eq!(partition_context(0, 0, BlockSize::Block64x64), 12);
        assert_eq!(partition_context(0, 0, BlockSize::Block8x8), 0);
        // entry 15 means every size bit set
        assert_eq!(partition_context(15, 15, BlockSize::Block32x32), 8 + 3);
        assert_eq!(partition_context(15, 0, BlockSize::Block16x16), 4 + 1);
    }

    #[test]
    fn test_skip_context() {
        let skipping = ModeInfo {
            skip: true,
            ..Default::default()
        };
        assert_eq!(skip_context(None, None), 0);
        assert_eq!(skip_context(Some(&skipping), None), 1);
        assert_eq!(skip_context(Some(&skipping), Some(&skipping)), 2);
    }

    #[test]
    fn test_is_inter_context() {
        let inter = inter_info(RefFrame::Last, None);
        let intra = intra_info();
        assert_eq!(is_inter_context(None, None), 0);
        assert_eq!(is_inter_context(Some(&inter), Some(&inter)), 0);
        assert_eq!(is_inter_context(Some(&intra), Some(&inter)), 1);
        assert_eq!(is_inter_context(Some(&intra), Some(&intra)), 3);
        assert_eq!(is_inter_context(Some(&intra), None), 2);
        assert_eq!(is_inter_context(Some(&inter), None), 0);
    }

    #[test]
    fn test_tx_size_context() {
        let big = ModeInfo {
            tx_size: TxSize::Tx32x32,
            ..Default::default()
        };
        let small = ModeInfo {
            tx_size: TxSize::Tx4x4,
            ..Default::default()
        };
        assert_eq!(tx_size_context(None, None, TxSize::Tx16x16), 1);
        assert_eq!(tx_size_context(Some(&small), Some(&small), TxSize::Tx16x16), 0);
        assert_eq!(tx_size_context(Some(&big), Some(&small), TxSize::Tx16x16), 1);
        // a skipping neighbor counts as the maximum size
        let skipping = ModeInfo {
            skip: true,
            tx_size: TxSize::Tx4x4,
            ..Default::default()
        };
        assert_eq!(
            tx_size_context(Some(&skipping), Some(&small), TxSize::Tx8x8),
            0
        );
    }

    #[test]
    fn test_single_ref_p1_context() {
        let last = inter_info(RefFrame::Last, None);
        let golden = inter_info(RefFrame::Golden, None);
        assert_eq!(single_ref_p1_context(None, None), 2);
        assert_eq!(single_ref_p1_context(Some(&last), Some(&last)), 4);
        assert_eq!(single_ref_p1_context(Some(&golden), Some(&golden)), 0);
        assert_eq!(single_ref_p1_context(Some(&last), Some(&golden)), 2);
        assert_eq!(single_ref_p1_context(Some(&intra_info()), Some(&last)), 4);
    }

    #[test]
    fn test_comp_mode_context() {
        let fixed = inter_info(RefFrame::AltRef, None);
        let other = inter_info(RefFrame::Last, None);
        assert_eq!(comp_mode_context(RefFrame::AltRef, None, None), 1);
        assert_eq!(
            comp_mode_context(RefFrame::AltRef, Some(&fixed), Some(&other)),
            1
        );
        assert_eq!(
            comp_mode_context(RefFrame::AltRef, Some(&other), Some(&other)),
            0
        );
        let compound = inter_info(RefFrame::Last, Some(RefFrame::AltRef));
        assert_eq!(
            comp_mode_context(RefFrame::AltRef, Some(&compound), Some(&compound)),
            4
        );
    }

    #[test]
    fn test_interp_filter_context() {
        let smooth = ModeInfo {
            is_inter: true,
            interp_filter: InterpFilter::EightTapSmooth,
            ..Default::default()
        };
        let sharp = ModeInfo {
            is_inter: true,
            interp_filter: InterpFilter::EightTapSharp,
            ..Default::default()
        };
        assert_eq!(interp_filter_context(None, None), SWITCHABLE_FILTERS);
        assert_eq!(interp_filter_context(Some(&smooth), None), 1);
        assert_eq!(interp_filter_context(Some(&smooth), Some(&sharp)), 3);
        assert_eq!(interp_filter_context(Some(&sharp), Some(&sharp)), 2);
    }
}
