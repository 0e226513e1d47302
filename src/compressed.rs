//! Compressed header: per-frame probability updates
//!
//! The compressed header is an arithmetic-coded section that transmits
//! small adjustments to the working probability set using a
//! term-subexponential code, plus the frame's transform mode and
//! reference mode.

use crate::bool_decoder::BoolDecoder;
use crate::decoder::Vp9Parser;
use crate::error::Result;
use crate::tables::{
    RefFrame, ReferenceMode, TxMode, BLOCK_SIZE_GROUPS, COMP_MODE_CONTEXTS, CLASS0_SIZE,
    INTER_MODES, INTER_MODE_CONTEXTS, INTERP_FILTER_CONTEXTS, INTRA_MODES, INV_MAP_TABLE,
    IS_INTER_CONTEXTS, MV_CLASSES, MV_FR_SIZE, MV_JOINTS, MV_OFFSET_BITS, PARTITION_CONTEXTS,
    PARTITION_TYPES, REF_CONTEXTS, SKIP_CONTEXTS, SWITCHABLE_FILTERS, TX_SIZE_CONTEXTS,
};

/// Probability an update follows for each diff-coded entry
const UPDATE_PROB: u8 = 252;

fn inv_recenter_nonneg(v: u32, m: u32) -> u32 {
    if v > 2 * m {
        v
    } else if v & 1 != 0 {
        m - ((v + 1) >> 1)
    } else {
        m + (v >> 1)
    }
}

/// Apply a decoded delta to a probability
pub(crate) fn inv_remap_prob(delta: u8, prob: u8) -> u8 {
    let m = prob as u32 - 1;
    let v = INV_MAP_TABLE[delta as usize] as u32;
    if (m << 1) <= 255 {
        (1 + inv_recenter_nonneg(v, m)) as u8
    } else {
        (255 - inv_recenter_nonneg(v, 254 - m)) as u8
    }
}

fn decode_term_subexp(bool_dec: &mut BoolDecoder) -> Result<u8> {
    if bool_dec.read_literal(1)? == 0 {
        return Ok(bool_dec.read_literal(4)? as u8);
    }
    if bool_dec.read_literal(1)? == 0 {
        return Ok(bool_dec.read_literal(4)? as u8 + 16);
    }
    if bool_dec.read_literal(1)? == 0 {
        return Ok(bool_dec.read_literal(4)? as u8 + 32);
    }
    let v = bool_dec.read_literal(7)?;
    if v < 65 {
        return Ok(v as u8 + 64);
    }
    Ok(((v << 1) - 1 + bool_dec.read_literal(1)?) as u8)
}

fn diff_update_prob(bool_dec: &mut BoolDecoder, prob: u8) -> Result<u8> {
    if bool_dec.read_bool(UPDATE_PROB)? {
        let delta = decode_term_subexp(bool_dec)?;
        Ok(inv_remap_prob(delta, prob))
    } else {
        Ok(prob)
    }
}

fn update_mv_prob(bool_dec: &mut BoolDecoder, prob: u8) -> Result<u8> {
    if bool_dec.read_bool(UPDATE_PROB)? {
        Ok(((bool_dec.read_literal(7)? as u8) << 1) | 1)
    } else {
        Ok(prob)
    }
}

impl Vp9Parser {
    pub(crate) fn compressed_header(&mut self, bool_dec: &mut BoolDecoder) -> Result<()> {
        self.read_tx_mode(bool_dec)?;
        if self.header.tx_mode == TxMode::TxModeSelect {
            self.tx_mode_probs(bool_dec)?;
        }
        self.read_coef_probs(bool_dec)?;
        self.read_skip_prob(bool_dec)?;
        if !self.header.frame_is_intra {
            self.read_inter_mode_probs(bool_dec)?;
            if self.header.interpolation_filter == crate::tables::InterpFilter::Switchable {
                self.read_interp_filter_probs(bool_dec)?;
            }
            self.read_is_inter_probs(bool_dec)?;
            self.frame_reference_mode(bool_dec)?;
            self.frame_reference_mode_probs(bool_dec)?;
            self.read_y_mode_probs(bool_dec)?;
            self.read_partition_probs(bool_dec)?;
            self.mv_probs(bool_dec)?;
        }
        Ok(())
    }

    fn read_tx_mode(&mut self, bool_dec: &mut BoolDecoder) -> Result<()> {
        self.header.tx_mode = if self.header.lossless {
            TxMode::Only4x4
        } else {
            let mut tx_mode = bool_dec.read_literal(2)?;
            if tx_mode == TxMode::Allow32x32 as u32 {
                tx_mode += bool_dec.read_literal(1)?;
            }
            match tx_mode {
                0 => TxMode::Only4x4,
                1 => TxMode::Allow8x8,
                2 => TxMode::Allow16x16,
                3 => TxMode::Allow32x32,
                _ => TxMode::TxModeSelect,
            }
        };
        Ok(())
    }

    fn tx_mode_probs(&mut self, bool_dec: &mut BoolDecoder) -> Result<()> {
        let probs = self.probs.current_mut();
        for ctx in 0..TX_SIZE_CONTEXTS {
            probs.tx_8x8[ctx][0] = diff_update_prob(bool_dec, probs.tx_8x8[ctx][0])?;
        }
        for ctx in 0..TX_SIZE_CONTEXTS {
            for i in 0..2 {
                probs.tx_16x16[ctx][i] = diff_update_prob(bool_dec, probs.tx_16x16[ctx][i])?;
            }
        }
        for ctx in 0..TX_SIZE_CONTEXTS {
            for i in 0..3 {
                probs.tx_32x32[ctx][i] = diff_update_prob(bool_dec, probs.tx_32x32[ctx][i])?;
            }
        }
        Ok(())
    }

    fn read_coef_probs(&mut self, bool_dec: &mut BoolDecoder) -> Result<()> {
        let biggest_tx = self.header.tx_mode.biggest_tx_size() as usize;
        for tx_size in 0..=biggest_tx {
            if bool_dec.read_literal(1)? != 1 {
                continue;
            }
            let coef = &mut self.probs.current_mut().coef[tx_size];
            for plane in coef.iter_mut() {
                for ref_type in plane.iter_mut() {
                    for (band, ctxs) in ref_type.iter_mut().enumerate() {
                        let max_ctx = if band == 0 { 3 } else { 6 };
                        for ctx in ctxs.iter_mut().take(max_ctx) {
                            for prob in ctx.iter_mut() {
                                *prob = diff_update_prob(bool_dec, *prob)?;
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn read_skip_prob(&mut self, bool_dec: &mut BoolDecoder) -> Result<()> {
        let probs = self.probs.current_mut();
        for i in 0..SKIP_CONTEXTS {
            probs.skip[i] = diff_update_prob(bool_dec, probs.skip[i])?;
        }
        Ok(())
    }

    fn read_inter_mode_probs(&mut self, bool_dec: &mut BoolDecoder) -> Result<()> {
        let probs = self.probs.current_mut();
        for ctx in 0..INTER_MODE_CONTEXTS {
            for i in 0..INTER_MODES - 1 {
                probs.inter_mode[ctx][i] = diff_update_prob(bool_dec, probs.inter_mode[ctx][i])?;
            }
        }
        Ok(())
    }

    fn read_interp_filter_probs(&mut self, bool_dec: &mut BoolDecoder) -> Result<()> {
        let probs = self.probs.current_mut();
        for ctx in 0..INTERP_FILTER_CONTEXTS {
            for i in 0..SWITCHABLE_FILTERS - 1 {
                probs.interp_filter[ctx][i] =
                    diff_update_prob(bool_dec, probs.interp_filter[ctx][i])?;
            }
        }
        Ok(())
    }

    fn read_is_inter_probs(&mut self, bool_dec: &mut BoolDecoder) -> Result<()> {
        let probs = self.probs.current_mut();
        for i in 0..IS_INTER_CONTEXTS {
            probs.is_inter[i] = diff_update_prob(bool_dec, probs.is_inter[i])?;
        }
        Ok(())
    }

    fn frame_reference_mode(&mut self, bool_dec: &mut BoolDecoder) -> Result<()> {
        let sign_bias = &self.header.ref_frame_sign_bias;
        let compound_allowed = sign_bias[RefFrame::Golden as usize]
            != sign_bias[RefFrame::Last as usize]
            || sign_bias[RefFrame::AltRef as usize] != sign_bias[RefFrame::Last as usize];

        self.header.reference_mode = if compound_allowed {
            if bool_dec.read_literal(1)? == 0 {
                ReferenceMode::SingleReference
            } else if bool_dec.read_literal(1)? == 0 {
                ReferenceMode::CompoundReference
            } else {
                ReferenceMode::ReferenceModeSelect
            }
        } else {
            ReferenceMode::SingleReference
        };
        if self.header.reference_mode != ReferenceMode::SingleReference {
            self.setup_compound_reference_mode();
        }
        Ok(())
    }

    fn setup_compound_reference_mode(&mut self) {
        let sign_bias = &self.header.ref_frame_sign_bias;
        let (fixed, var) = if sign_bias[RefFrame::Last as usize]
            == sign_bias[RefFrame::Golden as usize]
        {
            (RefFrame::AltRef, [RefFrame::Last, RefFrame::Golden])
        } else if sign_bias[RefFrame::Last as usize] == sign_bias[RefFrame::AltRef as usize] {
            (RefFrame::Golden, [RefFrame::Last, RefFrame::AltRef])
        } else {
            (RefFrame::Last, [RefFrame::Golden, RefFrame::AltRef])
        };
        self.header.comp_fixed_ref = fixed;
        self.header.comp_var_ref = var;
    }

    fn frame_reference_mode_probs(&mut self, bool_dec: &mut BoolDecoder) -> Result<()> {
        let reference_mode = self.header.reference_mode;
        let probs = self.probs.current_mut();
        if reference_mode == ReferenceMode::ReferenceModeSelect {
            for i in 0..COMP_MODE_CONTEXTS {
                probs.comp_mode[i] = diff_update_prob(bool_dec, probs.comp_mode[i])?;
            }
        }
        if reference_mode != ReferenceMode::CompoundReference {
            for i in 0..REF_CONTEXTS {
                probs.single_ref[i][0] = diff_update_prob(bool_dec, probs.single_ref[i][0])?;
                probs.single_ref[i][1] = diff_update_prob(bool_dec, probs.single_ref[i][1])?;
            }
        }
        if reference_mode != ReferenceMode::SingleReference {
            for i in 0..REF_CONTEXTS {
                probs.comp_ref[i] = diff_update_prob(bool_dec, probs.comp_ref[i])?;
            }
        }
        Ok(())
    }

    fn read_y_mode_probs(&mut self, bool_dec: &mut BoolDecoder) -> Result<()> {
        let probs = self.probs.current_mut();
        for group in 0..BLOCK_SIZE_GROUPS {
            for i in 0..INTRA_MODES - 1 {
                probs.y_mode[group][i] = diff_update_prob(bool_dec, probs.y_mode[group][i])?;
            }
        }
        Ok(())
    }

    fn read_partition_probs(&mut self, bool_dec: &mut BoolDecoder) -> Result<()> {
        let probs = self.probs.current_mut();
        for ctx in 0..PARTITION_CONTEXTS {
            for i in 0..PARTITION_TYPES - 1 {
                probs.partition[ctx][i] = diff_update_prob(bool_dec, probs.partition[ctx][i])?;
            }
        }
        Ok(())
    }

    fn mv_probs(&mut self, bool_dec: &mut BoolDecoder) -> Result<()> {
        let allow_high_precision_mv = self.header.allow_high_precision_mv;
        let mv = &mut self.probs.current_mut().mv;

        for i in 0..MV_JOINTS - 1 {
            mv.joints[i] = update_mv_prob(bool_dec, mv.joints[i])?;
        }

        for comp in mv.comps.iter_mut() {
            comp.sign = update_mv_prob(bool_dec, comp.sign)?;
            for i in 0..MV_CLASSES - 1 {
                comp.classes[i] = update_mv_prob(bool_dec, comp.classes[i])?;
            }
            comp.class0_bit = update_mv_prob(bool_dec, comp.class0_bit)?;
            for i in 0..MV_OFFSET_BITS {
                comp.bits[i] = update_mv_prob(bool_dec, comp.bits[i])?;
            }
        }

        for comp in mv.comps.iter_mut() {
            for j in 0..CLASS0_SIZE {
                for k in 0..MV_FR_SIZE - 1 {
                    comp.class0_fr[j][k] = update_mv_prob(bool_dec, comp.class0_fr[j][k])?;
                }
            }
            for k in 0..MV_FR_SIZE - 1 {
                comp.fr[k] = update_mv_prob(bool_dec, comp.fr[k])?;
            }
        }

        if allow_high_precision_mv {
            for comp in mv.comps.iter_mut() {
                comp.class0_hp = update_mv_prob(bool_dec, comp.class0_hp)?;
                comp.hp = update_mv_prob(bool_dec, comp.hp)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inv_recenter_nonneg() {
        assert_eq!(inv_recenter_nonneg(10, 2), 10);
        assert_eq!(inv_recenter_nonneg(3, 5), 3); // odd: 5 - 2
        assert_eq!(inv_recenter_nonneg(4, 5), 7); // even: 5 + 2
    }

    #[test]
    fn test_inv_remap_prob() {
        // delta 5 maps to recenter distance 72; prob 100 recenters to 136
        assert_eq!(INV_MAP_TABLE[5], 72);
        assert_eq!(inv_remap_prob(5, 100), 136);
        // delta 20 is the smallest fine-grid step
        assert_eq!(INV_MAP_TABLE[20], 1);
        assert_eq!(inv_remap_prob(20, 128), 127);
    }

    #[test]
    fn test_inv_remap_prob_stays_in_range() {
        for delta in 0..=253u8 {
            for prob in 1..=255u8 {
                let remapped = inv_remap_prob(delta, prob);
                assert!(remapped >= 1, "delta {delta} prob {prob}");
            }
        }
    }
}
