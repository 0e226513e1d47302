//! Motion vectors and reference-vector candidate selection
//!
//! Inter blocks predict their motion vectors from neighboring mode info.
//! The scan walks up to eight candidate positions per block size, prefers
//! candidates using the same reference frame, falls back to sign-bias
//! scaled vectors from other references, and derives the context used to
//! code the block's inter mode.

use crate::block::{ModeInfo, ModeInfoGrid};
use crate::tables::{BlockSize, InterMode, RefFrame};

/// Candidate clamp border around the visible frame, in 1/8 pel
const MV_BORDER: i32 = 16 * 8;

/// Motion vector in 1/8-pel units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionVector {
    pub row: i16,
    pub col: i16,
}

impl MotionVector {
    pub const fn new(row: i16, col: i16) -> Self {
        MotionVector { row, col }
    }

    pub const fn zero() -> Self {
        MotionVector { row: 0, col: 0 }
    }

    /// Whether high-precision coding applies for a vector predicted from
    /// this reference (both components under one full pel times eight)
    #[inline]
    pub fn use_hp(&self) -> bool {
        self.row.unsigned_abs() < 64 && self.col.unsigned_abs() < 64
    }

    /// Drop the high-precision bit unless it is both allowed and usable
    pub fn lower_precision(&mut self, allow_hp: bool) {
        if allow_hp && self.use_hp() {
            return;
        }
        if self.row & 1 != 0 {
            self.row += if self.row > 0 { -1 } else { 1 };
        }
        if self.col & 1 != 0 {
            self.col += if self.col > 0 { -1 } else { 1 };
        }
    }

    fn clamp(&mut self, min_col: i32, max_col: i32, min_row: i32, max_row: i32) {
        self.col = (self.col as i32).max(min_col).min(max_col) as i16;
        self.row = (self.row as i32).max(min_row).min(max_row) as i16;
    }
}

/// Candidate positions relative to the block, in mode-info units,
/// indexed by block size. The first two entries get sub-block resolution
/// and feed the mode context.
const MV_REF_BLOCKS: [[(i8, i8); 8]; 13] = [
    // 4x4
    [(-1, 0), (0, -1), (-1, -1), (-2, 0), (0, -2), (-2, -1), (-1, -2), (-2, -2)],
    // 4x8
    [(-1, 0), (0, -1), (-1, -1), (-2, 0), (0, -2), (-2, -1), (-1, -2), (-2, -2)],
    // 8x4
    [(-1, 0), (0, -1), (-1, -1), (-2, 0), (0, -2), (-2, -1), (-1, -2), (-2, -2)],
    // 8x8
    [(-1, 0), (0, -1), (-1, -1), (-2, 0), (0, -2), (-2, -1), (-1, -2), (-2, -2)],
    // 8x16
    [(0, -1), (-1, 0), (1, -1), (-1, -1), (0, -2), (-2, 0), (-2, -1), (-1, -2)],
    // 16x8
    [(-1, 0), (0, -1), (-1, 1), (-1, -1), (-2, 0), (0, -2), (-1, -2), (-2, -1)],
    // 16x16
    [(-1, 0), (0, -1), (-1, 1), (1, -1), (-1, -1), (-3, 0), (0, -3), (-3, -3)],
    // 16x32
    [(0, -1), (-1, 0), (2, -1), (-1, -1), (-1, 1), (0, -3), (-3, 0), (-3, -3)],
    // 32x16
    [(-1, 0), (0, -1), (-1, 2), (-1, -1), (1, -1), (-3, 0), (0, -3), (-3, -3)],
    // 32x32
    [(-1, 1), (1, -1), (-1, 2), (2, -1), (-1, -1), (-3, 0), (0, -3), (-3, -3)],
    // 32x64
    [(0, -1), (-1, 0), (4, -1), (-1, 2), (-1, -1), (0, -3), (-3, 0), (2, -1)],
    // 64x32
    [(-1, 0), (0, -1), (-1, 4), (2, -1), (-1, -1), (-3, 0), (0, -3), (-1, 2)],
    // 64x64
    [(-1, 3), (3, -1), (-1, 4), (4, -1), (-1, -1), (-1, 0), (0, -1), (-1, 6)],
];

/// Neighbor-mode weights feeding the inter-mode context
fn mode_to_counter(info: &ModeInfo) -> usize {
    if !info.is_inter {
        9
    } else {
        match info.inter_mode {
            InterMode::NearestMv | InterMode::NearMv => 0,
            InterMode::NewMv => 1,
            InterMode::ZeroMv => 3,
        }
    }
}

/// Maps the summed neighbor weights onto an inter-mode context
const COUNTER_TO_CONTEXT: [u8; 19] = [
    2, // both predicted
    3, // new plus non-intra
    4, // both new
    1, // zero plus predicted
    3, // new plus non-intra
    0, 0, // unreachable sums
    0, 0, //
    5, // intra plus non-intra
    5, // intra plus non-intra
    0, //
    5, // intra plus non-intra
    0, 0, 0, 0, 0, //
    6, // both intra
];

/// Sub-block index used when a sub-8x8 neighbor supplies a candidate,
/// indexed by [current sub-block][neighbor is above]
const SUB_BLOCK_FOR_NEIGHBOR: [[usize; 2]; 4] = [[1, 2], [1, 3], [3, 2], [3, 3]];

/// At most two reference motion-vector candidates survive the scan
#[derive(Debug, Default, Clone, Copy)]
pub struct CandidateList {
    mvs: [MotionVector; 2],
    count: usize,
}

impl CandidateList {
    /// Add a candidate; duplicates of the first entry are dropped.
    /// Returns true once the list is full and the scan should stop.
    fn push(&mut self, mv: MotionVector) -> bool {
        if self.count > 0 {
            if mv != self.mvs[0] {
                self.mvs[1] = mv;
                self.count = 2;
                return true;
            }
            false
        } else {
            self.mvs[0] = mv;
            self.count = 1;
            false
        }
    }

    pub fn get(&self, idx: usize) -> MotionVector {
        self.mvs[idx]
    }
}

/// Immutable view of the state the candidate scan needs
pub struct MvRefScan<'a> {
    pub grid: &'a ModeInfoGrid,
    pub mi_rows: usize,
    pub mi_cols: usize,
    pub tile_col_start: usize,
    pub tile_col_end: usize,
    /// Per-reference sign bias, indexed by `RefFrame`
    pub sign_bias: [bool; 4],
}

impl MvRefScan<'_> {
    fn is_inside(&self, mi_row: usize, mi_col: usize, offset: (i8, i8)) -> bool {
        let row = mi_row as i64 + offset.0 as i64;
        let col = mi_col as i64 + offset.1 as i64;
        row >= 0
            && row < self.mi_rows as i64
            && col >= self.tile_col_start as i64
            && col < self.tile_col_end as i64
    }

    fn candidate(&self, mi_row: usize, mi_col: usize, offset: (i8, i8)) -> &ModeInfo {
        let row = (mi_row as i64 + offset.0 as i64) as usize;
        let col = (mi_col as i64 + offset.1 as i64) as usize;
        self.grid.get(row, col).expect("candidate inside grid")
    }

    /// A candidate's vector for the given reference slot, at sub-block
    /// resolution when both the candidate and the request are sub-8x8
    fn sub_block_mv(
        &self,
        candidate: &ModeInfo,
        which: usize,
        offset_col: i8,
        block: Option<usize>,
    ) -> MotionVector {
        match block {
            Some(idx) if candidate.block_size < BlockSize::Block8x8 => {
                let sub = SUB_BLOCK_FOR_NEIGHBOR[idx][(offset_col == 0) as usize];
                candidate.block_mvs[which][sub]
            }
            _ => candidate.mv[which],
        }
    }

    /// A candidate's vector for a different reference, negated when the
    /// two references sit on opposite sides of the current frame
    fn scaled_mv(&self, candidate: &ModeInfo, which: usize, ref_frame: RefFrame) -> MotionVector {
        let mut mv = candidate.mv[which];
        let candidate_ref = candidate.ref_frames[which].expect("inter candidate has ref");
        if self.sign_bias[candidate_ref as usize] != self.sign_bias[ref_frame as usize] {
            mv.row = -mv.row;
            mv.col = -mv.col;
        }
        mv
    }

    /// Scan the neighborhood for reference-vector candidates
    ///
    /// Returns the candidate list and the inter-mode context for
    /// `ref_frame`. `block` selects sub-block resolution for sub-8x8
    /// scans; the context is only meaningful for whole-block scans.
    pub fn find_mv_refs(
        &self,
        bsize: BlockSize,
        mi_row: usize,
        mi_col: usize,
        ref_frame: RefFrame,
        block: Option<usize>,
    ) -> (CandidateList, u8) {
        let positions = &MV_REF_BLOCKS[bsize as usize];
        let mut list = CandidateList::default();
        let mut context_counter = 0usize;
        let mut different_ref_found = false;
        let mut done = false;

        // The two nearest positions resolve sub-block vectors and feed
        // the mode context.
        for &offset in &positions[..2] {
            if !self.is_inside(mi_row, mi_col, offset) {
                continue;
            }
            let candidate = self.candidate(mi_row, mi_col, offset);
            different_ref_found = true;
            context_counter += mode_to_counter(candidate);

            if candidate.ref_frames[0] == Some(ref_frame) {
                done = list.push(self.sub_block_mv(candidate, 0, offset.1, block));
            } else if candidate.ref_frames[1] == Some(ref_frame) {
                done = list.push(self.sub_block_mv(candidate, 1, offset.1, block));
            }
            if done {
                break;
            }
        }

        if !done {
            for &offset in &positions[2..] {
                if !self.is_inside(mi_row, mi_col, offset) {
                    continue;
                }
                let candidate = self.candidate(mi_row, mi_col, offset);
                different_ref_found = true;

                if candidate.ref_frames[0] == Some(ref_frame) {
                    done = list.push(candidate.mv[0]);
                } else if candidate.ref_frames[1] == Some(ref_frame) {
                    done = list.push(candidate.mv[1]);
                }
                if done {
                    break;
                }
            }
        }

        // Rescan for vectors on other references, scaled by sign bias.
        if !done && different_ref_found {
            'rescan: for &offset in &positions[..8] {
                if !self.is_inside(mi_row, mi_col, offset) {
                    continue;
                }
                let candidate = self.candidate(mi_row, mi_col, offset);
                if !candidate.is_inter {
                    continue;
                }
                if candidate.ref_frames[0] != Some(ref_frame)
                    && list.push(self.scaled_mv(candidate, 0, ref_frame))
                {
                    break 'rescan;
                }
                if candidate.has_second_ref()
                    && candidate.ref_frames[1] != Some(ref_frame)
                    && candidate.mv[1] != candidate.mv[0]
                    && list.push(self.scaled_mv(candidate, 1, ref_frame))
                {
                    break 'rescan;
                }
            }
        }

        let mode_context = COUNTER_TO_CONTEXT[context_counter];

        let mut clamped = list;
        for mv in clamped.mvs.iter_mut() {
            self.clamp_candidate(mv, bsize, mi_row, mi_col);
        }
        (clamped, mode_context)
    }

    /// Clamp a candidate to the frame plus the allowed border
    fn clamp_candidate(&self, mv: &mut MotionVector, bsize: BlockSize, mi_row: usize, mi_col: usize) {
        let bw = bsize.num_8x8_wide() as i32;
        let bh = bsize.num_8x8_high() as i32;
        let to_left = -(mi_col as i32) * 64;
        let to_right = (self.mi_cols as i32 - bw - mi_col as i32) * 64;
        let to_top = -(mi_row as i32) * 64;
        let to_bottom = (self.mi_rows as i32 - bh - mi_row as i32) * 64;
        mv.clamp(
            to_left - MV_BORDER,
            to_right + MV_BORDER,
            to_top - MV_BORDER,
            to_bottom + MV_BORDER,
        );
    }

    /// Sub-8x8 candidate selection: earlier sub-block vectors take
    /// priority over the whole-block scan results
    pub fn append_sub8x8_mvs(
        &self,
        bsize: BlockSize,
        mi_row: usize,
        mi_col: usize,
        block_mvs: &[[MotionVector; 4]; 2],
        ref_list: usize,
        block: usize,
        ref_frame: RefFrame,
    ) -> (MotionVector, MotionVector) {
        let (list, _) = self.find_mv_refs(bsize, mi_row, mi_col, ref_frame, Some(block));
        let sub_mvs = &block_mvs[ref_list];

        match block {
            0 => (list.get(0), list.get(1)),
            1 | 2 => {
                let nearest = sub_mvs[0];
                let near = [list.get(0), list.get(1)]
                    .into_iter()
                    .find(|&mv| mv != nearest)
                    .unwrap_or_default();
                (nearest, near)
            }
            3 => {
                let nearest = sub_mvs[2];
                let near = [sub_mvs[1], sub_mvs[0], list.get(0), list.get(1)]
                    .into_iter()
                    .find(|&mv| mv != nearest)
                    .unwrap_or_default();
                (nearest, near)
            }
            _ => unreachable!("sub-8x8 block index"),
        }
    }
}

/// Lower candidate precision and pick the nearest/near pair
pub fn find_best_ref_mvs(
    list: &CandidateList,
    allow_hp: bool,
) -> (MotionVector, MotionVector) {
    let mut nearest = list.get(0);
    let mut near = list.get(1);
    nearest.lower_precision(allow_hp);
    near.lower_precision(allow_hp);
    (nearest, near)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_precision() {
        let mut mv = MotionVector::new(13, -13);
        mv.lower_precision(false);
        assert_eq!(mv, MotionVector::new(12, -12));

        // small vectors keep the hp bit when allowed
        let mut mv = MotionVector::new(13, -13);
        mv.lower_precision(true);
        assert_eq!(mv, MotionVector::new(13, -13));

        // large vectors lose it even when allowed
        let mut mv = MotionVector::new(65, 1);
        mv.lower_precision(true);
        assert_eq!(mv, MotionVector::new(64, 0));
    }

    #[test]
    fn test_candidate_list_dedup() {
        let mut list = CandidateList::default();
        assert!(!list.push(MotionVector::new(4, 4)));
        assert!(!list.push(MotionVector::new(4, 4)));
        assert_eq!(list.count, 1);
        assert!(list.push(MotionVector::new(8, 0)));
        assert_eq!(list.get(1), MotionVector::new(8, 0));
    }

    #[test]
    fn test_counter_to_context_reachable_sums() {
        // predicted+predicted, new+zero, intra+intra
        assert_eq!(COUNTER_TO_CONTEXT[0], 2);
        assert_eq!(COUNTER_TO_CONTEXT[4], 3);
        assert_eq!(COUNTER_TO_CONTEXT[18], 6);
    }

    #[test]
    fn test_scan_empty_grid_yields_zero_candidates() {
        let mut grid = ModeInfoGrid::new();
        grid.resize(8, 8);
        let scan = MvRefScan {
            grid: &grid,
            mi_rows: 8,
            mi_cols: 8,
            tile_col_start: 0,
            tile_col_end: 8,
            sign_bias: [false; 4],
        };
        // neighbors exist but are all intra defaults
        let (list, ctx) = scan.find_mv_refs(BlockSize::Block8x8, 1, 1, RefFrame::Last, None);
        assert_eq!(list.get(0), MotionVector::zero());
        assert_eq!(list.get(1), MotionVector::zero());
        // both neighbors intra
        assert_eq!(ctx, 6);
    }

    #[test]
    fn test_scan_picks_same_ref_neighbor() {
        let mut grid = ModeInfoGrid::new();
        grid.resize(8, 8);
        let info = ModeInfo {
            is_inter: true,
            inter_mode: InterMode::NewMv,
            ref_frames: [Some(RefFrame::Last), None],
            mv: [MotionVector::new(16, -8), MotionVector::zero()],
            ..Default::default()
        };
        grid.fill_block(0, 1, BlockSize::Block8x8, &info);

        let scan = MvRefScan {
            grid: &grid,
            mi_rows: 8,
            mi_cols: 8,
            tile_col_start: 0,
            tile_col_end: 8,
            sign_bias: [false; 4],
        };
        let (list, _) = scan.find_mv_refs(BlockSize::Block8x8, 1, 1, RefFrame::Last, None);
        assert_eq!(list.get(0), MotionVector::new(16, -8));
    }
}
