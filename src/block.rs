//! Block-level mode information
//!
//! VP9 records decode state per 8x8 mode-info cell. The grid keeps the
//! per-cell state the parser itself needs for neighbor context selection
//! and motion-vector candidate scans; each decoded leaf block is also
//! emitted into the frame's output stream as a [`ParsedBlock`].

use crate::mv::MotionVector;
use crate::tables::{BlockSize, InterMode, InterpFilter, IntraMode, RefFrame, TxSize};

/// Mode information for a single block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeInfo {
    /// Block size
    pub block_size: BlockSize,
    /// Segment ID (0-7)
    pub segment_id: u8,
    /// Skip flag (no residual)
    pub skip: bool,
    /// Inter-predicted block
    pub is_inter: bool,
    /// Transform size
    pub tx_size: TxSize,

    /// Y prediction mode
    pub y_mode: IntraMode,
    /// UV prediction mode
    pub uv_mode: IntraMode,
    /// Sub-block Y modes for sub-8x8 intra blocks
    pub sub_modes: [IntraMode; 4],

    /// Inter prediction mode
    pub inter_mode: InterMode,
    /// Interpolation filter
    pub interp_filter: InterpFilter,
    /// Reference frames; `None` marks an unused slot
    pub ref_frames: [Option<RefFrame>; 2],
    /// Motion vectors (two for compound prediction)
    pub mv: [MotionVector; 2],
    /// Per-sub-block motion vectors, indexed [ref_list][sub_block]
    pub block_mvs: [[MotionVector; 4]; 2],
}

impl ModeInfo {
    /// Whether the block uses two reference frames
    #[inline]
    pub fn has_second_ref(&self) -> bool {
        self.ref_frames[1].is_some()
    }
}

/// One decoded leaf of the partition tree, as emitted to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBlock {
    /// Row of the block origin in mode-info units
    pub mi_row: usize,
    /// Column of the block origin in mode-info units
    pub mi_col: usize,
    /// Decoded mode information
    pub info: ModeInfo,
}

/// Mode-info storage for every 8x8 cell of the frame
pub struct ModeInfoGrid {
    grid: Vec<ModeInfo>,
    rows: usize,
    cols: usize,
}

impl ModeInfoGrid {
    pub fn new() -> Self {
        ModeInfoGrid {
            grid: Vec::new(),
            rows: 0,
            cols: 0,
        }
    }

    /// Resize for a new frame geometry and reset every cell
    pub fn resize(&mut self, mi_rows: usize, mi_cols: usize) {
        self.rows = mi_rows;
        self.cols = mi_cols;
        self.grid.clear();
        self.grid.resize(mi_rows * mi_cols, ModeInfo::default());
    }

    /// Mode info at a cell, if inside the grid
    #[inline]
    pub fn get(&self, mi_row: usize, mi_col: usize) -> Option<&ModeInfo> {
        if mi_row < self.rows && mi_col < self.cols {
            Some(&self.grid[mi_row * self.cols + mi_col])
        } else {
            None
        }
    }

    /// Fill the block's footprint, clipped to the grid
    pub fn fill_block(&mut self, mi_row: usize, mi_col: usize, size: BlockSize, info: &ModeInfo) {
        let bw = size.num_8x8_wide();
        let bh = size.num_8x8_high();
        for dy in 0..bh.min(self.rows.saturating_sub(mi_row)) {
            for dx in 0..bw.min(self.cols.saturating_sub(mi_col)) {
                self.grid[(mi_row + dy) * self.cols + mi_col + dx] = info.clone();
            }
        }
    }
}

impl Default for ModeInfoGrid {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_resize_and_get() {
        let mut grid = ModeInfoGrid::new();
        grid.resize(4, 6);
        assert!(grid.get(3, 5).is_some());
        assert!(grid.get(4, 0).is_none());
        assert!(grid.get(0, 6).is_none());
    }

    #[test]
    fn test_fill_block_clips_at_edge() {
        let mut grid = ModeInfoGrid::new();
        grid.resize(3, 3);
        let info = ModeInfo {
            segment_id: 5,
            ..Default::default()
        };
        // 32x32 block is 4x4 cells; only the 3x3 grid portion is written
        grid.fill_block(0, 0, BlockSize::Block32x32, &info);
        for row in 0..3 {
            for col in 0..3 {
                assert_eq!(grid.get(row, col).unwrap().segment_id, 5);
            }
        }
    }

    #[test]
    fn test_fill_block_footprint() {
        let mut grid = ModeInfoGrid::new();
        grid.resize(8, 8);
        let info = ModeInfo {
            skip: true,
            ..Default::default()
        };
        // 16x8 is 2 cells wide, 1 cell high
        grid.fill_block(2, 4, BlockSize::Block16x8, &info);
        assert!(grid.get(2, 4).unwrap().skip);
        assert!(grid.get(2, 5).unwrap().skip);
        assert!(!grid.get(3, 4).unwrap().skip);
        assert!(!grid.get(2, 6).unwrap().skip);
    }
}
