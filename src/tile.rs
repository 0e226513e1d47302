//! Tile and partition decode driver
//!
//! Walks the 64x64 superblock grid of each tile, recursively subdividing
//! by partition symbols, maintaining the above/left neighbor context
//! arrays, and parsing the mode syntax of every leaf block. Each tile is
//! its own arithmetic-coded section; entropy state never crosses a tile
//! boundary.

use tracing::debug;

use crate::bit_reader::BitReader;
use crate::block::{ModeInfo, ParsedBlock};
use crate::bool_decoder::BoolDecoder;
use crate::decoder::{TileBounds, Vp9Parser};
use crate::error::{Error, Result};
use crate::mv::{find_best_ref_mvs, MotionVector, MvRefScan};
use crate::tables::{
    subsize_lookup, BlockSize, InterMode, InterpFilter, IntraMode, Partition, RefFrame,
    ReferenceMode, TxMode, TxSize, SEG_LVL_REF_FRAME, SEG_LVL_SKIP,
};
use crate::tree::{
    above_block_mode, comp_mode_context, comp_ref_context, interp_filter_context,
    is_inter_context, left_block_mode, partition_context, single_ref_p1_context,
    single_ref_p2_context, skip_context, tx_size_context, TreeParser,
};

/// Tile start offset in mode-info units
fn get_tile_offset(tile_num: usize, mis: usize, tile_size_log2: u8) -> usize {
    let super_blocks = (mis + 7) >> 3;
    let offset = ((tile_num * super_blocks) >> tile_size_log2) << 3;
    offset.min(mis)
}

fn reset_context(buf: &mut Vec<u8>, len: usize) {
    buf.clear();
    buf.resize(len, 0);
}

impl Vp9Parser {
    pub(crate) fn decode_tiles(&mut self, reader: &mut BitReader) -> Result<()> {
        let tile_cols = 1usize << self.header.tile_info.cols_log2;
        let tile_rows = 1usize << self.header.tile_info.rows_log2;
        self.clear_above_context();

        for tile_row in 0..tile_rows {
            for tile_col in 0..tile_cols {
                let last_tile = tile_row == tile_rows - 1 && tile_col == tile_cols - 1;
                let tile_size = if last_tile {
                    reader.bytes_remaining()
                } else {
                    reader.read_bits(32)? as usize
                };
                self.tile = TileBounds {
                    mi_row_start: get_tile_offset(
                        tile_row,
                        self.header.mi_rows,
                        self.header.tile_info.rows_log2,
                    ),
                    mi_row_end: get_tile_offset(
                        tile_row + 1,
                        self.header.mi_rows,
                        self.header.tile_info.rows_log2,
                    ),
                    mi_col_start: get_tile_offset(
                        tile_col,
                        self.header.mi_cols,
                        self.header.tile_info.cols_log2,
                    ),
                    mi_col_end: get_tile_offset(
                        tile_col + 1,
                        self.header.mi_cols,
                        self.header.tile_info.cols_log2,
                    ),
                };
                debug!(tile_row, tile_col, tile_size, "decoding tile");

                let mut bool_dec = BoolDecoder::new(reader, tile_size)?;
                self.decode_tile(&mut bool_dec)?;
                bool_dec.exit(self.strict())?;
            }
        }
        Ok(())
    }

    fn clear_above_context(&mut self) {
        for plane in self.above_nonzero.iter_mut() {
            reset_context(plane, self.header.mi_cols * 2);
        }
        reset_context(&mut self.above_seg_pred, self.header.mi_cols);
        reset_context(&mut self.above_partition, self.header.sb64_cols * 8);
    }

    fn clear_left_context(&mut self) {
        for plane in self.left_nonzero.iter_mut() {
            reset_context(plane, self.header.mi_rows * 2);
        }
        reset_context(&mut self.left_seg_pred, self.header.mi_rows);
        reset_context(&mut self.left_partition, self.header.sb64_rows * 8);
    }

    fn decode_tile(&mut self, bool_dec: &mut BoolDecoder) -> Result<()> {
        let tile = self.tile;
        let mut row = tile.mi_row_start;
        while row < tile.mi_row_end {
            self.clear_left_context();
            let mut col = tile.mi_col_start;
            while col < tile.mi_col_end {
                self.decode_partition(bool_dec, row, col, BlockSize::Block64x64)?;
                col += 8;
            }
            row += 8;
        }
        Ok(())
    }

    fn decode_partition(
        &mut self,
        bool_dec: &mut BoolDecoder,
        row: usize,
        col: usize,
        bsize: BlockSize,
    ) -> Result<()> {
        // quadrants outside the mode-info grid decode nothing
        if row >= self.header.mi_rows || col >= self.header.mi_cols {
            return Ok(());
        }
        let num_8x8 = bsize.num_8x8_wide();
        let half = num_8x8 >> 1;
        let has_rows = row + half < self.header.mi_rows;
        let has_cols = col + half < self.header.mi_cols;

        let ctx = partition_context(self.above_partition[col], self.left_partition[row], bsize);
        let partition = TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
        .parse_partition(ctx, self.header.frame_is_intra, has_rows, has_cols)?;

        let subsize = subsize_lookup(partition, bsize);
        if subsize < BlockSize::Block8x8 || partition == Partition::None {
            self.decode_block(bool_dec, row, col, subsize)?;
        } else {
            match partition {
                Partition::Horizontal => {
                    self.decode_block(bool_dec, row, col, subsize)?;
                    if has_rows {
                        self.decode_block(bool_dec, row + half, col, subsize)?;
                    }
                }
                Partition::Vertical => {
                    self.decode_block(bool_dec, row, col, subsize)?;
                    if has_cols {
                        self.decode_block(bool_dec, row, col + half, subsize)?;
                    }
                }
                Partition::Split => {
                    self.decode_partition(bool_dec, row, col, subsize)?;
                    self.decode_partition(bool_dec, row, col + half, subsize)?;
                    self.decode_partition(bool_dec, row + half, col, subsize)?;
                    self.decode_partition(bool_dec, row + half, col + half, subsize)?;
                }
                Partition::None => unreachable!(),
            }
        }

        if bsize == BlockSize::Block8x8 || partition != Partition::Split {
            let above_value = (15 >> subsize.width_log2()) << subsize.width_log2();
            let left_value = (15 >> subsize.height_log2()) << subsize.height_log2();
            for i in 0..num_8x8 {
                self.above_partition[col + i] = above_value;
                self.left_partition[row + i] = left_value;
            }
        }
        Ok(())
    }

    fn decode_block(
        &mut self,
        bool_dec: &mut BoolDecoder,
        row: usize,
        col: usize,
        bsize: BlockSize,
    ) -> Result<()> {
        let available_u = row > 0;
        let available_l = col > self.tile.mi_col_start;

        let info = if self.header.frame_is_intra {
            self.intra_frame_mode_info(bool_dec, row, col, bsize, available_u, available_l)?
        } else {
            self.inter_frame_mode_info(bool_dec, row, col, bsize, available_u, available_l)?
        };

        let mi_cols = self.header.mi_cols;
        let xmis = bsize.num_8x8_wide().min(mi_cols - col);
        let ymis = bsize.num_8x8_high().min(self.header.mi_rows - row);
        for y in 0..ymis {
            for x in 0..xmis {
                self.cur_segment_ids[(row + y) * mi_cols + col + x] = info.segment_id;
            }
        }
        self.grid.fill_block(row, col, bsize, &info);
        self.blocks.push(ParsedBlock {
            mi_row: row,
            mi_col: col,
            info,
        });
        Ok(())
    }

    fn neighbors(
        &self,
        row: usize,
        col: usize,
        available_u: bool,
        available_l: bool,
    ) -> (Option<ModeInfo>, Option<ModeInfo>) {
        let above = if available_u {
            self.grid.get(row - 1, col).cloned()
        } else {
            None
        };
        let left = if available_l {
            self.grid.get(row, col - 1).cloned()
        } else {
            None
        };
        (above, left)
    }

    // =========================================================================
    // Mode info
    // =========================================================================

    fn intra_frame_mode_info(
        &mut self,
        bool_dec: &mut BoolDecoder,
        row: usize,
        col: usize,
        bsize: BlockSize,
        available_u: bool,
        available_l: bool,
    ) -> Result<ModeInfo> {
        let (above, left) = self.neighbors(row, col, available_u, available_l);
        let mut info = ModeInfo {
            block_size: bsize,
            ..Default::default()
        };

        info.segment_id = self.intra_segment_id(bool_dec)?;
        info.skip = self.read_skip(bool_dec, info.segment_id, above.as_ref(), left.as_ref())?;
        info.tx_size = self.read_tx_size(bool_dec, bsize, above.as_ref(), left.as_ref(), true)?;
        info.ref_frames = [Some(RefFrame::Intra), None];
        info.is_inter = false;

        if bsize >= BlockSize::Block8x8 {
            let above_mode = above_block_mode(&info.sub_modes, above.as_ref(), 0);
            let left_mode = left_block_mode(&info.sub_modes, left.as_ref(), 0);
            let y_mode = TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
            .parse_default_intra_mode(above_mode, left_mode)?;
            info.y_mode = y_mode;
            info.sub_modes = [y_mode; 4];
        } else {
            let num_4x4_w = bsize.num_4x4_wide();
            let num_4x4_h = bsize.num_4x4_high();
            let mut y_mode = IntraMode::DcPred;
            let mut idy = 0;
            while idy < 2 {
                let mut idx = 0;
                while idx < 2 {
                    let b = idy * 2 + idx;
                    let above_mode = above_block_mode(&info.sub_modes, above.as_ref(), b);
                    let left_mode = left_block_mode(&info.sub_modes, left.as_ref(), b);
                    y_mode = TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
                    .parse_default_intra_mode(above_mode, left_mode)?;
                    for dy in 0..num_4x4_h {
                        for dx in 0..num_4x4_w {
                            info.sub_modes[(idy + dy) * 2 + idx + dx] = y_mode;
                        }
                    }
                    idx += num_4x4_w;
                }
                idy += num_4x4_h;
            }
            info.y_mode = y_mode;
        }

        info.uv_mode = TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
        .parse_default_uv_mode(info.y_mode)?;
        Ok(info)
    }

    fn inter_frame_mode_info(
        &mut self,
        bool_dec: &mut BoolDecoder,
        row: usize,
        col: usize,
        bsize: BlockSize,
        available_u: bool,
        available_l: bool,
    ) -> Result<ModeInfo> {
        let (above, left) = self.neighbors(row, col, available_u, available_l);
        let mut info = ModeInfo {
            block_size: bsize,
            ..Default::default()
        };

        info.segment_id = self.inter_segment_id(bool_dec, row, col, bsize)?;
        info.skip = self.read_skip(bool_dec, info.segment_id, above.as_ref(), left.as_ref())?;
        info.is_inter =
            self.read_is_inter(bool_dec, info.segment_id, above.as_ref(), left.as_ref())?;
        info.tx_size = self.read_tx_size(
            bool_dec,
            bsize,
            above.as_ref(),
            left.as_ref(),
            !info.skip || !info.is_inter,
        )?;

        if info.is_inter {
            self.inter_block_mode_info(bool_dec, &mut info, row, col, above.as_ref(), left.as_ref())?;
        } else {
            self.intra_block_mode_info(bool_dec, &mut info)?;
        }
        Ok(info)
    }

    fn intra_segment_id(&mut self, bool_dec: &mut BoolDecoder) -> Result<u8> {
        if self.segmentation.enabled && self.segmentation.update_map {
            let tree_probs = self.segmentation.tree_probs;
            TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
            .parse_segment_id(&tree_probs)
        } else {
            Ok(0)
        }
    }

    /// Smallest previous-frame segment id over the block's footprint
    fn predicted_segment_id(&self, row: usize, col: usize, bsize: BlockSize) -> u8 {
        let mi_cols = self.header.mi_cols;
        let xmis = bsize.num_8x8_wide().min(mi_cols - col);
        let ymis = bsize.num_8x8_high().min(self.header.mi_rows - row);
        let mut segment = 7u8;
        for y in 0..ymis {
            for x in 0..xmis {
                segment = segment.min(self.prev_segment_ids[(row + y) * mi_cols + col + x]);
            }
        }
        segment
    }

    fn inter_segment_id(
        &mut self,
        bool_dec: &mut BoolDecoder,
        row: usize,
        col: usize,
        bsize: BlockSize,
    ) -> Result<u8> {
        if !self.segmentation.enabled {
            return Ok(0);
        }
        let predicted_id = self.predicted_segment_id(row, col, bsize);
        if !self.segmentation.update_map {
            return Ok(predicted_id);
        }
        let tree_probs = self.segmentation.tree_probs;
        if !self.segmentation.temporal_update {
            return TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
            .parse_segment_id(&tree_probs);
        }

        let ctx = (self.above_seg_pred[col] + self.left_seg_pred[row]) as usize;
        let pred_prob = self.segmentation.pred_probs[ctx];
        let seg_id_predicted = TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
        .parse_seg_id_predicted(pred_prob)?;

        let segment_id = if seg_id_predicted {
            predicted_id
        } else {
            TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
            .parse_segment_id(&tree_probs)?
        };

        let xmis = bsize.num_8x8_wide().min(self.header.mi_cols - col);
        for i in 0..xmis {
            self.above_seg_pred[col + i] = seg_id_predicted as u8;
        }
        let ymis = bsize.num_8x8_high().min(self.header.mi_rows - row);
        for i in 0..ymis {
            self.left_seg_pred[row + i] = seg_id_predicted as u8;
        }
        Ok(segment_id)
    }

    fn read_skip(
        &mut self,
        bool_dec: &mut BoolDecoder,
        segment_id: u8,
        above: Option<&ModeInfo>,
        left: Option<&ModeInfo>,
    ) -> Result<bool> {
        if self.segmentation.feature_active(segment_id, SEG_LVL_SKIP) {
            return Ok(true);
        }
        let ctx = skip_context(above, left);
        TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
        .parse_skip(ctx)
    }

    fn read_tx_size(
        &mut self,
        bool_dec: &mut BoolDecoder,
        bsize: BlockSize,
        above: Option<&ModeInfo>,
        left: Option<&ModeInfo>,
        allow_select: bool,
    ) -> Result<TxSize> {
        let max_tx_size = bsize.max_tx_size();
        if allow_select
            && self.header.tx_mode == TxMode::TxModeSelect
            && bsize >= BlockSize::Block8x8
        {
            let ctx = tx_size_context(above, left, max_tx_size);
            TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
            .parse_tx_size(max_tx_size, ctx)
        } else {
            Ok(max_tx_size.min(self.header.tx_mode.biggest_tx_size()))
        }
    }

    fn read_is_inter(
        &mut self,
        bool_dec: &mut BoolDecoder,
        segment_id: u8,
        above: Option<&ModeInfo>,
        left: Option<&ModeInfo>,
    ) -> Result<bool> {
        if self.segmentation.feature_active(segment_id, SEG_LVL_REF_FRAME) {
            let data = self.segmentation.feature_data[segment_id as usize][SEG_LVL_REF_FRAME];
            return Ok(data != RefFrame::Intra as i16);
        }
        let ctx = is_inter_context(above, left);
        TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
        .parse_is_inter(ctx)
    }

    fn intra_block_mode_info(
        &mut self,
        bool_dec: &mut BoolDecoder,
        info: &mut ModeInfo,
    ) -> Result<()> {
        info.ref_frames = [Some(RefFrame::Intra), None];
        let bsize = info.block_size;

        if bsize >= BlockSize::Block8x8 {
            let y_mode = TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
            .parse_intra_mode(bsize.size_group())?;
            info.y_mode = y_mode;
            info.sub_modes = [y_mode; 4];
        } else {
            let num_4x4_w = bsize.num_4x4_wide();
            let num_4x4_h = bsize.num_4x4_high();
            let mut y_mode = IntraMode::DcPred;
            let mut idy = 0;
            while idy < 2 {
                let mut idx = 0;
                while idx < 2 {
                    y_mode = TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
                    .parse_sub_intra_mode()?;
                    for dy in 0..num_4x4_h {
                        for dx in 0..num_4x4_w {
                            info.sub_modes[(idy + dy) * 2 + idx + dx] = y_mode;
                        }
                    }
                    idx += num_4x4_w;
                }
                idy += num_4x4_h;
            }
            info.y_mode = y_mode;
        }

        info.uv_mode = TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
        .parse_uv_mode(info.y_mode)?;
        Ok(())
    }

    fn read_ref_frames(
        &mut self,
        bool_dec: &mut BoolDecoder,
        info: &mut ModeInfo,
        above: Option<&ModeInfo>,
        left: Option<&ModeInfo>,
    ) -> Result<()> {
        if self
            .segmentation
            .feature_active(info.segment_id, SEG_LVL_REF_FRAME)
        {
            let data = self.segmentation.feature_data[info.segment_id as usize][SEG_LVL_REF_FRAME];
            let ref_frame = match data {
                1 => RefFrame::Last,
                2 => RefFrame::Golden,
                3 => RefFrame::AltRef,
                _ => RefFrame::Intra,
            };
            info.ref_frames = [Some(ref_frame), None];
            return Ok(());
        }

        let comp_mode = if self.header.reference_mode == ReferenceMode::ReferenceModeSelect {
            let ctx = comp_mode_context(self.header.comp_fixed_ref, above, left);
            TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
            .parse_comp_mode(ctx)?
        } else {
            self.header.reference_mode
        };

        if comp_mode == ReferenceMode::CompoundReference {
            let fixed_ref = self.header.comp_fixed_ref;
            let idx = self.header.ref_frame_sign_bias[fixed_ref as usize] as usize;
            let var_ref_idx = 1 - idx;
            let ctx = comp_ref_context(
                fixed_ref,
                self.header.comp_var_ref,
                var_ref_idx,
                above,
                left,
            );
            let comp_ref = TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
            .parse_comp_ref(ctx)?;
            info.ref_frames[idx] = Some(fixed_ref);
            info.ref_frames[1 - idx] = Some(self.header.comp_var_ref[comp_ref]);
        } else {
            let p1_ctx = single_ref_p1_context(above, left);
            let single_ref_p1 = TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
            .parse_single_ref_p1(p1_ctx)?;
            let ref_frame = if single_ref_p1 {
                let p2_ctx = single_ref_p2_context(above, left);
                let single_ref_p2 = TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
                .parse_single_ref_p2(p2_ctx)?;
                if single_ref_p2 {
                    RefFrame::AltRef
                } else {
                    RefFrame::Golden
                }
            } else {
                RefFrame::Last
            };
            info.ref_frames = [Some(ref_frame), None];
        }
        Ok(())
    }

    fn mv_ref_scan(&self) -> MvRefScan<'_> {
        MvRefScan {
            grid: &self.grid,
            mi_rows: self.header.mi_rows,
            mi_cols: self.header.mi_cols,
            tile_col_start: self.tile.mi_col_start,
            tile_col_end: self.tile.mi_col_end,
            sign_bias: self.header.ref_frame_sign_bias,
        }
    }

    fn inter_block_mode_info(
        &mut self,
        bool_dec: &mut BoolDecoder,
        info: &mut ModeInfo,
        row: usize,
        col: usize,
        above: Option<&ModeInfo>,
        left: Option<&ModeInfo>,
    ) -> Result<()> {
        let bsize = info.block_size;
        self.read_ref_frames(bool_dec, info, above, left)?;
        let is_compound = info.has_second_ref();
        let num_refs = 1 + is_compound as usize;

        let mut nearest_mv = [MotionVector::zero(); 2];
        let mut near_mv = [MotionVector::zero(); 2];
        let mut best_mv = [MotionVector::zero(); 2];
        let mut mode_ctx = 0usize;
        for j in 0..num_refs {
            let ref_frame = info.ref_frames[j].expect("inter block has reference");
            let (candidates, ctx) = self
                .mv_ref_scan()
                .find_mv_refs(bsize, row, col, ref_frame, None);
            if j == 0 {
                mode_ctx = ctx as usize;
            }
            let (nearest, near) =
                find_best_ref_mvs(&candidates, self.header.allow_high_precision_mv);
            nearest_mv[j] = nearest;
            near_mv[j] = near;
            best_mv[j] = nearest;
        }

        if self.segmentation.feature_active(info.segment_id, SEG_LVL_SKIP) {
            if bsize < BlockSize::Block8x8 {
                return Err(Error::corrupt(
                    bool_dec.position(),
                    "skip segment feature on a sub-8x8 block",
                ));
            }
            info.inter_mode = InterMode::ZeroMv;
        } else if bsize >= BlockSize::Block8x8 {
            info.inter_mode = TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
            .parse_inter_mode(mode_ctx)?;
        }

        info.interp_filter = if self.header.interpolation_filter == InterpFilter::Switchable {
            let ctx = interp_filter_context(above, left);
            TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
            .parse_interp_filter(ctx)?
        } else {
            self.header.interpolation_filter
        };

        if bsize < BlockSize::Block8x8 {
            let num_4x4_w = bsize.num_4x4_wide();
            let num_4x4_h = bsize.num_4x4_high();
            let mut idy = 0;
            while idy < 2 {
                let mut idx = 0;
                while idx < 2 {
                    let b = idy * 2 + idx;
                    let inter_mode = TreeParser::new(bool_dec, self.probs.current(), &mut self.counts)
                    .parse_inter_mode(mode_ctx)?;
                    info.inter_mode = inter_mode;

                    if inter_mode == InterMode::NearestMv || inter_mode == InterMode::NearMv {
                        for j in 0..num_refs {
                            let ref_frame = info.ref_frames[j].expect("inter block has reference");
                            let (nearest, near) = self.mv_ref_scan().append_sub8x8_mvs(
                                bsize,
                                row,
                                col,
                                &info.block_mvs,
                                j,
                                b,
                                ref_frame,
                            );
                            nearest_mv[j] = nearest;
                            near_mv[j] = near;
                        }
                    }

                    let mv = self.assign_mv(
                        bool_dec,
                        is_compound,
                        inter_mode,
                        &nearest_mv,
                        &near_mv,
                        &best_mv,
                    )?;
                    for dy in 0..num_4x4_h {
                        for dx in 0..num_4x4_w {
                            let block = (idy + dy) * 2 + idx + dx;
                            for (j, &list_mv) in mv.iter().enumerate().take(num_refs) {
                                info.block_mvs[j][block] = list_mv;
                            }
                        }
                    }
                    info.mv = mv;
                    idx += num_4x4_w;
                }
                idy += num_4x4_h;
            }
        } else {
            let mv = self.assign_mv(
                bool_dec,
                is_compound,
                info.inter_mode,
                &nearest_mv,
                &near_mv,
                &best_mv,
            )?;
            info.mv = mv;
            for (j, &list_mv) in mv.iter().enumerate().take(num_refs) {
                info.block_mvs[j] = [list_mv; 4];
            }
        }
        Ok(())
    }

    fn assign_mv(
        &mut self,
        bool_dec: &mut BoolDecoder,
        is_compound: bool,
        inter_mode: InterMode,
        nearest_mv: &[MotionVector; 2],
        near_mv: &[MotionVector; 2],
        best_mv: &[MotionVector; 2],
    ) -> Result<[MotionVector; 2]> {
        let mut mv = [MotionVector::zero(); 2];
        for j in 0..1 + is_compound as usize {
            mv[j] = match inter_mode {
                InterMode::NewMv => self.read_mv(bool_dec, best_mv[j])?,
                InterMode::NearestMv => nearest_mv[j],
                InterMode::NearMv => near_mv[j],
                InterMode::ZeroMv => MotionVector::zero(),
            };
        }
        Ok(mv)
    }

    fn read_mv(
        &mut self,
        bool_dec: &mut BoolDecoder,
        best_mv: MotionVector,
    ) -> Result<MotionVector> {
        let use_hp = self.header.allow_high_precision_mv && best_mv.use_hp();
        let mut parser = TreeParser::new(bool_dec, self.probs.current(), &mut self.counts);
        let joint = parser.parse_mv_joint()?;
        let mut diff = MotionVector::zero();
        // joints: zero, horizontal-only, vertical-only, both
        if joint == 2 || joint == 3 {
            diff.row = parser.parse_mv_component(0, use_hp)? as i16;
        }
        if joint == 1 || joint == 3 {
            diff.col = parser.parse_mv_component(1, use_hp)? as i16;
        }
        Ok(MotionVector::new(
            best_mv.row + diff.row,
            best_mv.col + diff.col,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_tile_offset() {
        // 100 mi cols, one tile: whole range
        assert_eq!(get_tile_offset(0, 100, 0), 0);
        assert_eq!(get_tile_offset(1, 100, 0), 100);
        // two tiles split the 13 superblocks 6/7
        assert_eq!(get_tile_offset(0, 100, 1), 0);
        assert_eq!(get_tile_offset(1, 100, 1), 48);
        assert_eq!(get_tile_offset(2, 100, 1), 100);
    }
}
