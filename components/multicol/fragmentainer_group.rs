/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fmt;
use std::ops::{Deref, RangeInclusive};

use app_units::Au;
use euclid::default::{Rect, Size2D};
use num_traits::Zero;

use crate::PageBoundaryRule;
use crate::column_set::ColumnSetRef;
use crate::geom::{self, LogicalRect, LogicalVec2, PhysicalRect, PhysicalVec};

/// A row of fragmentainers that share one column block size.
///
/// A column set normally has a single group. It gets more when the multicol
/// container is itself fragmented by an outer fragmentation context (nested
/// multicol, or printing): every outer fragmentainer that the column set
/// passes through gets its own row of columns, and rows may differ in height.
///
/// A fragmentainer is not an object of its own. It is a column index in
/// `0..actual_column_count` combined with the block size shared by the group.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FragmentainerGroup {
    /// Block offset of this row inside the column set.
    logical_top: Au,
    logical_top_in_flow_thread: Au,
    logical_bottom_in_flow_thread: Au,
    /// The block size of every column in this row. Zero until known.
    logical_height: Au,
    is_logical_height_known: bool,
}

impl FragmentainerGroup {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn logical_top(&self) -> Au {
        self.logical_top
    }

    pub fn set_logical_top(&mut self, logical_top: Au) {
        self.logical_top = logical_top;
    }

    #[inline]
    pub fn logical_top_in_flow_thread(&self) -> Au {
        self.logical_top_in_flow_thread
    }

    pub fn set_logical_top_in_flow_thread(&mut self, logical_top: Au) {
        self.logical_top_in_flow_thread = logical_top;
    }

    #[inline]
    pub fn logical_bottom_in_flow_thread(&self) -> Au {
        self.logical_bottom_in_flow_thread
    }

    pub fn set_logical_bottom_in_flow_thread(&mut self, logical_bottom: Au) {
        self.logical_bottom_in_flow_thread = logical_bottom;
    }

    /// Makes room for more content at the end of this row, e.g. when another
    /// column has been added to it.
    pub fn extend_logical_bottom_in_flow_thread(&mut self, block_size: Au) {
        self.logical_bottom_in_flow_thread =
            geom::saturating_au(self.logical_bottom_in_flow_thread.0 as i64 + block_size.0 as i64);
    }

    /// The block size of the flow thread portion covered by this row.
    #[inline]
    pub fn logical_height_in_flow_thread(&self) -> Au {
        (self.logical_bottom_in_flow_thread - self.logical_top_in_flow_thread).max(Au::zero())
    }

    /// The block size of one column. Zero while unknown.
    #[inline]
    pub fn logical_height(&self) -> Au {
        self.logical_height
    }

    #[inline]
    pub fn is_logical_height_known(&self) -> bool {
        self.is_logical_height_known
    }

    /// Stores the column block size decided by column balancing.
    ///
    /// The block size is floored at `min_block_size`, since columns without
    /// block size would never make progress through the content. Once known,
    /// the block size sticks for the rest of the layout pass.
    pub fn set_column_block_size(&mut self, block_size: Au, min_block_size: Au) {
        let block_size = block_size.max(min_block_size);
        debug_assert!(
            !self.is_logical_height_known ||
                self.logical_height == block_size ||
                block_size <= min_block_size,
            "column block size changed from {:?} to {:?}",
            self.logical_height,
            block_size
        );
        if self.is_logical_height_known {
            return;
        }
        self.logical_height = block_size;
        self.is_logical_height_known = true;
    }

    /// Like [`Self::set_column_block_size`], but lets a known block size grow.
    /// A known block size never shrinks.
    pub fn extend_column_block_size(&mut self, block_size: Au, min_block_size: Au) {
        if !self.is_logical_height_known {
            self.set_column_block_size(block_size, min_block_size);
            return;
        }
        self.logical_height = self.logical_height.max(block_size.max(min_block_size));
    }

    pub fn reset_column_height(&mut self) {
        self.logical_height = Au::zero();
        self.is_logical_height_known = false;
    }

    /// The number of columns needed to hold the flow thread portion of this
    /// row, without any upper limit. Always at least one.
    pub(crate) fn unclamped_actual_column_count(&self) -> u32 {
        if !self.is_logical_height_known || self.logical_height <= Au::zero() {
            return 1;
        }
        let portion_height = self.logical_height_in_flow_thread();
        if portion_height <= Au::zero() {
            return 1;
        }
        let column_height = self.logical_height.0 as i64;
        let portion_height = portion_height.0 as i64;
        let mut count = portion_height / column_height;
        if count * column_height < portion_height {
            count += 1;
        }
        count.clamp(1, u32::MAX as i64) as u32
    }

    pub(crate) fn logical_top_in_flow_thread_at(&self, column_index: u32) -> Au {
        geom::saturating_au(
            self.logical_top_in_flow_thread.0 as i64 +
                self.logical_height.0 as i64 * column_index as i64,
        )
    }

    /// The block size of the flow thread portion in the given column. Only the
    /// last column may be shorter than the column block size.
    pub(crate) fn logical_height_in_flow_thread_at(&self, column_index: u32) -> Au {
        let logical_top = self.logical_top_in_flow_thread_at(column_index);
        let logical_bottom = geom::saturating_au(logical_top.0 as i64 + self.logical_height.0 as i64)
            .min(self.logical_bottom_in_flow_thread);
        (logical_bottom - logical_top).max(Au::zero())
    }

    /// The column that `offset_in_flow_thread` falls into. Not clamped to the
    /// actual column count.
    pub(crate) fn column_index_at_offset(
        &self,
        offset_in_flow_thread: Au,
        rule: PageBoundaryRule,
    ) -> u32 {
        if offset_in_flow_thread < self.logical_top_in_flow_thread {
            return 0;
        }
        if !self.is_logical_height_known || self.logical_height <= Au::zero() {
            return 0;
        }
        let offset = (offset_in_flow_thread - self.logical_top_in_flow_thread).0 as i64;
        let column_index = (offset / self.logical_height.0 as i64).min(u32::MAX as i64) as u32;
        if rule == PageBoundaryRule::AssociateWithFormerPage &&
            column_index > 0 &&
            self.logical_top_in_flow_thread_at(column_index) == offset_in_flow_thread
        {
            return column_index - 1;
        }
        column_index
    }
}

/// A fragmentainer group together with the column set and flow thread it
/// belongs to. All geometry queries go through this.
#[derive(Clone, Copy)]
pub struct FragmentainerGroupRef<'a> {
    column_set: ColumnSetRef<'a>,
    index: usize,
}

impl<'a> Deref for FragmentainerGroupRef<'a> {
    type Target = FragmentainerGroup;

    fn deref(&self) -> &FragmentainerGroup {
        &self.column_set.data().fragmentainer_groups()[self.index]
    }
}

impl fmt::Debug for FragmentainerGroupRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FragmentainerGroupRef")
            .field("column_set", &self.column_set.index())
            .field("index", &self.index)
            .field("group", self.deref())
            .finish()
    }
}

impl PartialEq for FragmentainerGroupRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.column_set == other.column_set && self.index == other.index
    }
}

impl<'a> FragmentainerGroupRef<'a> {
    pub(crate) fn new(column_set: ColumnSetRef<'a>, index: usize) -> Self {
        debug_assert!(index < column_set.fragmentainer_groups().len());
        Self { column_set, index }
    }

    #[inline]
    pub fn column_set(&self) -> ColumnSetRef<'a> {
        self.column_set
    }

    /// The index of this group in its column set.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_first_group(&self) -> bool {
        self.index == 0
    }

    pub fn is_last_group(&self) -> bool {
        self.index + 1 == self.column_set.fragmentainer_groups().len()
    }

    /// The number of columns in this row, in `1..=max_actual_column_count`.
    pub fn actual_column_count(&self) -> u32 {
        let max_count = self.column_set.flow_thread().config().max_actual_column_count;
        self.unclamped_actual_column_count().min(max_count).max(1)
    }

    pub fn column_index_at_offset(&self, offset_in_flow_thread: Au, rule: PageBoundaryRule) -> u32 {
        self.deref().column_index_at_offset(offset_in_flow_thread, rule)
    }

    /// Like [`Self::column_index_at_offset`], but always an existing column.
    pub fn constrained_column_index_at_offset(
        &self,
        offset_in_flow_thread: Au,
        rule: PageBoundaryRule,
    ) -> u32 {
        self.column_index_at_offset(offset_in_flow_thread, rule)
            .min(self.actual_column_count() - 1)
    }

    pub fn logical_top_in_flow_thread_at(&self, column_index: u32) -> Au {
        self.deref().logical_top_in_flow_thread_at(column_index)
    }

    pub fn logical_height_in_flow_thread_at(&self, column_index: u32) -> Au {
        self.deref().logical_height_in_flow_thread_at(column_index)
    }

    /// The flow thread block offset where the column containing `offset_in_flow_thread` starts.
    pub fn column_logical_top_for_offset(&self, offset_in_flow_thread: Au) -> Au {
        let column_index =
            self.column_index_at_offset(offset_in_flow_thread, PageBoundaryRule::AssociateWithLatterPage);
        self.logical_top_in_flow_thread_at(column_index)
    }

    /// The first and last column touched by the flow thread block range
    /// `[logical_top, logical_bottom)`, clamped to this row.
    pub fn column_interval_for_block_range_in_flow_thread(
        &self,
        logical_top: Au,
        logical_bottom: Au,
    ) -> RangeInclusive<u32> {
        let logical_top = logical_top.max(self.logical_top_in_flow_thread());
        let logical_bottom = logical_bottom.min(self.logical_bottom_in_flow_thread());
        let first_column =
            self.constrained_column_index_at_offset(logical_top, PageBoundaryRule::AssociateWithLatterPage);
        if logical_bottom <= logical_top {
            // An empty range at a column boundary belongs to the latter column
            // only. Looking up the exclusive end would find the former.
            return first_column..=first_column;
        }
        let last_column = self
            .constrained_column_index_at_offset(logical_bottom, PageBoundaryRule::AssociateWithFormerPage);
        first_column..=last_column
    }

    /// The part of the flow thread shown in the given column, in the flow
    /// thread's physical coordinate space.
    pub fn flow_thread_portion_rect_at(&self, column_index: u32) -> PhysicalRect {
        let flow_thread = self.column_set.flow_thread();
        LogicalRect::new(
            Au::zero(),
            self.logical_top_in_flow_thread_at(column_index),
            self.column_set.page_logical_width(),
            self.logical_height_in_flow_thread_at(column_index),
        )
        .to_physical(flow_thread.writing_mode(), flow_thread.physical_size())
    }

    /// The part of the flow thread that may paint into the given column,
    /// overflow included, in the flow thread's physical coordinate space.
    ///
    /// Overflow is clipped at the block edges of the column, except before the
    /// very first and after the very last column of the flow thread, and in the
    /// middle of the gap to the neighbouring columns of the row.
    pub fn flow_thread_portion_overflow_rect_at(&self, column_index: u32) -> PhysicalRect {
        let column_set = self.column_set;
        let flow_thread = column_set.flow_thread();
        let writing_mode = flow_thread.writing_mode();

        let is_first_column_in_row = column_index == 0;
        let is_last_column_in_row = column_index >= self.actual_column_count() - 1;
        let is_first_column_in_flow_thread = is_first_column_in_row &&
            self.is_first_group() &&
            column_set.previous_sibling().is_none();
        let is_last_column_in_flow_thread =
            is_last_column_in_row && self.is_last_group() && column_set.next_sibling().is_none();
        let (is_leftmost_column, is_rightmost_column) = if writing_mode.is_bidi_ltr() {
            (is_first_column_in_row, is_last_column_in_row)
        } else {
            (is_last_column_in_row, is_first_column_in_row)
        };

        let portion_rect = self.flow_thread_portion_rect_at(column_index);
        let unclipped = servo_geometry::symmetric_rect(flow_thread.config().overflow_clip_extent());
        let mut min = unclipped.min();
        let mut max = unclipped.max();
        let column_gap = column_set.column_gap();
        let gap_before = column_gap / 2;
        let gap_after = column_gap - gap_before;

        if writing_mode.is_horizontal() {
            if !is_first_column_in_flow_thread {
                min.y = portion_rect.min_y();
            }
            if !is_last_column_in_flow_thread {
                max.y = portion_rect.max_y();
            }
            if !is_leftmost_column {
                min.x = portion_rect.min_x() - gap_before;
            }
            if !is_rightmost_column {
                max.x = portion_rect.max_x() + gap_after;
            }
        } else {
            let flipped = writing_mode.is_flipped_blocks();
            if !is_first_column_in_flow_thread {
                if flipped {
                    max.x = portion_rect.max_x();
                } else {
                    min.x = portion_rect.min_x();
                }
            }
            if !is_last_column_in_flow_thread {
                if flipped {
                    min.x = portion_rect.min_x();
                } else {
                    max.x = portion_rect.max_x();
                }
            }
            if !is_leftmost_column {
                min.y = portion_rect.min_y() - gap_before;
            }
            if !is_rightmost_column {
                max.y = portion_rect.max_y() + gap_after;
            }
        }
        Rect::new(min, Size2D::new(max.x - min.x, max.y - min.y))
    }

    /// Where the given column sits inside this row, in the column set's logical
    /// coordinate space with the block offset relative to the row.
    pub fn column_rect_at(&self, column_index: u32) -> LogicalRect<Au> {
        let column_set = self.column_set;
        let column_logical_width = column_set.page_logical_width();
        let progression = geom::saturating_mul(column_logical_width + column_set.column_gap(), column_index);
        let column_logical_left = if column_set.flow_thread().writing_mode().is_bidi_ltr() {
            progression
        } else {
            column_set.logical_width() - column_logical_width - progression
        };
        LogicalRect::new(
            column_logical_left,
            Au::zero(),
            column_logical_width,
            self.logical_height_in_flow_thread_at(column_index),
        )
    }

    /// The offset to add to a point in the flow thread at `offset_in_flow_thread`
    /// to get its visual position.
    pub fn flow_thread_translation_at_offset(
        &self,
        offset_in_flow_thread: Au,
        rule: PageBoundaryRule,
    ) -> PhysicalVec {
        // Offsets past the end of the row belong to its last column.
        let column_index = if offset_in_flow_thread >= self.logical_bottom_in_flow_thread() {
            self.actual_column_count() - 1
        } else {
            self.constrained_column_index_at_offset(offset_in_flow_thread, rule)
        };
        let column_set = self.column_set;
        let flow_thread = column_set.flow_thread();

        let portion_origin =
            self.flow_thread_portion_rect_at(column_index).origin + flow_thread.location().to_vector();

        let mut column_rect = self.column_rect_at(column_index);
        column_rect.start_corner.block = column_rect.start_corner.block + self.logical_top();
        let column_origin = column_rect
            .to_physical(flow_thread.writing_mode(), column_set.physical_size())
            .origin +
            column_set.location().to_vector();

        column_origin - portion_origin
    }

    /// The column under a point given in the column set's logical coordinate
    /// space, relative to this row. Column boundaries are in the middle of the gaps.
    pub fn column_index_at_visual_point(&self, visual_point: LogicalVec2<Au>) -> u32 {
        let column_set = self.column_set;
        let column_gap = column_set.column_gap();
        let stride = (column_set.page_logical_width() + column_gap).0 as i64;
        if stride <= 0 {
            return 0;
        }
        let mut offset = visual_point.inline;
        if !column_set.flow_thread().writing_mode().is_bidi_ltr() {
            offset = column_set.logical_width() - offset;
        }
        let index = (offset + column_gap / 2).0 as i64 / stride;
        if index < 0 {
            return 0;
        }
        (index.min(u32::MAX as i64) as u32).min(self.actual_column_count() - 1)
    }

    /// Maps a point in the column set's logical space, relative to this row,
    /// to a logical point in the flow thread.
    pub fn visual_point_to_flow_thread_point(&self, visual_point: LogicalVec2<Au>) -> LogicalVec2<Au> {
        let column_index = self.column_index_at_visual_point(visual_point);
        let column_rect = self.column_rect_at(column_index);
        let local_point = visual_point - column_rect.start_corner;
        LogicalVec2::new(
            local_point.inline,
            local_point.block + self.logical_top_in_flow_thread_at(column_index),
        )
    }

    /// The visual bounding box of the pieces of a flow thread box that end up
    /// in this row, in the flow thread's coordinate space. Empty if the box
    /// does not touch the row.
    pub fn fragments_bounding_box(&self, bounding_box_in_flow_thread: &PhysicalRect) -> PhysicalRect {
        let flow_thread = self.column_set.flow_thread();
        let logical_box = LogicalRect::from_physical(
            flow_thread.writing_mode(),
            *bounding_box_in_flow_thread,
            flow_thread.physical_size(),
        );
        let logical_top = logical_box.start_corner.block;
        let logical_bottom = logical_box.block_end();
        if logical_bottom <= self.logical_top_in_flow_thread() ||
            logical_top >= self.logical_bottom_in_flow_thread()
        {
            return PhysicalRect::zero();
        }

        let columns = self.column_interval_for_block_range_in_flow_thread(logical_top, logical_bottom);
        let fragment_in_column = |column_index: u32| {
            let overflow_rect = self.flow_thread_portion_overflow_rect_at(column_index);
            let translation = self.flow_thread_translation_at_offset(
                self.logical_top_in_flow_thread_at(column_index),
                PageBoundaryRule::AssociateWithLatterPage,
            );
            bounding_box_in_flow_thread
                .intersection(&overflow_rect)
                .unwrap_or_else(PhysicalRect::zero)
                .translate(translation)
        };

        let start_fragment = fragment_in_column(*columns.start());
        if columns.start() == columns.end() {
            return start_fragment;
        }
        start_fragment.union(&fragment_in_column(*columns.end()))
    }
}
