/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fmt;
use std::ops::Deref;

use app_units::Au;
use log::debug;
use num_traits::Zero;
use smallvec::{SmallVec, smallvec};

use crate::PageBoundaryRule;
use crate::flow_thread::FlowThread;
use crate::fragmentainer_group::{FragmentainerGroup, FragmentainerGroupRef};
use crate::geom::{LogicalRect, LogicalVec2, PhysicalPoint, PhysicalRect, PhysicalSize, PhysicalVec};

/// One contiguous run of columns, between the start of the multicol
/// container, column spanners, and its end.
///
/// A column set owns its fragmentainer groups. There is always at least one.
#[derive(Clone, Debug)]
pub struct ColumnSet {
    fragmentainer_groups: SmallVec<[FragmentainerGroup; 1]>,
    column_gap: Au,
    /// The content inline size of the column set box.
    logical_width: Au,
    /// Physical position of the column set box in the multicol container.
    location: PhysicalPoint,
    /// Block size of the column set box. Derived from the groups, see
    /// [`Self::recompute_geometry`].
    logical_height: Au,
    needs_geometry_update: bool,
}

impl ColumnSet {
    pub fn new(column_gap: Au) -> Self {
        Self {
            fragmentainer_groups: smallvec![FragmentainerGroup::new()],
            column_gap,
            logical_width: Au::zero(),
            location: PhysicalPoint::zero(),
            logical_height: Au::zero(),
            needs_geometry_update: true,
        }
    }

    #[inline]
    pub fn column_gap(&self) -> Au {
        self.column_gap
    }

    pub fn set_column_gap(&mut self, column_gap: Au) {
        self.column_gap = column_gap;
    }

    #[inline]
    pub fn logical_width(&self) -> Au {
        self.logical_width
    }

    pub fn set_logical_width(&mut self, logical_width: Au) {
        self.logical_width = logical_width;
        self.needs_geometry_update = true;
    }

    #[inline]
    pub fn location(&self) -> PhysicalPoint {
        self.location
    }

    pub fn set_location(&mut self, location: PhysicalPoint) {
        self.location = location;
    }

    pub fn logical_height(&self) -> Au {
        debug_assert!(!self.needs_geometry_update, "column set geometry is stale");
        self.logical_height
    }

    pub fn needs_geometry_update(&self) -> bool {
        self.needs_geometry_update
    }

    pub fn fragmentainer_groups(&self) -> &[FragmentainerGroup] {
        &self.fragmentainer_groups
    }

    pub fn fragmentainer_group_count(&self) -> usize {
        self.fragmentainer_groups.len()
    }

    pub fn fragmentainer_group_mut(&mut self, index: usize) -> Option<&mut FragmentainerGroup> {
        self.needs_geometry_update = true;
        self.fragmentainer_groups.get_mut(index)
    }

    pub fn first_fragmentainer_group(&self) -> &FragmentainerGroup {
        &self.fragmentainer_groups[0]
    }

    pub fn last_fragmentainer_group(&self) -> &FragmentainerGroup {
        &self.fragmentainer_groups[self.fragmentainer_groups.len() - 1]
    }

    pub fn last_fragmentainer_group_mut(&mut self) -> &mut FragmentainerGroup {
        self.needs_geometry_update = true;
        let last = self.fragmentainer_groups.len() - 1;
        &mut self.fragmentainer_groups[last]
    }

    /// Layout has reached the start of this column set, at the given flow
    /// thread offset.
    pub fn begin_flow(&mut self, offset_in_flow_thread: Au) {
        self.last_fragmentainer_group_mut()
            .set_logical_top_in_flow_thread(offset_in_flow_thread);
    }

    /// Layout has reached the end of this column set, at the given flow thread offset.
    pub fn end_flow(&mut self, offset_in_flow_thread: Au) {
        self.last_fragmentainer_group_mut()
            .set_logical_bottom_in_flow_thread(offset_in_flow_thread);
    }

    #[inline]
    pub fn logical_top_in_flow_thread(&self) -> Au {
        self.first_fragmentainer_group().logical_top_in_flow_thread()
    }

    #[inline]
    pub fn logical_bottom_in_flow_thread(&self) -> Au {
        self.last_fragmentainer_group().logical_bottom_in_flow_thread()
    }

    pub fn logical_height_in_flow_thread(&self) -> Au {
        (self.logical_bottom_in_flow_thread() - self.logical_top_in_flow_thread()).max(Au::zero())
    }

    /// Whether the column block size has been decided for the last row of columns.
    pub fn is_page_logical_height_known(&self) -> bool {
        self.last_fragmentainer_group().is_logical_height_known()
    }

    /// Adds a row of columns after the current last one, for when the
    /// column set continues in the next outer fragmentainer. The previous row
    /// ends where it runs out of room for `used_column_count` columns.
    pub fn append_new_fragmentainer_group(&mut self, used_column_count: u32) -> &mut FragmentainerGroup {
        let previous_group = self.last_fragmentainer_group_mut();
        let capacity = crate::geom::saturating_mul(previous_group.logical_height(), used_column_count);
        let block_offset_in_flow_thread = crate::geom::saturating_au(
            previous_group.logical_top_in_flow_thread().0 as i64 + capacity.0 as i64,
        );
        previous_group.set_logical_bottom_in_flow_thread(block_offset_in_flow_thread);

        let mut new_group = FragmentainerGroup::new();
        new_group.set_logical_top_in_flow_thread(block_offset_in_flow_thread);
        new_group.set_logical_bottom_in_flow_thread(block_offset_in_flow_thread);
        new_group.set_logical_top(previous_group.logical_top() + previous_group.logical_height());
        new_group.reset_column_height();

        debug!(
            "Column set gets fragmentainer group #{} at flow thread offset {:?}",
            self.fragmentainer_groups.len(),
            block_offset_in_flow_thread
        );
        self.fragmentainer_groups.push(new_group);
        self.last_fragmentainer_group_mut()
    }

    /// Forgets the column block size, and all rows but the first, ahead of a
    /// new layout pass.
    pub fn reset_column_height(&mut self) {
        self.fragmentainer_groups.truncate(1);
        self.fragmentainer_groups[0].reset_column_height();
        self.needs_geometry_update = true;
    }

    /// Recomputes the block size of the column set box from its rows.
    pub fn recompute_geometry(&mut self) {
        let last_group = self.last_fragmentainer_group();
        self.logical_height = last_group.logical_top() + last_group.logical_height();
        self.needs_geometry_update = false;
    }

    /// The index of the row that holds `offset_in_flow_thread`. Offsets before
    /// the first row belong to the first, offsets after the last row to the last.
    pub fn fragmentainer_group_index_at_flow_thread_offset(
        &self,
        offset_in_flow_thread: Au,
        rule: PageBoundaryRule,
    ) -> usize {
        if offset_in_flow_thread <= self.logical_top_in_flow_thread() {
            return 0;
        }
        self.fragmentainer_groups
            .iter()
            .position(|group| {
                let top = group.logical_top_in_flow_thread();
                let bottom = group.logical_bottom_in_flow_thread();
                match rule {
                    PageBoundaryRule::AssociateWithLatterPage => {
                        top <= offset_in_flow_thread && bottom > offset_in_flow_thread
                    },
                    PageBoundaryRule::AssociateWithFormerPage => {
                        top < offset_in_flow_thread && bottom >= offset_in_flow_thread
                    },
                }
            })
            .unwrap_or(self.fragmentainer_groups.len() - 1)
    }

    /// The index of the row under a block offset in the column set's logical space.
    pub fn fragmentainer_group_index_at_visual_block_offset(&self, block_offset: Au) -> usize {
        self.fragmentainer_groups
            .iter()
            .position(|group| group.logical_top() + group.logical_height() > block_offset)
            .unwrap_or(self.fragmentainer_groups.len() - 1)
    }
}

/// A column set together with the flow thread that owns it.
#[derive(Clone, Copy)]
pub struct ColumnSetRef<'a> {
    flow_thread: &'a FlowThread,
    index: usize,
}

impl<'a> Deref for ColumnSetRef<'a> {
    type Target = ColumnSet;

    fn deref(&self) -> &ColumnSet {
        self.data()
    }
}

impl fmt::Debug for ColumnSetRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ColumnSetRef")
            .field("index", &self.index)
            .field("column_set", self.data())
            .finish()
    }
}

impl PartialEq for ColumnSetRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.flow_thread, other.flow_thread) && self.index == other.index
    }
}

impl<'a> ColumnSetRef<'a> {
    pub(crate) fn new(flow_thread: &'a FlowThread, index: usize) -> Self {
        debug_assert!(index < flow_thread.column_sets.len());
        Self { flow_thread, index }
    }

    #[inline]
    pub(crate) fn data(&self) -> &'a ColumnSet {
        &self.flow_thread.column_sets[self.index]
    }

    #[inline]
    pub fn flow_thread(&self) -> &'a FlowThread {
        self.flow_thread
    }

    /// The index of this column set in its flow thread.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn previous_sibling(&self) -> Option<ColumnSetRef<'a>> {
        self.index.checked_sub(1).map(|index| Self::new(self.flow_thread, index))
    }

    pub fn next_sibling(&self) -> Option<ColumnSetRef<'a>> {
        let index = self.index + 1;
        (index < self.flow_thread.column_sets.len()).then(|| Self::new(self.flow_thread, index))
    }

    pub fn fragmentainer_group(&self, index: usize) -> Option<FragmentainerGroupRef<'a>> {
        (index < self.fragmentainer_group_count()).then(|| FragmentainerGroupRef::new(*self, index))
    }

    pub fn first_fragmentainer_group(&self) -> FragmentainerGroupRef<'a> {
        FragmentainerGroupRef::new(*self, 0)
    }

    pub fn last_fragmentainer_group(&self) -> FragmentainerGroupRef<'a> {
        FragmentainerGroupRef::new(*self, self.fragmentainer_group_count() - 1)
    }

    pub fn iter_fragmentainer_groups(self) -> impl Iterator<Item = FragmentainerGroupRef<'a>> + 'a {
        (0..self.fragmentainer_group_count()).map(move |index| FragmentainerGroupRef::new(self, index))
    }

    /// The inline size of one column.
    #[inline]
    pub fn page_logical_width(&self) -> Au {
        self.flow_thread.logical_width()
    }

    /// The column count resolved from `column-count` and `column-width`.
    #[inline]
    pub fn used_column_count(&self) -> u32 {
        self.flow_thread.column_count()
    }

    pub fn actual_column_count(&self) -> u32 {
        self.first_fragmentainer_group().actual_column_count()
    }

    /// The physical size of the column set box.
    pub fn physical_size(&self) -> PhysicalSize {
        LogicalVec2::new(self.logical_width(), self.logical_height())
            .to_physical_size(self.flow_thread.writing_mode())
    }

    pub fn fragmentainer_group_at_flow_thread_offset(
        &self,
        offset_in_flow_thread: Au,
        rule: PageBoundaryRule,
    ) -> FragmentainerGroupRef<'a> {
        let index = self.fragmentainer_group_index_at_flow_thread_offset(offset_in_flow_thread, rule);
        FragmentainerGroupRef::new(*self, index)
    }

    /// The row under a point in the column set's logical space.
    pub fn fragmentainer_group_at_visual_point(&self, visual_point: LogicalVec2<Au>) -> FragmentainerGroupRef<'a> {
        let index = self.fragmentainer_group_index_at_visual_block_offset(visual_point.block);
        FragmentainerGroupRef::new(*self, index)
    }

    /// The column block size at the given flow thread offset.
    pub fn page_logical_height_for_offset(&self, offset_in_flow_thread: Au) -> Au {
        self.fragmentainer_group_at_flow_thread_offset(
            offset_in_flow_thread,
            PageBoundaryRule::AssociateWithLatterPage,
        )
        .logical_height()
    }

    /// The flow thread offset where the column holding `offset_in_flow_thread` starts.
    pub fn page_logical_top_for_offset(&self, offset_in_flow_thread: Au) -> Au {
        self.fragmentainer_group_at_flow_thread_offset(
            offset_in_flow_thread,
            PageBoundaryRule::AssociateWithLatterPage,
        )
        .column_logical_top_for_offset(offset_in_flow_thread)
    }

    /// How much block space is left in the column holding `offset_in_flow_thread`.
    ///
    /// With [`PageBoundaryRule::AssociateWithFormerPage`], an offset exactly at
    /// a column boundary ends the former column and has nothing left.
    pub fn page_remaining_logical_height_for_offset(
        &self,
        offset_in_flow_thread: Au,
        rule: PageBoundaryRule,
    ) -> Au {
        let group = self.fragmentainer_group_at_flow_thread_offset(offset_in_flow_thread, rule);
        let page_logical_height = group.logical_height();
        let page_logical_bottom = group.column_logical_top_for_offset(offset_in_flow_thread) + page_logical_height;
        let remaining = page_logical_bottom - offset_in_flow_thread;
        if rule == PageBoundaryRule::AssociateWithFormerPage && page_logical_height > Au::zero() {
            return Au(remaining.0.rem_euclid(page_logical_height.0));
        }
        remaining
    }

    /// The part of the flow thread held by this column set, in the flow
    /// thread's physical coordinate space.
    pub fn flow_thread_portion_rect(&self) -> PhysicalRect {
        let flow_thread = self.flow_thread;
        LogicalRect::new(
            Au::zero(),
            self.logical_top_in_flow_thread(),
            self.page_logical_width(),
            self.logical_height_in_flow_thread(),
        )
        .to_physical(flow_thread.writing_mode(), flow_thread.physical_size())
    }

    pub fn flow_thread_translation_at_offset(
        &self,
        offset_in_flow_thread: Au,
        rule: PageBoundaryRule,
    ) -> PhysicalVec {
        self.fragmentainer_group_at_flow_thread_offset(offset_in_flow_thread, rule)
            .flow_thread_translation_at_offset(offset_in_flow_thread, rule)
    }

    /// Maps a point relative to the column set box to a point in the flow
    /// thread's physical coordinate space.
    pub fn visual_point_to_flow_thread_point(&self, visual_point: PhysicalPoint) -> PhysicalPoint {
        let flow_thread = self.flow_thread;
        let writing_mode = flow_thread.writing_mode();
        let logical_point = LogicalVec2::from_physical_point(writing_mode, visual_point, self.physical_size());
        let group = self.fragmentainer_group_at_visual_point(logical_point);
        let point_in_group = logical_point - LogicalVec2::new(Au::zero(), group.logical_top());
        group
            .visual_point_to_flow_thread_point(point_in_group)
            .to_physical_point(writing_mode, flow_thread.physical_size())
    }

    /// The union of the visual bounding boxes of the pieces of a flow thread
    /// box in every row of this column set.
    pub fn fragments_bounding_box(&self, bounding_box_in_flow_thread: &PhysicalRect) -> PhysicalRect {
        self.iter_fragmentainer_groups()
            .map(|group| group.fragments_bounding_box(bounding_box_in_flow_thread))
            .fold(PhysicalRect::zero(), |result, rect| result.union(&rect))
    }
}
