/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use app_units::Au;
use log::trace;

use crate::PageBoundaryRule;
use crate::column_set::ColumnSetRef;
use crate::flow_thread::FlowThread;
use crate::fragmentainer_group::FragmentainerGroupRef;
use crate::geom::{LogicalRect, PhysicalRect, PhysicalVec};

/// One fragmentainer visited by a [`FragmentainerIterator`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fragmentainer<'a> {
    pub group: FragmentainerGroupRef<'a>,
    pub index: u32,
    /// The part of the flow thread to paint into this fragmentainer.
    pub clip_rect: PhysicalRect,
    /// The translation from flow thread to visual coordinates.
    pub pagination_offset: PhysicalVec,
}

/// Walks the fragmentainers that a box in the flow thread intersects, in flow
/// thread order, across fragmentainer groups and column sets.
///
/// The iterator only moves forward. Start over by creating a new one.
pub struct FragmentainerIterator<'a> {
    flow_thread: &'a FlowThread,
    /// `None` once the iterator is at its end.
    current_column_set: Option<ColumnSetRef<'a>>,
    current_fragmentainer_group_index: usize,
    current_fragmentainer_index: u32,
    end_fragmentainer_index: u32,
    logical_top_in_flow_thread: Au,
    logical_bottom_in_flow_thread: Au,
    bounding_box_is_empty: bool,
}

impl<'a> FragmentainerIterator<'a> {
    pub fn new(flow_thread: &'a FlowThread, physical_bounding_box_in_flow_thread: &PhysicalRect) -> Self {
        let bounding_box = LogicalRect::from_physical(
            flow_thread.writing_mode(),
            *physical_bounding_box_in_flow_thread,
            flow_thread.physical_size(),
        );
        let mut iterator = Self {
            flow_thread,
            current_column_set: None,
            current_fragmentainer_group_index: 0,
            current_fragmentainer_index: 0,
            end_fragmentainer_index: 0,
            logical_top_in_flow_thread: bounding_box.start_corner.block,
            logical_bottom_in_flow_thread: bounding_box.block_end(),
            bounding_box_is_empty: bounding_box.is_empty(),
        };
        trace!(
            "Fragmentainer iterator for flow thread range {:?}..{:?}",
            iterator.logical_top_in_flow_thread,
            iterator.logical_bottom_in_flow_thread
        );

        if !iterator.intersects_column_sets() {
            return iterator;
        }
        let Some(column_set) = flow_thread.column_set_at_block_offset(
            iterator.logical_top_in_flow_thread,
            PageBoundaryRule::AssociateWithLatterPage,
        ) else {
            return iterator;
        };
        iterator.current_fragmentainer_group_index = column_set.fragmentainer_group_index_at_flow_thread_offset(
            iterator.logical_top_in_flow_thread,
            PageBoundaryRule::AssociateWithLatterPage,
        );
        iterator.current_column_set = Some(column_set);
        if !iterator.intersects_current_fragmentainer_group() &&
            !iterator.move_to_next_fragmentainer_group()
        {
            iterator.current_column_set = None;
            return iterator;
        }
        iterator.set_fragmentainers_of_interest();
        iterator
    }

    /// Whether the box lies within the part of the flow thread that the column
    /// sets hold. A box entirely before or after it has no fragmentainers.
    fn intersects_column_sets(&self) -> bool {
        let (Some(first), Some(last)) = (
            self.flow_thread.first_column_set(),
            self.flow_thread.last_column_set(),
        ) else {
            return false;
        };
        let logical_top = self.logical_top_in_flow_thread;
        let logical_bottom = self.logical_bottom_in_flow_thread;
        if logical_top >= last.logical_bottom_in_flow_thread() {
            return false;
        }
        let first_logical_top = first.logical_top_in_flow_thread();
        logical_bottom > first_logical_top ||
            (logical_bottom == first_logical_top && logical_top == logical_bottom)
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.current_column_set.is_none()
    }

    /// Moves on to the next fragmentainer. Must not be called at the end.
    pub fn advance(&mut self) {
        debug_assert!(!self.at_end(), "advancing a fragmentainer iterator past its end");
        if self.at_end() {
            return;
        }
        if self.current_fragmentainer_index < self.end_fragmentainer_index {
            self.current_fragmentainer_index += 1;
            return;
        }
        // That was the last fragmentainer of interest in this group.
        if !self.move_to_next_fragmentainer_group() {
            self.current_column_set = None;
            return;
        }
        self.set_fragmentainers_of_interest();
    }

    /// The group of the current fragmentainer, or `None` at the end.
    pub fn fragmentainer_group(&self) -> Option<FragmentainerGroupRef<'a>> {
        self.current_column_set
            .and_then(|column_set| column_set.fragmentainer_group(self.current_fragmentainer_group_index))
    }

    /// The column index of the current fragmentainer in its group.
    #[inline]
    pub fn fragmentainer_index(&self) -> u32 {
        self.current_fragmentainer_index
    }

    pub fn fragmentainer_logical_top_in_flow_thread(&self) -> Au {
        debug_assert!(!self.at_end());
        self.fragmentainer_group()
            .map_or(Au(0), |group| group.logical_top_in_flow_thread_at(self.current_fragmentainer_index))
    }

    /// The translation from flow thread coordinates to visual coordinates for
    /// the current fragmentainer.
    pub fn pagination_offset(&self) -> PhysicalVec {
        debug_assert!(!self.at_end());
        self.fragmentainer_group().map_or(PhysicalVec::zero(), |group| {
            group.flow_thread_translation_at_offset(
                self.fragmentainer_logical_top_in_flow_thread(),
                PageBoundaryRule::AssociateWithLatterPage,
            )
        })
    }

    /// The part of the flow thread to paint into the current fragmentainer, in
    /// the flow thread's coordinate space.
    pub fn clip_rect_in_flow_thread(&self) -> PhysicalRect {
        debug_assert!(!self.at_end());
        let Some(group) = self.fragmentainer_group() else {
            return PhysicalRect::zero();
        };
        // An empty box would usually sit at the origin, in the first column,
        // which may have no block-start clip. As the logical bottom is
        // exclusive, leave overflow out of it entirely.
        if self.bounding_box_is_empty {
            group.flow_thread_portion_rect_at(self.current_fragmentainer_index)
        } else {
            group.flow_thread_portion_overflow_rect_at(self.current_fragmentainer_index)
        }
    }

    /// Whether the block range of the box overlaps the flow thread portion
    /// of the current group. An empty range overlaps the group it sits in.
    fn intersects_current_fragmentainer_group(&self) -> bool {
        let Some(group) = self.fragmentainer_group() else {
            return false;
        };
        if self.logical_bottom_in_flow_thread <= self.logical_top_in_flow_thread {
            return true;
        }
        self.logical_top_in_flow_thread.max(group.logical_top_in_flow_thread()) <
            self.logical_bottom_in_flow_thread
                .min(group.logical_bottom_in_flow_thread())
    }

    /// Moves on to the next group that the box overlaps, in this column set or
    /// a later one. Column sets and groups without any flow thread portion in
    /// the range, such as empty column sets between spanners, are passed over.
    fn move_to_next_fragmentainer_group(&mut self) -> bool {
        loop {
            let Some(mut column_set) = self.current_column_set else {
                return false;
            };
            self.current_fragmentainer_group_index += 1;
            if self.current_fragmentainer_group_index >= column_set.fragmentainer_group_count() {
                // Last group of this column set. Continue with the next one.
                let Some(next_column_set) = column_set.next_sibling() else {
                    return false;
                };
                column_set = next_column_set;
                self.current_column_set = Some(column_set);
                self.current_fragmentainer_group_index = 0;
            }
            // Groups come in flow thread order, so nothing from here on can
            // intersect either.
            let group_logical_top = column_set.fragmentainer_groups()[self.current_fragmentainer_group_index]
                .logical_top_in_flow_thread();
            if group_logical_top >= self.logical_bottom_in_flow_thread {
                return false;
            }
            if self.intersects_current_fragmentainer_group() {
                return true;
            }
        }
    }

    fn set_fragmentainers_of_interest(&mut self) {
        let Some(group) = self.fragmentainer_group() else {
            return;
        };
        let columns = group.column_interval_for_block_range_in_flow_thread(
            self.logical_top_in_flow_thread,
            self.logical_bottom_in_flow_thread,
        );
        self.current_fragmentainer_index = *columns.start();
        self.end_fragmentainer_index = *columns.end();
    }
}

impl<'a> Iterator for FragmentainerIterator<'a> {
    type Item = Fragmentainer<'a>;

    fn next(&mut self) -> Option<Fragmentainer<'a>> {
        let group = self.fragmentainer_group()?;
        let fragmentainer = Fragmentainer {
            group,
            index: self.current_fragmentainer_index,
            clip_rect: self.clip_rect_in_flow_thread(),
            pagination_offset: self.pagination_offset(),
        };
        self.advance();
        Some(fragmentainer)
    }
}
