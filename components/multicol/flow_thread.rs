/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use app_units::Au;
use itertools::Itertools;
use log::{debug, warn};
use num_traits::Zero;

use crate::PageBoundaryRule;
use crate::column_set::{ColumnSet, ColumnSetRef};
use crate::column_set_interval_tree::ColumnSetIntervalTree;
use crate::config::MulticolConfig;
use crate::fragmentainer_group::FragmentainerGroup;
use crate::fragmentainer_iterator::FragmentainerIterator;
use crate::geom::{self, LogicalVec2, PhysicalPoint, PhysicalRect, PhysicalSize, PhysicalVec, WritingMode};

/// The single, infinitely tall column that holds all content of one
/// fragmentation context before it is sliced into fragmentainers.
///
/// The flow thread owns its column sets, in flow thread order. Layout mutates
/// them through the methods here, which keep track of what has to be
/// recomputed. Between [`Self::begin_layout`] (or any structural change) and
/// [`Self::finish_layout`], the derived geometry must not be queried.
#[derive(Debug)]
pub struct FlowThread {
    writing_mode: WritingMode,
    config: MulticolConfig,
    pub(crate) column_sets: Vec<ColumnSet>,
    /// Derived from `column_sets`, rebuilt by [`Self::validate_column_sets`].
    column_set_interval_tree: ColumnSetIntervalTree,
    column_sets_invalidated: bool,
    /// The column set layout is currently filling, if layout is in progress.
    last_set_worked_on: Option<usize>,
    all_columns_have_known_height: bool,
    /// The used column count, from `column-count` and `column-width`.
    column_count: u32,
    /// The inline size of one column.
    logical_width: Au,
    /// Physical position of the flow thread in the multicol container.
    location: PhysicalPoint,
    /// Sum of the capacity of every fragmentainer. See [`Self::update_geometry`].
    logical_height: Au,
    has_valid_geometry: bool,
}

impl FlowThread {
    pub fn new(writing_mode: WritingMode, config: MulticolConfig) -> Self {
        Self {
            writing_mode,
            config,
            column_sets: Vec::new(),
            column_set_interval_tree: ColumnSetIntervalTree::default(),
            column_sets_invalidated: false,
            last_set_worked_on: None,
            all_columns_have_known_height: false,
            column_count: 1,
            logical_width: Au::zero(),
            location: PhysicalPoint::zero(),
            logical_height: Au::zero(),
            has_valid_geometry: false,
        }
    }

    #[inline]
    pub fn writing_mode(&self) -> WritingMode {
        self.writing_mode
    }

    #[inline]
    pub fn config(&self) -> &MulticolConfig {
        &self.config
    }

    #[inline]
    pub fn column_count(&self) -> u32 {
        self.column_count
    }

    pub fn set_column_count(&mut self, column_count: u32) {
        self.column_count = column_count.max(1);
        self.has_valid_geometry = false;
    }

    #[inline]
    pub fn logical_width(&self) -> Au {
        self.logical_width
    }

    pub fn set_logical_width(&mut self, logical_width: Au) {
        self.logical_width = logical_width;
        self.has_valid_geometry = false;
    }

    #[inline]
    pub fn location(&self) -> PhysicalPoint {
        self.location
    }

    pub fn set_location(&mut self, location: PhysicalPoint) {
        self.location = location;
    }

    pub fn logical_height(&self) -> Au {
        debug_assert!(self.has_valid_geometry, "flow thread geometry is stale");
        self.logical_height
    }

    pub fn physical_size(&self) -> PhysicalSize {
        LogicalVec2::new(self.logical_width, self.logical_height()).to_physical_size(self.writing_mode)
    }

    /// Whether every column in the flow thread has a known block size.
    pub fn is_page_logical_height_known(&self) -> bool {
        self.all_columns_have_known_height
    }

    pub fn column_set_count(&self) -> usize {
        self.column_sets.len()
    }

    pub fn column_set(&self, index: usize) -> Option<ColumnSetRef<'_>> {
        (index < self.column_sets.len()).then(|| ColumnSetRef::new(self, index))
    }

    pub fn column_sets(&self) -> impl Iterator<Item = ColumnSetRef<'_>> + '_ {
        (0..self.column_sets.len()).map(move |index| ColumnSetRef::new(self, index))
    }

    pub fn first_column_set(&self) -> Option<ColumnSetRef<'_>> {
        self.column_set(0)
    }

    pub fn last_column_set(&self) -> Option<ColumnSetRef<'_>> {
        self.column_sets.len().checked_sub(1).and_then(|index| self.column_set(index))
    }

    /// Adds a column set after the last one, and returns its index.
    pub fn append_column_set(&mut self, column_set: ColumnSet) -> usize {
        self.column_sets.push(column_set);
        self.invalidate_column_sets();
        self.column_sets.len() - 1
    }

    pub fn insert_column_set(&mut self, index: usize, column_set: ColumnSet) {
        let index = index.min(self.column_sets.len());
        self.column_sets.insert(index, column_set);
        if let Some(worked_on) = self.last_set_worked_on.as_mut() {
            if *worked_on >= index {
                *worked_on += 1;
            }
        }
        self.invalidate_column_sets();
    }

    pub fn remove_column_set(&mut self, index: usize) -> Option<ColumnSet> {
        if index >= self.column_sets.len() {
            return None;
        }
        let column_set = self.column_sets.remove(index);
        self.last_set_worked_on = match self.last_set_worked_on {
            Some(worked_on) if worked_on == index => index.checked_sub(1),
            Some(worked_on) if worked_on > index => Some(worked_on - 1),
            other => other,
        };
        self.invalidate_column_sets();
        Some(column_set)
    }

    /// Gives layout mutable access to a column set. The column set index has
    /// to be rebuilt afterwards.
    pub fn column_set_mut(&mut self, index: usize) -> Option<&mut ColumnSet> {
        self.invalidate_column_sets();
        self.column_sets.get_mut(index)
    }

    /// Starts a new row of columns in the given column set, for when the
    /// multicol container continues in the next outer fragmentainer.
    pub fn append_new_fragmentainer_group(&mut self, column_set_index: usize) -> Option<&mut FragmentainerGroup> {
        let used_column_count = self.column_count;
        let column_set = self.column_set_mut(column_set_index)?;
        Some(column_set.append_new_fragmentainer_group(used_column_count))
    }

    /// Stores the column block size that column balancing picked for a row.
    pub fn set_column_block_size(&mut self, column_set_index: usize, group_index: usize, block_size: Au) {
        let min_block_size = self.config.min_column_block_size();
        if let Some(group) = self
            .column_set_mut(column_set_index)
            .and_then(|column_set| column_set.fragmentainer_group_mut(group_index))
        {
            group.set_column_block_size(block_size, min_block_size);
        }
    }

    /// Lets the column block size of a row grow, e.g. after a balancing pass
    /// found that content did not fit.
    pub fn extend_column_block_size(&mut self, column_set_index: usize, group_index: usize, block_size: Au) {
        let min_block_size = self.config.min_column_block_size();
        if let Some(group) = self
            .column_set_mut(column_set_index)
            .and_then(|column_set| column_set.fragmentainer_group_mut(group_index))
        {
            group.extend_column_block_size(block_size, min_block_size);
        }
    }

    /// Prepares for a new layout pass: column heights are forgotten, and
    /// extra fragmentainer groups are removed.
    pub fn begin_layout(&mut self) {
        debug!("Beginning layout of flow thread with {} column sets", self.column_sets.len());
        self.all_columns_have_known_height = false;
        for column_set in self.column_sets.iter_mut() {
            column_set.reset_column_height();
        }
        self.last_set_worked_on = (!self.column_sets.is_empty()).then_some(0);
        self.has_valid_geometry = false;
        self.invalidate_column_sets();
    }

    /// Tells [`Self::column_set_at_block_offset`] which column set layout is
    /// currently filling. The flow thread ranges of the column sets are not
    /// final while this is set.
    pub fn set_last_set_worked_on(&mut self, column_set_index: Option<usize>) {
        debug_assert!(column_set_index.is_none_or(|index| index < self.column_sets.len()));
        self.last_set_worked_on = column_set_index;
    }

    /// Ends a layout pass: all derived geometry is recomputed, and the
    /// flow thread can be queried again.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "FlowThread::finish_layout",
            skip_all,
            fields(servo_profiling = true),
            level = "trace",
        )
    )]
    pub fn finish_layout(&mut self) {
        self.all_columns_have_known_height = true;
        for column_set in self.column_sets.iter_mut() {
            column_set.recompute_geometry();
        }
        self.update_geometry();
        self.validate_column_sets();
        self.last_set_worked_on = None;
        debug!(
            "Finished layout of flow thread: {} column sets, block size {:?}",
            self.column_sets.len(),
            self.logical_height
        );
    }

    /// Recomputes the size of the flow thread. Its block size is the room
    /// offered by all fragmentainers together.
    pub fn update_geometry(&mut self) {
        let logical_height = self
            .column_sets()
            .flat_map(|column_set| column_set.iter_fragmentainer_groups())
            .map(|group| geom::saturating_mul(group.logical_height(), group.actual_column_count()))
            .fold(0_i64, |sum, capacity| sum + capacity.0 as i64);
        self.logical_height = geom::saturating_au(logical_height);
        self.has_valid_geometry = true;
    }

    pub fn invalidate_column_sets(&mut self) {
        self.column_sets_invalidated = true;
    }

    /// Whether the column sets can be queried: they exist and the index over
    /// them is up to date.
    pub fn has_valid_column_set_info(&self) -> bool {
        !self.column_sets_invalidated && !self.column_sets.is_empty()
    }

    /// Rebuilds the index over the column sets from scratch.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "FlowThread::validate_column_sets",
            skip_all,
            fields(servo_profiling = true),
            level = "trace",
        )
    )]
    pub fn validate_column_sets(&mut self) {
        for ((previous_index, previous), (next_index, next)) in self.column_sets.iter().enumerate().tuple_windows() {
            if next.logical_top_in_flow_thread() < previous.logical_top_in_flow_thread() {
                warn!(
                    "Column set {} starts at {:?}, before column set {} at {:?}",
                    next_index,
                    next.logical_top_in_flow_thread(),
                    previous_index,
                    previous.logical_top_in_flow_thread()
                );
            }
        }
        self.column_set_interval_tree = ColumnSetIntervalTree::build(self.column_sets.iter().map(|column_set| {
            (
                column_set.logical_top_in_flow_thread(),
                column_set.logical_bottom_in_flow_thread(),
            )
        }));
        self.column_sets_invalidated = false;
        debug!(
            "Rebuilt column set index with {} entries",
            self.column_set_interval_tree.len()
        );
    }

    /// The column set that holds the flow thread block offset `offset`.
    ///
    /// Offsets before the first column set belong to it, offsets after the
    /// last one belong to the last. Column sets without a known block size, or
    /// without any content, are passed over for a later one that contains the
    /// offset.
    pub fn column_set_at_block_offset(&self, offset: Au, rule: PageBoundaryRule) -> Option<ColumnSetRef<'_>> {
        let count = self.column_sets.len();
        if count == 0 {
            return None;
        }
        let mut index = match self.last_set_worked_on {
            Some(worked_on) => {
                // Layout is in progress, so the index is out of date. Walk back
                // from the column set being laid out, since a block containing
                // a spanner has content in the sets before and after it.
                let mut index = worked_on.min(count - 1);
                while index > 0 && self.column_sets[index].logical_top_in_flow_thread() > offset {
                    index -= 1;
                }
                index
            },
            None => {
                debug_assert!(!self.column_sets_invalidated, "column set index is stale");
                if offset < Au::zero() || offset < self.column_sets[0].logical_top_in_flow_thread() {
                    0
                } else {
                    // Not in any column set means the offset is in the overflow
                    // after the last one.
                    self.column_set_interval_tree
                        .column_set_index_at(offset)
                        .filter(|index| *index < count)
                        .unwrap_or(count - 1)
                }
            },
        };

        if rule == PageBoundaryRule::AssociateWithFormerPage &&
            index > 0 &&
            offset == self.column_sets[index].logical_top_in_flow_thread()
        {
            index -= 1;
        }

        for (candidate, column_set) in self.column_sets.iter().enumerate().skip(index) {
            if !column_set.is_page_logical_height_known() {
                continue;
            }
            let top = column_set.logical_top_in_flow_thread();
            let bottom = column_set.logical_bottom_in_flow_thread();
            let contains_offset = match rule {
                PageBoundaryRule::AssociateWithFormerPage => top < offset && bottom >= offset,
                PageBoundaryRule::AssociateWithLatterPage => top <= offset && bottom > offset,
            };
            if contains_offset {
                return self.column_set(candidate);
            }
        }
        self.column_set(index)
    }

    /// The offset to add to a flow thread point at block offset `offset` to get
    /// its visual position.
    pub fn flow_thread_translation_at_offset(&self, offset: Au, rule: PageBoundaryRule) -> PhysicalVec {
        if !self.has_valid_column_set_info() {
            return PhysicalVec::zero();
        }
        match self.column_set_at_block_offset(offset, rule) {
            Some(column_set) => column_set.flow_thread_translation_at_offset(offset, rule),
            None => PhysicalVec::zero(),
        }
    }

    pub fn flow_thread_translation_at_point(&self, flow_thread_point: PhysicalPoint) -> PhysicalVec {
        let block_offset =
            LogicalVec2::from_physical_point(self.writing_mode, flow_thread_point, self.physical_size()).block;
        // With flipped blocks, a point at a column boundary is at the end of
        // the former column.
        let rule = if self.writing_mode.is_flipped_blocks() {
            PageBoundaryRule::AssociateWithFormerPage
        } else {
            PageBoundaryRule::AssociateWithLatterPage
        };
        self.flow_thread_translation_at_offset(block_offset, rule)
    }

    /// How far the column holding `point` moved it away from its position in the flow thread.
    pub fn column_offset(&self, point: PhysicalPoint) -> PhysicalVec {
        self.flow_thread_translation_at_point(point)
    }

    /// Maps a visual point, relative to the flow thread's location, to the
    /// point in the flow thread that is painted there.
    pub fn visual_point_to_flow_thread_point(&self, visual_point: PhysicalPoint) -> PhysicalPoint {
        let writing_mode = self.writing_mode;
        let point_in_container = visual_point + self.location.to_vector();
        let column_set = self
            .column_sets()
            .find(|column_set| {
                let column_set_rect = PhysicalRect::new(column_set.location(), column_set.physical_size());
                if writing_mode.is_horizontal() {
                    point_in_container.y < column_set_rect.max_y()
                } else if writing_mode.is_vertical_lr() {
                    point_in_container.x < column_set_rect.max_x()
                } else {
                    point_in_container.x > column_set_rect.min_x()
                }
            })
            .or_else(|| self.last_column_set());
        let Some(column_set) = column_set else {
            return visual_point;
        };
        let point_in_column_set = point_in_container - column_set.location().to_vector();
        column_set.visual_point_to_flow_thread_point(point_in_column_set)
    }

    /// The visual bounding box of a box in the flow thread, once it has been
    /// split into columns. Both are in the flow thread's coordinate space.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "FlowThread::fragments_bounding_box",
            skip_all,
            fields(servo_profiling = true),
            level = "trace",
        )
    )]
    pub fn fragments_bounding_box(&self, bounding_box_in_flow_thread: &PhysicalRect) -> PhysicalRect {
        debug_assert!(!self.column_sets_invalidated, "column set index is stale");
        self.column_sets()
            .map(|column_set| column_set.fragments_bounding_box(bounding_box_in_flow_thread))
            .fold(PhysicalRect::zero(), |result, rect| result.union(&rect))
    }

    /// The fragmentainers that a box in the flow thread's physical coordinate space touches.
    pub fn fragmentainers(&self, bounding_box_in_flow_thread: &PhysicalRect) -> FragmentainerIterator<'_> {
        FragmentainerIterator::new(self, bounding_box_in_flow_thread)
    }
}
