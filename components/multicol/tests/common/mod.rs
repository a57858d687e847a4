/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

#![allow(dead_code)]

use app_units::Au;
use euclid::default::{Point2D, Rect, Size2D, Vector2D};
use multicol::geom::{PhysicalPoint, PhysicalRect, PhysicalVec, WritingMode};
use multicol::{ColumnSet, FlowThread, MulticolConfig};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn px(value: i32) -> Au {
    Au::from_px(value)
}

pub fn point(x: i32, y: i32) -> PhysicalPoint {
    Point2D::new(px(x), px(y))
}

pub fn vector(x: i32, y: i32) -> PhysicalVec {
    Vector2D::new(px(x), px(y))
}

pub fn rect(x: i32, y: i32, width: i32, height: i32) -> PhysicalRect {
    Rect::new(point(x, y), Size2D::new(px(width), px(height)))
}

/// The flow thread range and column block sizes of one column set. Every
/// entry of `column_heights` is a row of columns; all rows but the last end
/// where their columns are full.
#[derive(Clone, Debug)]
pub struct ColumnSetSpec {
    pub top: i32,
    pub bottom: i32,
    pub column_heights: Vec<i32>,
    pub location: (i32, i32),
}

impl ColumnSetSpec {
    pub fn new(top: i32, bottom: i32, column_height: i32) -> Self {
        Self {
            top,
            bottom,
            column_heights: vec![column_height],
            location: (0, 0),
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.location = (x, y);
        self
    }

    pub fn with_rows(mut self, column_heights: &[i32]) -> Self {
        self.column_heights = column_heights.to_vec();
        self
    }
}

/// The style and box geometry of a multicol container.
#[derive(Clone, Debug)]
pub struct Multicol {
    pub writing_mode: WritingMode,
    pub column_count: u32,
    pub column_width: i32,
    pub column_gap: i32,
    pub location: (i32, i32),
    pub config: MulticolConfig,
}

impl Multicol {
    pub fn new(column_count: u32, column_width: i32, column_gap: i32) -> Self {
        Self {
            writing_mode: WritingMode::horizontal_tb(),
            column_count,
            column_width,
            column_gap,
            location: (0, 0),
            config: MulticolConfig::default(),
        }
    }

    pub fn writing_mode(mut self, writing_mode: WritingMode) -> Self {
        self.writing_mode = writing_mode;
        self
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.location = (x, y);
        self
    }

    pub fn config(mut self, config: MulticolConfig) -> Self {
        self.config = config;
        self
    }

    pub fn content_width(&self) -> i32 {
        let column_count = self.column_count as i32;
        column_count * self.column_width + (column_count - 1) * self.column_gap
    }

    /// Runs a layout pass the way the block layout of a multicol container
    /// drives the flow thread.
    pub fn lay_out(&self, column_sets: &[ColumnSetSpec]) -> FlowThread {
        init_logger();
        let mut flow_thread = FlowThread::new(self.writing_mode, self.config.clone());
        flow_thread.set_column_count(self.column_count);
        flow_thread.set_logical_width(px(self.column_width));
        flow_thread.set_location(point(self.location.0, self.location.1));

        for spec in column_sets {
            let mut column_set = ColumnSet::new(px(self.column_gap));
            column_set.set_logical_width(px(self.content_width()));
            column_set.set_location(point(spec.location.0, spec.location.1));
            flow_thread.append_column_set(column_set);
        }

        flow_thread.begin_layout();
        for (index, spec) in column_sets.iter().enumerate() {
            flow_thread.set_last_set_worked_on(Some(index));
            flow_thread
                .column_set_mut(index)
                .expect("column set exists")
                .begin_flow(px(spec.top));
            for (group_index, column_height) in spec.column_heights.iter().enumerate() {
                if group_index > 0 {
                    flow_thread
                        .append_new_fragmentainer_group(index)
                        .expect("column set exists");
                }
                flow_thread.set_column_block_size(index, group_index, px(*column_height));
            }
            flow_thread
                .column_set_mut(index)
                .expect("column set exists")
                .end_flow(px(spec.bottom));
        }
        flow_thread.finish_layout();
        flow_thread
    }
}
