/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! An index from flow-thread block offsets to column sets.
//!
//! The index is derived data. It is never patched: the flow thread throws it
//! away and builds a new one whenever its column sets change, so an entry can
//! never refer to a column set that no longer exists.

use app_units::Au;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Interval {
    low: Au,
    high: Au,
    column_set_index: usize,
}

#[derive(Debug, Default)]
pub(crate) struct ColumnSetIntervalTree {
    /// Sorted by `low`, then by column set index.
    intervals: Vec<Interval>,
    /// `max_high[i]` is the largest `high` among `intervals[..=i]`.
    max_high: Vec<Au>,
}

impl ColumnSetIntervalTree {
    /// Builds the index from the `[low, high)` flow-thread range of every column set,
    /// given in column set order.
    pub(crate) fn build(ranges: impl IntoIterator<Item = (Au, Au)>) -> Self {
        let mut intervals: Vec<Interval> = ranges
            .into_iter()
            .enumerate()
            .map(|(column_set_index, (low, high))| Interval {
                low,
                high,
                column_set_index,
            })
            .collect();
        intervals.sort_by_key(|interval| (interval.low, interval.column_set_index));

        let mut max_high = Vec::with_capacity(intervals.len());
        let mut running = None;
        for interval in &intervals {
            let high = running.map_or(interval.high, |running: Au| running.max(interval.high));
            running = Some(high);
            max_high.push(high);
        }

        Self {
            intervals,
            max_high,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Finds the column set whose range contains `offset`, i.e. `low <= offset < high`.
    /// When several do, the one with the lowest start wins.
    pub(crate) fn column_set_index_at(&self, offset: Au) -> Option<usize> {
        let candidates = self.intervals.partition_point(|interval| interval.low <= offset);
        let mut result: Option<Interval> = None;
        for index in (0..candidates).rev() {
            // Nothing at or before this position reaches past the offset.
            if self.max_high[index] <= offset {
                break;
            }
            let interval = self.intervals[index];
            if interval.high > offset {
                result = Some(interval);
            }
        }
        result.map(|interval| interval.column_set_index)
    }
}
