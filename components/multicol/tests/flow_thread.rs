/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

mod common;

use app_units::Au;
use common::{ColumnSetSpec, Multicol, point, px, rect, vector};
use multicol::geom::WritingMode;
use multicol::{ColumnSet, FlowThread, MulticolConfig, PageBoundaryRule};

const FORMER: PageBoundaryRule = PageBoundaryRule::AssociateWithFormerPage;
const LATTER: PageBoundaryRule = PageBoundaryRule::AssociateWithLatterPage;

/// Five lines of 100px in two columns, a spanner, two lines, a spanner and
/// one more line.
fn three_column_sets() -> FlowThread {
    Multicol::new(2, 100, 0).lay_out(&[
        ColumnSetSpec::new(0, 600, 300),
        ColumnSetSpec::new(600, 800, 100).at(0, 400),
        ColumnSetSpec::new(800, 900, 100).at(0, 600),
    ])
}

fn column_set_index_at(flow_thread: &FlowThread, offset: i32, rule: PageBoundaryRule) -> Option<usize> {
    flow_thread
        .column_set_at_block_offset(px(offset), rule)
        .map(|column_set| column_set.index())
}

#[test]
fn test_column_set_at_block_offset() {
    let flow_thread = three_column_sets();

    assert_eq!(column_set_index_at(&flow_thread, -10000, FORMER), Some(0));
    assert_eq!(column_set_index_at(&flow_thread, -10000, LATTER), Some(0));
    assert_eq!(column_set_index_at(&flow_thread, 0, FORMER), Some(0));
    assert_eq!(column_set_index_at(&flow_thread, 0, LATTER), Some(0));
    assert_eq!(column_set_index_at(&flow_thread, 599, FORMER), Some(0));
    assert_eq!(column_set_index_at(&flow_thread, 599, LATTER), Some(0));
    assert_eq!(column_set_index_at(&flow_thread, 600, FORMER), Some(0));
    assert_eq!(column_set_index_at(&flow_thread, 600, LATTER), Some(1));
    assert_eq!(column_set_index_at(&flow_thread, 799, FORMER), Some(1));
    assert_eq!(column_set_index_at(&flow_thread, 799, LATTER), Some(1));
    assert_eq!(column_set_index_at(&flow_thread, 800, FORMER), Some(1));
    assert_eq!(column_set_index_at(&flow_thread, 800, LATTER), Some(2));
    assert_eq!(column_set_index_at(&flow_thread, 899, LATTER), Some(2));
    assert_eq!(column_set_index_at(&flow_thread, 10000, FORMER), Some(2));
    assert_eq!(column_set_index_at(&flow_thread, 10000, LATTER), Some(2));
}

#[test]
fn test_column_set_at_block_offset_skips_empty_sets() {
    // A zero-height column set between two spanners.
    let flow_thread = Multicol::new(2, 100, 0).lay_out(&[
        ColumnSetSpec::new(0, 200, 100),
        ColumnSetSpec::new(200, 200, 100),
        ColumnSetSpec::new(200, 400, 100),
    ]);
    assert_eq!(column_set_index_at(&flow_thread, 200, LATTER), Some(2));
    assert_eq!(column_set_index_at(&flow_thread, 250, LATTER), Some(2));
    assert_eq!(column_set_index_at(&flow_thread, 199, FORMER), Some(0));
}

#[test]
fn test_column_set_at_block_offset_without_column_sets() {
    let mut flow_thread = FlowThread::new(WritingMode::horizontal_tb(), MulticolConfig::default());
    flow_thread.finish_layout();
    assert!(flow_thread.column_set_at_block_offset(px(0), LATTER).is_none());
    assert!(!flow_thread.has_valid_column_set_info());
    assert_eq!(flow_thread.flow_thread_translation_at_offset(px(0), LATTER), vector(0, 0));
    assert!(flow_thread.first_column_set().is_none());
    assert!(flow_thread.last_column_set().is_none());
}

#[test]
fn test_column_set_lookup_during_layout() {
    let mut flow_thread = three_column_sets();
    flow_thread.begin_layout();
    assert!(!flow_thread.is_page_logical_height_known());
    assert!(!flow_thread.has_valid_column_set_info());

    // Column set ranges are those of the previous layout, and no height is
    // known yet. Lookup walks back from the set being laid out.
    flow_thread.set_last_set_worked_on(Some(2));
    assert_eq!(column_set_index_at(&flow_thread, 650, LATTER), Some(1));
    assert_eq!(column_set_index_at(&flow_thread, 850, LATTER), Some(2));
    assert_eq!(column_set_index_at(&flow_thread, 100, LATTER), Some(0));
}

#[test]
fn test_layout_lifecycle() {
    let mut flow_thread = Multicol::new(2, 100, 0).lay_out(&[ColumnSetSpec::new(0, 300, 0).with_rows(&[100, 50])]);
    assert!(flow_thread.is_page_logical_height_known());
    assert!(flow_thread.has_valid_column_set_info());
    assert_eq!(flow_thread.logical_height(), px(300));
    assert_eq!(flow_thread.physical_size().width, px(100));
    assert_eq!(flow_thread.physical_size().height, px(300));

    flow_thread.begin_layout();
    let column_set = flow_thread.column_set_mut(0).unwrap();
    assert_eq!(column_set.fragmentainer_group_count(), 1);
    assert!(!column_set.is_page_logical_height_known());

    flow_thread.set_column_block_size(0, 0, px(150));
    flow_thread.column_set_mut(0).unwrap().end_flow(px(300));
    flow_thread.finish_layout();
    assert_eq!(flow_thread.logical_height(), px(300));
    assert_eq!(flow_thread.first_column_set().unwrap().actual_column_count(), 2);
    assert_eq!(flow_thread.first_column_set().unwrap().logical_height(), px(150));
}

#[test]
fn test_extend_column_block_size() {
    let mut flow_thread = Multicol::new(2, 100, 0).lay_out(&[ColumnSetSpec::new(0, 300, 100)]);
    assert_eq!(flow_thread.first_column_set().unwrap().actual_column_count(), 3);

    flow_thread.extend_column_block_size(0, 0, px(150));
    flow_thread.finish_layout();
    let column_set = flow_thread.first_column_set().unwrap();
    assert_eq!(column_set.first_fragmentainer_group().logical_height(), px(150));
    assert_eq!(column_set.actual_column_count(), 2);
}

#[test]
fn test_structural_changes_invalidate() {
    let mut flow_thread = three_column_sets();
    assert!(flow_thread.has_valid_column_set_info());

    let removed = flow_thread.remove_column_set(1).unwrap();
    assert_eq!(removed.logical_top_in_flow_thread(), px(600));
    assert!(!flow_thread.has_valid_column_set_info());
    assert!(flow_thread.remove_column_set(5).is_none());

    flow_thread.insert_column_set(1, removed);
    flow_thread.append_column_set(ColumnSet::new(Au(0)));
    assert_eq!(flow_thread.column_set_count(), 4);
    flow_thread.remove_column_set(3);
    flow_thread.validate_column_sets();
    assert!(flow_thread.has_valid_column_set_info());
    assert_eq!(column_set_index_at(&flow_thread, 700, LATTER), Some(1));
}

#[test]
fn test_siblings() {
    let flow_thread = three_column_sets();
    let first = flow_thread.first_column_set().unwrap();
    assert!(first.previous_sibling().is_none());
    let second = first.next_sibling().unwrap();
    assert_eq!(second.index(), 1);
    assert_eq!(second.previous_sibling(), Some(first));
    let last = flow_thread.last_column_set().unwrap();
    assert_eq!(last.index(), 2);
    assert!(last.next_sibling().is_none());
    assert_eq!(flow_thread.column_sets().count(), 3);
}

#[test]
fn test_translation_multicol_with_text() {
    // columns: 2; column-gap: 20px; width: 400px; line-height: 50px; padding: 5px
    let flow_thread = Multicol::new(2, 190, 20)
        .at(5, 5)
        .lay_out(&[ColumnSetSpec::new(0, 100, 50).at(5, 5)]);

    let flow_thread_point = point(10, 70);
    let translation = flow_thread.flow_thread_translation_at_point(flow_thread_point);
    let visual_point = flow_thread_point + flow_thread.location().to_vector() + translation;
    assert_eq!(visual_point, point(225, 25));
    assert_eq!(flow_thread.column_offset(flow_thread_point), translation);

    let relative_to_flow_thread = visual_point - flow_thread.location().to_vector();
    assert_eq!(
        flow_thread.visual_point_to_flow_thread_point(relative_to_flow_thread),
        flow_thread_point
    );
}

#[test]
fn test_translation_multicol_with_block() {
    // columns: 3; column-gap: 0; width: 300px; height: 100px; padding: 15px
    let flow_thread = Multicol::new(3, 100, 0)
        .at(15, 15)
        .lay_out(&[ColumnSetSpec::new(0, 300, 100).at(15, 15)]);

    let flow_thread_point = point(10, 120);
    let translation = flow_thread.flow_thread_translation_at_point(flow_thread_point);
    assert_eq!(
        flow_thread_point + flow_thread.location().to_vector() + translation,
        point(125, 35)
    );
    assert_eq!(
        flow_thread.visual_point_to_flow_thread_point(point(110, 20)),
        flow_thread_point
    );
}

#[test]
fn test_translation_vertical_rl() {
    let flow_thread = Multicol::new(2, 100, 10)
        .writing_mode(WritingMode::vertical_rl())
        .lay_out(&[ColumnSetSpec::new(0, 100, 50)]);
    assert_eq!(flow_thread.physical_size().width, px(100));

    // Block offset 70 is 20px into the second column.
    let flow_thread_point = point(30, 10);
    let translation = flow_thread.flow_thread_translation_at_point(flow_thread_point);
    assert_eq!(translation, vector(0, 110));
    assert_eq!(
        flow_thread.visual_point_to_flow_thread_point(point(30, 120)),
        flow_thread_point
    );
}

#[test]
fn test_flipped_blocks_boundary_belongs_to_former_column() {
    let flow_thread = Multicol::new(2, 100, 10)
        .writing_mode(WritingMode::vertical_rl())
        .lay_out(&[ColumnSetSpec::new(0, 100, 50)]);
    // x = 50 is block offset 50, the boundary between the two columns. The
    // first column shows the right half of the flow thread.
    assert_eq!(flow_thread.flow_thread_translation_at_point(point(50, 0)), vector(-50, 0));
    assert_eq!(flow_thread.flow_thread_translation_at_offset(px(50), LATTER), vector(0, 110));
}

#[test]
fn test_visual_point_picks_column_set() {
    let flow_thread = Multicol::new(2, 100, 0).lay_out(&[
        ColumnSetSpec::new(0, 200, 100),
        ColumnSetSpec::new(200, 260, 30).at(0, 150),
    ]);
    // The second column of the first set.
    assert_eq!(flow_thread.visual_point_to_flow_thread_point(point(150, 20)), point(50, 120));
    // The first column of the second set.
    assert_eq!(flow_thread.visual_point_to_flow_thread_point(point(10, 160)), point(10, 210));
    // Below everything, in the last column of the last set.
    assert_eq!(flow_thread.visual_point_to_flow_thread_point(point(110, 500)), point(10, 580));
}

#[test]
fn test_fragments_bounding_box() {
    let flow_thread = Multicol::new(2, 190, 20)
        .at(5, 5)
        .lay_out(&[ColumnSetSpec::new(0, 100, 50).at(5, 5)]);
    assert_eq!(flow_thread.fragments_bounding_box(&rect(0, 30, 190, 40)), rect(0, 0, 400, 50));
    assert_eq!(flow_thread.fragments_bounding_box(&rect(20, 60, 50, 10)), rect(230, 10, 50, 10));
}

#[test]
fn test_fragments_bounding_box_across_column_sets() {
    let flow_thread = Multicol::new(2, 100, 0).lay_out(&[
        ColumnSetSpec::new(0, 200, 100),
        ColumnSetSpec::new(200, 260, 30).at(0, 150),
    ]);
    // From the second column of the first set into the first column of the second.
    let bounding_box = flow_thread.fragments_bounding_box(&rect(0, 150, 50, 70));
    assert_eq!(bounding_box, rect(0, 50, 150, 120));
}
