//! Sizing integration tests
//!
//! These tests verify that the engine:
//! - Keeps zero-weight tracks at their preferred size
//! - Hands leftover space to weighted tracks, exactly
//! - Merges spanned tracks and their gaps into one rectangle
//! - Honours width hints, maximum widths and own-height cells

use formgrid_layout::{GridCell, LogicalGridLayout, Rect, Size, Weight, WidgetId};

use crate::support::{assert_rect, FakeMeasurer};

fn two_columns() -> LogicalGridLayout {
    LogicalGridLayout::default().columns(2).rows(1).gaps(5, 5)
}

#[test]
fn test_fixed_column_and_weighted_column() {
    let cells = vec![
        GridCell::new(1).at(0, 0),
        GridCell::new(2).at(1, 0).weight_x(1.0),
    ];
    let result = two_columns().layout(&cells, 500, 400, &FakeMeasurer::new());

    assert_rect(&result, 1, Rect::new(0, 0, 50, 30));
    assert_rect(&result, 2, Rect::new(55, 0, 445, 30));
}

#[test]
fn test_width_hint_overrides_measurement() {
    let cells = vec![
        GridCell::new(1).at(0, 0).width_hint(70),
        GridCell::new(2).at(1, 0).weight_x(1.0),
    ];
    let measurer = FakeMeasurer::with_default(40, 23);

    // Row height stays at the content height whatever the available height
    for available_height in [23, 100, 400] {
        let result = two_columns().layout(&cells, 500, available_height, &measurer);
        assert_rect(&result, 1, Rect::new(0, 0, 70, 23));
        assert_rect(&result, 2, Rect::new(75, 0, 425, 23));
    }
}

#[test]
fn test_single_content_column_absorbs_extra_width() {
    let cells = vec![GridCell::new(1).at(0, 0)];
    let result = two_columns().layout(&cells, 300, 100, &FakeMeasurer::new());

    assert_eq!(result.column_widths(), &[295, 0]);
    assert_rect(&result, 1, Rect::new(0, 0, 295, 30));
}

#[test]
fn test_zero_weight_columns_leave_trailing_space() {
    let cells = vec![GridCell::new(1), GridCell::new(2)];
    let result = two_columns().layout(&cells, 300, 100, &FakeMeasurer::new());

    assert_eq!(result.column_widths(), &[50, 50]);
    assert_eq!(result.used_size(), Size::new(105, 30));
}

#[test]
fn test_span_merges_internal_gap() {
    let cells = vec![
        GridCell::new(1).at(0, 0).width_hint(70),
        GridCell::new(2).at(1, 0).weight_x(1.0),
        GridCell::new(3).at(0, 1).span(2, 1),
    ];
    let result = LogicalGridLayout::default()
        .columns(2)
        .rows(2)
        .gaps(5, 5)
        .layout(&cells, 500, 400, &FakeMeasurer::new());

    assert_eq!(result.column_widths(), &[70, 425]);
    assert_rect(&result, 3, Rect::new(0, 35, 500, 30));
}

#[test]
fn test_weighted_columns_fill_available_width_exactly() {
    let cells = vec![
        GridCell::new(1).weight_x(1.0),
        GridCell::new(2).weight_x(2.0),
        GridCell::new(3).weight_x(3.0),
    ];
    let measurer = FakeMeasurer::with_default(10, 10);
    let result = LogicalGridLayout::default()
        .columns(3)
        .gaps(5, 0)
        .layout(&cells, 613, 100, &measurer);

    let widths = result.column_widths();
    assert_eq!(widths.iter().sum::<i32>() + 10, 613);
    assert!(widths[0] < widths[1] && widths[1] < widths[2]);
}

#[test]
fn test_zero_weight_columns_overflow() {
    let cells = vec![GridCell::new(1), GridCell::new(2)];
    let measurer = FakeMeasurer::with_default(200, 20);
    let result = two_columns().layout(&cells, 300, 100, &measurer);

    assert_eq!(result.column_widths(), &[200, 200]);
    assert!(result.used_size().width > 300);
}

#[test]
fn test_only_weighted_columns_shrink() {
    let cells = vec![GridCell::new(1), GridCell::new(2).weight_x(1.0)];
    let measurer = FakeMeasurer::with_default(200, 20);
    let result = two_columns().layout(&cells, 305, 100, &measurer);

    assert_eq!(result.column_widths(), &[200, 100]);
}

#[test]
fn test_negative_available_width_clamps_to_zero() {
    let cells = vec![GridCell::new(1).weight_x(1.0)];
    let result = LogicalGridLayout::default().layout(&cells, -50, -10, &FakeMeasurer::new());

    assert_eq!(result.column_widths(), &[0]);
    let rect = result.rect_for(formgrid_layout::WidgetId(1)).unwrap();
    assert_eq!(rect.width, 0);
    assert_eq!(rect.height, 30);
}

#[test]
fn test_max_width_caps_weighted_column() {
    let cells = vec![
        GridCell::new(1).at(0, 0).weight_x(1.0).max_width(80),
        GridCell::new(2).at(1, 0).weight_x(1.0),
    ];
    let result = two_columns().layout(&cells, 500, 400, &FakeMeasurer::new());

    assert_rect(&result, 1, Rect::new(0, 0, 80, 30));
    assert_rect(&result, 2, Rect::new(85, 0, 415, 30));
}

#[test]
fn test_max_width_caps_preferred_width() {
    let cells = vec![GridCell::new(1).at(0, 0).weight_x(1.0).max_width(80).width_hint(100)];
    let result = LogicalGridLayout::default().layout(&cells, 500, 400, &FakeMeasurer::new());

    assert_rect(&result, 1, Rect::new(0, 0, 80, 30));
}

#[test]
fn test_max_width_split_over_spanned_columns() {
    let cells = vec![GridCell::new(1).at(0, 0).span(2, 1).weight_x(1.0).max_width(80)];
    let result = two_columns().layout(&cells, 500, 400, &FakeMeasurer::new());

    assert_eq!(result.column_widths(), &[37, 38]);
    assert_rect(&result, 1, Rect::new(0, 0, 80, 30));
}

#[test]
fn test_row_weights() {
    let cells = vec![
        GridCell::new(1).weight_y(1.0),
        GridCell::new(2).weight_y(3.0),
    ];
    let result = LogicalGridLayout::default()
        .columns(1)
        .layout(&cells, 200, 400, &FakeMeasurer::new());

    assert_eq!(result.row_heights(), &[115, 285]);
    assert_rect(&result, 2, Rect::new(0, 115, 200, 285));
}

#[test]
fn test_auto_row_weight_absorbs_height() {
    let cells = vec![GridCell::new(1).weight_y(Weight::Auto)];
    let result = LogicalGridLayout::default().layout(&cells, 200, 400, &FakeMeasurer::new());

    assert_eq!(result.row_heights(), &[400]);
}

#[test]
fn test_taller_use_ui_height_cell_stretches_row() {
    let cells = vec![
        GridCell::new(1).at(0, 0),
        GridCell::new(2).at(1, 0).use_ui_height(true),
        GridCell::new(3).at(1, 1),
    ];
    let measurer = FakeMeasurer::new().widget(2, 50, 120);
    let result = two_columns().layout(&cells, 500, 400, &measurer);

    assert_eq!(result.row_heights(), &[120, 30]);
    assert_rect(&result, 1, Rect::new(0, 0, 50, 120));
    assert_rect(&result, 2, Rect::new(55, 0, 50, 120));
    assert_rect(&result, 3, Rect::new(55, 125, 50, 30));
    let (b, c) = (result.rect_for(WidgetId(2)), result.rect_for(WidgetId(3)));
    assert!(!b.unwrap().intersects(&c.unwrap()));
}

#[test]
fn test_shorter_use_ui_height_cell_keeps_own_height() {
    let cells = vec![
        GridCell::new(1).at(0, 0),
        GridCell::new(2).at(1, 0).use_ui_height(true),
    ];
    let measurer = FakeMeasurer::new().widget(1, 50, 80).widget(2, 50, 40);
    let result = two_columns().layout(&cells, 500, 400, &measurer);

    assert_eq!(result.row_heights(), &[80]);
    assert_rect(&result, 1, Rect::new(0, 0, 50, 80));
    assert_rect(&result, 2, Rect::new(55, 0, 50, 40));
}

#[test]
fn test_negative_available_size_does_not_panic() {
    let cells = vec![GridCell::new(1), GridCell::new(2).weight_x(1.0)];
    let result = two_columns().layout(&cells, i32::MIN, i32::MIN, &FakeMeasurer::new());

    assert_eq!(result.column_widths(), &[50, 0]);
    assert_eq!(result.row_heights(), &[30]);
    assert_rect(&result, 2, Rect::new(55, 0, 0, 30));
}

#[test]
fn test_huge_gaps_saturate() {
    let cells = vec![GridCell::new(1), GridCell::new(2), GridCell::new(3)];
    let result = LogicalGridLayout::default()
        .columns(2)
        .gaps(i32::MAX, i32::MAX)
        .layout(&cells, i32::MIN, i32::MAX, &FakeMeasurer::new());

    assert_eq!(result.column_widths(), &[50, 50]);
    assert_eq!(result.row_heights(), &[30, 30]);
    assert_eq!(result.used_size(), Size::new(i32::MAX, i32::MAX));
    assert_rect(&result, 3, Rect::new(0, i32::MAX, 50, 30));
}

#[test]
fn test_use_ui_height_alone_sizes_its_row() {
    let cells = vec![GridCell::new(1).use_ui_height(true), GridCell::new(2)];
    let measurer = FakeMeasurer::new().widget(1, 50, 90);
    let result = LogicalGridLayout::default()
        .columns(1)
        .gaps(0, 5)
        .layout(&cells, 200, 400, &measurer);

    assert_eq!(result.row_heights(), &[90, 30]);
    assert_rect(&result, 2, Rect::new(0, 95, 200, 30));
}

#[test]
fn test_cell_bounds_and_grid_sizes() {
    let cells = vec![
        GridCell::new(1).at(0, 0),
        GridCell::new(2).at(1, 0).weight_x(1.0),
    ];
    let result = two_columns().layout(&cells, 500, 400, &FakeMeasurer::new());

    assert_eq!(
        result.cell_bounds(),
        vec![vec![Rect::new(0, 0, 50, 30), Rect::new(55, 0, 445, 30)]]
    );
    assert_eq!(result.preferred_size(), Size::new(105, 30));
    assert_eq!(result.used_size(), Size::new(500, 30));
}
