//! Measurement integration tests
//!
//! These tests verify that the engine:
//! - Re-measures heights with the resolved column width
//! - Survives widgets that cannot be measured
//! - Produces identical results on repeated passes, cached or not

use formgrid_layout::{CachingMeasurer, GridCell, LogicalGridLayout, Rect};

use crate::support::{assert_rect, FakeMeasurer};

#[test]
fn test_wrapping_text_gets_height_for_column_width() {
    let cells = vec![
        GridCell::new(1).at(0, 0).width_hint(100),
        GridCell::new(2).at(1, 0).max_width(100).weight_x(1.0),
    ];
    // 300px of text at 100px wraps onto three 20px lines
    let measurer = FakeMeasurer::new().text(2, 300, 20);
    let result = LogicalGridLayout::default()
        .columns(2)
        .rows(1)
        .gaps(5, 5)
        .layout(&cells, 400, 400, &measurer);

    assert_eq!(result.column_widths(), &[100, 100]);
    assert_eq!(result.row_heights(), &[60]);
    assert_rect(&result, 2, Rect::new(105, 0, 100, 60));
}

#[test]
fn test_wide_column_keeps_single_line() {
    let cells = vec![GridCell::new(1).weight_x(1.0)];
    let measurer = FakeMeasurer::new().text(1, 300, 20);
    let result = LogicalGridLayout::default().layout(&cells, 400, 400, &measurer);

    assert_eq!(result.row_heights(), &[20]);
}

#[test]
fn test_unmeasurable_widget_is_zero_sized() {
    let cells = vec![GridCell::new(1), GridCell::new(2), GridCell::new(3)];
    let measurer = FakeMeasurer::new().failing(2);
    let result = LogicalGridLayout::default()
        .columns(3)
        .layout(&cells, 500, 400, &measurer);

    assert_eq!(result.column_widths(), &[50, 0, 50]);
    assert_rect(&result, 2, Rect::new(50, 0, 0, 30));
    assert_rect(&result, 3, Rect::new(50, 0, 50, 30));
}

#[test]
fn test_measurer_called_at_most_twice_per_widget() {
    let cells: Vec<GridCell> = (1..=6).map(|id| GridCell::new(id).weight_x(1.0)).collect();
    let measurer = FakeMeasurer::new();
    LogicalGridLayout::default()
        .columns(3)
        .layout(&cells, 500, 400, &measurer);

    assert!(measurer.calls() <= 2 * cells.len());
}

#[test]
fn test_hinted_widgets_are_not_measured() {
    let cells = vec![GridCell::new(1).width_hint(40).height_hint(20)];
    let measurer = FakeMeasurer::new();
    LogicalGridLayout::default().layout(&cells, 500, 400, &measurer);

    assert_eq!(measurer.calls(), 0);
}

#[test]
fn test_repeated_layout_is_identical() {
    let cells = vec![
        GridCell::new(1).span(2, 1).weight_x(1.0),
        GridCell::new(2).weight(0.5, 1.0),
        GridCell::new(3).at_column(1).weight_x(2.0),
        GridCell::new(4).use_ui_height(true),
    ];
    let measurer = FakeMeasurer::new().text(1, 260, 18).widget(4, 30, 70);
    let layout = LogicalGridLayout::default().columns(2).gaps(6, 4);

    let first = layout.layout(&cells, 377, 251, &measurer);
    let second = layout.layout(&cells, 377, 251, &measurer);

    assert_eq!(first, second);
}

#[test]
fn test_cached_measurer_gives_same_result() {
    let cells = vec![
        GridCell::new(1).weight_x(1.0),
        GridCell::new(2).weight_x(1.0),
        GridCell::new(3).span(2, 1),
    ];
    let plain = FakeMeasurer::new().text(3, 400, 20);
    let cached = CachingMeasurer::new(FakeMeasurer::new().text(3, 400, 20));
    let layout = LogicalGridLayout::default().columns(2).gaps(5, 5);

    let expected = layout.layout(&cells, 305, 300, &plain);
    cached.use_epoch(1);
    let first = layout.layout(&cells, 305, 300, &cached);
    let second = layout.layout(&cells, 305, 300, &cached);

    assert_eq!(first, expected);
    assert_eq!(second, expected);

    let stats = cached.stats();
    assert_eq!(stats.hits, stats.lookups / 2);
    assert_eq!(cached.inner().calls(), stats.stores);
}

#[test]
fn test_cache_epoch_forces_remeasure() {
    let cells = vec![GridCell::new(1)];
    let cached = CachingMeasurer::new(FakeMeasurer::new());
    let layout = LogicalGridLayout::default();

    cached.use_epoch(1);
    layout.layout(&cells, 100, 100, &cached);
    let after_first = cached.inner().calls();

    cached.use_epoch(2);
    layout.layout(&cells, 100, 100, &cached);

    assert_eq!(cached.inner().calls(), after_first * 2);
}
