//! Placement requests.
//!
//! A [`GridCell`] is the narrow view of a widget that the engine works with:
//! identity, requested origin and span, weights and optional fixed sizes.
//! Cells are rebuilt from the widget set on every pass.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::MAX_GRID_TRACKS;

/// Opaque identity of the widget owning a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(pub u64);

impl WidgetId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for WidgetId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Traversal order used for automatic placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Row-major: fill a row left to right, then move down.
    #[default]
    Horizontal,
    /// Column-major: fill a column top to bottom, then move right.
    Vertical,
}

impl Orientation {
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Orientation::Horizontal)
    }
}

/// Share of leftover space a cell asks for along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weight {
    /// Grow only when this cell's track is the only one with content.
    Auto,
    /// Proportional factor. `0` means "keep the preferred size".
    Factor(f64),
}

impl Weight {
    /// The numeric factor; `Auto` and negative or non-finite factors count as zero.
    pub fn factor(&self) -> f64 {
        match self {
            Weight::Auto => 0.0,
            Weight::Factor(f) if f.is_finite() && *f > 0.0 => *f,
            Weight::Factor(_) => 0.0,
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Weight::Auto)
    }

    /// A fixed weight pins its track to the preferred size.
    pub fn is_fixed(&self) -> bool {
        !self.is_auto() && self.factor() == 0.0
    }
}

impl Default for Weight {
    fn default() -> Self {
        Weight::Factor(0.0)
    }
}

impl From<f64> for Weight {
    fn from(factor: f64) -> Self {
        Weight::Factor(factor)
    }
}

fn default_span() -> usize {
    1
}

/// One widget's placement request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// Owning widget.
    pub widget: WidgetId,
    /// Explicit column; `None` means next free slot.
    #[serde(default)]
    pub origin_x: Option<usize>,
    /// Explicit row; `None` means next free slot.
    #[serde(default)]
    pub origin_y: Option<usize>,
    /// Columns occupied (at least 1).
    #[serde(default = "default_span")]
    pub span_x: usize,
    /// Rows occupied (at least 1).
    #[serde(default = "default_span")]
    pub span_y: usize,
    #[serde(default)]
    pub weight_x: Weight,
    #[serde(default)]
    pub weight_y: Weight,
    /// Fixed preferred width, bypassing measurement.
    #[serde(default)]
    pub width_hint: Option<i32>,
    /// Fixed preferred height, bypassing measurement.
    #[serde(default)]
    pub height_hint: Option<i32>,
    /// Upper bound for the width the cell's columns may reach.
    #[serde(default)]
    pub max_width: Option<i32>,
    /// Upper bound for the height the cell's rows may reach.
    #[serde(default)]
    pub max_height: Option<i32>,
    /// Keep the cell's own measured height instead of the row height. The row
    /// still grows to fit it.
    #[serde(default)]
    pub use_ui_height: bool,
}

impl GridCell {
    /// A 1x1 auto-placed cell with zero weights.
    pub fn new(widget: u64) -> Self {
        Self::for_widget(WidgetId(widget))
    }

    /// Same as [`GridCell::new`] for an existing id.
    pub fn for_widget(widget: WidgetId) -> Self {
        Self {
            widget,
            origin_x: None,
            origin_y: None,
            span_x: 1,
            span_y: 1,
            weight_x: Weight::default(),
            weight_y: Weight::default(),
            width_hint: None,
            height_hint: None,
            max_width: None,
            max_height: None,
            use_ui_height: false,
        }
    }

    /// Pin the cell to an explicit column and row.
    pub fn at(mut self, x: usize, y: usize) -> Self {
        self.origin_x = Some(x);
        self.origin_y = Some(y);
        self
    }

    /// Pin the column only; the row is searched.
    pub fn at_column(mut self, x: usize) -> Self {
        self.origin_x = Some(x);
        self
    }

    /// Pin the row only; the column is searched.
    pub fn at_row(mut self, y: usize) -> Self {
        self.origin_y = Some(y);
        self
    }

    pub fn span(mut self, span_x: usize, span_y: usize) -> Self {
        self.span_x = span_x;
        self.span_y = span_y;
        self
    }

    pub fn weight(mut self, weight_x: impl Into<Weight>, weight_y: impl Into<Weight>) -> Self {
        self.weight_x = weight_x.into();
        self.weight_y = weight_y.into();
        self
    }

    pub fn weight_x(mut self, weight: impl Into<Weight>) -> Self {
        self.weight_x = weight.into();
        self
    }

    pub fn weight_y(mut self, weight: impl Into<Weight>) -> Self {
        self.weight_y = weight.into();
        self
    }

    pub fn width_hint(mut self, px: i32) -> Self {
        self.width_hint = Some(px);
        self
    }

    pub fn height_hint(mut self, px: i32) -> Self {
        self.height_hint = Some(px);
        self
    }

    pub fn max_width(mut self, px: i32) -> Self {
        self.max_width = Some(px);
        self
    }

    pub fn max_height(mut self, px: i32) -> Self {
        self.max_height = Some(px);
        self
    }

    pub fn use_ui_height(mut self, enabled: bool) -> Self {
        self.use_ui_height = enabled;
        self
    }

    /// Column span, between 1 and [`MAX_GRID_TRACKS`].
    pub fn effective_span_x(&self) -> usize {
        self.span_x.clamp(1, MAX_GRID_TRACKS)
    }

    /// Row span, between 1 and [`MAX_GRID_TRACKS`].
    pub fn effective_span_y(&self) -> usize {
        self.span_y.clamp(1, MAX_GRID_TRACKS)
    }

    /// Both origins given.
    pub fn is_fully_placed(&self) -> bool {
        self.origin_x.is_some() && self.origin_y.is_some()
    }

    /// Exactly one origin given.
    pub fn is_partially_placed(&self) -> bool {
        self.origin_x.is_some() != self.origin_y.is_some()
    }

    /// Neither origin given.
    pub fn needs_auto_placement(&self) -> bool {
        self.origin_x.is_none() && self.origin_y.is_none()
    }

    /// Both hints set, so measurement can be skipped entirely.
    pub(crate) fn fully_hinted(&self) -> bool {
        self.width_hint.is_some() && self.height_hint.is_some()
    }
}
