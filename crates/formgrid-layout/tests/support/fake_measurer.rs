//! FakeMeasurer - stands in for the widget toolkit.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use formgrid_layout::{MeasureError, Measurer, Size, SizeHints, WidgetId};

#[derive(Debug, Clone, Copy)]
enum Content {
    Fixed(Size),
    /// Single line of `width` pixels that wraps at the width hint.
    Text { width: i32, line_height: i32 },
}

/// Table-driven measurer. Unknown widgets get the default size.
pub struct FakeMeasurer {
    default: Size,
    widgets: HashMap<WidgetId, Content>,
    failing: HashSet<WidgetId>,
    calls: Cell<usize>,
}

impl FakeMeasurer {
    /// Every widget measures 50x30 unless configured otherwise.
    pub fn new() -> Self {
        Self::with_default(50, 30)
    }

    pub fn with_default(width: i32, height: i32) -> Self {
        Self {
            default: Size::new(width, height),
            widgets: HashMap::new(),
            failing: HashSet::new(),
            calls: Cell::new(0),
        }
    }

    pub fn widget(mut self, id: u64, width: i32, height: i32) -> Self {
        self.widgets.insert(WidgetId(id), Content::Fixed(Size::new(width, height)));
        self
    }

    pub fn text(mut self, id: u64, width: i32, line_height: i32) -> Self {
        self.widgets.insert(WidgetId(id), Content::Text { width, line_height });
        self
    }

    /// Make a widget report itself as not attached.
    pub fn failing(mut self, id: u64) -> Self {
        self.failing.insert(WidgetId(id));
        self
    }

    /// Number of measurement calls so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Default for FakeMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl Measurer for FakeMeasurer {
    fn preferred_size(&self, widget: WidgetId, hints: SizeHints) -> Result<Size, MeasureError> {
        self.calls.set(self.calls.get() + 1);

        if self.failing.contains(&widget) {
            return Err(MeasureError::NotAttached(widget));
        }

        match self.widgets.get(&widget).copied() {
            None => Ok(self.default),
            Some(Content::Fixed(size)) => Ok(size),
            Some(Content::Text { width, line_height }) => {
                let lines = match hints.width_hint {
                    Some(available) if available > 0 && available < width => (width + available - 1) / available,
                    _ => 1,
                };
                Ok(Size::new(width, lines * line_height))
            }
        }
    }
}
