//! Preferred-size seam between the engine and the widget toolkit.

use thiserror::Error;

use crate::cell::WidgetId;
use crate::Size;

/// Constraints passed to a measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SizeHints {
    /// Width the widget will get; lets wrapping content report its height.
    pub width_hint: Option<i32>,
    pub height_hint: Option<i32>,
}

impl SizeHints {
    /// Unconstrained measurement.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_width(width: i32) -> Self {
        Self {
            width_hint: Some(width),
            height_hint: None,
        }
    }
}

/// Measurement errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeasureError {
    #[error("widget {0} is not attached")]
    NotAttached(WidgetId),

    #[error("widget {widget} cannot be measured: {reason}")]
    Unmeasurable { widget: WidgetId, reason: String },
}

/// Reports a widget's preferred size under the given hints.
pub trait Measurer {
    fn preferred_size(&self, widget: WidgetId, hints: SizeHints) -> Result<Size, MeasureError>;
}

impl<F> Measurer for F
where
    F: Fn(WidgetId, SizeHints) -> Result<Size, MeasureError>,
{
    fn preferred_size(&self, widget: WidgetId, hints: SizeHints) -> Result<Size, MeasureError> {
        self(widget, hints)
    }
}
