//! Formgrid Smoke Harness
//!
//! Loads a layout scenario (cells, grid parameters and fake widget sizes),
//! runs it through the engine twice behind a caching measurer and prints a
//! JSON verdict. Exits non-zero when an expectation fails or the two passes
//! disagree.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use formgrid_layout::{
    CachingMeasurer, CellBoundsOverlay, GridCell, LayoutParams, LayoutResult, LogicalGridLayout, MeasureError,
    Measurer, PlacementConflict, Rect, Size, SizeHints, WidgetId,
};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
enum SmokeError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
}

/// Parse command line arguments
struct Args {
    scenario: Option<PathBuf>,
    width: Option<i32>,
    height: Option<i32>,
    overlay: bool,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut scenario = None;
        let mut width = None;
        let mut height = None;
        let mut overlay = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--scenario" => {
                    scenario = args.next().map(PathBuf::from);
                }
                "--width" => {
                    width = args.next().and_then(|val| val.parse().ok());
                }
                "--height" => {
                    height = args.next().and_then(|val| val.parse().ok());
                }
                "--overlay" => {
                    overlay = true;
                }
                _ => {}
            }
        }

        Self {
            scenario,
            width,
            height,
            overlay,
        }
    }

    /// Scenario JSON from file or the built-in form.
    fn load_scenario(&self) -> Result<Scenario, SmokeError> {
        let text = match &self.scenario {
            Some(path) => std::fs::read_to_string(path)?,
            None => DEFAULT_SCENARIO.to_string(),
        };
        let mut scenario: Scenario = serde_json::from_str(&text)?;
        if let Some(width) = self.width {
            scenario.available.width = width;
        }
        if let Some(height) = self.height {
            scenario.available.height = height;
        }
        scenario.validate()?;
        Ok(scenario)
    }
}

const DEFAULT_SCENARIO: &str = r#"{
  "params": { "column_count": 2, "h_gap": 5, "v_gap": 5 },
  "available": { "width": 500, "height": 400 },
  "cells": [
    { "widget": 1, "origin_x": 0, "origin_y": 0, "width_hint": 70 },
    { "widget": 2, "origin_x": 1, "origin_y": 0, "weight_x": { "factor": 1.0 } },
    { "widget": 3 },
    { "widget": 4, "weight_x": { "factor": 1.0 } }
  ],
  "widgets": [
    { "id": 1, "width": 40, "height": 23 },
    { "id": 2, "width": 120, "height": 23 },
    { "id": 3, "width": 60, "height": 23 },
    { "id": 4, "width": 260, "height": 23 }
  ],
  "expect": [
    { "widget": 1, "rect": { "x": 0, "y": 0, "width": 70, "height": 23 } },
    { "widget": 2, "rect": { "x": 75, "y": 0, "width": 425, "height": 23 } }
  ]
}"#;

#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default)]
    params: LayoutParams,
    #[serde(default = "default_available")]
    available: Size,
    cells: Vec<GridCell>,
    #[serde(default)]
    widgets: Vec<WidgetSpec>,
    #[serde(default)]
    expect: Vec<Expectation>,
}

fn default_available() -> Size {
    Size::new(500, 400)
}

impl Scenario {
    fn validate(&self) -> Result<(), SmokeError> {
        let mut seen = HashSet::new();
        for cell in &self.cells {
            if !seen.insert(cell.widget) {
                return Err(SmokeError::InvalidScenario(format!(
                    "widget {} appears in more than one cell",
                    cell.widget
                )));
            }
        }
        for expectation in &self.expect {
            if !seen.contains(&expectation.widget) {
                return Err(SmokeError::InvalidScenario(format!(
                    "expectation for unknown widget {}",
                    expectation.widget
                )));
            }
        }
        Ok(())
    }
}

/// Fake widget size.
#[derive(Debug, Clone, Deserialize)]
struct WidgetSpec {
    id: WidgetId,
    width: i32,
    height: i32,
    /// Text-like content: `height` is one line, lines wrap at the width hint.
    #[serde(default)]
    wrap: bool,
    /// Report the widget as not attached.
    #[serde(default)]
    detached: bool,
}

#[derive(Debug, Deserialize)]
struct Expectation {
    widget: WidgetId,
    rect: Rect,
}

/// Measures from the scenario's widget table; unknown widgets are 50x30.
struct ScenarioMeasurer {
    widgets: HashMap<WidgetId, WidgetSpec>,
}

impl ScenarioMeasurer {
    fn new(specs: &[WidgetSpec]) -> Self {
        Self {
            widgets: specs.iter().map(|spec| (spec.id, spec.clone())).collect(),
        }
    }
}

impl Measurer for ScenarioMeasurer {
    fn preferred_size(&self, widget: WidgetId, hints: SizeHints) -> Result<Size, MeasureError> {
        let Some(spec) = self.widgets.get(&widget) else {
            return Ok(Size::new(50, 30));
        };
        if spec.detached {
            return Err(MeasureError::NotAttached(widget));
        }

        let lines = match hints.width_hint {
            Some(available) if spec.wrap && available > 0 && available < spec.width => {
                spec.width.saturating_add(available - 1) / available
            }
            _ => 1,
        };
        Ok(Size::new(spec.width, spec.height.saturating_mul(lines)))
    }
}

fn describe_conflict(conflict: &PlacementConflict) -> Value {
    match conflict {
        PlacementConflict::Overlap {
            widget,
            requested,
            relocated_to,
        } => json!({
            "kind": "overlap",
            "widget": widget,
            "requested": [requested.x, requested.y],
            "relocated_to": [relocated_to.x, relocated_to.y]
        }),
        PlacementConflict::OriginOutOfRange {
            widget,
            requested,
            relocated_to,
        } => json!({
            "kind": "origin_out_of_range",
            "widget": widget,
            "requested": [requested.x, requested.y],
            "relocated_to": [relocated_to.x, relocated_to.y]
        }),
        PlacementConflict::SpanExceedsGrid { widget, span, limit } => json!({
            "kind": "span_exceeds_grid",
            "widget": widget,
            "span": span,
            "limit": limit
        }),
    }
}

fn check_expectations(result: &LayoutResult, expect: &[Expectation]) -> Vec<Value> {
    expect
        .iter()
        .filter_map(|expectation| {
            let actual = result.rect_for(expectation.widget);
            if actual == Some(expectation.rect) {
                return None;
            }
            warn!(widget = %expectation.widget, ?actual, expected = ?expectation.rect, "Rectangle mismatch");
            Some(json!({
                "widget": expectation.widget,
                "expected": expectation.rect,
                "actual": actual
            }))
        })
        .collect()
}

fn run(args: &Args) -> Result<Value, SmokeError> {
    let scenario = args.load_scenario()?;
    let start = Instant::now();

    let layout = LogicalGridLayout::new(scenario.params);
    let measurer = CachingMeasurer::new(ScenarioMeasurer::new(&scenario.widgets));
    measurer.use_epoch(1);

    let (width, height) = (scenario.available.width, scenario.available.height);
    let first = layout.layout(&scenario.cells, width, height, &measurer);
    let second = layout.layout(&scenario.cells, width, height, &measurer);
    let stable = first == second;

    debug!(matrix = %first.matrix_debug_string(), "Occupancy after placement");
    if args.overlay {
        println!("{}", CellBoundsOverlay::from_result(&first));
    }

    let mismatches = check_expectations(&first, &scenario.expect);
    let stats = measurer.stats();
    let status = if stable && mismatches.is_empty() { "pass" } else { "fail" };

    Ok(json!({
        "status": status,
        "elapsed_us": start.elapsed().as_micros() as u64,
        "stable": stable,
        "grid": {
            "columns": first.column_count(),
            "rows": first.row_count(),
            "column_widths": first.column_widths(),
            "row_heights": first.row_heights(),
            "preferred_size": first.preferred_size(),
            "used_size": first.used_size()
        },
        "rects": first.rects,
        "conflicts": first.conflicts.iter().map(describe_conflict).collect::<Vec<_>>(),
        "mismatches": mismatches,
        "cache": {
            "lookups": stats.lookups,
            "hits": stats.hits,
            "stores": stats.stores
        }
    }))
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!(
        scenario = ?args.scenario,
        width = ?args.width,
        height = ?args.height,
        "Starting formgrid smoke harness"
    );

    match run(&args) {
        Ok(result) => {
            println!("{}", result);
            if result["status"] == "pass" {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!(%e, "Smoke run failed");
            let result = json!({
                "status": "fail",
                "reason": e.to_string()
            });
            println!("{}", result);
            ExitCode::FAILURE
        }
    }
}
