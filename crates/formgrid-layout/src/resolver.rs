//! Column width and row height resolution.
//!
//! Both axes run the same algorithm over a list of [`SizedItem`]s, one per
//! placed cell:
//!
//! 1. Caps: `MAX_TRACK_SIZE`, narrowed by per-cell maximums.
//! 2. Intrinsic sizes from single-span items (max of their preferred sizes).
//! 3. Multi-span relaxation: a spanning item whose tracks (plus the gaps it
//!    swallows) are too small pushes the shortfall onto its tracks, in
//!    proportion to their current size.
//! 4. Weights: average of `factor / span` over positive-weight items, then
//!    normalized. Tracks pinned by a single-span zero-weight item get none.
//! 5. Leftover space grows weighted tracks; a deficit shrinks them, never
//!    below zero. Zero-weight tracks keep their intrinsic size and may
//!    overflow the available space.
//!
//! Integer rounding remainders always go to the last eligible track, so a
//! grown axis fills the available space exactly. Pixel sums saturate; a
//! negative available size counts as zero.

use tracing::{debug, trace};

use crate::cell::{GridCell, Weight};
use crate::matrix::Placement;
use crate::{Rect, Size, MAX_TRACK_SIZE};

/// The axis being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Columns and widths.
    Horizontal,
    /// Rows and heights.
    Vertical,
}

/// One placed cell seen along a single axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizedItem {
    /// First track covered.
    pub start: usize,
    /// Number of tracks covered (at least 1).
    pub span: usize,
    /// Preferred extent in pixels, gaps inside the span included.
    pub pref: i32,
    pub weight: Weight,
    /// Upper bound for the tracks covered, gaps inside the span included.
    pub max: Option<i32>,
}

impl SizedItem {
    pub fn new(start: usize, span: usize, pref: i32) -> Self {
        Self {
            start,
            span: span.max(1),
            pref,
            weight: Weight::default(),
            max: None,
        }
    }

    pub fn weight(mut self, weight: impl Into<Weight>) -> Self {
        self.weight = weight.into();
        self
    }

    pub fn max(mut self, max: Option<i32>) -> Self {
        self.max = max;
        self
    }

    fn tracks(&self, count: usize) -> std::ops::Range<usize> {
        let start = self.start.min(count);
        start..self.start.saturating_add(self.span).min(count)
    }
}

/// Resolved tracks of one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSizes {
    pub axis: Axis,
    /// Final track sizes.
    pub sizes: Vec<i32>,
    /// Sizes before leftover space was distributed.
    pub intrinsic: Vec<i32>,
    /// Normalized weights; all zero when no track is weighted.
    pub weights: Vec<f64>,
    /// Leading edge of each track.
    pub positions: Vec<i32>,
    pub gap: i32,
}

impl TrackSizes {
    fn new(axis: Axis, sizes: Vec<i32>, intrinsic: Vec<i32>, weights: Vec<f64>, gap: i32) -> Self {
        let mut positions = Vec::with_capacity(sizes.len());
        let mut edge: i32 = 0;
        for size in &sizes {
            positions.push(edge);
            edge = edge.saturating_add(*size).saturating_add(gap);
        }
        Self {
            axis,
            sizes,
            intrinsic,
            weights,
            positions,
            gap,
        }
    }

    pub fn empty(axis: Axis, gap: i32) -> Self {
        Self::new(axis, Vec::new(), Vec::new(), Vec::new(), gap)
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Sum of final sizes plus the gaps between them.
    pub fn total(&self) -> i32 {
        Self::span_total(&self.sizes, self.gap)
    }

    /// Sum of intrinsic sizes plus the gaps between them.
    pub fn intrinsic_total(&self) -> i32 {
        Self::span_total(&self.intrinsic, self.gap)
    }

    fn span_total(sizes: &[i32], gap: i32) -> i32 {
        if sizes.is_empty() {
            return 0;
        }
        pixel_sum(sizes).saturating_add(gap_total(gap, sizes.len()))
    }

    /// Offset and length of `span` tracks starting at `start`, internal gaps included.
    pub fn extent(&self, start: usize, span: usize) -> (i32, i32) {
        if start >= self.len() {
            return (self.total(), 0);
        }
        let end = start.saturating_add(span.max(1)).min(self.len());
        let length = Self::span_total(&self.sizes[start..end], self.gap);
        (self.positions[start], length.max(0))
    }
}

/// Both axes plus the rectangles built from them.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedGrid {
    pub columns: TrackSizes,
    pub rows: TrackSizes,
    /// One rectangle per placement, same order.
    pub rects: Vec<Rect>,
}

/// Turns placed cells and their preferred sizes into track sizes and rectangles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridSizeResolver {
    h_gap: i32,
    v_gap: i32,
}

impl GridSizeResolver {
    pub fn new(h_gap: i32, v_gap: i32) -> Self {
        Self {
            h_gap: h_gap.max(0),
            v_gap: v_gap.max(0),
        }
    }

    pub fn gap(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.h_gap,
            Axis::Vertical => self.v_gap,
        }
    }

    /// Axis view of placed cells; `cells`, `placements` and `sizes` are index-aligned.
    pub fn items(axis: Axis, cells: &[GridCell], placements: &[Placement], sizes: &[Size]) -> Vec<SizedItem> {
        cells
            .iter()
            .zip(placements)
            .zip(sizes)
            .map(|((cell, placement), size)| match axis {
                Axis::Horizontal => SizedItem::new(placement.x, placement.span_x, size.width)
                    .weight(cell.weight_x)
                    .max(cell.max_width),
                Axis::Vertical => SizedItem::new(placement.y, placement.span_y, size.height)
                    .weight(cell.weight_y)
                    .max(cell.max_height),
            })
            .collect()
    }

    pub fn resolve_columns(&self, column_count: usize, items: &[SizedItem], available_width: i32) -> TrackSizes {
        self.resolve_axis(Axis::Horizontal, column_count, items, available_width)
    }

    pub fn resolve_rows(&self, row_count: usize, items: &[SizedItem], available_height: i32) -> TrackSizes {
        self.resolve_axis(Axis::Vertical, row_count, items, available_height)
    }

    pub fn resolve_axis(&self, axis: Axis, count: usize, items: &[SizedItem], available: i32) -> TrackSizes {
        let gap = self.gap(axis);
        if count == 0 {
            return TrackSizes::empty(axis, gap);
        }

        trace!(?axis, count, items = items.len(), available, "Resolving tracks");

        let available = available.max(0);
        let max = track_caps(items, count, gap);

        // Intrinsic sizes from single-span items
        let mut sizes = vec![0; count];
        let mut fixed = vec![false; count];
        let mut auto = vec![false; count];
        for item in items.iter().filter(|i| i.span == 1) {
            let Some(k) = item.tracks(count).next() else { continue };
            sizes[k] = sizes[k].max(item.pref.max(0));
            fixed[k] |= item.weight.is_fixed();
            auto[k] |= item.weight.is_auto();
        }
        for (size, cap) in sizes.iter_mut().zip(&max) {
            *size = (*size).min(*cap);
        }

        // Multi-span relaxation, narrow spans first
        let mut spanning: Vec<&SizedItem> = items.iter().filter(|i| i.span > 1).collect();
        spanning.sort_by_key(|i| i.span);
        for item in spanning {
            let tracks: Vec<usize> = item.tracks(count).collect();
            let current = tracks
                .iter()
                .fold(0i32, |sum, &k| sum.saturating_add(sizes[k]))
                .saturating_add(gap_total(gap, tracks.len()));
            let wanted = item.pref.min(item.max.unwrap_or(i32::MAX)).max(0);
            let shortfall = wanted - current;
            if shortfall <= 0 {
                continue;
            }

            let flexible: Vec<usize> = tracks.iter().copied().filter(|&k| !fixed[k]).collect();
            let targets = if flexible.is_empty() { tracks } else { flexible };
            distribute(&mut sizes, &max, &targets, shortfall, |k, sizes| sizes[k] as f64);
        }

        let weights = track_weights(items, count, &fixed);
        let intrinsic = sizes.clone();

        let space = available.saturating_sub(gap_total(gap, count)).max(0);
        let extra = space.saturating_sub(pixel_sum(&sizes));
        let weighted: Vec<usize> = (0..count).filter(|&k| weights[k] > 0.0).collect();

        if extra > 0 {
            if !weighted.is_empty() {
                distribute(&mut sizes, &max, &weighted, extra, |k, _| weights[k]);
            } else {
                // A lone track with content takes everything
                let mut content = vec![false; count];
                for item in items {
                    for k in item.tracks(count) {
                        content[k] = true;
                    }
                }
                let mut with_content = (0..count).filter(|&k| content[k]);
                if let (Some(k), None) = (with_content.next(), with_content.next()) {
                    if axis == Axis::Horizontal || auto[k] {
                        sizes[k] = sizes[k].saturating_add(extra).min(max[k]);
                    }
                }
            }
        } else if extra < 0 {
            shrink(&mut sizes, &weighted, extra.saturating_neg(), &weights);
        }

        debug!(?axis, ?sizes, extra, "Tracks resolved");
        TrackSizes::new(axis, sizes, intrinsic, weights, gap)
    }

    /// Pixel rectangle for every placement.
    ///
    /// `own_heights` is index-aligned with `placements`; a `Some` replaces the
    /// row-derived height.
    pub fn build_rects(
        &self,
        placements: &[Placement],
        columns: &TrackSizes,
        rows: &TrackSizes,
        own_heights: &[Option<i32>],
    ) -> Vec<Rect> {
        placements
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let (x, width) = columns.extent(p.x, p.span_x);
                let (y, row_height) = rows.extent(p.y, p.span_y);
                let height = own_heights.get(i).copied().flatten().unwrap_or(row_height);
                Rect::new(x, y, width.max(0), height.max(0))
            })
            .collect()
    }

    /// Single-pass resolution of both axes from one set of preferred sizes.
    pub fn resolve(
        &self,
        cells: &[GridCell],
        placements: &[Placement],
        sizes: &[Size],
        column_count: usize,
        row_count: usize,
        available: Size,
    ) -> ResolvedGrid {
        let columns = self.resolve_columns(
            column_count,
            &Self::items(Axis::Horizontal, cells, placements, sizes),
            available.width,
        );
        let rows = self.resolve_rows(
            row_count,
            &Self::items(Axis::Vertical, cells, placements, sizes),
            available.height,
        );
        let own_heights = own_heights(cells, sizes);
        let rects = self.build_rects(placements, &columns, &rows, &own_heights);
        ResolvedGrid { columns, rows, rects }
    }
}

pub(crate) fn own_heights(cells: &[GridCell], sizes: &[Size]) -> Vec<Option<i32>> {
    cells
        .iter()
        .zip(sizes)
        .map(|(cell, size)| cell.use_ui_height.then_some(size.height.max(0)))
        .collect()
}

fn pixel_sum(sizes: &[i32]) -> i32 {
    sizes.iter().fold(0, |sum, size| sum.saturating_add(*size))
}

/// Total of the gaps between `tracks` adjacent tracks.
fn gap_total(gap: i32, tracks: usize) -> i32 {
    let inner = i32::try_from(tracks.saturating_sub(1)).unwrap_or(i32::MAX);
    gap.saturating_mul(inner)
}

fn track_caps(items: &[SizedItem], count: usize, gap: i32) -> Vec<i32> {
    let mut max = vec![MAX_TRACK_SIZE; count];
    for item in items {
        let Some(cap) = item.max else { continue };
        let tracks: Vec<usize> = item.tracks(count).collect();
        if tracks.is_empty() {
            continue;
        }
        let inner = cap.saturating_sub(gap_total(gap, tracks.len())).max(0);
        let shares = proportional_shares(inner, &vec![1.0; tracks.len()]);
        for (k, share) in tracks.into_iter().zip(shares) {
            max[k] = max[k].min(share);
        }
    }
    max
}

fn track_weights(items: &[SizedItem], count: usize, fixed: &[bool]) -> Vec<f64> {
    let mut sum = vec![0.0; count];
    let mut contributors = vec![0usize; count];
    for item in items {
        let factor = item.weight.factor();
        if factor <= 0.0 {
            continue;
        }
        for k in item.tracks(count).filter(|&k| !fixed[k]) {
            sum[k] += factor / item.span as f64;
            contributors[k] += 1;
        }
    }

    let mut weights: Vec<f64> = sum
        .iter()
        .zip(&contributors)
        .map(|(s, n)| if *n > 0 { s / *n as f64 } else { 0.0 })
        .collect();
    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        for w in &mut weights {
            *w /= total;
        }
    }
    weights
}

/// Split `amount` by `basis`; equal split if the basis is all zero.
///
/// Shares are floored and the remainder goes to the last entry.
fn proportional_shares(amount: i32, basis: &[f64]) -> Vec<i32> {
    let total: f64 = basis.iter().sum();
    let n = basis.len();
    let mut shares = Vec::with_capacity(n);
    let mut given = 0;
    for (i, b) in basis.iter().enumerate() {
        let share = if i + 1 == n {
            amount - given
        } else if total > 0.0 {
            ((amount as f64 * b / total).floor() as i32).min(amount - given)
        } else {
            amount / n as i32
        };
        given += share;
        shares.push(share);
    }
    shares
}

/// Add `amount` across `tracks`, respecting caps. Returns what could not be placed.
fn distribute(
    sizes: &mut [i32],
    max: &[i32],
    tracks: &[usize],
    amount: i32,
    basis: impl Fn(usize, &[i32]) -> f64,
) -> i32 {
    let mut remaining = amount;
    let mut eligible: Vec<usize> = tracks.iter().copied().filter(|&k| sizes[k] < max[k]).collect();

    while remaining > 0 && !eligible.is_empty() {
        let current: Vec<f64> = eligible.iter().map(|&k| basis(k, &*sizes)).collect();
        let mut given = 0;
        for (&k, share) in eligible.iter().zip(proportional_shares(remaining, &current)) {
            let add = share.min(max[k] - sizes[k]).max(0);
            sizes[k] += add;
            given += add;
        }
        if given == 0 {
            break;
        }
        remaining -= given;
        eligible.retain(|&k| sizes[k] < max[k]);
    }
    remaining
}

/// Take `amount` from weighted tracks, never below zero.
fn shrink(sizes: &mut [i32], tracks: &[usize], amount: i32, weights: &[f64]) {
    let mut remaining = amount;
    let mut eligible: Vec<usize> = tracks.iter().copied().filter(|&k| sizes[k] > 0).collect();

    while remaining > 0 && !eligible.is_empty() {
        let basis: Vec<f64> = eligible.iter().map(|&k| weights[k]).collect();
        let mut taken = 0;
        for (&k, share) in eligible.iter().zip(proportional_shares(remaining, &basis)) {
            let take = share.min(sizes[k]).max(0);
            sizes[k] -= take;
            taken += take;
        }
        if taken == 0 {
            break;
        }
        remaining -= taken;
        eligible.retain(|&k| sizes[k] > 0);
    }
}
