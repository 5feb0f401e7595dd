//! Preferred-size memoization.
//!
//! Measuring a widget can be expensive (text shaping, nested layouts), and a
//! container laid out repeatedly with unchanged content asks the same questions
//! every pass. [`CachingMeasurer`] wraps any [`Measurer`] and remembers answers
//! per `(widget, hints)` pair.
//!
//! # Invalidation
//!
//! Entries are tagged with an epoch. Bumping the epoch with
//! [`CachingMeasurer::use_epoch`] drops everything at once; a single widget can
//! be dropped with [`CachingMeasurer::invalidate`]. Failed measurements are
//! never stored, so a widget that becomes attached later is measured again.
//!
//! ```ignore
//! let measurer = CachingMeasurer::new(toolkit);
//! measurer.use_epoch(frame);
//! let result = layout.layout(&cells, width, height, &measurer);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use tracing::trace;

use crate::cell::WidgetId;
use crate::measure::{MeasureError, Measurer, SizeHints};
use crate::Size;

type CacheKey = (WidgetId, SizeHints);

/// (epoch, value)
type CacheEntry = (usize, Size);

/// Counters for profiling cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub lookups: usize,
    pub hits: usize,
    pub stores: usize,
}

impl CacheStats {
    pub fn misses(&self) -> usize {
        self.lookups - self.hits
    }
}

/// A [`Measurer`] that remembers results of the wrapped one.
pub struct CachingMeasurer<M> {
    inner: M,
    epoch: Cell<usize>,
    entries: RefCell<HashMap<CacheKey, CacheEntry>>,
    stats: Cell<CacheStats>,
}

impl<M: Measurer> CachingMeasurer<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            epoch: Cell::new(1),
            entries: RefCell::new(HashMap::new()),
            stats: Cell::new(CacheStats::default()),
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }

    /// Switch to `epoch`. Entries from any other epoch are dropped.
    pub fn use_epoch(&self, epoch: usize) {
        let epoch = epoch.max(1);
        if self.epoch.get() != epoch {
            self.entries.borrow_mut().clear();
            self.epoch.set(epoch);
        }
    }

    pub fn current_epoch(&self) -> usize {
        self.epoch.get()
    }

    /// Drop every entry for one widget.
    pub fn invalidate(&self, widget: WidgetId) {
        self.entries.borrow_mut().retain(|(id, _), _| *id != widget);
    }

    fn lookup(&self, key: &CacheKey) -> Option<Size> {
        let mut stats = self.stats.get();
        stats.lookups += 1;

        let epoch = self.epoch.get();
        let hit = self
            .entries
            .borrow()
            .get(key)
            .and_then(|(entry_epoch, value)| (*entry_epoch == epoch).then_some(*value));

        if hit.is_some() {
            stats.hits += 1;
        }
        self.stats.set(stats);
        hit
    }

    fn store(&self, key: CacheKey, value: Size) {
        self.entries.borrow_mut().insert(key, (self.epoch.get(), value));
        let mut stats = self.stats.get();
        stats.stores += 1;
        self.stats.set(stats);
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.get()
    }

    pub fn reset_stats(&self) {
        self.stats.set(CacheStats::default());
    }

    /// Drop all entries, reset the epoch and the counters.
    pub fn clear_all(&self) {
        self.entries.borrow_mut().clear();
        self.epoch.set(1);
        self.reset_stats();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<M: Measurer> Measurer for CachingMeasurer<M> {
    fn preferred_size(&self, widget: WidgetId, hints: SizeHints) -> Result<Size, MeasureError> {
        let key = (widget, hints);
        if let Some(size) = self.lookup(&key) {
            trace!(%widget, ?hints, "Preferred size cache hit");
            return Ok(size);
        }

        let size = self.inner.preferred_size(widget, hints)?;
        self.store(key, size);
        Ok(size)
    }
}
