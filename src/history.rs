//! Snapshot-based undo/redo over any cloneable value.
//!
//! [`History`] keeps a linear timeline split into `past`, `present` and
//! `future`. Recording a new value discards `future` (branch discard), then
//! optionally run-length compresses `past` and finally trims it to
//! [`HistoryOptions::max_history_size`] from the oldest end.
//!
//! ```ignore
//! let mut history = History::new(0);
//! history.set(1);
//! history.set(2);
//! history.undo();
//! assert_eq!(*history.present(), 1);
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Default cap on remembered past states.
pub const DEFAULT_MAX_HISTORY_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryOptions {
    /// Maximum entries kept in `past`. `0` keeps none, which disables undo;
    /// use `usize::MAX` for no cap.
    pub max_history_size: usize,
    /// Collapse consecutive equal entries in `past` before trimming.
    pub enable_compression: bool,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
            enable_compression: false,
        }
    }
}

/// Counters for a status bar or debug overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub past_count: usize,
    pub future_count: usize,
    /// `past + present + future`.
    pub total_size: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

// ===========================================================================
// History
// ===========================================================================

#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<T>,
    present: T,
    future: VecDeque<T>,
    options: HistoryOptions,
}

impl<T: Default> Default for History<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> History<T> {
    pub fn new(initial: T) -> Self {
        Self::with_options(initial, HistoryOptions::default())
    }

    pub fn with_options(initial: T, options: HistoryOptions) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial,
            future: VecDeque::new(),
            options,
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Oldest first.
    pub fn past(&self) -> &VecDeque<T> {
        &self.past
    }

    /// Next redo first.
    pub fn future(&self) -> &VecDeque<T> {
        &self.future
    }

    pub fn options(&self) -> HistoryOptions {
        self.options
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            past_count: self.past.len(),
            future_count: self.future.len(),
            total_size: self.past.len() + 1 + self.future.len(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    /// Step back one state. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        true
    }

    /// Step forward one state. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        true
    }

    /// Move to `index` of the flattened `past ++ [present] ++ future`
    /// timeline. Out-of-range indices are ignored.
    pub fn jump(&mut self, index: usize) -> bool {
        let total = self.past.len() + 1 + self.future.len();
        if index >= total {
            return false;
        }

        let current = self.past.len();
        if index < current {
            for _ in index..current {
                self.undo();
            }
        } else {
            for _ in current..index {
                self.redo();
            }
        }
        true
    }

    /// Drop `past` and `future`, keeping `present`.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Replace everything with a fresh single-state timeline.
    pub fn reset(&mut self, value: T) {
        self.clear();
        self.present = value;
    }

    /// Record `value` unconditionally: the old present moves to `past` and
    /// `future` is discarded.
    pub fn push(&mut self, value: T)
    where
        T: PartialEq,
    {
        let previous = std::mem::replace(&mut self.present, value);
        self.past.push_back(previous);
        self.future.clear();

        if self.options.enable_compression {
            compress_history(&mut self.past);
        }
        let dropped = limit_history_size(&mut self.past, self.options.max_history_size);
        if dropped > 0 {
            trace!(dropped, "trimmed history");
        }
    }

    /// Record `value` unless it equals the present state.
    ///
    /// Returns whether anything was recorded.
    pub fn set(&mut self, value: T) -> bool
    where
        T: PartialEq,
    {
        if value == self.present {
            return false;
        }
        self.push(value);
        true
    }

    /// [`set`](Self::set) with a value computed from the present state.
    pub fn update(&mut self, f: impl FnOnce(&T) -> T) -> bool
    where
        T: PartialEq,
    {
        let next = f(&self.present);
        self.set(next)
    }
}

// ===========================================================================
// Free functions
// ===========================================================================

/// Keep the newest `max` entries of `past`, dropping from the oldest end.
/// Returns how many were dropped.
pub fn limit_history_size<T>(past: &mut VecDeque<T>, max: usize) -> usize {
    if past.len() <= max {
        return 0;
    }
    let excess = past.len() - max;
    past.drain(..excess);
    excess
}

/// Collapse runs of consecutive equal entries into one.
pub fn compress_history<T: PartialEq>(past: &mut VecDeque<T>) {
    let mut kept: VecDeque<T> = VecDeque::with_capacity(past.len());
    for entry in past.drain(..) {
        if kept.back() != Some(&entry) {
            kept.push_back(entry);
        }
    }
    *past = kept;
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(values: &[i32]) -> History<i32> {
        let mut history = History::new(0);
        for &v in values {
            history.set(v);
        }
        history
    }

    #[test]
    fn set_records_and_clears_future() {
        let mut history = history_of(&[1, 2]);
        assert_eq!(*history.present(), 2);
        assert_eq!(history.past(), &[0, 1]);

        history.undo();
        assert!(history.can_redo());
        history.set(5);
        assert!(!history.can_redo());
        assert_eq!(history.past(), &[0, 1]);
    }

    #[test]
    fn set_suppresses_equal_values() {
        let mut history = history_of(&[1]);
        history.undo();
        let before = history.stats();
        assert!(!history.set(0));
        assert_eq!(history.stats(), before);
        assert!(history.can_redo());
    }

    #[test]
    fn push_records_equal_values() {
        let mut history = History::new(1);
        history.push(1);
        assert_eq!(history.past().len(), 1);
    }

    #[test]
    fn undo_redo_inverse() {
        let mut history = history_of(&[1, 2, 3, 4]);
        for _ in 0..4 {
            assert!(history.undo());
        }
        assert_eq!(*history.present(), 0);
        assert!(!history.undo());

        for _ in 0..4 {
            assert!(history.redo());
        }
        assert_eq!(*history.present(), 4);
        assert!(!history.redo());
    }

    #[test]
    fn cap_keeps_newest() {
        let mut history = History::with_options(
            0,
            HistoryOptions {
                max_history_size: 3,
                enable_compression: false,
            },
        );
        for v in 1..=10 {
            history.set(v);
            assert!(history.past().len() <= 3);
        }
        assert_eq!(history.past(), &[7, 8, 9]);
    }

    #[test]
    fn jump_splits_the_timeline() {
        let mut history = history_of(&[1, 2, 3]);
        assert!(history.jump(1));
        assert_eq!(*history.present(), 1);
        assert_eq!(history.past(), &[0]);
        assert_eq!(history.future(), &[2, 3]);

        assert!(history.jump(3));
        assert_eq!(*history.present(), 3);
        assert_eq!(history.past(), &[0, 1, 2]);
        assert!(history.future().is_empty());

        assert!(!history.jump(4));
        assert_eq!(*history.present(), 3);
    }

    #[test]
    fn compression_collapses_runs() {
        let mut past: VecDeque<i32> = [1, 1, 2, 2, 2, 1, 3].into_iter().collect();
        compress_history(&mut past);
        assert_eq!(past, [1, 2, 1, 3]);
    }

    #[test]
    fn compression_runs_before_trim() {
        let mut history = History::with_options(
            1,
            HistoryOptions {
                max_history_size: 2,
                enable_compression: true,
            },
        );
        history.push(1);
        history.push(1);
        history.push(2);
        assert_eq!(history.past(), &[1]);
        assert_eq!(*history.present(), 2);
    }

    #[test]
    fn limit_keeps_newest() {
        let mut past: VecDeque<i32> = (0..100).collect();
        assert_eq!(limit_history_size(&mut past, usize::MAX), 0);
        assert_eq!(limit_history_size(&mut past, 10), 90);
        assert_eq!(past.front(), Some(&90));
        assert_eq!(limit_history_size(&mut past, 0), 10);
        assert!(past.is_empty());
    }

    #[test]
    fn zero_cap_never_keeps_past() {
        let mut history = History::with_options(
            0,
            HistoryOptions {
                max_history_size: 0,
                ..Default::default()
            },
        );
        for value in 1..=5 {
            assert!(history.set(value));
            assert!(history.past().is_empty());
        }
        assert_eq!(*history.present(), 5);
        assert!(!history.can_undo());
        assert!(!history.undo());
    }

    #[test]
    fn clear_and_reset() {
        let mut history = history_of(&[1, 2]);
        history.undo();
        history.clear();
        assert_eq!(*history.present(), 1);
        assert!(!history.can_undo() && !history.can_redo());

        history.reset(9);
        let stats = history.stats();
        assert_eq!(*history.present(), 9);
        assert_eq!(stats.total_size, 1);
    }

    #[test]
    fn update_derives_from_present() {
        let mut history = History::new(1);
        assert!(history.update(|v| v + 1));
        assert!(!history.update(|v| *v));
        assert_eq!(*history.present(), 2);
    }
}
