//! Position windows: `(start, stop, step)` with slice semantics.
//!
//! Absent bounds run to the appropriate end for the direction of `step`,
//! negative bounds count from the end, and out-of-range bounds are clamped.
//! A window never fails to apply; it selects whatever is available.

use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use crate::error::{PipelineError, Result};

/// An immutable `(start, stop, step)` position selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    start: Option<isize>,
    stop: Option<isize>,
    step: Option<isize>,
}

impl Window {
    /// Build a window. A zero step is rejected.
    pub fn new(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Result<Self> {
        if step == Some(0) {
            return Err(PipelineError::Configuration(
                "window step cannot be zero".to_string(),
            ));
        }
        Ok(Self { start, stop, step })
    }

    /// The window selecting everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// The same bounds with a different step.
    pub fn with_step(self, step: isize) -> Result<Self> {
        Self::new(self.start, self.stop, Some(step))
    }

    pub fn start(&self) -> Option<isize> {
        self.start
    }

    pub fn stop(&self) -> Option<isize> {
        self.stop
    }

    pub fn step(&self) -> Option<isize> {
        self.step
    }

    fn reversed(&self) -> bool {
        matches!(self.step, Some(s) if s < 0)
    }

    /// How many leading values must be pulled to apply this window.
    ///
    /// `None` means the whole sequence has to be materialized: any negative
    /// bound, no bounds at all, an open start with a negative step, or an
    /// open stop with a forward step.
    pub fn bound(&self) -> Option<usize> {
        let negative = |v: Option<isize>| matches!(v, Some(x) if x < 0);
        if negative(self.start) || negative(self.stop) {
            return None;
        }
        match (self.start, self.stop, self.reversed()) {
            // walking backwards from `start` needs `start` itself
            (Some(start), _, true) => Some(start as usize + 1),
            (_, Some(stop), false) => Some(stop as usize),
            _ => None,
        }
    }

    /// The positions this window selects from a sequence of `len` values,
    /// in selection order.
    pub fn indices(&self, len: usize) -> Vec<usize> {
        let len = len as isize;
        let step = self.step.unwrap_or(1);
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
        let clamp = |bound: isize| {
            if bound < 0 {
                (bound + len).max(lower)
            } else {
                bound.min(upper)
            }
        };
        let start = match self.start {
            Some(s) => clamp(s),
            None if step < 0 => upper,
            None => lower,
        };
        let stop = match self.stop {
            Some(s) => clamp(s),
            None if step < 0 => lower,
            None => upper,
        };

        let mut selected = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            selected.push(i as usize);
            match i.checked_add(step) {
                Some(n) => i = n,
                None => break,
            }
        }
        selected
    }

    /// Apply the window to materialized values.
    pub fn select<T>(&self, values: Vec<T>) -> Vec<T> {
        let indices = self.indices(values.len());
        if !self.reversed() && self.step.unwrap_or(1) == 1 {
            let (first, count) = match indices.first() {
                Some(&first) => (first, indices.len()),
                None => return Vec::new(),
            };
            return values.into_iter().skip(first).take(count).collect();
        }
        let mut slots: Vec<Option<T>> = values.into_iter().map(Some).collect();
        indices.into_iter().filter_map(|i| slots[i].take()).collect()
    }
}

/// Resolve a possibly-negative single position against `len` values.
pub(crate) fn resolve_index(index: isize, len: usize) -> Option<usize> {
    let resolved = if index < 0 {
        index + len as isize
    } else {
        index
    };
    (0..len as isize).contains(&resolved).then_some(resolved as usize)
}

fn saturating(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

impl From<usize> for Window {
    /// The first `n` values.
    fn from(n: usize) -> Self {
        Self {
            stop: Some(saturating(n)),
            ..Self::default()
        }
    }
}

impl From<RangeTo<isize>> for Window {
    fn from(r: RangeTo<isize>) -> Self {
        Self {
            stop: Some(r.end),
            ..Self::default()
        }
    }
}

impl From<Range<isize>> for Window {
    fn from(r: Range<isize>) -> Self {
        Self {
            start: Some(r.start),
            stop: Some(r.end),
            step: None,
        }
    }
}

impl From<RangeFrom<isize>> for Window {
    fn from(r: RangeFrom<isize>) -> Self {
        Self {
            start: Some(r.start),
            ..Self::default()
        }
    }
}

impl From<RangeFull> for Window {
    fn from(_: RangeFull) -> Self {
        Self::default()
    }
}
