//! Position selectors: windowed take, lazy drop, and the terminal
//! single-value and slice accessors.
//!
//! `take`, `item` and `items` force evaluation when connected, but pull no
//! more than their window needs, so they are safe on infinite upstreams
//! whenever the window has a forward bound.

use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::pipeline::Stream;
use crate::stage::{Connect, Stage};
use crate::window::Window;

/// Pull what `window` needs from `upstream` and apply it.
fn materialize<T>(window: &Window, upstream: Stream<T>) -> Vec<T> {
    let bound = window.bound();
    let prefix: Vec<T> = match bound {
        Some(n) => upstream.take(n).collect(),
        None => upstream.collect(),
    };
    let pulled = prefix.len();
    let selected = window.select(prefix);
    debug!(
        ?bound,
        pulled,
        selected = selected.len(),
        "window materialized"
    );
    selected
}

/// Forces evaluation of a window and holds the selected values.
///
/// The held values can be inspected with [`Take::as_slice`] and pulled one
/// by one like any other stage.
#[derive(Debug)]
pub struct Take<T> {
    window: Window,
    cache: std::vec::IntoIter<T>,
}

/// Select `window` from the upstream. `take(10)` keeps the first ten values.
pub fn take<T>(window: impl Into<Window>) -> Take<T> {
    Take {
        window: window.into(),
        cache: Vec::new().into_iter(),
    }
}

/// Materialize the whole upstream.
pub fn take_all<T>() -> Take<T> {
    take(Window::all())
}

impl<T> Take<T> {
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// The selected values not yet pulled.
    pub fn as_slice(&self) -> &[T] {
        self.cache.as_slice()
    }
}

impl<T> Iterator for Take<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.cache.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cache.size_hint()
    }
}

impl<T> ExactSizeIterator for Take<T> {}

impl<T: 'static> Connect<T> for Take<T> {
    type Output = Self;

    fn connect(mut self, upstream: Stream<T>) -> Self {
        self.cache = materialize(&self.window, upstream).into_iter();
        self
    }
}

impl<T: 'static> Stage<T> for Take<T> {
    fn name(&self) -> &'static str {
        "take"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    At(usize),
    Last,
}

/// Terminal access to a single value.
///
/// Connecting yields `Ok(value)` or an [`PipelineError::Index`] when the
/// upstream ends first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    position: Position,
}

/// The value at position `n`; pulls at most `n + 1` values.
pub fn item(n: usize) -> Item {
    Item {
        position: Position::At(n),
    }
}

/// The final value; pulls the whole upstream.
pub fn last() -> Item {
    Item {
        position: Position::Last,
    }
}

impl<T: 'static> Connect<T> for Item {
    type Output = Result<T>;

    fn connect(self, upstream: Stream<T>) -> Result<T> {
        match self.position {
            Position::At(n) => {
                let mut available = 0;
                for value in upstream.take(n.saturating_add(1)) {
                    if available == n {
                        return Ok(value);
                    }
                    available += 1;
                }
                Err(PipelineError::Index {
                    index: isize::try_from(n).unwrap_or(isize::MAX),
                    available,
                })
            }
            Position::Last => upstream.last().ok_or(PipelineError::Index {
                index: -1,
                available: 0,
            }),
        }
    }
}

/// Terminal slice access: the selected values as a plain `Vec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Items {
    window: Window,
}

pub fn items(window: impl Into<Window>) -> Items {
    Items {
        window: window.into(),
    }
}

impl<T: 'static> Connect<T> for Items {
    type Output = Vec<T>;

    fn connect(self, upstream: Stream<T>) -> Vec<T> {
        materialize(&self.window, upstream)
    }
}

/// Skips the first `n` values, lazily on the first pull.
#[derive(Debug)]
pub struct Skip<T> {
    n: usize,
    cursor: Stream<T>,
}

pub fn drop<T: 'static>(n: usize) -> Skip<T> {
    Skip {
        n,
        cursor: Stream::empty(),
    }
}

impl<T> Iterator for Skip<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.cursor.next()
    }
}

impl<T: 'static> Connect<T> for Skip<T> {
    type Output = Self;

    fn connect(mut self, upstream: Stream<T>) -> Self {
        debug!(stage = "drop", n = self.n, "stage connected");
        self.cursor = Stream::new(upstream.skip(self.n));
        self
    }
}

impl<T: 'static> Stage<T> for Skip<T> {
    fn name(&self) -> &'static str {
        "drop"
    }
}
