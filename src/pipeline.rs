//! Lazy sequences and the connection operator.
//!
//! A [`Stream`] is the plain lazy sequence every stage pulls from and the
//! degenerate stage every plain iterable becomes when it enters a pipeline.
//! Pipelines have no representation of their own: connecting `a` to `b`
//! yields whatever `b` produces when given `a`, and chaining continues from
//! there.
//!
//! ```
//! use lazy_streams::{Pipe, connect, filter, map};
//!
//! let odd_squares: Vec<i32> = (1..10)
//!     .pipe(filter(|x: &i32| x % 2 == 1))
//!     .pipe(map(|x: i32| x * x))
//!     .collect();
//! assert_eq!(odd_squares, vec![1, 9, 25, 49, 81]);
//!
//! let same: Vec<i32> = connect(connect(1..10, filter(|x: &i32| x % 2 == 1)), map(|x: i32| x * x))
//!     .collect();
//! assert_eq!(same, odd_squares);
//! ```

use std::fmt;

use crate::stage::Connect;

/// A boxed, single-owner lazy sequence.
///
/// Nothing is pulled from the wrapped iterator until the stream itself is
/// pulled.
pub struct Stream<T> {
    iter: Box<dyn Iterator<Item = T>>,
}

impl<T: 'static> Stream<T> {
    /// Wrap any iterable as a stream.
    pub fn new<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self {
            iter: Box::new(iterable.into_iter()),
        }
    }

    /// A stream that is already exhausted.
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }
}

impl<T: 'static> Default for Stream<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Iterator for Stream<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Stream(..)")
    }
}

/// Connect `upstream` to `downstream`, producing `downstream`'s view of it.
///
/// No value is pulled by the connection itself unless `downstream` is a
/// selector that forces evaluation (`take`, `item`, `items`) or a sink.
pub fn connect<U, D>(upstream: U, downstream: D) -> D::Output
where
    U: IntoIterator,
    U::IntoIter: 'static,
    U::Item: 'static,
    D: Connect<U::Item>,
{
    downstream.connect(Stream::new(upstream))
}

/// Fluent chaining: `source.pipe(a).pipe(b)` is `connect(connect(source, a), b)`.
pub trait Pipe: IntoIterator + Sized {
    fn pipe<D>(self, downstream: D) -> D::Output
    where
        Self::IntoIter: 'static,
        Self::Item: 'static,
        D: Connect<Self::Item>,
    {
        connect(self, downstream)
    }
}

impl<I: IntoIterator> Pipe for I {}
