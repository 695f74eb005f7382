//! Selection and exclusion driven by a stream of positions.
//!
//! Index streams are expected to be strictly increasing. An index at or
//! below the last one applied (including any negative index) is skipped
//! without effect.
//!
//! The two selectors treat a finished index stream differently: `takei`
//! stops, since nothing further can be selected, while `dropi` lets every
//! remaining value through.

use tracing::{debug, trace};

use crate::pipeline::Stream;
use crate::stage::{Connect, Stage};

/// Keeps only the values at the given positions.
#[derive(Debug)]
pub struct TakeI<T> {
    indices: Option<Stream<i64>>,
    cursor: Stream<T>,
}

pub fn takei<T, I>(indices: I) -> TakeI<T>
where
    T: 'static,
    I: IntoIterator<Item = i64>,
    I::IntoIter: 'static,
{
    TakeI {
        indices: Some(Stream::new(indices)),
        cursor: Stream::empty(),
    }
}

impl<T> Iterator for TakeI<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.cursor.next()
    }
}

impl<T: 'static> Connect<T> for TakeI<T> {
    type Output = Self;

    fn connect(mut self, upstream: Stream<T>) -> Self {
        // an index stream is consumed by its first connection
        let indices = match self.indices.take() {
            Some(indices) => {
                debug!(stage = "takei", "stage connected");
                indices
            }
            None => {
                debug!(stage = "takei", "indices already consumed, selecting nothing");
                Stream::empty()
            }
        };
        self.cursor = Stream::new(SelectByIndex {
            upstream,
            indices,
            position: 0,
            last_taken: -1,
            pending: None,
            done: false,
        });
        self
    }
}

impl<T: 'static> Stage<T> for TakeI<T> {
    fn name(&self) -> &'static str {
        "takei"
    }
}

struct SelectByIndex<T> {
    upstream: Stream<T>,
    indices: Stream<i64>,
    position: i64,
    last_taken: i64,
    pending: Option<i64>,
    done: bool,
}

impl<T> SelectByIndex<T> {
    fn next_index(&mut self) -> Option<i64> {
        let index = self.indices.next();
        if index.is_none() {
            trace!(position = self.position, "index stream exhausted");
            self.done = true;
        }
        index
    }
}

impl<T> Iterator for SelectByIndex<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.done {
            return None;
        }
        let mut index = match self.pending.take() {
            Some(index) => index,
            None => self.next_index()?,
        };
        loop {
            let position = self.position;
            self.position += 1;
            let Some(value) = self.upstream.next() else {
                self.done = true;
                return None;
            };
            while index <= self.last_taken {
                index = self.next_index()?;
            }
            if position == index {
                self.last_taken = index;
                return Some(value);
            }
        }
    }
}

/// Drops the values at the given positions.
#[derive(Debug)]
pub struct DropI<T> {
    indices: Option<Stream<i64>>,
    cursor: Stream<T>,
}

pub fn dropi<T, I>(indices: I) -> DropI<T>
where
    T: 'static,
    I: IntoIterator<Item = i64>,
    I::IntoIter: 'static,
{
    DropI {
        indices: Some(Stream::new(indices)),
        cursor: Stream::empty(),
    }
}

impl<T> Iterator for DropI<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.cursor.next()
    }
}

impl<T: 'static> Connect<T> for DropI<T> {
    type Output = Self;

    fn connect(mut self, upstream: Stream<T>) -> Self {
        let indices = self.indices.take();
        if indices.is_some() {
            debug!(stage = "dropi", "stage connected");
        } else {
            debug!(stage = "dropi", "indices already consumed, passing through");
        }
        self.cursor = Stream::new(ExcludeByIndex {
            upstream,
            indices,
            position: 0,
            last_dropped: -1,
            pending: None,
            started: false,
        });
        self
    }
}

impl<T: 'static> Stage<T> for DropI<T> {
    fn name(&self) -> &'static str {
        "dropi"
    }
}

struct ExcludeByIndex<T> {
    upstream: Stream<T>,
    /// `None` once the index stream is exhausted.
    indices: Option<Stream<i64>>,
    position: i64,
    last_dropped: i64,
    pending: Option<i64>,
    started: bool,
}

impl<T> ExcludeByIndex<T> {
    fn next_index(&mut self) -> Option<i64> {
        let index = self.indices.as_mut().and_then(Iterator::next);
        if index.is_none() && self.indices.take().is_some() {
            trace!(position = self.position, "index stream exhausted, passing through");
        }
        index
    }
}

impl<T> Iterator for ExcludeByIndex<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if !self.started {
            self.started = true;
            self.pending = self.next_index();
        }
        loop {
            let position = self.position;
            self.position += 1;
            let value = self.upstream.next()?;
            while let Some(index) = self.pending {
                if index > self.last_dropped {
                    break;
                }
                self.pending = self.next_index();
            }
            match self.pending {
                Some(index) if index == position => {
                    self.last_dropped = index;
                    self.pending = self.next_index();
                }
                _ => return Some(value),
            }
        }
    }
}
