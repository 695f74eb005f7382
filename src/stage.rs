//! Connection capabilities.
//!
//! Every downstream end of a connection implements [`Connect`]. Which kind
//! of implementor it is decides what the connection produces:
//!
//! 1. A [`Stage`] replaces its own cursor with the transformed upstream and
//!    returns itself, so chaining continues through it.
//! 2. A [`Transform`] calls its function on the upstream and wraps the
//!    result as a [`Stream`]; a [`Sink`] calls its function and returns the
//!    result as-is, ending the pipeline.
//! 3. A plain sequence ([`Stream`] or `Vec`) has no transform: it ignores
//!    the upstream and yields its own values.

use tracing::trace;

use crate::pipeline::Stream;

/// The downstream side of a connection.
pub trait Connect<In> {
    /// What the connection produces.
    type Output;

    /// Consume `upstream` into this connector's output.
    fn connect(self, upstream: Stream<In>) -> Self::Output;
}

/// A connector that is itself a lazy sequence.
///
/// Connecting a stage never pulls from the upstream (apart from the
/// window selectors, which materialize on connection); the stage only
/// records the new cursor and hands itself back.
pub trait Stage<In>: Connect<In, Output = Self> + Iterator {
    /// The display name of this stage.
    fn name(&self) -> &'static str;
}

/// Wraps a one-argument function over a sequence as a transforming connector.
pub struct Transform<F>(F);

/// Use `function` as a transform: its result is re-wrapped as a [`Stream`].
pub fn transform<F>(function: F) -> Transform<F> {
    Transform(function)
}

impl<In, F, I> Connect<In> for Transform<F>
where
    F: FnOnce(Stream<In>) -> I,
    I: IntoIterator,
    I::IntoIter: 'static,
    I::Item: 'static,
{
    type Output = Stream<I::Item>;

    fn connect(self, upstream: Stream<In>) -> Stream<I::Item> {
        trace!("transform connected");
        Stream::new((self.0)(upstream))
    }
}

/// Wraps a one-argument function over a sequence as a pipeline terminus.
pub struct Sink<F>(F);

/// Use `function` as a terminal consumer; its return value ends the pipeline.
pub fn sink<F>(function: F) -> Sink<F> {
    Sink(function)
}

impl<In, F, R> Connect<In> for Sink<F>
where
    F: FnOnce(Stream<In>) -> R,
{
    type Output = R;

    fn connect(self, upstream: Stream<In>) -> R {
        trace!("sink connected");
        (self.0)(upstream)
    }
}

impl<In, T: 'static> Connect<In> for Stream<T> {
    type Output = Stream<T>;

    fn connect(self, _upstream: Stream<In>) -> Stream<T> {
        self
    }
}

impl<In, T: 'static> Stage<In> for Stream<T> {
    fn name(&self) -> &'static str {
        "stream"
    }
}

impl<In, T: 'static> Connect<In> for Vec<T> {
    type Output = Stream<T>;

    fn connect(self, _upstream: Stream<In>) -> Stream<T> {
        Stream::new(self)
    }
}
