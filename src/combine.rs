//! Structural combinators: concatenation at either end, branching, and
//! depth-first flattening.

use itertools::Itertools;
use tracing::{debug, trace};

use crate::nested::{IntoNested, Nested};
use crate::pipeline::Stream;
use crate::stage::{Connect, Stage};

// ---------------------------------------------------------------------------
// prepend / append
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Front,
    Back,
}

/// Concatenates a stored sequence to one end of the upstream.
///
/// The stored sequence is consumed by the first connection.
#[derive(Debug)]
pub struct Concat<T> {
    end: End,
    stored: Option<Stream<T>>,
    cursor: Stream<T>,
}

fn concat<T, I>(end: End, values: I) -> Concat<T>
where
    T: 'static,
    I: IntoIterator<Item = T>,
    I::IntoIter: 'static,
{
    Concat {
        end,
        stored: Some(Stream::new(values)),
        cursor: Stream::empty(),
    }
}

/// Yield `values` before the upstream.
pub fn prepend<T, I>(values: I) -> Concat<T>
where
    T: 'static,
    I: IntoIterator<Item = T>,
    I::IntoIter: 'static,
{
    concat(End::Front, values)
}

/// Yield `values` after the upstream; the upstream must end for them to
/// appear.
pub fn append<T, I>(values: I) -> Concat<T>
where
    T: 'static,
    I: IntoIterator<Item = T>,
    I::IntoIter: 'static,
{
    concat(End::Back, values)
}

impl<T> Iterator for Concat<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.cursor.next()
    }
}

impl<T: 'static> Connect<T> for Concat<T> {
    type Output = Self;

    fn connect(mut self, upstream: Stream<T>) -> Self {
        debug!(stage = self.name(), "stage connected");
        let stored = self.stored.take().unwrap_or_default();
        self.cursor = match self.end {
            End::Front => Stream::new(stored.chain(upstream)),
            End::Back => Stream::new(upstream.chain(stored)),
        };
        self
    }
}

impl<T: 'static> Stage<T> for Concat<T> {
    fn name(&self) -> &'static str {
        match self.end {
            End::Front => "prepend",
            End::Back => "append",
        }
    }
}

// ---------------------------------------------------------------------------
// tee
// ---------------------------------------------------------------------------

/// Split one sequence into two that can be pulled independently.
///
/// Values pulled by one side are buffered until the other side has passed
/// them, so the buffer grows with the distance between the two readers.
pub fn tee_of<I>(iterable: I) -> (Stream<I::Item>, Stream<I::Item>)
where
    I: IntoIterator,
    I::IntoIter: 'static,
    I::Item: Clone + 'static,
{
    let (left, right) = iterable.into_iter().tee();
    (Stream::new(left), Stream::new(right))
}

/// Forks the upstream into a side pipeline while the main line continues
/// through this stage.
///
/// On connection one copy of the upstream is connected into the branch
/// connector; retrieve the result with [`Tee::take_branch`].
pub struct Tee<T, B: Connect<T>> {
    branch: Option<B>,
    connected: Option<B::Output>,
    cursor: Stream<T>,
}

pub fn tee<T, B>(branch: B) -> Tee<T, B>
where
    T: 'static,
    B: Connect<T>,
{
    Tee {
        branch: Some(branch),
        connected: None,
        cursor: Stream::empty(),
    }
}

impl<T, B: Connect<T>> Tee<T, B> {
    /// The connected side pipeline, if the tee has been connected.
    pub fn branch(&self) -> Option<&B::Output> {
        self.connected.as_ref()
    }

    /// Hand out the connected side pipeline.
    pub fn take_branch(&mut self) -> Option<B::Output> {
        self.connected.take()
    }
}

impl<T, B: Connect<T>> Iterator for Tee<T, B> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.cursor.next()
    }
}

impl<T, B> Connect<T> for Tee<T, B>
where
    T: Clone + 'static,
    B: Connect<T>,
{
    type Output = Self;

    fn connect(mut self, upstream: Stream<T>) -> Self {
        match self.branch.take() {
            Some(branch) => {
                debug!(stage = "tee", "splitting upstream into branch");
                let (main, side) = tee_of(upstream);
                self.connected = Some(branch.connect(side));
                self.cursor = main;
            }
            None => {
                debug!(stage = "tee", "branch already connected, passing through");
                self.cursor = upstream;
            }
        }
        self
    }
}

impl<T, B> Stage<T> for Tee<T, B>
where
    T: Clone + 'static,
    B: Connect<T>,
{
    fn name(&self) -> &'static str {
        "tee"
    }
}

// ---------------------------------------------------------------------------
// flatten
// ---------------------------------------------------------------------------

/// Depth-first flattening of nested sequences of any depth.
#[derive(Debug)]
pub struct Flatten<T> {
    cursor: Stream<T>,
}

pub fn flatten<T: 'static>() -> Flatten<T> {
    Flatten {
        cursor: Stream::empty(),
    }
}

impl<T> Iterator for Flatten<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.cursor.next()
    }
}

impl<In, T> Connect<In> for Flatten<T>
where
    In: IntoNested<Atom = T> + 'static,
    T: 'static,
{
    type Output = Self;

    fn connect(mut self, upstream: Stream<In>) -> Self {
        debug!(stage = "flatten", "stage connected");
        self.cursor = Stream::new(DepthFirst {
            outer: Vec::new(),
            current: Stream::new(upstream.map(IntoNested::into_nested)),
        });
        self
    }
}

impl<In, T> Stage<In> for Flatten<T>
where
    In: IntoNested<Atom = T> + 'static,
    T: 'static,
{
    fn name(&self) -> &'static str {
        "flatten"
    }
}

/// Walks nested cursors with an explicit stack of the enclosing ones.
struct DepthFirst<T> {
    outer: Vec<Stream<Nested<T>>>,
    current: Stream<Nested<T>>,
}

impl<T: 'static> Iterator for DepthFirst<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            match self.current.next() {
                Some(Nested::Atom(value)) => return Some(value),
                Some(Nested::Seq(inner)) => {
                    let enclosing = std::mem::replace(&mut self.current, inner);
                    self.outer.push(enclosing);
                    trace!(depth = self.outer.len(), "descend");
                }
                None => match self.outer.pop() {
                    Some(enclosing) => {
                        self.current = enclosing;
                        trace!(depth = self.outer.len(), "ascend");
                    }
                    None => {
                        self.current = Stream::empty();
                        return None;
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Pipe, filter, items, seq};
    use serde_json::{Value, json};

    #[test]
    fn test_prepend() {
        let out = seq(7, 7).pipe(prepend((0..10).step_by(2))).pipe(items(10));
        assert_eq!(out, vec![0, 2, 4, 6, 8, 7, 14, 21, 28, 35]);
    }

    #[test]
    fn test_append() {
        let out: Vec<i32> = (1..20)
            .step_by(7)
            .pipe(append((1..10).step_by(3)))
            .pipe(append(vec![0]))
            .collect();
        assert_eq!(out, vec![1, 8, 15, 1, 4, 7, 0]);
    }

    #[test]
    fn test_concat_names() {
        assert_eq!(Stage::<u8>::name(&prepend(Vec::<u8>::new())), "prepend");
        assert_eq!(Stage::<u8>::name(&append(Vec::<u8>::new())), "append");
    }

    #[test]
    fn test_tee_branches_independently() {
        let mut main = seq(0, 2).pipe(tee(filter(|x: &i64| x % 3 == 0)));
        let side = main.take_branch().unwrap();
        assert_eq!(main.pipe(items(5)), vec![0, 2, 4, 6, 8]);
        assert_eq!(side.pipe(items(5)), vec![0, 6, 12, 18, 24]);
    }

    #[test]
    fn test_tee_of_does_not_share_progress() {
        let (mut main, mut branch) = tee_of(0..6);
        assert_eq!(branch.next(), Some(0));
        assert_eq!(branch.next(), Some(1));
        assert_eq!(branch.next(), Some(2));
        assert_eq!(main.next(), Some(0));

        let rest_main: Vec<i32> = main.collect();
        let rest_branch: Vec<i32> = branch.collect();
        assert_eq!(rest_main, vec![1, 2, 3, 4, 5]);
        assert_eq!(rest_branch, vec![3, 4, 5]);
    }

    #[test]
    fn test_tee_of_both_sides_complete() {
        let (a, b) = tee_of(vec!["x", "y", "z"]);
        let a: Vec<&str> = a.collect();
        let b: Vec<&str> = b.collect();
        assert_eq!(a, b);
        assert_eq!(a, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_flatten_ranges() {
        let out = seq(0, 3)
            .pipe(crate::map(|n: i64| 0..n))
            .pipe(flatten())
            .pipe(items(18));
        assert_eq!(out, vec![0, 1, 2, 0, 1, 2, 3, 4, 5, 0, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_flatten_deep_json() {
        let nested = vec![json!([1, [2, [3, [4]]], "ab"]), json!(5), json!([])];
        let out: Vec<Value> = nested.pipe(flatten()).collect();
        assert_eq!(out, vec![json!(1), json!(2), json!(3), json!(4), json!("ab"), json!(5)]);
    }

    #[test]
    fn test_flatten_keeps_text_atomic() {
        let out: Vec<String> = vec![vec!["foo".to_string()], vec!["ba".to_string(), "r".to_string()]]
            .pipe(flatten())
            .collect();
        assert_eq!(out, vec!["foo", "ba", "r"]);
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let nested = || vec![vec![vec![1, 2], vec![]], vec![vec![3]], vec![]];
        let once: Vec<i32> = nested().pipe(flatten()).collect();
        let twice: Vec<i32> = nested().pipe(flatten()).pipe(flatten()).collect();
        assert_eq!(once, vec![1, 2, 3]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_flatten_mixed_nesting() {
        let mixed = vec![
            Nested::Atom(1),
            Nested::seq(vec![Nested::Atom(2), Nested::seq(vec![3, 4])]),
            Nested::seq(Vec::<i32>::new()),
            Nested::Atom(5),
        ];
        let out: Vec<i32> = mixed.pipe(flatten()).collect();
        assert_eq!(out, vec![1, 2, 3, 4, 5]);
    }
}
