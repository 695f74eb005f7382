//! Function-driven stages: per-element mapping and filtering, predicate
//! prefixes, argument-unpacked application, named method calls, per-element
//! slicing, running accumulation and closure-built sequences.
//!
//! Stage functions are held behind `Rc` so a stage keeps its configuration
//! after connecting and can be connected again.
//!
//! Fallible stages (`apply`, `mapmethod`, `cut_at`, `generate`) yield
//! `Result` items: a failure surfaces at the pull that hits it and the
//! caller chooses whether to keep pulling.

use std::fmt::Display;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::methods::{Methods, Sliceable};
use crate::pipeline::Stream;
use crate::stage::{Connect, Stage};
use crate::window::Window;

// ---------------------------------------------------------------------------
// map / filter / takewhile / dropwhile
// ---------------------------------------------------------------------------

/// Applies a function to every value.
pub struct Map<T, U> {
    function: Rc<dyn Fn(T) -> U>,
    cursor: Stream<U>,
}

pub fn map<T, U, F>(function: F) -> Map<T, U>
where
    U: 'static,
    F: Fn(T) -> U + 'static,
{
    Map {
        function: Rc::new(function),
        cursor: Stream::empty(),
    }
}

impl<T, U> Iterator for Map<T, U> {
    type Item = U;

    fn next(&mut self) -> Option<U> {
        self.cursor.next()
    }
}

impl<T: 'static, U: 'static> Connect<T> for Map<T, U> {
    type Output = Self;

    fn connect(mut self, upstream: Stream<T>) -> Self {
        debug!(stage = "map", "stage connected");
        let function = Rc::clone(&self.function);
        self.cursor = Stream::new(upstream.map(move |value| function(value)));
        self
    }
}

impl<T: 'static, U: 'static> Stage<T> for Map<T, U> {
    fn name(&self) -> &'static str {
        "map"
    }
}

/// The three predicate-driven stages share one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PredicateMode {
    Keep,
    TakeWhile,
    DropWhile,
}

/// Keeps values by a predicate: everywhere, as a prefix, or after a prefix.
pub struct Filter<T> {
    mode: PredicateMode,
    predicate: Rc<dyn Fn(&T) -> bool>,
    cursor: Stream<T>,
}

fn predicate_stage<T, F>(mode: PredicateMode, predicate: F) -> Filter<T>
where
    T: 'static,
    F: Fn(&T) -> bool + 'static,
{
    Filter {
        mode,
        predicate: Rc::new(predicate),
        cursor: Stream::empty(),
    }
}

/// Keep the values for which `predicate` holds.
pub fn filter<T, F>(predicate: F) -> Filter<T>
where
    T: 'static,
    F: Fn(&T) -> bool + 'static,
{
    predicate_stage(PredicateMode::Keep, predicate)
}

/// Keep values until `predicate` first fails.
pub fn takewhile<T, F>(predicate: F) -> Filter<T>
where
    T: 'static,
    F: Fn(&T) -> bool + 'static,
{
    predicate_stage(PredicateMode::TakeWhile, predicate)
}

/// Skip values until `predicate` first fails, then keep everything.
pub fn dropwhile<T, F>(predicate: F) -> Filter<T>
where
    T: 'static,
    F: Fn(&T) -> bool + 'static,
{
    predicate_stage(PredicateMode::DropWhile, predicate)
}

impl<T> Iterator for Filter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.cursor.next()
    }
}

impl<T: 'static> Connect<T> for Filter<T> {
    type Output = Self;

    fn connect(mut self, upstream: Stream<T>) -> Self {
        debug!(stage = self.name(), "stage connected");
        let predicate = Rc::clone(&self.predicate);
        self.cursor = match self.mode {
            PredicateMode::Keep => Stream::new(upstream.filter(move |v| predicate(v))),
            PredicateMode::TakeWhile => Stream::new(upstream.take_while(move |v| predicate(v))),
            PredicateMode::DropWhile => Stream::new(upstream.skip_while(move |v| predicate(v))),
        };
        self
    }
}

impl<T: 'static> Stage<T> for Filter<T> {
    fn name(&self) -> &'static str {
        match self.mode {
            PredicateMode::Keep => "filter",
            PredicateMode::TakeWhile => "takewhile",
            PredicateMode::DropWhile => "dropwhile",
        }
    }
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

/// Calls a function with each value's elements as its arguments.
///
/// Values whose length differs from the declared arity yield
/// [`PipelineError::Argument`] instead of calling the function.
pub struct Apply<A, U> {
    arity: usize,
    function: Rc<dyn Fn(Vec<A>) -> Result<U>>,
    cursor: Stream<Result<U>>,
}

/// Wrap a function that checks its own argument count.
fn unpacked<A, U, F>(arity: usize, function: F) -> Apply<A, U>
where
    U: 'static,
    F: Fn(Vec<A>) -> Result<U> + 'static,
{
    Apply {
        arity,
        function: Rc::new(function),
        cursor: Stream::empty(),
    }
}

pub fn apply<A, U, F>(arity: usize, function: F) -> Apply<A, U>
where
    A: 'static,
    U: 'static,
    F: Fn(Vec<A>) -> U + 'static,
{
    unpacked(arity, move |args: Vec<A>| {
        if args.len() == arity {
            Ok(function(args))
        } else {
            Err(PipelineError::arity(arity, args.len()))
        }
    })
}

pub fn apply1<A, U, F>(function: F) -> Apply<A, U>
where
    A: 'static,
    U: 'static,
    F: Fn(A) -> U + 'static,
{
    unpacked(1, move |args: Vec<A>| match <[A; 1]>::try_from(args) {
        Ok([a]) => Ok(function(a)),
        Err(args) => Err(PipelineError::arity(1, args.len())),
    })
}

pub fn apply2<A, U, F>(function: F) -> Apply<A, U>
where
    A: 'static,
    U: 'static,
    F: Fn(A, A) -> U + 'static,
{
    unpacked(2, move |args: Vec<A>| match <[A; 2]>::try_from(args) {
        Ok([a, b]) => Ok(function(a, b)),
        Err(args) => Err(PipelineError::arity(2, args.len())),
    })
}

pub fn apply3<A, U, F>(function: F) -> Apply<A, U>
where
    A: 'static,
    U: 'static,
    F: Fn(A, A, A) -> U + 'static,
{
    unpacked(3, move |args: Vec<A>| match <[A; 3]>::try_from(args) {
        Ok([a, b, c]) => Ok(function(a, b, c)),
        Err(args) => Err(PipelineError::arity(3, args.len())),
    })
}

impl<A, U> Iterator for Apply<A, U> {
    type Item = Result<U>;

    fn next(&mut self) -> Option<Result<U>> {
        self.cursor.next()
    }
}

impl<A: 'static, U: 'static> Connect<Vec<A>> for Apply<A, U> {
    type Output = Self;

    fn connect(mut self, upstream: Stream<Vec<A>>) -> Self {
        debug!(stage = "apply", arity = self.arity, "stage connected");
        let function = Rc::clone(&self.function);
        self.cursor = Stream::new(upstream.map(move |args| function(args)));
        self
    }
}

impl<A: 'static, U: 'static> Stage<Vec<A>> for Apply<A, U> {
    fn name(&self) -> &'static str {
        "apply"
    }
}

// ---------------------------------------------------------------------------
// mapmethod / cut
// ---------------------------------------------------------------------------

/// Calls a named method, with fixed arguments, on every value.
#[derive(Debug)]
pub struct MapMethod<T> {
    method: Rc<str>,
    args: Rc<[Value]>,
    cursor: Stream<Result<Value>>,
    _input: std::marker::PhantomData<fn(T)>,
}

pub fn mapmethod<T>(method: &str, args: Vec<Value>) -> MapMethod<T> {
    MapMethod {
        method: Rc::from(method),
        args: Rc::from(args),
        cursor: Stream::empty(),
        _input: std::marker::PhantomData,
    }
}

impl<T> Iterator for MapMethod<T> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Result<Value>> {
        self.cursor.next()
    }
}

impl<T: Methods + 'static> Connect<T> for MapMethod<T> {
    type Output = Self;

    fn connect(mut self, upstream: Stream<T>) -> Self {
        debug!(stage = "mapmethod", method = %self.method, "stage connected");
        let method = Rc::clone(&self.method);
        let args = Rc::clone(&self.args);
        self.cursor = Stream::new(upstream.map(move |value| value.call_method(&method, &args)));
        self
    }
}

impl<T: Methods + 'static> Stage<T> for MapMethod<T> {
    fn name(&self) -> &'static str {
        "mapmethod"
    }
}

/// Applies a window to every value individually.
#[derive(Debug)]
pub struct Cut<E> {
    window: Window,
    cursor: Stream<E>,
}

pub fn cut<E: 'static>(window: impl Into<Window>) -> Cut<E> {
    Cut {
        window: window.into(),
        cursor: Stream::empty(),
    }
}

impl<E> Iterator for Cut<E> {
    type Item = E;

    fn next(&mut self) -> Option<E> {
        self.cursor.next()
    }
}

impl<E: Sliceable + 'static> Connect<E> for Cut<E> {
    type Output = Self;

    fn connect(mut self, upstream: Stream<E>) -> Self {
        debug!(stage = "cut", window = ?self.window, "stage connected");
        let window = self.window;
        self.cursor = Stream::new(upstream.map(move |value| value.cut(&window)));
        self
    }
}

impl<E: Sliceable + 'static> Stage<E> for Cut<E> {
    fn name(&self) -> &'static str {
        "cut"
    }
}

/// Picks one position out of every value; negative positions count from
/// the end.
#[derive(Debug)]
pub struct CutAt<E: Sliceable> {
    index: isize,
    cursor: Stream<Result<E::Elem>>,
}

pub fn cut_at<E>(index: isize) -> CutAt<E>
where
    E: Sliceable,
    E::Elem: 'static,
{
    CutAt {
        index,
        cursor: Stream::empty(),
    }
}

impl<E: Sliceable> Iterator for CutAt<E> {
    type Item = Result<E::Elem>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next()
    }
}

impl<E> Connect<E> for CutAt<E>
where
    E: Sliceable + 'static,
    E::Elem: 'static,
{
    type Output = Self;

    fn connect(mut self, upstream: Stream<E>) -> Self {
        debug!(stage = "cut_at", index = self.index, "stage connected");
        let index = self.index;
        self.cursor = Stream::new(upstream.map(move |value| value.at(index)));
        self
    }
}

impl<E> Stage<E> for CutAt<E>
where
    E: Sliceable + 'static,
    E::Elem: 'static,
{
    fn name(&self) -> &'static str {
        "cut_at"
    }
}

// ---------------------------------------------------------------------------
// reduce (scan)
// ---------------------------------------------------------------------------

/// Running accumulation: one output per input, starting with the initial
/// value if one was given, else with the first input.
pub struct Reduce<T> {
    function: Rc<dyn Fn(T, T) -> T>,
    initial: Option<T>,
    cursor: Stream<T>,
}

pub fn reduce<T, F>(function: F) -> Reduce<T>
where
    T: 'static,
    F: Fn(T, T) -> T + 'static,
{
    Reduce {
        function: Rc::new(function),
        initial: None,
        cursor: Stream::empty(),
    }
}

pub fn reduce_from<T, F>(function: F, initial: T) -> Reduce<T>
where
    T: 'static,
    F: Fn(T, T) -> T + 'static,
{
    Reduce {
        initial: Some(initial),
        ..reduce(function)
    }
}

impl<T> Iterator for Reduce<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.cursor.next()
    }
}

impl<T: Clone + 'static> Connect<T> for Reduce<T> {
    type Output = Self;

    fn connect(mut self, upstream: Stream<T>) -> Self {
        debug!(
            stage = "reduce",
            seeded = self.initial.is_some(),
            "stage connected"
        );
        self.cursor = Stream::new(Scan {
            upstream,
            function: Rc::clone(&self.function),
            seed: self.initial.clone(),
            accumulated: None,
            started: false,
        });
        self
    }
}

impl<T: Clone + 'static> Stage<T> for Reduce<T> {
    fn name(&self) -> &'static str {
        "reduce"
    }
}

struct Scan<T> {
    upstream: Stream<T>,
    function: Rc<dyn Fn(T, T) -> T>,
    seed: Option<T>,
    accumulated: Option<T>,
    started: bool,
}

impl<T: Clone> Iterator for Scan<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let next = if self.started {
            let accumulated = self.accumulated.take()?;
            let value = self.upstream.next()?;
            (self.function)(accumulated, value)
        } else {
            self.started = true;
            match self.seed.take() {
                Some(seed) => seed,
                None => self.upstream.next()?,
            }
        };
        self.accumulated = Some(next.clone());
        Some(next)
    }
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

type Expression<T, U> = Rc<dyn Fn(Stream<T>) -> std::result::Result<Stream<U>, String>>;

/// Builds its sequence by handing the whole upstream to a closure, once
/// per connection.
///
/// A failing closure yields a single [`PipelineError::Expression`].
pub struct Generate<T, U> {
    expression: Expression<T, U>,
    cursor: Stream<Result<U>>,
}

pub fn generate<T, U, F, I, E>(expression: F) -> Generate<T, U>
where
    T: 'static,
    U: 'static,
    F: Fn(Stream<T>) -> std::result::Result<I, E> + 'static,
    I: IntoIterator<Item = U>,
    I::IntoIter: 'static,
    E: Display,
{
    let expression = move |upstream: Stream<T>| {
        expression(upstream)
            .map(Stream::new)
            .map_err(|e| e.to_string())
    };
    Generate {
        expression: Rc::new(expression),
        cursor: Stream::empty(),
    }
}

impl<T, U> Iterator for Generate<T, U> {
    type Item = Result<U>;

    fn next(&mut self) -> Option<Result<U>> {
        self.cursor.next()
    }
}

impl<T: 'static, U: 'static> Connect<T> for Generate<T, U> {
    type Output = Self;

    fn connect(mut self, upstream: Stream<T>) -> Self {
        self.cursor = match (self.expression)(upstream) {
            Ok(generated) => {
                debug!(stage = "generate", "stage connected");
                Stream::new(generated.map(Ok))
            }
            Err(message) => {
                warn!(stage = "generate", %message, "expression failed");
                Stream::new(std::iter::once(Err(PipelineError::Expression(message))))
            }
        };
        self
    }
}

impl<T: 'static, U: 'static> Stage<T> for Generate<T, U> {
    fn name(&self) -> &'static str {
        "generate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Pipe, gseq, items, seq, take};
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn test_map() {
        let out: Vec<String> = (1..=3).pipe(map(|x: i32| format!("#{x}"))).collect();
        assert_eq!(out, vec!["#1", "#2", "#3"]);
    }

    #[test]
    fn test_map_reconnects() {
        let doubled = (1..=2).pipe(map(|x: i32| x * 2));
        let again: Vec<i32> = (5..=6).pipe(doubled).collect();
        assert_eq!(again, vec![10, 12]);
    }

    #[test]
    fn test_filter() {
        let even = |x: &i32| x % 2 == 0;
        let out: Vec<i32> = (1..40).step_by(3).pipe(filter(even)).collect();
        assert_eq!(out, vec![4, 10, 16, 22, 28, 34]);
    }

    #[test]
    fn test_takewhile_and_dropwhile() {
        let small: Vec<i64> = seq(0, 1).pipe(takewhile(|x: &i64| *x < 4)).collect();
        assert_eq!(small, vec![0, 1, 2, 3]);

        let rest: Vec<i32> = vec![1, 2, 5, 1, 7]
            .pipe(dropwhile(|x: &i32| *x < 3))
            .collect();
        assert_eq!(rest, vec![5, 1, 7]);
    }

    #[test]
    fn test_predicate_stage_names() {
        assert_eq!(Stage::<i32>::name(&filter(|_: &i32| true)), "filter");
        assert_eq!(Stage::<i32>::name(&takewhile(|_: &i32| true)), "takewhile");
        assert_eq!(Stage::<i32>::name(&dropwhile(|_: &i32| true)), "dropwhile");
    }

    #[test]
    fn test_apply_unpacks_arguments() {
        let sums: Vec<i32> = vec![vec![1, 2], vec![3, 4]]
            .pipe(apply2(|a: i32, b: i32| a + b))
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(sums, vec![3, 7]);

        let products: Vec<i32> = vec![vec![2, 3, 4]]
            .pipe(apply(3, |args: Vec<i32>| args.iter().product()))
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(products, vec![24]);
    }

    #[test]
    fn test_apply_arity_mismatch_fails_at_pull() {
        let mut stage = vec![vec![1], vec![1, 2], vec![1, 2, 3]].pipe(apply2(|a: i32, b: i32| a * b));
        assert!(matches!(stage.next(), Some(Err(PipelineError::Argument(_)))));
        assert_eq!(stage.next(), Some(Ok(2)));
        assert!(matches!(stage.next(), Some(Err(PipelineError::Argument(_)))));
        assert_eq!(stage.next(), None);
    }

    #[test]
    fn test_apply1_and_apply3() {
        let out: Vec<Result<i32>> = vec![vec![4]].pipe(apply1(|a: i32| -a)).collect();
        assert_eq!(out, vec![Ok(-4)]);

        let out: Vec<Result<i32>> = vec![vec![1, 2, 3]]
            .pipe(apply3(|a: i32, b: i32, c: i32| a * 100 + b * 10 + c))
            .collect();
        assert_eq!(out, vec![Ok(123)]);
    }

    #[test]
    fn test_mapmethod_split() {
        let out: Vec<Result<Value>> = vec!["foo bar 1".to_string(), "foo bar 2".to_string()]
            .pipe(mapmethod("split", vec![]))
            .collect();
        assert_eq!(
            out,
            vec![Ok(json!(["foo", "bar", "1"])), Ok(json!(["foo", "bar", "2"]))]
        );
    }

    #[test]
    fn test_mapmethod_with_arguments() {
        let out: Vec<Result<Value>> = vec!["a-b".to_string()]
            .pipe(mapmethod("replace", vec![json!("-"), json!("+")]))
            .collect();
        assert_eq!(out, vec![Ok(json!("a+b"))]);
    }

    #[test]
    fn test_mapmethod_missing_method() {
        let mut stage = vec!["x".to_string()].pipe(mapmethod("frobnicate", vec![]));
        let err = stage.next().unwrap().unwrap_err();
        assert_eq!(err, PipelineError::attribute("String", "frobnicate"));
    }

    #[test]
    fn test_cut_each_value() {
        let every_other = Window::new(None, None, Some(2)).unwrap();
        let out: Vec<Vec<i32>> = vec![vec![1, 2, 3], vec![4, 5, 6]]
            .pipe(cut(every_other))
            .collect();
        assert_eq!(out, vec![vec![1, 3], vec![4, 6]]);

        let out: Vec<String> = vec!["hello".to_string()].pipe(cut(1..-1)).collect();
        assert_eq!(out, vec!["ell"]);
    }

    #[test]
    fn test_cut_at() {
        let out: Vec<Result<i32>> = vec![vec![1, 2, 3], vec![]].pipe(cut_at(-1)).collect();
        assert_eq!(out[0], Ok(3));
        assert!(matches!(out[1], Err(PipelineError::Index { index: -1, available: 0 })));
    }

    #[test]
    fn test_reduce_is_a_scan() {
        let sums = gseq(&[0.5])
            .unwrap()
            .pipe(reduce(|a: f64, b: f64| a + b))
            .pipe(items(5));
        assert_eq!(sums, vec![1.0, 1.5, 1.75, 1.875, 1.9375]);
    }

    #[test]
    fn test_reduce_from_emits_initial_first() {
        let out: Vec<i32> = vec![1, 2, 3].pipe(reduce_from(|a: i32, b: i32| a + b, 0)).collect();
        assert_eq!(out, vec![0, 1, 3, 6]);
    }

    #[test]
    fn test_reduce_preserves_length() {
        let out: Vec<i32> = vec![5, 1, 2].pipe(reduce(|a: i32, b: i32| a.max(b))).collect();
        assert_eq!(out, vec![5, 5, 5]);

        let none: Vec<i32> = Vec::new().pipe(reduce(|a: i32, b: i32| a + b)).collect();
        assert!(none.is_empty());
    }

    #[test]
    fn test_generate_once_per_connection() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let out: Vec<Result<i64>> = seq(0, 1)
            .pipe(generate(move |s: Stream<i64>| {
                counter.set(counter.get() + 1);
                Ok::<_, String>(s.filter(|x| x % 5 == 0).map(|x| x * x))
            }))
            .pipe(take(3))
            .collect();
        assert_eq!(out, vec![Ok(0), Ok(25), Ok(100)]);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_generate_runs_again_on_reconnect() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let stage = (0..4).pipe(generate(move |s: Stream<i32>| {
            counter.set(counter.get() + 1);
            Ok::<_, String>(s.map(|x| x + 1))
        }));
        let again: Vec<Result<i32>> = (10..12).pipe(stage).collect();
        assert_eq!(again, vec![Ok(11), Ok(12)]);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_generate_error_surfaces_on_pull() {
        let mut stage = (0..3).pipe(generate(|_: Stream<i32>| {
            Err::<Vec<i32>, _>("unbalanced expression")
        }));
        assert_eq!(
            stage.next(),
            Some(Err(PipelineError::Expression(
                "unbalanced expression".to_string()
            )))
        );
        assert_eq!(stage.next(), None);
    }
}
