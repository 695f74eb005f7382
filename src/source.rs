//! Infinite sequence generators.
//!
//! Values are computed only when pulled, one at a time, so side-effecting
//! producers run exactly once per emitted value. Arithmetic follows the
//! element type's `Add`/`Mul`: fixed-width integers overflow as they
//! normally would, so pick a wider or arbitrary-precision type for long runs.

use std::marker::PhantomData;
use std::ops::{Add, Mul};

use tracing::debug;

use crate::error::{PipelineError, Result};

/// Arithmetic progression `start, start + step, start + 2*step, ...`.
#[derive(Debug, Clone)]
pub struct Seq<T> {
    current: T,
    step: T,
    started: bool,
}

pub fn seq<T>(start: T, step: T) -> Seq<T>
where
    T: Clone + Add<Output = T>,
{
    Seq {
        current: start,
        step,
        started: false,
    }
}

impl<T> Iterator for Seq<T>
where
    T: Clone + Add<Output = T>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.started {
            self.current = self.current.clone() + self.step.clone();
        } else {
            self.started = true;
        }
        Some(self.current.clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

/// Geometric progression `initial, initial*ratio, initial*ratio^2, ...`.
#[derive(Debug, Clone)]
pub struct GSeq<T> {
    current: T,
    ratio: T,
    started: bool,
}

/// Build a geometric progression from `[ratio]` (starting at 1) or
/// `[initial, ratio]`. Any other argument count is a configuration error.
pub fn gseq<T>(args: &[T]) -> Result<GSeq<T>>
where
    T: Clone + Mul<Output = T> + From<u8>,
{
    let (initial, ratio) = match args {
        [ratio] => (T::from(1), ratio.clone()),
        [initial, ratio] => (initial.clone(), ratio.clone()),
        _ => {
            debug!(count = args.len(), "rejected gseq arguments");
            return Err(PipelineError::Configuration(format!(
                "gseq expects 1 or 2 arguments, got {}",
                args.len()
            )));
        }
    };
    Ok(GSeq {
        current: initial,
        ratio,
        started: false,
    })
}

impl<T> Iterator for GSeq<T>
where
    T: Clone + Mul<Output = T>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.started {
            self.current = self.current.clone() * self.ratio.clone();
        } else {
            self.started = true;
        }
        Some(self.current.clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

/// `function(&args)` called afresh for every pull.
pub struct RepeatCall<A, T, F> {
    function: F,
    args: A,
    _output: PhantomData<fn() -> T>,
}

pub fn repeatcall<A, T, F>(function: F, args: A) -> RepeatCall<A, T, F>
where
    F: FnMut(&A) -> T,
{
    RepeatCall {
        function,
        args,
        _output: PhantomData,
    }
}

impl<A, T, F> Iterator for RepeatCall<A, T, F>
where
    F: FnMut(&A) -> T,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        Some((self.function)(&self.args))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

/// `initial, f(initial), f(f(initial)), ...`
///
/// `f` is applied only when the next value is pulled.
pub struct ChainCall<T, F> {
    state: Option<T>,
    started: bool,
    function: F,
}

pub fn chaincall<T, F>(function: F, initial: T) -> ChainCall<T, F>
where
    T: Clone,
    F: FnMut(&T) -> T,
{
    ChainCall {
        state: Some(initial),
        started: false,
        function,
    }
}

impl<T, F> Iterator for ChainCall<T, F>
where
    T: Clone,
    F: FnMut(&T) -> T,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.started {
            let previous = self.state.take()?;
            self.state = Some((self.function)(&previous));
        } else {
            self.started = true;
        }
        self.state.clone()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Pipe, items};
    use std::cell::Cell;

    #[test]
    fn test_seq_integers() {
        let out: Vec<i64> = seq(1, 2).take(5).collect();
        assert_eq!(out, vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn test_seq_floats() {
        let out = seq(1.0, 0.25).pipe(items(10));
        assert_eq!(
            out,
            vec![1.0, 1.25, 1.5, 1.75, 2.0, 2.25, 2.5, 2.75, 3.0, 3.25]
        );
    }

    #[test]
    fn test_seq_does_not_compute_ahead() {
        let mut near_max = seq(i8::MAX - 1, 1);
        assert_eq!(near_max.next(), Some(126));
        assert_eq!(near_max.next(), Some(127));
    }

    #[test]
    fn test_gseq_ratio_only() {
        let out: Vec<i64> = gseq(&[3]).unwrap().take(4).collect();
        assert_eq!(out, vec![1, 3, 9, 27]);
    }

    #[test]
    fn test_gseq_initial_and_ratio() {
        let out: Vec<f64> = gseq(&[8.0, 0.5]).unwrap().take(4).collect();
        assert_eq!(out, vec![8.0, 4.0, 2.0, 1.0]);
    }

    #[test]
    fn test_gseq_bad_arity() {
        let none: &[i32] = &[];
        assert!(matches!(gseq(none), Err(PipelineError::Configuration(_))));
        assert!(matches!(
            gseq(&[1, 2, 3]),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn test_repeatcall_calls_once_per_pull() {
        let calls = Cell::new(0);
        let mut it = repeatcall(
            |base: &i32| {
                calls.set(calls.get() + 1);
                base * calls.get()
            },
            10,
        );
        assert_eq!(calls.get(), 0);
        assert_eq!(it.next(), Some(10));
        assert_eq!(it.next(), Some(20));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_chaincall() {
        let out: Vec<u64> = chaincall(|x: &u64| x * x, 2).take(4).collect();
        assert_eq!(out, vec![2, 4, 16, 256]);
    }

    #[test]
    fn test_chaincall_is_lazy() {
        let calls = Cell::new(0);
        let mut it = chaincall(
            |s: &String| {
                calls.set(calls.get() + 1);
                format!("{s}!")
            },
            "hi".to_string(),
        );
        assert_eq!(it.next().as_deref(), Some("hi"));
        assert_eq!(calls.get(), 0);
        assert_eq!(it.next().as_deref(), Some("hi!"));
        assert_eq!(calls.get(), 1);
    }
}
