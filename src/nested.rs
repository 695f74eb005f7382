//! Arbitrarily nested sequences, as consumed by `flatten`.
//!
//! A value is either an atom or a lazy sequence of further nested values.
//! Text is always an atom: strings are never split into characters.

use std::ops::Range;

use serde_json::Value;

use crate::pipeline::Stream;

/// One node of a nested sequence.
pub enum Nested<T> {
    Atom(T),
    Seq(Stream<Nested<T>>),
}

impl<T: 'static> Nested<T> {
    /// A sequence node over already-nested values.
    pub fn seq<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::IntoIter: 'static,
        I::Item: IntoNested<Atom = T> + 'static,
    {
        Nested::Seq(Stream::new(values.into_iter().map(IntoNested::into_nested)))
    }
}

/// Conversion into a [`Nested`] node.
pub trait IntoNested {
    type Atom;

    fn into_nested(self) -> Nested<Self::Atom>;
}

impl<T> IntoNested for Nested<T> {
    type Atom = T;

    fn into_nested(self) -> Nested<T> {
        self
    }
}

macro_rules! atomic {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoNested for $ty {
                type Atom = $ty;

                fn into_nested(self) -> Nested<$ty> {
                    Nested::Atom(self)
                }
            }
        )*
    };
}

atomic!(
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    bool,
    char,
    String,
    &'static str,
);

impl<T> IntoNested for Vec<T>
where
    T: IntoNested + 'static,
    T::Atom: 'static,
{
    type Atom = T::Atom;

    fn into_nested(self) -> Nested<T::Atom> {
        Nested::seq(self)
    }
}

impl<T> IntoNested for Stream<T>
where
    T: IntoNested + 'static,
    T::Atom: 'static,
{
    type Atom = T::Atom;

    fn into_nested(self) -> Nested<T::Atom> {
        Nested::seq(self)
    }
}

impl<T> IntoNested for Range<T>
where
    T: IntoNested + 'static,
    T::Atom: 'static,
    Range<T>: Iterator<Item = T>,
{
    type Atom = T::Atom;

    fn into_nested(self) -> Nested<T::Atom> {
        Nested::seq(self)
    }
}

/// JSON arrays descend; every other JSON value, strings included, is an atom.
impl IntoNested for Value {
    type Atom = Value;

    fn into_nested(self) -> Nested<Value> {
        match self {
            Value::Array(values) => Nested::seq(values),
            other => Nested::Atom(other),
        }
    }
}
